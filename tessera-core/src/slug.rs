//! Filesystem-safe slugs.
//!
//! Lowercase ASCII alphanumeric runs joined by a single `-`. Accented Latin
//! letters are folded to ASCII first; everything else (whitespace,
//! punctuation, path separators, other scripts) acts as a word boundary.

/// Convert a display name into a slug: `"Button Group (wide)"` -> `"button-group-wide"`.
pub fn slugify(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        let folded = if c.is_ascii_alphanumeric() {
            Some(c.to_string())
        } else {
            fold_latin(c).map(str::to_owned)
        };
        match folded {
            Some(ascii) => {
                if pending_dash && !result.is_empty() {
                    result.push('-');
                }
                pending_dash = false;
                result.push_str(&ascii);
            }
            None => pending_dash = true,
        }
    }

    result
}

/// ASCII spelling of a lowercase accented Latin letter.
fn fold_latin(c: char) -> Option<&'static str> {
    Some(match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'ď' | 'đ' | 'ð' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'ĥ' | 'ħ' => "h",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'ĵ' => "j",
        'ķ' => "k",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'œ' => "oe",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'ß' => "ss",
        'ţ' | 'ť' | 'ŧ' => "t",
        'þ' => "th",
        'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'ŵ' => "w",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Button", "button")]
    #[case("Button Group", "button-group")]
    #[case("  Hero -- Banner  ", "hero-banner")]
    #[case("Forms/Input (large)", "forms-input-large")]
    #[case("snake_case_name", "snake-case-name")]
    #[case("Überschrift", "uberschrift")]
    #[case("Straße Ærø", "strasse-aero")]
    #[case("Crème brûlée", "creme-brulee")]
    #[case("Karte 地图", "karte")]
    #[case("v2.Card", "v2-card")]
    fn slugify_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(slugify("!!! ///"), "");
    }
}
