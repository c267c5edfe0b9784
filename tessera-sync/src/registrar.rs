//! Component registrar: one descriptor, end to end.
//!
//! Steps, in order; the first failure aborts the descriptor and is reported
//! with the [`RegistrationStep`] that failed:
//!
//! 1. resolve the directory path and check the template extension
//! 2. initialize the collection chain down to the component directory
//! 3. write the template (`<slug>[--<variant>].<ext>`)
//! 4. write the preview template into the parent directory, if any
//! 5. merge the component config (and README)

use tessera_core::{layout, ComponentDescriptor, ResolvedPath};

use crate::collection::init_collections;
use crate::component_config::merge_component_config;
use crate::error::{RegistrationStep, SyncError};
use crate::session::SyncSession;

/// Register one valid descriptor into the mirror.
pub fn register(session: &mut SyncSession, descriptor: &ComponentDescriptor) -> Result<(), SyncError> {
    let fail = |step: RegistrationStep| {
        move |source: SyncError| SyncError::Descriptor {
            component: descriptor.to_string(),
            step,
            source: Box::new(source),
        }
    };

    let resolved = ResolvedPath::resolve(descriptor)
        .map_err(SyncError::from)
        .map_err(fail(RegistrationStep::ResolvePath))?;
    let extension = layout::check_extension(descriptor.extension.as_deref())
        .map_err(SyncError::from)
        .map_err(fail(RegistrationStep::ResolvePath))?;

    let component_dir =
        init_collections(session, &resolved).map_err(fail(RegistrationStep::InitCollections))?;

    let template = component_dir.join(layout::template_file_name(
        resolved.component_slug(),
        resolved.variant.as_deref(),
        extension,
    ));
    let body = descriptor
        .template
        .as_deref()
        .ok_or(SyncError::MissingTemplate)
        .map_err(fail(RegistrationStep::WriteTemplate))?;
    session
        .write_file(&template, body.as_bytes())
        .map_err(fail(RegistrationStep::WriteTemplate))?;

    if let Some(preview) = &descriptor.preview {
        let file = layout::preview_file_name(
            resolved.component_slug(),
            &session.options().preview_extension,
        );
        let path = resolved.parent_dir().join(file);
        session
            .write_file(&path, preview.as_bytes())
            .map_err(fail(RegistrationStep::WritePreview))?;
    }

    merge_component_config(session, descriptor, &resolved)
        .map_err(fail(RegistrationStep::MergeConfig))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SyncOptions;
    use serde_json::{json, Value};
    use tessera_core::PathError;
    use std::fs;
    use tempfile::TempDir;

    fn descriptor(overrides: Value) -> ComponentDescriptor {
        let mut value = json!({
            "name": "Button",
            "path": ["Atoms"],
            "valid": true,
            "type": "component",
            "class": "Vendor\\Button",
            "extension": "html",
            "template": "<button></button>"
        });
        if let (Value::Object(base), Value::Object(extra)) = (&mut value, overrides) {
            base.extend(extra);
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn writes_template_preview_and_config() {
        let tmp = TempDir::new().unwrap();
        let mut session = SyncSession::new(tmp.path(), SyncOptions::default());
        register(
            &mut session,
            &descriptor(json!({"variant": "Extra Large", "preview": "<main>{{ yield }}</main>"})),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(tmp.path().join("atoms/button/button--extra-large.html")).unwrap(),
            "<button></button>"
        );
        assert_eq!(
            fs::read_to_string(tmp.path().join("atoms/_button-preview.html")).unwrap(),
            "<main>{{ yield }}</main>"
        );
        let written: Vec<_> = session.written().iter().cloned().collect();
        assert_eq!(
            written,
            vec![
                "atoms/_button-preview.html",
                "atoms/atoms.config.json",
                "atoms/button/button--extra-large.html",
                "atoms/button/button.config.json",
            ]
        );
    }

    #[test]
    fn preview_extension_is_configurable() {
        let tmp = TempDir::new().unwrap();
        let options = SyncOptions {
            preview_extension: "t3s".into(),
            ..SyncOptions::default()
        };
        let mut session = SyncSession::new(tmp.path(), options);
        register(&mut session, &descriptor(json!({"preview": "p"}))).unwrap();
        assert!(tmp.path().join("atoms/_button-preview.t3s").is_file());
    }

    #[test]
    fn failure_names_the_step() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("atoms"), "file").unwrap();
        let mut session = SyncSession::new(tmp.path(), SyncOptions::default());
        let err = register(&mut session, &descriptor(json!({}))).unwrap_err();
        match err {
            SyncError::Descriptor { component, step, source } => {
                assert_eq!(component, "Atoms/Button");
                assert_eq!(step, RegistrationStep::InitCollections);
                assert!(matches!(*source, SyncError::DirectoryCreation { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unsluggable_name_fails_path_resolution() {
        let tmp = TempDir::new().unwrap();
        let mut session = SyncSession::new(tmp.path(), SyncOptions::default());
        let err = register(&mut session, &descriptor(json!({"name": "???"}))).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Descriptor {
                step: RegistrationStep::ResolvePath,
                ..
            }
        ));
        assert!(session.written().is_empty());
    }

    #[test]
    fn extension_cannot_leave_the_component_directory() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("mirror");
        fs::create_dir(&root).unwrap();
        let mut session = SyncSession::new(&root, SyncOptions::default());

        let err = register(
            &mut session,
            &descriptor(json!({"extension": "html/../../../../escaped"})),
        )
        .unwrap_err();
        match err {
            SyncError::Descriptor { step, source, .. } => {
                assert_eq!(step, RegistrationStep::ResolvePath);
                assert!(matches!(
                    *source,
                    SyncError::Path(PathError::InvalidExtension { .. })
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(session.written().is_empty());
        assert!(!tmp.path().join("escaped").exists());
        assert_eq!(fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn missing_extension_or_template_fails() {
        let tmp = TempDir::new().unwrap();
        let mut session = SyncSession::new(tmp.path(), SyncOptions::default());
        let err = register(&mut session, &descriptor(json!({"extension": null}))).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Descriptor {
                step: RegistrationStep::ResolvePath,
                ..
            }
        ));

        let err = register(&mut session, &descriptor(json!({"template": null}))).unwrap_err();
        match err {
            SyncError::Descriptor { step, source, .. } => {
                assert_eq!(step, RegistrationStep::WriteTemplate);
                assert!(matches!(*source, SyncError::MissingTemplate));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
