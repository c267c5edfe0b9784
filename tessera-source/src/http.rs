//! HTTP descriptor source.

use std::io::Read;
use std::time::Duration;

use tessera_core::{ComponentDescriptor, SharedContext};

use crate::error::SourceError;
use crate::{parse_descriptors, DescriptorSource};

#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Option<Duration>,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: None,
        }
    }

    /// Overall request timeout. Without one, the request waits indefinitely.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn http_err(&self, message: impl Into<String>) -> SourceError {
        SourceError::Http {
            url: self.url.clone(),
            message: message.into(),
        }
    }
}

impl DescriptorSource for HttpSource {
    fn fetch(&self) -> Result<Vec<ComponentDescriptor>, SourceError> {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let agent = builder.build();

        tracing::debug!("GET {}", self.url);
        let response = match agent.get(&self.url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                return Err(self.http_err(format!("HTTP {code} {}", response.status_text())));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(self.http_err(transport.to_string()));
            }
        };

        let mut body = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut body)
            .map_err(|e| self.http_err(e.to_string()))?;

        parse_descriptors(&self.url, &body)
    }

    fn identity(&self) -> SharedContext {
        SharedContext {
            source: self.url.clone(),
            source_kind: "http".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one canned HTTP response on a random local port.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let _ = std::io::Read::read(&mut stream, &mut buf);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}/components")
    }

    #[test]
    fn fetches_json_array() {
        let url = serve_once(
            "200 OK",
            r#"[{"name":"Card","valid":true,"extension":"html","template":"<div></div>"}]"#,
        );
        let descriptors = HttpSource::new(&url)
            .timeout(Duration::from_secs(5))
            .fetch()
            .unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "Card");
    }

    #[test]
    fn status_error_maps_to_http_error() {
        let url = serve_once("500 Internal Server Error", "oops");
        let err = HttpSource::new(&url)
            .timeout(Duration::from_secs(5))
            .fetch()
            .unwrap_err();
        match err {
            SourceError::Http { message, .. } => assert!(message.contains("500")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn html_body_is_malformed() {
        let url = serve_once("200 OK", "<html>maintenance</html>");
        let err = HttpSource::new(&url)
            .timeout(Duration::from_secs(5))
            .fetch()
            .unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }
}
