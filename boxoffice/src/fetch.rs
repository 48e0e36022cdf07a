//! Blocking page fetches with status-band classification

use std::time::Duration;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Anything that can turn a URL into page text
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Response body as handed to `classify`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Text(String),
    /// Body delivered in pieces; joined with newlines into one document
    Fragments(Vec<String>),
}

impl ResponseBody {
    pub fn into_document(self) -> String {
        match self {
            ResponseBody::Text(text) => text,
            ResponseBody::Fragments(parts) => parts.join("\n"),
        }
    }
}

/// Map a status code to success or the matching failure.
///
/// 1xx, 3xx, 4xx and 5xx fail. Everything else, including 2xx codes other
/// than 200, is accepted.
pub fn classify(status: u16, body: ResponseBody) -> Result<String> {
    match status {
        200 => Ok(body.into_document()),
        100..=199 => Err(Error::InformationalResponse(status)),
        300..=399 => Err(Error::RedirectNotFollowed(status)),
        400..=499 => Err(Error::ClientError(status)),
        500..=599 => Err(Error::ServerError(status)),
        _ => {
            warn!(status, "response code unknown, using body");
            Ok(body.into_document())
        }
    }
}

/// Single GET per call, no retry, redirects left to `classify`
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(Error::HttpClient)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        info!(url, "requesting page");
        let connectivity = |source: reqwest::Error| Error::Connectivity {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(connectivity)?;
        let status = response.status().as_u16();
        let text = response.text().map_err(connectivity)?;
        classify(status, ResponseBody::Text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::USER_AGENT;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn text(s: &str) -> ResponseBody {
        ResponseBody::Text(s.to_string())
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(USER_AGENT, Some(Duration::from_secs(5))).unwrap()
    }

    /// Accept one connection, answer it with `response` and hand back the
    /// request head that was read.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/release/rl1077904129/", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (url, handle)
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(classify(200, text("ok")).unwrap(), "ok");
        assert_eq!(classify(201, text("created")).unwrap(), "created");
        assert!(matches!(classify(101, text("")), Err(Error::InformationalResponse(101))));
        assert!(matches!(classify(301, text("")), Err(Error::RedirectNotFollowed(301))));
        assert!(matches!(classify(404, text("")), Err(Error::ClientError(404))));
        assert!(matches!(classify(503, text("")), Err(Error::ServerError(503))));
    }

    #[test]
    fn test_unknown_code_joins_fragments() {
        let body = ResponseBody::Fragments(vec!["<html>".into(), "</html>".into()]);
        assert_eq!(classify(999, body).unwrap(), "<html>\n</html>");
    }

    #[test]
    fn test_http_fetcher_returns_body_and_sends_user_agent() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\nConnection: close\r\n\r\n<html></html>",
        );
        assert_eq!(fetcher().fetch(&url).unwrap(), "<html></html>");

        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.starts_with("get /release/rl1077904129/ "));
        assert!(request.contains(&format!("user-agent: {}", USER_AGENT.to_ascii_lowercase())));
    }

    #[test]
    fn test_http_fetcher_leaves_redirects_unfollowed() {
        let (url, server) = serve_once(
            "HTTP/1.1 301 Moved Permanently\r\nLocation: /elsewhere\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        assert!(matches!(fetcher().fetch(&url), Err(Error::RedirectNotFollowed(301))));
        server.join().unwrap();
    }

    #[test]
    fn test_http_fetcher_classifies_real_status() {
        let (url, server) = serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n");
        assert_eq!(fetcher().fetch(&url).unwrap(), "");
        server.join().unwrap();

        let (url, server) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        );
        assert!(matches!(fetcher().fetch(&url), Err(Error::ClientError(404))));
        server.join().unwrap();
    }

    #[test]
    fn test_unreachable_host_is_connectivity_error() {
        match fetcher().fetch("http://127.0.0.1:1/") {
            Err(Error::Connectivity { url, .. }) => assert_eq!(url, "http://127.0.0.1:1/"),
            other => panic!("expected Connectivity, got {:?}", other),
        }
    }

    #[test]
    fn test_client_setup_error_names_no_url() {
        let source = reqwest::blocking::Client::new()
            .get("not a url")
            .send()
            .unwrap_err();
        let message = Error::HttpClient(source).to_string();
        assert!(message.starts_with("failed to build HTTP client: "));
    }
}
