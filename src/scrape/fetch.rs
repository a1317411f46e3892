use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use tracing::debug;

use crate::config::FetchConfig;

/// How to decode a response body when the server does not declare a charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEncoding {
    Utf8,
    /// nf3 serves cp932 pages.
    ShiftJis,
}

impl PageEncoding {
    const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::ShiftJis => "Shift_JIS",
        }
    }
}

/// Blocking page fetcher. Consecutive requests are spaced at least
/// `request_interval` apart, whichever site they go to.
pub struct Fetcher {
    client: Client,
    interval: Duration,
    last_request: Option<Instant>,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            interval: config.request_interval,
            last_request: None,
        })
    }

    fn wait_turn(&self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
    }

    pub fn get(&mut self, url: &str, encoding: PageEncoding) -> Result<String> {
        self.wait_turn();
        debug!("GET {url}");
        let response = self.client.get(url).send();
        self.last_request = Some(Instant::now());

        let response = response.with_context(|| format!("Request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {status} from {url}");
        }
        response
            .text_with_charset(encoding.label())
            .with_context(|| format!("Failed to read body of {url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// `阪神タイガース` in cp932.
    const TIGERS_CP932: &[u8] = b"\x8d\xe3\x90_\x83^\x83C\x83K\x81[\x83X";

    fn local_fetcher(interval: Duration) -> Fetcher {
        let config = FetchConfig {
            request_interval: interval,
            timeout: Duration::from_secs(5),
            ..FetchConfig::default()
        };
        let mut fetcher = Fetcher::new(&config).unwrap();
        fetcher.client = Client::builder()
            .no_proxy()
            .timeout(config.timeout)
            .build()
            .unwrap();
        fetcher
    }

    /// Serves one response with the given status line and body, then
    /// returns the URL to reach it.
    fn serve_once(status: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = vec![];
            let mut buf = [0; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/html\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(body).unwrap();
        });
        format!("http://{addr}/stat_disp.php")
    }

    #[test]
    fn requests_are_spaced_even_when_they_fail() {
        let interval = Duration::from_millis(500);
        let mut fetcher = local_fetcher(interval);
        let start = Instant::now();
        for _ in 0..3 {
            assert!(fetcher.get("http://127.0.0.1:1/", PageEncoding::Utf8).is_err());
        }
        assert!(start.elapsed() >= 2 * interval);
    }

    #[test]
    fn body_without_charset_is_decoded_as_requested() {
        let url = serve_once("200 OK", TIGERS_CP932);
        let mut fetcher = local_fetcher(Duration::ZERO);
        assert_eq!(fetcher.get(&url, PageEncoding::ShiftJis).unwrap(), "阪神タイガース");
    }

    #[test]
    fn error_status_fails() {
        let url = serve_once("404 Not Found", b"gone");
        let mut fetcher = local_fetcher(Duration::ZERO);
        let err = fetcher.get(&url, PageEncoding::Utf8).unwrap_err();
        assert!(err.to_string().starts_with("HTTP 404"), "{err}");
    }
}
