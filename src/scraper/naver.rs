use crate::config::NaverConfig;
use crate::model::{LookupError, Offer};
use crate::parser::{NaverShopParser, Parser};
use crate::scraper::traits::OfferLookup;

use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Naver Shopping search API client, asking for the cheapest offers first.
pub struct NaverShopClient {
    client: Client,
    parser: NaverShopParser,
    base_url: String,
    client_id: String,
    client_secret: String,
    display: u32,
}

impl NaverShopClient {
    pub fn new(cfg: &NaverConfig, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) PriceSniperBot/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Http(e.to_string()))?;

        Ok(Self {
            client,
            parser: NaverShopParser::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client_id: cfg.client_id.clone(),
            client_secret: cfg.client_secret.clone(),
            display: cfg.display,
        })
    }

    fn build_url(&self) -> String {
        format!("{}/v1/search/shop.json", self.base_url)
    }
}

fn transport_error(e: reqwest::Error) -> LookupError {
    if e.is_timeout() {
        LookupError::Timeout
    } else {
        LookupError::Http(e.to_string())
    }
}

#[async_trait::async_trait]
impl OfferLookup for NaverShopClient {
    async fn search(&self, query: &str) -> Result<Vec<Offer>, LookupError> {
        let url = self.build_url();
        let params = [
            ("query", query.to_string()),
            ("display", self.display.to_string()),
            ("sort", "asc".to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            debug!("Naver search '{}' answered {}", query, status);
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(transport_error)?;
        self.parser
            .parse(&body)
            .map_err(|e| LookupError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned HTTP response and hands back the raw request head.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let reply = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(String::from_utf8_lossy(&head).to_string());
        });
        (format!("http://{}", addr), rx)
    }

    fn client_for(base_url: String, timeout: Duration) -> NaverShopClient {
        let cfg = NaverConfig {
            client_id: "test-id".into(),
            client_secret: "test-secret".into(),
            base_url,
            display: 10,
        };
        NaverShopClient::new(&cfg, timeout).unwrap()
    }

    #[tokio::test]
    async fn sends_credentials_and_price_sort() {
        let body = r#"{"items":[{"title":"<b>X200</b> Widget","lprice":"99","link":"https://shop/1"}]}"#;
        let (base, head) = serve_once("HTTP/1.1 200 OK", body).await;
        let client = client_for(base, Duration::from_secs(5));

        let offers = client.search("Acme X200").await.unwrap();
        assert_eq!(offers, vec![Offer { title: "X200 Widget".into(), price: 99, link: "https://shop/1".into() }]);

        let head = head.await.unwrap().to_lowercase();
        assert!(head.starts_with("get /v1/search/shop.json?"));
        assert!(head.contains("query=acme+x200"));
        assert!(head.contains("sort=asc"));
        assert!(head.contains("display=10"));
        assert!(head.contains("x-naver-client-id: test-id"));
        assert!(head.contains("x-naver-client-secret: test-secret"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _head) = serve_once("HTTP/1.1 401 Unauthorized", r#"{"errorCode":"024"}"#).await;
        let client = client_for(base, Duration::from_secs(5));
        assert_eq!(client.search("pen").await, Err(LookupError::Status(401)));
    }

    #[tokio::test]
    async fn unexpected_body_is_malformed() {
        let (base, _head) = serve_once("HTTP/1.1 200 OK", r#"{"unexpected":true}"#).await;
        let client = client_for(base, Duration::from_secs(5));
        assert!(matches!(client.search("pen").await, Err(LookupError::Malformed(_))));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });
        let client = client_for(format!("http://{}/", addr), Duration::from_millis(200));
        assert_eq!(client.search("pen").await, Err(LookupError::Timeout));
    }
}
