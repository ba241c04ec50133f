//! Tarkka price page client
//!
//! This module fetches the Fortum Tarkka hourly price chart page and hands
//! its body to the parser. One plain GET per call: no timeout, no retries,
//! no custom headers.

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use super::parser::{extract_prices, ParseError};

/// Page carrying the chart of today's hourly prices
pub const DEFAULT_PRICES_URL: &str = "http://tuotanto.heyday.fi/fortum/tarkka/graafi.php";

/// Errors that can occur when fetching prices
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The body could not be turned into prices
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Client for fetching prices from the Tarkka price page
#[derive(Debug, Clone)]
pub struct TarkkaClient {
    client: Client,
    url: String,
}

impl Default for TarkkaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TarkkaClient {
    /// Create a new TarkkaClient pointing at the public price page
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            url: DEFAULT_PRICES_URL.to_string(),
        }
    }

    /// Create a new TarkkaClient with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            url: DEFAULT_PRICES_URL.to_string(),
        }
    }

    /// Point the client at a different page
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// The page this client fetches
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the raw page body
    ///
    /// The body is collected chunk by chunk in arrival order and decoded as
    /// UTF-8 once complete. The HTTP status is logged but not enforced.
    ///
    /// # Returns
    /// * `Ok(String)` - The complete body, possibly empty
    /// * `Err(FetchError::RequestFailed)` - On connection or transfer failure
    pub async fn fetch_body(&self) -> Result<String, FetchError> {
        debug!(url = %self.url, "Requesting price page");

        let mut response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(url = %self.url, %status, "Price page answered with a non-success status");
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            body.extend_from_slice(&chunk);
        }
        debug!(%status, bytes = body.len(), "Received price page");

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Fetch the page and extract today's hourly prices
    ///
    /// # Returns
    /// * `Ok(Vec<f64>)` - Prices in page order
    /// * `Err(FetchError)` - If the request fails or the body cannot be parsed
    pub async fn fetch_prices(&self) -> Result<Vec<f64>, FetchError> {
        let body = self.fetch_body().await?;
        Ok(extract_prices(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves `body` once with the given status line and returns the URL to request
    async fn serve_once(status: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/fortum/tarkka/graafi.php", addr)
    }

    /// Client that talks to the local listener directly, ignoring any proxy settings
    fn local_client(url: String) -> TarkkaClient {
        let client = Client::builder().no_proxy().build().unwrap();
        TarkkaClient::with_client(client).with_url(url)
    }

    fn page_with_prices(prices: &[f64]) -> String {
        let bars: Vec<String> = prices
            .iter()
            .enumerate()
            .map(|(hour, price)| {
                format!(
                    "{{ data: [[{},{}]], highlightColor: '#529900', bars: {{ show: true, barWidth: 0.7, align: 'center' }} }}",
                    hour, price
                )
            })
            .collect();

        format!(
            "<html>\n<script>\n$.plot($(\"#graafi\"), [\n\t{} ], options);\n</script>\n</html>\n",
            bars.join(", ")
        )
    }

    #[test]
    fn test_default_implementation() {
        let client = TarkkaClient::default();
        assert_eq!(client.url(), DEFAULT_PRICES_URL);
        assert!(client.url().contains("tuotanto.heyday.fi"));
    }

    #[test]
    fn test_with_url_overrides_page() {
        let client = TarkkaClient::new().with_url("http://localhost:8080/graafi.php");
        assert_eq!(client.url(), "http://localhost:8080/graafi.php");
    }

    #[tokio::test]
    async fn test_fetch_body_returns_complete_body() {
        let body = "line one\r\nline two\r\n".repeat(500);
        let url = serve_once("200 OK", body.clone()).await;

        let client = local_client(url);
        assert_eq!(client.fetch_body().await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_fetch_body_keeps_character_split_across_chunks() {
        let body = "Hinta tänään: 4,63 c/kWh\n";
        let split = body.find('ä').unwrap() + 1;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();

            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            // Cut 'ä' between its two bytes
            socket.write_all(&body.as_bytes()[..split]).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            socket.write_all(&body.as_bytes()[split..]).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let client = local_client(format!("http://{}/", addr));
        assert_eq!(client.fetch_body().await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_fetch_prices_parses_page() {
        let prices: Vec<f64> = (0..24).map(|h| 3.0 + h as f64 * 0.25).collect();
        let url = serve_once("200 OK", page_with_prices(&prices)).await;

        let client = local_client(url);
        assert_eq!(client.fetch_prices().await.unwrap(), prices);
    }

    #[tokio::test]
    async fn test_fetch_prices_empty_body_is_error() {
        let url = serve_once("200 OK", String::new()).await;

        let client = local_client(url);
        let err = client.fetch_prices().await.unwrap_err();

        assert!(matches!(err, FetchError::Parse(ParseError::EmptyResponse)));
        assert_eq!(err.to_string(), "No data received");
    }

    #[tokio::test]
    async fn test_fetch_prices_ignores_status_code() {
        let url = serve_once("500 Internal Server Error", page_with_prices(&[1.0, 2.0])).await;

        let client = local_client(url);
        assert_eq!(client.fetch_prices().await.unwrap(), vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_fetch_body_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = local_client(format!("http://{}/", addr));
        let err = client.fetch_body().await.unwrap_err();

        assert!(matches!(err, FetchError::RequestFailed(_)));
    }
}
