//! HTTP cart backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Serialize;
use tracing::debug;

use crate::items::OfferId;

use super::{BackendError, CartBackend, RemoteCart};

/// Configuration for connecting to the cart API.
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// API base URL, e.g. `"https://api.example.com/v1"`.
    pub base_url: String,

    /// Bearer token of the authenticated shopper.
    pub token: Option<String>,

    /// Per-request timeout. None leaves the client default.
    pub timeout: Option<Duration>,
}

/// [`CartBackend`] over the storefront's REST API.
#[derive(Debug, Clone)]
pub struct HttpCartBackend {
    base_url: Url,
    token: Option<String>,
    http: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartItemRequest<'a> {
    offer_id: &'a str,
    quantity: u32,
}

impl HttpCartBackend {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: HttpBackendConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|error| BackendError::InvalidBaseUrl(format!("{}: {error}", config.base_url)))?;

        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidBaseUrl(config.base_url));
        }

        let mut builder = Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            token: config.token,
            http: builder.build()?,
        })
    }

    /// Absolute URL of an endpoint below the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response, BackendError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(BackendError::UnexpectedResponse(format!(
                "{action} request failed with status {status}: {text}"
            )));
        }

        debug!(action, status = %response.status(), "cart backend request succeeded");

        Ok(response)
    }
}

#[async_trait]
impl CartBackend for HttpCartBackend {
    async fn get_cart(&self) -> Result<RemoteCart, BackendError> {
        let url = self.endpoint(&["cart"])?;

        let response = self.send(self.http.get(url), "get cart").await?;

        Ok(response.json().await?)
    }

    async fn add_item(&self, offer_id: OfferId, quantity: u32) -> Result<(), BackendError> {
        let url = self.endpoint(&["cart", "add"])?;

        let body = CartItemRequest {
            offer_id: offer_id.as_str(),
            quantity,
        };

        self.send(self.http.post(url).json(&body), "add item").await?;

        Ok(())
    }

    async fn update_item(&self, offer_id: OfferId, quantity: u32) -> Result<(), BackendError> {
        let url = self.endpoint(&["cart", "update"])?;

        let body = CartItemRequest {
            offer_id: offer_id.as_str(),
            quantity,
        };

        self.send(self.http.put(url).json(&body), "update item").await?;

        Ok(())
    }

    async fn remove_item(&self, offer_id: OfferId) -> Result<(), BackendError> {
        let url = self.endpoint(&["cart", "remove", offer_id.as_str()])?;

        self.send(self.http.delete(url), "remove item").await?;

        Ok(())
    }

    async fn clear_cart(&self) -> Result<(), BackendError> {
        let url = self.endpoint(&["cart", "clear"])?;

        self.send(self.http.delete(url), "clear cart").await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Read, Write},
        net::TcpListener,
        thread::{self, JoinHandle},
    };

    use testresult::TestResult;

    use super::*;

    fn backend(base_url: &str) -> Result<HttpCartBackend, BackendError> {
        HttpCartBackend::new(HttpBackendConfig {
            base_url: base_url.to_string(),
            token: Some("secret".to_string()),
            timeout: Some(Duration::from_secs(5)),
        })
    }

    /// Client pointed at a local server, bypassing any proxy from the environment.
    fn local_backend(base_url: &str) -> Result<HttpCartBackend, Box<dyn std::error::Error>> {
        Ok(HttpCartBackend {
            base_url: Url::parse(base_url)?,
            token: Some("secret".to_string()),
            http: Client::builder().no_proxy().build()?,
        })
    }

    /// Serve a single HTTP response and hand back the raw request.
    fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> std::io::Result<(String, JoinHandle<std::io::Result<String>>)> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let url = format!("http://{}/api", listener.local_addr()?);

        let handle = thread::spawn(move || -> std::io::Result<String> {
            let (mut stream, _) = listener.accept()?;
            let mut reader = BufReader::new(stream.try_clone()?);

            let mut request = String::new();
            let mut content_length = 0;

            loop {
                let mut line = String::new();
                reader.read_line(&mut line)?;

                if let Some((name, value)) = line.split_once(':')
                    && name.eq_ignore_ascii_case("content-length")
                {
                    content_length = value.trim().parse().unwrap_or(0);
                }

                request.push_str(&line);

                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }

            let mut payload = vec![0; content_length];
            reader.read_exact(&mut payload)?;
            request.push_str(&String::from_utf8_lossy(&payload));

            write!(
                stream,
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            )?;

            Ok(request)
        });

        Ok((url, handle))
    }

    fn joined(handle: JoinHandle<std::io::Result<String>>) -> Result<String, Box<dyn std::error::Error>> {
        Ok(handle.join().map_err(|_panic| "server thread panicked")??)
    }

    #[test]
    fn endpoints_extend_base_path() -> TestResult {
        let backend = backend("https://api.example.com/v1/")?;

        assert_eq!(
            backend.endpoint(&["cart", "remove", "offer 1"])?.as_str(),
            "https://api.example.com/v1/cart/remove/offer%201"
        );

        Ok(())
    }

    #[test]
    fn endpoints_without_trailing_slash() -> TestResult {
        let backend = backend("https://api.example.com/v1")?;

        assert_eq!(
            backend.endpoint(&["cart"])?.as_str(),
            "https://api.example.com/v1/cart"
        );

        Ok(())
    }

    #[test]
    fn invalid_base_urls_are_rejected() {
        assert!(matches!(
            backend("not a url"),
            Err(BackendError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            backend("mailto:shop@example.com"),
            Err(BackendError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn request_body_uses_camel_case() -> TestResult {
        let body = serde_json::to_value(CartItemRequest {
            offer_id: "A",
            quantity: 2,
        })?;

        assert_eq!(body, serde_json::json!({ "offerId": "A", "quantity": 2 }));

        Ok(())
    }

    #[tokio::test]
    async fn get_cart_sends_bearer_token_and_parses_items() -> TestResult {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"items":[{"offerId":"A","quantity":2,"price":"100.00"}]}"#,
        )?;

        let cart = local_backend(&url)?.get_cart().await?;
        let request = joined(server)?;

        assert!(request.starts_with("GET /api/cart HTTP/1.1"), "{request}");
        assert!(
            request.to_lowercase().contains("authorization: bearer secret"),
            "{request}"
        );
        assert_eq!(cart.items.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_posts_json_body() -> TestResult {
        let (url, server) = serve_once("200 OK", "{}")?;

        local_backend(&url)?.add_item(OfferId::new("A")?, 3).await?;
        let request = joined(server)?;

        assert!(request.starts_with("POST /api/cart/add HTTP/1.1"), "{request}");
        assert!(
            request.ends_with(r#"{"offerId":"A","quantity":3}"#),
            "{request}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_unexpected_response() -> TestResult {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#)?;

        let result = local_backend(&url)?.clear_cart().await;
        let request = joined(server)?;

        assert!(request.starts_with("DELETE /api/cart/clear HTTP/1.1"), "{request}");
        assert!(matches!(
            result,
            Err(BackendError::UnexpectedResponse(message)) if message.contains("500") && message.contains("boom")
        ));

        Ok(())
    }
}
