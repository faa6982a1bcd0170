//! HTTP transport used by the Salesforce client.
//!
//! The client never talks to `reqwest` directly so the extraction pipeline can
//! be driven by an in-memory transport in tests.

use crate::error::{Error, Result};
use reqwest::Client;
use std::future::Future;
use url::Url;

/// Status code and raw body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs GET and form-encoded POST requests.
pub trait Transport: Send + Sync {
    /// GET `url` with a bearer token.
    fn get(&self, url: &Url, bearer: &str) -> impl Future<Output = Result<HttpResponse>> + Send;

    /// POST `form` as `application/x-www-form-urlencoded`.
    fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
    ) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// `reqwest` backed transport.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn try_new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("fhx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    async fn read(url: &Url, response: reqwest::Result<reqwest::Response>) -> Result<HttpResponse> {
        let response = response.map_err(|e| transport_error(url, e))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| transport_error(url, e))?;
        log::trace!("{} -> {}: {}", url, status, body);
        Ok(HttpResponse { status, body })
    }
}

fn transport_error(url: &Url, e: reqwest::Error) -> Error {
    Error::Transport {
        url: url.to_string(),
        message: e.to_string(),
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, bearer: &str) -> Result<HttpResponse> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(bearer)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await;
        Self::read(url, response).await
    }

    async fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> Result<HttpResponse> {
        log::debug!("POST {}", url);
        let response = self.client.post(url.clone()).form(form).send().await;
        Self::read(url, response).await
    }
}
