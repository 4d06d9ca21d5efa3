//! Blocking HTTP access used by the catalog and credential clients

use crate::types::{SlcError, SlcResult};
use std::time::Duration;

/// Minimal request surface needed by the catalog and credential clients.
///
/// Implementations must turn any non-success status into `SlcError::Http`.
pub trait HttpTransport {
    /// GET `url` with query parameters and an optional bearer token; returns the body
    fn get(&self, url: &str, query: &[(&str, String)], bearer: Option<&str>) -> SlcResult<String>;

    /// POST `form` as `application/x-www-form-urlencoded`; returns the body
    fn post_form(&self, url: &str, form: &[(&str, String)]) -> SlcResult<String>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn get(&self, url: &str, query: &[(&str, String)], bearer: Option<&str>) -> SlcResult<String> {
        (**self).get(url, query, bearer)
    }

    fn post_form(&self, url: &str, form: &[(&str, String)]) -> SlcResult<String> {
        (**self).post_form(url, form)
    }
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout_secs: u64) -> SlcResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SlcError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    fn finish(url: &str, response: reqwest::blocking::Response) -> SlcResult<String> {
        if !response.status().is_success() {
            return Err(SlcError::Http {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .text()
            .map_err(|e| SlcError::Transport(format!("Failed to read response from {}: {}", url, e)))
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(&str, String)], bearer: Option<&str>) -> SlcResult<String> {
        log::debug!("GET {} {:?}", url, query);

        let mut request = self.client.get(url).query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .map_err(|e| SlcError::Transport(format!("HTTP request failed: {}", e)))?;
        Self::finish(url, response)
    }

    fn post_form(&self, url: &str, form: &[(&str, String)]) -> SlcResult<String> {
        log::debug!("POST {} {:?}", url, form);

        let response = self
            .client
            .post(url)
            .form(form)
            .send()
            .map_err(|e| SlcError::Transport(format!("HTTP request failed: {}", e)))?;
        Self::finish(url, response)
    }
}
