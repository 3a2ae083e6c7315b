//! SOAP transport for the rate quote service.

use std::sync::LazyLock;
use std::time::Duration;

use freightrate_core::PortError;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Rate quote service, version 1.0.1. Sandbox and production share the host.
pub const SERVICE_URL: &str = "http://api.rlcarriers.com/1.0.1/RateQuoteService.asmx";

/// Content type, including the SOAP action, the service dispatches on.
pub const SOAP_CONTENT_TYPE: &str =
    "application/soap+xml; charset=utf-8; action='http://www.rlcarriers.com/GetRateQuote'";

static SOAP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?soap:.*?>").expect("SOAP tag pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Sandbox and production URLs of the rate quote service.
pub struct Endpoints {
    /// URL used when the `test` option is set.
    pub test: String,
    /// URL used otherwise.
    pub live: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::single(SERVICE_URL)
    }
}

impl Endpoints {
    /// Use the same URL for sandbox and production.
    #[must_use]
    pub fn single<S: Into<String>>(url: S) -> Self {
        let url = url.into();
        Self {
            test: url.clone(),
            live: url,
        }
    }

    /// URL for the requested environment.
    #[must_use]
    pub fn url(&self, use_test: bool) -> &str {
        if use_test { &self.test } else { &self.live }
    }
}

/// Posts request documents and hands back prefix-free response bodies.
pub struct RlTransport {
    client: Client,
    endpoints: Endpoints,
}

impl RlTransport {
    /// Create a transport bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }

    /// Post a request document and return the response body without SOAP tags.
    ///
    /// Newlines are removed from the document before sending. Dropping the
    /// returned future cancels the request.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::Network`] when the request fails, times out, or
    /// the service answers with a non-2xx status.
    pub async fn submit(
        &self,
        xml: &str,
        use_test: bool,
        timeout: Option<Duration>,
    ) -> Result<String, PortError> {
        let url = self.endpoints.url(use_test);
        debug!(url, use_test, "posting rate quote request");

        let mut req = self
            .client
            .post(url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(xml.replace('\n', ""));
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        let body = fetch_text(req).await?;
        Ok(strip_soap_tags(&body))
    }
}

/// Remove every `<soap:...>` and `</soap:...>` tag from a response body.
#[must_use]
pub fn strip_soap_tags(body: &str) -> String {
    SOAP_TAG.replace_all(body, "").into_owned()
}

// Small helper to fetch a text body with status handling.
async fn fetch_text(req: RequestBuilder) -> Result<String, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .text()
        .await
        .map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_strip_soap_envelope_tags() {
        let body = "<?xml version=\"1.0\"?><soap:Envelope xmlns:soap=\"http://www.w3.org/2003/05/soap-envelope\">\
                    <soap:Body><GetRateQuoteResponse/></soap:Body></soap:Envelope>";

        assert_eq!(
            strip_soap_tags(body),
            "<?xml version=\"1.0\"?><GetRateQuoteResponse/>"
        );
    }

    #[test]
    fn test_should_leave_unprefixed_tags_alone() {
        let body = "<GetRateQuoteResult><WasSuccess>true</WasSuccess></GetRateQuoteResult>";

        assert_eq!(strip_soap_tags(body), body);
    }

    #[test]
    fn test_should_choose_endpoint_by_test_flag() {
        let endpoints = Endpoints {
            test: "http://sandbox.example/quote".to_owned(),
            live: "http://live.example/quote".to_owned(),
        };

        assert_eq!(endpoints.url(true), "http://sandbox.example/quote");
        assert_eq!(endpoints.url(false), "http://live.example/quote");
        assert_eq!(Endpoints::default().url(true), SERVICE_URL);
    }
}
