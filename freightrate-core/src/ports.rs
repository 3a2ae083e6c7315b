//! Traits describing carrier capabilities and the errors they surface.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{CarrierMeta, RateOptions, RateResponse, Shipment};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while quoting against a carrier backend.
pub enum PortError {
    /// Network layer failed, timed out, or the carrier answered with a non-2xx status.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Carrier response could not be parsed as a document.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    /// Carrier sent a boolean field that is neither truthy nor falsy.
    #[error("invalid value for Boolean: \"{0}\"")]
    InvalidBoolean(String),
    /// Shipment has no packages to quote.
    #[error("Shipment has no packages")]
    NoPackages,
    /// Shipment has more packages than the carrier accepts in one request.
    #[error("Too many packages: {count} given, at most {max} supported")]
    TooManyPackages {
        /// Number of packages supplied.
        count: usize,
        /// Carrier limit.
        max: usize,
    },
    /// A package exceeds the carrier's declared maximum weight.
    #[error("Package {index} weighs {weight_lbs} lbs, above the {max_lbs} lbs limit")]
    OverweightPackage {
        /// Zero-based position of the package.
        index: usize,
        /// Package weight in pounds.
        weight_lbs: f64,
        /// Carrier limit in pounds.
        max_lbs: f64,
    },
    /// A required option was not supplied.
    #[error("Missing required option: {0}")]
    MissingOption(&'static str),
    /// No carrier is registered under the requested identifier.
    #[error("Unsupported carrier")]
    UnsupportedCarrier,
    /// Internal adapter error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PortError {
    /// Whether repeating the same rate request may succeed.
    ///
    /// Rate lookups are read-only, so only transport failures qualify.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortError::Network(_))
    }
}

#[async_trait]
/// Trait for carrier-specific rating backends.
pub trait RatePort: Send + Sync {
    /// Metadata describing the carrier handled by this port.
    fn carrier(&self) -> &CarrierMeta;

    /// Quote every service level the carrier offers for the shipment.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the request cannot be sent, the carrier
    /// cannot be reached, or its response cannot be understood. A carrier
    /// that simply has no rates is reported through
    /// [`RateResponse::success`] instead.
    async fn find_rates(
        &self,
        shipment: &Shipment,
        options: &RateOptions,
    ) -> Result<RateResponse, PortError>;
}
