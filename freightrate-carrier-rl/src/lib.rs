//! Carrier adapter for R+L Carriers using the SOAP `RateQuoteService`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use freightrate_core::{
    model::{CarrierMeta, Carriers, Package, RateOptions, RateResponse, Shipment},
    plugin::CarrierPlugin,
    ports::{PortError, RatePort},
};

/// Lenient boolean literals.
pub mod boolean;
/// Request document builder.
pub mod request;
/// Response document parser.
pub mod response;
/// HTTP transport.
pub mod transport;
/// Quote types and accessorials.
pub mod wire;

pub use boolean::{InvalidBoolean, parse_bool_literal};
pub use request::build_request;
pub use response::{parse_response, parse_response_on};
pub use transport::{Endpoints, RlTransport};
pub use wire::{Accessorial, QuoteType};

/// Display name stamped on every estimate.
pub const CARRIER_NAME: &str = "R+L Freight";

/// Most items the service accepts in one request.
pub const MAX_ITEMS: usize = 8;

/// The carrier has no real weight ceiling; this keeps aggregators from filtering it out.
pub const MAX_WEIGHT_LBS: f64 = 1_000_000.0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Carrier-level settings applied beneath every call's options.
pub struct RlConfig {
    /// API key issued by the carrier.
    pub api_key: Option<String>,
    /// Service URLs.
    pub endpoints: Endpoints,
    /// Quote against the sandbox unless a call says otherwise.
    pub test: bool,
}

impl RlConfig {
    /// Options every call starts from.
    #[must_use]
    pub fn default_options(&self) -> RateOptions {
        RateOptions {
            key: self.api_key.clone(),
            test: Some(self.test),
            ..RateOptions::default()
        }
    }
}

/// Rate lookups against the R+L rate quote service.
pub struct RlRatePort {
    transport: RlTransport,
    defaults: RateOptions,
    meta: CarrierMeta,
}

impl RlRatePort {
    /// Create a rate port that layers call options over `defaults`.
    #[must_use]
    pub fn new(transport: RlTransport, defaults: RateOptions) -> Self {
        Self {
            transport,
            defaults,
            meta: carrier_meta(),
        }
    }
}

#[async_trait]
impl RatePort for RlRatePort {
    fn carrier(&self) -> &CarrierMeta {
        &self.meta
    }

    async fn find_rates(
        &self,
        shipment: &Shipment,
        options: &RateOptions,
    ) -> Result<RateResponse, PortError> {
        let options = self.defaults.merged_with(options);
        validate(&shipment.packages, &options)?;

        let request = build_request(
            &shipment.origin,
            &shipment.destination,
            &shipment.packages,
            &options,
        )?;
        if options.logs_xml() {
            debug!(xml = %request, "rate quote request");
        }

        let body = self
            .transport
            .submit(&request, options.is_test(), options.timeout())
            .await?;

        let response = parse_response(
            &shipment.origin,
            &shipment.destination,
            &shipment.packages,
            &body,
            &options,
        )?;
        info!(
            success = response.success,
            rates = response.rates.len(),
            "rate quote parsed"
        );

        Ok(response.with_request(request))
    }
}

/// Build the plugin bundle for the R+L provider.
#[must_use]
pub fn plugin(client: Client, config: &RlConfig) -> CarrierPlugin {
    let transport = RlTransport::new(client, config.endpoints.clone());
    let rate_port = Arc::new(RlRatePort::new(transport, config.default_options()));

    CarrierPlugin {
        meta: carrier_meta(),
        rate_port,
    }
}

fn carrier_meta() -> CarrierMeta {
    CarrierMeta {
        id: Carriers::RlFreight.into(),
        name: CARRIER_NAME.to_owned(),
        max_weight_lbs: MAX_WEIGHT_LBS,
        retry_safe: true,
        required_options: vec!["key".to_owned(), "value".to_owned()],
    }
}

fn validate(packages: &[Package], options: &RateOptions) -> Result<(), PortError> {
    if packages.is_empty() {
        return Err(PortError::NoPackages);
    }
    if packages.len() > MAX_ITEMS {
        return Err(PortError::TooManyPackages {
            count: packages.len(),
            max: MAX_ITEMS,
        });
    }
    if is_blank(options.key.as_deref()) {
        return Err(PortError::MissingOption("key"));
    }
    if is_blank(options.value.as_deref()) {
        return Err(PortError::MissingOption("value"));
    }
    Ok(())
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|text| text.trim().is_empty())
}
