//! High-level service facade combining all carriers.

use std::sync::Arc;

use tracing::{debug, info};

use crate::model::{CarrierId, CarrierMeta, RateOptions, RateResponse, Shipment};
use crate::plugin::CarrierRegistry;
use crate::ports::PortError;

/// Public entry point for quoting shipments.
pub struct RatingService {
    registry: Arc<CarrierRegistry>,
}

impl RatingService {
    /// Create a new service bound to the provided registry.
    #[must_use]
    pub fn new(registry: Arc<CarrierRegistry>) -> Self {
        Self { registry }
    }

    /// List all available carriers and their declared capabilities.
    #[must_use]
    pub fn carriers(&self) -> Vec<CarrierMeta> {
        self.registry.carriers()
    }

    /// Quote a shipment with a single carrier.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the carrier is unsupported, a package is
    /// heavier than the carrier allows, or the carrier call fails.
    pub async fn find_rates(
        &self,
        carrier: &CarrierId,
        shipment: &Shipment,
        options: &RateOptions,
    ) -> Result<RateResponse, PortError> {
        let plugin = self.registry.plugin(carrier)?;
        check_weights(&plugin.meta, shipment)?;

        debug!(%carrier, packages = shipment.packages.len(), "requesting rates");
        let response = plugin.rate_port.find_rates(shipment, options).await?;
        info!(
            %carrier,
            success = response.success,
            rates = response.rates.len(),
            "rate lookup finished"
        );

        Ok(response)
    }
}

fn check_weights(meta: &CarrierMeta, shipment: &Shipment) -> Result<(), PortError> {
    match shipment
        .packages
        .iter()
        .enumerate()
        .find(|(_, package)| package.weight_lbs > meta.max_weight_lbs)
    {
        Some((index, package)) => Err(PortError::OverweightPackage {
            index,
            weight_lbs: package.weight_lbs,
            max_lbs: meta.max_weight_lbs,
        }),
        None => Ok(()),
    }
}
