//! Registry for all carrier plugins and their ports.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{CarrierId, CarrierMeta};
use crate::ports::{PortError, RatePort};

/// Ports implementing a single carrier adapter.
pub struct CarrierPlugin {
    /// Static metadata describing the carrier.
    pub meta: CarrierMeta,
    /// Implementation for quoting rates.
    pub rate_port: Arc<dyn RatePort>,
}

/// Registry that resolves plugins by carrier identifier.
pub struct CarrierRegistry {
    plugins: HashMap<CarrierId, CarrierPlugin>,
}

impl CarrierRegistry {
    /// Build a registry from the provided plugin list.
    #[must_use]
    pub fn new(plugins: Vec<CarrierPlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id.clone(), plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Return metadata for all registered carriers.
    #[must_use]
    pub fn carriers(&self) -> Vec<CarrierMeta> {
        self.plugins
            .values()
            .map(|plugin| plugin.meta.clone())
            .collect()
    }

    /// Look up a plugin for the given carrier.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedCarrier`] when no plugin is registered.
    pub fn plugin(&self, carrier: &CarrierId) -> Result<&CarrierPlugin, PortError> {
        self.plugins
            .get(carrier)
            .ok_or(PortError::UnsupportedCarrier)
    }
}
