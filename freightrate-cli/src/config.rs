//! Quote files: carrier settings plus one shipment, in TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use freightrate_carrier_rl::RlConfig;
use freightrate_core::{Location, Package, RateOptions, Shipment};
use serde::Deserialize;

/// Environment variable that overrides `[carrier].api_key`.
pub(crate) const API_KEY_ENV: &str = "RL_API_KEY";

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteFile {
    #[serde(default)]
    pub carrier: RlConfig,
    pub origin: Location,
    pub destination: Location,
    pub packages: Vec<Package>,
    #[serde(default)]
    pub options: RateOptions,
}

impl QuoteFile {
    /// Read and parse a quote file, then apply environment overrides.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read quote file {}", path.display()))?;
        let file = Self::parse(&text)
            .with_context(|| format!("invalid quote file {}", path.display()))?;
        Ok(file.with_api_key(std::env::var(API_KEY_ENV).ok()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Replace the configured API key when `key` is set and non-empty.
    pub(crate) fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|key| !key.trim().is_empty()) {
            self.carrier.api_key = Some(key);
        }
        self
    }

    /// Whether a non-blank API key reaches the carrier, from either
    /// `[carrier].api_key` or `[options].key`.
    pub(crate) fn has_api_key(&self) -> bool {
        self.carrier
            .default_options()
            .merged_with(&self.options)
            .key
            .is_some_and(|key| !key.trim().is_empty())
    }

    pub(crate) fn shipment(&self) -> Shipment {
        Shipment::new(
            self.origin.clone(),
            self.destination.clone(),
            self.packages.clone(),
        )
    }
}
