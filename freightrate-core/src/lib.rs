//! Core types and service wiring for the freightrate carrier rating aggregator.

/// Shipment, option, and rate models shared by all carriers.
pub mod model;
/// Registry for plugging carrier adapters into the service.
pub mod plugin;
/// Traits and errors describing the carrier interfaces.
pub mod ports;
/// High-level service facade used by aggregators and clients.
pub mod service;

pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use service::*;
