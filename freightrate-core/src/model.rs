//! Domain data structures for shipments, rate options, and rate quotes.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Message used when a carrier answers without a single rate and without a reason.
pub const NO_RATES_MESSAGE: &str = "No shipping rates could be found for the destination address";

const KILOGRAMS_PER_POUND: f64 = 0.453_592_37;
const CENTIMETRES_PER_INCH: f64 = 2.54;

/// Built-in carriers supported by freightrate.
pub enum Carriers {
    /// R+L Carriers LTL freight.
    RlFreight,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a carrier known to freightrate.
pub struct CarrierId(pub String);

impl fmt::Display for Carriers {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Carriers::RlFreight => "rl_freight",
        };
        write!(formatter, "{slug}")
    }
}

impl From<Carriers> for CarrierId {
    fn from(carrier: Carriers) -> Self {
        CarrierId(carrier.to_string())
    }
}

impl fmt::Display for CarrierId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.pad(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Static capabilities a carrier adapter declares about itself.
pub struct CarrierMeta {
    /// Unique identifier.
    pub id: CarrierId,
    /// Display name, also stamped on every rate estimate.
    pub name: String,
    /// Heaviest single package the carrier accepts, in pounds.
    pub max_weight_lbs: f64,
    /// Whether a failed rate request can be repeated without side effects.
    pub retry_safe: bool,
    /// Option keys the carrier cannot quote without.
    pub required_options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Postal location of a shipment endpoint.
pub struct Location {
    /// City name.
    pub city: Option<String>,
    /// State or province abbreviation.
    pub province: Option<String>,
    /// ZIP or postal code.
    pub postal_code: Option<String>,
    /// ISO 3166 alpha-2 country code.
    pub country: String,
}

impl Location {
    /// Create a location that only knows its country.
    #[must_use]
    pub fn new<C: Into<String>>(country: C) -> Self {
        Self {
            country: country.into(),
            ..Self::default()
        }
    }

    /// Set the city.
    #[must_use]
    pub fn with_city<S: Into<String>>(mut self, city: S) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Set the state or province.
    #[must_use]
    pub fn with_province<S: Into<String>>(mut self, province: S) -> Self {
        self.province = Some(province.into());
        self
    }

    /// Set the postal code.
    #[must_use]
    pub fn with_postal_code<S: Into<String>>(mut self, postal_code: S) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    /// Normalized (trimmed, upper-case) alpha-2 country code.
    #[must_use]
    pub fn country_code(&self) -> String {
        self.country.trim().to_ascii_uppercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Measurement system a carrier expects weights and dimensions in.
pub enum UnitSystem {
    /// Pounds and inches.
    Imperial,
    /// Kilograms and centimetres.
    Metric,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Length, width, and height of a package in a single unit system.
pub struct Dimensions {
    /// Longest side.
    pub length: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single handling unit of a shipment.
pub struct Package {
    /// Gross weight in pounds.
    pub weight_lbs: f64,
    /// Length in inches.
    pub length_in: f64,
    /// Width in inches.
    pub width_in: f64,
    /// Height in inches.
    pub height_in: f64,
    /// NMFC freight class label such as `"70"` or `"92.5"`.
    #[serde(default)]
    pub freight_class: Option<String>,
}

impl Package {
    /// Create a package from its weight (pounds) and `[length, width, height]` (inches).
    #[must_use]
    pub fn new(weight_lbs: f64, [length_in, width_in, height_in]: [f64; 3]) -> Self {
        Self {
            weight_lbs,
            length_in,
            width_in,
            height_in,
            freight_class: None,
        }
    }

    /// Attach a freight class label.
    #[must_use]
    pub fn with_freight_class<S: Into<String>>(mut self, freight_class: S) -> Self {
        self.freight_class = Some(freight_class.into());
        self
    }

    /// Weight expressed in the given unit system.
    #[must_use]
    pub fn weight_in(&self, units: UnitSystem) -> f64 {
        match units {
            UnitSystem::Imperial => self.weight_lbs,
            UnitSystem::Metric => self.weight_lbs * KILOGRAMS_PER_POUND,
        }
    }

    /// Dimensions expressed in the given unit system.
    #[must_use]
    pub fn dimensions_in(&self, units: UnitSystem) -> Dimensions {
        let factor = match units {
            UnitSystem::Imperial => 1.0,
            UnitSystem::Metric => CENTIMETRES_PER_INCH,
        };
        Dimensions {
            length: self.length_in * factor,
            width: self.width_in * factor,
            height: self.height_in * factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Everything a carrier needs to know about the goods being moved.
pub struct Shipment {
    /// Pickup location.
    pub origin: Location,
    /// Delivery location.
    pub destination: Location,
    /// Handling units, in the order they should be quoted.
    pub packages: Vec<Package>,
}

impl Shipment {
    /// Bundle endpoints and packages into a shipment.
    #[must_use]
    pub fn new(origin: Location, destination: Location, packages: Vec<Package>) -> Self {
        Self {
            origin,
            destination,
            packages,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Option bag accepted by carrier rate lookups.
///
/// Every field is optional so that per-call options can be layered over
/// carrier-level defaults with [`RateOptions::merged_with`]. Unknown keys in a
/// deserialized bag are ignored.
pub struct RateOptions {
    /// API credential.
    pub key: Option<String>,
    /// Declared shipment value, sent verbatim.
    pub value: Option<String>,
    /// Route the request to the carrier's sandbox endpoint.
    pub test: Option<bool>,
    /// Request residential delivery.
    pub residential: Option<bool>,
    /// Request a liftgate at the destination.
    pub liftgate: Option<bool>,
    /// Request a call ahead before delivery.
    pub delivery_notification: Option<bool>,
    /// Keep request and response documents on the result and log them.
    pub log_xml: Option<bool>,
    /// Upper bound for the carrier round trip, in seconds.
    pub timeout_secs: Option<u64>,
}

impl RateOptions {
    /// Set the API credential.
    #[must_use]
    pub fn with_key<S: Into<String>>(mut self, key: S) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the declared value.
    #[must_use]
    pub fn with_value<S: Into<String>>(mut self, value: S) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Layer `overrides` on top of `self`; any field set in `overrides` wins.
    #[must_use]
    pub fn merged_with(&self, overrides: &RateOptions) -> RateOptions {
        RateOptions {
            key: overrides.key.clone().or_else(|| self.key.clone()),
            value: overrides.value.clone().or_else(|| self.value.clone()),
            test: overrides.test.or(self.test),
            residential: overrides.residential.or(self.residential),
            liftgate: overrides.liftgate.or(self.liftgate),
            delivery_notification: overrides
                .delivery_notification
                .or(self.delivery_notification),
            log_xml: overrides.log_xml.or(self.log_xml),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Whether the sandbox endpoint should be used.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.test.unwrap_or(false)
    }

    /// Whether residential delivery was requested.
    #[must_use]
    pub fn is_residential(&self) -> bool {
        self.residential.unwrap_or(false)
    }

    /// Whether a destination liftgate was requested.
    #[must_use]
    pub fn wants_liftgate(&self) -> bool {
        self.liftgate.unwrap_or(false)
    }

    /// Whether a delivery notification was requested.
    #[must_use]
    pub fn wants_delivery_notification(&self) -> bool {
        self.delivery_notification.unwrap_or(false)
    }

    /// Whether request and response documents should be kept and logged.
    #[must_use]
    pub fn logs_xml(&self) -> bool {
        self.log_xml.unwrap_or(false)
    }

    /// Round-trip timeout, if one was configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Inclusive window in which delivery is expected.
pub struct DeliveryRange {
    /// Earliest expected delivery date.
    pub earliest: NaiveDate,
    /// Latest expected delivery date.
    pub latest: NaiveDate,
}

impl DeliveryRange {
    /// A window that opens and closes on the same day.
    #[must_use]
    pub fn on(date: NaiveDate) -> Self {
        Self {
            earliest: date,
            latest: date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Price and transit estimate for one service level.
pub struct RateEstimate {
    /// Pickup location the estimate was requested for.
    pub origin: Location,
    /// Delivery location the estimate was requested for.
    pub destination: Location,
    /// Carrier display name.
    pub carrier: String,
    /// Human-readable service level name.
    pub service_name: String,
    /// Carrier code for the service level.
    pub service_code: String,
    /// Total charge in major currency units.
    pub total_price: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Packages the estimate covers.
    pub packages: Vec<Package>,
    /// Expected delivery window.
    pub delivery_range: DeliveryRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Outcome of a rate lookup against a single carrier.
pub struct RateResponse {
    /// Whether the carrier produced usable rates.
    pub success: bool,
    /// Carrier diagnostics, or a synthesized reason when no rates came back.
    pub message: String,
    /// Estimates in the order the carrier listed them.
    pub rates: Vec<RateEstimate>,
    /// Raw response document.
    pub xml: String,
    /// Request document that produced this response.
    pub request: Option<String>,
    /// Whether the caller asked for the documents to be logged.
    pub log_xml: bool,
}

impl RateResponse {
    /// Assemble a response.
    ///
    /// An empty rate list always yields `success == false`, and an empty
    /// message is replaced by [`NO_RATES_MESSAGE`] in that case.
    #[must_use]
    pub fn new(success: bool, message: String, rates: Vec<RateEstimate>, xml: String) -> Self {
        let (success, message) = if rates.is_empty() {
            let message = if message.trim().is_empty() {
                NO_RATES_MESSAGE.to_owned()
            } else {
                message
            };
            (false, message)
        } else {
            (success, message)
        };

        Self {
            success,
            message,
            rates,
            xml,
            request: None,
            log_xml: false,
        }
    }

    /// Attach the request document.
    #[must_use]
    pub fn with_request(mut self, request: String) -> Self {
        self.request = Some(request);
        self
    }

    /// Record whether document logging was requested.
    #[must_use]
    pub fn with_log_xml(mut self, log_xml: bool) -> Self {
        self.log_xml = log_xml;
        self
    }

    /// The lowest-priced estimate, if any.
    #[must_use]
    pub fn cheapest(&self) -> Option<&RateEstimate> {
        self.rates.iter().min_by_key(|rate| rate.total_price)
    }
}
