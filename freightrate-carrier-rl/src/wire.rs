//! Closed vocabularies of the rate quote service.

use std::fmt;

/// Top-level routing category of a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteType {
    /// Lower 48 states and Canada.
    Domestic,
    /// Shipments touching Alaska or Hawaii.
    AlaskaHawaii,
    /// Everything else.
    International,
}

impl QuoteType {
    /// Token sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteType::Domestic => "Domestic",
            QuoteType::AlaskaHawaii => "AlaskaHawaii",
            QuoteType::International => "International",
        }
    }
}

impl fmt::Display for QuoteType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Optional freight-handling services the carrier recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessorial {
    /// Inside delivery.
    InsideDelivery,
    /// Pickup at a residence.
    ResidentialPickup,
    /// Delivery to a residence.
    ResidentialDelivery,
    /// Liftgate at pickup.
    OriginLiftgate,
    /// Liftgate at delivery.
    DestinationLiftgate,
    /// Call ahead before delivery.
    DeliveryNotification,
    /// Freezable goods.
    Freezable,
    /// Hazardous materials.
    Hazmat,
    /// Inside pickup.
    InsidePickup,
    /// Pickup at a limited-access site.
    LimitedAccessPickup,
    /// Pickup at a dock.
    DockPickup,
    /// Delivery to a dock.
    DockDelivery,
    /// Pickup at an airport.
    AirportPickup,
    /// Delivery to an airport.
    AirportDelivery,
    /// Delivery to a limited-access site.
    LimitedAccessDelivery,
    /// Rate by cubic feet.
    CubicFeet,
    /// Protect from freezing.
    KeepFromFreezing,
    /// Door-to-door service.
    DoorToDoor,
    /// Collect on delivery.
    Cod,
    /// Freeze protection, short form.
    Fz,
    /// Over-dimension freight.
    OverDimension,
}

impl Accessorial {
    /// Every accessorial, in declaration order.
    pub const ALL: [Accessorial; 21] = [
        Accessorial::InsideDelivery,
        Accessorial::ResidentialPickup,
        Accessorial::ResidentialDelivery,
        Accessorial::OriginLiftgate,
        Accessorial::DestinationLiftgate,
        Accessorial::DeliveryNotification,
        Accessorial::Freezable,
        Accessorial::Hazmat,
        Accessorial::InsidePickup,
        Accessorial::LimitedAccessPickup,
        Accessorial::DockPickup,
        Accessorial::DockDelivery,
        Accessorial::AirportPickup,
        Accessorial::AirportDelivery,
        Accessorial::LimitedAccessDelivery,
        Accessorial::CubicFeet,
        Accessorial::KeepFromFreezing,
        Accessorial::DoorToDoor,
        Accessorial::Cod,
        Accessorial::Fz,
        Accessorial::OverDimension,
    ];

    /// Token sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Accessorial::InsideDelivery => "InsideDelivery",
            Accessorial::ResidentialPickup => "ResidentialPickup",
            Accessorial::ResidentialDelivery => "ResidentialDelivery",
            Accessorial::OriginLiftgate => "OriginLiftgate",
            Accessorial::DestinationLiftgate => "DestinationLiftgate",
            Accessorial::DeliveryNotification => "DeliveryNotification",
            Accessorial::Freezable => "Freezable",
            Accessorial::Hazmat => "Hazmat",
            Accessorial::InsidePickup => "InsidePickup",
            Accessorial::LimitedAccessPickup => "LimitedAccessPickup",
            Accessorial::DockPickup => "DockPickup",
            Accessorial::DockDelivery => "DockDelivery",
            Accessorial::AirportPickup => "AirportPickup",
            Accessorial::AirportDelivery => "AirportDelivery",
            Accessorial::LimitedAccessDelivery => "LimitedAccessDelivery",
            Accessorial::CubicFeet => "CubicFeet",
            Accessorial::KeepFromFreezing => "KeepFromFreezing",
            Accessorial::DoorToDoor => "DoorToDoor",
            Accessorial::Cod => "COD",
            Accessorial::Fz => "FZ",
            Accessorial::OverDimension => "OverDimension",
        }
    }

    /// Internal snake-case name.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Accessorial::InsideDelivery => "inside_delivery",
            Accessorial::ResidentialPickup => "residential_pickup",
            Accessorial::ResidentialDelivery => "residential_delivery",
            Accessorial::OriginLiftgate => "origin_liftgate",
            Accessorial::DestinationLiftgate => "destination_liftgate",
            Accessorial::DeliveryNotification => "delivery_notification",
            Accessorial::Freezable => "freezable",
            Accessorial::Hazmat => "hazmat",
            Accessorial::InsidePickup => "inside_pickup",
            Accessorial::LimitedAccessPickup => "limited_access_pickup",
            Accessorial::DockPickup => "dock_pickup",
            Accessorial::DockDelivery => "dock_delivery",
            Accessorial::AirportPickup => "airport_pickup",
            Accessorial::AirportDelivery => "airport_delivery",
            Accessorial::LimitedAccessDelivery => "limited_access_delivery",
            Accessorial::CubicFeet => "cubic_feet",
            Accessorial::KeepFromFreezing => "keep_from_freezing",
            Accessorial::DoorToDoor => "door_to_door",
            Accessorial::Cod => "cod",
            Accessorial::Fz => "fz",
            Accessorial::OverDimension => "over_dimension",
        }
    }

    /// Look up an accessorial by its internal name.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|accessorial| accessorial.key() == key)
    }
}

impl fmt::Display for Accessorial {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
