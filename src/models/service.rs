use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Flight,
    Hotel,
    Train,
    Cab,
    Bus,
    Logistics,
}

impl ServiceType {
    pub const ALL: [ServiceType; 6] = [
        ServiceType::Flight,
        ServiceType::Hotel,
        ServiceType::Train,
        ServiceType::Cab,
        ServiceType::Bus,
        ServiceType::Logistics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Flight => "flight",
            ServiceType::Hotel => "hotel",
            ServiceType::Train => "train",
            ServiceType::Cab => "cab",
            ServiceType::Bus => "bus",
            ServiceType::Logistics => "logistics",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Service-specific booking payload, keyed by service type.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceDetails {
    Flight(FlightDetails),
    Hotel(HotelDetails),
    Train(TrainDetails),
    Cab(CabDetails),
    Bus(BusDetails),
    Logistics(LogisticsDetails),
}

impl ServiceDetails {
    pub fn service_type(&self) -> ServiceType {
        match self {
            ServiceDetails::Flight(_) => ServiceType::Flight,
            ServiceDetails::Hotel(_) => ServiceType::Hotel,
            ServiceDetails::Train(_) => ServiceType::Train,
            ServiceDetails::Cab(_) => ServiceType::Cab,
            ServiceDetails::Bus(_) => ServiceType::Bus,
            ServiceDetails::Logistics(_) => ServiceType::Logistics,
        }
    }

    /// The normalized JSON form that gets persisted with the booking.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            ServiceDetails::Flight(d) => serde_json::to_value(d),
            ServiceDetails::Hotel(d) => serde_json::to_value(d),
            ServiceDetails::Train(d) => serde_json::to_value(d),
            ServiceDetails::Cab(d) => serde_json::to_value(d),
            ServiceDetails::Bus(d) => serde_json::to_value(d),
            ServiceDetails::Logistics(d) => serde_json::to_value(d),
        }
    }
}

// ── Flight ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightDetails {
    pub from: String,
    pub to: String,
    pub depart_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub passengers: String,
    pub trip_type: TripType,
    pub cabin_class: CabinClass,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Oneway,
    Roundtrip,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

// ── Hotel ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDetails {
    pub location: String,
    pub check_in: String,
    pub check_out: String,
    pub rooms: String,
    pub adults: String,
    pub children: String,
    pub room_type: RoomType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amenities: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Standard,
    Deluxe,
    Suite,
    Executive,
}

/// Optional flags may arrive as `null`, which means unset.
fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

// ── Train ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainDetails {
    pub from: String,
    pub to: String,
    pub depart_date: String,
    pub passengers: String,
    pub class: TrainClass,
    #[serde(default, deserialize_with = "null_as_false")]
    pub flexible: bool,
    #[serde(default, deserialize_with = "null_as_false")]
    pub meal: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrainClass {
    Standard,
    Premium,
    Business,
    Sleeper,
}

// ── Cab ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CabDetails {
    pub pickup: String,
    pub dropoff: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub cab_type: CabType,
    pub passengers: String,
    pub requirement: CabRequirement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CabType {
    Economy,
    Standard,
    Executive,
    Suv,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CabRequirement {
    Asap,
    Schedule,
}

// ── Bus ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusDetails {
    pub from: String,
    pub to: String,
    pub depart_date: String,
    pub passengers: String,
    pub bus_type: BusType,
    #[serde(default, deserialize_with = "null_as_false")]
    pub return_ticket: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BusType {
    Standard,
    Sleeper,
    Luxury,
    Express,
}

// ── Logistics ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsDetails {
    pub pickup_address: String,
    pub delivery_address: String,
    pub package_type: PackageType,
    pub weight: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<String>,
    pub shipment_date: String,
    pub priority: ShipmentPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub contact_name: String,
    pub contact_phone: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Document,
    Parcel,
    Large,
    Fragile,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentPriority {
    Standard,
    Express,
    Priority,
}
