//! Price quotes. Every service type prices the same way: start from a base
//! price, apply its multipliers in order, add any flat surcharges, and round
//! half-up once at the end. Quotes and bookings share these rules.

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::service::{
    BusDetails, BusType, CabDetails, CabRequirement, CabType, CabinClass, FlightDetails,
    HotelDetails, LogisticsDetails, PackageType, RoomType, ShipmentPriority, TrainClass,
    TrainDetails, TripType,
};
use crate::models::ServiceDetails;

pub trait PricingRule {
    const BASE_PRICE: f64;

    fn multipliers(&self) -> Vec<f64>;

    fn surcharges(&self) -> f64 {
        0.0
    }
}

pub fn estimate(details: &ServiceDetails) -> i64 {
    match details {
        ServiceDetails::Flight(d) => apply(d),
        ServiceDetails::Hotel(d) => apply(d),
        ServiceDetails::Train(d) => apply(d),
        ServiceDetails::Cab(d) => apply(d),
        ServiceDetails::Bus(d) => apply(d),
        ServiceDetails::Logistics(d) => apply(d),
    }
}

fn apply<R: PricingRule>(rule: &R) -> i64 {
    let subtotal = rule
        .multipliers()
        .into_iter()
        .fold(R::BASE_PRICE, |price, factor| price * factor);
    let total = subtotal + rule.surcharges();
    if total.is_finite() {
        total.round().max(0.0) as i64
    } else {
        0
    }
}

/// Parses a positive count, falling back to 1. Counts are not capped.
fn count(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n,
        _ => 1.0,
    }
}

/// Date-only values are taken as midnight UTC.
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Started days count as whole nights, with a floor of one.
fn nights(check_in: &str, check_out: &str) -> f64 {
    const DAY_MS: f64 = 86_400_000.0;
    match (parse_instant(check_in), parse_instant(check_out)) {
        (Some(start), Some(end)) => {
            let elapsed = (end - start).num_milliseconds() as f64;
            (elapsed / DAY_MS).ceil().max(1.0)
        }
        _ => 1.0,
    }
}

impl CabinClass {
    pub fn multiplier(self) -> f64 {
        match self {
            CabinClass::Economy => 1.0,
            CabinClass::PremiumEconomy => 1.5,
            CabinClass::Business => 2.5,
            CabinClass::First => 4.0,
        }
    }
}

impl TripType {
    pub fn multiplier(self) -> f64 {
        match self {
            TripType::Oneway => 1.0,
            TripType::Roundtrip => 1.8,
        }
    }
}

impl RoomType {
    pub fn multiplier(self) -> f64 {
        match self {
            RoomType::Standard => 1.0,
            RoomType::Deluxe => 1.5,
            RoomType::Suite => 2.5,
            RoomType::Executive => 3.0,
        }
    }
}

impl TrainClass {
    pub fn multiplier(self) -> f64 {
        match self {
            TrainClass::Standard => 1.0,
            TrainClass::Premium => 1.3,
            TrainClass::Business => 1.8,
            TrainClass::Sleeper => 2.2,
        }
    }
}

impl CabType {
    pub fn multiplier(self) -> f64 {
        match self {
            CabType::Economy => 1.0,
            CabType::Standard => 1.3,
            CabType::Executive => 2.0,
            CabType::Suv => 2.5,
        }
    }
}

impl BusType {
    pub fn multiplier(self) -> f64 {
        match self {
            BusType::Standard => 1.0,
            BusType::Sleeper => 1.5,
            BusType::Luxury => 2.0,
            BusType::Express => 1.3,
        }
    }
}

impl PackageType {
    pub fn multiplier(self) -> f64 {
        match self {
            PackageType::Document => 0.8,
            PackageType::Parcel => 1.2,
            PackageType::Large => 2.0,
            PackageType::Fragile => 1.8,
        }
    }
}

impl ShipmentPriority {
    pub fn multiplier(self) -> f64 {
        match self {
            ShipmentPriority::Standard => 1.0,
            ShipmentPriority::Express => 1.5,
            ShipmentPriority::Priority => 2.2,
        }
    }
}

impl PricingRule for FlightDetails {
    const BASE_PRICE: f64 = 300.0;

    fn multipliers(&self) -> Vec<f64> {
        vec![
            count(&self.passengers),
            self.cabin_class.multiplier(),
            self.trip_type.multiplier(),
        ]
    }
}

impl PricingRule for HotelDetails {
    const BASE_PRICE: f64 = 150.0;

    fn multipliers(&self) -> Vec<f64> {
        vec![
            count(&self.rooms),
            self.room_type.multiplier(),
            nights(&self.check_in, &self.check_out),
        ]
    }
}

impl PricingRule for TrainDetails {
    const BASE_PRICE: f64 = 50.0;

    fn multipliers(&self) -> Vec<f64> {
        vec![count(&self.passengers), self.class.multiplier()]
    }

    fn surcharges(&self) -> f64 {
        let flexible = if self.flexible { 20.0 } else { 0.0 };
        let meal = if self.meal {
            15.0 * count(&self.passengers)
        } else {
            0.0
        };
        flexible + meal
    }
}

impl PricingRule for CabDetails {
    const BASE_PRICE: f64 = 25.0;

    fn multipliers(&self) -> Vec<f64> {
        let passengers = count(&self.passengers);
        let passenger_factor = if passengers > 2.0 {
            1.0 + (passengers - 2.0) * 0.1
        } else {
            1.0
        };
        let urgency = match self.requirement {
            CabRequirement::Asap => 1.2,
            CabRequirement::Schedule => 1.0,
        };
        vec![self.cab_type.multiplier(), passenger_factor, urgency]
    }
}

impl PricingRule for BusDetails {
    const BASE_PRICE: f64 = 20.0;

    fn multipliers(&self) -> Vec<f64> {
        let mut factors = vec![count(&self.passengers), self.bus_type.multiplier()];
        if self.return_ticket {
            factors.push(1.8);
        }
        factors
    }
}

impl PricingRule for LogisticsDetails {
    const BASE_PRICE: f64 = 15.0;

    fn multipliers(&self) -> Vec<f64> {
        let weight = match self.weight.trim().parse::<f64>() {
            Ok(w) if w.is_finite() && w > 0.0 => w,
            _ => 1.0,
        };
        vec![
            self.package_type.multiplier(),
            self.priority.multiplier(),
            (weight * 0.5).max(1.0),
        ]
    }
}
