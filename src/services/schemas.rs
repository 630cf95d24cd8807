use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::{BookingStatus, Registration, ServiceDetails, ServiceType};
use crate::services::validation::{decode, FieldKind, FieldSpec, Schema, Trigger};

const SERVICE_TYPES: &[&str] = &["flight", "hotel", "train", "cab", "bus", "logistics"];
const BOOKING_STATUSES: &[&str] = &["pending", "confirmed", "canceled"];

const fn text(min_len: u64) -> FieldKind {
    FieldKind::Text { min_len }
}

const POSITIVE_COUNT: FieldKind = FieldKind::Count { allow_zero: false };

pub static FLIGHT: Schema = Schema {
    name: "flight",
    fields: &[
        FieldSpec::required("from", text(2), "Please enter origin"),
        FieldSpec::required("to", text(2), "Please enter destination"),
        FieldSpec::required("departDate", text(1), "Please select departure date"),
        FieldSpec::optional("returnDate", text(0), "Return date must be a date string"),
        FieldSpec::required("passengers", POSITIVE_COUNT, "Please select number of passengers"),
        FieldSpec::required(
            "tripType",
            FieldKind::OneOf(&["oneway", "roundtrip"]),
            "Please select trip type",
        ),
        FieldSpec::required(
            "cabinClass",
            FieldKind::OneOf(&["economy", "premium_economy", "business", "first"]),
            "Please select cabin class",
        ),
    ],
};

pub static HOTEL: Schema = Schema {
    name: "hotel",
    fields: &[
        FieldSpec::required("location", text(2), "Please enter a location"),
        FieldSpec::required("checkIn", text(1), "Please select check-in date"),
        FieldSpec::required("checkOut", text(1), "Please select check-out date"),
        FieldSpec::required("rooms", POSITIVE_COUNT, "Please select number of rooms"),
        FieldSpec::required("adults", POSITIVE_COUNT, "Please select number of adults"),
        FieldSpec::required(
            "children",
            FieldKind::Count { allow_zero: true },
            "Please select number of children",
        ),
        FieldSpec::required(
            "roomType",
            FieldKind::OneOf(&["standard", "deluxe", "suite", "executive"]),
            "Please select room type",
        ),
        FieldSpec::optional("amenities", FieldKind::Tags, "Amenities must be a list of names"),
    ],
};

pub static TRAIN: Schema = Schema {
    name: "train",
    fields: &[
        FieldSpec::required("from", text(2), "Please enter origin station"),
        FieldSpec::required("to", text(2), "Please enter destination station"),
        FieldSpec::required("departDate", text(1), "Please select departure date"),
        FieldSpec::required("passengers", POSITIVE_COUNT, "Please select number of passengers"),
        FieldSpec::required(
            "class",
            FieldKind::OneOf(&["standard", "premium", "business", "sleeper"]),
            "Please select travel class",
        ),
        FieldSpec::optional("flexible", FieldKind::Flag, "Flexible must be true or false"),
        FieldSpec::optional("meal", FieldKind::Flag, "Meal must be true or false"),
    ],
};

pub static CAB: Schema = Schema {
    name: "cab",
    fields: &[
        FieldSpec::required("pickup", text(2), "Please enter pickup location"),
        FieldSpec::required("dropoff", text(2), "Please enter drop-off location"),
        FieldSpec::required("date", text(1), "Please select date"),
        FieldSpec::required_when(
            "time",
            text(1),
            Trigger::Equals("requirement", "schedule"),
            "Please select time",
        ),
        FieldSpec::required(
            "cabType",
            FieldKind::OneOf(&["economy", "standard", "executive", "suv"]),
            "Please select cab type",
        ),
        FieldSpec::required("passengers", POSITIVE_COUNT, "Please select number of passengers"),
        FieldSpec::required(
            "requirement",
            FieldKind::OneOf(&["asap", "schedule"]),
            "Please choose when you need the cab",
        ),
        FieldSpec::optional("notes", text(0), "Notes must be text"),
    ],
};

pub static BUS: Schema = Schema {
    name: "bus",
    fields: &[
        FieldSpec::required("from", text(2), "Please enter origin"),
        FieldSpec::required("to", text(2), "Please enter destination"),
        FieldSpec::required("departDate", text(1), "Please select departure date"),
        FieldSpec::required("passengers", POSITIVE_COUNT, "Please select number of passengers"),
        FieldSpec::required(
            "busType",
            FieldKind::OneOf(&["standard", "sleeper", "luxury", "express"]),
            "Please select bus type",
        ),
        FieldSpec::optional("returnTicket", FieldKind::Flag, "Return ticket must be true or false"),
        FieldSpec::required_when(
            "returnDate",
            text(1),
            Trigger::IsTrue("returnTicket"),
            "Please select return date",
        ),
    ],
};

pub static LOGISTICS: Schema = Schema {
    name: "logistics",
    fields: &[
        FieldSpec::required("pickupAddress", text(5), "Please enter pickup address"),
        FieldSpec::required("deliveryAddress", text(5), "Please enter delivery address"),
        FieldSpec::required(
            "packageType",
            FieldKind::OneOf(&["document", "parcel", "large", "fragile"]),
            "Please select package type",
        ),
        FieldSpec::required("weight", FieldKind::PositiveNumber, "Please enter weight"),
        FieldSpec::optional("dimensions", text(0), "Dimensions must be text"),
        FieldSpec::required("shipmentDate", text(1), "Please select shipment date"),
        FieldSpec::required(
            "priority",
            FieldKind::OneOf(&["standard", "express", "priority"]),
            "Please select delivery priority",
        ),
        FieldSpec::optional("specialInstructions", text(0), "Instructions must be text"),
        FieldSpec::required("contactName", text(2), "Please enter contact name"),
        FieldSpec::required("contactPhone", text(10), "Please enter a valid phone number"),
    ],
};

pub static REGISTRATION: Schema = Schema {
    name: "registration",
    fields: &[
        FieldSpec::required("username", text(1), "Username is required"),
        FieldSpec::required("password", text(1), "Password is required"),
        FieldSpec::required("email", FieldKind::Email, "Please enter a valid email address"),
        FieldSpec::optional("fullName", text(0), "Full name must be text"),
        FieldSpec::optional("phone", text(0), "Phone must be text"),
    ],
};

pub static BOOKING_ENVELOPE: Schema = Schema {
    name: "booking",
    fields: &[
        FieldSpec::required(
            "userId",
            FieldKind::Integer { minimum: None },
            "User ID must be an integer",
        ),
        FieldSpec::required(
            "serviceType",
            FieldKind::OneOf(SERVICE_TYPES),
            "Service type must be one of flight, hotel, train, cab, bus, logistics",
        ),
        FieldSpec::optional(
            "status",
            FieldKind::OneOf(BOOKING_STATUSES),
            "Status must be one of pending, confirmed, canceled",
        ),
        FieldSpec::required("details", FieldKind::Object, "Booking details are required"),
        FieldSpec::required(
            "totalPrice",
            FieldKind::Integer { minimum: Some(0) },
            "Total price must be a non-negative integer",
        ),
    ],
};

pub static QUOTE_REQUEST: Schema = Schema {
    name: "quote",
    fields: &[
        FieldSpec::required(
            "serviceType",
            FieldKind::OneOf(SERVICE_TYPES),
            "Service type must be one of flight, hotel, train, cab, bus, logistics",
        ),
        FieldSpec::required("details", FieldKind::Object, "Booking details are required"),
    ],
};

pub fn details_schema(service_type: ServiceType) -> &'static Schema {
    match service_type {
        ServiceType::Flight => &FLIGHT,
        ServiceType::Hotel => &HOTEL,
        ServiceType::Train => &TRAIN,
        ServiceType::Cab => &CAB,
        ServiceType::Bus => &BUS,
        ServiceType::Logistics => &LOGISTICS,
    }
}

/// A validated booking submission.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub user_id: i64,
    pub status: Option<BookingStatus>,
    pub details: ServiceDetails,
    pub total_price: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingEnvelope {
    user_id: i64,
    service_type: ServiceType,
    #[serde(default)]
    status: Option<BookingStatus>,
    details: Value,
    total_price: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    service_type: ServiceType,
    details: Value,
}

pub fn parse_registration(payload: &Value) -> Result<Registration, AppError> {
    REGISTRATION.parse(payload, "")
}

pub fn parse_booking_request(payload: &Value) -> Result<BookingRequest, AppError> {
    check_with_details(&BOOKING_ENVELOPE, payload)?;
    let envelope: BookingEnvelope = decode(payload, "")?;
    Ok(BookingRequest {
        user_id: envelope.user_id,
        status: envelope.status,
        details: decode_details(envelope.service_type, &envelope.details)?,
        total_price: envelope.total_price,
    })
}

pub fn parse_quote_request(payload: &Value) -> Result<ServiceDetails, AppError> {
    check_with_details(&QUOTE_REQUEST, payload)?;
    let envelope: QuoteEnvelope = decode(payload, "")?;
    decode_details(envelope.service_type, &envelope.details)
}

/// Validates a payload's details against the schema for `service_type`.
pub fn parse_details(service_type: ServiceType, details: &Value) -> Result<ServiceDetails, AppError> {
    let errors = details_schema(service_type).check(details, "details")?;
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    decode_details(service_type, details)
}

/// Runs the envelope schema and, when the service type is recognised, the
/// matching details schema, reporting violations from both together.
fn check_with_details(envelope: &Schema, payload: &Value) -> Result<(), AppError> {
    let mut errors = envelope.check(payload, "")?;

    let service_type = payload
        .get("serviceType")
        .and_then(Value::as_str)
        .and_then(ServiceType::parse);
    if let (Some(service_type), Some(details)) = (service_type, payload.get("details")) {
        if details.is_object() {
            errors.extend(details_schema(service_type).check(details, "details")?);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn decode_details(service_type: ServiceType, details: &Value) -> Result<ServiceDetails, AppError> {
    const PREFIX: &str = "details";
    Ok(match service_type {
        ServiceType::Flight => ServiceDetails::Flight(decode(details, PREFIX)?),
        ServiceType::Hotel => ServiceDetails::Hotel(decode(details, PREFIX)?),
        ServiceType::Train => ServiceDetails::Train(decode(details, PREFIX)?),
        ServiceType::Cab => ServiceDetails::Cab(decode(details, PREFIX)?),
        ServiceType::Bus => ServiceDetails::Bus(decode(details, PREFIX)?),
        ServiceType::Logistics => ServiceDetails::Logistics(decode(details, PREFIX)?),
    })
}
