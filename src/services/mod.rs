pub mod accounts;
pub mod ai;
pub mod bookings;
pub mod chat;
pub mod pricing;
pub mod schemas;
pub mod validation;
