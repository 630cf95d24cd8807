pub mod booking;
pub mod chat;
pub mod destination;
pub mod service;
pub mod user;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use chat::{ChatMessage, ChatRole, NewChatMessage};
pub use destination::{Destination, NewDestination};
pub use service::{ServiceDetails, ServiceType};
pub use user::{NewUser, PublicUser, Registration, UniqueField, User};
