pub mod migrations;
pub mod queries;
pub mod seed;

use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use rusqlite::Connection;

use crate::models::{
    Booking, BookingStatus, ChatMessage, Destination, NewBooking, NewChatMessage, NewDestination,
    NewUser, UniqueField, User,
};

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}

#[derive(Debug, thiserror::Error)]
pub enum InsertUserError {
    #[error("{} already exists", .0.label())]
    Taken(UniqueField),

    #[error(transparent)]
    Database(#[from] anyhow::Error),
}

/// Persistence for users, bookings, destinations and chat messages.
///
/// Ids are assigned by the store, start at 1 per entity type and are never
/// reused. Lookups by id report absence as `Ok(None)`. No shape validation
/// happens here; callers hand in already-validated values.
pub trait Store: Send + Sync {
    /// Atomic insert-if-absent on both username and email, username checked first.
    fn create_user(&self, user: NewUser) -> Result<User, InsertUserError>;
    fn get_user(&self, id: i64) -> anyhow::Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// Stores `status` exactly as given and stamps `created_at`.
    fn create_booking(&self, booking: NewBooking) -> anyhow::Result<Booking>;
    fn get_booking(&self, id: i64) -> anyhow::Result<Option<Booking>>;
    fn get_user_bookings(&self, user_id: i64) -> anyhow::Result<Vec<Booking>>;
    fn update_booking_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> anyhow::Result<Option<Booking>>;

    fn create_destination(&self, destination: NewDestination) -> anyhow::Result<Destination>;
    fn get_all_destinations(&self) -> anyhow::Result<Vec<Destination>>;
    fn get_featured_destinations(&self) -> anyhow::Result<Vec<Destination>>;
    fn get_destination(&self, id: i64) -> anyhow::Result<Option<Destination>>;

    fn save_chat_message(&self, message: NewChatMessage) -> anyhow::Result<ChatMessage>;
    /// Ascending by timestamp, ties broken by id.
    fn get_user_chat_history(&self, user_id: i64) -> anyhow::Result<Vec<ChatMessage>>;
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &str) -> anyhow::Result<Self> {
        Ok(Self::new(init_db(path)?))
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database connection lock poisoned"))
    }
}

impl Store for SqliteStore {
    fn create_user(&self, user: NewUser) -> Result<User, InsertUserError> {
        let mut db = self.lock()?;
        queries::create_user(&mut db, &user)
    }

    fn get_user(&self, id: i64) -> anyhow::Result<Option<User>> {
        queries::get_user(&*self.lock()?, id)
    }

    fn get_user_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        queries::get_user_by_username(&*self.lock()?, username)
    }

    fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        queries::get_user_by_email(&*self.lock()?, email)
    }

    fn create_booking(&self, booking: NewBooking) -> anyhow::Result<Booking> {
        queries::create_booking(&*self.lock()?, &booking)
    }

    fn get_booking(&self, id: i64) -> anyhow::Result<Option<Booking>> {
        queries::get_booking(&*self.lock()?, id)
    }

    fn get_user_bookings(&self, user_id: i64) -> anyhow::Result<Vec<Booking>> {
        queries::get_user_bookings(&*self.lock()?, user_id)
    }

    fn update_booking_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> anyhow::Result<Option<Booking>> {
        queries::update_booking_status(&*self.lock()?, id, status)
    }

    fn create_destination(&self, destination: NewDestination) -> anyhow::Result<Destination> {
        queries::create_destination(&*self.lock()?, &destination)
    }

    fn get_all_destinations(&self) -> anyhow::Result<Vec<Destination>> {
        queries::get_all_destinations(&*self.lock()?)
    }

    fn get_featured_destinations(&self) -> anyhow::Result<Vec<Destination>> {
        queries::get_featured_destinations(&*self.lock()?)
    }

    fn get_destination(&self, id: i64) -> anyhow::Result<Option<Destination>> {
        queries::get_destination(&*self.lock()?, id)
    }

    fn save_chat_message(&self, message: NewChatMessage) -> anyhow::Result<ChatMessage> {
        queries::save_chat_message(&*self.lock()?, &message)
    }

    fn get_user_chat_history(&self, user_id: i64) -> anyhow::Result<Vec<ChatMessage>> {
        queries::get_user_chat_history(&*self.lock()?, user_id)
    }
}
