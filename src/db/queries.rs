use anyhow::{anyhow, Context};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode};

use crate::db::InsertUserError;
use crate::models::{
    Booking, BookingStatus, ChatMessage, ChatRole, Destination, NewBooking, NewChatMessage,
    NewDestination, NewUser, ServiceType, UniqueField, User,
};

const USER_COLUMNS: &str = "id, username, password_hash, email, full_name, phone";
const BOOKING_COLUMNS: &str =
    "id, user_id, service_type, status, details, total_price, created_at";
const DESTINATION_COLUMNS: &str = "id, name, country, description, rating, image_url, \
     popular_tag, recommended_days, price_from, featured";
const CHAT_COLUMNS: &str = "id, user_id, role, content, timestamp";

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid stored timestamp: {raw}"))?;
    Ok(ts.with_timezone(&Utc))
}

// ── Users ──

/// Inserts a user unless the username or email is already taken. The checks
/// and the insert share one transaction; the UNIQUE constraints back them up.
pub fn create_user(conn: &mut Connection, user: &NewUser) -> Result<User, InsertUserError> {
    let tx = conn.transaction().context("failed to begin transaction")?;

    let username_taken: bool = tx
        .query_row(
            "SELECT COUNT(*) > 0 FROM users WHERE username = ?1",
            params![user.username],
            |row| row.get(0),
        )
        .context("failed to check username")?;
    if username_taken {
        return Err(InsertUserError::Taken(UniqueField::Username));
    }

    let email_taken: bool = tx
        .query_row(
            "SELECT COUNT(*) > 0 FROM users WHERE email = ?1",
            params![user.email],
            |row| row.get(0),
        )
        .context("failed to check email")?;
    if email_taken {
        return Err(InsertUserError::Taken(UniqueField::Email));
    }

    let inserted = tx.execute(
        "INSERT INTO users (username, password_hash, email, full_name, phone)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user.username,
            user.password_hash,
            user.email,
            user.full_name,
            user.phone,
        ],
    );

    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(err, Some(msg)))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            let field = if msg.contains("users.username") {
                UniqueField::Username
            } else {
                UniqueField::Email
            };
            return Err(InsertUserError::Taken(field));
        }
        Err(e) => return Err(anyhow::Error::from(e).context("failed to insert user").into()),
    }

    let id = tx.last_insert_rowid();
    tx.commit().context("failed to commit user")?;

    Ok(User {
        id,
        username: user.username.clone(),
        password_hash: user.password_hash.clone(),
        email: user.email.clone(),
        full_name: user.full_name.clone(),
        phone: user.phone.clone(),
    })
}

pub fn get_user(conn: &Connection, id: i64) -> anyhow::Result<Option<User>> {
    find_user(conn, "id", &id)
}

pub fn get_user_by_username(conn: &Connection, username: &str) -> anyhow::Result<Option<User>> {
    find_user(conn, "username", &username)
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    find_user(conn, "email", &email)
}

fn find_user(
    conn: &Connection,
    column: &str,
    value: &dyn rusqlite::types::ToSql,
) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
        [value],
        |row| {
            Ok(User {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                email: row.get(3)?,
                full_name: row.get(4)?,
                phone: row.get(5)?,
            })
        },
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &NewBooking) -> anyhow::Result<Booking> {
    let details = serde_json::to_string(&booking.details)?;
    let created_at = format_timestamp(&Utc::now());

    conn.execute(
        "INSERT INTO bookings (user_id, service_type, status, details, total_price, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            booking.user_id,
            booking.service_type.as_str(),
            booking.status.as_str(),
            details,
            booking.total_price,
            created_at,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_booking(conn, id)?.ok_or_else(|| anyhow!("booking {id} missing after insert"))
}

pub fn get_booking(conn: &Connection, id: i64) -> anyhow::Result<Option<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id], |row| Ok(parse_booking_row(row)))?;
    rows.next().transpose()?.transpose()
}

pub fn get_user_bookings(conn: &Connection, user_id: i64) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = ?1 ORDER BY id ASC"
    ))?;

    let rows = stmt.query_map(params![user_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
) -> anyhow::Result<Option<Booking>> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    if count == 0 {
        return Ok(None);
    }
    get_booking(conn, id)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let service_type: String = row.get(2)?;
    let status: String = row.get(3)?;
    let details: String = row.get(4)?;
    let created_at: String = row.get(6)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        service_type: ServiceType::parse(&service_type)
            .ok_or_else(|| anyhow!("unknown service type in bookings row: {service_type}"))?,
        status: BookingStatus::parse(&status)
            .ok_or_else(|| anyhow!("unknown booking status in bookings row: {status}"))?,
        details: serde_json::from_str(&details).context("invalid booking details")?,
        total_price: row.get(5)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

// ── Destinations ──

pub fn create_destination(
    conn: &Connection,
    destination: &NewDestination,
) -> anyhow::Result<Destination> {
    conn.execute(
        "INSERT INTO destinations (name, country, description, rating, image_url, popular_tag, recommended_days, price_from, featured)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            destination.name,
            destination.country,
            destination.description,
            destination.rating,
            destination.image_url,
            destination.popular_tag,
            destination.recommended_days,
            destination.price_from,
            destination.featured,
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_destination(conn, id)?.ok_or_else(|| anyhow!("destination {id} missing after insert"))
}

pub fn get_all_destinations(conn: &Connection) -> anyhow::Result<Vec<Destination>> {
    list_destinations(conn, "")
}

pub fn get_featured_destinations(conn: &Connection) -> anyhow::Result<Vec<Destination>> {
    list_destinations(conn, "WHERE featured = 1")
}

pub fn get_destination(conn: &Connection, id: i64) -> anyhow::Result<Option<Destination>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DESTINATION_COLUMNS} FROM destinations WHERE id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![id], parse_destination_row)?;
    Ok(rows.next().transpose()?)
}

fn list_destinations(conn: &Connection, filter: &str) -> anyhow::Result<Vec<Destination>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DESTINATION_COLUMNS} FROM destinations {filter} ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map([], parse_destination_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn parse_destination_row(row: &rusqlite::Row) -> rusqlite::Result<Destination> {
    Ok(Destination {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        description: row.get(3)?,
        rating: row.get(4)?,
        image_url: row.get(5)?,
        popular_tag: row.get(6)?,
        recommended_days: row.get(7)?,
        price_from: row.get(8)?,
        featured: row.get(9)?,
    })
}

// ── Chat ──

pub fn save_chat_message(
    conn: &Connection,
    message: &NewChatMessage,
) -> anyhow::Result<ChatMessage> {
    let timestamp = format_timestamp(&Utc::now());

    conn.execute(
        "INSERT INTO chat_messages (user_id, role, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![
            message.user_id,
            message.role.as_str(),
            message.content,
            timestamp
        ],
    )?;

    Ok(ChatMessage {
        id: conn.last_insert_rowid(),
        user_id: message.user_id,
        role: message.role,
        content: message.content.clone(),
        timestamp: parse_timestamp(&timestamp)?,
    })
}

pub fn get_user_chat_history(conn: &Connection, user_id: i64) -> anyhow::Result<Vec<ChatMessage>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CHAT_COLUMNS} FROM chat_messages WHERE user_id = ?1 ORDER BY timestamp ASC, id ASC"
    ))?;

    let rows = stmt.query_map(params![user_id], |row| {
        let role: String = row.get(2)?;
        let timestamp: String = row.get(4)?;
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, Option<i64>>(1)?,
            role,
            row.get::<_, String>(3)?,
            timestamp,
        ))
    })?;

    let mut messages = vec![];
    for row in rows {
        let (id, user_id, role, content, timestamp) = row?;
        messages.push(ChatMessage {
            id,
            user_id,
            role: ChatRole::parse(&role)
                .ok_or_else(|| anyhow!("unknown chat role in chat_messages row: {role}"))?,
            content,
            timestamp: parse_timestamp(&timestamp)?,
        });
    }
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "salt$hash".to_string(),
            email: email.to_string(),
            full_name: None,
            phone: None,
        }
    }

    fn new_booking(user_id: i64) -> NewBooking {
        NewBooking {
            user_id,
            service_type: ServiceType::Cab,
            status: BookingStatus::Pending,
            details: serde_json::json!({"pickup": "Airport", "dropoff": "Hotel"}),
            total_price: 30,
        }
    }

    #[test]
    fn test_user_ids_start_at_one_and_increase() {
        let mut conn = conn();
        let a = create_user(&mut conn, &new_user("ana", "ana@example.com")).unwrap();
        let b = create_user(&mut conn, &new_user("ben", "ben@example.com")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(get_user(&conn, 2).unwrap().unwrap().username, "ben");
    }

    #[test]
    fn test_create_user_reports_taken_username_before_email() {
        let mut conn = conn();
        create_user(&mut conn, &new_user("ana", "ana@example.com")).unwrap();

        match create_user(&mut conn, &new_user("ana", "ana@example.com")) {
            Err(InsertUserError::Taken(UniqueField::Username)) => {}
            other => panic!("expected username conflict, got {other:?}"),
        }
        match create_user(&mut conn, &new_user("other", "ana@example.com")) {
            Err(InsertUserError::Taken(UniqueField::Email)) => {}
            other => panic!("expected email conflict, got {other:?}"),
        }
        // A rejected insert must not consume an id.
        let next = create_user(&mut conn, &new_user("cy", "cy@example.com")).unwrap();
        assert_eq!(next.id, 2);
    }

    #[test]
    fn test_user_lookups_missing_return_none() {
        let conn = conn();
        assert!(get_user(&conn, 7).unwrap().is_none());
        assert!(get_user_by_username(&conn, "nobody").unwrap().is_none());
        assert!(get_user_by_email(&conn, "nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_booking_round_trip() {
        let conn = conn();
        let created = create_booking(&conn, &new_booking(4)).unwrap();
        assert_eq!(created.id, 1);

        let fetched = get_booking(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_status_update_missing_booking_is_none() {
        let conn = conn();
        assert!(update_booking_status(&conn, 42, BookingStatus::Confirmed)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_status_update_keeps_other_fields() {
        let conn = conn();
        let created = create_booking(&conn, &new_booking(1)).unwrap();
        let updated = update_booking_status(&conn, created.id, BookingStatus::Confirmed)
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, BookingStatus::Confirmed);
        assert_eq!(updated.details, created.details);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.total_price, created.total_price);
    }

    #[test]
    fn test_user_bookings_filtered_by_user() {
        let conn = conn();
        create_booking(&conn, &new_booking(1)).unwrap();
        create_booking(&conn, &new_booking(2)).unwrap();
        create_booking(&conn, &new_booking(1)).unwrap();

        let ids: Vec<i64> = get_user_bookings(&conn, 1)
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(get_user_bookings(&conn, 99).unwrap().is_empty());
    }

    #[test]
    fn test_featured_destinations_filter() {
        let conn = conn();
        for (name, featured) in [("Bali", true), ("Oslo", false)] {
            create_destination(
                &conn,
                &NewDestination {
                    name: name.to_string(),
                    country: "X".to_string(),
                    description: "Somewhere".to_string(),
                    rating: 45,
                    image_url: "https://img".to_string(),
                    popular_tag: None,
                    recommended_days: None,
                    price_from: Some(500),
                    featured,
                },
            )
            .unwrap();
        }

        assert_eq!(get_all_destinations(&conn).unwrap().len(), 2);
        let featured = get_featured_destinations(&conn).unwrap();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].name, "Bali");
        assert!(get_destination(&conn, 3).unwrap().is_none());
    }

    #[test]
    fn test_chat_history_is_per_user_and_ascending() {
        let conn = conn();
        for (user_id, role, content) in [
            (Some(1), ChatRole::User, "hi"),
            (Some(1), ChatRole::Assistant, "hello"),
            (None, ChatRole::User, "anonymous"),
            (Some(2), ChatRole::User, "other"),
            (Some(1), ChatRole::User, "again"),
        ] {
            save_chat_message(
                &conn,
                &NewChatMessage {
                    user_id,
                    role,
                    content: content.to_string(),
                },
            )
            .unwrap();
        }

        let history = get_user_chat_history(&conn, 1).unwrap();
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "hello", "again"]);
        assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }
}
