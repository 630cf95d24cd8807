use anyhow::anyhow;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;

use crate::db::{InsertUserError, Store};
use crate::errors::AppError;
use crate::models::{NewUser, PublicUser};
use crate::services::schemas;

type HmacSha256 = Hmac<Sha256>;

/// Hashes with a fresh random salt. Stored form is `salt$base64(hmac)`.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let digest = keyed(&salt, password)?.finalize().into_bytes();
    Ok(format!("{salt}${}", STANDARD.encode(digest)))
}

/// Constant-time comparison against a value produced by [`hash_password`].
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, encoded)) = stored.split_once('$') else {
        return false;
    };
    let Ok(expected) = STANDARD.decode(encoded) else {
        return false;
    };
    match keyed(salt, password) {
        Ok(mac) => mac.verify_slice(&expected).is_ok(),
        Err(_) => false,
    }
}

fn keyed(salt: &str, password: &str) -> anyhow::Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(salt.as_bytes())
        .map_err(|e| anyhow!("failed to key password hash: {e}"))?;
    mac.update(password.as_bytes());
    Ok(mac)
}

pub fn register(store: &dyn Store, payload: &Value) -> Result<PublicUser, AppError> {
    let registration = schemas::parse_registration(payload)?;

    let new_user = NewUser {
        password_hash: hash_password(&registration.password)?,
        username: registration.username,
        email: registration.email,
        full_name: registration.full_name,
        phone: registration.phone,
    };

    match store.create_user(new_user) {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "registered user");
            Ok(user.into())
        }
        Err(InsertUserError::Taken(field)) => {
            tracing::info!(field = field.label(), "registration rejected: already taken");
            Err(AppError::Conflict(format!("{} already exists", field.label())))
        }
        Err(InsertUserError::Database(e)) => Err(e.into()),
    }
}

/// Missing and wrong credentials produce the same error.
pub fn login(
    store: &dyn Store,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<PublicUser, AppError> {
    let (Some(username), Some(password)) = (
        username.filter(|u| !u.is_empty()),
        password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::InvalidArgument(
            "Username and password are required".to_string(),
        ));
    };

    let user = store
        .get_user_by_username(username)?
        .ok_or(AppError::Authentication)?;

    if !verify_password(password, &user.password_hash) {
        tracing::info!(user_id = user.id, "login rejected");
        return Err(AppError::Authentication);
    }

    Ok(user.into())
}

pub fn get_user(store: &dyn Store, id: i64) -> Result<PublicUser, AppError> {
    store
        .get_user(id)?
        .map(PublicUser::from)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
