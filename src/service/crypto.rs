use actix_web::web;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use log::error;

use crate::errors::ApiError;

fn hash_blocking(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| {
            error!("password hashing failed: {err}");
            ApiError::InternalError
        })
}

/// A stored hash that fails to parse never verifies.
fn verify_blocking(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hashes on the blocking pool so the calling worker keeps serving requests.
pub async fn hash_password(password: String) -> Result<String, ApiError> {
    web::block(move || hash_blocking(&password))
        .await
        .map_err(|err| {
            error!("password hashing task failed: {err}");
            ApiError::InternalError
        })?
}

pub async fn verify_password(password: String, stored_hash: String) -> bool {
    match web::block(move || verify_blocking(&password, &stored_hash)).await {
        Ok(verified) => verified,
        Err(err) => {
            error!("password verification task failed: {err}");
            false
        }
    }
}
