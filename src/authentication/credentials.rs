use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use secrecy::{ExposeSecret, SecretString};

use crate::configuration::AdminSettings;
use crate::telemetry::spawn_blocking_with_tracing;

/// Hash verified when the username does not match, to keep timings uniform
const FALLBACK_HASH: &str =
    "$argon2id$v=19$m=15000,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

/// Authentication credentials data
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Authentication error type
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

/// Check credentials against the configured administrator and return its username
#[tracing::instrument(name = "Validate credentials", skip(creds, admin))]
pub async fn validate_creds(creds: Credentials, admin: &AdminSettings) -> Result<String, AuthError> {
    let known_user = creds.username == admin.username;
    let expected_password_hash = if known_user {
        admin.password_hash.clone()
    } else {
        SecretString::from(FALLBACK_HASH.to_string())
    };

    spawn_blocking_with_tracing(move || {
        verify_password_hash(&expected_password_hash, &creds.password)
    })
    .await
    .context("Failed to spawn blocking task")??;

    if known_user {
        Ok(admin.username.clone())
    } else {
        Err(AuthError::InvalidCredentials(anyhow::anyhow!("Unknown username")))
    }
}

/// Compare a password with a PHC string
#[tracing::instrument(name = "Verify password hash", skip(password_hash, password))]
fn verify_password_hash(password_hash: &SecretString, password: &SecretString) -> Result<(), AuthError> {
    let password_hash =
        PasswordHash::new(password_hash.expose_secret()).context("Invalid stored password hash")?;

    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &password_hash)
        .context("Invalid password")
        .map_err(AuthError::InvalidCredentials)
}

/// Compute an Argon2id PHC string with a random salt
pub fn compute_password_hash(password: &SecretString) -> anyhow::Result<SecretString> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).context("Invalid Argon2 parameters")?,
    )
    .hash_password(password.expose_secret().as_bytes(), &salt)
    .context("Failed to hash password")?
    .to_string();

    Ok(SecretString::from(password_hash))
}
