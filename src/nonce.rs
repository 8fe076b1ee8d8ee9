//! Per-form anti-forgery tokens.
//!
//! A token is an HMAC over the form action, the admin it was issued to and a
//! time tick of half the configured lifetime, so a token stays valid for at
//! least half and at most the whole lifetime.

use std::time;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

/// Forms protected by a token, each in its own namespace
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NonceAction {
    SettingsForm,
    License,
}

impl NonceAction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::SettingsForm => "madmimi-settings-form",
            Self::License => "madmimi-license",
        }
    }
}

/// Issues and verifies form tokens
#[derive(Clone)]
pub struct NonceIssuer {
    secret: SecretString,
    lifetime: time::Duration,
}

impl NonceIssuer {
    pub fn new(secret: SecretString, lifetime: time::Duration) -> Self {
        Self { secret, lifetime }
    }

    /// Issue a token for `action` bound to `owner`
    pub fn issue(&self, action: NonceAction, owner: &str) -> String {
        self.issue_at(action, owner, Utc::now())
    }

    /// Check a submitted token
    pub fn verify(&self, action: NonceAction, owner: &str, token: &str) -> bool {
        self.verify_at(action, owner, token, Utc::now())
    }

    fn issue_at(&self, action: NonceAction, owner: &str, now: DateTime<Utc>) -> String {
        hex::encode(self.mac(action, owner, self.tick(now)).finalize().into_bytes())
    }

    fn verify_at(&self, action: NonceAction, owner: &str, token: &str, now: DateTime<Utc>) -> bool {
        let Ok(tag) = hex::decode(token.trim()) else {
            return false;
        };
        let tick = self.tick(now);
        // Tokens from the previous tick are still accepted
        [tick, tick - 1]
            .into_iter()
            .any(|t| self.mac(action, owner, t).verify_slice(&tag).is_ok())
    }

    fn tick(&self, now: DateTime<Utc>) -> i64 {
        let half_life = i64::try_from(self.lifetime.as_secs() / 2).unwrap_or(i64::MAX).max(1);
        now.timestamp().div_euclid(half_life)
    }

    fn mac(&self, action: NonceAction, owner: &str, tick: i64) -> Hmac<Sha256> {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take a key of any size");
        mac.update(format!("{tick}|{}|{owner}", action.as_str()).as_bytes());
        mac
    }
}
