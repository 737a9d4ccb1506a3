//! Credentials at rest.
//!
//! Two forms live side by side in the users file. The legacy form is every
//! character shifted up by three code points: an obfuscation layer only, it
//! protects nothing. New credentials are written as a salted SHA-256 digest,
//! `sha256$<salt hex>$<digest hex>`. [`verify_stored`] tells them apart by the
//! prefix, so older files keep working after the scheme is switched.

use croupier_shared::{CasinoError, CasinoResult};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const SHIFT: u32 = 3;
const SALTED_PREFIX: &str = "sha256$";
const SALT_LEN: usize = 16;

fn shift(s: &str, up: bool) -> CasinoResult<String> {
    s.chars()
        .map(|c| {
            let code = u32::from(c);
            let shifted = if up {
                code.checked_add(SHIFT)
            } else {
                code.checked_sub(SHIFT)
            };
            shifted
                .and_then(char::from_u32)
                .ok_or_else(|| CasinoError::Validation(format!("character {c:?} cannot be shifted")))
        })
        .collect()
}

pub fn obfuscate(s: &str) -> CasinoResult<String> {
    shift(s, true)
}

pub fn deobfuscate(s: &str) -> CasinoResult<String> {
    shift(s, false)
}

/// Legacy check: does `input` match the obfuscated `stored` value.
pub fn verify(input: &str, stored_obfuscated: &str) -> bool {
    deobfuscate(stored_obfuscated).is_ok_and(|plain| plain == input)
}

fn salted_digest(salt: &[u8], password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn verify_salted(input: &str, encoded: &str) -> bool {
    let Some((salt_hex, digest_hex)) = encoded.split_once('$') else {
        return false;
    };
    match hex::decode(salt_hex) {
        Ok(salt) => salted_digest(&salt, input) == digest_hex,
        Err(_) => false,
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PasswordScheme {
    /// Reversible +3 shift, byte compatible with existing users files.
    Shift,
    #[default]
    SaltedSha256,
}

impl PasswordScheme {
    /// Stored form of `password` under this scheme. Fails when the stored
    /// form would not fit in a whitespace separated field.
    pub fn seal(self, password: &str) -> CasinoResult<String> {
        match self {
            PasswordScheme::Shift => {
                let sealed = obfuscate(password)?;
                if sealed.chars().any(char::is_whitespace) {
                    return Err(CasinoError::Validation(
                        "password contains characters the shift scheme cannot store".into(),
                    ));
                }
                Ok(sealed)
            }
            PasswordScheme::SaltedSha256 => {
                let mut salt = [0u8; SALT_LEN];
                rand::thread_rng().fill_bytes(&mut salt);
                Ok(format!(
                    "{SALTED_PREFIX}{}${}",
                    hex::encode(salt),
                    salted_digest(&salt, password)
                ))
            }
        }
    }
}

/// Check `input` against a stored credential of either form.
pub fn verify_stored(input: &str, stored: &str) -> bool {
    match stored.strip_prefix(SALTED_PREFIX) {
        Some(encoded) => verify_salted(input, encoded),
        None => verify(input, stored),
    }
}

/// Passwords must survive the space separated file format and the shift.
pub fn validate_password(password: &str, min_len: usize) -> CasinoResult<()> {
    if password.chars().count() < min_len {
        return Err(CasinoError::Validation(format!(
            "password must be at least {min_len} characters"
        )));
    }
    if password.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CasinoError::Validation(
            "password must not contain spaces or control characters".into(),
        ));
    }
    Ok(())
}
