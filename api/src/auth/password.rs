//! Password hashing.
//!
//! New hashes are always Argon2id PHC strings. Hashes imported from older
//! deployments (bcrypt, werkzeug `pbkdf2:` and `scrypt:`) can still be
//! verified but are never produced here.

use argon2::{
    password_hash::{
        rand_core::OsRng, Output, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use sha2::{Sha256, Sha512};
use std::sync::OnceLock;

// werkzeug's scrypt default output length.
const WERKZEUG_SCRYPT_DKLEN: usize = 64;

#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
pub struct PasswordError(String);

impl From<argon2::password_hash::Error> for PasswordError {
    fn from(inner: argon2::password_hash::Error) -> Self {
        PasswordError(inner.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Argon2,
    Bcrypt,
    WerkzeugPbkdf2,
    WerkzeugScrypt,
    Unknown,
}

impl HashScheme {
    pub fn detect(hash: &str) -> Self {
        if hash.starts_with("$argon2") {
            HashScheme::Argon2
        } else if ["$2a$", "$2b$", "$2x$", "$2y$"]
            .iter()
            .any(|prefix| hash.starts_with(prefix))
        {
            HashScheme::Bcrypt
        } else if hash.starts_with("pbkdf2:") {
            HashScheme::WerkzeugPbkdf2
        } else if hash.starts_with("scrypt:") {
            HashScheme::WerkzeugScrypt
        } else {
            HashScheme::Unknown
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// Checks `password` against a stored hash of any recognized scheme.
///
/// Never errors: a hash that cannot be parsed verifies as false and is
/// reported through `tracing`.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match check_password(password, hash) {
        Ok(matches) => matches,
        Err(reason) => {
            let scheme = HashScheme::detect(hash);
            tracing::warn!(?scheme, %reason, "stored password hash could not be checked");
            false
        }
    }
}

/// Spends one Argon2 verification on a login with no matching account.
/// Always false.
pub fn verify_unknown_account(password: &str) -> bool {
    static PLACEHOLDER: OnceLock<Option<String>> = OnceLock::new();
    if let Some(hash) = PLACEHOLDER.get_or_init(|| hash_password("docvault-placeholder").ok()) {
        let _ = verify_argon2(password, hash);
    }
    false
}

/// True when the stored hash should be replaced with a canonical one.
pub fn needs_rehash(hash: &str) -> bool {
    HashScheme::detect(hash) != HashScheme::Argon2
}

// Failure reasons must never carry hash material; they end up in the log.
fn check_password(password: &str, hash: &str) -> Result<bool, String> {
    match HashScheme::detect(hash) {
        HashScheme::Argon2 => verify_argon2(password, hash),
        HashScheme::Bcrypt => {
            bcrypt::verify(password, hash).map_err(|_| "malformed bcrypt hash".to_string())
        }
        HashScheme::WerkzeugPbkdf2 => verify_werkzeug_pbkdf2(password, hash),
        HashScheme::WerkzeugScrypt => verify_werkzeug_scrypt(password, hash),
        HashScheme::Unknown => Err("unrecognized hash format".to_string()),
    }
}

fn verify_argon2(password: &str, hash: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Splits `method$salt$hexdigest` into its parts.
fn split_werkzeug(hash: &str) -> Result<(&str, &str, Vec<u8>), String> {
    let mut parts = hash.splitn(3, '$');
    let (Some(method), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next()) else {
        return Err("expected method$salt$digest".to_string());
    };
    let expected = hex::decode(digest).map_err(|_| "digest is not hex".to_string())?;
    Ok((method, salt, expected))
}

fn verify_werkzeug_pbkdf2(password: &str, hash: &str) -> Result<bool, String> {
    let (method, salt, expected) = split_werkzeug(hash)?;
    let params: Vec<&str> = method.split(':').collect();
    let [_, digest_name, iterations] = params.as_slice() else {
        return Err(format!("unsupported pbkdf2 method {method:?}"));
    };
    let iterations: u32 = iterations
        .parse()
        .map_err(|_| format!("bad pbkdf2 iteration count {iterations:?}"))?;

    let (password, salt) = (password.as_bytes(), salt.as_bytes());
    let mut computed = vec![0u8; expected.len()];
    match *digest_name {
        "sha256" => pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut computed),
        "sha512" => pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut computed),
        other => return Err(format!("unsupported pbkdf2 digest {other:?}")),
    }
    digests_match(&computed, &expected)
}

fn verify_werkzeug_scrypt(password: &str, hash: &str) -> Result<bool, String> {
    let (method, salt, expected) = split_werkzeug(hash)?;
    let params: Vec<&str> = method.split(':').collect();
    let [_, n, r, p] = params.as_slice() else {
        return Err(format!("unsupported scrypt method {method:?}"));
    };
    let n: u64 = n.parse().map_err(|_| format!("bad scrypt n {n:?}"))?;
    let r: u32 = r.parse().map_err(|_| format!("bad scrypt r {r:?}"))?;
    let p: u32 = p.parse().map_err(|_| format!("bad scrypt p {p:?}"))?;
    if n < 2 || !n.is_power_of_two() {
        return Err(format!("scrypt n must be a power of two, got {n}"));
    }
    if expected.len() != WERKZEUG_SCRYPT_DKLEN {
        return Err(format!("scrypt digest has {} bytes", expected.len()));
    }

    let params = scrypt::Params::new(n.trailing_zeros() as u8, r, p, WERKZEUG_SCRYPT_DKLEN)
        .map_err(|e| e.to_string())?;
    let mut computed = vec![0u8; WERKZEUG_SCRYPT_DKLEN];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut computed)
        .map_err(|e| e.to_string())?;
    digests_match(&computed, &expected)
}

// `Output` compares in constant time.
fn digests_match(computed: &[u8], expected: &[u8]) -> Result<bool, String> {
    let computed = Output::new(computed).map_err(|e| e.to_string())?;
    let expected = Output::new(expected).map_err(|e| e.to_string())?;
    Ok(computed == expected)
}
