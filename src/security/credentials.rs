//! HTTP Basic credentials.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

const BASIC_PREFIX: &str = "Basic ";

/// Standard alphabet; trailing `=` padding optional on decode.
const BASIC_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Configured admin identity.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Check a decoded pair. Both comparisons always run.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(username, &self.username);
        let pass_ok = constant_time_eq(password, &self.password);
        user_ok & pass_ok
    }

    /// Check the payload of a `Basic` authorization header.
    /// Undecodable payloads never match.
    pub fn verify_basic(&self, payload: &str) -> bool {
        match decode_basic(payload) {
            Some((username, password)) => self.matches(&username, &password),
            None => false,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Return the base64 payload when the header uses the Basic scheme.
pub fn basic_payload(authorization: Option<&str>) -> Option<&str> {
    authorization.and_then(|h| h.strip_prefix(BASIC_PREFIX))
}

/// Decode `user:pass`, splitting at the first colon.
pub fn decode_basic(payload: &str) -> Option<(String, String)> {
    let bytes = BASIC_ENGINE.decode(payload.trim()).ok()?;
    let decoded = String::from_utf8_lossy(&bytes);
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Compare two strings without an early exit on the first differing byte.
///
/// Lengths are compared first; equal-length inputs are walked end to end and
/// the per-position results are folded with a bitwise AND.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut ok: u8 = 1;
    for (x, y) in a.iter().zip(b.iter()) {
        ok &= (x == y) as u8;
    }
    std::hint::black_box(ok) == 1
}
