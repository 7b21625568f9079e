//! Admin access gate.
//!
//! Three strengths of the same check:
//!
//! | Variant  | IP bypass | Basic credentials | Lockout |
//! |----------|-----------|-------------------|---------|
//! | `admin`  | yes       | yes               | yes     |
//! | `write`  | yes       | yes               | no      |
//! | `strict` | no        | yes               | no      |
//!
//! The gate is framework independent: it consumes a normalized IP and the raw
//! `Authorization` header and answers with an [`Admission`] or a [`GateError`].

use std::sync::Arc;
use std::time::Instant;

use crate::security::credentials::{basic_payload, Credentials};
use crate::security::lockout::{ceil_secs, AttemptStore, LockoutPolicy};
use crate::security::settings::SettingsStore;

/// Why a request was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Bypass,
    Credentials,
}

impl Admission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Admission::Bypass => "bypass",
            Admission::Credentials => "credentials",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("authentication required")]
    AuthRequired,

    #[error("too many attempts, retry in {remaining_secs}s")]
    LockedOut { remaining_secs: u64 },

    #[error("invalid credentials{}", remaining_suffix(.remaining_attempts))]
    InvalidCredentials { remaining_attempts: Option<u32> },

    #[error("{0}")]
    Configuration(String),
}

fn remaining_suffix(remaining: &Option<u32>) -> String {
    match remaining {
        Some(n) => format!(" ({n} attempts remaining)"),
        None => String::new(),
    }
}

impl GateError {
    pub fn kind(&self) -> &'static str {
        match self {
            GateError::AuthRequired => "auth_required",
            GateError::LockedOut { .. } => "locked_out",
            GateError::InvalidCredentials { .. } => "invalid_credentials",
            GateError::Configuration(_) => "configuration",
        }
    }
}

pub struct AdminGate {
    credentials: Credentials,
    attempts: AttemptStore,
    settings: Arc<SettingsStore>,
}

impl AdminGate {
    pub fn new(credentials: Credentials, policy: LockoutPolicy, settings: Arc<SettingsStore>) -> Self {
        Self {
            credentials,
            attempts: AttemptStore::new(policy),
            settings,
        }
    }

    pub fn attempts(&self) -> &AttemptStore {
        &self.attempts
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    /// Full check for the admin page.
    pub fn check_admin(&self, ip: &str, authorization: Option<&str>) -> Result<Admission, GateError> {
        self.check_admin_at(ip, authorization, Instant::now())
    }

    pub fn check_admin_at(
        &self,
        ip: &str,
        authorization: Option<&str>,
        now: Instant,
    ) -> Result<Admission, GateError> {
        if self.settings.current().bypasses(ip) {
            self.attempts.register_success(ip);
            tracing::info!(client_ip = %ip, "Admin bypass granted");
            return Ok(Admission::Bypass);
        }

        let Some(payload) = basic_payload(authorization) else {
            self.attempts.register_failure(ip, now);
            return Err(GateError::AuthRequired);
        };

        if let Some(remaining) = self.attempts.lock_remaining(ip, now) {
            return Err(GateError::LockedOut {
                remaining_secs: ceil_secs(remaining),
            });
        }

        if self.credentials.verify_basic(payload) {
            self.attempts.register_success(ip);
            tracing::info!(client_ip = %ip, username = self.credentials.username(), "Admin login succeeded");
            return Ok(Admission::Credentials);
        }

        let record = self.attempts.register_failure(ip, now);
        let remaining = self.attempts.remaining_attempts(&record);
        tracing::warn!(
            client_ip = %ip,
            failures = record.failure_count,
            remaining,
            "Admin login failed"
        );
        Err(GateError::InvalidCredentials {
            remaining_attempts: Some(remaining),
        })
    }

    /// Bypass or Basic credentials, without lockout bookkeeping.
    pub fn check_write(&self, ip: &str, authorization: Option<&str>) -> Result<Admission, GateError> {
        if self.settings.current().bypasses(ip) {
            return Ok(Admission::Bypass);
        }
        self.check_strict(authorization)
    }

    /// Basic credentials only.
    pub fn check_strict(&self, authorization: Option<&str>) -> Result<Admission, GateError> {
        let payload = basic_payload(authorization).ok_or(GateError::AuthRequired)?;
        if self.credentials.verify_basic(payload) {
            Ok(Admission::Credentials)
        } else {
            Err(GateError::InvalidCredentials {
                remaining_attempts: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::settings::{SecuritySettings, SettingsUpdate};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use std::time::Duration;

    const IP: &str = "203.0.113.7";

    fn basic(user: &str, pass: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{pass}")))
    }

    fn gate_with(settings: SecuritySettings, max_failures: u32, window_ms: u64) -> AdminGate {
        AdminGate::new(
            Credentials::new("admin", "correct horse"),
            LockoutPolicy {
                max_failures,
                window: Duration::from_millis(window_ms),
                lock: Duration::from_secs(60),
            },
            Arc::new(SettingsStore::in_memory(settings)),
        )
    }

    fn gate(max_failures: u32) -> AdminGate {
        gate_with(SecuritySettings::default(), max_failures, 60_000)
    }

    #[test]
    fn good_credentials_admit() {
        let gate = gate(3);
        let auth = basic("admin", "correct horse");
        assert_eq!(gate.check_admin(IP, Some(&auth)), Ok(Admission::Credentials));
        assert!(gate.attempts().is_empty());
    }

    #[test]
    fn missing_header_requires_auth_and_counts() {
        let gate = gate(3);
        assert_eq!(gate.check_admin(IP, None), Err(GateError::AuthRequired));
        assert_eq!(
            gate.check_admin(IP, Some("Bearer token")),
            Err(GateError::AuthRequired)
        );
        assert_eq!(gate.attempts().get(IP).unwrap().failure_count, 2);
    }

    #[test]
    fn three_failures_lock_and_fourth_is_429() {
        let gate = gate(3);
        let bad = basic("admin", "nope");
        let t0 = Instant::now();

        assert_eq!(
            gate.check_admin_at(IP, Some(&bad), t0),
            Err(GateError::InvalidCredentials { remaining_attempts: Some(2) })
        );
        assert_eq!(
            gate.check_admin_at(IP, Some(&bad), t0),
            Err(GateError::InvalidCredentials { remaining_attempts: Some(1) })
        );
        assert_eq!(
            gate.check_admin_at(IP, Some(&bad), t0),
            Err(GateError::InvalidCredentials { remaining_attempts: Some(0) })
        );

        let fourth = gate.check_admin_at(IP, Some(&basic("admin", "correct horse")), t0 + Duration::from_secs(1));
        match fourth {
            Err(GateError::LockedOut { remaining_secs }) => assert!(remaining_secs > 0 && remaining_secs <= 60),
            other => panic!("expected lockout, got {other:?}"),
        }
        // Lock checks do not consume attempts.
        assert_eq!(gate.attempts().get(IP).unwrap().failure_count, 3);
    }

    #[test]
    fn lock_expires() {
        let gate = gate(1);
        let t0 = Instant::now();
        let _ = gate.check_admin_at(IP, Some(&basic("x", "y")), t0);
        assert!(matches!(
            gate.check_admin_at(IP, Some(&basic("admin", "correct horse")), t0 + Duration::from_secs(59)),
            Err(GateError::LockedOut { .. })
        ));
        assert_eq!(
            gate.check_admin_at(IP, Some(&basic("admin", "correct horse")), t0 + Duration::from_secs(61)),
            Ok(Admission::Credentials)
        );
    }

    #[test]
    fn success_resets_count() {
        let gate = gate(5);
        let bad = basic("admin", "nope");
        let t0 = Instant::now();
        let _ = gate.check_admin_at(IP, Some(&bad), t0);
        let _ = gate.check_admin_at(IP, Some(&bad), t0);
        assert!(gate.check_admin_at(IP, Some(&basic("admin", "correct horse")), t0).is_ok());

        assert_eq!(
            gate.check_admin_at(IP, Some(&bad), t0),
            Err(GateError::InvalidCredentials { remaining_attempts: Some(4) })
        );
        assert_eq!(gate.attempts().get(IP).unwrap().failure_count, 1);
    }

    #[test]
    fn expired_window_resets_count() {
        let gate = gate_with(SecuritySettings::default(), 3, 1_000);
        let bad = basic("admin", "nope");
        let t0 = Instant::now();
        let _ = gate.check_admin_at(IP, Some(&bad), t0);
        let second = gate.check_admin_at(IP, Some(&bad), t0 + Duration::from_millis(1_500));

        assert_eq!(second, Err(GateError::InvalidCredentials { remaining_attempts: Some(2) }));
        assert_eq!(gate.attempts().get(IP).unwrap().failure_count, 1);
    }

    #[test]
    fn whitelisted_ip_bypasses_without_header() {
        let gate = gate_with(SecuritySettings::new(vec![IP.into()], true), 3, 60_000);
        let t0 = Instant::now();
        gate.attempts().register_failure(IP, t0);

        assert_eq!(gate.check_admin_at(IP, None, t0), Ok(Admission::Bypass));
        assert!(gate.attempts().get(IP).is_none());
        assert_eq!(gate.check_admin("198.51.100.1", None), Err(GateError::AuthRequired));
    }

    #[test]
    fn whitelist_without_bypass_needs_credentials() {
        let gate = gate_with(SecuritySettings::new(vec![IP.into()], false), 3, 60_000);
        assert_eq!(gate.check_admin(IP, None), Err(GateError::AuthRequired));
        assert_eq!(gate.check_write(IP, None), Err(GateError::AuthRequired));
    }

    #[test]
    fn turning_bypass_off_applies_to_next_request() {
        let gate = gate_with(SecuritySettings::new(vec![IP.into()], true), 3, 60_000);
        assert_eq!(gate.check_admin(IP, None), Ok(Admission::Bypass));

        let update = SettingsUpdate {
            ip_bypass: Some(false),
            ..Default::default()
        };
        gate.settings().apply(update).unwrap();

        assert_eq!(gate.check_admin(IP, None), Err(GateError::AuthRequired));
    }

    #[test]
    fn address_notations_share_a_record() {
        use crate::security::ip::normalize_ip;
        let gate = gate(3);
        let bad = basic("admin", "nope");
        let _ = gate.check_admin(&normalize_ip("::ffff:1.2.3.4"), Some(&bad));
        let _ = gate.check_admin(&normalize_ip("1.2.3.4"), Some(&bad));
        assert_eq!(gate.attempts().get("1.2.3.4").unwrap().failure_count, 2);

        let gate = gate_with(SecuritySettings::new(vec!["::1".into()], true), 3, 60_000);
        assert_eq!(gate.check_admin(&normalize_ip("::1"), None), Ok(Admission::Bypass));
    }

    #[test]
    fn malformed_basic_counts_as_mismatch() {
        let gate = gate(3);
        assert_eq!(
            gate.check_admin(IP, Some("Basic %%%not-base64%%%")),
            Err(GateError::InvalidCredentials { remaining_attempts: Some(2) })
        );
        let no_colon = format!("Basic {}", STANDARD.encode("admincorrect horse"));
        assert_eq!(
            gate.check_admin(IP, Some(&no_colon)),
            Err(GateError::InvalidCredentials { remaining_attempts: Some(1) })
        );
    }

    #[test]
    fn strict_ignores_bypass_and_lockout() {
        let gate = gate_with(SecuritySettings::new(vec![IP.into()], true), 1, 60_000);
        assert_eq!(gate.check_strict(None), Err(GateError::AuthRequired));
        assert_eq!(
            gate.check_strict(Some(&basic("admin", "bad"))),
            Err(GateError::InvalidCredentials { remaining_attempts: None })
        );
        assert_eq!(
            gate.check_strict(Some(&basic("admin", "correct horse"))),
            Ok(Admission::Credentials)
        );
        assert!(gate.attempts().is_empty());
    }

    #[test]
    fn write_guard_has_no_bookkeeping() {
        let gate = gate_with(SecuritySettings::new(vec![IP.into()], true), 1, 60_000);
        assert_eq!(gate.check_write(IP, None), Ok(Admission::Bypass));
        assert_eq!(gate.check_write("198.51.100.1", None), Err(GateError::AuthRequired));
        for _ in 0..3 {
            assert!(gate.check_write("198.51.100.1", Some(&basic("admin", "bad"))).is_err());
        }
        assert_eq!(
            gate.check_write("198.51.100.1", Some(&basic("admin", "correct horse"))),
            Ok(Admission::Credentials)
        );
        assert!(gate.attempts().is_empty());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            GateError::InvalidCredentials { remaining_attempts: Some(2) }.to_string(),
            "invalid credentials (2 attempts remaining)"
        );
        assert_eq!(
            GateError::InvalidCredentials { remaining_attempts: None }.to_string(),
            "invalid credentials"
        );
        assert_eq!(
            GateError::LockedOut { remaining_secs: 42 }.to_string(),
            "too many attempts, retry in 42s"
        );
    }
}
