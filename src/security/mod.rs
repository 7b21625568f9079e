//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → ip.rs (client IP from X-Forwarded-For or peer, normalized)
//!     → settings.rs (live whitelist / bypass switch)
//!     → credentials.rs (Basic decoding, constant-time compare)
//!     → lockout.rs (per-IP failure window and lock)
//!     → gate.rs (admit or reject)
//! ```
//!
//! # Design Decisions
//! - Fail closed: undecodable credentials are a mismatch
//! - Lockout state is memory only; a restart clears it
//! - The strict variant ignores the bypass list so the list cannot unlock itself

pub mod credentials;
pub mod gate;
pub mod ip;
pub mod lockout;
pub mod settings;

pub use credentials::Credentials;
pub use gate::{AdminGate, Admission, GateError};
pub use lockout::{AttemptRecord, AttemptStore, LockoutPolicy};
pub use settings::{SecuritySettings, SettingsStore, SettingsUpdate};
