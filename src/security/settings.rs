//! Live IP bypass settings.
//!
//! # Data Flow
//! ```text
//! admin-config.json (created from seed when missing)
//!     → load() (whitelist normalized)
//!     → ArcSwap<SecuritySettings> (read by every gate check)
//!
//! PUT /api/admin/security-config
//!     → SettingsUpdate::from_json (type checks)
//!     → apply() merges into the current value under the write lock
//!     → save() writes the whole object
//!     → reload() re-reads the file into the swap
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::persist;
use crate::security::gate::GateError;
use crate::security::ip::normalize_ip;

/// Bypass list and switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    #[serde(default)]
    pub ip_whitelist: Vec<String>,
    #[serde(default)]
    pub ip_bypass: bool,
}

impl SecuritySettings {
    pub fn new(ip_whitelist: Vec<String>, ip_bypass: bool) -> Self {
        Self {
            ip_whitelist,
            ip_bypass,
        }
        .normalized()
    }

    fn normalized(mut self) -> Self {
        self.ip_whitelist = self
            .ip_whitelist
            .iter()
            .map(|ip| normalize_ip(ip))
            .filter(|ip| !ip.is_empty())
            .collect();
        self
    }

    /// Lenient reading of a stored document: a whitelist that is not an array
    /// becomes empty, non-string entries are skipped.
    fn from_document(doc: &Value) -> Self {
        let ip_whitelist = doc
            .get("ipWhitelist")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let ip_bypass = doc.get("ipBypass").and_then(Value::as_bool).unwrap_or(false);
        Self::new(ip_whitelist, ip_bypass)
    }

    pub fn bypass_active(&self) -> bool {
        self.ip_bypass && !self.ip_whitelist.is_empty()
    }

    /// Whether `ip` (already normalized) is admitted without credentials.
    pub fn bypasses(&self, ip: &str) -> bool {
        self.bypass_active() && self.ip_whitelist.iter().any(|allowed| allowed == ip)
    }
}

/// Partial update accepted by the configuration endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub ip_whitelist: Option<Vec<String>>,
    pub ip_bypass: Option<bool>,
}

impl SettingsUpdate {
    pub fn from_json(body: &Value) -> Result<Self, GateError> {
        let mut update = Self::default();

        match body.get("ipWhitelist") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                let list = items
                    .iter()
                    .map(|item| {
                        item.as_str().map(|s| s.trim().to_string()).ok_or_else(|| {
                            GateError::Configuration("every ipWhitelist entry must be a string".into())
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                update.ip_whitelist = Some(list.into_iter().filter(|ip| !ip.is_empty()).collect());
            }
            Some(_) => {
                return Err(GateError::Configuration("ipWhitelist must be an array".into()));
            }
        }

        match body.get("ipBypass") {
            None => {}
            Some(Value::Bool(flag)) => update.ip_bypass = Some(*flag),
            Some(_) => {
                return Err(GateError::Configuration("ipBypass must be a boolean".into()));
            }
        }

        Ok(update)
    }

    fn apply_to(self, current: &SecuritySettings) -> SecuritySettings {
        SecuritySettings {
            ip_whitelist: self.ip_whitelist.unwrap_or_else(|| current.ip_whitelist.clone()),
            ip_bypass: self.ip_bypass.unwrap_or(current.ip_bypass),
        }
    }
}

/// Owner of the live settings value.
#[derive(Debug)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    current: ArcSwap<SecuritySettings>,
    /// Held from reading the snapshot until the new value is live.
    write_lock: Mutex<()>,
}

impl SettingsStore {
    /// Store without backing file.
    pub fn in_memory(settings: SecuritySettings) -> Self {
        Self {
            path: None,
            current: ArcSwap::from_pointee(settings.normalized()),
            write_lock: Mutex::new(()),
        }
    }

    /// Read `path`, writing `seed` there first when the file does not exist.
    /// Unreadable files yield an empty whitelist with bypass off.
    pub fn load(path: impl Into<PathBuf>, seed: SecuritySettings) -> Self {
        let path = path.into();
        let settings = if path.exists() {
            read_settings(&path)
        } else {
            let seed = seed.normalized();
            match persist::write_json(&path, &seed) {
                Ok(()) => tracing::info!(path = %path.display(), "Security settings file created"),
                Err(e) => tracing::error!(path = %path.display(), error = %e, "Failed to create security settings file"),
            }
            seed
        };

        tracing::info!(
            whitelist = ?settings.ip_whitelist,
            ip_bypass = settings.ip_bypass,
            "Security settings loaded"
        );

        Self {
            path: Some(path),
            current: ArcSwap::from_pointee(settings),
            write_lock: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Arc<SecuritySettings> {
        self.current.load_full()
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist `settings` as a whole, then reload the live value from disk.
    pub fn save(&self, settings: SecuritySettings) -> std::io::Result<Arc<SecuritySettings>> {
        let _guard = self.lock_writes();
        self.store(settings)
    }

    fn store(&self, settings: SecuritySettings) -> std::io::Result<Arc<SecuritySettings>> {
        match &self.path {
            Some(path) => {
                persist::write_json(path, &settings)?;
                self.reload();
            }
            None => self.current.store(Arc::new(settings.normalized())),
        }
        Ok(self.current())
    }

    pub fn reload(&self) {
        if let Some(path) = &self.path {
            self.current.store(Arc::new(read_settings(path)));
        }
    }

    /// Merge an update into the current value and save it.
    pub fn apply(&self, update: SettingsUpdate) -> std::io::Result<Arc<SecuritySettings>> {
        let _guard = self.lock_writes();
        let next = update.apply_to(&self.current());
        self.store(next)
    }
}

fn read_settings(path: &Path) -> SecuritySettings {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));

    match parsed {
        Ok(doc) => SecuritySettings::from_document(&doc),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read security settings");
            SecuritySettings::default()
        }
    }
}
