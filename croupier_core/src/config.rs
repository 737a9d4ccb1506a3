//! Table, store and session settings, loadable from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use croupier_shared::{CasinoError, CasinoResult};
use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_CAPACITY;
use crate::password::PasswordScheme;
use crate::store::DEFAULT_MAX_USERS;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CasinoConfig {
    pub store: StoreConfig,
    pub table: TableConfig,
    pub auth: AuthConfig,
    pub session: SessionConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub users_file: PathBuf,
    pub max_users: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            users_file: PathBuf::from("users.txt"),
            max_users: DEFAULT_MAX_USERS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub starting_balance: i64,
    pub min_bet: i64,
    pub max_bet: i64,
    pub history_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            min_bet: 10,
            max_bet: 1000,
            history_capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub min_password_len: usize,
    /// Registering this name asks for the activation code.
    pub admin_username: String,
    pub admin_activation_code: String,
    /// How new credentials are written. Existing ones verify either way.
    pub password_scheme: PasswordScheme,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            admin_username: "admin".to_string(),
            admin_activation_code: "TEAM16".to_string(),
            password_scheme: PasswordScheme::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub inactivity_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_secs: 300,
        }
    }
}

impl SessionConfig {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }
}

impl CasinoConfig {
    pub fn from_toml_str(text: &str) -> CasinoResult<Self> {
        toml::from_str(text).map_err(|e| CasinoError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> CasinoResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CasinoError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> CasinoResult<()> {
        let invalid = |msg: &str| Err(CasinoError::Config(msg.to_string()));
        if self.store.users_file.as_os_str().is_empty() {
            return invalid("store.users_file must not be empty");
        }
        if self.store.max_users == 0 {
            return invalid("store.max_users must be positive");
        }
        if self.table.min_bet <= 0 {
            return invalid("table.min_bet must be positive");
        }
        if self.table.min_bet > self.table.max_bet {
            return invalid("table.min_bet must not exceed table.max_bet");
        }
        if self.table.starting_balance < 0 {
            return invalid("table.starting_balance must not be negative");
        }
        if self.table.history_capacity == 0 {
            return invalid("table.history_capacity must be positive");
        }
        if self.session.inactivity_timeout_secs == 0 {
            return invalid("session.inactivity_timeout_secs must be positive");
        }
        if self.auth.admin_username.is_empty() || self.auth.admin_activation_code.is_empty() {
            return invalid("auth.admin_username and auth.admin_activation_code must be set");
        }
        Ok(())
    }
}
