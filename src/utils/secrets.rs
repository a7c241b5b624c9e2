//! Layered secret lookup
//!
//! Workers and the LLM client need named credentials (`REDDIT_CLIENT_ID`,
//! `GOOGLE_API_KEY`, ...) that may live in the process environment or in an
//! optional TOML secrets file, either at the top level or inside a
//! `[general]` / `[env]` / `[credentials]` section. Lookup is an ordered
//! list of strategies tried in sequence; the first match wins.
//!
//! A missing credential is a data condition, not a startup failure: callers
//! resolve secrets at call time and turn absence into a structured error.

use std::collections::HashMap;
use std::path::Path;

/// Environment variable naming an optional TOML secrets file.
pub const SECRETS_FILE_ENV: &str = "HATCHUP_SECRETS_FILE";

/// Sections of the secrets file searched after the top level.
const SECRET_SECTIONS: &[&str] = &["general", "env", "credentials"];

/// An ordered set of secret sources.
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    /// Flattened key/value pairs from the secrets file, if one was loaded.
    file_values: HashMap<String, String>,
}

impl SecretStore {
    /// A store backed by the process environment only.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// A store backed by the process environment plus a TOML secrets file.
    ///
    /// An unreadable or unparsable file degrades to environment-only lookup;
    /// one bad secrets file must not take the worker down.
    pub fn with_file<P: AsRef<Path>>(path: P) -> Self {
        let mut store = Self::default();

        let content = match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to read secrets file: {}", e);
                return store;
            }
        };

        let table: toml::Table = match content.parse() {
            Ok(table) => table,
            Err(e) => {
                tracing::warn!("Failed to parse secrets file: {}", e);
                return store;
            }
        };

        // Top-level string values first, then the known sections, so a
        // top-level key shadows the same key inside a section.
        for section in SECRET_SECTIONS.iter().rev() {
            if let Some(toml::Value::Table(inner)) = table.get(*section) {
                store.absorb(inner);
            }
        }
        store.absorb(&table);

        store
    }

    /// A store using the default locations: the process environment, plus
    /// the file named by `HATCHUP_SECRETS_FILE` when set.
    pub fn from_default_locations() -> Self {
        match std::env::var(SECRETS_FILE_ENV) {
            Ok(path) if !path.is_empty() => Self::with_file(path),
            _ => Self::from_env(),
        }
    }

    fn absorb(&mut self, table: &toml::Table) {
        for (key, value) in table {
            if let toml::Value::String(s) = value {
                self.file_values.insert(key.clone(), s.clone());
            }
        }
    }

    /// Look up a named secret: process environment first, then the file.
    pub fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.file_values.get(key).cloned())
    }

    /// Look up a named secret, or a descriptive error naming the missing key.
    pub fn require(&self, key: &str) -> Result<String, String> {
        self.lookup(key)
            .ok_or_else(|| format!("Missing credential: {} is not set", key))
    }
}
