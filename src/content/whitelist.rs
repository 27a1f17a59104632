//! Operator allow-list over exercise names.
//!
//! The raw setting is free text: names separated by newlines or commas.
//! An empty setting admits every exercise. Membership is exact; the name
//! being checked is never normalized. A setting that cannot be read admits
//! nothing: the error reaches the caller instead of an empty list.

use rusqlite::Connection;

use crate::auth::db as auth_db;
use crate::config::WHITELIST_SETTING_KEY;

/// Parsed whitelist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    names: Vec<String>,
}

impl Whitelist {
    pub fn parse(raw: &str) -> Self {
        let names = raw
            .split(['\n', ','])
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// True when no names are configured, i.e. everything is admitted.
    pub fn is_open(&self) -> bool {
        self.names.is_empty()
    }

    pub fn allows(&self, name: &str) -> bool {
        self.is_open() || self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Check `name` against the raw whitelist text.
pub fn is_allowed(name: &str, whitelist_raw: &str) -> bool {
    Whitelist::parse(whitelist_raw).allows(name)
}

/// Where the current whitelist text comes from.
///
/// Read on every admissibility check; implementations must not cache.
pub trait WhitelistSource {
    fn whitelist_raw(&self) -> rusqlite::Result<String>;

    fn allows(&self, name: &str) -> rusqlite::Result<bool> {
        Ok(is_allowed(name, &self.whitelist_raw()?))
    }
}

impl WhitelistSource for str {
    fn whitelist_raw(&self) -> rusqlite::Result<String> {
        Ok(self.to_string())
    }
}

impl WhitelistSource for String {
    fn whitelist_raw(&self) -> rusqlite::Result<String> {
        Ok(self.clone())
    }
}

/// Whitelist stored in the `app_settings` table.
pub struct SettingsWhitelist<'c> {
    conn: &'c Connection,
}

impl<'c> SettingsWhitelist<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl WhitelistSource for SettingsWhitelist<'_> {
    fn whitelist_raw(&self) -> rusqlite::Result<String> {
        Ok(auth_db::get_app_setting(self.conn, WHITELIST_SETTING_KEY)?.unwrap_or_default())
    }
}

/// Replace the stored whitelist. Blank text clears it.
pub fn save_whitelist(conn: &Connection, raw: &str) -> rusqlite::Result<()> {
    let value = if raw.trim().is_empty() { None } else { Some(raw) };
    auth_db::set_app_setting(conn, WHITELIST_SETTING_KEY, value)
}
