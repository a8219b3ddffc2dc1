use chrono::FixedOffset;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::reminder::TriggerTime;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const STATIC_DIR: &str = "STATIC_DIR";
    /// `file`, `mongo` or `none`. Unset picks `mongo` when MONGO_URI is present.
    pub const STORAGE_BACKEND: &str = "STORAGE_BACKEND";
    pub const DATA_FILE: &str = "DATA_FILE";
    pub const MONGO_URI: &str = "MONGO_URI";
    pub const MONGO_DB: &str = "MONGO_DB";
    pub const MY_EMAIL: &str = "MY_EMAIL";
    pub const MY_PASSWORD: &str = "MY_PASSWORD";
    pub const TO_EMAIL: &str = "TO_EMAIL";
    pub const SMTP_HOST: &str = "SMTP_HOST";
    pub const SMTP_PORT: &str = "SMTP_PORT";
    /// Comma-separated `HH:MM` list, e.g. "17:00,21:00"
    pub const REMINDER_TIMES: &str = "REMINDER_TIMES";
    /// Fixed offset such as "+05:30". Unset means the process's local time.
    pub const REMINDER_UTC_OFFSET: &str = "REMINDER_UTC_OFFSET";
    pub const REMINDER_POLL_SECS: &str = "REMINDER_POLL_SECS";
    pub const REMINDER_BACKOFF_SECS: &str = "REMINDER_BACKOFF_SECS";
    /// Optional dotenv-format file holding credentials, loaded after `.env`
    pub const SECRETS_FILE: &str = "SECRETS_FILE";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const STATIC_DIR: &str = "./static";
    pub const DATA_FILE: &str = "student_data.json";
    pub const MONGO_DB: &str = "planner";
    pub const SMTP_HOST: &str = "smtp.gmail.com";
    pub const SMTP_PORT: u16 = 465;
    pub const REMINDER_TIMES: &str = "17:00,21:00";
    pub const REMINDER_POLL_SECS: u64 = 30;
    /// Longest poll that still lands in every trigger minute
    pub const MAX_REMINDER_POLL_SECS: u64 = 59;
    pub const REMINDER_BACKOFF_SECS: u64 = 60;
}

/// Load the optional secrets file named by SECRETS_FILE.
/// Call after `dotenv()` and logger init so failures are visible.
pub fn load_secrets_file() {
    let Ok(path) = env::var(env_vars::SECRETS_FILE) else {
        return;
    };
    match dotenv::from_path(&path) {
        Ok(()) => log::info!("[CONFIG] Loaded credentials from {}", path),
        Err(e) => log::warn!("[CONFIG] Failed to load secrets file {}: {}", path, e),
    }
}

/// Which persistence backend to build at startup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageConfig {
    File { path: PathBuf },
    Mongo { uri: Option<String>, database: String },
    Disabled { reason: String },
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub sender: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl MailConfig {
    /// Sender, credential and recipient are all present
    pub fn is_complete(&self) -> bool {
        self.sender.is_some() && self.password.is_some() && self.recipient.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct ReminderConfig {
    /// Daily trigger instants, sorted and de-duplicated
    pub trigger_times: Vec<TriggerTime>,
    pub utc_offset: Option<FixedOffset>,
    pub poll_interval: Duration,
    pub backoff: Duration,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            trigger_times: parse_trigger_times(defaults::REMINDER_TIMES).unwrap_or_default(),
            utc_offset: None,
            poll_interval: Duration::from_secs(defaults::REMINDER_POLL_SECS),
            backoff: Duration::from_secs(defaults::REMINDER_BACKOFF_SECS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub static_dir: PathBuf,
    pub storage: StorageConfig,
    pub mail: MailConfig,
    pub reminder: ReminderConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get(env_vars::PORT) {
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("PORT must be a valid number, got '{}'", raw))?,
            None => defaults::PORT,
        };

        let mail = MailConfig {
            sender: get(env_vars::MY_EMAIL),
            password: get(env_vars::MY_PASSWORD),
            recipient: get(env_vars::TO_EMAIL),
            smtp_host: get(env_vars::SMTP_HOST).unwrap_or_else(|| defaults::SMTP_HOST.to_string()),
            smtp_port: parse_or(env_vars::SMTP_PORT, get(env_vars::SMTP_PORT), defaults::SMTP_PORT),
        };
        if !mail.is_complete() {
            log::warn!("[CONFIG] Email credentials are missing, reminder emails are disabled");
        }

        Ok(Self {
            port,
            static_dir: PathBuf::from(
                get(env_vars::STATIC_DIR).unwrap_or_else(|| defaults::STATIC_DIR.to_string()),
            ),
            storage: storage_config(&get),
            mail,
            reminder: reminder_config(&get),
        })
    }
}

fn storage_config(get: &dyn Fn(&str) -> Option<String>) -> StorageConfig {
    let mongo_uri = get(env_vars::MONGO_URI);
    let backend = get(env_vars::STORAGE_BACKEND)
        .map(|b| b.to_lowercase())
        .unwrap_or_else(|| if mongo_uri.is_some() { "mongo" } else { "file" }.to_string());

    match backend.as_str() {
        "file" => StorageConfig::File {
            path: PathBuf::from(get(env_vars::DATA_FILE).unwrap_or_else(|| defaults::DATA_FILE.to_string())),
        },
        "mongo" | "mongodb" => StorageConfig::Mongo {
            uri: mongo_uri,
            database: get(env_vars::MONGO_DB).unwrap_or_else(|| defaults::MONGO_DB.to_string()),
        },
        "none" => StorageConfig::Disabled {
            reason: "storage disabled by STORAGE_BACKEND=none".to_string(),
        },
        other => {
            log::warn!("[CONFIG] Unknown STORAGE_BACKEND '{}', storage is unavailable", other);
            StorageConfig::Disabled {
                reason: format!("unknown storage backend '{}'", other),
            }
        }
    }
}

fn reminder_config(get: &dyn Fn(&str) -> Option<String>) -> ReminderConfig {
    let mut config = ReminderConfig::default();

    if let Some(raw) = get(env_vars::REMINDER_TIMES) {
        match parse_trigger_times(&raw) {
            Ok(times) if !times.is_empty() => config.trigger_times = times,
            Ok(_) => log::warn!("[CONFIG] REMINDER_TIMES is empty, using {}", defaults::REMINDER_TIMES),
            Err(e) => log::warn!("[CONFIG] Invalid REMINDER_TIMES ({}), using {}", e, defaults::REMINDER_TIMES),
        }
    }

    if let Some(raw) = get(env_vars::REMINDER_UTC_OFFSET) {
        match parse_utc_offset(&raw) {
            Some(offset) => config.utc_offset = Some(offset),
            None => log::warn!("[CONFIG] Invalid REMINDER_UTC_OFFSET '{}', using local time", raw),
        }
    }

    let poll = parse_or(
        env_vars::REMINDER_POLL_SECS,
        get(env_vars::REMINDER_POLL_SECS),
        defaults::REMINDER_POLL_SECS,
    );
    let backoff = parse_or(
        env_vars::REMINDER_BACKOFF_SECS,
        get(env_vars::REMINDER_BACKOFF_SECS),
        defaults::REMINDER_BACKOFF_SECS,
    );
    if poll > defaults::MAX_REMINDER_POLL_SECS {
        log::warn!(
            "[CONFIG] REMINDER_POLL_SECS={} would skip trigger minutes, using {}",
            poll,
            defaults::MAX_REMINDER_POLL_SECS
        );
    }
    config.poll_interval = Duration::from_secs(poll.clamp(1, defaults::MAX_REMINDER_POLL_SECS));
    config.backoff = Duration::from_secs(backoff.max(1));

    config
}

fn parse_or<T: FromStr + Copy>(name: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("[CONFIG] Invalid {} '{}', using default", name, raw);
            default
        }),
        None => default,
    }
}

/// Parse "17:00, 21:00" into sorted, de-duplicated trigger times
pub fn parse_trigger_times(raw: &str) -> Result<Vec<TriggerTime>, String> {
    let mut times = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(TriggerTime::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    times.sort();
    times.dedup();
    Ok(times)
}

/// Parse a fixed UTC offset: "+05:30", "-0800", "+2", "Z" or "UTC"
pub fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => (1, raw),
    };

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 && rest.is_ascii() => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.storage,
            StorageConfig::File { path: PathBuf::from("student_data.json") }
        );
        assert!(!config.mail.is_complete());
        assert_eq!(config.mail.smtp_port, 465);
        let times: Vec<String> = config.reminder.trigger_times.iter().map(|t| t.to_string()).collect();
        assert_eq!(times, vec!["17:00", "21:00"]);
        assert_eq!(config.reminder.poll_interval, Duration::from_secs(30));
        assert_eq!(config.reminder.backoff, Duration::from_secs(60));
        assert!(config.reminder.utc_offset.is_none());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert_eq!(config_from(&[("PORT", "9000")]).unwrap().port, 9000);
    }

    #[test]
    fn test_mongo_selected_when_uri_present() {
        let config = config_from(&[("MONGO_URI", "mongodb://localhost:27017")]).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Mongo {
                uri: Some("mongodb://localhost:27017".to_string()),
                database: "planner".to_string(),
            }
        );
    }

    #[test]
    fn test_explicit_backend_selection() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "file"),
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("DATA_FILE", "/tmp/planner.json"),
        ])
        .unwrap();
        assert_eq!(config.storage, StorageConfig::File { path: PathBuf::from("/tmp/planner.json") });

        let config = config_from(&[("STORAGE_BACKEND", "mongo")]).unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Mongo { uri: None, database: "planner".to_string() }
        );

        let config = config_from(&[("STORAGE_BACKEND", "none")]).unwrap();
        assert!(matches!(config.storage, StorageConfig::Disabled { .. }));

        let config = config_from(&[("STORAGE_BACKEND", "redis")]).unwrap();
        assert!(matches!(config.storage, StorageConfig::Disabled { .. }));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = config_from(&[("MY_EMAIL", "  "), ("MONGO_URI", "")]).unwrap();
        assert!(config.mail.sender.is_none());
        assert!(matches!(config.storage, StorageConfig::File { .. }));
    }

    #[test]
    fn test_mail_config_complete() {
        let config = config_from(&[
            ("MY_EMAIL", "me@example.com"),
            ("MY_PASSWORD", "app-password"),
            ("TO_EMAIL", "you@example.com"),
            ("SMTP_PORT", "587"),
        ])
        .unwrap();
        assert!(config.mail.is_complete());
        assert_eq!(config.mail.smtp_port, 587);
    }

    #[test]
    fn test_reminder_overrides() {
        let config = config_from(&[
            ("REMINDER_TIMES", "21:00, 08:15,21:00"),
            ("REMINDER_UTC_OFFSET", "+05:30"),
            ("REMINDER_POLL_SECS", "5"),
            ("REMINDER_BACKOFF_SECS", "bogus"),
        ])
        .unwrap();
        let times: Vec<String> = config.reminder.trigger_times.iter().map(|t| t.to_string()).collect();
        assert_eq!(times, vec!["08:15", "21:00"]);
        assert_eq!(config.reminder.utc_offset, FixedOffset::east_opt(5 * 3600 + 30 * 60));
        assert_eq!(config.reminder.poll_interval, Duration::from_secs(5));
        assert_eq!(config.reminder.backoff, Duration::from_secs(60));
    }

    #[test]
    fn test_poll_interval_is_clamped_below_a_minute() {
        let config = config_from(&[("REMINDER_POLL_SECS", "90")]).unwrap();
        assert_eq!(config.reminder.poll_interval, Duration::from_secs(59));

        let config = config_from(&[("REMINDER_POLL_SECS", "0")]).unwrap();
        assert_eq!(config.reminder.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_reminder_times_fall_back() {
        let config = config_from(&[("REMINDER_TIMES", "25:00")]).unwrap();
        assert_eq!(config.reminder.trigger_times.len(), 2);
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("-0800"), FixedOffset::west_opt(8 * 3600));
        assert_eq!(parse_utc_offset("+2"), FixedOffset::east_opt(2 * 3600));
        assert_eq!(parse_utc_offset("+05:30"), FixedOffset::east_opt(19800));
        assert!(parse_utc_offset("+25:00").is_none());
        assert!(parse_utc_offset("soon").is_none());
    }
}
