/*
 * Responsibility
 * - Load settings from the environment (.env supported)
 * - Validate every value up front; a bad value stops startup
 * - Feature flags, zones, seeded users and privilege rules for the gate
 */
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use crate::services::identity::UserRecord;
use crate::services::security::{FeatureFlags, Privilege, SecurityZone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str),
    InvalidEntry { key: &'static str, entry: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::InvalidEntry { key, entry } => {
                write!(f, "invalid configuration: {} entry `{}`", key, entry)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub const DEFAULT_ZONES: &str = "idm=/api/idm/**@10";

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub feature_flags: FeatureFlags,
    pub zones: Vec<SecurityZone>,
    pub privilege_rules: Vec<(String, Privilege)>,

    pub user_validity_period: Duration,
    pub users: Vec<UserRecord>,

    pub http_timeout: Duration,
    pub http_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let cors_allowed_origins = split_list(lookup("CORS_ALLOWED_ORIGINS"));
        // origins are matched exactly; `*` is not a pattern here
        if let Some(wildcard) = cors_allowed_origins.iter().find(|o| o.contains('*')) {
            return Err(ConfigError::InvalidEntry {
                key: "CORS_ALLOWED_ORIGINS",
                entry: wildcard.clone(),
            });
        }

        let feature_flags = FeatureFlags {
            rest_enabled: parse_bool(&lookup, "IDM_REST_ENABLED", true)?,
            verify_privilege: parse_bool(&lookup, "IDM_VERIFY_REST_API_PRIVILEGE", true)?,
        };

        let zones = parse_zones(
            &lookup("IDM_SECURITY_ZONES").unwrap_or_else(|| DEFAULT_ZONES.to_string()),
        )?;

        let privilege_rules = parse_privilege_rules(lookup("IDM_API_PRIVILEGE_RULES"))?;

        let user_validity_period =
            Duration::from_secs(parse_or(&lookup, "IDM_USER_VALIDITY_PERIOD_SECS", 30)?);

        let users = parse_users(lookup("IDM_USERS"))?;

        let http_timeout = Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30)?);
        let http_body_limit_bytes = parse_or(&lookup, "HTTP_BODY_LIMIT_BYTES", 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            feature_flags,
            zones,
            privilege_rules,
            user_validity_period,
            users,
            http_timeout,
            http_body_limit_bytes,
        })
    }
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(key)),
    }
}

/// `name=pattern@order`, comma separated.
fn parse_zones(raw: &str) -> Result<Vec<SecurityZone>, ConfigError> {
    const KEY: &str = "IDM_SECURITY_ZONES";
    let invalid = |entry: &str| ConfigError::InvalidEntry {
        key: KEY,
        entry: entry.to_string(),
    };

    let zones = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (name, rest) = entry.split_once('=').ok_or_else(|| invalid(entry))?;
            let (pattern, order) = rest.rsplit_once('@').ok_or_else(|| invalid(entry))?;
            let order: i32 = order.trim().parse().map_err(|_| invalid(entry))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(invalid(entry));
            }
            Ok(SecurityZone::new(name, pattern.trim(), order))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if zones.is_empty() {
        return Err(ConfigError::Invalid(KEY));
    }
    Ok(zones)
}

/// `id:password:PRIV1+PRIV2`, comma separated. The privilege part may be empty.
fn parse_users(raw: Option<String>) -> Result<Vec<UserRecord>, ConfigError> {
    split_list(raw)
        .iter()
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let (Some(id), Some(password)) = (parts.next(), parts.next()) else {
                // no ':' at all, so the entry is only an id
                return Err(ConfigError::InvalidEntry {
                    key: "IDM_USERS",
                    entry: entry.clone(),
                });
            };
            if id.is_empty() {
                return Err(ConfigError::Invalid("IDM_USERS"));
            }
            let privileges = parts
                .next()
                .unwrap_or_default()
                .split('+')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(Privilege::new);
            Ok(UserRecord::new(id, password, privileges))
        })
        .collect()
}

/// `pattern=PRIVILEGE`, comma separated. `**` as pattern means zone-wide.
fn parse_privilege_rules(raw: Option<String>) -> Result<Vec<(String, Privilege)>, ConfigError> {
    split_list(raw)
        .iter()
        .map(|entry| {
            let invalid = || ConfigError::InvalidEntry {
                key: "IDM_API_PRIVILEGE_RULES",
                entry: entry.to_string(),
            };
            let (pattern, privilege) = entry.split_once('=').ok_or_else(invalid)?;
            let (pattern, privilege) = (pattern.trim(), privilege.trim());
            if pattern.is_empty() || privilege.is_empty() {
                return Err(invalid());
            }
            Ok((pattern.to_string(), Privilege::new(privilege)))
        })
        .collect()
}
