//! The zone decision rule: configuration flags in, one [`PolicyDecision`] out.
use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque permission identifier. No structure is assumed beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Privilege(String);

impl Privilege {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Privilege {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Well-known privilege identifiers.
pub struct DefaultPrivileges;

impl DefaultPrivileges {
    pub const ACCESS_IDM: &'static str = "ACCESS_IDM";
    pub const ACCESS_ADMIN: &'static str = "ACCESS_ADMIN";
    pub const ACCESS_MODELER: &'static str = "ACCESS_MODELER";
    pub const ACCESS_TASK: &'static str = "ACCESS_TASK";
    pub const ACCESS_REST_API: &'static str = "ACCESS_REST_API";

    pub const ALL: [&'static str; 5] = [
        Self::ACCESS_IDM,
        Self::ACCESS_ADMIN,
        Self::ACCESS_MODELER,
        Self::ACCESS_TASK,
        Self::ACCESS_REST_API,
    ];

    pub fn rest_api() -> Privilege {
        Privilege::new(Self::ACCESS_REST_API)
    }
}

/// Startup switches. Loaded once from configuration, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub rest_enabled: bool,
    pub verify_privilege: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            rest_enabled: true,
            verify_privilege: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "privilege", rename_all = "snake_case")]
pub enum PolicyDecision {
    /// Applied by the application to paths outside every zone.
    Allow,
    DenyAll,
    RequireAuthenticated,
    RequirePrivilege(Privilege),
}

impl PolicyDecision {
    /// Every decision except `DenyAll` lets chain building continue to the hook.
    pub fn proceeds(&self) -> bool {
        !matches!(self, PolicyDecision::DenyAll)
    }
}

/// Governed zones never create, read or destroy server-side sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPolicy {
    #[default]
    Stateless,
}

/// Zone decision rule.
///
/// A disabled API surface short-circuits to `DenyAll` before any privilege is
/// considered. With `verify_privilege` off, any authenticated principal passes.
pub fn decide(flags: &FeatureFlags) -> PolicyDecision {
    if !flags.rest_enabled {
        PolicyDecision::DenyAll
    } else if flags.verify_privilege {
        PolicyDecision::RequirePrivilege(DefaultPrivileges::rest_api())
    } else {
        PolicyDecision::RequireAuthenticated
    }
}
