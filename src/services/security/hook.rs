//! Customization hook: the single extension point of chain building.
//!
//! Runs synchronously, once per zone, and only when the base decision lets the
//! chain proceed. It receives the builder by `&mut` and can only tighten it.
use thiserror::Error;

use super::chain::ChainBuilder;
use super::path_matcher::PatternError;
use super::policy::Privilege;

#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("{0}")]
    Rejected(String),
}

pub trait CustomizationHook: Send + Sync {
    fn customize(&self, chain: &mut ChainBuilder) -> Result<(), HookError>;
}

impl<F> CustomizationHook for F
where
    F: Fn(&mut ChainBuilder) -> Result<(), HookError> + Send + Sync,
{
    fn customize(&self, chain: &mut ChainBuilder) -> Result<(), HookError> {
        self(chain)
    }
}

/// Leaves the base decision as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomization;

impl CustomizationHook for NoCustomization {
    fn customize(&self, _chain: &mut ChainBuilder) -> Result<(), HookError> {
        Ok(())
    }
}

/// Ordered list of hooks acting as one. Members run in registration order and
/// the first failure stops the list.
#[derive(Default)]
pub struct Customizers {
    hooks: Vec<Box<dyn CustomizationHook>>,
}

impl Customizers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hook: impl CustomizationHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }
}

impl CustomizationHook for Customizers {
    fn customize(&self, chain: &mut ChainBuilder) -> Result<(), HookError> {
        self.hooks.iter().try_for_each(|hook| hook.customize(chain))
    }
}

/// Privilege rules loaded from configuration (`IDM_API_PRIVILEGE_RULES`).
///
/// A rule whose pattern is `**` applies zone-wide; any other pattern becomes a
/// path rule on every chain the hook sees.
#[derive(Debug, Clone, Default)]
pub struct PrivilegeRulesHook {
    rules: Vec<(String, Privilege)>,
}

impl PrivilegeRulesHook {
    pub fn new(rules: Vec<(String, Privilege)>) -> Self {
        Self { rules }
    }
}

impl CustomizationHook for PrivilegeRulesHook {
    fn customize(&self, chain: &mut ChainBuilder) -> Result<(), HookError> {
        for (pattern, privilege) in &self.rules {
            if pattern == "**" {
                chain.require_privilege(privilege.clone());
            } else {
                chain.require_privilege_for(pattern, privilege.clone())?;
            }
            tracing::debug!(
                zone = %chain.zone().name,
                pattern = %pattern,
                privilege = %privilege,
                "privilege rule added"
            );
        }
        Ok(())
    }
}
