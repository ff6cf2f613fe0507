pub mod chain;
pub mod error;
pub mod hook;
pub mod path_matcher;
pub mod policy;
pub mod registry;

pub use chain::{ChainBuilder, Requirement, SecurityChain, SecurityZone};
pub use error::GateError;
pub use hook::{CustomizationHook, Customizers, HookError, NoCustomization, PrivilegeRulesHook};
pub use policy::{DefaultPrivileges, FeatureFlags, PolicyDecision, Privilege, SessionPolicy};
pub use registry::ChainRegistry;
