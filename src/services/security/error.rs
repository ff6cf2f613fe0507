use thiserror::Error;

use super::hook::HookError;
use super::path_matcher::PatternError;

/// Configuration faults raised while building the chain registry.
///
/// All of these are fatal: the process must not serve requests with an
/// ambiguous or partially assembled policy.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("zones `{first}` and `{second}` share order {order}")]
    DuplicateOrder {
        order: i32,
        first: String,
        second: String,
    },
    #[error("zone name `{0}` is registered more than once")]
    DuplicateName(String),
    #[error("zone `{zone}` has a malformed pattern: {source}")]
    Pattern {
        zone: String,
        #[source]
        source: PatternError,
    },
    #[error("customization hook failed for zone `{zone}`: {source}")]
    Hook {
        zone: String,
        #[source]
        source: HookError,
    },
}
