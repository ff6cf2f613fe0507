//! Ordered set of authorization chains, one per API surface.
//!
//! Built once at startup, then shared read-only. Dispatch walks the chains in
//! ascending `order` and stops at the first zone whose pattern matches.
use std::collections::HashSet;

use super::chain::{ChainBuilder, Requirement, SecurityChain, SecurityZone};
use super::error::GateError;
use super::hook::CustomizationHook;
use super::path_matcher::PathPattern;
use super::policy::{FeatureFlags, PolicyDecision, decide};

#[derive(Debug)]
pub struct ChainRegistry {
    chains: Vec<SecurityChain>,
}

pub struct ChainRegistryBuilder {
    default_flags: FeatureFlags,
    zones: Vec<(SecurityZone, Option<FeatureFlags>)>,
}

impl ChainRegistry {
    pub fn builder(default_flags: FeatureFlags) -> ChainRegistryBuilder {
        ChainRegistryBuilder {
            default_flags,
            zones: Vec::new(),
        }
    }

    pub fn chains(&self) -> &[SecurityChain] {
        &self.chains
    }

    /// The chain governing `path`, or `None` when no zone claims it.
    pub fn select(&self, path: &str) -> Option<&SecurityChain> {
        self.chains.iter().find(|chain| chain.matches(path))
    }

    pub fn decide(&self, path: &str) -> Option<PolicyDecision> {
        self.select(path).map(|chain| chain.decision().clone())
    }

    pub fn requirement(&self, path: &str) -> Option<Requirement> {
        self.select(path).map(|chain| chain.requirement(path))
    }
}

impl ChainRegistryBuilder {
    pub fn zone(mut self, zone: SecurityZone) -> Self {
        self.zones.push((zone, None));
        self
    }

    /// Register a zone whose surface has its own enablement flags.
    pub fn zone_with_flags(mut self, zone: SecurityZone, flags: FeatureFlags) -> Self {
        self.zones.push((zone, Some(flags)));
        self
    }

    /// Sort, validate and finalize every zone.
    ///
    /// The hook runs once for each zone whose decision proceeds and never for
    /// a `DenyAll` zone. Any fault aborts the whole build.
    pub fn build(self, hook: &dyn CustomizationHook) -> Result<ChainRegistry, GateError> {
        let mut zones = self.zones;
        zones.sort_by_key(|(zone, _)| zone.order);

        let mut names = HashSet::new();
        for (zone, _) in &zones {
            if !names.insert(zone.name.as_str()) {
                return Err(GateError::DuplicateName(zone.name.clone()));
            }
        }
        for pair in zones.windows(2) {
            let (first, second) = (&pair[0].0, &pair[1].0);
            if first.order == second.order {
                return Err(GateError::DuplicateOrder {
                    order: first.order,
                    first: first.name.clone(),
                    second: second.name.clone(),
                });
            }
        }

        let mut chains = Vec::with_capacity(zones.len());
        for (zone, flags) in zones {
            let flags = flags.unwrap_or(self.default_flags);
            let matcher = PathPattern::parse(&zone.pattern).map_err(|source| GateError::Pattern {
                zone: zone.name.clone(),
                source,
            })?;

            let decision = decide(&flags);
            let mut builder = ChainBuilder::new(zone, matcher, decision);

            if builder.decision().proceeds() {
                hook.customize(&mut builder)
                    .map_err(|source| GateError::Hook {
                        zone: builder.zone().name.clone(),
                        source,
                    })?;
            }

            let chain = builder.finalize();
            tracing::info!(
                zone = %chain.zone().name,
                pattern = %chain.zone().pattern,
                order = chain.zone().order,
                decision = ?chain.decision(),
                extra_privileges = chain.extra_privileges().len(),
                path_rules = chain.path_rules().len(),
                "security chain finalized"
            );
            chains.push(chain);
        }

        Ok(ChainRegistry { chains })
    }
}
