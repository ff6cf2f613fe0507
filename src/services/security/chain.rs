//! In-progress and finalized authorization chains.
//!
//! A [`ChainBuilder`] carries the base decision of one zone while the
//! customization hook runs. Its API can only add constraints, so whatever a hook
//! does, the finalized [`SecurityChain`] is at least as strict as the base.
use serde::Serialize;

use super::hook::HookError;
use super::path_matcher::PathPattern;
use super::policy::{PolicyDecision, Privilege, SessionPolicy};

/// A path-scoped region of the API governed by one authorization chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityZone {
    pub name: String,
    pub pattern: String,
    pub order: i32,
}

impl SecurityZone {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, order: i32) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleEffect {
    Deny,
    RequirePrivilege(Privilege),
}

#[derive(Debug, Clone)]
pub struct PathRule {
    pub pattern: PathPattern,
    pub effect: RuleEffect,
}

/// What a request must satisfy once its zone is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Deny,
    Permit,
    /// An empty privilege list means any authenticated principal passes.
    Authenticated { privileges: Vec<Privilege> },
}

#[derive(Debug)]
pub struct ChainBuilder {
    zone: SecurityZone,
    matcher: PathPattern,
    decision: PolicyDecision,
    extra_privileges: Vec<Privilege>,
    path_rules: Vec<PathRule>,
}

impl ChainBuilder {
    pub(crate) fn new(zone: SecurityZone, matcher: PathPattern, decision: PolicyDecision) -> Self {
        Self {
            zone,
            matcher,
            decision,
            extra_privileges: Vec::new(),
            path_rules: Vec::new(),
        }
    }

    pub fn zone(&self) -> &SecurityZone {
        &self.zone
    }

    pub fn decision(&self) -> &PolicyDecision {
        &self.decision
    }

    /// Require `privilege` for every request in the zone, on top of the base decision.
    pub fn require_privilege(&mut self, privilege: impl Into<Privilege>) -> &mut Self {
        let privilege = privilege.into();
        if !self.extra_privileges.contains(&privilege) {
            self.extra_privileges.push(privilege);
        }
        self
    }

    /// Require `privilege` for paths matching `pattern` inside the zone.
    pub fn require_privilege_for(
        &mut self,
        pattern: &str,
        privilege: impl Into<Privilege>,
    ) -> Result<&mut Self, HookError> {
        let pattern = PathPattern::parse(pattern)?;
        self.path_rules.push(PathRule {
            pattern,
            effect: RuleEffect::RequirePrivilege(privilege.into()),
        });
        Ok(self)
    }

    /// Reject every request whose path matches `pattern`.
    pub fn deny_path(&mut self, pattern: &str) -> Result<&mut Self, HookError> {
        let pattern = PathPattern::parse(pattern)?;
        self.path_rules.push(PathRule {
            pattern,
            effect: RuleEffect::Deny,
        });
        Ok(self)
    }

    pub(crate) fn finalize(self) -> SecurityChain {
        SecurityChain {
            zone: self.zone,
            matcher: self.matcher,
            decision: self.decision,
            extra_privileges: self.extra_privileges,
            path_rules: self.path_rules,
            session_policy: SessionPolicy::Stateless,
        }
    }
}

/// A finalized chain. Immutable, shared by every request-handling task.
#[derive(Debug)]
pub struct SecurityChain {
    zone: SecurityZone,
    matcher: PathPattern,
    decision: PolicyDecision,
    extra_privileges: Vec<Privilege>,
    path_rules: Vec<PathRule>,
    session_policy: SessionPolicy,
}

impl SecurityChain {
    pub fn zone(&self) -> &SecurityZone {
        &self.zone
    }

    pub fn decision(&self) -> &PolicyDecision {
        &self.decision
    }

    pub fn session_policy(&self) -> SessionPolicy {
        self.session_policy
    }

    /// API clients send credentials on every request, so no CSRF tokens are issued or checked.
    pub fn csrf_protection(&self) -> bool {
        false
    }

    pub fn extra_privileges(&self) -> &[Privilege] {
        &self.extra_privileges
    }

    pub fn path_rules(&self) -> &[PathRule] {
        &self.path_rules
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }

    /// Base decision composed with everything the hook added for `path`.
    pub fn requirement(&self, path: &str) -> Requirement {
        let mut privileges = Vec::new();
        let mut authenticated = match &self.decision {
            PolicyDecision::DenyAll => return Requirement::Deny,
            PolicyDecision::Allow => false,
            PolicyDecision::RequireAuthenticated => true,
            PolicyDecision::RequirePrivilege(p) => {
                privileges.push(p.clone());
                true
            }
        };

        let rule_privileges = self
            .path_rules
            .iter()
            .filter(|rule| rule.pattern.matches(path))
            .map(|rule| match &rule.effect {
                RuleEffect::Deny => None,
                RuleEffect::RequirePrivilege(p) => Some(p),
            });

        for privilege in self.extra_privileges.iter().map(Some).chain(rule_privileges) {
            let Some(privilege) = privilege else {
                return Requirement::Deny;
            };
            authenticated = true;
            if !privileges.contains(privilege) {
                privileges.push(privilege.clone());
            }
        }

        if authenticated {
            Requirement::Authenticated { privileges }
        } else {
            Requirement::Permit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(decision: PolicyDecision) -> ChainBuilder {
        let zone = SecurityZone::new("idm", "/api/idm/**", 10);
        let matcher = PathPattern::parse(&zone.pattern).unwrap();
        ChainBuilder::new(zone, matcher, decision)
    }

    #[test]
    fn finalized_chain_is_stateless_without_csrf() {
        let chain = builder(PolicyDecision::RequireAuthenticated).finalize();
        assert_eq!(chain.session_policy(), SessionPolicy::Stateless);
        assert!(!chain.csrf_protection());
    }

    #[test]
    fn authenticated_base_has_no_privileges() {
        let chain = builder(PolicyDecision::RequireAuthenticated).finalize();
        assert_eq!(
            chain.requirement("/api/idm/users"),
            Requirement::Authenticated { privileges: vec![] }
        );
    }

    #[test]
    fn added_privileges_stack_on_the_base_privilege() {
        let mut b = builder(PolicyDecision::RequirePrivilege(Privilege::new("ACCESS_REST_API")));
        b.require_privilege("ACCESS_IDM")
            .require_privilege("ACCESS_IDM")
            .require_privilege_for("/api/idm/users/**", "ACCESS_ADMIN")
            .unwrap();
        let chain = b.finalize();

        assert_eq!(
            chain.requirement("/api/idm/privileges"),
            Requirement::Authenticated {
                privileges: vec![Privilege::new("ACCESS_REST_API"), Privilege::new("ACCESS_IDM")]
            }
        );
        assert_eq!(
            chain.requirement("/api/idm/users/kermit"),
            Requirement::Authenticated {
                privileges: vec![
                    Privilege::new("ACCESS_REST_API"),
                    Privilege::new("ACCESS_IDM"),
                    Privilege::new("ACCESS_ADMIN"),
                ]
            }
        );
    }

    #[test]
    fn deny_rule_only_hits_matching_paths() {
        let mut b = builder(PolicyDecision::RequireAuthenticated);
        b.deny_path("/api/idm/internal/**").unwrap();
        let chain = b.finalize();

        assert_eq!(chain.requirement("/api/idm/internal/dump"), Requirement::Deny);
        assert_ne!(chain.requirement("/api/idm/users"), Requirement::Deny);
    }

    #[test]
    fn allow_base_tightens_to_authenticated_when_privilege_added() {
        let plain = builder(PolicyDecision::Allow).finalize();
        assert_eq!(plain.requirement("/api/idm/users"), Requirement::Permit);

        let mut b = builder(PolicyDecision::Allow);
        b.require_privilege("ACCESS_IDM");
        assert_eq!(
            b.finalize().requirement("/api/idm/users"),
            Requirement::Authenticated {
                privileges: vec![Privilege::new("ACCESS_IDM")]
            }
        );
    }

    #[test]
    fn deny_all_base_ignores_everything_else() {
        let chain = builder(PolicyDecision::DenyAll).finalize();
        assert_eq!(chain.requirement("/api/idm/users"), Requirement::Deny);
    }

    #[test]
    fn malformed_rule_pattern_is_a_hook_error() {
        let mut b = builder(PolicyDecision::RequireAuthenticated);
        assert!(matches!(
            b.deny_path("internal/**"),
            Err(HookError::Pattern(_))
        ));
    }
}
