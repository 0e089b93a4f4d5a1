//! Flat rule registry with a node-kind dispatch table.

use crate::rule::{Rule, RuleBox};
use crate::syntax::NodeKind;
use std::collections::HashMap;

/// Owns the rules of a run and indexes them by the node kinds they
/// subscribe to.
///
/// Built once before linting and shared read-only between files.
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<RuleBox>,
    by_kind: HashMap<NodeKind, Vec<usize>>,
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.code()))
            .finish()
    }
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule. A rule whose code is already registered replaces the
    /// earlier one.
    pub fn register(&mut self, rule: RuleBox) {
        if let Some(existing) = self.rules.iter().position(|r| r.code() == rule.code()) {
            self.rules[existing] = rule;
            self.reindex();
            return;
        }
        let index = self.rules.len();
        for kind in rule.node_kinds() {
            let slot = self.by_kind.entry(*kind).or_default();
            if !slot.contains(&index) {
                slot.push(index);
            }
        }
        self.rules.push(rule);
    }

    /// Adds a rule, builder style.
    #[must_use]
    pub fn with_rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.register(Box::new(rule));
        self
    }

    fn reindex(&mut self) {
        self.by_kind.clear();
        for (index, rule) in self.rules.iter().enumerate() {
            for kind in rule.node_kinds() {
                let slot = self.by_kind.entry(*kind).or_default();
                if !slot.contains(&index) {
                    slot.push(index);
                }
            }
        }
    }

    /// Number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// All rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(AsRef::as_ref)
    }

    /// Consumes the registry and returns its rules in registration order.
    #[must_use]
    pub fn into_rules(self) -> Vec<RuleBox> {
        self.rules
    }

    /// Rule at a registry index.
    #[must_use]
    pub fn rule_at(&self, index: usize) -> Option<&dyn Rule> {
        self.rules.get(index).map(AsRef::as_ref)
    }

    /// Registry indices of the rules subscribed to `kind`.
    #[must_use]
    pub fn indices_for(&self, kind: NodeKind) -> &[usize] {
        self.by_kind
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Looks a rule up by name or code.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.position(id).and_then(|i| self.rule_at(i))
    }

    /// Registry index of the rule with the given name or code.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|r| r.name() == id || r.code() == id)
    }

    /// Returns true if `id` names or codes a registered rule.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }
}

impl FromIterator<RuleBox> for RuleRegistry {
    fn from_iter<I: IntoIterator<Item = RuleBox>>(iter: I) -> Self {
        let mut registry = Self::new();
        for rule in iter {
            registry.register(rule);
        }
        registry
    }
}

impl Extend<RuleBox> for RuleRegistry {
    fn extend<I: IntoIterator<Item = RuleBox>>(&mut self, iter: I) {
        for rule in iter {
            self.register(rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RuleContext;
    use crate::syntax::NodeRef;
    use crate::types::{Category, Violation};

    struct Probe(&'static str, &'static [NodeKind]);

    impl Rule for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }
        fn code(&self) -> &'static str {
            self.0
        }
        fn category(&self) -> Category {
            Category::Layout
        }
        fn node_kinds(&self) -> &'static [NodeKind] {
            self.1
        }
        fn check(&self, _node: NodeRef<'_>, _ctx: &RuleContext<'_>) -> Vec<Violation> {
            Vec::new()
        }
    }

    #[test]
    fn dispatch_is_keyed_by_kind() {
        let registry = RuleRegistry::new()
            .with_rule(Probe("P1", &[NodeKind::IfStmt, NodeKind::GuardStmt]))
            .with_rule(Probe("P2", &[NodeKind::IfStmt]));

        assert_eq!(registry.indices_for(NodeKind::IfStmt), &[0, 1]);
        assert_eq!(registry.indices_for(NodeKind::GuardStmt), &[0]);
        assert!(registry.indices_for(NodeKind::CallExpr).is_empty());
        assert!(registry.contains("P2"));
        assert!(registry.contains("probe"));
        assert!(!registry.contains("P3"));
    }

    #[test]
    fn duplicate_codes_replace() {
        let registry = RuleRegistry::new()
            .with_rule(Probe("P1", &[NodeKind::IfStmt]))
            .with_rule(Probe("P1", &[NodeKind::CallExpr]));

        assert_eq!(registry.len(), 1);
        assert!(registry.indices_for(NodeKind::IfStmt).is_empty());
        assert_eq!(registry.indices_for(NodeKind::CallExpr), &[0]);
    }
}
