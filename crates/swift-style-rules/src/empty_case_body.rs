//! Rule against `switch` arms without statements.
//!
//! An arm that intentionally does nothing says so with `break`. An arm
//! holding only comments counts as empty.

use swift_style_core::{
    Category, NodeKind, NodeRef, Rule, RuleContext, Severity, Suggestion, Violation,
};

/// Rule code for empty-case-body.
pub const CODE: &str = "SW401";

/// Rule name for empty-case-body.
pub const NAME: &str = "empty-case-body";

/// Flags `case` and `default` arms with no statements.
#[derive(Debug, Clone)]
pub struct EmptyCaseBody {
    /// Custom severity.
    pub severity: Severity,
}

impl Default for EmptyCaseBody {
    fn default() -> Self {
        Self::new()
    }
}

impl EmptyCaseBody {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            severity: Severity::Warning,
        }
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Rule for EmptyCaseBody {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Requires `break` in switch arms that do nothing"
    }

    fn category(&self) -> Category {
        Category::ControlFlow
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn node_kinds(&self) -> &'static [NodeKind] {
        &[NodeKind::SwitchCase]
    }

    fn check(&self, node: NodeRef<'_>, _ctx: &RuleContext<'_>) -> Vec<Violation> {
        if case_body(node).next().is_some() {
            return Vec::new();
        }
        let label = if node.has_keyword("default") {
            "`default`"
        } else {
            "`case`"
        };
        vec![Violation::new(
            CODE,
            NAME,
            self.severity,
            node.span(),
            format!("{label} arm has an empty body"),
        )
        .with_suggestion(Suggestion::new("Write `break` to make the no-op explicit"))]
    }
}

/// Statements of a switch arm, after its attribute and patterns.
pub(crate) fn case_body(node: NodeRef<'_>) -> impl Iterator<Item = NodeRef<'_>> {
    node.children()
        .filter(|c| !matches!(c.kind(), NodeKind::Attribute | NodeKind::CasePattern))
}
