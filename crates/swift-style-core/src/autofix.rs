//! Autofix: conflict-free edit application and the bounded re-lint loop.

use crate::engine::Linter;
use crate::span::Span;
use crate::types::{Diagnostic, TextEdit};
use std::path::Path;
use tracing::{debug, warn};

/// Result of applying one batch of edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Rewritten buffer.
    pub output: String,
    /// Input positions of the edits that were applied.
    pub accepted: Vec<usize>,
    /// Input positions of edits that overlapped an accepted edit.
    pub deferred: Vec<usize>,
    /// Input positions of edits that were out of range, split a character,
    /// or would not change the buffer.
    pub rejected: Vec<usize>,
}

/// Applies non-overlapping edits to `source`.
///
/// Candidates are `(rule code, edit)` pairs. They are considered in order of
/// rule code, then start offset, and accepted greedily unless they overlap an
/// already accepted edit; two insertions at one offset overlap. Accepted
/// edits are applied in descending start order so earlier offsets stay
/// valid.
#[must_use]
pub fn apply_edits<'a, I>(source: &str, candidates: I) -> EditOutcome
where
    I: IntoIterator<Item = (&'a str, &'a TextEdit)>,
{
    let candidates: Vec<(&str, &TextEdit)> = candidates.into_iter().collect();
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        let (code_a, edit_a) = candidates[a];
        let (code_b, edit_b) = candidates[b];
        code_a
            .cmp(code_b)
            .then(edit_a.span.start.cmp(&edit_b.span.start))
            .then(edit_a.span.end.cmp(&edit_b.span.end))
            .then(a.cmp(&b))
    });

    let mut accepted: Vec<usize> = Vec::new();
    let mut accepted_spans: Vec<Span> = Vec::new();
    let mut deferred = Vec::new();
    let mut rejected = Vec::new();

    for i in order {
        let (code, edit) = candidates[i];
        if !is_applicable(source, edit) {
            debug!(code, start = edit.span.start, end = edit.span.end, "edit rejected");
            rejected.push(i);
            continue;
        }
        if accepted_spans.iter().any(|s| s.overlaps(edit.span)) {
            debug!(code, start = edit.span.start, "edit deferred by overlap");
            deferred.push(i);
            continue;
        }
        accepted.push(i);
        accepted_spans.push(edit.span);
    }

    let mut by_offset: Vec<usize> = accepted.clone();
    by_offset.sort_by(|&a, &b| candidates[b].1.span.start.cmp(&candidates[a].1.span.start));
    let mut output = source.to_string();
    for i in by_offset {
        let edit = candidates[i].1;
        output.replace_range(edit.span.range(), &edit.replacement);
    }

    accepted.sort_unstable();
    deferred.sort_unstable();
    rejected.sort_unstable();
    EditOutcome {
        output,
        accepted,
        deferred,
        rejected,
    }
}

fn is_applicable(source: &str, edit: &TextEdit) -> bool {
    let Span { start, end } = edit.span;
    start <= end
        && end <= source.len()
        && source.is_char_boundary(start)
        && source.is_char_boundary(end)
        && source[start..end] != edit.replacement
}

/// Result of [`Linter::fix`].
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// Buffer after the last applied pass.
    pub output: String,
    /// Diagnostics whose edits were applied, across all passes.
    pub fixed: Vec<Diagnostic>,
    /// Diagnostics of a final lint of `output`.
    pub remaining: Vec<Diagnostic>,
    /// Number of passes that applied edits.
    pub passes: usize,
    /// True when the last lint produced no applicable edits.
    pub converged: bool,
}

impl FixOutcome {
    /// Remaining diagnostics that still carry an edit: the loop stopped
    /// before reaching them, or they conflict with each other.
    #[must_use]
    pub fn unresolved(&self) -> Vec<&Diagnostic> {
        self.remaining.iter().filter(|d| d.edit.is_some()).collect()
    }
}

impl Linter {
    /// Lints `source` and applies fixes until no edit applies or
    /// `lint.max_autofix_retries` passes have run.
    ///
    /// Every pass re-lexes and re-parses the rewritten buffer; no tree
    /// survives a pass.
    #[must_use]
    pub fn fix(&self, path: &Path, source: &str) -> FixOutcome {
        let budget = self.config().lint.max_autofix_retries;
        let mut current = source.to_string();
        let mut diagnostics = self.lint(path, &current);
        let mut fixed = Vec::new();
        let mut passes = 0;

        let converged = loop {
            let candidates: Vec<usize> = diagnostics
                .iter()
                .enumerate()
                .filter(|(_, d)| d.edit.is_some())
                .map(|(i, _)| i)
                .collect();
            if candidates.is_empty() {
                break true;
            }
            if passes == budget {
                warn!(
                    file = %path.display(),
                    pending = candidates.len(),
                    "autofix retry budget exhausted"
                );
                break false;
            }

            let outcome = apply_edits(
                &current,
                candidates.iter().filter_map(|&i| {
                    let d = &diagnostics[i];
                    d.edit.as_ref().map(|e| (d.code.as_str(), e))
                }),
            );
            if outcome.accepted.is_empty() {
                break false;
            }

            passes += 1;
            debug!(
                file = %path.display(),
                pass = passes,
                applied = outcome.accepted.len(),
                deferred = outcome.deferred.len(),
                "autofix pass"
            );
            for &position in &outcome.accepted {
                let mut diagnostic = diagnostics[candidates[position]].clone();
                diagnostic.fix_applied = true;
                fixed.push(diagnostic);
            }
            current = outcome.output;
            diagnostics = self.lint(path, &current);
        };

        FixOutcome {
            output: current,
            fixed,
            remaining: diagnostics,
            passes,
            converged,
        }
    }
}
