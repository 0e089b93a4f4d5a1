//! Context types for rule execution.

use crate::span::LineIndex;
use crate::syntax::{NodeKind, NodeRef, SyntaxTree};
use crate::token::TokenKind;
use std::path::{Component, Path};

/// Modules whose import marks a file as test code.
const TEST_MODULES: &[&str] = &["XCTest", "Testing", "Quick", "Nimble"];

/// Read-only context handed to every rule invocation.
///
/// Holds the file being linted and the tree built from it. Rules reach
/// ancestors and siblings through [`NodeRef`]; the helpers here answer the
/// questions several rules share.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Path for attribution only; never opened.
    pub path: &'a Path,
    /// Source buffer.
    pub source: &'a str,
    /// Tree built from `source`.
    pub tree: &'a SyntaxTree,
    /// Line index of `source`.
    pub line_index: &'a LineIndex,
    /// Whether this file is detected as a test file.
    pub is_test: bool,
    /// Spaces per indentation level.
    pub indent_width: usize,
}

impl<'a> RuleContext<'a> {
    /// Creates a new rule context.
    #[must_use]
    pub fn new(
        path: &'a Path,
        source: &'a str,
        tree: &'a SyntaxTree,
        line_index: &'a LineIndex,
    ) -> Self {
        let is_test = Self::detect_test_file(path) || Self::imports_test_module(tree);
        Self {
            path,
            source,
            tree,
            line_index,
            is_test,
            indent_width: 2,
        }
    }

    /// Sets the indentation width.
    #[must_use]
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Detects if a file is a test file based on path conventions.
    fn detect_test_file(path: &Path) -> bool {
        for component in path.components() {
            if let Component::Normal(s) = component {
                let s = s.to_string_lossy();
                if s == "tests" || (s.ends_with("Tests") && !s.contains('.')) {
                    return true;
                }
            }
        }

        path.file_stem()
            .and_then(|n| n.to_str())
            .is_some_and(|stem| {
                stem.ends_with("Tests") || stem.ends_with("Test") || stem.ends_with("Spec")
            })
    }

    fn imports_test_module(tree: &SyntaxTree) -> bool {
        tree.root()
            .children()
            .filter(|n| n.kind() == NodeKind::ImportDecl)
            .any(|import| {
                import
                    .code_tokens()
                    .any(|(_, t)| TEST_MODULES.contains(&t.text.as_str()))
            })
    }

    /// Nearest enclosing declaration of `node`, excluding `node` itself.
    #[must_use]
    pub fn enclosing_declaration(&self, node: NodeRef<'a>) -> Option<NodeRef<'a>> {
        node.ancestors().find(|n| n.kind().is_declaration())
    }

    /// Number of ancestors between `node` and the root.
    #[must_use]
    pub fn nesting_depth(&self, node: NodeRef<'a>) -> usize {
        node.ancestors().count().saturating_sub(1)
    }

    /// Immediate siblings of `node` as `(previous, next)`.
    #[must_use]
    pub fn siblings(&self, node: NodeRef<'a>) -> (Option<NodeRef<'a>>, Option<NodeRef<'a>>) {
        (node.prev_sibling(), node.next_sibling())
    }

    /// Text of the given 1-indexed line, without its line terminator.
    #[must_use]
    pub fn line_text(&self, line: usize) -> &'a str {
        let Some(start) = self.line_index.line_start(line) else {
            return "";
        };
        let end = self
            .line_index
            .line_start(line + 1)
            .unwrap_or(self.source.len());
        self.source
            .get(start..end)
            .unwrap_or("")
            .trim_end_matches(['\n', '\r'])
    }

    /// Returns true if a comment token sits on the given 1-indexed line.
    #[must_use]
    pub fn line_has_comment(&self, line: usize) -> bool {
        let Some(start) = self.line_index.line_start(line) else {
            return false;
        };
        let end = self
            .line_index
            .line_start(line + 1)
            .unwrap_or(self.source.len());
        let tokens = self.tree.tokens();
        let first = tokens.partition_point(|t| t.span.end <= start);
        tokens[first..]
            .iter()
            .take_while(|t| t.span.start < end)
            .any(|t| t.kind.is_comment())
    }

    /// Returns true if `node` sits inside a type or function whose name
    /// marks it as test code, or inside a file detected as test code.
    #[must_use]
    pub fn in_test_code(&self, node: NodeRef<'a>) -> bool {
        self.is_test
            || node.ancestors().any(|n| {
                n.kind() == NodeKind::FunctionDecl
                    && n.direct_tokens()
                        .find(|(_, t)| t.kind == TokenKind::Identifier)
                        .is_some_and(|(_, t)| t.text.starts_with("test"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_ctx(path: &str, source: &str, f: impl FnOnce(&RuleContext<'_>)) {
        let tree = SyntaxTree::parse(source);
        let index = LineIndex::new(source);
        let ctx = RuleContext::new(Path::new(path), source, &tree, &index);
        f(&ctx);
    }

    #[test]
    fn test_detect_test_file() {
        assert!(RuleContext::detect_test_file(Path::new("Tests/AppTests/FooTests.swift")));
        assert!(RuleContext::detect_test_file(Path::new("AppTests/Foo.swift")));
        assert!(RuleContext::detect_test_file(Path::new("Sources/FooSpec.swift")));
        assert!(!RuleContext::detect_test_file(Path::new("Sources/App/Foo.swift")));
        assert!(!RuleContext::detect_test_file(Path::new("Sources/Contest.swift")));
    }

    #[test]
    fn test_import_marks_test_file() {
        with_ctx("Sources/Foo.swift", "import XCTest\n", |ctx| assert!(ctx.is_test));
        with_ctx("Sources/Foo.swift", "import UIKit\n", |ctx| assert!(!ctx.is_test));
    }

    #[test]
    fn test_line_helpers() {
        with_ctx("a.swift", "let a = 1\nlet b = 2 // note\n", |ctx| {
            assert_eq!(ctx.line_text(2), "let b = 2 // note");
            assert!(ctx.line_has_comment(2));
            assert!(!ctx.line_has_comment(1));
            assert_eq!(ctx.line_text(9), "");
        });
    }

    #[test]
    fn test_enclosing_declaration() {
        with_ctx("a.swift", "struct S {\n  func f() { g()! }\n}\n", |ctx| {
            let unwrap = ctx
                .tree
                .root()
                .descendants()
                .find(|n| n.kind() == NodeKind::ForceUnwrapExpr)
                .unwrap();
            let decl = ctx.enclosing_declaration(unwrap).unwrap();
            assert_eq!(decl.kind(), NodeKind::FunctionDecl);
            assert!(ctx.nesting_depth(unwrap) > 2);
        });
    }
}
