//! Fault-tolerant concrete syntax tree.
//!
//! [`SyntaxTree::parse`] never fails. Unexpected input is wrapped in
//! [`NodeKind::Error`] nodes and reported through [`SyntaxTree::errors`];
//! every token, trivia included, stays reachable from the root so the
//! buffer can always be reconstructed from the tree.

mod expr;
mod kind;
mod parser;
mod tree;

pub use kind::NodeKind;
pub use tree::{Node, NodeId, NodeRef, ParseError, SyntaxTree};
