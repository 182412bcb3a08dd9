//! Syntax tree for parsed formulas.
//!
//! Nodes live in a [`SyntaxTree`] arena and refer to their arguments by
//! [`NodeId`]. The arena is the single owner of every node, so dropping the
//! tree releases the whole forest at once.

mod span;
mod tree;


pub use span::Span;
pub use tree::{IndexError, Node, NodeId, NodeKind, SyntaxTree};
