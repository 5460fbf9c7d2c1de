//! Abstract Syntax Tree (AST) definitions for generic declarations.
//!
//! Nodes are immutable and shared behind `Rc`. A rewrite that changes nothing
//! hands back the very same `Rc`, so `Rc::ptr_eq` tells whether a subtree was
//! touched.

use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

mod declarations;
mod expressions;
mod printer;
mod statements;

pub use declarations::*;
pub use expressions::*;
pub use statements::*;

/// Span information for source location tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }
}

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a node, used as the key of the type-checking database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Allocate an id no other node in this process has.
    pub fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The id the next call to `fresh` would hand out.
    pub fn peek_next() -> u32 {
        NEXT_NODE_ID.load(Ordering::Relaxed)
    }

    /// Make sure ids below `next` are never handed out again
    /// (used after loading serialized trees).
    pub fn advance_to(next: u32) {
        NEXT_NODE_ID.fetch_max(next, Ordering::Relaxed);
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            name: name.into(),
            span: Span::dummy(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Comment lines attached to a declaration, without the `//` marker
pub type CommentGroup = Vec<String>;

/// Reports whether both options hold the same node (or are both empty).
pub fn same_opt<T>(a: &Option<Rc<T>>, b: &Option<Rc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

/// Reports whether two node lists hold the same nodes in the same order.
pub fn same_list<T>(a: &[Rc<T>], b: &[Rc<T>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| Rc::ptr_eq(a, b))
}
