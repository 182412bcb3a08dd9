use core::fmt;
use core::ops::Index;

use super::Span;

/// Handle to a node stored in a [`SyntaxTree`].
///
/// Ids are only meaningful for the tree that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a syntax node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Numeric literal; the node name is the literal text.
    Constant,
    /// Operator symbol (`+`, `-`, `*`, `/`, `^`, `=`).
    Operator,
    /// Variable reference; the node name is the identifier.
    Variable,
    /// Keyword or function call; arguments are the call arguments.
    Keyword,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Constant => write!(f, "constant"),
            NodeKind::Operator => write!(f, "operator"),
            NodeKind::Variable => write!(f, "variable"),
            NodeKind::Keyword => write!(f, "keyword"),
        }
    }
}

/// Indexed argument access went past the end of a node's argument list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("argument index {index} out of range for `{name}` with {len} argument(s)")]
pub struct IndexError {
    pub name: String,
    pub index: usize,
    pub len: usize,
}

/// A single syntax element.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: String,
    kind: NodeKind,
    args: Vec<NodeId>,
    parent: Option<NodeId>,
    span: Span,
    /// Levels in the subtree rooted here; a leaf has height 1.
    height: usize,
}

impl Node {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    pub fn args(&self) -> &[NodeId] {
        &self.args
    }

    /// Enclosing node, if any. Navigation only; the tree owns every node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Longest path from this node down to a leaf, counting both ends.
    ///
    /// Code generation recurses once per level, so this is how deep the
    /// compiler's stack goes for this subtree.
    pub fn height(&self) -> usize {
        self.height
    }
}

/// Arena holding every node of a parsed source plus its statement roots.
///
/// Roots are kept in source order; a source with several `;`-separated
/// statements produces several roots.
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node without arguments.
    pub fn leaf(&mut self, name: impl Into<String>, kind: NodeKind, span: Span) -> NodeId {
        self.node(name, kind, span, Vec::new())
    }

    /// Add a node owning `args`. Each argument gets this node as parent.
    pub fn node(
        &mut self,
        name: impl Into<String>,
        kind: NodeKind,
        span: Span,
        args: Vec<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let mut height = 1;
        for &arg in &args {
            let child = &mut self.nodes[arg.index()];
            debug_assert!(
                child.parent.is_none(),
                "node {:?} already belongs to {:?}",
                arg,
                child.parent
            );
            child.parent = Some(id);
            height = height.max(child.height + 1);
        }
        self.nodes.push(Node {
            name: name.into(),
            kind,
            args,
            parent: None,
            span,
            height,
        });
        id
    }

    /// Append a statement root. Order of calls is execution order.
    pub fn add_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Bounds-checked access to the `index`-th argument of `id`.
    pub fn arg(&self, id: NodeId, index: usize) -> Result<NodeId, IndexError> {
        let node = self.get(id);
        node.args.get(index).copied().ok_or_else(|| IndexError {
            name: node.name.clone(),
            index,
            len: node.args.len(),
        })
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.get(id).parent.is_none()
    }

    /// Total number of nodes across all statements.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render the subtree at `id` as an s-expression, e.g. `(+ x (neg 1))`.
    pub fn render(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String) {
        let node = self.get(id);
        if node.args.is_empty() && node.kind != NodeKind::Keyword {
            out.push_str(&node.name);
            return;
        }
        out.push('(');
        out.push_str(&node.name);
        for &arg in &node.args {
            out.push(' ');
            self.render_into(arg, out);
        }
        out.push(')');
    }
}

impl Index<NodeId> for SyntaxTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.get(id)
    }
}

impl fmt::Display for SyntaxTree {
    /// One rendered statement per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &root in &self.roots {
            writeln!(f, "{}", self.render(root))?;
        }
        Ok(())
    }
}
