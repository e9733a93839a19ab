use crate::ir::{Access, IrNode, Node, NodeKind};

#[derive(Debug, Clone)]
struct Frame {
    original: Node,
    access: Access,
}

/// Where the walk currently is.
///
/// One frame per node on the path from the root to the node whose callback
/// is running. Frames record the node as it was before the walk touched it
/// and how the parent accesses that slot.
#[derive(Debug, Default)]
pub struct VisitContext {
    frames: Vec<Frame>,
}

impl VisitContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter(&mut self, original: Node, access: Access) {
        self.frames.push(Frame { original, access });
    }

    pub(crate) fn leave(&mut self) {
        self.frames.pop();
    }

    /// The current node before its children were transformed
    pub fn original(&self) -> Option<&Node> {
        self.frames.last().map(|frame| &frame.original)
    }

    /// How the parent of the current node accesses it
    pub fn access(&self) -> Access {
        self.frames
            .last()
            .map(|frame| frame.access)
            .unwrap_or_default()
    }

    pub fn is_write(&self) -> bool {
        self.access().is_write()
    }

    pub fn is_read(&self) -> bool {
        self.access().is_read()
    }

    /// Kind of the parent of the current node
    pub fn parent_kind(&self) -> Option<NodeKind> {
        let len = self.frames.len();
        (len >= 2).then(|| self.frames[len - 2].original.kind())
    }

    /// Nearest proper ancestor of the given kind
    pub fn enclosing(&self, kind: NodeKind) -> Option<&Node> {
        let len = self.frames.len();
        self.frames[..len.saturating_sub(1)]
            .iter()
            .rev()
            .map(|frame| &frame.original)
            .find(|node| node.kind() == kind)
    }

    /// Number of nodes on the current path, the current one included
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
