use crate::node::NodeId;

/// Tracks which node is currently focused.
#[derive(Debug, Default)]
pub struct FocusState {
    focused: Option<NodeId>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the currently focused node.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Focus a node.
    /// Returns the previously focused node if focus changed, `Some(None)` if
    /// nothing was focused before, and `None` if the node already had focus.
    pub fn focus(&mut self, node: NodeId) -> Option<Option<NodeId>> {
        if self.focused == Some(node) {
            return None;
        }
        Some(self.focused.replace(node))
    }

    /// Clear focus.
    /// Returns the node that lost focus, if any.
    pub fn blur(&mut self) -> Option<NodeId> {
        self.focused.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_reports_previous() {
        let mut state = FocusState::new();
        assert_eq!(state.focus(NodeId(1)), Some(None));
        assert_eq!(state.focus(NodeId(1)), None);
        assert_eq!(state.focus(NodeId(2)), Some(Some(NodeId(1))));
        assert_eq!(state.focused(), Some(NodeId(2)));
    }

    #[test]
    fn test_blur() {
        let mut state = FocusState::new();
        assert_eq!(state.blur(), None);
        state.focus(NodeId(3));
        assert_eq!(state.blur(), Some(NodeId(3)));
        assert_eq!(state.focused(), None);
    }
}
