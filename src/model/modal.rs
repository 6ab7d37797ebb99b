//! Modal overlays drawn above the playground

/// A modal overlay. Only the top modal receives input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Keyboard shortcuts
    Help,
    /// Resolved compile requests
    History,
}

/// A stack of modal overlays, rendered bottom to top
#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<Modal> {
        self.stack.last().copied()
    }

    /// Push `modal`, or pop it if it is already on top
    pub fn toggle(&mut self, modal: Modal) {
        if self.top() == Some(modal) {
            self.stack.pop();
        } else {
            self.stack.push(modal);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
