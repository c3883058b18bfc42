//! The single shared document.

/// Current document content.
///
/// Last write wins: every content change replaces the whole blob, with
/// no merge and no history. Readers always see either the old or the
/// new content since the store is only touched by its single owner.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentState {
    content: String,
}

impl DocumentState {
    pub fn new() -> Self {
        DocumentState::default()
    }

    pub fn get(&self) -> &str {
        &self.content
    }

    /// Replace the content wholesale.
    pub fn set(&mut self, content: String) {
        self.content = content;
    }
}
