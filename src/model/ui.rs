//! UI state - presentation state separate from domain data

/// Panel receiving keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Editor,
    Examples,
}

impl Focus {
    pub fn next(self) -> Focus {
        match self {
            Focus::Editor => Focus::Examples,
            Focus::Examples => Focus::Editor,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Focus::Editor => "Editor",
            Focus::Examples => "Examples",
        }
    }
}
