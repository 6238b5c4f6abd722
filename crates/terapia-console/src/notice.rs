/// The single message slot shown next to a list or form.
///
/// Error and success share one slot, so setting either replaces the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Notice {
    #[default]
    None,
    Error(String),
    Success(String),
}

impl Notice {
    /// Error text, or `""` when the slot holds no error.
    pub fn error(&self) -> &str {
        match self {
            Notice::Error(msg) => msg,
            _ => "",
        }
    }

    /// Success text, or `""` when the slot holds no success message.
    pub fn success(&self) -> &str {
        match self {
            Notice::Success(msg) => msg,
            _ => "",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Notice::None)
    }
}
