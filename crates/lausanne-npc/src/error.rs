use std::fmt;

/// Which dialogue an NPC was trying to open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueKind {
    Auto,
    Demand,
}

impl fmt::Display for DialogueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueKind::Auto => f.write_str("auto"),
            DialogueKind::Demand => f.write_str("demand"),
        }
    }
}

/// Errors that can occur in the NPC systems.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NpcError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no {kind} dialogue content for '{id}'")]
    MissingContent { kind: DialogueKind, id: String },

    #[error("invalid NPC configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed dialogue template: {0}")]
    Template(String),
}

pub type NpcResult<T> = Result<T, NpcError>;
