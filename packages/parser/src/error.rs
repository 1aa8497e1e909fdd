use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed markup at {pos}: {message}")]
    Malformed { pos: usize, message: String },

    #[error("Unexpected end of file at {pos}: unclosed element <{tag}>")]
    UnexpectedEof { pos: usize, tag: String },

    #[error("Unexpected closing tag </{found}> at {pos}")]
    UnexpectedClose { pos: usize, found: String },

    #[error("Document has no root element")]
    MissingRoot,

    #[error("Second root element <{tag}> at {pos}")]
    MultipleRoots { pos: usize, tag: String },

    #[error("Text outside the root element at {pos}")]
    StrayText { pos: usize },
}

impl ParseError {
    pub fn malformed(pos: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            pos,
            message: message.into(),
        }
    }

    pub fn unexpected_eof(pos: usize, tag: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            pos,
            tag: tag.into(),
        }
    }

    pub fn unexpected_close(pos: usize, found: impl Into<String>) -> Self {
        Self::UnexpectedClose {
            pos,
            found: found.into(),
        }
    }

    pub fn multiple_roots(pos: usize, tag: impl Into<String>) -> Self {
        Self::MultipleRoots {
            pos,
            tag: tag.into(),
        }
    }

    /// Byte offset the error was detected at, if known
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Malformed { pos, .. }
            | Self::UnexpectedEof { pos, .. }
            | Self::UnexpectedClose { pos, .. }
            | Self::MultipleRoots { pos, .. }
            | Self::StrayText { pos } => Some(*pos),
            Self::MissingRoot => None,
        }
    }
}
