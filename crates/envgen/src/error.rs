use std::fmt;

use envgen_runtime::InferError;
use thiserror::Error;

/// An error raised while reading declarations or generating code from them.
#[derive(Debug)]
pub struct Error {
    /// File or source label the declarations came from.
    pub source_name: Option<String>,
    /// 1-based line of the offending declaration.
    pub line: Option<usize>,
    pub kind: ErrorKind,
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("line `{line}` doesn't match format")]
    Format { line: String },
    #[error("variable {name} is declared more than once")]
    Duplicate { name: String },
    #[error(transparent)]
    Infer(#[from] InferError),
    #[error("invalid variable name {name}: {reason}")]
    InvalidName { name: String, reason: String },
    #[error("{name} conflicts with another declaration: {reason}")]
    Conflict { name: String, reason: String },
    #[error("generated code is not valid Rust: {message}")]
    Render { message: String, raw: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.source_name, self.line) {
            (Some(source), Some(line)) => write!(f, "{source}:{line}: ")?,
            (Some(source), None) => write!(f, "{source}: ")?,
            (None, Some(line)) => write!(f, "line {line}: ")?,
            (None, None) => {}
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Infer(err) => Some(err),
            ErrorKind::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            source_name: None,
            line: None,
            kind,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        ErrorKind::Io(err).into()
    }
}

impl Error {
    pub fn format(line: impl Into<String>) -> Self {
        ErrorKind::Format { line: line.into() }.into()
    }

    pub fn duplicate(line_no: usize, name: impl Into<String>) -> Self {
        Self::from(ErrorKind::Duplicate { name: name.into() }).at_line(line_no)
    }

    pub fn infer(line_no: usize, err: InferError) -> Self {
        Self::from(ErrorKind::Infer(err)).at_line(line_no)
    }

    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ErrorKind::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
        .into()
    }

    pub fn conflict(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ErrorKind::Conflict {
            name: name.into(),
            reason: reason.into(),
        }
        .into()
    }

    pub fn render(message: impl Into<String>, raw: impl Into<String>) -> Self {
        ErrorKind::Render {
            message: message.into(),
            raw: raw.into(),
        }
        .into()
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn in_source(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    /// The unformatted generator output, when formatting it failed.
    pub fn raw_output(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Render { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
