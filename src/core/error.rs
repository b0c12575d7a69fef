use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadQuery,
    InvalidName,
    Unsupported,
    NotFound,
    AlreadyExists,
    TypeMismatch,
    Arithmetic,
    Duplicate,
    Runtime,
    Serialization,
    Internal,
}

impl ErrorKind {
    /// Response status code reported for this kind of failure.
    /// Malformed queries are 102, everything detected while running is 103.
    pub fn status(&self) -> u32 {
        match self {
            ErrorKind::BadQuery | ErrorKind::InvalidName | ErrorKind::Unsupported => 102,
            _ => 103,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: String) -> Self {
        Error { kind, context }
    }

    pub fn bad_query(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::BadQuery, format!("Bad Query: {}", context.into()))
    }

    pub fn invalid_name(name: &str) -> Self {
        Error::new(
            ErrorKind::InvalidName,
            format!("Bad Query: Invalid name '{}'. (Use A-Za-z0-9_ only.)", name),
        )
    }

    pub fn unsupported(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Unsupported, format!("Bad Query: {}", context.into()))
    }

    pub fn type_mismatch(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::TypeMismatch, context.into())
    }

    pub fn runtime(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Runtime, context.into())
    }

    pub fn status(&self) -> u32 {
        self.kind.status()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.context)
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Serialization,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
