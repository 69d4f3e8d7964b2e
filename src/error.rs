use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire accessor crate.
pub type Result<T> = std::result::Result<T, AccessorErr>;

/// The accessor crate's error type.
#[derive(Debug)]
pub enum AccessorErr {
    /// A record buffer doesn't have any of the lengths its layout allows.
    RecordSize {
        record: &'static str,
        got: usize,
        expected: usize,
    },
    /// Two batches handed to the same operation have different lengths.
    BatchMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    /// A text dump holds fewer fields than any record needs.
    TooFewFields { got: usize, min: usize },
    /// A text dump holds more fields than the record can store.
    TooManyFields { got: usize, max: usize },
    /// A token of a text dump isn't a float.
    InvalidToken { position: usize, token: String },
    /// A line of a table dump isn't a `key<TAB>record` pair.
    MalformedLine { line: usize, content: String },
    /// `get_field` was asked for a field it doesn't expose.
    UnknownField(String),
    /// The accessor specification is inconsistent.
    InvalidSpec(String),
    Io(io::Error),
    Json(serde_json::Error),
}

impl Display for AccessorErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessorErr::RecordSize {
                record,
                got,
                expected,
            } => write!(
                f,
                "invalid {record} record length, got {got} slots and expected {expected}"
            ),
            AccessorErr::BatchMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "there's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            AccessorErr::TooFewFields { got, min } => {
                write!(f, "expected at least {min} fields in the record dump, got {got}")
            }
            AccessorErr::TooManyFields { got, max } => {
                write!(f, "the record dump has {got} fields but the record holds {max}")
            }
            AccessorErr::InvalidToken { position, token } => {
                write!(f, "field {position} of the record dump isn't a float: {token:?}")
            }
            AccessorErr::MalformedLine { line, content } => {
                write!(f, "line {line} of the table dump isn't a key and a record: {content:?}")
            }
            AccessorErr::UnknownField(name) => write!(f, "unknown accessor field {name:?}"),
            AccessorErr::InvalidSpec(detail) => write!(f, "invalid accessor spec: {detail}"),
            AccessorErr::Io(e) => write!(f, "io error: {e}"),
            AccessorErr::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for AccessorErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AccessorErr::Io(e) => Some(e),
            AccessorErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for AccessorErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AccessorErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Boundary conversion for the binary.
impl From<AccessorErr> for io::Error {
    fn from(value: AccessorErr) -> Self {
        match value {
            AccessorErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
