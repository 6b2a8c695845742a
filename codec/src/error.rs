//! Error types for record codec operations

use thiserror::Error;

/// Error type for record codec operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("required field {record}.{field} is unset")]
    SchemaViolation {
        record: &'static str,
        field: &'static str,
    },
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    #[error("extra data found: {0} bytes")]
    ExtraData(usize),
    #[error("invalid wire type: {0}")]
    InvalidWireType(u8),
    #[error("invalid varint")]
    InvalidVarint,
    #[error("invalid bool: {0}")]
    InvalidBool(u8),
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
    #[error("invalid length: {0}")]
    InvalidLength(i64),
    #[error("nesting depth exceeded: {0}")]
    DepthLimit(usize),
    #[error("protocol does not support {0}")]
    Unsupported(&'static str),
    #[error("{record} has no field with id {id}")]
    UnknownFieldId { record: &'static str, id: i16 },
    #[error("value for {record}.{field} has the wrong type")]
    FieldTypeMismatch {
        record: &'static str,
        field: &'static str,
    },
}

impl Error {
    /// Returns true if the error was caused by a malformed byte stream (rather than by
    /// the contents of a record or misuse of the field accessors).
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Error::EndOfBuffer
                | Error::ExtraData(_)
                | Error::InvalidWireType(_)
                | Error::InvalidVarint
                | Error::InvalidBool(_)
                | Error::InvalidUtf8
                | Error::InvalidLength(_)
                | Error::DepthLimit(_)
        )
    }
}
