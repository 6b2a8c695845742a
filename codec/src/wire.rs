//! Wire types and the headers exchanged with a protocol.

use crate::Error;
use core::fmt;

/// Coarse type category of an encoded value.
///
/// The discriminants are the type codes written by the binary protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum WireType {
    Stop = 0,
    Bool = 2,
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl WireType {
    /// Returns the type code of this wire type.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Stop,
            2 => Self::Bool,
            3 => Self::Byte,
            4 => Self::Double,
            6 => Self::I16,
            8 => Self::I32,
            10 => Self::I64,
            11 => Self::String,
            12 => Self::Struct,
            13 => Self::Map,
            14 => Self::Set,
            15 => Self::List,
            _ => return Err(Error::InvalidWireType(code)),
        })
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stop => "stop",
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Double => "double",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::String => "string",
            Self::Struct => "struct",
            Self::Map => "map",
            Self::Set => "set",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

/// Header preceding each field of a record in the tagged scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldHeader {
    pub wire_type: WireType,
    pub id: i16,
}

impl FieldHeader {
    /// The marker that terminates the fields of a record.
    pub const STOP: Self = Self {
        wire_type: WireType::Stop,
        id: 0,
    };

    pub fn new(wire_type: WireType, id: i16) -> Self {
        Self { wire_type, id }
    }

    /// Returns true if this header terminates a record.
    #[inline]
    pub fn is_stop(&self) -> bool {
        self.wire_type == WireType::Stop
    }
}

/// Header preceding the elements of a list or set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListHeader {
    pub element: WireType,
    pub size: usize,
}

impl ListHeader {
    pub fn new(element: WireType, size: usize) -> Self {
        Self { element, size }
    }
}

/// Header preceding the entries of a map.
///
/// Protocols that do not encode the key and value types of an empty map report them as
/// [WireType::Stop].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapHeader {
    pub key: WireType,
    pub value: WireType,
    pub size: usize,
}

impl MapHeader {
    pub fn new(key: WireType, value: WireType, size: usize) -> Self {
        Self { key, value, size }
    }
}
