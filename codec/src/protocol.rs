//! Protocol contexts: the primitive readers and writers a record is encoded with.
//!
//! A protocol turns the structural events of a record (struct/field/container boundaries)
//! and its primitive values into bytes on a [bytes::BufMut] sink, and back from a
//! [bytes::Buf] source. Each protocol also names the [SchemeKind] that records must use
//! with it:
//!
//! - [BinaryOutput]/[BinaryInput]: fixed-width big-endian encoding, tagged scheme.
//! - [CompactOutput]/[CompactInput]: varint encoding with field-id deltas, tagged scheme.
//! - [TupleOutput]/[TupleInput]: compact primitives plus a presence bitset, positional
//!   scheme.

use crate::{BitSet, Error, FieldHeader, Limits, ListHeader, MapHeader, RangeCfg, WireType};
use bytes::{Buf, Bytes};

mod binary;
pub use binary::{BinaryInput, BinaryOutput};
mod compact;
pub use compact::{CompactInput, CompactOutput};
mod tuple;
pub use tuple::{TupleInput, TupleOutput};

/// The encoding scheme a protocol requires records to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemeKind {
    /// Self-describing: every field carries its id and wire type.
    Tagged,
    /// Compact: a presence bitmap followed by untagged values in schema order.
    Positional,
}

/// A sink of encoded values.
pub trait OutputProtocol {
    /// The scheme records must use when written to this protocol.
    fn scheme(&self) -> SchemeKind;

    fn write_struct_begin(&mut self, name: &str) -> Result<(), Error>;
    fn write_struct_end(&mut self) -> Result<(), Error>;
    fn write_field_begin(&mut self, header: FieldHeader) -> Result<(), Error>;
    fn write_field_end(&mut self) -> Result<(), Error>;
    fn write_field_stop(&mut self) -> Result<(), Error>;
    fn write_list_begin(&mut self, header: ListHeader) -> Result<(), Error>;
    fn write_list_end(&mut self) -> Result<(), Error>;
    fn write_map_begin(&mut self, header: MapHeader) -> Result<(), Error>;
    fn write_map_end(&mut self) -> Result<(), Error>;

    fn write_bool(&mut self, value: bool) -> Result<(), Error>;
    fn write_byte(&mut self, value: i8) -> Result<(), Error>;
    fn write_i16(&mut self, value: i16) -> Result<(), Error>;
    fn write_i32(&mut self, value: i32) -> Result<(), Error>;
    fn write_i64(&mut self, value: i64) -> Result<(), Error>;
    fn write_double(&mut self, value: f64) -> Result<(), Error>;
    fn write_string(&mut self, value: &str) -> Result<(), Error>;
    fn write_binary(&mut self, value: &[u8]) -> Result<(), Error>;

    /// Writes a presence bitmap.
    ///
    /// Only protocols using [SchemeKind::Positional] support bitsets.
    fn write_bitset(&mut self, _bits: &BitSet) -> Result<(), Error> {
        Err(Error::Unsupported("bitsets"))
    }
}

/// A source of encoded values.
pub trait InputProtocol {
    /// The scheme records must use when read from this protocol.
    fn scheme(&self) -> SchemeKind;

    /// The limits applied to lengths read from this protocol.
    fn limits(&self) -> &Limits;

    /// Number of unread bytes left in the source.
    fn remaining(&self) -> usize;

    /// Records entry into a nested record or container.
    ///
    /// Fails with [Error::DepthLimit] once [Limits::max_depth] is reached.
    fn increment_depth(&mut self) -> Result<(), Error>;

    /// Records exit from a nested record or container.
    fn decrement_depth(&mut self);

    fn read_struct_begin(&mut self) -> Result<(), Error>;
    fn read_struct_end(&mut self) -> Result<(), Error>;
    fn read_field_begin(&mut self) -> Result<FieldHeader, Error>;
    fn read_field_end(&mut self) -> Result<(), Error>;
    fn read_list_begin(&mut self) -> Result<ListHeader, Error>;
    fn read_list_end(&mut self) -> Result<(), Error>;
    fn read_set_begin(&mut self) -> Result<ListHeader, Error>;
    fn read_set_end(&mut self) -> Result<(), Error>;
    fn read_map_begin(&mut self) -> Result<MapHeader, Error>;
    fn read_map_end(&mut self) -> Result<(), Error>;

    fn read_bool(&mut self) -> Result<bool, Error>;
    fn read_byte(&mut self) -> Result<i8, Error>;
    fn read_i16(&mut self) -> Result<i16, Error>;
    fn read_i32(&mut self) -> Result<i32, Error>;
    fn read_i64(&mut self) -> Result<i64, Error>;
    fn read_double(&mut self) -> Result<f64, Error>;
    fn read_string(&mut self) -> Result<String, Error>;
    fn read_binary(&mut self) -> Result<Bytes, Error>;

    /// Reads a presence bitmap of `len` bits.
    ///
    /// Only protocols using [SchemeKind::Positional] support bitsets.
    fn read_bitset(&mut self, _len: usize) -> Result<BitSet, Error> {
        Err(Error::Unsupported("bitsets"))
    }

    /// Consumes and discards one encoded value of the given type.
    fn skip(&mut self, wire_type: WireType) -> Result<(), Error> {
        skip(self, wire_type)
    }
}

/// Consumes one value of `wire_type` from `input` without interpreting it, recursing into
/// records and containers.
pub fn skip<P: InputProtocol + ?Sized>(input: &mut P, wire_type: WireType) -> Result<(), Error> {
    match wire_type {
        WireType::Stop => Err(Error::InvalidWireType(WireType::Stop.code())),
        WireType::Bool => input.read_bool().map(drop),
        WireType::Byte => input.read_byte().map(drop),
        WireType::Double => input.read_double().map(drop),
        WireType::I16 => input.read_i16().map(drop),
        WireType::I32 => input.read_i32().map(drop),
        WireType::I64 => input.read_i64().map(drop),
        WireType::String => input.read_binary().map(drop),
        WireType::Struct => {
            input.increment_depth()?;
            input.read_struct_begin()?;
            loop {
                let header = input.read_field_begin()?;
                if header.is_stop() {
                    break;
                }
                skip(input, header.wire_type)?;
                input.read_field_end()?;
            }
            input.read_struct_end()?;
            input.decrement_depth();
            Ok(())
        }
        WireType::Map => {
            input.increment_depth()?;
            let header = input.read_map_begin()?;
            for _ in 0..header.size {
                skip(input, header.key)?;
                skip(input, header.value)?;
            }
            input.read_map_end()?;
            input.decrement_depth();
            Ok(())
        }
        WireType::Set => {
            input.increment_depth()?;
            let header = input.read_set_begin()?;
            for _ in 0..header.size {
                skip(input, header.element)?;
            }
            input.read_set_end()?;
            input.decrement_depth();
            Ok(())
        }
        WireType::List => {
            input.increment_depth()?;
            let header = input.read_list_begin()?;
            for _ in 0..header.size {
                skip(input, header.element)?;
            }
            input.read_list_end()?;
            input.decrement_depth();
            Ok(())
        }
    }
}

/// Nesting counter shared by the input protocols.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Depth {
    current: usize,
    max: usize,
}

impl Depth {
    pub(crate) fn new(max: usize) -> Self {
        Self { current: 0, max }
    }

    pub(crate) fn enter(&mut self) -> Result<(), Error> {
        if self.current >= self.max {
            return Err(Error::DepthLimit(self.max));
        }
        self.current += 1;
        Ok(())
    }

    pub(crate) fn exit(&mut self) {
        self.current = self.current.saturating_sub(1);
    }
}

/// Returns an error if fewer than `len` bytes remain in `buf`.
#[inline]
pub(crate) fn ensure(buf: &impl Buf, len: usize) -> Result<(), Error> {
    if buf.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    Ok(())
}

/// Converts a length read from the wire into a `usize`, checking it against `range`.
pub(crate) fn checked_len(raw: i64, range: &RangeCfg<usize>) -> Result<usize, Error> {
    let len = usize::try_from(raw).map_err(|_| Error::InvalidLength(raw))?;
    if !range.contains(&len) {
        return Err(Error::InvalidLength(raw));
    }
    Ok(len)
}

/// Converts a length into the `i32` carried on the wire.
pub(crate) fn wire_len(len: usize) -> Result<i32, Error> {
    i32::try_from(len).map_err(|_| Error::InvalidLength(i64::try_from(len).unwrap_or(i64::MAX)))
}
