//! One-shot encoding and decoding of whole records.

use crate::{
    BinaryInput, BinaryOutput, CompactInput, CompactOutput, Error, InputProtocol, Limits,
    Record, TupleInput, TupleOutput,
};
use bytes::{Buf, BytesMut};

/// The protocols available for one-shot encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    Binary,
    Compact,
    Tuple,
}

impl Protocol {
    /// Every protocol, in a fixed order.
    pub const ALL: [Protocol; 3] = [Protocol::Binary, Protocol::Compact, Protocol::Tuple];
}

/// Encodes `record` with `protocol`.
pub fn encode<R: Record>(record: &R, protocol: Protocol) -> Result<BytesMut, Error> {
    let mut buf = BytesMut::new();
    match protocol {
        Protocol::Binary => record.write(&mut BinaryOutput::new(&mut buf))?,
        Protocol::Compact => record.write(&mut CompactOutput::new(&mut buf))?,
        Protocol::Tuple => record.write(&mut TupleOutput::new(&mut buf))?,
    }
    Ok(buf)
}

/// Decodes a record from `buf` with `protocol` and default [Limits].
pub fn decode<R: Record>(buf: impl Buf, protocol: Protocol) -> Result<R, Error> {
    decode_with(buf, protocol, Limits::default())
}

/// Decodes a record from `buf` with `protocol`, enforcing `limits`.
///
/// Returns [Error::ExtraData] if bytes remain after the record.
pub fn decode_with<R: Record>(
    buf: impl Buf,
    protocol: Protocol,
    limits: Limits,
) -> Result<R, Error> {
    match protocol {
        Protocol::Binary => read_all(&mut BinaryInput::new(buf, limits)),
        Protocol::Compact => read_all(&mut CompactInput::new(buf, limits)),
        Protocol::Tuple => read_all(&mut TupleInput::new(buf, limits)),
    }
}

fn read_all<R: Record>(input: &mut dyn InputProtocol) -> Result<R, Error> {
    let record = R::read(input)?;
    let remaining = input.remaining();
    if remaining != 0 {
        return Err(Error::ExtraData(remaining));
    }
    Ok(record)
}

