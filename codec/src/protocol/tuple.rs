//! Compact primitives with a presence bitset, for the positional scheme.
//!
//! Every primitive is written exactly as [super::CompactOutput] writes it. Records are
//! not framed by field headers: each record begins with a presence [BitSet] followed by
//! the values of its present fields in schema order.
//!
//! The tuple protocol assumes both sides share the same schema; a bitset carries no
//! field ids and unknown fields cannot be skipped.

use super::{CompactInput, CompactOutput, InputProtocol, OutputProtocol, SchemeKind};
use crate::{BitSet, Error, FieldHeader, Limits, ListHeader, MapHeader, WireType};
use bytes::{Buf, BufMut, Bytes};

/// Forwards methods to the wrapped compact protocol.
macro_rules! delegate {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        $(
            fn $name(&mut self, $($arg: $ty),*) -> $ret {
                self.inner.$name($($arg),*)
            }
        )*
    };
}

/// Writes values with the tuple protocol.
#[derive(Debug)]
pub struct TupleOutput<B: BufMut> {
    inner: CompactOutput<B>,
}

impl<B: BufMut> TupleOutput<B> {
    pub fn new(buf: B) -> Self {
        Self {
            inner: CompactOutput::new(buf),
        }
    }

    /// Consumes the protocol, returning the underlying sink.
    pub fn into_inner(self) -> B {
        self.inner.into_inner()
    }
}

impl<B: BufMut> OutputProtocol for TupleOutput<B> {
    fn scheme(&self) -> SchemeKind {
        SchemeKind::Positional
    }

    delegate! {
        write_struct_begin(name: &str) -> Result<(), Error>;
        write_struct_end() -> Result<(), Error>;
        write_field_begin(header: FieldHeader) -> Result<(), Error>;
        write_field_end() -> Result<(), Error>;
        write_field_stop() -> Result<(), Error>;
        write_list_begin(header: ListHeader) -> Result<(), Error>;
        write_list_end() -> Result<(), Error>;
        write_map_begin(header: MapHeader) -> Result<(), Error>;
        write_map_end() -> Result<(), Error>;
        write_bool(value: bool) -> Result<(), Error>;
        write_byte(value: i8) -> Result<(), Error>;
        write_i16(value: i16) -> Result<(), Error>;
        write_i32(value: i32) -> Result<(), Error>;
        write_i64(value: i64) -> Result<(), Error>;
        write_double(value: f64) -> Result<(), Error>;
        write_string(value: &str) -> Result<(), Error>;
        write_binary(value: &[u8]) -> Result<(), Error>;
    }

    fn write_bitset(&mut self, bits: &BitSet) -> Result<(), Error> {
        for byte in bits.to_bytes() {
            self.inner.put_u8(byte);
        }
        Ok(())
    }
}

/// Reads values with the tuple protocol.
#[derive(Debug)]
pub struct TupleInput<B: Buf> {
    inner: CompactInput<B>,
}

impl<B: Buf> TupleInput<B> {
    pub fn new(buf: B, limits: Limits) -> Self {
        Self {
            inner: CompactInput::new(buf, limits),
        }
    }

    /// Consumes the protocol, returning the underlying source.
    pub fn into_inner(self) -> B {
        self.inner.into_inner()
    }
}

impl<B: Buf> InputProtocol for TupleInput<B> {
    fn scheme(&self) -> SchemeKind {
        SchemeKind::Positional
    }

    fn limits(&self) -> &Limits {
        self.inner.limits()
    }

    fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    fn decrement_depth(&mut self) {
        self.inner.decrement_depth();
    }

    delegate! {
        increment_depth() -> Result<(), Error>;
        read_struct_begin() -> Result<(), Error>;
        read_struct_end() -> Result<(), Error>;
        read_field_begin() -> Result<FieldHeader, Error>;
        read_field_end() -> Result<(), Error>;
        read_list_begin() -> Result<ListHeader, Error>;
        read_list_end() -> Result<(), Error>;
        read_set_begin() -> Result<ListHeader, Error>;
        read_set_end() -> Result<(), Error>;
        read_map_begin() -> Result<MapHeader, Error>;
        read_map_end() -> Result<(), Error>;
        read_bool() -> Result<bool, Error>;
        read_byte() -> Result<i8, Error>;
        read_i16() -> Result<i16, Error>;
        read_i32() -> Result<i32, Error>;
        read_i64() -> Result<i64, Error>;
        read_double() -> Result<f64, Error>;
        read_string() -> Result<String, Error>;
        read_binary() -> Result<Bytes, Error>;
        skip(wire_type: WireType) -> Result<(), Error>;
    }

    fn read_bitset(&mut self, len: usize) -> Result<BitSet, Error> {
        let encoded_len = BitSet::encoded_len(len);
        let mut bytes = Vec::with_capacity(encoded_len);
        for _ in 0..encoded_len {
            bytes.push(self.inner.get_u8()?);
        }
        Ok(BitSet::from_bytes(&bytes, len))
    }
}
