//! Fixed-width big-endian protocol.
//!
//! # Format
//!
//! ```text
//! field header : type (u8) | id (i16)
//! stop         : 0x00
//! list / set   : element type (u8) | size (i32)
//! map          : key type (u8) | value type (u8) | size (i32)
//! string       : length (i32) | bytes
//! bool         : 0x00 or 0x01
//! ```
//!
//! Integers and doubles are written big-endian at their natural width. Struct boundaries
//! produce no bytes.

use super::{checked_len, ensure, wire_len, Depth, InputProtocol, OutputProtocol, SchemeKind};
use crate::{Error, FieldHeader, Limits, ListHeader, MapHeader, WireType};
use bytes::{Buf, BufMut, Bytes};

/// Writes values with the binary protocol.
#[derive(Debug)]
pub struct BinaryOutput<B: BufMut> {
    buf: B,
}

impl<B: BufMut> BinaryOutput<B> {
    pub fn new(buf: B) -> Self {
        Self { buf }
    }

    /// Consumes the protocol, returning the underlying sink.
    pub fn into_inner(self) -> B {
        self.buf
    }
}

impl<B: BufMut> OutputProtocol for BinaryOutput<B> {
    fn scheme(&self) -> SchemeKind {
        SchemeKind::Tagged
    }

    fn write_struct_begin(&mut self, _name: &str) -> Result<(), Error> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_field_begin(&mut self, header: FieldHeader) -> Result<(), Error> {
        self.buf.put_u8(header.wire_type.code());
        self.buf.put_i16(header.id);
        Ok(())
    }

    fn write_field_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<(), Error> {
        self.buf.put_u8(WireType::Stop.code());
        Ok(())
    }

    fn write_list_begin(&mut self, header: ListHeader) -> Result<(), Error> {
        let size = wire_len(header.size)?;
        self.buf.put_u8(header.element.code());
        self.buf.put_i32(size);
        Ok(())
    }

    fn write_list_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_map_begin(&mut self, header: MapHeader) -> Result<(), Error> {
        let size = wire_len(header.size)?;
        self.buf.put_u8(header.key.code());
        self.buf.put_u8(header.value.code());
        self.buf.put_i32(size);
        Ok(())
    }

    fn write_map_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        self.buf.put_u8(u8::from(value));
        Ok(())
    }

    fn write_byte(&mut self, value: i8) -> Result<(), Error> {
        self.buf.put_i8(value);
        Ok(())
    }

    fn write_i16(&mut self, value: i16) -> Result<(), Error> {
        self.buf.put_i16(value);
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<(), Error> {
        self.buf.put_i32(value);
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> Result<(), Error> {
        self.buf.put_i64(value);
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<(), Error> {
        self.buf.put_f64(value);
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<(), Error> {
        self.write_binary(value.as_bytes())
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), Error> {
        let len = wire_len(value.len())?;
        self.buf.put_i32(len);
        self.buf.put_slice(value);
        Ok(())
    }
}

/// Reads values with the binary protocol.
#[derive(Debug)]
pub struct BinaryInput<B: Buf> {
    buf: B,
    limits: Limits,
    depth: Depth,
}

impl<B: Buf> BinaryInput<B> {
    pub fn new(buf: B, limits: Limits) -> Self {
        Self {
            buf,
            depth: Depth::new(limits.max_depth),
            limits,
        }
    }

    /// Consumes the protocol, returning the underlying source.
    pub fn into_inner(self) -> B {
        self.buf
    }

    fn read_wire_type(&mut self) -> Result<WireType, Error> {
        ensure(&self.buf, 1)?;
        WireType::try_from(self.buf.get_u8())
    }

    fn read_size(&mut self) -> Result<usize, Error> {
        ensure(&self.buf, 4)?;
        let raw = self.buf.get_i32();
        checked_len(raw.into(), &self.limits.container_length)
    }
}

impl<B: Buf> InputProtocol for BinaryInput<B> {
    fn scheme(&self) -> SchemeKind {
        SchemeKind::Tagged
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn increment_depth(&mut self) -> Result<(), Error> {
        self.depth.enter()
    }

    fn decrement_depth(&mut self) {
        self.depth.exit();
    }

    fn read_struct_begin(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldHeader, Error> {
        let wire_type = self.read_wire_type()?;
        if wire_type == WireType::Stop {
            return Ok(FieldHeader::STOP);
        }
        ensure(&self.buf, 2)?;
        let id = self.buf.get_i16();
        Ok(FieldHeader::new(wire_type, id))
    }

    fn read_field_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<ListHeader, Error> {
        let element = self.read_wire_type()?;
        let size = self.read_size()?;
        Ok(ListHeader::new(element, size))
    }

    fn read_list_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<ListHeader, Error> {
        self.read_list_begin()
    }

    fn read_set_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<MapHeader, Error> {
        let key = self.read_wire_type()?;
        let value = self.read_wire_type()?;
        let size = self.read_size()?;
        Ok(MapHeader::new(key, value, size))
    }

    fn read_map_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool, Error> {
        ensure(&self.buf, 1)?;
        match self.buf.get_u8() {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::InvalidBool(other)),
        }
    }

    fn read_byte(&mut self) -> Result<i8, Error> {
        ensure(&self.buf, 1)?;
        Ok(self.buf.get_i8())
    }

    fn read_i16(&mut self) -> Result<i16, Error> {
        ensure(&self.buf, 2)?;
        Ok(self.buf.get_i16())
    }

    fn read_i32(&mut self) -> Result<i32, Error> {
        ensure(&self.buf, 4)?;
        Ok(self.buf.get_i32())
    }

    fn read_i64(&mut self) -> Result<i64, Error> {
        ensure(&self.buf, 8)?;
        Ok(self.buf.get_i64())
    }

    fn read_double(&mut self) -> Result<f64, Error> {
        ensure(&self.buf, 8)?;
        Ok(self.buf.get_f64())
    }

    fn read_string(&mut self) -> Result<String, Error> {
        let bytes = self.read_binary()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidUtf8)
    }

    fn read_binary(&mut self) -> Result<Bytes, Error> {
        ensure(&self.buf, 4)?;
        let raw = self.buf.get_i32();
        let len = checked_len(raw.into(), &self.limits.string_length)?;
        ensure(&self.buf, len)?;
        Ok(self.buf.copy_to_bytes(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_primitive_layout() {
        let mut output = BinaryOutput::new(BytesMut::new());
        output.write_i16(0x0102).unwrap();
        output.write_i32(-1).unwrap();
        output.write_bool(true).unwrap();
        output.write_string("hi").unwrap();
        output.write_double(1.0).unwrap();
        let bytes = output.into_inner();
        assert_eq!(
            &bytes[..],
            &[
                0x01, 0x02, // i16
                0xFF, 0xFF, 0xFF, 0xFF, // i32
                0x01, // bool
                0x00, 0x00, 0x00, 0x02, b'h', b'i', // string
                0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // double
            ]
        );

        let mut input = BinaryInput::new(bytes.freeze(), Limits::default());
        assert_eq!(input.read_i16().unwrap(), 0x0102);
        assert_eq!(input.read_i32().unwrap(), -1);
        assert!(input.read_bool().unwrap());
        assert_eq!(input.read_string().unwrap(), "hi");
        assert_eq!(input.read_double().unwrap(), 1.0);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_headers() {
        let mut output = BinaryOutput::new(BytesMut::new());
        output
            .write_field_begin(FieldHeader::new(WireType::List, 3))
            .unwrap();
        output
            .write_list_begin(ListHeader::new(WireType::Struct, 2))
            .unwrap();
        output
            .write_map_begin(MapHeader::new(WireType::String, WireType::I64, 1))
            .unwrap();
        output.write_field_stop().unwrap();
        let bytes = output.into_inner();
        assert_eq!(
            &bytes[..],
            &[15, 0, 3, 12, 0, 0, 0, 2, 11, 10, 0, 0, 0, 1, 0]
        );

        let mut input = BinaryInput::new(bytes.freeze(), Limits::default());
        assert_eq!(
            input.read_field_begin().unwrap(),
            FieldHeader::new(WireType::List, 3)
        );
        assert_eq!(
            input.read_list_begin().unwrap(),
            ListHeader::new(WireType::Struct, 2)
        );
        assert_eq!(
            input.read_map_begin().unwrap(),
            MapHeader::new(WireType::String, WireType::I64, 1)
        );
        assert!(input.read_field_begin().unwrap().is_stop());
    }

    #[test]
    fn test_truncated() {
        let mut input = BinaryInput::new(Bytes::from_static(&[0x00, 0x01]), Limits::default());
        assert!(matches!(input.read_i32(), Err(Error::EndOfBuffer)));

        // Length claims more bytes than remain.
        let mut input = BinaryInput::new(
            Bytes::from_static(&[0x00, 0x00, 0x00, 0x05, b'a']),
            Limits::default(),
        );
        assert!(matches!(input.read_string(), Err(Error::EndOfBuffer)));
    }

    #[test]
    fn test_invalid_values() {
        let mut input = BinaryInput::new(Bytes::from_static(&[0x02]), Limits::default());
        assert!(matches!(input.read_bool(), Err(Error::InvalidBool(2))));

        let mut input = BinaryInput::new(Bytes::from_static(&[0x07, 0x00, 0x01]), Limits::default());
        assert!(matches!(
            input.read_field_begin(),
            Err(Error::InvalidWireType(7))
        ));

        let mut input = BinaryInput::new(
            Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFF]),
            Limits::default(),
        );
        assert!(matches!(input.read_binary(), Err(Error::InvalidLength(-1))));

        let mut input = BinaryInput::new(
            Bytes::from_static(&[0x00, 0x00, 0x00, 0x02, 0xC3, 0x28]),
            Limits::default(),
        );
        assert!(matches!(input.read_string(), Err(Error::InvalidUtf8)));
    }

    #[test]
    fn test_string_limit() {
        let limits = Limits {
            string_length: (..=3).into(),
            ..Limits::default()
        };
        let mut input = BinaryInput::new(
            Bytes::from_static(&[0x00, 0x00, 0x00, 0x04, b'a', b'b', b'c', b'd']),
            limits,
        );
        assert!(matches!(input.read_string(), Err(Error::InvalidLength(4))));
    }

    #[test]
    fn test_skip_nested() {
        // struct { 1: list<i32> [7, 8], 2: struct { 1: string "x" } }
        let mut output = BinaryOutput::new(BytesMut::new());
        output.write_struct_begin("Outer").unwrap();
        output
            .write_field_begin(FieldHeader::new(WireType::List, 1))
            .unwrap();
        output
            .write_list_begin(ListHeader::new(WireType::I32, 2))
            .unwrap();
        output.write_i32(7).unwrap();
        output.write_i32(8).unwrap();
        output.write_list_end().unwrap();
        output.write_field_end().unwrap();
        output
            .write_field_begin(FieldHeader::new(WireType::Struct, 2))
            .unwrap();
        output
            .write_field_begin(FieldHeader::new(WireType::String, 1))
            .unwrap();
        output.write_string("x").unwrap();
        output.write_field_end().unwrap();
        output.write_field_stop().unwrap();
        output.write_field_end().unwrap();
        output.write_field_stop().unwrap();
        output.write_struct_end().unwrap();
        output.write_byte(0x2A).unwrap();

        let mut input = BinaryInput::new(output.into_inner().freeze(), Limits::default());
        input.skip(WireType::Struct).unwrap();
        assert_eq!(input.read_byte().unwrap(), 0x2A);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_skip_depth_limit() {
        // Three nested lists of lists.
        let bytes = Bytes::from_static(&[
            15, 0, 0, 0, 1, // list<list>
            15, 0, 0, 0, 1, // list<list>
            8, 0, 0, 0, 0, // list<i32> (empty)
        ]);
        let mut input = BinaryInput::new(bytes.clone(), Limits::default().with_max_depth(2));
        assert!(matches!(input.skip(WireType::List), Err(Error::DepthLimit(2))));

        let mut input = BinaryInput::new(bytes, Limits::default().with_max_depth(3));
        input.skip(WireType::List).unwrap();
        assert_eq!(input.remaining(), 0);
    }
}
