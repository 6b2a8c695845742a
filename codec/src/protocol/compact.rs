//! Varint protocol with field-id deltas.
//!
//! # Format
//!
//! ```text
//! field header : delta (4 bits) | ctype (4 bits)          when 0 < delta <= 15
//!                0000 | ctype (4 bits), id (zigzag varint)  otherwise
//! stop         : 0x00
//! list / set   : size (4 bits) | ctype (4 bits)            when size < 15
//!                1111 | ctype (4 bits), size (varint)       otherwise
//! map          : 0x00                                       when empty
//!                size (varint), key ctype | value ctype     otherwise
//! string       : length (varint) | bytes
//! ```
//!
//! `i16`, `i32` and `i64` are ZigZag varints, doubles are 8 bytes little-endian. The value
//! of a bool field is folded into its header (ctype 1 for true, 2 for false); a bool
//! outside a field header is a single byte using the same codes.

use super::{checked_len, ensure, wire_len, Depth, InputProtocol, OutputProtocol, SchemeKind};
use crate::{varint, Error, FieldHeader, Limits, ListHeader, MapHeader, WireType};
use bytes::{Buf, BufMut, Bytes};

const CTYPE_BOOL_TRUE: u8 = 1;
const CTYPE_BOOL_FALSE: u8 = 2;

/// Largest list size that fits in the header nibble.
const SHORT_LIST_MAX: usize = 14;

/// Nibble marking a list size that follows as a varint.
const LONG_LIST_MARKER: u8 = 0x0F;

/// Largest field-id delta that fits in the header nibble.
const MAX_DELTA: i32 = 15;

/// Returns the compact type code of `wire_type`.
pub(crate) fn compact_type(wire_type: WireType) -> u8 {
    match wire_type {
        WireType::Stop => 0,
        WireType::Bool => CTYPE_BOOL_TRUE,
        WireType::Byte => 3,
        WireType::I16 => 4,
        WireType::I32 => 5,
        WireType::I64 => 6,
        WireType::Double => 7,
        WireType::String => 8,
        WireType::List => 9,
        WireType::Set => 10,
        WireType::Map => 11,
        WireType::Struct => 12,
    }
}

/// Returns the wire type of a compact type code.
pub(crate) fn wire_type(ctype: u8) -> Result<WireType, Error> {
    Ok(match ctype {
        0 => WireType::Stop,
        CTYPE_BOOL_TRUE | CTYPE_BOOL_FALSE => WireType::Bool,
        3 => WireType::Byte,
        4 => WireType::I16,
        5 => WireType::I32,
        6 => WireType::I64,
        7 => WireType::Double,
        8 => WireType::String,
        9 => WireType::List,
        10 => WireType::Set,
        11 => WireType::Map,
        12 => WireType::Struct,
        _ => return Err(Error::InvalidWireType(ctype)),
    })
}

/// Writes values with the compact protocol.
#[derive(Debug)]
pub struct CompactOutput<B: BufMut> {
    buf: B,
    last_field_id: i16,
    field_stack: Vec<i16>,
    pending_bool_field: Option<i16>,
}

impl<B: BufMut> CompactOutput<B> {
    pub fn new(buf: B) -> Self {
        Self {
            buf,
            last_field_id: 0,
            field_stack: Vec::new(),
            pending_bool_field: None,
        }
    }

    /// Consumes the protocol, returning the underlying sink.
    pub fn into_inner(self) -> B {
        self.buf
    }

    pub(crate) fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    fn write_field_header(&mut self, ctype: u8, id: i16) {
        let delta = i32::from(id) - i32::from(self.last_field_id);
        if delta > 0 && delta <= MAX_DELTA {
            self.buf.put_u8(((delta as u8) << 4) | ctype);
        } else {
            self.buf.put_u8(ctype);
            varint::write_i32(id.into(), &mut self.buf);
        }
        self.last_field_id = id;
    }

    fn write_collection_begin(&mut self, element: WireType, size: usize) -> Result<(), Error> {
        let len = wire_len(size)?;
        let ctype = compact_type(element);
        if size <= SHORT_LIST_MAX {
            self.buf.put_u8(((size as u8) << 4) | ctype);
        } else {
            self.buf.put_u8((LONG_LIST_MARKER << 4) | ctype);
            varint::write(len as u32, &mut self.buf);
        }
        Ok(())
    }
}

impl<B: BufMut> OutputProtocol for CompactOutput<B> {
    fn scheme(&self) -> SchemeKind {
        SchemeKind::Tagged
    }

    fn write_struct_begin(&mut self, _name: &str) -> Result<(), Error> {
        self.field_stack.push(self.last_field_id);
        self.last_field_id = 0;
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<(), Error> {
        self.last_field_id = self.field_stack.pop().unwrap_or(0);
        Ok(())
    }

    fn write_field_begin(&mut self, header: FieldHeader) -> Result<(), Error> {
        if header.wire_type == WireType::Bool {
            // Written once the value is known.
            self.pending_bool_field = Some(header.id);
        } else {
            self.write_field_header(compact_type(header.wire_type), header.id);
        }
        Ok(())
    }

    fn write_field_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<(), Error> {
        self.buf.put_u8(compact_type(WireType::Stop));
        Ok(())
    }

    fn write_list_begin(&mut self, header: ListHeader) -> Result<(), Error> {
        self.write_collection_begin(header.element, header.size)
    }

    fn write_list_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_map_begin(&mut self, header: MapHeader) -> Result<(), Error> {
        let len = wire_len(header.size)?;
        if len == 0 {
            self.buf.put_u8(0);
        } else {
            varint::write(len as u32, &mut self.buf);
            self.buf
                .put_u8((compact_type(header.key) << 4) | compact_type(header.value));
        }
        Ok(())
    }

    fn write_map_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        let ctype = if value {
            CTYPE_BOOL_TRUE
        } else {
            CTYPE_BOOL_FALSE
        };
        match self.pending_bool_field.take() {
            Some(id) => self.write_field_header(ctype, id),
            None => self.buf.put_u8(ctype),
        }
        Ok(())
    }

    fn write_byte(&mut self, value: i8) -> Result<(), Error> {
        self.buf.put_i8(value);
        Ok(())
    }

    fn write_i16(&mut self, value: i16) -> Result<(), Error> {
        varint::write_i32(value.into(), &mut self.buf);
        Ok(())
    }

    fn write_i32(&mut self, value: i32) -> Result<(), Error> {
        varint::write_i32(value, &mut self.buf);
        Ok(())
    }

    fn write_i64(&mut self, value: i64) -> Result<(), Error> {
        varint::write_i64(value, &mut self.buf);
        Ok(())
    }

    fn write_double(&mut self, value: f64) -> Result<(), Error> {
        self.buf.put_f64_le(value);
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<(), Error> {
        self.write_binary(value.as_bytes())
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<(), Error> {
        let len = wire_len(value.len())?;
        varint::write(len as u32, &mut self.buf);
        self.buf.put_slice(value);
        Ok(())
    }
}

/// Reads values with the compact protocol.
#[derive(Debug)]
pub struct CompactInput<B: Buf> {
    buf: B,
    limits: Limits,
    depth: Depth,
    last_field_id: i16,
    field_stack: Vec<i16>,
    pending_bool: Option<bool>,
}

impl<B: Buf> CompactInput<B> {
    pub fn new(buf: B, limits: Limits) -> Self {
        Self {
            buf,
            depth: Depth::new(limits.max_depth),
            limits,
            last_field_id: 0,
            field_stack: Vec::new(),
            pending_bool: None,
        }
    }

    /// Consumes the protocol, returning the underlying source.
    pub fn into_inner(self) -> B {
        self.buf
    }

    pub(crate) fn get_u8(&mut self) -> Result<u8, Error> {
        ensure(&self.buf, 1)?;
        Ok(self.buf.get_u8())
    }

    fn read_size(&mut self, size: u32) -> Result<usize, Error> {
        checked_len(size.into(), &self.limits.container_length)
    }
}

impl<B: Buf> InputProtocol for CompactInput<B> {
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
        self.field_stack.push(self.last_field_id);
        self.last_field_id = 0;
        Ok(())
    }

    fn read_struct_end(&mut self) -> Result<(), Error> {
        self.last_field_id = self.field_stack.pop().unwrap_or(0);
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldHeader, Error> {
        let byte = self.get_u8()?;
        let ctype = byte & 0x0F;
        let wire_type = wire_type(ctype)?;
        if wire_type == WireType::Stop {
            return Ok(FieldHeader::STOP);
        }

        let delta = byte >> 4;
        let id = if delta == 0 {
            self.read_i16()?
        } else {
            self.last_field_id.wrapping_add(i16::from(delta))
        };
        if wire_type == WireType::Bool {
            self.pending_bool = Some(ctype == CTYPE_BOOL_TRUE);
        }
        self.last_field_id = id;
        Ok(FieldHeader::new(wire_type, id))
    }

    fn read_field_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<ListHeader, Error> {
        let byte = self.get_u8()?;
        let element = wire_type(byte & 0x0F)?;
        let nibble = byte >> 4;
        let size = if nibble == LONG_LIST_MARKER {
            varint::read::<u32>(&mut self.buf)?
        } else {
            u32::from(nibble)
        };
        let size = self.read_size(size)?;
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
        let size = varint::read::<u32>(&mut self.buf)?;
        let size = self.read_size(size)?;
        if size == 0 {
            return Ok(MapHeader::new(WireType::Stop, WireType::Stop, 0));
        }
        let types = self.get_u8()?;
        let key = wire_type(types >> 4)?;
        let value = wire_type(types & 0x0F)?;
        Ok(MapHeader::new(key, value, size))
    }

    fn read_map_end(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool, Error> {
        if let Some(value) = self.pending_bool.take() {
            return Ok(value);
        }
        match self.get_u8()? {
            CTYPE_BOOL_TRUE => Ok(true),
            CTYPE_BOOL_FALSE => Ok(false),
            other => Err(Error::InvalidBool(other)),
        }
    }

    fn read_byte(&mut self) -> Result<i8, Error> {
        ensure(&self.buf, 1)?;
        Ok(self.buf.get_i8())
    }

    fn read_i16(&mut self) -> Result<i16, Error> {
        let value = varint::read_i32(&mut self.buf)?;
        i16::try_from(value).map_err(|_| Error::InvalidVarint)
    }

    fn read_i32(&mut self) -> Result<i32, Error> {
        varint::read_i32(&mut self.buf)
    }

    fn read_i64(&mut self) -> Result<i64, Error> {
        varint::read_i64(&mut self.buf)
    }

    fn read_double(&mut self) -> Result<f64, Error> {
        ensure(&self.buf, 8)?;
        Ok(self.buf.get_f64_le())
    }

    fn read_string(&mut self) -> Result<String, Error> {
        let bytes = self.read_binary()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidUtf8)
    }

    fn read_binary(&mut self) -> Result<Bytes, Error> {
        let len = varint::read::<u32>(&mut self.buf)?;
        let len = checked_len(len.into(), &self.limits.string_length)?;
        ensure(&self.buf, len)?;
        Ok(self.buf.copy_to_bytes(len))
    }
}
