//! LEB128 varints and ZigZag mapping for the compact protocols.
//!
//! # Format
//!
//! Each byte carries 7 bits of the value, least significant group first. The high bit is
//! set on every byte except the last.
//!
//! ```text
//! 300 = 0b1_0010_1100  ->  1010_1100  0000_0010
//!                          ^ more     ^ last
//! ```
//!
//! Signed integers are ZigZag-mapped first (`0, -1, 1, -2, ...` becomes `0, 1, 2, 3, ...`)
//! so values near zero stay short regardless of sign.

use crate::Error;
use bytes::{Buf, BufMut};

const PAYLOAD_BITS: u32 = 7;
const PAYLOAD_MASK: u8 = 0x7F;
const CONTINUATION: u8 = 0x80;

/// An unsigned integer that can be written as a varint.
pub trait UInt: Copy + Into<u64> + TryFrom<u64> {
    /// Width of the integer in bits.
    const BITS: u32;
}

impl UInt for u32 {
    const BITS: u32 = u32::BITS;
}

impl UInt for u64 {
    const BITS: u32 = u64::BITS;
}

/// Writes `value` as a varint.
pub fn write<T: UInt>(value: T, buf: &mut impl BufMut) {
    let mut value: u64 = value.into();
    while value >= u64::from(CONTINUATION) {
        buf.put_u8(value as u8 | CONTINUATION);
        value >>= PAYLOAD_BITS;
    }
    buf.put_u8(value as u8);
}

/// Reads a varint that must fit in `T`.
///
/// Fails with [Error::InvalidVarint] if the encoding carries bits beyond the width of
/// `T` or continues past its last possible byte.
pub fn read<T: UInt>(buf: &mut impl Buf) -> Result<T, Error> {
    let mut result = 0u64;
    let mut shift = 0u32;
    loop {
        if !buf.has_remaining() {
            return Err(Error::EndOfBuffer);
        }
        let byte = buf.get_u8();
        let payload = u64::from(byte & PAYLOAD_MASK);
        if shift + PAYLOAD_BITS > T::BITS && payload >> (T::BITS - shift) != 0 {
            return Err(Error::InvalidVarint);
        }
        result |= payload << shift;
        if byte & CONTINUATION == 0 {
            return T::try_from(result).map_err(|_| Error::InvalidVarint);
        }
        shift += PAYLOAD_BITS;
        if shift >= T::BITS {
            return Err(Error::InvalidVarint);
        }
    }
}

#[inline]
pub fn zigzag_i32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

#[inline]
pub fn unzigzag_i32(value: u32) -> i32 {
    (value >> 1) as i32 ^ -((value & 1) as i32)
}

#[inline]
pub fn zigzag_i64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub fn unzigzag_i64(value: u64) -> i64 {
    (value >> 1) as i64 ^ -((value & 1) as i64)
}

/// Writes `value` as a ZigZag varint.
pub fn write_i32(value: i32, buf: &mut impl BufMut) {
    write(zigzag_i32(value), buf);
}

/// Reads a ZigZag varint into an `i32`.
pub fn read_i32(buf: &mut impl Buf) -> Result<i32, Error> {
    read::<u32>(buf).map(unzigzag_i32)
}

/// Writes `value` as a ZigZag varint.
pub fn write_i64(value: i64, buf: &mut impl BufMut) {
    write(zigzag_i64(value), buf);
}

/// Reads a ZigZag varint into an `i64`.
pub fn read_i64(buf: &mut impl Buf) -> Result<i64, Error> {
    read::<u64>(buf).map(unzigzag_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use test_case::test_case;

    #[test_case(0, &[0x00] ; "zero")]
    #[test_case(1, &[0x01] ; "one")]
    #[test_case(127, &[0x7F] ; "largest single byte")]
    #[test_case(128, &[0x80, 0x01] ; "smallest two bytes")]
    #[test_case(300, &[0xAC, 0x02] ; "three hundred")]
    #[test_case(u32::MAX, &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F] ; "max")]
    fn test_u32_layout(value: u32, expected: &[u8]) {
        let mut buf = Vec::new();
        write(value, &mut buf);
        assert_eq!(buf, expected);
        assert_eq!(read::<u32>(&mut &buf[..]).unwrap(), value);
    }

    #[test]
    fn test_u64_values() {
        for value in [0u64, 0x3FFF, 0x4000, 0xFFFF_FFFF, 0xFF_FFFF_FFFF_FFFF, u64::MAX] {
            let mut buf = Vec::new();
            write(value, &mut buf);
            let mut reader = &buf[..];
            assert_eq!(read::<u64>(&mut reader).unwrap(), value);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_i32(0), 0);
        assert_eq!(zigzag_i32(-1), 1);
        assert_eq!(zigzag_i32(1), 2);
        assert_eq!(zigzag_i32(-2), 3);
        assert_eq!(zigzag_i32(i32::MIN), u32::MAX);
        assert_eq!(zigzag_i64(i64::MAX), u64::MAX - 1);

        for value in [0i64, 1, -1, 63, -64, i64::MIN, i64::MAX] {
            let mut buf = Vec::new();
            write_i64(value, &mut buf);
            assert_eq!(read_i64(&mut &buf[..]).unwrap(), value);
        }
        for value in [0i32, -300, i32::MIN, i32::MAX] {
            let mut buf = Vec::new();
            write_i32(value, &mut buf);
            assert_eq!(read_i32(&mut &buf[..]).unwrap(), value);
        }
    }

    #[test]
    fn test_truncated() {
        let mut buf = Bytes::from_static(&[0x80]);
        assert!(matches!(read::<u64>(&mut buf), Err(Error::EndOfBuffer)));
    }

    #[test]
    fn test_too_wide() {
        // Fifth byte of a u32 may only carry 4 bits.
        let mut buf = Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFF, 0x1F]);
        assert!(matches!(read::<u32>(&mut buf), Err(Error::InvalidVarint)));

        // Continuation past the last possible byte.
        let mut buf = Bytes::from_static(&[0xFF, 0xFF, 0xFF, 0xFF, 0x8F, 0x01]);
        assert!(matches!(read::<u32>(&mut buf), Err(Error::InvalidVarint)));

        let mut buf =
            Bytes::from_static(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x02]);
        assert!(matches!(read::<u64>(&mut buf), Err(Error::InvalidVarint)));
    }
}
