//! Operations every field value type supports.
//!
//! A [Value] knows its wire type and how to read and write itself on a protocol, along
//! with the structural equality, total ordering, hashing and rendering the record engine
//! builds on. Implementations are provided for the primitive types, for `Vec<T>`
//! (lists) and `BTreeMap<K, V>` (maps), and by [crate::impl_record] for nested records.
//!
//! Containers encode differently per scheme: the tagged scheme frames them with a
//! [ListHeader] or [MapHeader], while the positional scheme writes only the element count.

use crate::{
    protocol::{checked_len, wire_len},
    Error, InputProtocol, ListHeader, MapHeader, OutputProtocol, SchemeKind, TypeDesc, WireType,
};
use bytes::Bytes;
use core::{
    cmp::Ordering,
    fmt::{self, Debug, Formatter},
    hash::{Hash, Hasher},
};
use paste::paste;
use std::collections::BTreeMap;

/// A type that can be held in a record field.
pub trait Value: Clone + Default + Debug + Send + Sync + 'static {
    /// The wire type written in field and container headers.
    const WIRE_TYPE: WireType;

    /// Describes the full type, including container element types.
    fn type_desc() -> TypeDesc;

    /// Writes the value. Records nested in it are not validated; [crate::Record::write]
    /// validates the outermost record and everything below it first.
    fn write_value(&self, out: &mut dyn OutputProtocol) -> Result<(), Error>;
    fn read_value(input: &mut dyn InputProtocol) -> Result<Self, Error>;

    /// Total order over values.
    fn compare_value(&self, other: &Self) -> Ordering;

    fn equals_value(&self, other: &Self) -> bool {
        self.compare_value(other) == Ordering::Equal
    }

    /// Feeds the value to `state`, consistently with [Value::equals_value].
    fn hash_value(&self, state: &mut dyn Hasher);

    /// Checks nested records for missing required fields.
    fn validate_value(&self) -> Result<(), Error> {
        Ok(())
    }

    fn fmt_value(&self, f: &mut Formatter<'_>) -> fmt::Result;
}

macro_rules! impl_primitive {
    ($type:ty, $wire:ident, $method:ident, $desc:ident) => {
        impl Value for $type {
            const WIRE_TYPE: WireType = WireType::$wire;

            fn type_desc() -> TypeDesc {
                TypeDesc::$desc
            }

            #[inline]
            fn write_value(&self, out: &mut dyn OutputProtocol) -> Result<(), Error> {
                paste! { out.[<write_ $method>](*self) }
            }

            #[inline]
            fn read_value(input: &mut dyn InputProtocol) -> Result<Self, Error> {
                paste! { input.[<read_ $method>]() }
            }

            #[inline]
            fn compare_value(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }

            #[inline]
            fn equals_value(&self, other: &Self) -> bool {
                self == other
            }

            fn hash_value(&self, mut state: &mut dyn Hasher) {
                self.hash(&mut state);
            }

            fn fmt_value(&self, f: &mut Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

impl_primitive!(bool, Bool, bool, Bool);
impl_primitive!(i8, Byte, byte, Byte);
impl_primitive!(i16, I16, i16, I16);
impl_primitive!(i32, I32, i32, I32);
impl_primitive!(i64, I64, i64, I64);

/// Doubles are ordered with [f64::total_cmp] and compared by bit pattern, so every
/// value (including NaN) equals itself and ordering stays total.
impl Value for f64 {
    const WIRE_TYPE: WireType = WireType::Double;

    fn type_desc() -> TypeDesc {
        TypeDesc::Double
    }

    #[inline]
    fn write_value(&self, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        out.write_double(*self)
    }

    #[inline]
    fn read_value(input: &mut dyn InputProtocol) -> Result<Self, Error> {
        input.read_double()
    }

    #[inline]
    fn compare_value(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        state.write_u64(self.to_bits());
    }

    fn fmt_value(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Value for String {
    const WIRE_TYPE: WireType = WireType::String;

    fn type_desc() -> TypeDesc {
        TypeDesc::String
    }

    #[inline]
    fn write_value(&self, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        out.write_string(self)
    }

    #[inline]
    fn read_value(input: &mut dyn InputProtocol) -> Result<Self, Error> {
        input.read_string()
    }

    #[inline]
    fn compare_value(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    #[inline]
    fn equals_value(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_value(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn fmt_value(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// Binary values share the string wire type.
impl Value for Bytes {
    const WIRE_TYPE: WireType = WireType::String;

    fn type_desc() -> TypeDesc {
        TypeDesc::Binary
    }

    #[inline]
    fn write_value(&self, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        out.write_binary(self)
    }

    #[inline]
    fn read_value(input: &mut dyn InputProtocol) -> Result<Self, Error> {
        input.read_binary()
    }

    #[inline]
    fn compare_value(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    #[inline]
    fn equals_value(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_value(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn fmt_value(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Reads a container element count, from a header in the tagged scheme or as a bare
/// `i32` in the positional scheme.
fn read_count(input: &mut dyn InputProtocol) -> Result<usize, Error> {
    let raw = input.read_i32()?;
    checked_len(raw.into(), &input.limits().container_length)
}

/// Ordered sequence. Order-sensitive equality, lexicographic ordering.
impl<T: Value> Value for Vec<T> {
    const WIRE_TYPE: WireType = WireType::List;

    fn type_desc() -> TypeDesc {
        TypeDesc::List(Box::new(T::type_desc()))
    }

    fn write_value(&self, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        match out.scheme() {
            SchemeKind::Tagged => {
                out.write_list_begin(ListHeader::new(T::WIRE_TYPE, self.len()))?;
                for item in self {
                    item.write_value(out)?;
                }
                out.write_list_end()
            }
            SchemeKind::Positional => {
                out.write_i32(wire_len(self.len())?)?;
                for item in self {
                    item.write_value(out)?;
                }
                Ok(())
            }
        }
    }

    fn read_value(input: &mut dyn InputProtocol) -> Result<Self, Error> {
        input.increment_depth()?;
        let scheme = input.scheme();
        let size = match scheme {
            SchemeKind::Tagged => {
                let header = input.read_list_begin()?;
                if header.size > 0 && header.element != T::WIRE_TYPE {
                    return Err(Error::InvalidWireType(header.element.code()));
                }
                header.size
            }
            SchemeKind::Positional => read_count(input)?,
        };

        // Each element takes at least one byte.
        let mut items = Vec::with_capacity(size.min(input.remaining()));
        for _ in 0..size {
            items.push(T::read_value(input)?);
        }
        if scheme == SchemeKind::Tagged {
            input.read_list_end()?;
        }
        input.decrement_depth();
        Ok(items)
    }

    fn compare_value(&self, other: &Self) -> Ordering {
        for (a, b) in self.iter().zip(other) {
            match a.compare_value(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.len().cmp(&other.len())
    }

    fn equals_value(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.equals_value(b))
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        state.write_usize(self.len());
        for item in self {
            item.hash_value(state);
        }
    }

    fn validate_value(&self) -> Result<(), Error> {
        self.iter().try_for_each(Value::validate_value)
    }

    fn fmt_value(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            item.fmt_value(f)?;
        }
        f.write_str("]")
    }
}

/// Map with unique keys. Entries are kept sorted, so encoding is deterministic.
///
/// Maps order by entry count first, then by their sorted entries.
impl<K: Value + Ord, V: Value> Value for BTreeMap<K, V> {
    const WIRE_TYPE: WireType = WireType::Map;

    fn type_desc() -> TypeDesc {
        TypeDesc::Map(Box::new(K::type_desc()), Box::new(V::type_desc()))
    }

    fn write_value(&self, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        let scheme = out.scheme();
        match scheme {
            SchemeKind::Tagged => out.write_map_begin(MapHeader::new(
                K::WIRE_TYPE,
                V::WIRE_TYPE,
                self.len(),
            ))?,
            SchemeKind::Positional => out.write_i32(wire_len(self.len())?)?,
        }
        for (key, value) in self {
            key.write_value(out)?;
            value.write_value(out)?;
        }
        if scheme == SchemeKind::Tagged {
            out.write_map_end()?;
        }
        Ok(())
    }

    fn read_value(input: &mut dyn InputProtocol) -> Result<Self, Error> {
        input.increment_depth()?;
        let scheme = input.scheme();
        let size = match scheme {
            SchemeKind::Tagged => {
                let header = input.read_map_begin()?;
                if header.size > 0 {
                    if header.key != K::WIRE_TYPE {
                        return Err(Error::InvalidWireType(header.key.code()));
                    }
                    if header.value != V::WIRE_TYPE {
                        return Err(Error::InvalidWireType(header.value.code()));
                    }
                }
                header.size
            }
            SchemeKind::Positional => read_count(input)?,
        };

        // Duplicate keys: the last entry wins.
        let mut map = BTreeMap::new();
        for _ in 0..size {
            let key = K::read_value(input)?;
            let value = V::read_value(input)?;
            map.insert(key, value);
        }
        if scheme == SchemeKind::Tagged {
            input.read_map_end()?;
        }
        input.decrement_depth();
        Ok(map)
    }

    fn compare_value(&self, other: &Self) -> Ordering {
        let by_len = self.len().cmp(&other.len());
        if by_len != Ordering::Equal {
            return by_len;
        }
        for ((ka, va), (kb, vb)) in self.iter().zip(other) {
            let ordering = ka.compare_value(kb).then_with(|| va.compare_value(vb));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn equals_value(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other)
                .all(|((ka, va), (kb, vb))| ka.equals_value(kb) && va.equals_value(vb))
    }

    fn hash_value(&self, state: &mut dyn Hasher) {
        state.write_usize(self.len());
        for (key, value) in self {
            key.hash_value(state);
            value.hash_value(state);
        }
    }

    fn validate_value(&self) -> Result<(), Error> {
        for (key, value) in self {
            key.validate_value()?;
            value.validate_value()?;
        }
        Ok(())
    }

    fn fmt_value(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            key.fmt_value(f)?;
            f.write_str("=")?;
            value.fmt_value(f)?;
        }
        f.write_str("}")
    }
}
