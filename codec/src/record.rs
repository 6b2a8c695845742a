//! The record engine.
//!
//! [Record] provides presence tracking, validation, encoding, decoding, copying,
//! equality, ordering, hashing and rendering for any type with a static [Schema]. A
//! record type only supplies its schema; [crate::impl_record] then derives the standard
//! traits from the engine and lets the record nest inside other records.

use crate::{
    scheme::{Positional, Scheme, Tagged},
    serializer, Error, InputProtocol, Limits, OutputProtocol, Protocol, Schema, SchemeKind,
};
use bytes::{Buf, BytesMut};
use core::{
    any::Any,
    cmp::Ordering,
    fmt::{self, Debug, Formatter},
    hash::Hasher,
};
use tracing::debug;

/// A structured record described by a static [Schema].
pub trait Record: Clone + Default + Debug + Send + Sync + 'static {
    /// The schema shared by all instances of this type.
    fn schema() -> &'static Schema<Self>;

    /// Returns true if the field with `id` holds a value.
    fn is_set(&self, id: i16) -> Result<bool, Error> {
        let field = Self::schema().expect_field(id)?;
        Ok(field.access().is_set(self))
    }

    /// Marks the field with `id` present (holding its default value if it was absent) or
    /// absent (discarding its value).
    fn set_is_set(&mut self, id: i16, value: bool) -> Result<(), Error> {
        let field = Self::schema().expect_field(id)?;
        field.access().set_is_set(self, value);
        Ok(())
    }

    /// Unsets every field.
    fn clear(&mut self) {
        for field in Self::schema().fields() {
            field.access().set_is_set(self, false);
        }
    }

    /// Checks that every required field is present, then validates nested records.
    fn validate(&self) -> Result<(), Error> {
        let schema = Self::schema();
        for field in schema.fields() {
            let descriptor = field.descriptor();
            if descriptor.is_required() && !field.access().is_set(self) {
                debug!(
                    record = schema.name(),
                    field = descriptor.name,
                    "required field is unset"
                );
                return Err(Error::SchemaViolation {
                    record: schema.name(),
                    field: descriptor.name,
                });
            }
        }
        for field in schema.fields() {
            field.access().validate(self)?;
        }
        Ok(())
    }

    /// Validates the record (and every record nested in it), then writes it with the
    /// scheme `out` requires.
    fn write(&self, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        self.validate()?;
        self.write_unvalidated(out)
    }

    /// Writes the record with the scheme `out` requires, without validating it.
    ///
    /// Nested records are written through this method once the outermost record has
    /// been validated.
    fn write_unvalidated(&self, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        match out.scheme() {
            SchemeKind::Tagged => Tagged::write(self, out),
            SchemeKind::Positional => Positional::write(self, out),
        }
    }

    /// Reads a record with the scheme `input` requires, then validates it (and every
    /// record nested in it).
    fn read(input: &mut dyn InputProtocol) -> Result<Self, Error> {
        let record = Self::read_unvalidated(input)?;
        record.validate()?;
        Ok(record)
    }

    /// Reads a record with the scheme `input` requires, without validating it.
    fn read_unvalidated(input: &mut dyn InputProtocol) -> Result<Self, Error> {
        let mut record = Self::default();
        input.increment_depth()?;
        match input.scheme() {
            SchemeKind::Tagged => Tagged::read(&mut record, input)?,
            SchemeKind::Positional => Positional::read(&mut record, input)?,
        }
        input.decrement_depth();
        Ok(record)
    }

    /// Returns a copy sharing no state with `self`.
    fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Returns true if both records have the same fields present with equal values.
    fn equals(&self, other: &Self) -> bool {
        Self::schema()
            .fields()
            .iter()
            .all(|field| field.access().equals(self, other))
    }

    /// Compares field by field in declaration order. An absent field sorts before a
    /// present one; the first unequal field decides.
    fn compare(&self, other: &Self) -> Ordering {
        for field in Self::schema().fields() {
            let ordering = field.access().compare(self, other);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Feeds the presence and value of every field to `state`.
    fn hash_fields(&self, state: &mut dyn Hasher) {
        for field in Self::schema().fields() {
            field.access().hash(self, state);
        }
    }

    /// Renders the record as `Name(field:value, ...)`, listing present fields.
    fn fmt_fields(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let schema = Self::schema();
        write!(f, "{}(", schema.name())?;
        let mut first = true;
        for field in schema.fields() {
            let access = field.access();
            if !access.is_set(self) {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}:", field.descriptor().name)?;
            access.fmt(self, f)?;
        }
        f.write_str(")")
    }

    /// Returns the value of the field with `id`, or `None` if it is absent.
    fn get_field_value(&self, id: i16) -> Result<Option<&dyn Any>, Error> {
        let field = Self::schema().expect_field(id)?;
        Ok(field.access().get(self))
    }

    /// Stores `value` in the field with `id`; `None` unsets the field.
    fn set_field_value(&mut self, id: i16, value: Option<Box<dyn Any>>) -> Result<(), Error> {
        let schema = Self::schema();
        let field = schema.expect_field(id)?;
        let Some(value) = value else {
            field.access().set_is_set(self, false);
            return Ok(());
        };
        if !field.access().set(self, value) {
            return Err(Error::FieldTypeMismatch {
                record: schema.name(),
                field: field.descriptor().name,
            });
        }
        Ok(())
    }

    /// Encodes the record with `protocol`.
    fn encode(&self, protocol: Protocol) -> Result<BytesMut, Error> {
        serializer::encode(self, protocol)
    }

    /// Decodes a record from `buf` with `protocol` and default [Limits]. Fails if bytes
    /// remain after the record.
    fn decode(buf: impl Buf, protocol: Protocol) -> Result<Self, Error> {
        serializer::decode_with(buf, protocol, Limits::default())
    }
}

/// Implements [crate::Value] and the standard comparison, hashing and display traits for
/// a [Record], all in terms of the record engine.
///
/// ```
/// use recwire_codec::{impl_record, Record, Schema};
/// use std::sync::LazyLock;
///
/// #[derive(Clone, Debug, Default)]
/// pub struct Ping {
///     pub seq: Option<i64>,
/// }
///
/// static PING: LazyLock<Schema<Ping>> = LazyLock::new(|| {
///     Schema::<Ping>::builder("Ping")
///         .required(1, "seq", |p| &p.seq, |p| &mut p.seq)
///         .build()
/// });
///
/// impl Record for Ping {
///     fn schema() -> &'static Schema<Self> {
///         &PING
///     }
/// }
///
/// impl_record!(Ping);
///
/// let ping = Ping { seq: Some(3) };
/// assert_eq!(ping.to_string(), "Ping(seq:3)");
/// assert!(ping > Ping::default());
/// ```
#[macro_export]
macro_rules! impl_record {
    ($name:ident) => {
        impl $crate::Value for $name {
            const WIRE_TYPE: $crate::WireType = $crate::WireType::Struct;

            fn type_desc() -> $crate::TypeDesc {
                $crate::TypeDesc::Struct(stringify!($name))
            }

            fn write_value(
                &self,
                out: &mut dyn $crate::OutputProtocol,
            ) -> ::core::result::Result<(), $crate::Error> {
                $crate::Record::write_unvalidated(self, out)
            }

            fn read_value(
                input: &mut dyn $crate::InputProtocol,
            ) -> ::core::result::Result<Self, $crate::Error> {
                <Self as $crate::Record>::read_unvalidated(input)
            }

            fn compare_value(&self, other: &Self) -> ::core::cmp::Ordering {
                $crate::Record::compare(self, other)
            }

            fn equals_value(&self, other: &Self) -> bool {
                $crate::Record::equals(self, other)
            }

            fn hash_value(&self, state: &mut dyn ::core::hash::Hasher) {
                $crate::Record::hash_fields(self, state)
            }

            fn validate_value(&self) -> ::core::result::Result<(), $crate::Error> {
                $crate::Record::validate(self)
            }

            fn fmt_value(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                $crate::Record::fmt_fields(self, f)
            }
        }

        impl ::core::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                $crate::Record::equals(self, other)
            }
        }

        impl ::core::cmp::Eq for $name {}

        impl ::core::cmp::PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<::core::cmp::Ordering> {
                Some(::core::cmp::Ord::cmp(self, other))
            }
        }

        impl ::core::cmp::Ord for $name {
            fn cmp(&self, other: &Self) -> ::core::cmp::Ordering {
                $crate::Record::compare(self, other)
            }
        }

        impl ::core::hash::Hash for $name {
            fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                $crate::Record::hash_fields(self, state)
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                $crate::Record::fmt_fields(self, f)
            }
        }
    };
}
