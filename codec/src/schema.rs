//! Static field metadata for record types.
//!
//! A [Schema] is built once per record type and lists its fields in declaration order.
//! Each field pairs a [FieldDescriptor] with an accessor that reaches the field's slot
//! (an `Option<T>`) inside a record instance, so the generic engine can encode, decode,
//! compare and validate any record without per-type code.
//!
//! ```
//! use recwire_codec::{Schema, Requiredness};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: Option<i32>,
//!     label: Option<String>,
//! }
//!
//! let schema = Schema::<Point>::builder("Point")
//!     .required(1, "x", |p| &p.x, |p| &mut p.x)
//!     .optional(2, "label", |p| &p.label, |p| &mut p.label)
//!     .build();
//!
//! assert_eq!(schema.len(), 2);
//! assert_eq!(schema.field_by_name("label").unwrap().id, 2);
//! assert_eq!(schema.field_by_id(1).unwrap().requiredness, Requiredness::Required);
//! ```

use crate::{Error, InputProtocol, OutputProtocol, Value, WireType};
use core::{
    any::Any,
    cmp::Ordering,
    fmt::{self, Formatter},
    hash::Hasher,
};
use std::collections::HashMap;

/// Whether a field must be present for a record to be valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Requiredness {
    Required,
    Optional,
}

/// Full type of a field, including element types of containers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    Bool,
    Byte,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    /// A nested record, by name.
    Struct(&'static str),
    List(Box<TypeDesc>),
    Map(Box<TypeDesc>, Box<TypeDesc>),
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Byte => f.write_str("byte"),
            Self::I16 => f.write_str("i16"),
            Self::I32 => f.write_str("i32"),
            Self::I64 => f.write_str("i64"),
            Self::Double => f.write_str("double"),
            Self::String => f.write_str("string"),
            Self::Binary => f.write_str("binary"),
            Self::Struct(name) => f.write_str(name),
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Map(key, value) => write!(f, "map<{key},{value}>"),
        }
    }
}

/// Metadata of one declared field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub id: i16,
    pub name: &'static str,
    pub wire_type: WireType,
    pub requiredness: Requiredness,
    pub type_desc: TypeDesc,
}

impl FieldDescriptor {
    #[inline]
    pub fn is_required(&self) -> bool {
        self.requiredness == Requiredness::Required
    }
}

/// Type-erased operations on one field slot of a record.
pub(crate) trait FieldAccess<R>: Send + Sync {
    fn is_set(&self, record: &R) -> bool;
    fn set_is_set(&self, record: &mut R, value: bool);

    /// Writes the value of a present field. Absent fields write nothing.
    fn write(&self, record: &R, out: &mut dyn OutputProtocol) -> Result<(), Error>;

    /// Reads a value into the field, marking it present.
    fn read(&self, record: &mut R, input: &mut dyn InputProtocol) -> Result<(), Error>;

    /// Validates the value of a present field.
    fn validate(&self, record: &R) -> Result<(), Error>;

    fn equals(&self, a: &R, b: &R) -> bool;

    /// Absent sorts before present.
    fn compare(&self, a: &R, b: &R) -> Ordering;

    fn hash(&self, record: &R, state: &mut dyn Hasher);
    fn fmt(&self, record: &R, f: &mut Formatter<'_>) -> fmt::Result;

    fn get<'a>(&self, record: &'a R) -> Option<&'a dyn Any>;

    /// Stores `value` in the field. Returns false if it has the wrong type.
    fn set(&self, record: &mut R, value: Box<dyn Any>) -> bool;
}

/// Accessor for a field stored as `Option<T>`.
struct Slot<R, T> {
    get: fn(&R) -> &Option<T>,
    get_mut: fn(&mut R) -> &mut Option<T>,
}

impl<R, T: Value> FieldAccess<R> for Slot<R, T> {
    fn is_set(&self, record: &R) -> bool {
        (self.get)(record).is_some()
    }

    fn set_is_set(&self, record: &mut R, value: bool) {
        let slot = (self.get_mut)(record);
        if !value {
            *slot = None;
        } else if slot.is_none() {
            *slot = Some(T::default());
        }
    }

    fn write(&self, record: &R, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        match (self.get)(record) {
            Some(value) => value.write_value(out),
            None => Ok(()),
        }
    }

    fn read(&self, record: &mut R, input: &mut dyn InputProtocol) -> Result<(), Error> {
        let value = T::read_value(input)?;
        *(self.get_mut)(record) = Some(value);
        Ok(())
    }

    fn validate(&self, record: &R) -> Result<(), Error> {
        match (self.get)(record) {
            Some(value) => value.validate_value(),
            None => Ok(()),
        }
    }

    fn equals(&self, a: &R, b: &R) -> bool {
        match ((self.get)(a), (self.get)(b)) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equals_value(b),
            _ => false,
        }
    }

    fn compare(&self, a: &R, b: &R) -> Ordering {
        match ((self.get)(a), (self.get)(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.compare_value(b),
        }
    }

    fn hash(&self, record: &R, state: &mut dyn Hasher) {
        match (self.get)(record) {
            Some(value) => {
                state.write_u8(1);
                value.hash_value(state);
            }
            None => state.write_u8(0),
        }
    }

    fn fmt(&self, record: &R, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.get)(record) {
            Some(value) => value.fmt_value(f),
            None => f.write_str("null"),
        }
    }

    fn get<'a>(&self, record: &'a R) -> Option<&'a dyn Any> {
        (self.get)(record).as_ref().map(|value| value as &dyn Any)
    }

    fn set(&self, record: &mut R, value: Box<dyn Any>) -> bool {
        match value.downcast::<T>() {
            Ok(value) => {
                *(self.get_mut)(record) = Some(*value);
                true
            }
            Err(_) => false,
        }
    }
}

/// A declared field: its metadata and the accessor for its slot.
pub struct Field<R> {
    descriptor: FieldDescriptor,
    access: Box<dyn FieldAccess<R>>,
}

impl<R> Field<R> {
    #[inline]
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    #[inline]
    pub(crate) fn access(&self) -> &dyn FieldAccess<R> {
        self.access.as_ref()
    }
}

impl<R> fmt::Debug for Field<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.descriptor, f)
    }
}

/// Ordered field metadata of a record type.
///
/// Field ids and names are both unique, so lookups in either direction are exact.
pub struct Schema<R> {
    name: &'static str,
    fields: Vec<Field<R>>,
    by_id: HashMap<i16, usize>,
    by_name: HashMap<&'static str, usize>,
}

impl<R: 'static> Schema<R> {
    /// Starts building the schema of the record named `name`.
    pub fn builder(name: &'static str) -> SchemaBuilder<R> {
        SchemaBuilder {
            name,
            fields: Vec::new(),
        }
    }
}

impl<R> Schema<R> {
    /// Name of the record type.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of declared fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over field descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> + '_ {
        self.fields.iter().map(Field::descriptor)
    }

    pub fn field_by_id(&self, id: i16) -> Option<&FieldDescriptor> {
        self.find(id).map(Field::descriptor)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name
            .get(name)
            .map(|&index| self.fields[index].descriptor())
    }

    /// Declared fields, in order.
    #[inline]
    pub(crate) fn fields(&self) -> &[Field<R>] {
        &self.fields
    }

    #[inline]
    pub(crate) fn find(&self, id: i16) -> Option<&Field<R>> {
        self.by_id.get(&id).map(|&index| &self.fields[index])
    }

    /// Returns the field with `id`, or [Error::UnknownFieldId].
    pub(crate) fn expect_field(&self, id: i16) -> Result<&Field<R>, Error> {
        self.find(id).ok_or(Error::UnknownFieldId {
            record: self.name,
            id,
        })
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for a [Schema]; fields are declared in wire order.
pub struct SchemaBuilder<R> {
    name: &'static str,
    fields: Vec<Field<R>>,
}

impl<R: 'static> SchemaBuilder<R> {
    /// Declares a field that must be present in every valid record.
    pub fn required<T: Value>(
        self,
        id: i16,
        name: &'static str,
        get: fn(&R) -> &Option<T>,
        get_mut: fn(&mut R) -> &mut Option<T>,
    ) -> Self {
        self.field(id, name, Requiredness::Required, get, get_mut)
    }

    /// Declares a field that may be absent.
    pub fn optional<T: Value>(
        self,
        id: i16,
        name: &'static str,
        get: fn(&R) -> &Option<T>,
        get_mut: fn(&mut R) -> &mut Option<T>,
    ) -> Self {
        self.field(id, name, Requiredness::Optional, get, get_mut)
    }

    fn field<T: Value>(
        mut self,
        id: i16,
        name: &'static str,
        requiredness: Requiredness,
        get: fn(&R) -> &Option<T>,
        get_mut: fn(&mut R) -> &mut Option<T>,
    ) -> Self {
        self.fields.push(Field {
            descriptor: FieldDescriptor {
                id,
                name,
                wire_type: T::WIRE_TYPE,
                requiredness,
                type_desc: T::type_desc(),
            },
            access: Box::new(Slot { get, get_mut }),
        });
        self
    }

    /// Finishes the schema.
    ///
    /// # Panics
    ///
    /// Panics if a field id is not positive, or if two fields share an id or a name.
    pub fn build(self) -> Schema<R> {
        let mut by_id = HashMap::with_capacity(self.fields.len());
        let mut by_name = HashMap::with_capacity(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            let FieldDescriptor { id, name, .. } = field.descriptor;
            assert!(id > 0, "{}.{name}: field id {id} is not positive", self.name);
            assert!(
                by_id.insert(id, index).is_none(),
                "{}: duplicate field id {id}",
                self.name
            );
            assert!(
                by_name.insert(name, index).is_none(),
                "{}: duplicate field name {name}",
                self.name
            );
        }
        Schema {
            name: self.name,
            fields: self.fields,
            by_id,
            by_name,
        }
    }
}
