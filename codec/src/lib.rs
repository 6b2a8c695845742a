//! Encode and decode schema-described records.
//!
//! # Overview
//!
//! Every record type carries a static [Schema]: its fields in declaration order, each with
//! a numeric id, a name, a wire type and whether it is required. From that schema alone
//! the [Record] engine can:
//! - Track which optional fields are present
//! - Validate that required fields are set (recursively through nested records)
//! - Encode and decode the record under two schemes
//! - Copy, compare, hash and render records
//!
//! # Schemes
//!
//! - **Tagged**: each present field is written with its id and wire type, and the record
//!   ends with a stop marker. Readers skip fields they do not know, so schemas can evolve.
//! - **Positional**: a presence bitset followed by the present values in schema order.
//!   Smaller, but writer and reader must agree on the schema.
//!
//! The protocol selects the scheme: [BinaryOutput] and [CompactOutput] use the tagged
//! scheme, [TupleOutput] the positional one.
//!
//! # Supported Types
//!
//! Field values implement [Value]:
//! - Primitives: `bool`, `i8`, `i16`, `i32`, `i64`, `f64`, [String] and [bytes::Bytes]
//! - Collections: `Vec<T>` and `BTreeMap<K, V>`
//! - Nested records, via [impl_record]
//!
//! # Example
//!
//! ```
//! use recwire_codec::{
//!     decode, encode,
//!     records::{Node, Response},
//!     Protocol, Record,
//! };
//!
//! let mut response = Response::default();
//! response
//!     .set_thread_id("abc")
//!     .add_to_extra_list(Node::new("n1"))
//!     .put_to_extra_map("k", "v");
//!
//! for protocol in Protocol::ALL {
//!     let bytes = encode(&response, protocol).unwrap();
//!     let decoded: Response = decode(bytes, protocol).unwrap();
//!     assert_eq!(decoded, response);
//!     assert!(!decoded.is_set_error());
//! }
//! ```
//!
//! # Limits
//!
//! Input protocols enforce [Limits] on string lengths, container sizes and nesting
//! depth, so decoding untrusted input cannot allocate without bound or overflow the
//! stack.

pub mod bitset;
pub mod config;
pub mod error;
pub mod protocol;
pub mod record;
pub mod records;
pub mod schema;
pub mod scheme;
pub mod serializer;
pub mod value;
pub mod varint;
pub mod wire;

// Re-export main types and traits
pub use bitset::BitSet;
pub use config::{Limits, RangeCfg};
pub use error::Error;
pub use protocol::{
    skip, BinaryInput, BinaryOutput, CompactInput, CompactOutput, InputProtocol,
    OutputProtocol, SchemeKind, TupleInput, TupleOutput,
};
pub use record::Record;
pub use schema::{Field, FieldDescriptor, Requiredness, Schema, SchemaBuilder, TypeDesc};
pub use serializer::{decode, decode_with, encode, Protocol};
pub use value::Value;
pub use wire::{FieldHeader, ListHeader, MapHeader, WireType};
