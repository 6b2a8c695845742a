//! Record encoding schemes.
//!
//! A scheme lays out the fields of a record on a protocol. The protocol decides which
//! scheme applies (see [crate::SchemeKind]); the record engine dispatches once per call.

use crate::{Error, InputProtocol, OutputProtocol, Record};

mod positional;
pub use positional::Positional;
mod tagged;
pub use tagged::Tagged;

/// Encodes and decodes the fields of a record.
///
/// Schemes neither validate nor track nesting depth; [Record::write] and [Record::read]
/// do that around them.
pub trait Scheme {
    /// Writes the present fields of `record`.
    fn write<R: Record>(record: &R, out: &mut dyn OutputProtocol) -> Result<(), Error>;

    /// Reads fields into `record`, marking each decoded field present.
    fn read<R: Record>(record: &mut R, input: &mut dyn InputProtocol) -> Result<(), Error>;
}
