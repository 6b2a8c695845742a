//! Compact layout: a presence bitset with one bit per declared field, then the values of
//! the present fields in declaration order with no ids or type tags.
//!
//! ```text
//! bitset(field count), value*
//! ```
//!
//! Writer and reader must share the same schema. A schema mismatch is not detected: the
//! reader decodes whatever bytes follow as the fields it expects.

use super::Scheme;
use crate::{BitSet, Error, InputProtocol, OutputProtocol, Record};

/// The positional scheme.
#[derive(Clone, Copy, Debug, Default)]
pub struct Positional;

impl Scheme for Positional {
    fn write<R: Record>(record: &R, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        let fields = R::schema().fields();
        let mut present = BitSet::zeroes(fields.len());
        for (index, field) in fields.iter().enumerate() {
            if field.access().is_set(record) {
                present.set(index);
            }
        }
        out.write_bitset(&present)?;
        for index in present.ones() {
            fields[index].access().write(record, out)?;
        }
        Ok(())
    }

    fn read<R: Record>(record: &mut R, input: &mut dyn InputProtocol) -> Result<(), Error> {
        let fields = R::schema().fields();
        let present = input.read_bitset(fields.len())?;
        for index in present.ones() {
            fields[index].access().read(record, input)?;
        }
        Ok(())
    }
}
