//! Self-describing layout: every present field is framed by a header carrying its wire
//! type and id, and the record ends with a stop marker.
//!
//! ```text
//! struct-begin, (field-header, value, field-end)*, stop, struct-end
//! ```
//!
//! Readers accept fields in any order. Fields with an unknown id, or whose wire type does
//! not match the declared one, are skipped.

use super::Scheme;
use crate::{Error, FieldHeader, InputProtocol, OutputProtocol, Record};
use tracing::trace;

/// The tagged scheme.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tagged;

impl Scheme for Tagged {
    fn write<R: Record>(record: &R, out: &mut dyn OutputProtocol) -> Result<(), Error> {
        let schema = R::schema();
        out.write_struct_begin(schema.name())?;
        for field in schema.fields() {
            let access = field.access();
            if !access.is_set(record) {
                continue;
            }
            let descriptor = field.descriptor();
            out.write_field_begin(FieldHeader::new(descriptor.wire_type, descriptor.id))?;
            access.write(record, out)?;
            out.write_field_end()?;
        }
        out.write_field_stop()?;
        out.write_struct_end()
    }

    fn read<R: Record>(record: &mut R, input: &mut dyn InputProtocol) -> Result<(), Error> {
        let schema = R::schema();
        input.read_struct_begin()?;
        loop {
            let header = input.read_field_begin()?;
            if header.is_stop() {
                break;
            }
            match schema.find(header.id) {
                Some(field) if field.descriptor().wire_type == header.wire_type => {
                    field.access().read(record, input)?;
                }
                Some(field) => {
                    trace!(
                        record = schema.name(),
                        field = field.descriptor().name,
                        expected = %field.descriptor().wire_type,
                        actual = %header.wire_type,
                        "skipping field with mismatched wire type"
                    );
                    input.skip(header.wire_type)?;
                }
                None => {
                    trace!(
                        record = schema.name(),
                        id = header.id,
                        wire_type = %header.wire_type,
                        "skipping unknown field"
                    );
                    input.skip(header.wire_type)?;
                }
            }
            input.read_field_end()?;
        }
        input.read_struct_end()
    }
}
