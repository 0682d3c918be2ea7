//! Model <-> column mapping: key casing, null encoding, serde bridging.
//!
//! The CRUD engine always writes with [`RowEncoder::for_writes`] and reads
//! with [`RowDecoder::for_reads`]; the strategies are exposed so that
//! hand-built statements can use the same conventions.

mod case;
mod decode;
mod encode;
mod introspect;

pub use case::{
    from_snake_case, to_snake_case, KeyDecodingStrategy, KeyEncodingStrategy, NilEncodingStrategy,
};
pub use decode::RowDecoder;
pub use encode::RowEncoder;
pub use introspect::field_names;

impl RowEncoder {
    /// snake_case columns, explicit NULL for absent values.
    pub fn for_writes() -> Self {
        Self::new(
            KeyEncodingStrategy::ConvertToSnakeCase,
            NilEncodingStrategy::AsNull,
        )
    }
}

impl RowDecoder {
    /// snake_case columns matched back onto the model's fields.
    pub fn for_reads() -> Self {
        Self::new(KeyDecodingStrategy::ConvertFromSnakeCase)
    }
}
