//! Binary codecs derived from IDL type definitions

mod buffer;
mod layout;
mod registry;
mod value;
mod wire;

pub use buffer::ByteReader;
pub use layout::{
    derive_codecs, Codec, CodecSet, Deriver, FieldCodec, TypeLayout, VariantCodec,
    MAX_GENERIC_EXPANSION,
};
pub use registry::TypeRegistry;
pub use value::Value;
pub use wire::{check_discriminator, MAX_DEPTH};
