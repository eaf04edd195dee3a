//! I/O adapters shared by the serializers.

pub mod counting;

pub use counting::CountingWriter;
