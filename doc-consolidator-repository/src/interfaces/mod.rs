//! Interface definitions for relation sources and document sinks.
//!
//! These traits decouple the consolidation engine from where relations come
//! from and where the document stream goes, allowing dependency injection and
//! swappable storage backends.

mod document_sink;
mod relation_source;

pub use document_sink::DocumentSink;
pub use relation_source::RelationSource;
