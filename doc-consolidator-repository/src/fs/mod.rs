//! Filesystem implementations of the storage interfaces.

mod document_sink;
mod relation_source;

pub use document_sink::FsDocumentSink;
pub use relation_source::FsRelationSource;
