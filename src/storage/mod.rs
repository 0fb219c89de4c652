//! Record persistence.
//!
//! - [`codec`]: JSON encoding, name sanitizing and id generation
//! - [`RecordDirectory`]: one-file-per-record directories with prefix lookup

pub mod codec;
mod record_dir;

pub use record_dir::{RecordDirectory, RecordFile};
