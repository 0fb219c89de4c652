//! Data models for sessions and knowledge entries.
//!
//! Records are open, ordered JSON maps. [`ErrorSession`] and [`KnowledgeEntry`]
//! are typed views over a [`Record`] that read the reserved keys and leave every
//! other field untouched.

mod knowledge;
mod record;
mod session;

pub use knowledge::{KnowledgeDraft, KnowledgeEntry, KnowledgeFilter, split_tags};
pub use record::{Record, RecordId, format_timestamp, keys};
pub use session::{ErrorSession, SessionStatus};
