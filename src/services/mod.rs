//! Business logic services.
//!
//! Services own the record directories and expose the high-level operations:
//!
//! - [`SessionStore`]: error-investigation sessions and their archive
//! - [`KnowledgeStore`]: curated problem/solution entries
//! - [`InvestigationService`]: the end-to-end flow that ties both together

mod docs;
mod investigation;
mod knowledge;
mod session;

pub use docs::{NOTES_HEADER, ProjectDocs, SharedDocUpdate, insert_summary, render_notes_section};
pub use investigation::{Investigation, InvestigationService, render_brief};
pub use knowledge::KnowledgeStore;
pub use session::SessionStore;

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Sorts newest first by `created_at`. Items without a parseable timestamp go
/// last; ties keep their order.
pub(crate) fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> Option<DateTime<Utc>>) {
    items.sort_by(|a, b| match (created_at(a), created_at(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
