//! Session lifecycle maintenance.
//!
//! Active sessions whose backing file has not been modified for
//! [`ARCHIVE_AFTER`] are moved to the archive by [`LifecycleSweeper`].
//!
//! The sweep is a single pass. [`SessionStore::initialize`] runs it once;
//! long-lived callers that want periodic archival schedule their own calls to
//! [`LifecycleSweeper::sweep`].
//!
//! # Example
//!
//! ```rust,ignore
//! use casefile::{CasefileConfig, LifecycleSweeper, SessionStore};
//!
//! let store = SessionStore::new(&CasefileConfig::load_default().paths());
//! let result = LifecycleSweeper::new().sweep(&store)?;
//! println!("{}", result.summary());
//! ```
//!
//! [`SessionStore::initialize`]: crate::services::SessionStore::initialize

mod sweeper;

pub use sweeper::{ARCHIVE_AFTER, LifecycleSweeper, SweepResult};
