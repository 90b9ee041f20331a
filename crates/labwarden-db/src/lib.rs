//! labwarden Record Store
//!
//! This crate owns the four lab collections (experiments, lab notes,
//! compliance tasks, safety reports) behind a single [`RecordStore`] trait.
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local maps, one lock and id counter per collection
//! - [`PgStore`]: PostgreSQL tables with identity columns, via a `deadpool-postgres` pool
//!
//! Handlers depend only on `Arc<dyn RecordStore>`.
//!
//! # Example
//!
//! ```rust,no_run
//! use labwarden_db::{MemoryStore, RecordStore};
//! use labwarden_common::NewLabNote;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!     let note = store.create_lab_note(NewLabNote {
//!         title: "Titration run 1".into(),
//!         content: "Observed color change at pH 7.2".into(),
//!         tags: Some("titration, pH".into()),
//!     }).await?;
//!     assert_eq!(store.list_lab_notes().await?[0].id, note.id);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod store;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use error::{DbError, Result};
pub use store::{RecordStore, StoreStats, StoreKind};
pub use memory::MemoryStore;
pub use postgres::PgStore;
