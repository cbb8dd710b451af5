//! lanes-core library.
//!
//! A kanban-style issue board: issues are filtered, grouped into a
//! project x workflow-state grid, and moved between cells by drag and drop
//! with an optimistic local update followed by a store mutation.
//!
//! # Conventions
//!
//! - **Errors**: typed errors (`thiserror`) in the library; `anyhow::Result`
//!   only at the configuration boundary.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod board;
pub mod config;
pub mod drag;
pub mod error;
pub mod filter;
pub mod grouping;
pub mod lock;
pub mod model;
pub mod store;

pub use board::{Board, DispatchReport, FailedMutation, FailurePolicy, PendingMutation};
pub use error::{ErrorCode, StoreError};
pub use filter::FilterSet;
pub use grouping::{BoardSettings, Cell, ColumnOrder, ColumnOrderError, Row, RowOrder, build_rows};
pub use store::{IssueStore, JsonFileStore, MemoryStore};
