//! # Accessor Traits
//!
//! The capability contract every backend implements, and the entry type it
//! returns.
//!
//! ## Overview
//!
//! | Trait | Role |
//! |-------|------|
//! | [`FileSystemAccessor`] | List, open and stat paths; bind to a query scope |
//! | [`FileInfo`] | One directory entry or stat result |
//! | [`ReadSeek`] | The stream returned by `open`, and whether it can rewind |
//!
//! ## Prototypes and Instances
//!
//! ```text
//! DeviceManager ──name──▶ prototype ──new_instance(scope)──▶ instance
//! ```
//!
//! Registries hold prototypes. Callers always work with an instance bound
//! to their [`Scope`](crate::Scope).
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. Methods take `&self`; backends use
//! interior mutability for caches.

mod accessor;
mod file_info;

pub use accessor::{FileSystemAccessor, ForwardOnly, ReadSeek};
pub use file_info::{FileInfo, FileInfoRecord};
