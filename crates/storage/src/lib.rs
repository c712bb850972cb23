//! Storage abstraction and implementations for pratiche.
//!
//! This crate provides a trait-based storage interface with a JSON file
//! reference implementation, including the per-year sequence counter used
//! for display numbers.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{Storage, StorageError, Result};
pub use json_storage::JsonStorage;
