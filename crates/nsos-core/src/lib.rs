//! Core record types and the storage trait for the NSOS records backend.
//!
//! This crate has no HTTP or database dependencies.
//! The store, API and server crates all depend on it.

// Native `async fn` in traits; the store trait spells out `Send` futures
// explicitly where it matters.
#![allow(async_fn_in_trait)]

pub mod audit;
pub mod describe;
pub mod error;
pub mod records;
pub mod store;

pub use error::{Error, ErrorKind, Result, StoreError};

/// Store-generated row identifier. Always positive.
pub type RecordId = i64;
