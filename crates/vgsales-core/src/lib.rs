//! Core types and trait definitions for the property-sales store.
//!
//! This crate has no parser or database dependencies. The DAT codec, the
//! SQLite backend and the ingestion orchestrator all depend on it.

// Native `async fn` style futures in traits; see `store.rs`.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod import;
pub mod sale;
pub mod store;

pub use error::{Error, Result};
