//! Feed sources and Google Calendar event decoding.
//!
//! This crate sits between a calendar backend and the layout engine:
//!
//! - [`FeedSource`] - The trait every snapshot source implements
//! - [`FeedSnapshot`] - Raw records of one provider query
//! - [`google::decode_listing`] - Decodes an `events.list` response
//! - [`ProviderError`] - Error types for source operations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐    ┌─────────────────┐
//! │ events.list JSON │    │ in-memory feed  │
//! └────────┬─────────┘    └────────┬────────┘
//!          │                       │
//!          ▼                       ▼
//! ┌──────────────────┐    ┌─────────────────┐
//! │  JsonFileSource  │    │  StaticSource   │
//! └────────┬─────────┘    └────────┬────────┘
//!          │      FeedSource       │
//!          └───────────┬───────────┘
//!                      ▼
//!               ┌──────────────┐
//!               │ FeedSnapshot │
//!               └──────┬───────┘
//!                      ▼ classify()
//!               ┌──────────────┐
//!               │   Snapshot   │
//!               └──────────────┘
//! ```

pub mod error;
pub mod google;
pub mod source;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use source::{
    ErrorSource, FeedSnapshot, FeedSource, JsonFileSource, StaticSource, fetch_or_empty,
};
