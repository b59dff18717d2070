//! Google Calendar feed format.
//!
//! Fetching and OAuth happen outside this crate; what arrives here is the
//! JSON body of `events.list`, decoded into [`RawEventRecord`]s.
//!
//! [`RawEventRecord`]: monthgrid_core::RawEventRecord

mod events;

pub use events::{DecodedListing, decode_listing};
