//! # conveyor-consume
//!
//! Per-consumer record consumption with durable cursors.
//!
//! Each named consumer of a table tracks its own position as the
//! highest sequence number already delivered ([`CursorStore`]). The
//! [`ConsumptionEngine`] delivers the oldest unseen record and advances
//! the cursor in the same transaction, giving FIFO, at-most-once
//! delivery per consumer with no ordering guarantees across tables or
//! across consumers.

pub mod cursor;
pub mod engine;
pub mod error;

pub use cursor::{Cursor, CursorStore};
pub use engine::{ConsumptionEngine, DeliveredRecord};
pub use error::ConsumeError;
