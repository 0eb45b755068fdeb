#![forbid(unsafe_code)]

//! History engine for the tally calculator.
//!
//! [`Calculator`] orchestrates the full pipeline for each operation:
//! operand validation, execution, recording, snapshotting, bounded-history
//! eviction, and observer notification. Undo/redo is memento-based: every
//! successful operation pushes a value copy of the pre-mutation history onto
//! the undo stack, and any new write clears the redo stack.
//!
//! # Architecture
//!
//! ```text
//! perform("divide", "10", "4")
//! ┌────────────────────────────────────────────────────────────┐
//! │ 1  parse + validate operands        (tally-core::value)    │
//! │ 2  op.execute(a, b)                 (tally-core::operation)│
//! │ 3  build Calculation record                                │
//! │ 4  push pre-append snapshot → undo stack                   │
//! │ 5  append record to history                                │
//! │ 6  clear redo stack                 (new branch)           │
//! │ 7  evict oldest if len > max                               │
//! │ 8  notify observers                 (best effort)          │
//! │ 9  return result                                           │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures in steps 1–2 propagate to the caller with history and both
//! stacks untouched.

pub mod config;
pub mod history;
pub mod observer;
pub mod persistence;
pub mod snapshot;

pub use config::CalcConfig;
pub use history::Calculator;
pub use observer::{HistoryObserver, LoggingObserver, ObserverId};
pub use snapshot::{HistorySnapshot, SnapshotStacks};
