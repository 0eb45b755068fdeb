//! Observer registration and built-in observers.
//!
//! Observers receive each committed [`Calculation`] in registration order.
//! The collection is ordered and duplicate-permitting; removal is by the
//! [`ObserverId`] handed out at registration (boxed trait objects have no
//! usable identity of their own).
//!
//! Notification is best-effort: the engine logs a failing observer and
//! still notifies the rest. The history mutation is already committed and
//! is never rolled back.

use tally_core::{Calculation, Result};

/// Handle for removing a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

/// Capability consumed by the history engine after each committed record.
pub trait HistoryObserver {
    /// Called once per committed calculation, in registration order.
    fn on_record(&mut self, record: &Calculation) -> Result<()>;

    /// Name used when logging notification failures.
    fn name(&self) -> &str {
        "observer"
    }
}

/// Emits one structured log event per committed calculation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl HistoryObserver for LoggingObserver {
    fn on_record(&mut self, record: &Calculation) -> Result<()> {
        tracing::info!(
            operation = record.operation(),
            operand1 = %record.operand1(),
            operand2 = %record.operand2(),
            result = %record.result(),
            "calculation performed"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}
