//! The history engine.
//!
//! [`Calculator`] owns the registry, the bounded history sequence, the
//! undo/redo stacks, and the observer list. Each call to
//! [`Calculator::perform`] is atomic from the engine's point of view:
//! either validation/execution fails and nothing changes, or the record is
//! committed, snapshotted, bounded, and announced before the call returns.

use rust_decimal::Decimal;

use tally_core::value::parse_operand;
use tally_core::{BinaryOp, Calculation, OpRegistry, Result};

use crate::config::CalcConfig;
use crate::observer::{HistoryObserver, ObserverId};
use crate::persistence;
use crate::snapshot::{HistorySnapshot, SnapshotStacks};

pub struct Calculator {
    config: CalcConfig,
    registry: OpRegistry,
    history: Vec<Calculation>,
    stacks: SnapshotStacks,
    observers: Vec<(ObserverId, Box<dyn HistoryObserver>)>,
    next_observer_id: u64,
}

impl std::fmt::Debug for Calculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calculator")
            .field("history_len", &self.history.len())
            .field("undo_depth", &self.stacks.undo_depth())
            .field("redo_depth", &self.stacks.redo_depth())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Calculator {
    /// Build an engine over a validated configuration.
    ///
    /// Creates the history/log directories and attempts to load existing
    /// history; a failed load is logged and tolerated (first run, moved
    /// files), matching interactive-startup expectations. Configuration
    /// errors are not tolerated.
    pub fn new(config: CalcConfig, registry: OpRegistry) -> Result<Self> {
        config.validate()?;
        config.ensure_directories()?;

        let mut calculator = Self {
            config,
            registry,
            history: Vec::new(),
            stacks: SnapshotStacks::new(),
            observers: Vec::new(),
            next_observer_id: 0,
        };
        if let Err(e) = calculator.load_history() {
            tracing::warn!(error = %e, "could not load existing history");
        }
        tracing::info!("calculator initialized");
        Ok(calculator)
    }

    // ------------------------------------------------------------------
    // Operation pipeline
    // ------------------------------------------------------------------

    /// Resolve `name` through the registry and apply it to the raw operands.
    pub fn perform(&mut self, name: &str, raw_a: &str, raw_b: &str) -> Result<Decimal> {
        let op = self.registry.resolve(name)?;
        self.perform_with(op.as_ref(), raw_a, raw_b)
    }

    /// Apply an already-resolved operation to two raw operands.
    ///
    /// Validation or execution failure leaves history and both stacks
    /// untouched. On success the pre-append state is pushed to the undo
    /// stack, the redo stack is cleared, the oldest record is evicted if
    /// the bound is exceeded, and observers are notified best-effort.
    pub fn perform_with(&mut self, op: &dyn BinaryOp, raw_a: &str, raw_b: &str) -> Result<Decimal> {
        let a = parse_operand(raw_a, &self.config.input)?;
        let b = parse_operand(raw_b, &self.config.input)?;

        let record = Calculation::evaluate(op, a, b)?;
        let result = record.result();

        // Commit point: nothing below may fail the operation.
        self.stacks
            .push_undo(HistorySnapshot::capture(&self.history));
        self.history.push(record.clone());
        if self.history.len() > self.config.max_history_size {
            self.history.remove(0);
        }

        self.notify_observers(&record);

        if self.config.autosave {
            if let Err(e) = self.save_history() {
                tracing::warn!(error = %e, "autosave failed");
            }
        }

        Ok(result)
    }

    fn notify_observers(&mut self, record: &Calculation) {
        for (id, observer) in &mut self.observers {
            if let Err(e) = observer.on_record(record) {
                tracing::warn!(
                    observer = observer.name(),
                    observer_id = id.0,
                    error = %e,
                    "observer notification failed"
                );
            }
        }
    }

    // ------------------------------------------------------------------
    // Observers
    // ------------------------------------------------------------------

    /// Register an observer; notification order is registration order and
    /// duplicates are permitted.
    pub fn add_observer(&mut self, observer: Box<dyn HistoryObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        tracing::info!(observer = observer.name(), observer_id = id.0, "observer added");
        self.observers.push((id, observer));
        id
    }

    /// Remove a previously registered observer. Returns false when the id
    /// is unknown (already removed).
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        before != self.observers.len()
    }

    // ------------------------------------------------------------------
    // History access
    // ------------------------------------------------------------------

    #[must_use]
    pub fn history(&self) -> &[Calculation] {
        &self.history
    }

    /// Formatted history lines, oldest first.
    #[must_use]
    pub fn show_history(&self) -> Vec<String> {
        self.history.iter().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn registry(&self) -> &OpRegistry {
        &self.registry
    }

    /// Mutable registry access for runtime operation registration.
    pub fn registry_mut(&mut self) -> &mut OpRegistry {
        &mut self.registry
    }

    #[must_use]
    pub fn config(&self) -> &CalcConfig {
        &self.config
    }

    /// Empty history and both snapshot stacks together.
    pub fn clear(&mut self) {
        self.history.clear();
        self.stacks.clear();
        tracing::info!("history cleared");
    }

    // ------------------------------------------------------------------
    // Undo / redo
    // ------------------------------------------------------------------

    /// Restore the history to its state before the last committed
    /// operation. Returns false (state unchanged) when there is nothing
    /// to undo.
    pub fn undo(&mut self) -> bool {
        match self.stacks.undo_to(&self.history) {
            Some(restored) => {
                self.history = restored;
                true
            }
            None => false,
        }
    }

    /// Inverse of [`Calculator::undo`].
    pub fn redo(&mut self) -> bool {
        match self.stacks.redo_to(&self.history) {
            Some(restored) => {
                self.history = restored;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.stacks.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.stacks.can_redo()
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the history to the configured JSONL file.
    pub fn save_history(&self) -> Result<()> {
        let path = self.config.history_file();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        persistence::save_history(&path, &self.history)?;
        tracing::info!(path = %path.display(), records = self.history.len(), "history saved");
        Ok(())
    }

    /// Replace the history with the contents of the configured JSONL file,
    /// keeping the newest `max_history_size` records.
    pub fn load_history(&mut self) -> Result<()> {
        let path = self.config.history_file();
        let mut loaded = persistence::load_history(&path, &self.registry)?;
        if loaded.len() > self.config.max_history_size {
            loaded.drain(..loaded.len() - self.config.max_history_size);
        }
        tracing::info!(path = %path.display(), records = loaded.len(), "history loaded");
        self.history = loaded;
        Ok(())
    }

    /// Whether `name` resolves to a registered operation. The REPL uses
    /// this to distinguish "unknown command" from operand prompting.
    #[must_use]
    pub fn is_operation(&self, name: &str) -> bool {
        self.registry.contains(name)
    }
}
