//! History-aware front of the compositor.
//!
//! The history manager only hands out snapshots; the session is where a
//! restored snapshot is explicitly recomposed. The resulting append is
//! swallowed by the manager's replay flag, so moving through history
//! never grows it.

use std::sync::Arc;

use lettra_core::{HistoryEntry, HistoryManager, PresetRegistry, Snapshot, StyleOptions};

use crate::compositor::{ComposeError, ComposeOutcome, Compositor};

pub struct Session {
    compositor: Arc<Compositor>,
    history: HistoryManager,
    presets: PresetRegistry,
}

impl Session {
    pub fn new(compositor: Arc<Compositor>) -> Self {
        Self::with_history(compositor, HistoryManager::new())
    }

    pub fn with_history(compositor: Arc<Compositor>, history: HistoryManager) -> Self {
        Self {
            compositor,
            history,
            presets: PresetRegistry::builtin(),
        }
    }

    pub fn compositor(&self) -> &Arc<Compositor> {
        &self.compositor
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn presets(&self) -> &PresetRegistry {
        &self.presets
    }

    pub fn presets_mut(&mut self) -> &mut PresetRegistry {
        &mut self.presets
    }

    /// Snapshot at the history cursor.
    pub fn current(&self) -> Option<Snapshot> {
        self.history.current().map(HistoryEntry::snapshot)
    }

    /// Compose new text and record it when it completes.
    pub async fn generate(
        &mut self,
        text: impl Into<String>,
        options: StyleOptions,
        preset: Option<String>,
    ) -> Result<ComposeOutcome, ComposeError> {
        let snapshot = Snapshot {
            text: text.into(),
            options,
            preset,
        };
        let outcome = self.compositor.compose(&snapshot).await?;
        if !outcome.is_superseded() {
            self.history.append(HistoryEntry::from_snapshot(snapshot));
        }
        Ok(outcome)
    }

    /// [`generate`](Self::generate) with the options of a registered preset.
    pub async fn generate_with_preset(
        &mut self,
        text: impl Into<String>,
        preset: &str,
    ) -> Result<ComposeOutcome, ComposeError> {
        let options = self
            .presets
            .options(preset)
            .ok_or_else(|| ComposeError::UnknownPreset(preset.to_owned()))?;
        self.generate(text, options, Some(preset.to_owned())).await
    }

    /// Recompose the entry at `target`. `None` if there is nothing to do.
    pub async fn replay(&mut self, target: usize) -> Result<Option<ComposeOutcome>, ComposeError> {
        match self.history.replay(target) {
            Some(snapshot) => self.restore(snapshot).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn undo(&mut self) -> Result<Option<ComposeOutcome>, ComposeError> {
        match self.history.undo() {
            Some(snapshot) => self.restore(snapshot).await.map(Some),
            None => Ok(None),
        }
    }

    pub async fn redo(&mut self) -> Result<Option<ComposeOutcome>, ComposeError> {
        match self.history.redo() {
            Some(snapshot) => self.restore(snapshot).await.map(Some),
            None => Ok(None),
        }
    }

    async fn restore(&mut self, snapshot: Snapshot) -> Result<ComposeOutcome, ComposeError> {
        match self.compositor.compose(&snapshot).await {
            Ok(outcome) if !outcome.is_superseded() => {
                // Consumed by the replay flag.
                self.history.append(HistoryEntry::from_snapshot(snapshot));
                Ok(outcome)
            }
            other => {
                self.history.cancel_replay();
                other
            }
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
