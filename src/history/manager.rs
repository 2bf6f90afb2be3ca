use std::collections::VecDeque;

use log::{debug, warn};

use super::Snapshot;
use crate::error::{EditorError, EditorResult};
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreDirection {
    Undo,
    Redo,
}

/// A restore that has been started and must be finished or aborted.
///
/// While a ticket is outstanding the history refuses to record or to start
/// another restore.
#[derive(Debug)]
#[must_use = "a restore ticket must be passed to finish_restore or abort_restore"]
pub struct RestoreTicket {
    direction: RestoreDirection,
    snapshot: Snapshot,
}

impl RestoreTicket {
    pub fn direction(&self) -> RestoreDirection {
        self.direction
    }

    /// The scene state to restore
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

/// Snapshot-based undo/redo history.
///
/// `past` runs oldest to newest and its last entry is the current state;
/// `future` runs from the next redo to the furthest one.
#[derive(Debug, Default)]
pub struct History {
    past: Vec<Snapshot>,
    future: VecDeque<Snapshot>,
    restoring: bool,
}

impl History {
    /// Creates a new empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to a single entry describing the current scene
    pub fn initialize(&mut self, snapshot: Snapshot) {
        self.past = vec![snapshot];
        self.future.clear();
        self.restoring = false;
    }

    pub fn initialize_from(&mut self, scene: &Scene) -> EditorResult<()> {
        self.initialize(Snapshot::capture(scene)?);
        Ok(())
    }

    /// Append a snapshot after a committed change.
    ///
    /// A snapshot identical to the current entry is dropped. Returns whether
    /// an entry was appended.
    pub fn record(&mut self, snapshot: Snapshot) -> EditorResult<bool> {
        if self.restoring {
            warn!("Ignoring history record while a restore is in flight");
            return Err(EditorError::RestoreInFlight);
        }
        if self.past.last() == Some(&snapshot) {
            debug!("History record coalesced with the current entry");
            return Ok(false);
        }
        self.past.push(snapshot);
        self.future.clear();
        Ok(true)
    }

    /// Snapshot `scene` and record it
    pub fn record_scene(&mut self, scene: &Scene) -> EditorResult<bool> {
        if self.restoring {
            return Err(EditorError::RestoreInFlight);
        }
        self.record(Snapshot::capture(scene)?)
    }

    /// Step back one entry. `Ok(None)` when there is nothing to undo.
    pub fn begin_undo(&mut self) -> EditorResult<Option<RestoreTicket>> {
        self.ensure_idle()?;
        if self.past.len() < 2 {
            return Ok(None);
        }
        let Some(current) = self.past.pop() else {
            return Ok(None);
        };
        self.future.push_front(current);
        let Some(target) = self.past.last().cloned() else {
            return Ok(None);
        };
        Ok(Some(self.start(RestoreDirection::Undo, target)))
    }

    /// Step forward one entry. `Ok(None)` when there is nothing to redo.
    pub fn begin_redo(&mut self) -> EditorResult<Option<RestoreTicket>> {
        self.ensure_idle()?;
        let Some(next) = self.future.pop_front() else {
            return Ok(None);
        };
        self.past.push(next.clone());
        Ok(Some(self.start(RestoreDirection::Redo, next)))
    }

    fn ensure_idle(&self) -> EditorResult<()> {
        if self.restoring {
            warn!("Ignoring undo/redo while a restore is in flight");
            return Err(EditorError::RestoreInFlight);
        }
        Ok(())
    }

    fn start(&mut self, direction: RestoreDirection, snapshot: Snapshot) -> RestoreTicket {
        self.restoring = true;
        RestoreTicket { direction, snapshot }
    }

    /// The restored scene is in place and a repaint has been requested
    pub fn finish_restore(&mut self, ticket: RestoreTicket) {
        debug!("{:?} restore finished", ticket.direction);
        self.restoring = false;
    }

    /// The restore failed; put the entry back where it came from
    pub fn abort_restore(&mut self, ticket: RestoreTicket) {
        self.roll_back(ticket.direction);
    }

    /// Hold `ticket` in a guard that rolls the restore back unless it is
    /// finished. Use this when the restore spans an `.await` that may never
    /// resume.
    pub fn guard(&mut self, ticket: RestoreTicket) -> RestoreGuard<'_> {
        RestoreGuard {
            history: self,
            ticket,
            settled: false,
        }
    }

    fn roll_back(&mut self, direction: RestoreDirection) {
        match direction {
            RestoreDirection::Undo => {
                if let Some(entry) = self.future.pop_front() {
                    self.past.push(entry);
                }
            }
            RestoreDirection::Redo => {
                if let Some(entry) = self.past.pop() {
                    self.future.push_front(entry);
                }
            }
        }
        self.restoring = false;
    }

    /// Returns true if there are entries that can be undone
    pub fn can_undo(&self) -> bool {
        self.past.len() > 1
    }

    /// Returns true if there are entries that can be redone
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    /// Snapshot of the current state, if initialized
    pub fn current(&self) -> Option<&Snapshot> {
        self.past.last()
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }
}

/// A restore in progress, tied to the history it came from.
///
/// Dropping it without calling [`RestoreGuard::finish`] has the same effect
/// as [`History::abort_restore`], so a cancelled restore never leaves the
/// history locked.
#[must_use = "an unfinished restore is rolled back when the guard is dropped"]
pub struct RestoreGuard<'a> {
    history: &'a mut History,
    ticket: RestoreTicket,
    settled: bool,
}

impl RestoreGuard<'_> {
    pub fn direction(&self) -> RestoreDirection {
        self.ticket.direction
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.ticket.snapshot
    }

    pub fn finish(mut self) {
        self.settled = true;
        debug!("{:?} restore finished", self.ticket.direction);
        self.history.restoring = false;
    }

    pub fn abort(mut self) {
        self.settled = true;
        self.history.roll_back(self.ticket.direction);
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("{:?} restore abandoned before finishing; rolling back", self.ticket.direction);
            self.history.roll_back(self.ticket.direction);
        }
    }
}
