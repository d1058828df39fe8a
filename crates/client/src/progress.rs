//! Single-entity project sync with a sequence guard.
//!
//! The dashboard holds one project record and replaces it wholesale when a
//! `projects`/`update` change arrives. The bus-assigned sequence number
//! guards the replace: a reordered or replayed event never regresses the
//! local copy.

use atrium_core::progress::clamp_progress;
use atrium_core::sync::{collections, events, SyncMessage};

use crate::backend::{ProjectPatch, ProjectRecord};

/// A project record kept in sync from realtime updates.
#[derive(Debug)]
pub struct ProjectSync {
    project: ProjectRecord,
    last_seq: u64,
}

impl ProjectSync {
    /// Start tracking from a fetched record.
    pub fn new(project: ProjectRecord) -> Self {
        Self {
            project,
            last_seq: 0,
        }
    }

    /// The current record.
    pub fn project(&self) -> &ProjectRecord {
        &self.project
    }

    /// Apply a realtime frame. Returns `true` when the local record was
    /// replaced.
    ///
    /// Frames are dropped when they are not a `projects`/`update` change,
    /// are scoped to a different project, carry a sequence number at or
    /// below the last applied one, or fail to decode.
    pub fn apply_event(&mut self, message: SyncMessage) -> bool {
        let SyncMessage::Change {
            collection,
            event,
            project_id,
            seq,
            record,
        } = message
        else {
            return false;
        };
        if collection != collections::PROJECTS || event != events::UPDATE {
            return false;
        }
        if project_id != self.project.id {
            return false;
        }
        if seq <= self.last_seq {
            tracing::debug!(
                seq,
                last_seq = self.last_seq,
                "Dropping stale project update"
            );
            return false;
        }
        match serde_json::from_value::<ProjectRecord>(record) {
            Ok(updated) if updated.id == self.project.id => {
                self.project = updated;
                self.last_seq = seq;
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring undecodable project record");
                false
            }
        }
    }
}

/// Build a progress-only patch, clamped to the valid range before it is
/// ever sent. The server clamps again; the client just never asks for an
/// out-of-range value.
pub fn progress_patch(value: i32) -> ProjectPatch {
    ProjectPatch {
        progress: Some(clamp_progress(value)),
        ..Default::default()
    }
}
