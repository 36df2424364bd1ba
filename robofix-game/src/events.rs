//! Engine event queue.
//!
//! Session states and the ledger push events here instead of invoking
//! callbacks; the play session drains the queue synchronously once per
//! update tick, so delivery is at-least-once on the tick that produced it.
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::device::ComponentKind;
use crate::ledger::{ActivityRecord, MilestoneId};
use crate::problem::Tool;

/// Fire-and-forget audio/haptic cue identifiers keyed to domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    ToolSelected,
    CorrectIdentification,
    IncorrectIdentification,
    CleaningTick,
    RepairSuccess,
    HintChime,
    MilestoneFanfare,
}

/// Structured event emitted by session engines and the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EngineEvent {
    /// A session finished and produced a validated activity record.
    ActivityCompleted { record: ActivityRecord },
    /// Currency awarded for a completed activity.
    GemsAwarded { amount: u32 },
    /// A cumulative milestone threshold was crossed (exactly once each).
    MilestoneUnlocked {
        id: MilestoneId,
        unlocked_at_ms: u64,
    },
    ToolUnlocked { tool: Tool },
    CustomizationUnlocked { item_id: String },
    /// Repeated wrong-tool attempts on one area triggered a hint gesture.
    HintGesture { component: ComponentKind },
    /// Cue for the audio/haptic collaborator; intensity is 0-100.
    Audio { cue: AudioCue, intensity: u8 },
}

/// FIFO queue of pending engine events.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: VecDeque<EngineEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EngineEvent) {
        self.pending.push_back(event);
    }

    pub fn push_audio(&mut self, cue: AudioCue, intensity: u8) {
        self.push(EngineEvent::Audio {
            cue,
            intensity: intensity.min(100),
        });
    }

    pub fn pop(&mut self) -> Option<EngineEvent> {
        self.pending.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
