//! RoboFix Game Engine
//!
//! Platform-agnostic core game logic for the RoboFix robot-repair game.
//! This crate provides the adaptive progression engine without UI or
//! platform-specific dependencies: difficulty ladders per age bracket,
//! deterministic problem generation, the diagnostic and repair session
//! states, the progress ledger, and the skill analytics.

pub mod analytics;
pub mod constants;
pub mod device;
pub mod diagnostic;
pub mod difficulty;
pub mod events;
pub mod generator;
pub mod ledger;
pub mod machine;
pub mod persist;
pub mod problem;
pub mod repair;
pub mod session;

// Re-export commonly used types
pub use analytics::{
    CreativityMetrics, DifficultyPreference, EducationalInsight, HelpSeeking, InsightKind,
    LearningPattern, LearningStyle, ProgressTrend, SkillArea, SkillAssessment, SkillMilestone,
    analyze_creativity, analyze_mechanical_concepts, analyze_problem_solving,
    generate_educational_insights, identify_learning_patterns, skill_milestones,
};
pub use device::{ComponentKind, Device, DeviceComponent, Rect, Texture};
pub use diagnostic::{DiagnosticSession, DiagnosticSnapshot, HintContent, HintGesture};
pub use difficulty::{AgeBracket, DifficultyProfile};
pub use events::{AudioCue, EngineEvent, EventQueue};
pub use generator::{
    GenerationConstraints, ValidationReport, generate_problems, generate_problems_with_constraints,
    session_rng, validate_problem_set,
};
pub use ledger::{
    Achievement, ActivityKind, ActivityRecord, CustomizationRecord, DiagnosticRecord, MilestoneId,
    MilestoneReward, ProgressLedger, RepairRecord, SpendError,
};
pub use machine::{EngineState, InputEvent, StateError, StateMachine};
pub use persist::{
    AppliedCustomization, PersistError, ProfileStore, SavedBot, delete_bot, delete_ledger,
    load_bots, load_ledger, save_bot, save_ledger,
};
pub use problem::{CueKind, Problem, ProblemKind, Tool, VisualCue};
pub use repair::{CleaningStage, RepairSession, RepairSnapshot};
pub use session::{InterstitialState, PlaySession, SessionContext, SessionProgress};

/// One frame of presentable state, produced by the active session state.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSnapshot {
    /// Resting screen between activities.
    Interstitial,
    Diagnostic(DiagnosticSnapshot),
    Repair(RepairSnapshot),
}

/// Trait for abstracting frame presentation.
/// Platform-specific implementations should provide this.
pub trait ViewSink {
    fn present(&mut self, frame: &FrameSnapshot);
}

/// Trait for abstracting audio/haptic playback.
/// Platform-specific implementations should provide this.
pub trait AudioSink {
    /// Play one cue at the given intensity (0-100).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform audio channel rejects the cue; the
    /// engine logs and continues.
    fn play_cue(&mut self, cue: AudioCue, intensity: u8) -> anyhow::Result<()>;
}

/// Main game engine binding a profile store to session construction.
pub struct GameEngine<S>
where
    S: ProfileStore,
{
    store: S,
}

impl<S> GameEngine<S>
where
    S: ProfileStore,
{
    /// Create a new game engine over the provided profile store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the saved ledger or start a fresh one for `bracket`, then open a
    /// play session over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn new_session(&self, bracket: AgeBracket) -> Result<PlaySession, PersistError> {
        let ledger =
            load_ledger(&self.store)?.unwrap_or_else(|| ProgressLedger::new(bracket));
        Ok(PlaySession::new(ledger))
    }

    /// Persist a session's ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save_session(&self, session: &PlaySession) -> Result<(), PersistError> {
        save_ledger(&self.store, session.ledger())
    }

    /// Load every saved bot design.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn saved_bots(&self) -> Result<Vec<SavedBot>, PersistError> {
        load_bots(&self.store)
    }

    /// Save or replace one bot design.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save_bot(&self, bot: &SavedBot) -> Result<(), PersistError> {
        save_bot(&self.store, bot)
    }

    /// Delete one bot design by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn delete_bot(&self, id: &str) -> Result<(), PersistError> {
        delete_bot(&self.store, id)
    }

    /// Wipe saved progress, keeping bot designs.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn reset_progress(&self) -> Result<(), PersistError> {
        delete_ledger(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::convert::Infallible;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStore {
        items: Rc<RefCell<BTreeMap<String, String>>>,
    }

    impl ProfileStore for MemoryStore {
        type Error = Infallible;

        fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
            Ok(self.items.borrow().get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
            self.items
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
            self.items.borrow_mut().remove(key);
            Ok(())
        }

        fn list_keys(&self, prefix: &str) -> Result<Vec<String>, Self::Error> {
            Ok(self
                .items
                .borrow()
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect())
        }
    }

    #[test]
    fn new_session_starts_fresh_when_nothing_is_saved() {
        let engine = GameEngine::new(MemoryStore::default());
        let session = engine.new_session(AgeBracket::Middle).unwrap();
        assert_eq!(session.ledger().age_bracket, AgeBracket::Middle);
        assert_eq!(session.ledger().gems_earned, 0);
    }

    #[test]
    fn saved_progress_survives_engine_restart() {
        let store = MemoryStore::default();
        {
            let engine = GameEngine::new(store.clone());
            let mut session = engine.new_session(AgeBracket::Young).unwrap();
            session.ledger_mut().gems_earned = 25;
            engine.save_session(&session).unwrap();
        }
        let engine = GameEngine::new(store);
        let session = engine.new_session(AgeBracket::Young).unwrap();
        assert_eq!(session.ledger().gems_earned, 25);
    }

    #[test]
    fn reset_progress_clears_the_ledger_but_not_bots() {
        let engine = GameEngine::new(MemoryStore::default());
        let mut session = engine.new_session(AgeBracket::Advanced).unwrap();
        session.ledger_mut().gems_earned = 10;
        engine.save_session(&session).unwrap();
        engine
            .save_bot(&SavedBot {
                id: "b1".to_string(),
                name: "Bolt".to_string(),
                kind: "trainer".to_string(),
                customizations: Vec::new(),
                created_at_ms: 0,
                last_modified_ms: 0,
            })
            .unwrap();

        engine.reset_progress().unwrap();
        let session = engine.new_session(AgeBracket::Advanced).unwrap();
        assert_eq!(session.ledger().gems_earned, 0);
        assert_eq!(engine.saved_bots().unwrap().len(), 1);
    }
}
