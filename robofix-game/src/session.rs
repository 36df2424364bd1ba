//! Play session orchestration.
//!
//! `PlaySession` owns the state machine, the shared context, and the event
//! queue, and is the only place engine events are drained. Platform shells
//! call `update` once per frame with elapsed milliseconds and feed input
//! through `handle_input`.
use serde::{Deserialize, Serialize};

use crate::device::Device;
use crate::difficulty::AgeBracket;
use crate::events::{EngineEvent, EventQueue};
use crate::ledger::{ActivityRecord, ProgressLedger};
use crate::machine::{EngineState, InputEvent, StateError, StateMachine};
use crate::problem::Problem;
use crate::{AudioSink, ViewSink};

/// Shared per-session counters surfaced in frame snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    pub total_problems: u32,
    pub identified: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub fixed: u32,
    pub hints_used: u32,
    pub time_elapsed_ms: u64,
    pub is_complete: bool,
}

/// Mutable context threaded through every state callback.
pub struct SessionContext {
    pub bracket: AgeBracket,
    pub ledger: ProgressLedger,
    pub events: EventQueue,
    pub audio: Option<Box<dyn AudioSink>>,
    /// Milliseconds accumulated from update ticks; the engine never reads a
    /// wall clock.
    pub clock_ms: u64,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("bracket", &self.bracket)
            .field("clock_ms", &self.clock_ms)
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

/// Resting state between activities. Renders the idle frame and ignores
/// everything except the frame clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct InterstitialState;

impl EngineState<SessionContext> for InterstitialState {
    fn name(&self) -> &'static str {
        "interstitial"
    }

    fn render(&self, view: &mut dyn ViewSink) {
        view.present(&crate::FrameSnapshot::Interstitial);
    }
}

/// One play session for one player profile.
pub struct PlaySession {
    machine: StateMachine<SessionContext>,
    ctx: SessionContext,
}

impl PlaySession {
    #[must_use]
    pub fn new(ledger: ProgressLedger) -> Self {
        let mut machine = StateMachine::new();
        let mut ctx = SessionContext {
            bracket: ledger.age_bracket,
            ledger,
            events: EventQueue::new(),
            audio: None,
            clock_ms: 0,
        };
        machine.change_state(&mut ctx, Box::new(InterstitialState));
        Self { machine, ctx }
    }

    pub fn set_audio_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.ctx.audio = Some(sink);
    }

    #[must_use]
    pub const fn ledger(&self) -> &ProgressLedger {
        &self.ctx.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ProgressLedger {
        &mut self.ctx.ledger
    }

    #[must_use]
    pub fn into_ledger(self) -> ProgressLedger {
        self.ctx.ledger
    }

    #[must_use]
    pub fn current_state(&self) -> Option<&'static str> {
        self.machine.current_name()
    }

    pub fn start_diagnostic(&mut self, device: &Device, problems: Vec<Problem>) {
        let state = crate::diagnostic::DiagnosticSession::new(device, problems, self.ctx.bracket);
        self.machine.change_state(&mut self.ctx, Box::new(state));
    }

    pub fn start_repair(&mut self, device: &Device, problems: Vec<Problem>) {
        let state = crate::repair::RepairSession::new(device, problems);
        self.machine.change_state(&mut self.ctx, Box::new(state));
    }

    pub fn show_interstitial(&mut self) {
        self.machine
            .change_state(&mut self.ctx, Box::new(InterstitialState));
    }

    /// Return to the previous state, if any.
    pub fn go_back(&mut self) -> Result<(), StateError> {
        self.machine.go_back(&mut self.ctx)
    }

    /// Advance the active state by `dt_ms`, then drain and apply every event
    /// produced this tick. Activity records are folded into the ledger
    /// immediately, so milestone and award events come out of the same call
    /// that completed the activity. All drained events are returned for the
    /// shell to react to.
    pub fn update(&mut self, dt_ms: u64) -> Vec<EngineEvent> {
        self.ctx.clock_ms = self.ctx.clock_ms.saturating_add(dt_ms);
        self.machine.update(&mut self.ctx, dt_ms);
        self.drain_events()
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> Vec<EngineEvent> {
        self.machine.handle_input(&mut self.ctx, event);
        self.drain_events()
    }

    pub fn render(&self, view: &mut dyn ViewSink) {
        self.machine.render(view);
    }

    fn drain_events(&mut self) -> Vec<EngineEvent> {
        let mut drained = Vec::new();
        // Folding a record into the ledger can push follow-up events, so
        // keep popping until the queue is quiet.
        while let Some(event) = self.ctx.events.pop() {
            match &event {
                EngineEvent::ActivityCompleted { record } => {
                    let now_ms = self.ctx.clock_ms;
                    match record.clone() {
                        ActivityRecord::Diagnostic(r) => {
                            self.ctx.ledger.record_diagnostic_completed(r, &mut self.ctx.events);
                        }
                        ActivityRecord::Repair(r) => {
                            self.ctx
                                .ledger
                                .record_repair_completed(r, now_ms, &mut self.ctx.events);
                        }
                        ActivityRecord::Customization(r) => {
                            self.ctx
                                .ledger
                                .record_customization_completed(r, &mut self.ctx.events);
                        }
                    }
                }
                EngineEvent::Audio { cue, intensity } => {
                    if let Some(sink) = self.ctx.audio.as_mut() {
                        if let Err(err) = sink.play_cue(*cue, *intensity) {
                            log::warn!("audio cue {cue:?} failed: {err}");
                        }
                    }
                }
                _ => {}
            }
            drained.push(event);
        }
        drained
    }
}

impl std::fmt::Debug for PlaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaySession")
            .field("state", &self.machine.current_name())
            .field("ctx", &self.ctx)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AudioCue;
    use crate::generator::{generate_problems, session_rng};

    #[test]
    fn session_starts_in_the_interstitial_state() {
        let session = PlaySession::new(ProgressLedger::new(AgeBracket::Middle));
        assert_eq!(session.current_state(), Some("interstitial"));
    }

    #[test]
    fn completed_diagnostic_is_folded_into_the_ledger_same_tick() {
        let mut session = PlaySession::new(ProgressLedger::new(AgeBracket::Young));
        let device = Device::trainer_bot();
        let mut rng = session_rng(7);
        let problems = generate_problems(&device, AgeBracket::Young, &mut rng);
        session.start_diagnostic(&device, problems);
        assert_eq!(session.current_state(), Some("diagnostic"));

        let events = session.handle_input(&InputEvent::Skip);
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::ActivityCompleted { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::GemsAwarded { .. })));
        assert_eq!(session.ledger().total_diagnostics, 1);
    }

    #[test]
    fn update_drains_audio_cues_to_the_sink() {
        struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<AudioCue>>>);
        impl AudioSink for Recorder {
            fn play_cue(&mut self, cue: AudioCue, _intensity: u8) -> anyhow::Result<()> {
                self.0.borrow_mut().push(cue);
                Ok(())
            }
        }

        let played = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut session = PlaySession::new(ProgressLedger::new(AgeBracket::Young));
        session.set_audio_sink(Box::new(Recorder(played.clone())));

        let device = Device::trainer_bot();
        let mut rng = session_rng(3);
        let problems = generate_problems(&device, AgeBracket::Young, &mut rng);
        session.start_diagnostic(&device, problems);

        // Young hints surface after 15 seconds of inactivity.
        session.update(15_000);
        assert!(played.borrow().contains(&AudioCue::HintChime));
    }

    #[test]
    fn go_back_restores_the_previous_state() {
        let mut session = PlaySession::new(ProgressLedger::new(AgeBracket::Advanced));
        let device = Device::trainer_bot();
        let mut rng = session_rng(11);
        let problems = generate_problems(&device, AgeBracket::Advanced, &mut rng);
        session.start_diagnostic(&device, problems);
        assert_eq!(session.current_state(), Some("diagnostic"));

        session.go_back().expect("history present");
        assert_eq!(session.current_state(), Some("interstitial"));
    }
}
