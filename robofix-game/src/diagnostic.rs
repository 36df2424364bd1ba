//! Diagnosis-by-exploration session state.
//!
//! The player taps components to identify generated faults. An orthogonal
//! hint sub-state escalates from idle to shown when the inactivity timer
//! reaches the bracket's hint delay; any tap or explicit dismissal clears it.
use serde::{Deserialize, Serialize};

use crate::device::{ComponentKind, Device, Rect};
use crate::difficulty::{AgeBracket, DifficultyProfile};
use crate::events::{AudioCue, EngineEvent, EventQueue};
use crate::ledger::{ActivityRecord, DiagnosticRecord};
use crate::machine::{EngineState, InputEvent};
use crate::problem::{Problem, VisualCue};
use crate::session::{SessionContext, SessionProgress};
use crate::{FrameSnapshot, ViewSink};

/// Gesture class a hint can animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintGesture {
    PointAt,
    Sparkle,
}

/// Content of one shown hint. Selection is a fixed lookup keyed by bracket
/// and hints-used count, never randomized: gesture-only for young learners
/// early on, text for older learners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintContent {
    pub gesture: Option<HintGesture>,
    pub text: Option<String>,
    pub target: Option<ComponentKind>,
}

fn hint_for(
    bracket: AgeBracket,
    hints_used: u32,
    target: Option<ComponentKind>,
) -> HintContent {
    let label = target.map(ComponentKind::label);
    match bracket {
        AgeBracket::Young => match hints_used {
            0 => HintContent {
                gesture: Some(HintGesture::PointAt),
                text: None,
                target,
            },
            1 => HintContent {
                gesture: Some(HintGesture::Sparkle),
                text: None,
                target,
            },
            _ => HintContent {
                gesture: Some(HintGesture::PointAt),
                text: label.map(|l| format!("Look at the {l}!")),
                target,
            },
        },
        AgeBracket::Middle => HintContent {
            gesture: Some(HintGesture::PointAt),
            text: label.map(|l| format!("Check the {l}.")),
            target,
        },
        AgeBracket::Advanced => HintContent {
            gesture: None,
            text: label.map(|l| format!("One fault is on the {l}. Which tool would fix it?")),
            target,
        },
    }
}

/// One tappable fault area within the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticArea {
    pub problem: Problem,
    pub bounds: Rect,
    pub identified: bool,
}

/// Read-only per-frame snapshot handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSnapshot {
    pub areas: Vec<DiagnosticAreaView>,
    pub hint: Option<HintContent>,
    pub progress: SessionProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticAreaView {
    pub component: ComponentKind,
    pub bounds: Rect,
    /// Cues still rendered; cleared once the fault is identified.
    pub cues: Vec<VisualCue>,
    pub identified: bool,
}

/// Diagnostic session: consumes a generated problem set, emits identification
/// outcomes and timing.
#[derive(Debug, Clone)]
pub struct DiagnosticSession {
    profile: DifficultyProfile,
    areas: Vec<DiagnosticArea>,
    progress: SessionProgress,
    idle_ms: u64,
    hint: Option<HintContent>,
    outcome_emitted: bool,
}

impl DiagnosticSession {
    #[must_use]
    pub fn new(device: &Device, problems: Vec<Problem>, bracket: AgeBracket) -> Self {
        let areas: Vec<DiagnosticArea> = problems
            .into_iter()
            .map(|problem| DiagnosticArea {
                bounds: device.bounds_of(problem.component).unwrap_or_default(),
                problem,
                identified: false,
            })
            .collect();
        let progress = SessionProgress {
            total_problems: u32::try_from(areas.len()).unwrap_or(u32::MAX),
            ..SessionProgress::default()
        };
        Self {
            profile: DifficultyProfile::for_bracket(bracket),
            areas,
            progress,
            idle_ms: 0,
            hint: None,
            outcome_emitted: false,
        }
    }

    #[must_use]
    pub const fn progress(&self) -> &SessionProgress {
        &self.progress
    }

    #[must_use]
    pub const fn active_hint(&self) -> Option<&HintContent> {
        self.hint.as_ref()
    }

    /// Advance the session clock. Elapsed time accumulates regardless of
    /// interaction; the inactivity timer escalates the hint sub-state.
    pub fn tick(&mut self, events: &mut EventQueue, dt_ms: u64) {
        self.progress.time_elapsed_ms = self.progress.time_elapsed_ms.saturating_add(dt_ms);
        if self.progress.is_complete || self.hint.is_some() {
            return;
        }
        self.idle_ms = self.idle_ms.saturating_add(dt_ms);
        if self.idle_ms >= self.profile.hint_delay_ms {
            self.show_hint(events);
        }
    }

    /// Manual hint request; always honored immediately, bypassing the timer.
    pub fn request_hint(&mut self, events: &mut EventQueue) {
        self.show_hint(events);
    }

    fn show_hint(&mut self, events: &mut EventQueue) {
        let target = self
            .areas
            .iter()
            .find(|a| !a.identified)
            .map(|a| a.problem.component);
        let content = hint_for(self.profile.bracket, self.progress.hints_used, target);
        self.progress.hints_used += 1;
        self.hint = Some(content);
        self.idle_ms = 0;
        events.push_audio(AudioCue::HintChime, 60);
    }

    /// Explicitly dismiss a visible hint; the inactivity timer restarts.
    pub fn dismiss_hint(&mut self) {
        self.hint = None;
        self.idle_ms = 0;
    }

    /// Resolve a tap. A hit on an unidentified fault counts as a correct
    /// identification and clears that area's cues; anything else counts as an
    /// incorrect attempt. Any tap clears a visible hint.
    pub fn handle_tap(&mut self, events: &mut EventQueue, x: f32, y: f32) {
        self.hint = None;
        self.idle_ms = 0;
        if self.progress.is_complete {
            return;
        }

        let hit = self
            .areas
            .iter()
            .position(|a| !a.identified && a.bounds.contains(x, y));
        if let Some(idx) = hit {
            self.areas[idx].identified = true;
            self.progress.identified += 1;
            self.progress.correct += 1;
            events.push_audio(AudioCue::CorrectIdentification, 70);
        } else {
            self.progress.incorrect += 1;
            events.push_audio(AudioCue::IncorrectIdentification, 40);
        }
        self.try_complete(events);
    }

    /// Accessibility skip: marks every fault identified without awarding
    /// correctness credit beyond what was already earned, completing the
    /// session in one call.
    pub fn skip(&mut self, events: &mut EventQueue) {
        for area in &mut self.areas {
            area.identified = true;
        }
        self.progress.identified = self.progress.total_problems;
        self.try_complete(events);
    }

    /// Idempotent completion: a second call changes no counters.
    fn try_complete(&mut self, events: &mut EventQueue) {
        if self.progress.identified < self.progress.total_problems || self.outcome_emitted {
            return;
        }
        self.progress.is_complete = true;
        self.outcome_emitted = true;
        let taps = self.progress.correct + self.progress.incorrect;
        #[allow(clippy::cast_precision_loss)]
        let accuracy = if taps == 0 {
            0.0
        } else {
            self.progress.correct as f32 / taps as f32
        };
        events.push(EngineEvent::ActivityCompleted {
            record: ActivityRecord::Diagnostic(DiagnosticRecord {
                duration_ms: self.progress.time_elapsed_ms,
                total_problems: self.progress.total_problems,
                identified: self.progress.identified,
                correct: self.progress.correct,
                incorrect: self.progress.incorrect,
                hints_used: self.progress.hints_used,
                accuracy,
            }),
        });
    }

    #[must_use]
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            areas: self
                .areas
                .iter()
                .map(|a| DiagnosticAreaView {
                    component: a.problem.component,
                    bounds: a.bounds,
                    cues: if a.identified {
                        Vec::new()
                    } else {
                        a.problem.cues.to_vec()
                    },
                    identified: a.identified,
                })
                .collect(),
            hint: self.hint.clone(),
            progress: self.progress,
        }
    }
}

impl EngineState<SessionContext> for DiagnosticSession {
    fn name(&self) -> &'static str {
        "diagnostic"
    }

    fn update(&mut self, ctx: &mut SessionContext, dt_ms: u64) {
        self.tick(&mut ctx.events, dt_ms);
    }

    fn handle_input(&mut self, ctx: &mut SessionContext, event: &InputEvent) {
        match *event {
            InputEvent::Tap { x, y } => self.handle_tap(&mut ctx.events, x, y),
            InputEvent::RequestHint => self.request_hint(&mut ctx.events),
            InputEvent::DismissHint => self.dismiss_hint(),
            InputEvent::Skip => self.skip(&mut ctx.events),
            InputEvent::SelectTool { .. } => {}
        }
    }

    fn render(&self, view: &mut dyn ViewSink) {
        view.present(&FrameSnapshot::Diagnostic(self.snapshot()));
    }
}
