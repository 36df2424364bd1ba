//! Tool-matching repair session state with continuous cleaning progress.
//!
//! Outcomes are deterministic given tool choice and elapsed time; no
//! randomness affects pass/fail. Input handling resolves the target area
//! first and mutates it after, never while iterating the area list.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{AREA_HINT_ATTEMPT_THRESHOLD, CLEANING_COMPLETE};
use crate::device::{ComponentKind, Device, Rect, Texture};
use crate::events::{AudioCue, EngineEvent, EventQueue};
use crate::ledger::{ActivityRecord, RepairRecord};
use crate::machine::{EngineState, InputEvent};
use crate::problem::{Problem, ProblemKind, Tool};
use crate::session::{SessionContext, SessionProgress};
use crate::{FrameSnapshot, ViewSink};

/// Timed, continuous-progress sub-activity for dirty problems. Exactly one
/// instance may be active at a time; reaching 100% marks the problem fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningStage {
    pub is_active: bool,
    /// Index of the repair area being cleaned.
    pub target_area: usize,
    /// Normalized grime amount derived from fault severity, 0-1.
    pub dirt_level: f32,
    /// Monotonically non-decreasing while active, 0-100.
    pub progress: f32,
    pub texture: Texture,
    severity: u8,
}

impl CleaningStage {
    fn new(target_area: usize, component: ComponentKind, severity: u8) -> Self {
        Self {
            is_active: true,
            target_area,
            dirt_level: f32::from(severity.clamp(1, 3)) / 3.0,
            progress: 0.0,
            texture: component.texture(),
            severity: severity.clamp(1, 3),
        }
    }

    /// Accumulate progress for elapsed time. The rate is fixed by the
    /// component's texture class and scaled down by severity. Returns true
    /// when cleaning just finished.
    fn advance(&mut self, dt_ms: u64) -> bool {
        if !self.is_active || self.progress >= CLEANING_COMPLETE {
            return false;
        }
        #[allow(clippy::cast_precision_loss)]
        let seconds = dt_ms as f32 / 1_000.0;
        let rate = self.texture.cleaning_rate_per_sec() / f32::from(self.severity);
        self.progress = (self.progress + rate * seconds).min(CLEANING_COMPLETE);
        if self.progress >= CLEANING_COMPLETE {
            self.is_active = false;
            return true;
        }
        false
    }
}

/// One fault area under repair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairArea {
    pub problem: Problem,
    pub bounds: Rect,
    pub fixed: bool,
    pub highlighted: bool,
    pub incorrect_attempts: u32,
}

/// Read-only per-frame snapshot for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairSnapshot {
    pub areas: Vec<RepairAreaView>,
    pub selected_tool: Option<Tool>,
    pub cleaning: Option<CleaningView>,
    pub progress: SessionProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepairAreaView {
    pub component: ComponentKind,
    pub bounds: Rect,
    pub highlighted: bool,
    pub fixed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CleaningView {
    pub component: ComponentKind,
    pub dirt_level: f32,
    pub progress: f32,
}

/// Repair session: consumes identified problems, emits per-problem
/// tool-usage outcomes and cleaning completions.
#[derive(Debug, Clone)]
pub struct RepairSession {
    areas: Vec<RepairArea>,
    selected_tool: Option<Tool>,
    cleaning: Option<CleaningStage>,
    progress: SessionProgress,
    tools_used: BTreeSet<Tool>,
    kinds_fixed: BTreeSet<ProblemKind>,
    skipped: bool,
    outcome_emitted: bool,
}

impl RepairSession {
    #[must_use]
    pub fn new(device: &Device, problems: Vec<Problem>) -> Self {
        let areas: Vec<RepairArea> = problems
            .into_iter()
            .map(|problem| RepairArea {
                bounds: device.bounds_of(problem.component).unwrap_or_default(),
                problem,
                fixed: false,
                highlighted: false,
                incorrect_attempts: 0,
            })
            .collect();
        let progress = SessionProgress {
            total_problems: u32::try_from(areas.len()).unwrap_or(u32::MAX),
            ..SessionProgress::default()
        };
        Self {
            areas,
            selected_tool: None,
            cleaning: None,
            progress,
            tools_used: BTreeSet::new(),
            kinds_fixed: BTreeSet::new(),
            skipped: false,
            outcome_emitted: false,
        }
    }

    #[must_use]
    pub const fn progress(&self) -> &SessionProgress {
        &self.progress
    }

    #[must_use]
    pub const fn selected_tool(&self) -> Option<Tool> {
        self.selected_tool
    }

    #[must_use]
    pub const fn cleaning_stage(&self) -> Option<&CleaningStage> {
        self.cleaning.as_ref()
    }

    /// Select a tool: every unfixed area whose required tool matches is
    /// highlighted, every other area is not.
    pub fn select_tool(&mut self, events: &mut EventQueue, tool: Tool) {
        self.selected_tool = Some(tool);
        for area in &mut self.areas {
            area.highlighted = !area.fixed && area.problem.required_tool == tool;
        }
        events.push_audio(AudioCue::ToolSelected, 50);
    }

    /// Attempt a repair at the tapped point with the selected tool.
    pub fn attempt_repair(&mut self, events: &mut EventQueue, x: f32, y: f32) {
        if self.progress.is_complete || self.selected_tool.is_none() {
            return;
        }
        let Some(idx) = self
            .areas
            .iter()
            .position(|a| !a.fixed && a.bounds.contains(x, y))
        else {
            return;
        };

        if self.areas[idx].highlighted {
            let is_dirty = self.areas[idx].problem.kind == ProblemKind::Dirty;
            // Only one cleaning stage at a time: a dirty-area tap that
            // cannot start work earns no tool-usage credit.
            if is_dirty && self.cleaning.is_some() {
                return;
            }
            self.progress.correct += 1;
            if let Some(tool) = self.selected_tool {
                self.tools_used.insert(tool);
            }
            if is_dirty {
                let problem = &self.areas[idx].problem;
                self.cleaning = Some(CleaningStage::new(idx, problem.component, problem.severity));
                events.push_audio(AudioCue::CleaningTick, 30);
            } else {
                self.fix_area(events, idx);
            }
        } else {
            self.progress.incorrect += 1;
            self.areas[idx].incorrect_attempts += 1;
            events.push_audio(AudioCue::IncorrectIdentification, 40);
            if self.areas[idx].incorrect_attempts == AREA_HINT_ATTEMPT_THRESHOLD {
                events.push(EngineEvent::HintGesture {
                    component: self.areas[idx].problem.component,
                });
            }
        }
    }

    fn fix_area(&mut self, events: &mut EventQueue, idx: usize) {
        let area = &mut self.areas[idx];
        if area.fixed {
            return;
        }
        area.fixed = true;
        area.highlighted = false;
        self.kinds_fixed.insert(area.problem.kind);
        self.progress.fixed += 1;
        events.push_audio(AudioCue::RepairSuccess, 80);
        self.try_complete(events);
    }

    /// Advance elapsed time and any active cleaning stage.
    pub fn tick(&mut self, events: &mut EventQueue, dt_ms: u64) {
        self.progress.time_elapsed_ms = self.progress.time_elapsed_ms.saturating_add(dt_ms);
        let finished_idx = match self.cleaning.as_mut() {
            Some(stage) => {
                let finished = stage.advance(dt_ms);
                if finished {
                    Some(stage.target_area)
                } else {
                    events.push_audio(AudioCue::CleaningTick, 30);
                    None
                }
            }
            None => None,
        };
        if let Some(idx) = finished_idx {
            self.cleaning = None;
            self.fix_area(events, idx);
        }
    }

    /// Accessibility skip: force-completes the session without awarding
    /// repair credit beyond what was already earned.
    pub fn skip(&mut self, events: &mut EventQueue) {
        for area in &mut self.areas {
            area.fixed = true;
            area.highlighted = false;
        }
        self.cleaning = None;
        self.skipped = true;
        self.try_complete(events);
    }

    /// Idempotent completion: a second call changes no counters.
    fn try_complete(&mut self, events: &mut EventQueue) {
        let all_fixed = self.progress.fixed >= self.progress.total_problems;
        if (!all_fixed && !self.skipped) || self.outcome_emitted {
            return;
        }
        self.progress.is_complete = true;
        self.outcome_emitted = true;
        let concepts = self
            .kinds_fixed
            .iter()
            .map(|kind| kind.concept().to_string())
            .collect();
        events.push(EngineEvent::ActivityCompleted {
            record: ActivityRecord::Repair(RepairRecord {
                duration_ms: self.progress.time_elapsed_ms,
                components_fixed: self.progress.fixed,
                distinct_tools: u32::try_from(self.tools_used.len()).unwrap_or(u32::MAX),
                distinct_kinds: u32::try_from(self.kinds_fixed.len()).unwrap_or(u32::MAX),
                correct_tool_usages: self.progress.correct,
                incorrect_tool_usages: self.progress.incorrect,
                concepts,
            }),
        });
    }

    #[must_use]
    pub fn snapshot(&self) -> RepairSnapshot {
        RepairSnapshot {
            areas: self
                .areas
                .iter()
                .map(|a| RepairAreaView {
                    component: a.problem.component,
                    bounds: a.bounds,
                    highlighted: a.highlighted,
                    fixed: a.fixed,
                })
                .collect(),
            selected_tool: self.selected_tool,
            cleaning: self.cleaning.as_ref().map(|stage| CleaningView {
                component: self.areas[stage.target_area].problem.component,
                dirt_level: stage.dirt_level,
                progress: stage.progress,
            }),
            progress: self.progress,
        }
    }
}

impl EngineState<SessionContext> for RepairSession {
    fn name(&self) -> &'static str {
        "repair"
    }

    fn update(&mut self, ctx: &mut SessionContext, dt_ms: u64) {
        self.tick(&mut ctx.events, dt_ms);
    }

    fn handle_input(&mut self, ctx: &mut SessionContext, event: &InputEvent) {
        match *event {
            InputEvent::Tap { x, y } => self.attempt_repair(&mut ctx.events, x, y),
            InputEvent::SelectTool { tool } => self.select_tool(&mut ctx.events, tool),
            InputEvent::Skip => self.skip(&mut ctx.events),
            InputEvent::RequestHint | InputEvent::DismissHint => {}
        }
    }

    fn render(&self, view: &mut dyn ViewSink) {
        view.present(&FrameSnapshot::Repair(self.snapshot()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceComponent;
    use smallvec::smallvec;

    fn fixture() -> (Device, Vec<Problem>) {
        let device = Device::new(
            "bench-bot",
            vec![
                DeviceComponent {
                    kind: ComponentKind::PowerCore,
                    bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
                },
                DeviceComponent {
                    kind: ComponentKind::ChassisPlating,
                    bounds: Rect::new(0.0, 100.0, 100.0, 100.0),
                },
            ],
        );
        let problems = vec![
            Problem::new(ComponentKind::PowerCore, ProblemKind::LowPower, 1, smallvec![]),
            Problem::new(ComponentKind::ChassisPlating, ProblemKind::Dirty, 1, smallvec![]),
        ];
        (device, problems)
    }

    #[test]
    fn tool_selection_highlights_exactly_matching_areas() {
        let (device, problems) = fixture();
        let mut session = RepairSession::new(&device, problems);
        let mut events = EventQueue::new();

        session.select_tool(&mut events, Tool::PowerCell);
        let snapshot = session.snapshot();
        for view in &snapshot.areas {
            if view.component == ComponentKind::PowerCore {
                assert!(view.highlighted);
            } else {
                assert!(!view.highlighted);
            }
        }

        session.select_tool(&mut events, Tool::Brush);
        let snapshot = session.snapshot();
        for view in &snapshot.areas {
            assert_eq!(view.highlighted, view.component == ComponentKind::ChassisPlating);
        }
    }

    #[test]
    fn matching_tool_fixes_directly_for_non_dirty_problems() {
        let (device, problems) = fixture();
        let mut session = RepairSession::new(&device, problems);
        let mut events = EventQueue::new();

        session.select_tool(&mut events, Tool::PowerCell);
        session.attempt_repair(&mut events, 50.0, 50.0);
        let progress = *session.progress();
        assert_eq!(progress.correct, 1);
        assert_eq!(progress.fixed, 1);
        assert!(!progress.is_complete);
    }

    #[test]
    fn dirty_problems_open_a_single_cleaning_stage() {
        let (device, problems) = fixture();
        let mut session = RepairSession::new(&device, problems);
        let mut events = EventQueue::new();

        session.select_tool(&mut events, Tool::Brush);
        session.attempt_repair(&mut events, 50.0, 150.0);
        let stage = session.cleaning_stage().expect("stage active");
        assert!(stage.is_active);
        assert!(stage.progress.abs() <= f32::EPSILON);

        // A second attempt while cleaning neither spawns another stage nor
        // earns extra tool-usage credit.
        session.attempt_repair(&mut events, 50.0, 150.0);
        assert_eq!(session.progress().correct, 1);
        assert!(session.cleaning_stage().is_some());
    }

    #[test]
    fn second_dirty_area_waits_for_the_active_stage() {
        let device = Device::new(
            "bench-bot",
            vec![
                DeviceComponent {
                    kind: ComponentKind::PowerCore,
                    bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
                },
                DeviceComponent {
                    kind: ComponentKind::ChassisPlating,
                    bounds: Rect::new(0.0, 100.0, 100.0, 100.0),
                },
            ],
        );
        let problems = vec![
            Problem::new(ComponentKind::PowerCore, ProblemKind::Dirty, 1, smallvec![]),
            Problem::new(ComponentKind::ChassisPlating, ProblemKind::Dirty, 1, smallvec![]),
        ];
        let mut session = RepairSession::new(&device, problems);
        let mut events = EventQueue::new();

        session.select_tool(&mut events, Tool::Brush);
        session.attempt_repair(&mut events, 50.0, 50.0);
        session.attempt_repair(&mut events, 50.0, 150.0);
        assert_eq!(session.progress().correct, 1);
        assert_eq!(session.cleaning_stage().map(|s| s.target_area), Some(0));

        // Textured plastic at severity 1 cleans at 18 points/second; once
        // the first stage finishes, the second area accepts the tap.
        for _ in 0..6 {
            session.tick(&mut events, 1_000);
        }
        assert!(session.cleaning_stage().is_none());
        session.attempt_repair(&mut events, 50.0, 150.0);
        assert_eq!(session.progress().correct, 2);
        assert_eq!(session.cleaning_stage().map(|s| s.target_area), Some(1));
    }

    #[test]
    fn cleaning_progress_is_monotone_and_completes_the_fix() {
        let (device, problems) = fixture();
        let mut session = RepairSession::new(&device, problems);
        let mut events = EventQueue::new();

        session.select_tool(&mut events, Tool::Brush);
        session.attempt_repair(&mut events, 50.0, 150.0);

        // Chassis plating is smooth metal at severity 1: 25 points/second.
        let mut last = 0.0f32;
        for _ in 0..3 {
            session.tick(&mut events, 1_000);
            let stage = session.cleaning_stage().expect("still cleaning");
            assert!(stage.progress >= last);
            last = stage.progress;
        }
        session.tick(&mut events, 1_000);
        assert!(session.cleaning_stage().is_none());
        assert_eq!(session.progress().fixed, 1);
    }

    #[test]
    fn wrong_tool_attempts_escalate_to_a_hint_gesture() {
        let (device, problems) = fixture();
        let mut session = RepairSession::new(&device, problems);
        let mut events = EventQueue::new();

        session.select_tool(&mut events, Tool::Brush);
        for _ in 0..AREA_HINT_ATTEMPT_THRESHOLD {
            session.attempt_repair(&mut events, 50.0, 50.0);
        }
        assert_eq!(session.progress().incorrect, AREA_HINT_ATTEMPT_THRESHOLD);
        let gestures = std::iter::from_fn(|| events.pop())
            .filter(|e| matches!(e, EngineEvent::HintGesture { .. }))
            .count();
        assert_eq!(gestures, 1);
    }

    #[test]
    fn session_completes_when_all_problems_fixed() {
        let (device, problems) = fixture();
        let mut session = RepairSession::new(&device, problems);
        let mut events = EventQueue::new();

        session.select_tool(&mut events, Tool::PowerCell);
        session.attempt_repair(&mut events, 50.0, 50.0);
        session.select_tool(&mut events, Tool::Brush);
        session.attempt_repair(&mut events, 50.0, 150.0);
        for _ in 0..12 {
            session.tick(&mut events, 1_000);
        }
        assert!(session.progress().is_complete);

        let records: Vec<_> = std::iter::from_fn(|| events.pop())
            .filter_map(|e| match e {
                EngineEvent::ActivityCompleted {
                    record: ActivityRecord::Repair(r),
                } => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].components_fixed, 2);
        assert_eq!(records[0].distinct_tools, 2);
        assert!(records[0].concepts.contains(&String::from("surface_maintenance")));
    }

    #[test]
    fn skip_completes_without_extra_repair_credit() {
        let (device, problems) = fixture();
        let mut session = RepairSession::new(&device, problems);
        let mut events = EventQueue::new();

        session.skip(&mut events);
        let progress = *session.progress();
        assert!(progress.is_complete);
        assert_eq!(progress.fixed, 0);
        assert_eq!(progress.correct, 0);

        session.skip(&mut events);
        assert_eq!(*session.progress(), progress);
    }

    #[test]
    fn no_tool_selected_means_no_attempt_is_registered() {
        let (device, problems) = fixture();
        let mut session = RepairSession::new(&device, problems);
        let mut events = EventQueue::new();
        session.attempt_repair(&mut events, 50.0, 50.0);
        assert_eq!(session.progress().correct, 0);
        assert_eq!(session.progress().incorrect, 0);
    }
}
