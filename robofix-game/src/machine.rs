//! Generic session state machine with bounded history.
//!
//! States are opaque to the machine; it enforces no domain-specific
//! transition graph. Any state may follow any other, including interstitial
//! states reachable from everywhere.
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ViewSink;
use crate::constants::STATE_HISTORY_CAP;
use crate::problem::Tool;

/// Player input forwarded to the current state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum InputEvent {
    /// Tap or click in layout units.
    Tap { x: f32, y: f32 },
    /// Pick a tool from the repair tray.
    SelectTool { tool: Tool },
    /// Manual hint request; always honored immediately.
    RequestHint,
    /// Explicitly dismiss a visible hint.
    DismissHint,
    /// Accessibility skip: force-completes the active session.
    Skip,
}

/// Failure modes of machine operations. Transitions themselves always
/// succeed; a null destination is unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("no history entry to go back to")]
    EmptyHistory,
}

/// A session state driven by the frame loop. Default hooks are no-ops so
/// lightweight states (interstitials) only implement what they need.
pub trait EngineState<C> {
    fn name(&self) -> &'static str;

    fn on_enter(&mut self, _ctx: &mut C) {}

    fn on_exit(&mut self, _ctx: &mut C) {}

    fn update(&mut self, _ctx: &mut C, _dt_ms: u64) {}

    fn handle_input(&mut self, _ctx: &mut C, _event: &InputEvent) {}

    fn render(&self, _view: &mut dyn ViewSink) {}
}

/// Container managing one active state plus a bounded history of outgoing
/// states (capped, oldest dropped first).
pub struct StateMachine<C> {
    current: Option<Box<dyn EngineState<C>>>,
    history: VecDeque<Box<dyn EngineState<C>>>,
}

impl<C> Default for StateMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> StateMachine<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: None,
            history: VecDeque::with_capacity(STATE_HISTORY_CAP),
        }
    }

    /// Exit the current state, push it onto history, and enter `next`.
    pub fn change_state(&mut self, ctx: &mut C, mut next: Box<dyn EngineState<C>>) {
        if let Some(mut outgoing) = self.current.take() {
            outgoing.on_exit(ctx);
            if self.history.len() == STATE_HISTORY_CAP {
                self.history.pop_front();
            }
            self.history.push_back(outgoing);
        }
        next.on_enter(ctx);
        self.current = Some(next);
    }

    /// Pop the most recent history entry and replay it as the current state.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::EmptyHistory`] (a no-op) when no history exists.
    pub fn go_back(&mut self, ctx: &mut C) -> Result<(), StateError> {
        let mut previous = self.history.pop_back().ok_or(StateError::EmptyHistory)?;
        if let Some(mut outgoing) = self.current.take() {
            outgoing.on_exit(ctx);
        }
        previous.on_enter(ctx);
        self.current = Some(previous);
        Ok(())
    }

    /// Delegate a frame tick to the current state only.
    pub fn update(&mut self, ctx: &mut C, dt_ms: u64) {
        if let Some(state) = self.current.as_mut() {
            state.update(ctx, dt_ms);
        }
    }

    /// Delegate rendering to the current state only.
    pub fn render(&self, view: &mut dyn ViewSink) {
        if let Some(state) = self.current.as_ref() {
            state.render(view);
        }
    }

    /// Delegate input to the current state only.
    pub fn handle_input(&mut self, ctx: &mut C, event: &InputEvent) {
        if let Some(state) = self.current.as_mut() {
            state.handle_input(ctx, event);
        }
    }

    #[must_use]
    pub fn current_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(|s| s.name())
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn current(&self) -> Option<&dyn EngineState<C>> {
        self.current.as_deref()
    }

    pub fn current_mut(&mut self) -> Option<&mut (dyn EngineState<C> + 'static)> {
        self.current.as_deref_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Trace {
        entries: Vec<String>,
    }

    struct Probe {
        name: &'static str,
    }

    impl EngineState<Trace> for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn on_enter(&mut self, ctx: &mut Trace) {
            ctx.entries.push(format!("enter:{}", self.name));
        }

        fn on_exit(&mut self, ctx: &mut Trace) {
            ctx.entries.push(format!("exit:{}", self.name));
        }

        fn update(&mut self, ctx: &mut Trace, dt_ms: u64) {
            ctx.entries.push(format!("update:{}:{dt_ms}", self.name));
        }
    }

    fn probe(name: &'static str) -> Box<dyn EngineState<Trace>> {
        Box::new(Probe { name })
    }

    #[test]
    fn change_state_exits_before_entering() {
        let mut ctx = Trace::default();
        let mut machine = StateMachine::new();
        machine.change_state(&mut ctx, probe("menu"));
        machine.change_state(&mut ctx, probe("diagnostic"));
        assert_eq!(
            ctx.entries,
            vec!["enter:menu", "exit:menu", "enter:diagnostic"]
        );
        assert_eq!(machine.current_name(), Some("diagnostic"));
        assert_eq!(machine.history_len(), 1);
    }

    #[test]
    fn go_back_replays_most_recent_state() {
        let mut ctx = Trace::default();
        let mut machine = StateMachine::new();
        machine.change_state(&mut ctx, probe("menu"));
        machine.change_state(&mut ctx, probe("interstitial"));
        assert!(machine.go_back(&mut ctx).is_ok());
        assert_eq!(machine.current_name(), Some("menu"));
        assert_eq!(machine.history_len(), 0);
        assert_eq!(ctx.entries.last().map(String::as_str), Some("enter:menu"));
    }

    #[test]
    fn go_back_on_empty_history_is_a_failing_no_op() {
        let mut ctx = Trace::default();
        let mut machine = StateMachine::new();
        machine.change_state(&mut ctx, probe("menu"));
        assert_eq!(machine.go_back(&mut ctx), Err(StateError::EmptyHistory));
        assert_eq!(machine.current_name(), Some("menu"));
    }

    #[test]
    fn history_is_capped_dropping_oldest() {
        let mut ctx = Trace::default();
        let mut machine = StateMachine::new();
        for i in 0..(STATE_HISTORY_CAP + 3) {
            let name: &'static str = Box::leak(format!("state-{i}").into_boxed_str());
            machine.change_state(&mut ctx, probe(name));
        }
        assert_eq!(machine.history_len(), STATE_HISTORY_CAP);
        // Unwind the full history; the oldest three entries were dropped.
        let mut names = Vec::new();
        while machine.go_back(&mut ctx).is_ok() {
            names.push(machine.current_name().unwrap());
        }
        assert_eq!(names.len(), STATE_HISTORY_CAP);
        assert_eq!(names.last().copied(), Some("state-2"));
    }

    #[test]
    fn current_mut_exposes_the_active_state() {
        let mut ctx = Trace::default();
        let mut machine = StateMachine::new();
        assert!(machine.current_mut().is_none());

        machine.change_state(&mut ctx, probe("menu"));
        let state = machine.current_mut().expect("active state");
        state.update(&mut ctx, 8);
        assert_eq!(state.name(), "menu");
        assert_eq!(ctx.entries.last().map(String::as_str), Some("update:menu:8"));
    }

    #[test]
    fn update_delegates_to_current_state_only() {
        let mut ctx = Trace::default();
        let mut machine = StateMachine::new();
        machine.update(&mut ctx, 16);
        assert!(ctx.entries.is_empty());
        machine.change_state(&mut ctx, probe("menu"));
        machine.update(&mut ctx, 16);
        assert_eq!(ctx.entries.last().map(String::as_str), Some("update:menu:16"));
    }
}
