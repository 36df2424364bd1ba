//! Persistent progress, currency, and milestone ledger.
//!
//! The ledger is an explicitly constructed service instance injected into the
//! play session; there is no global singleton. Milestone and award events are
//! pushed onto the shared [`EventQueue`] and drained once per update tick.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    COMPONENTS_FIXED_BONUS_CAP, CUSTOMIZATION_BASE_GEMS, DIAGNOSTIC_BASE_GEMS,
    MILESTONE_ADEPT, MILESTONE_APPRENTICE, MILESTONE_EXPERT, MILESTONE_FIRST_REPAIR,
    MILESTONE_MASTER, REPAIR_BASE_GEMS,
};
use crate::difficulty::AgeBracket;
use crate::events::{AudioCue, EngineEvent, EventQueue};
use crate::problem::Tool;

/// Activity family a telemetry record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Diagnostic,
    Repair,
    Customization,
}

/// Telemetry from one completed diagnostic session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub duration_ms: u64,
    pub total_problems: u32,
    pub identified: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub hints_used: u32,
    /// Correct taps over total taps, 0-1. Zero when no taps were made.
    pub accuracy: f32,
}

impl DiagnosticRecord {
    /// Clamp fields into their invariant ranges. Applied at the recording
    /// boundary so analytics never sees malformed rows.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if !self.accuracy.is_finite() {
            self.accuracy = 0.0;
        }
        self.accuracy = self.accuracy.clamp(0.0, 1.0);
        self.identified = self.identified.min(self.total_problems);
        self.correct = self.correct.min(self.identified);
        self
    }
}

/// Telemetry from one completed repair session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairRecord {
    pub duration_ms: u64,
    /// Components actually brought back to working order.
    pub components_fixed: u32,
    pub distinct_tools: u32,
    pub distinct_kinds: u32,
    pub correct_tool_usages: u32,
    pub incorrect_tool_usages: u32,
    /// STEM concepts exercised by the repaired problem kinds.
    pub concepts: Vec<String>,
}

impl RepairRecord {
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.concepts.sort_unstable();
        self.concepts.dedup();
        self
    }
}

/// Telemetry from one completed customization session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomizationRecord {
    pub duration_ms: u64,
    pub items_applied: u32,
    pub colors: Vec<String>,
    pub accessories: Vec<String>,
    /// Design uniqueness estimate, 0-100.
    pub uniqueness: f32,
}

impl CustomizationRecord {
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if !self.uniqueness.is_finite() {
            self.uniqueness = 0.0;
        }
        self.uniqueness = self.uniqueness.clamp(0.0, 100.0);
        self
    }
}

/// Tagged per-activity telemetry record; one variant per activity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "activity")]
pub enum ActivityRecord {
    Diagnostic(DiagnosticRecord),
    Repair(RepairRecord),
    Customization(CustomizationRecord),
}

impl ActivityRecord {
    #[must_use]
    pub const fn kind(&self) -> ActivityKind {
        match self {
            Self::Diagnostic(_) => ActivityKind::Diagnostic,
            Self::Repair(_) => ActivityKind::Repair,
            Self::Customization(_) => ActivityKind::Customization,
        }
    }

    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        match self {
            Self::Diagnostic(r) => r.duration_ms,
            Self::Repair(r) => r.duration_ms,
            Self::Customization(r) => r.duration_ms,
        }
    }

    /// Hints consumed during the activity; zero outside diagnostics.
    #[must_use]
    pub const fn hints_used(&self) -> u32 {
        match self {
            Self::Diagnostic(r) => r.hints_used,
            _ => 0,
        }
    }

    /// Mistakes made during the activity (wrong taps or wrong tools).
    #[must_use]
    pub const fn mistakes(&self) -> u32 {
        match self {
            Self::Diagnostic(r) => r.incorrect,
            Self::Repair(r) => r.incorrect_tool_usages,
            Self::Customization(_) => 0,
        }
    }

    /// Route to the variant's sanitizer.
    #[must_use]
    pub fn sanitized(self) -> Self {
        match self {
            Self::Diagnostic(r) => Self::Diagnostic(r.sanitized()),
            Self::Repair(r) => Self::Repair(r.sanitized()),
            Self::Customization(r) => Self::Customization(r.sanitized()),
        }
    }
}

/// One-time unlock triggered by crossing a fixed cumulative repair count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneId {
    FirstRepair,
    RepairApprentice,
    RepairAdept,
    RepairExpert,
    RepairMaster,
}

impl MilestoneId {
    pub const ALL: [Self; 5] = [
        Self::FirstRepair,
        Self::RepairApprentice,
        Self::RepairAdept,
        Self::RepairExpert,
        Self::RepairMaster,
    ];

    #[must_use]
    pub const fn threshold(self) -> u32 {
        match self {
            Self::FirstRepair => MILESTONE_FIRST_REPAIR,
            Self::RepairApprentice => MILESTONE_APPRENTICE,
            Self::RepairAdept => MILESTONE_ADEPT,
            Self::RepairExpert => MILESTONE_EXPERT,
            Self::RepairMaster => MILESTONE_MASTER,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstRepair => "first_repair",
            Self::RepairApprentice => "repair_apprentice",
            Self::RepairAdept => "repair_adept",
            Self::RepairExpert => "repair_expert",
            Self::RepairMaster => "repair_master",
        }
    }

    /// Content granted when the milestone unlocks.
    #[must_use]
    pub fn reward(self) -> MilestoneReward {
        match self {
            Self::FirstRepair => MilestoneReward::Customization("decal_star"),
            Self::RepairApprentice => MilestoneReward::Tool(Tool::OilCan),
            Self::RepairAdept => MilestoneReward::Customization("paint_nebula"),
            Self::RepairExpert => MilestoneReward::Tool(Tool::CoolantPack),
            Self::RepairMaster => MilestoneReward::Customization("antenna_crown"),
        }
    }
}

/// Unlockable content attached to a milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneReward {
    Tool(Tool),
    Customization(&'static str),
}

/// A crossed milestone with its unlock timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: MilestoneId,
    pub unlocked_at_ms: u64,
}

/// Failure modes of [`ProgressLedger::spend_gems`]. State is unchanged on
/// failure; the balance never goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpendError {
    #[error("insufficient gems: requested {requested}, available {available}")]
    InsufficientFunds { requested: u32, available: u32 },
}

/// Cumulative, persisted record of a player's repairs, currency, unlocks,
/// achievements, and raw activity histories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressLedger {
    pub age_bracket: AgeBracket,
    #[serde(default)]
    pub total_repairs: u32,
    #[serde(default)]
    pub total_diagnostics: u32,
    #[serde(default)]
    pub total_customizations: u32,
    #[serde(default)]
    pub gems_earned: u32,
    #[serde(default)]
    pub gems_spent: u32,
    #[serde(default)]
    pub unlocked_tools: Vec<Tool>,
    #[serde(default)]
    pub unlocked_customizations: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    /// Raw per-activity histories consumed by the analytics engine.
    #[serde(default)]
    pub history: Vec<ActivityRecord>,
}

impl ProgressLedger {
    /// Fresh ledger for a first-time player. Starter tools are the ones every
    /// bracket begins with; the rest unlock through milestones.
    #[must_use]
    pub fn new(age_bracket: AgeBracket) -> Self {
        Self {
            age_bracket,
            total_repairs: 0,
            total_diagnostics: 0,
            total_customizations: 0,
            gems_earned: 0,
            gems_spent: 0,
            unlocked_tools: vec![Tool::Brush, Tool::PowerCell, Tool::Screwdriver],
            unlocked_customizations: Vec::new(),
            achievements: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Gems available to spend; `spent <= earned` always holds.
    #[must_use]
    pub const fn available_gems(&self) -> u32 {
        self.gems_earned - self.gems_spent
    }

    #[must_use]
    pub fn has_achievement(&self, id: MilestoneId) -> bool {
        self.achievements.iter().any(|a| a.id == id)
    }

    /// Record a completed repair session: counters, currency award, history
    /// append, and milestone evaluation. Returns the gems awarded.
    pub fn record_repair_completed(
        &mut self,
        record: RepairRecord,
        now_ms: u64,
        events: &mut EventQueue,
    ) -> u32 {
        let record = record.sanitized();
        self.total_repairs = self.total_repairs.saturating_add(1);
        let award = REPAIR_BASE_GEMS
            + self.age_bracket.gem_bonus()
            + record.components_fixed.min(COMPONENTS_FIXED_BONUS_CAP);
        self.award_gems(award, events);
        self.history.push(ActivityRecord::Repair(record));
        self.evaluate_milestones(now_ms, events);
        award
    }

    /// Record a completed diagnostic session. Returns the gems awarded.
    pub fn record_diagnostic_completed(
        &mut self,
        record: DiagnosticRecord,
        events: &mut EventQueue,
    ) -> u32 {
        let record = record.sanitized();
        self.total_diagnostics = self.total_diagnostics.saturating_add(1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let accuracy_bonus = (record.accuracy * 3.0).round() as u32;
        let award = DIAGNOSTIC_BASE_GEMS + self.age_bracket.gem_bonus() + accuracy_bonus;
        self.award_gems(award, events);
        self.history.push(ActivityRecord::Diagnostic(record));
        award
    }

    /// Record a completed customization session. Returns the gems awarded.
    pub fn record_customization_completed(
        &mut self,
        record: CustomizationRecord,
        events: &mut EventQueue,
    ) -> u32 {
        let record = record.sanitized();
        self.total_customizations = self.total_customizations.saturating_add(1);
        let award =
            CUSTOMIZATION_BASE_GEMS + self.age_bracket.gem_bonus() + record.items_applied.min(3);
        self.award_gems(award, events);
        self.history.push(ActivityRecord::Customization(record));
        award
    }

    fn award_gems(&mut self, amount: u32, events: &mut EventQueue) {
        self.gems_earned = self.gems_earned.saturating_add(amount);
        events.push(EngineEvent::GemsAwarded { amount });
    }

    /// Spend gems on an item. Fails without side effects when the amount
    /// exceeds the available balance.
    ///
    /// # Errors
    ///
    /// Returns [`SpendError::InsufficientFunds`] when `amount` exceeds the
    /// available balance; the ledger is unchanged in that case.
    pub fn spend_gems(&mut self, amount: u32, item_id: &str) -> Result<(), SpendError> {
        let available = self.available_gems();
        if amount > available {
            return Err(SpendError::InsufficientFunds {
                requested: amount,
                available,
            });
        }
        self.gems_spent += amount;
        if !self.unlocked_customizations.iter().any(|c| c == item_id) {
            self.unlocked_customizations.push(item_id.to_string());
        }
        Ok(())
    }

    /// Unlock every milestone whose threshold the repair count has crossed,
    /// exactly once per threshold.
    fn evaluate_milestones(&mut self, now_ms: u64, events: &mut EventQueue) {
        for id in MilestoneId::ALL {
            if self.total_repairs < id.threshold() || self.has_achievement(id) {
                continue;
            }
            self.achievements.push(Achievement {
                id,
                unlocked_at_ms: now_ms,
            });
            match id.reward() {
                MilestoneReward::Tool(tool) => {
                    if !self.unlocked_tools.contains(&tool) {
                        self.unlocked_tools.push(tool);
                    }
                    events.push(EngineEvent::ToolUnlocked { tool });
                }
                MilestoneReward::Customization(item) => {
                    if !self.unlocked_customizations.iter().any(|c| c == item) {
                        self.unlocked_customizations.push(item.to_string());
                    }
                    events.push(EngineEvent::CustomizationUnlocked {
                        item_id: item.to_string(),
                    });
                }
            }
            events.push(EngineEvent::MilestoneUnlocked {
                id,
                unlocked_at_ms: now_ms,
            });
            events.push_audio(AudioCue::MilestoneFanfare, 90);
            log::debug!("milestone unlocked: {}", id.as_str());
        }
    }

    /// Explicitly clear the ledger back to its initial zero state, keeping
    /// the configured bracket. The only sanctioned reset path.
    pub fn reset_progress(&mut self) {
        *self = Self::new(self.age_bracket);
    }

    // History accessors used by the analytics engine ------------------------

    #[must_use]
    pub fn diagnostic_history(&self) -> Vec<DiagnosticRecord> {
        self.history
            .iter()
            .filter_map(|r| match r {
                ActivityRecord::Diagnostic(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn repair_history(&self) -> Vec<RepairRecord> {
        self.history
            .iter()
            .filter_map(|r| match r {
                ActivityRecord::Repair(rec) => Some(rec.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn customization_history(&self) -> Vec<CustomizationRecord> {
        self.history
            .iter()
            .filter_map(|r| match r {
                ActivityRecord::Customization(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    /// Distinct STEM concepts covered across recorded repairs.
    #[must_use]
    pub fn concepts_learned(&self) -> Vec<String> {
        let mut concepts: Vec<String> = self
            .repair_history()
            .iter()
            .flat_map(|r| r.concepts.iter().cloned())
            .collect();
        concepts.sort_unstable();
        concepts.dedup();
        concepts
    }
}
