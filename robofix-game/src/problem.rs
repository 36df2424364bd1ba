//! Problems, tools, and visual cues.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::device::ComponentKind;

/// A diagnosable/fixable fault class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    LowPower,
    Dirty,
    Loose,
    Squeaky,
    Overheated,
}

impl ProblemKind {
    /// Deterministic problem-kind to tool mapping, fixed at generation time.
    #[must_use]
    pub const fn required_tool(self) -> Tool {
        match self {
            Self::LowPower => Tool::PowerCell,
            Self::Dirty => Tool::Brush,
            Self::Loose => Tool::Screwdriver,
            Self::Squeaky => Tool::OilCan,
            Self::Overheated => Tool::CoolantPack,
        }
    }

    /// STEM concept credited when a problem of this kind is repaired.
    #[must_use]
    pub const fn concept(self) -> &'static str {
        match self {
            Self::LowPower => "energy_storage",
            Self::Dirty => "surface_maintenance",
            Self::Loose => "mechanical_fastening",
            Self::Squeaky => "friction_and_lubrication",
            Self::Overheated => "thermal_management",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LowPower => "low power",
            Self::Dirty => "dirty",
            Self::Loose => "loose connection",
            Self::Squeaky => "squeaky joint",
            Self::Overheated => "overheated",
        }
    }

    /// Default visual-cue class surfaced for this kind.
    #[must_use]
    pub const fn cue_kind(self) -> CueKind {
        match self {
            Self::LowPower => CueKind::Flicker,
            Self::Dirty => CueKind::Grime,
            Self::Loose => CueKind::Wobble,
            Self::Squeaky => CueKind::Sparks,
            Self::Overheated => CueKind::Smoke,
        }
    }
}

/// Repair tool the player selects from the tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    PowerCell,
    Brush,
    Screwdriver,
    OilCan,
    CoolantPack,
}

impl Tool {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PowerCell => "power cell",
            Self::Brush => "brush",
            Self::Screwdriver => "screwdriver",
            Self::OilCan => "oil can",
            Self::CoolantPack => "coolant pack",
        }
    }
}

/// Visual effect class attached to a problem area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKind {
    Smoke,
    Sparks,
    Grime,
    Flicker,
    Wobble,
}

/// One visual-cue descriptor; positions are relative to the component tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualCue {
    pub kind: CueKind,
    pub position: (f32, f32),
    /// Effect intensity, bounded by the bracket's cue-intensity ceiling.
    pub intensity: f32,
}

/// A single diagnosable fault on one device component. Immutable once
/// generated; session engines track identification/fix state separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub component: ComponentKind,
    pub kind: ProblemKind,
    /// Fault severity, 1-3, never exceeding the bracket ceiling.
    pub severity: u8,
    pub required_tool: Tool,
    pub description: String,
    pub cues: SmallVec<[VisualCue; 2]>,
}

impl Problem {
    #[must_use]
    pub fn new(
        component: ComponentKind,
        kind: ProblemKind,
        severity: u8,
        cues: SmallVec<[VisualCue; 2]>,
    ) -> Self {
        Self {
            component,
            kind,
            severity,
            required_tool: kind.required_tool(),
            description: format!("The {} is {}", component.label(), kind.label()),
            cues,
        }
    }
}
