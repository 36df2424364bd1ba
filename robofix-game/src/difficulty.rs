//! Age brackets and the difficulty profile ladder.
use serde::{Deserialize, Serialize};

use crate::constants::{
    ADVANCED_CUE_INTENSITY, ADVANCED_GEM_BONUS, ADVANCED_HINT_DELAY_MS, ADVANCED_LENIENCY,
    ADVANCED_MAX_PROBLEMS, ADVANCED_MAX_SEVERITY, MIDDLE_CUE_INTENSITY, MIDDLE_GEM_BONUS,
    MIDDLE_HINT_DELAY_MS, MIDDLE_LENIENCY, MIDDLE_MAX_PROBLEMS, MIDDLE_MAX_SEVERITY,
    YOUNG_CUE_INTENSITY, YOUNG_GEM_BONUS, YOUNG_HINT_DELAY_MS, YOUNG_LENIENCY,
    YOUNG_MAX_PROBLEMS, YOUNG_MAX_SEVERITY,
};
use crate::device::ComponentKind;
use crate::problem::ProblemKind;

/// One of three fixed player age ranges. The active bracket is chosen by an
/// external input and is fixed for the duration of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    /// Ages 4-6.
    Young,
    /// Ages 7-9.
    Middle,
    /// Ages 10-12.
    Advanced,
}

impl AgeBracket {
    /// All brackets in ascending difficulty order.
    pub const ALL: [Self; 3] = [Self::Young, Self::Middle, Self::Advanced];

    #[must_use]
    pub const fn gem_bonus(self) -> u32 {
        match self {
            Self::Young => YOUNG_GEM_BONUS,
            Self::Middle => MIDDLE_GEM_BONUS,
            Self::Advanced => ADVANCED_GEM_BONUS,
        }
    }

    /// Scoring leniency multiplier applied to raw skill scores.
    #[must_use]
    pub const fn leniency(self) -> f32 {
        match self {
            Self::Young => YOUNG_LENIENCY,
            Self::Middle => MIDDLE_LENIENCY,
            Self::Advanced => ADVANCED_LENIENCY,
        }
    }

    /// Highest skill-milestone level considered age-appropriate.
    #[must_use]
    pub const fn milestone_ceiling(self) -> u8 {
        match self {
            Self::Young => 50,
            Self::Middle => 75,
            Self::Advanced => 100,
        }
    }
}

impl std::fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Young => write!(f, "young"),
            Self::Middle => write!(f, "middle"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// Static per-bracket configuration consumed by the problem generator and
/// both session engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub bracket: AgeBracket,
    pub max_problems: usize,
    /// Severity ceiling, 1-3.
    pub max_severity: u8,
    pub allowed_kinds: Vec<ProblemKind>,
    pub allowed_components: Vec<ComponentKind>,
    /// Upper bound on visual-cue intensity, 0-1.
    pub visual_cue_intensity: f32,
    /// Inactivity window before an automatic hint is shown.
    pub hint_delay_ms: u64,
}

impl DifficultyProfile {
    /// Profile for the given bracket. Profiles form a monotonic ladder:
    /// problem count, severity, set sizes, and hint delay increase with the
    /// bracket while the cue-intensity ceiling decreases.
    #[must_use]
    pub fn for_bracket(bracket: AgeBracket) -> Self {
        match bracket {
            AgeBracket::Young => Self {
                bracket,
                max_problems: YOUNG_MAX_PROBLEMS,
                max_severity: YOUNG_MAX_SEVERITY,
                allowed_kinds: vec![ProblemKind::Dirty, ProblemKind::LowPower],
                allowed_components: vec![
                    ComponentKind::PowerCore,
                    ComponentKind::ChassisPlating,
                ],
                visual_cue_intensity: YOUNG_CUE_INTENSITY,
                hint_delay_ms: YOUNG_HINT_DELAY_MS,
            },
            AgeBracket::Middle => Self {
                bracket,
                max_problems: MIDDLE_MAX_PROBLEMS,
                max_severity: MIDDLE_MAX_SEVERITY,
                allowed_kinds: vec![
                    ProblemKind::Dirty,
                    ProblemKind::LowPower,
                    ProblemKind::Loose,
                ],
                allowed_components: vec![
                    ComponentKind::PowerCore,
                    ComponentKind::ChassisPlating,
                    ComponentKind::SensorArray,
                    ComponentKind::WheelAssembly,
                ],
                visual_cue_intensity: MIDDLE_CUE_INTENSITY,
                hint_delay_ms: MIDDLE_HINT_DELAY_MS,
            },
            AgeBracket::Advanced => Self {
                bracket,
                max_problems: ADVANCED_MAX_PROBLEMS,
                max_severity: ADVANCED_MAX_SEVERITY,
                allowed_kinds: vec![
                    ProblemKind::Dirty,
                    ProblemKind::LowPower,
                    ProblemKind::Loose,
                    ProblemKind::Squeaky,
                    ProblemKind::Overheated,
                ],
                allowed_components: vec![
                    ComponentKind::PowerCore,
                    ComponentKind::ChassisPlating,
                    ComponentKind::SensorArray,
                    ComponentKind::WheelAssembly,
                    ComponentKind::CircuitBoard,
                    ComponentKind::Antenna,
                ],
                visual_cue_intensity: ADVANCED_CUE_INTENSITY,
                hint_delay_ms: ADVANCED_HINT_DELAY_MS,
            },
        }
    }

    #[must_use]
    pub fn allows_component(&self, component: ComponentKind) -> bool {
        self.allowed_components.contains(&component)
    }

    #[must_use]
    pub fn allows_kind(&self, kind: ProblemKind) -> bool {
        self.allowed_kinds.contains(&kind)
    }
}
