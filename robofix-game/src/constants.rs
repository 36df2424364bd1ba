//! Centralized balance and tuning constants for RoboFix game logic.
//!
//! These values define the deterministic math for sessions, the reward
//! economy, and analytics scoring. Keeping them together ensures gameplay
//! can only be adjusted via reviewed code changes rather than scattered
//! literals.

// Difficulty ladder ---------------------------------------------------------
pub(crate) const YOUNG_MAX_PROBLEMS: usize = 2;
pub(crate) const MIDDLE_MAX_PROBLEMS: usize = 3;
pub(crate) const ADVANCED_MAX_PROBLEMS: usize = 5;

pub(crate) const YOUNG_MAX_SEVERITY: u8 = 1;
pub(crate) const MIDDLE_MAX_SEVERITY: u8 = 2;
pub(crate) const ADVANCED_MAX_SEVERITY: u8 = 3;

pub(crate) const YOUNG_HINT_DELAY_MS: u64 = 15_000;
pub(crate) const MIDDLE_HINT_DELAY_MS: u64 = 22_000;
pub(crate) const ADVANCED_HINT_DELAY_MS: u64 = 30_000;

pub(crate) const YOUNG_CUE_INTENSITY: f32 = 1.0;
pub(crate) const MIDDLE_CUE_INTENSITY: f32 = 0.7;
pub(crate) const ADVANCED_CUE_INTENSITY: f32 = 0.45;

// State machine -------------------------------------------------------------
pub(crate) const STATE_HISTORY_CAP: usize = 10;

// Repair tuning -------------------------------------------------------------
/// Incorrect attempts on one area before a hint gesture fires.
pub(crate) const AREA_HINT_ATTEMPT_THRESHOLD: u32 = 3;
/// Cleaning progress required to mark a dirty problem fixed.
pub(crate) const CLEANING_COMPLETE: f32 = 100.0;
/// Cleaning rates in progress points per second, by texture class.
pub(crate) const CLEANING_RATE_SMOOTH_METAL: f32 = 25.0;
pub(crate) const CLEANING_RATE_TEXTURED_PLASTIC: f32 = 18.0;
pub(crate) const CLEANING_RATE_DELICATE_GLASS: f32 = 12.0;

// Economy tuning ------------------------------------------------------------
pub(crate) const REPAIR_BASE_GEMS: u32 = 8;
pub(crate) const DIAGNOSTIC_BASE_GEMS: u32 = 5;
pub(crate) const CUSTOMIZATION_BASE_GEMS: u32 = 4;
/// Per-bracket bonus added to every activity award. Younger brackets earn a
/// strictly higher per-repair average.
pub(crate) const YOUNG_GEM_BONUS: u32 = 5;
pub(crate) const MIDDLE_GEM_BONUS: u32 = 3;
pub(crate) const ADVANCED_GEM_BONUS: u32 = 1;
/// Cap on the per-repair components-fixed bonus.
pub(crate) const COMPONENTS_FIXED_BONUS_CAP: u32 = 5;

// Milestone thresholds ------------------------------------------------------
pub(crate) const MILESTONE_FIRST_REPAIR: u32 = 1;
pub(crate) const MILESTONE_APPRENTICE: u32 = 5;
pub(crate) const MILESTONE_ADEPT: u32 = 10;
pub(crate) const MILESTONE_EXPERT: u32 = 25;
pub(crate) const MILESTONE_MASTER: u32 = 50;

// Analytics tuning ----------------------------------------------------------
/// Accuracy contribution ceiling for problem-solving scores.
pub(crate) const PS_ACCURACY_WEIGHT: f32 = 70.0;
/// Flat credit for completing a diagnostic at all.
pub(crate) const PS_COMPLETION_CREDIT: f32 = 20.0;
/// Penalty per hint used in a session.
pub(crate) const PS_HINT_PENALTY: f32 = 4.0;
/// Penalty per minute beyond the expected completion time.
pub(crate) const PS_TIME_PENALTY_PER_MIN: f32 = 3.0;
/// Expected diagnostic completion time before time penalties apply.
pub(crate) const PS_PAR_MINUTES: f32 = 3.0;
/// Score leniency multipliers; same raw performance scores higher for
/// younger brackets.
pub(crate) const YOUNG_LENIENCY: f32 = 1.25;
pub(crate) const MIDDLE_LENIENCY: f32 = 1.10;
pub(crate) const ADVANCED_LENIENCY: f32 = 1.0;

pub(crate) const MC_CONCEPT_WEIGHT: f32 = 30.0;
pub(crate) const MC_CONCEPT_TARGET: f32 = 10.0;
pub(crate) const MC_TOOL_DIVERSITY_WEIGHT: f32 = 25.0;
pub(crate) const MC_KIND_DIVERSITY_WEIGHT: f32 = 20.0;
pub(crate) const MC_FIX_CREDIT: f32 = 25.0;
pub(crate) const MC_FIX_TARGET: f32 = 5.0;
pub(crate) const MC_MISTAKE_PENALTY: f32 = 30.0;

pub(crate) const CR_UNIQUENESS_WEIGHT: f32 = 0.5;
pub(crate) const CR_COLOR_VARIETY_WEIGHT: f32 = 6.0;
pub(crate) const CR_ACCESSORY_VARIETY_WEIGHT: f32 = 5.0;
pub(crate) const CR_HARMONY_BONUS: f32 = 10.0;
pub(crate) const CR_METRICS_WEIGHT: f32 = 2.0;

/// Trend classification: recent-window mean must differ from the earlier
/// mean by at least this many points to leave `Stable`.
pub(crate) const TREND_DELTA: f32 = 5.0;

/// Learning-pattern thresholds.
pub(crate) const HELP_COLLABORATIVE_HINTS: f32 = 2.5;
pub(crate) const HELP_INDEPENDENT_HINTS: f32 = 1.0;
pub(crate) const DIFFICULTY_CHALLENGING_MISTAKES: f32 = 1.5;
pub(crate) const DIFFICULTY_EASY_MISTAKES: f32 = 4.0;
/// Hint rate above which a diagnostic-dominated profile reads as visual.
pub(crate) const VISUAL_STYLE_HINT_RATE: f32 = 2.0;

// Persistence ---------------------------------------------------------------
pub(crate) const LEDGER_KEY: &str = "robofix.ledger";
pub(crate) const BOT_KEY_PREFIX: &str = "robofix.bots.";
