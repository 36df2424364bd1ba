//! Age-sensitive problem generation and constraint validation.
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::{SmallVec, smallvec};

use crate::device::{ComponentKind, Device};
use crate::difficulty::{AgeBracket, DifficultyProfile};
use crate::problem::{CueKind, Problem, ProblemKind, VisualCue};

/// Overrides accepted by [`generate_problems_with_constraints`]. Bracket
/// invariants always hold regardless of overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationConstraints {
    /// Request exactly this many problems instead of a random `1..=max`.
    /// Still capped by the bracket maximum and the eligible pool size.
    pub exact_count: Option<usize>,
}

/// Result of re-checking a candidate problem set against a bracket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Deterministic RNG for a session seed; problem sets are reproducible.
#[must_use]
pub fn session_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Select `1..=max_problems` problems for the device at the given bracket.
///
/// Every drawn component and kind is a member of the bracket's allowed sets,
/// severity never exceeds the bracket ceiling, and cue intensities are scaled
/// by the bracket's intensity ceiling. Component/kind pairs are drawn without
/// replacement; if fewer eligible pairs exist than requested, as many as are
/// valid are returned rather than failing.
pub fn generate_problems<R: Rng>(
    device: &Device,
    bracket: AgeBracket,
    rng: &mut R,
) -> Vec<Problem> {
    let profile = DifficultyProfile::for_bracket(bracket);
    let target = if profile.max_problems <= 1 {
        1
    } else {
        rng.gen_range(1..=profile.max_problems)
    };
    draw_problems(device, &profile, target, rng)
}

/// Variant of [`generate_problems`] accepting explicit overrides.
pub fn generate_problems_with_constraints<R: Rng>(
    device: &Device,
    bracket: AgeBracket,
    constraints: GenerationConstraints,
    rng: &mut R,
) -> Vec<Problem> {
    let profile = DifficultyProfile::for_bracket(bracket);
    let target = match constraints.exact_count {
        Some(count) => count.clamp(1, profile.max_problems),
        None => {
            if profile.max_problems <= 1 {
                1
            } else {
                rng.gen_range(1..=profile.max_problems)
            }
        }
    };
    draw_problems(device, &profile, target, rng)
}

fn draw_problems<R: Rng>(
    device: &Device,
    profile: &DifficultyProfile,
    target: usize,
    rng: &mut R,
) -> Vec<Problem> {
    let mut pool = eligible_pairs(device, profile);
    let count = target.min(pool.len());
    let mut problems = Vec::with_capacity(count);
    for _ in 0..count {
        let idx = rng.gen_range(0..pool.len());
        let (component, kind) = pool.swap_remove(idx);
        let severity = if profile.max_severity <= 1 {
            1
        } else {
            rng.gen_range(1..=profile.max_severity)
        };
        let cues = build_cues(kind, severity, profile.visual_cue_intensity);
        problems.push(Problem::new(component, kind, severity, cues));
    }
    problems
}

/// Cross product of in-device allowed components and allowed kinds.
fn eligible_pairs(
    device: &Device,
    profile: &DifficultyProfile,
) -> Vec<(ComponentKind, ProblemKind)> {
    let mut pairs = Vec::new();
    for component in &profile.allowed_components {
        if !device.has_component(*component) {
            continue;
        }
        for kind in &profile.allowed_kinds {
            pairs.push((*component, *kind));
        }
    }
    pairs
}

fn build_cues(kind: ProblemKind, severity: u8, ceiling: f32) -> SmallVec<[VisualCue; 2]> {
    let base = 0.4 + 0.2 * f32::from(severity);
    let primary = VisualCue {
        kind: kind.cue_kind(),
        position: (0.5, 0.5),
        intensity: (base * ceiling).min(ceiling),
    };
    let mut cues: SmallVec<[VisualCue; 2]> = smallvec![primary];
    if severity >= 2 {
        cues.push(VisualCue {
            kind: CueKind::Sparks,
            position: (0.25, 0.75),
            intensity: (base * 0.6 * ceiling).min(ceiling),
        });
    }
    cues
}

/// Re-check a candidate set against a bracket; used internally and by tests.
#[must_use]
pub fn validate_problem_set(problems: &[Problem], bracket: AgeBracket) -> ValidationReport {
    let profile = DifficultyProfile::for_bracket(bracket);
    let mut report = ValidationReport {
        valid: true,
        issues: Vec::new(),
        suggestions: Vec::new(),
    };

    if problems.is_empty() {
        report.valid = false;
        report.issues.push(String::from("problem set is empty"));
        report
            .suggestions
            .push(String::from("generate at least one problem"));
        return report;
    }

    if problems.len() > profile.max_problems {
        report.valid = false;
        report.issues.push(format!(
            "{} problems exceeds the {} bracket maximum of {}",
            problems.len(),
            bracket,
            profile.max_problems
        ));
        report
            .suggestions
            .push(format!("trim the set to {} problems", profile.max_problems));
    }

    for (i, problem) in problems.iter().enumerate() {
        if !profile.allows_component(problem.component) {
            report.valid = false;
            report.issues.push(format!(
                "problem {i}: component '{}' is not allowed for the {} bracket",
                problem.component.label(),
                bracket
            ));
            report
                .suggestions
                .push(String::from("restrict components to the bracket's allowed set"));
        }
        if !profile.allows_kind(problem.kind) {
            report.valid = false;
            report.issues.push(format!(
                "problem {i}: kind '{}' is not allowed for the {} bracket",
                problem.kind.label(),
                bracket
            ));
            report
                .suggestions
                .push(String::from("restrict kinds to the bracket's allowed set"));
        }
        if problem.severity == 0 || problem.severity > profile.max_severity {
            report.valid = false;
            report.issues.push(format!(
                "problem {i}: severity {} is outside 1..={}",
                problem.severity, profile.max_severity
            ));
            report
                .suggestions
                .push(format!("clamp severity to 1..={}", profile.max_severity));
        }
        if problem.required_tool != problem.kind.required_tool() {
            report.valid = false;
            report.issues.push(format!(
                "problem {i}: required tool does not match the kind mapping"
            ));
            report
                .suggestions
                .push(String::from("derive the tool from the problem kind"));
        }
        for cue in &problem.cues {
            if cue.intensity > profile.visual_cue_intensity + f32::EPSILON {
                report.valid = false;
                report.issues.push(format!(
                    "problem {i}: cue intensity {:.2} exceeds the bracket ceiling {:.2}",
                    cue.intensity, profile.visual_cue_intensity
                ));
                report
                    .suggestions
                    .push(String::from("scale cue intensities by the bracket ceiling"));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Tool;

    #[test]
    fn generated_sets_respect_bracket_invariants() {
        let device = Device::trainer_bot();
        for bracket in AgeBracket::ALL {
            let profile = DifficultyProfile::for_bracket(bracket);
            let mut rng = session_rng(0xF1D0);
            for _ in 0..50 {
                let problems = generate_problems(&device, bracket, &mut rng);
                assert!(!problems.is_empty());
                assert!(problems.len() <= profile.max_problems);
                for p in &problems {
                    assert!(profile.allows_component(p.component));
                    assert!(profile.allows_kind(p.kind));
                    assert!(p.severity >= 1 && p.severity <= profile.max_severity);
                    assert!(
                        p.cues
                            .iter()
                            .all(|c| c.intensity <= profile.visual_cue_intensity + f32::EPSILON)
                    );
                }
                let report = validate_problem_set(&problems, bracket);
                assert!(report.valid, "issues: {:?}", report.issues);
            }
        }
    }

    #[test]
    fn generation_is_reproducible_per_seed() {
        let device = Device::trainer_bot();
        let a = generate_problems(&device, AgeBracket::Advanced, &mut session_rng(99));
        let b = generate_problems(&device, AgeBracket::Advanced, &mut session_rng(99));
        assert_eq!(a, b);
    }

    #[test]
    fn constraints_cap_to_eligible_pool() {
        // A device with a single allowed component limits the young pool to
        // component x kind pairs, fewer than some requested counts.
        let device = Device::new(
            "solo",
            vec![crate::device::DeviceComponent {
                kind: ComponentKind::PowerCore,
                bounds: crate::device::Rect::new(0.0, 0.0, 100.0, 100.0),
            }],
        );
        let mut rng = session_rng(7);
        let problems = generate_problems_with_constraints(
            &device,
            AgeBracket::Young,
            GenerationConstraints {
                exact_count: Some(10),
            },
            &mut rng,
        );
        // Young allows two kinds on the power core; maximum two problems.
        assert!(problems.len() <= 2);
        assert!(!problems.is_empty());
        assert!(validate_problem_set(&problems, AgeBracket::Young).valid);
    }

    #[test]
    fn pairs_are_drawn_without_replacement() {
        let device = Device::trainer_bot();
        let mut rng = session_rng(1234);
        for _ in 0..30 {
            let problems = generate_problems_with_constraints(
                &device,
                AgeBracket::Advanced,
                GenerationConstraints {
                    exact_count: Some(5),
                },
                &mut rng,
            );
            let mut pairs: Vec<_> = problems.iter().map(|p| (p.component, p.kind)).collect();
            pairs.sort_unstable();
            pairs.dedup();
            assert_eq!(pairs.len(), problems.len());
        }
    }

    #[test]
    fn validation_flags_foreign_components_and_tools() {
        let mut problems = generate_problems_with_constraints(
            &Device::trainer_bot(),
            AgeBracket::Advanced,
            GenerationConstraints {
                exact_count: Some(2),
            },
            &mut session_rng(5),
        );
        problems[0].component = ComponentKind::CircuitBoard;
        problems[0].required_tool = Tool::Brush;
        problems[0].kind = ProblemKind::LowPower;
        let report = validate_problem_set(&problems, AgeBracket::Young);
        assert!(!report.valid);
        assert!(!report.issues.is_empty());
        assert!(!report.suggestions.is_empty());
    }
}
