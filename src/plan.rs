//! Workout plans: the fixed, ordered list of timed phases a session walks through.
//!
//! A plan is validated once at construction and never changes afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Category of a phase. Drives the rest/active colouring in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    WarmUp,
    Exercise,
    Rest,
    CoolDown,
}

impl PhaseKind {
    /// Guess the kind from a display name when the plan file does not say.
    pub fn infer(name: &str) -> Self {
        let lower = name.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));
        if has(&["rest", "recovery", "отдых"]) {
            PhaseKind::Rest
        } else if has(&["warm", "разминка"]) {
            PhaseKind::WarmUp
        } else if has(&["cool", "заминка"]) {
            PhaseKind::CoolDown
        } else {
            PhaseKind::Exercise
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::WarmUp => "warm-up",
            PhaseKind::Exercise => "exercise",
            PhaseKind::Rest => "rest",
            PhaseKind::CoolDown => "cool-down",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub kind: PhaseKind,
    pub duration_secs: u32,
}

impl Phase {
    /// Build a phase whose kind is inferred from its name.
    pub fn new(name: impl Into<String>, duration_secs: u32) -> Self {
        let name = name.into();
        let kind = PhaseKind::infer(&name);
        Self {
            name,
            kind,
            duration_secs,
        }
    }

    pub fn with_kind(name: impl Into<String>, kind: PhaseKind, duration_secs: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            duration_secs,
        }
    }

    pub fn is_rest(&self) -> bool {
        self.kind == PhaseKind::Rest
    }
}

/// Invalid plan definitions. All of these are reported before a run starts.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("workout plan has no phases")]
    Empty,

    #[error("phase {index} ({name:?}) has a zero duration")]
    ZeroDuration { index: usize, name: String },

    #[error("phase {index} ({name:?}) must last a whole number of seconds")]
    FractionalDuration { index: usize, name: String },

    #[error("phase {index} ({name:?}) is longer than {max} seconds")]
    DurationTooLong {
        index: usize,
        name: String,
        max: u32,
    },

    #[error("failed to read plan file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse plan file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhasePlan {
    name: String,
    phases: Vec<Phase>,
}

/// On-disk representation of a plan.
#[derive(Debug, Deserialize)]
struct PlanFile {
    #[serde(default = "default_plan_name")]
    name: String,
    phases: Vec<PhaseEntry>,
}

#[derive(Debug, Deserialize)]
struct PhaseEntry {
    name: String,
    #[serde(default)]
    kind: Option<PhaseKind>,
    #[serde(with = "humantime_serde")]
    duration: Duration,
}

fn default_plan_name() -> String {
    "Custom workout".to_string()
}

/// Where a resolved plan came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    BuiltIn,
    File(PathBuf),
}

impl std::fmt::Display for PlanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanSource::BuiltIn => write!(f, "built-in"),
            PlanSource::File(p) => write!(f, "{}", p.display()),
        }
    }
}

impl PhasePlan {
    pub fn new(name: impl Into<String>, phases: Vec<Phase>) -> Result<Self, PlanError> {
        if phases.is_empty() {
            return Err(PlanError::Empty);
        }
        if let Some((index, p)) = phases.iter().enumerate().find(|(_, p)| p.duration_secs == 0) {
            return Err(PlanError::ZeroDuration {
                index,
                name: p.name.clone(),
            });
        }
        Ok(Self {
            name: name.into(),
            phases,
        })
    }

    /// The stock session: warm-up, five exercises separated by short rests, cool-down.
    pub fn default_workout() -> Self {
        let mut phases = vec![Phase::new("Warm-up", 300)];
        for n in 1..=5 {
            if n > 1 {
                phases.push(Phase::new("Rest", 15));
            }
            phases.push(Phase::new(format!("Exercise {n}"), 45));
        }
        phases.push(Phase::new("Cool-down", 300));
        Self {
            name: "Interval workout".to_string(),
            phases,
        }
    }

    pub fn from_json(path: &Path, raw: &str) -> Result<Self, PlanError> {
        let file: PlanFile = serde_json::from_str(raw).map_err(|source| PlanError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut phases = Vec::with_capacity(file.phases.len());
        for (index, entry) in file.phases.into_iter().enumerate() {
            if entry.duration.subsec_nanos() != 0 {
                return Err(PlanError::FractionalDuration {
                    index,
                    name: entry.name,
                });
            }
            let Ok(secs) = u32::try_from(entry.duration.as_secs()) else {
                return Err(PlanError::DurationTooLong {
                    index,
                    name: entry.name,
                    max: u32::MAX,
                });
            };
            let kind = entry.kind.unwrap_or_else(|| PhaseKind::infer(&entry.name));
            phases.push(Phase::with_kind(entry.name, kind, secs));
        }
        Self::new(file.name, phases)
    }

    pub fn from_file(path: &Path) -> Result<Self, PlanError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &raw)
    }

    /// Default plan file location: `<config dir>/workout-timer/plan.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("workout-timer").join("plan.json"))
    }

    /// Pick the plan for this run.
    ///
    /// An explicit path must load. A broken file at the default location only
    /// produces a warning and falls back to the built-in plan.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, PlanSource), PlanError> {
        if let Some(path) = explicit {
            let plan = Self::from_file(path)?;
            return Ok((plan, PlanSource::File(path.to_path_buf())));
        }

        if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
            match Self::from_file(&path) {
                Ok(plan) => return Ok((plan, PlanSource::File(path))),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring plan file, using built-in plan");
                }
            }
        }

        Ok((Self::default_workout(), PlanSource::BuiltIn))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase_at(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Sum of all phase durations, in seconds.
    pub fn total_duration(&self) -> u64 {
        self.phases.iter().map(|p| u64::from(p.duration_secs)).sum()
    }

    /// Sum of the durations of every phase after `index`.
    pub fn remaining_from(&self, index: usize) -> u64 {
        self.phases
            .iter()
            .skip(index + 1)
            .map(|p| u64::from(p.duration_secs))
            .sum()
    }
}
