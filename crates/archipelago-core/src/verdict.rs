use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Thresholds;

/// Overall judgement of an architecture, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Excellent,
    Acceptable,
    Caution,
    Warning,
}

impl Verdict {
    /// Evaluate the verdict table; the first matching rule wins.
    pub fn evaluate(
        density: f64,
        propagation_cost: f64,
        violations: usize,
        thresholds: &Thresholds,
    ) -> Self {
        if density < thresholds.excellent_density
            && propagation_cost < thresholds.excellent_propagation
            && violations == 0
        {
            Verdict::Excellent
        } else if density < thresholds.excellent_density
            && violations <= thresholds.tolerated_violations
        {
            Verdict::Acceptable
        } else if density < thresholds.caution_density {
            Verdict::Caution
        } else {
            Verdict::Warning
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Verdict::Excellent => {
                "Loosely coupled, changes stay local, and every dependency points toward the foundation."
            }
            Verdict::Acceptable => "Layer boundaries hold; the overall design is sound.",
            Verdict::Caution => "Density is elevated. Review the dependencies between islands.",
            Verdict::Warning => "Signs of tangled coupling. Consider refactoring.",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Excellent => write!(f, "excellent"),
            Verdict::Acceptable => write!(f, "acceptable"),
            Verdict::Caution => write!(f, "caution"),
            Verdict::Warning => write!(f, "warning"),
        }
    }
}

impl std::str::FromStr for Verdict {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "excellent" => Ok(Verdict::Excellent),
            "acceptable" => Ok(Verdict::Acceptable),
            "caution" => Ok(Verdict::Caution),
            "warning" | "warn" => Ok(Verdict::Warning),
            _ => Err(anyhow::anyhow!("unknown verdict: {s}")),
        }
    }
}

/// Density band relative to the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityStatus {
    Ok,
    Elevated,
    High,
}

impl DensityStatus {
    pub fn of(density: f64, thresholds: &Thresholds) -> Self {
        if density < thresholds.excellent_density {
            DensityStatus::Ok
        } else if density < thresholds.caution_density {
            DensityStatus::Elevated
        } else {
            DensityStatus::High
        }
    }
}

/// Propagation cost band relative to the thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropagationStatus {
    Ok,
    Moderate,
}

impl PropagationStatus {
    pub fn of(propagation_cost: f64, thresholds: &Thresholds) -> Self {
        if propagation_cost < thresholds.excellent_propagation {
            PropagationStatus::Ok
        } else {
            PropagationStatus::Moderate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(density: f64, pc: f64, violations: usize) -> Verdict {
        Verdict::evaluate(density, pc, violations, &Thresholds::default())
    }

    #[test]
    fn test_verdict_table() {
        assert_eq!(eval(0.05, 0.07, 0), Verdict::Excellent);
        assert_eq!(eval(0.05, 0.15, 0), Verdict::Acceptable);
        assert_eq!(eval(0.05, 0.07, 1), Verdict::Acceptable);
        assert_eq!(eval(0.19, 0.9, 2), Verdict::Caution);
        assert_eq!(eval(0.25, 0.0, 0), Verdict::Caution);
        assert_eq!(eval(0.3, 0.0, 0), Verdict::Warning);
        assert_eq!(eval(1.0 / 3.0, 1.0 / 3.0, 0), Verdict::Warning);
    }

    #[test]
    fn test_verdict_boundaries_are_strict() {
        // Each bound is exclusive
        assert_eq!(eval(0.2, 0.0, 0), Verdict::Caution);
        assert_eq!(eval(0.1, 0.1, 0), Verdict::Acceptable);
    }

    #[test]
    fn test_custom_thresholds() {
        let strict = Thresholds {
            tolerated_violations: 0,
            ..Thresholds::default()
        };
        assert_eq!(Verdict::evaluate(0.05, 0.5, 1, &strict), Verdict::Caution);
    }

    #[test]
    fn test_verdict_ordering() {
        assert!(Verdict::Excellent < Verdict::Acceptable);
        assert!(Verdict::Acceptable < Verdict::Caution);
        assert!(Verdict::Caution < Verdict::Warning);
    }

    #[test]
    fn test_verdict_parse() {
        assert_eq!("excellent".parse::<Verdict>().unwrap(), Verdict::Excellent);
        assert_eq!("Caution".parse::<Verdict>().unwrap(), Verdict::Caution);
        assert_eq!("warn".parse::<Verdict>().unwrap(), Verdict::Warning);
        assert!("fine".parse::<Verdict>().is_err());
    }

    #[test]
    fn test_status_bands() {
        let t = Thresholds::default();
        assert_eq!(DensityStatus::of(0.1, &t), DensityStatus::Ok);
        assert_eq!(DensityStatus::of(0.2, &t), DensityStatus::Elevated);
        assert_eq!(DensityStatus::of(0.31, &t), DensityStatus::High);
        assert_eq!(PropagationStatus::of(0.07, &t), PropagationStatus::Ok);
        assert_eq!(PropagationStatus::of(0.1, &t), PropagationStatus::Moderate);
    }
}
