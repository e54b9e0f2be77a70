use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::types::{ArchitectureDefinition, EdgeSpec, IslandSpec};

/// File name looked up by [`Config::discover`].
pub const CONFIG_FILE_NAME: &str = "archipelago.toml";

/// Top-level configuration from `archipelago.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub report: ReportConfig,
    /// Islands in layer order, most foundational first.
    #[serde(default)]
    pub islands: Vec<IslandSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// Boundaries of the verdict table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_excellent_density")]
    pub excellent_density: f64,
    #[serde(default = "default_caution_density")]
    pub caution_density: f64,
    #[serde(default = "default_excellent_propagation")]
    pub excellent_propagation: f64,
    #[serde(default = "default_tolerated_violations")]
    pub tolerated_violations: usize,
}

fn default_excellent_density() -> f64 {
    0.2
}
fn default_caution_density() -> f64 {
    0.3
}
fn default_excellent_propagation() -> f64 {
    0.1
}
fn default_tolerated_violations() -> usize {
    1
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            excellent_density: default_excellent_density(),
            caution_density: default_caution_density(),
            excellent_propagation: default_excellent_propagation(),
            tolerated_violations: default_tolerated_violations(),
        }
    }
}

/// Shape of the derived report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Length of the in/out degree rankings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Islands with more members than this are flagged as oversized.
    #[serde(default = "default_island_size_limit")]
    pub island_size_limit: usize,
}

fn default_top_n() -> usize {
    5
}
fn default_island_size_limit() -> usize {
    5
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            island_size_limit: default_island_size_limit(),
        }
    }
}

impl Config {
    /// Load configuration from an `archipelago.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        Self::parse(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `archipelago init` to create a valid config file",
                path.display()
            )
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Find `archipelago.toml` in the given directory or its nearest ancestor and load it.
    pub fn discover(dir: &Path) -> Result<Self> {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let config_path = start
            .ancestors()
            .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no {CONFIG_FILE_NAME} found in '{}' or any parent directory. \
                     Run `archipelago init` to create one",
                    start.display()
                )
            })?;
        debug!(path = %config_path.display(), "discovered config file");
        Self::load(&config_path)
    }

    /// The declarative graph input for the analysis core.
    pub fn definition(&self) -> ArchitectureDefinition {
        ArchitectureDefinition {
            islands: self.islands.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Generate default TOML content for `archipelago init`.
    pub fn default_toml() -> String {
        r#"# Archipelago - Dependency Architecture Configuration
#
# Islands are listed from the most foundational layer (rank 0) to the most
# peripheral. An edge [consumer, provider] means "consumer depends on provider".
# A foundational island depending on a more peripheral one is a violation.

# Foreign keys: [consumer, provider]
edges = [
  ["profiles", "auth.users"],
  ["diagnosis_evidence", "profiles"],
  ["share_links", "profiles"],
  ["subscriptions", "auth.users"],
  ["assessment_results", "auth.users"],
  ["pulse_survey_results", "auth.users"],
  ["user_items", "profiles"],
  ["user_items", "accommodation_card_master"],
  ["organizations", "auth.users"],
  ["organization_members", "organizations"],
  ["organization_members", "auth.users"],
  ["org_teams", "organizations"],
  ["org_teams", "org_teams"],
  ["org_assignments", "org_teams"],
  ["org_assignments", "auth.users"],
  ["recruitment_campaigns", "organizations"],
  ["assessment_invites", "organizations"],
  ["assessment_invites", "recruitment_campaigns"],
  ["assessment_invites", "auth.users"],
  ["candidate_profiles", "organizations"],
  ["candidate_profiles", "profiles"],
  ["candidate_profiles", "recruitment_campaigns"],
  ["interview_results", "organizations"],
  ["interview_results", "profiles"],
  ["interview_results", "interview_questions"],
  ["interview_results", "auth.users"],
  ["accommodation_agreements", "organizations"],
  ["accommodation_agreements", "auth.users"],
  ["accommodation_logs", "organizations"],
  ["accommodation_logs", "auth.users"],
  ["community_questions", "auth.users"],
  ["community_answers", "community_questions"],
  ["community_answers", "auth.users"],
  ["link_access_logs", "share_links"],
]

[thresholds]
excellent_density = 0.2
caution_density = 0.3
excellent_propagation = 0.1
tolerated_violations = 1

[report]
top_n = 5
island_size_limit = 5

[[islands]]
name = "Core_Identity"
members = ["auth.users", "profiles"]

[[islands]]
name = "Shared_Knowledge"
members = ["compliance_knowledge_base", "accommodation_card_master"]

[[islands]]
name = "Evidence_Fortress"
members = ["diagnosis_evidence"]

[[islands]]
name = "Measurement"
members = ["assessment_results", "pulse_survey_results"]

[[islands]]
name = "Economics"
members = ["subscriptions", "share_links", "link_access_logs"]

[[islands]]
name = "Game"
members = ["user_items", "avatar_class_master"]

[[islands]]
name = "Org_Structure"
members = ["organizations", "organization_members", "org_teams", "org_assignments"]

[[islands]]
name = "Recruitment"
members = ["recruitment_campaigns", "assessment_invites", "candidate_profiles", "interview_questions", "interview_results"]

[[islands]]
name = "Support"
members = ["accommodation_agreements", "accommodation_logs"]

[[islands]]
name = "Community"
members = ["community_questions", "community_answers"]
"#
        .to_string()
    }
}
