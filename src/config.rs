//! `.postlinks.toml` loading. Every key is optional and falls back to a default.

use crate::error::{Error, Result};
use crate::planner::{PlanOptions, SectionQuotas};
use crate::relevance::DEFAULT_MIN_SCORE;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_posts_dir")]
    pub posts_dir: PathBuf,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            posts_dir: default_posts_dir(),
            exclude: Vec::new(),
            scoring: ScoringConfig::default(),
            planner: PlannerConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

fn default_posts_dir() -> PathBuf {
    PathBuf::from("src/posts")
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScoringConfig {
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
        }
    }
}

fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PlannerConfig {
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default = "default_intro_quota")]
    pub intro_quota: usize,
    #[serde(default = "default_body_quota")]
    pub body_quota: usize,
    #[serde(default = "default_conclusion_quota")]
    pub conclusion_quota: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
            intro_quota: default_intro_quota(),
            body_quota: default_body_quota(),
            conclusion_quota: default_conclusion_quota(),
        }
    }
}

impl PlannerConfig {
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            max_suggestions: self.max_suggestions,
            quotas: SectionQuotas {
                introduction: self.intro_quota,
                body: self.body_quota,
                conclusion: self.conclusion_quota,
            },
        }
    }
}

fn default_max_suggestions() -> usize {
    10
}
fn default_intro_quota() -> usize {
    2
}
fn default_body_quota() -> usize {
    6
}
fn default_conclusion_quota() -> usize {
    2
}

/// Target link-density band, inclusive on both ends.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ReportConfig {
    #[serde(default = "default_target_min")]
    pub target_min: usize,
    #[serde(default = "default_target_max")]
    pub target_max: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            target_min: default_target_min(),
            target_max: default_target_max(),
        }
    }
}

fn default_target_min() -> usize {
    6
}
fn default_target_max() -> usize {
    10
}

/// Load `path`, or defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(Error::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    };

    let config: Config = toml::from_str(&content).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if config.report.target_min > config.report.target_max {
        return Err(Error::Config {
            path: path.to_path_buf(),
            message: format!(
                "report.target_min ({}) exceeds report.target_max ({})",
                config.report.target_min, config.report.target_max
            ),
        });
    }

    Ok(config)
}
