//! # postlinks
//!
//! Internal link analysis for a directory of Markdown blog posts with YAML
//! frontmatter.
//!
//! ```text
//! *.md ──▶ post::parse ──▶ Corpus (slug map + LinkGraph)
//!                             │
//!             ┌───────────────┼────────────────┐
//!             ▼               ▼                ▼
//!      relevance::score   validate::validate   report::compute_stats
//!             │               │                │
//!             ▼               │                │
//!       planner::plan ────────┴──────▶ report::Report
//! ```
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`post`] | Frontmatter and internal-link parsing |
//! | [`corpus`] | Loading posts and building the link graph |
//! | [`relevance`] | Tag/keyword overlap scoring |
//! | [`planner`] | Section-aware link suggestions under quotas |
//! | [`validate`] | Broken, duplicate and generic-anchor links |
//! | [`report`] | Statistics, orphans and output formats |
//! | [`config`] | `.postlinks.toml` |

pub mod config;
pub mod corpus;
pub mod error;
pub mod planner;
pub mod post;
pub mod relevance;
pub mod report;
pub mod validate;

pub use corpus::{Corpus, LinkGraph, LoadOptions};
pub use error::{Error, Result, SkipReason};
pub use planner::{LinkSuggestion, PlanOptions, Reason, Section};
pub use post::{ParseOutcome, Post};
