//! Corpus statistics and the console, CSV, Markdown and JSON renderings.

use crate::config::ReportConfig;
use crate::corpus::{Corpus, SkippedFile, SlugCollision};
use crate::error::{Error, Result};
use crate::planner::PostSuggestions;
use crate::validate::ValidationReport;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CorpusStats {
    pub total_posts: usize,
    pub total_links: usize,
    pub average_links: f64,
    pub below_target: usize,
    pub within_target: usize,
    pub above_target: usize,
    pub orphaned_posts: usize,
}

/// Everything one run produced.
#[derive(Serialize, Debug, Clone)]
pub struct Report {
    pub stats: CorpusStats,
    pub band: ReportBand,
    pub orphaned: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub collisions: Vec<SlugCollision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<PostSuggestions>>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct ReportBand {
    pub min: usize,
    pub max: usize,
}

impl From<ReportConfig> for ReportBand {
    fn from(config: ReportConfig) -> Self {
        Self {
            min: config.target_min,
            max: config.target_max,
        }
    }
}

/// Slugs of posts no other post links to. A link to itself does not count.
pub fn find_orphaned_posts(corpus: &Corpus) -> Vec<String> {
    corpus
        .posts()
        .iter()
        .filter(|p| {
            corpus
                .graph()
                .incoming
                .get(&p.slug)
                .map_or(true, |sources| sources.iter().all(|s| *s == p.slug))
        })
        .map(|p| p.slug.clone())
        .collect()
}

pub fn compute_stats(corpus: &Corpus, band: ReportBand) -> CorpusStats {
    let mut stats = CorpusStats {
        total_posts: corpus.len(),
        total_links: 0,
        average_links: 0.0,
        below_target: 0,
        within_target: 0,
        above_target: 0,
        orphaned_posts: find_orphaned_posts(corpus).len(),
    };

    for post in corpus.posts() {
        let links = post.outgoing_links.len();
        stats.total_links += links;
        if links < band.min {
            stats.below_target += 1;
        } else if links <= band.max {
            stats.within_target += 1;
        } else {
            stats.above_target += 1;
        }
    }

    if stats.total_posts > 0 {
        stats.average_links = stats.total_links as f64 / stats.total_posts as f64;
    }
    stats
}

impl Report {
    pub fn new(
        corpus: &Corpus,
        band: ReportBand,
        validation: Option<ValidationReport>,
        suggestions: Option<Vec<PostSuggestions>>,
    ) -> Report {
        Report {
            stats: compute_stats(corpus, band),
            band,
            orphaned: find_orphaned_posts(corpus),
            skipped: corpus.skipped().to_vec(),
            collisions: corpus.collisions().to_vec(),
            validation,
            suggestions,
        }
    }
}

pub fn print_console(report: &Report) {
    let stats = &report.stats;
    println!("{}", "Link Statistics".green().bold());
    println!("  Posts analyzed:   {}", stats.total_posts.to_string().cyan());
    println!("  Internal links:   {}", stats.total_links.to_string().cyan());
    println!("  Average per post: {}", format!("{:.1}", stats.average_links).cyan());
    println!(
        "  Below {} links:   {}",
        report.band.min,
        stats.below_target.to_string().yellow()
    );
    println!(
        "  {}-{} links:       {}",
        report.band.min,
        report.band.max,
        stats.within_target.to_string().green()
    );
    println!(
        "  Above {} links:  {}",
        report.band.max,
        stats.above_target.to_string().yellow()
    );
    println!("  Orphaned posts:   {}", stats.orphaned_posts.to_string().cyan());

    if !report.skipped.is_empty() {
        println!();
        println!("{} ({})", "Skipped files".yellow().bold(), report.skipped.len());
        for skipped in &report.skipped {
            println!("  {} {}: {}", "-".dimmed(), skipped.path.display(), skipped.reason);
        }
    }

    if !report.collisions.is_empty() {
        println!();
        println!("{} ({})", "Slug collisions".yellow().bold(), report.collisions.len());
        for c in &report.collisions {
            println!(
                "  {} {}: '{}' replaced '{}'",
                "-".dimmed(),
                c.slug.cyan(),
                c.kept_title,
                c.replaced_title
            );
        }
    }

    if !report.orphaned.is_empty() {
        println!();
        println!("{} ({})", "Orphaned posts".yellow().bold(), report.orphaned.len());
        for slug in &report.orphaned {
            println!("  {} {}", "-".dimmed(), slug);
        }
    }

    if let Some(validation) = &report.validation {
        println!();
        print_validation(validation);
    }

    if let Some(suggestions) = &report.suggestions {
        println!();
        print_suggestions(suggestions);
    }
}

fn print_validation(validation: &ValidationReport) {
    if validation.is_clean() {
        println!("{}", "No link issues found.".green());
        return;
    }

    println!(
        "{} link issues found",
        validation.issue_count().to_string().yellow().bold()
    );

    if !validation.broken_links.is_empty() {
        println!();
        println!("{}", "Broken links".red().bold());
        for b in &validation.broken_links {
            println!("  {} -> {} ({})", b.source.cyan(), b.target.red(), b.reason.dimmed());
        }
    }

    if !validation.duplicate_links.is_empty() {
        println!();
        println!("{}", "Duplicate links".yellow().bold());
        for d in &validation.duplicate_links {
            println!("  {} -> {} (x{})", d.source.cyan(), d.target, d.count);
        }
    }

    if !validation.poor_anchor_text.is_empty() {
        println!();
        println!("{}", "Generic anchor text".yellow().bold());
        for p in &validation.poor_anchor_text {
            println!("  {} -> {} \"{}\"", p.source.cyan(), p.target, p.anchor_text.trim());
        }
    }
}

fn print_suggestions(all: &[PostSuggestions]) {
    let total: usize = all.iter().map(|p| p.suggestions.len()).sum();
    println!(
        "{} suggestions across {} posts",
        total.to_string().green().bold(),
        all.len()
    );

    for post in all.iter().filter(|p| !p.suggestions.is_empty()) {
        println!();
        println!("{} {}", post.slug.cyan().bold(), format!("({})", post.title).dimmed());
        for s in &post.suggestions {
            let pct = (s.relevance_score * 100.0).round() as u32;
            println!(
                "  {:>3}% {:<12} [{}](/posts/{}) {}",
                pct.to_string().green(),
                s.section.to_string(),
                s.anchor_text,
                s.to_post,
                s.reason.to_string().dimmed()
            );
        }
    }
}

/// One row per post.
pub fn render_csv(corpus: &Corpus, report: &Report) -> String {
    let mut out = String::from(
        "slug,title,outgoing_links,incoming_links,broken_links,suggestions,suggested_targets\n",
    );

    for post in corpus.posts() {
        let broken = report
            .validation
            .as_ref()
            .map(|v| v.broken_from(&post.slug))
            .unwrap_or(0);
        let planned = report
            .suggestions
            .as_ref()
            .and_then(|all| all.iter().find(|p| p.slug == post.slug));
        let count = planned.map(|p| p.suggestions.len()).unwrap_or(0);
        let targets = planned
            .map(|p| {
                p.suggestions
                    .iter()
                    .map(|s| s.to_post.as_str())
                    .collect::<Vec<_>>()
                    .join(";")
            })
            .unwrap_or_default();

        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            csv_field(&post.slug),
            csv_field(&post.title),
            post.outgoing_links.len(),
            corpus.graph().incoming_count(&post.slug),
            broken,
            count,
            csv_field(&targets)
        );
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Suggestions grouped by source post, one subsection per suggestion.
pub fn render_markdown(all: &[PostSuggestions]) -> String {
    let total: usize = all.iter().map(|p| p.suggestions.len()).sum();
    let mut out = String::new();
    let _ = writeln!(out, "# Internal Link Suggestions\n");
    let _ = writeln!(
        out,
        "{} suggestions across {} posts.\n",
        total,
        all.iter().filter(|p| !p.suggestions.is_empty()).count()
    );

    for post in all.iter().filter(|p| !p.suggestions.is_empty()) {
        let _ = writeln!(out, "## {} (`{}`)\n", post.title, post.slug);
        for (i, s) in post.suggestions.iter().enumerate() {
            let _ = writeln!(out, "### {}. [{}](/posts/{}/)\n", i + 1, s.anchor_text, s.to_post);
            let _ = writeln!(out, "- Section: {}", s.section);
            let _ = writeln!(out, "- Relevance: {:.2}", s.relevance_score);
            let _ = writeln!(out, "- Reason: {}", s.reason);
            if !s.shared_tags.is_empty() {
                let _ = writeln!(out, "- Shared tags: {}", s.shared_tags.join(", "));
            }
            out.push('\n');
        }
    }
    out
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
