//! Turns scored candidates into section-aware link suggestions.

use crate::corpus::Corpus;
use crate::post::Post;
use crate::relevance::{self, ScoredPost};
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

const FOUNDATIONAL_KEYWORDS: &[&str] = &[
    "introduction",
    "intro",
    "getting started",
    "basics",
    "beginner",
    "setup",
    "installation",
    "guide",
];

const ADVANCED_KEYWORDS: &[&str] = &[
    "advanced",
    "deep dive",
    "optimization",
    "performance",
    "architecture",
    "enterprise",
    "production",
    "scaling",
];

static ANCHOR_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(how to|guide to|introduction to|understanding)\s+").expect("anchor prefix pattern")
});

/// Where in the source post a link should be placed. Ordered as rendered.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Introduction,
    Body,
    Conclusion,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Section::Introduction => "introduction",
            Section::Body => "body",
            Section::Conclusion => "conclusion",
        })
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    TagOverlap,
    TopicProgression,
    KeywordMatch,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reason::TagOverlap => "tag_overlap",
            Reason::TopicProgression => "topic_progression",
            Reason::KeywordMatch => "keyword_match",
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LinkSuggestion {
    pub from_post: String,
    pub to_post: String,
    pub relevance_score: f64,
    pub reason: Reason,
    pub section: Section,
    pub anchor_text: String,
    pub shared_tags: Vec<String>,
}

/// Per-section caps.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionQuotas {
    pub introduction: usize,
    pub body: usize,
    pub conclusion: usize,
}

impl Default for SectionQuotas {
    fn default() -> Self {
        Self {
            introduction: 2,
            body: 6,
            conclusion: 2,
        }
    }
}

impl SectionQuotas {
    pub fn cap(&self, section: Section) -> usize {
        match section {
            Section::Introduction => self.introduction,
            Section::Body => self.body,
            Section::Conclusion => self.conclusion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanOptions {
    pub max_suggestions: usize,
    pub quotas: SectionQuotas,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            max_suggestions: 10,
            quotas: SectionQuotas::default(),
        }
    }
}

/// Suggestions for one source post.
#[derive(Serialize, Debug, Clone)]
pub struct PostSuggestions {
    pub slug: String,
    pub title: String,
    pub suggestions: Vec<LinkSuggestion>,
}

fn mentions_any(post: &Post, keywords: &[&str]) -> bool {
    let text = format!("{} {}", post.title, post.description).to_lowercase();
    keywords.iter().any(|k| text.contains(k))
}

pub fn is_foundational(post: &Post) -> bool {
    mentions_any(post, FOUNDATIONAL_KEYWORDS)
}

pub fn is_advanced(post: &Post) -> bool {
    mentions_any(post, ADVANCED_KEYWORDS)
}

/// Lower-cased title with a leading "How to", "Guide to", "Introduction to"
/// or "Understanding" removed.
pub fn anchor_text(title: &str) -> String {
    ANCHOR_PREFIX_RE.replace(title, "").to_lowercase()
}

/// Assign scored candidates to sections under the configured quotas.
///
/// `candidates` must already be sorted by descending score. Targets the
/// source already links to are never suggested. The result is grouped by
/// section (introduction, body, conclusion), best score first within each.
pub fn plan(source: &Post, candidates: &[ScoredPost<'_>], options: &PlanOptions) -> Vec<LinkSuggestion> {
    let already_linked: HashSet<&str> = source.outgoing_links.iter().map(String::as_str).collect();
    let source_foundational = is_foundational(source);
    let quotas = options.quotas;

    let mut intro_count = 0;
    let mut body_count = 0;
    let mut conclusion_count = 0;
    let mut suggestions: Vec<LinkSuggestion> = Vec::new();

    for candidate in candidates {
        if suggestions.len() >= options.max_suggestions {
            break;
        }
        let target = candidate.post;
        if target.slug == source.slug || already_linked.contains(target.slug.as_str()) {
            continue;
        }

        let advanced = is_advanced(target);
        let newer = target.date > source.date;

        let section = if is_foundational(target)
            && !source_foundational
            && intro_count < quotas.introduction
        {
            intro_count += 1;
            Section::Introduction
        } else if (advanced || newer) && conclusion_count < quotas.conclusion {
            conclusion_count += 1;
            Section::Conclusion
        } else if body_count < quotas.body {
            body_count += 1;
            Section::Body
        } else {
            continue;
        };

        let shared_tags = relevance::shared_tags(source, target);
        let reason = if section == Section::Conclusion && newer && !advanced {
            Reason::TopicProgression
        } else if !shared_tags.is_empty() {
            Reason::TagOverlap
        } else {
            Reason::KeywordMatch
        };

        suggestions.push(LinkSuggestion {
            from_post: source.slug.clone(),
            to_post: target.slug.clone(),
            relevance_score: candidate.score,
            reason,
            section,
            anchor_text: anchor_text(&target.title),
            shared_tags,
        });
    }

    suggestions.sort_by(|a, b| {
        a.section.cmp(&b.section).then(
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    suggestions
}

/// Score and plan every post in the corpus, in corpus order.
pub fn plan_all(corpus: &Corpus, min_score: f64, options: &PlanOptions) -> Vec<PostSuggestions> {
    corpus
        .posts()
        .iter()
        .map(|source| {
            let candidates = relevance::score(source, corpus, min_score);
            PostSuggestions {
                slug: source.slug.clone(),
                title: source.title.clone(),
                suggestions: plan(source, &candidates, options),
            }
        })
        .collect()
}
