//! Link health checks over a loaded corpus.

use crate::corpus::Corpus;
use crate::post;
use serde::Serialize;
use std::collections::HashSet;

const GENERIC_ANCHORS: &[&str] = &["here", "click here", "this", "link", "read more", "this post"];

pub const NOT_FOUND: &str = "Post not found";

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BrokenLink {
    pub source: String,
    pub target: String,
    pub reason: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DuplicateLink {
    pub source: String,
    pub target: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PoorAnchor {
    pub source: String,
    pub target: String,
    pub anchor_text: String,
}

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct ValidationReport {
    pub broken_links: Vec<BrokenLink>,
    pub duplicate_links: Vec<DuplicateLink>,
    pub poor_anchor_text: Vec<PoorAnchor>,
}

impl ValidationReport {
    pub fn issue_count(&self) -> usize {
        self.broken_links.len() + self.duplicate_links.len() + self.poor_anchor_text.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count() == 0
    }

    pub fn broken_from(&self, slug: &str) -> usize {
        self.broken_links.iter().filter(|b| b.source == slug).count()
    }
}

pub fn is_generic_anchor(anchor: &str) -> bool {
    let anchor = anchor.trim().to_lowercase();
    GENERIC_ANCHORS.contains(&anchor.as_str())
}

/// Check every post for broken targets, repeated targets and generic anchors.
pub fn validate(corpus: &Corpus) -> ValidationReport {
    let mut report = ValidationReport::default();

    for post in corpus.posts() {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut counts: Vec<(&str, usize)> = Vec::new();

        for target in &post.outgoing_links {
            match counts.iter_mut().find(|(t, _)| *t == target.as_str()) {
                Some((_, n)) => *n += 1,
                None => counts.push((target.as_str(), 1)),
            }

            if seen.insert(target.as_str()) && !corpus.contains(target) {
                report.broken_links.push(BrokenLink {
                    source: post.slug.clone(),
                    target: target.clone(),
                    reason: NOT_FOUND.to_string(),
                });
            }
        }

        report.duplicate_links.extend(
            counts
                .into_iter()
                .filter(|(_, n)| *n > 1)
                .map(|(target, count)| DuplicateLink {
                    source: post.slug.clone(),
                    target: target.to_string(),
                    count,
                }),
        );

        for link in post::internal_links(&post.content) {
            if is_generic_anchor(&link.anchor) {
                report.poor_anchor_text.push(PoorAnchor {
                    source: post.slug.clone(),
                    target: link.target,
                    anchor_text: link.anchor,
                });
            }
        }
    }

    report
}
