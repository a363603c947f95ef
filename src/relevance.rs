//! Pairwise relevance between posts from tag and keyword overlap.

use crate::corpus::Corpus;
use crate::post::Post;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

pub const TAG_WEIGHT: f64 = 0.7;
pub const KEYWORD_WEIGHT: f64 = 0.3;
pub const DEFAULT_MIN_SCORE: f64 = 0.3;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Alphabetic}\p{N}]+(?:-[\p{Alphabetic}\p{N}]+)*").expect("word pattern"));

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for",
        "of", "with", "by", "from", "as", "is", "was", "are", "were", "been",
        "be", "have", "has", "had", "do", "does", "did", "will", "would",
        "could", "should", "may", "might", "must", "shall", "can", "need",
        "this", "that", "these", "those", "i", "you", "he", "she", "it",
        "we", "they", "what", "which", "who", "whom", "whose", "where",
        "when", "why", "how", "all", "each", "every", "both", "few", "more",
        "most", "other", "some", "such", "no", "nor", "not", "only", "own",
        "same", "so", "than", "too", "very", "just", "also", "now", "here",
        "your", "our", "its", "into", "about", "over", "after", "before",
        "there", "their", "them", "then", "any", "out", "my",
    ]
    .into_iter()
    .collect()
});

/// A candidate post with its relevance to some source post.
#[derive(Debug, Clone, Copy)]
pub struct ScoredPost<'a> {
    pub post: &'a Post,
    pub score: f64,
    pub tag_score: f64,
    pub keyword_score: f64,
}

/// Keywords from title and description, plus the post's tags.
pub fn keywords(post: &Post) -> HashSet<String> {
    let text = format!("{} {}", post.title, post.description).to_lowercase();

    let mut words: HashSet<String> = WORD_RE
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect();
    words.extend(post.tags.iter().cloned());
    words
}

/// Shared tags over the smaller tag set.
pub fn tag_score(a: &Post, b: &Post) -> f64 {
    let smaller = a.tags.len().min(b.tags.len());
    if smaller == 0 {
        return 0.0;
    }
    let theirs: HashSet<&str> = b.tags.iter().map(String::as_str).collect();
    let shared = a.tags.iter().filter(|t| theirs.contains(t.as_str())).count();
    shared as f64 / smaller as f64
}

/// Share of the source's keywords that also appear in the candidate.
pub fn keyword_score(source: &HashSet<String>, candidate: &HashSet<String>) -> f64 {
    if source.is_empty() {
        return 0.0;
    }
    source.intersection(candidate).count() as f64 / source.len() as f64
}

/// Tags both posts carry, in the source's tag order.
pub fn shared_tags(source: &Post, candidate: &Post) -> Vec<String> {
    source
        .tags
        .iter()
        .filter(|t| candidate.tags.contains(*t))
        .cloned()
        .collect()
}

/// Score every other post in the corpus against `source`.
///
/// Only candidates at or above `min_score` are returned, highest first.
/// Equal scores keep corpus order, which is slug order.
pub fn score<'a>(source: &Post, corpus: &'a Corpus, min_score: f64) -> Vec<ScoredPost<'a>> {
    let source_keywords = keywords(source);

    let mut scored: Vec<ScoredPost<'a>> = corpus
        .posts()
        .iter()
        .filter(|c| c.slug != source.slug)
        .map(|candidate| {
            let tag_score = tag_score(source, candidate);
            let keyword_score = keyword_score(&source_keywords, &keywords(candidate));
            ScoredPost {
                post: candidate,
                score: TAG_WEIGHT * tag_score + KEYWORD_WEIGHT * keyword_score,
                tag_score,
                keyword_score,
            }
        })
        .filter(|s| s.score >= min_score)
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored
}
