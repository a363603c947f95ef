//! Post parsing: YAML frontmatter plus the internal links found in the body.

use crate::error::SkipReason;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// `[anchor](/posts/slug)` or `[anchor](/posts/slug/)`.
static INTERNAL_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(/posts/([^/)]+)/?\)").expect("internal link pattern")
});

/// One blog entry as loaded from disk.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub description: String,
    #[serde(skip_serializing)]
    pub content: String,
    /// Link targets in order of appearance, duplicates kept.
    pub outgoing_links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalLink {
    pub anchor: String,
    pub target: String,
}

/// Result of parsing a single file. Skips are expected and never fatal.
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(Post),
    Skipped(SkipReason),
}

impl ParseOutcome {
    pub fn post(self) -> Option<Post> {
        match self {
            ParseOutcome::Parsed(post) => Some(post),
            ParseOutcome::Skipped(_) => None,
        }
    }
}

#[derive(Deserialize, Debug)]
struct Frontmatter {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    date: Option<Value>,
    #[serde(default)]
    tags: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
}

/// Parse the file at `path`. The slug is the file stem.
pub fn parse(path: &Path) -> ParseOutcome {
    let slug = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    match fs::read_to_string(path) {
        Ok(text) => parse_str(&slug, &text),
        Err(e) => ParseOutcome::Skipped(SkipReason::Unreadable(e.to_string())),
    }
}

/// Parse raw file text for a post identified by `slug`.
pub fn parse_str(slug: &str, text: &str) -> ParseOutcome {
    let (yaml, body) = match split_frontmatter(text) {
        Ok(parts) => parts,
        Err(reason) => return ParseOutcome::Skipped(reason),
    };

    let fm: Frontmatter = match serde_yaml::from_str(yaml) {
        Ok(fm) => fm,
        Err(e) => return ParseOutcome::Skipped(SkipReason::InvalidYaml(e.to_string())),
    };

    let Some(title) = fm.title.as_ref().and_then(scalar_to_string) else {
        return ParseOutcome::Skipped(SkipReason::MissingField("title"));
    };
    let Some(date) = fm.date.as_ref().and_then(scalar_to_string) else {
        return ParseOutcome::Skipped(SkipReason::MissingField("date"));
    };
    let Some(tags) = fm.tags.as_ref().and_then(normalize_tags) else {
        return ParseOutcome::Skipped(SkipReason::MissingField("tags"));
    };
    let description = fm
        .description
        .as_ref()
        .and_then(scalar_to_string)
        .unwrap_or_default();

    let outgoing_links = internal_links(body).map(|link| link.target).collect();

    ParseOutcome::Parsed(Post {
        slug: slug.to_string(),
        title,
        date,
        tags,
        description,
        content: body.to_string(),
        outgoing_links,
    })
}

/// Split `---\n<yaml>\n---\n<body>` into its YAML and body parts.
fn split_frontmatter(text: &str) -> Result<(&str, &str), SkipReason> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
        .ok_or(SkipReason::MissingFrontmatter)?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }

    Err(SkipReason::UnterminatedFrontmatter)
}

/// Every `/posts/` link in `body`, in order of appearance.
pub fn internal_links(body: &str) -> impl Iterator<Item = InternalLink> + '_ {
    INTERNAL_LINK_RE.captures_iter(body).map(|caps| InternalLink {
        anchor: caps[1].to_string(),
        target: caps[2].to_string(),
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Tags may be a list or a single scalar. Lower-cased, trimmed, deduplicated.
fn normalize_tags(value: &Value) -> Option<Vec<String>> {
    let raw: Vec<String> = match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
        Value::Null => return None,
        other => vec![scalar_to_string(other)?],
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Some(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> Post {
        match parse_str("sample", text) {
            ParseOutcome::Parsed(post) => post,
            ParseOutcome::Skipped(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    fn skipped(text: &str) -> SkipReason {
        match parse_str("sample", text) {
            ParseOutcome::Skipped(reason) => reason,
            ParseOutcome::Parsed(post) => panic!("unexpected parse: {post:?}"),
        }
    }

    #[test]
    fn test_parse_full_frontmatter() {
        let post = parsed(
            "---\ntitle: Hardening SSH\ndate: 2024-03-01\ntags: [Security, ' homelab ']\ndescription: Lock it down\n---\nBody text\n",
        );
        assert_eq!(post.slug, "sample");
        assert_eq!(post.title, "Hardening SSH");
        assert_eq!(post.date, "2024-03-01");
        assert_eq!(post.tags, vec!["security", "homelab"]);
        assert_eq!(post.description, "Lock it down");
        assert_eq!(post.content, "Body text\n");
    }

    #[test]
    fn test_scalar_tag_becomes_single_element() {
        let post = parsed("---\ntitle: T\ndate: 2024-01-01\ntags: Networking\n---\n");
        assert_eq!(post.tags, vec!["networking"]);
    }

    #[test]
    fn test_duplicate_tags_collapse() {
        let post = parsed("---\ntitle: T\ndate: 2024-01-01\ntags: [rust, Rust, RUST ]\n---\n");
        assert_eq!(post.tags, vec!["rust"]);
    }

    #[test]
    fn test_description_is_optional() {
        let post = parsed("---\ntitle: T\ndate: 2024-01-01\ntags: []\n---\n");
        assert_eq!(post.description, "");
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(
            skipped("---\ndate: 2024-01-01\ntags: [a]\n---\n"),
            SkipReason::MissingField("title")
        );
        assert_eq!(
            skipped("---\ntitle: T\ntags: [a]\n---\n"),
            SkipReason::MissingField("date")
        );
        assert_eq!(
            skipped("---\ntitle: T\ndate: 2024-01-01\n---\n"),
            SkipReason::MissingField("tags")
        );
    }

    #[test]
    fn test_frontmatter_delimiters() {
        assert_eq!(skipped("title: T\n"), SkipReason::MissingFrontmatter);
        assert_eq!(
            skipped("---\ntitle: T\ndate: x\ntags: [a]\n"),
            SkipReason::UnterminatedFrontmatter
        );
    }

    #[test]
    fn test_invalid_yaml_is_skipped() {
        let reason = skipped("---\ntitle: [unclosed\ndate: x\n---\n");
        assert!(matches!(reason, SkipReason::InvalidYaml(_)));
    }

    #[test]
    fn test_crlf_frontmatter() {
        let post = parsed("---\r\ntitle: T\r\ndate: 2024-01-01\r\ntags: [a]\r\n---\r\nBody\r\n");
        assert_eq!(post.title, "T");
        assert_eq!(post.content, "Body\r\n");
    }

    #[test]
    fn test_extracts_internal_links_in_order() {
        let post = parsed(
            "---\ntitle: T\ndate: 2024-01-01\ntags: [a]\n---\n\
             See [one](/posts/first) and [two](/posts/second/).\n\
             Again [one](/posts/first), external [x](https://example.com), \
             image [y](/images/pic.png).\n",
        );
        assert_eq!(post.outgoing_links, vec!["first", "second", "first"]);
    }

    #[test]
    fn test_internal_links_keep_anchor_text() {
        let links: Vec<_> = internal_links("[click here](/posts/abc/)").collect();
        assert_eq!(
            links,
            vec![InternalLink {
                anchor: "click here".to_string(),
                target: "abc".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_reads_file_stem_as_slug() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("harden-ssh.md");
        fs::write(&path, "---\ntitle: T\ndate: 2024-01-01\ntags: [a]\n---\n").unwrap();

        let post = parse(&path).post().unwrap();
        assert_eq!(post.slug, "harden-ssh");
    }

    #[test]
    fn test_parse_missing_file_is_skipped() {
        let outcome = parse(Path::new("/nonexistent/postlinks/nothing.md"));
        assert!(matches!(
            outcome,
            ParseOutcome::Skipped(SkipReason::Unreadable(_))
        ));
    }
}
