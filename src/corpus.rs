//! The in-memory corpus of posts and the link graph derived from it.

use crate::error::{Error, Result, SkipReason};
use crate::post::{self, ParseOutcome, Post};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directed edges between posts.
///
/// `outgoing` keeps every edge, including those to slugs outside the corpus.
/// `incoming` only records edges whose target is a loaded post.
#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct LinkGraph {
    pub outgoing: BTreeMap<String, BTreeSet<String>>,
    pub incoming: BTreeMap<String, BTreeSet<String>>,
}

impl LinkGraph {
    pub fn incoming_count(&self, slug: &str) -> usize {
        self.incoming.get(slug).map(|s| s.len()).unwrap_or(0)
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    #[serde(serialize_with = "serialize_display")]
    pub reason: SkipReason,
}

/// Two files that produced the same slug. The later file replaced the earlier.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SlugCollision {
    pub slug: String,
    pub replaced_title: String,
    pub kept_title: String,
}

#[derive(Debug, Default, Clone)]
pub struct LoadOptions {
    /// Glob patterns matched against file names.
    pub exclude: Vec<String>,
}

/// Immutable view of a set of posts. Narrowing produces a new value.
#[derive(Debug, Clone)]
pub struct Corpus {
    posts: Vec<Post>,
    by_slug: HashMap<String, usize>,
    graph: LinkGraph,
    skipped: Vec<SkippedFile>,
    collisions: Vec<SlugCollision>,
}

impl Corpus {
    /// Load every `*.md` file directly inside `dir`.
    pub fn load(dir: &Path, options: &LoadOptions) -> Result<Corpus> {
        if !dir.is_dir() {
            return Err(Error::MissingDirectory(dir.to_path_buf()));
        }

        let excludes = build_excludes(&options.exclude)?;
        let mut paths = Vec::new();

        let mut builder = WalkBuilder::new(dir);
        builder
            .max_depth(Some(1))
            .hidden(true)
            .ignore(false)
            .parents(false)
            .git_ignore(true);

        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("walk error under {}: {}", dir.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            // follows symlinks, so linked posts are loaded too
            if !path.is_file() {
                continue;
            }
            let is_markdown = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "md")
                .unwrap_or(false);
            if !is_markdown {
                continue;
            }
            if let Some(name) = path.file_name() {
                if excludes.is_match(Path::new(name)) {
                    debug!("excluded {}", path.display());
                    continue;
                }
            }
            paths.push(path.to_path_buf());
        }

        paths.sort();

        let mut posts = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();
        for path in paths {
            match post::parse(&path) {
                ParseOutcome::Parsed(post) => posts.push(post),
                ParseOutcome::Skipped(reason) => {
                    warn!("skipping {}: {}", path.display(), reason);
                    skipped.push(SkippedFile { path, reason });
                }
            }
        }

        let mut corpus = Corpus::rebuild(posts);
        corpus.skipped = skipped;
        info!(
            "loaded {} posts from {} ({} skipped)",
            corpus.posts.len(),
            dir.display(),
            corpus.skipped.len()
        );
        Ok(corpus)
    }

    /// Build a corpus (lookup table and link graph) from already parsed posts.
    ///
    /// Posts are held in slug order. When two posts share a slug the later
    /// one in `posts` wins.
    pub fn rebuild(posts: Vec<Post>) -> Corpus {
        let mut latest: BTreeMap<String, Post> = BTreeMap::new();
        let mut collisions = Vec::new();

        for post in posts {
            if let Some(previous) = latest.remove(&post.slug) {
                warn!(
                    "slug collision on '{}': '{}' replaces '{}'",
                    post.slug, post.title, previous.title
                );
                collisions.push(SlugCollision {
                    slug: post.slug.clone(),
                    replaced_title: previous.title,
                    kept_title: post.title.clone(),
                });
            }
            latest.insert(post.slug.clone(), post);
        }

        let posts: Vec<Post> = latest.into_values().collect();
        let by_slug: HashMap<String, usize> = posts
            .iter()
            .enumerate()
            .map(|(i, p)| (p.slug.clone(), i))
            .collect();

        let mut graph = LinkGraph::default();
        for post in &posts {
            let targets = graph.outgoing.entry(post.slug.clone()).or_default();
            for target in &post.outgoing_links {
                targets.insert(target.clone());
            }
            for target in &post.outgoing_links {
                if by_slug.contains_key(target) {
                    graph
                        .incoming
                        .entry(target.clone())
                        .or_default()
                        .insert(post.slug.clone());
                }
            }
        }

        debug!(
            "link graph: {} posts, {} edges",
            posts.len(),
            graph.outgoing.values().map(|t| t.len()).sum::<usize>()
        );

        Corpus {
            posts,
            by_slug,
            graph,
            skipped: Vec::new(),
            collisions,
        }
    }

    /// The first `n` posts in slug order, with the graph rebuilt for that subset.
    pub fn pilot(&self, n: usize) -> Corpus {
        let subset: Vec<Post> = self.posts.iter().take(n).cloned().collect();
        let mut corpus = Corpus::rebuild(subset);
        corpus.skipped = self.skipped.clone();
        corpus.collisions = self.collisions.clone();
        corpus
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.by_slug.get(slug).map(|&i| &self.posts[i])
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    pub fn skipped(&self) -> &[SkippedFile] {
        &self.skipped
    }

    pub fn collisions(&self) -> &[SlugCollision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

fn build_excludes(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| Error::InvalidGlob(format!("{pattern}: {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::InvalidGlob(e.to_string()))
}

fn serialize_display<S, T>(value: &T, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
    T: std::fmt::Display,
{
    serializer.collect_str(value)
}
