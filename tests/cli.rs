//! End-to-end tests for the `postlinks` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn postlinks() -> Command {
    let mut cmd = Command::cargo_bin("postlinks").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write_post(dir: &Path, slug: &str, title: &str, date: &str, tags: &str, body: &str) {
    let text = format!("---\ntitle: {title}\ndate: {date}\ntags: {tags}\ndescription: About {title}\n---\n{body}\n");
    fs::write(dir.join(format!("{slug}.md")), text).unwrap();
}

/// Small blog: one broken link, one duplicate, one generic anchor, one orphan.
fn sample_blog() -> TempDir {
    let dir = TempDir::new().unwrap();
    let posts = dir.path().join("posts");
    fs::create_dir(&posts).unwrap();

    write_post(
        &posts,
        "harden-ssh",
        "How to Harden SSH",
        "2024-01-10",
        "[security, homelab]",
        "See [firewalls](/posts/firewall-basics/) and [click here](/posts/firewall-basics).\n\
         Also [old notes](/posts/ghost-post).",
    );
    write_post(
        &posts,
        "firewall-basics",
        "Firewall Basics",
        "2023-06-01",
        "[security, networking]",
        "Read [hardening](/posts/harden-ssh/).",
    );
    write_post(
        &posts,
        "vlan-architecture",
        "VLAN Architecture Deep Dive",
        "2024-08-20",
        "[networking, homelab]",
        "No links yet.",
    );
    fs::write(posts.join("broken.md"), "no frontmatter at all").unwrap();
    dir
}

#[test]
fn test_missing_directory_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    postlinks()
        .current_dir(dir.path())
        .args(["--posts-dir", "does-not-exist"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("posts directory not found"));
}

#[test]
fn test_empty_directory_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("posts")).unwrap();
    postlinks()
        .current_dir(dir.path())
        .args(["--posts-dir", "posts"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no posts loaded"));
}

#[test]
fn test_validate_reports_findings() {
    let blog = sample_blog();
    postlinks()
        .current_dir(blog.path())
        .args(["--posts-dir", "posts", "--validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Broken links"))
        .stdout(predicate::str::contains("ghost-post"))
        .stdout(predicate::str::contains("Duplicate links"))
        .stdout(predicate::str::contains("click here"))
        .stdout(predicate::str::contains("Skipped files"))
        .stdout(predicate::str::contains("vlan-architecture"));
}

#[test]
fn test_json_report() {
    let blog = sample_blog();
    let output = postlinks()
        .current_dir(blog.path())
        .args(["--posts-dir", "posts", "--report", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["total_posts"], 3);
    assert_eq!(json["orphaned"], serde_json::json!(["vlan-architecture"]));
    assert_eq!(json["skipped"].as_array().unwrap().len(), 1);

    let broken = json["validation"]["broken_links"].as_array().unwrap();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0]["source"], "harden-ssh");
    assert_eq!(broken[0]["target"], "ghost-post");
    assert_eq!(broken[0]["reason"], "Post not found");

    let duplicates = json["validation"]["duplicate_links"].as_array().unwrap();
    assert_eq!(duplicates[0]["count"], 2);

    let suggestions = json["suggestions"].as_array().unwrap();
    assert_eq!(suggestions.len(), 3);
    for post in suggestions {
        for s in post["suggestions"].as_array().unwrap() {
            assert_ne!(s["from_post"], s["to_post"]);
            assert!(s["relevance_score"].as_f64().unwrap() >= 0.3);
        }
    }
}

#[test]
fn test_suggest_writes_markdown_and_csv() {
    let blog = sample_blog();
    postlinks()
        .current_dir(blog.path())
        .args([
            "--posts-dir",
            "posts",
            "--suggest",
            "--output",
            "out/suggestions.md",
            "--csv",
            "out/links.csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggestions written to"));

    let md = fs::read_to_string(blog.path().join("out/suggestions.md")).unwrap();
    assert!(md.starts_with("# Internal Link Suggestions"));
    assert!(md.contains("(/posts/vlan-architecture/)"));

    let csv = fs::read_to_string(blog.path().join("out/links.csv")).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("slug,title,outgoing_links"));
}

#[test]
fn test_pilot_limits_corpus() {
    let blog = sample_blog();
    let output = postlinks()
        .current_dir(blog.path())
        .args(["--posts-dir", "posts", "--pilot", "1", "--validate", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["total_posts"], 1);
    // only firewall-basics remains, so its link to harden-ssh is now broken
    let broken = json["validation"]["broken_links"].as_array().unwrap();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0]["target"], "harden-ssh");
}

#[test]
fn test_config_file_and_exclude() {
    let blog = sample_blog();
    fs::write(
        blog.path().join(".postlinks.toml"),
        "posts_dir = \"posts\"\nexclude = [\"vlan-*\"]\n",
    )
    .unwrap();

    let output = postlinks()
        .current_dir(blog.path())
        .args(["--json", "--exclude", "broken.md"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["stats"]["total_posts"], 2);
    assert!(json["skipped"].as_array().unwrap().is_empty());
}

#[test]
fn test_invalid_min_score_rejected() {
    let blog = sample_blog();
    postlinks()
        .current_dir(blog.path())
        .args(["--posts-dir", "posts", "--min-score", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("min score"));
}
