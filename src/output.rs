//! CLI output formatting.
//!
//! Output is **information-centric**: each compiled entry leads with its
//! position and title, with the source path as an indented context line.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! posts (3 entries)
//!     001 Hello, world
//!         Source: posts/hello.md
//!     002 (posts/untitled.md)
//! Rebuilt: sources changed (1 added)
//! Wrote quire-out/posts.json
//! ```
//!
//! ## Check
//!
//! ```text
//! Rebuild needed: sources changed (1 added, 1 modified)
//!     added: posts/new.md
//!     modified: posts/hello.md
//! ```
//!
//! ## Sources
//!
//! ```text
//! Sources
//! 001 posts/hello.md (markdown)
//! 002 posts/raw.html (passthrough)
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::artifact::RebuildReason;
use crate::builder::{Collection, PageEntry};
use crate::convert::is_markdown;
use crate::staleness::StaleReport;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Show `path` relative to `root` when it lives under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Format an entry line: titled entries show the title, untitled show the
/// source path in parens.
///
/// ```text
/// 001 Hello, world       // titled
/// 002 (posts/raw.html)   // untitled
/// ```
fn entry_line(index: usize, title: Option<&str>, source: &str) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), source),
    }
}

fn entry_count(n: usize) -> String {
    match n {
        1 => "1 entry".to_string(),
        n => format!("{n} entries"),
    }
}

fn report_summary(report: &StaleReport) -> String {
    let mut parts = Vec::new();
    if report.patterns_changed {
        parts.push("patterns changed".to_string());
    }
    if !report.added.is_empty() {
        parts.push(format!("{} added", report.added.len()));
    }
    if !report.removed.is_empty() {
        parts.push(format!("{} removed", report.removed.len()));
    }
    if !report.modified.is_empty() {
        parts.push(format!("{} modified", report.modified.len()));
    }
    parts.join(", ")
}

/// One-line description of a rebuild reason.
pub fn describe_reason(reason: &RebuildReason) -> String {
    match reason {
        RebuildReason::Forced => "forced".to_string(),
        RebuildReason::NoArtifact => "no previous build".to_string(),
        RebuildReason::SettingsChanged => "settings changed".to_string(),
        RebuildReason::SourcesChanged(report) => {
            format!("sources changed ({})", report_summary(report))
        }
    }
}

// ============================================================================
// build
// ============================================================================

/// Format the result of a build that compiled.
pub fn format_build_output(
    collection: &Collection<PageEntry>,
    reason: &RebuildReason,
    output: &Path,
    root: &Path,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({})",
        collection.name,
        entry_count(collection.len())
    )];

    for (i, entry) in collection.iter().enumerate() {
        let source = display_path(&entry.path, root);
        let title = entry.attributes.get("title").and_then(|v| v.as_str());
        lines.push(format!("{}{}", indent(1), entry_line(i + 1, title, &source)));
        if title.is_some_and(|t| !t.trim().is_empty()) {
            lines.push(format!("{}Source: {}", indent(2), source));
        }
    }

    lines.push(format!("Rebuilt: {}", describe_reason(reason)));
    lines.push(format!("Wrote {}", display_path(output, root)));
    lines
}

pub fn print_build_output(
    collection: &Collection<PageEntry>,
    reason: &RebuildReason,
    output: &Path,
    root: &Path,
) {
    for line in format_build_output(collection, reason, output, root) {
        println!("{}", line);
    }
}

/// Format the result of a build that had nothing to do.
pub fn format_up_to_date(name: &str, output: &Path, root: &Path) -> Vec<String> {
    vec![format!(
        "{} is up to date ({})",
        name,
        display_path(output, root)
    )]
}

pub fn print_up_to_date(name: &str, output: &Path, root: &Path) {
    for line in format_up_to_date(name, output, root) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Format a staleness check. `None` means up to date.
pub fn format_check_output(reason: Option<&RebuildReason>, root: &Path) -> Vec<String> {
    let Some(reason) = reason else {
        return vec!["Up to date".to_string()];
    };

    let mut lines = vec![format!("Rebuild needed: {}", describe_reason(reason))];
    if let RebuildReason::SourcesChanged(report) = reason {
        let groups = [
            ("added", &report.added),
            ("removed", &report.removed),
            ("modified", &report.modified),
        ];
        for (label, paths) in groups {
            for path in paths {
                lines.push(format!("{}{}: {}", indent(1), label, display_path(path, root)));
            }
        }
    }
    lines
}

pub fn print_check_output(reason: Option<&RebuildReason>, root: &Path) {
    for line in format_check_output(reason, root) {
        println!("{}", line);
    }
}

// ============================================================================
// sources
// ============================================================================

/// Format discovered sources in compile order.
pub fn format_sources_output(paths: &[impl AsRef<Path>], root: &Path) -> Vec<String> {
    let mut lines = vec!["Sources".to_string()];
    for (i, path) in paths.iter().enumerate() {
        let path = path.as_ref();
        let kind = if is_markdown(path) {
            "markdown"
        } else {
            "passthrough"
        };
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            display_path(path, root),
            kind
        ));
    }
    if paths.is_empty() {
        lines.push(format!("{}(no files matched)", indent(1)));
    }
    lines
}

pub fn print_sources_output(paths: &[impl AsRef<Path>], root: &Path) {
    for line in format_sources_output(paths, root) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Attributes;
    use serde_json::json;
    use std::path::PathBuf;

    fn entry(path: &str, title: Option<&str>) -> PageEntry {
        let mut attributes = Attributes::new();
        if let Some(t) = title {
            attributes.insert("title".into(), json!(t));
        }
        PageEntry {
            path: PathBuf::from(path),
            attributes,
            body: String::new(),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn entry_line_with_and_without_title() {
        assert_eq!(entry_line(1, Some("Hello"), "a.md"), "001 Hello");
        assert_eq!(entry_line(2, None, "a.md"), "002 (a.md)");
        assert_eq!(entry_line(3, Some("  "), "a.md"), "003 (a.md)");
    }

    #[test]
    fn display_path_strips_root() {
        assert_eq!(
            display_path(Path::new("/site/posts/a.md"), Path::new("/site")),
            "posts/a.md"
        );
        assert_eq!(
            display_path(Path::new("/elsewhere/a.md"), Path::new("/site")),
            "/elsewhere/a.md"
        );
    }

    #[test]
    fn describe_reasons() {
        assert_eq!(describe_reason(&RebuildReason::Forced), "forced");
        assert_eq!(describe_reason(&RebuildReason::NoArtifact), "no previous build");
        let report = StaleReport {
            patterns_changed: false,
            added: vec![PathBuf::from("a.md")],
            removed: Vec::new(),
            modified: vec![PathBuf::from("b.md"), PathBuf::from("c.md")],
        };
        assert_eq!(
            describe_reason(&RebuildReason::SourcesChanged(report)),
            "sources changed (1 added, 2 modified)"
        );
    }

    // =========================================================================
    // Command output
    // =========================================================================

    #[test]
    fn build_output_lists_entries() {
        let collection = Collection::new(
            "posts",
            vec![
                entry("/site/posts/hello.md", Some("Hello")),
                entry("/site/posts/raw.html", None),
            ],
        );
        let lines = format_build_output(
            &collection,
            &RebuildReason::NoArtifact,
            Path::new("/site/quire-out/posts.json"),
            Path::new("/site"),
        );
        assert_eq!(
            lines,
            vec![
                "posts (2 entries)",
                "    001 Hello",
                "        Source: posts/hello.md",
                "    002 (posts/raw.html)",
                "Rebuilt: no previous build",
                "Wrote quire-out/posts.json",
            ]
        );
    }

    #[test]
    fn build_output_single_entry() {
        let collection = Collection::new("posts", vec![entry("a.md", None)]);
        let lines = format_build_output(
            &collection,
            &RebuildReason::Forced,
            Path::new("out.json"),
            Path::new("."),
        );
        assert_eq!(lines[0], "posts (1 entry)");
    }

    #[test]
    fn up_to_date_output() {
        assert_eq!(
            format_up_to_date("posts", Path::new("/s/out.json"), Path::new("/s")),
            vec!["posts is up to date (out.json)"]
        );
    }

    #[test]
    fn check_output() {
        assert_eq!(format_check_output(None, Path::new(".")), vec!["Up to date"]);

        let report = StaleReport {
            patterns_changed: false,
            added: vec![PathBuf::from("/s/new.md")],
            removed: vec![PathBuf::from("/s/old.md")],
            modified: Vec::new(),
        };
        assert_eq!(
            format_check_output(Some(&RebuildReason::SourcesChanged(report)), Path::new("/s")),
            vec![
                "Rebuild needed: sources changed (1 added, 1 removed)",
                "    added: new.md",
                "    removed: old.md",
            ]
        );
    }

    #[test]
    fn sources_output() {
        let paths = vec![PathBuf::from("/s/a.md"), PathBuf::from("/s/b.txt")];
        assert_eq!(
            format_sources_output(&paths, Path::new("/s")),
            vec!["Sources", "001 a.md (markdown)", "002 b.txt (passthrough)"]
        );
        let none: Vec<PathBuf> = Vec::new();
        assert_eq!(
            format_sources_output(&none, Path::new("/s")),
            vec!["Sources", "    (no files matched)"]
        );
    }
}
