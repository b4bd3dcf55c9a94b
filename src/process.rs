//! Sequential route-file patcher
//!
//! Handles the core logic of:
//! - Scanning the routes directory for route files
//! - Detecting the dynamic-rendering marker
//! - Inserting the marker block after leading comments
//! - Tallying per-file outcomes

use crate::config::Config;
use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span};
use walkdir::WalkDir;

/// Result of processing a single route file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Path of the route file
    pub path: PathBuf,
    /// Processing status
    pub status: PatchStatus,
    /// Error message (if errored)
    pub error: Option<String>,
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStatus {
    /// Marker block was inserted and the file rewritten
    Fixed,
    /// File already contains the marker
    Skipped,
    /// Reading or writing the file failed
    Error,
}

/// Processing statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchStats {
    pub fixed: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl PatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, status: PatchStatus) {
        match status {
            PatchStatus::Fixed => self.fixed += 1,
            PatchStatus::Skipped => self.skipped += 1,
            PatchStatus::Error => self.errors += 1,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Fixed: {}, Skipped: {}, Errors: {}",
            self.fixed, self.skipped, self.errors
        )
    }
}

/// Patcher for marking route files as force-dynamic
pub struct Patcher {
    config: Config,
    stats: PatchStats,
}

impl Patcher {
    /// Create a new patcher with the given configuration
    pub fn new(config: Config) -> Self {
        Self {
            config,
            stats: PatchStats::new(),
        }
    }

    /// Run the patching pass over every route file under the routes directory
    ///
    /// Files are processed one at a time; a failure on one file never stops
    /// the run. Returns one outcome per matched file.
    pub fn run(&mut self) -> Vec<FileOutcome> {
        let _span = span!(Level::INFO, "patcher_run").entered();

        info!(routes_dir = %self.config.routes_dir.display(), "Scanning routes directory");
        let files = self.collect_files();
        info!(count = files.len(), "Found route files");

        let mut outcomes = Vec::with_capacity(files.len());
        for path in files {
            let outcome = self.patch_file(&path);
            self.stats.record(outcome.status);
            outcomes.push(outcome);
        }

        info!("{}", self.stats.summary());
        outcomes
    }

    /// Collect all route files under the routes directory, sorted by path
    pub fn collect_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.config.routes_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|name| self.config.is_route_file(name))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        files
    }

    /// Process a single route file, containing any failure in the outcome
    fn patch_file(&self, path: &Path) -> FileOutcome {
        let _file_span = span!(Level::DEBUG, "patch_file", ?path).entered();

        match self.try_patch(path) {
            Ok(true) => {
                info!(?path, "Inserted dynamic marker");
                FileOutcome {
                    path: path.to_path_buf(),
                    status: PatchStatus::Fixed,
                    error: None,
                }
            }
            Ok(false) => {
                debug!(?path, "Marker already present, skipping");
                FileOutcome {
                    path: path.to_path_buf(),
                    status: PatchStatus::Skipped,
                    error: None,
                }
            }
            Err(e) => {
                error!(?path, error = %e, "Failed to patch route file");
                FileOutcome {
                    path: path.to_path_buf(),
                    status: PatchStatus::Error,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Read, classify, and (if needed) rewrite one file
    ///
    /// Returns true when the block was inserted, false when the marker was
    /// already present. The new content is computed fully in memory before
    /// the single whole-file write replaces the original.
    fn try_patch(&self, path: &Path) -> Result<bool> {
        let content = read_text(path)?;

        if content.contains(&self.config.marker) {
            return Ok(false);
        }

        let patched = self.insert_block(&content);
        fs::write(path, patched)?;
        Ok(true)
    }

    /// Splice the fixed block into the content before the first code line
    fn insert_block(&self, content: &str) -> String {
        let lines: Vec<&str> = content.split('\n').collect();
        let index = insertion_index(&lines, &self.config);

        let mut out: Vec<&str> = Vec::with_capacity(lines.len() + self.config.block_lines.len());
        out.extend_from_slice(&lines[..index]);
        out.extend(self.config.block_lines.iter().map(String::as_str));
        out.extend_from_slice(&lines[index..]);
        out.join("\n")
    }

    /// Get processing statistics reference
    pub fn stats(&self) -> &PatchStats {
        &self.stats
    }
}

/// Index of the first line that is non-empty and not a comment
///
/// Falls back to 0 (start of file) when no such line exists, including for
/// empty and all-comment files.
fn insertion_index(lines: &[&str], config: &Config) -> usize {
    lines
        .iter()
        .position(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !config.is_comment_line(trimmed)
        })
        .unwrap_or(0)
}

/// Read a file as UTF-8 text
fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::InvalidData {
            Error::NonUtf8Text {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const BLOCK: &str = "// Force dynamic rendering for this route\nexport const dynamic = \"force-dynamic\";\n";

    fn config_for(root: &Path) -> Config {
        Config {
            routes_dir: root.to_path_buf(),
            ..Config::default()
        }
    }

    fn write_route(root: &Path, rel_dir: &str, content: &[u8]) -> PathBuf {
        let dir = root.join(rel_dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("route.ts");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_insertion_index_skips_leading_comments_and_blanks() {
        let config = Config::default();
        let lines = vec![
            "/**",
            " * Users API",
            " */",
            "",
            "// handler module",
            "import { NextResponse } from \"next/server\";",
            "",
            "export async function GET() {}",
        ];
        assert_eq!(insertion_index(&lines, &config), 5);
    }

    #[test]
    fn test_insertion_index_falls_back_to_start() {
        let config = Config::default();
        let all_comments = vec!["// a", "// b", ""];
        assert_eq!(insertion_index(&all_comments, &config), 0);

        let empty: Vec<&str> = vec![""];
        assert_eq!(insertion_index(&empty, &config), 0);

        let code_first = vec!["const x = 1;"];
        assert_eq!(insertion_index(&code_first, &config), 0);
    }

    #[test]
    fn test_patch_stats() {
        let mut stats = PatchStats::new();
        stats.record(PatchStatus::Fixed);
        stats.record(PatchStatus::Fixed);
        stats.record(PatchStatus::Skipped);
        stats.record(PatchStatus::Error);

        let summary = stats.summary();
        assert!(summary.contains("Fixed: 2"));
        assert!(summary.contains("Skipped: 1"));
        assert!(summary.contains("Errors: 1"));
    }

    #[test]
    fn test_collect_files_matches_exact_name_recursively() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        write_route(root, "users", b"export async function GET() {}\n");
        write_route(root, "users/[id]", b"export async function GET() {}\n");
        write_route(root, "auth/login", b"export async function POST() {}\n");
        // near-misses that must not match
        fs::write(root.join("users/route.js"), b"module.exports = {};\n").unwrap();
        fs::write(root.join("users/index.ts"), b"export {};\n").unwrap();
        fs::write(root.join("users/route.ts.bak"), b"old\n").unwrap();

        let patcher = Patcher::new(config_for(root));
        let files = patcher.collect_files();
        assert_eq!(files.len(), 3);
        assert!(files.iter().all(|p| p.file_name().unwrap() == "route.ts"));
        // sorted for deterministic output
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }

    #[test]
    fn test_marker_present_leaves_file_untouched() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let original = b"import { NextResponse } from 'next/server';\n\nexport const dynamic = 'force-dynamic';\n\nexport async function GET() {}\n";
        let path = write_route(root, "users", original);

        let mut patcher = Patcher::new(config_for(root));
        let outcomes = patcher.run();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, PatchStatus::Skipped);
        assert_eq!(fs::read(&path).unwrap(), original);
        assert_eq!(patcher.stats().skipped, 1);
        assert_eq!(patcher.stats().fixed, 0);
    }

    #[test]
    fn test_inserts_block_after_leading_comment() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let path = write_route(
            root,
            "users",
            b"// Users API\nimport { NextResponse } from \"next/server\";\n\nexport async function GET() {}\n",
        );

        let mut patcher = Patcher::new(config_for(root));
        let outcomes = patcher.run();
        assert_eq!(outcomes[0].status, PatchStatus::Fixed);

        let patched = fs::read_to_string(&path).unwrap();
        let expected = format!(
            "// Users API\n{}\nimport {{ NextResponse }} from \"next/server\";\n\nexport async function GET() {{}}\n",
            BLOCK
        );
        assert_eq!(patched, expected);
        // marker appears exactly once
        assert_eq!(patched.matches("export const dynamic").count(), 1);
        // first original code line sits right after the block's blank line
        let lines: Vec<&str> = patched.split('\n').collect();
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "import { NextResponse } from \"next/server\";");
    }

    #[test]
    fn test_all_comment_file_gets_block_at_start() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let original = "// placeholder route\n// not implemented yet\n";
        let path = write_route(root, "stub", original.as_bytes());

        let mut patcher = Patcher::new(config_for(root));
        patcher.run();

        let patched = fs::read_to_string(&path).unwrap();
        assert_eq!(patched, format!("{}\n{}", BLOCK, original));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        let path = write_route(
            root,
            "users",
            b"// Users API\nexport async function GET() {}\n",
        );

        let mut first = Patcher::new(config_for(root));
        first.run();
        let after_first = fs::read_to_string(&path).unwrap();
        assert_eq!(first.stats().fixed, 1);

        let mut second = Patcher::new(config_for(root));
        let outcomes = second.run();
        assert_eq!(outcomes[0].status, PatchStatus::Skipped);
        assert_eq!(second.stats().skipped, 1);
        assert_eq!(second.stats().fixed, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
    }

    #[test]
    fn test_mixed_directory_outcomes() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        // A: already patched
        let a = write_route(
            root,
            "a",
            b"export const dynamic = 'force-dynamic';\n\nexport async function GET() {}\n",
        );
        // B: leading comment then code
        let b = write_route(root, "b", b"// handler\nexport async function GET() {}\n");
        // C: not decodable as text
        let c_bytes: &[u8] = &[0xff, 0xfe, 0x00, 0x9f, 0x12];
        let c = write_route(root, "c", c_bytes);

        let mut patcher = Patcher::new(config_for(root));
        let outcomes = patcher.run();

        let stats = patcher.stats();
        assert_eq!(stats.fixed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.errors, 1);

        let status_of = |path: &Path| {
            outcomes
                .iter()
                .find(|o| o.path == path)
                .map(|o| o.status)
                .unwrap()
        };
        assert_eq!(status_of(&a), PatchStatus::Skipped);
        assert_eq!(status_of(&b), PatchStatus::Fixed);
        assert_eq!(status_of(&c), PatchStatus::Error);

        // B got the block after its leading comment
        let b_content = fs::read_to_string(&b).unwrap();
        assert_eq!(
            b_content,
            format!("// handler\n{}\nexport async function GET() {{}}\n", BLOCK)
        );
        // A and C are unchanged on disk
        assert!(fs::read_to_string(&a).unwrap().starts_with("export const dynamic"));
        assert_eq!(fs::read(&c).unwrap(), c_bytes);
        // the error outcome names the file
        let err = outcomes.iter().find(|o| o.path == c).unwrap();
        assert!(err.error.as_deref().unwrap().contains("UTF-8"));
    }
}
