//! Configuration values for the route fixer
//!
//! All values are fixed at build time. The tool patches one well-known
//! directory layout and is not externally configurable.

use std::path::PathBuf;

/// Configuration for the route fixer
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory scanned for route files (relative to the working directory)
    pub routes_dir: PathBuf,

    /// Exact file name that identifies a route handler
    pub route_file_name: String,

    /// Substring whose presence means a file is already patched
    pub marker: String,

    /// Lines inserted into unpatched files, in order
    pub block_lines: Vec<String>,

    /// Prefixes that mark a trimmed line as a comment
    pub comment_prefixes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            routes_dir: PathBuf::from("src/app/api"),
            route_file_name: "route.ts".into(),
            marker: "export const dynamic".into(),
            block_lines: vec![
                "// Force dynamic rendering for this route".into(),
                "export const dynamic = \"force-dynamic\";".into(),
                String::new(),
            ],
            comment_prefixes: vec![
                "//".into(), // single-line comment
                "/*".into(), // block comment start
                "*".into(),  // block comment continuation
            ],
        }
    }
}

impl Config {
    /// Check if a file name identifies a route handler
    pub fn is_route_file(&self, file_name: &str) -> bool {
        file_name == self.route_file_name
    }

    /// Check if a trimmed line is a comment line
    pub fn is_comment_line(&self, trimmed: &str) -> bool {
        self.comment_prefixes
            .iter()
            .any(|p| trimmed.starts_with(p.as_str()))
    }
}
