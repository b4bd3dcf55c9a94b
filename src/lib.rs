//! Route Fixer - a CLI tool that marks Next.js API route handlers as force-dynamic
//!
//! This library provides the traversal-and-patch pass behind the binary:
//! - Recursive scan of the API routes directory for `route.ts` files
//! - Marker detection so already-patched files are left untouched
//! - Line-based insertion of the directive block after leading comments
//! - Per-file error isolation and outcome tallying

pub mod cli;
pub mod config;
pub mod error;
pub mod process;

pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};
pub use process::{FileOutcome, PatchStats, PatchStatus, Patcher};
