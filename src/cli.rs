//! CLI argument parsing with clap

use clap::Parser;

/// Route Fixer - force-dynamic marker for Next.js API routes
///
/// Scans src/app/api recursively for route.ts files and inserts
/// `export const dynamic = "force-dynamic";` after any leading
/// comments in each file that does not already declare it.
///
/// The tool takes no arguments; the routes directory, target file
/// name, and inserted block are fixed.
#[derive(Parser, Debug)]
#[command(name = "route-fixer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {}
