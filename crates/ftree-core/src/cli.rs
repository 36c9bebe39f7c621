use clap::{Parser, Subcommand};

// ============================================================================
// Output Format Options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(OutputFormat::Plain),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown format: {}", other)),
        }
    }
}

// ============================================================================
// Color Mode Options
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorMode::Auto),
            "always" => Ok(ColorMode::Always),
            "never" => Ok(ColorMode::Never),
            other => Err(format!("Unknown color mode: {}", other)),
        }
    }
}

// ============================================================================
// Subcommands
// ============================================================================

/// One tree operation per variant, mirroring `ftree_core::tree::FileTree`'s
/// public API one-to-one.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Initialize an empty tree.
    Init,
    /// Destroy the tree, freeing every node.
    Destroy,
    /// Create a directory (and any missing intermediate directories).
    Mkdir { path: String },
    /// Create a file with the given contents (and any missing parent
    /// directories). `contents` is read literally; pass `-` to read from
    /// stdin instead.
    Write { path: String, contents: String },
    /// Replace an existing file's contents, discarding the old buffer.
    /// `contents` is read literally; pass `-` to read from stdin instead.
    Replace { path: String, contents: String },
    /// Remove a file.
    Rm { path: String },
    /// Remove a directory and everything under it.
    Rmdir { path: String },
    /// Print whether a path is a file or directory, and its size.
    Stat { path: String },
    /// List every path in the tree in canonical order.
    Ls,
    /// Check every structural invariant and report violations.
    Validate,
}

// ============================================================================
// Top-level arguments
// ============================================================================

/// ftree - an in-memory hierarchical file-tree engine
#[derive(Parser, Debug, Clone)]
#[command(name = "ftree")]
#[command(about = "In-memory file-tree engine: insert, remove, stat and list paths")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    // ========================================================================
    // Output & Display Options
    // ========================================================================
    /// Output format: plain or json
    #[arg(long, default_value = "plain")]
    pub format: OutputFormat,

    /// Color output: auto, always, never
    #[arg(long, default_value = "auto")]
    pub color: ColorMode,
}

pub fn parse_args() -> Args {
    Args::parse()
}
