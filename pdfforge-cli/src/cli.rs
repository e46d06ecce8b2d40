//! CLI argument parsing for pdfforge.
//!
//! Only `clap` and `std` are used here: `build.rs` includes this file to
//! render the man page.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Split and merge PDF documents page by page.
///
/// Without `--user` every operation runs as a guest and counts against the
/// guest quota. With `--user` results are also recorded in the history store.
#[derive(Parser, Debug)]
#[command(name = "pdfforge")]
#[command(version)]
#[command(about = "Split and merge PDF documents page by page", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE", env = "PDFFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Act as this signed-in user
    #[arg(long, global = true, value_name = "ID", env = "PDFFORGE_USER")]
    pub user: Option<String>,

    /// History store backend
    #[arg(long, global = true, value_enum, value_name = "KIND")]
    pub store: Option<StoreArg>,

    /// Base URL of the remote history store
    #[arg(long, global = true, value_name = "URL", env = "PDFFORGE_STORE_URL")]
    pub store_url: Option<String>,

    /// API key of the remote history store
    #[arg(long, global = true, value_name = "KEY", env = "PDFFORGE_STORE_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    /// File keeping the guest usage count between runs
    #[arg(long, global = true, value_name = "FILE", env = "PDFFORGE_GUEST_FILE")]
    pub guest_file: Option<PathBuf>,

    /// Directory receiving produced documents
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Verbose output - show details and debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// History store selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreArg {
    /// Keep records for this run only
    Memory,
    /// Use the remote REST table
    Remote,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show page count, version and page size of a PDF
    Info {
        /// PDF file to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Extract pages of one PDF into a new document
    ///
    /// Examples:
    ///   pdfforge split report.pdf --pages "1-3,7"
    ///   pdfforge split report.pdf --order 3,1,2 -o reordered
    Split(SplitArgs),

    /// Concatenate PDFs in the order given
    ///
    /// Examples:
    ///   pdfforge merge a.pdf b.pdf -o both
    ///   pdfforge merge "chapter*.pdf"
    Merge {
        /// Input files or glob patterns, in output order
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<PathBuf>,

        /// Output file name (default: merged_<timestamp>.pdf)
        #[arg(short, long, value_name = "NAME")]
        output: Option<String>,
    },

    /// Render page previews as PNG files
    ///
    /// Unless pdfforge was built with the `mupdf` feature, previews are blank
    /// page-shaped placeholders that show none of the page content.
    Thumbnails {
        /// PDF file to render
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Preview width in pixels
        #[arg(long, value_name = "PX")]
        width: Option<u32>,

        /// Directory receiving the PNG files
        #[arg(long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show or edit processing history
    #[command(subcommand)]
    History(HistoryCommand),
}

/// Arguments of `split`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("selection").required(true).args(["pages", "order"]))]
pub struct SplitArgs {
    /// PDF file to split
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Page range, output in ascending order (e.g. "1-5,8,10-12")
    ///
    /// Malformed or out-of-range parts are ignored.
    #[arg(long, value_name = "RANGE")]
    pub pages: Option<String>,

    /// Pages in output order (e.g. 3,1,2)
    #[arg(long, value_name = "N,N,...", value_delimiter = ',')]
    pub order: Option<Vec<u32>>,

    /// Output file name (default: split_<input>.pdf)
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,
}

/// `history` subcommands.
#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List processed documents, newest first
    List,
    /// Delete a processed document record
    Delete {
        /// Record id
        #[arg(value_name = "ID")]
        id: String,
    },
}
