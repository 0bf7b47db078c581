use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::store::{IndexDirection, IndexSpec};

pub const DEFAULT_CONFIG: &str = "./demos/.config-example.yaml";

#[derive(Debug, Parser)]
#[command(
    name = "didyoumean",
    about = "Fuzzy \"did you mean\" search over a MongoDB collection"
)]
pub struct Cli {
    /// Configuration file (the sample ships under `demos/`, since Cargo
    /// reserves `examples/` for example targets)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Per-operation timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    pub timeout: u64,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// With no command, connect to the database and exit.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search a collection
    Search(SearchArgs),
    /// Upsert documents from a JSON array file
    Import(ImportArgs),
    /// Create a secondary index on a collection
    Index(IndexArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query, used as a case-insensitive pattern
    pub query: String,

    /// Collection to search
    #[arg(short = 'c', long, default_value = "movies")]
    pub collection: String,

    /// Field to match against (can be repeated)
    #[arg(
        short = 'f',
        long = "field",
        default_values_t = [String::from("title"), String::from("keywords")]
    )]
    pub fields: Vec<String>,

    /// Page number, starting at 1
    #[arg(short = 'p', long, default_value = "1")]
    pub page: u64,

    /// Documents per page
    #[arg(short = 'n', long, default_value = "10")]
    pub page_size: u64,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Import --

#[derive(Debug, Parser)]
pub struct ImportArgs {
    /// JSON file holding an array of documents
    pub file: PathBuf,

    /// Target collection
    #[arg(short = 'c', long, default_value = "movies")]
    pub collection: String,
}

// -- Index --

#[derive(Debug, Parser)]
pub struct IndexArgs {
    /// Target collection
    #[arg(short = 'c', long, default_value = "movies")]
    pub collection: String,

    /// Index key as `field` or `field:desc` (can be repeated, in order)
    #[arg(short = 'k', long = "key", required = true)]
    pub keys: Vec<String>,

    /// Reject duplicate key values
    #[arg(long)]
    pub unique: bool,

    /// Explicit index name
    #[arg(long)]
    pub name: Option<String>,
}

impl IndexArgs {
    pub fn spec(&self) -> IndexSpec {
        let mut spec = self.keys.iter().fold(IndexSpec::new(), |spec, key| {
            let (field, dir) = parse_key(key);
            spec.key(field, dir)
        });
        if self.unique {
            spec = spec.unique(true);
        }
        if let Some(name) = &self.name {
            spec = spec.named(name.clone());
        }
        spec
    }
}

fn parse_key(key: &str) -> (&str, IndexDirection) {
    match key.rsplit_once(':') {
        Some((field, dir)) if dir.eq_ignore_ascii_case("desc") => {
            (field, IndexDirection::Descending)
        }
        Some((field, dir)) if dir.eq_ignore_ascii_case("asc") => {
            (field, IndexDirection::Ascending)
        }
        _ => (key, IndexDirection::Ascending),
    }
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "didyoumean",
            &mut std::io::stdout(),
        );
    }
}
