use clap::{Args, Parser, Subcommand};
use enzprop::engine::config::ReloadMode;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "enzprop - Infer enzyme function (EC numbers) for unannotated proteins by label propagation over a domain-similarity network.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a protein table and report what would be loaded.
    Load(LoadArgs),
    /// Build the domain-similarity graph and write it as an edge list.
    Build(BuildArgs),
    /// Propagate labels over an existing edge list.
    Propagate(PropagateArgs),
    /// Build the graph and propagate labels in one go.
    Run(RunArgs),
    /// Show the stored prediction for one protein.
    Show(ShowArgs),
}

/// Arguments for the `load` subcommand.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Path to the UniProt-style TSV protein table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the UniProt-style TSV protein table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path of the edge list to write (CSV). An existing file is treated as the
    /// current graph and handled according to `--mode`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `propagate` subcommand.
#[derive(Args, Debug)]
pub struct PropagateArgs {
    /// Path to the UniProt-style TSV protein table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the edge list produced by `build`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub edges: PathBuf,

    /// Path of the prediction table to write (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the UniProt-style TSV protein table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path of the prediction table to write (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Also write the similarity graph as an edge list.
    #[arg(short, long, value_name = "PATH")]
    pub edges: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to a prediction table written by `propagate` or `run`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub predictions: PathBuf,

    /// Protein accession to look up.
    #[arg(required = true, value_name = "ID")]
    pub id: String,
}

/// Settings shared by every command that builds or propagates.
///
/// Precedence, lowest first: built-in defaults, the config file, `--set`
/// values, then the flags below (which also read their environment variables).
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Minimum Jaccard similarity for an edge, in (0, 1].
    #[arg(long, env = "SIMILARITY_THRESHOLD", value_name = "FLOAT")]
    pub similarity_threshold: Option<f64>,

    /// Minimum edge weight for a neighbor to vote, in [0, 1].
    #[arg(long, env = "MIN_EDGE_WEIGHT", value_name = "FLOAT")]
    pub min_edge_weight: Option<f64>,

    /// Minimum normalized vote for a label to be predicted, in [0, 1].
    #[arg(long, env = "CONFIDENCE_THRESHOLD", value_name = "FLOAT")]
    pub confidence_threshold: Option<f64>,

    /// Maximum number of labels predicted per protein.
    #[arg(long = "max-labels", env = "MAX_LABELS_PER_PROTEIN", value_name = "INT")]
    pub max_labels_per_protein: Option<usize>,

    /// Only use the first N proteins with domain annotations.
    #[arg(short = 'n', long = "limit", env = "PROTEIN_LIMIT", value_name = "INT")]
    pub protein_limit: Option<usize>,

    /// What to do with an existing graph: clear, skip or continue.
    #[arg(short, long, env = "RELOAD_MODE", value_name = "MODE")]
    pub mode: Option<ReloadMode>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S graph.edge-batch-size=5000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_overrides() {
        let cli = Cli::parse_from([
            "enzprop",
            "-vv",
            "run",
            "-i",
            "proteins.tsv",
            "-o",
            "predictions.csv",
            "--confidence-threshold",
            "0.5",
            "--mode",
            "clear",
            "-S",
            "graph.edge-batch-size=10",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected the run command");
        };
        assert_eq!(args.config.confidence_threshold, Some(0.5));
        assert_eq!(args.config.mode, Some(ReloadMode::Clear));
        assert_eq!(args.config.set_values, vec!["graph.edge-batch-size=10"]);
        assert!(args.edges.is_none());
    }

    #[test]
    fn show_takes_a_positional_id() {
        let cli = Cli::parse_from(["enzprop", "show", "-p", "out.csv", "Q9XYZ1"]);
        let Commands::Show(args) = cli.command else {
            panic!("expected the show command");
        };
        assert_eq!(args.id, "Q9XYZ1");
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["enzprop", "-q", "-v", "load", "-i", "x.tsv"]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_reload_mode_is_rejected() {
        let result = Cli::try_parse_from([
            "enzprop", "build", "-i", "in.tsv", "-o", "out.csv", "--mode", "wipe",
        ]);
        assert!(result.is_err());
    }
}
