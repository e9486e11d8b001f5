use clap::Parser;
use std::path::PathBuf;

const ABOUT: &str = "tmclust - sequence-independent clustering of protein and RNA structures by TM-score";
const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(version, about = ABOUT, help_template = HELP_TEMPLATE)]
pub struct Cli {
    /// Input PDB files; every chain of every file enters the clustering.
    #[arg(required = true, value_name = "PDB", num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// TM-score cutoff in the range of [0.45, 1) for considering two
    /// structures similar.
    #[arg(long = "tm-cut", value_name = "FLOAT", default_value_t = 0.5)]
    pub tm_cut: f64,

    /// Which TM-score to use when comparing structures of different
    /// lengths:
    ///
    ///   1: the larger score, i.e. normalized by the shorter length
    ///   2: the smaller score, i.e. normalized by the longer length
    ///   3: average of the two scores
    ///   4: harmonic average of the two scores
    ///   5: geometric average of the two scores
    ///   6: root mean square of the two scores
    #[arg(
        short = 's',
        long = "score-mode",
        value_name = "1-6",
        default_value_t = 2,
        verbatim_doc_comment
    )]
    pub score_mode: u8,

    /// Number of worker threads racing the candidates of each query.
    /// Defaults to the number of available logical cores.
    #[arg(short = 't', long, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Fast but slightly inaccurate first-tier alignment for every pair.
    #[arg(long)]
    pub fast: bool,

    /// Disable the heuristic weighted-RMSD candidate pre-filter.
    #[arg(long)]
    pub no_prefilter: bool,

    /// Tentative clustering hints: one tab-separated group of chain
    /// identifiers per line. Hinted chains are tested first.
    #[arg(long, value_name = "PATH")]
    pub init: Option<PathBuf>,

    /// Write the cluster table to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}
