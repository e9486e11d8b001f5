use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use itertools::Itertools;
use rayon::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tmclust::core::align::tmalign::TmAligner;
use tmclust::core::io::pdb;
use tmclust::core::models::store::StructureStore;
use tmclust::engine::config::{detected_threads, score_mode_from_index, ClusterConfig};
use tmclust::engine::hints::InitHints;
use tmclust::engine::state::Clustering;
use tmclust::workflows;
use tracing::{debug, info, warn};

pub fn run(args: Cli) -> Result<()> {
    let config = build_config(&args)?;

    info!(files = args.inputs.len(), "loading input structures");
    let mut store = load_structures(&args.inputs)?;
    if store.is_empty() {
        return Err(CliError::Argument(
            "no chains could be parsed from the input files".to_string(),
        ));
    }
    info!(chains = store.len(), "structures loaded");

    let progress = CliProgressHandler::new();
    let clustering =
        workflows::cluster::run(&mut store, &TmAligner::new(), &config, &progress)?;

    write_clusters(&clustering, &store, args.output.as_deref())?;
    println!(
        "{} chains grouped into {} clusters.",
        store.len(),
        clustering.len()
    );
    Ok(())
}

fn build_config(args: &Cli) -> Result<ClusterConfig> {
    let score_mode = score_mode_from_index(args.score_mode)
        .map_err(|e| CliError::Engine(e.into()))?;

    let hints = match &args.init {
        Some(path) => InitHints::from_path(path).map_err(|source| CliError::FileParsing {
            path: path.clone(),
            source: source.into(),
        })?,
        None => InitHints::default(),
    };

    let config = ClusterConfig {
        tm_cutoff: args.tm_cut,
        score_mode,
        threads: args.threads.unwrap_or_else(detected_threads),
        fast: args.fast,
        prefilter: !args.no_prefilter,
        hints,
    };
    config.validate().map_err(|e| CliError::Engine(e.into()))?;
    Ok(config)
}

/// Reads every input file, in parallel but preserving file order so the
/// load order (and with it every tie-break downstream) stays
/// deterministic. Unreadable files are skipped with a warning; an empty
/// overall result is the caller's problem.
fn load_structures(paths: &[PathBuf]) -> Result<StructureStore> {
    let parsed: Vec<_> = paths
        .par_iter()
        .map(|path| pdb::read_chains(path))
        .collect();

    let mut store = StructureStore::new();
    for (path, result) in paths.iter().zip(parsed) {
        match result {
            Ok(chains) => {
                if chains.is_empty() {
                    warn!(path = %path.display(), "no usable chains in file");
                }
                for chain in chains {
                    debug!(id = %chain.id, residues = chain.len(), mol = %chain.mol, "parsed chain");
                    store.push(chain);
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "cannot parse file, skipping");
            }
        }
    }
    Ok(store)
}

fn render_clusters(clustering: &Clustering, store: &StructureStore) -> String {
    let mut text = clustering
        .clusters
        .iter()
        .map(|cluster| {
            std::iter::once(cluster.representative)
                .chain(cluster.members.iter().copied())
                .map(|chain| store.chain(chain).id.as_str())
                .join("\t")
        })
        .join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

fn write_clusters(
    clustering: &Clustering,
    store: &StructureStore,
    output: Option<&Path>,
) -> Result<()> {
    let text = render_clusters(clustering, store);
    match output {
        Some(path) => {
            fs::write(path, &text)?;
            info!(path = %path.display(), clusters = clustering.len(), "cluster table written");
        }
        None => {
            std::io::stdout().write_all(text.as_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tmclust::core::models::chain::{ChainRecord, MoleculeType, ResidueData};
    use tmclust::engine::score::ScoreMode;
    use tmclust::engine::state::Cluster;

    fn chain(id: &str, len: usize) -> ChainRecord {
        ChainRecord::new(
            id.to_string(),
            MoleculeType::Protein,
            ResidueData {
                seq: vec![b'A'; len],
                sec: vec![b'C'; len],
                coords: (0..len)
                    .map(|i| nalgebra::Point3::new(i as f64, 0.0, 0.0))
                    .collect(),
            },
        )
    }

    #[test]
    fn render_puts_the_representative_first() {
        let store = StructureStore::from_chains(vec![
            chain("a", 10),
            chain("b", 9),
            chain("c", 8),
        ]);
        let clustering = Clustering {
            clusters: vec![
                Cluster {
                    representative: 0,
                    members: vec![2, 1],
                },
                Cluster {
                    representative: 1,
                    members: vec![],
                },
            ],
        };
        // Index 1 appearing twice is not a valid partition; only the
        // formatting is under test here.
        assert_eq!(render_clusters(&clustering, &store), "a\tc\tb\nb\n");
    }

    #[test]
    fn render_of_empty_clustering_is_empty() {
        let store = StructureStore::from_chains(vec![]);
        let clustering = Clustering { clusters: vec![] };
        assert_eq!(render_clusters(&clustering, &store), "");
    }

    #[test]
    fn build_config_maps_cli_arguments() {
        let args = Cli::parse_from([
            "tmclust",
            "in.pdb",
            "--tm-cut",
            "0.7",
            "-s",
            "4",
            "-t",
            "3",
            "--fast",
            "--no-prefilter",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.tm_cutoff, 0.7);
        assert_eq!(config.score_mode, ScoreMode::Harmonic);
        assert_eq!(config.threads, 3);
        assert!(config.fast);
        assert!(!config.prefilter);
    }

    #[test]
    fn build_config_rejects_bad_cutoff() {
        let args = Cli::parse_from(["tmclust", "in.pdb", "--tm-cut", "0.3"]);
        assert!(matches!(
            build_config(&args),
            Err(CliError::Engine(_))
        ));
    }

    #[test]
    fn build_config_rejects_bad_score_mode() {
        let args = Cli::parse_from(["tmclust", "in.pdb", "-s", "7"]);
        assert!(matches!(
            build_config(&args),
            Err(CliError::Engine(_))
        ));
    }

    #[test]
    fn load_structures_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.pdb");
        let mut file = std::fs::File::create(&good).unwrap();
        for i in 0..3 {
            writeln!(
                file,
                "ATOM  {:>5}  CA  ALA A{:>4}    {:8.3}{:8.3}{:8.3}  1.00  0.00",
                i + 1,
                i + 1,
                i as f64 * 3.8,
                0.0,
                0.0
            )
            .unwrap();
        }
        let missing = dir.path().join("missing.pdb");

        let store = load_structures(&[good, missing]).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.chain(0).id, "good.pdb:A");
    }
}
