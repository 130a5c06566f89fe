use anyhow::Context;
use clap::{ArgAction, Parser};
use fatcount_core::{solve, write_csv_file, SolverConfig, OUTPUT_FILE};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fatcount")]
#[command(about = "Find how many clusters fit next to two copies of a FAT", long_about = None)]
struct Cli {
    /// JSON file with solver settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Total volume size in bytes
    #[arg(long)]
    max_fs_size: Option<u64>,

    /// Bytes per cluster
    #[arg(long)]
    cluster_size: Option<u64>,

    /// Bytes reserved for the header in front of the first FAT
    #[arg(long)]
    struct_size: Option<u64>,

    /// Bytes per FAT entry
    #[arg(long)]
    fat_row_size: Option<u64>,

    /// Give up after this many iterations
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn solver_config(&self) -> anyhow::Result<SolverConfig> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::read_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => SolverConfig::default(),
        };

        if let Some(v) = self.max_fs_size {
            config.max_fs_size = v;
        }
        if let Some(v) = self.cluster_size {
            config.cluster_size = v;
        }
        if let Some(v) = self.struct_size {
            config.struct_size = v;
        }
        if let Some(v) = self.fat_row_size {
            config.fat_row_size = v;
        }
        if self.max_iterations.is_some() {
            config.max_iterations = self.max_iterations;
        }

        config.validate()?;
        Ok(config)
    }
}

fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.solver_config()?;
    tracing::info!(?config, "Solving FAT size");

    let solution = solve(&config)?;
    let layout = solution.layout()?;

    let output = Path::new(OUTPUT_FILE);
    write_csv_file(output, &solution.rows)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if cli.json {
        let summary = serde_json::json!({
            "solution": solution,
            "layout": layout,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let last = solution
        .final_row()
        .ok_or_else(|| anyhow::anyhow!("Solver returned no iterations"))?;
    println!("Converged after {} iteration(s)", solution.iterations());
    println!("  Cluster count: {}", last.cluster_count);
    println!("  Cluster space: {} bytes", last.cluster_space);
    println!("  Both FAT size: {} bytes", last.both_fat_size);
    println!();
    println!("Layout:");
    println!("  FAT #1 at: {}", layout.fat01_start);
    println!("  FAT #2 at: {}", layout.fat02_start);
    println!("  Data at:   {}", layout.data_start);
    println!("  Unused:    {} bytes ({} spare clusters)", layout.unused, layout.spare_clusters());
    println!();
    println!("Trace written to {}", output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fatcount_core::FatCountError;

    fn write_config(dir: &tempfile::TempDir, json: &str) -> String {
        let path = dir.path().join("solver.json");
        std::fs::write(&path, json).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_no_arguments_uses_defaults() {
        let cli = Cli::parse_from(["fatcount"]);
        assert_eq!(cli.solver_config().unwrap(), SolverConfig::default());
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_json_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{ "cluster_size": 512, "max_iterations": 10 }"#);

        let config = Cli::parse_from(["fatcount", "--config", path.as_str()]).solver_config().unwrap();
        assert_eq!(config.cluster_size, 512);
        assert_eq!(config.max_iterations, Some(10));
        assert_eq!(config.max_fs_size, SolverConfig::default().max_fs_size);
    }

    #[test]
    fn test_flags_override_json() {
        let dir = tempfile::tempdir().unwrap();

        // The file alone is invalid, the merged settings are not
        let path = write_config(&dir, r#"{ "cluster_size": 0, "fat_row_size": 2 }"#);
        let config = Cli::parse_from(["fatcount", "--config", path.as_str(), "--cluster-size", "4000"])
            .solver_config()
            .unwrap();
        assert_eq!(config.cluster_size, 4000);
        assert_eq!(config.fat_row_size, 2);

        let path = write_config(&dir, r#"{ "max_fs_size": 16 }"#);
        let config = Cli::parse_from(["fatcount", "--config", path.as_str(), "--struct-size", "0"])
            .solver_config()
            .unwrap();
        assert_eq!(config.max_fs_size, 16);
        assert_eq!(config.struct_size, 0);
    }

    #[test]
    fn test_max_iterations_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{ "max_iterations": 10 }"#);

        let config = Cli::parse_from(["fatcount", "--config", path.as_str(), "--max-iterations", "3"])
            .solver_config()
            .unwrap();
        assert_eq!(config.max_iterations, Some(3));

        // Without the flag the file value stays
        let config = Cli::parse_from(["fatcount", "--config", path.as_str()]).solver_config().unwrap();
        assert_eq!(config.max_iterations, Some(10));
    }

    #[test]
    fn test_invalid_merged_config_rejected() {
        let err = Cli::parse_from(["fatcount", "--cluster-size", "0"])
            .solver_config()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FatCountError>(),
            Some(FatCountError::ZeroClusterSize)
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, r#"{ "struct_size": 64 }"#);
        let err = Cli::parse_from(["fatcount", "--config", path.as_str(), "--max-fs-size", "32"])
            .solver_config()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FatCountError>(),
            Some(FatCountError::StructExceedsVolume { struct_size: 64, max_fs_size: 32 })
        ));
    }

    #[test]
    fn test_unreadable_config_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json").to_string_lossy().into_owned();
        let result = Cli::parse_from(["fatcount", "--config", missing.as_str()]).solver_config();
        assert!(result.is_err());

        let path = write_config(&dir, "not json");
        let result = Cli::parse_from(["fatcount", "--config", path.as_str()]).solver_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Cli::parse_from(["fatcount"]).verbose, 0);
        assert_eq!(Cli::parse_from(["fatcount", "-vv"]).verbose, 2);

        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(1), "info");
        assert_eq!(log_level(2), "debug");
        assert_eq!(log_level(3), "trace");
        assert_eq!(log_level(9), "trace");
    }
}
