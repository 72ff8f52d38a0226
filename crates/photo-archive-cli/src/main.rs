use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use photo_archive_core::discovery::{mimetype_of, DirectoryWalker, Node};
use photo_archive_core::persistence::SqliteRepository;
use photo_archive_core::{ArchiveEngine, Config};

#[derive(Parser)]
#[command(name = "photo-archive")]
#[command(about = "Content-addressed backup of photo directories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up a directory (or single file) to the archive volume
    Backup {
        /// Path of the directory or file to back up
        path: PathBuf,

        /// Recursively evaluate the directory
        #[arg(short = 'R', long)]
        recursive: bool,

        /// Maximum depth of recursion
        #[arg(short = 'd', long)]
        depth: Option<usize>,

        /// Root of the archive volume
        #[arg(long)]
        archive_root: Option<PathBuf>,

        /// Path to the archive database
        #[arg(long)]
        database: Option<PathBuf>,

        /// Abort the run once this many items have failed
        #[arg(long)]
        error_budget: Option<usize>,

        /// Path to configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Report the frequency of mimetypes in a directory
    Mimetypes {
        /// Path of the directory to evaluate
        path: PathBuf,

        /// Recursively evaluate the directory
        #[arg(short = 'R', long)]
        recursive: bool,

        /// Maximum depth of recursion
        #[arg(short = 'd', long)]
        depth: Option<usize>,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "photo-archive.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Backup {
            path,
            recursive,
            depth,
            archive_root,
            database,
            error_budget,
            config,
        } => {
            // Set up configuration
            let mut config = if let Some(config_path) = config {
                Config::from_file(&config_path)?
            } else {
                Config::default()
            };

            // Override config with command line arguments
            config.recursive = recursive;
            if depth.is_some() {
                config.max_depth = depth;
            }
            if let Some(root) = archive_root {
                config.archive_root = root;
            }
            if let Some(db) = database {
                config.database_path = db;
            }
            if error_budget.is_some() {
                config.error_budget = error_budget;
            }

            config.validate()?;

            // Backup runs log to a rotating file so console output stays
            // a clean summary
            photo_archive_core::logging::init_logger(&config.log_dir)
                .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

            let mut repo = SqliteRepository::open(&config.database_path)?;
            let engine = ArchiveEngine::new(config);

            info!("Starting backup of {}", path.display());
            let report = engine.run(&mut repo, &path)?;

            println!(
                "Backed up {} of {} images ({} duplicates, {} errors) in {:.3}s",
                report.success(),
                report.images,
                report.duplicates,
                report.errors,
                report.elapsed.as_secs_f64()
            );
            Ok(())
        }

        Commands::Mimetypes {
            path,
            recursive,
            depth,
        } => {
            env_logger::init();

            let walker = DirectoryWalker::new(&path, recursive, depth)?;

            let mut frequencies: HashMap<&'static str, usize> = HashMap::new();
            for node in walker.walk() {
                if let Node::File(file) = node {
                    let mimetype = mimetype_of(&file).unwrap_or("application/octet-stream");
                    *frequencies.entry(mimetype).or_insert(0) += 1;
                }
            }

            let mut counts: Vec<(&str, usize)> = frequencies.into_iter().collect();
            counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

            println!("Mimetypes discovered in {}", path.display());
            for (mimetype, count) in counts {
                println!("  {: >6} {}", count, mimetype);
            }
            Ok(())
        }

        Commands::GenerateConfig { path } => {
            env_logger::init();

            let config = Config::default();
            config.save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}
