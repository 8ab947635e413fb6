//! muso - personal music library curation tool
//!
//! Resolves canonical metadata for downloaded audio files against the
//! MusicBrainz catalog, embeds it, and files tracks into a genre/album
//! library layout. Downloading itself is handled by external tooling;
//! muso picks up from a staging directory of audio files.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use muso::catalog::CatalogClient;
use muso::genre::GenreMap;
use muso::organize::Organizer;
use muso::prompt::ConsolePrompter;
use muso::resolve::{ResolutionMode, Resolver};
use muso::scanner::FileScanner;
use muso::{manifest, tags};
use muso_common::config::{self, TomlConfig};
use muso_common::Mbid;

/// Command-line arguments for muso
#[derive(Parser, Debug)]
#[command(name = "muso")]
#[command(about = "Personal music library curation tool")]
#[command(version)]
struct Cli {
    /// Config file path (default: platform config dir)
    #[arg(long, global = true, env = "MUSO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve catalog metadata for staged files and embed it
    Identify {
        /// Directory of files to identify (default: staging directory)
        dir: Option<PathBuf>,

        /// Match all files against this release's tracks (release ID)
        #[arg(long, conflicts_with = "manifest")]
        album: Option<String>,

        /// Batch manifest pre-seeding identifiers and genres
        #[arg(long)]
        manifest: Option<PathBuf>,
    },

    /// Move tagged files into the genre/album library layout
    Organize {
        /// Directory to organize (default: staging directory)
        dir: Option<PathBuf>,

        /// Library root receiving the organized layout
        #[arg(long, env = "MUSO_LIBRARY_ROOT")]
        library: Option<PathBuf>,

        /// Descend into subdirectories
        #[arg(long)]
        recursive: bool,
    },

    /// Print the tags embedded in a file
    Tags {
        file: PathBuf,
    },

    /// Clear one tag field across a directory
    Clear {
        dir: PathBuf,

        /// Which field to clear
        #[arg(long, value_enum)]
        field: ClearField,

        /// Descend into subdirectories
        #[arg(long)]
        recursive: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ClearField {
    Genre,
    Date,
}

impl From<ClearField> for tags::TagField {
    fn from(field: ClearField) -> Self {
        match field {
            ClearField::Genre => tags::TagField::Genre,
            ClearField::Date => tags::TagField::Date,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => TomlConfig::load_from(path)?,
        None => TomlConfig::load()?,
    };

    match cli.command {
        Command::Identify { dir, album, manifest } => {
            identify(&config, dir, album, manifest).await?;
        }
        Command::Organize { dir, library, recursive } => {
            organize(&config, dir, library, recursive)?;
        }
        Command::Tags { file } => {
            print_tags(&file)?;
        }
        Command::Clear { dir, field, recursive } => {
            clear_field(&dir, field.into(), recursive)?;
        }
    }

    Ok(())
}

async fn identify(
    config: &TomlConfig,
    dir: Option<PathBuf>,
    album: Option<String>,
    manifest_path: Option<PathBuf>,
) -> Result<()> {
    let dir = dir.unwrap_or_else(|| config::resolve_staging_dir(None, config));
    let genre_map = GenreMap::with_overrides(&config.genres);
    let catalog = CatalogClient::new(&config::user_agent(config), genre_map)?;
    let prompter = ConsolePrompter::default();
    let resolver = Resolver::new(&catalog, &prompter);

    let summary = if let Some(manifest_path) = manifest_path {
        let entries = manifest::parse_manifest(&manifest_path)?;
        resolver.identify_from_manifest(&dir, &entries).await?
    } else if let Some(album) = album {
        let release_id = Mbid::parse(&album).map_err(|reason| anyhow!("--album: {}", reason))?;
        resolver
            .identify_directory(&dir, &ResolutionMode::Album(release_id))
            .await?
    } else {
        resolver
            .identify_directory(&dir, &ResolutionMode::Search)
            .await?
    };

    info!(
        resolved = summary.resolved,
        skipped = summary.skipped,
        "identification complete"
    );
    Ok(())
}

fn organize(
    config: &TomlConfig,
    dir: Option<PathBuf>,
    library: Option<PathBuf>,
    recursive: bool,
) -> Result<()> {
    let root = config::resolve_library_root(library.as_deref(), config);
    let dir = dir.unwrap_or_else(|| config::resolve_staging_dir(None, config));

    let summary = Organizer::new(root).organize_directory(&dir, recursive)?;
    info!(
        sorted = summary.sorted,
        missing = summary.missing,
        unchanged = summary.unchanged,
        failed = summary.failed,
        "organization complete"
    );
    Ok(())
}

fn print_tags(file: &std::path::Path) -> Result<()> {
    let tag_map = tags::read_tags(file)?;
    if tag_map.is_empty() {
        println!("{}: no tags", file.display());
        return Ok(());
    }
    for (field, value) in &tag_map {
        println!("{}: {}", field, value);
    }
    Ok(())
}

fn clear_field(dir: &std::path::Path, field: tags::TagField, recursive: bool) -> Result<()> {
    let scanner = if recursive {
        FileScanner::recursive()
    } else {
        FileScanner::flat()
    };

    let mut cleared = 0usize;
    for file in scanner.scan(dir)? {
        match tags::clear_field(&file, field) {
            Ok(()) => cleared += 1,
            Err(err) => warn!(file = %file.display(), error = %err, "failed to clear field"),
        }
    }
    info!(field = %field, cleared, "clear complete");
    Ok(())
}
