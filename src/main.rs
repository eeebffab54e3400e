use clap::{Parser, Subcommand};
use doclib::config::{self, LibraryConfig};
use doclib::imaging::RustBackend;
use doclib::store::{ErrorLog, SqliteStore};
use doclib::view::{DisplayMode, DocumentView, ViewOutput, list_documents};
use doclib::{logging, output};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "doclib")]
#[command(about = "Document library: list files, catalog them, crop thumbnails")]
#[command(long_about = "\
Document library: list files, catalog them, crop thumbnails

The documents directory is the source of truth. Every pass lists it, keeps
files whose extension is allowed, and (in button mode) makes sure each one
has a row in the catalog database and, for images, a square thumbnail.

Layout:

  docs/
  ├── report.pdf          # cataloged
  ├── photo.jpg           # cataloged, thumbnail → docs/crop/photo.jpg
  ├── song.mp3            # not an allowed type, ignored
  └── crop/               # thumbnails (directories are never listed)

Catalog rows are created once and never updated. Thumbnails are rebuilt on
every pass.

Run 'doclib gen-config' to generate a documented doclib.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Documents directory (overrides documents_dir)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Thumbnail directory (overrides thumbnail_dir)
    #[arg(long, global = true)]
    thumbs: Option<PathBuf>,

    /// Allowed extensions, comma separated (overrides allowed_types)
    #[arg(long, value_delimiter = ',', global = true)]
    types: Option<Vec<String>>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the filtered filenames, one per line
    List,
    /// Synchronize the catalog and thumbnails, then print every file
    Sync {
        /// Print tiles as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the directory in a display mode ("list" or "button")
    Show {
        /// Mode name; defaults to `display` from the config
        mode: Option<String>,
        /// Print tiles as JSON instead of text (button mode)
        #[arg(long)]
        json: bool,
    },
    /// Print a stock doclib.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;
    match &cli.command {
        Command::List => show(&config, Some(DisplayMode::List), false)?,
        Command::Sync { json } => show(&config, Some(DisplayMode::Button), *json)?,
        Command::Show { mode, json } => {
            let name = mode.as_deref().unwrap_or(&config.display);
            show(&config, DisplayMode::from_name(name), *json)?;
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Load the config file and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<LibraryConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(source) = &cli.source {
        config.documents_dir = source.clone();
    }
    if let Some(thumbs) = &cli.thumbs {
        config.thumbnail_dir = thumbs.clone();
    }
    if let Some(types) = &cli.types {
        config.allowed_types = types.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Run one pass in `mode`. The catalog database is only opened for button
/// mode.
fn show(
    config: &LibraryConfig,
    mode: Option<DisplayMode>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match mode {
        Some(DisplayMode::List) => {
            // No catalog database in list mode; scan errors go to the flat log
            let error_log = ErrorLog::new(&config.store.error_log);
            let names = list_documents(&config.documents_dir, &config.allowed(), |e| {
                error_log.record(&e.to_string())
            });
            output::print_list(&names);
        }
        Some(DisplayMode::Button) => {
            let store = SqliteStore::open(&config.store)?;
            let backend = RustBackend::new();
            let shown = DocumentView::new(
                &store,
                &backend,
                config.allowed(),
                &config.documents_dir,
                config,
            )
            .show(mode)?;
            if let ViewOutput::Buttons { tiles, report } = shown {
                if json {
                    println!("{}", output::format_tiles_json(&tiles)?);
                } else {
                    output::print_buttons(&tiles, &report);
                }
            }
            store.close()?;
        }
        None => {
            tracing::info!("Unrecognized display mode, nothing to show");
        }
    }
    Ok(())
}
