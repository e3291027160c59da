use clap::{Parser, Subcommand};
use quire::artifact::{self, Artifact};
use quire::builder::{PageEntry, PageEntryBuilder};
use quire::{config, output};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Compile front-matter content files into an ordered collection")]
#[command(long_about = "\
Compile front-matter content files into an ordered collection

Each source file holds a header, a line with only ---, and a body:

  {title: \"Hello\", tags: [intro]}
  ---
  This is a markdown *document*.

Markdown bodies (.md, .markdown, .livemd) are rendered to HTML and fenced
code blocks are highlighted; other files keep their body as-is. The result
is written as one JSON file together with a snapshot of the sources, so
the next build only runs when something changed.

Project layout:

  quire.toml           # from = [...], as = \"...\" (see gen-config)
  posts/
  ├── hello.md
  └── notes.livemd

Set QUIRE_LOG=debug for per-file progress.

Run 'quire gen-config' to generate a documented quire.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding quire.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile sources into the output file when they changed
    Build {
        /// Compile even if the output is up to date
        #[arg(long)]
        force: bool,
    },
    /// Report whether a build is needed, without writing anything
    Check,
    /// List source files in compile order
    Sources,
    /// Print a stock quire.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    let root = cli.config;

    match cli.command {
        Command::Build { force } => {
            let config = config::load_config(&root)?;
            let publisher = config.publisher(&root)?;
            let output_path = config.output_in(&root);
            let settings_hash = config.settings_hash();

            let previous: Option<Artifact<PageEntry>> = Artifact::load(&output_path);
            let reason = artifact::rebuild_reason(
                previous.as_ref(),
                &settings_hash,
                publisher.patterns(),
                force,
            )?;

            match reason {
                None => output::print_up_to_date(publisher.name(), &output_path, &root),
                Some(reason) => {
                    if config.parallel {
                        init_thread_pool(&config);
                    }
                    let compiled = publisher.compile(&PageEntryBuilder)?;
                    let artifact = Artifact::new(compiled, settings_hash);
                    artifact.save(&output_path)?;
                    let collection = artifact.into_collection();
                    output::print_build_output(&collection, &reason, &output_path, &root);
                }
            }
        }
        Command::Check => {
            let config = config::load_config(&root)?;
            let output_path = config.output_in(&root);
            let previous: Option<Artifact<PageEntry>> = Artifact::load(&output_path);
            let reason = artifact::rebuild_reason(
                previous.as_ref(),
                &config.settings_hash(),
                &config.patterns_in(&root),
                false,
            )?;
            output::print_check_output(reason.as_ref(), &root);
            if !config.options.is_empty() {
                let keys: Vec<&str> = config.options.keys().map(String::as_str).collect();
                println!("Converter options: {}", keys.join(", "));
            }
        }
        Command::Sources => {
            let config = config::load_config(&root)?;
            let publisher = config.publisher(&root)?;
            let paths = publisher.sources()?;
            output::print_sources_output(&paths, &root);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr, filtered by `QUIRE_LOG` (default: warnings only).
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("QUIRE_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Initialize the rayon thread pool based on config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(config: &config::ContentConfig) {
    let threads = config::effective_threads(config);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
