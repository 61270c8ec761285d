use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use transmem::corpus::TsvCorpus;
use transmem::{Deletion, Domain, LanguageIndex, LanguagePair, MemoryConfig, Sentence, TranslationMemory};

#[derive(Parser)]
#[command(name = "transmem")]
#[command(about = "Persistent translation memory", long_about = None)]
struct Args {
    /// Data directory for the document log and pointer tables
    #[arg(long, env = "TRANSMEM_DATA_DIR", default_value = "./data")]
    data_dir: PathBuf,

    /// Comma-separated list of supported directions, e.g. en:it,it:en
    #[arg(long, env = "TRANSMEM_LANGUAGES")]
    languages: String,

    /// JSON configuration file
    #[arg(long, env = "TRANSMEM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import a tab-separated corpus into a domain
    Import {
        #[arg(long)]
        domain: u64,
        #[arg(long)]
        corpus: PathBuf,
    },
    /// Add a single sentence pair
    Add {
        #[arg(long)]
        direction: LanguagePair,
        #[arg(long)]
        domain: u64,
        source: String,
        target: String,
    },
    /// Search prior translations of a sentence
    Search {
        #[arg(long)]
        direction: LanguagePair,
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        text: String,
    },
    /// Delete a domain as a stream event
    Delete {
        #[arg(long)]
        channel: u16,
        #[arg(long)]
        position: u64,
        #[arg(long)]
        domain: u64,
    },
    /// Print the last applied position of every channel
    Positions,
    /// Print metrics in the Prometheus text format
    Metrics,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MemoryConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {:?}", path))?,
        None => MemoryConfig::default(),
    }
    .with_data_dir(&args.data_dir);

    let languages = LanguageIndex::parse_list(&args.languages)?;
    if languages.is_empty() {
        anyhow::bail!("at least one language direction is required");
    }

    info!("Starting transmem v{} at {:?}", transmem::VERSION, args.data_dir);
    let tm = TranslationMemory::open(config, languages)?;

    match args.command {
        Command::Import { domain, corpus } => {
            let corpus = TsvCorpus::new(corpus);
            let generation = tm.bulk_add(&Domain::new(domain), &corpus)?;
            info!("Import committed at generation {}", generation);
        }
        Command::Add {
            direction,
            domain,
            source,
            target,
        } => {
            tm.add(
                &direction,
                &Domain::new(domain),
                &Sentence::from_text(&source),
                &Sentence::from_text(&target),
            )?;
        }
        Command::Search {
            direction,
            limit,
            json,
            text,
        } => {
            let results = tm.search(&direction, &Sentence::from_text(&text), None, limit)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for entry in &results {
                    println!(
                        "{:.4}\t{}\t{}\t{}",
                        entry.score, entry.domain, entry.source, entry.target
                    );
                }
            }
        }
        Command::Delete {
            channel,
            position,
            domain,
        } => {
            let applied = tm.on_delete(&Deletion::new(channel, position, domain))?;
            if !applied {
                info!("Deletion at {}:{} was already applied", channel, position);
            }
        }
        Command::Positions => {
            for (channel, position) in tm.latest_positions().iter() {
                println!("{}\t{}", channel, position);
            }
        }
        Command::Metrics => {
            print!("{}", tm.metrics().gather_text()?);
        }
    }

    tm.close();
    Ok(())
}
