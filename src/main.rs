//! dossier - organize, deduplicate, consolidate and search a corpus of
//! document folders.
//!
//! Usage:
//!   dossier --root DIR list                    List document folders
//!   dossier --root DIR create NAME -c CAT      Create a document folder
//!   dossier --root DIR duplicates              Find duplicate documents
//!   dossier --root DIR candidates              Suggest consolidations
//!   dossier --root DIR consolidate SRC... -t T Merge folders into one
//!   dossier --root DIR search QUERY            Search main files
//!   dossier --help                             Show help

mod settings;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use dossier_analyze::{AnalyzerConfig, ContentAnalyzer, DuplicateKind};
use dossier_core::Warning;
use dossier_merge::{ConsolidateOptions, Consolidator, Strategy};
use dossier_search::{SearchEngine, SearchOptions};
use dossier_store::DocumentStore;

use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "dossier",
    version,
    about = "Organize, deduplicate, consolidate and search document folders",
    long_about = "dossier manages a corpus where every document lives in its own folder \
                  next to an images/ directory.\n\n\
                  Point it at the corpus with --root or a settings file with --config. \
                  Set DOSSIER_LOG (e.g. DOSSIER_LOG=debug) for diagnostics on stderr."
)]
struct Cli {
    /// Corpus root directory (overrides the settings file)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List document folders
    List {
        /// Only this category
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// List categories
    Categories,

    /// Create a document folder
    Create {
        /// Document name (sanitized into the folder name)
        name: String,

        /// Category directory
        #[arg(short = 'C', long)]
        category: String,

        /// Read initial content from this file
        #[arg(long)]
        content: Option<PathBuf>,
    },

    /// Move a document folder
    Move {
        /// Folder to move
        source: PathBuf,

        /// New location
        destination: PathBuf,
    },

    /// Delete a document folder
    Delete {
        /// Folder to delete
        path: PathBuf,
    },

    /// Find exact and near-duplicate documents
    Duplicates {
        /// Minimum similarity for near-duplicates (0.0 - 1.0)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Skip documents shorter than this many characters
        #[arg(long)]
        min_length: Option<usize>,

        /// Only compare folder main files
        #[arg(long)]
        canonical_only: bool,
    },

    /// Suggest groups of documents worth merging
    Candidates,

    /// Merge document folders into a new one
    Consolidate {
        /// Source folders or main files
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Topic of the merged document
        #[arg(short, long)]
        topic: String,

        /// Layout: simple, structured or comprehensive
        #[arg(short, long)]
        strategy: Option<Strategy>,

        /// Category for the new folder
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Folder name for the new folder
        #[arg(short, long)]
        name: Option<String>,

        /// Show planned operations without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Search document main files
    Search {
        /// Search text (or pattern with --regex)
        query: String,

        /// Only this category
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Maximum results
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Treat the query as a regular expression
        #[arg(short = 'E', long)]
        regex: bool,

        /// Match case exactly
        #[arg(short = 's', long)]
        case_sensitive: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.config.as_deref(), cli.root)?;
    let store = DocumentStore::new(settings.store.clone())?;
    let format = cli.format;

    match cli.command {
        Command::List { category } => run_list(&store, category.as_deref(), format),
        Command::Categories => run_categories(&store, format),
        Command::Create {
            name,
            category,
            content,
        } => run_create(&store, &name, &category, content, format),
        Command::Move {
            source,
            destination,
        } => {
            let moved = store
                .move_document_folder(&source, &destination)
                .context("Move failed")?;
            println!("{}", moved.display());
            Ok(())
        }
        Command::Delete { path } => {
            store.delete_document_folder(&path).context("Delete failed")?;
            eprintln!("Deleted {}", path.display());
            Ok(())
        }
        Command::Duplicates {
            threshold,
            min_length,
            canonical_only,
        } => {
            let mut config = settings.analyzer.clone();
            if let Some(threshold) = threshold {
                if !(0.0..=1.0).contains(&threshold) {
                    bail!("threshold must be between 0 and 1, got {threshold}");
                }
                config.similarity_threshold = threshold;
            }
            if let Some(min_length) = min_length {
                config.min_content_length = min_length;
            }
            config.canonical_only |= canonical_only;
            run_duplicates(&store, config, format)
        }
        Command::Candidates => run_candidates(&store, settings.analyzer.clone(), format),
        Command::Consolidate {
            sources,
            topic,
            strategy,
            category,
            name,
            dry_run,
        } => {
            let mut options = settings.consolidate.clone();
            if let Some(strategy) = strategy {
                options.strategy = strategy;
            }
            options.category = category.or(options.category);
            options.target_name = name.or(options.target_name);
            options.dry_run |= dry_run;
            run_consolidate(&store, &settings, &sources, &topic, &options, format).await
        }
        Command::Search {
            query,
            category,
            limit,
            regex,
            case_sensitive,
        } => {
            let mut options = settings.search.clone();
            options.category = category.or(options.category);
            if let Some(limit) = limit {
                if limit == 0 {
                    bail!("limit must be at least 1");
                }
                options.limit = limit;
            }
            options.use_regex |= regex;
            options.case_sensitive |= case_sensitive;
            run_search(&store, &query, &options, format)
        }
    }
}

/// Install the stderr subscriber, filtered by `DOSSIER_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("DOSSIER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_list(store: &DocumentStore, category: Option<&str>, format: OutputFormat) -> Result<()> {
    let root = match category {
        Some(category) => match store.category_path(category) {
            Some(path) => path,
            None => bail!("Unknown category: {category}"),
        },
        None => store.root().to_path_buf(),
    };

    let scan = store.scan_document_folders(&root, true);
    let mut folders = Vec::with_capacity(scan.folders.len());
    let mut warnings = scan.warnings;
    for path in &scan.folders {
        match store.load_document_folder(path) {
            Ok(folder) => folders.push(folder),
            Err(e) => warnings.push(Warning::read_error(path, &e)),
        }
    }

    match format {
        OutputFormat::Text => {
            print_header(&format!(" {} - {} document folders", root.display(), folders.len()));
            for folder in &folders {
                println!(
                    " {:<40} {:<20} {:>10} {:>4} img",
                    truncate(&folder.name, 40),
                    truncate(&folder.category, 20),
                    format_size(folder.size),
                    folder.image_count
                );
            }
            print_warnings(&warnings);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&folders)?);
        }
    }
    Ok(())
}

fn run_categories(store: &DocumentStore, format: OutputFormat) -> Result<()> {
    let categories = store.list_categories().context("Cannot list categories")?;
    match format {
        OutputFormat::Text => {
            for category in &categories {
                println!("{category}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
    }
    Ok(())
}

fn run_create(
    store: &DocumentStore,
    name: &str,
    category: &str,
    content: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let content = match content {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?,
        None => String::new(),
    };
    let folder = store
        .create_document_folder(name, category, &content)
        .context("Create failed")?;

    match format {
        OutputFormat::Text => println!("{}", folder.display()),
        OutputFormat::Json => {
            let loaded = store.load_document_folder(&folder)?;
            println!("{}", serde_json::to_string_pretty(&loaded)?);
        }
    }
    Ok(())
}

fn run_duplicates(store: &DocumentStore, config: AnalyzerConfig, format: OutputFormat) -> Result<()> {
    eprintln!("Scanning {}...", store.root().display());
    let scan = store.scan_document_folders(store.root(), true);

    eprintln!(
        "Comparing {} documents (threshold {:.2})...",
        scan.folders.len(),
        config.similarity_threshold
    );
    let analyzer = ContentAnalyzer::with_config(store, config);
    let mut report = analyzer.find_duplicates(&scan.folders);
    report.warnings.extend(scan.warnings);

    match format {
        OutputFormat::Text => {
            print_header(" Duplicate Document Report");
            if !report.has_duplicates() {
                println!(" No duplicate documents found.");
            } else {
                println!(
                    " {} exact and {} similar groups among {} documents",
                    report.groups_of(DuplicateKind::Exact).count(),
                    report.groups_of(DuplicateKind::Similar).count(),
                    report.files_analyzed
                );
                println!();
                for (i, group) in report.groups.iter().enumerate() {
                    println!(
                        " Group {} ({}, {} documents, similarity {:.2}) -> {}",
                        i + 1,
                        group.kind,
                        group.count(),
                        group.similarity,
                        group.action
                    );
                    if let Some(hash) = &group.hash {
                        println!("   hash {}", hash.short());
                    }
                    for path in &group.paths {
                        println!("   {}", path.display());
                    }
                    println!();
                }
            }
            if report.files_skipped_short > 0 {
                println!(" {} documents too short to compare", report.files_skipped_short);
            }
            print_warnings(&report.warnings);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn run_candidates(store: &DocumentStore, config: AnalyzerConfig, format: OutputFormat) -> Result<()> {
    eprintln!("Scanning {}...", store.root().display());
    let scan = store.scan_document_folders(store.root(), true);
    let mut report = ContentAnalyzer::with_config(store, config).find_consolidation_candidates(&scan.folders);
    report.warnings.extend(scan.warnings);

    match format {
        OutputFormat::Text => {
            print_header(" Consolidation Candidates");
            if !report.has_candidates() {
                println!(" No consolidation candidates found.");
            }
            for candidate in &report.candidates {
                println!(
                    " \"{}\" - {} documents, {} words, similarity {:.2}, strategy {}",
                    candidate.recommended_title,
                    candidate.paths.len(),
                    candidate.total_words,
                    candidate.mean_similarity,
                    candidate.strategy
                );
                for path in &candidate.paths {
                    println!("   {}", path.display());
                }
                println!();
            }
            if report.files_skipped_short > 0 {
                println!(" {} documents too short to compare", report.files_skipped_short);
            }
            print_warnings(&report.warnings);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

async fn run_consolidate(
    store: &DocumentStore,
    settings: &Settings,
    sources: &[PathBuf],
    topic: &str,
    options: &ConsolidateOptions,
    format: OutputFormat,
) -> Result<()> {
    if options.enhance {
        bail!("Enhancement needs an enhancer service, which the CLI does not provide");
    }

    let mut consolidator = Consolidator::new(store).with_analyzer_config(settings.analyzer.clone());
    if !settings.categories.is_empty() {
        consolidator = consolidator.with_category_resolver(settings.categories.clone());
    }
    let report = consolidator
        .consolidate(sources, topic, options)
        .await
        .context("Consolidation failed")?;

    match format {
        OutputFormat::Text => {
            let verb = if report.dry_run { "Would create" } else { "Created" };
            print_header(&format!(" {verb} {}", report.target.display()));
            println!(" Title:      {}", report.title);
            println!(" Category:   {}", report.category);
            println!(" Strategy:   {}", report.strategy);
            println!(" Sources:    {}", report.sources.len());
            println!(" Words:      {}", report.total_words);
            println!(" Images:     {} copied", report.images_copied);
            if report.duplicates_removed > 0 {
                println!(" Duplicates: {} sentences removed", report.duplicates_removed);
            }
            for skipped in &report.skipped_sources {
                println!(" Skipped {}: {}", skipped.path.display(), skipped.reason);
            }
            if report.dry_run {
                println!();
                println!(" Planned operations:");
                for op in &report.operations {
                    println!("   {}", serde_json::to_string(op)?);
                }
            }
            print_warnings(&report.warnings);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn run_search(store: &DocumentStore, query: &str, options: &SearchOptions, format: OutputFormat) -> Result<()> {
    let response = SearchEngine::new(store)
        .search_documents(query, options)
        .context("Search failed")?;

    match format {
        OutputFormat::Text => {
            print_header(&format!(
                " {} of {} matches for \"{query}\" ({} folders scanned)",
                response.results.len(),
                response.total_matches,
                response.folders_scanned
            ));
            for (i, result) in response.results.iter().enumerate() {
                println!(
                    " {}. {} [{}] score {:.1}, {} matches",
                    i + 1,
                    result.folder.name,
                    result.folder.category,
                    result.score,
                    result.match_count
                );
                for excerpt in &result.excerpts {
                    let section = excerpt.section.as_deref().unwrap_or("-");
                    println!("    {:>5}  {}  ({section})", excerpt.line, excerpt.excerpt);
                }
                println!();
            }
            print_warnings(&response.warnings);
            print_warnings(&response.processing_errors);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}

fn print_header(title: &str) {
    println!();
    println!("{}", "─".repeat(70));
    println!("{title}");
    println!("{}", "─".repeat(70));
    println!();
}

fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("{} warning(s):", warnings.len());
    for warning in warnings {
        println!("   {}: {}", warning.path.display(), warning.message);
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
