use anyhow::{Context, Result};
use bibq::assembler::{PageRequest, ResultAssembler};
use bibq::config::AppConfig;
use bibq::engine::{IndexEngine, MemoryEngine, TrackingId};
use bibq::output;
use bibq::profile::Profile;
use bibq::query::{CqlQuery, QueryCompiler, QueryKind, Tokenizer};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Exit status for errors in the query text itself
const QUERY_ERROR_EXIT: i32 = 2;

#[derive(Parser)]
#[command(name = "bibq")]
#[command(about = "Compile CQL queries and assemble bibliographic search results")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to the app data directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a query
    Tokenize {
        query: String,

        /// Boolean keyword locale (en, da)
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Print the syntax tree of a query
    Parse { query: String },
    /// Print the engine query a CQL query compiles to
    Compile {
        query: String,

        /// Access profile to fuse into the query
        #[arg(short, long)]
        profile: Option<String>,

        /// Compile as a relation lookup
        #[arg(long)]
        relation: bool,
    },
    /// Run a query and print a page of works
    Search {
        query: String,

        #[arg(short, long)]
        profile: Option<String>,

        /// 1-based position of the first work
        #[arg(long, default_value_t = 1)]
        start: usize,

        /// Works per page
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Include hits outside the profile's visible collections
        #[arg(long)]
        all_objects: bool,

        /// Serve hits from a JSON file instead of the engine
        #[arg(long)]
        demo: Option<PathBuf>,
    },
    /// List configured profiles and their filters
    Profiles,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let color = !cli.no_color;

    match cli.command {
        Commands::Tokenize { query, locale } => {
            let mut config = config;
            if let Some(locale) = locale {
                config.keywords.locale = locale;
            }
            let tokenizer = config.tokenizer()?;
            cmd_tokenize(&tokenizer, &query, color)?;
        }
        Commands::Parse { query } => {
            let parsed = parse(&config, &query, color)?;
            let mut stdout = output::stdout(color);
            output::print_ast(&mut stdout, &parsed)?;
        }
        Commands::Compile {
            query,
            profile,
            relation,
        } => {
            cmd_compile(&config, &query, profile.as_deref(), relation, color)?;
        }
        Commands::Search {
            query,
            profile,
            start,
            rows,
            all_objects,
            demo,
        } => {
            let page = PageRequest::new(start, rows).with_all_objects(all_objects);
            cmd_search(&config, &query, profile.as_deref(), page, demo, color)?;
        }
        Commands::Profiles => {
            let catalog = config.field_catalog()?;
            let profiles = config.profiles(&catalog)?;
            let mut stdout = output::stdout(color);
            output::print_profiles(&mut stdout, &profiles)?;
        }
    }

    Ok(())
}

/// Show query errors with a caret and exit; pass everything else up
fn check<T>(result: bibq::Result<T>, input: &str, color: bool) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) if err.is_query_error() => {
            let mut stderr = output::stderr(color);
            output::print_diagnostic(&mut stderr, input, &err)?;
            stderr.flush()?;
            std::process::exit(QUERY_ERROR_EXIT);
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_tokenize(tokenizer: &Tokenizer, query: &str, color: bool) -> Result<()> {
    let tokens = check(tokenizer.tokenize(query), query, color)?;
    let mut stdout = output::stdout(color);
    output::print_tokens(&mut stdout, &tokens)?;
    Ok(())
}

fn parse(config: &AppConfig, query: &str, color: bool) -> Result<CqlQuery> {
    let parser = config.parser()?;
    check(parser.parse(query), query, color)
}

fn resolve_profile(config: &AppConfig, name: Option<&str>) -> Result<Arc<Profile>> {
    match name {
        None => Ok(Arc::new(Profile::unrestricted())),
        Some(name) => {
            let catalog = config.field_catalog()?;
            let profiles = config.profiles(&catalog)?;
            Ok(profiles.get(name)?)
        }
    }
}

fn cmd_compile(
    config: &AppConfig,
    query: &str,
    profile: Option<&str>,
    relation: bool,
    color: bool,
) -> Result<()> {
    let parsed = parse(config, query, color)?;
    let catalog = config.field_catalog()?;
    let profile = resolve_profile(config, profile)?;
    let compiler = QueryCompiler::new(&catalog);

    let compiled = if relation {
        compiler.compile_as(&parsed, &profile, QueryKind::Relation)
    } else {
        compiler.compile(&parsed, &profile)
    };
    let compiled = check(compiled, query, color)?;

    println!("{}", compiled.render());
    if let Some(sort) = compiled.render_sort() {
        println!("sort: {}", sort);
    }
    Ok(())
}

fn cmd_search(
    config: &AppConfig,
    query: &str,
    profile: Option<&str>,
    page: PageRequest,
    demo: Option<PathBuf>,
    color: bool,
) -> Result<()> {
    let parsed = parse(config, query, color)?;
    let catalog = config.field_catalog()?;
    let profile = resolve_profile(config, profile)?;
    let compiled = check(
        QueryCompiler::new(&catalog).compile(&parsed, &profile),
        query,
        color,
    )?;

    let engine: Box<dyn IndexEngine> = match demo {
        Some(path) => Box::new(
            MemoryEngine::from_json_file(&path)
                .with_context(|| format!("Failed to load demo hits from {}", path.display()))?,
        ),
        None => http_engine(config)?,
    };

    let assembler = ResultAssembler::new(engine, config.paging);
    let assembly = assembler
        .fetch_works(&compiled, &profile, page, TrackingId::new(&tracking_base()))
        .context("Search failed")?;

    let mut stdout = output::stdout(color);
    output::print_assembly(&mut stdout, page.start, &assembly)?;
    Ok(())
}

#[cfg(feature = "http")]
fn http_engine(config: &AppConfig) -> Result<Box<dyn IndexEngine>> {
    let engine = bibq::engine::SolrEngine::new(config.engine.clone())?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "http"))]
fn http_engine(_config: &AppConfig) -> Result<Box<dyn IndexEngine>> {
    anyhow::bail!("built without the http feature; use --demo <FILE>")
}

/// Tracking base unique to this invocation
fn tracking_base() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("bibq-{}-{}", std::process::id(), millis)
}

