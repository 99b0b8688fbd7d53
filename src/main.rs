use std::process::ExitCode;

use clap::Parser;
use gnucash::{
    config::{CliArgs, Command, Config, LoggingConfig},
    manifest::{BindingManifest, HeaderGroup},
    Result,
};
use prettytable::{row, Table};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.logging);

    match run(&cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(command: &Command, config: &Config) -> Result<()> {
    match command {
        Command::Wrapper => {
            print!("{}", config.manifest()?.render_wrapper_header());
        }
        Command::Manifest { json } => {
            let manifest = config.manifest()?;
            if *json {
                let out = serde_json::to_string_pretty(&manifest)
                    .map_err(|e| gnucash::Error::Other(e.to_string()))?;
                println!("{}", out);
            } else {
                print_manifest(&manifest);
            }
        }
        Command::Check => check(config)?,
        #[cfg(feature = "engine")]
        Command::Tree { file } => {
            let book = engine::load(file)?;
            let stats = gnucash::reports::TreeStats::collect(&book.root);
            print!("{}", gnucash::reports::render_tree(&book.root));
            println!();
            println!("Accounts: {}  Max depth: {}", stats.total_accounts, stats.max_depth);
            for (kind, count) in &stats.by_kind {
                println!("  {:<12} {}", kind, count);
            }
        }
        #[cfg(feature = "engine")]
        Command::BalanceSheet { file } => {
            let book = engine::load(file)?;
            print!("{}", gnucash::reports::BalanceSheet::from_book(&book).render());
        }
        #[cfg(feature = "engine")]
        Command::Export { file, account, output } => {
            engine::export(file, account, output.as_deref())?;
        }
        #[cfg(feature = "engine")]
        Command::Search { file, term, limit } => {
            let book = engine::load(file)?;
            let hits = gnucash::reports::search(&book, term.as_deref(), Some(*limit));
            tracing::info!(hits = hits.len(), "Search finished");
            print!("{}", gnucash::reports::render_hits(&hits));
        }
        #[cfg(feature = "engine")]
        Command::Reconcile { file, account } => {
            let book = engine::load(file)?;
            let account = engine::find_account(&book, account)?;
            print!("{}", gnucash::reports::ReconcileReport::from_account(account).render());
        }
        #[cfg(feature = "engine")]
        Command::Analyze { file, account } => {
            let book = engine::load(file)?;
            let account = engine::find_account(&book, account)?;
            print!("{}", gnucash::reports::AccountAnalysis::from_account(account).render());
        }
        #[cfg(feature = "engine")]
        Command::Prices { file, commodity } => {
            let book = engine::load(file)?;
            let prices: Vec<_> = match commodity {
                Some(c) => book.prices_for(c).into_iter().cloned().collect(),
                None => book.prices.clone(),
            };
            print!("{}", gnucash::reports::render_prices(&prices));
        }
    }
    Ok(())
}

fn print_manifest(manifest: &BindingManifest) {
    let mut table = Table::new();
    table.add_row(row![b->"Group", b->"Header"]);
    for group in HeaderGroup::ALL {
        for header in manifest.headers_in(group) {
            table.add_row(row![group.label(), header.name]);
        }
    }
    table.printstd();

    let lists = [
        ("Allowed types", &manifest.allowlist_types),
        ("Allowed functions", &manifest.allowlist_functions),
        ("Blocked types", &manifest.blocklist_types),
        ("Rustified enums", &manifest.rustified_enums),
    ];
    for (label, patterns) in lists {
        println!("{}: {}", label, patterns.join(", "));
    }
}

fn check(config: &Config) -> Result<()> {
    let manifest = config.manifest()?;
    let layout = config.layout();
    tracing::info!(src = %layout.src_dir.display(), build = %layout.build_dir.display(), "Checking source layout");

    let located = layout.locate(&manifest)?;
    let mut table = Table::new();
    table.add_row(row![b->"Header", b->"Found at"]);
    for header in &located {
        table.add_row(row![header.name, header.path.display()]);
    }
    table.printstd();
    println!("Library directory: {}", layout.lib_dir().display());
    Ok(())
}

#[cfg(feature = "engine")]
mod engine {
    use std::{
        fs::File,
        io::{BufWriter, Write},
        path::Path,
    };

    use gnucash::{reports, AccountSnapshot, BookSnapshot, Error, Result, Session, SessionOpenMode};

    pub fn load(file: &str) -> Result<BookSnapshot> {
        tracing::info!(file, "Opening book");
        let mut session = Session::open(file, SessionOpenMode::SESSION_READ_ONLY)?;
        let book = session.book().ok_or(Error::NullPointer("qof_session_get_book"))?;
        let snapshot = book.snapshot()?;
        session.end();
        Ok(snapshot)
    }

    pub fn find_account<'a>(book: &'a BookSnapshot, path: &str) -> Result<&'a AccountSnapshot> {
        book.root
            .lookup_path(path)
            .ok_or_else(|| Error::AccountNotFound(path.to_string()))
    }

    pub fn export(file: &str, account_path: &str, output: Option<&Path>) -> Result<()> {
        let book = load(file)?;
        let account = find_account(&book, account_path)?;

        let rows = match output {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                let rows = reports::export_csv(account, &mut writer)?;
                writer.flush()?;
                rows
            }
            None => reports::export_csv(account, &mut std::io::stdout().lock())?,
        };
        tracing::info!(account = account_path, rows, "Export finished");
        Ok(())
    }
}
