use anyhow::Result;
use tracing_subscriber::EnvFilter;

use fintrack::settings::{Backend, Settings};
use fintrack::store::{MemoryStore, SqliteStore, Storage};
use fintrack::{run, Ledger};

fn main() -> Result<()> {
    let settings = Settings::load()?;
    init_logging(&settings);

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let backend = if take_flag(&mut args, "--memory") {
        Backend::Memory
    } else {
        settings.backend
    };

    let store = open_store(backend, &settings)?;
    let mut ledger = Ledger::new(store);
    if settings.seed_defaults {
        ledger.seed_default_categories()?;
    }

    if args.is_empty() {
        let stdout = std::io::stdout();
        return run::print_usage(&mut stdout.lock());
    }
    run::as_cli(&args, &mut ledger)
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fintrack={}", settings.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(backend: Backend, settings: &Settings) -> Result<Box<dyn Storage>> {
    match backend {
        Backend::Memory => Ok(Box::new(MemoryStore::new())),
        Backend::Sqlite => {
            let path = settings.resolve_database_path()?;
            Ok(Box::new(SqliteStore::open(&path)?))
        }
    }
}

/// Remove a global flag wherever it appears, reporting whether it was present.
fn take_flag(args: &mut Vec<String>, name: &str) -> bool {
    let before = args.len();
    args.retain(|a| a != name);
    args.len() != before
}
