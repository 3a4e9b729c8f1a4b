// Bear Registry - CLI
// Database init, fixture import, console listing and JSON export

use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use bears::{import_fixtures, list_bears, load_fixtures, BearSchema, SqliteBearStore};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("init") => run_init(),
        Some("import") => {
            let csv_path = args
                .get(2)
                .context("usage: bears import <fixtures.csv>")?;
            run_import(Path::new(csv_path))
        }
        Some("list") | None => run_list(),
        Some("export") => run_export(),
        Some(other) => bail!("unknown command `{other}` (expected init, import, list or export)"),
    }
}

fn db_path() -> PathBuf {
    env::var("BEARS_DB")
        .unwrap_or_else(|_| "bears.db".to_string())
        .into()
}

fn run_init() -> Result<()> {
    println!("🐻 Bear Registry - Database Init");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let path = db_path();
    let _store = SqliteBearStore::open(&path)?;

    println!("✓ Database ready at {}", path.display());
    Ok(())
}

fn run_import(csv_path: &Path) -> Result<()> {
    println!("🐻 Bear Registry - Fixture Import");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = SqliteBearStore::open(db_path())?;
    let fixtures = load_fixtures(csv_path)?;
    println!("✓ Loaded {} fixture rows from {}", fixtures.len(), csv_path.display());

    let report = import_fixtures(&store, &BearSchema::new(), &fixtures)?;
    println!("✓ Inserted: {} bears", report.inserted);
    println!("✓ Skipped duplicates: {}", report.skipped);
    if report.invalid > 0 {
        println!("✗ Invalid rows skipped: {}", report.invalid);
    }

    Ok(())
}

fn run_list() -> Result<()> {
    let store = SqliteBearStore::open(db_path())?;
    let bears = list_bears(&store)?;

    println!("🐻 {} bears in the registry", bears.len());
    for bear in &bears {
        println!(
            "  {}  {:<20} {:<7} {}",
            bear.id,
            bear.name,
            bear.sex.as_str(),
            bear.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
        );
    }

    Ok(())
}

fn run_export() -> Result<()> {
    let store = SqliteBearStore::open(db_path())?;
    let bears = list_bears(&store)?;

    println!("{}", serde_json::to_string_pretty(&bears)?);
    Ok(())
}
