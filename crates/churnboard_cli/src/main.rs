//! Terminal rendition of the churn triage dashboard.
//!
//! # Responsibility
//! - Drive list/detail/note/reset flows against the local snapshot DB.
//! - Keep output deterministic for demos and smoke checks.

use churnboard_core::db::open_db;
use churnboard_core::{
    default_log_level, init_logging, play_for, prioritize_input, recommend_record, seed_store,
    summarize, CustomerRecord, CustomerStore, NotePersister, NoteSaveOutcome, SnapshotStorage,
    SqliteSnapshotStorage, StoreSource, UnavailableSnapshotStorage,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_DB_FILE_NAME: &str = "churnboard.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "churnboard", version, about = "Churn triage dashboard")]
struct Cli {
    /// SQLite file mirroring the session store.
    #[arg(long, env = "CHURNBOARD_DB_PATH", global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "CHURNBOARD_LOG_DIR", global = true)]
    log_dir: Option<String>,

    #[arg(long, env = "CHURNBOARD_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List customers at or above a lifetime-value threshold.
    List {
        /// Raw threshold; non-numeric input uses the default.
        #[arg(long, short, default_value = "")]
        threshold: String,
    },
    /// Show one customer with its recommendation.
    Show { customer_id: String },
    /// Save an intervention note.
    Note { customer_id: String, text: String },
    /// Drop saved notes and restore the seed roster.
    Reset,
    /// Print core linkage info.
    Ping,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        if let Err(err) = init_logging(level.as_str(), log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Command::Ping = cli.command {
        println!("churnboard_core ping={}", churnboard_core::ping());
        println!("churnboard_core version={}", churnboard_core::core_version());
        return Ok(());
    }

    let db_path = cli
        .db
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
    let conn = open_db(&db_path);
    let storage: Box<dyn SnapshotStorage + '_> = match conn.as_ref() {
        Ok(conn) => match SqliteSnapshotStorage::try_new(conn) {
            Ok(storage) => Box::new(storage),
            Err(err) => unavailable_storage(err.to_string()),
        },
        Err(err) => unavailable_storage(format!("open {}: {err}", db_path.display())),
    };
    let persister = NotePersister::new(storage);
    let seed = seed_store().map_err(|err| err.to_string())?;

    let loaded = persister.load_store(&seed);
    if let Some(issue) = loaded.issue.as_ref() {
        eprintln!("warning: using seed data: {issue}");
    }
    let mut store = loaded.store;

    match cli.command {
        Command::List { threshold } => {
            print_list(&store, threshold.as_str(), loaded.source);
            Ok(())
        }
        Command::Show { customer_id } => {
            let record = store
                .get(customer_id.as_str())
                .ok_or_else(|| format!("customer not found: {customer_id}"))?;
            print_detail(record);
            Ok(())
        }
        Command::Note { customer_id, text } => {
            match persister.save_note(&mut store, customer_id.as_str(), text) {
                NoteSaveOutcome::Saved => {
                    println!("Note saved for {customer_id}.");
                    Ok(())
                }
                NoteSaveOutcome::UnknownCustomer => {
                    Err(format!("customer not found: {customer_id}"))
                }
                NoteSaveOutcome::NotPersisted(issue) => Err(format!("note not saved: {issue}")),
            }
        }
        Command::Reset => {
            let reset = persister.reset(&seed);
            match reset.issue {
                None => {
                    println!("Dashboard reset to {} seed customers.", reset.store.len());
                    Ok(())
                }
                Some(issue) => Err(format!("reset failed: {issue}")),
            }
        }
        Command::Ping => Ok(()),
    }
}

fn unavailable_storage(reason: String) -> Box<dyn SnapshotStorage> {
    eprintln!("warning: storage unavailable, changes will not be saved: {reason}");
    Box::new(UnavailableSnapshotStorage::new(reason))
}

fn print_list(store: &CustomerStore, raw_threshold: &str, source: StoreSource) {
    let visible = prioritize_input(store.records(), raw_threshold);
    let summary = summarize(visible.iter().copied());

    let source_label = match source {
        StoreSource::Snapshot => "saved",
        StoreSource::Seed => "seed",
    };
    println!(
        "{} customer(s) [{source_label}] | high risk {} | actionable {} | value at risk {:.0} of {:.0}",
        summary.customer_count,
        summary.high_risk_count,
        summary.actionable_count,
        summary.value_at_risk,
        summary.total_lifetime_value
    );
    for record in visible {
        let note_flag = if record.note.trim().is_empty() { " " } else { "*" };
        println!(
            "{note_flag} {:<4} {:<28} ltv={:>9.0} risk={:>5.1} {}",
            record.id,
            record.name,
            record.lifetime_value,
            record.risk_score,
            record.risk_tier().as_str()
        );
    }
}

fn print_detail(record: &CustomerRecord) {
    println!("{} ({})", record.name, record.id);
    println!(
        "lifetime value {:.0} | risk {:.1} ({})",
        record.lifetime_value,
        record.risk_score,
        record.risk_tier().as_str()
    );
    println!("drivers:");
    for driver in &record.top_drivers {
        println!("  - {}", driver.as_tag());
    }
    println!("play: {}", play_for(record).label());
    println!("recommendation: {}", recommend_record(record));
    if !record.note.is_empty() {
        println!("note: {}", record.note);
    }
}

#[cfg(test)]
mod tests {
    use super::{run, Cli, Command};
    use clap::Parser;

    const MISSING_DB: &str = "/nonexistent_churnboard_dir/sub/cb.sqlite3";

    #[test]
    fn parses_note_with_global_db_flag() {
        let cli = Cli::try_parse_from([
            "churnboard",
            "note",
            "C1",
            "walkthrough booked",
            "--db",
            "/tmp/cb.sqlite3",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/cb.sqlite3")));
        match cli.command {
            Command::Note { customer_id, text } => {
                assert_eq!(customer_id, "C1");
                assert_eq!(text, "walkthrough booked");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn list_threshold_is_kept_raw() {
        let cli = Cli::try_parse_from(["churnboard", "list", "--threshold", "abc"]).unwrap();
        assert!(matches!(cli.command, Command::List { threshold } if threshold == "abc"));
    }

    #[test]
    fn list_and_show_fall_back_to_seed_without_storage() {
        let list = Cli::try_parse_from(["churnboard", "--db", MISSING_DB, "list"]).unwrap();
        assert_eq!(run(list), Ok(()));

        let show = Cli::try_parse_from(["churnboard", "--db", MISSING_DB, "show", "C1"]).unwrap();
        assert_eq!(run(show), Ok(()));
    }

    #[test]
    fn note_reports_unsaved_without_storage() {
        let cli = Cli::try_parse_from(["churnboard", "--db", MISSING_DB, "note", "C1", "x"]).unwrap();
        let err = run(cli).unwrap_err();
        assert!(err.contains("not saved"), "{err}");
    }

    #[test]
    fn note_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("cb.sqlite3");
        let db = db.to_str().unwrap();

        let note = Cli::try_parse_from(["churnboard", "--db", db, "note", "C2", "renewal call"]).unwrap();
        assert_eq!(run(note), Ok(()));
        let show = Cli::try_parse_from(["churnboard", "--db", db, "show", "C2"]).unwrap();
        assert_eq!(run(show), Ok(()));
        let unknown = Cli::try_parse_from(["churnboard", "--db", db, "note", "C404", "x"]).unwrap();
        assert!(run(unknown).is_err());
    }
}
