use clap::Parser;
use email_codes::cli::{Cli, Command};
use email_codes::config::{Config, ConfigStore, LoadedConfig};
use email_codes::service::notice::Notice;
use email_codes::service::session::SubmitOutcome;
use email_codes::service::sync_worker::SyncHandle;
use email_codes::{AppError, CredentialRecord, Session};
use mimalloc::MiMalloc;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn show(notice: &Notice) {
    if notice.is_error() {
        eprintln!("{notice}");
    } else {
        println!("{notice}");
    }
}

fn init_logging(cfg: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    let store = ConfigStore::new(&args.config_path);
    let loaded = store.load().unwrap_or_else(|e| {
        show(&e.to_notice());
        LoadedConfig::default()
    });
    init_logging(&loaded.config);
    info!(
        config = %store.path().display(),
        accounts = %loaded.config.accounts_path.display(),
        loglevel = %loaded.config.loglevel
    );

    let mut session = Session::open(loaded, SyncHandle::spawn());
    if let Some(database) = args.database.apply(session.database()) {
        session.override_database(database);
    }
    session.take_notices().iter().for_each(show);

    let result = run(&mut session, args.command, args.sync).await;
    session.take_notices().iter().for_each(show);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            show(&e.to_notice());
            ExitCode::FAILURE
        }
    }
}

async fn run(session: &mut Session, command: Command, sync: bool) -> Result<(), AppError> {
    match command {
        Command::List => {
            for (i, row) in session.rows().all().iter().enumerate() {
                let sold = if row.sold { "sold" } else { "-" };
                println!("{i:>4}  {:<32} {:<32} {sold}", row.email, row.secret);
            }
            return Ok(());
        }
        Command::Add { email, code, sold } => {
            session.add_row(CredentialRecord::new(email, code, sold));
        }
        cmd @ Command::Set { .. } => {
            if let Some((index, edit)) = cmd.into_edit() {
                session.edit_row(index, edit)?;
            }
        }
        Command::Import { path } => {
            let count = session.import(&path)?;
            println!("imported {count} rows from {}", path.display());
        }
        Command::Submit => {}
    }

    let SubmitOutcome { saved, synced } = session.submit(sync).await?;
    match synced {
        Some(report) => println!(
            "saved {saved} rows; synced {} ({} without email skipped)",
            report.upserted, report.skipped
        ),
        None => println!("saved {saved} rows"),
    }
    Ok(())
}
