use std::io;

use services::{AppServices, Clock};

mod args;
mod commands;
mod logging;

use args::{Args, Command, prepare_sqlite_file, print_usage};

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let parsed = match Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok()) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(err) => {
            print_usage();
            return Err(err.into());
        }
    };

    logging::init(logging::LogFormat::from_env());

    // sqlx does not create missing database files.
    prepare_sqlite_file(&parsed.db_url)?;
    let mut app =
        AppServices::new_sqlite(&parsed.db_url, &parsed.user_id, Clock::default_clock()).await?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match parsed.command {
        Command::Status => commands::status(&app, &mut out),
        Command::Review { subject } => {
            let mut input = io::stdin().lock();
            commands::review(&mut app, subject, &mut input, &mut out).await
        }
        Command::Quiz { subject, quiz_type } => {
            let mut input = io::stdin().lock();
            commands::quiz(&mut app, subject, quiz_type, &mut input, &mut out).await
        }
        Command::Generate {
            subject,
            amount,
            focus,
        } => commands::generate(&mut app, subject, amount, &focus, &mut out).await,
        Command::Seed => commands::seed(&mut app, &mut out).await,
        Command::Reset => commands::reset(&mut app, &mut out).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
