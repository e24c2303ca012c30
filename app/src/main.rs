//! Terminal front end.
//!
//! Reads commands from stdin, dispatches them to the store and redraws the
//! screen whenever the store revision changes.
//!
//! Run with: cargo run --bin taskdeck

use std::sync::Arc;
use taskdeck::command::HELP;
use taskdeck::{render, AppConfig, AppStore, Command, Session};
use taskdeck_core::environment::{SystemClock, TimeOrderedIds};
use taskdeck_persistence::FileStorage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env()?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| EnvFilter::new("taskdeck=info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let session = Session::start(
        &config,
        FileStorage::new(&config.data_dir),
        Arc::new(SystemClock),
        Arc::new(TimeOrderedIds::new(SystemClock)),
    )
    .await;
    let store = session.store().clone();

    draw(&store).await;
    let mut revisions = store.subscribe();
    let renderer = {
        let store = store.clone();
        tokio::spawn(async move {
            while revisions.changed().await.is_ok() {
                draw(&store).await;
            }
        })
    };

    println!("Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Ok(None) => {},
            Ok(Some(Command::Help)) => println!("{HELP}"),
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Dispatch(action))) => {
                store.send(action).await?;
            },
            Err(error) => eprintln!("{error}"),
        }
    }

    renderer.abort();
    let report = session.shutdown().await?;
    tracing::info!(written = report.written, "Goodbye");

    Ok(())
}

async fn draw(store: &AppStore) {
    let screen = store.state(render).await;
    println!("\n{screen}");
}
