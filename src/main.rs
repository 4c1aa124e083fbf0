//! remote-mpris - exposes a media session as an MPRIS player on the session bus.

use std::{error::Error, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use remote_mpris::{
    config::{Config, LogLevel},
    services::{
        mpris::{MprisAdapter, ZbusConnection, forward_signals, track_object_path},
        session::{MediaItem, MemorySession, SessionHost, SessionSlot},
    },
    tracing_config,
};
use tracing::{Level, info, span};

#[derive(Parser)]
#[command(name = "remote-mpris")]
#[command(about = "Expose a media session as an MPRIS player")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo session on the session bus until interrupted
    Serve {
        /// Configuration file to use instead of the default location
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the JSON schema of the configuration file
    Schema,
    /// Print the object path a track is announced under
    TrackPath {
        namespace: String,
        title: String,
        media_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => serve(config).await?,
        Commands::Schema => {
            tracing_config::init(LogLevel::Warn)?;
            println!("{}", Config::json_schema()?);
        }
        Commands::TrackPath {
            namespace,
            title,
            media_id,
        } => {
            tracing_config::init(LogLevel::Warn)?;
            println!("{}", track_object_path(&namespace, &title, &media_id));
        }
    }

    Ok(())
}

async fn serve(config_path: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config = match config_path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load()?,
    };

    let _guard = tracing_config::init_with_file(config.general.log_level)?;
    let _span = span!(Level::INFO, "remote_mpris").entered();
    info!("Starting remote-mpris");

    let host = SessionHost::spawn("demo", config.player.handoff_timeout(), demo_session)?;
    let slot = Arc::new(SessionSlot::new());
    let connection = Arc::new(ZbusConnection::session().await?);

    let (adapter, signals) = MprisAdapter::new(&config, slot.clone(), connection.clone());
    let forwarder = tokio::spawn(forward_signals(signals, connection));
    let follower = adapter.follow(slot.watch());

    slot.bind(host.clone());
    adapter.sync().await?;
    info!(bus_name = adapter.bus_name(), "Serving until interrupted");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    adapter.unsync().await?;
    slot.clear();
    follower.abort();
    tokio::task::spawn_blocking(move || host.shutdown()).await?;

    drop(adapter);
    forwarder.abort();

    Ok(())
}

fn demo_session() -> MemorySession {
    let track = |id: &str, title: &str, artist: &str| MediaItem {
        media_id: id.to_string(),
        title: Some(title.to_string()),
        artist: Some(artist.to_string()),
        album: Some("Remote Sessions".to_string()),
        ..MediaItem::default()
    };

    MemorySession::builder("org.remote_mpris.demo")
        .queue(vec![
            track("demo-1", "Opening", "House Band"),
            track("demo-2", "Interlude", "House Band"),
            track("demo-3", "Closing", "House Band"),
        ])
        .duration_ms(180_000)
        .build()
}
