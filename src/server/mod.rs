//! Server orchestration for the masthead daemon.
//!
//! This module exposes the command-line entry points and the Tokio accept
//! loop. The binary stays a thin wrapper that only needs to call [`run`].

pub mod admin;
pub mod cli;

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use clap::Parser;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::watch,
    task::JoinSet,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub use self::cli::{AppConfig, Cli, Commands, ConfigOverrides, CreateUserArgs};
use crate::{
    db::{DbPool, apply_migrations, establish_pool},
    handler::{Context, Session, handle_request},
};

/// Greeting line written to every accepted connection.
const GREETING: &[u8] = b"MASTHEAD 1\n";

/// Parse CLI arguments and execute the requested command or daemon.
///
/// # Errors
/// Returns any error emitted while loading configuration or running the
/// requested command.
pub async fn run() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_with_cli(cli).await
}

/// Execute the server logic using an already parsed [`Cli`].
///
/// # Errors
/// Propagates configuration, admin command, and daemon failures.
pub async fn run_with_cli(cli: Cli) -> Result<()> {
    let config = cli
        .overrides
        .load()
        .context("failed to load configuration")?;
    if let Some(command) = cli.command {
        admin::run_command(command, &config).await
    } else {
        run_daemon(config).await
    }
}

/// Run the daemon using the supplied configuration.
///
/// # Errors
/// Returns any failure reported while seeding the database pool, binding
/// the socket, or handling inbound connections.
pub async fn run_daemon(cfg: AppConfig) -> Result<()> {
    let pool = setup_database(&cfg.database).await?;
    let listener = TcpListener::bind(&cfg.bind).await?;
    info!(bind = %cfg.bind, "masthead listening");
    accept_connections(listener, pool).await
}

/// Install the global tracing subscriber, respecting `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Set up the connection pool and apply pending migrations.
async fn setup_database(database: &str) -> Result<DbPool> {
    let pool = establish_pool(database).await?;
    {
        let mut conn = pool.get().await.context("failed to get db connection")?;
        apply_migrations(&mut conn, database).await?;
    }
    Ok(pool)
}

async fn accept_connections(listener: TcpListener, pool: DbPool) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut join_set = JoinSet::new();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
            res = listener.accept() => match res {
                Ok((socket, peer)) => {
                    spawn_client_handler(socket, peer, pool.clone(), shutdown_rx.clone(), &mut join_set);
                }
                Err(e) => warn!(%e, "accept error"),
            }
        }
    }

    // notify all connection tasks, then drain them
    let _ = shutdown_tx.send(true);
    while let Some(res) = join_set.join_next().await {
        if let Err(e) = res {
            warn!(%e, "task error");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(%e, "failed to listen for shutdown signal");
    }
}

fn spawn_client_handler(
    socket: TcpStream,
    peer: SocketAddr,
    pool: DbPool,
    mut shutdown_rx: watch::Receiver<bool>,
    join_set: &mut JoinSet<()>,
) {
    let ctx = Context::new(peer, pool);
    join_set.spawn(async move {
        if let Err(e) = handle_client(socket, &ctx, &mut shutdown_rx).await {
            warn!(peer = %ctx.peer, %e, "connection error");
        }
    });
}

/// Handle a single client connection: greet, then answer request lines
/// until the peer disconnects or shutdown is signalled.
async fn handle_client(
    socket: TcpStream,
    ctx: &Context,
    shutdown: &mut watch::Receiver<bool>,
) -> Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(GREETING).await?;

    let mut session = Session::default();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let reply = handle_request(ctx, &mut session, line).await;
                writer.write_all(reply.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            _ = shutdown.changed() => break,
        }
    }
    Ok(())
}
