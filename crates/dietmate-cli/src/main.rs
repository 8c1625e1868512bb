//! Diet Mate host simulator
//!
//! Plays the host runtime against a running coordinator daemon:
//! - registers as a host (optionally without the window-open capability)
//! - sends one event and prints its outcome
//! - answers every primitive the daemon requests, printing each as a JSON line

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use dietmate_rpc::{
    ClickedNotification, ClientError, ClientHandle, HostCapabilities, Request, Response,
    RpcClient, RpcError, StatusResult, WorkerEvent, methods, parse_dispatch, socket_path,
};
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Diet Mate host simulator
#[derive(Parser)]
#[command(name = "dietmate")]
#[command(about = "Drive the Diet Mate coordinator daemon as a host runtime")]
#[command(version)]
#[command(after_help = "\
Examples:
  dietmate install
  dietmate push --payload '{\"title\":\"Reminder\",\"body\":\"Time to log your meal\"}'
  dietmate --client w1=https://dietmate.app/index.html click --id n1
  dietmate --client w1=https://dietmate.app/ sync --tag fasting-check
  dietmate --linger 5 message --json '{\"type\":\"SCHEDULE_NOTIFICATION\",\"delay\":2000}'
  dietmate status
")]
struct Cli {
    /// Daemon socket (defaults to `$XDG_RUNTIME_DIR/dietmate.sock`)
    #[arg(long, global = true, value_name = "PATH")]
    socket_path: Option<PathBuf>,

    /// Open window reported by `match_clients`, in enumeration order
    #[arg(long = "client", global = true, value_name = "ID=URL", value_parser = parse_client)]
    clients: Vec<ClientHandle>,

    /// Register without the ability to open new windows
    #[arg(long, global = true)]
    no_open_window: bool,

    /// Keep answering daemon requests for this many seconds after the event
    #[arg(long, global = true, value_name = "SECS", default_value_t = 0)]
    linger: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send the install lifecycle event
    Install,

    /// Send the activate lifecycle event
    Activate,

    /// Deliver a push message
    Push {
        /// Raw payload text; omit for a push without data
        #[arg(long)]
        payload: Option<String>,
    },

    /// Click a displayed notification
    Click {
        /// Notification id
        #[arg(long)]
        id: String,
        /// Action button that was pressed
        #[arg(long)]
        action: Option<String>,
    },

    /// Fire a one-shot background sync
    Sync {
        #[arg(long)]
        tag: String,
    },

    /// Fire a periodic background sync
    #[command(name = "periodic-sync")]
    PeriodicSync {
        #[arg(long)]
        tag: String,
    },

    /// Post a message from a page
    Message {
        /// Message data as JSON (e.g. '{"type":"SHOW_NOTIFICATION","title":"Hi"}')
        #[arg(long)]
        json: String,
    },

    /// Show this host's session status
    Status,
}

fn parse_client(s: &str) -> std::result::Result<ClientHandle, String> {
    let (id, url) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=URL, got '{s}'"))?;
    if id.is_empty() {
        return Err("client id must not be empty".to_string());
    }
    Ok(ClientHandle::window(id, url))
}

/// Event sent for a subcommand, `None` for `status`
fn build_event(command: Commands) -> Result<Option<WorkerEvent>> {
    let event = match command {
        Commands::Install => WorkerEvent::Install,
        Commands::Activate => WorkerEvent::Activate,
        Commands::Push { payload } => WorkerEvent::Push {
            data: payload.map(String::into_bytes),
        },
        Commands::Click { id, action } => WorkerEvent::NotificationClick {
            notification: ClickedNotification {
                id,
                title: String::new(),
                options: None,
            },
            action,
        },
        Commands::Sync { tag } => WorkerEvent::Sync { tag },
        Commands::PeriodicSync { tag } => WorkerEvent::PeriodicSync { tag },
        Commands::Message { json } => WorkerEvent::Message {
            data: serde_json::from_str(&json).context("--json is not valid JSON")?,
            source: Some("dietmate-cli".to_string()),
        },
        Commands::Status => return Ok(None),
    };
    Ok(Some(event))
}

/// Answer a daemon request the way a host runtime would: every primitive
/// succeeds and `match_clients` reports the configured windows.
fn host_reply(request: &Request, clients: &[ClientHandle]) -> Option<Response> {
    let id = request.id.clone()?;
    let result = match request.method.as_str() {
        methods::MATCH_CLIENTS => json!(clients),
        methods::SKIP_WAITING
        | methods::CLAIM_CLIENTS
        | methods::SHOW_NOTIFICATION
        | methods::CLOSE_NOTIFICATION
        | methods::FOCUS_CLIENT
        | methods::OPEN_WINDOW
        | methods::POST_MESSAGE => Value::Null,
        _ => return Some(Response::error(id, RpcError::method_not_found())),
    };
    Some(Response::success(id, result))
}

fn print_request(request: &Request) {
    let line = json!({
        "method": request.method,
        "params": request.params,
    });
    println!("{line}");
}

async fn answer(client: &RpcClient, request: &Request, clients: &[ClientHandle]) -> Result<()> {
    print_request(request);
    match host_reply(request, clients) {
        Some(response) => client
            .respond(response)
            .await
            .context("Failed to answer daemon request"),
        None => {
            debug!("Daemon sent a notification: {}", request.method);
            Ok(())
        }
    }
}

type DispatchReply = std::result::Result<Response, ClientError>;

enum Step {
    Request(Option<Request>),
    Done(std::result::Result<DispatchReply, oneshot::error::RecvError>),
}

async fn run_event(
    client: &mut RpcClient,
    event: &WorkerEvent,
    clients: &[ClientHandle],
) -> Result<()> {
    let mut done = client
        .begin_dispatch(event)
        .await
        .context("Failed to send event")?;

    let response = loop {
        let step = tokio::select! {
            req = client.recv() => Step::Request(req),
            res = &mut done => Step::Done(res),
        };
        match step {
            Step::Request(Some(req)) => answer(client, &req, clients).await?,
            Step::Request(None) => bail!("Daemon closed the connection"),
            Step::Done(res) => {
                break res
                    .map_err(|_| anyhow!("Daemon closed the connection"))?
                    .context("Event failed")?;
            }
        }
    };

    match parse_dispatch(response) {
        Ok(result) => {
            let line = json!({
                "event": event.kind(),
                "handled": result.handled,
                "outcome": result.outcome,
            });
            println!("{line}");
        }
        Err(e) => {
            let line = json!({"event": event.kind(), "error": e.to_string()});
            println!("{line}");
        }
    }
    Ok(())
}

/// Keep playing host until `duration` has elapsed, so detached work
/// (requested shows, scheduled notifications) can reach the host.
async fn linger(
    client: &mut RpcClient,
    duration: Duration,
    clients: &[ClientHandle],
) -> Result<()> {
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    loop {
        let req = tokio::select! {
            req = client.recv() => req,
            () = &mut deadline => return Ok(()),
        };
        match req {
            Some(req) => answer(client, &req, clients).await?,
            None => return Ok(()),
        }
    }
}

async fn connect_and_register(cli: &Cli) -> Result<RpcClient> {
    let socket = cli.socket_path.clone().unwrap_or_else(socket_path);
    if !socket.exists() {
        bail!(
            "Daemon not running (socket not found at {}).\nStart with: dietmate-daemon",
            socket.display()
        );
    }

    let mut client = RpcClient::connect_to(socket)
        .await
        .context("Failed to connect to daemon. Is it running?")?;

    let capabilities = HostCapabilities {
        open_window: !cli.no_open_window,
    };
    let session_id = client
        .register("dietmate-cli", capabilities)
        .await
        .context("Failed to register with daemon")?;
    debug!("Registered as {}", session_id);

    Ok(client)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dietmate=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut client = connect_and_register(&cli).await?;

    match build_event(cli.command)? {
        Some(event) => run_event(&mut client, &event, &cli.clients).await?,
        None => {
            let status: StatusResult = client
                .request(methods::STATUS, None)
                .await
                .context("Status request failed")?;
            let line = json!({
                "session_id": status.session_id,
                "armed_timers": status.armed_timers,
            });
            println!("{line}");
        }
    }

    if cli.linger > 0 {
        linger(&mut client, Duration::from_secs(cli.linger), &cli.clients).await?;
    }

    Ok(())
}
