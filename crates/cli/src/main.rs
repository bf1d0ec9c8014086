use clap::{Parser, Subcommand};
use messenger_bot::config::{self, Config};
use messenger_bot::{Bot, EventKind, Identity, TextMessage};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "messenger-bot")]
#[command(about = "Messenger webhook bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: MESSENGER_BOT_CONFIG_PATH or ~/.messenger-bot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the webhook listener. Every request is treated as a webhook call: GET verifies the subscription, anything else is a delivery.
    Serve {
        /// Config file path (default: MESSENGER_BOT_CONFIG_PATH or ~/.messenger-bot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Listener port (default from config or 5000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Reply to every text message with the same text.
        #[arg(long)]
        echo: bool,
    },

    /// Send one text message to a user (page-scoped id) and print the platform reply.
    Send {
        /// Config file path (default: MESSENGER_BOT_CONFIG_PATH or ~/.messenger-bot/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Recipient id.
        user_id: String,

        /// Message text.
        text: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("messenger-bot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port, echo }) => {
            if let Err(e) = run_serve(config, port, echo).await {
                log::error!("serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send {
            config,
            user_id,
            text,
        }) => {
            if let Err(e) = run_send(config, user_id, text).await {
                log::error!("send failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(config::default_config_path);
    let dir = messenger_bot::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

fn build_bot(config: &Config) -> anyhow::Result<Bot> {
    let credentials = config::resolve_credentials(config)?;
    Ok(Bot::new(credentials).with_api_base(config.messenger.api_base.clone()))
}

async fn run_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    echo: bool,
) -> anyhow::Result<()> {
    let (mut config, path) = config::load_config(config_path)?;
    if let Some(p) = port {
        config.server.port = p;
    }
    log::debug!("using config {}", path.display());

    let mut bot = build_bot(&config)?;
    bot.on_receive(|events| {
        log::info!("{}: {} messaging event(s)", EventKind::Receive, events.len())
    });
    bot.on_message(|m| {
        let sender = m.sender.as_ref().map(|s| s.id.as_str()).unwrap_or("unknown");
        log::info!("{} from {}: {}", EventKind::Message, sender, m.message);
    });
    bot.on_error(|e| log::warn!("{}: webhook delivery failed: {}", EventKind::Error, e));

    if echo {
        let (tx, rx) = mpsc::unbounded_channel::<TextMessage>();
        bot.on_message(move |m| {
            if tx.send(m.clone()).is_err() {
                log::debug!("echo: reply task stopped, dropping message");
            }
        });
        tokio::spawn(run_echo(bot.client().clone(), rx));
        log::info!("echo mode enabled");
    }

    log::info!(
        "starting webhook listener on {}:{}",
        config.server.bind,
        config.server.port
    );
    messenger_bot::server::run_server(&config.server, Arc::new(bot)).await
}

/// Reply to each text message with its own text. Send failures are logged, not retried.
async fn run_echo(
    client: messenger_bot::MessengerClient,
    mut rx: mpsc::UnboundedReceiver<TextMessage>,
) {
    while let Some(m) = rx.recv().await {
        let Some(sender) = m.sender else {
            log::debug!("echo: message without sender id, skipping");
            continue;
        };
        if let Err(e) = client.send(&sender, &m.message).await {
            log::warn!("echo: send to {} failed: {}", sender.id, e);
        }
    }
}

async fn run_send(
    config_path: Option<PathBuf>,
    user_id: String,
    text: String,
) -> anyhow::Result<()> {
    let (config, _) = config::load_config(config_path)?;
    let bot = build_bot(&config)?;
    let reply = bot.send(&Identity::new(user_id), &text).await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
