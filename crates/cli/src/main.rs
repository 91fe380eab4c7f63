mod auth_commands;
mod prompt;

use {
    clap::{Parser, Subcommand},
    std::path::PathBuf,
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
    wristband_api::{RecordClient, RecordType},
    wristband_config::ConfigStore,
    wristband_oauth::{OAuthFlow, defaults},
};

#[derive(Parser)]
#[command(name = "wristband", about = "Command-line client for the WHOOP developer API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (defaults to ~/.wristband/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Authentication against the WHOOP OAuth endpoints.
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Fetch records of one type and print them as JSON.
    Fetch {
        /// Record type: sleep, workout, profile, or recovery.
        record_type: String,
    },
    /// Assemble the coaching prompt from freshly fetched data.
    Prompt,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Report required config keys that are missing or empty.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "wristband starting");

    let store = ConfigStore::new(cli.config.clone().unwrap_or_else(ConfigStore::default_path));

    match cli.command {
        Commands::Auth { action } => auth_commands::handle_auth(action, &store).await,
        Commands::Config { action } => {
            match action {
                ConfigAction::Check => check_config(&store),
            }
            Ok(())
        },
        Commands::Fetch { record_type } => fetch_records(&store, &record_type).await,
        Commands::Prompt => print_prompt(&store).await,
    }
}

fn check_config(store: &ConfigStore) {
    let missing = store.load().missing_keys();
    if missing.is_empty() {
        println!("All required configuration keys are present.");
    } else {
        println!("Missing or empty keys in config: {}", missing.join(", "));
    }
}

async fn fetch_records(store: &ConfigStore, selector: &str) -> anyhow::Result<()> {
    let record_type: RecordType = match selector.parse() {
        Ok(rt) => rt,
        Err(e) => {
            error!(%e, "no request made");
            return Ok(());
        },
    };

    let records = record_client(store).get_records(record_type).await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

async fn print_prompt(store: &ConfigStore) -> anyhow::Result<()> {
    let client = record_client(store);
    let sleep = client.get_records(RecordType::Sleep).await?;
    let workout = client.get_records(RecordType::Workout).await?;
    let profile = client.get_records(RecordType::Profile).await?;

    let context = serde_json::json!({
        "sleep": sleep,
        "workout": workout,
        "profile": profile,
    });
    println!("{}", prompt::generate_prompt(&context));
    Ok(())
}

fn record_client(store: &ConfigStore) -> RecordClient {
    let config = store.load();
    let oauth = defaults::whoop_oauth_config(
        &config.client_id,
        &config.client_secret,
        &config.redirect_uri,
    );
    RecordClient::new(
        store.clone(),
        OAuthFlow::new(oauth),
        wristband_api::BASE_URL.to_string(),
    )
}
