use anyhow::Result;
use clap::Subcommand;
use tracing::info;

use wristband_config::{Config, ConfigStore};
use wristband_oauth::{CallbackServer, OAuthFlow, defaults};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in via the browser-based OAuth flow.
    Login,
    /// Show which credentials and tokens are stored.
    Status,
}

pub async fn handle_auth(action: AuthAction, store: &ConfigStore) -> Result<()> {
    match action {
        AuthAction::Login => login(store).await,
        AuthAction::Status => status(store),
    }
}

async fn login(store: &ConfigStore) -> Result<()> {
    let config = store.load();
    let missing: Vec<&str> = config
        .missing_keys()
        .into_iter()
        .filter(|k| matches!(*k, "client_id" | "client_secret" | "redirect_uri"))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "config at {} is missing {}; fill in the values from the WHOOP developer dashboard",
            store.path().display(),
            missing.join(", ")
        );
    }

    let oauth = defaults::whoop_oauth_config(
        &config.client_id,
        &config.client_secret,
        &config.redirect_uri,
    );
    let port = defaults::callback_port(&config.redirect_uri);
    let flow = OAuthFlow::new(oauth);
    let req = flow.start()?;

    println!("Opening browser for authentication...");
    if open::that(&req.url).is_err() {
        println!("Could not open browser. Please visit:\n{}", req.url);
    }

    println!("Waiting for callback on {} ...", config.redirect_uri);
    let code = CallbackServer::wait_for_code(port, &req.state).await?;

    println!("Exchanging code for tokens...");
    let tokens = flow.exchange(&code).await?;
    store.update_tokens(&tokens.access_token, &tokens.refresh_token)?;

    info!("authentication flow complete, tokens saved to config");
    println!("Logged in. Tokens saved to {}", store.path().display());
    Ok(())
}

fn status(store: &ConfigStore) -> Result<()> {
    let config = store.load();
    let missing = config.missing_keys();
    for key in Config::REQUIRED_KEYS {
        let mark = if missing.contains(&key) {
            "missing"
        } else {
            "present"
        };
        println!("{key:<14} [{mark}]");
    }
    if missing.is_empty() {
        println!("Ready to fetch records.");
    } else if config.access_token.is_none() {
        println!("Run `wristband auth login` to obtain tokens.");
    }
    Ok(())
}
