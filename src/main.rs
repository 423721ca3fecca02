use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;
use social_login::{AuthError, CallbackServer, ConfigError, ProviderConfig, State, UserResolver};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "social-login",
    about = "Sign in with an OAuth 2.0 provider configured through oauth2.* environment variables and print the user as JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List enabled providers and their endpoints.
    Providers,
    /// Print the consent page url for a provider.
    AuthorizeUrl {
        provider: String,
        #[arg(long)]
        state: Option<String>,
    },
    /// Exchange an authorization code and print the resolved user.
    User { provider: String, code: String },
    /// Open the consent page and capture the callback on the redirect uri.
    Login {
        provider: String,
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolver = UserResolver::from_env()?;

    match cli.command {
        Command::Providers => list_providers(&resolver),
        Command::AuthorizeUrl { provider, state } => {
            let config = lookup(&resolver, &provider)?;
            let state = match state {
                Some(state) => State::new(state),
                None => State::generate()?,
            };
            println!("{}", config.authorization_url(state.as_str())?);
            Ok(())
        }
        Command::User { provider, code } => {
            let user = resolver.get_user(&provider, &code).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
        Command::Login {
            provider,
            timeout_secs,
        } => run_login(&resolver, &provider, Duration::from_secs(timeout_secs)).await,
    }
}

fn lookup<'a>(resolver: &'a UserResolver, name: &str) -> Result<&'a ProviderConfig, CliError> {
    resolver
        .registry()
        .lookup(name)
        .ok_or_else(|| AuthError::UnknownEndpoint(name.to_string()).into())
}

fn list_providers(resolver: &UserResolver) -> Result<(), CliError> {
    let mut configs: Vec<_> = resolver.registry().iter().collect();
    configs.sort_by_key(|config| config.provider.id());

    let providers: Vec<_> = configs
        .into_iter()
        .map(|config| {
            json!({
                "provider": config.provider.id(),
                "auth_url": config.endpoint.auth_url,
                "token_url": config.endpoint.token_url,
                "scopes": config.scopes,
                "profile_mapping": config.provider.has_profile_mapping(),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&providers)?);
    Ok(())
}

async fn run_login(
    resolver: &UserResolver,
    provider: &str,
    timeout: Duration,
) -> Result<(), CliError> {
    let config = lookup(resolver, provider)?;
    let state = State::generate()?;
    let authorization_url = config.authorization_url(state.as_str())?;

    let server = CallbackServer::new(&config.redirect_url)?.with_timeout(timeout);
    let listener = server.bind().await?;
    let handle = tokio::spawn(async move { server.listen(listener).await });

    eprintln!("Authorization URL:\n{authorization_url}");
    if let Err(err) = webbrowser::open(authorization_url.as_str()) {
        eprintln!("Failed to open browser automatically: {err}");
    }

    let response = handle.await.map_err(|err| {
        AuthError::Io(std::io::Error::other(format!("callback task failed: {err}")))
    })??;
    state.verify(response.state.as_deref())?;

    let user = resolver.get_user_with(config, &response.code).await?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}
