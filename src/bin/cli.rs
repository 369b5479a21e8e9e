use anyhow::Context;
use clap::{Parser, Subcommand};

use acesse_core::api::{AuthApi, HttpAuthApi};
use acesse_core::authz::ProfileRegistry;
use acesse_core::token;
use acesse_core::Role;

#[derive(Parser, Debug)]
#[command(author, version, about = "acesse session inspection tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a bearer token's claims and report whether it is expired
    TokenInfo { token: String },
    /// Print the grant table for a role
    Grants { role: Role },
    /// Check whether a role may perform an action on a resource
    Check {
        role: Role,
        resource: String,
        action: Option<String>,
    },
    /// Log in against PORTAL_API_URL and print the issued session
    Login { email: String, password: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::TokenInfo { token } => {
            match token::decode_claims(&token) {
                Ok(claims) => {
                    println!("{}", serde_json::to_string_pretty(&claims)?);
                    println!("expired: {}", token::is_token_expired(&token));
                }
                Err(err) => {
                    println!("undecodable ({err}); treated as expired");
                }
            }
        }
        Commands::Grants { role } => {
            let registry = ProfileRegistry::with_default_profiles();
            for grant in registry.permissions_for_role(role) {
                println!("{grant}");
            }
        }
        Commands::Check { role, resource, action } => {
            let registry = ProfileRegistry::with_default_profiles();
            let allowed = registry.has_permission(role, &resource, action.as_deref(), None);
            println!("{}", if allowed { "allow" } else { "deny" });
        }
        Commands::Login { email, password } => {
            let api = HttpAuthApi::from_env().context("PORTAL_API_URL must point at the portal backend")?;
            let response = api
                .login(&acesse_core::models::LoginRequest { email, password })
                .await
                .context("login failed")?;
            println!("token: {}", response.token);
            println!("expires at: {}", response.expires_at);
            println!("user: {}", serde_json::to_string_pretty(&response.user)?);
        }
    }

    Ok(())
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
