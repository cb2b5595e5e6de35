//! Order Keeper CLI - Database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! ok-cli migrate
//!
//! # Mint a token for user 42 (debugging only)
//! ok-cli token issue --user-id 42
//!
//! # Check which user a token identifies
//! ok-cli token verify eyJhbGciOi...
//! ```
//!
//! Database settings come from the same `DATABASE_URL` / `DB_*` variables as
//! the server; token commands read `SIGNING_KEY`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ok-cli")]
#[command(author, version, about = "Order Keeper CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Issue or inspect identity tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Sign a token for a user
    Issue {
        /// User ID to embed in the token
        #[arg(short, long)]
        user_id: i32,
    },
    /// Validate a token and print the user it identifies
    Verify {
        /// The bearer token (without the `Bearer ` prefix)
        token: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Token { action } => match action {
            TokenAction::Issue { user_id } => commands::token::issue(user_id)?,
            TokenAction::Verify { token } => commands::token::verify(&token)?,
        },
    }
    Ok(())
}
