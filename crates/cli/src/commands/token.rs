//! Token debugging commands.
//!
//! Tokens are signed with the same `SIGNING_KEY` the server uses, so an
//! issued token is accepted by a running server until it expires.

use order_keeper_core::UserId;
use order_keeper_server::config::signing_key_from_env;
use order_keeper_server::services::TokenAuthority;

use super::CommandError;

fn authority() -> Result<TokenAuthority, CommandError> {
    Ok(TokenAuthority::new(&signing_key_from_env()?))
}

/// Print a freshly signed token for `user_id`.
pub fn issue(user_id: i32) -> Result<(), CommandError> {
    let issued = authority()?.issue(UserId::new(user_id))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", issued.token);
        println!("expires_at: {}", issued.expires_at.to_rfc3339());
    }
    Ok(())
}

/// Print the user ID a token identifies.
pub fn verify(token: &str) -> Result<(), CommandError> {
    let user_id = authority()?.validate(token.trim())?;

    #[allow(clippy::print_stdout)]
    {
        println!("user_id: {user_id}");
    }
    Ok(())
}
