//! Interactive login and account diagnostics.
//!
//! Creates (or validates) the session file used by the relay, prints the
//! logged-in account, and checks that the official account is reachable.

use std::process::ExitCode;
use tg_code_relay::monitor::probe_account;
use tg_code_relay::{session, ApiCredentials, TelegramTransport, Transport, TELEGRAM_OFFICIAL_ID};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let credentials = match ApiCredentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Set the required environment variables and run again");
            return ExitCode::FAILURE;
        }
    };

    let mut transport = TelegramTransport::with_credentials(credentials, session::session_path());

    let code = match login(&mut transport).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Login failed: {e}");
            ExitCode::FAILURE
        }
    };

    transport.disconnect().await;
    code
}

async fn login(transport: &mut TelegramTransport) -> tg_code_relay::Result<()> {
    println!("Connecting to Telegram...");
    transport.connect().await?;

    if !transport.is_authorized().await? {
        transport.login().await?;
        if !transport.is_authorized().await? {
            return Err(tg_code_relay::Error::NotAuthorized);
        }
    }

    let me = transport.me().await?;
    println!("Logged in");
    println!("User:     {}", me.display_name);
    println!("Username: @{}", me.username.as_deref().unwrap_or("N/A"));
    println!("Phone:    {}", me.phone.as_deref().unwrap_or("N/A"));
    println!("User ID:  {}", me.id);

    match probe_account(transport, TELEGRAM_OFFICIAL_ID).await {
        Ok(probe) => {
            println!(
                "Official account reachable: {}",
                probe.display_name.as_deref().unwrap_or("Unknown")
            );
            println!("Recent official messages: {}", probe.recent_count);
        }
        Err(e) => println!("Could not reach official account: {e}"),
    }

    Ok(())
}
