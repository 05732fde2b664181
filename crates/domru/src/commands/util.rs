//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use tokio::sync::broadcast::{self, error::TryRecvError};

use domru_api::{LoginDetails, SessionClient, TokenRefresh};

use crate::error::CliError;

/// Write the session back to the config file if any refresh notification
/// arrived on `refreshed`.
pub fn persist_refreshed(
    session: &SessionClient,
    refreshed: &mut broadcast::Receiver<TokenRefresh>,
    config_path: &Path,
) -> Result<(), CliError> {
    let mut any = false;
    loop {
        match refreshed.try_recv() {
            Ok(_) | Err(TryRecvError::Lagged(_)) => any = true,
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    if !any {
        return Ok(());
    }

    if let Some(credentials) = session.credentials() {
        domru_config::save_session(config_path, &credentials)
            .map_err(|e| CliError::from_config(e, config_path))?;
        tracing::info!(path = %config_path.display(), "refreshed session saved");
    }
    Ok(())
}

fn interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

fn prompt_error(e: dialoguer::Error) -> CliError {
    CliError::Io(std::io::Error::other(e))
}

/// Ask for the phone number.
pub fn prompt_phone() -> Result<String, CliError> {
    if !interactive() {
        return Err(CliError::NonInteractive {
            what: "phone prompt".into(),
            hint: "Pass the number with --phone.".into(),
        });
    }
    dialoguer::Input::<String>::new()
        .with_prompt("Phone number")
        .interact_text()
        .map_err(prompt_error)
}

/// Pick one of several login candidates, by `--account` index or a menu.
pub fn select_account(
    candidates: &[LoginDetails],
    index: Option<usize>,
) -> Result<usize, CliError> {
    if let Some(index) = index {
        if index >= candidates.len() {
            return Err(CliError::Validation {
                field: "account".into(),
                reason: format!(
                    "index {index} out of range, {} account(s) available",
                    candidates.len()
                ),
            });
        }
        return Ok(index);
    }
    if candidates.len() == 1 {
        return Ok(0);
    }
    if !interactive() {
        return Err(CliError::NonInteractive {
            what: "account selection".into(),
            hint: format!(
                "{} accounts match this phone; choose one with --account 0..{}.",
                candidates.len(),
                candidates.len() - 1
            ),
        });
    }

    let labels: Vec<String> = candidates.iter().map(account_label).collect();
    dialoguer::Select::new()
        .with_prompt("Select account")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_error)
}

/// One-line description of a login candidate.
pub fn account_label(details: &LoginDetails) -> String {
    let account = &details.account;
    let address = if account.address.is_empty() {
        "(no address)"
    } else {
        account.address.as_str()
    };
    match account.account_id {
        Some(ref id) => format!("{address} [account {id}]"),
        None => format!("{address} [subscriber {}]", account.subscriber_id),
    }
}

/// Ask for the SMS code.
pub fn prompt_code() -> Result<u32, CliError> {
    if !interactive() {
        return Err(CliError::NonInteractive {
            what: "SMS code prompt".into(),
            hint: "Pass the code with --code.".into(),
        });
    }
    dialoguer::Input::<u32>::new()
        .with_prompt("SMS code")
        .interact_text()
        .map_err(prompt_error)
}
