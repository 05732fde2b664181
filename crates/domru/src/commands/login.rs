//! Login and logout handlers.

use std::path::Path;

use domru_api::{SessionClient, parse_phone};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

use super::util;

/// Phone → account → SMS code → session, saved to the config file.
pub async fn handle(
    session: &SessionClient,
    args: LoginArgs,
    config_path: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let raw_phone = match args.phone {
        Some(phone) => phone,
        None => util::prompt_phone()?,
    };
    let phone = parse_phone(&raw_phone)?;

    let candidates = session.get_login_details(phone).await?;
    if candidates.is_empty() {
        return Err(domru_api::Error::NoContracts { phone }.into());
    }
    let index = util::select_account(&candidates, args.account)?;
    let details = &candidates[index];
    tracing::debug!(account = %util::account_label(details), "account selected");

    let code = match args.code {
        Some(code) => code,
        None => {
            session.send_confirmation(details).await?;
            output::notice(&format!("SMS code sent to {phone}"), global.quiet);
            util::prompt_code()?
        }
    };

    let tokens = session.authenticate(details, code).await?;

    if args.no_save {
        output::notice("Logged in (session not saved)", global.quiet);
        return Ok(());
    }
    if let Some(credentials) = session.credentials() {
        domru_config::save_session(config_path, &credentials)
            .map_err(|e| CliError::from_config(e, config_path))?;
    }
    let operator = tokens.operator_name.as_deref().unwrap_or("MyHome");
    output::notice(
        &format!(
            "Logged in to {operator} as {}; session saved to {}",
            util::account_label(details),
            config_path.display()
        ),
        global.quiet,
    );
    Ok(())
}

/// Drop the stored session. The vendor has no logout endpoint, so nothing
/// is sent over the network.
pub fn logout(config_path: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    let removed = domru_config::clear_session(config_path)
        .map_err(|e| CliError::from_config(e, config_path))?;
    let message = if removed {
        "Session removed"
    } else {
        "No stored session"
    };
    output::notice(message, global.quiet);
    Ok(())
}
