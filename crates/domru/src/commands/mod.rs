//! Command dispatch: bridges CLI args -> session calls -> output formatting.

pub mod access;
pub mod account;
pub mod cameras;
pub mod login;
pub mod util;

use std::path::Path;

use domru_api::SessionClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a session-bound command to the appropriate handler.
///
/// Tokens refreshed while the command ran are written back to the config
/// file, also when the command itself failed.
pub async fn dispatch(
    cmd: Command,
    session: &SessionClient,
    config_path: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut refreshed = session.subscribe_refresh();

    let result = match cmd {
        Command::Login(args) => login::handle(session, args, config_path, global).await,
        Command::Operators => account::operators(session, global).await,
        Command::Places => account::places(session, global).await,
        Command::Profile => account::profile(session, global).await,
        Command::Finances => account::finances(session, global).await,
        Command::Access(args) => access::handle(session, args, global).await,
        Command::Cameras(args) => cameras::handle(session, args, global).await,
        // Handled before a session is built
        Command::Logout | Command::Completions(_) => unreachable!(),
    };

    let persisted = util::persist_refreshed(session, &mut refreshed, config_path);
    first_error(result, persisted)
}

/// Combine the command outcome with the session save. The command's own
/// error wins; a save failure behind it is only logged.
fn first_error(
    result: Result<(), CliError>,
    persisted: Result<(), CliError>,
) -> Result<(), CliError> {
    match (result, persisted) {
        (Ok(()), persisted) => persisted,
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(save_err)) => {
            tracing::warn!(error = %save_err, "refreshed session could not be saved");
            Err(err)
        }
    }
}
