//! Forpost camera handlers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use serde::Serialize;
use tabled::Tabled;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use domru_api::{Error, ForpostCamera, Snapshot, SessionClient};

use crate::cli::{CamerasArgs, CamerasCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Groups")]
    groups: String,
}

impl From<&ForpostCamera> for CameraRow {
    fn from(c: &ForpostCamera) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            active: output::yes_no(c.is_active != 0),
            groups: group_ids(c),
        }
    }
}

fn group_ids(c: &ForpostCamera) -> String {
    if c.parent_groups.is_empty() {
        return "-".into();
    }
    c.parent_groups
        .iter()
        .map(|g| g.id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn detail(c: &ForpostCamera) -> String {
    let mut lines = vec![
        format!("ID:      {}", c.id),
        format!("Name:    {}", c.name),
        format!("Active:  {}", output::yes_no(c.is_active != 0)),
        format!("Sound:   {}", output::yes_no(c.is_sound != 0)),
        format!("State:   {}", c.state),
    ];
    for group in &c.parent_groups {
        lines.push(format!("Group:   {} ({})", group.id, group.name));
    }
    if let Some(ref mode) = c.motion_detector_mode {
        lines.push(format!("Motion:  {mode}"));
    }
    lines.join("\n")
}

#[derive(Serialize)]
struct StreamInfo {
    camera_id: u64,
    url: String,
}

/// Render one camera in the selected output format.
pub fn print_camera(camera: &ForpostCamera, global: &GlobalOpts) {
    let out = output::render_single(&global.output, camera, detail, |c| c.id.to_string());
    output::print_output(&out, global.quiet);
}

/// Copy the snapshot body into `writer` chunk by chunk. Returns the byte count.
async fn write_snapshot<W>(snapshot: Snapshot, writer: &mut W) -> Result<usize, CliError>
where
    W: AsyncWrite + Unpin,
{
    let mut stream = snapshot.into_stream();
    let mut written = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(CliError::from)?;
        writer.write_all(&chunk).await?;
        written += chunk.len();
    }
    writer.flush().await?;
    Ok(written)
}

/// Sibling of `path` the download goes to until it completes.
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

async fn save_snapshot(snapshot: Snapshot, path: &Path) -> Result<usize, CliError> {
    let mut out = tokio::fs::File::create(path).await?;
    write_snapshot(snapshot, &mut out).await
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &SessionClient,
    args: CamerasArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CamerasCommand::List => {
            let cameras = session.get_forpost_cameras().await?;
            let out = output::render_list(
                &global.output,
                &cameras,
                |c| CameraRow::from(c),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CamerasCommand::Show { id } => {
            let camera = session.camera(id).resolve().await?;
            print_camera(&camera, global);
            Ok(())
        }

        CamerasCommand::Snapshot { id, file } => snapshot(session, id, file, global).await,

        CamerasCommand::Stream { id } => {
            let url = session.camera(id).stream_url().await?;
            let info = StreamInfo { camera_id: id, url };
            let out = output::render_single(&global.output, &info, |i| i.url.clone(), |i| {
                i.url.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

async fn snapshot(
    session: &SessionClient,
    id: u64,
    file: Option<PathBuf>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = session.camera(id).snapshot().await?;
    tracing::debug!(
        content_type = snapshot.content_type().unwrap_or("unknown"),
        content_length = ?snapshot.content_length(),
        "snapshot download started"
    );

    let Some(path) = file else {
        let mut stdout = tokio::io::stdout();
        write_snapshot(snapshot, &mut stdout).await?;
        return Ok(());
    };

    let partial = partial_path(&path);
    let written = match save_snapshot(snapshot, &partial).await {
        Ok(0) => Err(Error::Remote {
            message: format!("camera {id} returned an empty snapshot"),
        }
        .into()),
        other => other,
    };
    let written = match written {
        Ok(written) => written,
        Err(err) => {
            if let Err(e) = tokio::fs::remove_file(&partial).await {
                tracing::debug!(
                    path = %partial.display(),
                    error = %e,
                    "partial snapshot not removed"
                );
            }
            return Err(err);
        }
    };
    tokio::fs::rename(&partial, &path).await?;
    output::notice(
        &format!("Saved {written} bytes to {}", path.display()),
        global.quiet,
    );
    Ok(())
}
