//! Access-control (door/gate) handlers.

use tabled::Tabled;

use domru_api::{ResolvedAccessControl, SessionClient};

use crate::cli::{AccessArgs, AccessCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, or_dash, yes_no};

use super::cameras;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccessControlRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Place")]
    place: u64,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Open")]
    open: String,
    #[tabled(rename = "Video")]
    video: String,
}

impl From<&ResolvedAccessControl> for AccessControlRow {
    fn from(ac: &ResolvedAccessControl) -> Self {
        Self {
            id: ac.descriptor.id,
            name: ac.descriptor.name.clone(),
            place: ac.place_id,
            kind: or_dash(ac.descriptor.kind.as_deref()),
            open: yes_no(ac.descriptor.allow_open),
            video: yes_no(ac.descriptor.allow_video),
        }
    }
}

fn detail(ac: &ResolvedAccessControl) -> String {
    let d = &ac.descriptor;
    let group = if d.forpost_group_id.is_empty() {
        "-"
    } else {
        d.forpost_group_id.as_str()
    };
    [
        format!("ID:      {}", d.id),
        format!("Name:    {}", d.name),
        format!("Place:   {}", ac.place_id),
        format!("Type:    {}", or_dash(d.kind.as_deref())),
        format!("Open:    {}", yes_no(d.allow_open)),
        format!("Video:   {}", yes_no(d.allow_video)),
        format!("Group:   {group}"),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &SessionClient,
    args: AccessArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AccessCommand::List => {
            let places = session.get_places().await?;
            let all: Vec<ResolvedAccessControl> = places
                .iter()
                .flat_map(|place| {
                    place
                        .access_controls
                        .iter()
                        .map(|ac| ResolvedAccessControl {
                            place_id: place.id,
                            descriptor: ac.clone(),
                        })
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &all,
                |ac| AccessControlRow::from(ac),
                |ac| ac.descriptor.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AccessCommand::Show { id } => {
            let resolved = session.access_control(id).resolve().await?;
            let out = output::render_single(&global.output, &resolved, detail, |ac| {
                ac.descriptor.id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AccessCommand::Open { id } => {
            session.access_control(id).open().await?;
            output::notice(&format!("Access control {id} opened"), global.quiet);
            Ok(())
        }

        AccessCommand::Camera { id } => {
            let camera = session.access_control(id).resolve_camera().await?;
            let info = camera.resolve().await?;
            cameras::print_camera(&info, global);
            Ok(())
        }
    }
}
