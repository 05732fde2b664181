// Access-control (door/gate) handle
//
// Devices are addressed by id only; the owning place is looked up from the
// place list on every call, so nothing here goes stale.

use tracing::debug;

use crate::camera::Camera;
use crate::error::Error;
use crate::models::{Place, ResolvedAccessControl};
use crate::session::SessionClient;

/// One door, gate or barrier, addressed by id.
#[derive(Debug, Clone)]
pub struct AccessControl {
    session: SessionClient,
    id: u64,
}

impl AccessControl {
    pub fn new(session: SessionClient, id: u64) -> Self {
        Self { session, id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    /// Find this device across all places.
    pub async fn resolve(&self) -> Result<ResolvedAccessControl, Error> {
        let places = self.session.get_places().await?;
        find_access_control(&places, self.id).ok_or(Error::AccessControlNotFound { id: self.id })
    }

    /// Trigger the open action.
    ///
    /// A device that vanished between lookup and action is reported the same
    /// way as one that was never there.
    pub async fn open(&self) -> Result<(), Error> {
        let resolved = self.resolve().await?;
        debug!(place_id = resolved.place_id, id = self.id, "opening access control");

        match self.session.post_open_action(resolved.place_id, self.id).await {
            Err(Error::Http { status: 500, .. }) => {
                Err(Error::AccessControlNotFound { id: self.id })
            }
            other => other,
        }
    }

    /// The camera watching this device, matched through its Forpost group.
    pub async fn resolve_camera(&self) -> Result<Camera, Error> {
        let resolved = self.resolve().await?;
        let group_id = resolved.descriptor.forpost_group_id;
        let not_found = || Error::GroupCameraNotFound {
            group_id: group_id.clone(),
        };

        let Ok(group) = group_id.trim().parse::<u64>() else {
            return Err(not_found());
        };

        let cameras = self.session.get_forpost_cameras().await?;
        cameras
            .iter()
            .find(|camera| camera.in_group(group))
            .map(|camera| Camera::new(self.session.clone(), camera.id))
            .ok_or_else(not_found)
    }
}

impl SessionClient {
    /// Handle for the access control with `id`. No request is made.
    pub fn access_control(&self, id: u64) -> AccessControl {
        AccessControl::new(self.clone(), id)
    }
}

/// First access control with `id` in `places`, tagged with its place id.
pub fn find_access_control(places: &[Place], id: u64) -> Option<ResolvedAccessControl> {
    places.iter().find_map(|place| {
        place
            .access_controls
            .iter()
            .find(|ac| ac.id == id)
            .map(|ac| ResolvedAccessControl {
                place_id: place.id,
                descriptor: ac.clone(),
            })
    })
}
