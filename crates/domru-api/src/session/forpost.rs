// Forpost camera endpoints
//
// Roster, snapshots and live-stream URLs from the vendor's Forpost video
// service, proxied under `/rest/v1/forpost`.

use tracing::debug;

use crate::camera::Snapshot;
use crate::error::Error;
use crate::models::{DataEnvelope, ForpostCamera, VideoStream};
use crate::session::client::{SessionClient, read_json};

impl SessionClient {
    /// List every camera visible to the subscriber.
    ///
    /// `GET /rest/v1/forpost/cameras`
    pub async fn get_forpost_cameras(&self) -> Result<Vec<ForpostCamera>, Error> {
        let envelope: DataEnvelope<Vec<ForpostCamera>> =
            self.get_signed("/rest/v1/forpost/cameras").await?;
        Ok(envelope.data)
    }

    /// Start downloading a camera snapshot.
    ///
    /// Only the status line and headers have been read when this returns;
    /// the image is pulled from the returned [`Snapshot`].
    ///
    /// `GET /rest/v1/forpost/cameras/{id}/snapshots`
    pub async fn get_camera_snapshot(&self, camera_id: u64) -> Result<Snapshot, Error> {
        let url = self.endpoint(&format!("/rest/v1/forpost/cameras/{camera_id}/snapshots"))?;
        debug!("GET {url}");

        let resp = self.send_signed(|http| http.get(url.clone())).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(Snapshot::new(resp))
    }

    /// Resolve the live-stream URL of a camera.
    ///
    /// A vendor-side `Error` in the payload becomes [`Error::Remote`];
    /// HTTP 500 means the camera id is unknown.
    ///
    /// `GET /rest/v1/forpost/cameras/{id}/video`
    pub async fn get_camera_stream(&self, camera_id: u64) -> Result<String, Error> {
        let url = self.endpoint(&format!("/rest/v1/forpost/cameras/{camera_id}/video"))?;
        debug!("GET {url}");

        let resp = self.send_signed(|http| http.get(url.clone())).await?;
        match read_json::<DataEnvelope<VideoStream>>(resp).await {
            Ok(envelope) => envelope.data.into_url(),
            Err(Error::Http { status: 500, .. }) => Err(Error::CameraNotFound { id: camera_id }),
            Err(e) => Err(e),
        }
    }
}

impl VideoStream {
    /// The stream URL, or the vendor's error message.
    pub fn into_url(self) -> Result<String, Error> {
        if let Some(message) = self.error.filter(|m| !m.is_empty()) {
            return Err(Error::Remote { message });
        }
        self.url.ok_or_else(|| Error::Remote {
            message: "video response carries no stream URL".into(),
        })
    }
}
