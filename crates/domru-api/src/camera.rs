// Camera handle and snapshot stream

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use crate::error::Error;
use crate::models::ForpostCamera;
use crate::session::SessionClient;

/// One Forpost camera, addressed by id.
///
/// Holds no camera data; every call goes back to the server.
#[derive(Debug, Clone)]
pub struct Camera {
    session: SessionClient,
    id: u64,
}

impl Camera {
    pub fn new(session: SessionClient, id: u64) -> Self {
        Self { session, id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    /// Fetch this camera's descriptor from the roster.
    pub async fn resolve(&self) -> Result<ForpostCamera, Error> {
        self.session
            .get_forpost_cameras()
            .await?
            .into_iter()
            .find(|camera| camera.id == self.id)
            .ok_or(Error::CameraNotFound { id: self.id })
    }

    /// Start downloading a snapshot image.
    pub async fn snapshot(&self) -> Result<Snapshot, Error> {
        self.session.get_camera_snapshot(self.id).await
    }

    /// Live-stream URL of this camera.
    pub async fn stream_url(&self) -> Result<String, Error> {
        self.session.get_camera_stream(self.id).await
    }
}

impl SessionClient {
    /// Handle for the camera with `id`. No request is made.
    pub fn camera(&self, id: u64) -> Camera {
        Camera::new(self.clone(), id)
    }
}

/// An in-flight snapshot download.
///
/// The body is not buffered: read it with [`chunk`](Self::chunk) or turn it
/// into a stream. Dropping the handle releases the connection, also when
/// only part of the image was read.
#[derive(Debug)]
pub struct Snapshot {
    response: reqwest::Response,
}

impl Snapshot {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// `Content-Type` reported by the server, usually `image/jpeg`.
    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Body size, when the server announced one.
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Next chunk of image data, or `None` once the body is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, Error> {
        Ok(self.response.chunk().await?)
    }

    /// Consume the handle as a byte stream.
    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes, Error>> {
        self.response
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::Transport))
            .boxed()
    }
}
