// Session HTTP client
//
// Wraps `reqwest::Client` with request signing, refresh-on-401 and the
// credential state. Endpoint groups (login, account, forpost) are inherent
// methods in sibling files; this module only deals with transport mechanics.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::auth::{Credentials, TokenRefresh};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Capacity of the refresh notification channel. Slow subscribers only
/// miss intermediate pairs; the latest one is always in `credentials()`.
const REFRESH_CHANNEL_SIZE: usize = 16;

/// Snapshot of the credential bundle.
///
/// `generation` increases on every change, so a request can tell whether
/// the credentials it was signed with are still current.
#[derive(Debug, Clone, Default)]
struct SessionState {
    credentials: Option<Arc<Credentials>>,
    ready: bool,
    generation: u64,
}

struct Inner {
    http: reqwest::Client,
    base_url: Url,
    state: ArcSwap<SessionState>,
    /// Serialises refreshes so concurrent 401s converge on one refresh call.
    refresh_lock: Mutex<()>,
    readiness: watch::Sender<bool>,
    refreshed: broadcast::Sender<TokenRefresh>,
}

/// Async client for the MyHome subscriber API.
///
/// Cloning is cheap and every clone shares the same session. Authenticated
/// calls fail with [`Error::NotAuthenticated`] until credentials are set,
/// either directly via [`set_credentials`](Self::set_credentials) or by
/// completing the SMS login flow with [`authenticate`](Self::authenticate).
#[derive(Clone)]
pub struct SessionClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl SessionClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, normally [`DEFAULT_API_URL`].
    ///
    /// [`DEFAULT_API_URL`]: crate::DEFAULT_API_URL
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        let (readiness, _) = watch::channel(false);
        let (refreshed, _) = broadcast::channel(REFRESH_CHANNEL_SIZE);
        Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                state: ArcSwap::from_pointee(SessionState::default()),
                refresh_lock: Mutex::new(()),
                readiness,
                refreshed,
            }),
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The underlying HTTP client (for unauthenticated calls).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    // ── Credential state ─────────────────────────────────────────────

    /// Replace the stored credentials and mark the session ready.
    pub fn set_credentials(&self, credentials: Credentials) {
        let credentials = Arc::new(credentials);
        self.inner.state.rcu(|current| SessionState {
            credentials: Some(Arc::clone(&credentials)),
            ready: true,
            generation: current.generation + 1,
        });
        self.inner.readiness.send_replace(true);
        debug!(operator_id = credentials.operator_id, "credentials set");
    }

    /// Whether authenticated calls may be attempted.
    pub fn is_ready(&self) -> bool {
        self.inner.state.load().ready
    }

    /// A copy of the current credentials, if any were ever set.
    ///
    /// Still returns the last known set after a failed refresh; check
    /// [`is_ready`](Self::is_ready) to know whether they are usable.
    pub fn credentials(&self) -> Option<Credentials> {
        self.inner
            .state
            .load()
            .credentials
            .as_deref()
            .cloned()
    }

    /// Watch readiness changes (set on login, cleared on refresh failure).
    pub fn readiness(&self) -> watch::Receiver<bool> {
        self.inner.readiness.subscribe()
    }

    /// Subscribe to refreshed token pairs, e.g. to persist them.
    pub fn subscribe_refresh(&self) -> broadcast::Receiver<TokenRefresh> {
        self.inner.refreshed.subscribe()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append an absolute API path (e.g. `/rest/v1/subscriberplaces`) to the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    // ── Request signing ──────────────────────────────────────────────

    /// Build the auth headers for the current credentials.
    ///
    /// Fails before any request is built when the session is not ready.
    /// Also returns the generation the headers belong to.
    fn auth_headers(&self) -> Result<(HeaderMap, u64), Error> {
        let state = self.inner.state.load();
        let credentials = match state.credentials.as_deref() {
            Some(credentials) if state.ready => credentials,
            _ => return Err(Error::NotAuthenticated),
        };

        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", credentials.access_token.expose_secret()))
                .map_err(|e| Error::Authentication {
                    message: format!("invalid access token header value: {e}"),
                })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("Operator", HeaderValue::from(credentials.operator_id));
        Ok((headers, state.generation))
    }

    /// Sign and send a request, refreshing the session once on HTTP 401.
    ///
    /// `build` is called again for the replay, so it must produce the same
    /// request every time.
    pub(crate) async fn send_signed<F>(&self, build: F) -> Result<reqwest::Response, Error>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder + Send + Sync,
    {
        let (headers, generation) = self.auth_headers()?;
        let resp = build(&self.inner.http).headers(headers).send().await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        debug!(url = %resp.url(), "got 401, refreshing session");
        self.refresh_after(generation).await?;

        let (headers, _) = self.auth_headers()?;
        let resp = build(&self.inner.http).headers(headers).send().await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }
        Ok(resp)
    }

    /// Signed GET returning the decoded JSON body.
    pub(crate) async fn get_signed<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.endpoint(path)?;
        debug!("GET {url}");

        let resp = self.send_signed(|http| http.get(url.clone())).await?;
        read_json(resp).await
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Refresh the token pair after a request signed at `failed_generation`
    /// was rejected.
    ///
    /// If another request already replaced those credentials while we
    /// waited for the lock, there is nothing to refresh.
    async fn refresh_after(&self, failed_generation: u64) -> Result<(), Error> {
        let _guard = self.inner.refresh_lock.lock().await;

        let state = self.inner.state.load_full();
        if state.generation != failed_generation {
            if state.ready {
                trace!("session already refreshed by a concurrent request");
                return Ok(());
            }
            return Err(Error::NotAuthenticated);
        }
        let Some(credentials) = state.credentials.clone() else {
            return Err(Error::NotAuthenticated);
        };

        match self.refresh_tokens(&credentials).await {
            Ok(tokens) => {
                let next = Arc::new(credentials.with_tokens(&tokens));
                let replacement = SessionState {
                    credentials: Some(Arc::clone(&next)),
                    ready: true,
                    generation: state.generation + 1,
                };
                let previous = self.inner.state.compare_and_swap(&state, Arc::new(replacement));
                if !Arc::ptr_eq(&*previous, &state) {
                    trace!("credentials replaced during refresh, keeping the newer set");
                    return Ok(());
                }

                info!(operator_id = next.operator_id, "session tokens refreshed");
                self.inner
                    .refreshed
                    .send(TokenRefresh {
                        operator_id: next.operator_id,
                        access_token: next.access_token.clone(),
                        refresh_token: next.refresh_token.clone(),
                    })
                    .ok();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "token refresh failed, session is no longer ready");
                let unready = SessionState {
                    ready: false,
                    ..(*state).clone()
                };
                let previous = self.inner.state.compare_and_swap(&state, Arc::new(unready));
                if Arc::ptr_eq(&*previous, &state) {
                    self.inner.readiness.send_replace(false);
                }
                Err(err)
            }
        }
    }
}

// ── Response helpers ─────────────────────────────────────────────────

/// Decode a JSON body, or turn a non-success status into [`Error::Http`].
pub(crate) async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(Error::Http {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview = body_preview(&body);
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

/// Discard the body of a success response; errors keep theirs.
pub(crate) async fn expect_success(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Http {
        status: status.as_u16(),
        body,
    })
}

/// First 200 characters of a body, for error messages.
pub(crate) fn body_preview(body: &str) -> &str {
    body.char_indices()
        .nth(200)
        .map_or(body, |(end, _)| &body[..end])
}
