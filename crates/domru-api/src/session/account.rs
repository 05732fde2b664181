// Subscriber account endpoints
//
// Places, profile, finances and the access-control open action. All of
// them are signed; nothing is cached, every call is a fresh round trip.

use serde::Serialize;
use tracing::debug;

use crate::error::Error;
use crate::models::{DataEnvelope, Place, SubscriberFinances, SubscriberPlace, SubscriberProfile};
use crate::session::client::{SessionClient, expect_success};

/// Action name understood by `/accesscontrols/{id}/actions`.
const ACCESS_CONTROL_OPEN: &str = "accessControlOpen";

#[derive(Debug, Serialize)]
struct ActionRequest {
    name: &'static str,
}

impl SessionClient {
    /// List the subscriber's place memberships, including role and block state.
    ///
    /// `GET /rest/v1/subscriberplaces`
    pub async fn get_subscriber_places(&self) -> Result<Vec<SubscriberPlace>, Error> {
        let envelope: DataEnvelope<Vec<SubscriberPlace>> =
            self.get_signed("/rest/v1/subscriberplaces").await?;
        Ok(envelope.data)
    }

    /// List the subscriber's places (the `data[].place` objects).
    pub async fn get_places(&self) -> Result<Vec<Place>, Error> {
        let places = self.get_subscriber_places().await?;
        Ok(places.into_iter().map(|entry| entry.place).collect())
    }

    /// `GET /rest/v1/subscribers/profiles`
    pub async fn get_profile(&self) -> Result<SubscriberProfile, Error> {
        let envelope: DataEnvelope<SubscriberProfile> =
            self.get_signed("/rest/v1/subscribers/profiles").await?;
        Ok(envelope.data)
    }

    /// `GET /rest/v1/subscribers/profiles/finances` (not enveloped)
    pub async fn get_finances(&self) -> Result<SubscriberFinances, Error> {
        self.get_signed("/rest/v1/subscribers/profiles/finances")
            .await
    }

    /// Open a door or gate by place and device id.
    ///
    /// The vendor answers HTTP 500 for unknown ids; that is reported as
    /// [`Error::PlaceOrDeviceNotFound`].
    pub async fn open_access_control(
        &self,
        place_id: u64,
        access_control_id: u64,
    ) -> Result<(), Error> {
        match self.post_open_action(place_id, access_control_id).await {
            Err(Error::Http { status: 500, .. }) => Err(Error::PlaceOrDeviceNotFound {
                place_id,
                access_control_id,
            }),
            other => other,
        }
    }

    /// `POST /rest/v1/places/{place_id}/accesscontrols/{id}/actions`
    ///
    /// Status codes are left untranslated for the caller to interpret.
    pub(crate) async fn post_open_action(
        &self,
        place_id: u64,
        access_control_id: u64,
    ) -> Result<(), Error> {
        let url = self.endpoint(&format!(
            "/rest/v1/places/{place_id}/accesscontrols/{access_control_id}/actions"
        ))?;
        debug!("POST {url}");

        let body = ActionRequest {
            name: ACCESS_CONTROL_OPEN,
        };
        let resp = self
            .send_signed(|http| http.post(url.clone()).json(&body))
            .await?;
        expect_success(resp).await
    }
}
