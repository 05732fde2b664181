// Login flow and session refresh
//
// Phone lookup, SMS confirmation and token refresh live under `/auth/v2`
// and go out unsigned: they are how a session is obtained in the first
// place. The operator catalogue is public as well.

use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use secrecy::ExposeSecret;
use tracing::debug;

use crate::auth::{
    ConfirmationRequest, Credentials, LoginAccount, LoginDetails, SessionTokens, validate_phone,
};
use crate::error::Error;
use crate::models::{DataEnvelope, Operator};
use crate::session::client::{SessionClient, expect_success, read_json};

impl SessionClient {
    /// List the vendor's regional operators.
    ///
    /// `GET /public/v1/operators` (unauthenticated)
    pub async fn get_operators(&self) -> Result<Vec<Operator>, Error> {
        let url = self.endpoint("/public/v1/operators")?;
        debug!("GET {url}");

        let resp = self.http().get(url).send().await?;
        let envelope: DataEnvelope<Vec<Operator>> = read_json(resp).await?;
        Ok(envelope.data)
    }

    /// Look up the accounts registered to a phone number.
    ///
    /// The number is validated locally first (11 digits, leading 7 or 8)
    /// so malformed input never costs a round trip. Every returned record
    /// gets the phone attached.
    ///
    /// `GET /auth/v2/login/{phone}` (unauthenticated)
    pub async fn get_login_details(&self, phone: u64) -> Result<Vec<LoginDetails>, Error> {
        validate_phone(phone)?;

        let url = self.endpoint(&format!("/auth/v2/login/{phone}"))?;
        debug!("GET {url}");

        let resp = self.http().get(url).send().await?;
        match resp.status() {
            StatusCode::OK | StatusCode::MULTIPLE_CHOICES => {
                let body = resp.text().await?;
                let accounts: Vec<LoginAccount> =
                    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                        message: e.to_string(),
                        body: body.clone(),
                    })?;
                debug!(count = accounts.len(), "login candidates received");
                Ok(accounts
                    .into_iter()
                    .map(|account| LoginDetails { phone, account })
                    .collect())
            }
            StatusCode::NO_CONTENT => Err(Error::NoContracts { phone }),
            StatusCode::BAD_REQUEST => Err(Error::InvalidPhone {
                phone: phone.to_string(),
                reason: "rejected by the auth service".into(),
            }),
            status => Err(Error::Http {
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Ask the auth service to send an SMS code for the chosen account.
    ///
    /// `POST /auth/v2/confirmation/{phone}` with the account record as body.
    pub async fn send_confirmation(&self, details: &LoginDetails) -> Result<(), Error> {
        let url = self.endpoint(&format!("/auth/v2/confirmation/{}", details.phone))?;
        debug!("POST {url}");

        let resp = self.http().post(url).json(&details.account).send().await?;
        match expect_success(resp).await {
            Err(Error::Http { status: 400, .. }) => Err(Error::InvalidLoginData),
            other => other,
        }
    }

    /// Submit the SMS code and receive a token pair.
    ///
    /// Does not touch the stored credentials; see
    /// [`authenticate`](Self::authenticate) for that.
    ///
    /// `POST /auth/v2/auth/{phone}/confirmation`
    pub async fn login_confirmation(
        &self,
        details: &LoginDetails,
        code: u32,
    ) -> Result<SessionTokens, Error> {
        let url = self.endpoint(&format!("/auth/v2/auth/{}/confirmation", details.phone))?;
        debug!("POST {url}");

        let body = ConfirmationRequest::new(details, code);
        let resp = self.http().post(url).json(&body).send().await?;
        match read_json(resp).await {
            Err(Error::Http { status: 409, .. }) => Err(Error::InvalidLoginData),
            Err(Error::Http { status: 403, .. }) => Err(Error::InvalidConfirmationCode),
            other => other,
        }
    }

    /// Confirm the SMS code and start a session with the resulting tokens.
    pub async fn authenticate(
        &self,
        details: &LoginDetails,
        code: u32,
    ) -> Result<SessionTokens, Error> {
        let tokens = self.login_confirmation(details, code).await?;
        self.set_credentials(Credentials::from_login(details, &tokens));
        debug!(
            operator = tokens.operator_name.as_deref().unwrap_or("unknown"),
            "login complete"
        );
        Ok(tokens)
    }

    /// Exchange the refresh token for a new pair.
    ///
    /// The vendor expects the refresh token in a plain `Bearer` header rather
    /// than `Authorization`.
    ///
    /// `GET /auth/v2/session/refresh`
    pub(crate) async fn refresh_tokens(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionTokens, Error> {
        let url = self.endpoint("/auth/v2/session/refresh")?;
        debug!("GET {url}");

        let mut bearer = HeaderValue::from_str(credentials.refresh_token.expose_secret())
            .map_err(|e| Error::Authentication {
                message: format!("invalid refresh token header value: {e}"),
            })?;
        bearer.set_sensitive(true);

        let resp = self
            .http()
            .get(url)
            .header("Bearer", bearer)
            .header("Operator", credentials.operator_id)
            .send()
            .await?;
        read_json(resp).await
    }
}
