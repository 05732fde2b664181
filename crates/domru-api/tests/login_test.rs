#![allow(clippy::unwrap_used)]
// Integration tests for the SMS login flow and the operator catalogue.

use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use domru_api::{Error, LoginAccount, LoginDetails, SessionClient};

const PHONE: u64 = 79_991_234_567;

async fn setup() -> (MockServer, SessionClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = SessionClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn account_json() -> serde_json::Value {
    json!({
        "operatorId": 2,
        "subscriberId": 42,
        "accountId": "590001234",
        "placeId": 7,
        "address": "Lenina 1, apt 5",
        "profileId": null
    })
}

fn details() -> LoginDetails {
    LoginDetails {
        phone: PHONE,
        account: LoginAccount {
            operator_id: 2,
            subscriber_id: 42,
            account_id: Some("590001234".into()),
            place_id: 7,
            address: "Lenina 1, apt 5".into(),
            profile_id: None,
        },
    }
}

// ── Operators ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_operators_is_unsigned() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/public/v1/operators"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": 2, "dispName": "Perm", "authUrl": null, "mobileFeatures": ["vrAvailable"] },
                { "id": 3, "dispName": "Kazan" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let operators = client.get_operators().await.unwrap();

    assert_eq!(operators.len(), 2);
    assert_eq!(operators[0].disp_name, "Perm");
    assert_eq!(operators[0].mobile_features, vec!["vrAvailable".to_owned()]);
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

// ── Phone lookup ────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_phone_never_reaches_network() {
    let (server, client) = setup().await;

    for phone in [7_999_123_456, 69_991_234_567] {
        let result = client.get_login_details(phone).await;
        assert!(
            matches!(result, Err(Error::InvalidPhone { .. })),
            "expected InvalidPhone for {phone}, got: {result:?}"
        );
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_login_details_attach_phone() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/auth/v2/login/{PHONE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            account_json(),
            {
                "operatorId": 2,
                "subscriberId": 43,
                "accountId": null,
                "placeId": 8,
                "address": "Mira 3"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let candidates = client.get_login_details(PHONE).await.unwrap();

    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0], details());
    assert_eq!(candidates[1].phone, PHONE);
    assert_eq!(candidates[1].account.account_id, None);
}

#[tokio::test]
async fn test_login_details_accept_300() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/auth/v2/login/89991234567"))
        .respond_with(ResponseTemplate::new(300).set_body_json(json!([account_json()])))
        .mount(&server)
        .await;

    let candidates = client.get_login_details(89_991_234_567).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].phone, 89_991_234_567);
}

#[tokio::test]
async fn test_login_details_204_is_no_contracts() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/auth/v2/login/{PHONE}")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let result = client.get_login_details(PHONE).await;

    assert!(
        matches!(result, Err(Error::NoContracts { phone: PHONE })),
        "expected NoContracts, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_details_400_is_invalid_phone() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/auth/v2/login/{PHONE}")))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let result = client.get_login_details(PHONE).await;

    assert!(
        matches!(result, Err(Error::InvalidPhone { .. })),
        "expected InvalidPhone, got: {result:?}"
    );
}

// ── Confirmation ────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_confirmation_posts_account_record() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("/auth/v2/confirmation/{PHONE}")))
        .and(body_json(account_json()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.send_confirmation(&details()).await.unwrap();
}

#[tokio::test]
async fn test_send_confirmation_400_is_invalid_login_data() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("/auth/v2/confirmation/{PHONE}")))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let result = client.send_confirmation(&details()).await;

    assert!(matches!(result, Err(Error::InvalidLoginData)), "got: {result:?}");
}

#[tokio::test]
async fn test_authenticate_stores_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("/auth/v2/auth/{PHONE}/confirmation")))
        .and(body_json(json!({
            "operatorId": 2,
            "subscriberId": 42,
            "accountId": "590001234",
            "login": PHONE,
            "confirm1": "1234"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "operatorId": 2,
            "operatorName": "Perm",
            "tokenType": "Bearer",
            "accessToken": "access-1",
            "expiresIn": null,
            "refreshToken": "refresh-1",
            "refreshExpiresIn": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.is_ready());
    let tokens = client.authenticate(&details(), 1234).await.unwrap();

    assert_eq!(tokens.operator_name.as_deref(), Some("Perm"));
    assert!(client.is_ready());
    let creds = client.credentials().unwrap();
    assert_eq!(creds.operator_id, 2);
    assert_eq!(creds.access_token.expose_secret(), "access-1");
    assert_eq!(creds.refresh_token.expose_secret(), "refresh-1");
    assert_eq!(creds.phone, Some(PHONE));
    assert_eq!(creds.subscriber_id, Some(42));
    assert_eq!(creds.account_id.as_deref(), Some("590001234"));
    assert_eq!(creds.place_id, Some(7));
}

#[tokio::test]
async fn test_login_confirmation_leaves_session_untouched() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("/auth/v2/auth/{PHONE}/confirmation")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1"
        })))
        .mount(&server)
        .await;

    let tokens = client.login_confirmation(&details(), 1234).await.unwrap();

    assert_eq!(tokens.access_token.expose_secret(), "access-1");
    assert!(!client.is_ready());
    assert!(client.credentials().is_none());
}

#[tokio::test]
async fn test_login_confirmation_error_mapping() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("/auth/v2/auth/{PHONE}/confirmation")))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/auth/v2/auth/{PHONE}/confirmation")))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    let wrong_code = client.authenticate(&details(), 1111).await;
    assert!(
        matches!(wrong_code, Err(Error::InvalidConfirmationCode)),
        "got: {wrong_code:?}"
    );

    let bad_data = client.authenticate(&details(), 1111).await;
    assert!(matches!(bad_data, Err(Error::InvalidLoginData)), "got: {bad_data:?}");

    assert!(!client.is_ready());
}
