// Session gate. A `MistClient` can only be obtained through `connect`, which
// checks the token against `/api/v1/self` first; a rejected token never gets
// as far as a data request.

use crate::api::{ApiClient, ApiError};
use crate::model::{Country, CountryEntry, RfTemplate, SelfInfo};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const SELF_PATH: &str = "/api/v1/self";
const COUNTRIES_PATH: &str = "/api/v1/const/countries";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Mist rejected the API token (HTTP {status}); please verify authentication and try again")]
    Rejected { status: u16 },
    #[error("could not verify Mist authentication: {0}")]
    Unreachable(#[source] ApiError),
}

/// One GET to the identity endpoint. Only HTTP 200 counts as success.
pub fn verify_session(api: &ApiClient) -> Result<SelfInfo, AuthError> {
    let res = api.get(SELF_PATH).map_err(AuthError::Unreachable)?;
    if res.status != 200 {
        log::warn!("identity check returned HTTP {}", res.status);
        return Err(AuthError::Rejected { status: res.status });
    }
    // Only the status decides; the body is informational.
    Ok(res.json().unwrap_or_else(|e| {
        log::warn!("identity response could not be decoded: {}", e);
        SelfInfo::default()
    }))
}

/// Authenticated client with the typed Mist operations.
pub struct MistClient {
    api: ApiClient,
    identity: SelfInfo,
}

impl MistClient {
    /// Verify the session, then hand back a usable client.
    pub fn connect(api: ApiClient) -> Result<Self, AuthError> {
        let identity = verify_session(&api)?;
        log::info!(
            "authenticated as {}",
            identity
                .email
                .as_deref()
                .or(identity.name.as_deref())
                .unwrap_or("<unknown>")
        );
        Ok(MistClient { api, identity })
    }

    pub fn identity(&self) -> &SelfInfo {
        &self.identity
    }

    /// Global list of countries known to Mist.
    pub fn countries(&self) -> Result<Vec<Country>, ApiError> {
        self.api.get_json(COUNTRIES_PATH)
    }

    /// Channel allowance for one country, evaluated against `site_id`.
    pub fn ap_channels(&self, site_id: &str, country_code: &str) -> Result<CountryEntry, ApiError> {
        self.api.get_json(&format!(
            "/api/v1/sites/{}/devices/ap_channels?country_code={}",
            site_id, country_code
        ))
    }

    pub fn rf_templates(&self) -> Result<Vec<RfTemplate>, ApiError> {
        self.api
            .get_json(&format!("/api/v1/orgs/{}/rftemplates", self.api.org()))
    }

    /// First RF template called `name`, if any.
    pub fn rf_template_by_name(&self, name: &str) -> Result<Option<RfTemplate>, ApiError> {
        Ok(self.rf_templates()?.into_iter().find(|t| t.name == name))
    }

    /// Create a site in the org; returns the created site as sent back by Mist.
    pub fn create_site<B: Serialize + ?Sized>(&self, body: &B) -> Result<Value, ApiError> {
        self.api
            .post_json(&format!("/api/v1/orgs/{}/sites", self.api.org()), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn api(server: &MockServer) -> ApiClient {
        ApiClient::with_base_url(&server.base_url(), "org-1", "tok").unwrap()
    }

    fn mock_self_ok(server: &MockServer) {
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/self");
            then.status(200).json_body(json!({"email": "ops@example.com"}));
        });
    }

    #[test]
    fn rejected_token_blocks_all_fetches() {
        let server = MockServer::start();
        let self_mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/self");
            then.status(401).body(r#"{"detail":"Authentication credentials were not provided."}"#);
        });
        let countries = server.mock(|when, then| {
            when.method(GET).path("/api/v1/const/countries");
            then.status(200).json_body(json!([]));
        });

        let err = MistClient::connect(api(&server)).err().unwrap();
        assert!(matches!(err, AuthError::Rejected { status: 401 }));
        self_mock.assert();
        countries.assert_hits(0);
    }

    #[test]
    fn non_200_success_is_still_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/self");
            then.status(204);
        });
        let err = verify_session(&api(&server)).unwrap_err();
        assert!(matches!(err, AuthError::Rejected { status: 204 }));
    }

    #[test]
    fn unreachable_host_fails_verification() {
        let api = ApiClient::with_base_url("http://127.0.0.1:9", "org", "t").unwrap();
        let err = verify_session(&api).unwrap_err();
        assert!(matches!(err, AuthError::Unreachable(ApiError::Transport { .. })));
    }

    #[test]
    fn empty_identity_body_still_passes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/self");
            then.status(200).body("");
        });
        let client = MistClient::connect(api(&server)).unwrap();
        assert_eq!(client.identity(), &SelfInfo::default());
    }

    #[test]
    fn connect_keeps_identity() {
        let server = MockServer::start();
        mock_self_ok(&server);
        let client = MistClient::connect(api(&server)).unwrap();
        assert_eq!(client.identity().email.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn queries_ap_channels_by_country_code() {
        let server = MockServer::start();
        mock_self_ok(&server);
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/sites/site-7/devices/ap_channels")
                .query_param("country_code", "DE");
            then.status(200).json_body(json!({
                "name": "Germany",
                "key": "DE",
                "band24_enabled": true,
                "band24_40mhz_allowed": false,
                "band5_enabled": true,
                "band24_channels": {"20": [1, 6, 11]},
                "band5_channels": {"20": [36, 40]}
            }));
        });

        let client = MistClient::connect(api(&server)).unwrap();
        let entry = client.ap_channels("site-7", "DE").unwrap();
        mock.assert();
        assert_eq!(entry.key, "DE");
        assert_eq!(entry.band24_channels["20"], vec![1, 6, 11]);
    }

    #[test]
    fn finds_rf_template_by_name() {
        let server = MockServer::start();
        mock_self_ok(&server);
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/orgs/org-1/rftemplates");
            then.status(200).json_body(json!([
                {"id": "1", "name": "warehouse"},
                {"id": "2", "name": "office", "country_code": "US"},
                {"id": "3", "name": "office"}
            ]));
        });

        let client = MistClient::connect(api(&server)).unwrap();
        let tpl = client.rf_template_by_name("office").unwrap().unwrap();
        assert_eq!(tpl.id.as_deref(), Some("2"));
        assert!(client.rf_template_by_name("lobby").unwrap().is_none());
    }

    #[test]
    fn creates_site_in_org() {
        let server = MockServer::start();
        mock_self_ok(&server);
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/orgs/org-1/sites")
                .json_body(json!({"name": "branch", "country_code": "US"}));
            then.status(200).json_body(json!({"id": "s-1", "name": "branch"}));
        });

        let client = MistClient::connect(api(&server)).unwrap();
        let site = client
            .create_site(&json!({"name": "branch", "country_code": "US"}))
            .unwrap();
        mock.assert();
        assert_eq!(site["id"], "s-1");
    }
}
