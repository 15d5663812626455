// API client module: a small blocking HTTP client for the Mist management
// API. Every call carries the token and a JSON content type. Results are
// explicit: a transport failure, a non-success status and an undecodable
// body are three different errors.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Default cloud host.
pub const DEFAULT_HOST: &str = "api.mist.com";

/// Errors surfaced by [`ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API token contains characters that cannot be sent in a header")]
    InvalidToken,
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("{url} returned a body that could not be decoded: {source}")]
    Body {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw response: status code plus body text, whatever the status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode a 2xx body as `T`. Anything else is an error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Status {
                url: self.url.clone(),
                status: self.status,
                body: self.body.clone(),
            });
        }
        serde_json::from_str(&self.body).map_err(|source| ApiError::Body {
            url: self.url.clone(),
            source,
        })
    }
}

/// Holds the reqwest blocking client, the base URL of the API and the org
/// the token belongs to.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    org: String,
}

impl ApiClient {
    /// Client for `https://{host}`.
    pub fn new(host: &str, org: &str, token: &str) -> Result<Self, ApiError> {
        Self::with_base_url(&format!("https://{}", host), org, token)
    }

    /// Client for an arbitrary base URL such as `http://127.0.0.1:8080`.
    pub fn with_base_url(base_url: &str, org: &str, token: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .default_headers(auth_headers(token)?)
            .build()
            .map_err(ApiError::Client)?;
        Ok(ApiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            org: org.to_string(),
        })
    }

    pub fn org(&self) -> &str {
        &self.org
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}{path}`; `path` starts with `/`.
    pub fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        let url = self.url(path);
        log::debug!("GET {}", url);
        let res = self.client.get(&url).send();
        read_response(url, res)
    }

    /// POST `body` as JSON to `{base}{path}`.
    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError> {
        let url = self.url(path);
        log::debug!("POST {}", url);
        let res = self.client.post(&url).json(body).send();
        read_response(url, res)
    }

    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get(path)?.json()
    }

    pub fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, body)?.json()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn auth_headers(token: &str) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Token {}", token.trim()))
        .map_err(|_| ApiError::InvalidToken)?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn read_response(
    url: String,
    res: reqwest::Result<reqwest::blocking::Response>,
) -> Result<ApiResponse, ApiError> {
    let res = match res {
        Ok(res) => res,
        Err(source) => {
            log::error!("request to {} failed: {}", url, source);
            return Err(ApiError::Transport { url, source });
        }
    };
    let status = res.status().as_u16();
    match res.text() {
        Ok(body) => {
            log::debug!("{} -> HTTP {}", url, status);
            Ok(ApiResponse { url, status, body })
        }
        Err(source) => {
            log::error!("reading response from {} failed: {}", url, source);
            Err(ApiError::Transport { url, source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    #[test]
    fn get_sends_token_and_content_type() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/self")
                .header("Authorization", "Token secret")
                .header("Content-Type", "application/json");
            then.status(200).json_body(json!({"email": "a@b.c"}));
        });

        let api = ApiClient::with_base_url(&server.base_url(), "org-1", "secret").unwrap();
        let res = api.get("/api/v1/self").unwrap();

        mock.assert();
        assert_eq!(res.status, 200);
        let body: Value = res.json().unwrap();
        assert_eq!(body["email"], "a@b.c");
    }

    #[test]
    fn non_success_status_is_returned_raw_but_rejected_by_json() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not here");
        });

        let api = ApiClient::with_base_url(&server.base_url(), "org", "t").unwrap();
        let res = api.get("/missing").unwrap();
        assert_eq!(res.status, 404);
        assert!(!res.is_success());

        let err = api.get_json::<Value>("/missing").unwrap_err();
        match err {
            ApiError::Status { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, "not here");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_body_is_distinct_from_empty_list() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/empty");
            then.status(200).body("[]");
        });
        server.mock(|when, then| {
            when.method(GET).path("/garbage");
            then.status(200).body("<html>oops</html>");
        });

        let api = ApiClient::with_base_url(&server.base_url(), "org", "t").unwrap();
        let empty: Vec<Value> = api.get_json("/empty").unwrap();
        assert!(empty.is_empty());
        let err = api.get_json::<Vec<Value>>("/garbage").unwrap_err();
        assert!(matches!(err, ApiError::Body { .. }));
    }

    #[test]
    fn posts_json_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/v1/orgs/org-1/sites")
                .header("Authorization", "Token secret")
                .json_body(json!({"name": "lab"}));
            then.status(200).json_body(json!({"id": "site-9", "name": "lab"}));
        });

        let api = ApiClient::with_base_url(&server.base_url(), "org-1", "secret").unwrap();
        let created: Value = api
            .post_json("/api/v1/orgs/org-1/sites", &json!({"name": "lab"}))
            .unwrap();

        mock.assert();
        assert_eq!(created["id"], "site-9");
    }

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Port 9 (discard) is closed on test hosts.
        let api = ApiClient::with_base_url("http://127.0.0.1:9", "org", "t").unwrap();
        let err = api.get("/api/v1/self").unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }

    #[test]
    fn rejects_token_with_newline() {
        let err = ApiClient::new(DEFAULT_HOST, "org", "bad\ntoken").err().unwrap();
        assert!(matches!(err, ApiError::InvalidToken));
    }

    #[test]
    fn new_targets_https_host() {
        let api = ApiClient::new("api.eu.mist.com", "org", "t").unwrap();
        assert_eq!(api.base_url(), "https://api.eu.mist.com");
        assert_eq!(api.org(), "org");
    }
}
