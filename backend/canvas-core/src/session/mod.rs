//! Session collaborators: authentication, state fetch, socket endpoint.
//!
//! One HTTP origin serves all three concerns. `/auth` trades host-supplied
//! init data for a session token, `/state` returns the current payload, and
//! `/ws` is the live channel endpoint with the scheme mapped to ws/wss.

use crate::error::session::SessionError;
use crate::protocol::{Payload, ServerFrame};

use common::{ErrorLocation, HttpStatusCode, SessionToken};

use std::panic::Location;
use std::time::Duration;

use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

const DEFAULT_TIMEOUT_DURATION: Duration = Duration::from_secs(30);
const AUTH_ENDPOINT: &str = "auth";
const STATE_ENDPOINT: &str = "state";
const SOCKET_ENDPOINT: &str = "ws";
const TOKEN_QUERY_KEY: &str = "token";

#[derive(Serialize)]
struct AuthRequest<'a> {
    #[serde(rename = "initData")]
    init_data: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: Option<String>,
}

#[derive(Clone)]
pub struct SessionClient {
    base_url: Url,
    client: Client,
}

impl SessionClient {
    pub fn new(base_url_str: &str) -> Result<Self, SessionError> {
        let base_url = Url::parse(base_url_str)?;
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT_DURATION)
            .build()?;

        Ok(Self { base_url, client })
    }

    /// Trade host-supplied init data for a session token.
    ///
    /// Any non-success response, missing token, or transport failure is an
    /// authentication failure; there is no retry at this level.
    pub async fn authenticate(&self, init_data: &str) -> Result<SessionToken, SessionError> {
        let url = self.base_url.join(AUTH_ENDPOINT)?;

        let response = self
            .client
            .post(url)
            .json(&AuthRequest { init_data })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SessionError::Denied {
                message: format!("HTTP {}", response.status().as_u16()),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let body: AuthResponse = serde_json::from_str(&response.text().await?)?;
        match body.token {
            Some(token) if !token.is_empty() => Ok(SessionToken::new(token)),
            _ => Err(SessionError::Denied {
                message: "response carried no session token".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    /// Fetch the current canvas state.
    ///
    /// The endpoint returns the same discriminated object the live channel
    /// pushes, or JSON `null` for "no state yet".
    pub async fn fetch_state(&self, token: &SessionToken) -> Result<Option<Payload>, SessionError> {
        let mut url = self.base_url.join(STATE_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair(TOKEN_QUERY_KEY, token.as_str());

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = HttpStatusCode::from(response.status().as_u16());
            if status.is_retryable() {
                debug!("State endpoint transient failure: HTTP {status}");
            }
            return Err(SessionError::Server {
                status,
                message: response.text().await.unwrap_or_default(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let frame: Option<ServerFrame> = serde_json::from_str(&response.text().await?)?;
        Ok(frame.and_then(ServerFrame::into_payload))
    }

    /// The live channel endpoint for this session.
    ///
    /// Mirrors the page's transport security: http -> ws, https -> wss.
    pub fn socket_url(&self, token: &SessionToken) -> Result<Url, SessionError> {
        let mut url = self.base_url.join(SOCKET_ENDPOINT)?;

        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme).map_err(|_| SessionError::UrlParse {
            message: format!("cannot map scheme for {url}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        url.query_pairs_mut()
            .append_pair(TOKEN_QUERY_KEY, token.as_str());

        Ok(url)
    }
}
