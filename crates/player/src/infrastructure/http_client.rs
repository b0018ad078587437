//! Upload side channel over HTTP
//!
//! Implements the MediaUploadPort trait by POSTing JSON to `<origin>/upload/`.
//! The server authenticates the request with the session cookie and checks
//! the CSRF token header against the `csrftoken` cookie.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::Client;
use url::Url;

use drawesome_shared::{UploadRequest, UploadResponse};

use crate::ports::outbound::{MediaUploadPort, UploadError};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const UPLOAD_PATH: &str = "/upload/";

/// Look up one cookie in a `name=value; name2=value2` string.
pub fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Client for the upload endpoint
#[derive(Clone)]
pub struct UploadClient {
    client: Client,
    endpoint: Url,
    headers: HeaderMap,
}

impl UploadClient {
    pub fn new(
        origin: &Url,
        cookies: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::ClientBuild(e.to_string()))?;

        let mut endpoint = origin.clone();
        endpoint.set_path(UPLOAD_PATH);
        endpoint.set_query(None);

        Ok(Self {
            client,
            endpoint,
            headers: Self::auth_headers(cookies),
        })
    }

    fn auth_headers(cookies: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let Some(cookies) = cookies.filter(|c| !c.trim().is_empty()) else {
            return headers;
        };

        match HeaderValue::from_str(cookies) {
            Ok(value) => {
                headers.insert(COOKIE, value);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring cookie string that is not a valid header")
            }
        }

        match cookie_value(cookies, CSRF_COOKIE).map(HeaderValue::from_str) {
            Some(Ok(token)) => {
                headers.insert(CSRF_HEADER, token);
            }
            Some(Err(e)) => tracing::warn!(error = %e, "Ignoring malformed CSRF token"),
            None => tracing::warn!("No {CSRF_COOKIE} cookie configured; uploads will be rejected"),
        }
        headers
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MediaUploadPort for UploadClient {
    async fn upload(&self, request: UploadRequest) -> Result<UploadResponse, UploadError> {
        let media_type = request.media.kind();
        tracing::debug!(%media_type, endpoint = %self.endpoint, "Uploading media");

        let response = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::RequestFailed(e.to_string()))?;

        // The endpoint answers validation failures with a JSON body, whatever
        // the HTTP status.
        match serde_json::from_str::<UploadResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(UploadError::HttpStatus {
                status: status.as_u16(),
            }),
            Err(e) => Err(UploadError::InvalidResponse(e.to_string())),
        }
    }
}
