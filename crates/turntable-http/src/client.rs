//! HTTP transport for the catalog API.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use turntable_core::error::{ApiError, AuthError, ConflictError, TransportError};
use turntable_core::{ApiUrl, ConflictKind, Error, Result};

use crate::config::ClientConfig;
use crate::endpoints::ErrorResponse;

/// Details the deployed backend sends with HTTP 400 for membership
/// conflicts, before structured codes existed.
const LEGACY_CONFLICT_DETAILS: &[(&str, ConflictKind)] = &[
    ("Пластинка уже в вишлисте", ConflictKind::AlreadyInWishlist),
    ("Пластинка уже в вашей коллекции", ConflictKind::AlreadyInCollection),
    ("Record is already in wishlist", ConflictKind::AlreadyInWishlist),
    ("Record is already in collection", ConflictKind::AlreadyInCollection),
];

/// A request that can be sent more than once.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            path: path.into(),
            body: None,
        }
    }

    pub fn post<B: serde::Serialize>(path: impl Into<String>, body: &B) -> Result<Self> {
        let body = serde_json::to_value(body).map_err(|e| {
            Error::InvalidInput(turntable_core::error::InvalidInputError::Other {
                message: e.to_string(),
            })
        })?;
        Ok(Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        })
    }
}

/// Map a reqwest failure to the transport error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let error = if err.is_timeout() {
        TransportError::Timeout {
            message: err.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(error)
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            api: config.api_url.clone(),
        })
    }

    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Send a request, optionally with a bearer token. Non-success statuses
    /// are returned as responses, not errors.
    #[instrument(skip(self, request, token), fields(api = %self.api, method = %request.method, path = %request.path))]
    pub async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<reqwest::Response> {
        let url = self.api.endpoint(&request.path);
        debug!(%url, authed = token.is_some(), "API request");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(Self::headers(token)?);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        trace!(status = %response.status(), "API response");
        Ok(response)
    }

    fn headers(token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| AuthError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Decode a JSON body or classify the failure.
    pub async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&bytes).map_err(|e| {
            Error::malformed(status.as_u16(), format!("unexpected response body: {}", e))
        })
    }

    /// Accept any success status and ignore the body.
    pub async fn read_empty(response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn error_from_response(response: reqwest::Response) -> Error {
        let status = response.status();
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<ErrorResponse>(&bytes).unwrap_or_default(),
            Err(_) => ErrorResponse::default(),
        };
        classify(status, body)
    }
}

/// Turn an error response into the error taxonomy.
///
/// A structured `code` wins. Without one, 409 is a generic conflict and
/// the legacy 400 details are mapped to their conflict kind.
pub(crate) fn classify(status: StatusCode, body: ErrorResponse) -> Error {
    let message = body.message();
    let api_error = ApiError::new(status.as_u16(), body.code.clone(), message.clone());

    let conflict = body
        .code
        .as_deref()
        .and_then(ConflictKind::from_code)
        .or_else(|| (status == StatusCode::CONFLICT).then_some(ConflictKind::Other))
        .or_else(|| {
            (status == StatusCode::BAD_REQUEST)
                .then(|| legacy_conflict(message.as_deref()))
                .flatten()
        });

    if let Some(kind) = conflict {
        return Error::Conflict(ConflictError::new(kind, status.as_u16(), message));
    }

    match status {
        StatusCode::NOT_FOUND => Error::NotFound(api_error),
        StatusCode::UNAUTHORIZED => Error::Auth(AuthError::InvalidCredentials),
        s if s.is_server_error() => Error::Server(api_error),
        _ => Error::Api(api_error),
    }
}

fn legacy_conflict(detail: Option<&str>) -> Option<ConflictKind> {
    let detail = detail?.trim();
    LEGACY_CONFLICT_DETAILS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(detail))
        .map(|(_, kind)| *kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use turntable_core::ErrorKind;

    fn body(json: serde_json::Value) -> ErrorResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn structured_code_wins() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            body(serde_json::json!({"code": "already_in_wishlist", "detail": "whatever"})),
        );
        assert_eq!(
            err.kind(),
            ErrorKind::Conflict(ConflictKind::AlreadyInWishlist)
        );
    }

    #[test]
    fn legacy_detail_is_mapped() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            body(serde_json::json!({"detail": "Пластинка уже в вишлисте"})),
        );
        assert!(err.is_conflict(ConflictKind::AlreadyInWishlist));

        let err = classify(
            StatusCode::BAD_REQUEST,
            body(serde_json::json!({"detail": "Пластинка уже в вашей коллекции"})),
        );
        assert!(err.is_conflict(ConflictKind::AlreadyInCollection));
    }

    #[test]
    fn other_bad_requests_stay_rejections() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            body(serde_json::json!({"detail": "Необходимо указать либо discogs_id, либо record_id"})),
        );
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn conflict_status_without_code() {
        let err = classify(StatusCode::CONFLICT, ErrorResponse::default());
        assert_eq!(err.kind(), ErrorKind::Conflict(ConflictKind::Other));
    }

    #[test]
    fn status_classes() {
        assert_eq!(
            classify(StatusCode::NOT_FOUND, ErrorResponse::default()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            classify(StatusCode::BAD_GATEWAY, ErrorResponse::default()).kind(),
            ErrorKind::Server
        );
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, ErrorResponse::default()).kind(),
            ErrorKind::Auth
        );
        assert_eq!(
            classify(StatusCode::FORBIDDEN, ErrorResponse::default()).kind(),
            ErrorKind::Rejected
        );
    }

    #[test]
    fn validation_detail_list_is_kept_as_text() {
        let err = classify(
            StatusCode::UNPROCESSABLE_ENTITY,
            body(serde_json::json!({"detail": [{"loc": ["body", "name"], "msg": "field required"}]})),
        );
        assert!(err.to_string().contains("field required"));
    }
}
