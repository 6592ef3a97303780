use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use repolens_github::GithubError;
use repolens_protocol::ErrorBody;

/// Failure of one API call, rendered as `{ "error", "code" }` JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody::new(code, message),
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.body.error
    }
}

pub fn invalid_request(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message)
}

pub fn rate_limited(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::TOO_MANY_REQUESTS, "rate_limited", message)
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn upstream(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_GATEWAY, "upstream", message)
}

pub fn internal_error(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

impl From<GithubError> for ApiError {
    fn from(err: GithubError) -> Self {
        match &err {
            GithubError::InvalidUrl(_) => invalid_request(err.to_string()),
            GithubError::RateLimited => rate_limited(err.to_string()),
            GithubError::NotFound => not_found(err.to_string()),
            GithubError::Status(_) | GithubError::Http(_) => upstream(err.to_string()),
            GithubError::BaseUrl(_) => internal_error(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn github_errors_map_to_statuses() {
        let cases = [
            (GithubError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (GithubError::NotFound, StatusCode::NOT_FOUND),
            (GithubError::InvalidUrl("x".into()), StatusCode::BAD_REQUEST),
            (
                GithubError::Status("Internal Server Error".into()),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            ApiError::from(GithubError::NotFound).message(),
            "Repository not found or private."
        );
        assert_eq!(internal_error("boom").body.code.as_deref(), Some("internal"));
    }
}
