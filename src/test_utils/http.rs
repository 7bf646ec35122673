use axum::{body::Body, http::StatusCode, response::Response};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    assert_eq!(
        response.headers().get("content-type").map(|value| value.as_bytes()),
        Some(content_type.as_bytes())
    );
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(
        response.headers().get("hx-redirect").map(|value| value.as_bytes()),
        Some(endpoint.as_bytes()),
        "want HX-Redirect to {endpoint}"
    );
}
