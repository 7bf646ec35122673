//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{create_account_endpoint, delete_account_endpoint, edit_account_endpoint},
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page, post_log_in,
        register_user,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, edit_category_endpoint,
        get_category_options,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    profile::get_profile_page,
    receipt::{get_image_endpoint, ocr_endpoint, read_receipt_endpoint},
    summary::{get_home_page, get_summary_page},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_add_transaction_page,
        get_transactions_page,
    },
};

/// The largest request body accepted by the receipt upload routes.
///
/// Leaves room for a 10 MiB image after base64 encoding plus the other form fields.
const MAX_UPLOAD_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::HOME_VIEW, get(get_home_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::ADD_TRANSACTION_VIEW,
            get(get_add_transaction_page),
        )
        .route(endpoints::SUMMARY_VIEW, get(get_summary_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .route(endpoints::IMAGE_API, get(get_image_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    let upload_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(endpoints::RECEIPT_API, post(read_receipt_endpoint))
        .route(endpoints::OCR_API, post(ocr_endpoint))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BODY_SIZE));

    // These routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .merge(upload_routes)
            .route(
                endpoints::TRANSACTION,
                delete(delete_transaction_endpoint),
            )
            .route(endpoints::ACCOUNTS_API, post(create_account_endpoint))
            .route(
                endpoints::ACCOUNT,
                put(edit_account_endpoint).delete(delete_account_endpoint),
            )
            .route(endpoints::CATEGORIES_API, post(create_category_endpoint))
            .route(
                endpoints::CATEGORY,
                put(edit_category_endpoint).delete(delete_category_endpoint),
            )
            .route(endpoints::CATEGORY_OPTIONS, get(get_category_options))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the home page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::HOME_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_home() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::HOME_VIEW);
    }
}
