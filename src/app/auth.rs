use crate::accounts::AccountError;
use crate::state;
use crate::templates;

use axum::body::Body;
use axum::extract::Form;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

const MODE_SIGN_IN: &str = "signin";
const MODE_SIGN_UP: &str = "signup";

/// Gates every route except the public ones. The verified session is
/// attached to the request so handlers receive the identity explicitly.
pub(crate) async fn auth_middleware(
    State(state): State<state::AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if is_public_path(path) {
        return next.run(req).await;
    }

    if let Some(session) = state.auth.session_from_headers(req.headers()) {
        req.extensions_mut().insert(session);
        return next.run(req).await;
    }

    Redirect::to("/login").into_response()
}

fn is_public_path(path: &str) -> bool {
    path == "/login"
        || path == "/logout"
        || path == "/health"
        || path.starts_with("/static/")
        || path.starts_with("/fill/")
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginQuery {
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginForm {
    mode: Option<String>,
    email: String,
    password: String,
}

pub(crate) async fn login_form(
    State(state): State<state::AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    if state.auth.session_from_headers(&headers).is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    templates::LoginTemplate {
        app_name: state.config.app_name,
        mode: login_mode(query.mode.as_deref()),
        email: String::new(),
        error: String::new(),
    }
    .into_response()
}

pub(crate) async fn login_submit(
    State(state): State<state::AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    if state.auth.session_from_headers(&headers).is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    let mode = login_mode(form.mode.as_deref());
    let email = form.email.trim().to_string();
    let result = if mode == MODE_SIGN_UP {
        state.accounts.sign_up(&email, &form.password)
    } else {
        state.accounts.sign_in(&email, &form.password)
    };

    let identity = match result {
        Ok(identity) => identity,
        Err(err) => return login_error(&state, &mode, &email, err),
    };

    let token = match state.auth.issue_token(&identity) {
        Ok(token) => token,
        Err(err) => {
            tracing::error!("failed to issue auth token: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                templates::LoginTemplate {
                    app_name: state.config.app_name,
                    mode,
                    email,
                    error: "Failed to sign in.".to_string(),
                },
            )
                .into_response();
        }
    };

    let mut response = Redirect::to("/dashboard").into_response();
    let cookie = state.auth.auth_cookie(&token);
    response.headers_mut().append(
        SET_COOKIE,
        HeaderValue::from_str(&cookie).expect("auth cookie header"),
    );
    response
}

pub(crate) async fn logout(State(state): State<state::AppState>) -> Response {
    let mut response = Redirect::to("/login").into_response();
    let cookie = state.auth.clear_cookie();
    response.headers_mut().append(
        SET_COOKIE,
        HeaderValue::from_str(&cookie).expect("logout cookie header"),
    );
    response
}

fn login_mode(raw: Option<&str>) -> String {
    match raw {
        Some(MODE_SIGN_UP) => MODE_SIGN_UP.to_string(),
        _ => MODE_SIGN_IN.to_string(),
    }
}

/// Auth failures are surfaced inline on the login form, never as a bare
/// status page.
fn login_error(
    state: &state::AppState,
    mode: &str,
    email: &str,
    err: AccountError,
) -> Response {
    let (status, message) = match err {
        AccountError::EmailTaken => (
            StatusCode::CONFLICT,
            "An account already exists for that email.".to_string(),
        ),
        AccountError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password.".to_string(),
        ),
        AccountError::WeakPassword => (
            StatusCode::BAD_REQUEST,
            "Password must be at least 6 characters.".to_string(),
        ),
        AccountError::MissingField => (
            StatusCode::BAD_REQUEST,
            "Email and password are required.".to_string(),
        ),
        AccountError::Io(_) | AccountError::Data(_) | AccountError::Hash(_) => {
            tracing::error!("account registry failure: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication failed. Please try again.".to_string(),
            )
        }
    };

    (
        status,
        templates::LoginTemplate {
            app_name: state.config.app_name.clone(),
            mode: mode.to_string(),
            email: email.to_string(),
            error: message,
        },
    )
        .into_response()
}
