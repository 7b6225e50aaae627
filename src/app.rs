use crate::accounts;
use crate::assets;
use crate::auth as auth_service;
use crate::config;
use crate::state;
use crate::store;

use axum::Router;
use axum::middleware;
use axum::response::Redirect;
use axum::routing::get;
use axum::routing::post;

use std::sync::{Arc, Mutex};

mod answers;
mod auth;
mod create;
mod dashboard;
mod fill;

pub fn app(config: config::AppConfig) -> Router {
    let auth = auth_service::AuthState::from_config(&config)
        .unwrap_or_else(|err| panic!("invalid auth configuration: {err}"));
    let accounts = accounts::AccountRegistry::new(&config.data_root);
    let store = store::JsonDocumentStore::new(&config.data_root);
    let state = state::AppState {
        config,
        auth,
        accounts,
        store,
        export_gate: Arc::new(Mutex::new(())),
    };
    Router::new()
        .route("/", get(root_redirect))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/create", get(create::create_form).post(create::create_submit))
        .route("/fill/{owner}", get(fill::fill_form).post(fill::fill_submit))
        .route("/answers/{owner}", get(answers::answers_view))
        .route("/answers/{owner}/export", get(answers::export_book))
        .route(
            "/answers/{owner}/export/{answer_id}",
            get(answers::export_page),
        )
        .route("/static/style.css", get(assets::stylesheet))
        .route("/static/app.js", get(assets::app_script))
        .route("/health", get(health))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

async fn root_redirect() -> Redirect {
    Redirect::to("/dashboard")
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
