use crate::auth::Session;
use crate::config;
use crate::slam;
use crate::state;
use crate::templates;

use axum::Extension;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::HOST;

pub(crate) async fn dashboard(
    State(state): State<state::AppState>,
    Extension(session): Extension<Session>,
    headers: HeaderMap,
) -> Result<templates::DashboardTemplate, (StatusCode, &'static str)> {
    let data = slam::fetch_slam_data(&state.store, &session.user_id)
        .await
        .map_err(|err| {
            tracing::error!("failed to load slam data for {}: {err}", session.user_id);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        })?;

    let share_link = share_link(&state.config, &headers, &session.user_id);
    let answers_path = format!("/answers/{}", session.user_id);

    // No document yet is a create prompt, not an error.
    Ok(match data {
        Some(data) => templates::DashboardTemplate {
            app_name: state.config.app_name,
            has_book: true,
            title: data.config.title,
            question_count: data.config.questions.len(),
            answer_count: data.answers.len(),
            share_link,
            answers_path,
        },
        None => templates::DashboardTemplate {
            app_name: state.config.app_name,
            has_book: false,
            title: String::new(),
            question_count: 0,
            answer_count: 0,
            share_link,
            answers_path,
        },
    })
}

/// Stable, copy-pasteable fill link. Prefers the configured public origin
/// and falls back to the request's Host header.
pub(crate) fn share_link(config: &config::AppConfig, headers: &HeaderMap, owner: &str) -> String {
    let origin = match config.public_origin.as_deref() {
        Some(origin) => origin.trim_end_matches('/').to_string(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("localhost:3000");
            format!("http://{host}")
        }
    };
    format!("{origin}/fill/{owner}")
}
