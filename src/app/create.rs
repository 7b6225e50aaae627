use crate::auth::Session;
use crate::slam;
use crate::state;
use crate::templates;

use axum::Extension;
use axum::extract::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use time::OffsetDateTime;

pub(crate) async fn create_form(
    State(state): State<state::AppState>,
    Extension(session): Extension<Session>,
) -> Result<templates::CreateTemplate, (StatusCode, &'static str)> {
    let data = slam::fetch_slam_data(&state.store, &session.user_id)
        .await
        .map_err(|err| {
            tracing::error!("failed to load slam data for {}: {err}", session.user_id);
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        })?;

    let (title, questions) = match data {
        Some(data) => (data.config.title, data.config.questions),
        None => (slam::DEFAULT_TITLE.to_string(), slam::default_questions()),
    };

    Ok(render_create(&state, title, questions, String::new()))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateForm {
    pub(crate) title: String,
    /// Newline-joined draft questions, round-tripped through the form.
    pub(crate) draft: Option<String>,
    pub(crate) new_question: Option<String>,
    pub(crate) action: Option<String>,
    pub(crate) remove: Option<usize>,
    pub(crate) toggle: Option<String>,
}

pub(crate) async fn create_submit(
    State(state): State<state::AppState>,
    Extension(session): Extension<Session>,
    Form(form): Form<CreateForm>,
) -> Response {
    let title = form.title.clone();
    let mut questions = parse_draft(form.draft.as_deref().unwrap_or_default());

    // Remove and toggle buttons carry their own name, so they win over
    // the hidden default "add" action.
    if let Some(index) = form.remove {
        slam::remove_question(&mut questions, index);
        return render_create(&state, title, questions, String::new()).into_response();
    }
    if let Some(question) = form.toggle.as_deref() {
        slam::toggle_question(&mut questions, question);
        return render_create(&state, title, questions, String::new()).into_response();
    }

    match form.action.as_deref() {
        Some("save") => save_draft(&state, &session, title, questions).await,
        _ => {
            slam::add_question(&mut questions, form.new_question.as_deref().unwrap_or_default());
            render_create(&state, title, questions, String::new()).into_response()
        }
    }
}

async fn save_draft(
    state: &state::AppState,
    session: &Session,
    title: String,
    questions: Vec<String>,
) -> Response {
    if questions.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            render_create(
                state,
                title,
                questions,
                "Add at least one question before saving.".to_string(),
            ),
        )
            .into_response();
    }

    let title = if title.trim().is_empty() {
        slam::DEFAULT_TITLE.to_string()
    } else {
        title
    };
    let config = slam::SlamBookConfig {
        id: session.user_id.clone(),
        creator_email: session.email.clone(),
        title: title.clone(),
        theme_color: slam::THEME_COLOR.to_string(),
        questions: questions.clone(),
        created_at: OffsetDateTime::now_utc(),
    };

    match slam::create_or_update_config(&state.store, &session.user_id, config).await {
        Ok(()) => Redirect::to("/dashboard").into_response(),
        Err(err) => {
            tracing::error!("failed to save slam book for {}: {err}", session.user_id);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                render_create(
                    state,
                    title,
                    questions,
                    "Failed to save slam book.".to_string(),
                ),
            )
                .into_response()
        }
    }
}

fn render_create(
    state: &state::AppState,
    title: String,
    questions: Vec<String>,
    error: String,
) -> templates::CreateTemplate {
    let suggested = slam::SUGGESTED_QUESTIONS
        .iter()
        .map(|text| templates::SuggestedQuestion {
            text: text.to_string(),
            selected: questions.iter().any(|question| question == text),
        })
        .collect();
    let draft = questions.join("\n");

    templates::CreateTemplate {
        app_name: state.config.app_name.clone(),
        title,
        questions,
        suggested,
        draft,
        error,
    }
}

fn parse_draft(draft: &str) -> Vec<String> {
    draft
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
