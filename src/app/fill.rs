use crate::ports::StoreError;
use crate::slam;
use crate::state;
use crate::templates;

use axum::extract::Form;
use axum::extract::Path as AxumPath;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use time::OffsetDateTime;

use std::collections::BTreeMap;

pub(crate) async fn fill_form(
    State(state): State<state::AppState>,
    AxumPath(owner): AxumPath<String>,
) -> Response {
    let data = match slam::fetch_slam_data(&state.store, &owner).await {
        Ok(Some(data)) => data,
        Ok(None) => return missing_book(&state),
        Err(err) => {
            tracing::error!("failed to load slam book {owner}: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
        }
    };

    let values = vec![String::new(); data.config.questions.len()];
    render_fill(&state, &owner, &data, String::new(), values, String::new()).into_response()
}

pub(crate) async fn fill_submit(
    State(state): State<state::AppState>,
    AxumPath(owner): AxumPath<String>,
    Form(form): Form<BTreeMap<String, String>>,
) -> Response {
    let data = match slam::fetch_slam_data(&state.store, &owner).await {
        Ok(Some(data)) => data,
        Ok(None) => return missing_book(&state),
        Err(err) => {
            tracing::error!("failed to load slam book {owner}: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
        }
    };

    let questions = &data.config.questions;
    let friend_name = form
        .get("friend_name")
        .map(|name| name.trim().to_string())
        .unwrap_or_default();
    let values: Vec<String> = (0..questions.len())
        .map(|index| form.get(&format!("q{index}")).cloned().unwrap_or_default())
        .collect();

    if friend_name.is_empty() {
        let error = "Your name is required.".to_string();
        return (
            StatusCode::BAD_REQUEST,
            render_fill(&state, &owner, &data, friend_name, values, error),
        )
            .into_response();
    }

    // Only typed answers enter the map; blanks show as "No answer" later.
    let mut answers = BTreeMap::new();
    for (index, question) in questions.iter().enumerate() {
        let value = values[index].trim();
        if !value.is_empty() {
            answers.insert(question.clone(), value.to_string());
        }
    }

    let answer = slam::SlamAnswer {
        id: uuid::Uuid::new_v4().to_string(),
        friend_name: friend_name.clone(),
        answers,
        submitted_at: OffsetDateTime::now_utc(),
    };

    match slam::append_answer(&state.store, &owner, answer).await {
        Ok(()) => templates::ThanksTemplate {
            app_name: state.config.app_name.clone(),
            creator_email: data.config.creator_email.clone(),
        }
        .into_response(),
        Err(StoreError::NotFound) => missing_book(&state),
        Err(err) => {
            tracing::error!("failed to store answer for {owner}: {err}");
            let error = "Failed to submit. Please try again.".to_string();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                render_fill(&state, &owner, &data, friend_name, values, error),
            )
                .into_response()
        }
    }
}

/// Terminal state for links pointing at a book that does not exist.
fn missing_book(state: &state::AppState) -> Response {
    (
        StatusCode::NOT_FOUND,
        templates::MissingBookTemplate {
            app_name: state.config.app_name.clone(),
        },
    )
        .into_response()
}

fn render_fill(
    state: &state::AppState,
    owner: &str,
    data: &slam::UserSlamData,
    friend_name: String,
    values: Vec<String>,
    error: String,
) -> templates::FillTemplate {
    let fields = data
        .config
        .questions
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (question, value))| templates::FillField {
            index,
            question: question.clone(),
            value,
        })
        .collect();

    templates::FillTemplate {
        app_name: state.config.app_name.clone(),
        owner: owner.to_string(),
        title: data.config.title.clone(),
        friend_name,
        fields,
        error,
    }
}
