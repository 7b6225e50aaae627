use crate::auth::Session;
use crate::export;
use crate::slam;
use crate::state;
use crate::templates;

use askama::Template as _;
use axum::Extension;
use axum::extract::Path as AxumPath;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub(crate) async fn answers_view(
    State(state): State<state::AppState>,
    Extension(session): Extension<Session>,
    AxumPath(owner): AxumPath<String>,
) -> Result<templates::AnswersTemplate, (StatusCode, &'static str)> {
    if owner != session.user_id {
        return Err((StatusCode::NOT_FOUND, "not found"));
    }

    let data = slam::fetch_slam_data(&state.store, &owner)
        .await
        .map_err(|err| {
            tracing::error!("failed to load slam data for {owner}: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        })?;

    // No book and no answers render the same empty notebook.
    let pages = match &data {
        Some(data) => export::book_pages(data),
        None => Vec::new(),
    };

    Ok(templates::AnswersTemplate {
        app_name: state.config.app_name,
        owner,
        pages,
    })
}

pub(crate) async fn export_book(
    State(state): State<state::AppState>,
    Extension(session): Extension<Session>,
    AxumPath(owner): AxumPath<String>,
) -> Response {
    if owner != session.user_id {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }

    let data = match slam::fetch_slam_data(&state.store, &owner).await {
        Ok(Some(data)) => data,
        Ok(None) => return (StatusCode::NOT_FOUND, "no answers to export").into_response(),
        Err(err) => {
            tracing::error!("failed to load slam data for {owner}: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
        }
    };

    let document = {
        // One export at a time; assembly and rendering run under the gate.
        let _guard = state.export_gate.lock().expect("export gate");
        let pages = export::book_pages(&data);
        if pages.is_empty() {
            return (StatusCode::NOT_FOUND, "no answers to export").into_response();
        }
        let template = templates::BookExportTemplate {
            title: data.config.title.clone(),
            pages,
        };
        match template.render() {
            Ok(document) => document,
            Err(err) => {
                tracing::error!("failed to render book export for {owner}: {err}");
                return (StatusCode::INTERNAL_SERVER_ERROR, "export failed").into_response();
            }
        }
    };

    download(document, export::FULL_BOOK_FILE_NAME)
}

pub(crate) async fn export_page(
    State(state): State<state::AppState>,
    Extension(session): Extension<Session>,
    AxumPath((owner, answer_id)): AxumPath<(String, String)>,
) -> Response {
    if owner != session.user_id {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }

    let data = match slam::fetch_slam_data(&state.store, &owner).await {
        Ok(Some(data)) => data,
        Ok(None) => return (StatusCode::NOT_FOUND, "answer not found").into_response(),
        Err(err) => {
            tracing::error!("failed to load slam data for {owner}: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
        }
    };

    let (document, file_name) = {
        let _guard = state.export_gate.lock().expect("export gate");
        let Some(page) = export::single_page(&data, &answer_id) else {
            return (StatusCode::NOT_FOUND, "answer not found").into_response();
        };
        let file_name = export::single_page_file_name(&page.friend_name);
        let template = templates::BookExportTemplate {
            title: data.config.title.clone(),
            pages: vec![page],
        };
        match template.render() {
            Ok(document) => (document, file_name),
            Err(err) => {
                tracing::error!("failed to render page export for {owner}: {err}");
                return (StatusCode::INTERNAL_SERVER_ERROR, "export failed").into_response();
            }
        }
    };

    download(document, &file_name)
}

fn download(document: String, file_name: &str) -> Response {
    axum::response::Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "text/html; charset=utf-8")
        .header(
            "content-disposition",
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(document.into())
        .unwrap()
}
