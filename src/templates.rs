use crate::export::AnswerPage;

use askama::Template;
use askama_web::WebTemplate;

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub(crate) struct LoginTemplate {
    pub(crate) app_name: String,
    /// "signin" or "signup"; the form round-trips it.
    pub(crate) mode: String,
    pub(crate) email: String,
    pub(crate) error: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub(crate) struct DashboardTemplate {
    pub(crate) app_name: String,
    pub(crate) has_book: bool,
    pub(crate) title: String,
    pub(crate) question_count: usize,
    pub(crate) answer_count: usize,
    pub(crate) share_link: String,
    pub(crate) answers_path: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "create.html")]
pub(crate) struct CreateTemplate {
    pub(crate) app_name: String,
    pub(crate) title: String,
    pub(crate) questions: Vec<String>,
    pub(crate) suggested: Vec<SuggestedQuestion>,
    /// Newline-joined draft questions, round-tripped through the form.
    pub(crate) draft: String,
    pub(crate) error: String,
}

pub(crate) struct SuggestedQuestion {
    pub(crate) text: String,
    pub(crate) selected: bool,
}

#[derive(Template, WebTemplate)]
#[template(path = "fill.html")]
pub(crate) struct FillTemplate {
    pub(crate) app_name: String,
    pub(crate) owner: String,
    pub(crate) title: String,
    pub(crate) friend_name: String,
    pub(crate) fields: Vec<FillField>,
    pub(crate) error: String,
}

pub(crate) struct FillField {
    pub(crate) index: usize,
    pub(crate) question: String,
    pub(crate) value: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "missing.html")]
pub(crate) struct MissingBookTemplate {
    pub(crate) app_name: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "thanks.html")]
pub(crate) struct ThanksTemplate {
    pub(crate) app_name: String,
    pub(crate) creator_email: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "answers.html")]
pub(crate) struct AnswersTemplate {
    pub(crate) app_name: String,
    pub(crate) owner: String,
    pub(crate) pages: Vec<AnswerPage>,
}

/// Standalone printable document: one physical page per answer, rendered
/// to a string and served as a download.
#[derive(Template)]
#[template(path = "book.html")]
pub(crate) struct BookExportTemplate {
    pub(crate) title: String,
    pub(crate) pages: Vec<AnswerPage>,
}
