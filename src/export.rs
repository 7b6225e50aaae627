use crate::slam::UserSlamData;

use time::OffsetDateTime;

pub(crate) const NO_ANSWER_PLACEHOLDER: &str = "No answer";
pub(crate) const FULL_BOOK_FILE_NAME: &str = "Full_SlamBook_Memories.html";

/// One question row on a rendered sub-page. `has_answer` is false when the
/// respondent left the question blank or answered before it existed.
pub(crate) struct AnswerRow {
    pub(crate) question: String,
    pub(crate) value: String,
    pub(crate) has_answer: bool,
}

/// One sub-page of the review view; also one physical page of an export.
pub(crate) struct AnswerPage {
    pub(crate) number: usize,
    pub(crate) answer_id: String,
    pub(crate) friend_name: String,
    pub(crate) submitted_on: String,
    pub(crate) rows: Vec<AnswerRow>,
}

/// Builds one page per stored answer, in submission order. Rows iterate
/// the *current* question list, so answers keyed by removed or renamed
/// questions stay in storage but are not rendered.
pub(crate) fn book_pages(data: &UserSlamData) -> Vec<AnswerPage> {
    data.answers
        .iter()
        .enumerate()
        .map(|(index, answer)| AnswerPage {
            number: index + 1,
            answer_id: answer.id.clone(),
            friend_name: answer.friend_name.clone(),
            submitted_on: date_label(answer.submitted_at),
            rows: data
                .config
                .questions
                .iter()
                .map(|question| match answer.answers.get(question) {
                    Some(value) => AnswerRow {
                        question: question.clone(),
                        value: value.clone(),
                        has_answer: true,
                    },
                    None => AnswerRow {
                        question: question.clone(),
                        value: NO_ANSWER_PLACEHOLDER.to_string(),
                        has_answer: false,
                    },
                })
                .collect(),
        })
        .collect()
}

/// The single page for one answer id, or `None` when no such answer exists.
pub(crate) fn single_page(data: &UserSlamData, answer_id: &str) -> Option<AnswerPage> {
    book_pages(data)
        .into_iter()
        .find(|page| page.answer_id == answer_id)
}

pub(crate) fn single_page_file_name(friend_name: &str) -> String {
    format!("{}_SlamBook_Page.html", sanitize_file_stem(friend_name))
}

fn date_label(timestamp: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        timestamp.year(),
        u8::from(timestamp.month()),
        timestamp.day()
    )
}

/// Respondent names go into a Content-Disposition header; anything outside
/// ascii alphanumerics collapses to a dash.
fn sanitize_file_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            last_dash = false;
            out.push(ch);
        } else {
            if last_dash || out.is_empty() {
                continue;
            }
            last_dash = true;
            out.push('-');
        }
    }

    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "friend".to_string()
    } else if trimmed.len() > 40 {
        trimmed[..40].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::slam::{SlamAnswer, SlamBookConfig, UserSlamData};
    use std::collections::BTreeMap;

    fn book_with_answers(questions: &[&str], answers: Vec<SlamAnswer>) -> UserSlamData {
        UserSlamData {
            config: SlamBookConfig {
                id: "owner-1".to_string(),
                creator_email: "owner@example.com".to_string(),
                title: "Memories".to_string(),
                theme_color: "pink".to_string(),
                questions: questions.iter().map(|q| q.to_string()).collect(),
                created_at: OffsetDateTime::from_unix_timestamp(1_700_000_000)
                    .expect("timestamp"),
            },
            answers,
        }
    }

    fn answer(id: &str, friend: &str, pairs: &[(&str, &str)]) -> SlamAnswer {
        SlamAnswer {
            id: id.to_string(),
            friend_name: friend.to_string(),
            answers: pairs
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect::<BTreeMap<_, _>>(),
            submitted_at: OffsetDateTime::from_unix_timestamp(1_705_000_000).expect("timestamp"),
        }
    }

    #[test]
    fn book_pages__should_emit_one_page_per_answer_in_submission_order() {
        // Given
        let data = book_with_answers(
            &["Hobby"],
            vec![
                answer("a-1", "Ana", &[("Hobby", "Chess")]),
                answer("a-2", "Ben", &[("Hobby", "Skating")]),
                answer("a-3", "Caro", &[("Hobby", "Baking")]),
            ],
        );

        // When
        let pages = book_pages(&data);

        // Then
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].number, 1);
        assert_eq!(pages[0].friend_name, "Ana");
        assert_eq!(pages[1].friend_name, "Ben");
        assert_eq!(pages[2].friend_name, "Caro");
    }

    #[test]
    fn book_pages__should_use_placeholder_for_missing_answers() {
        // Given: "Zodiac Sign" was added after Ana submitted.
        let data = book_with_answers(
            &["Hobby", "Zodiac Sign"],
            vec![answer("a-1", "Ana", &[("Hobby", "Chess")])],
        );

        // When
        let pages = book_pages(&data);

        // Then
        let rows = &pages[0].rows;
        assert_eq!(rows.len(), 2);
        assert!(rows[0].has_answer);
        assert_eq!(rows[0].value, "Chess");
        assert!(!rows[1].has_answer);
        assert_eq!(rows[1].value, NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn book_pages__should_not_render_orphaned_answers() {
        // Given: "Hobby" was removed from the config after Ana answered it.
        let data = book_with_answers(
            &["Zodiac Sign"],
            vec![answer("a-1", "Ana", &[("Hobby", "Chess")])],
        );

        // When
        let pages = book_pages(&data);

        // Then
        assert_eq!(pages[0].rows.len(), 1);
        assert_eq!(pages[0].rows[0].question, "Zodiac Sign");
        assert!(!pages[0].rows[0].has_answer);
    }

    #[test]
    fn single_page__should_find_answer_by_id() {
        // Given
        let data = book_with_answers(
            &["Hobby"],
            vec![
                answer("a-1", "Ana", &[("Hobby", "Chess")]),
                answer("a-2", "Ben", &[("Hobby", "Skating")]),
            ],
        );

        // When
        let page = single_page(&data, "a-2").expect("page");

        // Then
        assert_eq!(page.number, 2);
        assert_eq!(page.friend_name, "Ben");
    }

    #[test]
    fn single_page__should_return_none_for_unknown_id() {
        // Given
        let data = book_with_answers(&["Hobby"], vec![answer("a-1", "Ana", &[])]);

        // When
        let page = single_page(&data, "missing");

        // Then
        assert!(page.is_none());
    }

    #[test]
    fn single_page_file_name__should_sanitize_friend_name() {
        // When
        let name = single_page_file_name("Ana María!");

        // Then
        assert_eq!(name, "Ana-Mar-a_SlamBook_Page.html");
    }

    #[test]
    fn single_page_file_name__should_fall_back_for_empty_name() {
        // When
        let name = single_page_file_name("\u{1F496}\u{1F496}");

        // Then
        assert_eq!(name, "friend_SlamBook_Page.html");
    }
}
