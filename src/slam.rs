use crate::ports::{DocumentStore, StoreError};

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use std::collections::BTreeMap;

pub const DEFAULT_TITLE: &str = "My Sweet Memories";
pub const THEME_COLOR: &str = "pink";

/// Fixed question set offered in the authoring flow; also seeds new drafts.
pub const SUGGESTED_QUESTIONS: [&str; 13] = [
    "Full Name",
    "Your Nickname",
    "Date of Birth",
    "Zodiac Sign",
    "Favorite Color",
    "Hobby",
    "Best Memory with Me",
    "First Impression of Me",
    "One word to describe me",
    "My biggest strength",
    "My funniest habit",
    "Your message for me",
    "Favorite song right now",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlamBookConfig {
    /// Owner identity key; equals the document key.
    pub id: String,
    pub creator_email: String,
    pub title: String,
    pub theme_color: String,
    /// Ordered, duplicates permitted. Empty is valid but blocks saving in
    /// the authoring flow only.
    pub questions: Vec<String>,
    /// Re-stamped on every save; edits do not preserve the original value.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One respondent submission. Immutable once stored; the map is keyed by
/// the question text itself, so renaming or removing a question orphans
/// the stored value (kept in storage, no longer rendered).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlamAnswer {
    pub id: String,
    pub friend_name: String,
    pub answers: BTreeMap<String, String>,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSlamData {
    pub config: SlamBookConfig,
    pub answers: Vec<SlamAnswer>,
}

pub fn default_questions() -> Vec<String> {
    SUGGESTED_QUESTIONS
        .iter()
        .map(|question| question.to_string())
        .collect()
}

/// Appends a trimmed question to the draft. Returns false without
/// modifying the draft when the input is blank.
pub fn add_question(questions: &mut Vec<String>, raw: &str) -> bool {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    questions.push(trimmed.to_string());
    true
}

/// Removes the question at `index`; out-of-range indices are ignored.
pub fn remove_question(questions: &mut Vec<String>, index: usize) {
    if index < questions.len() {
        questions.remove(index);
    }
}

/// Toggle membership of a suggested question: removes every occurrence
/// when present, otherwise appends at the end. A re-added question lands
/// at the end of the list, not at its original position.
pub fn toggle_question(questions: &mut Vec<String>, question: &str) {
    if questions.iter().any(|existing| existing == question) {
        questions.retain(|existing| existing != question);
    } else {
        questions.push(question.to_string());
    }
}

/// Replaces the config wholesale while preserving any previously collected
/// answers. Creates the document when none exists.
pub async fn create_or_update_config<S: DocumentStore>(
    store: &S,
    owner: &str,
    config: SlamBookConfig,
) -> Result<(), StoreError> {
    let answers = match store.get(owner).await? {
        Some(existing) => existing.answers,
        None => Vec::new(),
    };
    store.set(owner, &UserSlamData { config, answers }).await
}

/// Adds one answer through the store's additive primitive. Never a
/// get-then-set in this layer: concurrent respondents must not lose each
/// other's submissions. Fails with `StoreError::NotFound` when the owner
/// has no document.
pub async fn append_answer<S: DocumentStore>(
    store: &S,
    owner: &str,
    answer: SlamAnswer,
) -> Result<(), StoreError> {
    store.append_answer(owner, &answer).await
}

/// Returns the full document, or `None` when the owner has not created a
/// slam book yet. Errors only on transport failure.
pub async fn fetch_slam_data<S: DocumentStore>(
    store: &S,
    owner: &str,
) -> Result<Option<UserSlamData>, StoreError> {
    store.get(owner).await
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::store::testing::{BrokenStore, MemoryStore};

    fn config_with_questions(owner: &str, questions: &[&str]) -> SlamBookConfig {
        SlamBookConfig {
            id: owner.to_string(),
            creator_email: "owner@example.com".to_string(),
            title: DEFAULT_TITLE.to_string(),
            theme_color: THEME_COLOR.to_string(),
            questions: questions.iter().map(|q| q.to_string()).collect(),
            created_at: OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("timestamp"),
        }
    }

    fn answer_from(friend: &str, pairs: &[(&str, &str)]) -> SlamAnswer {
        SlamAnswer {
            id: uuid::Uuid::new_v4().to_string(),
            friend_name: friend.to_string(),
            answers: pairs
                .iter()
                .map(|(q, a)| (q.to_string(), a.to_string()))
                .collect(),
            submitted_at: OffsetDateTime::from_unix_timestamp(1_700_000_100).expect("timestamp"),
        }
    }

    #[test]
    fn add_question__should_trim_and_append() {
        // Given
        let mut questions = vec!["Hobby".to_string()];

        // When
        let added = add_question(&mut questions, "  Favorite Color  ");

        // Then
        assert!(added);
        assert_eq!(questions, vec!["Hobby", "Favorite Color"]);
    }

    #[test]
    fn add_question__should_reject_blank_input() {
        // Given
        let mut questions = vec!["Hobby".to_string()];

        // When
        let added = add_question(&mut questions, "   ");

        // Then
        assert!(!added);
        assert_eq!(questions, vec!["Hobby"]);
    }

    #[test]
    fn remove_question__should_remove_by_position() {
        // Given
        let mut questions = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        // When
        remove_question(&mut questions, 1);

        // Then
        assert_eq!(questions, vec!["a", "c"]);
    }

    #[test]
    fn remove_question__should_ignore_out_of_range_index() {
        // Given
        let mut questions = vec!["a".to_string()];

        // When
        remove_question(&mut questions, 5);

        // Then
        assert_eq!(questions, vec!["a"]);
    }

    #[test]
    fn toggle_question__twice_should_restore_membership_at_end() {
        // Given
        let mut questions = vec!["Hobby".to_string(), "Zodiac Sign".to_string()];

        // When
        toggle_question(&mut questions, "Hobby");
        toggle_question(&mut questions, "Hobby");

        // Then: membership restored, but re-added at the end.
        assert_eq!(questions, vec!["Zodiac Sign", "Hobby"]);
    }

    #[tokio::test]
    async fn create_or_update_config__should_preserve_existing_answers() {
        // Given
        let store = MemoryStore::default();
        let owner = "owner-1";
        create_or_update_config(&store, owner, config_with_questions(owner, &["Hobby"]))
            .await
            .expect("initial save");
        append_answer(&store, owner, answer_from("Ana", &[("Hobby", "Chess")]))
            .await
            .expect("append");

        // When
        let updated = config_with_questions(owner, &["Hobby", "Favorite Color"]);
        create_or_update_config(&store, owner, updated.clone())
            .await
            .expect("update");

        // Then
        let data = fetch_slam_data(&store, owner)
            .await
            .expect("fetch")
            .expect("document");
        assert_eq!(data.config, updated);
        assert_eq!(data.answers.len(), 1);
        assert_eq!(data.answers[0].friend_name, "Ana");
    }

    #[tokio::test]
    async fn append_answer__should_fail_with_not_found_for_missing_document() {
        // Given
        let store = MemoryStore::default();

        // When
        let result = append_answer(&store, "ghost", answer_from("Ana", &[])).await;

        // Then
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn append_answer__should_accept_empty_answer_map() {
        // Given: an owner whose book has zero configured questions.
        let store = MemoryStore::default();
        let owner = "owner-2";
        create_or_update_config(&store, owner, config_with_questions(owner, &[]))
            .await
            .expect("save");

        // When
        append_answer(&store, owner, answer_from("Ana", &[]))
            .await
            .expect("append");

        // Then
        let data = fetch_slam_data(&store, owner)
            .await
            .expect("fetch")
            .expect("document");
        assert_eq!(data.answers.len(), 1);
        assert!(data.answers[0].answers.is_empty());
    }

    #[tokio::test]
    async fn create_or_update_config__should_surface_store_failure() {
        // Given
        let store = BrokenStore::wrapping(MemoryStore::default());

        // When
        let result =
            create_or_update_config(&store, "owner", config_with_questions("owner", &["Hobby"]))
                .await;

        // Then
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn fetch_slam_data__should_return_none_for_missing_document() {
        // Given
        let store = MemoryStore::default();

        // When
        let data = fetch_slam_data(&store, "ghost").await.expect("fetch");

        // Then
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn removed_question__should_keep_stored_answers() {
        // Given: an answer recorded under a question that later disappears.
        let store = MemoryStore::default();
        let owner = "owner-3";
        create_or_update_config(&store, owner, config_with_questions(owner, &["Hobby"]))
            .await
            .expect("save");
        append_answer(&store, owner, answer_from("Ana", &[("Hobby", "Chess")]))
            .await
            .expect("append");

        // When
        create_or_update_config(&store, owner, config_with_questions(owner, &["Zodiac Sign"]))
            .await
            .expect("update");

        // Then: the orphaned value stays in storage under the old text.
        let data = fetch_slam_data(&store, owner)
            .await
            .expect("fetch")
            .expect("document");
        assert_eq!(data.answers[0].answers.get("Hobby"), Some(&"Chess".to_string()));
        assert!(!data.config.questions.contains(&"Hobby".to_string()));
    }

    #[test]
    fn slam_document__should_round_trip_through_json() {
        // Given
        let mut config = config_with_questions("owner-4", &["Hobby"]);
        config.title = "Memories".to_string();
        let document = UserSlamData {
            config,
            answers: vec![answer_from("Ana", &[("Hobby", "Chess")])],
        };

        // When
        let encoded = serde_json::to_string(&document).expect("encode");
        let decoded: UserSlamData = serde_json::from_str(&encoded).expect("decode");

        // Then
        assert_eq!(decoded, document);
        assert!(encoded.contains("creatorEmail"));
        assert!(encoded.contains("friendName"));
    }
}
