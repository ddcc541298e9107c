use std::time::Duration;

use crate::domain::category::Category;
use crate::domain::score::{ScoreSnapshot, calculate_score};
use crate::domain::trainer_data::TrainerDataRow;
use crate::domain::types::{RowId, TrainerId};
use crate::forms::trainer_data::{AddRowFormPayload, UpdateRowFormPayload};
use crate::repository::{TrainerDataReader, TrainerDataWriter};
use crate::services::dashboard::count_by_owner;
use crate::services::{Notice, ServiceError, ServiceResult};
use crate::tone::ToneAnalyzer;

/// Resolve a slug or display name to one of the fixed categories.
pub fn resolve_category(name: &str) -> ServiceResult<Category> {
    name.parse::<Category>().map_err(|e| {
        log::warn!("Rejected request for {e}");
        ServiceError::from(e)
    })
}

/// Rows of one category owned by `trainer_id`, newest first.
///
/// `category` may be a slug or a display name; anything else yields an empty
/// list rather than an error.
pub fn list_rows<R>(
    trainer_id: &TrainerId,
    category: &str,
    repo: &R,
) -> ServiceResult<Vec<TrainerDataRow>>
where
    R: TrainerDataReader,
{
    let Ok(category) = resolve_category(category) else {
        return Ok(Vec::new());
    };

    repo.list_rows(trainer_id, category).map_err(|e| {
        log::error!("Failed to list {category} rows of {trainer_id}: {e}");
        ServiceError::Store(e.to_string())
    })
}

/// Validate and store a new row, returning its identifier.
pub fn insert_row<R>(
    payload: AddRowFormPayload,
    category: Category,
    repo: &R,
) -> ServiceResult<RowId>
where
    R: TrainerDataWriter,
{
    let row = payload.into_new_row(category)?;

    repo.create_row(&row).map_err(|e| {
        log::error!("Failed to insert {category} row: {e}");
        ServiceError::Store(e.to_string())
    })
}

/// Apply a partial edit to an existing row.
///
/// The row is read first so that values it already stores are kept as they
/// are, even when they predate the current choice lists.
pub fn update_row<R>(
    category: Category,
    id: RowId,
    payload: UpdateRowFormPayload,
    repo: &R,
) -> ServiceResult<()>
where
    R: TrainerDataReader + TrainerDataWriter,
{
    let current = match repo.get_row(category, id) {
        Ok(Some(row)) => row,
        Ok(None) => return Err(ServiceError::Store(format!("no {category} row with id {id}"))),
        Err(e) => {
            log::error!("Failed to load {category} row {id}: {e}");
            return Err(ServiceError::Store(e.to_string()));
        }
    };
    let changes = payload.into_row_changes(&current)?;

    match repo.update_row(&changes) {
        Ok(0) => Err(ServiceError::Store(format!("no {category} row with id {id}"))),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to update {category} row {id}: {e}");
            Err(ServiceError::Store(e.to_string()))
        }
    }
}

/// Permanently delete a row.
pub fn delete_row<R>(category: Category, id: RowId, repo: &R) -> ServiceResult<()>
where
    R: TrainerDataWriter,
{
    match repo.delete_row(category, id) {
        Ok(0) => Err(ServiceError::Store(format!("no {category} row with id {id}"))),
        Ok(_) => {
            log::info!("Deleted {category} row {id}");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to delete {category} row {id}: {e}");
            Err(ServiceError::Store(e.to_string()))
        }
    }
}

/// Dashboard add action.
///
/// Stores the row, reports how the score moved, and for tone samples asks
/// the backend to rebuild the tone profile. A failed analysis only downgrades
/// the notice to a warning; the stored row stays.
pub async fn add_row<R, A>(
    payload: AddRowFormPayload,
    category: Category,
    repo: &R,
    analyzer: &A,
    analysis_timeout: Duration,
) -> ServiceResult<Notice>
where
    R: TrainerDataReader + TrainerDataWriter,
    A: ToneAnalyzer,
{
    let trainer_id = payload.trainer_id.clone();
    let before = calculate_score(&count_by_owner(&trainer_id, repo));

    let id = insert_row(payload, category, repo)?;
    log::info!("Added {category} row {id} for {trainer_id}");

    let after = calculate_score(&count_by_owner(&trainer_id, repo));
    let progress = score_progress(&before, &after);

    if category != Category::Tone {
        return Ok(Notice::success(format!("Row added to {category}.{progress}")));
    }

    match analyzer.analyze_tone(&trainer_id, analysis_timeout).await {
        Ok(()) => Ok(Notice::success(format!(
            "Tone samples saved and analyzed.{progress}"
        ))),
        Err(e) => {
            log::warn!("Tone analysis after insert failed for {trainer_id}: {e}");
            Ok(Notice::warning(format!(
                "Tone samples saved, but analysis failed: {e}.{progress}"
            )))
        }
    }
}

fn score_progress(before: &ScoreSnapshot, after: &ScoreSnapshot) -> String {
    let mut text = String::new();
    let diff = after.total_score - before.total_score;
    if diff > 0.0 {
        text.push_str(&format!(
            " Score rose by {diff:.1} points ({:.1} → {:.1}).",
            before.total_score, after.total_score
        ));
    }
    if after.tier > before.tier {
        text.push_str(&format!(" Tier up: {} → {}!", before.tier, after.tier));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::domain::category::{FieldInput, FieldValue};
    use crate::repository::test::TestRepository;
    use crate::services::NoticeLevel;
    use crate::tone::ToneAnalysisError;

    struct FakeAnalyzer {
        reject_with: Option<&'static str>,
        calls: Mutex<Vec<(TrainerId, Duration)>>,
    }

    impl FakeAnalyzer {
        fn accepting() -> Self {
            Self {
                reject_with: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn rejecting(body: &'static str) -> Self {
            Self {
                reject_with: Some(body),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ToneAnalyzer for FakeAnalyzer {
        async fn analyze_tone(
            &self,
            trainer_id: &TrainerId,
            timeout: Duration,
        ) -> Result<(), ToneAnalysisError> {
            self.calls
                .lock()
                .unwrap()
                .push((trainer_id.clone(), timeout));
            match self.reject_with {
                Some(body) => Err(ToneAnalysisError::Rejected {
                    status: 500,
                    body: body.to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    fn trainer() -> TrainerId {
        TrainerId::new("tr_001").unwrap()
    }

    fn input(pairs: &[(&str, &str)]) -> FieldInput {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn add_payload(pairs: &[(&str, &str)]) -> AddRowFormPayload {
        AddRowFormPayload {
            trainer_id: trainer(),
            fields: input(pairs),
        }
    }

    fn update_payload(pairs: &[(&str, &str)]) -> UpdateRowFormPayload {
        UpdateRowFormPayload {
            trainer_id: trainer(),
            fields: input(pairs),
        }
    }

    #[test]
    fn unknown_category_lists_nothing() {
        let repo = TestRepository::default();
        let rows = list_rows(&trainer(), "data_trainer_qna; --", &repo).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn unknown_names_resolve_to_unknown_category() {
        assert_eq!(resolve_category("Tone / style"), Ok(Category::Tone));
        assert_eq!(
            resolve_category("users"),
            Err(ServiceError::UnknownCategory("users".into()))
        );
    }

    #[test]
    fn listing_failure_is_a_store_error() {
        let repo = TestRepository::default();
        repo.fail_category(Category::Qna);
        let err = list_rows(&trainer(), "qna", &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[test]
    fn insert_then_list_and_count() {
        let repo = TestRepository::default();
        let before = count_by_owner(&trainer(), &repo).get(Category::Injury);

        let id = insert_row(
            add_payload(&[
                ("title", "Knee"),
                ("content", "Ice it"),
                ("body_part", "무릎"),
                ("keywords", "ice, rest"),
            ]),
            Category::Injury,
            &repo,
        )
        .unwrap();

        let rows = list_rows(&trainer(), "Injury care", &repo).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(
            rows[0].field("keywords"),
            Some(&FieldValue::Tags(vec!["ice".into(), "rest".into()]))
        );
        assert_eq!(
            count_by_owner(&trainer(), &repo).get(Category::Injury),
            before + 1
        );
    }

    #[test]
    fn insert_reports_every_missing_field() {
        let repo = TestRepository::default();
        let err = insert_row(add_payload(&[]), Category::Qna, &repo).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Validation("required fields are empty: question, answer".into())
        );
        assert!(repo.rows().is_empty());
    }

    #[test]
    fn update_changes_only_targeted_fields() {
        let repo = TestRepository::default();
        let id = repo.seed(
            &trainer(),
            Category::Qna,
            &input(&[("question", "Sets?"), ("answer", "Three")]),
        );

        update_row(Category::Qna, id, update_payload(&[("answer", "Four")]), &repo).unwrap();

        let row = &repo.rows()[0];
        assert_eq!(row.field("answer"), Some(&FieldValue::Text("Four".into())));
        assert_eq!(row.field("question"), Some(&FieldValue::Text("Sets?".into())));
        assert_eq!(row.field("risk_level"), Some(&FieldValue::Text("low".into())));
    }

    #[test]
    fn update_keeps_stored_choices_from_other_writers() {
        let repo = TestRepository::default();
        let id = repo.seed_stored(
            &trainer(),
            Category::MealExample,
            &[
                ("title", FieldValue::Text("Oats".into())),
                ("content", FieldValue::Text("Oats and eggs".into())),
                ("category", FieldValue::Tags(vec!["brunch".into()])),
                ("user_level", FieldValue::Text("beginner".into())),
            ],
        );

        update_row(
            Category::MealExample,
            id,
            update_payload(&[
                ("meal_type", "brunch"),
                ("title", "Overnight oats"),
                ("content", "Oats and eggs"),
                ("user_level", "beginner"),
            ]),
            &repo,
        )
        .unwrap();

        let row = &repo.rows()[0];
        assert_eq!(row.field("title"), Some(&FieldValue::Text("Overnight oats".into())));
        assert_eq!(row.field("category"), Some(&FieldValue::Tags(vec!["brunch".into()])));

        let err = update_row(
            Category::MealExample,
            id,
            update_payload(&[("meal_type", "supper")]),
            &repo,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn update_of_missing_row_is_an_error() {
        let repo = TestRepository::default();
        let err = update_row(
            Category::Qna,
            RowId::new(42).unwrap(),
            update_payload(&[("answer", "x")]),
            &repo,
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[test]
    fn delete_removes_the_row() {
        let repo = TestRepository::default();
        let id = repo.seed(
            &trainer(),
            Category::Philosophy,
            &input(&[("content", "Consistency")]),
        );
        assert_eq!(count_by_owner(&trainer(), &repo).get(Category::Philosophy), 1);

        delete_row(Category::Philosophy, id, &repo).unwrap();
        assert_eq!(count_by_owner(&trainer(), &repo).get(Category::Philosophy), 0);

        let err = delete_row(Category::Philosophy, id, &repo).unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[tokio::test]
    async fn add_row_reports_score_progress() {
        let repo = TestRepository::default();
        let analyzer = FakeAnalyzer::accepting();

        let notice = add_row(
            add_payload(&[("question", "Sets?"), ("answer", "Three")]),
            Category::Qna,
            &repo,
            &analyzer,
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        assert_eq!(notice.level, NoticeLevel::Success);
        assert!(notice.message.contains("Score rose by 0.4 points"));
        assert!(analyzer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_row_announces_tier_promotion() {
        let repo = TestRepository::default();
        // QnA at 22 of 60, tone one short, the rest complete: 84.18, Silver.
        let table = crate::domain::score::ScoringTable::default();
        for category in Category::ALL {
            let target = table.rule(category).unwrap().target;
            let count = match category {
                Category::Qna => 22,
                Category::Tone => target - 1,
                _ => target,
            };
            for i in 0..count {
                let fields = seed_fields(category, i);
                repo.seed(&trainer(), category, &fields);
            }
        }
        let before = crate::services::dashboard::show_overview(&trainer(), &repo);
        assert_eq!(before.tier, crate::domain::score::Tier::Silver);

        let analyzer = FakeAnalyzer::accepting();
        let notice = add_row(
            add_payload(&[("raw_data", "Let's go!")]),
            Category::Tone,
            &repo,
            &analyzer,
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        assert!(notice.message.contains("Tier up: Silver → Gold!"), "{}", notice.message);
    }

    fn seed_fields(category: Category, i: usize) -> FieldInput {
        let spec = category.spec();
        spec.fields
            .iter()
            .filter(|rule| rule.required)
            .map(|rule| {
                let value = rule
                    .choices
                    .first()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| format!("{} {i}", rule.input));
                (rule.input.to_string(), value)
            })
            .collect()
    }

    #[tokio::test]
    async fn tone_insert_triggers_analysis_with_insert_timeout() {
        let repo = TestRepository::default();
        let analyzer = FakeAnalyzer::accepting();

        let notice = add_row(
            add_payload(&[("raw_data", "Keep pushing!")]),
            Category::Tone,
            &repo,
            &analyzer,
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        assert_eq!(notice.level, NoticeLevel::Success);
        let calls = analyzer.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(trainer(), Duration::from_secs(30))]);
    }

    #[tokio::test]
    async fn failed_analysis_keeps_the_row_and_warns() {
        let repo = TestRepository::default();
        let analyzer = FakeAnalyzer::rejecting("model offline");

        let notice = add_row(
            add_payload(&[("raw_data", "Keep pushing!")]),
            Category::Tone,
            &repo,
            &analyzer,
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("model offline"));
        assert_eq!(count_by_owner(&trainer(), &repo).get(Category::Tone), 1);
    }
}
