//! Integration tests for `SurveyRepo` against a real database.
//!
//! Needs a PostgreSQL instance reachable through `DATABASE_URL`; run with
//! `cargo test -p surveys-db -- --ignored`.

use assert_matches::assert_matches;
use sqlx::PgPool;
use surveys_core::error::CoreError;
use surveys_core::reconcile::reconcile_survey;
use surveys_core::survey::{QuestionType, Survey};
use surveys_core::survey_request::{OptionRequest, QuestionRequest, SurveyRequest};
use surveys_db::repositories::SurveyRepo;
use surveys_db::DbError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn opt(id: Option<i64>, text: &str) -> OptionRequest {
    OptionRequest {
        id,
        text: text.to_string(),
    }
}

fn question(id: Option<i64>, text: &str, options: Vec<OptionRequest>) -> QuestionRequest {
    QuestionRequest {
        id,
        text: text.to_string(),
        question_type: QuestionType::SingleChoice,
        options,
    }
}

fn request(questions: Vec<QuestionRequest>) -> SurveyRequest {
    SurveyRequest {
        id: None,
        title: "Commute".to_string(),
        description: "How do you get to work?".to_string(),
        picture_url: None,
        questions,
    }
}

async fn create(pool: &PgPool, req: &SurveyRequest) -> Survey {
    let mut survey = Survey::from_request(req);
    SurveyRepo::create(pool, &mut survey).await.unwrap();
    survey
}

async fn reconcile_and_persist(pool: &PgPool, id: i64, req: &SurveyRequest) -> Survey {
    let mut tx = pool.begin().await.unwrap();
    let mut survey = SurveyRepo::find_aggregate(&mut *tx, id, true)
        .await
        .unwrap()
        .expect("survey exists");
    reconcile_survey(&mut survey, req).unwrap();
    SurveyRepo::persist_aggregate(&mut tx, &mut survey)
        .await
        .unwrap();
    tx.commit().await.unwrap();
    survey
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_create_assigns_identities_and_round_trips(pool: PgPool) {
    let created = create(
        &pool,
        &request(vec![question(
            None,
            "Mode?",
            vec![opt(None, "Bike"), opt(None, "Train")],
        )]),
    )
    .await;

    let id = created.id.expect("survey id assigned");
    assert!(created.questions[0].id.is_some());
    assert_eq!(created.questions[0].survey_id, Some(id));
    assert!(created.questions[0].options.iter().all(|o| o.id.is_some()));

    let loaded = SurveyRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_persist_deletes_updates_and_inserts(pool: PgPool) {
    let created = create(
        &pool,
        &request(vec![
            question(None, "Keep", vec![opt(None, "a"), opt(None, "b")]),
            question(None, "Drop", vec![opt(None, "c")]),
        ]),
    )
    .await;
    let id = created.id.unwrap();
    let keep = &created.questions[0];

    let updated = reconcile_and_persist(
        &pool,
        id,
        &request(vec![
            question(
                keep.id,
                "Kept and renamed",
                vec![opt(keep.options[1].id, "b2"), opt(None, "d")],
            ),
            question(None, "Brand new", vec![opt(None, "e")]),
        ]),
    )
    .await;

    let loaded = SurveyRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(loaded, updated);

    let texts: Vec<_> = loaded.questions.iter().map(|q| q.text.as_str()).collect();
    assert_eq!(texts, vec!["Kept and renamed", "Brand new"]);
    assert_eq!(loaded.questions[0].id, keep.id);

    let option_texts: Vec<_> = loaded.questions[0]
        .options
        .iter()
        .map(|o| o.text.as_str())
        .collect();
    assert_eq!(option_texts, vec!["b2", "d"]);
    assert_eq!(loaded.questions[0].options[0].id, keep.options[1].id);

    // The dropped question's option went with it.
    let (orphans,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM question_options o
         LEFT JOIN questions q ON q.id = o.question_id
         WHERE q.id IS NULL",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(orphans, 0);
    let (options,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM question_options")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(options, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mirrored_update_keeps_every_identity(pool: PgPool) {
    let created = create(
        &pool,
        &request(vec![question(None, "Q", vec![opt(None, "x")])]),
    )
    .await;
    let id = created.id.unwrap();
    let q = &created.questions[0];

    let updated = reconcile_and_persist(
        &pool,
        id,
        &request(vec![question(
            q.id,
            "Q",
            vec![opt(q.options[0].id, "x")],
        )]),
    )
    .await;

    assert_eq!(updated, created);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_cascades(pool: PgPool) {
    let created = create(
        &pool,
        &request(vec![question(None, "Q", vec![opt(None, "x")])]),
    )
    .await;
    let id = created.id.unwrap();

    assert!(SurveyRepo::delete(&pool, id).await.unwrap());
    assert!(!SurveyRepo::delete(&pool, id).await.unwrap());
    assert!(SurveyRepo::find_by_id(&pool, id).await.unwrap().is_none());

    let (questions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM questions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(questions, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_list_returns_newest_first(pool: PgPool) {
    create(&pool, &request(vec![])).await;
    let mut second = request(vec![]);
    second.title = "Second".to_string();
    create(&pool, &second).await;

    let surveys = SurveyRepo::list(&pool).await.unwrap();
    assert_eq!(surveys.len(), 2);
    assert_eq!(surveys[0].title, "Second");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_stored_question_type_is_an_integrity_error(pool: PgPool) {
    let created = create(
        &pool,
        &request(vec![question(None, "Q", vec![opt(None, "x")])]),
    )
    .await;
    let id = created.id.unwrap();

    sqlx::query("ALTER TABLE questions DROP CONSTRAINT ck_questions_question_type")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE questions SET question_type = 'ranking' WHERE survey_id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let result = SurveyRepo::find_by_id(&pool, id).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Integrity(_))));
}
