//! Repository for the `surveys`, `questions` and `question_options` tables.
//!
//! Works on whole aggregates: a survey is always loaded with its questions and
//! options, and always written back as one tree inside a transaction.

use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use surveys_core::survey::{QuestionOption, Survey};
use surveys_core::types::DbId;

use crate::error::DbError;
use crate::models::survey::{assemble, QuestionOptionRow, QuestionRow, SurveyRow};

/// Column list for the `surveys` table.
const SURVEY_COLUMNS: &str = "id, title, description, picture_url, created_at, updated_at";

/// Column list for the `questions` table.
const QUESTION_COLUMNS: &str =
    "id, survey_id, text, question_type, sort_order, created_at, updated_at";

/// Column list for the `question_options` table.
const OPTION_COLUMNS: &str = "id, question_id, text, sort_order, created_at, updated_at";

/// Provides aggregate load/save operations for surveys.
pub struct SurveyRepo;

impl SurveyRepo {
    /// List all surveys with their trees, most recently created first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Survey>, DbError> {
        let surveys = sqlx::query_as::<_, SurveyRow>(&format!(
            "SELECT {SURVEY_COLUMNS} FROM surveys ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(pool)
        .await?;

        let questions = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY survey_id, sort_order, id"
        ))
        .fetch_all(pool)
        .await?;

        let options = sqlx::query_as::<_, QuestionOptionRow>(&format!(
            "SELECT {OPTION_COLUMNS} FROM question_options ORDER BY question_id, sort_order, id"
        ))
        .fetch_all(pool)
        .await?;

        Ok(assemble(surveys, questions, options)?)
    }

    /// Find one survey tree by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Survey>, DbError> {
        let mut conn = pool.acquire().await?;
        Self::find_aggregate(&mut *conn, id, false).await
    }

    /// Load one survey tree on the given connection.
    ///
    /// With `lock`, the survey row is taken `FOR UPDATE`, so a second
    /// transaction loading the same survey for update waits until this one
    /// ends. Use it inside the transaction that will persist the tree.
    pub async fn find_aggregate(
        conn: &mut PgConnection,
        id: DbId,
        lock: bool,
    ) -> Result<Option<Survey>, DbError> {
        let lock_clause = if lock { " FOR UPDATE" } else { "" };
        let survey = sqlx::query_as::<_, SurveyRow>(&format!(
            "SELECT {SURVEY_COLUMNS} FROM surveys WHERE id = $1{lock_clause}"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(survey) = survey else {
            return Ok(None);
        };

        let questions = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             WHERE survey_id = $1
             ORDER BY sort_order, id"
        ))
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        let question_ids: Vec<DbId> = questions.iter().map(|q| q.id).collect();
        let options = sqlx::query_as::<_, QuestionOptionRow>(&format!(
            "SELECT {OPTION_COLUMNS} FROM question_options
             WHERE question_id = ANY($1)
             ORDER BY question_id, sort_order, id"
        ))
        .bind(&question_ids)
        .fetch_all(&mut *conn)
        .await?;

        let mut surveys = assemble(vec![survey], questions, options)?;
        Ok(surveys.pop())
    }

    /// Insert a new survey tree in its own transaction, writing the assigned
    /// identities back into `survey`.
    pub async fn create(pool: &PgPool, survey: &mut Survey) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::insert_aggregate(&mut tx, survey).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Insert every node of an unsaved survey tree.
    ///
    /// Any identities already present on the tree are ignored; all nodes get
    /// fresh ones.
    pub async fn insert_aggregate(
        tx: &mut Transaction<'_, Postgres>,
        survey: &mut Survey,
    ) -> Result<(), sqlx::Error> {
        let (survey_id,): (DbId,) = sqlx::query_as(
            "INSERT INTO surveys (title, description, picture_url)
             VALUES ($1, $2, $3)
             RETURNING id",
        )
        .bind(&survey.title)
        .bind(&survey.description)
        .bind(&survey.picture_url)
        .fetch_one(&mut **tx)
        .await?;
        survey.id = Some(survey_id);

        for question in survey.questions.iter_mut() {
            question.id = None;
            for option in question.options.iter_mut() {
                option.id = None;
            }
        }
        Self::write_questions(tx, survey_id, survey).await?;

        tracing::debug!(survey_id, "Inserted survey aggregate");
        Ok(())
    }

    /// Write a reconciled survey tree back to the database.
    ///
    /// Questions and options that are no longer in their parent's collection
    /// are deleted (options of a deleted question go with it via `ON DELETE
    /// CASCADE`), kept nodes are updated, unidentified nodes are inserted and
    /// receive their identity and parent link. `sort_order` is rewritten from
    /// collection position so the order survives a reload.
    ///
    /// A survey without an identity is inserted instead.
    pub async fn persist_aggregate(
        tx: &mut Transaction<'_, Postgres>,
        survey: &mut Survey,
    ) -> Result<(), sqlx::Error> {
        let Some(survey_id) = survey.id else {
            return Self::insert_aggregate(tx, survey).await;
        };

        let result = sqlx::query(
            "UPDATE surveys SET title = $2, description = $3, picture_url = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(survey_id)
        .bind(&survey.title)
        .bind(&survey.description)
        .bind(&survey.picture_url)
        .execute(&mut **tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        let kept: Vec<DbId> = survey.questions.iter().filter_map(|q| q.id).collect();
        let deleted =
            sqlx::query("DELETE FROM questions WHERE survey_id = $1 AND NOT (id = ANY($2))")
                .bind(survey_id)
                .bind(&kept)
                .execute(&mut **tx)
                .await?
                .rows_affected();

        Self::write_questions(tx, survey_id, survey).await?;

        tracing::debug!(
            survey_id,
            questions = survey.questions.len(),
            questions_deleted = deleted,
            "Persisted survey aggregate"
        );
        Ok(())
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM surveys WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Hard-delete a survey and, by cascade, its whole tree.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn write_questions(
        tx: &mut Transaction<'_, Postgres>,
        survey_id: DbId,
        survey: &mut Survey,
    ) -> Result<(), sqlx::Error> {
        for (position, question) in survey.questions.iter_mut().enumerate() {
            let sort_order = position as i32;
            let question_id = match question.id {
                Some(id) => {
                    sqlx::query(
                        "UPDATE questions
                         SET text = $3, question_type = $4, sort_order = $5, updated_at = NOW()
                         WHERE id = $1 AND survey_id = $2",
                    )
                    .bind(id)
                    .bind(survey_id)
                    .bind(&question.text)
                    .bind(question.question_type.as_str())
                    .bind(sort_order)
                    .execute(&mut **tx)
                    .await?;
                    id
                }
                None => {
                    let (id,): (DbId,) = sqlx::query_as(
                        "INSERT INTO questions (survey_id, text, question_type, sort_order)
                         VALUES ($1, $2, $3, $4)
                         RETURNING id",
                    )
                    .bind(survey_id)
                    .bind(&question.text)
                    .bind(question.question_type.as_str())
                    .bind(sort_order)
                    .fetch_one(&mut **tx)
                    .await?;
                    id
                }
            };
            question.id = Some(question_id);
            question.survey_id = Some(survey_id);

            Self::write_options(tx, question_id, &mut question.options).await?;
        }
        Ok(())
    }

    async fn write_options(
        tx: &mut Transaction<'_, Postgres>,
        question_id: DbId,
        options: &mut [QuestionOption],
    ) -> Result<(), sqlx::Error> {
        let kept: Vec<DbId> = options.iter().filter_map(|o| o.id).collect();
        sqlx::query("DELETE FROM question_options WHERE question_id = $1 AND NOT (id = ANY($2))")
            .bind(question_id)
            .bind(&kept)
            .execute(&mut **tx)
            .await?;

        for (position, option) in options.iter_mut().enumerate() {
            let sort_order = position as i32;
            let option_id = match option.id {
                Some(id) => {
                    sqlx::query(
                        "UPDATE question_options
                         SET text = $3, sort_order = $4, updated_at = NOW()
                         WHERE id = $1 AND question_id = $2",
                    )
                    .bind(id)
                    .bind(question_id)
                    .bind(&option.text)
                    .bind(sort_order)
                    .execute(&mut **tx)
                    .await?;
                    id
                }
                None => {
                    let (id,): (DbId,) = sqlx::query_as(
                        "INSERT INTO question_options (question_id, text, sort_order)
                         VALUES ($1, $2, $3)
                         RETURNING id",
                    )
                    .bind(question_id)
                    .bind(&option.text)
                    .bind(sort_order)
                    .fetch_one(&mut **tx)
                    .await?;
                    id
                }
            };
            option.id = Some(option_id);
            option.question_id = Some(question_id);
        }
        Ok(())
    }
}
