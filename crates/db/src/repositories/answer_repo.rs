//! Repository for the `answers` table.

use sqlx::{PgConnection, PgPool};
use surveys_core::answer::AnswerRequest;
use surveys_core::types::DbId;

use crate::models::participation::Answer;

const COLUMNS: &str =
    "id, participation_id, question_id, option_id, text, created_at, updated_at";

pub struct AnswerRepo;

impl AnswerRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Answer>, sqlx::Error> {
        sqlx::query_as::<_, Answer>(&format!("SELECT {COLUMNS} FROM answers ORDER BY id"))
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Answer>, sqlx::Error> {
        sqlx::query_as::<_, Answer>(&format!("SELECT {COLUMNS} FROM answers WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn list_for_participation(
        conn: &mut PgConnection,
        participation_id: DbId,
    ) -> Result<Vec<Answer>, sqlx::Error> {
        sqlx::query_as::<_, Answer>(&format!(
            "SELECT {COLUMNS} FROM answers WHERE participation_id = $1 ORDER BY id"
        ))
        .bind(participation_id)
        .fetch_all(conn)
        .await
    }

    /// Insert a participation's answers in request order.
    ///
    /// A question or option removed by a concurrent survey update fails the
    /// insert with a foreign-key violation.
    pub async fn insert_many(
        conn: &mut PgConnection,
        participation_id: DbId,
        answers: &[AnswerRequest],
    ) -> Result<Vec<Answer>, sqlx::Error> {
        let mut inserted = Vec::with_capacity(answers.len());
        for answer in answers {
            let row = sqlx::query_as::<_, Answer>(&format!(
                "INSERT INTO answers (participation_id, question_id, option_id, text)
                 VALUES ($1, $2, $3, $4)
                 RETURNING {COLUMNS}"
            ))
            .bind(participation_id)
            .bind(answer.question_id)
            .bind(answer.option_id)
            .bind(&answer.text)
            .fetch_one(&mut *conn)
            .await?;
            inserted.push(row);
        }
        Ok(inserted)
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        answer: &AnswerRequest,
    ) -> Result<Option<Answer>, sqlx::Error> {
        sqlx::query_as::<_, Answer>(&format!(
            "UPDATE answers
             SET question_id = $2, option_id = $3, text = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(answer.question_id)
        .bind(answer.option_id)
        .bind(&answer.text)
        .fetch_optional(conn)
        .await
    }

    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
