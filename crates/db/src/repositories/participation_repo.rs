//! Repository for the `participations` table.

use sqlx::{PgConnection, PgPool};
use surveys_core::types::DbId;

use crate::models::participation::{ParticipantSummary, Participation};

const COLUMNS: &str = "id, survey_id, respondent, created_at";

pub struct ParticipationRepo;

impl ParticipationRepo {
    pub async fn insert(
        conn: &mut PgConnection,
        survey_id: DbId,
        respondent: &str,
    ) -> Result<Participation, sqlx::Error> {
        sqlx::query_as::<_, Participation>(&format!(
            "INSERT INTO participations (survey_id, respondent)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        ))
        .bind(survey_id)
        .bind(respondent)
        .fetch_one(conn)
        .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Participation>, sqlx::Error> {
        sqlx::query_as::<_, Participation>(&format!(
            "SELECT {COLUMNS} FROM participations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Everyone who answered a survey, earliest first, with how many answers
    /// each participation still holds.
    pub async fn list_participants(
        pool: &PgPool,
        survey_id: DbId,
    ) -> Result<Vec<ParticipantSummary>, sqlx::Error> {
        sqlx::query_as::<_, ParticipantSummary>(
            "SELECT p.id AS participation_id, p.respondent, p.created_at,
                    COUNT(a.id) AS answer_count
             FROM participations p
             LEFT JOIN answers a ON a.participation_id = p.id
             WHERE p.survey_id = $1
             GROUP BY p.id
             ORDER BY p.created_at, p.id",
        )
        .bind(survey_id)
        .fetch_all(pool)
        .await
    }
}
