//! Persistence for users (read-only) and industry insights (create-once).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::insight::{IndustryInsight, IndustryInsightRow, InsightPayload};
use crate::models::user::User;

/// The storage operations the insight workflow depends on.
///
/// Carried in `InsightService` as `Arc<dyn InsightStore>`.
#[async_trait]
pub trait InsightStore: Send + Sync {
    async fn find_user_by_identity(&self, external_id: &str) -> Result<Option<User>, AppError>;

    async fn find_insight_by_industry(
        &self,
        industry: &str,
    ) -> Result<Option<IndustryInsight>, AppError>;

    /// Inserts the insight unless one already exists for `industry`, and returns
    /// whichever row is stored afterwards. Never creates a second row per industry.
    async fn create_insight_if_absent(
        &self,
        industry: &str,
        payload: &InsightPayload,
        next_update: DateTime<Utc>,
    ) -> Result<IndustryInsight, AppError>;
}

pub struct PgInsightStore {
    pool: PgPool,
}

impl PgInsightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InsightStore for PgInsightStore {
    async fn find_user_by_identity(&self, external_id: &str) -> Result<Option<User>, AppError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
                .bind(external_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn find_insight_by_industry(
        &self,
        industry: &str,
    ) -> Result<Option<IndustryInsight>, AppError> {
        let row = sqlx::query_as::<_, IndustryInsightRow>(
            "SELECT * FROM industry_insights WHERE industry = $1",
        )
        .bind(industry)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(IndustryInsight::try_from).transpose()?)
    }

    async fn create_insight_if_absent(
        &self,
        industry: &str,
        payload: &InsightPayload,
        next_update: DateTime<Utc>,
    ) -> Result<IndustryInsight, AppError> {
        // ON CONFLICT DO NOTHING returns no row when another writer won the race.
        let inserted = sqlx::query_as::<_, IndustryInsightRow>(
            r#"
            INSERT INTO industry_insights
                (industry, salary_ranges, growth_rate, demand_level, top_skills,
                 market_outlook, key_trends, recommended_skills, next_update)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (industry) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(industry)
        .bind(Json(&payload.salary_ranges))
        .bind(payload.growth_rate)
        .bind(payload.demand_level.as_str())
        .bind(&payload.top_skills)
        .bind(payload.market_outlook.as_str())
        .bind(&payload.key_trends)
        .bind(&payload.recommended_skills)
        .bind(next_update)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            info!("Inserted industry insight for '{industry}', next update {next_update}");
            return Ok(IndustryInsight::try_from(row)?);
        }

        debug!("Insight for '{industry}' already existed, returning stored row");
        self.find_insight_by_industry(industry).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "insight for '{industry}' conflicted on insert but could not be read back"
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use uuid::Uuid;

    use super::*;
    use crate::db::create_pool;
    use crate::insights::fallback::fallback_payload;

    /// Needs a disposable Postgres: `DATABASE_URL=... cargo test -- --ignored`.
    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a disposable Postgres"]
    async fn test_create_insight_if_absent_keeps_the_first_row() {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping");
            return;
        };
        let pool = create_pool(&database_url).await.unwrap();
        let store = PgInsightStore::new(pool.clone());
        let industry = format!("test-industry-{}", Uuid::new_v4());

        let first_payload = fallback_payload();
        let mut second_payload = fallback_payload();
        second_payload.growth_rate = 99.0;
        second_payload.top_skills[0] = "Should Not Be Stored".to_string();
        let next_update = Utc::now() + Duration::days(7);

        let (a, b) = tokio::join!(
            store.create_insight_if_absent(&industry, &first_payload, next_update),
            store.create_insight_if_absent(&industry, &second_payload, next_update),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.id, b.id);
        assert_eq!(a, b);

        let again = store
            .create_insight_if_absent(&industry, &second_payload, next_update)
            .await
            .unwrap();
        assert_eq!(again.id, a.id);
        assert_eq!(again.growth_rate, a.growth_rate);
        assert_eq!(again.top_skills, a.top_skills);

        let stored = store.find_insight_by_industry(&industry).await.unwrap().unwrap();
        assert_eq!(stored.id, a.id);

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM industry_insights WHERE industry = $1")
                .bind(&industry)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);

        sqlx::query("DELETE FROM industry_insights WHERE industry = $1")
            .bind(&industry)
            .execute(&pool)
            .await
            .unwrap();
    }
}
