//! Insight Cache/Fetch Orchestrator.
//!
//! Flow: resolve caller → load profile → return cached insight for the profile's
//! industry, or generate + persist it on first request.
//!
//! Duplicate generation is prevented at two levels:
//! - a per-industry async mutex serializes first requests inside this process
//! - the UNIQUE(industry) constraint + `create_insight_if_absent` resolve races
//!   between processes; the loser gets the winner's row

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::auth::CallerIdentity;
use crate::errors::AppError;
use crate::insights::generator::InsightGenerator;
use crate::insights::store::InsightStore;
use crate::models::insight::IndustryInsight;

pub const DEFAULT_REFRESH_DAYS: i64 = 7;

pub struct InsightService {
    store: Arc<dyn InsightStore>,
    generator: Arc<InsightGenerator>,
    refresh_interval: Duration,
    /// One entry per industry with a first request in flight; removed afterwards.
    industry_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InsightService {
    pub fn new(
        store: Arc<dyn InsightStore>,
        generator: Arc<InsightGenerator>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            store,
            generator,
            refresh_interval,
            industry_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the insight for the caller's industry, creating it on first use.
    ///
    /// Errors: `Unauthorized` without an identity (nothing else is touched),
    /// `NotFound` when the identity has no profile. Generation problems never
    /// surface here; the generator substitutes fallback data.
    ///
    /// `next_update` is not checked. A stored insight is returned as-is.
    pub async fn get_industry_insight(
        &self,
        identity: Option<&CallerIdentity>,
    ) -> Result<IndustryInsight, AppError> {
        let identity = identity.ok_or(AppError::Unauthorized)?;

        let user = self
            .store
            .find_user_by_identity(identity.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {identity} not found")))?;

        if let Some(existing) = self.store.find_insight_by_industry(&user.industry).await? {
            debug!("Insight cache hit for industry '{}'", user.industry);
            return Ok(existing);
        }

        let lock = self.lock_for(&user.industry).await;
        let result = {
            let _guard = lock.lock().await;
            self.generate_and_store(&user.industry).await
        };
        self.release_lock(&user.industry, &lock).await;
        result
    }

    async fn generate_and_store(&self, industry: &str) -> Result<IndustryInsight, AppError> {
        // Another request may have created it while we waited for the lock.
        if let Some(existing) = self.store.find_insight_by_industry(industry).await? {
            debug!("Insight for '{industry}' created by a concurrent request");
            return Ok(existing);
        }

        info!("No insight for industry '{industry}', generating");
        let generated = self.generator.generate(industry).await;
        let next_update = Utc::now()
            .checked_add_signed(self.refresh_interval)
            .ok_or_else(|| {
                AppError::Internal(anyhow!(
                    "refresh interval of {} days overflows next_update",
                    self.refresh_interval.num_days()
                ))
            })?;

        let insight = self
            .store
            .create_insight_if_absent(industry, &generated.payload, next_update)
            .await?;

        info!(
            "Stored insight {} for industry '{}' (source: {:?})",
            insight.id, insight.industry, generated.source
        );
        Ok(insight)
    }

    async fn lock_for(&self, industry: &str) -> Arc<Mutex<()>> {
        let mut locks = self.industry_locks.lock().await;
        locks
            .entry(industry.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the industry's lock entry once its first request has finished.
    /// Requests already waiting keep their own handle; later ones hit the cache.
    async fn release_lock(&self, industry: &str, lock: &Arc<Mutex<()>>) {
        let mut locks = self.industry_locks.lock().await;
        if locks.get(industry).is_some_and(|held| Arc::ptr_eq(held, lock)) {
            locks.remove(industry);
        }
    }
}
