//! In-memory fakes shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::store::InsightStore;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::insight::{IndustryInsight, InsightPayload};
use crate::models::user::User;

pub fn overloaded() -> LlmError {
    LlmError::Api {
        status: 503,
        message: "The model is overloaded. Please try again later.".to_string(),
    }
}

/// A valid model answer, unfenced.
pub fn model_response() -> String {
    serde_json::json!({
        "salaryRanges": [
            {"role": "Staff Nurse", "min": 250000, "max": 600000, "median": 400000, "location": "Delhi"},
            {"role": "Clinical Research Associate", "min": 400000, "max": 900000, "median": 600000, "location": "Bangalore"},
            {"role": "Medical Coder", "min": 300000, "max": 700000, "median": 450000, "location": "Remote"},
            {"role": "Hospital Administrator", "min": 800000, "max": 2000000, "median": 1200000, "location": "Mumbai"},
            {"role": "Health Data Analyst", "min": 600000, "max": 1500000, "median": 900000, "location": "Hyderabad"}
        ],
        "growthRate": 9.5,
        "demandLevel": "Medium",
        "topSkills": ["Clinical Research", "Patient Care", "EHR Systems", "Regulatory Compliance", "Data Analysis"],
        "marketOutlook": "Positive",
        "keyTrends": ["Telemedicine", "AI Diagnostics", "Health Insurance Growth", "Medical Tourism", "Digital Health Records"],
        "recommendedSkills": ["Health Informatics", "Python", "Communication", "Quality Management", "HIPAA/DISHA"]
    })
    .to_string()
}

/// Replays a scripted sequence of results; runs dry as `EmptyContent`.
pub struct FakeTextGenerator {
    script: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
    latency: Option<Duration>,
}

impl FakeTextGenerator {
    pub fn new(script: Vec<Result<String, LlmError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            prompts: Mutex::new(Vec::new()),
            latency: None,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeTextGenerator {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.script.lock().unwrap().pop_front();
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        next.unwrap_or(Err(LlmError::EmptyContent))
    }
}

/// HashMap-backed store with the same create-once semantics as the Postgres one.
#[derive(Default)]
pub struct InMemoryInsightStore {
    users: Mutex<HashMap<String, User>>,
    insights: Mutex<HashMap<String, IndustryInsight>>,
    reads: AtomicUsize,
    creates: AtomicUsize,
}

impl InMemoryInsightStore {
    pub fn with_user(external_id: &str, industry: &str) -> Self {
        let store = Self::default();
        store.add_user(external_id, industry);
        store
    }

    pub fn add_user(&self, external_id: &str, industry: &str) {
        let user = User {
            id: Uuid::new_v4(),
            external_id: external_id.to_string(),
            email: format!("{external_id}@example.com"),
            industry: industry.to_string(),
            created_at: Utc::now(),
        };
        self.users
            .lock()
            .unwrap()
            .insert(external_id.to_string(), user);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Rows actually inserted.
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsightStore for InMemoryInsightStore {
    async fn find_user_by_identity(&self, external_id: &str) -> Result<Option<User>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.lock().unwrap().get(external_id).cloned())
    }

    async fn find_insight_by_industry(
        &self,
        industry: &str,
    ) -> Result<Option<IndustryInsight>, AppError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.insights.lock().unwrap().get(industry).cloned())
    }

    async fn create_insight_if_absent(
        &self,
        industry: &str,
        payload: &InsightPayload,
        next_update: DateTime<Utc>,
    ) -> Result<IndustryInsight, AppError> {
        let mut insights = self.insights.lock().unwrap();
        let insight = insights.entry(industry.to_string()).or_insert_with(|| {
            self.creates.fetch_add(1, Ordering::SeqCst);
            IndustryInsight {
                id: Uuid::new_v4(),
                industry: industry.to_string(),
                salary_ranges: payload.salary_ranges.clone(),
                growth_rate: payload.growth_rate,
                demand_level: payload.demand_level,
                top_skills: payload.top_skills.clone(),
                market_outlook: payload.market_outlook,
                key_trends: payload.key_trends.clone(),
                recommended_skills: payload.recommended_skills.clone(),
                last_updated: Utc::now(),
                next_update,
            }
        });
        Ok(insight.clone())
    }
}
