use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandLevel {
    High,
    Medium,
    Low,
}

impl DemandLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::High => "High",
            DemandLevel::Medium => "Medium",
            DemandLevel::Low => "Low",
        }
    }
}

impl FromStr for DemandLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(DemandLevel::High),
            "Medium" => Ok(DemandLevel::Medium),
            "Low" => Ok(DemandLevel::Low),
            other => Err(anyhow!("unknown demand level '{other}'")),
        }
    }
}

impl fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketOutlook {
    Positive,
    Neutral,
    Negative,
}

impl MarketOutlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketOutlook::Positive => "Positive",
            MarketOutlook::Neutral => "Neutral",
            MarketOutlook::Negative => "Negative",
        }
    }
}

impl FromStr for MarketOutlook {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Positive" => Ok(MarketOutlook::Positive),
            "Neutral" => Ok(MarketOutlook::Neutral),
            "Negative" => Ok(MarketOutlook::Negative),
            other => Err(anyhow!("unknown market outlook '{other}'")),
        }
    }
}

impl fmt::Display for MarketOutlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compensation band for one role. Amounts are per annum in the market's currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub role: String,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// City name or "Remote".
    pub location: String,
}

/// The generated (not yet persisted) body of an industry insight.
///
/// Field names follow the JSON the model is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightPayload {
    pub salary_ranges: Vec<SalaryRange>,
    /// Percentage.
    pub growth_rate: f64,
    pub demand_level: DemandLevel,
    pub top_skills: Vec<String>,
    pub market_outlook: MarketOutlook,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
}

/// One persisted insight per industry key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryInsight {
    pub id: Uuid,
    pub industry: String,
    pub salary_ranges: Vec<SalaryRange>,
    pub growth_rate: f64,
    pub demand_level: DemandLevel,
    pub top_skills: Vec<String>,
    pub market_outlook: MarketOutlook,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
    pub last_updated: DateTime<Utc>,
    /// Advisory only; nothing in this service refreshes on expiry.
    pub next_update: DateTime<Utc>,
}

/// Database shape of `industry_insights`. Enums are stored as TEXT.
#[derive(Debug, Clone, FromRow)]
pub struct IndustryInsightRow {
    pub id: Uuid,
    pub industry: String,
    pub salary_ranges: Json<Vec<SalaryRange>>,
    pub growth_rate: f64,
    pub demand_level: String,
    pub top_skills: Vec<String>,
    pub market_outlook: String,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub next_update: DateTime<Utc>,
}

impl TryFrom<IndustryInsightRow> for IndustryInsight {
    type Error = anyhow::Error;

    fn try_from(row: IndustryInsightRow) -> Result<Self, Self::Error> {
        Ok(IndustryInsight {
            demand_level: row.demand_level.parse()?,
            market_outlook: row.market_outlook.parse()?,
            id: row.id,
            industry: row.industry,
            salary_ranges: row.salary_ranges.0,
            growth_rate: row.growth_rate,
            top_skills: row.top_skills,
            key_trends: row.key_trends,
            recommended_skills: row.recommended_skills,
            last_updated: row.last_updated,
            next_update: row.next_update,
        })
    }
}
