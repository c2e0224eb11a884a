//! Static insight served when live generation is unavailable.

use crate::models::insight::{DemandLevel, InsightPayload, MarketOutlook, SalaryRange};

/// (role, min, max, median, location) in INR per annum.
const SALARY_BANDS: [(&str, f64, f64, f64, &str); 5] = [
    ("Fresher/Entry Level", 300_000.0, 600_000.0, 450_000.0, "Mumbai"),
    ("Junior Developer", 500_000.0, 1_200_000.0, 800_000.0, "Bangalore"),
    ("Mid Level Developer", 800_000.0, 2_000_000.0, 1_400_000.0, "Delhi"),
    ("Senior Developer", 1_500_000.0, 3_500_000.0, 2_500_000.0, "Hyderabad"),
    ("Tech Lead", 2_500_000.0, 5_000_000.0, 3_500_000.0, "Pune"),
];

const GROWTH_RATE: f64 = 12.0;
const TOP_SKILLS: [&str; 5] = ["Java", "Python", "React", "Node.js", "AWS"];
const KEY_TRENDS: [&str; 5] = [
    "Remote Work",
    "Digital Transformation",
    "AI/ML Adoption",
    "Cloud Migration",
    "Startup Growth",
];
const RECOMMENDED_SKILLS: [&str; 5] = [
    "Leadership",
    "Problem Solving",
    "Communication",
    "Agile",
    "DevOps",
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Returns the fixed fallback payload. Same value on every call.
pub fn fallback_payload() -> InsightPayload {
    InsightPayload {
        salary_ranges: SALARY_BANDS
            .iter()
            .map(|&(role, min, max, median, location)| SalaryRange {
                role: role.to_string(),
                min,
                max,
                median,
                location: location.to_string(),
            })
            .collect(),
        growth_rate: GROWTH_RATE,
        demand_level: DemandLevel::High,
        top_skills: to_strings(&TOP_SKILLS),
        market_outlook: MarketOutlook::Positive,
        key_trends: to_strings(&KEY_TRENDS),
        recommended_skills: to_strings(&RECOMMENDED_SKILLS),
    }
}
