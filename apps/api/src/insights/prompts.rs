// Prompt construction for industry insight generation.

use crate::insights::decoder::MIN_ENTRIES;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Market the insight is framed for: region, currency and allowed locations.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketProfile {
    pub region: String,
    pub currency: String,
    /// City names. "Remote" is always allowed in addition to these.
    pub locations: Vec<String>,
}

impl Default for MarketProfile {
    fn default() -> Self {
        Self {
            region: "India".to_string(),
            currency: "INR".to_string(),
            locations: ["Mumbai", "Bangalore", "Delhi", "Hyderabad", "Pune", "Chennai"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Insight prompt template. Replace every `{placeholder}` before sending.
pub const INSIGHT_PROMPT_TEMPLATE: &str = r#"Analyze the current state of the {industry} industry in {region} and provide insights in ONLY the following JSON format without any additional notes or explanations:
{
  "salaryRanges": [
    { "role": "string", "min": number, "max": number, "median": number, "location": "string" }
  ],
  "growthRate": number,
  "demandLevel": "High" | "Medium" | "Low",
  "topSkills": ["skill1", "skill2"],
  "marketOutlook": "Positive" | "Neutral" | "Negative",
  "keyTrends": ["trend1", "trend2"],
  "recommendedSkills": ["skill1", "skill2"]
}

{json_only_instruction}
- All salary amounts must be in {currency} per annum, as plain numbers.
- Include at least {min_entries} common roles for salary ranges; median must lie between min and max.
- Growth rate should be a percentage.
- Include at least {min_entries} top skills, {min_entries} key trends and {min_entries} recommended skills.
- Focus on {region} market conditions, companies, and trends.
- Location must be one of: {locations}."#;

/// Builds the prompt for one industry key.
pub fn build_insight_prompt(industry: &str, market: &MarketProfile) -> String {
    let locations = market
        .locations
        .iter()
        .map(|l| format!("\"{l}\""))
        .chain(std::iter::once("\"Remote\"".to_string()))
        .collect::<Vec<_>>()
        .join(", ");

    // Industry last: its text must never be rescanned for placeholders.
    INSIGHT_PROMPT_TEMPLATE
        .replace("{json_only_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{region}", &market.region)
        .replace("{currency}", &market.currency)
        .replace("{min_entries}", &MIN_ENTRIES.to_string())
        .replace("{locations}", &locations)
        .replace("{industry}", industry)
}
