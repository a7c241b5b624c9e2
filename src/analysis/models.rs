//! Structured analysis artifacts
//!
//! These structs double as the schema source for structured LLM output:
//! their JSON Schemas (via schemars) are embedded in the extraction
//! prompts, and responses are parsed back into them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Structured data extracted from a pitch deck.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PitchDeckData {
    /// Name of the startup
    pub startup_name: String,
    /// The problem statement
    pub problem: String,
    /// The proposed solution
    pub solution: String,
    /// Details about the product
    pub product: String,
    /// Market size and TAM analysis
    pub market_tam: String,
    /// How they make money
    pub business_model: String,
    /// Current traction, revenue, users, etc.
    pub traction_metrics: String,
    /// Key team members and backgrounds
    pub team: String,
    /// Competitors and differentiation
    pub competitive_landscape: String,
    /// Amount raising and current stage (e.g., Pre-Seed, Seed)
    pub funding_ask_stage: String,

    /// Standard sections that are completely missing from the deck
    pub missing_sections: Vec<String>,
    /// Areas where the deck is vague or unconvincing
    pub weak_signals: Vec<String>,
    /// Major concerns or risks identified
    pub red_flags: Vec<String>,
}

/// Internal investment memo synthesized from the extracted data.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InvestmentMemo {
    pub company_overview: String,
    pub problem_solution_clarity: String,
    pub market_opportunity: String,
    pub product_differentiation: String,
    pub traction_metrics_analysis: String,
    pub team_assessment: String,
    /// Max 5-7 distinct items
    pub risks_concerns: Vec<String>,
    /// Max 5-7 distinct items
    pub open_questions: Vec<String>,
    /// Final verdict
    #[serde(default = "default_assessment")]
    pub neutral_assessment: Option<String>,
}

fn default_assessment() -> Option<String> {
    Some("No specific assessment provided.".to_string())
}

/// A 30-second read of the deal for a General Partner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecutiveSummary {
    /// 5-7 bullet points summarizing the deal
    pub summary_bullet_points: Vec<String>,
    /// Positive, Neutral, or Negative leaning based on the data
    #[serde(default = "default_outlook")]
    pub decision_outlook: Option<String>,
    /// 0-100 score for alignment with current market trends
    #[serde(default = "default_confidence")]
    pub confidence_score: Option<i32>,
    /// Explanation for the confidence score
    #[serde(default = "default_reasoning")]
    pub market_alignment_reasoning: Option<String>,
}

fn default_outlook() -> Option<String> {
    Some("Neutral".to_string())
}

fn default_confidence() -> Option<i32> {
    Some(50)
}

fn default_reasoning() -> Option<String> {
    Some("Market alignment data unavailable.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_defaults_apply_on_sparse_json() {
        let json = r#"{
            "company_overview": "A",
            "problem_solution_clarity": "B",
            "market_opportunity": "C",
            "product_differentiation": "D",
            "traction_metrics_analysis": "E",
            "team_assessment": "F",
            "risks_concerns": ["r1"],
            "open_questions": ["q1"]
        }"#;

        let memo: InvestmentMemo = serde_json::from_str(json).unwrap();
        assert_eq!(
            memo.neutral_assessment.as_deref(),
            Some("No specific assessment provided.")
        );
    }

    #[test]
    fn test_summary_defaults() {
        let json = r#"{"summary_bullet_points": ["one", "two"]}"#;
        let summary: ExecutiveSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.decision_outlook.as_deref(), Some("Neutral"));
        assert_eq!(summary.confidence_score, Some(50));
    }

    #[test]
    fn test_deck_data_schema_mentions_required_fields() {
        let schema = schemars::schema_for!(PitchDeckData);
        let text = serde_json::to_string(&schema).unwrap();
        assert!(text.contains("startup_name"));
        assert!(text.contains("red_flags"));
    }
}
