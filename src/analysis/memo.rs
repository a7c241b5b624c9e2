//! Memo generation pipeline
//!
//! Deck text → structured data → investment memo → executive summary, as
//! three sequential schema-guided LLM calls. Models frequently wrap JSON in
//! code fences or prose; parsing tolerates both.

use super::models::{ExecutiveSummary, InvestmentMemo, PitchDeckData};
use crate::llm::LLMClient;
use crate::types::{AppError, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

const EXTRACTION_SYSTEM_PROMPT: &str = "\
You are a VC Analyst extracting structured data from a startup pitch deck.
Extract every section faithfully from the deck text. Where a section is
absent, say so explicitly in missing_sections rather than inventing content.
Be specific in weak_signals and red_flags; vague praise is not a signal.";

const MEMO_SYSTEM_PROMPT: &str = "\
You are a professional VC Partner writing an internal investment memo.
Tone: Professional, objective, analytical, non-hyped.
Format: YC-style investment memo.
Required Sections:
- Company Overview
- Problem & Solution Clarity
- Market Opportunity
- Product Differentiation
- Traction & Metrics
- Team Assessment
- Risks & Concerns (List, Max 5-7 distinct items)
- Open Questions (List, Max 5-7 distinct items)
- NEUTRAL ASSESSMENT (Final verdict - CRITICAL)
Constraint: Do NOT generate repetitive lists. Keep it concise.";

const SUMMARY_SYSTEM_PROMPT: &str = "\
You are a VC Associate summarizing a deal for a General Partner.
The summary must be readable in under 30 seconds.
Format:
- 5-7 punchy bullet points.
- A final decision outlook (Neutral/Positive/Negative) based on the data.
- A Market Confidence Score (0-100) assessing alignment with current trends.
- A short Market Alignment Reasoning explaining the score.
Avoid fluff.";

/// Generates structured deck data, memos, and executive summaries.
pub struct MemoGenerator {
    llm: Box<dyn LLMClient>,
}

impl MemoGenerator {
    pub fn new(llm: Box<dyn LLMClient>) -> Self {
        Self { llm }
    }

    /// Extract structured data from raw deck text.
    pub async fn extract_deck_data(&self, deck_text: &str) -> Result<PitchDeckData> {
        let prompt = format!(
            "Here is the extracted pitch deck text:\n{}\n\nExtract the structured startup data.\n{}",
            deck_text,
            format_instructions::<PitchDeckData>()?
        );
        self.structured_call(EXTRACTION_SYSTEM_PROMPT, &prompt).await
    }

    /// Generate a professional investment memo from the extracted data.
    pub async fn generate_memo(&self, data: &PitchDeckData) -> Result<InvestmentMemo> {
        let data_json = serde_json::to_string(data)
            .map_err(|e| AppError::Internal(format!("Failed to serialize deck data: {}", e)))?;
        let prompt = format!(
            "Here is the extracted startup data:\n{}\n\nWrite a full investment memo.\n{}",
            data_json,
            format_instructions::<InvestmentMemo>()?
        );
        self.structured_call(MEMO_SYSTEM_PROMPT, &prompt).await
    }

    /// Generate a concise executive summary (30-second read).
    pub async fn generate_executive_summary(
        &self,
        data: &PitchDeckData,
        memo: &InvestmentMemo,
    ) -> Result<ExecutiveSummary> {
        let data_json = serde_json::to_string(data)
            .map_err(|e| AppError::Internal(format!("Failed to serialize deck data: {}", e)))?;
        let memo_json = serde_json::to_string(memo)
            .map_err(|e| AppError::Internal(format!("Failed to serialize memo: {}", e)))?;
        let prompt = format!(
            "Data: {}\nMemo Highlights: {}\n\nGenerate Executive Summary.\n{}",
            data_json,
            memo_json,
            format_instructions::<ExecutiveSummary>()?
        );
        self.structured_call(SUMMARY_SYSTEM_PROMPT, &prompt).await
    }

    /// Full pipeline: deck text → data → memo → summary.
    pub async fn analyze(
        &self,
        deck_text: &str,
    ) -> Result<(PitchDeckData, InvestmentMemo, ExecutiveSummary)> {
        let data = self.extract_deck_data(deck_text).await?;
        tracing::info!(startup = %data.startup_name, "deck data extracted");
        let memo = self.generate_memo(&data).await?;
        let summary = self.generate_executive_summary(&data, &memo).await?;
        Ok((data, memo, summary))
    }

    async fn structured_call<T: DeserializeOwned>(&self, system: &str, prompt: &str) -> Result<T> {
        let response = self.llm.generate_with_system(system, prompt).await?;
        parse_structured(&response)
    }
}

/// Schema-based format instructions appended to each structured prompt.
fn format_instructions<T: JsonSchema>() -> Result<String> {
    let schema = schemars::schema_for!(T);
    let schema_json = serde_json::to_string_pretty(&schema)
        .map_err(|e| AppError::Internal(format!("Failed to render schema: {}", e)))?;
    Ok(format!(
        "Respond with a single JSON object matching this schema. \
         No prose before or after the JSON.\n{}",
        schema_json
    ))
}

/// Parse a structured response, tolerating code fences and surrounding
/// prose.
fn parse_structured<T: DeserializeOwned>(response: &str) -> Result<T> {
    let candidate = extract_json_object(response)
        .ok_or_else(|| AppError::Parse("Response contained no JSON object".to_string()))?;
    serde_json::from_str(candidate)
        .map_err(|e| AppError::Parse(format!("Structured output did not match schema: {}", e)))
}

/// The outermost `{...}` span in the response, fenced or not.
fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}
