//! Context compaction
//!
//! Renders a [`ResearchBundle`] into a single bounded string for the
//! generation prompt. Rendering is pure: the output depends only on the
//! bundle, the registry order and the configured budget - no hidden state,
//! fully reproducible for the same inputs.

use super::registry::WorkerRegistry;
use super::{ResearchBundle, ToolCallResult};

/// Marker appended to a segment that was cut at the character budget.
pub const TRUNCATION_MARKER: &str = "... [TRUNCATED]";

/// Deterministic bundle-to-string rendering with per-source truncation.
pub struct ContextCompactor {
    char_budget: usize,
}

impl ContextCompactor {
    /// `char_budget` is the per-source limit in characters.
    pub fn new(char_budget: usize) -> Self {
        Self { char_budget }
    }

    /// Render the bundle into one labeled block, sources in registry order.
    ///
    /// A failure entry renders as `[<Label> MCP Error: <message>]`, which
    /// the generation prompt instructs the model to disregard.
    pub fn compact(&self, registry: &WorkerRegistry, bundle: &ResearchBundle) -> String {
        let mut out = String::from("--- SEARCH RESULTS ---\n");

        for descriptor in registry.iter() {
            let rendered = match bundle.get(&descriptor.name) {
                Some(ToolCallResult::Success(payload)) => render_payload(payload),
                Some(ToolCallResult::Failure { tool, error }) => {
                    format!("[{} MCP Error: {}]", tool, error)
                }
                None => format!("[{} MCP Error: no result]", descriptor.label),
            };

            out.push_str(&format!(
                "[{}]: {}\n",
                descriptor.label,
                self.truncate(&rendered)
            ));
        }

        out.push_str("----------------------");
        out
    }

    /// Cut a segment at the character budget, appending the truncation
    /// marker. Segments at or under budget pass through unchanged.
    fn truncate(&self, content: &str) -> String {
        match content.char_indices().nth(self.char_budget) {
            None => content.to_string(),
            Some((byte_idx, _)) => {
                let mut cut = content[..byte_idx].to_string();
                cut.push_str(TRUNCATION_MARKER);
                cut
            }
        }
    }
}

/// Serialize a success payload to text. Strings render bare (no quotes),
/// everything else as compact JSON.
fn render_payload(payload: &serde_json::Value) -> String {
    match payload {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::research::ToolCallResult;
    use serde_json::json;
    use std::collections::HashMap;

    fn bundle_of(entries: Vec<(&str, ToolCallResult)>) -> ResearchBundle {
        let mut map = HashMap::new();
        for (name, result) in entries {
            map.insert(name.to_string(), result);
        }
        ResearchBundle::new(map)
    }

    fn full_bundle() -> ResearchBundle {
        bundle_of(vec![
            ("reddit", ToolCallResult::Success(json!({"posts": []}))),
            (
                "wikipedia",
                ToolCallResult::Success(json!([{"title": "AI agent"}])),
            ),
            (
                "google",
                ToolCallResult::Failure {
                    tool: "Google".into(),
                    error: "Missing credential: GOOGLE_API_KEY is not set".into(),
                },
            ),
            ("medium", ToolCallResult::Success(json!([]))),
        ])
    }

    #[test]
    fn test_one_labeled_segment_per_tool_in_registry_order() {
        let registry = WorkerRegistry::builtin();
        let context = ContextCompactor::new(2000).compact(&registry, &full_bundle());

        let reddit = context.find("[Reddit]:").unwrap();
        let wikipedia = context.find("[Wikipedia]:").unwrap();
        let google = context.find("[Google]:").unwrap();
        let medium = context.find("[Medium]:").unwrap();

        // Registry order, not map iteration order.
        assert!(reddit < wikipedia);
        assert!(wikipedia < google);
        assert!(google < medium);

        // Exactly one segment per tool.
        assert_eq!(context.matches("[Reddit]:").count(), 1);
        assert_eq!(context.matches("[Wikipedia]:").count(), 1);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let registry = WorkerRegistry::builtin();
        let compactor = ContextCompactor::new(2000);
        let a = compactor.compact(&registry, &full_bundle());
        let b = compactor.compact(&registry, &full_bundle());
        assert_eq!(a, b);
    }

    #[test]
    fn test_failure_renders_as_labeled_error() {
        let registry = WorkerRegistry::builtin();
        let context = ContextCompactor::new(2000).compact(&registry, &full_bundle());
        assert!(context.contains("[Google]: [Google MCP Error: Missing credential"));
    }

    #[test]
    fn test_oversized_payload_is_bounded_and_marked() {
        let registry = WorkerRegistry::builtin();
        let big = "x".repeat(5000);
        let bundle = bundle_of(vec![
            ("reddit", ToolCallResult::Success(json!(big))),
            ("wikipedia", ToolCallResult::Success(json!("short"))),
            ("google", ToolCallResult::Success(json!("short"))),
            ("medium", ToolCallResult::Success(json!("short"))),
        ]);

        let context = ContextCompactor::new(2000).compact(&registry, &bundle);
        let reddit_line = context
            .lines()
            .find(|l| l.starts_with("[Reddit]:"))
            .unwrap();

        assert!(reddit_line.ends_with(TRUNCATION_MARKER));
        // "[Reddit]: " + 2000 chars + marker
        assert_eq!(
            reddit_line.chars().count(),
            "[Reddit]: ".chars().count() + 2000 + TRUNCATION_MARKER.chars().count()
        );
    }

    #[rstest::rstest]
    #[case::short("exactly this text")]
    #[case::empty("")]
    #[case::with_newlines("line one\nline two")]
    fn test_short_payload_round_trips_unchanged(#[case] payload: &str) {
        let compactor = ContextCompactor::new(2000);
        assert_eq!(compactor.truncate(payload), payload);
    }

    #[test]
    fn test_at_budget_payload_is_untouched() {
        let compactor = ContextCompactor::new(2000);
        let at_budget = "y".repeat(2000);
        assert_eq!(compactor.truncate(&at_budget), at_budget);
    }

    #[test]
    fn test_truncation_respects_multibyte_boundaries() {
        let compactor = ContextCompactor::new(3);
        let truncated = compactor.truncate("héllo wörld");
        assert!(truncated.starts_with("hél"));
        assert!(truncated.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_missing_entry_still_gets_a_segment() {
        let registry = WorkerRegistry::builtin();
        let bundle = bundle_of(vec![(
            "wikipedia",
            ToolCallResult::Success(json!("present")),
        )]);

        let context = ContextCompactor::new(2000).compact(&registry, &bundle);
        assert!(context.contains("[Reddit]: [Reddit MCP Error: no result]"));
        assert!(context.contains("[Wikipedia]: present"));
    }
}
