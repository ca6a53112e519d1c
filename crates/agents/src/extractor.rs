use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};
use wayfarer_core::{classify_intent_rules, Detection, DetectionSource, EntityBag, Intent};
use wayfarer_llm::{parse_json, CompletionRequest};

use crate::deadline::Deadline;
use crate::runtime::Runtime;

const SYSTEM_PROMPT: &str =
    "You are an intent detection assistant. Classify user intents and extract entities. Return ONLY valid JSON.";

#[derive(Debug, Deserialize)]
struct ModelDetection {
    intent: String,
    #[serde(default)]
    entities: Value,
}

/// Classifies a message. Uses the language model when one is configured and
/// the keyword rules otherwise, or whenever the model's answer is unusable.
#[derive(Clone)]
pub struct IntentExtractor {
    runtime: Arc<Runtime>,
}

impl IntentExtractor {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }

    pub async fn detect(&self, text: &str, deadline: Deadline) -> Detection {
        if !self.runtime.has_llm() {
            return classify_intent_rules(text);
        }

        let request = CompletionRequest::new(SYSTEM_PROMPT, detection_prompt(text))
            .temperature(0.3)
            .max_tokens(300);

        let Some(raw) = self.runtime.ask_llm(deadline, "intent", request).await else {
            self.runtime.metrics.inc_fallback();
            return classify_intent_rules(text);
        };

        match interpret(&raw) {
            Ok(detection) => {
                debug!(intent = %detection.intent, "model classified message");
                detection
            }
            Err(reason) => {
                warn!(%reason, "model detection unusable, applying keyword rules");
                self.runtime.metrics.inc_fallback();
                classify_intent_rules(text)
            }
        }
    }
}

fn interpret(raw: &str) -> Result<Detection, String> {
    let parsed: ModelDetection = parse_json(raw).map_err(|err| err.to_string())?;
    let intent = parsed
        .intent
        .parse::<Intent>()
        .map_err(|err| err.to_string())?;

    Ok(Detection {
        intent,
        entities: EntityBag::from_json(&parsed.entities),
        source: DetectionSource::Model,
    })
}

fn detection_prompt(text: &str) -> String {
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S");
    let intents = Intent::ALL
        .iter()
        .map(|intent| intent.as_code())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Current date and time (UTC): {now}

You are the intent detection model for a travel assistant.
Classify the user message into exactly one of:
[{intents}]

Message: "{text}"

Return ONLY valid JSON:
{{
  "intent": "one_of_the_intents_above",
  "entities": {{
    "destination": "city or country",
    "duration": number_of_days,
    "budget": amount_in_thb,
    "date_from": "YYYY-MM-DD",
    "date_to": "YYYY-MM-DD",
    "travelers": number,
    "interests": ["interest"],
    "location": {{"lat": 0.0, "lng": 0.0}},
    "flight_code": "flight number"
  }}
}}"#
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::runtime::test_support::{runtime, ScriptedModel};
    use crate::runtime::Collaborators;

    fn deadline() -> Deadline {
        Deadline::after(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn rules_are_used_without_a_model() {
        let extractor = IntentExtractor::new(runtime(Collaborators::none()));
        let detection = extractor.detect("What's the weather in Osaka?", deadline()).await;
        assert_eq!(detection.intent, Intent::WeatherCheck);
        assert_eq!(detection.source, DetectionSource::Rules);
    }

    #[tokio::test]
    async fn fenced_model_output_is_accepted() {
        let model = ScriptedModel::replying(vec![
            "```json\n{\"intent\":\"plan_trip\",\"entities\":{\"destination\":\"Tokyo\",\"duration\":\"5\",\"budget\":\"80,000\"}}\n```",
        ]);
        let extractor = IntentExtractor::new(runtime(Collaborators::none().with_llm(model.clone())));

        let detection = extractor.detect("Tokyo for 5 days, 80k", deadline()).await;
        assert_eq!(detection.intent, Intent::PlanTrip);
        assert_eq!(detection.source, DetectionSource::Model);
        assert_eq!(detection.entities.destination(), Some("Tokyo"));
        assert_eq!(detection.entities.duration_or(7), 5);
        assert_eq!(detection.entities.budget_or(0.0), 80_000.0);

        let request = model.last_request.lock().clone().unwrap();
        assert_eq!(request.temperature, 0.3);
        assert!(request.user.contains("Tokyo for 5 days"));
    }

    #[tokio::test]
    async fn unknown_model_intent_falls_back_to_rules() {
        let model = ScriptedModel::replying(vec![r#"{"intent":"book_flight","entities":{}}"#]);
        let extractor = IntentExtractor::new(runtime(Collaborators::none().with_llm(model)));

        let detection = extractor.detect("Any hotel near the beach?", deadline()).await;
        assert_eq!(detection.intent, Intent::HotelSearch);
        assert_eq!(detection.source, DetectionSource::Rules);
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_rules() {
        let extractor =
            IntentExtractor::new(runtime(Collaborators::none().with_llm(ScriptedModel::failing())));
        let detection = extractor.detect("Is flight JL708 on time?", deadline()).await;
        assert_eq!(detection.intent, Intent::FlightCheck);
        assert_eq!(detection.entities.flight_code(), Some("JL708"));
    }

    #[test]
    fn prompt_lists_every_intent() {
        let prompt = detection_prompt("hello");
        for intent in Intent::ALL {
            assert!(prompt.contains(intent.as_code()));
        }
    }
}
