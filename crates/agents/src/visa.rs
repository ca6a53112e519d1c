use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};
use wayfarer_core::visa::{manual_verification_requirement, seeded_requirement, visa_key};
use wayfarer_core::VisaRequirement;
use wayfarer_llm::{parse_json, CompletionRequest};

use crate::deadline::Deadline;
use crate::error::AgentError;
use crate::runtime::Runtime;

const VISA_SYSTEM: &str = "You are a visa requirements expert. Return ONLY valid JSON.";
pub const DEFAULT_PURPOSE: &str = "tourism";

#[async_trait]
pub trait VisaAdvisor: Send + Sync {
    async fn check_visa(
        &self,
        nationality: &str,
        destination: &str,
        stay_days: u32,
        purpose: &str,
        deadline: Deadline,
    ) -> Result<VisaRequirement, AgentError>;
}

pub struct VisaAgent {
    runtime: Arc<Runtime>,
}

impl VisaAgent {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl VisaAdvisor for VisaAgent {
    #[instrument(skip(self, deadline))]
    async fn check_visa(
        &self,
        nationality: &str,
        destination: &str,
        stay_days: u32,
        purpose: &str,
        deadline: Deadline,
    ) -> Result<VisaRequirement, AgentError> {
        let purpose = match purpose.trim() {
            "" => DEFAULT_PURPOSE,
            other => other,
        };

        if let Some(requirement) = seeded_requirement(&visa_key(nationality, destination, purpose)) {
            info!("seeded visa requirement");
            return Ok(requirement);
        }

        let cache_key = format!(
            "visa:{}:{}:{}",
            nationality.trim().to_lowercase(),
            destination.trim().to_lowercase(),
            purpose.to_lowercase()
        );
        if let Some(requirement) = self.runtime.cache_get_json::<VisaRequirement>(&cache_key).await {
            return Ok(requirement);
        }

        let prompt = format!(
            r#"You are VisaDoc Agent, an expert in international visa requirements.
Give official-style but non-legal guidance.

Traveller:
- Nationality: {nationality}
- Destination: {destination}
- Stay duration: {stay_days} days
- Purpose: {purpose}

Return ONLY valid JSON with this structure:
{{
  "visa_required": boolean,
  "visa_type": "string or empty",
  "checklist": [{{"item": "string", "notes": "string"}}],
  "forms": [{{"name": "string", "download_url": "string"}}],
  "processing_time": "string",
  "fees": {{"amount": number, "currency": "string"}},
  "validity": "string",
  "max_stay_days": number,
  "disclaimer": "This is not legal advice. Please verify with official government sources."
}}

If uncertain, set visa_required to true and suggest manual verification."#
        );
        let request = CompletionRequest::new(VISA_SYSTEM, prompt)
            .temperature(0.3)
            .max_tokens(1000);

        if let Some(raw) = self.runtime.ask_llm(deadline, "visa", request).await {
            match parse_json::<VisaRequirement>(&raw) {
                Ok(requirement) => {
                    self.runtime.cache_put_json(&cache_key, &requirement).await;
                    return Ok(requirement);
                }
                Err(err) => warn!(error = %err, "visa answer from model unusable"),
            }
        }

        self.runtime.metrics.inc_fallback();
        Ok(manual_verification_requirement(destination))
    }
}
