use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::workflows::advisory::{AdvisoryService, CompletionError, CompletionGateway};
use crate::workflows::financing::{ApplicantProfile, ProfileForm, VehicleCatalog};

/// Gateway answering every prompt with a canned result and recording prompts.
#[derive(Debug)]
pub(super) struct ScriptedGateway {
    reply: Result<String, CompletionError>,
    delay: Duration,
    prompts: Mutex<Vec<(String, u32)>>,
}

impl ScriptedGateway {
    pub(super) fn replying(text: &str) -> Self {
        Self::new(Ok(text.to_string()), Duration::ZERO)
    }

    pub(super) fn failing(error: CompletionError) -> Self {
        Self::new(Err(error), Duration::ZERO)
    }

    pub(super) fn new(reply: Result<String, CompletionError>, delay: Duration) -> Self {
        Self {
            reply,
            delay,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn prompts(&self) -> Vec<(String, u32)> {
        self.prompts.lock().expect("prompt log").clone()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, CompletionError> {
        self.prompts
            .lock()
            .expect("prompt log")
            .push((prompt.to_string(), max_tokens));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }
}

pub(super) fn service_with(gateway: Arc<ScriptedGateway>, timeout: Duration) -> AdvisoryService {
    AdvisoryService::new(
        Some(gateway as Arc<dyn CompletionGateway>),
        Arc::new(VehicleCatalog::standard()),
        timeout,
    )
}

pub(super) fn profile_form() -> ProfileForm {
    ProfileForm {
        credit_score: Some("670-739".to_string()),
        annual_income: Some("62000".to_string()),
        down_payment: Some("3000".to_string()),
        car_price: Some("31000".to_string()),
        employment_status: Some("full-time".to_string()),
        monthly_budget: Some("450".to_string()),
        lifestyle: Some("weekend camping".to_string()),
        job_description: Some("teacher".to_string()),
    }
}

pub(super) fn profile() -> ApplicantProfile {
    ApplicantProfile::from_form(profile_form())
}
