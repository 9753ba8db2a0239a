use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::flow::FlowService;
use crate::onboarding::{OnboardingService, OnboardingStore};
use crate::persistence::{create_backends, Backends, TemplateDraftBackend};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub templates: Arc<dyn TemplateDraftBackend>,
    pub flows: FlowService,
    pub onboarding: Arc<OnboardingService>,
    pub start_time: Instant,
}

impl AppState {
    /// Build state from configuration, loading onboarding progress from disk
    pub async fn new(settings: Settings) -> Self {
        let backends = create_backends(&settings.storage);
        let store = OnboardingStore::new(&settings.onboarding.storage_path);
        let onboarding = OnboardingService::load(store).await;

        Self::from_parts(settings, backends, onboarding)
    }

    pub fn from_parts(settings: Settings, backends: Backends, onboarding: OnboardingService) -> Self {
        Self {
            settings: Arc::new(settings),
            templates: backends.templates,
            flows: FlowService::new(backends.flows),
            onboarding: Arc::new(onboarding),
            start_time: Instant::now(),
        }
    }
}
