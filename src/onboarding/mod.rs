//! Onboarding wizard progress with load-on-start and save-on-change.

mod progress;
mod store;

pub use progress::{
    ChecklistProgress, OnboardingAction, OnboardingPath, OnboardingProgress, OnboardingStep,
    OnboardingView, TOTAL_STEPS,
};
pub use store::{OnboardingError, OnboardingService, OnboardingStore, STORAGE_VERSION};
