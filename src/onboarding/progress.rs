//! Onboarding wizard state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of numbered steps along the guided path
pub const TOTAL_STEPS: usize = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStep {
    #[default]
    Welcome,
    Requirements,
    CreateApp,
    AddWhatsapp,
    Credentials,
    TestConnection,
    ConfigureWebhook,
    SyncTemplates,
    SendFirstMessage,
    CreatePermanentToken,
    DirectCredentials,
    Complete,
}

/// Numbered guided steps, in order
const NUMBERED_STEPS: [OnboardingStep; TOTAL_STEPS] = [
    OnboardingStep::Requirements,
    OnboardingStep::CreateApp,
    OnboardingStep::AddWhatsapp,
    OnboardingStep::Credentials,
    OnboardingStep::TestConnection,
    OnboardingStep::ConfigureWebhook,
    OnboardingStep::SyncTemplates,
    OnboardingStep::SendFirstMessage,
    OnboardingStep::CreatePermanentToken,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingPath {
    Guided,
    Direct,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnboardingProgress {
    pub current_step: OnboardingStep,
    pub path: Option<OnboardingPath>,
    pub completed_steps: Vec<OnboardingStep>,
    pub is_checklist_minimized: bool,
    pub is_checklist_dismissed: bool,
    /// Manual confirmation; cannot be checked against the platform
    pub permanent_token_confirmed: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChecklistProgress {
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
}

/// A user action on the wizard or checklist
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OnboardingAction {
    Start { path: OnboardingPath },
    GoTo { step: OnboardingStep },
    CompleteStep { step: OnboardingStep },
    Next,
    Previous,
    Complete,
    MinimizeChecklist { minimized: bool },
    DismissChecklist,
    ConfirmPermanentToken,
    Reset,
}

impl OnboardingProgress {
    pub fn start(&mut self, path: OnboardingPath) {
        self.path = Some(path);
        self.current_step = match path {
            OnboardingPath::Guided => OnboardingStep::Requirements,
            OnboardingPath::Direct => OnboardingStep::DirectCredentials,
        };
        self.started_at.get_or_insert_with(Utc::now);
    }

    pub fn go_to(&mut self, step: OnboardingStep) {
        self.current_step = step;
    }

    pub fn complete_step(&mut self, step: OnboardingStep) {
        if !self.completed_steps.contains(&step) {
            self.completed_steps.push(step);
        }
    }

    /// Mark the current step done and advance
    pub fn next(&mut self) {
        self.complete_step(self.current_step);

        if self.path == Some(OnboardingPath::Guided) {
            let next = match NUMBERED_STEPS.iter().position(|s| *s == self.current_step) {
                Some(idx) => NUMBERED_STEPS
                    .get(idx + 1)
                    .copied()
                    .unwrap_or(OnboardingStep::Complete),
                None if self.current_step == OnboardingStep::Complete => OnboardingStep::Complete,
                None => OnboardingStep::Requirements,
            };
            self.current_step = next;
            if next == OnboardingStep::Complete {
                self.completed_at = Some(Utc::now());
            }
            return;
        }

        self.current_step = OnboardingStep::Complete;
        self.completed_at = Some(Utc::now());
    }

    pub fn previous(&mut self) {
        if self.path == Some(OnboardingPath::Guided) {
            self.current_step = NUMBERED_STEPS
                .iter()
                .position(|s| *s == self.current_step)
                .and_then(|idx| idx.checked_sub(1))
                .map_or(OnboardingStep::Welcome, |idx| NUMBERED_STEPS[idx]);
            return;
        }

        self.current_step = OnboardingStep::Welcome;
        self.path = None;
    }

    pub fn complete(&mut self) {
        self.current_step = OnboardingStep::Complete;
        self.completed_at = Some(Utc::now());
    }

    /// Apply an action; `Reset` restores the defaults
    pub fn apply(&mut self, action: &OnboardingAction) {
        match action {
            OnboardingAction::Start { path } => self.start(*path),
            OnboardingAction::GoTo { step } => self.go_to(*step),
            OnboardingAction::CompleteStep { step } => self.complete_step(*step),
            OnboardingAction::Next => self.next(),
            OnboardingAction::Previous => self.previous(),
            OnboardingAction::Complete => self.complete(),
            OnboardingAction::MinimizeChecklist { minimized } => {
                self.is_checklist_minimized = *minimized
            }
            OnboardingAction::DismissChecklist => self.is_checklist_dismissed = true,
            OnboardingAction::ConfirmPermanentToken => self.permanent_token_confirmed = true,
            OnboardingAction::Reset => *self = Self::default(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_step == OnboardingStep::Complete || self.completed_at.is_some()
    }

    pub fn should_show_modal(&self) -> bool {
        !self.is_complete()
    }

    pub fn should_show_checklist(&self) -> bool {
        self.is_complete() && !self.is_checklist_dismissed
    }

    /// 1-based position along the numbered guided steps, 0 elsewhere
    pub fn current_step_number(&self) -> usize {
        NUMBERED_STEPS
            .iter()
            .position(|s| *s == self.current_step)
            .map_or(0, |idx| idx + 1)
    }

    pub fn checklist_progress(&self) -> ChecklistProgress {
        let completed = self.completed_steps.len();
        let percentage = (completed as f64 / TOTAL_STEPS as f64 * 100.0).round() as u32;
        ChecklistProgress {
            total: TOTAL_STEPS,
            completed,
            percentage,
        }
    }
}

/// Progress plus everything derived from it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingView {
    pub progress: OnboardingProgress,
    pub is_complete: bool,
    pub should_show_modal: bool,
    pub should_show_checklist: bool,
    pub current_step_number: usize,
    pub total_steps: usize,
    pub checklist_progress: ChecklistProgress,
}

impl From<&OnboardingProgress> for OnboardingView {
    fn from(progress: &OnboardingProgress) -> Self {
        Self {
            progress: progress.clone(),
            is_complete: progress.is_complete(),
            should_show_modal: progress.should_show_modal(),
            should_show_checklist: progress.should_show_checklist(),
            current_step_number: progress.current_step_number(),
            total_steps: TOTAL_STEPS,
            checklist_progress: progress.checklist_progress(),
        }
    }
}
