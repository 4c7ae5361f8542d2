//! Blocking feedback surfaces: alerts and two-option confirmations.

use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub cancel_label: String,
    pub confirm_label: String,
    /// The confirming option destroys data
    pub destructive: bool,
}

impl ConfirmPrompt {
    #[must_use]
    pub fn delete_note() -> Self {
        Self {
            title: "Delete Note".to_string(),
            message: "Are you sure you want to delete this note?".to_string(),
            cancel_label: "Cancel".to_string(),
            confirm_label: "Delete".to_string(),
            destructive: true,
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait Presenter {
    fn alert(&self, title: &str, message: &str);

    /// `true` only when the user picked the confirming option.
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAlert {
    pub title: String,
    pub message: String,
}

/// Presenter that records alerts and answers confirmations with a fixed choice.
#[derive(Debug)]
pub struct RecordingPresenter {
    alerts: Mutex<Vec<RecordedAlert>>,
    prompts: Mutex<Vec<ConfirmPrompt>>,
    answer: bool,
}

impl RecordingPresenter {
    #[must_use]
    pub const fn answering(answer: bool) -> Self {
        Self {
            alerts: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            answer,
        }
    }

    #[must_use]
    pub fn alerts(&self) -> Vec<RecordedAlert> {
        self.alerts.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn last_message(&self) -> Option<String> {
        self.alerts().pop().map(|alert| alert.message)
    }

    #[must_use]
    pub fn prompts(&self) -> Vec<ConfirmPrompt> {
        self.prompts.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self::answering(true)
    }
}

impl Presenter for RecordingPresenter {
    fn alert(&self, title: &str, message: &str) {
        if let Ok(mut alerts) = self.alerts.lock() {
            alerts.push(RecordedAlert {
                title: title.to_string(),
                message: message.to_string(),
            });
        }
    }

    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        self.answer
    }
}
