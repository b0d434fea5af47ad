//! Client onboarding workflow and the folder rename pass

pub mod onboarding;
pub mod rename;

pub use onboarding::{
    OnboardingError, OnboardingOutcome, OnboardingRequest, OnboardingSettings, OnboardingStep,
    OnboardingWorkflow, StepEvent, StepStatus,
};
pub use rename::{rename_pass, RenameReport, RenamedFile};
