// Services module
// Backend HTTP client and the mocked document/signature services

pub mod backend;
pub mod mock;

pub use backend::{BackendClient, OnboardingForm, OnboardingRunner};
pub use mock::{JobUpdate, MockServices};
