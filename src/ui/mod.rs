// UI module
// Contains layout, components, and UI-related functionality

pub mod components;
pub mod layout;

pub use components::TerminalOutput;
pub use layout::{render_app_layout, OnboardingPanel, UiAction};
