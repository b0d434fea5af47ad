// State management module
// Handles mock back-office data, role switching and UI state

pub mod app_state;

pub use app_state::{
    AppState, Client, ClientStatus, Document, DocumentStatus, Project, Role, Signature,
    SignatureStatus, Task, View,
};
