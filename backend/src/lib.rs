//! Ledgerline Backend Library
//!
//! HTTP backend for client onboarding: thin adapters over Firestore, Google
//! Drive, Google Sheets, Zoho Sign and SMTP, plus the onboarding workflow that
//! chains them. The binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod env_file;
pub mod error;
pub mod services;
/// Application state management
///
/// Handles service wiring and `apiConfig.json` persistence.
pub mod state;
pub mod workflow;
