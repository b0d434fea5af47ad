// Ledgerline Dashboard - Main Entry Point
// Desktop back office for the admin and client dashboards

mod services;
mod state;
mod ui;

use eframe::egui;
use services::{BackendClient, JobUpdate, MockServices, OnboardingForm, OnboardingRunner};
use state::{AppState, DocumentStatus, SignatureStatus};
use std::time::Duration;
use ui::{render_app_layout, OnboardingPanel, TerminalOutput, UiAction};

fn main() -> eframe::Result<()> {
    // Configure window options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Ledgerline")
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ledgerline",
        options,
        Box::new(|_cc| Box::new(DashboardApp::new())),
    )
}

/// Main application struct
/// Owns the dashboard state and the background workers feeding it
struct DashboardApp {
    /// Dashboard data, role and UI preferences
    state: AppState,
    /// Output log
    terminal: TerminalOutput,
    /// Onboarding form fields
    form: OnboardingForm,
    /// Last form validation error
    form_error: Option<String>,
    /// Posts onboarding requests to the backend
    runner: OnboardingRunner,
    /// Mock conversion and signature jobs
    mocks: MockServices,
}

impl DashboardApp {
    /// App with demo data, talking to the configured backend
    fn new() -> Self {
        let runner = OnboardingRunner::new(BackendClient::from_env());
        let mut app = Self::with_services(runner, MockServices::new());
        app.terminal.add_line("Ledgerline dashboard ready".to_string());
        app.terminal
            .add_line(format!("Backend: {}", app.runner.backend_url()));
        app
    }

    fn with_services(runner: OnboardingRunner, mocks: MockServices) -> Self {
        Self {
            state: AppState::with_demo_data(),
            terminal: TerminalOutput::new(500), // Keep last 500 lines
            form: OnboardingForm::default(),
            form_error: None,
            runner,
            mocks,
        }
    }

    /// Apply one action collected from the UI
    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::ConvertDocument(id) => {
                if self.state.set_document_status(&id, DocumentStatus::Converting) {
                    self.terminal.add_line(format!("Converting document {}", id));
                    self.mocks.start_conversion(id);
                }
            }
            UiAction::SendSignature(id) => {
                if self.state.set_signature_status(&id, SignatureStatus::Pending) {
                    self.terminal
                        .add_line(format!("Signature request {} sent", id));
                    self.mocks.start_signature(id);
                }
            }
            UiAction::ToggleTask(id) => {
                self.state.toggle_task(&id);
            }
            UiAction::SubmitOnboarding => self.submit_onboarding(),
        }
    }

    fn submit_onboarding(&mut self) {
        if let Err(message) = self.form.validate() {
            self.form_error = Some(message);
            return;
        }
        self.form_error = None;

        if self.runner.submit(self.form.clone()) {
            self.terminal
                .add_line(format!("Onboarding {} ({})…", self.form.name, self.form.id));
        }
    }

    /// Pull finished work from the background threads into the state
    fn collect_results(&mut self) {
        if let Some(finished) = self.runner.poll() {
            match finished.result {
                Ok(body) => {
                    let form = &finished.form;
                    self.state
                        .record_onboarded_client(&form.id, &form.name, &form.email);
                    self.terminal.add_text(&body);
                    if self.form == finished.form {
                        self.form = OnboardingForm::default();
                    }
                }
                Err(error) => {
                    self.terminal
                        .add_line(format!("Onboarding {} failed: {}", finished.form.id, error));
                }
            }
        }

        for update in self.mocks.poll() {
            self.apply_job_update(update);
        }
    }

    fn apply_job_update(&mut self, update: JobUpdate) {
        match update {
            JobUpdate::Conversion {
                document_id,
                status,
            } => {
                self.state.set_document_status(&document_id, status);
                self.terminal
                    .add_line(format!("Document {}: {:?}", document_id, status));
            }
            JobUpdate::Signature {
                signature_id,
                status,
            } => {
                self.state.set_signature_status(&signature_id, status);
                self.terminal
                    .add_line(format!("Signature {}: {:?}", signature_id, status));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.collect_results();

        let backend_url = self.runner.backend_url().to_string();
        let actions = render_app_layout(
            ctx,
            &mut self.state,
            &mut self.terminal,
            OnboardingPanel {
                form: &mut self.form,
                busy: self.runner.in_flight(),
                backend_url: &backend_url,
                error: self.form_error.as_deref(),
            },
        );
        for action in actions {
            self.apply_action(action);
        }

        // Workers don't wake the UI, so keep polling while they run
        if self.runner.in_flight() || self.mocks.in_flight() > 0 {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn app() -> DashboardApp {
        // Nothing listens here; tests that submit use their own server
        let runner = OnboardingRunner::new(BackendClient::new("http://127.0.0.1:9"));
        DashboardApp::with_services(runner, MockServices::with_delay(0, 5))
    }

    fn wait_until(app: &mut DashboardApp, done: impl Fn(&DashboardApp) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(app) && Instant::now() < deadline {
            app.collect_results();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_app_creation() {
        let app = app();
        assert!(!app.state.clients.is_empty());
        assert!(app.form_error.is_none());
    }

    #[test]
    fn test_conversion_resolves() {
        let mut app = app();
        app.apply_action(UiAction::ConvertDocument("d-1".to_string()));
        assert_eq!(app.state.documents[0].status, DocumentStatus::Converting);

        wait_until(&mut app, |a| a.mocks.in_flight() == 0);
        assert!(matches!(
            app.state.documents[0].status,
            DocumentStatus::Converted | DocumentStatus::Failed
        ));
    }

    #[test]
    fn test_signature_resolves() {
        let mut app = app();
        let id = app.state.signatures[0].id.clone();
        app.apply_action(UiAction::SendSignature(id));
        assert_eq!(app.state.signatures[0].status, SignatureStatus::Pending);

        wait_until(&mut app, |a| a.mocks.in_flight() == 0);
        assert!(app.state.signatures[0].status.is_terminal());
    }

    #[test]
    fn test_unknown_ids_start_nothing() {
        let mut app = app();
        app.apply_action(UiAction::ConvertDocument("missing".to_string()));
        app.apply_action(UiAction::SendSignature("missing".to_string()));
        assert_eq!(app.mocks.in_flight(), 0);
    }

    #[test]
    fn test_toggle_task() {
        let mut app = app();
        let before = app.state.tasks[0].done;
        app.apply_action(UiAction::ToggleTask(app.state.tasks[0].id.clone()));
        assert_eq!(app.state.tasks[0].done, !before);
    }

    #[test]
    fn test_invalid_form_is_not_submitted() {
        let mut app = app();
        app.apply_action(UiAction::SubmitOnboarding);
        assert!(app.form_error.is_some());
        assert!(!app.runner.in_flight());
    }

    #[test]
    fn test_onboarding_success_records_client() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/workflow/onboard")
            .with_status(200)
            .with_body(r#"{"clientId":"c-900","folderId":"folder-9"}"#)
            .create();

        let runner = OnboardingRunner::new(BackendClient::new(server.url()));
        let mut app = DashboardApp::with_services(runner, MockServices::with_delay(0, 5));
        app.form = OnboardingForm {
            id: "c-900".to_string(),
            name: "Nora Vidal".to_string(),
            email: "nora@example.com".to_string(),
        };
        app.apply_action(UiAction::SubmitOnboarding);
        assert!(app.runner.in_flight());

        wait_until(&mut app, |a| !a.runner.in_flight());
        assert!(app.state.clients.iter().any(|c| c.id == "c-900"));
        assert_eq!(app.form, OnboardingForm::default());
        assert!(app
            .terminal
            .lines()
            .iter()
            .any(|l| l.contains("\"folderId\": \"folder-9\"")));
    }

    #[test]
    fn test_onboarding_failure_is_logged() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/workflow/onboard")
            .with_status(500)
            .with_body(r#"{"error":"Client onboarding failed","status":500}"#)
            .create();

        let runner = OnboardingRunner::new(BackendClient::new(server.url()));
        let mut app = DashboardApp::with_services(runner, MockServices::with_delay(0, 5));
        app.form = OnboardingForm {
            id: "c-901".to_string(),
            name: "Leo Marin".to_string(),
            email: "leo@example.com".to_string(),
        };
        let clients = app.state.clients.len();
        app.apply_action(UiAction::SubmitOnboarding);

        wait_until(&mut app, |a| !a.runner.in_flight());
        assert_eq!(app.state.clients.len(), clients);
        assert!(app
            .terminal
            .lines()
            .iter()
            .any(|l| l.contains("c-901 failed")));
    }
}
