// Main application layout
// Handles window layout, panels, menu bar, and overall UI structure

use crate::services::OnboardingForm;
use crate::state::{AppState, DocumentStatus, Role, SignatureStatus, View};
use crate::ui::components::*;
use eframe::egui;

/// User intent collected during a frame, applied by the app afterwards
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Start a mock conversion
    ConvertDocument(String),
    /// Send a mock signature request
    SendSignature(String),
    /// Flip a task
    ToggleTask(String),
    /// Post the onboarding form
    SubmitOnboarding,
}

/// Onboarding form state owned by the app
pub struct OnboardingPanel<'a> {
    /// Field values
    pub form: &'a mut OnboardingForm,
    /// Whether a request is running
    pub busy: bool,
    /// Backend address shown under the form
    pub backend_url: &'a str,
    /// Last validation message
    pub error: Option<&'a str>,
}

/// Render the main application layout
/// Includes menu bar, sidebar, main content area, and output log
pub fn render_app_layout(
    ctx: &egui::Context,
    state: &mut AppState,
    terminal: &mut TerminalOutput,
    onboarding: OnboardingPanel<'_>,
) -> Vec<UiAction> {
    let mut actions = Vec::new();

    render_menu_bar(ctx, state);

    if state.ui_state.terminal_visible {
        egui::TopBottomPanel::bottom("output_panel")
            .resizable(true)
            .show(ctx, |ui| terminal.render(ui));
    }

    if state.ui_state.sidebar_visible {
        render_sidebar(ctx, state);
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .id_source("main_scroll")
            .show(ui, |ui| render_main_content(ui, state, onboarding, &mut actions));
    });

    actions
}

/// Render the top menu bar
fn render_menu_bar(ctx: &egui::Context, state: &mut AppState) {
    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                let mut dark_mode = ctx.style().visuals.dark_mode;
                if ui.checkbox(&mut dark_mode, "Dark Mode").changed() {
                    ctx.set_visuals(if dark_mode {
                        egui::Visuals::dark()
                    } else {
                        egui::Visuals::light()
                    });
                }
                ui.separator();
                ui.checkbox(&mut state.ui_state.sidebar_visible, "Sidebar");
                ui.checkbox(&mut state.ui_state.terminal_visible, "Output");
            });

            ui.menu_button("Sign in as", |ui| {
                if ui.button("Admin").clicked() {
                    state.sign_in_as_admin();
                    ui.close_menu();
                }
                ui.separator();
                let clients: Vec<(String, String)> = state
                    .clients
                    .iter()
                    .map(|c| (c.id.clone(), c.name.clone()))
                    .collect();
                for (id, name) in clients {
                    if ui.button(name).clicked() {
                        state.sign_in_as_client(&id);
                        ui.close_menu();
                    }
                }
            });

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let who = match state.role {
                    Role::Admin => "Admin".to_string(),
                    Role::Client => state
                        .current_client()
                        .map(|c| c.name.clone())
                        .unwrap_or_default(),
                };
                ui.label(egui::RichText::new(who).weak());
            });
        });
    });
}

/// Render the left sidebar with the views of the current role
fn render_sidebar(ctx: &egui::Context, state: &mut AppState) {
    egui::SidePanel::left("view_sidebar")
        .resizable(true)
        .default_width(200.0)
        .min_width(150.0)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading(match state.role {
                Role::Admin => "Back office",
                Role::Client => "My account",
            });
            ui.add_space(4.0);
            ui.separator();
            ui.add_space(4.0);

            for view in View::for_role(state.role) {
                let selected = state.ui_state.view == *view;
                if ui.selectable_label(selected, view.label()).clicked() {
                    state.select_view(*view);
                }
                ui.add_space(2.0);
            }
        });
}

/// Render the main content area
fn render_main_content(
    ui: &mut egui::Ui,
    state: &mut AppState,
    onboarding: OnboardingPanel<'_>,
    actions: &mut Vec<UiAction>,
) {
    match state.ui_state.view {
        View::Clients => render_clients(ui, state),
        View::Documents => render_documents(ui, state, actions),
        View::Signatures => render_signatures(ui, state, actions),
        View::Tasks => render_tasks(ui, state, actions),
        View::Projects => render_projects(ui, state),
        View::Onboarding => render_onboarding(ui, onboarding, actions),
    }
}

fn render_clients(ui: &mut egui::Ui, state: &AppState) {
    section_header(ui, "Clients");
    let clients = state.visible_clients();
    if clients.is_empty() {
        empty_notice(ui, "No clients yet");
        return;
    }

    egui::Grid::new("clients_grid")
        .striped(true)
        .num_columns(4)
        .spacing([24.0, 8.0])
        .show(ui, |ui| {
            ui.strong("ID");
            ui.strong("Name");
            ui.strong("Email");
            ui.strong("Status");
            ui.end_row();
            for client in clients {
                ui.monospace(client.id.as_str());
                ui.label(client.name.as_str());
                ui.label(client.email.as_str());
                status_badge(ui, &client.status);
                ui.end_row();
            }
        });
}

fn render_documents(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<UiAction>) {
    section_header(ui, "Documents");
    let documents = state.visible_documents();
    if documents.is_empty() {
        empty_notice(ui, "No documents");
        return;
    }

    egui::Grid::new("documents_grid")
        .striped(true)
        .num_columns(4)
        .spacing([24.0, 8.0])
        .show(ui, |ui| {
            ui.strong("Document");
            ui.strong("Client");
            ui.strong("Status");
            ui.label("");
            ui.end_row();
            for document in documents {
                ui.label(document.name.as_str());
                ui.label(state.client_name(&document.client_id));
                status_badge(ui, &document.status);
                let can_convert = matches!(
                    document.status,
                    DocumentStatus::Uploaded | DocumentStatus::Failed
                );
                if ui
                    .add_enabled(can_convert, egui::Button::new("Convert"))
                    .clicked()
                {
                    actions.push(UiAction::ConvertDocument(document.id.clone()));
                }
                ui.end_row();
            }
        });
}

fn render_signatures(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<UiAction>) {
    section_header(ui, "Signatures");
    let signatures = state.visible_signatures();
    if signatures.is_empty() {
        empty_notice(ui, "No signature requests");
        return;
    }

    egui::Grid::new("signatures_grid")
        .striped(true)
        .num_columns(4)
        .spacing([24.0, 8.0])
        .show(ui, |ui| {
            ui.strong("Signer");
            ui.strong("Document");
            ui.strong("Status");
            ui.label("");
            ui.end_row();
            for signature in signatures {
                ui.label(signature.signer.as_str());
                let document = state
                    .documents
                    .iter()
                    .find(|d| d.id == signature.document_id)
                    .map(|d| d.name.as_str())
                    .unwrap_or(signature.document_id.as_str());
                ui.label(document);
                status_badge(ui, &signature.status);
                let can_send = signature.status == SignatureStatus::Draft
                    || (signature.status.is_terminal()
                        && signature.status != SignatureStatus::Signed);
                if ui.add_enabled(can_send, egui::Button::new("Send")).clicked() {
                    actions.push(UiAction::SendSignature(signature.id.clone()));
                }
                ui.end_row();
            }
        });
}

fn render_tasks(ui: &mut egui::Ui, state: &AppState, actions: &mut Vec<UiAction>) {
    section_header(ui, "Tasks");
    let tasks = state.visible_tasks();
    if tasks.is_empty() {
        empty_notice(ui, "Nothing to do");
        return;
    }

    for task in tasks {
        ui.horizontal(|ui| {
            let mut done = task.done;
            if ui.checkbox(&mut done, task.title.as_str()).changed() {
                actions.push(UiAction::ToggleTask(task.id.clone()));
            }
            if state.role == Role::Admin {
                ui.label(egui::RichText::new(state.client_name(&task.client_id)).weak());
            }
        });
        ui.add_space(4.0);
    }
}

fn render_projects(ui: &mut egui::Ui, state: &AppState) {
    section_header(ui, "Projects");
    let projects = state.visible_projects();
    if projects.is_empty() {
        empty_notice(ui, "No projects");
        return;
    }

    for project in projects {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(project.name.as_str()).strong());
                ui.label(egui::RichText::new(state.client_name(&project.client_id)).weak());
            });
            ui.add(egui::ProgressBar::new(project.progress).show_percentage());
        });
        ui.add_space(8.0);
    }
}

fn render_onboarding(
    ui: &mut egui::Ui,
    mut panel: OnboardingPanel<'_>,
    actions: &mut Vec<UiAction>,
) {
    section_header(ui, "Onboard a new client");
    ui.label(
        egui::RichText::new(
            "Saves the client record, creates and shares the client folder, \
             sends the engagement letter and renames the folder's files.",
        )
        .weak(),
    );
    ui.add_space(12.0);

    egui::Grid::new("onboarding_form")
        .num_columns(2)
        .spacing([16.0, 8.0])
        .show(ui, |ui| {
            ui.label("Client ID");
            ui.text_edit_singleline(&mut panel.form.id);
            ui.end_row();
            ui.label("Name");
            ui.text_edit_singleline(&mut panel.form.name);
            ui.end_row();
            ui.label("Email");
            ui.text_edit_singleline(&mut panel.form.email);
            ui.end_row();
        });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        ui.spacing_mut().button_padding = egui::vec2(12.0, 8.0);
        let submit = ui.add_enabled_ui(!panel.busy, |ui| primary_button(ui, "Run onboarding"));
        if submit.inner.clicked() {
            actions.push(UiAction::SubmitOnboarding);
        }
        if panel.busy {
            ui.spinner();
            ui.label("Running…");
        }
    });

    if let Some(error) = panel.error {
        ui.add_space(8.0);
        ui.colored_label(egui::Color32::from_rgb(220, 0, 0), error);
    }

    ui.add_space(8.0);
    ui.label(
        egui::RichText::new(format!("Backend: {}", panel.backend_url))
            .weak()
            .small(),
    );
}
