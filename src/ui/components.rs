// Reusable UI components
// Provides common UI elements for the application

use crate::state::{ClientStatus, DocumentStatus, SignatureStatus};
use eframe::egui;

const GREEN: egui::Color32 = egui::Color32::from_rgb(0, 180, 0);
const YELLOW: egui::Color32 = egui::Color32::from_rgb(220, 180, 0);
const RED: egui::Color32 = egui::Color32::from_rgb(220, 0, 0);
const BLUE: egui::Color32 = egui::Color32::from_rgb(60, 140, 230);

/// Anything rendered as a colored status label
pub trait StatusBadge {
    /// Text and color of the badge
    fn badge(&self) -> (&'static str, egui::Color32);
}

impl StatusBadge for ClientStatus {
    fn badge(&self) -> (&'static str, egui::Color32) {
        match self {
            ClientStatus::Pending => ("Pending", YELLOW),
            ClientStatus::Active => ("Active", GREEN),
            ClientStatus::Inactive => ("Inactive", egui::Color32::GRAY),
        }
    }
}

impl StatusBadge for DocumentStatus {
    fn badge(&self) -> (&'static str, egui::Color32) {
        match self {
            DocumentStatus::Uploaded => ("Uploaded", egui::Color32::GRAY),
            DocumentStatus::Converting => ("Converting…", BLUE),
            DocumentStatus::Converted => ("Converted", GREEN),
            DocumentStatus::Failed => ("Failed", RED),
        }
    }
}

impl StatusBadge for SignatureStatus {
    fn badge(&self) -> (&'static str, egui::Color32) {
        match self {
            SignatureStatus::Draft => ("Draft", egui::Color32::GRAY),
            SignatureStatus::Pending => ("Awaiting signature", BLUE),
            SignatureStatus::Signed => ("Signed", GREEN),
            SignatureStatus::Declined => ("Declined", RED),
            SignatureStatus::Expired => ("Expired", YELLOW),
        }
    }
}

/// Render a status badge with colored text (no background bar)
pub fn status_badge(ui: &mut egui::Ui, status: &impl StatusBadge) {
    let (text, color) = status.badge();
    ui.colored_label(color, text);
}

/// Render a primary action button
pub fn primary_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    ui.button(egui::RichText::new(text).strong())
}

/// Render a section header with a separator below
pub fn section_header(ui: &mut egui::Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);
}

/// Render a placeholder for an empty table
pub fn empty_notice(ui: &mut egui::Ui, text: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(egui::RichText::new(text).italics().weak().size(14.0));
    });
}

/// Scrollable output log
/// Shows workflow responses and mock job results
pub struct TerminalOutput {
    /// Buffer of output lines
    lines: Vec<String>,
    /// Maximum number of lines to keep (0 = unlimited)
    max_lines: usize,
    /// Whether to auto-scroll to bottom
    auto_scroll: bool,
}

impl TerminalOutput {
    /// Create a new output log
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: Vec::new(),
            max_lines,
            auto_scroll: true,
        }
    }

    /// Add a line to the output
    pub fn add_line(&mut self, line: String) {
        self.lines.push(line);
        if self.max_lines > 0 && self.lines.len() > self.max_lines {
            self.lines.remove(0);
        }
    }

    /// Add multi-line text, one entry per line
    pub fn add_text(&mut self, text: &str) {
        for line in text.lines() {
            self.add_line(line.to_string());
        }
    }

    /// Lines currently held
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Clear all output
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Render the output in a scrollable area
    pub fn render(&mut self, ui: &mut egui::Ui) {
        // Control bar
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            ui.label(egui::RichText::new("Output").heading());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add_space(8.0);
                if ui.button("Clear").clicked() {
                    self.clear();
                }
                ui.add_space(8.0);
                ui.checkbox(&mut self.auto_scroll, "Auto-scroll");
            });
        });
        ui.add_space(4.0);
        ui.separator();
        ui.add_space(4.0);

        egui::ScrollArea::vertical()
            .id_source("output_scroll")
            .auto_shrink([false; 2])
            .max_height(200.0)
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing = egui::vec2(4.0, 2.0);

                for line in &self.lines {
                    ui.horizontal(|ui| {
                        ui.add_space(8.0);
                        ui.label(
                            egui::RichText::new(line)
                                .size(12.0)
                                .family(egui::FontFamily::Monospace),
                        );
                    });
                }

                if self.auto_scroll && !self.lines.is_empty() {
                    ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                }
            });
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new(1000) // Default to 1000 lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_bounded() {
        let mut output = TerminalOutput::new(3);
        output.add_text("one\ntwo\nthree\nfour");
        assert_eq!(output.lines(), &["two", "three", "four"]);

        output.clear();
        assert!(output.lines().is_empty());
    }

    #[test]
    fn test_badges() {
        assert_eq!(DocumentStatus::Failed.badge().0, "Failed");
        assert_eq!(SignatureStatus::Signed.badge().1, GREEN);
        assert_eq!(ClientStatus::Inactive.badge().0, "Inactive");
    }
}
