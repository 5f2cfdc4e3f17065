use crate::session::store::ChatStore;
use crate::theme::Theme;
use crate::ui::{parse_path_list, Page, UiAction};
use eframe::egui::{self, Align, Layout, RichText};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct HomePage {
    query: String,
    path_input: String,
    queued_drops: Vec<PathBuf>,
}

impl HomePage {
    /// Holds dropped files while a launch is in flight and releases them all
    /// at once when the store is idle again.
    fn take_ready_drops(&mut self, dropped: Vec<PathBuf>, loading: bool) -> Option<Vec<PathBuf>> {
        self.queued_drops.extend(dropped);
        if loading || self.queued_drops.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.queued_drops))
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        store: &ChatStore,
        theme: &Theme,
        actions: &mut Vec<UiAction>,
    ) {
        let dropped: Vec<PathBuf> = ui.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        let loading = store.is_loading();
        if let Some(files) = self.take_ready_drops(dropped, loading) {
            actions.push(UiAction::LaunchFiles(files));
        }

        ui.with_layout(Layout::top_down(Align::Center), |ui| {
            ui.add_space((ui.available_height() * 0.18).max(theme.spacing_24));
            ui.label(
                RichText::new("Explore your universe of knowledge")
                    .size(34.0)
                    .strong()
                    .color(theme.accent_primary),
            );
            ui.label(
                RichText::new("Launch your materials like stars, then ask questions to find answers.")
                    .size(16.0)
                    .color(theme.text_muted),
            );
            ui.add_space(theme.spacing_24);

            ui.set_max_width(640.0);
            theme.card_frame().show(ui, |ui| {
                ui.label(RichText::new("Launch knowledge").strong());
                ui.label(
                    RichText::new("Drop PDF, PPTX, DOCX or text files onto the window, or list paths below.")
                        .color(theme.text_muted)
                        .small(),
                );
                ui.add(
                    egui::TextEdit::multiline(&mut self.path_input)
                        .desired_rows(2)
                        .desired_width(f32::INFINITY)
                        .hint_text("/path/to/lecture.pdf, /path/to/slides.pptx"),
                );
                let label = if loading {
                    "Preparing launch..."
                } else {
                    "🚀 Launch"
                };
                let files = parse_path_list(&self.path_input);
                let launch = egui::Button::new(RichText::new(label).color(theme.text_on_accent))
                    .fill(theme.accent_cyan)
                    .min_size(egui::vec2(200.0, theme.button_height));
                if ui.add_enabled(!loading && !files.is_empty(), launch).clicked() {
                    actions.push(UiAction::LaunchFiles(files));
                    self.path_input.clear();
                }
                if !self.queued_drops.is_empty() {
                    ui.label(
                        RichText::new(format!(
                            "{} dropped file(s) queued until the current launch finishes",
                            self.queued_drops.len()
                        ))
                        .color(theme.accent_cyan)
                        .small(),
                    );
                }
            });

            ui.add_space(theme.spacing_16);
            theme.composer_frame().show(ui, |ui| {
                let mut submit = false;
                ui.horizontal(|ui| {
                    let response = ui.add_enabled(
                        !loading,
                        egui::TextEdit::singleline(&mut self.query)
                            .desired_width(ui.available_width() - 60.0)
                            .hint_text("What would you like to explore?"),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submit = true;
                    }
                    let send = egui::Button::new(RichText::new("✨").size(18.0))
                        .fill(theme.accent_primary);
                    submit |= ui
                        .add_enabled(!loading && !self.query.trim().is_empty(), send)
                        .clicked();
                });

                if submit && !loading && !self.query.trim().is_empty() {
                    actions.push(UiAction::Ask(self.query.trim().to_string()));
                    actions.push(UiAction::Navigate(Page::Result));
                    self.query.clear();
                }
            });

            if let Some(session) = store.current_session() {
                ui.add_space(theme.spacing_8);
                ui.label(
                    RichText::new(format!("Active session: {}", session.title))
                        .color(theme.text_muted)
                        .small(),
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::HomePage;
    use std::path::PathBuf;

    #[test]
    fn drops_during_a_launch_are_queued_not_lost() {
        let mut home = HomePage::default();

        assert_eq!(home.take_ready_drops(vec![PathBuf::from("a.pdf")], true), None);
        assert_eq!(home.take_ready_drops(vec![PathBuf::from("b.md")], true), None);
        assert_eq!(home.take_ready_drops(Vec::new(), true), None);

        let released = home.take_ready_drops(Vec::new(), false);
        assert_eq!(
            released,
            Some(vec![PathBuf::from("a.pdf"), PathBuf::from("b.md")])
        );
        assert_eq!(home.take_ready_drops(Vec::new(), false), None);
    }

    #[test]
    fn idle_drop_launches_immediately() {
        let mut home = HomePage::default();
        let released = home.take_ready_drops(vec![PathBuf::from("a.pdf")], false);
        assert_eq!(released, Some(vec![PathBuf::from("a.pdf")]));
    }
}
