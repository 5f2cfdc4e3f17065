use crate::session::store::{ChatStore, SearchState};
use crate::theme::Theme;
use crate::ui::UiAction;
use eframe::egui::{self, RichText, ScrollArea};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Pending,
    Done,
}

/// Pipeline stage of the legacy search for the query the user last submitted.
pub fn stage(submitted: Option<&str>, state: &SearchState) -> Stage {
    match submitted {
        None => Stage::Idle,
        Some(query) if state.query.as_deref() == Some(query) => Stage::Done,
        Some(_) => Stage::Pending,
    }
}

pub struct SearchPage {
    query: String,
    k: u32,
    submitted: Option<String>,
}

impl SearchPage {
    pub fn new(k: u32) -> Self {
        Self {
            query: String::new(),
            k: k.max(1),
            submitted: None,
        }
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        store: &ChatStore,
        theme: &Theme,
        actions: &mut Vec<UiAction>,
    ) {
        ui.set_max_width(760.0);
        ui.heading("Vector search");
        ui.label(
            RichText::new("Query the raw index directly and inspect the top matches with their scores.")
                .color(theme.text_muted),
        );

        let mut submit = false;
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.query)
                    .desired_width(420.0)
                    .hint_text("e.g. process scheduling"),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            ui.add(egui::DragValue::new(&mut self.k).range(1..=50).prefix("k = "));
            submit |= ui
                .add_enabled(!self.query.trim().is_empty(), egui::Button::new("Search"))
                .clicked();
        });
        if submit && !self.query.trim().is_empty() {
            let query = self.query.trim().to_string();
            self.submitted = Some(query.clone());
            actions.push(UiAction::Search(query, self.k));
        }

        let state = store.search_state();
        let stage = stage(self.submitted.as_deref(), state);
        ui.add_space(theme.spacing_8);
        ui.horizontal(|ui| {
            let steps = [
                ("Input", stage != Stage::Idle),
                ("Embedding", stage != Stage::Idle),
                ("Vector DB", stage != Stage::Idle),
                ("Results", stage == Stage::Done),
            ];
            for (index, (name, active)) in steps.into_iter().enumerate() {
                if index > 0 {
                    ui.label(RichText::new("→").color(theme.text_muted));
                }
                let color = if active {
                    theme.accent_primary
                } else {
                    theme.text_muted
                };
                ui.label(RichText::new(name).color(color).strong());
            }
            if stage == Stage::Pending {
                ui.spinner();
            }
        });

        if stage != Stage::Done {
            return;
        }
        if let Some(error) = &state.error {
            ui.label(RichText::new(format!("Search failed: {error}")).color(theme.danger));
        }
        if state.results.is_empty() {
            ui.label(RichText::new("No results.").color(theme.text_muted));
            return;
        }
        ScrollArea::vertical().id_salt("search_results").show(ui, |ui| {
            for item in &state.results {
                theme.card_frame().show(ui, |ui| {
                    ui.label(
                        RichText::new(format!("#{} · score {:.4}", item.id, item.score))
                            .color(theme.accent_cyan)
                            .small(),
                    );
                    ui.label(&item.text);
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{stage, Stage};
    use crate::session::store::SearchState;

    #[test]
    fn stage_follows_submitted_query() {
        let mut state = SearchState::default();
        assert_eq!(stage(None, &state), Stage::Idle);
        assert_eq!(stage(Some("paging"), &state), Stage::Pending);

        state.query = Some("paging".to_string());
        assert_eq!(stage(Some("paging"), &state), Stage::Done);
        assert_eq!(stage(Some("tlb"), &state), Stage::Pending);
    }
}
