use crate::session::store::ChatStore;
use crate::session::SessionId;
use crate::theme::Theme;
use crate::ui::{Page, UiAction};
use eframe::egui::{self, RichText, ScrollArea};

/// Inline rename and delete-confirmation state for the session list.
#[derive(Debug, Default)]
pub struct SidebarState {
    renaming: Option<(SessionId, String)>,
    confirm_delete_all: bool,
}

impl SidebarState {
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        store: &ChatStore,
        theme: &Theme,
        page: Page,
        actions: &mut Vec<UiAction>,
    ) {
        egui::SidePanel::left("session_panel")
            .resizable(true)
            .default_width(260.0)
            .frame(theme.panel_frame(theme.surface_0, theme.spacing_16 as i8))
            .show(ctx, |ui| {
                if ui
                    .add(egui::Label::new(
                        RichText::new("🚀 FoundByMe")
                            .size(20.0)
                            .strong()
                            .color(theme.accent_primary),
                    ).sense(egui::Sense::click()))
                    .clicked()
                {
                    actions.push(UiAction::Navigate(Page::Home));
                }
                ui.add_space(theme.spacing_8);

                let new_chat = egui::Button::new(
                    RichText::new("＋ Start new exploration").color(theme.text_primary),
                )
                .min_size(egui::vec2(ui.available_width(), theme.button_height));
                if ui.add(new_chat).clicked() {
                    actions.push(UiAction::NewChat);
                    actions.push(UiAction::Navigate(Page::Home));
                }

                ui.add_space(theme.spacing_8);
                ui.label(RichText::new("Exploration history").color(theme.text_muted).small());

                let list_height = (ui.available_height() - 240.0).max(120.0);
                ScrollArea::vertical()
                    .id_salt("session_list")
                    .max_height(list_height)
                    .show(ui, |ui| {
                        for session in store.sessions() {
                            self.render_session_row(ui, store, theme, session.id, &session.title, actions);
                        }
                    });

                ui.separator();
                self.render_documents(ui, store, theme);

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.selectable_label(page == Page::Search, "Vector search").clicked() {
                        actions.push(UiAction::Navigate(Page::Search));
                    }
                    if ui.selectable_label(page == Page::About, "About").clicked() {
                        actions.push(UiAction::Navigate(Page::About));
                    }
                });

                if self.confirm_delete_all {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("Delete every session?").color(theme.danger));
                        if ui.button("Yes").clicked() {
                            actions.push(UiAction::DeleteAllChats);
                            actions.push(UiAction::Navigate(Page::Home));
                            self.confirm_delete_all = false;
                        }
                        if ui.button("No").clicked() {
                            self.confirm_delete_all = false;
                        }
                    });
                } else if ui
                    .button(RichText::new("Delete all sessions").color(theme.danger))
                    .clicked()
                {
                    self.confirm_delete_all = true;
                }

                if store.is_loading() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Working...").color(theme.text_muted));
                    });
                }
            });
    }

    fn render_session_row(
        &mut self,
        ui: &mut egui::Ui,
        store: &ChatStore,
        theme: &Theme,
        id: SessionId,
        title: &str,
        actions: &mut Vec<UiAction>,
    ) {
        let active = store.current_session_id() == Some(id);

        if let Some((renaming_id, buffer)) = self.renaming.as_mut() {
            if *renaming_id == id {
                let response = ui.text_edit_singleline(buffer);
                let commit = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let cancel = ui.input(|i| i.key_pressed(egui::Key::Escape));
                if commit {
                    actions.push(UiAction::RenameChat(id, buffer.clone()));
                    self.renaming = None;
                } else if cancel {
                    self.renaming = None;
                } else {
                    response.request_focus();
                }
                return;
            }
        }

        ui.horizontal(|ui| {
            let text = if active {
                RichText::new(title).color(theme.text_primary).strong()
            } else {
                RichText::new(title).color(theme.text_muted)
            };
            if ui.selectable_label(active, text).clicked() {
                actions.push(UiAction::SelectChat(id));
                actions.push(UiAction::Navigate(Page::Home));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("🗑").on_hover_text("Delete session").clicked() {
                    actions.push(UiAction::DeleteChat(id));
                }
                if ui.small_button("✏").on_hover_text("Rename").clicked() {
                    self.renaming = Some((id, title.to_string()));
                }
            });
        });
    }

    fn render_documents(&self, ui: &mut egui::Ui, store: &ChatStore, theme: &Theme) {
        ui.label(RichText::new("Launched documents").color(theme.text_muted).small());
        if store.documents().is_empty() {
            ui.label(RichText::new("No documents yet").color(theme.text_muted).italics());
            return;
        }
        ScrollArea::vertical()
            .id_salt("document_list")
            .max_height(120.0)
            .show(ui, |ui| {
                for document in store.documents() {
                    ui.label(format!("📄 {}", document.filename));
                }
            });
    }
}
