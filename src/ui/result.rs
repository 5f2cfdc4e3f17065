use crate::session::store::ChatStore;
use crate::session::QueryResult;
use crate::theme::Theme;
use crate::ui::{Page, UiAction};
use eframe::egui::{self, Align, Layout, RichText, ScrollArea};

pub fn show(ui: &mut egui::Ui, store: &ChatStore, theme: &Theme, actions: &mut Vec<UiAction>) {
    let Some(result) = store.current_result() else {
        if store.is_loading() {
            ui.centered_and_justified(|ui| {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("Searching the galaxy...").color(theme.text_muted));
                });
            });
        } else {
            actions.push(UiAction::Navigate(Page::Home));
        }
        return;
    };

    ScrollArea::vertical().id_salt("result_page").show(ui, |ui| {
        ui.set_max_width(760.0);
        ui.with_layout(Layout::top_down(Align::Max), |ui| {
            theme.bubble_frame().show(ui, |ui| {
                ui.label(RichText::new(&result.query).size(17.0).color(theme.text_on_accent));
            });
        });
        ui.add_space(theme.spacing_16);
        render_answer(ui, result, theme, actions);

        if store.is_loading() {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Waiting for the next answer...").color(theme.text_muted));
            });
        }
    });
}

fn render_answer(
    ui: &mut egui::Ui,
    result: &QueryResult,
    theme: &Theme,
    actions: &mut Vec<UiAction>,
) {
    theme.card_frame().show(ui, |ui| {
        ui.label(RichText::new("🤖 Answer").color(theme.accent_primary).strong());
        ui.label(RichText::new(&result.answer).size(16.0));
        ui.separator();

        ui.horizontal_wrapped(|ui| {
            for source in &result.sources {
                let caption = match source.page {
                    Some(page) => format!("📄 {} (p.{page})", source.name),
                    None => format!("📄 {}", source.name),
                };
                match &source.url {
                    Some(url) => {
                        if ui.link(caption).on_hover_text(url.as_str()).clicked() {
                            actions.push(UiAction::OpenUrl(url.clone()));
                        }
                    }
                    None => {
                        ui.label(RichText::new(caption).color(theme.text_muted).small());
                    }
                }
            }
        });

        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            let visualize = egui::Button::new(
                RichText::new("🌌 View in galaxy (3D)").color(theme.text_on_accent).strong(),
            )
            .fill(theme.accent_primary);
            if ui.add(visualize).clicked() {
                actions.push(UiAction::Navigate(Page::Visualized));
            }
        });

        if !result.results.is_empty() {
            egui::CollapsingHeader::new(format!("Matched passages ({})", result.results.len()))
                .default_open(false)
                .show(ui, |ui| {
                    for item in &result.results {
                        let origin = match (&item.filename, item.page) {
                            (Some(name), Some(page)) => format!("{name} p.{page}"),
                            (Some(name), None) => name.clone(),
                            _ => item.id.to_string(),
                        };
                        ui.label(
                            RichText::new(format!("{origin} · score {:.3}", item.score))
                                .color(theme.text_muted)
                                .small(),
                        );
                        ui.label(&item.text);
                        ui.add_space(theme.spacing_4);
                    }
                });
        }
    });
}
