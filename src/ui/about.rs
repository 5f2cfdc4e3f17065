use crate::scene::LEGEND;
use crate::theme::Theme;
use eframe::egui::{self, RichText, Sense};

pub fn show(ui: &mut egui::Ui, theme: &Theme, api_base: &str) {
    ui.set_max_width(720.0);
    ui.heading("About FoundByMe");
    ui.label(
        RichText::new(
            "FoundByMe turns your lecture materials into a galaxy of knowledge. \
             Launch PDFs, slides and notes, ask questions in plain language, and \
             follow the citations back to the page they came from.",
        )
        .color(theme.text_muted),
    );
    ui.add_space(theme.spacing_16);

    theme.card_frame().show(ui, |ui| {
        ui.label(RichText::new("How it works").strong());
        for (step, text) in [
            ("1", "Launch: files are uploaded to your session and indexed."),
            ("2", "Ask: your question is embedded and matched against the index."),
            ("3", "Answer: the best passages are summarized with citations."),
            ("4", "Explore: every passage becomes a star in the 3D galaxy."),
        ] {
            ui.horizontal(|ui| {
                ui.label(RichText::new(step).color(theme.accent_primary).strong());
                ui.label(text);
            });
        }
    });

    ui.add_space(theme.spacing_8);
    theme.card_frame().show(ui, |ui| {
        ui.label(RichText::new("Galaxy legend").strong());
        for (color, caption) in LEGEND {
            ui.horizontal(|ui| {
                let (dot, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                ui.painter().circle_filled(dot.center(), 6.0, color);
                ui.label(caption);
            });
        }
    });

    ui.add_space(theme.spacing_8);
    ui.label(
        RichText::new(format!(
            "Version {} · API {api_base}",
            env!("CARGO_PKG_VERSION")
        ))
        .small()
        .color(theme.text_muted),
    );
}
