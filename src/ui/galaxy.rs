use crate::scene::camera::{ControlInput, OrbitControls};
use crate::scene::starfield::Starfield;
use crate::scene::{shade, GalaxyScene, LEGEND, ORIGIN_MARKER_RADIUS, QUERY_COLOR};
use crate::session::store::GalaxyState;
use crate::theme::Theme;
use crate::ui::UiAction;
use eframe::egui::{self, Color32, CursorIcon, Order, PointerButton, RichText, Sense, Stroke};
use glam::Vec3;

const STAR_SEED: u64 = 0x5EED_F0B1;

/// Orbiting scatter view of the knowledge galaxy with hover labels and links.
pub struct GalaxyView {
    controls: OrbitControls,
    scene: GalaxyScene,
    stars: Starfield,
    revision: Option<u64>,
}

impl GalaxyView {
    pub fn new(star_count: usize, auto_rotate: bool) -> Self {
        Self {
            controls: OrbitControls::new(auto_rotate),
            scene: GalaxyScene::default(),
            stars: Starfield::generate(star_count, 100.0, 50.0, STAR_SEED),
            revision: None,
        }
    }

    /// Rebuilds the retained scene only when the store holds a newer point set.
    pub fn sync(&mut self, galaxy: &GalaxyState) {
        if self.revision == Some(galaxy.revision) {
            return;
        }
        let elapsed = self.scene.elapsed();
        self.scene = GalaxyScene::from_points(&galaxy.points);
        self.scene.update(elapsed);
        self.revision = Some(galaxy.revision);
    }

    pub fn scene(&self) -> &GalaxyScene {
        &self.scene
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        galaxy: &GalaxyState,
        theme: &Theme,
        actions: &mut Vec<UiAction>,
    ) {
        self.sync(galaxy);

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let dt = ui.input(|i| i.stable_dt).min(0.1);

        let scroll = if response.hovered() {
            ui.input(|i| i.smooth_scroll_delta.y)
        } else {
            0.0
        };
        let input = ControlInput {
            orbit_drag: if response.dragged_by(PointerButton::Primary) {
                response.drag_delta()
            } else {
                egui::Vec2::ZERO
            },
            pan_drag: if response.dragged_by(PointerButton::Secondary) {
                response.drag_delta()
            } else {
                egui::Vec2::ZERO
            },
            scroll,
            dragging: response.dragged(),
        };
        self.controls.update(input, rect, dt);
        self.scene.update(dt);

        let camera = self.controls.camera;
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, theme.galaxy_background);
        self.stars.paint(&painter, &camera, rect);

        let screen = self.scene.project(&camera, rect);
        let hovered = response
            .hover_pos()
            .filter(|_| !response.dragged())
            .and_then(|pos| self.scene.pick(&screen, pos));
        self.scene.set_hovered(hovered);

        if let Some(origin) = camera.project(Vec3::ZERO, rect) {
            painter.circle_stroke(
                origin.pos,
                ORIGIN_MARKER_RADIUS * origin.pixels_per_unit,
                Stroke::new(1.0, Color32::from_white_alpha(76)),
            );
        }

        for (from, to) in self.scene.query_lines() {
            let (Some(a), Some(b)) = (camera.project(from, rect), camera.project(to, rect)) else {
                continue;
            };
            let dash = (0.5 * b.pixels_per_unit).clamp(3.0, 14.0);
            painter.extend(egui::Shape::dashed_line(
                &[a.pos, b.pos],
                Stroke::new(1.5, QUERY_COLOR.gamma_multiply(0.6)),
                dash,
                dash,
            ));
        }

        for node in &screen {
            let color = self.scene.nodes()[node.index].color;
            let (fill, halo) = shade(color, self.scene.node_emissive(node.index));
            painter.circle_filled(node.center, node.radius * 1.8, halo);
            painter.circle_filled(node.center, node.radius, fill);
            painter.circle_filled(
                node.center + egui::vec2(-node.radius * 0.35, -node.radius * 0.35),
                node.radius * 0.3,
                Color32::from_white_alpha(90),
            );
        }

        if let Some(node) = self.scene.hovered() {
            let has_link = node.point.url.is_some();
            ui.ctx().set_cursor_icon(if has_link {
                CursorIcon::PointingHand
            } else {
                CursorIcon::Default
            });
            if let Some(pos) = response.hover_pos() {
                egui::Area::new(egui::Id::new("galaxy_tooltip"))
                    .order(Order::Tooltip)
                    .fixed_pos(pos + egui::vec2(16.0, 16.0))
                    .show(ui.ctx(), |ui| {
                        theme.overlay_frame().show(ui, |ui| {
                            ui.label(RichText::new(&node.point.label).strong().size(16.0));
                            if let (false, Some(page)) = (node.point.is_query, node.point.page) {
                                ui.label(RichText::new(format!("Page: {page}")).color(theme.text_muted));
                            }
                            if has_link {
                                ui.label(RichText::new("(Click to open)").small().color(theme.text_muted));
                            }
                        });
                    });
            }
            if response.clicked() {
                if let Some(url) = &node.point.url {
                    actions.push(UiAction::OpenUrl(url.clone()));
                }
            }
        }

        self.render_overlay(ui, rect, theme, actions);
        ui.ctx().request_repaint();
    }

    fn render_overlay(
        &self,
        ui: &mut egui::Ui,
        rect: egui::Rect,
        theme: &Theme,
        actions: &mut Vec<UiAction>,
    ) {
        egui::Area::new(egui::Id::new("galaxy_back"))
            .order(Order::Foreground)
            .fixed_pos(rect.left_top() + egui::vec2(24.0, 24.0))
            .show(ui.ctx(), |ui| {
                if ui.button("← Back").clicked() {
                    actions.push(UiAction::Back);
                }
            });

        egui::Area::new(egui::Id::new("galaxy_legend"))
            .order(Order::Foreground)
            .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-24.0, 24.0))
            .show(ui.ctx(), |ui| {
                theme.overlay_frame().show(ui, |ui| {
                    ui.label(
                        RichText::new("Knowledge Galaxy View")
                            .strong()
                            .color(theme.accent_primary),
                    );
                    for (color, caption) in LEGEND {
                        ui.horizontal(|ui| {
                            let (dot, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), Sense::hover());
                            ui.painter().circle_filled(dot.center(), 6.0, color);
                            ui.label(RichText::new(caption).small());
                        });
                    }
                    if self.scene.is_empty() {
                        ui.label(RichText::new("No stars launched yet").small().color(theme.text_muted));
                    }
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::GalaxyView;
    use crate::scene::GalaxyPoint;
    use crate::session::store::GalaxyState;

    fn state(revision: u64, labels: &[&str]) -> GalaxyState {
        GalaxyState {
            session_id: None,
            query: None,
            points: labels
                .iter()
                .map(|label| GalaxyPoint {
                    id: serde_json::json!(label),
                    position: [0.0, 0.0, 0.0],
                    color: "#06B6D4".to_string(),
                    label: label.to_string(),
                    is_query: false,
                    url: None,
                    page: None,
                })
                .collect(),
            revision,
        }
    }

    #[test]
    fn sync_rebuilds_only_on_new_revision() {
        let mut view = GalaxyView::new(10, true);
        view.sync(&state(1, &["a.pdf", "b.pdf"]));
        assert_eq!(view.scene().nodes().len(), 2);

        // Same revision, different contents: the retained scene is kept.
        view.sync(&state(1, &["c.pdf"]));
        assert_eq!(view.scene().nodes().len(), 2);

        view.sync(&state(2, &["c.pdf"]));
        assert_eq!(view.scene().nodes().len(), 1);
        assert_eq!(view.scene().nodes()[0].point.label, "c.pdf");
    }
}
