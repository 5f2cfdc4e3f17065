use crate::scene::camera::DragOrbit;
use crate::scene::frame_loop::{FrameLoop, DEFAULT_FRAME_INTERVAL};
use crate::scene::starfield::Starfield;
use crate::scene::{shade, GalaxyScene};
use crate::session::store::GalaxyState;
use crate::theme::Theme;
use eframe::egui::{self, Color32, PointerButton, Sense};
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::debug;

const STAR_SEED: u64 = 0x7C0F_FEE5;
const GROUP_SPIN: f32 = 0.05;

/// Stand-alone renderer that drives its own frame loop instead of relying on
/// input-driven repaints. Everything it acquires in [`ThreeScene::mount`] is
/// released when the value is dropped.
pub struct ThreeScene {
    frame_loop: FrameLoop,
    orbit: DragOrbit,
    stars: Starfield,
    scene: GalaxyScene,
    revision: Option<u64>,
    started: Instant,
    last_frame: Instant,
}

impl ThreeScene {
    pub fn mount(runtime: &Handle, ctx: &egui::Context, star_count: usize) -> Self {
        let repaint = ctx.clone();
        let frame_loop = FrameLoop::start(runtime, DEFAULT_FRAME_INTERVAL, move || {
            repaint.request_repaint();
        });
        debug!(star_count, "three scene mounted");
        let now = Instant::now();
        Self {
            frame_loop,
            orbit: DragOrbit::default(),
            stars: Starfield::generate(star_count, 100.0, 50.0, STAR_SEED),
            scene: GalaxyScene::default(),
            revision: None,
            started: now,
            last_frame: now,
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, galaxy: &GalaxyState, theme: &Theme) {
        if self.revision != Some(galaxy.revision) {
            self.scene = GalaxyScene::from_points(&galaxy.points);
            self.revision = Some(galaxy.revision);
        }

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.scene.update(dt);

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::drag());
        if response.drag_started_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.orbit.pointer_down(pos);
            }
        }
        if response.dragged_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.orbit.pointer_move(pos);
            }
        }
        if response.drag_stopped() {
            self.orbit.pointer_up();
        }

        let mut camera = self.orbit.camera;
        // The point group turns slowly on its own; the camera follows the opposite way.
        camera.orbit(-GROUP_SPIN * now.duration_since(self.started).as_secs_f32(), 0.0);

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::BLACK);
        self.stars.paint(&painter, &camera, rect);

        for node in self.scene.project(&camera, rect) {
            let color = self.scene.nodes()[node.index].color;
            let (fill, halo) = shade(color, self.scene.node_emissive(node.index));
            let radius = node.radius.max(2.0);
            painter.circle_filled(node.center, radius * 1.6, halo);
            painter.circle_filled(node.center, radius, fill);
        }

        painter.text(
            rect.left_bottom() + egui::vec2(16.0, -16.0),
            egui::Align2::LEFT_BOTTOM,
            format!(
                "{} stars · {} points · drag to orbit",
                self.stars.len(),
                self.scene.nodes().len()
            ),
            egui::FontId::proportional(12.0),
            theme.text_muted,
        );
        if self.scene.is_empty() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No stars launched yet",
                egui::FontId::proportional(16.0),
                theme.text_muted,
            );
        }
    }
}

impl Drop for ThreeScene {
    fn drop(&mut self) {
        debug!(ticks = self.frame_loop.ticks(), "three scene unmounted");
    }
}
