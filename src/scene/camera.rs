use eframe::egui::{pos2, Pos2, Rect, Vec2};
use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, TAU};

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 2000.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 200.0;

/// Camera orbiting `target` on a sphere of radius `distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov_y: f32,
}

impl Default for OrbitCamera {
    /// Eye at `(0, 0, 20)` looking at the origin with a 60° field of view.
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            distance: 20.0,
            fov_y: 60f32.to_radians(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub pos: Pos2,
    pub depth: f32,
    pub pixels_per_unit: f32,
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + Vec3::new(sin_yaw * cos_pitch, sin_pitch, cos_yaw * cos_pitch) * self.distance
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self, viewport: Rect) -> Mat4 {
        let aspect = viewport.width() / viewport.height();
        Mat4::perspective_rh(self.fov_y, aspect, NEAR_PLANE, FAR_PLANE)
    }

    fn focal_length(&self, viewport: Rect) -> f32 {
        (viewport.height() * 0.5) / (self.fov_y * 0.5).tan()
    }

    /// Perspective projection into `viewport`; `None` behind the near plane.
    pub fn project(&self, point: Vec3, viewport: Rect) -> Option<Projected> {
        if viewport.width() <= 0.0 || viewport.height() <= 0.0 {
            return None;
        }
        let view_space = self.view().transform_point3(point);
        let depth = -view_space.z;
        if depth <= NEAR_PLANE {
            return None;
        }
        let ndc = self.projection(viewport).project_point3(view_space);
        let center = viewport.center();
        Some(Projected {
            pos: pos2(
                center.x + ndc.x * viewport.width() * 0.5,
                center.y - ndc.y * viewport.height() * 0.5,
            ),
            depth,
            pixels_per_unit: self.focal_length(viewport) / depth,
        })
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(TAU);
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn zoom(&mut self, factor: f32) {
        if factor > 0.0 {
            self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    /// Moves the target in the view plane by a screen-space drag.
    pub fn pan(&mut self, drag: Vec2, viewport: Rect) {
        let camera_to_world = self.view().inverse();
        let right = camera_to_world.x_axis.truncate();
        let up = camera_to_world.y_axis.truncate();
        let world_per_pixel = self.distance / self.focal_length(viewport);
        self.target += up * (drag.y * world_per_pixel) - right * (drag.x * world_per_pixel);
    }
}

/// Orbit/pan/zoom controls with idle auto-rotation.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub camera: OrbitCamera,
    pub auto_rotate: bool,
    /// Same unit as three.js OrbitControls: 1.0 is one revolution per minute.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    interacting: bool,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            camera: OrbitCamera::default(),
            auto_rotate: true,
            auto_rotate_speed: 0.5,
            rotate_speed: 0.008,
            interacting: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControlInput {
    pub orbit_drag: Vec2,
    pub pan_drag: Vec2,
    pub scroll: f32,
    pub dragging: bool,
}

impl OrbitControls {
    pub fn new(auto_rotate: bool) -> Self {
        Self {
            auto_rotate,
            ..Self::default()
        }
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    pub fn update(&mut self, input: ControlInput, viewport: Rect, dt: f32) {
        self.interacting = input.dragging;

        if input.orbit_drag != Vec2::ZERO {
            self.camera.orbit(
                -input.orbit_drag.x * self.rotate_speed,
                input.orbit_drag.y * self.rotate_speed,
            );
        }
        if input.pan_drag != Vec2::ZERO {
            self.camera.pan(input.pan_drag, viewport);
        }
        if input.scroll != 0.0 {
            self.camera.zoom(0.999f32.powf(input.scroll));
        }

        if self.auto_rotate && !self.interacting {
            self.camera.orbit(TAU / 60.0 * self.auto_rotate_speed * dt, 0.0);
        }
    }
}

/// Bare drag-to-orbit controller: no pan, zoom or auto-rotation.
#[derive(Debug, Clone)]
pub struct DragOrbit {
    pub camera: OrbitCamera,
    last_pointer: Option<Pos2>,
    sensitivity: f32,
}

impl Default for DragOrbit {
    fn default() -> Self {
        Self {
            camera: OrbitCamera {
                distance: 30.0,
                ..OrbitCamera::default()
            },
            last_pointer: None,
            sensitivity: 0.005,
        }
    }
}

impl DragOrbit {
    pub fn pointer_down(&mut self, pos: Pos2) {
        self.last_pointer = Some(pos);
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        if let Some(last) = self.last_pointer {
            let delta = pos - last;
            self.camera
                .orbit(-delta.x * self.sensitivity, delta.y * self.sensitivity);
            self.last_pointer = Some(pos);
        }
    }

    pub fn pointer_up(&mut self) {
        self.last_pointer = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.last_pointer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlInput, DragOrbit, OrbitCamera, OrbitControls, PITCH_LIMIT};
    use eframe::egui::{pos2, vec2, Rect};
    use glam::Vec3;

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))
    }

    #[test]
    fn default_camera_sits_on_positive_z() {
        let eye = OrbitCamera::default().eye();
        assert!(eye.x.abs() < 1e-5);
        assert!(eye.y.abs() < 1e-5);
        assert!((eye.z - 20.0).abs() < 1e-5);
    }

    #[test]
    fn origin_projects_to_viewport_center() {
        let projected = OrbitCamera::default()
            .project(Vec3::ZERO, viewport())
            .expect("origin is in front of the camera");
        assert!((projected.pos.x - 400.0).abs() < 1e-3);
        assert!((projected.pos.y - 300.0).abs() < 1e-3);
        assert!((projected.depth - 20.0).abs() < 1e-4);
    }

    #[test]
    fn points_above_and_right_land_up_and_right() {
        let camera = OrbitCamera::default();
        let projected = camera
            .project(Vec3::new(1.0, 1.0, 0.0), viewport())
            .expect("point is visible");
        assert!(projected.pos.x > 400.0);
        assert!(projected.pos.y < 300.0);
    }

    #[test]
    fn points_behind_camera_are_culled() {
        let camera = OrbitCamera::default();
        assert!(camera.project(Vec3::new(0.0, 0.0, 25.0), viewport()).is_none());
    }

    #[test]
    fn pan_drag_moves_target_opposite_to_pointer() {
        let mut camera = OrbitCamera::default();
        camera.pan(vec2(100.0, 0.0), viewport());
        assert!(camera.target.x < 0.0);
        assert!(camera.target.y.abs() < 1e-5);
        assert!(camera.target.z.abs() < 1e-5);
    }

    #[test]
    fn empty_viewport_projects_nothing() {
        let camera = OrbitCamera::default();
        let empty = Rect::from_min_size(pos2(0.0, 0.0), vec2(0.0, 0.0));
        assert!(camera.project(Vec3::ZERO, empty).is_none());
    }

    #[test]
    fn pitch_is_clamped_and_zoom_bounded() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.0, 10.0);
        assert!((camera.pitch - PITCH_LIMIT).abs() < 1e-6);

        camera.zoom(1000.0);
        assert_eq!(camera.distance, 200.0);
        camera.zoom(0.0001);
        assert_eq!(camera.distance, 2.0);
    }

    #[test]
    fn auto_rotation_pauses_while_dragging() {
        let mut controls = OrbitControls::default();
        controls.update(ControlInput::default(), viewport(), 1.0);
        let after_idle = controls.camera.yaw;
        assert!(after_idle > 0.0);

        controls.update(
            ControlInput {
                dragging: true,
                ..ControlInput::default()
            },
            viewport(),
            1.0,
        );
        assert_eq!(controls.camera.yaw, after_idle);
        assert!(controls.is_interacting());
    }

    #[test]
    fn auto_rotation_completes_revolution_in_two_minutes() {
        let mut controls = OrbitControls::default();
        controls.update(ControlInput::default(), viewport(), 30.0);
        assert!((controls.camera.yaw - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn drag_orbit_only_moves_while_pressed() {
        let mut orbit = DragOrbit::default();
        let start = orbit.camera;

        orbit.pointer_move(pos2(50.0, 0.0));
        assert_eq!(orbit.camera, start);

        orbit.pointer_down(pos2(0.0, 0.0));
        orbit.pointer_move(pos2(100.0, 20.0));
        assert_ne!(orbit.camera.yaw, start.yaw);
        assert!(orbit.is_dragging());

        orbit.pointer_up();
        let released = orbit.camera;
        orbit.pointer_move(pos2(300.0, 300.0));
        assert_eq!(orbit.camera, released);
    }
}
