//! Retained 3D scene for the knowledge galaxy: geometry, styling and picking.
//! Rendering widgets live in `ui::galaxy` and `ui::three_scene`.

use eframe::egui::{Color32, Pos2, Rect};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

pub mod camera;
pub mod frame_loop;
pub mod starfield;

use camera::OrbitCamera;

pub const NODE_RADIUS: f32 = 0.15;
pub const ORIGIN_MARKER_RADIUS: f32 = 0.2;
pub const GROUP_YAW: f32 = std::f32::consts::FRAC_PI_4;

pub const QUERY_COLOR: Color32 = Color32::from_rgb(0xFD, 0xE0, 0x47);
pub const PDF_COLOR: Color32 = Color32::from_rgb(0xF4, 0x3F, 0x5E);
pub const TEXT_COLOR: Color32 = Color32::from_rgb(0x06, 0xB6, 0xD4);
pub const SLIDE_COLOR: Color32 = Color32::from_rgb(0xF9, 0x73, 0x16);
pub const OTHER_COLOR: Color32 = Color32::from_rgb(0x8B, 0x5C, 0xF6);

pub const LEGEND: [(Color32, &str); 5] = [
    (QUERY_COLOR, "Question"),
    (PDF_COLOR, "PDF Document"),
    (TEXT_COLOR, "TXT / MD File"),
    (SLIDE_COLOR, "PPT / PPTX Slide"),
    (OTHER_COLOR, "Other Files"),
];

/// One embedding as served by `/api/galaxy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalaxyPoint {
    pub id: serde_json::Value,
    pub position: [f32; 3],
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isQuery", default)]
    pub is_query: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Parses `#RRGGBB` or `#RGB`; anything else falls back to the "other" color.
pub fn parse_hex_color(raw: &str) -> Color32 {
    let hex = raw.trim().trim_start_matches('#');
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    if !hex.is_ascii() {
        return OTHER_COLOR;
    }
    let parsed = match hex.len() {
        6 => channel(&hex[0..2])
            .zip(channel(&hex[2..4]))
            .zip(channel(&hex[4..6]))
            .map(|((r, g), b)| (r, g, b)),
        3 => {
            let mut out = [0u8; 3];
            let mut ok = true;
            for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                match ch.to_digit(16) {
                    Some(d) => *slot = (d * 17) as u8,
                    None => ok = false,
                }
            }
            ok.then_some((out[0], out[1], out[2]))
        }
        _ => None,
    };
    match parsed {
        Some((r, g, b)) => Color32::from_rgb(r, g, b),
        None => OTHER_COLOR,
    }
}

/// Maps emissive intensity onto a fill color and a glow halo.
pub fn shade(color: Color32, emissive: f32) -> (Color32, Color32) {
    let lift = (emissive / 2.0).clamp(0.0, 1.0);
    let mix = |c: u8| {
        let base = c as f32 * (0.6 + 0.4 * lift);
        (base + (255.0 - base) * 0.25 * lift).round().min(255.0) as u8
    };
    let fill = Color32::from_rgb(mix(color.r()), mix(color.g()), mix(color.b()));
    let halo_alpha = (30.0 + 60.0 * lift) as u8;
    let halo = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), halo_alpha);
    (fill, halo)
}

pub fn pulse(elapsed: f32) -> f32 {
    1.0 + (elapsed * 3.0).sin() * 0.2
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub point: GalaxyPoint,
    pub world: Vec3,
    pub color: Color32,
}

/// A node as it lands on screen for the current frame.
#[derive(Debug, Clone, Copy)]
pub struct ScreenNode {
    pub index: usize,
    pub center: Pos2,
    pub radius: f32,
    pub depth: f32,
}

/// Scene rebuilt once per point-cloud change; only [`GalaxyScene::update`]
/// mutates it between rebuilds.
#[derive(Debug, Clone, Default)]
pub struct GalaxyScene {
    nodes: Vec<SceneNode>,
    hovered: Option<usize>,
    elapsed: f32,
}

impl GalaxyScene {
    pub fn from_points(points: &[GalaxyPoint]) -> Self {
        let group = Quat::from_rotation_y(GROUP_YAW);
        let nodes = points
            .iter()
            .map(|point| SceneNode {
                world: group * Vec3::from_array(point.position),
                color: parse_hex_color(&point.color),
                point: point.clone(),
            })
            .collect();
        Self {
            nodes,
            hovered: None,
            elapsed: 0.0,
        }
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn hovered(&self) -> Option<&SceneNode> {
        self.hovered.and_then(|index| self.nodes.get(index))
    }

    pub fn set_hovered(&mut self, index: Option<usize>) {
        self.hovered = index.filter(|i| *i < self.nodes.len());
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt.max(0.0);
    }

    pub fn node_scale(&self, index: usize) -> f32 {
        let Some(node) = self.nodes.get(index) else {
            return 1.0;
        };
        let hovered = self.hovered == Some(index);
        let base = if hovered {
            1.8
        } else if node.point.is_query {
            1.5
        } else {
            1.0
        };
        if node.point.is_query {
            base * pulse(self.elapsed)
        } else {
            base
        }
    }

    pub fn node_emissive(&self, index: usize) -> f32 {
        let hovered = self.hovered == Some(index);
        let is_query = self
            .nodes
            .get(index)
            .map(|node| node.point.is_query)
            .unwrap_or(false);
        if hovered || is_query {
            2.0
        } else {
            0.5
        }
    }

    /// Segments from the center of knowledge to every query node.
    pub fn query_lines(&self) -> Vec<(Vec3, Vec3)> {
        self.nodes
            .iter()
            .filter(|node| node.point.is_query)
            .map(|node| (Vec3::ZERO, node.world))
            .collect()
    }

    /// Projected nodes sorted back to front.
    pub fn project(&self, camera: &OrbitCamera, viewport: Rect) -> Vec<ScreenNode> {
        let mut screen: Vec<ScreenNode> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let projected = camera.project(node.world, viewport)?;
                Some(ScreenNode {
                    index,
                    center: projected.pos,
                    radius: NODE_RADIUS * self.node_scale(index) * projected.pixels_per_unit,
                    depth: projected.depth,
                })
            })
            .collect();
        screen.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        screen
    }

    /// Front-most node under the pointer, with a minimum hit radius for tiny nodes.
    pub fn pick(&self, screen: &[ScreenNode], pointer: Pos2) -> Option<usize> {
        screen
            .iter()
            .filter(|node| node.center.distance(pointer) <= node.radius.max(6.0))
            .min_by(|a, b| a.depth.total_cmp(&b.depth))
            .map(|node| node.index)
    }
}

#[cfg(test)]
mod tests {
    use super::camera::OrbitCamera;
    use super::{parse_hex_color, pulse, GalaxyPoint, GalaxyScene, GROUP_YAW, OTHER_COLOR};
    use eframe::egui::{pos2, Color32, Rect};
    use glam::{Quat, Vec3};

    fn point(id: &str, position: [f32; 3], is_query: bool) -> GalaxyPoint {
        GalaxyPoint {
            id: serde_json::json!(id),
            position,
            color: if is_query { "#FDE047" } else { "#F43F5E" }.to_string(),
            label: id.to_string(),
            is_query,
            url: None,
            page: None,
        }
    }

    #[test]
    fn galaxy_point_reads_camel_case_query_flag() {
        let parsed: GalaxyPoint = serde_json::from_str(
            r##"{"id": 1, "position": [1, 2, 3], "color": "#06B6D4", "label": "a.md", "isQuery": true}"##,
        )
        .expect("point should parse");
        assert!(parsed.is_query);
        assert_eq!(parsed.position, [1.0, 2.0, 3.0]);
        assert!(parsed.url.is_none());
    }

    #[test]
    fn hex_colors_parse_with_fallback() {
        assert_eq!(parse_hex_color("#FDE047"), Color32::from_rgb(0xFD, 0xE0, 0x47));
        assert_eq!(parse_hex_color("#fff"), Color32::from_rgb(255, 255, 255));
        assert_eq!(parse_hex_color("teal"), OTHER_COLOR);
        assert_eq!(parse_hex_color("#12345Z"), OTHER_COLOR);
    }

    #[test]
    fn group_is_turned_an_eighth_about_y() {
        let scene = GalaxyScene::from_points(&[point("doc", [1.0, 0.0, 0.0], false)]);
        let world = scene.nodes()[0].world;
        let half = std::f32::consts::FRAC_1_SQRT_2;
        assert!((world.x - half).abs() < 1e-6);
        assert!((world.z + half).abs() < 1e-6);
        assert_eq!(world.y, 0.0);
    }

    #[test]
    fn only_query_nodes_pulse() {
        let mut scene = GalaxyScene::from_points(&[
            point("doc", [1.0, 0.0, 0.0], false),
            point("q", [0.0, 2.0, 0.0], true),
        ]);

        scene.update(0.1);
        let doc_a = scene.node_scale(0);
        let query_a = scene.node_scale(1);
        scene.update(0.3);
        let doc_b = scene.node_scale(0);
        let query_b = scene.node_scale(1);

        assert_eq!(doc_a, 1.0);
        assert_eq!(doc_a, doc_b);
        assert!((query_a - query_b).abs() > 1e-3);
        assert!((query_a - 1.5 * pulse(0.1)).abs() < 1e-6);
    }

    #[test]
    fn query_node_is_sole_line_origin() {
        let scene = GalaxyScene::from_points(&[
            point("d1", [1.0, 0.0, 0.0], false),
            point("q", [0.0, 2.0, 0.0], true),
            point("d2", [0.0, 0.0, 3.0], false),
        ]);

        let lines = scene.query_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Vec3::ZERO);
        assert_eq!(lines[0].1, scene.nodes()[1].world);
    }

    #[test]
    fn hover_enlarges_and_brightens() {
        let mut scene = GalaxyScene::from_points(&[point("doc", [1.0, 0.0, 0.0], false)]);
        assert_eq!(scene.node_emissive(0), 0.5);

        scene.set_hovered(Some(0));
        assert_eq!(scene.node_scale(0), 1.8);
        assert_eq!(scene.node_emissive(0), 2.0);

        scene.set_hovered(Some(5));
        assert!(scene.hovered().is_none());
    }

    #[test]
    fn pick_prefers_front_most_node() {
        let on_axis = |z: f32| {
            (Quat::from_rotation_y(-GROUP_YAW) * Vec3::new(0.0, 0.0, z)).to_array()
        };
        let scene = GalaxyScene::from_points(&[
            point("far", on_axis(-5.0), false),
            point("near", on_axis(5.0), false),
        ]);
        let camera = OrbitCamera::default();
        let viewport = Rect::from_min_size(pos2(0.0, 0.0), [800.0, 600.0].into());

        let screen = scene.project(&camera, viewport);
        assert_eq!(screen.len(), 2);
        assert!(screen[0].depth > screen[1].depth, "sorted back to front");

        let picked = scene.pick(&screen, viewport.center());
        let near_index = scene
            .nodes()
            .iter()
            .position(|n| n.point.label == "near")
            .expect("near node present");
        assert_eq!(picked, Some(near_index));
        assert_eq!(scene.pick(&screen, pos2(5.0, 5.0)), None);
    }
}
