use glam::{Mat4, Quat, Vec3};
use meadow_kernel::{PlacedObject, PlantKind, SessionState};

/// Linear RGBA.
pub type Color = [f32; 4];

/// Opaque color from a `0xRRGGBB` literal.
pub fn rgb(hex: u32) -> Color {
    let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}

const GROUND_COLOR: u32 = 0x00ff00;
const AVATAR_COLOR: u32 = 0xff0000;
const EYE_COLOR: u32 = 0x000000;
const TRUNK_COLOR: u32 = 0x8b4513;
const FOLIAGE_COLOR: u32 = 0x228b22;
const BUSH_COLOR: u32 = 0x006400;
const BLOOM_COLOR: u32 = 0xff69b4;

/// Side length of the square ground plane.
pub const GROUND_SIZE: f32 = 200.0;

/// Unit meshes a renderer must provide. All are centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKind {
    /// 1×1×1 box.
    Cuboid,
    /// Sphere of radius 1.
    Sphere,
    /// Truncated cone of height 1 and bottom radius 1. The top radius is kept
    /// in thousandths of the bottom one: 1000 is a cylinder, 0 a cone.
    Frustum { top_permille: u16 },
    /// 1×1 square in the XZ plane, facing +Y.
    Plane,
}

impl MeshKind {
    pub fn name(&self) -> &'static str {
        match self {
            MeshKind::Cuboid => "cuboid",
            MeshKind::Sphere => "sphere",
            MeshKind::Frustum { top_permille: 0 } => "cone",
            MeshKind::Frustum { top_permille: 1000 } => "cylinder",
            MeshKind::Frustum { .. } => "frustum",
            MeshKind::Plane => "plane",
        }
    }
}

/// One colored shape placed in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub label: &'static str,
    pub mesh: MeshKind,
    pub color: Color,
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Primitive {
    pub fn cuboid(label: &'static str, size: Vec3, at: Vec3, color: Color) -> Self {
        Self {
            label,
            mesh: MeshKind::Cuboid,
            color,
            translation: at,
            scale: size,
        }
    }

    pub fn sphere(label: &'static str, radius: f32, at: Vec3, color: Color) -> Self {
        Self {
            label,
            mesh: MeshKind::Sphere,
            color,
            translation: at,
            scale: Vec3::splat(radius),
        }
    }

    /// `radius_bottom` must be positive.
    pub fn frustum(
        label: &'static str,
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        at: Vec3,
        color: Color,
    ) -> Self {
        let ratio = (radius_top / radius_bottom * 1000.0).round();
        Self {
            label,
            mesh: MeshKind::Frustum {
                top_permille: ratio.clamp(0.0, u16::MAX as f32) as u16,
            },
            color,
            translation: at,
            scale: Vec3::new(radius_bottom, height, radius_bottom),
        }
    }

    pub fn cone(label: &'static str, radius: f32, height: f32, at: Vec3, color: Color) -> Self {
        Self::frustum(label, 0.0, radius, height, at, color)
    }

    pub fn plane(label: &'static str, width: f32, depth: f32, at: Vec3, color: Color) -> Self {
        Self {
            label,
            mesh: MeshKind::Plane,
            color,
            translation: at,
            scale: Vec3::new(width, 1.0, depth),
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.translation)
    }
}

/// Line grid drawn over the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub size: f32,
    pub divisions: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            size: GROUND_SIZE,
            divisions: 200,
        }
    }
}

/// Avatar body, head and eyes for a body centered at `position`.
pub fn avatar_primitives(position: Vec3) -> [Primitive; 4] {
    let red = rgb(AVATAR_COLOR);
    let black = rgb(EYE_COLOR);
    let head = position + Vec3::new(0.0, 1.8, 0.0);
    [
        Primitive::cuboid("body", Vec3::new(1.0, 2.0, 1.0), position, red),
        Primitive::sphere("head", 0.5, head, red),
        Primitive::sphere("eye", 0.1, head + Vec3::new(0.2, 0.1, 0.4), black),
        Primitive::sphere("eye", 0.1, head + Vec3::new(-0.2, 0.1, 0.4), black),
    ]
}

/// Visual parts of one plant. Heights are offsets above the plant's ground point.
pub fn plant_primitives(plant: &PlacedObject) -> Vec<Primitive> {
    let base: Vec3 = plant.position.on_ground().into();
    let at = |height: f32| base + Vec3::new(0.0, height, 0.0);
    match plant.kind {
        PlantKind::Tree => vec![
            Primitive::frustum("trunk", 0.5, 0.7, 4.0, at(2.0), rgb(TRUNK_COLOR)),
            Primitive::cone("leaves", 2.0, 4.0, at(5.0), rgb(FOLIAGE_COLOR)),
        ],
        PlantKind::Bush => vec![Primitive::sphere("bush", 1.0, at(1.0), rgb(BUSH_COLOR))],
        PlantKind::Flower => vec![
            Primitive::frustum("stem", 0.1, 0.1, 1.0, at(0.5), rgb(FOLIAGE_COLOR)),
            Primitive::sphere("bloom", 0.3, at(1.3), rgb(BLOOM_COLOR)),
        ],
    }
}

/// Everything a renderer draws for one frame.
#[derive(Debug, Clone)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub grid: GridSpec,
    pub show_grid: bool,
}

impl Scene {
    /// Derive the frame's primitives from the session: ground, avatar, plants.
    pub fn compose(state: &SessionState, show_grid: bool) -> Self {
        let mut primitives = Vec::with_capacity(5 + state.plants().len() * 2);
        primitives.push(Primitive::plane(
            "ground",
            GROUND_SIZE,
            GROUND_SIZE,
            Vec3::ZERO,
            rgb(GROUND_COLOR),
        ));
        primitives.extend(avatar_primitives(state.player_position().into()));
        for plant in state.plants() {
            primitives.extend(plant_primitives(plant));
        }
        tracing::trace!(primitives = primitives.len(), show_grid, "composed scene");
        Self {
            primitives,
            grid: GridSpec::default(),
            show_grid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meadow_common::Vector3;

    #[test]
    fn rgb_decodes_hex() {
        assert_eq!(rgb(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgb(0x000000), [0.0, 0.0, 0.0, 1.0]);
        let pink = rgb(0xff69b4);
        assert!((pink[1] - 105.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn tree_has_trunk_and_leaves() {
        let tree = PlacedObject::on_ground(PlantKind::Tree, 10.0, -5.0);
        let parts = plant_primitives(&tree);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].translation, Vec3::new(10.0, 2.0, -5.0));
        assert_eq!(parts[0].mesh, MeshKind::Frustum { top_permille: 714 });
        assert_eq!(parts[1].translation, Vec3::new(10.0, 5.0, -5.0));
        assert_eq!(parts[1].mesh.name(), "cone");
        assert_eq!(parts[1].scale, Vec3::new(2.0, 4.0, 2.0));
    }

    #[test]
    fn bush_and_flower_offsets() {
        let bush = plant_primitives(&PlacedObject::on_ground(PlantKind::Bush, 0.0, 0.0));
        assert_eq!(bush.len(), 1);
        assert_eq!(bush[0].translation.y, 1.0);

        let flower = plant_primitives(&PlacedObject::on_ground(PlantKind::Flower, 1.0, 1.0));
        assert_eq!(flower.len(), 2);
        assert_eq!(flower[0].mesh.name(), "cylinder");
        assert_eq!(flower[0].translation.y, 0.5);
        assert_eq!(flower[1].translation.y, 1.3);
    }

    #[test]
    fn loaded_plant_above_ground_is_drawn_on_ground() {
        let plant = PlacedObject {
            kind: PlantKind::Bush,
            position: Vector3::new(2.0, 7.0, 3.0),
        };
        assert_eq!(plant_primitives(&plant)[0].translation, Vec3::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn avatar_follows_player_position() {
        let parts = avatar_primitives(Vec3::new(3.0, 1.0, -2.0));
        assert_eq!(parts[0].translation, Vec3::new(3.0, 1.0, -2.0));
        assert!((parts[1].translation - Vec3::new(3.0, 2.8, -2.0)).length() < 1e-5);
        assert!((parts[2].translation - Vec3::new(3.2, 2.9, -1.6)).length() < 1e-5);
        assert!((parts[3].translation - Vec3::new(2.8, 2.9, -1.6)).length() < 1e-5);
    }

    #[test]
    fn compose_counts_every_part() {
        let state = SessionState::fresh(vec![
            PlacedObject::on_ground(PlantKind::Tree, 0.0, 0.0),
            PlacedObject::on_ground(PlantKind::Bush, 1.0, 0.0),
            PlacedObject::on_ground(PlantKind::Flower, 2.0, 0.0),
        ]);
        let scene = Scene::compose(&state, false);
        // ground + 4 avatar parts + 2 + 1 + 2 plant parts
        assert_eq!(scene.primitives.len(), 10);
        assert_eq!(scene.primitives[0].label, "ground");
        assert!(!scene.show_grid);
    }

    #[test]
    fn model_matrix_scales_then_translates() {
        let p = Primitive::cuboid("body", Vec3::new(1.0, 2.0, 1.0), Vec3::new(5.0, 1.0, 0.0), rgb(0));
        let top = p.model_matrix().transform_point3(Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(top, Vec3::new(5.0, 2.0, 0.0));
    }
}
