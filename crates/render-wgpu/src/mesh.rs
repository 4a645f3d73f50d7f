//! Unit meshes for each [`MeshKind`], centered on the origin.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use meadow_render::{GridSpec, MeshKind, rgb};

const SPHERE_RINGS: u16 = 16;
const SPHERE_SEGMENTS: u16 = 24;
const FRUSTUM_SEGMENTS: u16 = 16;
/// Lift grid lines off the ground plane so they win the depth test.
const GRID_HEIGHT: f32 = 0.01;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct GridVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

fn v(x: f32, y: f32, z: f32) -> Vertex {
    Vertex {
        position: [x, y, z],
    }
}

/// Vertices and triangle-list indices for `kind`.
pub(crate) fn build(kind: MeshKind) -> (Vec<Vertex>, Vec<u16>) {
    match kind {
        MeshKind::Cuboid => cuboid(),
        MeshKind::Sphere => sphere(SPHERE_RINGS, SPHERE_SEGMENTS),
        MeshKind::Frustum { top_permille } => {
            frustum(top_permille as f32 / 1000.0, FRUSTUM_SEGMENTS)
        }
        MeshKind::Plane => plane(),
    }
}

fn cuboid() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        v(-p, -p,  p), v( p, -p,  p), v( p,  p,  p), v(-p,  p,  p),
        // -Z face
        v( p, -p, -p), v(-p, -p, -p), v(-p,  p, -p), v( p,  p, -p),
        // +X face
        v( p, -p,  p), v( p, -p, -p), v( p,  p, -p), v( p,  p,  p),
        // -X face
        v(-p, -p, -p), v(-p, -p,  p), v(-p,  p,  p), v(-p,  p, -p),
        // +Y face
        v(-p,  p,  p), v( p,  p,  p), v( p,  p, -p), v(-p,  p, -p),
        // -Y face
        v(-p, -p, -p), v( p, -p, -p), v( p, -p,  p), v(-p, -p,  p),
    ];
    let indices = (0..6u16)
        .flat_map(|face| {
            let b = face * 4;
            [b, b + 1, b + 2, b + 2, b + 3, b]
        })
        .collect();
    (vertices, indices)
}

fn sphere(rings: u16, segments: u16) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for i in 0..=rings {
        let theta = i as f32 * PI / rings as f32;
        for j in 0..=segments {
            let phi = j as f32 * TAU / segments as f32;
            vertices.push(v(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ));
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for i in 0..rings {
        for j in 0..segments {
            let a = i * stride + j;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }
    (vertices, indices)
}

/// Height 1, bottom radius 1, top radius `top`. A zero top radius gives a
/// cone and skips the top cap.
fn frustum(top: f32, segments: u16) -> (Vec<Vertex>, Vec<u16>) {
    let ring = |radius: f32, y: f32| -> Vec<Vertex> {
        (0..=segments)
            .map(|j| {
                let phi = j as f32 * TAU / segments as f32;
                v(radius * phi.sin(), y, radius * phi.cos())
            })
            .collect()
    };

    let mut vertices = ring(1.0, -0.5);
    vertices.extend(ring(top, 0.5));
    let stride = segments + 1;
    let mut indices = Vec::new();
    for j in 0..segments {
        let a = j;
        let b = j + stride;
        indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
    }

    let mut cap = |radius: f32, y: f32| {
        let center = vertices.len() as u16;
        vertices.push(v(0.0, y, 0.0));
        vertices.extend(ring(radius, y));
        for j in 0..segments {
            indices.extend_from_slice(&[center, center + 1 + j, center + 2 + j]);
        }
    };
    cap(1.0, -0.5);
    if top > 0.0 {
        cap(top, 0.5);
    }
    (vertices, indices)
}

fn plane() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    let vertices = vec![v(-p, 0.0, p), v(p, 0.0, p), v(p, 0.0, -p), v(-p, 0.0, -p)];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

/// Line-list vertices for the ground grid. The two center lines are darker.
pub(crate) fn grid_lines(grid: GridSpec) -> Vec<GridVertex> {
    let line_color = rgb(0x888888);
    let center_color = rgb(0x444444);
    let half = grid.size / 2.0;
    let step = grid.size / grid.divisions.max(1) as f32;
    let mut verts = Vec::with_capacity((grid.divisions as usize + 1) * 4);

    for i in 0..=grid.divisions {
        let offset = -half + i as f32 * step;
        let color = if offset.abs() < step * 0.5 {
            center_color
        } else {
            line_color
        };
        // Lines along X
        verts.push(GridVertex {
            position: [-half, GRID_HEIGHT, offset],
            color,
        });
        verts.push(GridVertex {
            position: [half, GRID_HEIGHT, offset],
            color,
        });
        // Lines along Z
        verts.push(GridVertex {
            position: [offset, GRID_HEIGHT, -half],
            color,
        });
        verts.push(GridVertex {
            position: [offset, GRID_HEIGHT, half],
            color,
        });
    }
    verts
}
