//! # Cube Faces — Orientation Convention
//!
//! A cubemap is six square images. To integrate over the sphere we need to
//! know which direction every texel looks in, and that depends on a
//! convention shared by three parties: the code that renders the faces, the
//! GPU's cube-texture layer order, and the basis table in this crate.
//!
//! ## Texel → Direction
//!
//! Texel `(u, v)` of an `N × N` face maps to in-plane coordinates
//!
//! ```text
//! s = 2 * (u + 0.5) / N - 1        (column, left → right)
//! t = 2 * (v + 0.5) / N - 1        (row, top → bottom)
//! ```
//!
//! and the face's major axis is fixed to ±1. The remaining two axes take
//! `±s` and `±t` according to this table:
//!
//! ```text
//!  face     layer  major   s-axis  t-axis   look    up
//!  Left      1     -X      +Z      -Y       -X      +Y
//!  Right     0     +X      -Z      -Y       +X      +Y
//!  Front     4     +Z      +X      -Y       +Z      +Y
//!  Back      5     -Z      -X      -Y       -Z      +Y
//!  Top       2     +Y      +X      +Z       +Y      -Z
//!  Bottom    3     -Y      +X      -Z       -Y      +Z
//! ```
//!
//! This is the wgpu / D3D cube layer convention: the unnormalized direction
//! is always `look + s * (up × look) - t * up`, i.e. each face is a
//! left-handed view. A right-handed renderer has to mirror X in the
//! projection while capturing (scale `(-1, 1, 1)`) or the captured lighting
//! comes out mirrored left-to-right.
//!
//! ## Comparison
//!
//! - **Vulkan / D3D / wgpu**: Identical layer order and `(s, t)` mapping.
//! - **OpenGL**: Same layer order, but `t` runs bottom to top for sampling
//!   while render targets are written top-down; most GL code flips here.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// One of the six faces of a cubemap, in the order the crate stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeFace {
    Left,
    Right,
    Front,
    Back,
    Top,
    Bottom,
}

/// `(axis index, sign)` pairs for the major, s and t axes of a face.
#[derive(Clone, Copy)]
struct FaceAxes {
    major: (usize, f32),
    s: (usize, f32),
    t: (usize, f32),
}

const FACE_AXES: [FaceAxes; 6] = [
    // Left
    FaceAxes {
        major: (0, -1.0),
        s: (2, 1.0),
        t: (1, -1.0),
    },
    // Right
    FaceAxes {
        major: (0, 1.0),
        s: (2, -1.0),
        t: (1, -1.0),
    },
    // Front
    FaceAxes {
        major: (2, 1.0),
        s: (0, 1.0),
        t: (1, -1.0),
    },
    // Back
    FaceAxes {
        major: (2, -1.0),
        s: (0, -1.0),
        t: (1, -1.0),
    },
    // Top
    FaceAxes {
        major: (1, 1.0),
        s: (0, 1.0),
        t: (2, 1.0),
    },
    // Bottom
    FaceAxes {
        major: (1, -1.0),
        s: (0, 1.0),
        t: (2, -1.0),
    },
];

impl CubeFace {
    /// All faces in storage order.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Left,
        CubeFace::Right,
        CubeFace::Front,
        CubeFace::Back,
        CubeFace::Top,
        CubeFace::Bottom,
    ];

    /// Position in [`CubeFace::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Array layer of this face in a GPU cube texture (+X, -X, +Y, -Y, +Z, -Z).
    pub fn layer(self) -> usize {
        match self {
            CubeFace::Right => 0,
            CubeFace::Left => 1,
            CubeFace::Top => 2,
            CubeFace::Bottom => 3,
            CubeFace::Front => 4,
            CubeFace::Back => 5,
        }
    }

    /// Inverse of [`layer`](Self::layer).
    pub fn from_layer(layer: usize) -> Option<CubeFace> {
        CubeFace::ALL.into_iter().find(|f| f.layer() == layer)
    }

    /// Outward normal. Also the direction a capture camera looks in.
    pub fn look_dir(self) -> Vec3 {
        let (axis, sign) = FACE_AXES[self.index()].major;
        axis_vector(axis, sign)
    }

    /// Camera up vector for capturing this face.
    pub fn up(self) -> Vec3 {
        // up is the negated t-axis: rows run top to bottom.
        let (axis, sign) = FACE_AXES[self.index()].t;
        axis_vector(axis, -sign)
    }

    /// Unnormalized direction for in-plane coordinates `s, t` in `[-1, 1]`.
    pub fn direction(self, s: f32, t: f32) -> Vec3 {
        let axes = FACE_AXES[self.index()];
        let mut v = [0.0f32; 3];
        v[axes.major.0] = axes.major.1;
        v[axes.s.0] = axes.s.1 * s;
        v[axes.t.0] = axes.t.1 * t;
        Vec3::from_array(v)
    }

    /// Unnormalized direction through the center of texel `(u, v)` of an
    /// `resolution × resolution` face.
    pub fn texel_direction(self, u: u32, v: u32, resolution: u32) -> Vec3 {
        let (s, t) = texel_to_st(u, v, resolution);
        self.direction(s, t)
    }

    /// Find the face a direction points into and its `(s, t)` coordinates.
    ///
    /// Returns `None` for the zero vector.
    pub fn from_direction(dir: Vec3) -> Option<(CubeFace, Vec2)> {
        let abs = dir.abs();
        let major_axis = if abs.x >= abs.y && abs.x >= abs.z {
            0
        } else if abs.y >= abs.z {
            1
        } else {
            2
        };
        let magnitude = abs[major_axis];
        if magnitude == 0.0 {
            return None;
        }

        let sign = dir[major_axis].signum();
        let face = CubeFace::ALL
            .into_iter()
            .find(|f| {
                let (axis, face_sign) = FACE_AXES[f.index()].major;
                axis == major_axis && face_sign == sign
            })?;

        let axes = FACE_AXES[face.index()];
        let s = dir[axes.s.0] * axes.s.1 / magnitude;
        let t = dir[axes.t.0] * axes.t.1 / magnitude;
        Some((face, Vec2::new(s, t)))
    }
}

/// Map texel `(u, v)` to in-plane `(s, t)` at the texel center.
pub fn texel_to_st(u: u32, v: u32, resolution: u32) -> (f32, f32) {
    let n = resolution as f32;
    let s = 2.0 * ((u as f32 + 0.5) / n) - 1.0;
    let t = 2.0 * ((v as f32 + 0.5) / n) - 1.0;
    (s, t)
}

fn axis_vector(axis: usize, sign: f32) -> Vec3 {
    let mut v = [0.0f32; 3];
    v[axis] = sign;
    Vec3::from_array(v)
}
