//! # Notched Block Profiles
//!
//! Builds the decorative block shape: a rounded rectangle with one edge
//! replaced by a concave semicircular notch, extruded to the block depth
//! with a small bevel.
//!
//! ## Construction
//!
//! The outline is generated for a top notch and rotated by quarter turns
//! for the other sides. It is held as two chains (lower and upper) sampled
//! at the same `x` stations, so each column between two stations is a
//! convex trapezoid and the caps triangulate without ear clipping.
//!
//! ```text
//!   upper  ╭──╮    ╭──╮
//!          │   ╰──╯   │
//!          │          │
//!   lower  ╰──────────╯
//! ```
//!
//! Rings are stacked back to front: inset back, full, full, inset front.
//! The mesh is closed, wound counter-clockwise from outside, and centred
//! on its bounding box.

use std::f64::consts::{FRAC_PI_2, PI};

use bytemuck::{Pod, Zeroable};
use verdigris_shared::{Vec2, Vec3};

/// Notch radius limit as a fraction of half the shorter face side.
pub const NOTCH_RADIUS_LIMIT: f64 = 0.8;

/// Corner radius limit as a fraction of the shorter face side.
pub const CORNER_RADIUS_LIMIT: f64 = 0.05;

/// Edge of the face that carries the notch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NotchSide {
    /// `+y` edge.
    Top,
    /// `-y` edge.
    Bottom,
    /// `-x` edge.
    Left,
    /// `+x` edge.
    Right,
}

impl NotchSide {
    /// All four sides, in selection order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// Side for a draw in `[0, 4)`; wraps larger values.
    #[must_use]
    pub const fn from_index(index: u64) -> Self {
        Self::ALL[(index % 4) as usize]
    }

    /// Quarter turns taking a top notch to this side.
    const fn quarter_turns(self) -> u8 {
        match self {
            Self::Top => 0,
            Self::Left => 1,
            Self::Bottom => 2,
            Self::Right => 3,
        }
    }

    /// True when the notched edge runs along `y`.
    const fn is_vertical(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Largest notch radius a `width` x `height` face accepts.
#[must_use]
pub fn clamp_notch_radius(width: f64, height: f64, radius: f64) -> f64 {
    let limit = NOTCH_RADIUS_LIMIT * 0.5 * width.min(height);
    if radius.is_finite() {
        radius.clamp(0.0, limit.max(0.0))
    } else {
        0.0
    }
}

/// One mesh vertex, laid out for direct upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position in block-local space.
    pub position: [f32; 3],
    /// Unit outward normal.
    pub normal: [f32; 3],
}

/// Indexed triangle mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertices.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list, counter-clockwise from outside.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// True if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterates triangles as position triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [t[0], t[1], t[2]].map(|i| Vec3::from_array(self.vertices[i as usize].position))
        })
    }

    /// Axis-aligned bounds, or `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.vertices.iter().map(|v| Vec3::from_array(v.position));
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    /// Translates the mesh so its bounding box is centred on the origin.
    pub fn recenter(&mut self) {
        let Some((lo, hi)) = self.bounds() else {
            return;
        };
        let centre = (lo + hi) * 0.5;
        for vertex in &mut self.vertices {
            vertex.position = (Vec3::from_array(vertex.position) - centre).to_array();
        }
    }

    /// Signed enclosed volume; positive for a closed, outward-wound mesh.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| {
                let [a, b, c] = [a, b, c].map(|p| [f64::from(p.x), f64::from(p.y), f64::from(p.z)]);
                let cross = [
                    b[1] * c[2] - b[2] * c[1],
                    b[2] * c[0] - b[0] * c[2],
                    b[0] * c[1] - b[1] * c[0],
                ];
                (a[0] * cross[0] + a[1] * cross[1] + a[2] * cross[2]) / 6.0
            })
            .sum()
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(MeshVertex {
            position: position.to_array(),
            normal: normal.to_array(),
        });
        index
    }

    /// Appends a flat quad `a b c d` (counter-clockwise from outside).
    fn push_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3) {
        let normal = (b - a).cross(c - a).normalize_or_zero();
        let base = self.push_vertex(a, normal);
        self.push_vertex(b, normal);
        self.push_vertex(c, normal);
        self.push_vertex(d, normal);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// A face outline with resolved (clamped) dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NotchProfile {
    /// Face width along `x`.
    pub width: f64,
    /// Face height along `y`.
    pub height: f64,
    /// Corner rounding radius.
    pub corner_radius: f64,
    /// Notched side and radius, if any.
    pub notch: Option<(NotchSide, f64)>,
    corner_segments: u32,
    notch_segments: u32,
}

/// Lower and upper outline chains sampled at shared `x` stations.
struct Chains {
    lower: Vec<[f64; 2]>,
    upper: Vec<[f64; 2]>,
}

impl NotchProfile {
    /// Width and height in the top-notch frame.
    fn frame(&self) -> (f64, f64) {
        match self.notch {
            Some((side, _)) if side.is_vertical() => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }

    /// Chains of the outline offset inward by `inset`.
    #[allow(clippy::cast_precision_loss)]
    fn chains(&self, inset: f64) -> Chains {
        let (w, h) = self.frame();
        let cr = self.corner_radius;
        let rho = (cr - inset).max(0.0);
        let corner_steps = if cr > 0.0 { self.corner_segments.max(1) } else { 0 };
        let mut lower = Vec::new();
        let mut upper = Vec::new();

        let corner_angle = |k: u32| {
            if corner_steps == 0 {
                0.0
            } else {
                FRAC_PI_2 * f64::from(k) / f64::from(corner_steps)
            }
        };

        for k in 0..=corner_steps {
            let t = corner_angle(k);
            let x = cr - rho * t.cos();
            let dy = rho * t.sin();
            lower.push([x, cr - dy]);
            upper.push([x, h - cr + dy]);
        }

        if let Some((_, radius)) = self.notch {
            let big = radius + inset;
            let start = (inset / big).asin();
            let steps = self.notch_segments.max(2);
            for k in 0..=steps {
                let phi = PI - start - (PI - 2.0 * start) * f64::from(k) / f64::from(steps);
                let x = w * 0.5 + big * phi.cos();
                lower.push([x, inset]);
                upper.push([x, h - big * phi.sin()]);
            }
        }

        for k in (0..=corner_steps).rev() {
            let t = corner_angle(k);
            let x = w - cr + rho * t.cos();
            let dy = rho * t.sin();
            lower.push([x, cr - dy]);
            upper.push([x, h - cr + dy]);
        }

        Chains { lower, upper }
    }

    /// Closed counter-clockwise outline, centred on the origin and rotated
    /// so the notch sits on its side.
    #[must_use]
    pub fn outline(&self, inset: f64) -> Vec<Vec2> {
        let chains = self.chains(inset);
        self.place(chains.lower.iter().chain(chains.upper.iter().rev()))
    }

    /// Shoelace area of the outline.
    #[must_use]
    pub fn area(&self) -> f64 {
        let outline = self.outline(0.0);
        let n = outline.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = outline[i];
                let b = outline[(i + 1) % n];
                f64::from(a.x) * f64::from(b.y) - f64::from(b.x) * f64::from(a.y)
            })
            .sum();
        twice * 0.5
    }

    #[allow(clippy::cast_possible_truncation)]
    fn place<'p>(&self, points: impl Iterator<Item = &'p [f64; 2]>) -> Vec<Vec2> {
        let (w, h) = self.frame();
        let turns = self.notch.map_or(0, |(side, _)| side.quarter_turns());
        points
            .map(|p| Vec2::new((p[0] - w * 0.5) as f32, (p[1] - h * 0.5) as f32).rotate_quarter(turns))
            .collect()
    }

    /// Extrudes the outline to `depth` with a `bevel` on both faces.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn extrude(&self, depth: f64, bevel: f64) -> Mesh {
        let half = depth * 0.5;
        let full = self.outline(0.0);
        let rings: Vec<(Vec<Vec2>, f64)> = if bevel > 0.0 {
            let inset = self.outline(bevel);
            vec![
                (inset.clone(), -half),
                (full.clone(), -half + bevel),
                (full, half - bevel),
                (inset, half),
            ]
        } else {
            vec![(full.clone(), -half), (full, half)]
        };

        let mut mesh = Mesh::default();
        let stations = self.chains(0.0).lower.len();

        if let (Some((back, z_back)), Some((front, z_front))) = (rings.first(), rings.last()) {
            push_cap(&mut mesh, front, *z_front as f32, stations, true);
            push_cap(&mut mesh, back, *z_back as f32, stations, false);
        }

        for pair in rings.windows(2) {
            let (lower_ring, z0) = &pair[0];
            let (upper_ring, z1) = &pair[1];
            let n = lower_ring.len();
            for (k, (low, high)) in lower_ring.iter().zip(upper_ring).enumerate() {
                let next = (k + 1) % n;
                mesh.push_quad(
                    low.extend(*z0 as f32),
                    lower_ring[next].extend(*z0 as f32),
                    upper_ring[next].extend(*z1 as f32),
                    high.extend(*z1 as f32),
                );
            }
        }

        mesh.recenter();
        mesh
    }
}

/// Triangulates a cap column by column.
///
/// `ring` holds the lower chain left to right, then the upper chain right
/// to left; both have `stations` points.
fn push_cap(mesh: &mut Mesh, ring: &[Vec2], z: f32, stations: usize, front: bool) {
    let normal = if front { Vec3::Z } else { -Vec3::Z };
    let base = mesh.vertices.len() as u32;
    for point in ring {
        mesh.push_vertex(point.extend(z), normal);
    }
    let last = ring.len() as u32 - 1;
    for k in 0..stations.saturating_sub(1) as u32 {
        let (l0, l1) = (base + k, base + k + 1);
        let (u0, u1) = (base + last - k, base + last - k - 1);
        if front {
            mesh.indices.extend_from_slice(&[l0, l1, u1, l0, u1, u0]);
        } else {
            mesh.indices.extend_from_slice(&[l0, u1, l1, l0, u0, u1]);
        }
    }
}

/// Builds notched block meshes.
///
/// # Example
///
/// ```rust
/// use verdigris_procedural::{NotchProfileBuilder, NotchSide};
///
/// let mesh = NotchProfileBuilder::new().build(2.0, 1.0, 1.0, NotchSide::Top, 0.3);
/// assert!(mesh.signed_volume() > 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NotchProfileBuilder {
    corner_radius: f64,
    bevel: f64,
    corner_segments: u32,
    notch_segments: u32,
}

impl NotchProfileBuilder {
    /// Builder with default rounding (0.06), bevel (0.02), 4 segments per
    /// corner and 16 along the notch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            corner_radius: 0.06,
            bevel: 0.02,
            corner_segments: 4,
            notch_segments: 16,
        }
    }

    /// Sets the requested corner radius.
    #[must_use]
    pub const fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    /// Sets the requested bevel.
    #[must_use]
    pub const fn with_bevel(mut self, bevel: f64) -> Self {
        self.bevel = bevel;
        self
    }

    /// Sets arc tessellation.
    #[must_use]
    pub const fn with_segments(mut self, corner: u32, notch: u32) -> Self {
        self.corner_segments = corner;
        self.notch_segments = notch;
        self
    }

    /// Resolves the outline of a `width` x `height` face.
    ///
    /// The corner radius is clamped to 5% of the shorter side and the notch
    /// radius to 80% of half of it. A zero radius yields a plain rounded
    /// rectangle.
    #[must_use]
    pub fn profile(&self, width: f64, height: f64, side: NotchSide, radius: f64) -> NotchProfile {
        let short = width.min(height).max(0.0);
        let corner_radius = finite_or_zero(self.corner_radius).clamp(0.0, CORNER_RADIUS_LIMIT * short);
        let radius = clamp_notch_radius(width, height, radius);
        NotchProfile {
            width,
            height,
            corner_radius,
            notch: (radius > 0.0).then_some((side, radius)),
            corner_segments: self.corner_segments,
            notch_segments: self.notch_segments,
        }
    }

    /// Builds the extruded mesh of a notched block, centred on the origin.
    ///
    /// Non-positive or non-finite dimensions produce an empty mesh.
    #[must_use]
    pub fn build(&self, width: f64, height: f64, depth: f64, side: NotchSide, radius: f64) -> Mesh {
        if ![width, height, depth].iter().all(|d| d.is_finite() && *d > 0.0) {
            return Mesh::default();
        }
        let profile = self.profile(width, height, side, radius);
        let bevel = finite_or_zero(self.bevel)
            .clamp(0.0, profile.corner_radius * 0.5)
            .min(depth * 0.25);
        profile.extrude(depth, bevel)
    }
}

impl Default for NotchProfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
