//! Per-level color and mesh selection for the fractal draw calls.
//!
//! Interior levels sample two [`Gradient`]s by depth; the deepest level uses
//! a separate leaf color pair and the leaf mesh.

use serde::{Deserialize, Serialize};

/// Linear RGBA color
pub type Rgba = [f32; 4];

#[inline]
fn lerp_rgba(a: &Rgba, b: &Rgba, t: f32) -> Rgba {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Keyed color gradient over `t` in [0, 1], clamped at both ends.
///
/// Deserialized keys go through [`Gradient::new`], so they are always sorted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "GradientKeys")]
pub struct Gradient {
    keys: Vec<(f32, Rgba)>,
}

/// Serialized form of a gradient, before sorting
#[derive(Deserialize)]
struct GradientKeys {
    keys: Vec<(f32, Rgba)>,
}

impl From<GradientKeys> for Gradient {
    fn from(raw: GradientKeys) -> Self {
        Self::new(raw.keys)
    }
}

impl Gradient {
    /// Create a gradient from unsorted keys. Keys are sorted by position.
    pub fn new(mut keys: Vec<(f32, Rgba)>) -> Self {
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { keys }
    }

    /// Two-key gradient from `start` at 0 to `end` at 1
    pub fn linear(start: Rgba, end: Rgba) -> Self {
        Self::new(vec![(0.0, start), (1.0, end)])
    }

    /// Gradient that always returns `color`
    pub fn constant(color: Rgba) -> Self {
        Self { keys: vec![(0.0, color)] }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// True if every key position and color channel is finite
    pub fn is_finite(&self) -> bool {
        self.keys
            .iter()
            .all(|(pos, color)| pos.is_finite() && color.iter().all(|c| c.is_finite()))
    }

    /// Sample at `t`, clamped to the first and last key
    pub fn sample(&self, t: f32) -> Rgba {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return [1.0; 4];
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        // First key strictly past t; t > first.0 so upper >= 1
        let upper = self.keys.partition_point(|(pos, _)| *pos <= t);
        let (t0, c0) = &self.keys[upper - 1];
        let (t1, c1) = &self.keys[upper];
        let span = t1 - t0;
        if span <= f32::EPSILON {
            return *c1;
        }
        lerp_rgba(c0, c1, (t - t0) / span)
    }
}

/// Which mesh a level is drawn with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeshKind {
    #[default]
    Branch,
    Leaf,
}

/// Resolved appearance of one level
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelStyle {
    pub mesh: MeshKind,
    pub color_a: Rgba,
    pub color_b: Rgba,
}

/// Colors for the whole fractal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// First interior color, sampled by depth
    pub gradient_a: Gradient,
    /// Second interior color, sampled by depth
    pub gradient_b: Gradient,
    /// First leaf color
    pub leaf_color_a: Rgba,
    /// Second leaf color
    pub leaf_color_b: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            // Bark: dark brown trunk fading to a lighter tan near the tips
            gradient_a: Gradient::linear([0.28, 0.18, 0.10, 1.0], [0.55, 0.42, 0.28, 1.0]),
            gradient_b: Gradient::linear([0.20, 0.12, 0.07, 1.0], [0.45, 0.36, 0.22, 1.0]),
            leaf_color_a: [0.30, 0.60, 0.18, 1.0],
            leaf_color_b: [0.55, 0.75, 0.20, 1.0],
        }
    }
}

impl Palette {
    /// Style for `level` of a tree with `depth` levels.
    ///
    /// The deepest level is the leaf level. Interior levels map to
    /// `t = level / (depth - 2)`, so the trunk samples 0 and the last
    /// interior level samples 1.
    pub fn level_style(&self, level: usize, depth: usize) -> LevelStyle {
        if level + 1 >= depth {
            return LevelStyle {
                mesh: MeshKind::Leaf,
                color_a: self.leaf_color_a,
                color_b: self.leaf_color_b,
            };
        }

        let t = if depth > 2 {
            level as f32 / (depth - 2) as f32
        } else {
            0.0
        };
        LevelStyle {
            mesh: MeshKind::Branch,
            color_a: self.gradient_a.sample(t),
            color_b: self.gradient_b.sample(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];
    const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_gradient_clamps_ends() {
        let g = Gradient::linear(BLACK, WHITE);
        assert_eq!(g.sample(-1.0), BLACK);
        assert_eq!(g.sample(2.0), WHITE);
    }

    #[test]
    fn test_gradient_interpolates() {
        let g = Gradient::linear(BLACK, WHITE);
        let mid = g.sample(0.5);
        assert!((mid[0] - 0.5).abs() < 1e-6);
        assert_eq!(mid[3], 1.0);
    }

    #[test]
    fn test_gradient_multiple_keys_unsorted() {
        let red = [1.0, 0.0, 0.0, 1.0];
        let g = Gradient::new(vec![(1.0, WHITE), (0.0, BLACK), (0.5, red)]);
        assert_eq!(g.sample(0.5), red);
        let q = g.sample(0.75);
        assert!((q[0] - 1.0).abs() < 1e-6);
        assert!((q[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_constant_and_empty_gradient() {
        assert_eq!(Gradient::constant(WHITE).sample(0.3), WHITE);
        let empty = Gradient::new(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.sample(0.3), [1.0; 4]);
    }

    #[test]
    fn test_deserialized_keys_are_sorted() {
        let json = r#"{ "keys": [[1.0, [1.0, 1.0, 1.0, 1.0]], [0.0, [0.0, 0.0, 0.0, 1.0]]] }"#;
        let g: Gradient = serde_json::from_str(json).unwrap();
        assert_eq!(g, Gradient::linear(BLACK, WHITE));
        let mid = g.sample(0.5);
        assert!((mid[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_keys_detected() {
        assert!(Gradient::linear(BLACK, WHITE).is_finite());
        assert!(!Gradient::new(vec![(f32::NAN, BLACK)]).is_finite());
        assert!(!Gradient::new(vec![(0.0, [f32::INFINITY, 0.0, 0.0, 1.0])]).is_finite());
    }

    #[test]
    fn test_level_style_leaf_is_deepest() {
        let palette = Palette::default();
        let style = palette.level_style(5, 6);
        assert_eq!(style.mesh, MeshKind::Leaf);
        assert_eq!(style.color_a, palette.leaf_color_a);

        let trunk = palette.level_style(0, 6);
        assert_eq!(trunk.mesh, MeshKind::Branch);
        assert_eq!(trunk.color_a, palette.gradient_a.sample(0.0));

        let last_interior = palette.level_style(4, 6);
        assert_eq!(last_interior.color_b, palette.gradient_b.sample(1.0));
    }

    #[test]
    fn test_level_style_shallow_trees() {
        let palette = Palette::default();
        assert_eq!(palette.level_style(0, 1).mesh, MeshKind::Leaf);
        let root = palette.level_style(0, 2);
        assert_eq!(root.mesh, MeshKind::Branch);
        assert_eq!(root.color_a, palette.gradient_a.sample(0.0));
    }
}
