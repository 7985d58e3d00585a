use glam::*;

/// The options for importing splats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportOptions {
    /// The minimum scale of each component.
    ///
    /// Smaller scales are raised to this value, [`None`] keeps them as is.
    pub min_scale: Option<f32>,

    /// Whether to drop splats with non-finite positions instead of zeroing them.
    pub skip_non_finite_positions: bool,
}

impl ImportOptions {
    /// The default minimum scale.
    pub const DEFAULT_MIN_SCALE: f32 = 1e-4;
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            min_scale: Some(Self::DEFAULT_MIN_SCALE),
            skip_non_finite_positions: true,
        }
    }
}

/// The colors used to highlight the selection in the merged buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightStyle {
    /// The RGB replacing the color of selected splats.
    pub selected_rgb: U8Vec3,

    /// The RGB added to the color of splats of the selected object, saturating.
    pub object_tint: U8Vec3,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            selected_rgb: U8Vec3::new(255, 255, 0),
            object_tint: U8Vec3::new(30, 60, 80),
        }
    }
}

/// The configuration of an [`EditorSession`](crate::EditorSession).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// The import options.
    pub import: ImportOptions,

    /// The highlight style.
    pub highlight: HighlightStyle,

    /// Whether hidden objects are left out of the merged buffer.
    ///
    /// When `false`, the visibility flag is only informational.
    pub visible_only: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            import: ImportOptions::default(),
            highlight: HighlightStyle::default(),
            visible_only: true,
        }
    }
}
