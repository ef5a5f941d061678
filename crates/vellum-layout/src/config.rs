//! Auto layout configuration attached to container nodes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use vellum_core::{ConfigError, Extent, Geometry, NodeId};

/// Maximum number of breakpoints a container may carry.
pub const MAX_BREAKPOINTS: usize = 5;

/// Main axis of an auto layout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Horizontal layout (left to right)
    #[default]
    Horizontal,
    /// Vertical layout (top to bottom)
    Vertical,
}

impl Direction {
    /// Component of an extent along the main axis.
    pub fn main(&self, extent: Extent) -> f64 {
        match self {
            Direction::Horizontal => extent.width,
            Direction::Vertical => extent.height,
        }
    }

    /// Component of an extent along the cross axis.
    pub fn cross(&self, extent: Extent) -> f64 {
        match self {
            Direction::Horizontal => extent.height,
            Direction::Vertical => extent.width,
        }
    }

    /// Turn (main, cross) coordinates back into (x, y).
    pub fn compose(&self, main: f64, cross: f64) -> (f64, f64) {
        match self {
            Direction::Horizontal => (main, cross),
            Direction::Vertical => (cross, main),
        }
    }
}

/// Placement of each child on the cross axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    #[default]
    Start,
    Center,
    End,
}

/// Placement of the whole child run on the main axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Distribution {
    /// Pack items at the start
    #[default]
    Start,
    /// Center items
    Center,
    /// Pack items at the end
    End,
    /// Spread the leftover space between items
    SpaceBetween,
}

/// Sizing behaviour of an auto layout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resizing {
    /// The container wraps its children, which keep their own size
    #[default]
    Hug,
    /// Children stretch across the container's cross axis
    Fill,
}

/// Padding on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    /// Create uniform padding.
    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Total horizontal padding.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Total vertical padding.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Padding before the first child on the main axis.
    pub fn main_lead(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Horizontal => self.left,
            Direction::Vertical => self.top,
        }
    }

    /// Padding after the last child on the main axis.
    pub fn main_trail(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Horizontal => self.right,
            Direction::Vertical => self.bottom,
        }
    }

    /// Leading padding on the cross axis.
    pub fn cross_lead(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Horizontal => self.top,
            Direction::Vertical => self.left,
        }
    }

    /// Trailing padding on the cross axis.
    pub fn cross_trail(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Horizontal => self.bottom,
            Direction::Vertical => self.right,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (side, value) in [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite("padding"));
            }
            if value < 0.0 {
                return Err(ConfigError::NegativePadding { side, value });
            }
        }
        Ok(())
    }
}

/// A width threshold at or below which children re-flow into columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    #[serde(alias = "width")]
    pub width_threshold: f64,
    pub columns: u32,
    pub gap: f64,
}

impl Breakpoint {
    pub fn new(width_threshold: f64, columns: u32, gap: f64) -> Self {
        Self {
            width_threshold,
            columns,
            gap,
        }
    }

    /// Check the breakpoint's own values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.width_threshold.is_finite() {
            return Err(ConfigError::NotFinite("widthThreshold"));
        }
        if self.width_threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.width_threshold));
        }
        if self.columns == 0 {
            return Err(ConfigError::ZeroColumns);
        }
        if !self.gap.is_finite() {
            return Err(ConfigError::NotFinite("gap"));
        }
        if self.gap < 0.0 {
            return Err(ConfigError::NegativeGap(self.gap));
        }
        Ok(())
    }
}

/// Advisory size bounds for a container.
///
/// The layout algorithms never read these; the canvas consults
/// [`SizeConstraints::clamp`] while the user drags a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SizeConstraints {
    pub min_width: Option<f64>,
    pub max_width: Option<f64>,
    pub min_height: Option<f64>,
    pub max_height: Option<f64>,
}

impl SizeConstraints {
    /// Clamp an extent into the configured bounds.
    pub fn clamp(&self, extent: Extent) -> Extent {
        Extent::new(
            clamp_axis(extent.width, self.min_width, self.max_width),
            clamp_axis(extent.height, self.min_height, self.max_height),
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("minWidth", self.min_width),
            ("maxWidth", self.max_width),
            ("minHeight", self.min_height),
            ("maxHeight", self.max_height),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(ConfigError::NotFinite(name));
                }
                if v < 0.0 {
                    return Err(ConfigError::InvalidConstraint {
                        name,
                        reason: format!("must be non-negative, got {v}"),
                    });
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_width, self.max_width) {
            if min > max {
                return Err(ConfigError::InvalidConstraint {
                    name: "minWidth",
                    reason: format!("{min} exceeds maxWidth {max}"),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_height, self.max_height) {
            if min > max {
                return Err(ConfigError::InvalidConstraint {
                    name: "minHeight",
                    reason: format!("{min} exceeds maxHeight {max}"),
                });
            }
        }
        Ok(())
    }
}

fn clamp_axis(value: f64, min: Option<f64>, max: Option<f64>) -> f64 {
    let value = min.map_or(value, |m| value.max(m));
    max.map_or(value, |m| value.min(m))
}

/// Geometry of one child at the time a baseline was captured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChildSnapshot {
    pub id: NodeId,
    pub geometry: Geometry,
}

/// Un-scaled layout of a responsive container, recorded when responsive
/// mode is switched on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub original_size: Extent,
    pub children: Vec<ChildSnapshot>,
}

/// Auto layout configuration of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Main axis
    pub direction: Direction,
    /// Padding inside the container
    pub padding: Padding,
    /// Gap between consecutive children
    pub gap: f64,
    /// Alignment on the cross axis
    pub alignment: Alignment,
    /// Distribution on the main axis
    pub distribution: Distribution,
    /// Hug or fill
    pub resizing: Resizing,
    /// Evaluate breakpoints on resize
    pub responsive: bool,
    /// Breakpoints in insertion order
    pub breakpoints: SmallVec<[Breakpoint; MAX_BREAKPOINTS]>,
    /// Advisory size bounds
    #[serde(flatten)]
    pub constraints: SizeConstraints,
    #[serde(skip)]
    baseline: Option<Baseline>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Horizontal,
            padding: Padding::uniform(16.0),
            gap: 8.0,
            alignment: Alignment::Start,
            distribution: Distribution::Start,
            resizing: Resizing::Hug,
            responsive: false,
            breakpoints: SmallVec::new(),
            constraints: SizeConstraints::default(),
            baseline: None,
        }
    }
}

impl LayoutConfig {
    /// Create a horizontal layout.
    pub fn horizontal() -> Self {
        Self {
            direction: Direction::Horizontal,
            ..Default::default()
        }
    }

    /// Create a vertical layout.
    pub fn vertical() -> Self {
        Self {
            direction: Direction::Vertical,
            ..Default::default()
        }
    }

    /// Set the main axis.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the gap between items.
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Set per-side padding.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Set uniform padding.
    pub fn with_uniform_padding(mut self, padding: f64) -> Self {
        self.padding = Padding::uniform(padding);
        self
    }

    /// Set the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the distribution.
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Set the resizing mode.
    pub fn with_resizing(mut self, resizing: Resizing) -> Self {
        self.resizing = resizing;
        self
    }

    /// Enable or disable responsive mode.
    pub fn with_responsive(mut self, responsive: bool) -> Self {
        self.responsive = responsive;
        self
    }

    /// Append a breakpoint without checking it; see [`Self::validate`].
    pub fn with_breakpoint(mut self, breakpoint: Breakpoint) -> Self {
        self.breakpoints.push(breakpoint);
        self
    }

    /// Set the size constraints.
    pub fn with_constraints(mut self, constraints: SizeConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Append a breakpoint, enforcing the breakpoint limit.
    pub fn add_breakpoint(&mut self, breakpoint: Breakpoint) -> Result<usize, ConfigError> {
        if self.breakpoints.len() >= MAX_BREAKPOINTS {
            return Err(ConfigError::TooManyBreakpoints {
                max: MAX_BREAKPOINTS,
            });
        }
        breakpoint.validate()?;
        self.breakpoints.push(breakpoint);
        Ok(self.breakpoints.len() - 1)
    }

    /// Remove the breakpoint at `index`.
    pub fn remove_breakpoint(&mut self, index: usize) -> Result<Breakpoint, ConfigError> {
        if index >= self.breakpoints.len() {
            return Err(ConfigError::NoSuchBreakpoint(index));
        }
        Ok(self.breakpoints.remove(index))
    }

    /// Replace the breakpoint at `index`, keeping its position.
    pub fn update_breakpoint(&mut self, index: usize, breakpoint: Breakpoint) -> Result<(), ConfigError> {
        breakpoint.validate()?;
        let slot = self
            .breakpoints
            .get_mut(index)
            .ok_or(ConfigError::NoSuchBreakpoint(index))?;
        *slot = breakpoint;
        Ok(())
    }

    /// Check every field against the recognised ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_with_limit(MAX_BREAKPOINTS)
    }

    /// Like [`Self::validate`] with a custom breakpoint limit.
    pub fn validate_with_limit(&self, max_breakpoints: usize) -> Result<(), ConfigError> {
        self.padding.validate()?;
        if !self.gap.is_finite() {
            return Err(ConfigError::NotFinite("gap"));
        }
        if self.gap < 0.0 {
            return Err(ConfigError::NegativeGap(self.gap));
        }
        if self.breakpoints.len() > max_breakpoints {
            return Err(ConfigError::TooManyBreakpoints {
                max: max_breakpoints,
            });
        }
        for breakpoint in &self.breakpoints {
            breakpoint.validate()?;
        }
        self.constraints.validate()
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration for the inspector panel.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    /// Size a hugging container needs to wrap the given children.
    pub fn hug_extent(&self, children: &[Extent]) -> Extent {
        let direction = self.direction;
        let n = children.len();
        let total_gap = if n > 1 { self.gap * (n - 1) as f64 } else { 0.0 };

        let main: f64 = children.iter().map(|c| direction.main(*c)).sum::<f64>() + total_gap;
        let cross = children
            .iter()
            .map(|c| direction.cross(*c))
            .fold(0.0_f64, |a, b| a.max(b));

        let (width, height) = direction.compose(
            main + self.padding.main_lead(direction) + self.padding.main_trail(direction),
            cross + self.padding.cross_lead(direction) + self.padding.cross_trail(direction),
        );
        Extent::new(width, height)
    }

    /// The captured responsive baseline, if any.
    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    /// Record the baseline used for responsive recomputation.
    pub fn capture_baseline(
        &mut self,
        original_size: Extent,
        children: impl IntoIterator<Item = ChildSnapshot>,
    ) {
        self.baseline = Some(Baseline {
            original_size,
            children: children.into_iter().collect(),
        });
    }

    /// Drop the baseline; it must be captured again before use.
    pub fn invalidate_baseline(&mut self) {
        self.baseline = None;
    }
}
