use serde::{Deserialize, Serialize};

/// Value Object - pixel position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Value Object - pixel size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Space reserved around the drawable area for axis labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insets {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Insets {
    fn default() -> Self {
        Self { left: 0.0, right: 56.0, top: 0.0, bottom: 24.0 }
    }
}

/// Value Object - chart size and the drawable area inside its insets
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartLayout {
    pub size: Size,
    pub insets: Insets,
}

impl ChartLayout {
    pub fn new(width: f64, height: f64, insets: Insets) -> Self {
        Self { size: Size::new(width, height), insets }
    }

    fn span(total: f64, a: f64, b: f64) -> f64 {
        let span = total - a - b;
        if span.is_finite() { span.max(0.0) } else { 0.0 }
    }

    pub fn drawable_width(&self) -> f64 {
        Self::span(self.size.width, self.insets.left, self.insets.right)
    }

    pub fn drawable_height(&self) -> f64 {
        Self::span(self.size.height, self.insets.top, self.insets.bottom)
    }

    pub fn drawable_size(&self) -> Size {
        Size::new(self.drawable_width(), self.drawable_height())
    }

    /// Convert a chart-space position into drawable-local coordinates, or
    /// `None` when it falls outside the drawable area (axis margins included).
    pub fn to_drawable(&self, point: Point) -> Option<Point> {
        let local = Point::new(point.x - self.insets.left, point.y - self.insets.top);
        let inside = local.x >= 0.0
            && local.y >= 0.0
            && local.x <= self.drawable_width()
            && local.y <= self.drawable_height();
        inside.then_some(local)
    }
}
