// geometry.rs - Focus Rectangle and Border Strip Geometry
//
// Converts a focus region into the four strips that frame it on screen.
// Everything here is plain integer math so it can be tested anywhere.

/// Screen rectangle in edge form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Zero-area rectangles are valid, they just draw nothing
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Clip to the desktop the way the highlight expects it.
    ///
    /// The top-left corner is clamped to the screen origin, right/bottom to the
    /// desktop's far edges. Right and bottom never end up left of / above the
    /// clipped left and top, so the result is always well-formed. Clipping an
    /// already clipped rectangle returns it unchanged.
    pub fn clip_to_desktop(&self, desktop: &Rect) -> Rect {
        let left = self.left.max(0);
        let top = self.top.max(0);
        let right = self.right.min(desktop.right).max(0).max(left);
        let bottom = self.bottom.min(desktop.bottom).max(0).max(top);
        Rect { left, top, right, bottom }
    }
}

/// Region as reported by the host: origin plus size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FocusRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Far edges saturate at `i32::MAX` for oversized host reports
impl From<FocusRegion> for Rect {
    fn from(region: FocusRegion) -> Self {
        Rect {
            left: region.x,
            top: region.y,
            right: region.x.saturating_add(region.width),
            bottom: region.y.saturating_add(region.height),
        }
    }
}

/// Which side of the frame a strip draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Surface order: index i of the overlay set draws `Edge::ALL[i]`
    pub const ALL: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];
}

/// The four rectangles forming a frame around a target
///
/// Top and bottom span exactly the target's width; left and right run the
/// full height including the corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorderStrips {
    pub top: Rect,
    pub bottom: Rect,
    pub left: Rect,
    pub right: Rect,
}

impl BorderStrips {
    /// Build the frame of width `thickness` around `target`.
    ///
    /// Outer edges are clamped at the screen origin, so a target touching the
    /// top or left edge gets a zero-sized strip on that side.
    pub fn around(target: &Rect, thickness: i32) -> Self {
        let t = thickness.max(0);
        let outer_top = target.top.saturating_sub(t).max(0);
        let outer_left = target.left.saturating_sub(t).max(0);
        let outer_bottom = target.bottom.saturating_add(t);
        let outer_right = target.right.saturating_add(t);

        Self {
            top: Rect::new(target.left, outer_top, target.right, target.top),
            bottom: Rect::new(target.left, target.bottom, target.right, outer_bottom),
            left: Rect::new(outer_left, outer_top, target.left, outer_bottom),
            right: Rect::new(target.right, outer_top, outer_right, outer_bottom),
        }
    }

    pub fn get(&self, edge: Edge) -> Rect {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    /// Strips in surface order (top, bottom, left, right)
    pub fn to_array(&self) -> [Rect; 4] {
        Edge::ALL.map(|edge| self.get(edge))
    }
}
