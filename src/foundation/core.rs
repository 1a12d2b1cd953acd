//! Geometry shared by the host boundary and the effects.

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Rectangle in the host's wire representation.
///
/// The host has no notion of infinity: an unbounded region travels as `±f64::MAX`. Convert
/// with [`Region::from_host`] / [`Region::to_host`] at the boundary and nowhere else.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HostRect {
    /// Left edge.
    pub x0: f64,
    /// Top edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Bottom edge.
    pub y1: f64,
}

impl HostRect {
    /// The host's "fullscreen" sentinel.
    pub const UNBOUNDED: Self = Self {
        x0: -f64::MAX,
        y0: -f64::MAX,
        x1: f64::MAX,
        y1: f64::MAX,
    };

    /// Build a host rect from its edges.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Wire form of a kurbo rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.x1, rect.y1)
    }

    /// Same edges as a kurbo rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x0, self.y0, self.x1, self.y1)
    }

    /// `x1 - x0`.
    pub fn width(self) -> f64 {
        self.x1 - self.x0
    }

    /// `y1 - y0`.
    pub fn height(self) -> f64 {
        self.y1 - self.y0
    }

    /// Any single bound at the host's extreme magnitude marks the whole rect as fullscreen.
    pub fn is_unbounded_sentinel(self) -> bool {
        self.x0 == -f64::MAX || self.y0 == -f64::MAX || self.x1 == f64::MAX || self.y1 == f64::MAX
    }
}

/// Region of effect of a node's output.
///
/// Left/top bounds are inclusive, right/bottom exclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Region {
    /// Zero (or negative) width or height: the node produces nothing.
    Empty,
    /// A finite, non-degenerate box.
    Bounded(Rect),
    /// The entire visible frame. Never unioned numerically.
    Unbounded,
}

impl Region {
    /// Classify a raw rectangle. Degeneracy is checked before finiteness, so an untouched empty
    /// union (`+inf..-inf`) stays empty rather than becoming unbounded.
    pub fn from_rect(rect: Rect) -> Self {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            Self::Empty
        } else if !rect_is_finite(rect) {
            Self::Unbounded
        } else {
            Self::Bounded(rect)
        }
    }

    /// Decode the wire form, mapping the sentinel to [`Region::Unbounded`].
    pub fn from_host(rect: HostRect) -> Self {
        if rect.is_unbounded_sentinel() {
            Self::Unbounded
        } else {
            Self::from_rect(rect.to_rect())
        }
    }

    /// `None` for an empty region: the host is told "no bbox" instead.
    pub fn to_host(self) -> Option<HostRect> {
        match self {
            Self::Empty => None,
            Self::Bounded(r) => Some(HostRect::from_rect(r)),
            Self::Unbounded => Some(HostRect::UNBOUNDED),
        }
    }

    /// Smallest region covering both; unbounded absorbs everything.
    pub fn union(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unbounded, _) | (_, Self::Unbounded) => Self::Unbounded,
            (Self::Empty, r) | (r, Self::Empty) => r,
            (Self::Bounded(a), Self::Bounded(b)) => Self::Bounded(a.union(b)),
        }
    }

    /// Mutable-rectangle form handed to an effect's `enlarge`.
    pub fn to_rect(self) -> Rect {
        match self {
            Self::Empty => empty_union_rect(),
            Self::Bounded(r) => r,
            Self::Unbounded => infinite_rect(),
        }
    }

    /// Finite rectangle usable for allocation, substituting `fallback` when unbounded.
    pub fn or_fallback(self, fallback: Rect) -> Option<Rect> {
        match self {
            Self::Empty => None,
            Self::Bounded(r) => Some(r),
            Self::Unbounded => Some(fallback),
        }
    }

    /// Return `true` for [`Region::Empty`].
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Return `true` for [`Region::Unbounded`].
    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl FromIterator<Region> for Region {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        iter.into_iter().fold(Self::Empty, Self::union)
    }
}

/// Rectangle that an unbounded effect writes from `enlarge`.
pub fn infinite_rect() -> Rect {
    Rect::new(
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::INFINITY,
    )
}

/// Identity element of a min/max union: `+inf, +inf, -inf, -inf`.
pub fn empty_union_rect() -> Rect {
    Rect::new(
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    )
}

pub(crate) fn rect_is_finite(r: Rect) -> bool {
    r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
