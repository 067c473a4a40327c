use serde::{Deserialize, Serialize};

use crate::core::warn::{WarnClass, Warnings};

/// Axis-aligned pixel rectangle, `left <= right` and `top <= bottom`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        (self.right - self.left).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.bottom - self.top).max(0)
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }
}

/// Raw leaf box as supplied by a source adapter; any component may be absent.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CharBox {
    pub left: Option<i32>,
    pub top: Option<i32>,
    pub right: Option<i32>,
    pub bottom: Option<i32>,
}

impl CharBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            right: Some(right),
            bottom: Some(bottom),
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.left.is_some() && self.top.is_some() && self.right.is_some() && self.bottom.is_some()
    }
}

/// Bottom-up bounding box union with the leaf clamp/repair policy.
#[derive(Debug, Clone)]
pub struct BBoxAggregator {
    scale: f64,
}

impl Default for BBoxAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl BBoxAggregator {
    pub fn new() -> Self {
        Self { scale: 1.0 }
    }

    /// Scalar transform applied to every raw coordinate before validity
    /// checks, for sources whose geometry is in a different unit than the
    /// output target.
    pub fn with_scale(scale: f64) -> Self {
        Self { scale }
    }

    /// Validate one leaf box: boxes with a missing component are excluded
    /// from geometry (the owning character still contributes text), negative
    /// components are clamped to zero. Both conditions are warned once.
    pub fn resolve_leaf(&self, raw: &CharBox, warnings: &mut Warnings) -> Option<BBox> {
        let (Some(l), Some(t), Some(r), Some(b)) = (raw.left, raw.top, raw.right, raw.bottom)
        else {
            warnings.report(WarnClass::MissingBoundingBox);
            return None;
        };

        let mut clamped = false;
        let mut fix = |v: i32| -> i32 {
            let scaled = (f64::from(v) * self.scale).round() as i32;
            if scaled < 0 {
                clamped = true;
                0
            } else {
                scaled
            }
        };
        let bbox = BBox::new(fix(l), fix(t), fix(r), fix(b));
        if clamped {
            warnings.report(WarnClass::NegativeBoundingBoxComponent);
        }
        Some(bbox)
    }

    /// Componentwise union over the valid child boxes; `None` when no child
    /// supplies one.
    pub fn aggregate<I>(&self, children: I) -> Option<BBox>
    where
        I: IntoIterator<Item = Option<BBox>>,
    {
        children
            .into_iter()
            .flatten()
            .reduce(|acc, next| acc.union(&next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn union_contains_all_inputs() {
        let boxes = [
            BBox::new(5, 5, 20, 12),
            BBox::new(0, 8, 9, 30),
            BBox::new(14, 2, 18, 10),
        ];
        let agg = BBoxAggregator::new();
        let union = agg.aggregate(boxes.iter().copied().map(Some)).unwrap();
        for b in &boxes {
            assert!(union.contains(b));
        }
        assert_eq!(union, BBox::new(0, 2, 20, 30));

        let reversed = agg.aggregate(boxes.iter().rev().copied().map(Some)).unwrap();
        assert_eq!(union, reversed);
    }

    #[test]
    fn singleton_aggregates_to_itself() {
        let agg = BBoxAggregator::new();
        let only = BBox::new(3, 4, 5, 6);
        assert_eq!(agg.aggregate([Some(only)]), Some(only));
    }

    #[test]
    fn no_valid_children_yields_none() {
        let agg = BBoxAggregator::new();
        assert_eq!(agg.aggregate([None, None]), None);
        assert_eq!(agg.aggregate(std::iter::empty()), None);
    }

    #[test]
    fn negative_component_is_clamped_and_warned_once() {
        let agg = BBoxAggregator::new();
        let mut warnings = Warnings::new();
        let raw = CharBox::new(-5, 3, 10, 20);
        let resolved = agg.resolve_leaf(&raw, &mut warnings).unwrap();
        assert_eq!(resolved, BBox::new(0, 3, 10, 20));

        // Repeats are counted, not re-reported.
        agg.resolve_leaf(&raw, &mut warnings);
        assert_eq!(warnings.count(WarnClass::NegativeBoundingBoxComponent), 2);
    }

    #[test]
    fn missing_component_excludes_geometry() {
        let agg = BBoxAggregator::new();
        let mut warnings = Warnings::new();
        let raw = CharBox {
            left: Some(1),
            top: Some(2),
            right: None,
            bottom: Some(9),
        };
        assert_eq!(agg.resolve_leaf(&raw, &mut warnings), None);
        assert_eq!(warnings.count(WarnClass::MissingBoundingBox), 1);
    }

    #[test]
    fn scale_applies_before_validity_checks() {
        let agg = BBoxAggregator::with_scale(2.0);
        let mut warnings = Warnings::new();
        let resolved = agg
            .resolve_leaf(&CharBox::new(1, 2, 3, 4), &mut warnings)
            .unwrap();
        assert_eq!(resolved, BBox::new(2, 4, 6, 8));
    }
}
