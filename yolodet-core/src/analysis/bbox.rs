use serde::Serialize;

use crate::consts::IOU_EPSILON;

/// A 2D axis-aligned bounding box represented by minimum and maximum points.
///
/// Detections carry their geometry as a `Bbox` in original-image pixel
/// coordinates, with the origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bbox {
    /// The minimum point of the bounding box (top-left corner).
    pub min: glam::Vec2,
    /// The maximum point of the bounding box (bottom-right corner).
    pub max: glam::Vec2,
}

impl Bbox {
    /// Creates a new bounding box from minimum and maximum points.
    pub fn new(min: glam::Vec2, max: glam::Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a new bounding box from a center point and size vector.
    ///
    /// This constructor matches YOLO-style detection outputs where boxes
    /// are represented as (center_x, center_y, width, height).
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use yolodet_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_center_size(Vec2::new(100.0, 200.0), Vec2::new(50.0, 80.0));
    /// assert_eq!(bbox.min, Vec2::new(75.0, 160.0));
    /// assert_eq!(bbox.max, Vec2::new(125.0, 240.0));
    /// ```
    pub fn from_center_size(center: glam::Vec2, size: glam::Vec2) -> Self {
        let half_size = size / 2.0;
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Calculates the area of the bounding box (width × height).
    pub fn area(&self) -> f32 {
        let length = self.max - self.min;

        length.x * length.y
    }

    /// Calculates the center point of the bounding box.
    pub fn center(&self) -> glam::Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Calculates the area of intersection between this bounding box and another.
    ///
    /// Returns 0.0 if the boxes do not overlap.
    pub fn intersection(&self, other: &Self) -> f32 {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);

        if max.x > min.x && max.y > min.y {
            (max.x - min.x) * (max.y - min.y)
        } else {
            0.
        }
    }

    /// Calculates the Intersection over Union (IoU) between this bounding box
    /// and another.
    ///
    /// IoU = intersection / (area_a + area_b - intersection + ε), where ε
    /// keeps the division defined for degenerate zero-area boxes.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use yolodet_core::analysis::bbox::Bbox;
    /// let bbox1 = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
    /// let bbox2 = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0));
    /// assert!((bbox1.iou(&bbox2) - 1.0).abs() < 1e-5);
    /// ```
    pub fn iou(&self, other: &Self) -> f32 {
        let intersection_area = self.intersection(other);
        let union_area = self.area() + other.area() - intersection_area;

        intersection_area / (union_area + IOU_EPSILON)
    }

    /// Clamps the bounding box coordinates to stay within the specified bounds.
    ///
    /// Used to constrain remapped detections to the image boundaries.
    pub fn clamp(&self, min_bounds: glam::Vec2, max_bounds: glam::Vec2) -> Self {
        Self {
            min: self.min.clamp(min_bounds, max_bounds),
            max: self.max.clamp(min_bounds, max_bounds),
        }
    }
}
