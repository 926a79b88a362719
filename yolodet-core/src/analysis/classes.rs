use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    consts::{FALLBACK_COLOR, FALLBACK_LABEL},
    error::{ConfigSnafu, DetectError},
};

/// COCO class names (80 classes), the label set the stock YOLO weights ship with.
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Display colors cycled over class ids when a table is built from bare labels.
const PALETTE: [[u8; 3]; 8] = [
    [255, 0, 0],     // Red
    [0, 255, 0],     // Green
    [0, 0, 255],     // Blue
    [255, 255, 0],   // Yellow
    [255, 0, 255],   // Magenta
    [0, 255, 255],   // Cyan
    [255, 165, 0],   // Orange
    [128, 0, 128],   // Purple
];

/// Human label and display color for one class id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassInfo {
    pub label: String,
    pub color: [u8; 3],
}

/// Ordered mapping from class id to label and display color.
///
/// The table is external configuration, not derived data: it is supplied by
/// the caller (typically deserialized from JSON) and read-only thereafter.
/// Class ids beyond the table's bounds resolve to [`FALLBACK_LABEL`] and
/// [`FALLBACK_COLOR`] instead of erroring.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassTable {
    entries: Vec<ClassInfo>,
}

impl ClassTable {
    /// Creates a class table from explicit entries. An empty table is a
    /// configuration error.
    pub fn new(entries: Vec<ClassInfo>) -> Result<Self, DetectError> {
        ensure!(
            !entries.is_empty(),
            ConfigSnafu {
                message: "class table must not be empty",
            }
        );

        Ok(Self { entries })
    }

    /// Builds a table from bare labels, assigning colors from a fixed palette.
    pub fn from_labels<I, S>(labels: I) -> Result<Self, DetectError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = labels
            .into_iter()
            .enumerate()
            .map(|(idx, label)| ClassInfo {
                label: label.into(),
                color: PALETTE[idx % PALETTE.len()],
            })
            .collect();

        Self::new(entries)
    }

    /// The 80-class COCO table used by stock YOLO checkpoints.
    pub fn coco() -> Self {
        let entries = COCO_CLASSES
            .iter()
            .enumerate()
            .map(|(idx, label)| ClassInfo {
                label: (*label).to_string(),
                color: PALETTE[idx % PALETTE.len()],
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, class_id: usize) -> Option<&ClassInfo> {
        self.entries.get(class_id)
    }

    /// Label for a class id, falling back for out-of-range ids.
    pub fn label(&self, class_id: usize) -> &str {
        self.get(class_id)
            .map(|info| info.label.as_str())
            .unwrap_or(FALLBACK_LABEL)
    }

    /// Display color for a class id, falling back for out-of-range ids.
    pub fn color(&self, class_id: usize) -> [u8; 3] {
        self.get(class_id)
            .map(|info| info.color)
            .unwrap_or(FALLBACK_COLOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table_rejected() {
        assert!(ClassTable::new(Vec::new()).is_err());
    }

    #[test]
    fn test_label_lookup() {
        let table = ClassTable::from_labels(["cat", "dog"]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.label(0), "cat");
        assert_eq!(table.label(1), "dog");
    }

    #[test]
    fn test_out_of_range_falls_back() {
        let table = ClassTable::from_labels(["cat"]).unwrap();
        assert_eq!(table.label(7), FALLBACK_LABEL);
        assert_eq!(table.color(7), FALLBACK_COLOR);
    }

    #[test]
    fn test_coco_table() {
        let table = ClassTable::coco();
        assert_eq!(table.len(), 80);
        assert_eq!(table.label(0), "person");
        assert_eq!(table.label(79), "toothbrush");
    }

    #[test]
    fn test_json_round_trip() {
        let table = ClassTable::from_labels(["cat", "dog"]).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let parsed: ClassTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.label(1), "dog");
    }
}
