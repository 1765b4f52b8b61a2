use serde::{Deserialize, Serialize};

/// Response body of `POST /api/detect-trees`, camelCase on the wire.
/// Immutable once received; the next successful upload replaces it wholesale.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub tree_count: u32,
    /// Average confidence as a percentage.
    pub confidence: f64,
    /// Processing time in seconds.
    pub processing_time: f64,
    pub processing_method: ProcessingMethod,
    /// Present when the service tiled the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles_processed: Option<u32>,
    /// Annotated image; the service returns a base64 data URL here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labeled_image_url: Option<String>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Server-reported strategy for handling the uploaded image.
/// The service sends "tiled" or "single"; anything unrecognized is treated
/// as single-pass, which is what the original UI did.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ProcessingMethod {
    Tiled,
    SinglePass,
}

impl From<String> for ProcessingMethod {
    fn from(value: String) -> Self {
        if value == "tiled" {
            ProcessingMethod::Tiled
        } else {
            ProcessingMethod::SinglePass
        }
    }
}

impl From<ProcessingMethod> for String {
    fn from(value: ProcessingMethod) -> Self {
        match value {
            ProcessingMethod::Tiled => "tiled".to_string(),
            ProcessingMethod::SinglePass => "single".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Detection {
    /// Confidence as a percentage.
    pub confidence: f64,
    pub bbox: BoundingBox,
}

/// Rectangle locating a detected tree in image coordinates.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}
