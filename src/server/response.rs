//! JSON bodies for the prediction endpoint.
//!
//! The shape is fixed by existing frontends: classifier results appear as
//! `{label, confidence}` objects under `deepfake` and `resnet`, masks as
//! base64 PNG strings grouped per source under `segmentation`, and a
//! `message` only on short-circuited responses. Absent sections are omitted
//! entirely, never serialized as null.

use crate::core::errors::DetectResult;
use crate::models::Classification;
use crate::pipeline::DetectionOutcome;
use crate::utils::mask_to_png_base64;
use serde::Serialize;
use std::collections::BTreeMap;

/// One classifier's result on the wire.
#[derive(Debug, Serialize)]
pub struct ClassificationBody {
    /// The mapped label.
    pub label: String,
    /// Probability rounded to four decimal places.
    pub confidence: f64,
}

impl From<&Classification> for ClassificationBody {
    fn from(classification: &Classification) -> Self {
        Self {
            label: classification.label.clone(),
            confidence: round4(classification.probability),
        }
    }
}

/// One segmentation source's masks on the wire.
#[derive(Debug, Serialize)]
pub struct MaskBody {
    /// Base64 PNG of the probability mask.
    pub predicted_mask: String,
    /// Base64 PNG of the thresholded binary mask.
    pub binary_mask: String,
}

/// Full body of a successful prediction.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Deepfake classifier result; present on every response.
    pub deepfake: ClassificationBody,
    /// Short-circuit note; present only when the pipeline stopped early.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Forgery classifier result, under its historical wire name.
    #[serde(rename = "resnet", skip_serializing_if = "Option::is_none")]
    pub forgery: Option<ClassificationBody>,
    /// Masks keyed by source name; present only when segmentation ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segmentation: Option<BTreeMap<String, MaskBody>>,
}

impl PredictResponse {
    /// Serializes a pipeline outcome, encoding any masks as PNG base64.
    pub fn from_outcome(outcome: &DetectionOutcome) -> DetectResult<Self> {
        let segmentation = if outcome.segmentation.is_empty() {
            None
        } else {
            let mut sources = BTreeMap::new();
            for result in &outcome.segmentation {
                sources.insert(
                    result.source.clone(),
                    MaskBody {
                        predicted_mask: mask_to_png_base64(&result.masks.probability)?,
                        binary_mask: mask_to_png_base64(&result.masks.binary)?,
                    },
                );
            }
            Some(sources)
        };

        Ok(Self {
            deepfake: ClassificationBody::from(&outcome.deepfake),
            message: outcome.message.clone(),
            forgery: outcome.forgery.as_ref().map(ClassificationBody::from),
            segmentation,
        })
    }
}

/// Rounds a probability to four decimal places for display.
pub fn round4(value: f32) -> f64 {
    (f64::from(value) * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaskPair;
    use crate::pipeline::SegmentationResult;
    use ndarray::Array2;

    fn classification(label: &str, probability: f32) -> Classification {
        Classification {
            label: label.to_string(),
            probability,
        }
    }

    #[test]
    fn rounds_to_four_decimals() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(0.999_99), 1.0);
        assert_eq!(round4(0.0), 0.0);
    }

    #[test]
    fn short_circuited_body_omits_forgery_and_segmentation() {
        let outcome = DetectionOutcome {
            deepfake: classification("Fake", 0.987_654),
            message: Some("flagged".to_string()),
            forgery: None,
            segmentation: Vec::new(),
        };
        let body = PredictResponse::from_outcome(&outcome).unwrap();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["deepfake"]["label"], "Fake");
        assert_eq!(json["deepfake"]["confidence"], 0.9877);
        assert_eq!(json["message"], "flagged");
        assert!(json.get("resnet").is_none());
        assert!(json.get("segmentation").is_none());
    }

    #[test]
    fn authentic_body_carries_resnet_key_without_segmentation() {
        let outcome = DetectionOutcome {
            deepfake: classification("Real", 0.1),
            message: None,
            forgery: Some(classification("Authentic", 0.25)),
            segmentation: Vec::new(),
        };
        let json = serde_json::to_value(PredictResponse::from_outcome(&outcome).unwrap()).unwrap();

        assert_eq!(json["resnet"]["label"], "Authentic");
        assert_eq!(json["resnet"]["confidence"], 0.25);
        assert!(json.get("message").is_none());
        assert!(json.get("segmentation").is_none());
    }

    #[test]
    fn forged_body_groups_masks_by_source() {
        let masks = MaskPair {
            probability: Array2::from_elem((4, 4), 0.6),
            binary: Array2::from_elem((4, 4), 1.0),
        };
        let outcome = DetectionOutcome {
            deepfake: classification("Real", 0.2),
            message: None,
            forgery: Some(classification("Forged", 0.91)),
            segmentation: vec![
                SegmentationResult {
                    source: "casia".to_string(),
                    masks: masks.clone(),
                },
                SegmentationResult {
                    source: "defacto".to_string(),
                    masks,
                },
            ],
        };
        let json = serde_json::to_value(PredictResponse::from_outcome(&outcome).unwrap()).unwrap();

        let segmentation = json["segmentation"].as_object().unwrap();
        assert_eq!(segmentation.len(), 2);
        for source in ["casia", "defacto"] {
            let entry = &segmentation[source];
            assert!(!entry["predicted_mask"].as_str().unwrap().is_empty());
            assert!(!entry["binary_mask"].as_str().unwrap().is_empty());
        }
    }
}
