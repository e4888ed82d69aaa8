//! Image in, record out.
//!
//! Drives one image through recognition and extraction. The recognizer is
//! injected, so tests and the CLI run without a real engine.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::extraction::orchestrator::RecordExtractor;
use crate::pipeline::extraction::types::{ExamRecord, PatientRecord};
use crate::pipeline::recognition::{RecognitionError, TextRecognizer};

/// Decoded images above this size are rejected.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("OCR failed: {0}")]
    Recognition(#[from] RecognitionError),
}

impl ProcessError {
    /// True when the caller sent something unusable, false for internal
    /// failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProcessError::InvalidInput(_))
    }
}

/// JSON request body carrying a base64 image. `image` is accepted as an
/// alternate key; `image_base64` wins when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ImagePayload {
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self {
            image_base64: Some(encoded.into()),
            image: None,
        }
    }

    /// First non-empty encoded image.
    pub fn encoded(&self) -> Option<&str> {
        [self.image_base64.as_deref(), self.image.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

/// Decode the payload image. Accepts plain base64 or a `data:` URL.
pub fn decode_image_payload(payload: &ImagePayload) -> Result<Vec<u8>, ProcessError> {
    let encoded = payload
        .encoded()
        .ok_or_else(|| ProcessError::InvalidInput("Missing image_base64 or image in body".into()))?
        .trim();

    let encoded = match encoded.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => encoded,
    };

    if encoded.len() / 4 * 3 > MAX_IMAGE_BYTES {
        return Err(ProcessError::InvalidInput("Image too large".into()));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| ProcessError::InvalidInput(format!("Invalid base64 image: {e}")))?;

    if bytes.is_empty() {
        return Err(ProcessError::InvalidInput("Empty image".into()));
    }

    Ok(bytes)
}

pub struct DocumentProcessor {
    recognizer: Box<dyn TextRecognizer>,
    extractor: RecordExtractor,
}

impl DocumentProcessor {
    pub fn new(recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            recognizer,
            extractor: RecordExtractor::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: RecordExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Run the recognizer over raw image bytes.
    pub fn recognize(&self, image_bytes: &[u8]) -> Result<String, ProcessError> {
        if image_bytes.is_empty() {
            return Err(ProcessError::InvalidInput("Empty image".into()));
        }

        let text = self.recognizer.recognize(image_bytes).inspect_err(|e| {
            tracing::warn!(error = %e, image_bytes = image_bytes.len(), "Recognition failed");
        })?;

        tracing::debug!(
            image_bytes = image_bytes.len(),
            text_chars = text.len(),
            "Recognition complete"
        );
        Ok(text)
    }

    pub fn process_patient(&self, image_bytes: &[u8]) -> Result<PatientRecord, ProcessError> {
        let text = self.recognize(image_bytes)?;
        Ok(self.extractor.extract_patient(&text))
    }

    pub fn process_exam(&self, image_bytes: &[u8]) -> Result<ExamRecord, ProcessError> {
        let text = self.recognize(image_bytes)?;
        Ok(self.extractor.extract_exam(&text))
    }

    pub fn process_patient_payload(
        &self,
        payload: &ImagePayload,
    ) -> Result<PatientRecord, ProcessError> {
        self.process_patient(&decode_image_payload(payload)?)
    }

    pub fn process_exam_payload(&self, payload: &ImagePayload) -> Result<ExamRecord, ProcessError> {
        self.process_exam(&decode_image_payload(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::recognition::MockRecognizer;

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn processor(text: &str) -> DocumentProcessor {
        DocumentProcessor::new(Box::new(MockRecognizer::new(text)))
    }

    #[test]
    fn payload_accepts_either_key() {
        let payload: ImagePayload = serde_json::from_str(r#"{"image": "aGVsbG8="}"#).unwrap();
        assert_eq!(payload.encoded(), Some("aGVsbG8="));

        let payload: ImagePayload =
            serde_json::from_str(r#"{"image_base64": "", "image": "aGVsbG8="}"#).unwrap();
        assert_eq!(payload.encoded(), Some("aGVsbG8="));

        let payload: ImagePayload =
            serde_json::from_str(r#"{"image_base64": "Zmlyc3Q=", "image": "aGVsbG8="}"#).unwrap();
        assert_eq!(payload.encoded(), Some("Zmlyc3Q="));
    }

    #[test]
    fn decode_plain_and_data_url() {
        let payload = ImagePayload::from_base64(encode(b"\x89PNG"));
        assert_eq!(decode_image_payload(&payload).unwrap(), b"\x89PNG");

        let payload = ImagePayload::from_base64(format!("data:image/png;base64,{}", encode(b"img")));
        assert_eq!(decode_image_payload(&payload).unwrap(), b"img");
    }

    #[test]
    fn missing_payload_is_client_error() {
        let err = decode_image_payload(&ImagePayload::default()).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("Missing image_base64"));
    }

    #[test]
    fn invalid_base64_is_client_error() {
        let err = decode_image_payload(&ImagePayload::from_base64("not base64!")).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("Invalid base64 image"));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let huge = "A".repeat(MAX_IMAGE_BYTES / 3 * 4 + 8);
        let err = decode_image_payload(&ImagePayload::from_base64(huge)).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn empty_image_is_client_error() {
        let err = processor("x").process_patient(b"").unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn recognition_failure_is_internal() {
        let processor = DocumentProcessor::new(Box::new(MockRecognizer::failing("engine crashed")));
        let err = processor.process_exam(b"img").unwrap_err();
        assert!(!err.is_client_error());
        assert!(matches!(err, ProcessError::Recognition(RecognitionError::Failed(_))));
    }

    #[test]
    fn patient_from_payload() {
        let processor = processor("Paciente: Rex Espécie: canino Sexo: macho Peso: 12,5 kg");
        let record = processor
            .process_patient_payload(&ImagePayload::from_base64(encode(b"img")))
            .unwrap();
        assert_eq!(record.name, "Rex");
        assert_eq!(record.species, "canino");
        assert_eq!(record.sex, "macho");
        assert_eq!(record.weight, "12.5");
    }

    #[test]
    fn exam_from_bytes() {
        let processor = processor("PDA, BLESS, CAN, F, N 05/03/2024 143bpm TAPSE 1,45 cm");
        let exam = processor.process_exam(b"img").unwrap();
        assert_eq!(
            exam.right_ventricle.as_ref().and_then(|g| g.get("tapse")),
            Some("1.45")
        );
        assert_eq!(
            exam.exam_info.as_ref().and_then(|i| i.date.as_deref()),
            Some("2024-03-05")
        );
        let patient = exam.patient.unwrap();
        assert_eq!(patient.species, "canino");
        assert_eq!(patient.sex, "femea");
    }
}
