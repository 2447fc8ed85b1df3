//! Passbook/cheque extraction: image → binarized PNG → OCR text → scored
//! account number and IFSC candidates → bank name.

pub mod banks;
pub mod candidates;
pub mod ocr;
pub mod preprocess;

use std::sync::Arc;

use derive_more::Display;
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use self::candidates::{Candidate, account_candidates, best, ifsc_candidates};
use self::ocr::{OcrEngine, OcrError, OcrTimeouts, recognize_text};

pub const NOT_FOUND_MESSAGE: &str =
    "No account number, IFSC code, or bank name found. Please check image quality or enter manually.";

/// Failure shown next to the passbook upload.
#[derive(Debug, Display)]
pub enum ExtractionError {
    #[display(fmt = "Please select a valid image file")]
    NotAnImage,

    #[display(fmt = "Image size should be less than 10MB")]
    TooLarge { limit: usize },

    #[display(fmt = "Error loading image. Please try again.")]
    Decode(String),

    #[display(fmt = "Failed to extract text from image. Please try a clearer image.")]
    Ocr(OcrError),
}

impl std::error::Error for ExtractionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractionError::Ocr(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OcrError> for ExtractionError {
    fn from(e: OcrError) -> Self {
        ExtractionError::Ocr(e)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    pub account_number: Option<Candidate>,
    pub ifsc_code: Option<Candidate>,
    pub bank_name: Option<String>,
    /// Labels of the fields that were found, in display order.
    pub found: Vec<String>,
    pub message: String,
}

impl ExtractionOutcome {
    /// Scores candidates in already-recognized text.
    pub fn from_text(text: &str) -> Self {
        let account_number = best(account_candidates(text));
        let ifsc_code = best(ifsc_candidates(text));
        let bank_name = ifsc_code
            .as_ref()
            .and_then(|c| banks::bank_name_for_ifsc(&c.value))
            .map(str::to_string);

        let mut found = Vec::new();
        if account_number.is_some() {
            found.push("Account Number".to_string());
        }
        if ifsc_code.is_some() {
            found.push("IFSC Code".to_string());
        }
        if bank_name.is_some() {
            found.push("Bank Name".to_string());
        }

        let message = if found.is_empty() {
            NOT_FOUND_MESSAGE.to_string()
        } else {
            format!("Successfully extracted: {}!", found.join(", "))
        };

        Self { account_number, ifsc_code, bank_name, found, message }
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}

#[derive(Clone)]
pub struct PassbookExtractor {
    engine: Arc<dyn OcrEngine>,
    timeouts: OcrTimeouts,
    max_bytes: usize,
}

impl PassbookExtractor {
    pub fn new(engine: Arc<dyn OcrEngine>, timeouts: OcrTimeouts, max_bytes: usize) -> Self {
        Self { engine, timeouts, max_bytes }
    }

    pub async fn extract(
        &self,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<ExtractionOutcome, ExtractionError> {
        if !content_type.starts_with("image/") {
            return Err(ExtractionError::NotAnImage);
        }
        if bytes.len() > self.max_bytes {
            return Err(ExtractionError::TooLarge { limit: self.max_bytes });
        }

        let image =
            image::load_from_memory(bytes).map_err(|e| ExtractionError::Decode(e.to_string()))?;
        let png =
            preprocess::binarize(&image).map_err(|e| ExtractionError::Decode(e.to_string()))?;

        let text = recognize_text(self.engine.as_ref(), &png, self.timeouts)
            .await
            .inspect_err(|e| error!(error = %e, "Passbook OCR failed"))?;

        let outcome = ExtractionOutcome::from_text(&text);
        info!(
            found = ?outcome.found,
            account_confidence = outcome.account_number.as_ref().map(|c| c.confidence),
            ifsc_confidence = outcome.ifsc_code.as_ref().map(|c| c.confidence),
            "Passbook extraction finished"
        );
        Ok(outcome)
    }
}
