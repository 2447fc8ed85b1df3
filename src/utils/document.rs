use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

/// A file carried inside a JSON body as base64, optionally as a full data URL.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    #[schema(example = "passbook.jpg")]
    pub file_name: String,
    #[schema(example = "image/jpeg")]
    pub content_type: String,
    /// Base64 payload, with or without a `data:<mime>;base64,` prefix.
    pub data: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DocumentKind {
    Image,
    Pdf,
    Other,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPreview {
    pub name: String,
    pub kind: DocumentKind,
    pub size_bytes: usize,
    /// Inline-renderable URL; absent when the document can only be downloaded.
    pub preview_url: Option<String>,
    pub download_url: String,
}

/// Debug description of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    pub content_type: String,
    pub size_bytes: usize,
    pub file_name: String,
}

#[derive(Debug, PartialEq, Eq, derive_more::Display)]
pub enum DocumentError {
    #[display(fmt = "{} is not valid base64 data", _0)]
    InvalidBase64(String),
}

impl std::error::Error for DocumentError {}

/// Returns the bare base64 payload of a data URL; other input is returned trimmed.
pub fn strip_data_url(data: &str) -> &str {
    let data = data.trim();
    match data.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, payload)| payload).unwrap_or(rest),
        None => data,
    }
}

pub fn classify(content_type: &str, file_name: &str) -> DocumentKind {
    let mime = content_type.to_ascii_lowercase();
    if mime.starts_with("image/") {
        return DocumentKind::Image;
    }
    if mime == "application/pdf" {
        return DocumentKind::Pdf;
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" => DocumentKind::Image,
        "pdf" => DocumentKind::Pdf,
        _ => DocumentKind::Other,
    }
}

impl DocumentUpload {
    pub fn payload(&self) -> &str {
        strip_data_url(&self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>, DocumentError> {
        STANDARD
            .decode(self.payload())
            .map_err(|_| DocumentError::InvalidBase64(self.file_name.clone()))
    }

    pub fn kind(&self) -> DocumentKind {
        classify(&self.content_type, &self.file_name)
    }

    pub fn describe(&self) -> Result<BlobInfo, DocumentError> {
        let bytes = self.decode()?;
        let info = BlobInfo {
            content_type: if self.content_type.is_empty() {
                "Unknown".to_string()
            } else {
                self.content_type.clone()
            },
            size_bytes: bytes.len(),
            file_name: self.file_name.clone(),
        };
        tracing::debug!(
            file_name = %info.file_name,
            content_type = %info.content_type,
            size_bytes = info.size_bytes,
            "Blob debug info"
        );
        Ok(info)
    }
}

/// Builds a preview for a stored base64 document.
pub fn preview(name: &str, kind: DocumentKind, base64_data: &str) -> DocumentPreview {
    let payload = strip_data_url(base64_data);
    let preview_url = match kind {
        DocumentKind::Image => Some(format!("data:image/jpeg;base64,{payload}")),
        DocumentKind::Pdf => Some(format!("data:application/pdf;base64,{payload}")),
        DocumentKind::Other => None,
    };

    DocumentPreview {
        name: if name.is_empty() { "document".to_string() } else { name.to_string() },
        kind,
        size_bytes: decoded_len(payload),
        preview_url,
        download_url: format!("data:application/octet-stream;base64,{payload}"),
    }
}

pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

fn decoded_len(payload: &str) -> usize {
    let padding = payload.bytes().rev().take_while(|b| *b == b'=').count();
    (payload.len() / 4 * 3).saturating_sub(padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_prefix_is_stripped() {
        assert_eq!(strip_data_url("data:image/png;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("  QUJD \n"), "QUJD");
    }

    #[test]
    fn kind_comes_from_mime_then_extension() {
        assert_eq!(classify("image/png", "x.bin"), DocumentKind::Image);
        assert_eq!(classify("application/pdf", "x"), DocumentKind::Pdf);
        assert_eq!(classify("", "Offer.PDF"), DocumentKind::Pdf);
        assert_eq!(classify("application/octet-stream", "scan.jpeg"), DocumentKind::Image);
        assert_eq!(classify("application/msword", "cv.doc"), DocumentKind::Other);
    }

    #[test]
    fn preview_urls_follow_kind() {
        let image = preview("photo.jpg", DocumentKind::Image, "QUJD");
        assert_eq!(image.preview_url.as_deref(), Some("data:image/jpeg;base64,QUJD"));
        assert_eq!(image.size_bytes, 3);

        let other = preview("", DocumentKind::Other, "data:application/msword;base64,QUI=");
        assert_eq!(other.name, "document");
        assert!(other.preview_url.is_none());
        assert_eq!(other.download_url, "data:application/octet-stream;base64,QUI=");
        assert_eq!(other.size_bytes, 2);
    }

    #[test]
    fn describe_reports_decoded_size() {
        let upload = DocumentUpload {
            file_name: "pan.png".into(),
            content_type: String::new(),
            data: encode(b"hello world"),
        };
        let info = upload.describe().unwrap();
        assert_eq!(info.size_bytes, 11);
        assert_eq!(info.content_type, "Unknown");
    }

    #[test]
    fn bad_base64_is_reported_with_file_name() {
        let upload = DocumentUpload {
            file_name: "pan.png".into(),
            content_type: "image/png".into(),
            data: "not base64!!".into(),
        };
        let err = upload.decode().unwrap_err();
        assert_eq!(err, DocumentError::InvalidBase64("pan.png".into()));
        assert_eq!(err.to_string(), "pan.png is not valid base64 data");
    }
}
