use actix_web::{HttpResponse, Responder, web};

use crate::error::AdminError;
use crate::extraction::{ExtractionOutcome, PassbookExtractor};
use crate::utils::document::DocumentUpload;

/// Extract bank details from a passbook image
///
/// Stateless variant of the draft passbook endpoint. A readable image with no
/// recognisable details still returns 200 with an explanatory message.
#[utoipa::path(
    post,
    path = "/admin/passbook/extract",
    request_body = DocumentUpload,
    responses(
        (status = 200, description = "Extraction result", body = ExtractionOutcome),
        (status = 400, description = "Payload is not valid base64"),
        (status = 422, description = "Not an image, too large, or OCR failed", body = Object, example = json!({
            "message": "Please select a valid image file"
        }))
    ),
    tag = "Passbook",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn extract_passbook(
    extractor: web::Data<PassbookExtractor>,
    payload: web::Json<DocumentUpload>,
) -> actix_web::Result<impl Responder> {
    let bytes = payload.decode().map_err(AdminError::from)?;
    let outcome = extractor
        .extract(&payload.content_type, &bytes)
        .await
        .map_err(AdminError::from)?;
    Ok(HttpResponse::Ok().json(outcome))
}
