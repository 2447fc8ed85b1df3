use std::collections::BTreeMap;

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::employee::stored_preview;
use crate::auth::StaffUser;
use crate::client::UpstreamClient;
use crate::error::AdminError;
use crate::extraction::{ExtractionOutcome, PassbookExtractor};
use crate::form::{DocumentSlot, EmployeeForm, Field, FieldIssue, FieldPath};
use crate::utils::document::{self, DocumentPreview, DocumentUpload};
use crate::utils::draft_store::{Draft, DraftMode, DraftStore};

/// Snapshot of a draft returned by every draft endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    #[schema(example = "3f2b1c9e-8d4a-4c1b-9a51-0c4f8e2d7b61")]
    pub id: String,
    #[schema(value_type = Object, example = json!({"kind": "edit", "srNo": 2}))]
    pub mode: DraftMode,
    pub form: EmployeeForm,
    /// Live field errors, in field order.
    pub issues: Vec<FieldIssue>,
    pub documents: Vec<DocumentSlot>,
    pub last_extraction: Option<ExtractionOutcome>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl From<&Draft> for DraftView {
    fn from(draft: &Draft) -> Self {
        Self {
            id: draft.id.to_string(),
            mode: draft.mode,
            form: draft.form.clone(),
            issues: draft
                .form
                .issues
                .iter()
                .map(|(field, message)| FieldIssue { field: *field, message: message.clone() })
                .collect(),
            documents: draft.documents.keys().copied().collect(),
            last_extraction: draft.last_extraction.clone(),
            updated_at: draft.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FieldChange {
    /// Input name, e.g. `pan`, `confirmIFSCCode` or `emergency.relation`
    #[schema(example = "pan")]
    pub name: String,
    #[schema(example = "abcde1234f")]
    pub value: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DraftChanges {
    pub changes: Vec<FieldChange>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PassbookResult {
    pub draft: DraftView,
    pub extraction: ExtractionOutcome,
}

fn parse_id(raw: &str) -> Result<Uuid, AdminError> {
    Uuid::parse_str(raw).map_err(|_| AdminError::DraftNotFound)
}

/// Open an add-employee draft
#[utoipa::path(
    post,
    path = "/admin/drafts",
    responses(
        (status = 201, description = "Blank add-employee draft", body = DraftView)
    ),
    tag = "Draft",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_draft(
    user: StaffUser,
    store: web::Data<DraftStore>,
) -> actix_web::Result<impl Responder> {
    let draft = store.insert(Draft::new_employee()).await;
    info!(draft_id = %draft.id, user = %user.username, "Add-employee draft opened");
    Ok(HttpResponse::Created().json(DraftView::from(&draft)))
}

/// Open a profile-editor draft seeded from a stored employee
#[utoipa::path(
    post,
    path = "/admin/drafts/profile/{sr_no}",
    params(
        ("sr_no" = u64, Path, description = "Employee srNo")
    ),
    responses(
        (status = 201, description = "Edit draft seeded from the stored profile", body = DraftView),
        (status = 404, description = "Employee not found"),
        (status = 502, description = "HR backend unreachable")
    ),
    tag = "Draft",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_edit_draft(
    user: StaffUser,
    store: web::Data<DraftStore>,
    client: web::Data<UpstreamClient>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let sr_no = path.into_inner();
    let profile = client
        .find_profile(sr_no)
        .await
        .map_err(AdminError::from)?
        .ok_or(AdminError::EmployeeNotFound)?;

    let draft = store.insert(Draft::edit(sr_no, profile)).await;
    info!(draft_id = %draft.id, sr_no, user = %user.username, "Profile-editor draft opened");
    Ok(HttpResponse::Created().json(DraftView::from(&draft)))
}

/// Get a draft
#[utoipa::path(
    get,
    path = "/admin/drafts/{id}",
    params(
        ("id" = String, Path, description = "Draft id")
    ),
    responses(
        (status = 200, description = "Current draft state", body = DraftView),
        (status = 404, description = "Draft not found")
    ),
    tag = "Draft",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_draft(
    store: web::Data<DraftStore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let id = parse_id(&path)?;
    let draft = store.get(&id).await.ok_or(AdminError::DraftNotFound)?;
    Ok(HttpResponse::Ok().json(DraftView::from(&draft)))
}

/// Apply field changes to a draft
///
/// Changes are applied in order. Unknown field names reject the whole batch.
#[utoipa::path(
    patch,
    path = "/admin/drafts/{id}",
    params(
        ("id" = String, Path, description = "Draft id")
    ),
    request_body = DraftChanges,
    responses(
        (status = 200, description = "Draft after the changes, with live issues", body = DraftView),
        (status = 400, description = "Unknown field", body = Object, example = json!({
            "message": "Unknown form field: salary"
        })),
        (status = 404, description = "Draft not found")
    ),
    tag = "Draft",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_draft(
    store: web::Data<DraftStore>,
    path: web::Path<String>,
    payload: web::Json<DraftChanges>,
) -> actix_web::Result<impl Responder> {
    let id = parse_id(&path)?;

    if let Some(unknown) = payload.changes.iter().find(|c| FieldPath::parse(&c.name).is_none()) {
        return Err(AdminError::BadRequest(format!("Unknown form field: {}", unknown.name)).into());
    }

    let (draft, applied) = store
        .update(&id, |draft| {
            payload
                .changes
                .iter()
                .map(|change| draft.form.apply_named(&change.name, &change.value))
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .ok_or(AdminError::DraftNotFound)?;
    applied.map_err(AdminError::from)?;

    Ok(HttpResponse::Ok().json(DraftView::from(&draft)))
}

/// Discard a draft
#[utoipa::path(
    delete,
    path = "/admin/drafts/{id}",
    params(
        ("id" = String, Path, description = "Draft id")
    ),
    responses(
        (status = 200, description = "Draft discarded", body = Object, example = json!({
            "message": "Draft discarded"
        })),
        (status = 404, description = "Draft not found")
    ),
    tag = "Draft",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_draft(
    store: web::Data<DraftStore>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let id = parse_id(&path)?;
    store.remove(&id).await.ok_or(AdminError::DraftNotFound)?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Draft discarded" })))
}

/// Attach a document to a draft slot
#[utoipa::path(
    put,
    path = "/admin/drafts/{id}/documents/{slot}",
    params(
        ("id" = String, Path, description = "Draft id"),
        ("slot" = DocumentSlot, Path, description = "Document slot")
    ),
    request_body = DocumentUpload,
    responses(
        (status = 200, description = "Preview of the attached document", body = DocumentPreview),
        (status = 400, description = "Payload is not valid base64"),
        (status = 404, description = "Draft not found")
    ),
    tag = "Draft",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn put_document(
    store: web::Data<DraftStore>,
    path: web::Path<(String, DocumentSlot)>,
    payload: web::Json<DocumentUpload>,
) -> actix_web::Result<impl Responder> {
    let (raw_id, slot) = path.into_inner();
    let id = parse_id(&raw_id)?;

    let upload = payload.into_inner();
    let info = upload.describe().map_err(AdminError::from)?;
    let preview = document::preview(&info.file_name, upload.kind(), upload.payload());

    store
        .update(&id, move |draft| draft.documents.insert(slot, upload))
        .await
        .ok_or(AdminError::DraftNotFound)?;

    Ok(HttpResponse::Ok().json(preview))
}

/// Preview a draft document
///
/// Falls back to the stored profile's document for edit drafts.
#[utoipa::path(
    get,
    path = "/admin/drafts/{id}/documents/{slot}",
    params(
        ("id" = String, Path, description = "Draft id"),
        ("slot" = DocumentSlot, Path, description = "Document slot")
    ),
    responses(
        (status = 200, description = "Document preview", body = DocumentPreview),
        (status = 404, description = "Draft or document not found")
    ),
    tag = "Draft",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_document(
    store: web::Data<DraftStore>,
    path: web::Path<(String, DocumentSlot)>,
) -> actix_web::Result<impl Responder> {
    let (raw_id, slot) = path.into_inner();
    let id = parse_id(&raw_id)?;
    let draft = store.get(&id).await.ok_or(AdminError::DraftNotFound)?;

    let preview = match draft.documents.get(&slot) {
        Some(upload) => Some(document::preview(&upload.file_name, upload.kind(), upload.payload())),
        None => draft
            .base
            .as_ref()
            .and_then(|base| slot.stored(base))
            .map(|data| stored_preview(slot, data)),
    };

    match preview {
        Some(preview) => Ok(HttpResponse::Ok().json(preview)),
        None => Ok(HttpResponse::NotFound().json(json!({ "message": "No document uploaded" }))),
    }
}

/// Extract bank details from a passbook image into the draft
///
/// The passbook is also attached to the draft's passbook slot. Extraction
/// failures leave the draft untouched.
#[utoipa::path(
    post,
    path = "/admin/drafts/{id}/passbook",
    params(
        ("id" = String, Path, description = "Draft id")
    ),
    request_body = DocumentUpload,
    responses(
        (status = 200, description = "Extraction applied to the draft", body = PassbookResult),
        (status = 404, description = "Draft not found"),
        (status = 422, description = "Extraction failed", body = Object, example = json!({
            "message": "Failed to extract text from image. Please try a clearer image."
        }))
    ),
    tag = "Draft",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn draft_passbook(
    store: web::Data<DraftStore>,
    extractor: web::Data<PassbookExtractor>,
    path: web::Path<String>,
    payload: web::Json<DocumentUpload>,
) -> actix_web::Result<impl Responder> {
    let id = parse_id(&path)?;
    if store.get(&id).await.is_none() {
        return Err(AdminError::DraftNotFound.into());
    }

    let upload = payload.into_inner();
    let bytes = upload.decode().map_err(AdminError::from)?;
    let outcome = extractor
        .extract(&upload.content_type, &bytes)
        .await
        .map_err(AdminError::from)?;

    let applied = outcome.clone();
    let (draft, _) = store
        .update(&id, move |draft| {
            draft.form.apply_bank_details(
                applied.account_number.as_ref().map(|c| c.value.as_str()),
                applied.ifsc_code.as_ref().map(|c| c.value.as_str()),
                applied.bank_name.as_deref(),
            );
            draft.documents.insert(DocumentSlot::PassbookFile, upload);
            draft.last_extraction = Some(applied);
        })
        .await
        .ok_or(AdminError::DraftNotFound)?;

    Ok(HttpResponse::Ok().json(PassbookResult {
        draft: DraftView::from(&draft),
        extraction: outcome,
    }))
}

/// Submit a draft to the HR backend
///
/// Add-employee drafts are saved as multipart with their documents; edit
/// drafts are sent as JSON updates. The draft is discarded on success.
#[utoipa::path(
    post,
    path = "/admin/drafts/{id}/submit",
    params(
        ("id" = String, Path, description = "Draft id")
    ),
    responses(
        (status = 200, description = "Saved by the HR backend", body = Object, example = json!({
            "message": "Employee added successfully",
            "response": {}
        })),
        (status = 404, description = "Draft not found"),
        (status = 422, description = "Field issues block submission", body = Object, example = json!({
            "message": "Please correct the highlighted fields",
            "issues": [{"field": "pan", "message": "Invalid PAN format. Should be ABCDE1234F."}]
        })),
        (status = 502, description = "HR backend error"),
        (status = 504, description = "HR backend timed out")
    ),
    tag = "Draft",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn submit_draft(
    user: StaffUser,
    store: web::Data<DraftStore>,
    client: web::Data<UpstreamClient>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let id = parse_id(&path)?;
    let draft = store.get(&id).await.ok_or(AdminError::DraftNotFound)?;

    let is_new = draft.mode == DraftMode::New;
    if let Err(issues) = draft.form.validate_for_submit(is_new) {
        let shown: BTreeMap<Field, String> =
            issues.iter().map(|i| (i.field, i.message.clone())).collect();
        store.update(&id, move |d| d.form.issues = shown).await;
        return Err(AdminError::Invalid(issues).into());
    }

    let (response, message): (Value, &str) = match draft.mode {
        DraftMode::New => {
            let profile = draft.form.to_new_profile();
            let response = client
                .save_profile(&profile, &draft.documents)
                .await
                .inspect_err(|e| error!(error = %e, draft_id = %id, "Failed to add employee"))
                .map_err(AdminError::from)?;
            (response, "Employee added successfully")
        }
        DraftMode::Edit { sr_no } => {
            let base = draft.base.clone().unwrap_or_default();
            let mut profile = draft.form.to_updated_profile(&base);
            for (slot, upload) in &draft.documents {
                slot.store(&mut profile, upload.payload().to_string());
            }
            let response = client
                .update_profile(sr_no, &profile)
                .await
                .inspect_err(|e| error!(error = %e, sr_no, "Failed to update employee"))
                .map_err(AdminError::from)?;
            (response, "Profile updated successfully!")
        }
    };

    if store.remove(&id).await.is_none() {
        warn!(draft_id = %id, "Draft expired during submission");
    }
    info!(draft_id = %id, user = %user.username, "Draft submitted");

    Ok(HttpResponse::Ok().json(json!({ "message": message, "response": response })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Field;

    #[test]
    fn view_lists_issues_and_documents() {
        let mut draft = Draft::new_employee();
        draft.form.apply(Field::Pan, "bad");
        draft.documents.insert(
            DocumentSlot::Photo,
            DocumentUpload {
                file_name: "me.png".into(),
                content_type: "image/png".into(),
                data: "QUJD".into(),
            },
        );

        let view = DraftView::from(&draft);
        assert_eq!(view.issues.len(), 1);
        assert_eq!(view.issues[0].field, Field::Pan);
        assert_eq!(view.documents, vec![DocumentSlot::Photo]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["mode"]["kind"], "new");
        assert_eq!(json["form"]["pan"], "BAD");
        assert!(json["form"].get("password").is_none());
    }

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(parse_id("nope"), Err(AdminError::DraftNotFound)));
    }
}
