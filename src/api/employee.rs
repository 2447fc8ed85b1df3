use actix_web::{HttpResponse, Responder, http::header, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::client::UpstreamClient;
use crate::error::AdminError;
use crate::form::DocumentSlot;
use crate::model::employee::EmployeeProfile;
use crate::utils::document::{self, DocumentKind, DocumentPreview};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Case-insensitive match on name, serial number, email, designation or department
    pub search: Option<String>,
}

/// One row of the employee grid.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRow {
    pub sr_no: Option<u64>,
    #[schema(example = "EMP001")]
    pub employee_serial_number: Option<String>,
    #[schema(example = "John Doe")]
    pub employee_name: Option<String>,
    pub email_address: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    /// `Active` when approved, otherwise `Pending`
    #[schema(example = "Active")]
    pub status: String,
    pub reporting_officer: Option<String>,
    pub date_of_joining: Option<String>,
    pub gross_salary: Option<f64>,
}

impl From<&EmployeeProfile> for EmployeeRow {
    fn from(p: &EmployeeProfile) -> Self {
        Self {
            sr_no: p.sr_no,
            employee_serial_number: p.employee_serial_number.clone(),
            employee_name: p.employee_name.clone(),
            email_address: p.email_address.clone(),
            designation: p.designation.clone(),
            department: p.department.clone(),
            status: if p.is_approved() { "Active" } else { "Pending" }.to_string(),
            reporting_officer: p.reporting_officer.clone(),
            date_of_joining: p.date_of_joining.clone(),
            gross_salary: p.gross_salary,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeGrid {
    pub rows: Vec<EmployeeRow>,
    #[schema(example = 2)]
    pub total: usize,
    /// True when the rows are sample data
    pub offline: bool,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    pub profile: EmployeeProfile,
    #[schema(example = "Pending")]
    pub approval: String,
    pub documents: Vec<SlotPreview>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotPreview {
    pub slot: DocumentSlot,
    pub preview: DocumentPreview,
}

/// Preview of a stored profile document. Stored documents carry no MIME type,
/// so the photo is treated as an image and everything else by its data URL.
pub fn stored_preview(slot: DocumentSlot, base64: &str) -> DocumentPreview {
    let kind = match base64.trim().strip_prefix("data:") {
        Some(rest) => document::classify(rest.split(';').next().unwrap_or_default(), ""),
        None if slot == DocumentSlot::Photo => DocumentKind::Image,
        None => DocumentKind::Other,
    };
    document::preview(slot.part_name(), kind, base64)
}

/// List employees
#[utoipa::path(
    get,
    path = "/admin/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Employee grid; sample rows when the HR backend is down", body = EmployeeGrid),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    client: web::Data<UpstreamClient>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let listing = client.profiles_or_sample().await;

    let term = query.search.as_deref().map(str::trim).unwrap_or_default();
    let rows: Vec<EmployeeRow> = listing
        .employees
        .iter()
        .filter(|p| term.is_empty() || p.matches_search(term))
        .map(EmployeeRow::from)
        .collect();

    debug!(total = rows.len(), offline = listing.offline, "Employee grid");

    Ok(HttpResponse::Ok().json(EmployeeGrid {
        total: rows.len(),
        rows,
        offline: listing.offline,
        notice: listing.notice,
    }))
}

const EXPORT_HEADERS: [&str; 26] = [
    "Sr. No.",
    "Employee Serial Number",
    "Employee Name",
    "Emergency Contact",
    "Email Address",
    "Address",
    "Qualification",
    "Date of Joining",
    "Designation",
    "Department",
    "Reporting Officer",
    "Gross Salary",
    "Bank Account Number",
    "IFSC Code",
    "Bank Name",
    "PAN",
    "Aadhaar",
    "Personal File Number",
    "Qualification Document",
    "Offer Letter Document",
    "Address Proof Document",
    "Medical Background Document",
    "Legal Background Document",
    "Approval Status",
    "Employment Status",
    "Reason for Discontinuity",
];

fn export_row(p: &EmployeeProfile) -> Vec<String> {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let present = |slot: DocumentSlot| {
        if slot.stored(p).is_some() { "Present" } else { "N/A" }.to_string()
    };
    let or_na = |v: &Option<String>| {
        v.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "N/A".to_string())
    };

    vec![
        p.sr_no.map(|n| n.to_string()).unwrap_or_default(),
        text(&p.employee_serial_number),
        text(&p.employee_name),
        text(&p.emergency_contact_number),
        text(&p.email_address),
        text(&p.address),
        text(&p.qualification),
        text(&p.date_of_joining),
        text(&p.designation),
        text(&p.department),
        text(&p.reporting_officer),
        p.gross_salary.map(|s| s.to_string()).unwrap_or_default(),
        text(&p.bank_account_number),
        text(&p.ifsc_code),
        text(&p.bank_name),
        text(&p.pan),
        text(&p.adhaar),
        text(&p.personal_file_number),
        present(DocumentSlot::Qualification),
        present(DocumentSlot::OfferLetter),
        present(DocumentSlot::AddressProof),
        present(DocumentSlot::MedicalBackground),
        present(DocumentSlot::LegalBackground),
        if p.is_approved() { "Approved" } else { "Pending" }.to_string(),
        or_na(&p.employment_status),
        or_na(&p.reason_for_discontinuity),
    ]
}

pub fn export_csv(profiles: &[EmployeeProfile]) -> Result<Vec<u8>, AdminError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| AdminError::Internal(e.to_string()))?;
    for profile in profiles {
        writer
            .write_record(export_row(profile))
            .map_err(|e| AdminError::Internal(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| AdminError::Internal(e.to_string()))
}

/// Download all employees as CSV
#[utoipa::path(
    get,
    path = "/admin/employees/export",
    responses(
        (status = 200, description = "CSV of all employee profiles", content_type = "text/csv", body = String),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Something went wrong, Contact with system admin"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn export_employees(
    client: web::Data<UpstreamClient>,
) -> actix_web::Result<impl Responder> {
    let listing = client.profiles_or_sample().await;
    let csv = export_csv(&listing.employees)?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"user_profiles.csv\"",
        ))
        .insert_header(("X-Data-Source", if listing.offline { "sample" } else { "live" }))
        .body(csv))
}

/// Get one employee profile
#[utoipa::path(
    get,
    path = "/admin/employees/{sr_no}",
    params(
        ("sr_no" = u64, Path, description = "Employee serial number (srNo)")
    ),
    responses(
        (status = 200, description = "Profile with document previews", body = EmployeeView),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 502, description = "HR backend unreachable")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    client: web::Data<UpstreamClient>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let sr_no = path.into_inner();
    let profile = client
        .find_profile(sr_no)
        .await
        .map_err(|e| {
            error!(error = %e, sr_no, "Failed to load employee");
            AdminError::from(e)
        })?
        .ok_or(AdminError::EmployeeNotFound)?;

    let documents = DocumentSlot::ALL
        .into_iter()
        .filter_map(|slot| {
            slot.stored(&profile)
                .map(|data| SlotPreview { slot, preview: stored_preview(slot, data) })
        })
        .collect();

    Ok(HttpResponse::Ok().json(EmployeeView {
        approval: profile.approval_label().to_string(),
        profile,
        documents,
    }))
}
