use crate::api::draft::{DraftChanges, DraftView, FieldChange, PassbookResult};
use crate::api::employee::{EmployeeGrid, EmployeeQuery, EmployeeRow, EmployeeView, SlotPreview};
use crate::api::holiday::{AddHolidays, HolidayPage, HolidayQuery, StatusCounts};
use crate::client::holidays::HolidayBatchOutcome;
use crate::extraction::ExtractionOutcome;
use crate::extraction::candidates::Candidate;
use crate::form::{DocumentSlot, EmployeeForm, Field, FieldIssue};
use crate::model::employee::EmployeeProfile;
use crate::model::holiday::{HolidayRecord, HolidayStatus, HolidayType, NewHoliday};
use crate::utils::document::{DocumentKind, DocumentPreview, DocumentUpload};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ERP Admin API",
        version = "1.0.0",
        description = r#"
## ERP Admin Gateway

Staff-facing admin layer in front of the HR backend REST API.

### 🔹 Key Features
- **Employees**
  - Searchable employee grid, profile view with document previews, CSV export
- **Drafts**
  - Server-side add-employee and profile-editor forms with live validation
  - PAN, Aadhaar, bank account and IFSC confirmation checks
- **Passbook OCR**
  - Extract account number, IFSC code and bank name from a passbook photo
- **Holidays**
  - Year view with filters, batch submission for MD approval, deletion

### 🔐 Security
All `/admin` endpoints require an HR or Admin **JWT access token** issued by the HR backend.

### 📦 Fallback
When the HR backend is unreachable, read endpoints serve sample data and flag it with `offline: true`.

---
Built with **Rust**, **Actix Web**, **reqwest**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::list_employees,
        crate::api::employee::export_employees,
        crate::api::employee::get_employee,

        crate::api::draft::create_draft,
        crate::api::draft::create_edit_draft,
        crate::api::draft::get_draft,
        crate::api::draft::update_draft,
        crate::api::draft::delete_draft,
        crate::api::draft::put_document,
        crate::api::draft::get_document,
        crate::api::draft::draft_passbook,
        crate::api::draft::submit_draft,

        crate::api::passbook::extract_passbook,

        crate::api::holiday::list_holidays,
        crate::api::holiday::add_holidays,
        crate::api::holiday::delete_holiday
    ),
    components(
        schemas(
            EmployeeQuery,
            EmployeeRow,
            EmployeeGrid,
            EmployeeView,
            SlotPreview,
            EmployeeProfile,
            DraftView,
            DraftChanges,
            FieldChange,
            PassbookResult,
            EmployeeForm,
            Field,
            FieldIssue,
            DocumentSlot,
            DocumentUpload,
            DocumentPreview,
            DocumentKind,
            ExtractionOutcome,
            Candidate,
            HolidayQuery,
            HolidayPage,
            StatusCounts,
            AddHolidays,
            NewHoliday,
            HolidayRecord,
            HolidayType,
            HolidayStatus,
            HolidayBatchOutcome
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Employee", description = "Employee grid, profile and export APIs"),
        (name = "Draft", description = "Employee form draft APIs"),
        (name = "Passbook", description = "Passbook OCR APIs"),
        (name = "Holiday", description = "Holiday management APIs"),
    )
)]
pub struct ApiDoc;

pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
