use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

pub const PREDEFINED_BANK_NAMES: &[&str] = &[
    "HDFC Bank",
    "State Bank of India",
    "Punjab National Bank",
    "ICICI Bank",
];

pub const PREDEFINED_DEPARTMENTS: &[&str] = &[
    "Human Resources",
    "IT",
    "Finance",
    "Operations",
    "Marketing",
    "Sales",
    "Admin",
    "Research and Development",
];

pub const PREDEFINED_DESIGNATIONS: &[&str] = &[
    "Software Engineer",
    "Senior Software Engineer",
    "Tech Lead",
    "Project Manager",
    "Business Analyst",
    "QA Engineer",
    "HR Manager",
    "Sales Executive",
    "Marketing Specialist",
    "Operations Manager",
    "Accountant",
    "Admin Executive",
];

pub const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Select value that switches a dropdown to its free-text companion field.
pub const OTHERS: &str = "Others";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, AsRefStr)]
pub enum EmploymentStatus {
    Active,
    Absconded,
    Resigned,
    Terminated,
    Others,
}

impl EmploymentStatus {
    /// Active (or unset) employees carry no discontinuity reason.
    pub fn clears_reason(value: &str) -> bool {
        value.is_empty() || value == EmploymentStatus::Active.as_ref()
    }
}

/// Employee record as stored by the HR backend (`/api/user-profiles`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[schema(example = json!({
    "srNo": 1,
    "employeeSerialNumber": "EMP001",
    "employeeName": "John Doe",
    "emailAddress": "john.doe@example.com",
    "department": "IT",
    "designation": "Software Engineer",
    "dateOfJoining": "2023-01-15",
    "grossSalary": 75000,
    "bankAccountNumber": "1234567890",
    "ifscCode": "HDFC0001234",
    "bankName": "HDFC Bank",
    "status": "N",
    "employmentStatus": "Active",
    "reasonForDiscontinuity": ""
}))]
pub struct EmployeeProfile {
    pub sr_no: Option<u64>,
    pub employee_serial_number: Option<String>,
    pub employee_name: Option<String>,
    pub emergency_contact_number: Option<String>,
    pub address: Option<String>,
    pub email_address: Option<String>,
    pub qualification: Option<String>,
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub date_of_joining: Option<String>,
    pub date_of_birth: Option<String>,
    pub designation: Option<String>,
    pub department: Option<String>,
    pub reporting_officer: Option<String>,
    pub gross_salary: Option<f64>,
    pub bank_account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub bank_name: Option<String>,
    pub medical_background: Option<String>,
    pub legal_background: Option<String>,
    pub pan: Option<String>,
    pub adhaar: Option<String>,
    pub personal_file_number: Option<String>,

    // base64 documents
    pub photo: Option<String>,
    pub pan_file: Option<String>,
    pub adhaar_file: Option<String>,
    pub passbook_file: Option<String>,
    pub qualification_document: Option<String>,
    pub offer_letter_document: Option<String>,
    pub address_proof_document: Option<String>,
    pub medical_background_document: Option<String>,
    pub legal_background_document: Option<String>,

    /// Approval status: `Y` approved, anything else pending.
    #[schema(example = "N")]
    pub status: Option<String>,
    #[schema(example = "Active")]
    pub employment_status: Option<String>,
    pub reason_for_discontinuity: Option<String>,
}

impl EmployeeProfile {
    pub fn is_approved(&self) -> bool {
        self.status.as_deref() == Some("Y")
    }

    pub fn approval_label(&self) -> &'static str {
        if self.is_approved() { "Approved" } else { "Pending" }
    }

    /// Clears the discontinuity reason when the employment status does not allow one.
    pub fn enforce_reason_invariant(&mut self) {
        let status = self.employment_status.as_deref().unwrap_or_default();
        if EmploymentStatus::clears_reason(status) {
            self.reason_for_discontinuity = Some(String::new());
        }
    }

    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [
            &self.employee_name,
            &self.employee_serial_number,
            &self.email_address,
            &self.designation,
            &self.department,
        ]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&term))
    }
}
