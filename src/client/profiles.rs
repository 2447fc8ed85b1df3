use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use utoipa::ToSchema;

use super::{ApiError, RequestOptions, UpstreamClient};
use crate::form::DocumentSlot;
use crate::model::employee::EmployeeProfile;
use crate::utils::document::DocumentUpload;

const ALL_PATH: &str = "/user-profiles/all";
const SAVE_PATH: &str = "/user-profiles/save";

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListing {
    pub employees: Vec<EmployeeProfile>,
    pub offline: bool,
    pub notice: Option<String>,
}

impl UpstreamClient {
    pub async fn list_profiles(&self) -> Result<Vec<EmployeeProfile>, ApiError> {
        self.json(self.http().get(self.url(ALL_PATH)), RequestOptions::default()).await
    }

    /// Falls back to the sample employees when the backend cannot be read.
    pub async fn profiles_or_sample(&self) -> EmployeeListing {
        match self.list_profiles().await {
            Ok(employees) => EmployeeListing { employees, offline: false, notice: None },
            Err(e) => {
                error!(error = %e, "Failed to fetch employees, serving sample data");
                EmployeeListing {
                    employees: sample_profiles(),
                    offline: true,
                    notice: Some(format!(
                        "Failed to fetch employees: {e}. Displaying fallback data."
                    )),
                }
            }
        }
    }

    pub async fn find_profile(&self, sr_no: u64) -> Result<Option<EmployeeProfile>, ApiError> {
        let profiles = self.list_profiles().await?;
        Ok(profiles.into_iter().find(|p| p.sr_no == Some(sr_no)))
    }

    /// Multipart create: the profile as a `userProfile` JSON part plus one part per document.
    pub async fn save_profile(
        &self,
        profile: &EmployeeProfile,
        documents: &BTreeMap<DocumentSlot, DocumentUpload>,
    ) -> Result<Value, ApiError> {
        let json = serde_json::to_string(profile).map_err(|e| ApiError::Request(e.to_string()))?;
        let mut form = Form::new().part(
            "userProfile",
            Part::text(json)
                .mime_str("application/json")
                .map_err(|e| ApiError::Request(e.to_string()))?,
        );

        for (slot, upload) in documents {
            let bytes = upload.decode().map_err(|e| ApiError::Request(e.to_string()))?;
            let mime = if upload.content_type.is_empty() {
                "application/octet-stream"
            } else {
                upload.content_type.as_str()
            };
            let part = Part::bytes(bytes)
                .file_name(upload.file_name.clone())
                .mime_str(mime)
                .map_err(|e| ApiError::Request(e.to_string()))?;
            form = form.part(slot.part_name(), part);
        }

        info!(
            employee = profile.employee_serial_number.as_deref().unwrap_or_default(),
            documents = documents.len(),
            "Saving employee profile"
        );
        let request = self.http().post(self.url(SAVE_PATH)).multipart(form);
        self.json(request, RequestOptions::default()).await
    }

    pub async fn update_profile(
        &self,
        sr_no: u64,
        profile: &EmployeeProfile,
    ) -> Result<Value, ApiError> {
        info!(sr_no, "Updating employee profile");
        let request = self
            .http()
            .put(self.url(&format!("/user-profiles/update/{sr_no}")))
            .json(profile);
        self.json(request, RequestOptions::default()).await
    }
}

/// Employees shown when the backend cannot be reached.
pub fn sample_profiles() -> Vec<EmployeeProfile> {
    let text = |v: &str| Some(v.to_string());
    vec![
        EmployeeProfile {
            sr_no: Some(1),
            employee_serial_number: text("EMP001"),
            employee_name: text("John Doe"),
            emergency_contact_number: text("+1-555-123-4567"),
            address: text("123 Main Street, Springfield, USA"),
            email_address: text("john.doe@example.com"),
            qualification: text("Bachelor's in Computer Science"),
            date_of_joining: text("2023-01-15"),
            designation: text("Software Engineer"),
            department: text("IT"),
            reporting_officer: text("Jane Smith"),
            gross_salary: Some(75000.0),
            bank_account_number: text("1234567890"),
            ifsc_code: text("HDFC0001234"),
            bank_name: text("HDFC Bank"),
            medical_background: text("No known allergies"),
            legal_background: text("Clean record"),
            pan: text("ABCDE1234F"),
            adhaar: text("123456789012"),
            personal_file_number: text("PF001"),
            status: text("Y"),
            employment_status: text("Active"),
            reason_for_discontinuity: text(""),
            ..Default::default()
        },
        EmployeeProfile {
            sr_no: Some(2),
            employee_serial_number: text("EMP002"),
            employee_name: text("Jane Smith"),
            emergency_contact_number: text("+1-555-987-6543"),
            address: text("456 Oak Avenue, Springfield, USA"),
            email_address: text("jane.smith@example.com"),
            qualification: text("Master's in Business Administration"),
            date_of_joining: text("2022-03-20"),
            designation: text("Project Manager"),
            department: text("Operations"),
            reporting_officer: text("Robert Johnson"),
            gross_salary: Some(85000.0),
            bank_account_number: text("0987654321"),
            ifsc_code: text("SBIN0001234"),
            bank_name: text("Custom Bank of Springfield"),
            medical_background: text("Diabetes - Type 2"),
            legal_background: text("Clean record"),
            pan: text("FGHIJ5678K"),
            adhaar: text("210987654321"),
            personal_file_number: text("PF002"),
            status: text("N"),
            employment_status: text("Resigned"),
            reason_for_discontinuity: text("Moving to another city."),
            ..Default::default()
        },
    ]
}
