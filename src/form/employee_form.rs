use std::collections::BTreeMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::fields::{Field, FieldPath};
use crate::model::employee::{
    EmployeeProfile, EmploymentStatus, OTHERS, PREDEFINED_BANK_NAMES, PREDEFINED_DEPARTMENTS,
    PREDEFINED_DESIGNATIONS,
};
use crate::utils::validation::{
    Confirmation, validate_aadhaar, validate_confirmation, validate_pan,
};

const NOT_SPECIFIED: &str = "Not Specified";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldIssue {
    pub field: Field,
    pub message: String,
}

impl FieldIssue {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum FormError {
    #[display(fmt = "Unknown form field: {}", _0)]
    UnknownField(String),
}

impl std::error::Error for FormError {}

/// Flat, text-valued state of the add-employee form and the profile editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeForm {
    pub employee_serial_number: String,
    pub first_name: String,
    pub surname: String,
    pub employee_name: String,
    pub emergency_contact_number: String,
    pub address: String,
    pub email_address: String,
    pub qualification: String,
    pub blood_group: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub date_of_joining: String,
    pub date_of_birth: String,
    pub designation: String,
    pub other_designation: String,
    pub department: String,
    pub other_department: String,
    pub reporting_officer: String,
    pub gross_salary: String,
    pub bank_account_number: String,
    pub confirm_bank_account_number: String,
    pub ifsc_code: String,
    pub confirm_ifsc_code: String,
    pub bank_name: String,
    pub other_bank_name: String,
    pub medical_background: String,
    pub legal_background: String,
    pub pan: String,
    pub adhaar: String,
    pub personal_file_number: String,
    pub employment_status: String,
    pub reason_for_discontinuity: String,

    /// One level of `parent.child` sub-records.
    pub nested: BTreeMap<String, BTreeMap<String, String>>,

    /// Live field errors, keyed by the input that shows them.
    pub issues: BTreeMap<Field, String>,
}

impl EmployeeForm {
    /// Blank add-employee form.
    pub fn new() -> Self {
        Self {
            employment_status: EmploymentStatus::Active.to_string(),
            ..Default::default()
        }
    }

    /// Seeds the profile editor from a stored profile.
    ///
    /// Values outside the predefined bank/department/designation lists move into the
    /// matching `other*` field with the select set to "Others". Unknown employment
    /// statuses become "Others" and carry the original value as the reason when no
    /// reason is recorded. Confirmation inputs start empty.
    pub fn from_profile(profile: &EmployeeProfile) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        let (bank_name, other_bank_name) =
            split_others(&text(&profile.bank_name), PREDEFINED_BANK_NAMES);
        let (department, other_department) =
            split_others(&text(&profile.department), PREDEFINED_DEPARTMENTS);
        let (designation, other_designation) =
            split_others(&text(&profile.designation), PREDEFINED_DESIGNATIONS);

        let mut employment_status = text(&profile.employment_status);
        let mut reason = text(&profile.reason_for_discontinuity);
        if !employment_status.is_empty()
            && employment_status.parse::<EmploymentStatus>().is_err()
        {
            if reason.is_empty() || reason == employment_status {
                reason = employment_status.clone();
            }
            employment_status = EmploymentStatus::Others.to_string();
        }

        Self {
            employee_serial_number: text(&profile.employee_serial_number),
            employee_name: text(&profile.employee_name),
            emergency_contact_number: text(&profile.emergency_contact_number),
            address: text(&profile.address),
            email_address: text(&profile.email_address),
            qualification: text(&profile.qualification),
            blood_group: text(&profile.blood_group),
            date_of_joining: text(&profile.date_of_joining),
            date_of_birth: text(&profile.date_of_birth),
            designation,
            other_designation,
            department,
            other_department,
            reporting_officer: text(&profile.reporting_officer),
            gross_salary: profile.gross_salary.map(format_salary).unwrap_or_default(),
            bank_account_number: text(&profile.bank_account_number),
            ifsc_code: text(&profile.ifsc_code),
            bank_name,
            other_bank_name,
            medical_background: text(&profile.medical_background),
            legal_background: text(&profile.legal_background),
            pan: text(&profile.pan),
            adhaar: text(&profile.adhaar),
            personal_file_number: text(&profile.personal_file_number),
            employment_status,
            reason_for_discontinuity: reason,
            ..Default::default()
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::EmployeeSerialNumber => &self.employee_serial_number,
            Field::FirstName => &self.first_name,
            Field::Surname => &self.surname,
            Field::EmployeeName => &self.employee_name,
            Field::EmergencyContactNumber => &self.emergency_contact_number,
            Field::Address => &self.address,
            Field::EmailAddress => &self.email_address,
            Field::Qualification => &self.qualification,
            Field::BloodGroup => &self.blood_group,
            Field::Password => &self.password,
            Field::DateOfJoining => &self.date_of_joining,
            Field::DateOfBirth => &self.date_of_birth,
            Field::Designation => &self.designation,
            Field::OtherDesignation => &self.other_designation,
            Field::Department => &self.department,
            Field::OtherDepartment => &self.other_department,
            Field::ReportingOfficer => &self.reporting_officer,
            Field::GrossSalary => &self.gross_salary,
            Field::BankAccountNumber => &self.bank_account_number,
            Field::ConfirmBankAccountNumber => &self.confirm_bank_account_number,
            Field::IfscCode => &self.ifsc_code,
            Field::ConfirmIfscCode => &self.confirm_ifsc_code,
            Field::BankName => &self.bank_name,
            Field::OtherBankName => &self.other_bank_name,
            Field::MedicalBackground => &self.medical_background,
            Field::LegalBackground => &self.legal_background,
            Field::Pan => &self.pan,
            Field::Adhaar => &self.adhaar,
            Field::PersonalFileNumber => &self.personal_file_number,
            Field::EmploymentStatus => &self.employment_status,
            Field::ReasonForDiscontinuity => &self.reason_for_discontinuity,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::EmployeeSerialNumber => &mut self.employee_serial_number,
            Field::FirstName => &mut self.first_name,
            Field::Surname => &mut self.surname,
            Field::EmployeeName => &mut self.employee_name,
            Field::EmergencyContactNumber => &mut self.emergency_contact_number,
            Field::Address => &mut self.address,
            Field::EmailAddress => &mut self.email_address,
            Field::Qualification => &mut self.qualification,
            Field::BloodGroup => &mut self.blood_group,
            Field::Password => &mut self.password,
            Field::DateOfJoining => &mut self.date_of_joining,
            Field::DateOfBirth => &mut self.date_of_birth,
            Field::Designation => &mut self.designation,
            Field::OtherDesignation => &mut self.other_designation,
            Field::Department => &mut self.department,
            Field::OtherDepartment => &mut self.other_department,
            Field::ReportingOfficer => &mut self.reporting_officer,
            Field::GrossSalary => &mut self.gross_salary,
            Field::BankAccountNumber => &mut self.bank_account_number,
            Field::ConfirmBankAccountNumber => &mut self.confirm_bank_account_number,
            Field::IfscCode => &mut self.ifsc_code,
            Field::ConfirmIfscCode => &mut self.confirm_ifsc_code,
            Field::BankName => &mut self.bank_name,
            Field::OtherBankName => &mut self.other_bank_name,
            Field::MedicalBackground => &mut self.medical_background,
            Field::LegalBackground => &mut self.legal_background,
            Field::Pan => &mut self.pan,
            Field::Adhaar => &mut self.adhaar,
            Field::PersonalFileNumber => &mut self.personal_file_number,
            Field::EmploymentStatus => &mut self.employment_status,
            Field::ReasonForDiscontinuity => &mut self.reason_for_discontinuity,
        }
    }

    /// Applies one input change by name.
    pub fn apply_named(&mut self, name: &str, value: &str) -> Result<(), FormError> {
        match FieldPath::parse(name) {
            Some(FieldPath::Flat(field)) => {
                self.apply(field, value);
                Ok(())
            }
            Some(FieldPath::Nested { parent, child }) => {
                self.nested.entry(parent).or_default().insert(child, value.to_string());
                Ok(())
            }
            None => Err(FormError::UnknownField(name.to_string())),
        }
    }

    /// Reducer for a single field change: stores the value, clears dependent
    /// fields and refreshes the live error of the affected input.
    pub fn apply(&mut self, field: Field, value: &str) {
        let value = match field {
            Field::Pan => value.to_uppercase(),
            _ => value.to_string(),
        };
        *self.slot_mut(field) = value;

        match field {
            Field::Department if self.department != OTHERS => self.other_department.clear(),
            Field::Designation if self.designation != OTHERS => self.other_designation.clear(),
            Field::BankName if self.bank_name != OTHERS => self.other_bank_name.clear(),
            Field::EmploymentStatus if EmploymentStatus::clears_reason(&self.employment_status) => {
                self.reason_for_discontinuity.clear()
            }
            _ => {}
        }

        self.refresh_issue(field);
    }

    fn refresh_issue(&mut self, field: Field) {
        let (shown_on, result) = match field {
            Field::Pan => (Field::Pan, check_non_empty(&self.pan, validate_pan)),
            Field::Adhaar => (Field::Adhaar, check_non_empty(&self.adhaar, validate_aadhaar)),
            Field::BankAccountNumber | Field::ConfirmBankAccountNumber => (
                Field::ConfirmBankAccountNumber,
                self.live_confirmation(Confirmation::BankAccount),
            ),
            Field::IfscCode | Field::ConfirmIfscCode => {
                (Field::ConfirmIfscCode, self.live_confirmation(Confirmation::Ifsc))
            }
            _ => return,
        };

        match result {
            Ok(()) => {
                self.issues.remove(&shown_on);
            }
            Err(message) => {
                self.issues.insert(shown_on, message.to_string());
            }
        }
    }

    fn confirmation_pair(&self, kind: Confirmation) -> (&str, &str) {
        match kind {
            Confirmation::BankAccount => {
                (&self.bank_account_number, &self.confirm_bank_account_number)
            }
            Confirmation::Ifsc => (&self.ifsc_code, &self.confirm_ifsc_code),
        }
    }

    /// Mismatches are only shown once something has been typed into the confirmation.
    fn live_confirmation(&self, kind: Confirmation) -> Result<(), &'static str> {
        let (original, confirmation) = self.confirmation_pair(kind);
        if confirmation.is_empty() {
            return Ok(());
        }
        validate_confirmation(kind, original, confirmation)
    }

    /// Fills banking fields from a passbook extraction, as if typed by the user.
    pub fn apply_bank_details(
        &mut self,
        account_number: Option<&str>,
        ifsc_code: Option<&str>,
        bank_name: Option<&str>,
    ) {
        if let Some(account) = account_number {
            self.apply(Field::BankAccountNumber, account);
        }
        if let Some(ifsc) = ifsc_code {
            self.apply(Field::IfscCode, ifsc);
        }
        if let Some(bank) = bank_name {
            if PREDEFINED_BANK_NAMES.contains(&bank) {
                self.apply(Field::BankName, bank);
            } else {
                self.apply(Field::BankName, OTHERS);
                self.apply(Field::OtherBankName, bank);
            }
        }
    }

    /// Submission gate shared by both forms. `require_identity` adds the add-form
    /// checks on serial number and name.
    pub fn validate_for_submit(&self, require_identity: bool) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Vec::new();

        if require_identity {
            if self.employee_serial_number.trim().is_empty() {
                issues.push(FieldIssue::new(
                    Field::EmployeeSerialNumber,
                    "Employee Serial Number is required",
                ));
            }
            if self.first_name.trim().is_empty() || self.surname.trim().is_empty() {
                issues.push(FieldIssue::new(
                    Field::FirstName,
                    "First Name and Surname are required",
                ));
            }
        }

        if let Err(message) = check_non_empty(&self.pan, validate_pan) {
            issues.push(FieldIssue::new(Field::Pan, message));
        }
        if let Err(message) = check_non_empty(&self.adhaar, validate_aadhaar) {
            issues.push(FieldIssue::new(Field::Adhaar, message));
        }

        for (kind, field) in [
            (Confirmation::BankAccount, Field::ConfirmBankAccountNumber),
            (Confirmation::Ifsc, Field::ConfirmIfscCode),
        ] {
            let (original, confirmation) = self.confirmation_pair(kind);
            if original.is_empty() {
                continue;
            }
            if let Err(message) = validate_confirmation(kind, original, confirmation) {
                issues.push(FieldIssue::new(field, message));
            }
        }

        let salary = self.gross_salary.trim();
        if !salary.is_empty() && salary.parse::<f64>().is_err() {
            issues.push(FieldIssue::new(Field::GrossSalary, "Gross salary must be a number"));
        }

        if issues.is_empty() { Ok(()) } else { Err(issues) }
    }

    /// Payload for `/user-profiles/save`. Approval status always starts as pending.
    pub fn to_new_profile(&self) -> EmployeeProfile {
        let employee_name = format!("{} {}", self.first_name.trim(), self.surname.trim());
        let mut profile = EmployeeProfile {
            employee_serial_number: non_empty(&self.employee_serial_number),
            employee_name: non_empty(employee_name.trim()),
            password: non_empty(&self.password),
            department: resolve_others(&self.department, &self.other_department, None),
            designation: resolve_others(&self.designation, &self.other_designation, None),
            bank_name: resolve_others(&self.bank_name, &self.other_bank_name, None),
            status: Some("N".to_string()),
            ..Default::default()
        };
        self.write_common(&mut profile);
        profile
    }

    /// Payload for `/user-profiles/update/{srNo}`: the stored profile overlaid with the edits.
    pub fn to_updated_profile(&self, base: &EmployeeProfile) -> EmployeeProfile {
        let mut profile = base.clone();
        profile.employee_serial_number = non_empty(&self.employee_serial_number);
        profile.employee_name = non_empty(&self.employee_name);
        profile.department =
            resolve_others(&self.department, &self.other_department, Some(NOT_SPECIFIED));
        profile.designation =
            resolve_others(&self.designation, &self.other_designation, Some(NOT_SPECIFIED));
        profile.bank_name =
            resolve_others(&self.bank_name, &self.other_bank_name, Some(NOT_SPECIFIED));
        self.write_common(&mut profile);
        profile
    }

    fn write_common(&self, profile: &mut EmployeeProfile) {
        profile.emergency_contact_number = non_empty(&self.emergency_contact_number);
        profile.address = non_empty(&self.address);
        profile.email_address = non_empty(&self.email_address);
        profile.qualification = non_empty(&self.qualification);
        profile.blood_group = non_empty(&self.blood_group);
        profile.date_of_joining = non_empty(&self.date_of_joining);
        profile.date_of_birth = non_empty(&self.date_of_birth);
        profile.reporting_officer = non_empty(&self.reporting_officer);
        profile.gross_salary = self.gross_salary.trim().parse().ok();
        profile.bank_account_number = non_empty(&self.bank_account_number);
        profile.ifsc_code = non_empty(&self.ifsc_code.to_uppercase());
        profile.medical_background = non_empty(&self.medical_background);
        profile.legal_background = non_empty(&self.legal_background);
        profile.pan = non_empty(&self.pan.to_uppercase());
        profile.adhaar = non_empty(&self.adhaar.split_whitespace().collect::<String>());
        profile.personal_file_number = non_empty(&self.personal_file_number);
        profile.employment_status = Some(self.employment_status.clone());
        profile.reason_for_discontinuity = Some(self.reason_for_discontinuity.clone());
        profile.enforce_reason_invariant();
    }
}

fn check_non_empty<F>(value: &str, check: F) -> Result<(), &'static str>
where
    F: Fn(&str) -> Result<String, &'static str>,
{
    if value.is_empty() { Ok(()) } else { check(value).map(|_| ()) }
}

fn split_others(value: &str, predefined: &[&str]) -> (String, String) {
    if value.is_empty() || predefined.contains(&value) || value == OTHERS {
        (value.to_string(), String::new())
    } else {
        (OTHERS.to_string(), value.to_string())
    }
}

fn resolve_others(selected: &str, other: &str, fallback: Option<&str>) -> Option<String> {
    if selected == OTHERS {
        non_empty(other).or_else(|| fallback.map(str::to_string))
    } else {
        non_empty(selected)
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

fn format_salary(value: f64) -> String {
    if value.fract() == 0.0 { format!("{value:.0}") } else { value.to_string() }
}
