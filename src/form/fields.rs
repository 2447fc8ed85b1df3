use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::employee::EmployeeProfile;

/// Every editable input of the employee forms.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    EmployeeSerialNumber,
    FirstName,
    Surname,
    EmployeeName,
    EmergencyContactNumber,
    Address,
    EmailAddress,
    Qualification,
    BloodGroup,
    Password,
    DateOfJoining,
    DateOfBirth,
    Designation,
    OtherDesignation,
    Department,
    OtherDepartment,
    ReportingOfficer,
    GrossSalary,
    BankAccountNumber,
    ConfirmBankAccountNumber,
    IfscCode,
    ConfirmIfscCode,
    BankName,
    OtherBankName,
    MedicalBackground,
    LegalBackground,
    Pan,
    Adhaar,
    PersonalFileNumber,
    EmploymentStatus,
    ReasonForDiscontinuity,
}

/// Input name → field. Includes the aliases the profile editor used for its
/// confirmation inputs.
const FIELD_TABLE: &[(&str, Field)] = &[
    ("employeeSerialNumber", Field::EmployeeSerialNumber),
    ("firstName", Field::FirstName),
    ("surname", Field::Surname),
    ("employeeName", Field::EmployeeName),
    ("emergencyContactNumber", Field::EmergencyContactNumber),
    ("address", Field::Address),
    ("emailAddress", Field::EmailAddress),
    ("qualification", Field::Qualification),
    ("bloodGroup", Field::BloodGroup),
    ("password", Field::Password),
    ("dateOfJoining", Field::DateOfJoining),
    ("dateOfBirth", Field::DateOfBirth),
    ("designation", Field::Designation),
    ("otherDesignation", Field::OtherDesignation),
    ("department", Field::Department),
    ("otherDepartment", Field::OtherDepartment),
    ("reportingOfficer", Field::ReportingOfficer),
    ("grossSalary", Field::GrossSalary),
    ("bankAccountNumber", Field::BankAccountNumber),
    ("confirmBankAccountNumber", Field::ConfirmBankAccountNumber),
    ("bankAccountNumberConfirmation", Field::ConfirmBankAccountNumber),
    ("ifscCode", Field::IfscCode),
    ("confirmIfscCode", Field::ConfirmIfscCode),
    ("confirmIFSCCode", Field::ConfirmIfscCode),
    ("ifscCodeConfirmation", Field::ConfirmIfscCode),
    ("bankName", Field::BankName),
    ("otherBankName", Field::OtherBankName),
    ("medicalBackground", Field::MedicalBackground),
    ("legalBackground", Field::LegalBackground),
    ("pan", Field::Pan),
    ("adhaar", Field::Adhaar),
    ("personalFileNumber", Field::PersonalFileNumber),
    ("employmentStatus", Field::EmploymentStatus),
    ("reasonForDiscontinuity", Field::ReasonForDiscontinuity),
];

impl Field {
    pub fn from_name(name: &str) -> Option<Field> {
        FIELD_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, field)| *field)
    }
}

/// Where an input change lands: a top-level field or one level of `parent.child` nesting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPath {
    Flat(Field),
    Nested { parent: String, child: String },
}

impl FieldPath {
    pub fn parse(name: &str) -> Option<FieldPath> {
        match name.split_once('.') {
            Some((parent, child)) => {
                let valid = |part: &str| {
                    !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                };
                (valid(parent) && valid(child)).then(|| FieldPath::Nested {
                    parent: parent.to_string(),
                    child: child.to_string(),
                })
            }
            None => Field::from_name(name).map(FieldPath::Flat),
        }
    }
}

/// Upload slots for employee documents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum DocumentSlot {
    Photo,
    PanFile,
    AdhaarFile,
    PassbookFile,
    AddressProof,
    OfferLetter,
    Qualification,
    MedicalBackground,
    LegalBackground,
}

impl DocumentSlot {
    pub const ALL: [DocumentSlot; 9] = [
        DocumentSlot::Photo,
        DocumentSlot::PanFile,
        DocumentSlot::AdhaarFile,
        DocumentSlot::PassbookFile,
        DocumentSlot::AddressProof,
        DocumentSlot::OfferLetter,
        DocumentSlot::Qualification,
        DocumentSlot::MedicalBackground,
        DocumentSlot::LegalBackground,
    ];

    /// Multipart part name expected by `/user-profiles/save`.
    pub fn part_name(self) -> &'static str {
        match self {
            DocumentSlot::Photo => "photo",
            DocumentSlot::PanFile => "panFile",
            DocumentSlot::AdhaarFile => "adhaarFile",
            DocumentSlot::PassbookFile => "passbookFile",
            DocumentSlot::AddressProof => "addressProofFile",
            DocumentSlot::OfferLetter => "offerLetter",
            DocumentSlot::Qualification => "qualificationDocument",
            DocumentSlot::MedicalBackground => "medicalBackground",
            DocumentSlot::LegalBackground => "legalBackground",
        }
    }

    /// Base64 column of a stored profile that holds this slot's document.
    pub fn stored<'a>(self, profile: &'a EmployeeProfile) -> Option<&'a str> {
        let value = match self {
            DocumentSlot::Photo => &profile.photo,
            DocumentSlot::PanFile => &profile.pan_file,
            DocumentSlot::AdhaarFile => &profile.adhaar_file,
            DocumentSlot::PassbookFile => &profile.passbook_file,
            DocumentSlot::AddressProof => &profile.address_proof_document,
            DocumentSlot::OfferLetter => &profile.offer_letter_document,
            DocumentSlot::Qualification => &profile.qualification_document,
            DocumentSlot::MedicalBackground => &profile.medical_background_document,
            DocumentSlot::LegalBackground => &profile.legal_background_document,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn store(self, profile: &mut EmployeeProfile, base64: String) {
        let slot = match self {
            DocumentSlot::Photo => &mut profile.photo,
            DocumentSlot::PanFile => &mut profile.pan_file,
            DocumentSlot::AdhaarFile => &mut profile.adhaar_file,
            DocumentSlot::PassbookFile => &mut profile.passbook_file,
            DocumentSlot::AddressProof => &mut profile.address_proof_document,
            DocumentSlot::OfferLetter => &mut profile.offer_letter_document,
            DocumentSlot::Qualification => &mut profile.qualification_document,
            DocumentSlot::MedicalBackground => &mut profile.medical_background_document,
            DocumentSlot::LegalBackground => &mut profile.legal_background_document,
        };
        *slot = Some(base64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_the_same_field() {
        assert_eq!(Field::from_name("confirmIFSCCode"), Some(Field::ConfirmIfscCode));
        assert_eq!(Field::from_name("ifscCodeConfirmation"), Some(Field::ConfirmIfscCode));
        assert_eq!(
            Field::from_name("bankAccountNumberConfirmation"),
            Some(Field::ConfirmBankAccountNumber)
        );
        assert_eq!(Field::from_name("salary"), None);
    }

    #[test]
    fn table_covers_every_serialized_name() {
        for (name, field) in FIELD_TABLE {
            let serialized = serde_json::to_value(field).unwrap();
            assert_eq!(Field::from_name(serialized.as_str().unwrap()), Some(*field), "{name}");
        }
    }

    #[test]
    fn dotted_names_nest_one_level() {
        assert_eq!(
            FieldPath::parse("emergency.relation"),
            Some(FieldPath::Nested { parent: "emergency".into(), child: "relation".into() })
        );
        assert_eq!(FieldPath::parse("pan"), Some(FieldPath::Flat(Field::Pan)));
        assert_eq!(FieldPath::parse("a.b.c"), None);
        assert_eq!(FieldPath::parse(".b"), None);
        assert_eq!(FieldPath::parse("unknown"), None);
    }

    #[test]
    fn stored_documents_round_trip_through_profile_columns() {
        let mut profile = EmployeeProfile::default();
        for slot in DocumentSlot::ALL {
            assert_eq!(slot.stored(&profile), None);
            slot.store(&mut profile, slot.part_name().to_string());
        }
        assert_eq!(DocumentSlot::OfferLetter.stored(&profile), Some("offerLetter"));
        assert_eq!(profile.address_proof_document.as_deref(), Some("addressProofFile"));
    }

    #[test]
    fn slots_deserialize_from_camel_case() {
        let slot: DocumentSlot = serde_json::from_str("\"addressProof\"").unwrap();
        assert_eq!(slot.part_name(), "addressProofFile");
    }
}
