use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
    EnumIter, AsRefStr, ToSchema,
)]
pub enum HolidayType {
    #[default]
    National,
    Local,
    Election,
    #[serde(rename = "Bank holiday")]
    #[strum(serialize = "Bank holiday")]
    BankHoliday,
    Regional,
    Religious,
    Cultural,
    Festival,
    Others,
}

impl HolidayType {
    /// Upstream types outside the known set are shown as `Others`.
    pub fn from_upstream(value: &str) -> Self {
        HolidayType::from_str(value).unwrap_or(HolidayType::Others)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
    AsRefStr, ToSchema,
)]
pub enum HolidayStatus {
    #[serde(rename = "Holiday Approved")]
    #[strum(serialize = "Holiday Approved")]
    Approved,
    #[serde(rename = "Pending Approval")]
    #[strum(serialize = "Pending Approval")]
    Pending,
    Rejected,
    Unknown,
}

impl HolidayStatus {
    /// Maps the MD approval flag (`Y`/`N`/`R`) used by the HR backend.
    pub fn from_md_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("Y") => HolidayStatus::Approved,
            Some("N") => HolidayStatus::Pending,
            Some("R") => HolidayStatus::Rejected,
            _ => HolidayStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Republic Day")]
    pub name: String,
    #[schema(example = "2025-01-26", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub holiday_type: HolidayType,
    #[schema(example = 2025)]
    pub year: i32,
    pub description: String,
    pub status: HolidayStatus,
    pub created_by: Option<String>,
    pub created_date: Option<String>,
    pub approved_by: Option<String>,
    pub approved_date: Option<String>,
    pub rejection_reason: Option<String>,
}

impl HolidayRecord {
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }
}

/// One row of the add-holiday form. The form's optional-holiday flag has no
/// upstream column and is dropped on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct NewHoliday {
    #[schema(example = "Diwali")]
    pub holiday_name: String,
    #[schema(example = "2025-10-20")]
    pub holiday_date: String,
    pub holiday_type: HolidayType,
    pub description: String,
}

impl NewHoliday {
    /// Name, date and description are all required before a row is sent.
    pub fn is_complete(&self) -> bool {
        !self.holiday_name.trim().is_empty()
            && !self.holiday_date.trim().is_empty()
            && !self.description.trim().is_empty()
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.holiday_date.trim(), "%Y-%m-%d").ok()
    }

    /// Year derived from the holiday date.
    pub fn year(&self) -> Option<i32> {
        self.parsed_date().map(|d| d.year())
    }
}

/// Sample holidays shown when the HR backend cannot be reached.
pub fn sample_holidays() -> Vec<HolidayRecord> {
    fn record(
        id: u64,
        name: &str,
        date: (i32, u32, u32),
        holiday_type: HolidayType,
        description: &str,
        status: HolidayStatus,
        audit: (&str, &str, Option<(&str, &str)>, Option<&str>),
    ) -> HolidayRecord {
        let (created_by, created_date, approval, rejection_reason) = audit;
        HolidayRecord {
            id,
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
            holiday_type,
            year: date.0,
            description: description.to_string(),
            status,
            created_by: Some(created_by.to_string()),
            created_date: Some(created_date.to_string()),
            approved_by: approval.map(|(by, _)| by.to_string()),
            approved_date: approval.map(|(_, on)| on.to_string()),
            rejection_reason: rejection_reason.map(str::to_string),
        }
    }

    vec![
        record(
            1,
            "New Year's Day",
            (2025, 1, 1),
            HolidayType::National,
            "Beginning of the new calendar year",
            HolidayStatus::Approved,
            ("Admin", "2024-12-01", Some(("MD", "2024-12-05")), None),
        ),
        record(
            2,
            "Republic Day",
            (2025, 1, 26),
            HolidayType::National,
            "Celebrates the adoption of Constitution of India",
            HolidayStatus::Approved,
            ("Admin", "2024-12-01", Some(("MD", "2024-12-05")), None),
        ),
        record(
            3,
            "Holi",
            (2025, 3, 14),
            HolidayType::Religious,
            "Festival of colors",
            HolidayStatus::Pending,
            ("HR", "2024-12-10", None, None),
        ),
        record(
            4,
            "Good Friday",
            (2025, 4, 18),
            HolidayType::Religious,
            "Christian holiday commemorating crucifixion of Jesus",
            HolidayStatus::Rejected,
            (
                "HR",
                "2024-12-08",
                Some(("MD", "2024-12-12")),
                Some("Already have enough holidays in April"),
            ),
        ),
    ]
}
