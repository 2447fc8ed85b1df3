use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use super::{ApiError, RequestOptions, UpstreamClient};
use crate::model::holiday::{
    HolidayRecord, HolidayStatus, HolidayType, NewHoliday, sample_holidays,
};

pub const ALL_PATH: &str = "/holidays/all";

const BACKEND_DOWN_NOTICE: &str = "Backend server is not available. Showing sample data.";
const CANNOT_ADD: &str = "Backend server is not available. Cannot add holidays at this time.";
const CANNOT_DELETE: &str = "Backend server is not available. Cannot delete holidays at this time.";
const BATCH_ADDED: &str = "Holidays added successfully and sent for MD approval!";

/// `{success, data, message}` wrapper used by the holiday endpoints.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HolidayDto {
    holiday_id: u64,
    holiday_name: String,
    holiday_date: String,
    holiday_type: Option<String>,
    year: Option<i32>,
    description: Option<String>,
    md_approval_status: Option<String>,
    created_by: Option<String>,
    created_date: Option<String>,
    approved_by: Option<String>,
    approved_date: Option<String>,
    rejection_reason: Option<String>,
}

impl HolidayDto {
    fn into_record(self) -> Option<HolidayRecord> {
        let date = self
            .holiday_date
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())?;
        Some(HolidayRecord {
            id: self.holiday_id,
            name: self.holiday_name,
            date,
            holiday_type: self
                .holiday_type
                .as_deref()
                .map(HolidayType::from_upstream)
                .unwrap_or_default(),
            year: self.year.unwrap_or_else(|| chrono::Datelike::year(&date)),
            description: self.description.unwrap_or_default(),
            status: HolidayStatus::from_md_flag(self.md_approval_status.as_deref()),
            created_by: self.created_by,
            created_date: self.created_date,
            approved_by: self.approved_by,
            approved_date: self.approved_date,
            rejection_reason: self.rejection_reason,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddHolidayRequest<'a> {
    holiday_name: &'a str,
    holiday_date: &'a str,
    holiday_type: HolidayType,
    description: &'a str,
    year: Option<i32>,
}

/// Holidays plus whether they came from the sample set.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayListing {
    pub holidays: Vec<HolidayRecord>,
    pub offline: bool,
    pub notice: Option<String>,
}

impl HolidayListing {
    fn sample(year: Option<i32>, notice: &str) -> Self {
        let holidays = sample_holidays()
            .into_iter()
            .filter(|h| year.is_none_or(|y| h.year == y))
            .collect();
        Self { holidays, offline: true, notice: Some(notice.to_string()) }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayBatchOutcome {
    pub submitted: usize,
    pub added: usize,
    /// Backend messages for rows it refused.
    pub failures: Vec<String>,
    pub message: String,
}

#[derive(Debug, Display)]
pub enum HolidayBatchError {
    #[display(fmt = "Please fill in all required fields")]
    NothingToSubmit,

    #[display(fmt = "{} ({} added before the error)", source, added)]
    Interrupted { added: usize, source: ApiError },
}

impl std::error::Error for HolidayBatchError {}

impl UpstreamClient {
    /// All holidays, or one year's when `year` is given.
    pub async fn list_holidays(&self, year: Option<i32>) -> Result<Vec<HolidayRecord>, ApiError> {
        let path = match year {
            Some(year) => format!("/holidays/by-year/{year}"),
            None => ALL_PATH.to_string(),
        };
        let envelope: Envelope<Vec<HolidayDto>> =
            self.json(self.http().get(self.url(&path)), RequestOptions::default()).await?;

        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope.message.unwrap_or_else(|| "Failed to fetch holidays".to_string()),
            ));
        }

        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|dto| {
                let id = dto.holiday_id;
                let record = dto.into_record();
                if record.is_none() {
                    warn!(holiday_id = id, "Skipping holiday with an unreadable date");
                }
                record
            })
            .collect())
    }

    /// Probes first; any failure falls back to the sample holidays with a notice.
    pub async fn holidays_or_sample(&self, year: Option<i32>) -> HolidayListing {
        if let Err(e) = self.probe().await {
            warn!(error = %e, "Holiday backend unreachable, serving sample data");
            return HolidayListing::sample(year, BACKEND_DOWN_NOTICE);
        }

        match self.list_holidays(year).await {
            Ok(holidays) => HolidayListing { holidays, offline: false, notice: None },
            Err(e) => {
                error!(error = %e, "Failed to fetch holidays");
                HolidayListing::sample(year, e.fallback_notice())
            }
        }
    }

    pub async fn add_holiday(
        &self,
        holiday: &NewHoliday,
        created_by: &str,
    ) -> Result<Envelope<Value>, ApiError> {
        if self.probe().await.is_err() {
            return Err(ApiError::Unavailable(CANNOT_ADD));
        }

        let body = AddHolidayRequest {
            holiday_name: holiday.holiday_name.trim(),
            holiday_date: holiday.holiday_date.trim(),
            holiday_type: holiday.holiday_type,
            description: holiday.description.trim(),
            year: holiday.year(),
        };
        let request = self
            .http()
            .post(self.url("/holidays/add"))
            .query(&[("createdBy", created_by)])
            .json(&body);
        self.json(request, RequestOptions::default()).await
    }

    pub async fn delete_holiday(&self, id: u64) -> Result<Envelope<Value>, ApiError> {
        if self.probe().await.is_err() {
            return Err(ApiError::Unavailable(CANNOT_DELETE));
        }

        let envelope: Envelope<Value> = self
            .json(
                self.http().delete(self.url(&format!("/holidays/{id}"))),
                RequestOptions::default(),
            )
            .await?;
        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope.message.unwrap_or_else(|| "Failed to delete holiday".to_string()),
            ));
        }
        Ok(envelope)
    }

    /// Submits the complete rows one at a time, in order.
    pub async fn add_holidays(
        &self,
        rows: &[NewHoliday],
        created_by: &str,
    ) -> Result<HolidayBatchOutcome, HolidayBatchError> {
        let complete: Vec<&NewHoliday> = rows.iter().filter(|row| row.is_complete()).collect();
        if complete.is_empty() {
            return Err(HolidayBatchError::NothingToSubmit);
        }

        let mut added = 0;
        let mut failures = Vec::new();
        for row in &complete {
            match self.add_holiday(row, created_by).await {
                Ok(envelope) if envelope.success => added += 1,
                Ok(envelope) => failures.push(envelope.message.unwrap_or_default()),
                Err(source) => {
                    error!(error = %source, added, "Holiday batch interrupted");
                    return Err(HolidayBatchError::Interrupted { added, source });
                }
            }
        }

        let message = if failures.is_empty() {
            BATCH_ADDED.to_string()
        } else {
            format!("Some holidays failed to add: {}", failures.join(", "))
        };
        info!(submitted = complete.len(), added, failed = failures.len(), "Holiday batch finished");

        Ok(HolidayBatchOutcome { submitted: complete.len(), added, failures, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dto_maps_to_record() {
        let dto: HolidayDto = serde_json::from_value(serde_json::json!({
            "holidayId": 9,
            "holidayName": "Onam",
            "holidayDate": "2025-09-05",
            "holidayType": "Regional",
            "year": 2025,
            "description": "Harvest festival",
            "mdApprovalStatus": "N",
            "createdBy": "HR"
        }))
        .unwrap();
        let record = dto.into_record().unwrap();
        assert_eq!(record.id, 9);
        assert_eq!(record.holiday_type, HolidayType::Regional);
        assert_eq!(record.status, HolidayStatus::Pending);
        assert_eq!(record.created_by.as_deref(), Some("HR"));
    }

    #[test]
    fn missing_year_comes_from_date_and_timestamps_are_accepted() {
        let dto: HolidayDto = serde_json::from_value(serde_json::json!({
            "holidayId": 1,
            "holidayName": "Diwali",
            "holidayDate": "2026-11-08T00:00:00",
        }))
        .unwrap();
        let record = dto.into_record().unwrap();
        assert_eq!(record.year, 2026);
        assert_eq!(record.status, HolidayStatus::Unknown);
        assert_eq!(record.holiday_type, HolidayType::National);
    }

    #[test]
    fn sample_listing_filters_by_year() {
        assert_eq!(HolidayListing::sample(Some(2025), BACKEND_DOWN_NOTICE).holidays.len(), 4);
        assert!(HolidayListing::sample(Some(2024), BACKEND_DOWN_NOTICE).holidays.is_empty());
        assert!(HolidayListing::sample(None, BACKEND_DOWN_NOTICE).offline);
    }

    #[test]
    fn add_body_uses_upstream_names() {
        let row = NewHoliday {
            holiday_name: " Diwali ".into(),
            holiday_date: "2025-10-20".into(),
            holiday_type: HolidayType::BankHoliday,
            description: "Lights".into(),
        };
        let body = AddHolidayRequest {
            holiday_name: row.holiday_name.trim(),
            holiday_date: &row.holiday_date,
            holiday_type: row.holiday_type,
            description: &row.description,
            year: row.year(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["holidayName"], "Diwali");
        assert_eq!(json["holidayType"], "Bank holiday");
        assert_eq!(json["year"], 2025);
    }

    #[test]
    fn batch_errors_read_like_the_form_messages() {
        assert_eq!(
            HolidayBatchError::NothingToSubmit.to_string(),
            "Please fill in all required fields"
        );
        let interrupted = HolidayBatchError::Interrupted {
            added: 2,
            source: ApiError::Rejected("Duplicate holiday".into()),
        };
        assert_eq!(interrupted.to_string(), "Duplicate holiday (2 added before the error)");
    }
}
