use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::auth::StaffUser;
use crate::client::UpstreamClient;
use crate::client::holidays::HolidayBatchOutcome;
use crate::error::AdminError;
use crate::model::holiday::{HolidayRecord, HolidayStatus, NewHoliday};

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct HolidayQuery {
    /// Calendar year; all years when omitted
    #[param(example = 2025)]
    pub year: Option<i32>,
    /// Case-insensitive match on name or description
    pub search: Option<String>,
    /// Holiday type label, e.g. `National` or `Bank holiday`
    #[serde(rename = "type")]
    pub holiday_type: Option<String>,
    /// Status label, e.g. `Holiday Approved`
    pub status: Option<String>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq, ToSchema)]
pub struct StatusCounts {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
    pub rejected: usize,
}

impl StatusCounts {
    fn of(holidays: &[HolidayRecord]) -> Self {
        let count = |status| holidays.iter().filter(|h| h.status == status).count();
        Self {
            total: holidays.len(),
            approved: count(HolidayStatus::Approved),
            pending: count(HolidayStatus::Pending),
            rejected: count(HolidayStatus::Rejected),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolidayPage {
    pub holidays: Vec<HolidayRecord>,
    /// Counts over the year's holidays before search and filters
    pub counts: StatusCounts,
    pub offline: bool,
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddHolidays {
    pub holidays: Vec<NewHoliday>,
}

fn filter_holidays(holidays: &[HolidayRecord], query: &HolidayQuery) -> Vec<HolidayRecord> {
    let term = query.search.as_deref().map(str::trim).unwrap_or_default();
    let wanted = |filter: &Option<String>, value: &str| {
        filter.as_deref().is_none_or(|f| f.is_empty() || f == "all" || f == value)
    };

    holidays
        .iter()
        .filter(|h| term.is_empty() || h.matches_search(term))
        .filter(|h| wanted(&query.holiday_type, h.holiday_type.as_ref()))
        .filter(|h| wanted(&query.status, h.status.as_ref()))
        .cloned()
        .collect()
}

/// List holidays
#[utoipa::path(
    get,
    path = "/admin/holidays",
    params(HolidayQuery),
    responses(
        (status = 200, description = "Holidays for the year; sample data when the HR backend is down", body = HolidayPage),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Holiday",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_holidays(
    client: web::Data<UpstreamClient>,
    query: web::Query<HolidayQuery>,
) -> actix_web::Result<impl Responder> {
    let listing = client.holidays_or_sample(query.year).await;

    Ok(HttpResponse::Ok().json(HolidayPage {
        holidays: filter_holidays(&listing.holidays, &query),
        counts: StatusCounts::of(&listing.holidays),
        offline: listing.offline,
        notice: listing.notice,
    }))
}

/// Add holidays for MD approval
///
/// Incomplete rows are skipped. Rows are sent one at a time; a transport
/// failure stops the batch and reports how many were added.
#[utoipa::path(
    post,
    path = "/admin/holidays",
    request_body = AddHolidays,
    responses(
        (status = 200, description = "Batch finished", body = HolidayBatchOutcome),
        (status = 422, description = "No complete rows", body = Object, example = json!({
            "message": "Please fill in all required fields"
        })),
        (status = 503, description = "HR backend unavailable", body = Object, example = json!({
            "message": "Backend server is not available. Cannot add holidays at this time.",
            "added": 0
        }))
    ),
    tag = "Holiday",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_holidays(
    user: StaffUser,
    client: web::Data<UpstreamClient>,
    payload: web::Json<AddHolidays>,
) -> actix_web::Result<impl Responder> {
    let outcome = client
        .add_holidays(&payload.holidays, &user.username)
        .await
        .map_err(AdminError::from)?;

    info!(user = %user.username, added = outcome.added, "Holidays submitted");
    Ok(HttpResponse::Ok().json(outcome))
}

/// Delete a holiday
#[utoipa::path(
    delete,
    path = "/admin/holidays/{id}",
    params(
        ("id" = u64, Path, description = "Holiday id")
    ),
    responses(
        (status = 200, description = "Holiday deleted", body = Object, example = json!({
            "message": "Holiday deleted successfully"
        })),
        (status = 502, description = "HR backend refused the delete"),
        (status = 503, description = "HR backend unavailable")
    ),
    tag = "Holiday",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_holiday(
    user: StaffUser,
    client: web::Data<UpstreamClient>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let envelope = client.delete_holiday(id).await.map_err(|e| {
        error!(error = %e, holiday_id = id, "Failed to delete holiday");
        AdminError::from(e)
    })?;

    let message = envelope
        .message
        .unwrap_or_else(|| "Holiday deleted successfully".to_string());
    info!(holiday_id = id, user = %user.username, "Holiday deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": message })))
}
