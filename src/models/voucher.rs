use crate::entities::VoucherStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitVoucherRequest {
    pub course_id: i32,
    /// URL returned by the upload endpoint.
    pub voucher_image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReviewVoucherRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VoucherResponse {
    pub id: i32,
    pub student_id: i32,
    pub student_name: String,
    pub course_id: i32,
    pub course_title: String,
    pub voucher_image: String,
    pub status: VoucherStatus,
    pub is_seen: bool,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<i32>,
    pub notes: String,
}
