use serde::Serialize;
use utoipa::ToSchema;

/// Record counts for the admin dashboard.
#[derive(Serialize, ToSchema)]
pub struct DashboardCounts {
    pub machines: u64,
    pub parts: u64,
    pub blogs: u64,
    pub enquiries: u64,
    pub unread_enquiries: u64,
}
