use serde::Serialize;

use crate::stats::MetricDelta;

/// The four admin dashboard metrics, each with its one-month delta.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardStatsResponse {
    pub active_students: MetricDelta,
    pub total_exercises: MetricDelta,
    pub completion_rate: MetricDelta,
    pub average_score: MetricDelta,
}
