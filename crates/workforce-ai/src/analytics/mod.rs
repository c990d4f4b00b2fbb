//! Organization-scoped reporting over workforce records: per-employee scores,
//! leaderboard, dashboard, and cached AI analyses.

pub mod principal;
pub mod router;
pub mod service;
pub mod views;

#[cfg(test)]
mod tests;

pub use principal::{Principal, PrincipalRejection};
pub use router::analytics_router;
pub use service::{AnalyticsError, AnalyticsService, TEAM_INSIGHTS_KEY, WORKFORCE_QUERY_KEY};
pub use views::{
    DashboardView, EmployeeScoreView, LeaderboardEntry, TaskCounts, TeamInsights, WorkforceAnswer,
};
