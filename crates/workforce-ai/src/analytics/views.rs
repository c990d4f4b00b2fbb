use serde::{Deserialize, Serialize};

use crate::scoring::ScoreResult;
use crate::workforce::{EmployeeId, OrganizationId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeScoreView {
    pub employee_id: EmployeeId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(flatten)]
    pub score: ScoreResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub employee_id: EmployeeId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub final_score: u8,
    pub completed_tasks: u32,
    pub total_tasks: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCounts {
    pub total: u32,
    pub todo: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub overdue: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub organization_id: OrganizationId,
    pub organization_name: String,
    pub employee_count: u32,
    pub tasks: TaskCounts,
    /// Mean score over employees with at least one task.
    pub average_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_performer: Option<LeaderboardEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInsights {
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkforceAnswer {
    pub answer: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}
