use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::principal::Principal;
use super::views::{
    DashboardView, EmployeeScoreView, LeaderboardEntry, TaskCounts, TeamInsights, WorkforceAnswer,
};
use crate::ai::prompts::{team_insights_prompt, workforce_query_prompt, EmployeeDigest};
use crate::ai::{parse_json_reply, AiError, TextGenerator};
use crate::cache::{compose_key, normalize_parameter, Clock, ResponseCache, StoreError, SystemClock};
use crate::config::CacheConfig;
use crate::scoring::{compute_score, ScoreResult};
use crate::workforce::{
    Employee, EmployeeId, Organization, OrganizationId, RepositoryError, Task, TaskSnapshot,
    TaskStatus, WorkforceRepository,
};

pub const TEAM_INSIGHTS_KEY: &str = "team-insights";
pub const WORKFORCE_QUERY_KEY: &str = "workforce-query";

/// Per-organization reporting: scores, leaderboard, dashboard, and cached AI
/// analyses. Holds no state of its own beyond its injected collaborators.
pub struct AnalyticsService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    cache: ResponseCache,
    ttl: CacheConfig,
    clock: Arc<dyn Clock>,
}

struct ScoredEmployee {
    employee: Employee,
    score: ScoreResult,
    overdue: u32,
}

impl<R, G> AnalyticsService<R, G>
where
    R: WorkforceRepository + 'static,
    G: TextGenerator + 'static,
{
    pub fn new(repository: Arc<R>, generator: Arc<G>, cache: ResponseCache, ttl: CacheConfig) -> Self {
        Self {
            repository,
            generator,
            cache,
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    /// Overrides the clock used to decide which open tasks are overdue.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn employee_score(
        &self,
        principal: &Principal,
        employee_id: &EmployeeId,
    ) -> Result<EmployeeScoreView, AnalyticsError> {
        if !principal.can_view_employee(employee_id) {
            return Err(AnalyticsError::Forbidden);
        }
        let organization_id = principal.organization_id();

        let employee = self
            .repository
            .employee(organization_id, employee_id)?
            .ok_or_else(|| AnalyticsError::EmployeeNotFound(employee_id.clone()))?;
        let tasks = self
            .repository
            .tasks_for_employee(organization_id, employee_id)?;
        let snapshots: Vec<TaskSnapshot> = tasks.iter().map(Task::snapshot).collect();

        Ok(EmployeeScoreView {
            employee_id: employee.id,
            name: employee.name,
            position: employee.position,
            score: compute_score(&snapshots),
        })
    }

    /// Employees ranked by score (descending), ties broken by name.
    pub fn leaderboard(
        &self,
        principal: &Principal,
        limit: Option<usize>,
    ) -> Result<Vec<LeaderboardEntry>, AnalyticsError> {
        let organization_id = require_admin(principal)?;
        let scored = self.score_team(organization_id)?;

        let entries = ranked(&scored)
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        Ok(entries)
    }

    pub fn dashboard(&self, principal: &Principal) -> Result<DashboardView, AnalyticsError> {
        let organization_id = require_admin(principal)?;
        let organization = self.organization(organization_id)?;
        let employees = self.repository.employees(organization_id)?;
        let tasks = self.repository.tasks(organization_id)?;
        let now = self.clock.now();

        let mut counts = TaskCounts::default();
        for task in &tasks {
            counts.total += 1;
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
            }
            if task.is_overdue(now) {
                counts.overdue += 1;
            }
        }

        let scored = score_employees(employees, &tasks, now);
        let with_data: Vec<u32> = scored
            .iter()
            .filter(|entry| !entry.score.is_empty())
            .map(|entry| u32::from(entry.score.final_score))
            .collect();
        let average_score = if with_data.is_empty() {
            0
        } else {
            let sum: u32 = with_data.iter().sum();
            (f64::from(sum) / with_data.len() as f64).round() as u8
        };
        let top_performer = ranked(&scored)
            .into_iter()
            .next()
            .filter(|entry| entry.total_tasks > 0);

        Ok(DashboardView {
            organization_id: organization.id,
            organization_name: organization.name,
            employee_count: scored.len() as u32,
            tasks: counts,
            average_score,
            top_performer,
        })
    }

    /// Organization-wide AI analysis, cached for the analysis TTL.
    pub async fn team_insights(
        &self,
        principal: &Principal,
        refresh: bool,
    ) -> Result<TeamInsights, AnalyticsError> {
        let organization_id = require_admin(principal)?;
        let organization = self.organization(organization_id)?;

        let content = self
            .cache
            .get_or_compute(
                organization_id,
                TEAM_INSIGHTS_KEY,
                self.ttl.analysis_ttl_hours,
                refresh,
                move || async move {
                    let team = self.team_digest(organization_id)?;
                    let prompt = team_insights_prompt(&organization.name, &team);
                    let reply = self.generator.generate(&prompt).await?;
                    let insights: TeamInsights = parse_json_reply(&reply)?;
                    serde_json::to_string(&insights).map_err(AnalyticsError::Encode)
                },
            )
            .await?;

        info!(
            target: "workforce::analytics",
            organization_id = %organization_id,
            refresh,
            "team insights served"
        );
        serde_json::from_str(&content).map_err(AnalyticsError::MalformedCachedPayload)
    }

    /// Answers a free-form manager question. Answers are cached per normalized
    /// question for the query TTL.
    pub async fn workforce_query(
        &self,
        principal: &Principal,
        question: &str,
        refresh: bool,
    ) -> Result<WorkforceAnswer, AnalyticsError> {
        let organization_id = require_admin(principal)?;
        let normalized = normalize_parameter(question);
        if normalized.is_empty() {
            return Err(AnalyticsError::EmptyQuestion);
        }
        let organization = self.organization(organization_id)?;
        let cache_key = compose_key(WORKFORCE_QUERY_KEY, &normalized);

        let content = self
            .cache
            .get_or_compute(
                organization_id,
                &cache_key,
                self.ttl.query_ttl_hours,
                refresh,
                move || async move {
                    let team = self.team_digest(organization_id)?;
                    let prompt = workforce_query_prompt(&organization.name, question.trim(), &team);
                    let reply = self.generator.generate(&prompt).await?;
                    let answer: WorkforceAnswer = parse_json_reply(&reply)?;
                    serde_json::to_string(&answer).map_err(AnalyticsError::Encode)
                },
            )
            .await?;

        serde_json::from_str(&content).map_err(AnalyticsError::MalformedCachedPayload)
    }

    fn organization(&self, id: &OrganizationId) -> Result<Organization, AnalyticsError> {
        self.repository
            .organization(id)?
            .ok_or_else(|| AnalyticsError::OrganizationNotFound(id.clone()))
    }

    fn score_team(&self, organization_id: &OrganizationId) -> Result<Vec<ScoredEmployee>, AnalyticsError> {
        let employees = self.repository.employees(organization_id)?;
        let tasks = self.repository.tasks(organization_id)?;
        Ok(score_employees(employees, &tasks, self.clock.now()))
    }

    fn team_digest(&self, organization_id: &OrganizationId) -> Result<Vec<EmployeeDigest>, AnalyticsError> {
        let scored = self.score_team(organization_id)?;
        Ok(scored
            .into_iter()
            .map(|entry| EmployeeDigest {
                name: entry.employee.name,
                position: entry.employee.position,
                final_score: entry.score.final_score,
                total_tasks: entry.score.breakdown.total_tasks,
                completed_tasks: entry.score.breakdown.completed_tasks,
                on_time_tasks: entry.score.breakdown.on_time_tasks,
                overdue_tasks: entry.overdue,
            })
            .collect())
    }
}

fn require_admin(principal: &Principal) -> Result<&OrganizationId, AnalyticsError> {
    if principal.is_admin() {
        Ok(principal.organization_id())
    } else {
        Err(AnalyticsError::Forbidden)
    }
}

fn score_employees(
    employees: Vec<Employee>,
    tasks: &[Task],
    now: chrono::DateTime<chrono::Utc>,
) -> Vec<ScoredEmployee> {
    let mut by_employee: HashMap<&EmployeeId, Vec<&Task>> = HashMap::new();
    for task in tasks {
        by_employee.entry(&task.employee_id).or_default().push(task);
    }

    employees
        .into_iter()
        .map(|employee| {
            let assigned = by_employee.get(&employee.id).cloned().unwrap_or_default();
            let snapshots: Vec<TaskSnapshot> = assigned.iter().map(|task| task.snapshot()).collect();
            let overdue = assigned.iter().filter(|task| task.is_overdue(now)).count() as u32;
            ScoredEmployee {
                score: compute_score(&snapshots),
                overdue,
                employee,
            }
        })
        .collect()
}

fn ranked(scored: &[ScoredEmployee]) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&ScoredEmployee> = scored.iter().collect();
    ordered.sort_by(|a, b| {
        b.score
            .final_score
            .cmp(&a.score.final_score)
            .then_with(|| a.employee.name.cmp(&b.employee.name))
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, entry)| LeaderboardEntry {
            rank: index as u32 + 1,
            employee_id: entry.employee.id.clone(),
            name: entry.employee.name.clone(),
            position: entry.employee.position.clone(),
            final_score: entry.score.final_score,
            completed_tasks: entry.score.breakdown.completed_tasks,
            total_tasks: entry.score.breakdown.total_tasks,
        })
        .collect()
}

/// Error raised by the analytics service.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("principal may not access this resource")]
    Forbidden,
    #[error("organization {0} not found")]
    OrganizationNotFound(OrganizationId),
    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Ai(#[from] AiError),
    #[error("cached analysis could not be decoded: {0}")]
    MalformedCachedPayload(#[source] serde_json::Error),
    #[error("failed to encode analysis: {0}")]
    Encode(#[source] serde_json::Error),
}
