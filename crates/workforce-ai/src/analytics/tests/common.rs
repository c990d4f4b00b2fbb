use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::to_bytes;
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::ai::{AiError, TextGenerator};
use crate::analytics::AnalyticsService;
use crate::cache::{ManualClock, MemoryCacheStore, ResponseCache};
use crate::config::CacheConfig;
use crate::workforce::{
    Employee, EmployeeId, Organization, OrganizationId, RepositoryError, Task, TaskId,
    TaskPriority, TaskStatus, WorkforceRepository,
};

pub(super) const INSIGHTS_REPLY: &str = "```json\n{\"summary\":\"Delivery is uneven\",\"strengths\":[\"Ada ships on time\"],\"risks\":[\"Grace has overdue high-priority work\"],\"recommendations\":[\"Rebalance Grace's queue\"]}\n```";
pub(super) const ANSWER_REPLY: &str =
    "{\"answer\":\"Grace needs support\",\"highlights\":[\"1 overdue task\"]}";

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid now")
}

pub(super) fn acme() -> OrganizationId {
    OrganizationId("acme".to_string())
}

pub(super) fn globex() -> OrganizationId {
    OrganizationId("globex".to_string())
}

pub(super) fn employee_id(id: &str) -> EmployeeId {
    EmployeeId(id.to_string())
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    organizations: Vec<Organization>,
    employees: Vec<Employee>,
    tasks: Vec<Task>,
}

impl MemoryRepository {
    pub(super) fn with_organization(mut self, id: &OrganizationId, name: &str) -> Self {
        self.organizations.push(Organization {
            id: id.clone(),
            name: name.to_string(),
        });
        self
    }

    pub(super) fn with_employee(mut self, org: &OrganizationId, id: &str, name: &str) -> Self {
        self.employees.push(Employee {
            id: employee_id(id),
            organization_id: org.clone(),
            name: name.to_string(),
            email: format!("{id}@example.com"),
            position: Some("Engineer".to_string()),
        });
        self
    }

    /// Adds a task; `completed_offset_hours` is relative to the deadline.
    pub(super) fn with_task(
        mut self,
        org: &OrganizationId,
        employee: &str,
        status: TaskStatus,
        priority: TaskPriority,
        deadline_offset_hours: i64,
        completed_offset_hours: Option<i64>,
    ) -> Self {
        let deadline = now() + Duration::hours(deadline_offset_hours);
        let completed_at =
            completed_offset_hours.map(|offset| deadline + Duration::hours(offset));
        let index = self.tasks.len() + 1;
        self.tasks.push(Task {
            id: TaskId(format!("task-{index}")),
            organization_id: org.clone(),
            employee_id: employee_id(employee),
            title: format!("Task {index}"),
            status,
            priority,
            deadline: Some(deadline),
            completed_at,
        });
        self
    }
}

impl WorkforceRepository for MemoryRepository {
    fn organization(&self, id: &OrganizationId) -> Result<Option<Organization>, RepositoryError> {
        Ok(self.organizations.iter().find(|org| &org.id == id).cloned())
    }

    fn employees(&self, organization: &OrganizationId) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self
            .employees
            .iter()
            .filter(|employee| &employee.organization_id == organization)
            .cloned()
            .collect())
    }

    fn employee(
        &self,
        organization: &OrganizationId,
        employee: &EmployeeId,
    ) -> Result<Option<Employee>, RepositoryError> {
        Ok(self
            .employees
            .iter()
            .find(|candidate| {
                &candidate.organization_id == organization && &candidate.id == employee
            })
            .cloned())
    }

    fn tasks(&self, organization: &OrganizationId) -> Result<Vec<Task>, RepositoryError> {
        Ok(self
            .tasks
            .iter()
            .filter(|task| &task.organization_id == organization)
            .cloned()
            .collect())
    }

    fn tasks_for_employee(
        &self,
        organization: &OrganizationId,
        employee: &EmployeeId,
    ) -> Result<Vec<Task>, RepositoryError> {
        Ok(self
            .tasks
            .iter()
            .filter(|task| &task.organization_id == organization && &task.employee_id == employee)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl WorkforceRepository for UnavailableRepository {
    fn organization(&self, _id: &OrganizationId) -> Result<Option<Organization>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn employees(&self, _organization: &OrganizationId) -> Result<Vec<Employee>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn employee(
        &self,
        _organization: &OrganizationId,
        _employee: &EmployeeId,
    ) -> Result<Option<Employee>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn tasks(&self, _organization: &OrganizationId) -> Result<Vec<Task>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn tasks_for_employee(
        &self,
        _organization: &OrganizationId,
        _employee: &EmployeeId,
    ) -> Result<Vec<Task>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Scripted generator that records every prompt it receives.
pub(super) struct ScriptedGenerator {
    reply: Result<String, u16>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub(super) fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(prompt.to_string());
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(status) => Err(AiError::Status {
                status: *status,
                body: "provider unavailable".to_string(),
            }),
        }
    }
}

/// Acme: Ada scores 100, Bob 68, Grace 33 (one overdue task), Linus has no
/// tasks. Globex: Eve scores 100.
pub(super) fn seeded_repository() -> MemoryRepository {
    let acme = acme();
    let globex = globex();
    MemoryRepository::default()
        .with_organization(&acme, "Acme Corp")
        .with_organization(&globex, "Globex")
        .with_employee(&acme, "ada", "Ada Lovelace")
        .with_employee(&acme, "bob", "Bob Martin")
        .with_employee(&acme, "grace", "Grace Hopper")
        .with_employee(&acme, "linus", "Linus Torvalds")
        .with_employee(&globex, "eve", "Eve Online")
        .with_task(&acme, "ada", TaskStatus::Completed, TaskPriority::High, -48, Some(-2))
        .with_task(&acme, "ada", TaskStatus::Completed, TaskPriority::Medium, -24, Some(0))
        .with_task(&acme, "bob", TaskStatus::Completed, TaskPriority::Medium, -24, Some(-1))
        .with_task(&acme, "bob", TaskStatus::InProgress, TaskPriority::Low, 72, None)
        .with_task(&acme, "grace", TaskStatus::Completed, TaskPriority::High, -72, Some(5))
        .with_task(&acme, "grace", TaskStatus::Todo, TaskPriority::High, -6, None)
        .with_task(&globex, "eve", TaskStatus::Completed, TaskPriority::Low, -10, Some(-3))
}

pub(super) struct Harness<R, G> {
    pub service: Arc<AnalyticsService<R, G>>,
    pub generator: Arc<G>,
    pub store: Arc<MemoryCacheStore>,
    pub clock: Arc<ManualClock>,
}

pub(super) fn harness<R, G>(repository: R, generator: G) -> Harness<R, G>
where
    R: WorkforceRepository + 'static,
    G: TextGenerator + 'static,
{
    let generator = Arc::new(generator);
    let store = Arc::new(MemoryCacheStore::default());
    let clock = Arc::new(ManualClock::new(now()));
    let cache = ResponseCache::with_clock(store.clone(), clock.clone());
    let service = AnalyticsService::new(
        Arc::new(repository),
        generator.clone(),
        cache,
        CacheConfig::default(),
    )
    .with_clock(clock.clone());

    Harness {
        service: Arc::new(service),
        generator,
        store,
        clock,
    }
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
