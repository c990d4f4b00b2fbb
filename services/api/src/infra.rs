use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};
use workforce_ai::workforce::{
    Employee, EmployeeId, ImportedWorkforce, Organization, OrganizationId, RepositoryError, Task,
    WorkforceRepository,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Records {
    organizations: Vec<Organization>,
    employees: Vec<Employee>,
    tasks: Vec<Task>,
}

/// Process-local workforce records, seeded at startup from a task export.
#[derive(Default, Clone)]
pub(crate) struct InMemoryWorkforceRepository {
    records: Arc<RwLock<Records>>,
}

impl InMemoryWorkforceRepository {
    pub(crate) fn insert_organization(&self, organization: Organization) -> Result<(), RepositoryError> {
        let mut guard = self.write()?;
        if guard.organizations.iter().any(|org| org.id == organization.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.organizations.push(organization);
        Ok(())
    }

    /// Adds imported employees and tasks to an existing organization. Employees
    /// already on file are kept as they are.
    pub(crate) fn load(
        &self,
        organization: &OrganizationId,
        imported: ImportedWorkforce,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.write()?;
        if !guard.organizations.iter().any(|org| &org.id == organization) {
            return Err(RepositoryError::NotFound);
        }

        for employee in imported.employees {
            let known = guard
                .employees
                .iter()
                .any(|existing| existing.organization_id == employee.organization_id && existing.id == employee.id);
            if !known {
                guard.employees.push(employee);
            }
        }
        guard.tasks.extend(imported.tasks);
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Records>, RepositoryError> {
        self.records
            .read()
            .map_err(|_| RepositoryError::Unavailable("workforce records lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Records>, RepositoryError> {
        self.records
            .write()
            .map_err(|_| RepositoryError::Unavailable("workforce records lock poisoned".to_string()))
    }
}

impl WorkforceRepository for InMemoryWorkforceRepository {
    fn organization(&self, id: &OrganizationId) -> Result<Option<Organization>, RepositoryError> {
        let guard = self.read()?;
        Ok(guard.organizations.iter().find(|org| &org.id == id).cloned())
    }

    fn employees(&self, organization: &OrganizationId) -> Result<Vec<Employee>, RepositoryError> {
        let guard = self.read()?;
        Ok(guard
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
        let guard = self.read()?;
        Ok(guard
            .employees
            .iter()
            .find(|candidate| &candidate.organization_id == organization && &candidate.id == employee)
            .cloned())
    }

    fn tasks(&self, organization: &OrganizationId) -> Result<Vec<Task>, RepositoryError> {
        let guard = self.read()?;
        Ok(guard
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
        let guard = self.read()?;
        Ok(guard
            .tasks
            .iter()
            .filter(|task| &task.organization_id == organization && &task.employee_id == employee)
            .cloned()
            .collect())
    }
}
