use super::domain::{Employee, EmployeeId, Organization, OrganizationId, Task};

/// Storage abstraction over organizations, employees, and tasks so the
/// analytics service can be exercised in isolation.
///
/// Every lookup is scoped by organization; implementations must never return
/// records belonging to another tenant.
pub trait WorkforceRepository: Send + Sync {
    fn organization(&self, id: &OrganizationId) -> Result<Option<Organization>, RepositoryError>;
    fn employees(&self, organization: &OrganizationId) -> Result<Vec<Employee>, RepositoryError>;
    fn employee(
        &self,
        organization: &OrganizationId,
        employee: &EmployeeId,
    ) -> Result<Option<Employee>, RepositoryError>;
    fn tasks(&self, organization: &OrganizationId) -> Result<Vec<Task>, RepositoryError>;
    fn tasks_for_employee(
        &self,
        organization: &OrganizationId,
        employee: &EmployeeId,
    ) -> Result<Vec<Task>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
