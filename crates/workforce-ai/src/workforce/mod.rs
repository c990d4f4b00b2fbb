//! Workforce records (organizations, employees, tasks) and the storage seam
//! the analytics layer reads them through.

pub mod domain;
pub mod import;
pub mod repository;

pub use domain::{
    Employee, EmployeeId, Organization, OrganizationId, Task, TaskId, TaskPriority, TaskSnapshot,
    TaskStatus,
};
pub use import::{ImportedWorkforce, TaskCsvImporter, TaskImportError};
pub use repository::{RepositoryError, WorkforceRepository};
