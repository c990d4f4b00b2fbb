use super::domain::{
    Employee, EmployeeId, OrganizationId, Task, TaskId, TaskPriority, TaskStatus,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum TaskImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidField {
        line: usize,
        column: &'static str,
        value: String,
    },
}

impl std::fmt::Display for TaskImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskImportError::Io(err) => write!(f, "failed to read task export: {}", err),
            TaskImportError::Csv(err) => write!(f, "invalid task CSV data: {}", err),
            TaskImportError::InvalidField {
                line,
                column,
                value,
            } => write!(
                f,
                "line {}: unrecognized {} value '{}'",
                line, column, value
            ),
        }
    }
}

impl std::error::Error for TaskImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaskImportError::Io(err) => Some(err),
            TaskImportError::Csv(err) => Some(err),
            TaskImportError::InvalidField { .. } => None,
        }
    }
}

impl From<std::io::Error> for TaskImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for TaskImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Employees and tasks recovered from a spreadsheet export.
#[derive(Debug, Clone, Default)]
pub struct ImportedWorkforce {
    pub employees: Vec<Employee>,
    pub tasks: Vec<Task>,
}

/// Reads task exports with the columns `Employee`, `Email` (optional),
/// `Title`, `Status`, `Priority`, `Deadline`, and `Completed At`.
pub struct TaskCsvImporter;

impl TaskCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        organization: &OrganizationId,
    ) -> Result<ImportedWorkforce, TaskImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, organization)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        organization: &OrganizationId,
    ) -> Result<ImportedWorkforce, TaskImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut employees: BTreeMap<EmployeeId, Employee> = BTreeMap::new();
        let mut tasks = Vec::new();

        for (index, record) in csv_reader.deserialize::<TaskRow>().enumerate() {
            let row = record?;
            // Header occupies line 1.
            let line = index + 2;

            let status = TaskStatus::parse(&row.status).ok_or_else(|| {
                TaskImportError::InvalidField {
                    line,
                    column: "Status",
                    value: row.status.clone(),
                }
            })?;
            let priority = match row.priority.as_deref() {
                None => TaskPriority::Medium,
                Some(raw) => {
                    TaskPriority::parse(raw).ok_or_else(|| TaskImportError::InvalidField {
                        line,
                        column: "Priority",
                        value: raw.to_string(),
                    })?
                }
            };
            let deadline = parse_optional_timestamp(row.deadline.as_deref(), line, "Deadline")?;
            let completed_at =
                parse_optional_timestamp(row.completed_at.as_deref(), line, "Completed At")?;

            let slug = slugify(&row.employee);
            if slug.is_empty() {
                return Err(TaskImportError::InvalidField {
                    line,
                    column: "Employee",
                    value: row.employee,
                });
            }
            let employee_id = EmployeeId(slug);
            employees
                .entry(employee_id.clone())
                .or_insert_with(|| Employee {
                    id: employee_id.clone(),
                    organization_id: organization.clone(),
                    name: row.employee.clone(),
                    email: row
                        .email
                        .clone()
                        .unwrap_or_else(|| format!("{}@example.invalid", employee_id.0)),
                    position: None,
                });

            tasks.push(Task {
                id: TaskId(format!("task-{:05}", index + 1)),
                organization_id: organization.clone(),
                employee_id,
                title: row.title,
                status,
                priority,
                deadline,
                // Completion time is only meaningful for completed work.
                completed_at: completed_at.filter(|_| status == TaskStatus::Completed),
            });
        }

        Ok(ImportedWorkforce {
            employees: employees.into_values().collect(),
            tasks,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    #[serde(rename = "Employee")]
    employee: String,
    #[serde(rename = "Email", default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Priority", default, deserialize_with = "empty_string_as_none")]
    priority: Option<String>,
    #[serde(rename = "Deadline", default, deserialize_with = "empty_string_as_none")]
    deadline: Option<String>,
    #[serde(
        rename = "Completed At",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    completed_at: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_optional_timestamp(
    value: Option<&str>,
    line: usize,
    column: &'static str,
) -> Result<Option<DateTime<Utc>>, TaskImportError> {
    match value {
        None => Ok(None),
        Some(raw) => parse_timestamp(raw)
            .map(Some)
            .ok_or_else(|| TaskImportError::InvalidField {
                line,
                column,
                value: raw.to_string(),
            }),
    }
}

/// RFC 3339 timestamps, or bare dates which resolve to the end of that day.
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(23, 59, 59))
        .map(|naive| naive.and_utc())
}

pub(crate) fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.extend(ch.to_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}
