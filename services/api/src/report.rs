use clap::Args;
use std::collections::HashMap;
use std::path::PathBuf;
use workforce_ai::error::AppError;
use workforce_ai::scoring::{compute_score, ScoreResult};
use workforce_ai::workforce::{Employee, ImportedWorkforce, OrganizationId, TaskCsvImporter, TaskSnapshot};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Task CSV export (Employee, Email, Title, Status, Priority, Deadline, Completed At)
    #[arg(long)]
    pub(crate) tasks_csv: PathBuf,
    /// Organization id stamped on the imported records
    #[arg(long, default_value = "default")]
    pub(crate) organization: String,
}

pub(crate) fn run_score_report(args: ScoreArgs) -> Result<(), AppError> {
    let organization = OrganizationId(args.organization);
    let imported = TaskCsvImporter::from_path(&args.tasks_csv, &organization)?;

    println!(
        "Productivity scores for {} ({})",
        organization,
        args.tasks_csv.display()
    );
    for line in render_rows(&score_rows(imported)) {
        println!("{line}");
    }
    Ok(())
}

pub(crate) struct ScoreRow {
    pub(crate) employee: Employee,
    pub(crate) score: ScoreResult,
}

/// One row per employee, best score first.
pub(crate) fn score_rows(imported: ImportedWorkforce) -> Vec<ScoreRow> {
    let mut snapshots: HashMap<_, Vec<TaskSnapshot>> = HashMap::new();
    for task in &imported.tasks {
        snapshots
            .entry(task.employee_id.clone())
            .or_default()
            .push(task.snapshot());
    }

    let mut rows: Vec<ScoreRow> = imported
        .employees
        .into_iter()
        .map(|employee| {
            let score = snapshots
                .get(&employee.id)
                .map(|tasks| compute_score(tasks))
                .unwrap_or_default();
            ScoreRow { employee, score }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.score
            .final_score
            .cmp(&a.score.final_score)
            .then_with(|| a.employee.name.cmp(&b.employee.name))
    });
    rows
}

fn render_rows(rows: &[ScoreRow]) -> Vec<String> {
    if rows.is_empty() {
        return vec!["  (no tasks found)".to_string()];
    }

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let breakdown = &row.score.breakdown;
            format!(
                "  {:>2}. {:<24} {:>3}  completion {:>2} | deadline {:>2} | priority {:>2}  ({}/{} done, {} on time)",
                index + 1,
                row.employee.name,
                row.score.final_score,
                row.score.completion_rate,
                row.score.deadline_score,
                row.score.priority_score,
                breakdown.completed_tasks,
                breakdown.total_tasks,
                breakdown.on_time_tasks,
            )
        })
        .collect()
}
