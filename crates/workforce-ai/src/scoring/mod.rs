//! Productivity scoring over an employee's task snapshot.
//!
//! The score is a weighted blend of three dimensions: how much of the assigned
//! work is finished, how much of the finished work landed on time, and how much
//! of the high-priority work is finished. When an employee has no high-priority
//! work the priority dimension does not apply and its weight is folded into
//! completion, so the scale stays 0-100 for everyone.

use crate::workforce::{TaskPriority, TaskSnapshot, TaskStatus};
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

pub const COMPLETION_WEIGHT: f64 = 40.0;
pub const DEADLINE_WEIGHT: f64 = 35.0;
pub const PRIORITY_WEIGHT: f64 = 25.0;

/// Raw counts the score is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub on_time_tasks: u32,
    pub high_priority_completed: u32,
    pub high_priority_total: u32,
}

impl ScoreBreakdown {
    pub fn tally<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a TaskSnapshot>,
    {
        let mut breakdown = Self::default();
        for task in tasks {
            let completed = task.status == TaskStatus::Completed;
            let high_priority = task.priority == TaskPriority::High;

            breakdown.total_tasks += 1;
            if completed {
                breakdown.completed_tasks += 1;
                if is_on_time(task) {
                    breakdown.on_time_tasks += 1;
                }
            }
            if high_priority {
                breakdown.high_priority_total += 1;
                if completed {
                    breakdown.high_priority_completed += 1;
                }
            }
        }
        breakdown
    }
}

// A completed task missing either timestamp cannot be shown to be on time.
fn is_on_time(task: &TaskSnapshot) -> bool {
    match (task.completed_at, task.deadline) {
        (Some(completed_at), Some(deadline)) => completed_at <= deadline,
        _ => false,
    }
}

/// Points available to each dimension for a given breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreWeights {
    pub completion: f64,
    pub deadline: f64,
    pub priority: f64,
}

impl ScoreWeights {
    pub fn for_breakdown(breakdown: &ScoreBreakdown) -> Self {
        if breakdown.high_priority_total == 0 {
            Self {
                completion: COMPLETION_WEIGHT + PRIORITY_WEIGHT,
                deadline: DEADLINE_WEIGHT,
                priority: 0.0,
            }
        } else {
            Self {
                completion: COMPLETION_WEIGHT,
                deadline: DEADLINE_WEIGHT,
                priority: PRIORITY_WEIGHT,
            }
        }
    }
}

/// Composite productivity score plus the rounded contribution of each dimension.
///
/// `final_score` is rounded once from the unrounded contributions, so it can
/// differ by one from the sum of the three displayed sub-scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub final_score: u8,
    pub completion_rate: u8,
    pub deadline_score: u8,
    pub priority_score: u8,
    pub breakdown: ScoreBreakdown,
}

impl ScoreResult {
    /// True when the score was derived from zero tasks.
    pub fn is_empty(&self) -> bool {
        self.breakdown.total_tasks == 0
    }
}

pub fn compute_score<'a, I>(tasks: I) -> ScoreResult
where
    I: IntoIterator<Item = &'a TaskSnapshot>,
{
    let breakdown = ScoreBreakdown::tally(tasks);
    if breakdown.total_tasks == 0 {
        return ScoreResult::default();
    }

    let weights = ScoreWeights::for_breakdown(&breakdown);

    let completion = ratio(breakdown.completed_tasks, breakdown.total_tasks) * weights.completion;
    let deadline = if breakdown.completed_tasks > 0 {
        ratio(breakdown.on_time_tasks, breakdown.completed_tasks) * weights.deadline
    } else {
        0.0
    };
    let priority = if breakdown.high_priority_total > 0 {
        ratio(
            breakdown.high_priority_completed,
            breakdown.high_priority_total,
        ) * weights.priority
    } else {
        0.0
    };

    ScoreResult {
        final_score: to_points(completion + deadline + priority),
        completion_rate: to_points(completion),
        deadline_score: to_points(deadline),
        priority_score: to_points(priority),
        breakdown,
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    f64::from(numerator) / f64::from(denominator)
}

// f64::round rounds halves away from zero; every input here is non-negative.
fn to_points(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}
