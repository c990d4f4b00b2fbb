use super::*;
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
        .single()
        .expect("valid base time")
}

fn open(priority: TaskPriority) -> TaskSnapshot {
    TaskSnapshot {
        status: TaskStatus::Todo,
        priority,
        deadline: Some(base_time() + Duration::days(3)),
        completed_at: None,
    }
}

fn on_time(priority: TaskPriority) -> TaskSnapshot {
    TaskSnapshot {
        status: TaskStatus::Completed,
        priority,
        deadline: Some(base_time() + Duration::days(3)),
        completed_at: Some(base_time() + Duration::days(1)),
    }
}

fn late(priority: TaskPriority) -> TaskSnapshot {
    TaskSnapshot {
        status: TaskStatus::Completed,
        priority,
        deadline: Some(base_time()),
        completed_at: Some(base_time() + Duration::hours(5)),
    }
}

#[test]
fn empty_task_list_scores_zero() {
    let tasks: Vec<TaskSnapshot> = Vec::new();
    let result = compute_score(&tasks);
    assert_eq!(result, ScoreResult::default());
    assert_eq!(result.final_score, 0);
    assert_eq!(result.completion_rate, 0);
    assert_eq!(result.deadline_score, 0);
    assert_eq!(result.priority_score, 0);
    assert!(result.is_empty());
}

#[test]
fn documented_example_scores_seventy_eight() {
    let tasks = vec![
        on_time(TaskPriority::High),
        on_time(TaskPriority::High),
        on_time(TaskPriority::High),
        on_time(TaskPriority::Medium),
        on_time(TaskPriority::Low),
        late(TaskPriority::Medium),
        open(TaskPriority::High),
        TaskSnapshot {
            status: TaskStatus::InProgress,
            ..open(TaskPriority::Low)
        },
    ];

    let result = compute_score(&tasks);

    assert_eq!(
        result.breakdown,
        ScoreBreakdown {
            total_tasks: 8,
            completed_tasks: 6,
            on_time_tasks: 5,
            high_priority_completed: 3,
            high_priority_total: 4,
        }
    );
    assert_eq!(result.completion_rate, 30);
    assert_eq!(result.deadline_score, 29);
    assert_eq!(result.priority_score, 19);
    assert_eq!(result.final_score, 78);
}

#[test]
fn missing_high_priority_work_moves_weight_to_completion() {
    let all_late = vec![late(TaskPriority::Low), late(TaskPriority::Medium)];
    let result = compute_score(&all_late);
    assert_eq!(result.priority_score, 0);
    assert_eq!(result.completion_rate, 65);
    assert_eq!(result.deadline_score, 0);
    assert_eq!(result.final_score, 65);

    let all_on_time = vec![on_time(TaskPriority::Low), on_time(TaskPriority::Medium)];
    let result = compute_score(&all_on_time);
    assert_eq!(result.final_score, 100);

    let weights = ScoreWeights::for_breakdown(&result.breakdown);
    assert_eq!(weights.completion, 65.0);
    assert_eq!(weights.deadline, 35.0);
    assert_eq!(weights.priority, 0.0);
}

#[test]
fn nothing_completed_forfeits_deadline_points() {
    let tasks = vec![
        open(TaskPriority::High),
        open(TaskPriority::Low),
        TaskSnapshot {
            status: TaskStatus::InProgress,
            ..open(TaskPriority::Medium)
        },
    ];

    let result = compute_score(&tasks);

    assert_eq!(result.breakdown.completed_tasks, 0);
    assert_eq!(result.deadline_score, 0);
    assert_eq!(result.final_score, 0);
}

#[test]
fn halves_round_up() {
    // 0.5 * 65 = 32.5 and 32.5 + 35 = 67.5.
    let tasks = vec![on_time(TaskPriority::Low), open(TaskPriority::Low)];

    let result = compute_score(&tasks);

    assert_eq!(result.completion_rate, 33);
    assert_eq!(result.deadline_score, 35);
    assert_eq!(result.final_score, 68);
}

#[test]
fn final_score_rounds_unrounded_sum() {
    // 13.33 + 35 + 8.33 = 56.67, while the displayed parts sum to 56.
    let tasks = vec![
        on_time(TaskPriority::High),
        open(TaskPriority::High),
        open(TaskPriority::High),
    ];

    let result = compute_score(&tasks);

    assert_eq!(result.completion_rate, 13);
    assert_eq!(result.deadline_score, 35);
    assert_eq!(result.priority_score, 8);
    assert_eq!(result.final_score, 57);
}

#[test]
fn completed_without_timestamp_is_never_on_time() {
    let tasks = vec![TaskSnapshot {
        status: TaskStatus::Completed,
        priority: TaskPriority::Medium,
        deadline: Some(base_time()),
        completed_at: None,
    }];

    let result = compute_score(&tasks);

    assert_eq!(result.breakdown.completed_tasks, 1);
    assert_eq!(result.breakdown.on_time_tasks, 0);
    assert_eq!(result.final_score, 65);
}

#[test]
fn completion_timestamp_on_open_task_is_ignored() {
    let tasks = vec![TaskSnapshot {
        status: TaskStatus::InProgress,
        priority: TaskPriority::High,
        deadline: Some(base_time() + Duration::days(1)),
        completed_at: Some(base_time()),
    }];

    let result = compute_score(&tasks);

    assert_eq!(result.breakdown.completed_tasks, 0);
    assert_eq!(result.breakdown.on_time_tasks, 0);
    assert_eq!(result.breakdown.high_priority_completed, 0);
    assert_eq!(result.final_score, 0);
}

#[test]
fn completing_exactly_at_deadline_counts_as_on_time() {
    let tasks = vec![TaskSnapshot {
        status: TaskStatus::Completed,
        priority: TaskPriority::Low,
        deadline: Some(base_time()),
        completed_at: Some(base_time()),
    }];

    assert_eq!(compute_score(&tasks).breakdown.on_time_tasks, 1);
}

#[test]
fn score_result_serializes_to_api_envelope() {
    let result = compute_score(&[on_time(TaskPriority::High)]);
    let json = serde_json::to_value(result).expect("serializes");

    assert_eq!(json["finalScore"], 100);
    assert_eq!(json["completionRate"], 40);
    assert_eq!(json["deadlineScore"], 35);
    assert_eq!(json["priorityScore"], 25);
    assert_eq!(json["breakdown"]["totalTasks"], 1);
    assert_eq!(json["breakdown"]["highPriorityCompleted"], 1);
}

fn arb_task() -> impl Strategy<Value = TaskSnapshot> {
    let status = prop_oneof![
        Just(TaskStatus::Todo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
    ];
    let priority = prop_oneof![
        Just(TaskPriority::Low),
        Just(TaskPriority::Medium),
        Just(TaskPriority::High),
    ];
    let deadline = proptest::option::of(-240i64..240);
    let completed = proptest::option::of(-240i64..240);

    (status, priority, deadline, completed).prop_map(
        |(status, priority, deadline, completed)| TaskSnapshot {
            status,
            priority,
            deadline: deadline.map(|hours| base_time() + Duration::hours(hours)),
            completed_at: completed.map(|hours| base_time() + Duration::hours(hours)),
        },
    )
}

proptest! {
    #[test]
    fn final_score_stays_within_bounds(tasks in proptest::collection::vec(arb_task(), 0..64)) {
        let result = compute_score(&tasks);
        prop_assert!(result.final_score <= 100);
        prop_assert!(result.breakdown.on_time_tasks <= result.breakdown.completed_tasks);
        prop_assert!(result.breakdown.high_priority_completed <= result.breakdown.high_priority_total);
        if result.breakdown.completed_tasks == 0 {
            prop_assert_eq!(result.deadline_score, 0);
        }
        if result.breakdown.high_priority_total == 0 {
            prop_assert_eq!(result.priority_score, 0);
        }
    }
}
