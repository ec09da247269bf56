//! Pure reductions behind the admin dashboard.
//!
//! Every metric is recomputed from the store on each call; the entity
//! layer supplies the raw counts and rows, this module turns them into
//! the reported numbers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::StudentScoreRow;

pub const TOP_STUDENTS_LIMIT: usize = 5;
pub const RECENT_ACTIVITIES_LIMIT: usize = 5;

/// A point-in-time metric together with its delta against the prior
/// period.
#[derive(Debug, Clone, Copy, Serialize, utoipa::ToSchema)]
pub struct MetricDelta {
    pub value: i64,
    pub change: i64,
}

impl MetricDelta {
    pub fn new(value: i64, prior: i64) -> Self {
        Self {
            value,
            change: value - prior,
        }
    }
}

/// `round(100 * part / total)`, 0 when `total` is 0.
pub fn percentage(part: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (100.0 * part as f64 / total as f64).round() as i64
}

/// Integer-rounded mean, 0 for an empty slice.
pub fn mean_rounded(values: &[i32]) -> i64 {
    if values.is_empty() {
        return 0;
    }
    let sum: i64 = values.iter().map(|v| *v as i64).sum();
    (sum as f64 / values.len() as f64).round() as i64
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TopStudent {
    pub id: Uuid,
    pub name: String,
    /// Rounded mean score over completed attempts.
    pub score: i64,
    pub completed_exercises: i64,
}

/// Ranks students by mean score descending, ties broken by completed
/// attempt count descending, truncated to [`TOP_STUDENTS_LIMIT`].
pub fn rank_top_students(rows: Vec<StudentScoreRow>) -> Vec<TopStudent> {
    let mut ranked: Vec<TopStudent> = rows
        .into_iter()
        .filter(|row| row.completed > 0)
        .map(|row| TopStudent {
            id: row.user_id,
            name: row.name,
            score: (row.total_score as f64 / row.completed as f64).round() as i64,
            completed_exercises: row.completed,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.completed_exercises.cmp(&a.completed_exercises))
    });
    ranked.truncate(TOP_STUDENTS_LIMIT);
    ranked
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ExerciseCompleted,
    StudentJoined,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Activity {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Merges activity streams into one feed, newest first, truncated to
/// [`RECENT_ACTIVITIES_LIMIT`].
pub fn merge_recent_activities(mut activities: Vec<Activity>) -> Vec<Activity> {
    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    activities.truncate(RECENT_ACTIVITIES_LIMIT);
    activities
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    #[test]
    fn percentage_is_zero_guarded() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn mean_rounds_to_integer() {
        assert_eq!(mean_rounded(&[]), 0);
        assert_eq!(mean_rounded(&[75, 80]), 78); // 77.5 rounds up
        assert_eq!(mean_rounded(&[100, 0, 50]), 50);
    }

    #[test]
    fn metric_delta_change_is_now_minus_prior() {
        let m = MetricDelta::new(12, 10);
        assert_eq!(m.value, 12);
        assert_eq!(m.change, 2);

        let shrunk = MetricDelta::new(5, 9);
        assert_eq!(shrunk.change, -4);
    }

    fn row(name: &str, total_score: i64, completed: i64) -> StudentScoreRow {
        StudentScoreRow {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            total_score,
            completed,
        }
    }

    #[test]
    fn ranking_breaks_score_ties_by_completed_count() {
        // A: mean 90 over 3, B: mean 90 over 5
        let rows = vec![row("A", 270, 3), row("B", 450, 5)];
        let ranked = rank_top_students(rows);
        assert_eq!(ranked[0].name, "B");
        assert_eq!(ranked[1].name, "A");
        assert_eq!(ranked[0].score, 90);
    }

    #[test]
    fn ranking_is_score_descending_and_capped() {
        let rows = vec![
            row("low", 100, 2),   // mean 50
            row("high", 300, 3),  // mean 100
            row("mid", 150, 2),   // mean 75
            row("m2", 140, 2),    // mean 70
            row("m3", 120, 2),    // mean 60
            row("m4", 110, 2),    // mean 55
        ];
        let ranked = rank_top_students(rows);
        assert_eq!(ranked.len(), TOP_STUDENTS_LIMIT);
        assert_eq!(ranked[0].name, "high");
        assert!(ranked.iter().all(|s| s.name != "low"));
    }

    #[test]
    fn activities_merge_newest_first() {
        let now = Utc::now();
        let mut items = Vec::new();
        for i in 0..4 {
            items.push(Activity {
                id: Uuid::new_v4(),
                kind: ActivityKind::ExerciseCompleted,
                description: format!("attempt {i}"),
                timestamp: now - Duration::minutes(i * 2),
            });
        }
        for i in 0..4 {
            items.push(Activity {
                id: Uuid::new_v4(),
                kind: ActivityKind::StudentJoined,
                description: format!("join {i}"),
                timestamp: now - Duration::minutes(i * 2 + 1),
            });
        }

        let merged = merge_recent_activities(items);
        assert_eq!(merged.len(), RECENT_ACTIVITIES_LIMIT);
        assert!(merged.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert!(matches!(merged[0].kind, ActivityKind::ExerciseCompleted));
        assert!(matches!(merged[1].kind, ActivityKind::StudentJoined));
    }
}
