//! Savings progress derived from contributions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Contribution, Goal, Money, PeriodWindow, budget_report::capped_percentage};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal: Goal,
    pub saved: Money,
    /// `max(target - saved, 0)`.
    pub remaining: Money,
    /// Unclamped `saved / target`.
    pub ratio: f64,
    /// `round(ratio * 100)` capped at 100.
    pub percentage: u32,
    pub achieved: bool,
    /// When the running total first reached the target.
    pub achieved_at: Option<DateTime<Utc>>,
    /// Days until the deadline; negative once it has passed.
    pub days_left: i64,
    pub contributions: Vec<Contribution>,
}

impl GoalProgress {
    /// Builds the progress of `goal`. Contributions are sorted by time here,
    /// callers may pass them in any order.
    pub fn new(goal: Goal, mut contributions: Vec<Contribution>, today: NaiveDate) -> Self {
        contributions.sort_by_key(|c| (c.contributed_at, c.id));

        let mut saved = Money::ZERO;
        let mut achieved_at = None;
        for contribution in &contributions {
            saved += contribution.amount;
            if achieved_at.is_none() && saved >= goal.target {
                achieved_at = Some(contribution.contributed_at);
            }
        }

        let ratio = if goal.target.is_positive() {
            saved.cents() as f64 / goal.target.cents() as f64
        } else {
            0.0
        };
        let remaining = if saved >= goal.target {
            Money::ZERO
        } else {
            goal.target - saved
        };

        Self {
            saved,
            remaining,
            ratio,
            percentage: capped_percentage(saved, goal.target),
            achieved: saved >= goal.target,
            achieved_at,
            days_left: (goal.deadline - today).num_days(),
            goal,
            contributions,
        }
    }
}

/// Cumulative amount saved towards one goal at the end of each month.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalSeries {
    pub goal_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub data: Vec<Money>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalHistory {
    /// Short month names, oldest first.
    pub labels: Vec<String>,
    pub series: Vec<GoalSeries>,
}

impl GoalHistory {
    pub fn new(goals: &[GoalProgress], months: &[PeriodWindow]) -> Self {
        let labels = months
            .iter()
            .map(|w| w.start.format("%b").to_string())
            .collect();
        let series = goals
            .iter()
            .map(|progress| GoalSeries {
                goal_id: progress.goal.id,
                name: progress.goal.name.clone(),
                color: progress.goal.color.clone(),
                data: months
                    .iter()
                    .map(|window| {
                        progress
                            .contributions
                            .iter()
                            .filter(|c| c.contributed_at.date_naive() < window.end)
                            .map(|c| c.amount)
                            .sum()
                    })
                    .collect(),
            })
            .collect();
        Self { labels, series }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalOverview {
    pub goals: Vec<GoalProgress>,
    pub total_target: Money,
    pub total_saved: Money,
    /// Mean of the capped percentages, 0 when there are no goals.
    pub average_percentage: f64,
    pub history: GoalHistory,
}

impl GoalOverview {
    pub fn new(goals: Vec<GoalProgress>, months: &[PeriodWindow]) -> Self {
        let total_target = goals.iter().map(|g| g.goal.target).sum();
        let total_saved = goals.iter().map(|g| g.saved).sum();
        let average_percentage = if goals.is_empty() {
            0.0
        } else {
            goals.iter().map(|g| f64::from(g.percentage)).sum::<f64>() / goals.len() as f64
        };
        let history = GoalHistory::new(&goals, months);
        Self {
            goals,
            total_target,
            total_saved,
            average_percentage,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::period::last_n_months;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn goal(target: i64) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Bike".to_string(),
            description: None,
            target: Money::new(target),
            deadline: d(2026, 12, 31),
            icon: None,
            color: Some("#00aa00".to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn contribution(goal: &Goal, cents: i64, y: i32, m: u32, day: u32) -> Contribution {
        Contribution {
            id: Uuid::new_v4(),
            goal_id: goal.id,
            amount: Money::new(cents),
            contributed_at: Utc.with_ymd_and_hms(y, m, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn progress_is_capped_when_over_saved() {
        let g = goal(10_000);
        let contributions = vec![
            contribution(&g, 6_000, 2026, 3, 1),
            contribution(&g, 9_000, 2026, 4, 1),
        ];
        let p = GoalProgress::new(g, contributions, d(2026, 10, 19));
        assert_eq!(p.saved, Money::new(15_000));
        assert_eq!(p.percentage, 100);
        assert!(p.achieved);
        assert_eq!(p.remaining, Money::ZERO);
        assert!((p.ratio - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn achieved_at_is_the_contribution_that_crossed_the_target() {
        let g = goal(10_000);
        // Out of order on purpose.
        let contributions = vec![
            contribution(&g, 500, 2026, 6, 1),
            contribution(&g, 5_000, 2026, 2, 1),
            contribution(&g, 5_000, 2026, 5, 1),
        ];
        let p = GoalProgress::new(g, contributions, d(2026, 10, 19));
        assert_eq!(
            p.achieved_at,
            Some(Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(p.contributions[0].amount, Money::new(5_000));
    }

    #[test]
    fn partial_progress_and_days_left() {
        let g = goal(30_000);
        let contributions = vec![contribution(&g, 10_000, 2026, 3, 1)];
        let p = GoalProgress::new(g, contributions, d(2026, 12, 1));
        assert_eq!(p.percentage, 33);
        assert!(!p.achieved);
        assert_eq!(p.achieved_at, None);
        assert_eq!(p.remaining, Money::new(20_000));
        assert_eq!(p.days_left, 30);

        let late = GoalProgress::new(goal(100), Vec::new(), d(2027, 1, 2));
        assert_eq!(late.days_left, -2);
        assert_eq!(late.percentage, 0);
    }

    #[test]
    fn overview_history_is_cumulative_per_month() {
        let g = goal(50_000);
        let contributions = vec![
            contribution(&g, 1_000, 2026, 8, 15),
            contribution(&g, 2_000, 2026, 10, 2),
            contribution(&g, 4_000, 2026, 10, 18),
        ];
        let progress = GoalProgress::new(g, contributions, d(2026, 10, 19));
        let months = last_n_months(d(2026, 10, 19), 4).unwrap();
        let overview = GoalOverview::new(vec![progress], &months);

        assert_eq!(overview.history.labels, vec!["Jul", "Aug", "Sep", "Oct"]);
        assert_eq!(
            overview.history.series[0].data,
            vec![
                Money::ZERO,
                Money::new(1_000),
                Money::new(1_000),
                Money::new(7_000)
            ]
        );
        assert_eq!(overview.total_saved, Money::new(7_000));
        assert_eq!(overview.total_target, Money::new(50_000));
        assert!((overview.average_percentage - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_overview() {
        let months = last_n_months(d(2026, 10, 19), 12).unwrap();
        let overview = GoalOverview::new(Vec::new(), &months);
        assert_eq!(overview.average_percentage, 0.0);
        assert_eq!(overview.history.labels.len(), 12);
        assert!(overview.history.series.is_empty());
    }
}
