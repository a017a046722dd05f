use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Contribution, Goal, GoalOverview, GoalProgress, GoalUpdate, Money, NewGoal, ResultEngine,
    goals::{self, contributions},
    period::last_n_months,
    util::{normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

/// Months shown in the savings history chart.
const HISTORY_MONTHS: usize = 12;

fn validate_target(target: Money) -> ResultEngine<()> {
    target.ensure_storable("target amount")?;
    Ok(())
}

fn apply_text_patch(target: &mut Option<String>, patch: Option<&str>) {
    if let Some(value) = patch {
        *target = normalize_optional_text(Some(value));
    }
}

impl Engine {
    async fn contributions_of(
        &self,
        db: &DatabaseTransaction,
        goal_ids: Vec<Uuid>,
    ) -> ResultEngine<HashMap<Uuid, Vec<Contribution>>> {
        let mut grouped: HashMap<Uuid, Vec<Contribution>> = HashMap::new();
        for model in contributions::Entity::find()
            .filter(contributions::Column::GoalId.is_in(goal_ids))
            .order_by_asc(contributions::Column::ContributedAt)
            .all(db)
            .await?
        {
            let contribution = Contribution::from(model);
            grouped
                .entry(contribution.goal_id)
                .or_default()
                .push(contribution);
        }
        Ok(grouped)
    }

    /// Progress of every goal of `user_id`, closest deadline first.
    pub(super) async fn goal_progresses(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<Vec<GoalProgress>> {
        let goals: Vec<Goal> = goals::Entity::find()
            .filter(goals::Column::UserId.eq(user_id))
            .order_by_asc(goals::Column::Deadline)
            .order_by_asc(goals::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(Goal::from)
            .collect();
        let mut contributions = self
            .contributions_of(db, goals.iter().map(|g| g.id).collect())
            .await?;

        Ok(goals
            .into_iter()
            .map(|goal| {
                let list = contributions.remove(&goal.id).unwrap_or_default();
                GoalProgress::new(goal, list, today)
            })
            .collect())
    }

    async fn progress_of(
        &self,
        db: &DatabaseTransaction,
        goal: Goal,
        today: NaiveDate,
    ) -> ResultEngine<GoalProgress> {
        let mut contributions = self.contributions_of(db, vec![goal.id]).await?;
        let list = contributions.remove(&goal.id).unwrap_or_default();
        Ok(GoalProgress::new(goal, list, today))
    }

    pub async fn create_goal(&self, cmd: NewGoal, now: DateTime<Utc>) -> ResultEngine<Goal> {
        let name = normalize_required_name(&cmd.name, "goal")?;
        validate_target(cmd.target)?;
        with_tx!(self, |db_tx| {
            let goal = Goal {
                id: Uuid::new_v4(),
                user_id: cmd.user_id,
                name,
                description: normalize_optional_text(cmd.description.as_deref()),
                target: cmd.target,
                deadline: cmd.deadline,
                icon: normalize_optional_text(cmd.icon.as_deref()),
                color: normalize_optional_text(cmd.color.as_deref()),
                created_at: now,
            };
            goals::ActiveModel::from(&goal).insert(&db_tx).await?;
            Ok(goal)
        })
    }

    pub async fn goal_progress(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<GoalProgress> {
        with_tx!(self, |db_tx| {
            let goal = Goal::from(self.require_goal(&db_tx, user_id, goal_id).await?);
            self.progress_of(&db_tx, goal, today).await
        })
    }

    pub async fn update_goal(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        update: GoalUpdate,
    ) -> ResultEngine<Goal> {
        with_tx!(self, |db_tx| {
            let mut goal = Goal::from(self.require_goal(&db_tx, user_id, goal_id).await?);
            if let Some(name) = update.name.as_deref() {
                goal.name = normalize_required_name(name, "goal")?;
            }
            if let Some(target) = update.target {
                validate_target(target)?;
                goal.target = target;
            }
            if let Some(deadline) = update.deadline {
                goal.deadline = deadline;
            }
            apply_text_patch(&mut goal.description, update.description.as_deref());
            apply_text_patch(&mut goal.icon, update.icon.as_deref());
            apply_text_patch(&mut goal.color, update.color.as_deref());

            goals::ActiveModel::from(&goal).update(&db_tx).await?;
            Ok(goal)
        })
    }

    /// Deletes a goal together with its contributions.
    pub async fn delete_goal(&self, user_id: Uuid, goal_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, user_id, goal_id).await?;
            contributions::Entity::delete_many()
                .filter(contributions::Column::GoalId.eq(goal_id))
                .exec(&db_tx)
                .await?;
            goals::Entity::delete_by_id(goal_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Records money put aside for a goal and returns the new progress.
    ///
    /// Contributions keep being accepted after the target is reached.
    pub async fn add_contribution(
        &self,
        user_id: Uuid,
        goal_id: Uuid,
        amount: Money,
        now: DateTime<Utc>,
    ) -> ResultEngine<GoalProgress> {
        amount.ensure_storable("contribution")?;
        with_tx!(self, |db_tx| {
            let goal = Goal::from(self.require_goal(&db_tx, user_id, goal_id).await?);
            let contribution = Contribution {
                id: Uuid::new_v4(),
                goal_id,
                amount,
                contributed_at: now,
            };
            contributions::ActiveModel::from(&contribution)
                .insert(&db_tx)
                .await?;
            self.progress_of(&db_tx, goal, now.date_naive()).await
        })
    }

    /// All goals with totals and a cumulative 12-month savings history.
    pub async fn goal_overview(&self, user_id: Uuid, today: NaiveDate) -> ResultEngine<GoalOverview> {
        with_tx!(self, |db_tx| {
            let goals = self.goal_progresses(&db_tx, user_id, today).await?;
            let months = last_n_months(today, HISTORY_MONTHS)?;
            Ok(GoalOverview::new(goals, &months))
        })
    }
}
