//! Conversions between engine values and API bodies.

use api_types::{
    TransactionKind as ApiKind,
    budget::{BudgetAlertView, BudgetOverviewResponse, BudgetPeriod as ApiPeriod, BudgetStatus as ApiStatus, BudgetView},
    category::{CategoryStatsView, CategoryView},
    dashboard::{CategorySliceView, DashboardResponse, PeriodSummaryView, TrendPointView},
    goal::{ContributionView, GoalHistoryView, GoalOverviewResponse, GoalSeriesView, GoalView},
    transaction::{CategoryRef, TransactionList, TransactionListResponse, TransactionView},
    user::{Theme as ApiTheme, UserView},
};
use engine::{
    BudgetOverview, BudgetPeriod, BudgetReport, BudgetStatus, Category, CategorySlice,
    CategoryStats, Dashboard, GoalOverview, GoalProgress, PeriodSummary, Theme, TransactionEntry,
    TransactionFilter, TransactionKind, TransactionPage, TrendPoint, User,
};

pub fn kind_from_api(kind: ApiKind) -> TransactionKind {
    match kind {
        ApiKind::Income => TransactionKind::Income,
        ApiKind::Expense => TransactionKind::Expense,
    }
}

fn kind_to_api(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Income => ApiKind::Income,
        TransactionKind::Expense => ApiKind::Expense,
    }
}

pub fn period_from_api(period: ApiPeriod) -> BudgetPeriod {
    match period {
        ApiPeriod::Weekly => BudgetPeriod::Weekly,
        ApiPeriod::Monthly => BudgetPeriod::Monthly,
        ApiPeriod::Quarterly => BudgetPeriod::Quarterly,
        ApiPeriod::Yearly => BudgetPeriod::Yearly,
    }
}

fn period_to_api(period: BudgetPeriod) -> ApiPeriod {
    match period {
        BudgetPeriod::Weekly => ApiPeriod::Weekly,
        BudgetPeriod::Monthly => ApiPeriod::Monthly,
        BudgetPeriod::Quarterly => ApiPeriod::Quarterly,
        BudgetPeriod::Yearly => ApiPeriod::Yearly,
    }
}

fn status_to_api(status: BudgetStatus) -> ApiStatus {
    match status {
        BudgetStatus::Green => ApiStatus::Green,
        BudgetStatus::Yellow => ApiStatus::Yellow,
        BudgetStatus::Red => ApiStatus::Red,
    }
}

pub fn theme_from_api(theme: ApiTheme) -> Theme {
    match theme {
        ApiTheme::Light => Theme::Light,
        ApiTheme::Dark => Theme::Dark,
    }
}

pub fn user(user: User) -> UserView {
    UserView {
        id: user.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        theme: match user.theme {
            Theme::Light => ApiTheme::Light,
            Theme::Dark => ApiTheme::Dark,
        },
        created_at: user.created_at,
    }
}

pub fn filter(query: &TransactionList) -> TransactionFilter {
    TransactionFilter {
        from: query.from,
        to: query.to,
        category_id: query.category_id,
        kind: query.kind.map(kind_from_api),
    }
}

pub fn category(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: kind_to_api(category.kind),
        icon: category.icon,
        color: category.color,
        description: category.description,
    }
}

pub fn category_stats(stats: CategoryStats) -> CategoryStatsView {
    CategoryStatsView {
        category: category(stats.category),
        transaction_count: stats.transaction_count,
        total_minor: stats.total_amount.cents(),
    }
}

pub fn transaction(entry: TransactionEntry) -> TransactionView {
    let tx = entry.transaction;
    TransactionView {
        id: tx.id,
        kind: kind_to_api(tx.kind),
        amount_minor: tx.amount.cents(),
        occurred_on: tx.occurred_on,
        category: entry.category.map(|c| CategoryRef {
            id: c.id,
            name: c.name,
            color: c.color,
        }),
        note: tx.note,
        created_at: tx.created_at,
    }
}

pub fn transaction_page(page: TransactionPage) -> TransactionListResponse {
    TransactionListResponse {
        transactions: page.items.into_iter().map(transaction).collect(),
        page: page.page,
        page_size: page.page_size,
        total_items: page.total_items,
        total_pages: page.total_pages,
        total_income_minor: page.totals.income.cents(),
        total_expenses_minor: page.totals.expenses.cents(),
    }
}

pub fn budget(report: BudgetReport) -> BudgetView {
    BudgetView {
        id: report.budget.id,
        category_id: report.category.id,
        category_name: report.category.name,
        category_color: report.category.color,
        limit_minor: report.budget.limit.cents(),
        period: period_to_api(report.budget.period),
        description: report.budget.description,
        window_start: report.window.start,
        window_end: report.window.last_day(),
        spent_minor: report.spent.cents(),
        remaining_minor: report.remaining.cents(),
        percentage_used: report.percentage_used,
        over_budget: report.over_budget,
        status: status_to_api(report.status),
    }
}

pub fn budget_overview(overview: BudgetOverview) -> BudgetOverviewResponse {
    BudgetOverviewResponse {
        total_limit_minor: overview.total_limit.cents(),
        total_spent_minor: overview.total_spent.cents(),
        over_by_minor: overview.over_by.cents(),
        alerts: overview
            .alerts
            .into_iter()
            .map(|alert| BudgetAlertView {
                status: status_to_api(alert.status),
                category: alert.category,
                message: alert.message,
            })
            .collect(),
        budgets: overview.budgets.into_iter().map(budget).collect(),
    }
}

pub fn goal(progress: GoalProgress) -> GoalView {
    let goal = progress.goal;
    GoalView {
        id: goal.id,
        name: goal.name,
        description: goal.description,
        icon: goal.icon,
        color: goal.color,
        target_minor: goal.target.cents(),
        deadline: goal.deadline,
        saved_minor: progress.saved.cents(),
        remaining_minor: progress.remaining.cents(),
        percentage: progress.percentage,
        achieved: progress.achieved,
        achieved_at: progress.achieved_at,
        days_left: progress.days_left,
        contributions: progress
            .contributions
            .into_iter()
            .map(|c| ContributionView {
                id: c.id,
                amount_minor: c.amount.cents(),
                contributed_at: c.contributed_at,
            })
            .collect(),
    }
}

pub fn goal_overview(overview: GoalOverview) -> GoalOverviewResponse {
    GoalOverviewResponse {
        total_target_minor: overview.total_target.cents(),
        total_saved_minor: overview.total_saved.cents(),
        average_percentage: overview.average_percentage,
        history: GoalHistoryView {
            labels: overview.history.labels,
            series: overview
                .history
                .series
                .into_iter()
                .map(|s| GoalSeriesView {
                    goal_id: s.goal_id,
                    name: s.name,
                    color: s.color,
                    data_minor: s.data.into_iter().map(|m| m.cents()).collect(),
                })
                .collect(),
        },
        goals: overview.goals.into_iter().map(goal).collect(),
    }
}

fn period_summary(summary: PeriodSummary) -> PeriodSummaryView {
    PeriodSummaryView {
        start: summary.window.start,
        end: summary.window.last_day(),
        income_minor: summary.income.cents(),
        expenses_minor: summary.expenses.cents(),
        net_minor: summary.net.cents(),
    }
}

pub fn slice(slice: CategorySlice) -> CategorySliceView {
    CategorySliceView {
        category_id: slice.category_id,
        label: slice.label,
        color: slice.color,
        total_minor: slice.total.cents(),
    }
}

pub fn trend_point(point: TrendPoint) -> TrendPointView {
    TrendPointView {
        label: point.label,
        income_minor: point.income.cents(),
        expenses_minor: point.expenses.cents(),
    }
}

pub fn dashboard(dash: Dashboard) -> DashboardResponse {
    DashboardResponse {
        total_balance_minor: dash.total_balance.cents(),
        current_month: period_summary(dash.current_month),
        previous_month: period_summary(dash.previous_month),
        income_change: dash.income_change,
        expense_change: dash.expense_change,
        expense_breakdown: dash.expense_breakdown.into_iter().map(slice).collect(),
        trend: dash.trend.into_iter().map(trend_point).collect(),
        recent_transactions: dash
            .recent_transactions
            .into_iter()
            .map(transaction)
            .collect(),
        top_budgets: dash.top_budgets.into_iter().map(budget).collect(),
        top_goals: dash.top_goals.into_iter().map(goal).collect(),
    }
}
