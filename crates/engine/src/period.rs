//! Calendar periods used by budgets and dashboard trends.
//!
//! A [`PeriodWindow`] is a half-open range of dates `[start, end)`.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Recurrence of a budget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Returns the window of this period that contains `date`.
    pub fn window(self, date: NaiveDate) -> ResultEngine<PeriodWindow> {
        let start = match self {
            Self::Weekly => {
                let offset = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(offset))
            }
            Self::Monthly => date.with_day(1),
            Self::Quarterly => {
                let month = ((date.month0() / 3) * 3) + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1)
            }
            Self::Yearly => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        }
        .ok_or_else(|| out_of_range(date))?;

        let end = self.advance(start).ok_or_else(|| out_of_range(date))?;
        Ok(PeriodWindow {
            period: self,
            start,
            end,
        })
    }

    fn advance(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Weekly => start.checked_add_days(Days::new(7)),
            Self::Monthly => start.checked_add_months(Months::new(1)),
            Self::Quarterly => start.checked_add_months(Months::new(3)),
            Self::Yearly => start.checked_add_months(Months::new(12)),
        }
    }

    fn rewind(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Weekly => start.checked_sub_days(Days::new(7)),
            Self::Monthly => start.checked_sub_months(Months::new(1)),
            Self::Quarterly => start.checked_sub_months(Months::new(3)),
            Self::Yearly => start.checked_sub_months(Months::new(12)),
        }
    }
}

impl TryFrom<&str> for BudgetPeriod {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidInput(format!(
                "invalid budget period: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub period: BudgetPeriod,
    /// First day of the window.
    pub start: NaiveDate,
    /// First day after the window.
    pub end: NaiveDate,
}

impl PeriodWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Last day that still belongs to the window.
    pub fn last_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.start)
    }

    /// The window immediately before this one.
    pub fn previous(&self) -> ResultEngine<PeriodWindow> {
        let start = self
            .period
            .rewind(self.start)
            .ok_or_else(|| out_of_range(self.start))?;
        Ok(PeriodWindow {
            period: self.period,
            start,
            end: self.start,
        })
    }

    /// English month name of the window start, e.g. `"March"`.
    pub fn month_label(&self) -> String {
        self.start.format("%B").to_string()
    }
}

/// The `n` monthly windows ending with the month of `today`, oldest first.
pub fn last_n_months(today: NaiveDate, n: usize) -> ResultEngine<Vec<PeriodWindow>> {
    let mut windows = Vec::with_capacity(n);
    if n == 0 {
        return Ok(windows);
    }
    let mut current = BudgetPeriod::Monthly.window(today)?;
    windows.push(current);
    for _ in 1..n {
        current = current.previous()?;
        windows.push(current);
    }
    windows.reverse();
    Ok(windows)
}

fn out_of_range(date: NaiveDate) -> EngineError {
    EngineError::InvalidDate(format!("date out of supported range: {date}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekly_window_starts_on_monday() {
        // 2026-10-21 is a Wednesday.
        let w = BudgetPeriod::Weekly.window(d(2026, 10, 21)).unwrap();
        assert_eq!(w.start, d(2026, 10, 19));
        assert_eq!(w.end, d(2026, 10, 26));
        assert_eq!(w.last_day(), d(2026, 10, 25));
    }

    #[test]
    fn monthly_window_handles_december() {
        let w = BudgetPeriod::Monthly.window(d(2025, 12, 31)).unwrap();
        assert_eq!(w.start, d(2025, 12, 1));
        assert_eq!(w.end, d(2026, 1, 1));
    }

    #[test]
    fn quarterly_and_yearly_windows() {
        let q = BudgetPeriod::Quarterly.window(d(2026, 8, 15)).unwrap();
        assert_eq!((q.start, q.end), (d(2026, 7, 1), d(2026, 10, 1)));

        let y = BudgetPeriod::Yearly.window(d(2024, 2, 29)).unwrap();
        assert_eq!((y.start, y.end), (d(2024, 1, 1), d(2025, 1, 1)));
    }

    #[test]
    fn windows_contain_their_reference_date_and_are_contiguous() {
        let periods = [
            BudgetPeriod::Weekly,
            BudgetPeriod::Monthly,
            BudgetPeriod::Quarterly,
            BudgetPeriod::Yearly,
        ];
        let mut date = d(2023, 1, 1);
        while date < d(2025, 3, 1) {
            for period in periods {
                let w = period.window(date).unwrap();
                assert!(w.contains(date), "{period:?} {date}");
                let prev = w.previous().unwrap();
                assert_eq!(prev.end, w.start);
                assert!(!prev.contains(date));
            }
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn last_n_months_is_oldest_first() {
        let months = last_n_months(d(2026, 2, 10), 3).unwrap();
        let starts: Vec<_> = months.iter().map(|w| w.start).collect();
        assert_eq!(starts, vec![d(2025, 12, 1), d(2026, 1, 1), d(2026, 2, 1)]);
        assert_eq!(months[0].month_label(), "December");
    }

    #[test]
    fn period_round_trips_through_str() {
        for period in [
            BudgetPeriod::Weekly,
            BudgetPeriod::Monthly,
            BudgetPeriod::Quarterly,
            BudgetPeriod::Yearly,
        ] {
            assert_eq!(BudgetPeriod::try_from(period.as_str()).unwrap(), period);
        }
        assert!(BudgetPeriod::try_from("daily").is_err());
    }
}
