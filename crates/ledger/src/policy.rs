//! Loan period and fine rate.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use libris_core::{DomainError, DomainResult, Money};

/// Loan terms applied by the ledger. Loaded once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPolicy {
    loan_period_days: u32,
    fine_per_day: Money,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            fine_per_day: Money::from_minor(50),
        }
    }
}

impl LoanPolicy {
    pub fn new(loan_period_days: u32, fine_per_day: Money) -> DomainResult<Self> {
        if loan_period_days == 0 {
            return Err(DomainError::validation("loan period must be at least one day"));
        }
        Ok(Self {
            loan_period_days,
            fine_per_day,
        })
    }

    pub fn loan_period_days(&self) -> u32 {
        self.loan_period_days
    }

    pub fn fine_per_day(&self) -> Money {
        self.fine_per_day
    }

    pub fn due_date(&self, issued_at: DateTime<Utc>) -> DomainResult<DateTime<Utc>> {
        issued_at
            .checked_add_signed(TimeDelta::days(i64::from(self.loan_period_days)))
            .ok_or_else(|| DomainError::validation("due date out of range"))
    }

    /// Whole days between `due` and `at`, rounding any partial day up.
    /// Zero when `at` is on or before `due`.
    pub fn overdue_days(due: DateTime<Utc>, at: DateTime<Utc>) -> u64 {
        let late = at - due;
        if late <= TimeDelta::zero() {
            return 0;
        }
        let whole = late.num_days();
        let days = if late > TimeDelta::days(whole) { whole + 1 } else { whole };
        u64::try_from(days).unwrap_or(0)
    }

    pub fn fine_for(&self, due: DateTime<Utc>, at: DateTime<Utc>) -> Money {
        self.fine_per_day.times(Self::overdue_days(due, at))
    }
}
