//! Financing view over a derived total.
//!
//! Presentational only: the quote is computed on demand from `total_cost`
//! and never stored as session state.

use serde::{Deserialize, Serialize};

/// Fixed loan terms offered by a wizard
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancingTerms {
    pub months: u32,
    /// Nominal annual interest rate in percent (e.g. 9.5)
    pub annual_rate_pct: f64,
}

/// Installment breakdown for one principal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinancingQuote {
    pub principal: u64,
    pub months: u32,
    pub annual_rate_pct: f64,
    pub installment: f64,
    pub total_payable: f64,
    pub total_interest: f64,
}

impl FinancingTerms {
    pub fn new(months: u32, annual_rate_pct: f64) -> Self {
        Self {
            months,
            annual_rate_pct,
        }
    }

    /// Monthly installment of a standard amortizing loan:
    /// `P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r` the monthly rate.
    ///
    /// A zero rate splits the principal evenly; zero months is treated as a
    /// single payment.
    pub fn installment(&self, principal: u64) -> f64 {
        let principal = principal as f64;
        if self.months == 0 {
            return principal;
        }
        let n = f64::from(self.months);
        let r = self.annual_rate_pct / 12.0 / 100.0;
        if r == 0.0 {
            return principal / n;
        }
        let growth = (1.0 + r).powf(n);
        principal * r * growth / (growth - 1.0)
    }

    pub fn quote(&self, principal: u64) -> FinancingQuote {
        let installment = self.installment(principal);
        let total_payable = installment * f64::from(self.months.max(1));
        FinancingQuote {
            principal,
            months: self.months,
            annual_rate_pct: self.annual_rate_pct,
            installment,
            total_payable,
            total_interest: total_payable - principal as f64,
        }
    }
}
