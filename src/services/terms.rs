use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

use crate::models::{PaymentTask, TaskStatus, TaskType};

static DEPOSIT_PCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)deposit\s*(\d+)\s*%").expect("hardcoded regex should be valid")
});
static FINAL_PCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)final(?:\s+payment)?\s*(\d+)\s*%").expect("hardcoded regex should be valid")
});

const DEPOSIT_LEAD_DAYS: i64 = 7;
const FINAL_LEAD_DAYS: i64 = 1;
const FULL_LEAD_DAYS: i64 = 3;

/// Structured payment terms parsed out of a product's free-text
/// payment-method descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentTerm {
    Split { deposit_pct: u32, final_pct: u32 },
    Full,
}

impl PaymentTerm {
    /// The split pattern is checked first and owns the descriptor whenever
    /// both a deposit and a final marker appear; if either percentage fails
    /// to capture the whole descriptor yields no terms, the full-payment
    /// branch is not consulted. Unrecognized descriptors return None.
    pub fn parse(descriptor: &str) -> Option<PaymentTerm> {
        let lower = descriptor.to_lowercase();
        if lower.contains("deposit") && lower.contains("final") {
            let deposit_pct = DEPOSIT_PCT
                .captures(descriptor)
                .and_then(|caps| caps[1].parse::<u32>().ok());
            let final_pct = FINAL_PCT
                .captures(descriptor)
                .and_then(|caps| caps[1].parse::<u32>().ok());
            return match (deposit_pct, final_pct) {
                (Some(deposit_pct), Some(final_pct)) => Some(PaymentTerm::Split {
                    deposit_pct,
                    final_pct,
                }),
                _ => None,
            };
        }
        if lower.contains("full payment") {
            return Some(PaymentTerm::Full);
        }
        None
    }

    /// Expands the terms into pending payment tasks. Percentages are not
    /// required to sum to 100; each amount is computed from its own
    /// percentage.
    pub fn expand(&self, total_amount: f64, reference_date: NaiveDate) -> Vec<PaymentTask> {
        match *self {
            PaymentTerm::Split {
                deposit_pct,
                final_pct,
            } => vec![
                new_task(
                    TaskType::Deposit,
                    format!("Deposit {}%", deposit_pct),
                    total_amount * deposit_pct as f64 / 100.0,
                    reference_date - Duration::days(DEPOSIT_LEAD_DAYS),
                ),
                new_task(
                    TaskType::FinalPayment,
                    format!("Final payment {}%", final_pct),
                    total_amount * final_pct as f64 / 100.0,
                    reference_date - Duration::days(FINAL_LEAD_DAYS),
                ),
            ],
            PaymentTerm::Full => vec![new_task(
                TaskType::FullPayment,
                "Full payment".to_string(),
                total_amount,
                reference_date - Duration::days(FULL_LEAD_DAYS),
            )],
        }
    }
}

/// Convenience over parse + expand. A descriptor matching neither pattern
/// produces an empty list; callers treat that as valid, not as an error.
pub fn expand_payment_method(
    descriptor: &str,
    total_amount: f64,
    reference_date: NaiveDate,
) -> Vec<PaymentTask> {
    match PaymentTerm::parse(descriptor) {
        Some(term) => term.expand(total_amount, reference_date),
        None => Vec::new(),
    }
}

fn new_task(task_type: TaskType, description: String, amount_due: f64, due_date: NaiveDate) -> PaymentTask {
    PaymentTask {
        id: uuid::Uuid::new_v4().to_string(),
        task_type,
        description,
        amount_due,
        due_date,
        status: TaskStatus::Pending,
        paid_at: None,
        invoice_link: None,
    }
}
