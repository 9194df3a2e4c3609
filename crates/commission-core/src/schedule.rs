use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::net_value::net_value;
use crate::plan::{FeeRule, InstallmentDef};
use crate::types::{Receivable, Sale};
use crate::ScheduleResult;

const HUNDRED: Decimal = dec!(100);

/// Carriers settle on a 30-day cycle, counted in days rather than calendar
/// months.
pub const DAYS_BETWEEN_INSTALLMENTS: i64 = 30;

/// Upper bound on installment numbers, ten years of 30-day cycles. Keeps the
/// fallback date shift inside chrono's representable range.
pub const MAX_INSTALLMENT_NUMBER: u32 = 120;

pub(crate) fn installment_interval() -> Duration {
    Duration::days(DAYS_BETWEEN_INSTALLMENTS)
}

/// Generate the full receivable set for a sale from its plan's installment
/// breakdown.
///
/// The first installment is commission-bearing: its amount comes off the net
/// value and it falls due 30 days after the contract effective date. Later
/// installments are pass-through: their amounts come off the gross price and
/// each falls due 30 days after the previous installment's expected due date
/// (nothing has been received at generation time).
///
/// Pure computation; persisting the set — and discarding any prior set for
/// the same sale first — is the caller's responsibility.
pub fn generate_schedule(
    sale: &Sale,
    fee_rule: &FeeRule,
    defs: &[InstallmentDef],
) -> ScheduleResult<Vec<Receivable>> {
    validate_terms(sale, fee_rule, defs)?;

    let net = net_value(sale.gross_price, sale.discount, fee_rule);
    debug!(
        sale = %sale.id,
        %net,
        installments = defs.len(),
        "generating receivable schedule"
    );

    let mut receivables = Vec::with_capacity(defs.len());
    let mut prior_due: Option<NaiveDate> = None;

    for def in defs {
        let (amount, due_date) = if def.number == 1 {
            (
                net * (def.share / HUNDRED),
                sale.effective_date + installment_interval(),
            )
        } else {
            // Fallback when no prior due date exists, i.e. the plan's
            // numbering does not start at 1: anchor on the effective date
            // shifted by the skipped 30-day cycles.
            let base = prior_due.unwrap_or_else(|| {
                sale.effective_date
                    + Duration::days(DAYS_BETWEEN_INSTALLMENTS * (i64::from(def.number) - 1))
            });
            (
                sale.gross_price * (def.share / HUNDRED),
                base + installment_interval(),
            )
        };

        receivables.push(Receivable {
            id: Uuid::new_v4(),
            sale_id: sale.id,
            installment_number: def.number,
            amount,
            due_date,
            received_date: None,
            settlement_ref: None,
        });
        prior_due = Some(due_date);
    }

    Ok(receivables)
}

// ---------------------------------------------------------------------------
// Precondition validation
// ---------------------------------------------------------------------------

fn validate_terms(sale: &Sale, fee_rule: &FeeRule, defs: &[InstallmentDef]) -> ScheduleResult<()> {
    if sale.gross_price < Decimal::ZERO {
        return Err(invalid("gross_price", "Gross price cannot be negative."));
    }
    if sale.discount < Decimal::ZERO {
        return Err(invalid("discount", "Discount cannot be negative."));
    }
    let fee_value = match fee_rule {
        FeeRule::Fixed(v) | FeeRule::Percentage(v) => *v,
    };
    if fee_value < Decimal::ZERO {
        return Err(invalid("fee_rule", "Fee value cannot be negative."));
    }
    if defs.is_empty() {
        return Err(invalid(
            "installments",
            "At least one installment definition is required.",
        ));
    }
    if defs.iter().any(|d| d.number == 0) {
        return Err(invalid(
            "installments",
            "Installment numbers are 1-based.",
        ));
    }
    if defs.iter().any(|d| d.number > MAX_INSTALLMENT_NUMBER) {
        return Err(invalid(
            "installments",
            "Installment number exceeds the supported maximum.",
        ));
    }
    if defs.windows(2).any(|w| w[0].number >= w[1].number) {
        return Err(invalid(
            "installments",
            "Installment numbers must be strictly ascending.",
        ));
    }
    if defs.iter().any(|d| d.share < Decimal::ZERO) {
        return Err(invalid(
            "installments",
            "Installment shares cannot be negative.",
        ));
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> ScheduleError {
    ScheduleError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}
