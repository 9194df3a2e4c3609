use chrono::NaiveDate;
use tracing::debug;

use crate::schedule::installment_interval;
use crate::store::ReceivableStore;
use crate::types::Receivable;
use crate::ScheduleResult;

/// Propagate a received-date change through all subsequent receivables of the
/// same sale, in ascending installment order.
///
/// Called after the triggering receivable's own update has been durably
/// stored; the trigger and lower-numbered installments are never touched.
/// Each subsequent due date is re-expected 30 days after the running anchor,
/// where the anchor is the previous installment's received date if recorded,
/// otherwise its (possibly just rewritten) expected due date. Already-settled
/// installments are not skipped: their actual date threads into the anchor.
///
/// Re-saving an unchanged received date is a no-op, so retrying the same
/// change after a store failure is safe. A store failure aborts the cascade
/// as a whole; the caller must treat the propagation as not applied and
/// retry.
///
/// Returns the number of due dates rewritten.
pub fn cascade_received_date_change<S: ReceivableStore + ?Sized>(
    store: &S,
    trigger: &Receivable,
    previous: Option<NaiveDate>,
    current: Option<NaiveDate>,
) -> ScheduleResult<usize> {
    if previous == current {
        return Ok(0);
    }

    // Clearing the received date anchors back on the trigger's own
    // expectation, which restores the pre-receipt chain.
    let mut anchor = current.unwrap_or(trigger.due_date);
    let mut rewritten = 0;

    let subsequent = store.list_subsequent(trigger.sale_id, trigger.installment_number)?;
    for mut receivable in subsequent {
        let candidate = anchor + installment_interval();
        if candidate != receivable.due_date {
            debug!(
                sale = %receivable.sale_id,
                installment = receivable.installment_number,
                from = %receivable.due_date,
                to = %candidate,
                "rescheduling receivable"
            );
            receivable.due_date = candidate;
            store.save(&receivable)?;
            rewritten += 1;
        }
        anchor = receivable.received_date.unwrap_or(receivable.due_date);
    }

    Ok(rewritten)
}
