use std::collections::HashSet;
use std::sync::Mutex;

use chrono::NaiveDate;
use tracing::info;

use crate::error::ScheduleError;
use crate::net_value::net_value;
use crate::plan::{FeeRule, Plan};
use crate::recalc::cascade_received_date_change;
use crate::schedule::generate_schedule;
use crate::store::ReceivableStore;
use crate::types::{Money, Receivable, Sale, SaleId};
use crate::ScheduleResult;

/// Facade over the scheduling core, serializing all mutations per sale.
///
/// A sale has a single logical owner: regenerating its schedule and running a
/// received-date cascade must never interleave, or due dates get computed
/// from stale anchors. Acquisition is try-style; contention surfaces as
/// [`ScheduleError::SaleBusy`] for the caller to retry with backoff.
/// Different sales proceed independently.
#[derive(Debug, Default)]
pub struct ScheduleEngine {
    in_flight: Mutex<HashSet<SaleId>>,
}

impl ScheduleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Net commission base for a sale's terms. Pure passthrough to
    /// [`net_value`], exposed for the surrounding CRUD layer.
    pub fn compute_net_value(
        &self,
        gross_price: Money,
        discount: Money,
        fee_rule: &FeeRule,
    ) -> Money {
        net_value(gross_price, discount, fee_rule)
    }

    /// Rebuild and persist the full receivable set for a sale's current
    /// terms. Any prior set is discarded wholesale, never patched.
    pub fn regenerate_schedule<S: ReceivableStore + ?Sized>(
        &self,
        store: &S,
        sale: &Sale,
        plan: &Plan,
    ) -> ScheduleResult<Vec<Receivable>> {
        if sale.plan_id != plan.id {
            return Err(ScheduleError::InvalidInput {
                field: "plan".into(),
                reason: "Sale references a different plan.".into(),
            });
        }

        let _guard = self.lock_sale(sale.id)?;
        let set = generate_schedule(sale, &plan.fee_rule, &plan.installments)?;
        store.replace_for_sale(sale.id, &set)?;
        info!(
            sale = %sale.id,
            proposal = %sale.proposal,
            receivables = set.len(),
            "receivable schedule regenerated"
        );
        Ok(set)
    }

    /// Entry point for the sale-update transaction boundary: invoked after
    /// the triggering receivable's received date has been durably stored.
    /// Returns the number of subsequent due dates rewritten.
    pub fn notify_received_date_changed<S: ReceivableStore + ?Sized>(
        &self,
        store: &S,
        trigger: &Receivable,
        previous: Option<NaiveDate>,
        current: Option<NaiveDate>,
    ) -> ScheduleResult<usize> {
        let _guard = self.lock_sale(trigger.sale_id)?;
        let rewritten = cascade_received_date_change(store, trigger, previous, current)?;
        if rewritten > 0 {
            info!(
                sale = %trigger.sale_id,
                installment = trigger.installment_number,
                rewritten,
                "received-date cascade applied"
            );
        }
        Ok(rewritten)
    }

    fn lock_sale(&self, sale_id: SaleId) -> ScheduleResult<SaleGuard<'_>> {
        let mut held = self
            .in_flight
            .lock()
            .map_err(|_| ScheduleError::StoreFailure("sale lock table poisoned".into()))?;
        if !held.insert(sale_id) {
            return Err(ScheduleError::SaleBusy(sale_id));
        }
        Ok(SaleGuard {
            table: &self.in_flight,
            sale_id,
        })
    }
}

/// Releases the per-sale slot on every exit path, including failure.
#[derive(Debug)]
struct SaleGuard<'a> {
    table: &'a Mutex<HashSet<SaleId>>,
    sale_id: SaleId,
}

impl Drop for SaleGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut held) = self.table.lock() {
            held.remove(&self.sale_id);
        }
    }
}
