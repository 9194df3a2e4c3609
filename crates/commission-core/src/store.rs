use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::error::ScheduleError;
use crate::types::{Receivable, ReceivableId, SaleId};
use crate::ScheduleResult;

/// Durable keyed storage the schedule engine reads and writes against.
///
/// Implementations supply their own synchronization and transaction scope;
/// every method is a blocking call and any failure surfaces as
/// [`ScheduleError::StoreFailure`] for the operation as a whole.
pub trait ReceivableStore {
    /// All receivables of a sale, ascending by installment number.
    fn list_for_sale(&self, sale_id: SaleId) -> ScheduleResult<Vec<Receivable>>;

    fn get(&self, id: ReceivableId) -> ScheduleResult<Option<Receivable>>;

    /// Receivables of the sale with installment number strictly greater than
    /// `after_number`, ascending.
    fn list_subsequent(
        &self,
        sale_id: SaleId,
        after_number: u32,
    ) -> ScheduleResult<Vec<Receivable>>;

    /// Insert or overwrite one receivable.
    fn save(&self, receivable: &Receivable) -> ScheduleResult<()>;

    /// Atomically discard any existing set for the sale and persist the
    /// replacement. All-or-nothing.
    fn replace_for_sale(&self, sale_id: SaleId, set: &[Receivable]) -> ScheduleResult<()>;

    fn delete_all_for_sale(&self, sale_id: SaleId) -> ScheduleResult<()>;
}

/// Reference in-memory store, used in tests and by embedders without a
/// database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<ReceivableId, Receivable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or correct a receivable's actual received date, the collaborator
    /// mutation that precedes [`crate::recalc::cascade_received_date_change`].
    /// A `settlement_ref` of `None` keeps any reference already on file, so a
    /// date-only correction cannot erase it. Returns the updated row.
    pub fn update_received_date(
        &self,
        id: ReceivableId,
        received_date: Option<NaiveDate>,
        settlement_ref: Option<String>,
    ) -> ScheduleResult<Receivable> {
        let mut rows = self.lock_rows()?;
        let receivable = rows
            .get_mut(&id)
            .ok_or(ScheduleError::ReceivableNotFound(id))?;
        receivable.received_date = received_date;
        if settlement_ref.is_some() {
            receivable.settlement_ref = settlement_ref;
        }
        Ok(receivable.clone())
    }

    fn lock_rows(&self) -> ScheduleResult<std::sync::MutexGuard<'_, HashMap<ReceivableId, Receivable>>> {
        self.rows
            .lock()
            .map_err(|_| ScheduleError::StoreFailure("receivable store mutex poisoned".into()))
    }
}

impl ReceivableStore for MemoryStore {
    fn list_for_sale(&self, sale_id: SaleId) -> ScheduleResult<Vec<Receivable>> {
        let rows = self.lock_rows()?;
        let mut out: Vec<Receivable> = rows
            .values()
            .filter(|r| r.sale_id == sale_id)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.installment_number);
        Ok(out)
    }

    fn get(&self, id: ReceivableId) -> ScheduleResult<Option<Receivable>> {
        let rows = self.lock_rows()?;
        Ok(rows.get(&id).cloned())
    }

    fn list_subsequent(
        &self,
        sale_id: SaleId,
        after_number: u32,
    ) -> ScheduleResult<Vec<Receivable>> {
        let mut out = self.list_for_sale(sale_id)?;
        out.retain(|r| r.installment_number > after_number);
        Ok(out)
    }

    fn save(&self, receivable: &Receivable) -> ScheduleResult<()> {
        let mut rows = self.lock_rows()?;
        rows.insert(receivable.id, receivable.clone());
        Ok(())
    }

    fn replace_for_sale(&self, sale_id: SaleId, set: &[Receivable]) -> ScheduleResult<()> {
        let mut rows = self.lock_rows()?;
        rows.retain(|_, r| r.sale_id != sale_id);
        for receivable in set {
            rows.insert(receivable.id, receivable.clone());
        }
        Ok(())
    }

    fn delete_all_for_sale(&self, sale_id: SaleId) -> ScheduleResult<()> {
        let mut rows = self.lock_rows()?;
        rows.retain(|_, r| r.sale_id != sale_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn receivable(sale_id: SaleId, number: u32) -> Receivable {
        Receivable {
            id: Uuid::new_v4(),
            sale_id,
            installment_number: number,
            amount: dec!(100.00),
            due_date: date(2023, 1, 31),
            received_date: None,
            settlement_ref: None,
        }
    }

    #[test]
    fn test_list_for_sale_is_ordered_and_scoped() {
        let store = MemoryStore::new();
        let sale = Uuid::new_v4();
        let other = Uuid::new_v4();
        for number in [3, 1, 2] {
            store.save(&receivable(sale, number)).unwrap();
        }
        store.save(&receivable(other, 1)).unwrap();

        let rows = store.list_for_sale(sale).unwrap();
        let numbers: Vec<u32> = rows.iter().map(|r| r.installment_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_list_subsequent_is_strictly_greater() {
        let store = MemoryStore::new();
        let sale = Uuid::new_v4();
        for number in 1..=4 {
            store.save(&receivable(sale, number)).unwrap();
        }

        let rows = store.list_subsequent(sale, 2).unwrap();
        let numbers: Vec<u32> = rows.iter().map(|r| r.installment_number).collect();
        assert_eq!(numbers, vec![3, 4]);
    }

    #[test]
    fn test_replace_discards_stale_set() {
        let store = MemoryStore::new();
        let sale = Uuid::new_v4();
        store
            .replace_for_sale(sale, &[receivable(sale, 1), receivable(sale, 2)])
            .unwrap();
        store.replace_for_sale(sale, &[receivable(sale, 1)]).unwrap();

        assert_eq!(store.list_for_sale(sale).unwrap().len(), 1);
    }

    #[test]
    fn test_update_received_date_unknown_id() {
        let store = MemoryStore::new();
        let err = store
            .update_received_date(Uuid::new_v4(), Some(date(2023, 1, 20)), None)
            .unwrap_err();
        assert!(matches!(err, ScheduleError::ReceivableNotFound(_)));
    }

    #[test]
    fn test_update_received_date_roundtrip() {
        let store = MemoryStore::new();
        let sale = Uuid::new_v4();
        let row = receivable(sale, 1);
        store.save(&row).unwrap();

        let updated = store
            .update_received_date(row.id, Some(date(2023, 1, 20)), Some("EXT-42".into()))
            .unwrap();
        assert_eq!(updated.received_date, Some(date(2023, 1, 20)));
        assert_eq!(updated.settlement_ref.as_deref(), Some("EXT-42"));
        assert_eq!(store.get(row.id).unwrap().unwrap(), updated);
    }

    #[test]
    fn test_date_only_correction_keeps_settlement_ref() {
        let store = MemoryStore::new();
        let sale = Uuid::new_v4();
        let row = receivable(sale, 1);
        store.save(&row).unwrap();
        store
            .update_received_date(row.id, Some(date(2023, 1, 20)), Some("EXT-42".into()))
            .unwrap();

        // The received date is corrected without restating the reference.
        let updated = store
            .update_received_date(row.id, Some(date(2023, 1, 22)), None)
            .unwrap();
        assert_eq!(updated.received_date, Some(date(2023, 1, 22)));
        assert_eq!(updated.settlement_ref.as_deref(), Some("EXT-42"));
    }

    #[test]
    fn test_delete_all_cascades_with_sale() {
        let store = MemoryStore::new();
        let sale = Uuid::new_v4();
        let keep = Uuid::new_v4();
        store.save(&receivable(sale, 1)).unwrap();
        store.save(&receivable(keep, 1)).unwrap();

        store.delete_all_for_sale(sale).unwrap();
        assert!(store.list_for_sale(sale).unwrap().is_empty());
        assert_eq!(store.list_for_sale(keep).unwrap().len(), 1);
    }
}
