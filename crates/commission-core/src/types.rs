use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentage points (50 = 50%). Installment shares and percentage fees use these.
pub type Percent = Decimal;

pub type PlanId = Uuid;
pub type SaleId = Uuid;
pub type ReceivableId = Uuid;

/// A commission sale: the commercial terms a receivable schedule derives from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub plan_id: PlanId,
    /// External proposal number, carried for traceability only.
    pub proposal: String,
    pub gross_price: Money,
    #[serde(default)]
    pub discount: Money,
    /// Contract effective date ("vigência"); first installment falls due 30 days after it.
    pub effective_date: NaiveDate,
    pub expiry_date: NaiveDate,
}

/// Display status. Derived from the date fields, never authoritative for scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceivableStatus {
    Pending,
    Received,
    Overdue,
}

/// One expected/actual payment tranche of a sale's commission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receivable {
    pub id: ReceivableId,
    pub sale_id: SaleId,
    /// Ordering key, inherited from the plan's installment definition. 1-based.
    pub installment_number: u32,
    pub amount: Money,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    /// Bank statement reference recorded at settlement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_ref: Option<String>,
}

impl Receivable {
    pub fn status_as_of(&self, date: NaiveDate) -> ReceivableStatus {
        if self.received_date.is_some() {
            ReceivableStatus::Received
        } else if self.due_date < date {
            ReceivableStatus::Overdue
        } else {
            ReceivableStatus::Pending
        }
    }
}
