use std::rc::Rc;

use tracing::info;

use crate::db::Storage;
use crate::error::Result;
use crate::models::{FeeRecord, FeeStatus, Payment};
use crate::store::{new_uuid, Collection, Subscribers};

pub const FEES_KEY: &str = "fees";

/// Monthly fee charged when no record says otherwise.
pub const DEFAULT_MONTHLY_FEE: f64 = 15.0;

/// Paid needs something actually paid, so a zero-due month with nothing
/// paid stays Unpaid.
pub fn derive_status(amount_due: f64, amount_paid: f64) -> FeeStatus {
    if amount_paid > 0.0 && amount_paid >= amount_due {
        FeeStatus::Paid
    } else if amount_paid > 0.0 {
        FeeStatus::Partial
    } else {
        FeeStatus::Unpaid
    }
}

/// The record a (student, month) has before anything is written for it.
pub fn records_for_month<'a>(records: &'a [FeeRecord], month: &str) -> Vec<&'a FeeRecord> {
    records.iter().filter(|r| r.month == month).collect()
}

pub fn default_record(student_id: &str, month: &str) -> FeeRecord {
    FeeRecord {
        id: new_uuid(),
        student_id: student_id.to_string(),
        month: month.to_string(),
        amount_due: DEFAULT_MONTHLY_FEE,
        amount_paid: 0.0,
        status: FeeStatus::Unpaid,
        payments: Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeeUpdate {
    pub amount_due: Option<f64>,
    pub amount_paid: Option<f64>,
}

pub struct FeeLedger {
    records: Collection<FeeRecord>,
}

impl FeeLedger {
    pub fn load(storage: Rc<dyn Storage>, subscribers: Rc<Subscribers>) -> Result<Self> {
        let records = Collection::load(FEES_KEY, storage, subscribers, Vec::new)?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[FeeRecord] {
        self.records.items()
    }

    pub fn find(&self, student_id: &str, month: &str) -> Option<&FeeRecord> {
        self.records
            .items()
            .iter()
            .find(|r| r.student_id == student_id && r.month == month)
    }

    /// Never writes; a missing record comes back as [`default_record`].
    pub fn get_or_default(&self, student_id: &str, month: &str) -> FeeRecord {
        self.find(student_id, month)
            .cloned()
            .unwrap_or_else(|| default_record(student_id, month))
    }

    pub fn records_for_student(&self, student_id: &str) -> Vec<&FeeRecord> {
        self.records
            .items()
            .iter()
            .filter(|r| r.student_id == student_id)
            .collect()
    }

    /// Append a payment to the (student, month) record, creating it first
    /// if needed. The amount is taken as given: no sign or NaN checks.
    pub fn record_payment(
        &mut self,
        student_id: &str,
        month: &str,
        amount: f64,
        method: &str,
        reference: &str,
    ) -> Result<FeeRecord> {
        let payment = Payment {
            id: new_uuid(),
            date: chrono::Utc::now().to_rfc3339(),
            amount,
            method: method.to_string(),
            reference: reference.to_string(),
        };

        let record = self.records.update(|records| {
            let idx = position_or_insert(records, student_id, month);
            let rec = &mut records[idx];
            rec.payments.push(payment);
            rec.amount_paid += amount;
            rec.status = derive_status(rec.amount_due, rec.amount_paid);
            rec.clone()
        })?;

        info!(
            student_id,
            month,
            amount,
            paid = record.amount_paid,
            status = %record.status,
            "payment recorded"
        );
        Ok(record)
    }

    /// Manual correction of due/paid. Leaves the payment history alone, so
    /// `amount_paid` may stop matching the sum of payments.
    pub fn update_fee_record(
        &mut self,
        student_id: &str,
        month: &str,
        update: FeeUpdate,
    ) -> Result<FeeRecord> {
        let record = self.records.update(|records| {
            let idx = position_or_insert(records, student_id, month);
            let rec = &mut records[idx];
            if let Some(due) = update.amount_due {
                rec.amount_due = due;
            }
            if let Some(paid) = update.amount_paid {
                rec.amount_paid = paid;
            }
            rec.status = derive_status(rec.amount_due, rec.amount_paid);
            rec.clone()
        })?;

        info!(
            student_id,
            month,
            due = record.amount_due,
            paid = record.amount_paid,
            status = %record.status,
            "fee record updated"
        );
        Ok(record)
    }
}

fn position_or_insert(records: &mut Vec<FeeRecord>, student_id: &str, month: &str) -> usize {
    match records
        .iter()
        .position(|r| r.student_id == student_id && r.month == month)
    {
        Some(idx) => idx,
        None => {
            records.push(default_record(student_id, month));
            records.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;

    fn ledger() -> (Rc<MemoryStorage>, FeeLedger) {
        let storage = Rc::new(MemoryStorage::default());
        let ledger = FeeLedger::load(storage.clone(), Rc::new(Subscribers::default())).unwrap();
        (storage, ledger)
    }

    fn stored_records(storage: &MemoryStorage) -> Vec<FeeRecord> {
        serde_json::from_str(&storage.get(FEES_KEY).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_status_rule() {
        assert_eq!(derive_status(15.0, 0.0), FeeStatus::Unpaid);
        assert_eq!(derive_status(15.0, 5.0), FeeStatus::Partial);
        assert_eq!(derive_status(15.0, 15.0), FeeStatus::Paid);
        assert_eq!(derive_status(15.0, 20.0), FeeStatus::Paid);
        assert_eq!(derive_status(15.0, -5.0), FeeStatus::Unpaid);
        assert_eq!(derive_status(15.0, f64::NAN), FeeStatus::Unpaid);
    }

    #[test]
    fn test_zero_due_zero_paid_is_unpaid() {
        assert_eq!(derive_status(0.0, 0.0), FeeStatus::Unpaid);
        assert_eq!(derive_status(0.0, 1.0), FeeStatus::Paid);
    }

    #[test]
    fn test_get_or_default_does_not_persist() {
        let (storage, ledger) = ledger();
        for _ in 0..3 {
            let rec = ledger.get_or_default("1", "2025-01");
            assert_eq!(rec.amount_due, DEFAULT_MONTHLY_FEE);
            assert_eq!(rec.amount_paid, 0.0);
            assert_eq!(rec.status, FeeStatus::Unpaid);
            assert!(rec.payments.is_empty());
        }
        assert!(ledger.records().is_empty());
        assert!(stored_records(&storage).is_empty());
    }

    #[test]
    fn test_full_payment_then_overpayment() {
        let (_storage, mut ledger) = ledger();
        let rec = ledger.record_payment("1", "2025-01", 15.0, "Cash", "").unwrap();
        assert_eq!(rec.status, FeeStatus::Paid);
        assert_eq!(rec.amount_paid, 15.0);

        let rec = ledger.record_payment("1", "2025-01", 5.0, "Cash", "").unwrap();
        assert_eq!(rec.amount_paid, 20.0);
        assert_eq!(rec.status, FeeStatus::Paid);
        assert_eq!(ledger.records().len(), 1);
    }

    #[test]
    fn test_payments_accumulate() {
        let (storage, mut ledger) = ledger();
        ledger.record_payment("1", "2025-03", 4.0, "Cash", "r1").unwrap();
        let rec = ledger.record_payment("1", "2025-03", 6.5, "EVC Plus", "r2").unwrap();
        assert_eq!(rec.amount_paid, 10.5);
        assert_eq!(rec.payments.len(), 2);
        assert_eq!(rec.status, FeeStatus::Partial);
        assert_eq!(rec.payments[1].reference, "r2");

        let stored = stored_records(&storage);
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], rec);
    }

    #[test]
    fn test_one_record_per_student_month() {
        let (_storage, mut ledger) = ledger();
        ledger.record_payment("1", "2025-01", 5.0, "Cash", "").unwrap();
        ledger.record_payment("1", "2025-02", 5.0, "Cash", "").unwrap();
        ledger.record_payment("2", "2025-01", 5.0, "Cash", "").unwrap();
        ledger.record_payment("1", "2025-01", 5.0, "Cash", "").unwrap();
        assert_eq!(ledger.records().len(), 3);
        assert_eq!(records_for_month(ledger.records(), "2025-01").len(), 2);
        assert_eq!(ledger.records_for_student("1").len(), 2);
    }

    #[test]
    fn test_negative_payment_is_accepted() {
        let (_storage, mut ledger) = ledger();
        ledger.record_payment("1", "2025-01", 10.0, "Cash", "").unwrap();
        let rec = ledger.record_payment("1", "2025-01", -10.0, "Refund", "").unwrap();
        assert_eq!(rec.amount_paid, 0.0);
        assert_eq!(rec.status, FeeStatus::Unpaid);
    }

    #[test]
    fn test_nan_payment_poisons_total() {
        let (_storage, mut ledger) = ledger();
        let rec = ledger.record_payment("1", "2025-01", f64::NAN, "Cash", "").unwrap();
        assert!(rec.amount_paid.is_nan());
        assert_eq!(rec.status, FeeStatus::Unpaid);
    }

    #[test]
    fn test_nan_payment_survives_reload() {
        let (storage, mut ledger) = ledger();
        ledger.record_payment("1", "2025-01", f64::NAN, "Cash", "").unwrap();
        ledger.record_payment("2", "2025-01", 15.0, "Cash", "").unwrap();

        let reloaded = FeeLedger::load(storage, Rc::new(Subscribers::default())).unwrap();
        let rec = reloaded.find("1", "2025-01").unwrap();
        assert!(rec.amount_paid.is_nan());
        assert!(rec.payments[0].amount.is_nan());
        assert_eq!(rec.amount_due, DEFAULT_MONTHLY_FEE);
        assert_eq!(reloaded.find("2", "2025-01").unwrap().status, FeeStatus::Paid);
    }

    #[test]
    fn test_update_creates_record_with_zero_due() {
        let (_storage, mut ledger) = ledger();
        let rec = ledger
            .update_fee_record(
                "2",
                "2025-02",
                FeeUpdate { amount_due: Some(0.0), amount_paid: Some(0.0) },
            )
            .unwrap();
        assert_eq!(rec.status, FeeStatus::Unpaid);
        assert_eq!(rec.amount_due, 0.0);
        assert_eq!(ledger.records().len(), 1);
    }

    #[test]
    fn test_update_is_partial_and_keeps_payments() {
        let (_storage, mut ledger) = ledger();
        ledger.record_payment("1", "2025-01", 10.0, "Cash", "").unwrap();
        let rec = ledger
            .update_fee_record("1", "2025-01", FeeUpdate { amount_due: Some(10.0), amount_paid: None })
            .unwrap();
        assert_eq!(rec.amount_due, 10.0);
        assert_eq!(rec.amount_paid, 10.0);
        assert_eq!(rec.status, FeeStatus::Paid);

        let rec = ledger
            .update_fee_record("1", "2025-01", FeeUpdate { amount_due: None, amount_paid: Some(3.0) })
            .unwrap();
        assert_eq!(rec.status, FeeStatus::Partial);
        // history no longer matches the manual figure
        let history: f64 = rec.payments.iter().map(|p| p.amount).sum();
        assert_eq!(history, 10.0);
        assert_eq!(rec.amount_paid, 3.0);
    }

    #[test]
    fn test_update_on_new_record_starts_from_defaults() {
        let (_storage, mut ledger) = ledger();
        let rec = ledger
            .update_fee_record("3", "2025-04", FeeUpdate { amount_due: None, amount_paid: Some(7.0) })
            .unwrap();
        assert_eq!(rec.amount_due, DEFAULT_MONTHLY_FEE);
        assert_eq!(rec.status, FeeStatus::Partial);
        assert!(rec.payments.is_empty());
    }
}
