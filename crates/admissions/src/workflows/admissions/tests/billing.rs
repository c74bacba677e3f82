use super::common::date;
use crate::workflows::admissions::billing::{
    derive_status, issue, record_payment, void, BillingError,
};
use crate::workflows::admissions::domain::{
    ApplicationId, InvoiceId, InvoiceStatus, Payment, PaymentMethod,
};

fn payment(amount: u32) -> Payment {
    Payment {
        amount,
        method: PaymentMethod::BankTransfer,
        received_on: date(2025, 7, 1),
    }
}

fn sample_invoice(amount: u32, discount: u32) -> crate::workflows::admissions::domain::Invoice {
    issue(
        InvoiceId("inv-1".to_string()),
        ApplicationId("app-1".to_string()),
        amount,
        discount,
        date(2025, 7, 15),
        date(2025, 6, 20),
    )
    .expect("valid invoice")
}

#[test]
fn final_amount_is_amount_less_discount() {
    let invoice = sample_invoice(55000, 5000);
    assert_eq!(invoice.final_amount(), 50000);
    assert_eq!(invoice.balance(), 50000);
    assert_eq!(invoice.status, InvoiceStatus::Pending);
}

#[test]
fn discount_larger_than_amount_is_rejected() {
    let error = issue(
        InvoiceId("inv-1".to_string()),
        ApplicationId("app-1".to_string()),
        10000,
        12000,
        date(2025, 7, 15),
        date(2025, 6, 20),
    )
    .expect_err("discount cannot exceed amount");
    assert_eq!(
        error,
        BillingError::DiscountExceedsAmount {
            amount: 10000,
            discount: 12000,
        }
    );
}

#[test]
fn payments_accumulate_and_settle_the_invoice() {
    let mut invoice = sample_invoice(55000, 5000);

    let status = record_payment(&mut invoice, payment(20000), date(2025, 6, 25))
        .expect("partial payment records");
    assert_eq!(status, InvoiceStatus::Partial);
    assert_eq!(invoice.paid_amount, 20000);

    let status = record_payment(&mut invoice, payment(30000), date(2025, 6, 28))
        .expect("settling payment records");
    assert_eq!(status, InvoiceStatus::Paid);
    assert_eq!(invoice.paid_amount, 50000);
    assert_eq!(invoice.balance(), 0);
    assert_eq!(invoice.payments.len(), 2);
}

#[test]
fn overpayment_still_reads_as_paid() {
    let mut invoice = sample_invoice(10000, 0);
    record_payment(&mut invoice, payment(15000), date(2025, 6, 25)).expect("payment records");
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.balance(), 0);
}

#[test]
fn zero_payments_are_rejected() {
    let mut invoice = sample_invoice(10000, 0);
    let error =
        record_payment(&mut invoice, payment(0), date(2025, 6, 25)).expect_err("zero rejected");
    assert_eq!(error, BillingError::ZeroPayment);
    assert!(invoice.payments.is_empty());
}

#[test]
fn unpaid_invoices_go_overdue_after_the_due_date() {
    let invoice = sample_invoice(10000, 0);
    assert_eq!(derive_status(&invoice, date(2025, 7, 15)), InvoiceStatus::Pending);
    assert_eq!(derive_status(&invoice, date(2025, 7, 16)), InvoiceStatus::Overdue);

    // A partial payment takes precedence over the due date.
    let mut invoice = sample_invoice(10000, 0);
    record_payment(&mut invoice, payment(2000), date(2025, 6, 25)).expect("payment records");
    assert_eq!(derive_status(&invoice, date(2025, 8, 1)), InvoiceStatus::Partial);
}

#[test]
fn void_is_sticky_and_blocks_payments() {
    let mut invoice = sample_invoice(10000, 0);
    void(&mut invoice).expect("unpaid invoice voids");
    assert_eq!(invoice.status, InvoiceStatus::Void);
    assert_eq!(derive_status(&invoice, date(2026, 1, 1)), InvoiceStatus::Void);

    let error = record_payment(&mut invoice, payment(5000), date(2025, 6, 25))
        .expect_err("void invoices take no payments");
    assert_eq!(error, BillingError::InvoiceVoid);
}

#[test]
fn settled_invoices_cannot_be_voided() {
    let mut invoice = sample_invoice(10000, 0);
    record_payment(&mut invoice, payment(10000), date(2025, 6, 25)).expect("payment records");
    let error = void(&mut invoice).expect_err("paid invoices stay paid");
    assert_eq!(error, BillingError::AlreadySettled);
}

#[test]
fn fully_discounted_invoice_reads_as_paid() {
    let invoice = sample_invoice(10000, 10000);
    assert_eq!(invoice.status, InvoiceStatus::Paid);
}
