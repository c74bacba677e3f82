use super::domain::{ApplicationId, Invoice, InvoiceId, InvoiceStatus, Payment};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillingError {
    #[error("discount {discount} exceeds invoice amount {amount}")]
    DiscountExceedsAmount { amount: u32, discount: u32 },
    #[error("payment amount must be greater than zero")]
    ZeroPayment,
    #[error("invoice is void and cannot accept payments")]
    InvoiceVoid,
    #[error("a settled invoice cannot be voided")]
    AlreadySettled,
}

/// The one place invoice status is computed. Void is sticky; otherwise the
/// status follows the paid amount, falling back to the due-date comparison.
pub fn derive_status(invoice: &Invoice, today: NaiveDate) -> InvoiceStatus {
    if invoice.status == InvoiceStatus::Void {
        return InvoiceStatus::Void;
    }
    if invoice.paid_amount >= invoice.final_amount() {
        InvoiceStatus::Paid
    } else if invoice.paid_amount > 0 {
        InvoiceStatus::Partial
    } else if invoice.due_date < today {
        InvoiceStatus::Overdue
    } else {
        InvoiceStatus::Pending
    }
}

/// Raise a new invoice. The final amount is always `amount - discount`, so a
/// discount larger than the amount is rejected up front.
pub fn issue(
    id: InvoiceId,
    application_id: ApplicationId,
    amount: u32,
    discount: u32,
    due_date: NaiveDate,
    today: NaiveDate,
) -> Result<Invoice, BillingError> {
    if discount > amount {
        return Err(BillingError::DiscountExceedsAmount { amount, discount });
    }

    let mut invoice = Invoice {
        id,
        application_id,
        amount,
        discount,
        paid_amount: 0,
        due_date,
        status: InvoiceStatus::Pending,
        payments: Vec::new(),
    };
    invoice.status = derive_status(&invoice, today);
    Ok(invoice)
}

/// Accumulate a payment and re-derive the status.
pub fn record_payment(
    invoice: &mut Invoice,
    payment: Payment,
    today: NaiveDate,
) -> Result<InvoiceStatus, BillingError> {
    if invoice.status == InvoiceStatus::Void {
        return Err(BillingError::InvoiceVoid);
    }
    if payment.amount == 0 {
        return Err(BillingError::ZeroPayment);
    }

    invoice.paid_amount = invoice.paid_amount.saturating_add(payment.amount);
    invoice.payments.push(payment);
    invoice.status = derive_status(invoice, today);
    Ok(invoice.status)
}

/// Manually void an unsettled invoice. The only status not produced by
/// derivation.
pub fn void(invoice: &mut Invoice) -> Result<(), BillingError> {
    if invoice.status == InvoiceStatus::Paid {
        return Err(BillingError::AlreadySettled);
    }
    invoice.status = InvoiceStatus::Void;
    Ok(())
}
