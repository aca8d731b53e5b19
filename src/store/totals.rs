use crate::model::{InvoiceItem, InvoiceTotals};

/// A line's total is always quantity times unit price.
pub fn item_total(quantity: u32, unit_price: f64) -> f64 {
    quantity as f64 * unit_price
}

/// Aggregate a list of line items into invoice totals. Pure and total:
/// any finite item list produces a numerically consistent result.
///
/// Discount is fixed at 0 for now; a future discount model must keep
/// `total = subtotal - discount + vat_amount`.
pub fn compute_totals(items: &[InvoiceItem]) -> InvoiceTotals {
    let subtotal: f64 = items.iter().map(|i| i.total).sum();
    let discount = 0.0;
    let vat_amount: f64 = items.iter().map(|i| i.total * i.vat_rate / 100.0).sum();

    InvoiceTotals {
        subtotal,
        discount,
        vat_amount,
        total: subtotal - discount + vat_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn item(quantity: u32, unit_price: f64, vat_rate: f64) -> InvoiceItem {
        InvoiceItem {
            id: Uuid::new_v4(),
            description: "work".to_string(),
            quantity,
            unit_price,
            vat_rate,
            total: item_total(quantity, unit_price),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_list_yields_zero_totals() {
        let totals = compute_totals(&[]);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.vat_amount, 0.0);
        assert_eq!(totals.discount, 0.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn aggregates_per_item_vat() {
        // 2 x 50.00 @ 20% and 1 x 25.50 @ 10%
        let items = vec![item(2, 50.0, 20.0), item(1, 25.5, 10.0)];
        let totals = compute_totals(&items);

        assert!(approx(totals.subtotal, 125.5));
        assert!(approx(totals.vat_amount, 22.55));
        assert_eq!(totals.discount, 0.0);
        assert!(approx(totals.total, 148.05));
    }

    #[test]
    fn deterministic_on_same_input() {
        let items = vec![item(3, 19.99, 5.5), item(7, 0.0, 20.0), item(1, 840.0, 0.0)];
        let a = compute_totals(&items);
        let b = compute_totals(&items);

        assert_eq!(a.subtotal, b.subtotal);
        assert_eq!(a.vat_amount, b.vat_amount);
        assert_eq!(a.total, b.total);
    }

    #[test]
    fn zero_rate_items_add_no_vat() {
        let items = vec![item(4, 100.0, 0.0)];
        let totals = compute_totals(&items);
        assert_eq!(totals.vat_amount, 0.0);
        assert!(approx(totals.total, 400.0));
    }
}
