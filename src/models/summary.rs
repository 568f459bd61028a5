/// Derived totals for the current invoice. Always computed fresh from the
/// line items; never cached between reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
}
