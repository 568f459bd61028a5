/// One invoice row. The index is assigned when the item is added and stays
/// with it for life; the collection is append/pop-only, so indices are never
/// rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub index: u32,
    pub name: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.quantity * self.unit_price
    }
}
