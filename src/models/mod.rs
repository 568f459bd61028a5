mod company_profile;
mod currency;
mod line_item;
mod summary;

pub use company_profile::CompanyProfile;
pub use currency::Currency;
pub use line_item::LineItem;
pub use summary::Summary;

/// Render a monetary amount the way every view displays it: exactly two
/// decimal places, full precision kept internally until this point.
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}
