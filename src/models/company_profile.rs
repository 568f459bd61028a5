use serde::{Deserialize, Serialize};

use super::Currency;

/// The settings record: company identity plus the display currency and an
/// optional logo path. Every key may be absent in the stored file; missing
/// text fields come back empty and a missing currency comes back as USD.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompanyProfile {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub logo_path: String,
}

impl CompanyProfile {
    /// Title line for the printable document. Falls back to a placeholder
    /// rather than printing an empty heading.
    pub fn display_name(&self) -> &str {
        if self.company_name.trim().is_empty() {
            "Your Company"
        } else {
            &self.company_name
        }
    }

    /// "address, city, country" over the non-empty parts, or None when all
    /// three are blank (the header line is omitted entirely in that case).
    pub fn address_line(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.address, &self.city, &self.country]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_resolve_to_defaults() {
        let profile: CompanyProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.company_name, "");
        assert_eq!(profile.logo_path, "");
        assert_eq!(profile.currency, Currency::Usd);
    }

    #[test]
    fn address_line_skips_empty_parts() {
        let mut profile = CompanyProfile::default();
        assert_eq!(profile.address_line(), None);

        profile.city = "Cairo".into();
        profile.country = "Egypt".into();
        assert_eq!(profile.address_line().as_deref(), Some("Cairo, Egypt"));

        profile.address = "12 Nile St".into();
        assert_eq!(
            profile.address_line().as_deref(),
            Some("12 Nile St, Cairo, Egypt")
        );
    }

    #[test]
    fn blank_company_name_uses_placeholder() {
        let profile = CompanyProfile::default();
        assert_eq!(profile.display_name(), "Your Company");
    }
}
