use serde::{Deserialize, Deserializer, Serialize};

/// The fixed set of supported currency labels. No conversion happens
/// anywhere; the code is only ever displayed next to amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EGP")]
    Egp,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Egp, Currency::Eur, Currency::Gbp];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Egp => "EGP",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    /// Settings-store parse: anything unrecognized, including an empty
    /// string, resolves to USD rather than erroring.
    pub fn from_setting(value: &str) -> Self {
        match value.trim() {
            "EGP" => Currency::Egp,
            "EUR" => Currency::Eur,
            "GBP" => Currency::Gbp,
            _ => Currency::Usd,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Currency::Usd => Currency::Egp,
            Currency::Egp => Currency::Eur,
            Currency::Eur => Currency::Gbp,
            Currency::Gbp => Currency::Usd,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Currency::Usd => Currency::Gbp,
            Currency::Egp => Currency::Usd,
            Currency::Eur => Currency::Egp,
            Currency::Gbp => Currency::Eur,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

// Lenient on the way in: a hand-edited or truncated config file must not
// take the whole application down over a currency string.
impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Currency::from_setting(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_unknown_resolves_to_usd() {
        assert_eq!(Currency::from_setting(""), Currency::Usd);
        assert_eq!(Currency::from_setting("  "), Currency::Usd);
        assert_eq!(Currency::from_setting("JPY"), Currency::Usd);
        assert_eq!(Currency::default(), Currency::Usd);
    }

    #[test]
    fn known_codes_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::from_setting(currency.code()), currency);
        }
    }

    #[test]
    fn cycling_visits_every_code() {
        let mut seen = vec![Currency::Usd];
        let mut current = Currency::Usd.next();
        while current != Currency::Usd {
            seen.push(current);
            current = current.next();
        }
        assert_eq!(seen.len(), Currency::ALL.len());
        assert_eq!(Currency::Egp.next().previous(), Currency::Egp);
    }
}
