//! Pricing Resolver
//!
//! Maps a permit category label to its renewal fee. Fees are held in minor
//! currency units (pence) and only converted to major units for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Renewal fee in minor currency units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fee(i64);

impl Fee {
    pub const ZERO: Self = Self(0);

    pub const fn from_minor_units(units: i64) -> Self {
        Self(units)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// A fee is payable only when there is something to charge
    pub const fn is_payable(self) -> bool {
        self.0 > 0
    }

    /// Fee in major units, scale 2 (4000 -> 40.00)
    pub fn major_units(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl std::fmt::Display for Fee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.major_units())
    }
}

/// Permit categories with a renewal fee
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermitType {
    LocalSenior,
    LocalAdult,
    VisitingAdult,
    VisitingSenior,
}

impl PermitType {
    pub const ALL: [Self; 4] = [
        Self::LocalSenior,
        Self::LocalAdult,
        Self::VisitingAdult,
        Self::VisitingSenior,
    ];

    /// Label as stored on the user record and shown on the registration form
    pub const fn label(self) -> &'static str {
        match self {
            Self::LocalSenior => "Local Senior",
            Self::LocalAdult => "Local Adult",
            Self::VisitingAdult => "Visiting Adult",
            Self::VisitingSenior => "Visiting Senior",
        }
    }

    /// Exact, case-sensitive match against the known labels
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|permit| permit.label() == label)
    }

    pub const fn fee(self) -> Fee {
        match self {
            Self::LocalSenior => Fee(2000),   // £20.00
            Self::LocalAdult => Fee(4000),    // £40.00
            Self::VisitingAdult => Fee(10000), // £100.00
            Self::VisitingSenior => Fee(5000), // £50.00
        }
    }
}

impl std::fmt::Display for PermitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolved price for a permit label
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    /// `None` when the label is not a known category
    pub permit: Option<PermitType>,
    pub fee: Fee,
    /// Whether the payment option should be offered
    pub payable: bool,
}

/// Resolve the renewal fee for a stored permit label.
///
/// Total over all input: an unrecognized label yields a zero fee and
/// `payable = false` rather than an error.
pub fn resolve_price(permit_type: &str) -> Quote {
    let permit = PermitType::from_label(permit_type);
    let fee = permit.map_or(Fee::ZERO, PermitType::fee);

    Quote {
        permit,
        fee,
        payable: fee.is_payable(),
    }
}
