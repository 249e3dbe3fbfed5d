use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Form 1040 filing status.
///
/// Serialized as the variant name (`"MarriedFilingJointly"`). Deserialization
/// also accepts the short codes returned by [`FilingStatus::as_str`] so that
/// CSV and TOML files can use either spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FilingStatus {
    #[default]
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingWidow,
}

impl FilingStatus {
    /// Every filing status, in form order.
    pub const ALL: [FilingStatus; 5] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
        Self::QualifyingWidow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
            Self::QualifyingWidow => "QW",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::MarriedFilingJointly => "MarriedFilingJointly",
            Self::MarriedFilingSeparately => "MarriedFilingSeparately",
            Self::HeadOfHousehold => "HeadOfHousehold",
            Self::QualifyingWidow => "QualifyingWidow",
        }
    }

    /// Parses either a short code (`"MFJ"`) or a variant name
    /// (`"MarriedFilingJointly"`). Matching is case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| s.eq_ignore_ascii_case(status.as_str()) || s.eq_ignore_ascii_case(status.name()))
    }

    /// Spouse wages only enter total income on a joint return.
    pub fn includes_spouse_wages(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly)
    }

    /// Spouse age/blindness flags only raise the standard deduction for
    /// joint filers and qualifying widow(er)s.
    pub fn includes_spouse_deduction_flags(&self) -> bool {
        matches!(self, Self::MarriedFilingJointly | Self::QualifyingWidow)
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for FilingStatus {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for FilingStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FilingStatus::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown filing status '{raw}'")))
    }
}
