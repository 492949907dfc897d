use serde::{Deserialize, Serialize};

/// Tags what a piece of recorded member info describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoKind {
    Method,
    Property,
    PropertyGetter,
    PropertySetter,
}

impl InfoKind {
    pub const ALL: [InfoKind; 4] = [
        Self::Method,
        Self::Property,
        Self::PropertyGetter,
        Self::PropertySetter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Property => "property",
            Self::PropertyGetter => "property_getter",
            Self::PropertySetter => "property_setter",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "method" => Some(Self::Method),
            "property" => Some(Self::Property),
            "property_getter" => Some(Self::PropertyGetter),
            "property_setter" => Some(Self::PropertySetter),
            _ => None,
        }
    }
}
