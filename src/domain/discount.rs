use std::fmt;

use serde::{Deserialize, Serialize};

/// Discount categories every event offers out of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredefinedCategory {
    Student,
    Senior,
    Child,
    Military,
    Group,
    EarlyBird,
}

impl PredefinedCategory {
    pub const ALL: [PredefinedCategory; 6] = [
        PredefinedCategory::Student,
        PredefinedCategory::Senior,
        PredefinedCategory::Child,
        PredefinedCategory::Military,
        PredefinedCategory::Group,
        PredefinedCategory::EarlyBird,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PredefinedCategory::Student => "Student",
            PredefinedCategory::Senior => "Senior",
            PredefinedCategory::Child => "Child",
            PredefinedCategory::Military => "Military",
            PredefinedCategory::Group => "Group",
            PredefinedCategory::EarlyBird => "Early Bird",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let needle = label.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(needle))
    }
}

impl fmt::Display for PredefinedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentage reduction for one category, as exchanged with the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDiscount {
    pub category: String,
    pub discount_percent: f64,
}

impl CategoryDiscount {
    /// Price after applying the discount, rounded to cents.
    pub fn apply(&self, price: f64) -> f64 {
        let discounted = price * (1.0 - self.discount_percent / 100.0);
        (discounted * 100.0).round() / 100.0
    }
}
