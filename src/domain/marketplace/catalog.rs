//! Services catalog: the categories and named services customers can book.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub name: String,
    pub category: String,
}

impl ServiceOffering {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }
}

/// Category families that get tailored prompts and request details.
///
/// Detection is a case-insensitive substring test on the category name, so
/// "Auto Repair" and "Automotive" are both automotive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Automotive,
    HomeCleaning,
    Plumbing,
    Painting,
    Laundry,
    Other,
}

impl CategoryKind {
    pub fn of(category: &str) -> Self {
        let lower = category.to_lowercase();
        if lower.contains("auto") {
            CategoryKind::Automotive
        } else if lower.contains("home cleaning") {
            CategoryKind::HomeCleaning
        } else if lower.contains("plumbing") {
            CategoryKind::Plumbing
        } else if lower.contains("painting") {
            CategoryKind::Painting
        } else if lower.contains("laundry") {
            CategoryKind::Laundry
        } else {
            CategoryKind::Other
        }
    }
}

/// Vehicle body types offered for automotive requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarType {
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
    Hatchback,
    Coupe,
    Convertible,
    Pickup,
    Van,
}

impl CarType {
    pub const ALL: [CarType; 7] = [
        CarType::Sedan,
        CarType::Suv,
        CarType::Hatchback,
        CarType::Coupe,
        CarType::Convertible,
        CarType::Pickup,
        CarType::Van,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CarType::Sedan => "Sedan",
            CarType::Suv => "SUV",
            CarType::Hatchback => "Hatchback",
            CarType::Coupe => "Coupe",
            CarType::Convertible => "Convertible",
            CarType::Pickup => "Pickup",
            CarType::Van => "Van",
        }
    }

    pub fn labels() -> Vec<String> {
        Self::ALL.iter().map(|c| c.label().to_string()).collect()
    }

    /// Case-insensitive exact label match.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for CarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Distinct categories in first-seen order.
pub fn categories(offerings: &[ServiceOffering]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for offering in offerings {
        if !seen.iter().any(|c| c == &offering.category) {
            seen.push(offering.category.clone());
        }
    }
    seen
}

/// Service names in `category`, in catalog order.
pub fn services_in(offerings: &[ServiceOffering], category: &str) -> Vec<String> {
    offerings
        .iter()
        .filter(|o| o.category == category)
        .map(|o| o.name.clone())
        .collect()
}

/// Catalog used when no database is configured.
pub static DEFAULT_CATALOG: Lazy<Vec<ServiceOffering>> = Lazy::new(|| {
    const ENTRIES: &[(&str, &[&str])] = &[
        (
            "Automotive",
            &[
                "Brake Repair & Replacement",
                "Engine Diagnostics & Repair",
                "Transmission Repair",
                "Oil Change Service",
                "Car Wash & Detailing",
                "Car Painting & Scratch Removal",
                "Windshield Repair & Replacement",
                "Car AC Repair & Refill",
                "Wiring Check",
                "Battery Replacement",
                "Light Replacement",
            ],
        ),
        (
            "Plumbing",
            &[
                "Toilet Repair",
                "Shower Installation",
                "Faucet Replacement",
                "Bidet Spray Installation",
                "Kitchen Sink Plumbing",
                "Washing Machine Plumbing",
                "Water Filter Installation",
                "Leak Detection & Repair",
                "Drain Cleaning",
                "Pipe Rerouting",
                "Water Pump Repair",
                "Water Heater Repair",
            ],
        ),
        (
            "Home Cleaning",
            &[
                "Regular Cleaning",
                "Deep Cleaning",
                "Move-in/Move-out",
                "Post-renovation",
            ],
        ),
        (
            "Painting",
            &[
                "Interior Walls",
                "Ceilings",
                "Exterior Walls",
                "Doors & Frames",
                "Touch-up Painting",
                "Full Renovation Painting",
            ],
        ),
        ("Laundry", &["Cleaning", "Ironing", "Dry Cleaning"]),
    ];

    ENTRIES
        .iter()
        .flat_map(|(category, names)| {
            names
                .iter()
                .map(move |name| ServiceOffering::new(*name, *category))
        })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_kind_detection_is_substring_based() {
        assert_eq!(CategoryKind::of("Automotive"), CategoryKind::Automotive);
        assert_eq!(CategoryKind::of("AUTO care"), CategoryKind::Automotive);
        assert_eq!(CategoryKind::of("Home Cleaning"), CategoryKind::HomeCleaning);
        assert_eq!(CategoryKind::of("Plumbing"), CategoryKind::Plumbing);
        assert_eq!(CategoryKind::of("Painting"), CategoryKind::Painting);
        assert_eq!(CategoryKind::of("Laundry"), CategoryKind::Laundry);
        assert_eq!(CategoryKind::of("Gardening"), CategoryKind::Other);
    }

    #[test]
    fn car_type_labels() {
        assert_eq!(CarType::labels().len(), 7);
        assert_eq!(CarType::from_label(" suv "), Some(CarType::Suv));
        assert_eq!(CarType::from_label("truck"), None);
        assert_eq!(serde_json::to_string(&CarType::Suv).unwrap(), "\"SUV\"");
    }

    #[test]
    fn default_catalog_categories_in_order() {
        assert_eq!(
            categories(&DEFAULT_CATALOG),
            vec!["Automotive", "Plumbing", "Home Cleaning", "Painting", "Laundry"]
        );
    }

    #[test]
    fn services_filtered_by_category() {
        let laundry = services_in(&DEFAULT_CATALOG, "Laundry");
        assert_eq!(laundry, vec!["Cleaning", "Ironing", "Dry Cleaning"]);
        assert_eq!(services_in(&DEFAULT_CATALOG, "Plumbing").len(), 12);
        assert!(services_in(&DEFAULT_CATALOG, "Gardening").is_empty());
    }
}
