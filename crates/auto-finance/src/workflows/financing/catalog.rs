use serde::{Deserialize, Serialize};

/// Informational attributes shown on the selection step; the engine never reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSpecs {
    pub mpg: String,
    pub horsepower: String,
    pub seats: String,
    pub transmission: String,
}

/// A vehicle the applicant can choose. Only `price` feeds the calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleOption {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub model: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<VehicleSpecs>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

/// When a catalog entry earns its promotional badge.
#[derive(Debug, Clone, PartialEq)]
pub enum BadgeRule {
    Always(&'static str),
    BudgetBelow(f64, &'static str),
    BudgetAbove(f64, &'static str),
}

impl BadgeRule {
    fn badge_for(&self, monthly_budget: Option<f64>) -> Option<String> {
        match (self, monthly_budget) {
            (BadgeRule::Always(label), _) => Some((*label).to_string()),
            (BadgeRule::BudgetBelow(limit, label), Some(budget)) if budget < *limit => {
                Some((*label).to_string())
            }
            (BadgeRule::BudgetAbove(limit, label), Some(budget)) if budget > *limit => {
                Some((*label).to_string())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub vehicle: VehicleOption,
    pub badge: Option<BadgeRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("vehicle catalog must contain at least one vehicle")]
    Empty,
    #[error("vehicle '{0}' is not in the catalog")]
    UnknownVehicle(String),
}

/// Read-only list of vehicles offered to the applicant, kept in ascending price
/// order so heuristics can index tiers directly.
#[derive(Debug, Clone)]
pub struct VehicleCatalog {
    entries: Vec<CatalogEntry>,
}

impl VehicleCatalog {
    pub fn new(mut entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        entries.sort_by(|a, b| a.vehicle.price.total_cmp(&b.vehicle.price));
        Ok(Self { entries })
    }

    pub fn standard() -> Self {
        let entries = vec![
            CatalogEntry {
                vehicle: vehicle(
                    "corolla",
                    "Toyota Corolla",
                    "2024 LE",
                    27_500.0,
                    ["32/41 MPG", "169 HP", "5 Seats", "CVT"],
                    &[
                        "Toyota Safety Sense 3.0",
                        "Apple CarPlay & Android Auto",
                        "LED Headlights",
                        "Adaptive Cruise Control",
                    ],
                ),
                badge: Some(BadgeRule::BudgetBelow(400.0, "Best Value")),
            },
            CatalogEntry {
                vehicle: vehicle(
                    "camry",
                    "Toyota Camry",
                    "2024 SE",
                    32_500.0,
                    ["28/39 MPG", "203 HP", "5 Seats", "8-Speed Auto"],
                    &[
                        "Premium Audio System",
                        "Dual-Zone Climate Control",
                        "Sport-Tuned Suspension",
                        "Power Driver Seat",
                    ],
                ),
                badge: Some(BadgeRule::Always("Recommended")),
            },
            CatalogEntry {
                vehicle: vehicle(
                    "rav4",
                    "Toyota RAV4",
                    "2024 XLE",
                    37_500.0,
                    ["27/35 MPG", "203 HP", "5 Seats", "8-Speed Auto"],
                    &[
                        "All-Wheel Drive",
                        "Power Liftgate",
                        "Panoramic Sunroof",
                        "Heated Front Seats",
                    ],
                ),
                badge: Some(BadgeRule::BudgetAbove(600.0, "Premium Choice")),
            },
        ];

        Self { entries }
    }

    /// Vehicles in ascending price order, without badges.
    pub fn vehicles(&self) -> impl Iterator<Item = &VehicleOption> {
        self.entries.iter().map(|entry| &entry.vehicle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, clamped to the most expensive vehicle.
    pub fn tier(&self, index: usize) -> &VehicleOption {
        let last = self.entries.len() - 1;
        &self.entries[index.min(last)].vehicle
    }

    pub fn get(&self, id: &str) -> Result<&VehicleOption, CatalogError> {
        self.vehicles()
            .find(|vehicle| vehicle.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| CatalogError::UnknownVehicle(id.to_string()))
    }

    /// First vehicle whose id or display name appears in `text`, case-insensitively.
    pub fn find_mentioned(&self, text: &str) -> Option<&VehicleOption> {
        let lowered = text.to_lowercase();
        self.vehicles().find(|vehicle| {
            lowered.contains(&vehicle.id.to_lowercase())
                || lowered.contains(&vehicle.name.to_lowercase())
        })
    }

    /// The catalog as shown on the selection step, with badges resolved against
    /// the applicant's monthly budget.
    pub fn badged_for(&self, monthly_budget: Option<f64>) -> Vec<VehicleOption> {
        self.entries
            .iter()
            .map(|entry| VehicleOption {
                badge: entry
                    .badge
                    .as_ref()
                    .and_then(|rule| rule.badge_for(monthly_budget)),
                ..entry.vehicle.clone()
            })
            .collect()
    }
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn vehicle(
    id: &str,
    name: &str,
    model: &str,
    price: f64,
    specs: [&str; 4],
    features: &[&str],
) -> VehicleOption {
    let [mpg, horsepower, seats, transmission] = specs;
    VehicleOption {
        id: id.to_string(),
        name: name.to_string(),
        model: model.to_string(),
        price,
        badge: None,
        specs: Some(VehicleSpecs {
            mpg: mpg.to_string(),
            horsepower: horsepower.to_string(),
            seats: seats.to_string(),
            transmission: transmission.to_string(),
        }),
        features: features.iter().map(|feature| feature.to_string()).collect(),
    }
}
