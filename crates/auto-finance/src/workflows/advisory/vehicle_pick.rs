use serde::{Deserialize, Serialize};

use crate::workflows::financing::{ApplicantProfile, VehicleCatalog, VehicleOption};

use super::{Enrichment, FallbackReason};

pub const PICK_MAX_TOKENS: u32 = 300;
pub const HEURISTIC_EXPLANATION: &str = "Heuristic fallback";

/// Suggested vehicle and the reasoning shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehiclePick {
    #[serde(rename = "car")]
    pub vehicle: VehicleOption,
    pub explanation: String,
}

#[derive(Serialize)]
struct PromptVehicle<'a> {
    id: &'a str,
    name: &'a str,
    price: f64,
}

pub fn pick_prompt(profile: &ApplicantProfile, catalog: &VehicleCatalog) -> String {
    let vehicles: Vec<PromptVehicle<'_>> = catalog
        .vehicles()
        .map(|vehicle| PromptVehicle {
            id: &vehicle.id,
            name: &vehicle.name,
            price: vehicle.price,
        })
        .collect();

    let user = serde_json::to_string_pretty(profile.form()).unwrap_or_default();
    let cars = serde_json::to_string_pretty(&vehicles).unwrap_or_default();

    format!(
        "Given the following user profile, pick the most applicable Toyota from the list \
         with a short justification:\n\nUser:\n{user}\n\nCars:\n{cars}"
    )
}

fn tier_index(value: f64, bounds: [f64; 2]) -> usize {
    bounds.iter().take_while(|bound| value >= **bound).count()
}

/// Deterministic, network-free pick. Budget tiers win; an unparsable budget
/// falls back to the target price; with neither the middle vehicle is used.
pub fn heuristic_pick<'a>(
    profile: &ApplicantProfile,
    catalog: &'a VehicleCatalog,
) -> &'a VehicleOption {
    let index = if let Some(budget) = profile.monthly_budget.or_blank(0.0) {
        tier_index(budget, [400.0, 600.0])
    } else if let Some(price) = profile.car_price.or_blank(0.0) {
        tier_index(price, [30_000.0, 35_000.0])
    } else {
        1
    };

    catalog.tier(index)
}

pub fn heuristic(profile: &ApplicantProfile, catalog: &VehicleCatalog) -> VehiclePick {
    VehiclePick {
        vehicle: heuristic_pick(profile, catalog).clone(),
        explanation: HEURISTIC_EXPLANATION.to_string(),
    }
}

/// Pairs remote text with the vehicle it mentions. Text that names no catalog
/// vehicle keeps its explanation but takes the heuristic vehicle.
pub fn resolve_remote(
    text: String,
    profile: &ApplicantProfile,
    catalog: &VehicleCatalog,
) -> Enrichment<VehiclePick> {
    match catalog.find_mentioned(&text) {
        Some(vehicle) => Enrichment::Remote(VehiclePick {
            vehicle: vehicle.clone(),
            explanation: text,
        }),
        None => Enrichment::Fallback {
            value: VehiclePick {
                vehicle: heuristic_pick(profile, catalog).clone(),
                explanation: text,
            },
            reason: FallbackReason::UnmatchedSelection,
        },
    }
}
