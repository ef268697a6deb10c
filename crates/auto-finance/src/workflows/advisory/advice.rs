use serde::{Deserialize, Serialize};

use crate::workflows::financing::{ApplicantProfile, ProductType, ProfileForm, VehicleOption};

pub const ADVICE_MAX_TOKENS: u32 = 400;

/// Body of `POST /api/payment-advice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    #[serde(default)]
    pub form_data: ProfileForm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_car: Option<VehicleOption>,
    pub selected_option: ProductType,
}

impl AdviceRequest {
    pub fn new(
        profile: &ApplicantProfile,
        vehicle: Option<&VehicleOption>,
        product: ProductType,
    ) -> Self {
        Self {
            form_data: profile.form().clone(),
            selected_car: vehicle.cloned(),
            selected_option: product,
        }
    }
}

pub fn advice_prompt(request: &AdviceRequest) -> String {
    let profile = serde_json::to_string_pretty(&request.form_data).unwrap_or_default();
    let car = serde_json::to_string_pretty(&request.selected_car).unwrap_or_default();

    format!(
        "You are a financial advisor for car purchases. Given the user profile and selected \
         financing option, provide a concise list of recommended financial actions (3-6 bullet \
         points) the user should take. Include why each action matters and an estimated dollar \
         impact if applicable.\n\nUser Profile: {profile}\n\nSelected Car: {car}\n\n\
         Selected Option: {}",
        request.selected_option
    )
}

const CLOSING_NOTE: &str = "Final note: review insurance implications and total cost of \
     ownership (maintenance, fuel, insurance) before committing.";

/// Threshold-driven advice. Blank inputs count as zero; unparsable ones skip the
/// bullet that needs them.
pub fn heuristic_advice(request: &AdviceRequest) -> String {
    let profile = ApplicantProfile::from_form(request.form_data.clone());
    let credit = profile.credit_score.or_blank(0);
    let down = profile.down_payment.or_blank(0.0).unwrap_or(0.0);
    let budget = profile.monthly_budget.or_blank(0.0);
    let price = request
        .selected_car
        .as_ref()
        .map(|vehicle| vehicle.price)
        .or_else(|| profile.car_price.or_blank(0.0))
        .unwrap_or(0.0);

    let mut advice: Vec<String> = Vec::new();
    match request.selected_option {
        ProductType::Finance => {
            let raise = (price * 0.1 - down).round();
            let raise = if raise > 0.0 { raise } else { 0.0 };
            advice.push(format!(
                "Consider increasing your down payment by ${raise:.0} to reduce monthly \
                 payments and interest paid."
            ));
            if credit.is_some_and(|score| score < 670) {
                advice.push(
                    "Work on improving your credit score to reduce your APR; even a 30-50 \
                     point increase can lower rates by ~1-2%"
                        .to_string(),
                );
            }
            if budget.is_some_and(|budget| budget < price * 0.02) {
                advice.push(
                    "Re-evaluate term length: extending term lowers payments but increases \
                     total interest."
                        .to_string(),
                );
            }
            advice.push(
                "Shop around for financing offers from multiple lenders to get the best APR."
                    .to_string(),
            );
        }
        ProductType::Lease => {
            advice.push(
                "Negotiate capitalized cost and residual value; a lower cap cost reduces \
                 monthly payments."
                    .to_string(),
            );
            if down > 0.0 {
                advice.push(
                    "Consider reducing upfront payment on lease and retaining it as savings \
                     for unexpected costs."
                        .to_string(),
                );
            }
            advice.push(
                "Check mileage limits to avoid excess fees; choose a higher mileage cap if \
                 you drive more."
                    .to_string(),
            );
        }
        ProductType::Purchase => {
            advice.push(
                "If paying cash, confirm you still maintain an emergency fund (3-6 months \
                 expenses) after purchase."
                    .to_string(),
            );
            if price > 50_000.0 {
                advice.push(
                    "Negotiate price and check certified pre-owned options for potential \
                     savings."
                        .to_string(),
                );
            }
        }
    }

    advice.push(CLOSING_NOTE.to_string());
    advice.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        credit: &str,
        down: &str,
        budget: &str,
        price: f64,
        product: ProductType,
    ) -> AdviceRequest {
        AdviceRequest {
            form_data: ProfileForm {
                credit_score: Some(credit.to_string()),
                down_payment: Some(down.to_string()),
                monthly_budget: Some(budget.to_string()),
                ..ProfileForm::default()
            },
            selected_car: Some(VehicleOption {
                id: "custom".to_string(),
                name: "Custom".to_string(),
                model: String::new(),
                price,
                badge: None,
                specs: None,
                features: Vec::new(),
            }),
            selected_option: product,
        }
    }

    fn bullets(advice: &str) -> Vec<&str> {
        advice.split("\n\n").collect()
    }

    #[test]
    fn finance_advice_for_thin_profile_lists_every_bullet() {
        let advice = heuristic_advice(&request("620", "1000", "300", 32_500.0, ProductType::Finance));
        let bullets = bullets(&advice);

        assert_eq!(bullets.len(), 5);
        assert!(bullets[0].contains("by $2250 "));
        assert!(bullets[1].starts_with("Work on improving your credit score"));
        assert!(bullets[2].starts_with("Re-evaluate term length"));
        assert!(bullets[3].starts_with("Shop around"));
        assert!(bullets[4].starts_with("Final note"));
    }

    #[test]
    fn finance_advice_skips_bullets_that_do_not_apply() {
        let advice = heuristic_advice(&request("780", "9000", "900", 32_500.0, ProductType::Finance));
        let bullets = bullets(&advice);

        assert_eq!(bullets.len(), 3);
        assert!(bullets[0].contains("by $0 "));
    }

    #[test]
    fn unparsable_credit_score_skips_credit_bullet() {
        let advice = heuristic_advice(&request("great", "0", "900", 30_000.0, ProductType::Finance));
        assert!(!advice.contains("improving your credit score"));
    }

    #[test]
    fn lease_advice_mentions_cash_reserve_only_with_down_payment() {
        let with_down = heuristic_advice(&request("700", "2000", "500", 30_000.0, ProductType::Lease));
        assert_eq!(bullets(&with_down).len(), 4);

        let without = heuristic_advice(&request("700", "0", "500", 30_000.0, ProductType::Lease));
        assert_eq!(bullets(&without).len(), 3);
        assert!(!without.contains("retaining it as savings"));
    }

    #[test]
    fn purchase_advice_flags_expensive_vehicles() {
        let modest = heuristic_advice(&request("800", "30000", "0", 32_500.0, ProductType::Purchase));
        assert_eq!(bullets(&modest).len(), 2);

        let premium = heuristic_advice(&request("800", "60000", "0", 62_000.0, ProductType::Purchase));
        assert_eq!(bullets(&premium).len(), 3);
        assert!(premium.contains("certified pre-owned"));
    }

    #[test]
    fn price_falls_back_to_profile_when_no_vehicle_selected() {
        let mut req = request("700", "0", "900", 0.0, ProductType::Finance);
        req.selected_car = None;
        req.form_data.car_price = Some("40000".to_string());

        assert!(heuristic_advice(&req).contains("by $4000 "));
    }

    #[test]
    fn request_uses_camel_case_wire_names() {
        let payload = r#"{"formData":{"creditScore":"700"},"selectedOption":"lease"}"#;
        let parsed: AdviceRequest = serde_json::from_str(payload).expect("request parses");
        assert_eq!(parsed.selected_option, ProductType::Lease);
        assert!(parsed.selected_car.is_none());
        assert!(advice_prompt(&parsed).ends_with("Selected Option: lease"));
    }
}
