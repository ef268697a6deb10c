use super::common::*;
use crate::workflows::financing::{
    FinancingEngine, LeaseModel, ParsedField, ProductType, ProfileError, ProfileField,
};

#[test]
fn strong_applicant_with_large_down_payment_buys_outright() {
    let engine = FinancingEngine::standard();
    let result = engine
        .recommend(&profile("800-850", "15000"), &vehicle("rav4"))
        .expect("profile is complete");

    assert!(approx(result.down_payment_ratio, 0.40));
    assert_eq!(result.recommended, ProductType::Purchase);
    assert_eq!(result.vehicle_id, "rav4");

    let purchase = result.recommended_option().expect("purchase option");
    assert_eq!(purchase.total_cost, 37_500.0);
    assert_eq!(purchase.upfront_cost, 37_500.0);
    assert_eq!(purchase.monthly_payment, 0.0);
    assert_eq!(purchase.term_months, 0);
    assert_eq!(purchase.apr, 0.0);
}

#[test]
fn options_are_listed_lease_finance_purchase() {
    let result = FinancingEngine::standard().calculate(700, 5_000.0, &vehicle("camry"));
    let products: Vec<ProductType> = result.options.iter().map(|o| o.product).collect();
    assert_eq!(
        products,
        vec![ProductType::Lease, ProductType::Finance, ProductType::Purchase]
    );
}

#[test]
fn finance_option_amortizes_price_less_down_payment() {
    let result = FinancingEngine::standard().calculate(800, 15_000.0, &vehicle("rav4"));
    let finance = result.option(ProductType::Finance).expect("finance option");

    assert_eq!(finance.apr, 4.5);
    assert_eq!(finance.term_months, 60);
    assert!(approx(finance.monthly_payment, 419.47));
    assert_eq!(finance.upfront_cost, 15_000.0);
    assert!(approx(
        finance.total_cost,
        finance.monthly_payment * 60.0 + 15_000.0
    ));
}

#[test]
fn simplified_lease_totals_include_upfront_share() {
    let result = FinancingEngine::standard().calculate(800, 15_000.0, &vehicle("rav4"));
    let lease = result.option(ProductType::Lease).expect("lease option");

    // 60% of 37,500 at 3.5% over 36 months
    assert!(approx(lease.monthly_payment, 659.30));
    assert_eq!(lease.upfront_cost, 1_500.0);
    assert!(approx(lease.total_cost, lease.monthly_payment * 36.0 + 1_500.0));
    assert_eq!(result.lease_model, LeaseModel::Simplified);
}

#[test]
fn detailed_lease_model_can_be_selected() {
    let engine = FinancingEngine::standard().with_lease_model(LeaseModel::Detailed);
    let result = engine.calculate(700, 2_000.0, &vehicle("camry"));
    let lease = result.option(ProductType::Lease).expect("lease option");

    assert_eq!(result.lease_model, LeaseModel::Detailed);
    assert_eq!(lease.apr, 5.0);
    assert!(lease.monthly_payment > 0.0);
    assert_eq!(lease.upfront_cost, 200.0);
}

#[test]
fn strict_recommendation_reports_unusable_inputs() {
    let engine = FinancingEngine::standard();
    let error = engine
        .recommend(&profile("great", "5000"), &vehicle("camry"))
        .expect_err("credit score is unusable");

    assert_eq!(
        error,
        ProfileError::Unparsable {
            field: ProfileField::CreditScore,
            raw: "great".to_string(),
        }
    );
}

#[test]
fn lenient_recommendation_substitutes_conservative_values() {
    let mut applicant = profile("great", "lots");
    applicant.car_price = ParsedField::Missing;

    let (result, substituted) =
        FinancingEngine::standard().recommend_lenient(&applicant, &vehicle("corolla"));

    assert_eq!(substituted.len(), 2);
    assert_eq!(result.recommended, ProductType::Lease);
    assert_eq!(result.down_payment_ratio, 0.0);
    let finance = result.option(ProductType::Finance).expect("finance option");
    assert_eq!(finance.apr, 12.0);
    assert_eq!(finance.upfront_cost, 0.0);
}

#[test]
fn down_payment_above_price_finances_nothing() {
    let result = FinancingEngine::standard().calculate(720, 40_000.0, &vehicle("corolla"));
    let finance = result.option(ProductType::Finance).expect("finance option");
    assert_eq!(finance.monthly_payment, 0.0);
    assert_eq!(finance.total_cost, 40_000.0);
}

#[test]
fn payment_schedule_plateaus_after_each_term() {
    let result = FinancingEngine::standard().calculate(700, 5_000.0, &vehicle("camry"));
    let schedule = result.payment_schedule();
    let lease = result.option(ProductType::Lease).expect("lease option");
    let finance = result.option(ProductType::Finance).expect("finance option");

    assert_eq!(schedule.len(), 60);
    assert_eq!(schedule[0].month, 1);
    assert!(approx(schedule[0].lease, lease.monthly_payment));
    assert!(approx(schedule[35].lease, lease.monthly_payment * 36.0));
    assert_eq!(schedule[59].lease, schedule[35].lease);
    assert!(approx(schedule[59].finance, finance.monthly_payment * 60.0));
    assert!(schedule.iter().all(|point| point.purchase == 32_500.0));
}
