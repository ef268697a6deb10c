use crate::workflows::financing::{ApplicantProfile, ProfileForm, VehicleCatalog, VehicleOption};

pub(super) fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 0.01
}

pub(super) fn profile(credit: &str, down: &str) -> ApplicantProfile {
    ApplicantProfile::from_form(ProfileForm {
        credit_score: Some(credit.to_string()),
        annual_income: Some("85000".to_string()),
        down_payment: Some(down.to_string()),
        car_price: Some("37500".to_string()),
        employment_status: Some("full-time".to_string()),
        monthly_budget: Some("600".to_string()),
        ..ProfileForm::default()
    })
}

pub(super) fn vehicle(id: &str) -> VehicleOption {
    VehicleCatalog::standard()
        .get(id)
        .cloned()
        .expect("standard catalog vehicle")
}
