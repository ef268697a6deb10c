#![allow(dead_code)]

use std::net::SocketAddr;

use auto_finance::workflows::financing::{ApplicantProfile, ProfileForm};
use axum::Router;
use tokio::net::TcpListener;

pub fn approx(left: f64, right: f64) -> bool {
    (left - right).abs() < 0.01
}

pub fn form(credit: &str, down: &str, budget: &str) -> ProfileForm {
    ProfileForm {
        credit_score: Some(credit.to_string()),
        annual_income: Some("72000".to_string()),
        down_payment: Some(down.to_string()),
        car_price: Some("32000".to_string()),
        employment_status: Some("full-time".to_string()),
        monthly_budget: Some(budget.to_string()),
        lifestyle: Some("Commutes 40 miles a day".to_string()),
        job_description: Some("Nurse".to_string()),
    }
}

pub fn profile(credit: &str, down: &str) -> ApplicantProfile {
    ApplicantProfile::from_form(form(credit, down, "480"))
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{addr}")
}
