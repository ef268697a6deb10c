mod common;

use std::sync::Arc;
use std::time::Duration;

use auto_finance::workflows::financing::{
    quote_router, FinanceQuoteRequest, FinancingConfig, FinancingEngine, HttpQuoteClient,
    LeaseQuoteRequest, ProductType, QuoteError, QuoteGateway, QuoteOutcome, QuoteService,
    VehicleCatalog,
};
use axum::{http::StatusCode, routing::get, Router};
use tokio_util::sync::CancellationToken;

use common::{approx, profile, serve};

fn remote_quotes(base_url: &str, timeout: Duration) -> QuoteService {
    let gateway: Arc<dyn QuoteGateway> = Arc::new(HttpQuoteClient::new(base_url));
    QuoteService::new(Some(gateway), FinancingConfig::standard().lease, timeout)
}

fn rav4_finance() -> FinanceQuoteRequest {
    FinanceQuoteRequest {
        vehicle_value: 37_500.0,
        apr: 4.5,
        months: 60,
        downpayment: 15_000.0,
    }
}

fn sedan_lease() -> LeaseQuoteRequest {
    LeaseQuoteRequest {
        msrp: 30_000.0,
        apr: 4.8,
        term_months: 36,
        downpayment: 2_000.0,
    }
}

#[test]
fn bucketed_scores_route_applicants_to_each_product() {
    let engine = FinancingEngine::standard();
    let catalog = VehicleCatalog::standard();

    let cases = [
        ("800-850", "15000", "rav4", ProductType::Purchase),
        ("670-739", "3000", "corolla", ProductType::Finance),
        ("580-669", "10000", "camry", ProductType::Lease),
        ("740-799", "1000", "camry", ProductType::Lease),
        ("750", "9750", "camry", ProductType::Purchase),
    ];

    for (credit, down, vehicle, expected) in cases {
        let vehicle = catalog.get(vehicle).expect("catalog vehicle");
        let result = engine
            .recommend(&profile(credit, down), vehicle)
            .expect("complete profile");
        assert_eq!(
            result.recommended, expected,
            "credit {credit} with {down} down on {}",
            vehicle.id
        );
    }
}

#[test]
fn rates_follow_the_credit_tier_of_the_applicant() {
    let engine = FinancingEngine::standard();
    let camry = VehicleCatalog::standard().get("camry").cloned().expect("camry");

    let mid = engine.calculate(700, 5_000.0, &camry);
    assert_eq!(mid.option(ProductType::Finance).map(|o| o.apr), Some(6.5));
    assert_eq!(mid.option(ProductType::Lease).map(|o| o.apr), Some(5.0));

    let subprime = engine.calculate(600, 5_000.0, &camry);
    assert_eq!(subprime.option(ProductType::Finance).map(|o| o.apr), Some(9.0));
    assert_eq!(subprime.option(ProductType::Lease).map(|o| o.apr), Some(7.0));

    let implausible = engine.calculate(900, 5_000.0, &camry);
    assert_eq!(
        implausible.option(ProductType::Finance).map(|o| o.apr),
        Some(12.0)
    );
    assert_eq!(implausible.option(ProductType::Lease).map(|o| o.apr), Some(9.0));
}

#[test]
fn purchase_is_always_the_full_price_upfront() {
    let engine = FinancingEngine::standard();
    for vehicle in VehicleCatalog::standard().vehicles() {
        let result = engine.calculate(640, 0.0, vehicle);
        let purchase = result.option(ProductType::Purchase).expect("purchase option");
        assert_eq!(purchase.total_cost, vehicle.price);
        assert_eq!(purchase.upfront_cost, vehicle.price);
        assert_eq!(purchase.monthly_payment, 0.0);
    }
}

#[tokio::test]
async fn served_quote_endpoints_answer_the_remote_client() {
    let engine = Arc::new(FinancingEngine::standard());
    let base_url = serve(quote_router(engine)).await;
    let quotes = remote_quotes(&base_url, Duration::from_secs(5));
    let token = CancellationToken::new();

    let finance = quotes.finance(&rav4_finance(), &token).await;
    assert!(matches!(finance, QuoteOutcome::Remote(_)), "{finance:?}");
    assert!(approx(finance.monthly(), 419.47));

    let lease = quotes.lease(&sedan_lease(), &token).await;
    assert!(matches!(lease, QuoteOutcome::Remote(_)), "{lease:?}");
    assert!(approx(
        lease.monthly(),
        sedan_lease().local_monthly(&FinancingConfig::standard().lease)
    ));
}

#[tokio::test]
async fn failing_quote_service_degrades_to_local_math() {
    let router = Router::new()
        .route(
            "/calculatefinance/",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        )
        .route("/calculatelease/", get(|| async { "not a number" }));
    let base_url = serve(router).await;
    let quotes = remote_quotes(&base_url, Duration::from_secs(5));
    let token = CancellationToken::new();

    let finance = quotes.finance(&rav4_finance(), &token).await;
    assert_eq!(finance.warning(), Some(&QuoteError::Status(503)));
    assert!(approx(finance.monthly(), rav4_finance().local_monthly()));

    let lease = quotes.lease(&sedan_lease(), &token).await;
    assert!(matches!(lease.warning(), Some(QuoteError::Malformed(_))));
    assert!(lease.monthly() > 0.0);
}

#[tokio::test]
async fn slow_quote_service_times_out() {
    let router = Router::new().route(
        "/calculatefinance/",
        get(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            "100"
        }),
    );
    let base_url = serve(router).await;
    let quotes = remote_quotes(&base_url, Duration::from_millis(50));

    let outcome = quotes
        .finance(&rav4_finance(), &CancellationToken::new())
        .await;
    assert_eq!(outcome.warning(), Some(&QuoteError::Timeout));
    assert!(approx(outcome.monthly(), 419.47));
}

#[tokio::test]
async fn cancelled_quote_returns_local_estimate() {
    let quotes = remote_quotes("http://127.0.0.1:9", Duration::from_secs(5));
    let token = CancellationToken::new();
    token.cancel();

    let outcome = quotes.finance(&rav4_finance(), &token).await;
    assert_eq!(outcome.warning(), Some(&QuoteError::Cancelled));
}
