use std::time::Duration;

use auto_finance::config::AppConfig;
use auto_finance::error::AppError;
use auto_finance::workflows::financing::{
    ApplicantProfile, FinanceQuoteRequest, FinancingOption, LeaseModel, LeaseQuoteRequest,
    ProductType, ProfileForm, QuoteOutcome, RecommendationResult,
};
use auto_finance::workflows::wizard::{WizardSession, WizardTiming};
use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::infra::{format_money, parse_lease_model, Services};

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Catalog vehicle id (corolla, camry, rav4)
    #[arg(long, default_value = "camry")]
    pub(crate) vehicle: String,
    /// Credit score or bucketed range such as 740-799
    #[arg(long, default_value = "700")]
    pub(crate) credit_score: String,
    /// Cash put down, in dollars
    #[arg(long, default_value = "0")]
    pub(crate) down_payment: String,
    /// Lease model used for the lease row (simplified or detailed)
    #[arg(long, default_value = "simplified", value_parser = parse_lease_model)]
    pub(crate) lease_model: LeaseModel,
    /// Cross-check finance and lease payments against the downstream quote service
    #[arg(long)]
    pub(crate) remote: bool,
    /// Print cumulative payments at yearly milestones
    #[arg(long)]
    pub(crate) schedule: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Credit score or bucketed range such as 740-799
    #[arg(long, default_value = "740-799")]
    pub(crate) credit_score: String,
    #[arg(long, default_value = "72000")]
    pub(crate) annual_income: String,
    #[arg(long, default_value = "6000")]
    pub(crate) down_payment: String,
    #[arg(long, default_value = "480")]
    pub(crate) monthly_budget: String,
    #[arg(long, default_value = "full-time")]
    pub(crate) employment_status: String,
    #[arg(long)]
    pub(crate) car_price: Option<String>,
    #[arg(long)]
    pub(crate) lifestyle: Option<String>,
    #[arg(long)]
    pub(crate) job_description: Option<String>,
    /// Vehicle to select instead of the suggested one
    #[arg(long)]
    pub(crate) vehicle: Option<String>,
    /// Financing product to analyse instead of the recommended one
    #[arg(long)]
    pub(crate) product: Option<ProductType>,
    /// Skip the loading-screen delays
    #[arg(long)]
    pub(crate) fast: bool,
}

pub(crate) async fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        vehicle,
        credit_score,
        down_payment,
        lease_model,
        remote,
        schedule,
    } = args;

    let config = AppConfig::load()?;
    let services = Services::offline();
    let vehicle = services.catalog.get(&vehicle)?;
    let profile = ApplicantProfile::from_form(ProfileForm {
        credit_score: Some(credit_score),
        down_payment: Some(down_payment),
        ..ProfileForm::default()
    });

    let engine = (*services.engine).clone().with_lease_model(lease_model);
    let result = engine.recommend(&profile, vehicle)?;

    println!(
        "{} {} at {}",
        vehicle.name,
        vehicle.model,
        format_money(vehicle.price)
    );
    render_recommendation(&result);

    if schedule {
        render_schedule(&result);
    }

    if remote {
        let quotes = services.quotes(&config, true);
        let token = CancellationToken::new();
        let down = profile.down_payment()?;

        println!("\nDownstream quotes ({})", config.quotes.base_url);
        if let Some(finance) = result.option(ProductType::Finance) {
            let request = FinanceQuoteRequest {
                vehicle_value: vehicle.price,
                apr: finance.apr,
                months: finance.term_months,
                downpayment: down,
            };
            render_quote("Finance", &quotes.finance(&request, &token).await);
        }
        if let Some(lease) = result.option(ProductType::Lease) {
            let request = LeaseQuoteRequest {
                msrp: vehicle.price,
                apr: lease.apr,
                term_months: lease.term_months,
                downpayment: down,
            };
            render_quote("Lease (detailed)", &quotes.lease(&request, &token).await);
        }
    }

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        credit_score,
        annual_income,
        down_payment,
        monthly_budget,
        employment_status,
        car_price,
        lifestyle,
        job_description,
        vehicle,
        product,
        fast,
    } = args;

    let mut config = AppConfig::load()?;
    if fast {
        config.wizard = WizardTiming::new(Duration::ZERO, Duration::ZERO);
    }

    let services = Services::from_config(&config);
    let mut wizard = services.wizard(&config);

    println!("Vehicle financing wizard demo");
    println!(
        "- advisory: {}",
        if services.advisory.is_remote_enabled() {
            "remote with heuristic fallback"
        } else {
            "heuristics only (no credential configured)"
        }
    );

    wizard.begin()?;
    render_step(wizard.session());

    let form = ProfileForm {
        credit_score: Some(credit_score),
        annual_income: Some(annual_income),
        down_payment: Some(down_payment),
        car_price,
        employment_status: Some(employment_status),
        monthly_budget: Some(monthly_budget),
        lifestyle,
        job_description,
    };
    wizard.submit_profile(form).await?;
    render_step(wizard.session());

    let suggested = wizard.session().selected_vehicle.clone();
    if let Some(suggested) = &suggested {
        println!(
            "  Suggested: {} {} ({})",
            suggested.name,
            suggested.model,
            format_money(suggested.price)
        );
    }
    if let Some(explanation) = &wizard.session().vehicle_explanation {
        println!("  Why: {}", explanation);
    }

    let budget = wizard
        .session()
        .profile
        .as_ref()
        .and_then(|profile| profile.monthly_budget.value());
    println!("  Catalog:");
    for option in services.catalog.badged_for(budget) {
        println!(
            "    - {:<8} {:<15} {:>12}{}",
            option.id,
            option.name,
            format_money(option.price),
            option
                .badge
                .map(|badge| format!("  [{badge}]"))
                .unwrap_or_default()
        );
    }

    let vehicle_id = vehicle
        .or_else(|| suggested.map(|vehicle| vehicle.id))
        .unwrap_or_else(|| "camry".to_string());
    wizard.select_vehicle(&vehicle_id).await?;
    render_step(wizard.session());

    let Some(result) = wizard.session().recommendation.clone() else {
        println!("  No recommendation was produced");
        return Ok(());
    };
    render_recommendation(&result);

    let chosen = product.unwrap_or(result.recommended);
    wizard.choose_product(chosen)?;
    render_step(wizard.session());

    let patience = config.advisor.timeout + Duration::from_secs(1);
    match tokio::time::timeout(patience, wizard.wait_for_advice()).await {
        Ok(true) => {
            println!("  Advice for {}:", chosen.label());
            if let Some(advice) = &wizard.session().advisory {
                for line in advice.lines().filter(|line| !line.trim().is_empty()) {
                    println!("    {}", line.trim());
                }
            }
        }
        Ok(false) | Err(_) => println!("  Advice still pending"),
    }

    if !wizard.session().notices.is_empty() {
        println!("  Notices:");
        for notice in &wizard.session().notices {
            println!("    - {notice}");
        }
    }

    wizard.back_to_results()?;
    render_step(wizard.session());
    wizard.start_over()?;
    render_step(wizard.session());

    Ok(())
}

fn render_step(session: &WizardSession) {
    println!("\n[{}] epoch {}", session.step.label(), session.epoch);
}

fn render_option(option: &FinancingOption, recommended: bool) {
    let marker = if recommended { "*" } else { " " };
    println!(
        "  {marker} {:<9} {:>11}/mo  {:>5.2}% APR  {:>2} mo  upfront {:>12}  total {:>12}",
        option.product.label(),
        format_money(option.monthly_payment),
        option.apr,
        option.term_months,
        format_money(option.upfront_cost),
        format_money(option.total_cost),
    );
}

fn render_recommendation(result: &RecommendationResult) {
    println!(
        "  Down payment ratio {:.1}% -> recommended {}",
        result.down_payment_ratio * 100.0,
        result.recommended.label()
    );
    for option in &result.options {
        render_option(option, option.product == result.recommended);
    }
}

fn render_schedule(result: &RecommendationResult) {
    println!("\n  Cumulative payments");
    for point in result
        .payment_schedule()
        .iter()
        .filter(|point| point.month % 12 == 0)
    {
        println!(
            "    month {:>2}: lease {:>12}  finance {:>12}  purchase {:>12}",
            point.month,
            format_money(point.lease),
            format_money(point.finance),
            format_money(point.purchase)
        );
    }
}

fn render_quote(label: &str, outcome: &QuoteOutcome) {
    match outcome {
        QuoteOutcome::Remote(monthly) => {
            println!("  - {label}: {}/mo", format_money(*monthly));
        }
        QuoteOutcome::Local { monthly, reason } => {
            println!(
                "  - {label}: {}/mo (local estimate; {reason})",
                format_money(*monthly)
            );
        }
    }
}
