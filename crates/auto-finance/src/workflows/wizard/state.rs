use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::workflows::advisory::VehiclePick;
use crate::workflows::financing::{
    ApplicantProfile, FinancingOption, ProductType, RecommendationResult, VehicleOption,
};

/// Screens of the financing journey, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    #[default]
    Home,
    Form,
    Loading,
    CarSelection,
    LoadingPayment,
    Results,
    Analysis,
}

impl WizardStep {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Home,
            Self::Form,
            Self::Loading,
            Self::CarSelection,
            Self::LoadingPayment,
            Self::Results,
            Self::Analysis,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Form => "form",
            Self::Loading => "loading",
            Self::CarSelection => "carSelection",
            Self::LoadingPayment => "loadingPayment",
            Self::Results => "results",
            Self::Analysis => "analysis",
        }
    }
}

/// What happens when an event does not fit the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Report the invalid transition as an error.
    Strict,
    /// Log it and leave the session untouched.
    Lenient,
}

/// Minimum time the two loading screens stay visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardTiming {
    pub profile_delay: Duration,
    pub payment_delay: Duration,
}

impl WizardTiming {
    pub fn new(profile_delay: Duration, payment_delay: Duration) -> Self {
        Self {
            profile_delay,
            payment_delay,
        }
    }
}

impl Default for WizardTiming {
    fn default() -> Self {
        Self::new(Duration::from_millis(800), Duration::from_millis(2_000))
    }
}

/// Inputs to [`WizardSession::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    Begin,
    SubmitProfile(ApplicantProfile),
    VehiclePickResolved {
        epoch: u64,
        pick: VehiclePick,
        notice: Option<String>,
    },
    SelectVehicle(VehicleOption),
    RecommendationReady {
        epoch: u64,
        result: RecommendationResult,
        notices: Vec<String>,
    },
    ChooseProduct(ProductType),
    AdviceResolved {
        epoch: u64,
        advice: String,
        notice: Option<String>,
    },
    BackToResults,
    StartOver,
}

impl WizardEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            WizardEvent::Begin => "begin",
            WizardEvent::SubmitProfile(_) => "submit_profile",
            WizardEvent::VehiclePickResolved { .. } => "vehicle_pick_resolved",
            WizardEvent::SelectVehicle(_) => "select_vehicle",
            WizardEvent::RecommendationReady { .. } => "recommendation_ready",
            WizardEvent::ChooseProduct(_) => "choose_product",
            WizardEvent::AdviceResolved { .. } => "advice_resolved",
            WizardEvent::BackToResults => "back_to_results",
            WizardEvent::StartOver => "start_over",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {event} while on the {from} step")]
pub struct TransitionError {
    pub from: &'static str,
    pub event: &'static str,
}

/// Everything the journey has accumulated so far.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WizardSession {
    pub step: WizardStep,
    pub profile: Option<ApplicantProfile>,
    pub selected_vehicle: Option<VehicleOption>,
    pub vehicle_explanation: Option<String>,
    pub recommendation: Option<RecommendationResult>,
    pub product_override: Option<ProductType>,
    pub advisory: Option<String>,
    pub notices: Vec<String>,
    /// Tags asynchronous work; results carrying an older epoch are discarded.
    pub epoch: u64,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// The user's choice when made, otherwise the engine's recommendation.
    pub fn active_product(&self) -> Option<ProductType> {
        self.product_override
            .or_else(|| self.recommendation.as_ref().map(|r| r.recommended))
    }

    pub fn active_option(&self) -> Option<&FinancingOption> {
        let product = self.active_product()?;
        self.recommendation.as_ref()?.option(product)
    }

    /// Next session for `event`. Completions tagged with a superseded epoch leave
    /// the session unchanged.
    pub fn apply(&self, event: WizardEvent) -> Result<WizardSession, TransitionError> {
        let invalid = TransitionError {
            from: self.step.label(),
            event: event.name(),
        };

        match (self.step, event) {
            (_, WizardEvent::StartOver) => Ok(WizardSession {
                epoch: self.epoch + 1,
                ..WizardSession::default()
            }),
            (WizardStep::Home, WizardEvent::Begin) => Ok(WizardSession {
                step: WizardStep::Form,
                ..self.clone()
            }),
            (WizardStep::Form, WizardEvent::SubmitProfile(profile)) => Ok(WizardSession {
                step: WizardStep::Loading,
                profile: Some(profile),
                selected_vehicle: None,
                vehicle_explanation: None,
                recommendation: None,
                product_override: None,
                advisory: None,
                notices: Vec::new(),
                epoch: self.epoch + 1,
            }),
            (_, WizardEvent::VehiclePickResolved { epoch, .. })
            | (_, WizardEvent::RecommendationReady { epoch, .. })
            | (_, WizardEvent::AdviceResolved { epoch, .. })
                if !self.is_current(epoch) =>
            {
                Ok(self.clone())
            }
            (
                WizardStep::Loading,
                WizardEvent::VehiclePickResolved { pick, notice, .. },
            ) => {
                let mut next = self.clone();
                next.step = WizardStep::CarSelection;
                next.selected_vehicle = Some(pick.vehicle);
                next.vehicle_explanation = Some(pick.explanation);
                next.notices.extend(notice);
                Ok(next)
            }
            (WizardStep::CarSelection, WizardEvent::SelectVehicle(vehicle)) => {
                let mut next = self.clone();
                next.step = WizardStep::LoadingPayment;
                next.selected_vehicle = Some(vehicle);
                next.recommendation = None;
                next.product_override = None;
                next.advisory = None;
                next.epoch += 1;
                Ok(next)
            }
            (
                WizardStep::LoadingPayment,
                WizardEvent::RecommendationReady {
                    result, notices, ..
                },
            ) => {
                let mut next = self.clone();
                next.step = WizardStep::Results;
                next.recommendation = Some(result);
                next.notices.extend(notices);
                Ok(next)
            }
            (WizardStep::Results, WizardEvent::ChooseProduct(product)) => {
                let mut next = self.clone();
                next.step = WizardStep::Analysis;
                next.product_override = Some(product);
                next.advisory = None;
                next.epoch += 1;
                Ok(next)
            }
            (
                WizardStep::Analysis | WizardStep::Results,
                WizardEvent::AdviceResolved { advice, notice, .. },
            ) => {
                let mut next = self.clone();
                next.advisory = Some(advice);
                next.notices.extend(notice);
                Ok(next)
            }
            (WizardStep::Analysis, WizardEvent::BackToResults) => Ok(WizardSession {
                step: WizardStep::Results,
                ..self.clone()
            }),
            _ => Err(invalid),
        }
    }
}
