use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::workflows::advisory::{AdviceRequest, AdvisoryService, Enrichment, FallbackReason};
use crate::workflows::financing::{
    ApplicantProfile, FinancingEngine, ProductType, ProfileForm, VehicleOption,
};

use super::state::{
    TransitionPolicy, WizardEvent, WizardSession, WizardStep, WizardTiming,
};
use super::WizardError;

#[derive(Debug)]
struct AdviceDelivery {
    epoch: u64,
    outcome: Enrichment<String>,
}

/// Drives a single wizard session. Every transition takes `&mut self`, so only
/// one can be in flight; background advice arrives through a channel and is
/// applied by [`poll_advice`](Self::poll_advice) or
/// [`wait_for_advice`](Self::wait_for_advice).
pub struct WizardStateMachine {
    session: WizardSession,
    advisory: Arc<AdvisoryService>,
    engine: Arc<FinancingEngine>,
    timing: WizardTiming,
    policy: TransitionPolicy,
    /// Handed to callers; cancelling it aborts whatever step is in flight.
    parent: CancellationToken,
    /// Child of `parent` guarding the work of the current epoch only.
    token: CancellationToken,
    pending_advice: Option<u64>,
    advice_tx: mpsc::UnboundedSender<AdviceDelivery>,
    advice_rx: mpsc::UnboundedReceiver<AdviceDelivery>,
}

fn fallback_notice(subject: &str, reason: Option<&FallbackReason>) -> Option<String> {
    match reason {
        None | Some(FallbackReason::NotConfigured) => None,
        Some(reason) => Some(format!("{subject} used the built-in heuristic ({reason})")),
    }
}

fn log_fallback(subject: &'static str, epoch: u64, reason: Option<&FallbackReason>) {
    match reason {
        None => debug!(subject, epoch, "advisory answered remotely"),
        Some(FallbackReason::NotConfigured) => debug!(subject, epoch, "advisory not configured"),
        Some(reason) => warn!(subject, epoch, %reason, "advisory fell back to heuristic"),
    }
}

impl WizardStateMachine {
    pub fn new(
        advisory: Arc<AdvisoryService>,
        engine: Arc<FinancingEngine>,
        timing: WizardTiming,
        policy: TransitionPolicy,
    ) -> Self {
        let (advice_tx, advice_rx) = mpsc::unbounded_channel();
        let parent = CancellationToken::new();
        let token = parent.child_token();
        Self {
            session: WizardSession::new(),
            advisory,
            engine,
            timing,
            policy,
            parent,
            token,
            pending_advice: None,
            advice_tx,
            advice_rx,
        }
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn step(&self) -> WizardStep {
        self.session.step
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Cancelling this token aborts the loading step or advice fetch in flight;
    /// the interrupted step returns [`WizardError::Superseded`]. Once cancelled,
    /// the next step runs under a fresh token, so fetch it again afterwards.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.parent.clone()
    }

    /// Applies `event` under the configured policy. `Ok(false)` means a lenient
    /// machine ignored an invalid transition.
    pub fn dispatch(&mut self, event: WizardEvent) -> Result<bool, WizardError> {
        match self.session.apply(event) {
            Ok(next) => {
                if next.step != self.session.step {
                    debug!(
                        from = self.session.step.label(),
                        to = next.step.label(),
                        epoch = next.epoch,
                        "wizard transition"
                    );
                }
                self.session = next;
                Ok(true)
            }
            Err(error) => match self.policy {
                TransitionPolicy::Strict => Err(error.into()),
                TransitionPolicy::Lenient => {
                    warn!(%error, "ignoring invalid wizard transition");
                    Ok(false)
                }
            },
        }
    }

    fn renew_token(&mut self) -> CancellationToken {
        self.token.cancel();
        if self.parent.is_cancelled() {
            self.parent = CancellationToken::new();
        }
        self.token = self.parent.child_token();
        self.token.clone()
    }

    pub fn begin(&mut self) -> Result<bool, WizardError> {
        self.dispatch(WizardEvent::Begin)
    }

    /// Stores the profile, then runs the vehicle pick alongside the minimum
    /// loading delay and lands on the selection step with the pick preselected.
    pub async fn submit_profile(&mut self, form: ProfileForm) -> Result<bool, WizardError> {
        let profile = ApplicantProfile::from_form(form);
        if !self.dispatch(WizardEvent::SubmitProfile(profile.clone()))? {
            return Ok(false);
        }
        self.pending_advice = None;

        let epoch = self.session.epoch;
        let token = self.renew_token();
        let advisory = Arc::clone(&self.advisory);
        let delay = self.timing.profile_delay;

        let pick = tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!(epoch, step = self.session.step.label(), "loading step cancelled");
                return Err(WizardError::Superseded { epoch });
            }
            (pick, ()) = async {
                tokio::join!(advisory.choose(&profile), tokio::time::sleep(delay))
            } => pick,
        };

        log_fallback("vehicle pick", epoch, pick.fallback_reason());
        let notice = fallback_notice("Vehicle suggestion", pick.fallback_reason());
        info!(
            epoch,
            vehicle = %pick.value().vehicle.id,
            remote = pick.is_remote(),
            "vehicle suggested"
        );

        self.dispatch(WizardEvent::VehiclePickResolved {
            epoch,
            pick: pick.into_value(),
            notice,
        })
    }

    /// Selects a catalog vehicle by id, prices every product and lands on the
    /// results step after the minimum delay.
    pub async fn select_vehicle(&mut self, vehicle_id: &str) -> Result<bool, WizardError> {
        let vehicle = self.advisory.catalog().get(vehicle_id)?.clone();
        self.select_vehicle_option(vehicle).await
    }

    pub async fn select_vehicle_option(
        &mut self,
        vehicle: VehicleOption,
    ) -> Result<bool, WizardError> {
        if !self.dispatch(WizardEvent::SelectVehicle(vehicle.clone()))? {
            return Ok(false);
        }
        self.pending_advice = None;

        let epoch = self.session.epoch;
        let token = self.renew_token();
        let profile = self
            .session
            .profile
            .clone()
            .unwrap_or_else(|| ApplicantProfile::from_form(ProfileForm::default()));

        let (result, substituted) = self.engine.recommend_lenient(&profile, &vehicle);
        let notices: Vec<String> = substituted
            .iter()
            .map(|issue| format!("{issue}; a conservative value was used instead"))
            .collect();
        if !notices.is_empty() {
            warn!(epoch, count = notices.len(), "profile inputs substituted");
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                warn!(epoch, step = self.session.step.label(), "loading step cancelled");
                return Err(WizardError::Superseded { epoch });
            }
            _ = tokio::time::sleep(self.timing.payment_delay) => {}
        }

        info!(
            epoch,
            vehicle = %vehicle.id,
            recommended = %result.recommended,
            "recommendation ready"
        );

        self.dispatch(WizardEvent::RecommendationReady {
            epoch,
            result,
            notices,
        })
    }

    /// Enters the analysis step at once and fetches advice in the background.
    /// Must be called from within a Tokio runtime.
    pub fn choose_product(&mut self, product: ProductType) -> Result<bool, WizardError> {
        if !self.dispatch(WizardEvent::ChooseProduct(product))? {
            return Ok(false);
        }

        let epoch = self.session.epoch;
        let token = self.renew_token();
        let profile = self
            .session
            .profile
            .clone()
            .unwrap_or_else(|| ApplicantProfile::from_form(ProfileForm::default()));
        let request = AdviceRequest::new(&profile, self.session.selected_vehicle.as_ref(), product);
        let advisory = Arc::clone(&self.advisory);
        let sender = self.advice_tx.clone();
        self.pending_advice = Some(epoch);

        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {}
                outcome = advisory.advise(&request) => {
                    let _ = sender.send(AdviceDelivery { epoch, outcome });
                }
            }
        });

        Ok(true)
    }

    fn apply_advice(&mut self, delivery: AdviceDelivery) -> bool {
        if !self.session.is_current(delivery.epoch) {
            debug!(
                stale = delivery.epoch,
                current = self.session.epoch,
                "discarding superseded advice"
            );
            return false;
        }

        log_fallback("payment advice", delivery.epoch, delivery.outcome.fallback_reason());
        let notice = fallback_notice("Payment advice", delivery.outcome.fallback_reason());
        self.pending_advice = None;

        matches!(
            self.dispatch(WizardEvent::AdviceResolved {
                epoch: delivery.epoch,
                advice: delivery.outcome.into_value(),
                notice,
            }),
            Ok(true)
        )
    }

    /// Applies any advice that has already arrived. Returns whether the session
    /// advisory text changed.
    pub fn poll_advice(&mut self) -> bool {
        let mut updated = false;
        while let Ok(delivery) = self.advice_rx.try_recv() {
            updated |= self.apply_advice(delivery);
        }
        updated
    }

    /// Waits for the advice of the current epoch. Returns `false` at once when
    /// none is outstanding.
    pub async fn wait_for_advice(&mut self) -> bool {
        while self.pending_advice.is_some() {
            match self.advice_rx.recv().await {
                Some(delivery) => {
                    if self.apply_advice(delivery) {
                        return true;
                    }
                }
                None => break,
            }
        }
        false
    }

    pub fn back_to_results(&mut self) -> Result<bool, WizardError> {
        self.dispatch(WizardEvent::BackToResults)
    }

    /// Cancels in-flight work and resets the session.
    pub fn start_over(&mut self) -> Result<bool, WizardError> {
        self.renew_token();
        self.pending_advice = None;
        self.dispatch(WizardEvent::StartOver)
    }
}

impl std::fmt::Debug for WizardStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardStateMachine")
            .field("step", &self.session.step)
            .field("epoch", &self.session.epoch)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
