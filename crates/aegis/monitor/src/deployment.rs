//! Deployment slot: holds the active monitoring context and swaps it on
//! redeploy.
//!
//! In-flight observations keep the `Arc` they resolved, so a redeploy never
//! tears a context out from under a running request.

use std::sync::{Arc, RwLock};

use aegis_anticipation::RiskLevel;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::config::MonitorConfig;
use crate::context::{DeploymentId, DeploymentInfo, MonitoringContext};
use crate::error::{MonitorError, MonitorResult};
use crate::outcome::MonitoringOutcome;
use crate::signals::{EpochSignals, InferenceObservation};

/// Events emitted by the deployment slot.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A new context became active.
    Deployed {
        deployment_id: DeploymentId,
        model_name: String,
    },

    /// A context stopped receiving observations.
    Retired(DeploymentId),

    /// Risk level differs from the previous observation of the same deployment.
    RiskLevelChanged {
        deployment_id: DeploymentId,
        previous: RiskLevel,
        current: RiskLevel,
        fai_score: f64,
    },
}

/// Owner of the active [`MonitoringContext`].
pub struct DeploymentSlot {
    config: MonitorConfig,
    active: RwLock<Option<Arc<MonitoringContext>>>,
    event_tx: broadcast::Sender<MonitorEvent>,
}

impl DeploymentSlot {
    /// Empty slot. Every deployment is built from `config`.
    pub fn new(config: MonitorConfig) -> MonitorResult<Self> {
        config.validate()?;
        let (event_tx, _) = broadcast::channel(config.event_capacity);

        Ok(Self {
            config,
            active: RwLock::new(None),
            event_tx,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Subscribe to deployment and risk events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    /// Build a fresh context for `model_name` and make it active.
    ///
    /// The previous context, if any, is retired. Its baselines are not
    /// carried over.
    #[instrument(skip(self, model_name))]
    pub fn deploy(&self, model_name: impl Into<String>) -> MonitorResult<Arc<MonitoringContext>> {
        let info = DeploymentInfo::new(model_name);
        let context = Arc::new(MonitoringContext::new(info.clone(), &self.config)?);

        let previous = {
            let mut active = self.active.write().map_err(|_| MonitorError::LockError)?;
            active.replace(Arc::clone(&context))
        };

        if let Some(previous) = previous {
            info!(deployment = %previous.id(), "deployment retired");
            let _ = self.event_tx.send(MonitorEvent::Retired(previous.id()));
        }

        info!(
            deployment = %info.id,
            model = %info.model_name,
            "model deployed with fresh baselines"
        );
        let _ = self.event_tx.send(MonitorEvent::Deployed {
            deployment_id: info.id,
            model_name: info.model_name,
        });

        Ok(context)
    }

    /// Active context.
    pub fn current(&self) -> MonitorResult<Arc<MonitoringContext>> {
        self.active
            .read()
            .map_err(|_| MonitorError::LockError)?
            .clone()
            .ok_or(MonitorError::NoActiveDeployment)
    }

    /// Whether a model is deployed.
    pub fn is_deployed(&self) -> bool {
        self.current().is_ok()
    }

    /// Empty the slot, returning what was deployed.
    #[instrument(skip(self))]
    pub fn retire(&self) -> MonitorResult<Option<DeploymentInfo>> {
        let previous = self
            .active
            .write()
            .map_err(|_| MonitorError::LockError)?
            .take();

        Ok(previous.map(|context| {
            info!(deployment = %context.id(), "deployment retired");
            let _ = self.event_tx.send(MonitorEvent::Retired(context.id()));
            context.deployment().clone()
        }))
    }

    /// Observe a served prediction against the active deployment.
    pub fn observe_inference(
        &self,
        observation: InferenceObservation,
    ) -> MonitorResult<MonitoringOutcome> {
        let context = self.current()?;
        let outcome = context.observe_inference(observation)?;
        self.publish_risk_change(&outcome);
        Ok(outcome)
    }

    /// Observe a training epoch against the active deployment.
    pub fn observe_epoch(&self, signals: &EpochSignals) -> MonitorResult<MonitoringOutcome> {
        let context = self.current()?;
        let outcome = context.observe_epoch(signals)?;
        self.publish_risk_change(&outcome);
        Ok(outcome)
    }

    /// The transition itself is decided by the context, so late outcomes
    /// from a retired deployment cannot disturb the active one.
    fn publish_risk_change(&self, outcome: &MonitoringOutcome) {
        if outcome.risk_changed() {
            let _ = self.event_tx.send(MonitorEvent::RiskLevelChanged {
                deployment_id: outcome.deployment_id,
                previous: outcome.previous_risk_level,
                current: outcome.risk_level(),
                fai_score: outcome.assessment.fai_score,
            });
        }
    }
}
