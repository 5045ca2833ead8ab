//! The notification dispatch engine.
//!
//! One [`Dispatcher`] serves every request: validate, build the message once,
//! then deliver it with retries under the [`RetryPolicy`]. When a
//! [`NotificationStore`] is attached each dispatch is traced as a
//! [`NotificationRecord`].

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use vasatey_common::models::{
    AlertRequest, DeliveryError, DeliveryErrorKind, DeliveryOutcome, NotificationRecord,
    NotificationStatus, PushMessage, StatusUpdate,
};
use vasatey_common::{DeliveryClient, NotificationStore, StorageError};
use vasatey_config::DispatchConfig;

use crate::message::{builder_for, MessageBuilder};
use crate::retry::{RetryDecision, RetryPolicy};
use crate::validator::{ValidationError, Validator};

/// Why a dispatch did not reach the delivery stage.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The request is valid but no push gateway is configured; nothing was sent
    #[error("Firebase is not configured")]
    NotConfigured,

    /// The `sending` record could not be stored; nothing was sent
    #[error("Could not record notification: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub outcome: DeliveryOutcome,
    /// Delivery attempts made, at least one
    pub attempts: u32,
    pub notification_id: Option<String>,
}

pub struct Dispatcher {
    validator: Validator,
    builder: Arc<dyn MessageBuilder>,
    policy: RetryPolicy,
    client: Arc<dyn DeliveryClient>,
    store: Option<Arc<dyn NotificationStore>>,
}

impl Dispatcher {
    pub fn new(
        validator: Validator,
        builder: Arc<dyn MessageBuilder>,
        policy: RetryPolicy,
        client: Arc<dyn DeliveryClient>,
    ) -> Self {
        Self {
            validator,
            builder,
            policy,
            client,
            store: None,
        }
    }

    /// Wire a dispatcher from the `dispatch` configuration section.
    ///
    /// The store is only attached when `persist_notifications` is set.
    pub fn from_config(
        config: &DispatchConfig,
        client: Arc<dyn DeliveryClient>,
        store: Option<Arc<dyn NotificationStore>>,
    ) -> Self {
        let dispatcher = Self::new(
            Validator::from_config(config),
            builder_for(config.message_mode, &config.android_channel_id),
            RetryPolicy::from_config(config),
            client,
        );
        match store {
            Some(store) if config.persist_notifications => dispatcher.with_store(store),
            _ => dispatcher,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn NotificationStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    pub async fn dispatch(&self, request: AlertRequest) -> Result<DispatchResult, DispatchError> {
        let validated = self.validator.validate(request)?;
        if !self.client.is_configured() {
            return Err(DispatchError::NotConfigured);
        }

        let started_at = Utc::now();
        let message = self.builder.build(&validated, started_at);
        let request = validated.into_inner();

        info!(
            recipient = %request.recipient_email,
            self_alert = request.is_self_alert,
            "Dispatching emergency alert"
        );

        let notification_id = match &self.store {
            Some(store) => Some(
                store
                    .insert(NotificationRecord::sending(&request, started_at))
                    .await?,
            ),
            None => None,
        };

        let (outcome, attempts) = self.deliver(&message).await;

        if let (Some(store), Some(id)) = (&self.store, &notification_id) {
            let (status, update) = match &outcome {
                DeliveryOutcome::Sent { message_id } => (
                    NotificationStatus::Sent,
                    StatusUpdate {
                        sent_at: Some(Utc::now()),
                        message_id: Some(message_id.clone()),
                        error_message: None,
                        attempts,
                    },
                ),
                DeliveryOutcome::Failed(error) => (
                    NotificationStatus::Failed,
                    StatusUpdate {
                        sent_at: None,
                        message_id: None,
                        error_message: Some(error.to_string()),
                        attempts,
                    },
                ),
            };
            // the delivery already happened; a lost status update must not change the result
            if let Err(e) = store.update_status(id, status, update).await {
                warn!(notification_id = %id, error = %e, "Failed to update notification status");
            }
        }

        Ok(DispatchResult {
            outcome,
            attempts,
            notification_id,
        })
    }

    /// Send `message` until it is accepted or the policy gives up.
    pub async fn deliver(&self, message: &PushMessage) -> (DeliveryOutcome, u32) {
        let mut attempt = 0;
        let mut rate_limited_retries = 0;

        loop {
            attempt += 1;
            let error: DeliveryError = match self.client.send(message).await {
                Ok(message_id) => {
                    info!(attempt, message_id = %message_id, "Alert delivered");
                    return (DeliveryOutcome::Sent { message_id }, attempt);
                }
                Err(error) => error,
            };

            match self.policy.decide(error.kind, attempt, rate_limited_retries) {
                RetryDecision::Retry { delay } => {
                    warn!(
                        attempt,
                        kind = %error.kind,
                        delay_ms = delay.as_millis() as u64,
                        detail = %error.detail,
                        "Delivery attempt failed, retrying"
                    );
                    if error.kind == DeliveryErrorKind::RateLimited {
                        rate_limited_retries += 1;
                    }
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Abort => {
                    warn!(
                        attempt,
                        kind = %error.kind,
                        code = ?error.code,
                        detail = %error.detail,
                        "Delivery failed"
                    );
                    debug!("Giving up after {} attempt(s)", attempt);
                    return (DeliveryOutcome::Failed(error), attempt);
                }
            }
        }
    }
}
