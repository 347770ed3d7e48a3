use async_trait::async_trait;
use shared::provided::Provided;
use tracing::info;

use crate::{NotificationSender, WitnessCodeRecipient};

/// Writes outgoing messages to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotificationSender;

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send_witness_code(
        &self,
        provided: &Provided,
        recipient: &WitnessCodeRecipient,
        code: &str,
    ) -> anyhow::Result<()> {
        info!(
            lpa_id = %provided.lpa_id,
            actor = %recipient.actor_type,
            mobile = %recipient.mobile,
            code,
            "witness code sms"
        );
        Ok(())
    }

    async fn send_certificate_provider_invite(&self, provided: &Provided) -> anyhow::Result<()> {
        info!(
            lpa_id = %provided.lpa_id,
            to = %provided.certificate_provider.email,
            "certificate provider invite email"
        );
        Ok(())
    }

    async fn send_certificate_provider_prompt(&self, provided: &Provided) -> anyhow::Result<()> {
        info!(
            lpa_id = %provided.lpa_id,
            to = %provided.certificate_provider.email,
            "certificate provider prompt email"
        );
        Ok(())
    }
}
