use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use thiserror::Error;

use crate::utils::logging::log_delivery_failure;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request to messaging provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("messaging provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound text channel. Addresses are bare phone numbers.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, to: &str, text: &str) -> Result<(), DeliveryError>;
}

/// Sends and forgets: a failure is logged, never retried and never surfaced.
///
/// Returns whether the provider accepted the message so callers can count
/// failures for their own logs.
pub async fn deliver(sender: &dyn MessageSender, to: &str, text: &str) -> bool {
    match sender.send(to, text).await {
        Ok(()) => true,
        Err(e) => {
            log_delivery_failure(to, &e.to_string());
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender in channel form, e.g. `whatsapp:+14155238886`.
    pub from: String,
}

/// WhatsApp delivery through the Twilio Messages API.
#[derive(Debug, Clone)]
pub struct TwilioSender {
    options: TwilioOptions,
    client: Client,
}

impl TwilioSender {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.options.account_sid
        )
    }
}

/// Adds the channel prefix the provider expects on recipient addresses.
pub fn channel_address(to: &str) -> String {
    if to.starts_with("whatsapp:") {
        to.to_string()
    } else {
        format!("whatsapp:{}", to)
    }
}

#[async_trait]
impl MessageSender for TwilioSender {
    async fn send(&self, to: &str, text: &str) -> Result<(), DeliveryError> {
        let mut form_body: HashMap<&str, String> = HashMap::new();
        form_body.insert("From", self.options.from.clone());
        form_body.insert("To", channel_address(to));
        form_body.insert("Body", text.to_string());

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Delivered message to {}", to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RefusingSender;

    #[async_trait]
    impl MessageSender for RefusingSender {
        async fn send(&self, _to: &str, _text: &str) -> Result<(), DeliveryError> {
            Err(DeliveryError::Rejected {
                status: 400,
                body: "invalid number".to_string(),
            })
        }
    }

    #[test]
    fn test_channel_address() {
        assert_eq!(channel_address("+15551234567"), "whatsapp:+15551234567");
        assert_eq!(channel_address("whatsapp:+15551234567"), "whatsapp:+15551234567");
    }

    #[test]
    fn test_messages_url_uses_account_sid() {
        let sender = TwilioSender::new(TwilioOptions {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            from: "whatsapp:+14155238886".to_string(),
        });
        assert_eq!(
            sender.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_deliver_swallows_failures() {
        let delivered = deliver(&RefusingSender, "+15551234567", "hello").await;
        assert!(!delivered);
    }
}
