use anyhow::Context as _;
use lettre::message::{Mailbox, header::ContentType};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::repository::Mailer;
use crate::domain::types::OutgoingMail;

#[derive(Clone)]
enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    /// Development: messages are written to the log instead of sent.
    Log,
}

/// [`Mailer`] backed by lettre's async SMTP transport, or by the log when no
/// SMTP host is configured.
#[derive(Clone)]
pub struct LettreMailer {
    from: Mailbox,
    transport: Transport,
}

impl LettreMailer {
    pub fn new(from: &str, smtp_host: Option<&str>, smtp_port: u16) -> anyhow::Result<Self> {
        let from: Mailbox = from.parse().context("invalid sender address")?;
        let transport = match smtp_host {
            Some(host) => Transport::Smtp(
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                    .port(smtp_port)
                    .build(),
            ),
            None => Transport::Log,
        };
        Ok(Self { from, transport })
    }
}

async fn deliver(
    transport: &AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    mail: OutgoingMail,
) -> anyhow::Result<()> {
    let to: Mailbox = mail.recipient.parse().context("invalid recipient address")?;
    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body)
        .context("build message")?;
    transport.send(message).await.context("smtp send")?;
    Ok(())
}

impl Mailer for LettreMailer {
    fn send(&self, mail: OutgoingMail) {
        match &self.transport {
            Transport::Log => {
                tracing::info!(
                    recipient = %mail.recipient,
                    subject = %mail.subject,
                    body = %mail.body,
                    "mail not sent: no SMTP host configured"
                );
            }
            Transport::Smtp(transport) => {
                let transport = transport.clone();
                let from = self.from.clone();
                tokio::spawn(async move {
                    let recipient = mail.recipient.clone();
                    if let Err(e) = deliver(&transport, from, mail).await {
                        tracing::warn!(error = %format!("{e:#}"), %recipient, "mail delivery failed");
                    }
                });
            }
        }
    }
}
