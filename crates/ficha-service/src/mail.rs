//! Outbound mail relay for recovery codes.
//!
//! SMTP in production; a file transport for development and tests, which
//! writes each message into a directory instead of delivering it.

use std::path::Path;

use lettre::{
  AsyncFileTransport, AsyncSmtpTransport, AsyncTransport as _, Message,
  Tokio1Executor,
  message::{Mailbox, header::ContentType},
  transport::smtp::authentication::Credentials,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
  #[error("invalid mailbox {0:?}")]
  Mailbox(String),

  #[error("cannot build transport: {0}")]
  Transport(String),

  #[error("cannot build message: {0}")]
  Message(String),

  #[error("delivery failed: {0}")]
  Delivery(String),
}

/// The configured outbound transport plus the sender mailbox.
pub enum MailRelay {
  Smtp {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from:      Mailbox,
  },
  File {
    transport: AsyncFileTransport<Tokio1Executor>,
    from:      Mailbox,
  },
}

impl MailRelay {
  pub fn smtp(
    host: &str,
    port: u16,
    username: &str,
    password: &str,
    from: &str,
  ) -> Result<Self, MailError> {
    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
      .map_err(|e| MailError::Transport(e.to_string()))?
      .port(port)
      .credentials(Credentials::new(
        username.to_string(),
        password.to_string(),
      ))
      .build();

    Ok(MailRelay::Smtp { transport, from: parse_mailbox(from)? })
  }

  /// Write messages into `dir` instead of delivering them.
  pub fn file(dir: &Path, from: &str) -> Result<Self, MailError> {
    let transport = AsyncFileTransport::<Tokio1Executor>::new(dir);
    Ok(MailRelay::File { transport, from: parse_mailbox(from)? })
  }

  /// Hand one rendered message to the relay.
  pub async fn send(
    &self,
    to: &str,
    subject: &str,
    body: &str,
  ) -> Result<(), MailError> {
    let from = match self {
      MailRelay::Smtp { from, .. } | MailRelay::File { from, .. } => from,
    };

    let message = Message::builder()
      .from(from.clone())
      .to(parse_mailbox(to)?)
      .subject(subject)
      .header(ContentType::TEXT_PLAIN)
      .body(body.to_string())
      .map_err(|e| MailError::Message(e.to_string()))?;

    match self {
      MailRelay::Smtp { transport, .. } => transport
        .send(message)
        .await
        .map(|_| ())
        .map_err(|e| MailError::Delivery(e.to_string())),
      MailRelay::File { transport, .. } => transport
        .send(message)
        .await
        .map(|_| ())
        .map_err(|e| MailError::Delivery(e.to_string())),
    }
  }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
  address
    .parse()
    .map_err(|_| MailError::Mailbox(address.to_string()))
}
