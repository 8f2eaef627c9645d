//! One-time recovery codes, held in process memory.
//!
//! At most one pending code per username; a new request replaces the old
//! code. Codes expire 15 minutes after issuance, checked lazily at
//! validation time, and are single-use.

use std::{
  collections::HashMap,
  sync::Mutex,
};

use chrono::{DateTime, Duration, Utc};
use rand::{Rng as _, rngs::OsRng};
use thiserror::Error;

use crate::mail::MailRelay;

pub const CODE_TTL_MINUTES: i64 = 15;

/// Delivery failed; the pending code was discarded so a new request
/// starts clean. The message is the caller-facing diagnostic.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DeliveryFailure(pub String);

struct PendingCode {
  code:       String,
  expires_at: DateTime<Utc>,
}

/// Process-wide store of pending recovery codes.
#[derive(Default)]
pub struct RecoveryCodes {
  pending: Mutex<HashMap<String, PendingCode>>,
}

impl RecoveryCodes {
  pub fn new() -> Self {
    Self::default()
  }

  /// Draw a fresh 6-digit code for `username`, replacing any pending one.
  pub fn generate(&self, username: &str) -> String {
    let numero: u32 = OsRng.gen_range(0..=999_999);
    let code = format!("{numero:06}");

    let mut pending = self.pending.lock().expect("recovery code lock");
    pending.insert(
      username.to_string(),
      PendingCode {
        code:       code.clone(),
        expires_at: Utc::now() + Duration::minutes(CODE_TTL_MINUTES),
      },
    );
    code
  }

  /// True iff a pending, unexpired code matches `candidate` exactly
  /// (after trimming surrounding whitespace). A successful validation
  /// consumes the code; an expired code is evicted by the failed attempt.
  pub fn validate(&self, username: &str, candidate: &str) -> bool {
    self.validate_at(username, candidate, Utc::now())
  }

  pub(crate) fn validate_at(
    &self,
    username: &str,
    candidate: &str,
    now: DateTime<Utc>,
  ) -> bool {
    let mut pending = self.pending.lock().expect("recovery code lock");

    let Some(entry) = pending.get(username) else { return false };

    if entry.expires_at <= now {
      pending.remove(username);
      return false;
    }
    if entry.code != candidate.trim() {
      return false;
    }
    pending.remove(username);
    true
  }

  /// Drop the pending code for `username`, if any.
  pub fn discard(&self, username: &str) {
    let mut pending = self.pending.lock().expect("recovery code lock");
    pending.remove(username);
  }

  /// Issue a code and hand the rendered message to `relay`. On delivery
  /// failure the pending code is discarded and the caller receives a
  /// diagnostic, so the next request starts from a clean slate.
  pub async fn issue_and_send(
    &self,
    relay: &MailRelay,
    username: &str,
    email: &str,
  ) -> Result<(), DeliveryFailure> {
    let code = self.generate(username);
    let body = render_recovery_body(username, &code);

    if let Err(e) = relay
      .send(email, "Código de recuperación de contraseña", &body)
      .await
    {
      self.discard(username);
      tracing::warn!("recovery mail to {email} failed: {e}");
      return Err(DeliveryFailure(format!(
        "no se pudo enviar el correo a {email}: {e}"
      )));
    }
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn pending_code(&self, username: &str) -> Option<String> {
    let pending = self.pending.lock().expect("recovery code lock");
    pending.get(username).map(|p| p.code.clone())
  }

  #[cfg(test)]
  pub(crate) fn force_expiry(&self, username: &str, at: DateTime<Utc>) {
    let mut pending = self.pending.lock().expect("recovery code lock");
    if let Some(entry) = pending.get_mut(username) {
      entry.expires_at = at;
    }
  }
}

fn render_recovery_body(username: &str, code: &str) -> String {
  format!(
    "Hola {username},\n\n\
     Su código de recuperación es: {code}\n\n\
     El código vence en {CODE_TTL_MINUTES} minutos. Si usted no solicitó\n\
     este código, ignore este mensaje.\n"
  )
}
