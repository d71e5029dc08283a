//! Checkout stages and the transition function.
//!
//! [`transition`] is the only way to move between stages. It is pure: the
//! caller performs whatever I/O an event implies and reports the result as
//! the next event.

use serde::Serialize;

use super::validation::ValidationError;
use crate::pix::PixPaymentData;
use crate::types::PaymentMethod;

/// The single active checkout stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum CheckoutStage {
    /// Collecting customer, address, shipping and payment method.
    Form,
    /// A submit passed the gate; no interaction until it resolves.
    PaymentProcessing { method: PaymentMethod },
    /// PIX charge created, waiting for the customer to pay.
    PixScreen { pix: PixPaymentData },
    /// Simulated card decline; the only way forward is PIX.
    PaymentError,
    /// Terminal.
    Success,
}

impl CheckoutStage {
    /// Stable stage name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::PaymentProcessing { .. } => "payment_processing",
            Self::PixScreen { .. } => "pix_screen",
            Self::PaymentError => "payment_error",
            Self::Success => "success",
        }
    }
}

/// Stage plus the message currently shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutState {
    #[serde(flatten)]
    stage: CheckoutStage,
    error: Option<String>,
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutState {
    /// A fresh checkout on the form stage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: CheckoutStage::Form,
            error: None,
        }
    }

    const fn at(stage: CheckoutStage, error: Option<String>) -> Self {
        Self { stage, error }
    }

    #[must_use]
    pub const fn stage(&self) -> &CheckoutStage {
        &self.stage
    }

    /// Message to show, if the last event failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a payment is in flight.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(self.stage, CheckoutStage::PaymentProcessing { .. })
    }

    /// The PIX payload, only while the PIX screen is active.
    #[must_use]
    pub const fn pix_data(&self) -> Option<&PixPaymentData> {
        match &self.stage {
            CheckoutStage::PixScreen { pix } => Some(pix),
            _ => None,
        }
    }
}

/// Something that happened to the checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    /// The form passed the validation gate.
    Submit { method: PaymentMethod },
    /// The form failed the validation gate.
    SubmitRejected(ValidationError),
    /// The gateway produced a usable PIX payload.
    PixReady(PixPaymentData),
    /// The PIX charge failed (rejection, unusable payload or transport).
    PaymentFailed { message: String },
    /// The simulated card authorization finished.
    CardDeclined,
    /// The customer accepted switching to PIX after a card decline.
    RetryWithPix,
    /// The customer says the PIX has been paid.
    PaymentConfirmed,
    /// The customer left the checkout.
    Reset,
}

impl CheckoutEvent {
    /// Stable event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Submit { .. } => "submit",
            Self::SubmitRejected(_) => "submit_rejected",
            Self::PixReady(_) => "pix_ready",
            Self::PaymentFailed { .. } => "payment_failed",
            Self::CardDeclined => "card_declined",
            Self::RetryWithPix => "retry_with_pix",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::Reset => "reset",
        }
    }
}

/// Events that are not allowed in the current stage.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A second submit arrived while a payment is in flight.
    #[error("a payment is already being processed")]
    AlreadyProcessing,
    /// The checkout already reached `success`.
    #[error("checkout is already complete")]
    Completed,
    #[error("event {event} is not valid in stage {stage}")]
    Invalid {
        stage: &'static str,
        event: &'static str,
    },
}

/// Compute the state that follows `event`.
///
/// # Errors
///
/// Returns a [`TransitionError`] if `event` is not accepted in the current
/// stage. The caller keeps its current state in that case.
pub fn transition(
    state: &CheckoutState,
    event: CheckoutEvent,
) -> Result<CheckoutState, TransitionError> {
    use CheckoutEvent as E;
    use CheckoutStage as S;

    let next = match (&state.stage, event) {
        (_, E::Reset) => CheckoutState::new(),

        (S::Success, _) => return Err(TransitionError::Completed),
        (S::PaymentProcessing { .. }, E::Submit { .. }) => {
            return Err(TransitionError::AlreadyProcessing);
        }

        (S::Form, E::Submit { method }) => {
            CheckoutState::at(S::PaymentProcessing { method }, None)
        }
        (S::Form, E::SubmitRejected(reason)) => {
            CheckoutState::at(S::Form, Some(reason.to_string()))
        }

        (
            S::PaymentProcessing {
                method: PaymentMethod::Pix,
            },
            E::PixReady(pix),
        ) => CheckoutState::at(S::PixScreen { pix }, None),
        (
            S::PaymentProcessing {
                method: PaymentMethod::Pix,
            },
            E::PaymentFailed { message },
        ) => CheckoutState::at(S::Form, Some(message)),
        (
            S::PaymentProcessing {
                method: PaymentMethod::Card,
            },
            E::CardDeclined,
        ) => CheckoutState::at(S::PaymentError, None),

        (S::PaymentError, E::RetryWithPix) => CheckoutState::at(
            S::PaymentProcessing {
                method: PaymentMethod::Pix,
            },
            None,
        ),

        (S::PixScreen { .. }, E::PaymentConfirmed) => CheckoutState::at(S::Success, None),

        (stage, event) => {
            return Err(TransitionError::Invalid {
                stage: stage.name(),
                event: event.name(),
            });
        }
    };

    Ok(next)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pix() -> PixPaymentData {
        PixPaymentData {
            qrcode: "https://example.com/qr.png".to_string(),
            qrcode_text: "00020101021226".to_string(),
            order_id: None,
            expires_at: None,
        }
    }

    fn run(events: Vec<CheckoutEvent>) -> CheckoutState {
        events
            .into_iter()
            .fold(CheckoutState::new(), |state, event| {
                transition(&state, event).unwrap()
            })
    }

    #[test]
    fn test_pix_happy_path() {
        let state = run(vec![
            CheckoutEvent::Submit {
                method: PaymentMethod::Pix,
            },
            CheckoutEvent::PixReady(pix()),
        ]);
        assert_eq!(state.pix_data(), Some(&pix()));

        let done = transition(&state, CheckoutEvent::PaymentConfirmed).unwrap();
        assert_eq!(done.stage(), &CheckoutStage::Success);
        assert_eq!(done.pix_data(), None);
    }

    #[test]
    fn test_rejected_submit_keeps_form_with_one_message() {
        for reason in [
            ValidationError::Name,
            ValidationError::Email,
            ValidationError::Phone,
            ValidationError::Cpf,
            ValidationError::Cep,
        ] {
            let state = transition(
                &CheckoutState::new(),
                CheckoutEvent::SubmitRejected(reason),
            )
            .unwrap();
            assert_eq!(state.stage(), &CheckoutStage::Form);
            assert_eq!(state.error(), Some(reason.to_string().as_str()));
        }
    }

    #[test]
    fn test_payment_failure_returns_to_form() {
        let state = run(vec![
            CheckoutEvent::Submit {
                method: PaymentMethod::Pix,
            },
            CheckoutEvent::PaymentFailed {
                message: "CPF inválido".to_string(),
            },
        ]);
        assert_eq!(state.stage(), &CheckoutStage::Form);
        assert_eq!(state.error(), Some("CPF inválido"));
        assert!(!state.is_processing());
    }

    #[test]
    fn test_submit_clears_previous_error() {
        let state = run(vec![
            CheckoutEvent::SubmitRejected(ValidationError::Cep),
            CheckoutEvent::Submit {
                method: PaymentMethod::Pix,
            },
        ]);
        assert!(state.is_processing());
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_reentrant_submit_rejected() {
        let state = run(vec![CheckoutEvent::Submit {
            method: PaymentMethod::Pix,
        }]);
        assert_eq!(
            transition(
                &state,
                CheckoutEvent::Submit {
                    method: PaymentMethod::Pix
                }
            ),
            Err(TransitionError::AlreadyProcessing)
        );
    }

    #[test]
    fn test_card_decline_then_retry_with_pix() {
        let state = run(vec![
            CheckoutEvent::Submit {
                method: PaymentMethod::Card,
            },
            CheckoutEvent::CardDeclined,
        ]);
        assert_eq!(state.stage(), &CheckoutStage::PaymentError);

        let retry = transition(&state, CheckoutEvent::RetryWithPix).unwrap();
        assert_eq!(
            retry.stage(),
            &CheckoutStage::PaymentProcessing {
                method: PaymentMethod::Pix
            }
        );
    }

    #[test]
    fn test_card_processing_ignores_pix_events() {
        let state = run(vec![CheckoutEvent::Submit {
            method: PaymentMethod::Card,
        }]);
        assert!(matches!(
            transition(&state, CheckoutEvent::PixReady(pix())),
            Err(TransitionError::Invalid { .. })
        ));
    }

    #[test]
    fn test_success_is_terminal_except_reset() {
        let state = run(vec![
            CheckoutEvent::Submit {
                method: PaymentMethod::Pix,
            },
            CheckoutEvent::PixReady(pix()),
            CheckoutEvent::PaymentConfirmed,
        ]);
        assert_eq!(
            transition(&state, CheckoutEvent::RetryWithPix),
            Err(TransitionError::Completed)
        );
        assert_eq!(
            transition(&state, CheckoutEvent::Reset).unwrap(),
            CheckoutState::new()
        );
    }

    #[test]
    fn test_invalid_pairs() {
        assert_eq!(
            transition(&CheckoutState::new(), CheckoutEvent::PaymentConfirmed),
            Err(TransitionError::Invalid {
                stage: "form",
                event: "payment_confirmed"
            })
        );
        assert!(transition(&CheckoutState::new(), CheckoutEvent::CardDeclined).is_err());
    }

    #[test]
    fn test_serializes_stage_tag() {
        let json = serde_json::to_value(CheckoutState::new()).unwrap();
        assert_eq!(json["stage"], "form");
        assert!(json["error"].is_null());
    }
}
