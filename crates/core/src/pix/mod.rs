//! PIX charge envelopes and payload normalization.
//!
//! The gateway is loosely specified: its success envelope, the place where
//! the PIX fields live and the names of those fields all vary between
//! versions. This module turns whatever it sends into two stable shapes:
//! [`ChargeResponse`] for the envelope and [`PixPaymentData`] for the
//! payload the customer needs to pay.

mod charge;
mod extract;

pub use charge::{
    ChargeItem, ChargeRequest, ChargeResponse, GENERIC_PAYMENT_ERROR, format_api_error,
};
pub use extract::{
    CODE_RULES, EXPIRY_RULES, FieldRule, IMAGE_RULES, ORDER_ID_RULES, PixExtractor,
    PixPaymentData, QR_SERVICE_URL, RuleScope, extract_pix_data, qr_service_url,
};
