//! Request signing and IPN verification.
//!
//! Signatures are HMAC-SHA256 over an ampersand-joined `key=value` string
//! with the keys in a fixed alphabetical order. The verifier recomputes
//! the string from the payload and rejects any mismatch.

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::{
    auth::token::encode_hex,
    gateway::{
        GatewayConfig, GatewayError,
        types::{IpnPayload, ORDER_INFO, REQUEST_TYPE},
    },
};

pub(crate) fn hmac_sha256_hex(config: &GatewayConfig, message: &str) -> Result<String, GatewayError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(config.secret_key.as_bytes())
        .map_err(|_| GatewayError::Signature)?;

    mac.update(message.as_bytes());

    Ok(encode_hex(&mac.finalize().into_bytes()))
}

/// Signature for an order-creation request.
pub fn order_signature(
    config: &GatewayConfig,
    amount: u64,
    order_id: &str,
    request_id: &str,
    extra_data: &str,
) -> Result<String, GatewayError> {
    let raw = format!(
        "accessKey={access_key}&amount={amount}&extraData={extra_data}&ipnUrl={ipn_url}\
         &orderId={order_id}&orderInfo={order_info}&partnerCode={partner_code}\
         &redirectUrl={redirect_url}&requestId={request_id}&requestType={request_type}",
        access_key = config.access_key,
        ipn_url = config.ipn_url,
        order_info = ORDER_INFO,
        partner_code = config.partner_code,
        redirect_url = config.redirect_url,
        request_type = REQUEST_TYPE,
    );

    hmac_sha256_hex(config, &raw)
}

/// Signature for a status query.
pub fn status_signature(
    config: &GatewayConfig,
    order_id: &str,
    request_id: &str,
) -> Result<String, GatewayError> {
    let raw = format!(
        "accessKey={access_key}&orderId={order_id}&partnerCode={partner_code}&requestId={request_id}",
        access_key = config.access_key,
        partner_code = config.partner_code,
    );

    hmac_sha256_hex(config, &raw)
}

/// Expected signature of an IPN payload.
pub fn ipn_signature(config: &GatewayConfig, payload: &IpnPayload) -> Result<String, GatewayError> {
    let raw = format!(
        "accessKey={access_key}&amount={amount}&extraData={extra_data}&message={message}\
         &orderId={order_id}&partnerCode={partner_code}&requestId={request_id}\
         &responseTime={response_time}&resultCode={result_code}",
        access_key = config.access_key,
        amount = payload.amount,
        extra_data = payload.extra_data,
        message = payload.message.as_deref().unwrap_or(""),
        order_id = payload.order_id,
        partner_code = payload.partner_code,
        request_id = payload.request_id,
        response_time = payload.response_time,
        result_code = payload.result_code,
    );

    hmac_sha256_hex(config, &raw)
}

/// Reject any IPN whose recomputed signature mismatches.
pub fn verify_ipn(config: &GatewayConfig, payload: &IpnPayload) -> Result<(), GatewayError> {
    let expected = ipn_signature(config, payload)?;

    if !constant_time_eq(expected.as_bytes(), payload.signature.as_bytes()) {
        return Err(GatewayError::InvalidSignature);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::gateway::GatewaySecret;

    use super::*;

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            endpoint: "https://gateway.test/v2".to_string(),
            partner_code: "PARTNER".to_string(),
            partner_name: "Test".to_string(),
            store_id: "TestStore".to_string(),
            access_key: "access".to_string(),
            secret_key: GatewaySecret::new("secret"),
            redirect_url: "https://app.test/return".to_string(),
            ipn_url: "https://app.test/api/gateway/ipn".to_string(),
        }
    }

    fn ipn(signature: String) -> IpnPayload {
        IpnPayload {
            partner_code: "PARTNER".to_string(),
            order_id: "PARTNER_b1_1".to_string(),
            request_id: "PARTNER_b1_1".to_string(),
            amount: 200_000,
            result_code: 0,
            message: Some("Successful.".to_string()),
            response_time: 1_700_000_000,
            extra_data: String::new(),
            signature,
        }
    }

    #[test]
    fn order_signature_is_deterministic() {
        let config = test_config();

        let a = order_signature(&config, 1000, "o1", "r1", "").expect("signature");
        let b = order_signature(&config, 1000, "o1", "r1", "").expect("signature");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn order_signature_varies_with_amount() {
        let config = test_config();

        let a = order_signature(&config, 1000, "o1", "r1", "").expect("signature");
        let b = order_signature(&config, 1001, "o1", "r1", "").expect("signature");

        assert_ne!(a, b);
    }

    #[test]
    fn verify_ipn_accepts_valid_signature() {
        let config = test_config();
        let unsigned = ipn(String::new());
        let signature = ipn_signature(&config, &unsigned).expect("signature");

        assert!(verify_ipn(&config, &ipn(signature)).is_ok());
    }

    #[test]
    fn verify_ipn_rejects_tampered_payload() {
        let config = test_config();
        let unsigned = ipn(String::new());
        let signature = ipn_signature(&config, &unsigned).expect("signature");

        let mut tampered = ipn(signature);
        tampered.amount = 1;

        assert!(matches!(
            verify_ipn(&config, &tampered),
            Err(GatewayError::InvalidSignature)
        ));
    }
}
