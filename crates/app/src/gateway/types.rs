//! Gateway wire types.
//!
//! Field names follow the gateway's JSON contract, hence the camelCase
//! renames.

use serde::{Deserialize, Serialize};

/// Fixed `orderInfo` sent with every order.
pub const ORDER_INFO: &str = "vaccination booking";

/// Fixed `requestType` for hosted-checkout orders.
pub const REQUEST_TYPE: &str = "payWithMethod";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub partner_code: String,
    pub partner_name: String,
    pub store_id: String,
    pub request_id: String,
    pub amount: u64,
    pub order_id: String,
    pub order_info: String,
    pub redirect_url: String,
    pub ipn_url: String,
    pub lang: String,
    pub request_type: String,
    pub auto_capture: bool,
    pub extra_data: String,
    pub order_group_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub result_code: i64,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub pay_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub partner_code: String,
    pub access_key: String,
    pub order_id: String,
    pub request_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    #[serde(default)]
    pub result_code: Option<i64>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// Inbound IPN callback body. `result_code == 0` means the payment
/// succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpnPayload {
    pub partner_code: String,
    pub order_id: String,
    pub request_id: String,
    pub amount: u64,
    pub result_code: i64,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub response_time: i64,

    #[serde(default)]
    pub extra_data: String,

    pub signature: String,
}
