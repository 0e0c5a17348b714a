//! Gateway HTTP client.

use async_trait::async_trait;
use mockall::automock;

use crate::gateway::{
    GatewayError,
    types::{CreateOrderRequest, CreateOrderResponse, StatusRequest, StatusResponse},
};

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submit a signed order and return the gateway's checkout handle.
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, GatewayError>;

    /// Query the gateway for the current state of an order.
    async fn query_status(&self, request: StatusRequest) -> Result<StatusResponse, GatewayError>;
}

#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPaymentGateway {
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, GatewayError> {
        self.client
            .post(format!("{}/create", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(GatewayError::Request)?
            .error_for_status()
            .map_err(GatewayError::Request)?
            .json()
            .await
            .map_err(GatewayError::Request)
    }

    async fn query_status(&self, request: StatusRequest) -> Result<StatusResponse, GatewayError> {
        self.client
            .post(format!("{}/query", self.endpoint))
            .json(&request)
            .send()
            .await
            .map_err(GatewayError::Request)?
            .error_for_status()
            .map_err(GatewayError::Request)?
            .json()
            .await
            .map_err(GatewayError::Request)
    }
}
