//! Mock Payment Gateway
//!
//! For testing and demo purposes. Hands out sequential `cs_test_` ids and
//! remembers every request it was given.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{GatewayError, HostedSession, PaymentGateway};
use crate::intent::PaymentIntentRequest;

/// In-process gateway that never leaves the machine
#[derive(Default)]
pub struct MockPaymentGateway {
    failure: Option<GatewayError>,
    requests: Mutex<Vec<PaymentIntentRequest>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway that rejects every request with `error`
    pub fn failing(error: GatewayError) -> Self {
        Self {
            failure: Some(error),
            requests: Mutex::default(),
        }
    }

    /// Requests received so far, including failed ones
    pub async fn requests(&self) -> Vec<PaymentIntentRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_session(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<HostedSession, GatewayError> {
        let mut requests = self.requests.lock().await;
        requests.push(request.clone());

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        Ok(HostedSession {
            id: format!("cs_test_{:04}", requests.len()),
        })
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::build_payment_intent;

    #[tokio::test]
    async fn test_mock_gateway_issues_ids() {
        let gateway = MockPaymentGateway::new();
        let request = build_payment_intent("4000", "x@y.com", "X", "Y").unwrap();

        let first = gateway.create_session(&request).await.unwrap();
        let second = gateway.create_session(&request).await.unwrap();

        assert_eq!(first.id, "cs_test_0001");
        assert_ne!(first.id, second.id);
        assert_eq!(gateway.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failing_gateway() {
        let gateway = MockPaymentGateway::failing(GatewayError::Card("declined".into()));
        let request = build_payment_intent("4000", "x@y.com", "X", "Y").unwrap();

        let result = gateway.create_session(&request).await;
        assert_eq!(result, Err(GatewayError::Card("declined".into())));
    }
}
