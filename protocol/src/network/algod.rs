//! # algod REST Client
//!
//! [`NodeClient`] over HTTP. Every request carries the `X-Algo-API-Token`
//! header; binary bodies (signed transactions, TEAL source) go out as
//! `application/x-binary`.
//!
//! Error mapping:
//!
//! | Situation | Error |
//! |---|---|
//! | connect / timeout / body read | `NetworkUnavailable` |
//! | submit answered 4xx | `TransactionRejected` |
//! | compile answered 400 | `InvalidArgument` |
//! | any other non-2xx | `NetworkUnavailable` |
//! | 2xx with an unparseable body | `MalformedResponse` |

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::config::{ClientConfig, ALGOD_TOKEN_HEADER};
use crate::error::ProtocolError;
use crate::identity::Address;
use crate::transaction::SuggestedParams;

use super::client::NodeClient;
use super::rpc::{
    AccountInfo, CompileResponse, ErrorResponse, NodeStatus, PendingTransactionInfo,
    SubmitResponse, TransactionParamsResponse,
};

const BINARY_CONTENT_TYPE: &str = "application/x-binary";

/// Which endpoint a failed response came from, for error mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Submit,
    Compile,
    Other,
}

/// REST client for one algod node.
#[derive(Debug, Clone)]
pub struct AlgodClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    validity_window: u64,
}

impl AlgodClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ProtocolError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProtocolError::NetworkUnavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url(),
            token: config.token.clone(),
            validity_window: config.validity_window,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{path}", self.base_url))
            .header(ALGOD_TOKEN_HEADER, &self.token)
    }

    fn post_binary(&self, path: &str, body: Vec<u8>) -> RequestBuilder {
        self.http
            .post(format!("{}{path}", self.base_url))
            .header(ALGOD_TOKEN_HEADER, &self.token)
            .header(reqwest::header::CONTENT_TYPE, BINARY_CONTENT_TYPE)
            .body(body)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: Endpoint,
    ) -> Result<T, ProtocolError> {
        let response = request
            .send()
            .await
            .map_err(|e| ProtocolError::NetworkUnavailable(e.to_string()))?;
        let body = read_success(response, endpoint).await?;
        serde_json::from_str(&body).map_err(|e| ProtocolError::MalformedResponse(e.to_string()))
    }
}

/// Return the body of a 2xx response, or the mapped error.
async fn read_success(response: Response, endpoint: Endpoint) -> Result<String, ProtocolError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ProtocolError::NetworkUnavailable(e.to_string()))?;
    if status.is_success() {
        return Ok(text);
    }

    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.message)
        .ok()
        .filter(|m| !m.is_empty())
        .unwrap_or(text);
    trace!(%status, %message, "algod error response");
    Err(map_status(status, endpoint, message))
}

fn map_status(status: StatusCode, endpoint: Endpoint, message: String) -> ProtocolError {
    match endpoint {
        Endpoint::Submit if status.is_client_error() => ProtocolError::TransactionRejected(message),
        Endpoint::Compile if status == StatusCode::BAD_REQUEST => {
            ProtocolError::InvalidArgument(format!("program does not compile: {message}"))
        }
        _ => ProtocolError::NetworkUnavailable(format!("{status}: {message}")),
    }
}

#[async_trait]
impl NodeClient for AlgodClient {
    async fn suggested_params(&self) -> Result<SuggestedParams, ProtocolError> {
        let wire: TransactionParamsResponse = self
            .execute(self.get("/v2/transactions/params"), Endpoint::Other)
            .await?;
        wire.into_suggested(self.validity_window)
    }

    async fn compile_program(&self, source: &str) -> Result<Vec<u8>, ProtocolError> {
        let response: CompileResponse = self
            .execute(
                self.post_binary("/v2/teal/compile", source.as_bytes().to_vec()),
                Endpoint::Compile,
            )
            .await?;
        debug!(hash = %response.hash, "program compiled");
        response.bytecode()
    }

    async fn submit_signed_transactions(
        &self,
        payloads: &[Vec<u8>],
    ) -> Result<String, ProtocolError> {
        let body = payloads.concat();
        debug!(count = payloads.len(), bytes = body.len(), "submitting transactions");
        let response: SubmitResponse = self
            .execute(self.post_binary("/v2/transactions", body), Endpoint::Submit)
            .await?;
        Ok(response.tx_id)
    }

    async fn account_info(&self, address: &Address) -> Result<AccountInfo, ProtocolError> {
        self.execute(self.get(&format!("/v2/accounts/{address}")), Endpoint::Other)
            .await
    }

    async fn pending_transaction_info(
        &self,
        tx_id: &str,
    ) -> Result<PendingTransactionInfo, ProtocolError> {
        self.execute(
            self.get(&format!("/v2/transactions/pending/{tx_id}")),
            Endpoint::Other,
        )
        .await
    }

    async fn status(&self) -> Result<NodeStatus, ProtocolError> {
        self.execute(self.get("/v2/status"), Endpoint::Other).await
    }

    async fn status_after_block(&self, round: u64) -> Result<NodeStatus, ProtocolError> {
        self.execute(
            self.get(&format!("/v2/status/wait-for-block-after/{round}")),
            Endpoint::Other,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_uses_configured_url() {
        let config = ClientConfig::new("http://localhost/", 4001, "t");
        let client = AlgodClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:4001");
    }

    #[test]
    fn submit_client_errors_are_rejections() {
        let err = map_status(StatusCode::BAD_REQUEST, Endpoint::Submit, "overspend".into());
        assert!(matches!(err, ProtocolError::TransactionRejected(m) if m == "overspend"));
    }

    #[test]
    fn compile_bad_request_is_invalid_argument() {
        let err = map_status(StatusCode::BAD_REQUEST, Endpoint::Compile, "1: unknown opcode".into());
        assert!(matches!(err, ProtocolError::InvalidArgument(_)));
    }

    #[test]
    fn server_errors_are_network_errors() {
        for endpoint in [Endpoint::Submit, Endpoint::Compile, Endpoint::Other] {
            let err = map_status(StatusCode::SERVICE_UNAVAILABLE, endpoint, "busy".into());
            assert!(matches!(err, ProtocolError::NetworkUnavailable(_)));
        }
    }

    #[tokio::test]
    async fn unreachable_node_is_network_unavailable() {
        let config = ClientConfig::new("http://127.0.0.1", 1, "t")
            .with_request_timeout(std::time::Duration::from_millis(200));
        let client = AlgodClient::new(&config).unwrap();
        let err = client.status().await.unwrap_err();
        assert!(matches!(err, ProtocolError::NetworkUnavailable(_)));
    }
}
