//! Reqwest-backed ERP gateway.
//!
//! This adapter owns transport details only: endpoint construction, basic
//! authentication, the `sap-client` header, and the request timeout. Replies
//! are returned whatever their status; classification happens in the domain.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url, header};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{ErpGateway, ErpGatewayError};
use crate::domain::{ErpBatchPayload, ErpReply};

const GOODS_RECEIPT_PATH: &str = "zapi/ZAPI/OJI_GR_ENTRY";
const PURCHASE_ORDER_PATH: &str = "sap/opu/odata4/sap/zmm_oji_po_bind/srvd/sap/zmm_oji_po/0001";
const SAP_CLIENT_HEADER: &str = "sap-client";

/// Connection settings for the ERP.
#[derive(Clone)]
pub struct ErpConnection {
    /// Scheme, host and optional port of the ERP.
    pub base_url: Url,
    /// Basic-auth user.
    pub username: String,
    /// Basic-auth password.
    pub password: Zeroizing<String>,
    /// SAP client number sent with every request.
    pub client: String,
    /// Upper bound on one round-trip.
    pub timeout: Duration,
    /// Skip TLS certificate validation for self-signed ERP hosts.
    pub accept_invalid_certs: bool,
}

impl std::fmt::Debug for ErpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpConnection")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("client", &self.client)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl ErpConnection {
    fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

/// ERP gateway performing authenticated JSON requests against one host.
pub struct HttpErpGateway {
    client: Client,
    connection: ErpConnection,
}

impl HttpErpGateway {
    /// Build a gateway with a reqwest client bounded by the connection timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(connection: ErpConnection) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(connection.timeout)
            .danger_accept_invalid_certs(connection.accept_invalid_certs)
            .build()?;
        Ok(Self { client, connection })
    }

    fn authorised(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(
                &self.connection.username,
                Some(self.connection.password.as_str()),
            )
            .header(header::ACCEPT, "application/json")
            .header(SAP_CLIENT_HEADER, self.connection.client.as_str())
    }

    async fn send(&self, request: RequestBuilder) -> Result<ErpReply, ErpGatewayError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let raw_body = response.text().await.map_err(map_transport_error)?;
        debug!(status, bytes = raw_body.len(), "ERP reply received");
        Ok(reply(status, raw_body))
    }
}

#[async_trait]
impl ErpGateway for HttpErpGateway {
    fn goods_receipt_endpoint(&self) -> String {
        format!(
            "{}/{GOODS_RECEIPT_PATH}?{SAP_CLIENT_HEADER}={}",
            self.connection.base(),
            self.connection.client
        )
    }

    fn purchase_order_endpoint(&self, po_no: &str) -> String {
        format!(
            "{}/{PURCHASE_ORDER_PATH}/ZPOA_DTL_LIST(po_no='{}')/Set",
            self.connection.base(),
            odata_literal(po_no)
        )
    }

    async fn post_goods_receipt(
        &self,
        payload: &ErpBatchPayload,
    ) -> Result<ErpReply, ErpGatewayError> {
        let request = self
            .client
            .post(self.goods_receipt_endpoint())
            .header(header::CONTENT_TYPE, "application/json")
            .json(payload);
        self.send(self.authorised(request)).await
    }

    async fn fetch_purchase_order(&self, po_no: &str) -> Result<ErpReply, ErpGatewayError> {
        let request = self.client.get(self.purchase_order_endpoint(po_no));
        self.send(self.authorised(request)).await
    }
}

/// Escape a value for use inside a single-quoted OData key literal.
fn odata_literal(raw: &str) -> String {
    raw.replace('\'', "''")
}

fn reply(status: u16, raw_body: String) -> ErpReply {
    let body = serde_json::from_str(&raw_body).ok();
    ErpReply {
        status,
        body,
        raw_body,
    }
}

fn map_transport_error(error: reqwest::Error) -> ErpGatewayError {
    if error.is_timeout() {
        ErpGatewayError::timeout(error.to_string())
    } else {
        ErpGatewayError::transport(error.to_string())
    }
}
