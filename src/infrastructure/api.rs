//! Blocking HTTP client for the closeout endpoints.

use super::source::{DocumentChange, DocumentSource, SourceError, SourceResult};
use crate::domain::{DocumentKind, Entitlement, PpmDocuments, PpmShipment, Pounds};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedCertification<'a> {
    certification_text: &'a str,
    signature: &'a str,
}

/// The part of `GET /orders/{id}` the closeout reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OrdersResponse {
    entitlement: OrdersEntitlement,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OrdersEntitlement {
    pro_gear: Option<Pounds>,
    pro_gear_spouse: Option<Pounds>,
    gun_safe_weight: Option<Pounds>,
}

impl From<OrdersEntitlement> for Entitlement {
    fn from(orders: OrdersEntitlement) -> Self {
        let standard = Entitlement::default();
        Entitlement {
            pro_gear_weight: orders.pro_gear.unwrap_or(standard.pro_gear_weight),
            pro_gear_weight_spouse: orders
                .pro_gear_spouse
                .unwrap_or(standard.pro_gear_weight_spouse),
            gun_safe_weight: orders.gun_safe_weight.unwrap_or(standard.gun_safe_weight),
        }
    }
}

const CERTIFICATION_TEXT: &str =
    "I certify that the information provided in this closeout is true and correct.";

/// Talks to `{base_url}/ppm-shipments/{id}/...`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    ppm_shipment_id: String,
    orders_id: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, ppm_shipment_id: &str) -> SourceResult<Self> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            ppm_shipment_id: ppm_shipment_id.to_string(),
            orders_id: None,
        })
    }

    /// Reads weight allowances from `{base_url}/orders/{orders_id}`.
    pub fn with_orders(mut self, orders_id: &str) -> Self {
        self.orders_id = Some(orders_id.to_string());
        self
    }

    pub fn orders_url(&self, orders_id: &str) -> String {
        format!("{}/orders/{}", self.base_url, orders_id)
    }

    /// Absolute URL for a path below the shipment.
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            format!("{}/ppm-shipments/{}", self.base_url, self.ppm_shipment_id)
        } else {
            format!("{}/ppm-shipments/{}/{}", self.base_url, self.ppm_shipment_id, path)
        }
    }

    fn document_path(kind: DocumentKind) -> &'static str {
        match kind {
            DocumentKind::WeightTicket => "weight-ticket",
            DocumentKind::ProGear => "pro-gear-weight-tickets",
            DocumentKind::GunSafe => "gun-safe-weight-tickets",
            DocumentKind::Expense => "moving-expense",
        }
    }

    fn send(request: RequestBuilder) -> SourceResult<Response> {
        let response = request.header(ACCEPT, "application/json").send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().unwrap_or_default();
        warn!(status = status.as_u16(), %message, "request rejected");
        Err(SourceError::Status { status: status.as_u16(), message })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> SourceResult<T> {
        self.get_url(self.url(path))
    }

    fn get_url<T: DeserializeOwned>(&self, url: String) -> SourceResult<T> {
        debug!(%url, "GET");
        let body = Self::send(self.client.get(&url))?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    fn write_json<T: Serialize>(&self, request: RequestBuilder, body: &T) -> SourceResult<()> {
        let body = serde_json::to_string(body)?;
        Self::send(request.header(CONTENT_TYPE, "application/json").body(body))?;
        Ok(())
    }

    fn save_document<T: Serialize>(
        &self,
        kind: DocumentKind,
        id: &str,
        record: &T,
    ) -> SourceResult<()> {
        let path = Self::document_path(kind);
        if id.is_empty() {
            let url = self.url(path);
            debug!(%url, "POST");
            self.write_json(self.client.post(&url), record)
        } else {
            let url = self.url(&format!("{}/{}", path, id));
            debug!(%url, "PATCH");
            self.write_json(self.client.patch(&url), record)
        }
    }
}

impl DocumentSource for ApiClient {
    fn fetch_shipment(&mut self) -> SourceResult<PpmShipment> {
        self.get_json("")
    }

    fn fetch_documents(&mut self) -> SourceResult<PpmDocuments> {
        self.get_json("ppm-documents")
    }

    fn fetch_entitlement(&mut self) -> SourceResult<Entitlement> {
        let Some(orders_id) = &self.orders_id else {
            return Ok(Entitlement::default());
        };
        let orders: OrdersResponse = self.get_url(self.orders_url(orders_id))?;
        Ok(orders.entitlement.into())
    }

    fn submit(&mut self, change: DocumentChange) -> SourceResult<()> {
        match &change {
            DocumentChange::UpdateShipment(shipment) => {
                let url = self.url("");
                debug!(%url, "PATCH");
                self.write_json(self.client.patch(&url), shipment)
            }
            DocumentChange::SaveWeightTicket(ticket) => {
                self.save_document(DocumentKind::WeightTicket, &ticket.id, ticket)
            }
            DocumentChange::SaveProGear(ticket) => {
                self.save_document(DocumentKind::ProGear, &ticket.id, ticket)
            }
            DocumentChange::SaveGunSafe(ticket) => {
                self.save_document(DocumentKind::GunSafe, &ticket.id, ticket)
            }
            DocumentChange::SaveExpense(expense) => {
                self.save_document(DocumentKind::Expense, &expense.id, expense)
            }
            DocumentChange::Delete { kind, id } => {
                let url = self.url(&format!("{}/{}", Self::document_path(*kind), id));
                debug!(%url, "DELETE");
                Self::send(self.client.delete(&url))?;
                Ok(())
            }
            DocumentChange::SubmitCloseout { signature } => {
                let url = self.url("submit-ppm-shipment-documentation");
                debug!(%url, "POST");
                let body = SignedCertification {
                    certification_text: CERTIFICATION_TEXT,
                    signature,
                };
                self.write_json(self.client.post(&url), &body)
            }
        }
    }
}
