//! Where closeout data comes from and where edits go.

use crate::domain::{
    DocumentKind, Entitlement, GunSafeWeightTicket, MovingExpense, PpmDocuments, PpmShipment,
    ProGearWeightTicket, WeightTicket,
};
use thiserror::Error;

/// Failure talking to a [`DocumentSource`] or writing an export.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0} not found")]
    NotFound(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// One edit sent to the backend.
///
/// Documents with an empty id are created; anything else is updated.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentChange {
    UpdateShipment(PpmShipment),
    SaveWeightTicket(WeightTicket),
    SaveProGear(ProGearWeightTicket),
    SaveGunSafe(GunSafeWeightTicket),
    SaveExpense(MovingExpense),
    Delete { kind: DocumentKind, id: String },
    SubmitCloseout { signature: String },
}

impl DocumentChange {
    /// Applies the change to a local copy, used for optimistic updates.
    pub fn apply_locally(&self, shipment: &mut PpmShipment, documents: &mut PpmDocuments) {
        match self {
            DocumentChange::UpdateShipment(updated) => *shipment = updated.clone(),
            DocumentChange::SaveWeightTicket(ticket) => {
                documents.upsert_weight_ticket(ticket.clone())
            }
            DocumentChange::SaveProGear(ticket) => documents.upsert_pro_gear(ticket.clone()),
            DocumentChange::SaveGunSafe(ticket) => documents.upsert_gun_safe(ticket.clone()),
            DocumentChange::SaveExpense(expense) => documents.upsert_expense(expense.clone()),
            DocumentChange::Delete { kind, id } => {
                documents.remove(*kind, id);
            }
            DocumentChange::SubmitCloseout { signature } => {
                shipment.signed_certification = Some(signature.clone());
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            DocumentChange::UpdateShipment(_) => "update shipment",
            DocumentChange::SaveWeightTicket(_) => "save weight ticket",
            DocumentChange::SaveProGear(_) => "save pro-gear",
            DocumentChange::SaveGunSafe(_) => "save gun safe",
            DocumentChange::SaveExpense(_) => "save expense",
            DocumentChange::Delete { .. } => "delete document",
            DocumentChange::SubmitCloseout { .. } => "submit closeout",
        }
    }
}

/// The backend seam: reads are authoritative, writes may fail.
pub trait DocumentSource {
    fn fetch_shipment(&mut self) -> SourceResult<PpmShipment>;
    fn fetch_documents(&mut self) -> SourceResult<PpmDocuments>;
    fn submit(&mut self, change: DocumentChange) -> SourceResult<()>;

    /// Weight allowances from the customer's orders. Sources that know
    /// nothing about orders report the standard allowances.
    fn fetch_entitlement(&mut self) -> SourceResult<Entitlement> {
        Ok(Entitlement::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Pounds;

    #[test]
    fn test_apply_locally() {
        let mut shipment = PpmShipment::default();
        let mut documents = PpmDocuments::default();

        DocumentChange::SaveWeightTicket(WeightTicket {
            id: "wt-1".into(),
            full_weight: Some(Pounds(18000)),
            ..Default::default()
        })
        .apply_locally(&mut shipment, &mut documents);
        assert_eq!(documents.weight_tickets.len(), 1);

        DocumentChange::Delete { kind: DocumentKind::WeightTicket, id: "wt-1".into() }
            .apply_locally(&mut shipment, &mut documents);
        assert!(documents.is_empty());

        DocumentChange::SaveGunSafe(GunSafeWeightTicket { id: "gs-1".into(), ..Default::default() })
            .apply_locally(&mut shipment, &mut documents);
        assert!(documents.contains(DocumentKind::GunSafe, "gs-1"));

        DocumentChange::SubmitCloseout { signature: "Jane Doe".into() }
            .apply_locally(&mut shipment, &mut documents);
        assert_eq!(shipment.signed_certification.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_error_messages() {
        let err = SourceError::Status { status: 422, message: "invalid".into() };
        assert_eq!(err.to_string(), "Server responded with 422: invalid");
        assert_eq!(
            SourceError::NotFound("weight ticket wt-9".into()).to_string(),
            "weight ticket wt-9 not found"
        );
    }
}
