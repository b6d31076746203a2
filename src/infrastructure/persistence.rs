use super::source::{DocumentChange, DocumentSource, SourceError, SourceResult};
use crate::domain::{Entitlement, PpmDocuments, PpmShipment};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// On-disk layout of a closeout data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloseoutFile {
    pub shipment: PpmShipment,
    #[serde(default)]
    pub documents: PpmDocuments,
    #[serde(default)]
    pub entitlement: Entitlement,
}

/// A [`DocumentSource`] backed by a pretty-printed JSON file.
///
/// Every submit reads the file, applies the change and rewrites it whole.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, data: &CloseoutFile) -> SourceResult<()> {
        let json = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "closeout file written");
        Ok(())
    }

    pub fn load(&self) -> SourceResult<CloseoutFile> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn next_id(prefix: &str, taken: impl Iterator<Item = String>) -> String {
        let highest = taken
            .filter_map(|id| id.strip_prefix(prefix).and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);
        format!("{}{}", prefix, highest + 1)
    }

    fn assign_id(change: DocumentChange, documents: &PpmDocuments) -> DocumentChange {
        match change {
            DocumentChange::SaveWeightTicket(mut ticket) if ticket.id.is_empty() => {
                let taken = documents.weight_tickets.iter().map(|t| t.id.clone());
                ticket.id = Self::next_id("wt-", taken);
                DocumentChange::SaveWeightTicket(ticket)
            }
            DocumentChange::SaveProGear(mut ticket) if ticket.id.is_empty() => {
                let taken = documents.pro_gear_weight_tickets.iter().map(|t| t.id.clone());
                ticket.id = Self::next_id("pg-", taken);
                DocumentChange::SaveProGear(ticket)
            }
            DocumentChange::SaveGunSafe(mut ticket) if ticket.id.is_empty() => {
                let taken = documents.gun_safe_weight_tickets.iter().map(|t| t.id.clone());
                ticket.id = Self::next_id("gs-", taken);
                DocumentChange::SaveGunSafe(ticket)
            }
            DocumentChange::SaveExpense(mut expense) if expense.id.is_empty() => {
                let taken = documents.moving_expenses.iter().map(|e| e.id.clone());
                expense.id = Self::next_id("me-", taken);
                DocumentChange::SaveExpense(expense)
            }
            other => other,
        }
    }
}

impl DocumentSource for FileRepository {
    fn fetch_shipment(&mut self) -> SourceResult<PpmShipment> {
        Ok(self.load()?.shipment)
    }

    fn fetch_documents(&mut self) -> SourceResult<PpmDocuments> {
        Ok(self.load()?.documents)
    }

    fn fetch_entitlement(&mut self) -> SourceResult<Entitlement> {
        Ok(self.load()?.entitlement)
    }

    fn submit(&mut self, change: DocumentChange) -> SourceResult<()> {
        let mut data = self.load()?;
        if let DocumentChange::Delete { kind, id } = &change
            && !data.documents.contains(*kind, id)
        {
            return Err(SourceError::NotFound(format!("document {}", id)));
        }

        let change = Self::assign_id(change, &data.documents);
        info!(change = change.describe(), path = %self.path.display(), "applying change");
        change.apply_locally(&mut data.shipment, &mut data.documents);
        self.save(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Cents, DocumentKind, GunSafeWeightTicket, MovingExpense, Pounds, WeightTicket,
    };
    use tempfile::tempdir;

    fn seeded(dir: &Path) -> FileRepository {
        let repo = FileRepository::new(dir.join("closeout.json"));
        let data = CloseoutFile {
            shipment: PpmShipment { id: "ppm-1".into(), ..Default::default() },
            documents: PpmDocuments {
                weight_tickets: vec![WeightTicket { id: "wt-1".into(), ..Default::default() }],
                ..Default::default()
            },
            ..Default::default()
        };
        repo.save(&data).unwrap();
        repo
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut repo = seeded(dir.path());

        assert_eq!(repo.fetch_shipment().unwrap().id, "ppm-1");
        assert_eq!(repo.fetch_documents().unwrap().weight_tickets.len(), 1);
    }

    #[test]
    fn test_new_documents_get_ids() {
        let dir = tempdir().unwrap();
        let mut repo = seeded(dir.path());

        repo.submit(DocumentChange::SaveWeightTicket(WeightTicket {
            full_weight: Some(Pounds(18000)),
            ..Default::default()
        }))
        .unwrap();
        repo.submit(DocumentChange::SaveExpense(MovingExpense {
            amount: Some(Cents(500)),
            ..Default::default()
        }))
        .unwrap();

        let documents = repo.fetch_documents().unwrap();
        assert_eq!(documents.weight_tickets[1].id, "wt-2");
        assert_eq!(documents.moving_expenses[0].id, "me-1");
    }

    #[test]
    fn test_gun_safe_ids_and_delete() {
        let dir = tempdir().unwrap();
        let mut repo = seeded(dir.path());

        repo.submit(DocumentChange::SaveGunSafe(GunSafeWeightTicket {
            weight: Some(Pounds(350)),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(repo.fetch_documents().unwrap().gun_safe_weight_tickets[0].id, "gs-1");

        repo.submit(DocumentChange::Delete { kind: DocumentKind::GunSafe, id: "gs-1".into() })
            .unwrap();
        assert!(repo.fetch_documents().unwrap().gun_safe_weight_tickets.is_empty());
    }

    #[test]
    fn test_entitlement_from_file() {
        let dir = tempdir().unwrap();
        let mut repo = seeded(dir.path());
        assert_eq!(repo.fetch_entitlement().unwrap(), Entitlement::default());

        let path = dir.path().join("orders.json");
        fs::write(
            &path,
            r#"{"shipment":{"id":"ppm-2"},"entitlement":{"proGearWeightSpouse":300}}"#,
        )
        .unwrap();
        let entitlement = FileRepository::new(path).fetch_entitlement().unwrap();
        assert_eq!(entitlement.pro_gear_weight_spouse, Pounds(300));
        assert_eq!(entitlement.pro_gear_weight, Entitlement::default().pro_gear_weight);
    }

    #[test]
    fn test_delete_missing_document() {
        let dir = tempdir().unwrap();
        let mut repo = seeded(dir.path());

        let result =
            repo.submit(DocumentChange::Delete { kind: DocumentKind::Expense, id: "me-9".into() });
        assert!(matches!(result, Err(SourceError::NotFound(_))));

        repo.submit(DocumentChange::Delete { kind: DocumentKind::WeightTicket, id: "wt-1".into() })
            .unwrap();
        assert!(repo.fetch_documents().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let mut repo = FileRepository::new(dir.path().join("absent.json"));
        assert!(matches!(repo.fetch_shipment(), Err(SourceError::Io(_))));
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let mut repo = FileRepository::new(path);
        assert!(matches!(repo.fetch_documents(), Err(SourceError::Json(_))));
    }
}
