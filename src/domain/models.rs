use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of money in whole cents, as the API sends it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(pub i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub fn saturating_add(self, other: Cents) -> Cents {
        Cents(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Cents) -> Cents {
        Cents(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A weight in whole pounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pounds(pub i64);

impl Pounds {
    pub const ZERO: Pounds = Pounds(0);

    pub fn saturating_add(self, other: Pounds) -> Pounds {
        Pounds(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Pounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review outcome an office user recorded for a closeout document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Approved,
    Rejected,
    Excluded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PpmType {
    #[default]
    IncentiveBased,
    ActualExpense,
    SmallPackage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseType {
    ContractedExpense,
    Gas,
    Oil,
    Other,
    PackingMaterials,
    RentalEquipment,
    Storage,
    Tolls,
    WeighingFee,
    SmallPackage,
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 10] = [
        ExpenseType::ContractedExpense,
        ExpenseType::Gas,
        ExpenseType::Oil,
        ExpenseType::Other,
        ExpenseType::PackingMaterials,
        ExpenseType::RentalEquipment,
        ExpenseType::Storage,
        ExpenseType::Tolls,
        ExpenseType::WeighingFee,
        ExpenseType::SmallPackage,
    ];

    /// Wire name, also used as the form value.
    pub fn code(&self) -> &'static str {
        match self {
            ExpenseType::ContractedExpense => "CONTRACTED_EXPENSE",
            ExpenseType::Gas => "GAS",
            ExpenseType::Oil => "OIL",
            ExpenseType::Other => "OTHER",
            ExpenseType::PackingMaterials => "PACKING_MATERIALS",
            ExpenseType::RentalEquipment => "RENTAL_EQUIPMENT",
            ExpenseType::Storage => "STORAGE",
            ExpenseType::Tolls => "TOLLS",
            ExpenseType::WeighingFee => "WEIGHING_FEE",
            ExpenseType::SmallPackage => "SMALL_PACKAGE",
        }
    }

    pub fn from_code(code: &str) -> Option<ExpenseType> {
        Self::ALL.iter().copied().find(|t| t.code() == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseType::ContractedExpense => "Contracted expense",
            ExpenseType::Gas => "Gas",
            ExpenseType::Oil => "Oil",
            ExpenseType::Other => "Other",
            ExpenseType::PackingMaterials => "Packing materials",
            ExpenseType::RentalEquipment => "Rental equipment",
            ExpenseType::Storage => "Storage",
            ExpenseType::Tolls => "Tolls",
            ExpenseType::WeighingFee => "Weighing fee",
            ExpenseType::SmallPackage => "Small package reimbursement",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub uploads: Vec<Upload>,
}

impl Document {
    pub fn from_filenames(filenames: &[String]) -> Self {
        Self {
            id: None,
            uploads: filenames
                .iter()
                .map(|filename| Upload { id: None, filename: filename.clone() })
                .collect(),
        }
    }

    pub fn filenames(&self) -> Vec<String> {
        self.uploads.iter().map(|u| u.filename.clone()).collect()
    }

    pub fn has_uploads(&self) -> bool {
        !self.uploads.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeightTicket {
    pub id: String,
    pub vehicle_description: Option<String>,
    pub empty_weight: Option<Pounds>,
    pub full_weight: Option<Pounds>,
    pub missing_empty_weight_ticket: bool,
    pub missing_full_weight_ticket: bool,
    pub owns_trailer: Option<bool>,
    pub trailer_meets_criteria: Option<bool>,
    pub adjusted_net_weight: Option<Pounds>,
    pub status: Option<DocumentStatus>,
    pub empty_document: Document,
    pub full_document: Document,
    pub proof_of_trailer_ownership_document: Document,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProGearWeightTicket {
    pub id: String,
    pub belongs_to_self: Option<bool>,
    pub description: Option<String>,
    pub has_weight_tickets: Option<bool>,
    pub weight: Option<Pounds>,
    pub status: Option<DocumentStatus>,
    pub document: Document,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GunSafeWeightTicket {
    pub id: String,
    pub description: Option<String>,
    pub has_weight_tickets: Option<bool>,
    pub weight: Option<Pounds>,
    pub status: Option<DocumentStatus>,
    pub document: Document,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovingExpense {
    pub id: String,
    pub moving_expense_type: Option<ExpenseType>,
    pub description: Option<String>,
    #[serde(rename = "paidWithGTCC")]
    pub paid_with_gtcc: Option<bool>,
    pub amount: Option<Cents>,
    pub missing_receipt: bool,
    pub status: Option<DocumentStatus>,
    pub document: Document,
    pub sit_start_date: Option<String>,
    pub sit_end_date: Option<String>,
    pub sit_location: Option<String>,
    pub weight_stored: Option<Pounds>,
    pub weight_shipped: Option<Pounds>,
    pub is_pro_gear: Option<bool>,
    pub pro_gear_belongs_to_self: Option<bool>,
    pub pro_gear_description: Option<String>,
    pub tracking_number: Option<String>,
}

/// A postal address as the API sends it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street_address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PpmShipment {
    pub id: String,
    pub shipment_id: String,
    pub ppm_type: PpmType,
    pub actual_move_date: Option<String>,
    pub pickup_address: Option<Address>,
    pub has_secondary_pickup_address: Option<bool>,
    pub secondary_pickup_address: Option<Address>,
    pub destination_address: Option<Address>,
    pub has_secondary_destination_address: Option<bool>,
    pub secondary_destination_address: Option<Address>,
    pub w2_address: Option<Address>,
    pub has_received_advance: Option<bool>,
    pub advance_amount_received: Option<Cents>,
    pub final_incentive: Option<Cents>,
    pub estimated_weight: Option<Pounds>,
    pub has_pro_gear: Option<bool>,
    pub pro_gear_weight: Option<Pounds>,
    pub spouse_pro_gear_weight: Option<Pounds>,
    pub has_gun_safe: Option<bool>,
    pub gun_safe_weight: Option<Pounds>,
    pub signed_certification: Option<String>,
}

impl PpmShipment {
    pub fn is_small_package(&self) -> bool {
        self.ppm_type == PpmType::SmallPackage
    }
}

/// The closeout documents the API returns for one PPM shipment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpmDocuments {
    #[serde(rename = "WeightTickets")]
    pub weight_tickets: Vec<WeightTicket>,
    #[serde(rename = "ProGearWeightTickets")]
    pub pro_gear_weight_tickets: Vec<ProGearWeightTicket>,
    #[serde(rename = "MovingExpenses")]
    pub moving_expenses: Vec<MovingExpense>,
    #[serde(rename = "GunSafeWeightTickets")]
    pub gun_safe_weight_tickets: Vec<GunSafeWeightTicket>,
}

/// Which closeout collection a document lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    WeightTicket,
    ProGear,
    Expense,
    GunSafe,
}

impl PpmDocuments {
    /// Inserts or replaces (by id) a weight ticket, keeping insertion order.
    pub fn upsert_weight_ticket(&mut self, ticket: WeightTicket) {
        match self.weight_tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(existing) => *existing = ticket,
            None => self.weight_tickets.push(ticket),
        }
    }

    pub fn upsert_pro_gear(&mut self, ticket: ProGearWeightTicket) {
        match self.pro_gear_weight_tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(existing) => *existing = ticket,
            None => self.pro_gear_weight_tickets.push(ticket),
        }
    }

    pub fn upsert_expense(&mut self, expense: MovingExpense) {
        match self.moving_expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => *existing = expense,
            None => self.moving_expenses.push(expense),
        }
    }

    pub fn upsert_gun_safe(&mut self, ticket: GunSafeWeightTicket) {
        match self.gun_safe_weight_tickets.iter_mut().find(|t| t.id == ticket.id) {
            Some(existing) => *existing = ticket,
            None => self.gun_safe_weight_tickets.push(ticket),
        }
    }

    /// Whether a document of `kind` with this id exists.
    pub fn contains(&self, kind: DocumentKind, id: &str) -> bool {
        match kind {
            DocumentKind::WeightTicket => self.weight_tickets.iter().any(|t| t.id == id),
            DocumentKind::ProGear => self.pro_gear_weight_tickets.iter().any(|t| t.id == id),
            DocumentKind::Expense => self.moving_expenses.iter().any(|e| e.id == id),
            DocumentKind::GunSafe => self.gun_safe_weight_tickets.iter().any(|t| t.id == id),
        }
    }

    /// Removes a document; returns whether anything was removed.
    pub fn remove(&mut self, kind: DocumentKind, id: &str) -> bool {
        let before = self.len();
        match kind {
            DocumentKind::WeightTicket => self.weight_tickets.retain(|t| t.id != id),
            DocumentKind::ProGear => self.pro_gear_weight_tickets.retain(|t| t.id != id),
            DocumentKind::Expense => self.moving_expenses.retain(|e| e.id != id),
            DocumentKind::GunSafe => self.gun_safe_weight_tickets.retain(|t| t.id != id),
        }
        self.len() != before
    }

    pub fn len(&self) -> usize {
        self.weight_tickets.len()
            + self.pro_gear_weight_tickets.len()
            + self.moving_expenses.len()
            + self.gun_safe_weight_tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Weight allowances from the service member's orders.
///
/// Missing fields fall back to the standard allowances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Entitlement {
    pub pro_gear_weight: Pounds,
    pub pro_gear_weight_spouse: Pounds,
    pub gun_safe_weight: Pounds,
}

impl Default for Entitlement {
    fn default() -> Self {
        Self {
            pro_gear_weight: Pounds(2000),
            pro_gear_weight_spouse: Pounds(500),
            gun_safe_weight: Pounds(500),
        }
    }
}

impl Entitlement {
    pub fn pro_gear_ceiling(&self, belongs_to_self: bool) -> Pounds {
        if belongs_to_self {
            self.pro_gear_weight
        } else {
            self.pro_gear_weight_spouse
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_deserialize_api_names() {
        let json = r#"{
            "WeightTickets": [
                {"id": "wt-1", "emptyWeight": 14000, "fullWeight": 18000, "status": "APPROVED"}
            ],
            "ProGearWeightTickets": [{"id": "pg-1", "belongsToSelf": true, "weight": 750}],
            "MovingExpenses": [
                {"id": "me-1", "movingExpenseType": "GAS", "amount": 30000, "paidWithGTCC": false}
            ],
            "GunSafeWeightTickets": [
                {"id": "gs-1", "description": "Safe", "hasWeightTickets": false, "weight": 300}
            ]
        }"#;
        let docs: PpmDocuments = serde_json::from_str(json).unwrap();

        assert_eq!(docs.weight_tickets[0].full_weight, Some(Pounds(18000)));
        assert_eq!(docs.weight_tickets[0].status, Some(DocumentStatus::Approved));
        assert_eq!(docs.pro_gear_weight_tickets[0].weight, Some(Pounds(750)));
        assert_eq!(docs.moving_expenses[0].moving_expense_type, Some(ExpenseType::Gas));
        assert_eq!(docs.moving_expenses[0].paid_with_gtcc, Some(false));
        assert_eq!(docs.gun_safe_weight_tickets[0].weight, Some(Pounds(300)));
        assert_eq!(docs.gun_safe_weight_tickets[0].has_weight_tickets, Some(false));
        assert_eq!(docs.len(), 4);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut docs = PpmDocuments::default();
        docs.upsert_weight_ticket(WeightTicket { id: "a".into(), ..Default::default() });
        docs.upsert_weight_ticket(WeightTicket { id: "b".into(), ..Default::default() });
        docs.upsert_weight_ticket(WeightTicket {
            id: "a".into(),
            full_weight: Some(Pounds(10)),
            ..Default::default()
        });

        assert_eq!(docs.weight_tickets.len(), 2);
        assert_eq!(docs.weight_tickets[0].id, "a");
        assert_eq!(docs.weight_tickets[0].full_weight, Some(Pounds(10)));
    }

    #[test]
    fn test_remove_document() {
        let mut docs = PpmDocuments::default();
        docs.upsert_expense(MovingExpense { id: "me-1".into(), ..Default::default() });

        assert!(!docs.remove(DocumentKind::Expense, "missing"));
        assert!(docs.remove(DocumentKind::Expense, "me-1"));
        assert!(docs.is_empty());

        docs.upsert_gun_safe(GunSafeWeightTicket { id: "gs-1".into(), ..Default::default() });
        assert!(docs.contains(DocumentKind::GunSafe, "gs-1"));
        assert!(!docs.contains(DocumentKind::ProGear, "gs-1"));
        assert!(docs.remove(DocumentKind::GunSafe, "gs-1"));
        assert!(docs.is_empty());
    }

    #[test]
    fn test_shipment_addresses_deserialize() {
        let json = r#"{
            "id": "ppm-1",
            "pickupAddress": {
                "streetAddress1": "1 Main St",
                "city": "Fort Bragg",
                "state": "NC",
                "postalCode": "28310"
            },
            "hasSecondaryPickupAddress": false,
            "w2Address": {
                "streetAddress1": "2 Elm St",
                "streetAddress2": "Apt 4",
                "city": "Tacoma",
                "state": "WA",
                "postalCode": "98401"
            },
            "hasGunSafe": true,
            "gunSafeWeight": 400
        }"#;
        let shipment: PpmShipment = serde_json::from_str(json).unwrap();

        assert_eq!(shipment.pickup_address.as_ref().map(|a| a.city.as_str()), Some("Fort Bragg"));
        assert_eq!(shipment.destination_address, None);
        let w2 = shipment.w2_address.unwrap();
        assert_eq!(w2.street_address2.as_deref(), Some("Apt 4"));
        assert_eq!(w2.postal_code, "98401");
        assert_eq!(shipment.has_gun_safe, Some(true));
        assert_eq!(shipment.gun_safe_weight, Some(Pounds(400)));
    }

    #[test]
    fn test_expense_type_codes() {
        for expense_type in ExpenseType::ALL {
            assert_eq!(ExpenseType::from_code(expense_type.code()), Some(expense_type));
        }
        assert_eq!(ExpenseType::from_code("BOGUS"), None);
    }

    #[test]
    fn test_entitlement_ceiling() {
        let entitlement = Entitlement::default();
        assert_eq!(entitlement.pro_gear_ceiling(true), Pounds(2000));
        assert_eq!(entitlement.pro_gear_ceiling(false), Pounds(500));
        assert_eq!(entitlement.gun_safe_weight, Pounds(500));

        let partial: Entitlement = serde_json::from_str(r#"{"proGearWeightSpouse": 300}"#).unwrap();
        assert_eq!(partial.pro_gear_ceiling(false), Pounds(300));
        assert_eq!(partial.pro_gear_ceiling(true), Pounds(2000));
    }
}
