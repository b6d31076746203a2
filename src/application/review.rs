//! Review page and final closeout summary assembly.
//!
//! Everything here is a pure function of the shipment and its documents;
//! the UI and the CSV exporter both read the structures built here.

use crate::domain::{
    expense_is_complete, format_cents_to_dollars, format_customer_date, format_optional_address,
    format_optional_cents, format_optional_date, format_optional_weight, format_weight,
    format_yes_no, gun_safe_is_complete, has_completed_all_expenses, has_completed_all_gun_safe,
    has_completed_all_pro_gear, has_completed_all_weight_tickets, has_incomplete_weight_ticket,
    non_pro_gear_weight_spr, pro_gear_is_complete, pro_gear_weight_for, pro_gear_weight_spr,
    remaining_incentive, total_accepted_net_weight, total_expenses_claimed, total_gun_safe_weight,
    total_net_weight, total_package_weight_spr, total_pro_gear_weight, weight_ticket_is_complete,
    weight_ticket_net_weight, Cents, DocumentKind, GunSafeWeightTicket, MovingExpense,
    PpmDocuments, PpmShipment, Pounds, ProGearOwner, ProGearWeightTicket, WeightTicket,
    PLACEHOLDER,
};

pub const INCOMPLETE_ITEMS_MESSAGE: &str =
    "There are items below that are missing required information. Please select “Edit” to \
     enter all required information or “Delete” to remove the item.";

pub const NO_WEIGHT_TICKETS_MESSAGE: &str =
    "No weight moved documented. At least one trip is required to continue.";
pub const NO_PRO_GEAR_MESSAGE: &str = "No pro-gear weight documented.";
pub const NO_GUN_SAFE_MESSAGE: &str = "No gun safe weight documented.";
pub const NO_EXPENSES_MESSAGE: &str = "No receipts uploaded.";
pub const NO_SMALL_PACKAGE_MESSAGE: &str =
    "No small package expenses documented. At least one expense is required to continue.";

/// Optional parts of the closeout flow, switched on per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Gun safe page and review section
    pub gun_safe: bool,
}

/// Label/value pair shown inside a review item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub label: String,
    pub value: String,
}

impl ReviewRow {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self { label: label.to_string(), value: value.into() }
    }
}

/// One document on the review page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub kind: DocumentKind,
    pub id: String,
    pub title: String,
    pub rows: Vec<ReviewRow>,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSection {
    pub kind: DocumentKind,
    pub heading: String,
    pub total: String,
    pub items: Vec<ReviewItem>,
    pub empty_message: &'static str,
    pub add_label: &'static str,
}

/// Everything the review page renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseoutReview {
    pub about: Vec<ReviewRow>,
    pub documents_heading: &'static str,
    pub sections: Vec<ReviewSection>,
    pub can_advance: bool,
    pub show_incomplete_error: bool,
}

impl CloseoutReview {
    /// Items across all sections, in display order.
    pub fn items(&self) -> impl Iterator<Item = &ReviewItem> {
        self.sections.iter().flat_map(|section| section.items.iter())
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|section| section.items.len()).sum()
    }
}

/// Gun safe documents only count while the feature is on.
fn gun_safe_done(documents: &PpmDocuments, features: FeatureFlags) -> bool {
    !features.gun_safe || has_completed_all_gun_safe(&documents.gun_safe_weight_tickets)
}

/// Whether the customer may move past the review page.
pub fn can_advance(
    shipment: &PpmShipment,
    documents: &PpmDocuments,
    features: FeatureFlags,
) -> bool {
    let small_package_ok = !shipment.is_small_package() || !documents.moving_expenses.is_empty();
    has_completed_all_weight_tickets(&documents.weight_tickets, shipment.ppm_type)
        && has_completed_all_expenses(&documents.moving_expenses)
        && has_completed_all_pro_gear(&documents.pro_gear_weight_tickets)
        && gun_safe_done(documents, features)
        && small_package_ok
}

pub fn show_incomplete_error(documents: &PpmDocuments, features: FeatureFlags) -> bool {
    has_incomplete_weight_ticket(&documents.weight_tickets)
        || !has_completed_all_expenses(&documents.moving_expenses)
        || !has_completed_all_pro_gear(&documents.pro_gear_weight_tickets)
        || !gun_safe_done(documents, features)
}

fn about_rows(shipment: &PpmShipment) -> Vec<ReviewRow> {
    let mut rows = vec![
        ReviewRow::new(
            "Departure date",
            shipment
                .actual_move_date
                .as_deref()
                .map(format_customer_date)
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ),
        ReviewRow::new("Pickup address", format_optional_address(shipment.pickup_address.as_ref())),
    ];
    if shipment.has_secondary_pickup_address == Some(true) {
        rows.push(ReviewRow::new(
            "Second pickup address",
            format_optional_address(shipment.secondary_pickup_address.as_ref()),
        ));
    }
    rows.push(ReviewRow::new(
        "Destination address",
        format_optional_address(shipment.destination_address.as_ref()),
    ));
    if shipment.has_secondary_destination_address == Some(true) {
        rows.push(ReviewRow::new(
            "Second destination address",
            format_optional_address(shipment.secondary_destination_address.as_ref()),
        ));
    }
    rows.push(ReviewRow::new("Advance received", format_yes_no(shipment.has_received_advance)));
    if shipment.has_received_advance == Some(true) {
        rows.push(ReviewRow::new(
            "Advance amount",
            format_optional_cents(shipment.advance_amount_received),
        ));
    }
    rows.push(ReviewRow::new("W-2 address", format_optional_address(shipment.w2_address.as_ref())));
    rows
}

fn or_placeholder(value: Option<&str>) -> String {
    value.unwrap_or(PLACEHOLDER).to_string()
}

fn weight_ticket_item(index: usize, ticket: &WeightTicket) -> ReviewItem {
    let mut rows = vec![
        ReviewRow::new(
            "Vehicle description",
            or_placeholder(ticket.vehicle_description.as_deref()),
        ),
        ReviewRow::new("Empty", format_optional_weight(ticket.empty_weight)),
        ReviewRow::new("Full", format_optional_weight(ticket.full_weight)),
        ReviewRow::new("Trip weight", format_weight(weight_ticket_net_weight(ticket))),
        ReviewRow::new("Trailer", format_yes_no(ticket.owns_trailer)),
    ];
    if ticket.owns_trailer == Some(true) {
        rows.push(ReviewRow::new("Claimable", format_yes_no(ticket.trailer_meets_criteria)));
    }
    ReviewItem {
        kind: DocumentKind::WeightTicket,
        id: ticket.id.clone(),
        title: format!("Trip {}", index + 1),
        rows,
        is_complete: weight_ticket_is_complete(ticket),
    }
}

fn pro_gear_item(index: usize, ticket: &ProGearWeightTicket) -> ReviewItem {
    let owner = match ticket.belongs_to_self {
        Some(true) => "Self",
        Some(false) => "Spouse",
        None => PLACEHOLDER,
    };
    ReviewItem {
        kind: DocumentKind::ProGear,
        id: ticket.id.clone(),
        title: format!("Set {}", index + 1),
        rows: vec![
            ReviewRow::new("Belongs to", owner),
            ReviewRow::new("Description", or_placeholder(ticket.description.as_deref())),
            ReviewRow::new("Weight", format_optional_weight(ticket.weight)),
        ],
        is_complete: pro_gear_is_complete(ticket),
    }
}

fn gun_safe_item(index: usize, ticket: &GunSafeWeightTicket) -> ReviewItem {
    ReviewItem {
        kind: DocumentKind::GunSafe,
        id: ticket.id.clone(),
        title: format!("Gun Safe {}", index + 1),
        rows: vec![
            ReviewRow::new("Description", or_placeholder(ticket.description.as_deref())),
            ReviewRow::new("Weight", format_optional_weight(ticket.weight)),
            ReviewRow::new("Weight tickets", format_yes_no(ticket.has_weight_tickets)),
        ],
        is_complete: gun_safe_is_complete(ticket),
    }
}

fn expense_item(index: usize, expense: &MovingExpense) -> ReviewItem {
    let type_label = expense
        .moving_expense_type
        .map(|t| t.label().to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let mut rows = vec![ReviewRow::new("Type", type_label)];
    if let Some(description) = &expense.description {
        rows.push(ReviewRow::new("Description", description.clone()));
    }
    rows.push(ReviewRow::new("Amount", format_optional_cents(expense.amount)));
    if expense.sit_start_date.is_some() || expense.sit_end_date.is_some() {
        let start = format_optional_date(expense.sit_start_date.as_deref());
        let end = format_optional_date(expense.sit_end_date.as_deref());
        rows.push(ReviewRow::new("Start date", start));
        rows.push(ReviewRow::new("End date", end));
    }
    if let Some(weight) = expense.weight_shipped {
        rows.push(ReviewRow::new("Package weight", format_weight(weight)));
    }
    ReviewItem {
        kind: DocumentKind::Expense,
        id: expense.id.clone(),
        title: format!("Receipt {}", index + 1),
        rows,
        is_complete: expense_is_complete(expense),
    }
}

/// Builds the review page for a shipment.
///
/// Small-package moves only show expenses; other moves show weight
/// moved, pro-gear (when the customer said they have any, or documented
/// some anyway), gun safe (when that feature is on) and expenses.
pub fn build_review(
    shipment: &PpmShipment,
    documents: &PpmDocuments,
    features: FeatureFlags,
) -> CloseoutReview {
    let small_package = shipment.is_small_package();
    let expenses = ReviewSection {
        kind: DocumentKind::Expense,
        heading: if small_package { "Small Package Expenses" } else { "Expenses" }.to_string(),
        total: format_cents_to_dollars(total_expenses_claimed(&documents.moving_expenses)),
        items: documents
            .moving_expenses
            .iter()
            .enumerate()
            .map(|(i, expense)| expense_item(i, expense))
            .collect(),
        empty_message: if small_package { NO_SMALL_PACKAGE_MESSAGE } else { NO_EXPENSES_MESSAGE },
        add_label: "Add Expenses",
    };

    let mut sections = Vec::new();
    if !small_package {
        sections.push(ReviewSection {
            kind: DocumentKind::WeightTicket,
            heading: "Weight moved".to_string(),
            total: format_weight(total_net_weight(&documents.weight_tickets)),
            items: documents
                .weight_tickets
                .iter()
                .enumerate()
                .map(|(i, ticket)| weight_ticket_item(i, ticket))
                .collect(),
            empty_message: NO_WEIGHT_TICKETS_MESSAGE,
            add_label: "Add More Weight",
        });
        if shipment.has_pro_gear == Some(true) || !documents.pro_gear_weight_tickets.is_empty() {
            sections.push(ReviewSection {
                kind: DocumentKind::ProGear,
                heading: "Pro-gear".to_string(),
                total: format_weight(total_pro_gear_weight(&documents.pro_gear_weight_tickets)),
                items: documents
                    .pro_gear_weight_tickets
                    .iter()
                    .enumerate()
                    .map(|(i, ticket)| pro_gear_item(i, ticket))
                    .collect(),
                empty_message: NO_PRO_GEAR_MESSAGE,
                add_label: "Add Pro-gear Weight",
            });
        }
        if features.gun_safe {
            sections.push(ReviewSection {
                kind: DocumentKind::GunSafe,
                heading: "Gun safe".to_string(),
                total: format_weight(total_gun_safe_weight(&documents.gun_safe_weight_tickets)),
                items: documents
                    .gun_safe_weight_tickets
                    .iter()
                    .enumerate()
                    .map(|(i, ticket)| gun_safe_item(i, ticket))
                    .collect(),
                empty_message: NO_GUN_SAFE_MESSAGE,
                add_label: "Add Gun Safe Weight",
            });
        }
    }
    sections.push(expenses);

    CloseoutReview {
        about: about_rows(shipment),
        documents_heading: if small_package { "Small Package Expenses" } else { "Documents" },
        sections,
        can_advance: can_advance(shipment, documents, features),
        show_incomplete_error: show_incomplete_error(documents, features),
    }
}

/// Totals shown on the final closeout page and exported to CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalCloseoutSummary {
    pub incentive_heading: String,
    pub lines: Vec<String>,
    pub final_incentive: Option<Cents>,
    pub advance_received: Option<Cents>,
    pub remaining_incentive: Option<Cents>,
}

impl FinalCloseoutSummary {
    pub fn new(shipment: &PpmShipment, documents: &PpmDocuments, features: FeatureFlags) -> Self {
        let mut lines = Vec::new();
        if shipment.is_small_package() {
            let expenses = &documents.moving_expenses;
            lines.push(format!(
                "{} total small package weight",
                format_weight(total_package_weight_spr(expenses))
            ));
            lines.push(format!("{} of pro-gear", format_weight(pro_gear_weight_spr(expenses))));
            lines.push(format!(
                "{} of non-pro-gear",
                format_weight(non_pro_gear_weight_spr(expenses))
            ));
        } else {
            let net = total_net_weight(&documents.weight_tickets);
            lines.push(format!("{} total net weight", format_weight(net)));
            let accepted = total_accepted_net_weight(&documents.weight_tickets);
            if accepted != net {
                lines.push(format!("{} accepted after review", format_weight(accepted)));
            }

            let pro_gear = &documents.pro_gear_weight_tickets;
            lines.push(format!("{} of pro-gear", format_weight(total_pro_gear_weight(pro_gear))));
            let spouse = pro_gear_weight_for(pro_gear, ProGearOwner::Spouse);
            if spouse > Pounds::ZERO {
                lines.push(format!(
                    "{} yours, {} your spouse's",
                    format_weight(pro_gear_weight_for(pro_gear, ProGearOwner::SelfOnly)),
                    format_weight(spouse)
                ));
            }

            if features.gun_safe {
                lines.push(format!(
                    "{} of gun safe",
                    format_weight(total_gun_safe_weight(&documents.gun_safe_weight_tickets))
                ));
            }
        }
        lines.push(format!(
            "{} in expenses claimed",
            format_cents_to_dollars(total_expenses_claimed(&documents.moving_expenses))
        ));

        let advance_received = if shipment.has_received_advance == Some(true) {
            shipment.advance_amount_received
        } else {
            None
        };

        Self {
            incentive_heading: format!(
                "Your final estimated incentive: {}",
                format_optional_cents(shipment.final_incentive)
            ),
            lines,
            final_incentive: shipment.final_incentive,
            advance_received,
            remaining_incentive: remaining_incentive(shipment.final_incentive, advance_received),
        }
    }

    /// Incentive lines below the totals.
    pub fn incentive_lines(&self) -> Vec<String> {
        vec![
            format!("{} final incentive", format_optional_cents(self.final_incentive)),
            format!(
                "{} advance received",
                format_cents_to_dollars(self.advance_received.unwrap_or(Cents::ZERO))
            ),
            format!("{} remaining incentive", format_optional_cents(self.remaining_incentive)),
        ]
    }
}
