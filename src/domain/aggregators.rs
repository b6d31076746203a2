//! Totals over closeout documents.
//!
//! Every function here is pure and total: inputs are borrowed slices that
//! are never mutated, missing numeric fields count as zero, and sums
//! saturate instead of overflowing. Iteration follows the caller's order.

use super::models::{
    Cents, DocumentStatus, ExpenseType, GunSafeWeightTicket, MovingExpense, PpmType, Pounds,
    ProGearWeightTicket, WeightTicket,
};

/// Whose allowance a pro-gear ticket counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProGearOwner {
    SelfOnly,
    Spouse,
    Anyone,
}

/// Net weight of one trip: `full - empty`, never below zero.
pub fn weight_ticket_net_weight(ticket: &WeightTicket) -> Pounds {
    match (ticket.full_weight, ticket.empty_weight) {
        (Some(full), Some(empty)) => Pounds(full.0.saturating_sub(empty.0).max(0)),
        _ => Pounds::ZERO,
    }
}

/// Sums the net weight of every ticket, whatever its review status.
///
/// ```
/// use ppm_closeout::domain::{total_net_weight, Pounds, WeightTicket};
///
/// let tickets = vec![WeightTicket {
///     empty_weight: Some(Pounds(14000)),
///     full_weight: Some(Pounds(18000)),
///     ..Default::default()
/// }];
/// assert_eq!(total_net_weight(&tickets), Pounds(4000));
/// ```
pub fn total_net_weight(weight_tickets: &[WeightTicket]) -> Pounds {
    weight_tickets
        .iter()
        .map(weight_ticket_net_weight)
        .fold(Pounds::ZERO, Pounds::saturating_add)
}

/// Net weight the office counts toward payment: rejected trips are skipped
/// and a reviewer's adjusted net weight replaces the computed one.
pub fn total_accepted_net_weight(weight_tickets: &[WeightTicket]) -> Pounds {
    weight_tickets
        .iter()
        .filter(|ticket| ticket.status != Some(DocumentStatus::Rejected))
        .map(|ticket| {
            ticket
                .adjusted_net_weight
                .unwrap_or_else(|| weight_ticket_net_weight(ticket))
        })
        .fold(Pounds::ZERO, Pounds::saturating_add)
}

/// Sums pro-gear weight for self and spouse alike.
pub fn total_pro_gear_weight(pro_gear_tickets: &[ProGearWeightTicket]) -> Pounds {
    pro_gear_weight_for(pro_gear_tickets, ProGearOwner::Anyone)
}

/// Sums pro-gear weight, keeping only tickets that belong to `owner`.
///
/// A ticket whose owner has not been chosen yet only counts for `Anyone`.
pub fn pro_gear_weight_for(
    pro_gear_tickets: &[ProGearWeightTicket],
    owner: ProGearOwner,
) -> Pounds {
    pro_gear_tickets
        .iter()
        .filter(|ticket| match owner {
            ProGearOwner::Anyone => true,
            ProGearOwner::SelfOnly => ticket.belongs_to_self == Some(true),
            ProGearOwner::Spouse => ticket.belongs_to_self == Some(false),
        })
        .map(|ticket| ticket.weight.unwrap_or_default())
        .fold(Pounds::ZERO, Pounds::saturating_add)
}

pub fn total_gun_safe_weight(gun_safe_tickets: &[GunSafeWeightTicket]) -> Pounds {
    gun_safe_tickets
        .iter()
        .map(|ticket| ticket.weight.unwrap_or_default())
        .fold(Pounds::ZERO, Pounds::saturating_add)
}

/// Sums the claimed amount of every expense.
pub fn total_expenses_claimed(expenses: &[MovingExpense]) -> Cents {
    expenses
        .iter()
        .map(|expense| expense.amount.unwrap_or_default())
        .fold(Cents::ZERO, Cents::saturating_add)
}

fn weight_shipped_where(
    expenses: &[MovingExpense],
    keep: impl Fn(&MovingExpense) -> bool,
) -> Pounds {
    expenses
        .iter()
        .filter(|&expense| keep(expense))
        .map(|expense| expense.weight_shipped.unwrap_or_default())
        .fold(Pounds::ZERO, Pounds::saturating_add)
}

/// Small-package PPM: total weight shipped across every package.
pub fn total_package_weight_spr(expenses: &[MovingExpense]) -> Pounds {
    weight_shipped_where(expenses, |_| true)
}

/// Small-package PPM: weight shipped in packages that are not pro-gear.
pub fn non_pro_gear_weight_spr(expenses: &[MovingExpense]) -> Pounds {
    weight_shipped_where(expenses, |expense| expense.is_pro_gear != Some(true))
}

/// Small-package PPM: weight shipped in pro-gear packages.
pub fn pro_gear_weight_spr(expenses: &[MovingExpense]) -> Pounds {
    weight_shipped_where(expenses, |expense| expense.is_pro_gear == Some(true))
}

/// Incentive still owed after the advance: `final - advance`.
pub fn remaining_incentive(
    final_incentive: Option<Cents>,
    advance_received: Option<Cents>,
) -> Option<Cents> {
    final_incentive.map(|incentive| incentive.saturating_sub(advance_received.unwrap_or_default()))
}

pub fn weight_ticket_is_complete(ticket: &WeightTicket) -> bool {
    let has_vehicle = ticket
        .vehicle_description
        .as_deref()
        .is_some_and(|d| !d.trim().is_empty());
    let weights_in_order = match (ticket.empty_weight, ticket.full_weight) {
        (Some(empty), Some(full)) => full > empty,
        _ => false,
    };
    let trailer_answered = ticket.owns_trailer.is_some();
    let trailer_proof = ticket.owns_trailer != Some(true)
        || ticket.trailer_meets_criteria != Some(true)
        || ticket.proof_of_trailer_ownership_document.has_uploads();

    has_vehicle
        && weights_in_order
        && trailer_answered
        && trailer_proof
        && ticket.empty_document.has_uploads()
        && ticket.full_document.has_uploads()
}

/// At least one trip (not needed for small package) and every trip complete.
pub fn has_completed_all_weight_tickets(
    weight_tickets: &[WeightTicket],
    ppm_type: PpmType,
) -> bool {
    if weight_tickets.is_empty() {
        return ppm_type == PpmType::SmallPackage;
    }
    weight_tickets.iter().all(weight_ticket_is_complete)
}

pub fn has_incomplete_weight_ticket(weight_tickets: &[WeightTicket]) -> bool {
    weight_tickets.iter().any(|ticket| !weight_ticket_is_complete(ticket))
}

pub fn pro_gear_is_complete(ticket: &ProGearWeightTicket) -> bool {
    ticket.belongs_to_self.is_some()
        && ticket.description.as_deref().is_some_and(|d| !d.trim().is_empty())
        && ticket.weight.is_some_and(|w| w > Pounds::ZERO)
        && ticket.document.has_uploads()
}

pub fn has_completed_all_pro_gear(pro_gear_tickets: &[ProGearWeightTicket]) -> bool {
    pro_gear_tickets.iter().all(pro_gear_is_complete)
}

pub fn gun_safe_is_complete(ticket: &GunSafeWeightTicket) -> bool {
    ticket.description.as_deref().is_some_and(|d| !d.trim().is_empty())
        && ticket.weight.is_some_and(|w| w > Pounds::ZERO)
        && ticket.document.has_uploads()
}

pub fn has_completed_all_gun_safe(gun_safe_tickets: &[GunSafeWeightTicket]) -> bool {
    gun_safe_tickets.iter().all(gun_safe_is_complete)
}

pub fn expense_is_complete(expense: &MovingExpense) -> bool {
    let Some(expense_type) = expense.moving_expense_type else {
        return false;
    };
    let has_amount = expense.amount.is_some_and(|a| a != Cents::ZERO);
    let has_receipt = expense.document.has_uploads();
    let type_fields = match expense_type {
        ExpenseType::SmallPackage => {
            expense.weight_shipped.is_some() && expense.is_pro_gear.is_some()
        }
        ExpenseType::Storage => {
            expense.sit_start_date.is_some()
                && expense.sit_end_date.is_some()
                && expense.weight_stored.is_some_and(|w| w > Pounds::ZERO)
        }
        _ => expense.description.as_deref().is_some_and(|d| !d.trim().is_empty()),
    };
    has_amount && has_receipt && expense.paid_with_gtcc.is_some() && type_fields
}

pub fn has_completed_all_expenses(expenses: &[MovingExpense]) -> bool {
    expenses.iter().all(expense_is_complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Document, Upload};

    fn ticket(empty: i64, full: i64) -> WeightTicket {
        WeightTicket {
            empty_weight: Some(Pounds(empty)),
            full_weight: Some(Pounds(full)),
            ..Default::default()
        }
    }

    fn with_status(ticket: WeightTicket, status: DocumentStatus) -> WeightTicket {
        WeightTicket {
            status: Some(status),
            ..ticket
        }
    }

    fn uploaded(name: &str) -> Document {
        Document {
            id: None,
            uploads: vec![Upload { id: None, filename: name.to_string() }],
        }
    }

    fn complete_ticket(empty: i64, full: i64) -> WeightTicket {
        WeightTicket {
            vehicle_description: Some("Kia Forte".to_string()),
            owns_trailer: Some(false),
            empty_document: uploaded("empty.pdf"),
            full_document: uploaded("full.pdf"),
            ..ticket(empty, full)
        }
    }

    fn expense(amount: i64) -> MovingExpense {
        MovingExpense { amount: Some(Cents(amount)), ..Default::default() }
    }

    fn pro_gear(weight: i64, belongs_to_self: Option<bool>) -> ProGearWeightTicket {
        ProGearWeightTicket {
            weight: Some(Pounds(weight)),
            belongs_to_self,
            ..Default::default()
        }
    }

    #[test]
    fn test_total_net_weight_fixtures() {
        assert_eq!(total_net_weight(&[]), Pounds(0));
        assert_eq!(total_net_weight(&[ticket(14000, 18000)]), Pounds(4000));
        assert_eq!(
            total_net_weight(&[ticket(14000, 18000), ticket(14000, 17000)]),
            Pounds(7000)
        );
    }

    #[test]
    fn test_total_net_weight_is_order_independent() {
        let tickets = vec![
            ticket(1000, 5000),
            ticket(200, 900),
            ticket(14000, 17000),
            ticket(0, 1),
        ];
        let expected = total_net_weight(&tickets);

        let mut reversed = tickets.clone();
        reversed.reverse();
        assert_eq!(total_net_weight(&reversed), expected);

        let mut rotated = tickets.clone();
        rotated.rotate_left(2);
        assert_eq!(total_net_weight(&rotated), expected);
    }

    #[test]
    fn test_net_weight_missing_or_inverted_fields() {
        let missing_full = WeightTicket { empty_weight: Some(Pounds(100)), ..Default::default() };
        let inverted = ticket(5000, 4000);

        assert_eq!(weight_ticket_net_weight(&missing_full), Pounds(0));
        assert_eq!(weight_ticket_net_weight(&inverted), Pounds(0));
        assert_eq!(total_net_weight(&[missing_full, inverted, ticket(0, 10)]), Pounds(10));
    }

    #[test]
    fn test_total_net_weight_counts_every_status() {
        let rejected = with_status(ticket(14000, 18000), DocumentStatus::Rejected);
        let excluded = with_status(ticket(14000, 17000), DocumentStatus::Excluded);
        assert_eq!(total_net_weight(&[rejected, excluded]), Pounds(7000));
    }

    #[test]
    fn test_total_accepted_net_weight() {
        let rejected = with_status(ticket(14000, 18000), DocumentStatus::Rejected);
        let adjusted = WeightTicket {
            status: Some(DocumentStatus::Approved),
            adjusted_net_weight: Some(Pounds(2500)),
            ..ticket(14000, 17000)
        };
        let unreviewed = ticket(1000, 2000);

        assert_eq!(total_accepted_net_weight(&[rejected, adjusted, unreviewed]), Pounds(3500));
    }

    #[test]
    fn test_aggregators_do_not_overflow() {
        let huge = vec![ticket(0, i64::MAX), ticket(0, i64::MAX)];
        assert_eq!(total_net_weight(&huge), Pounds(i64::MAX));
        assert_eq!(total_expenses_claimed(&[expense(i64::MAX), expense(1)]), Cents(i64::MAX));
    }

    #[test]
    fn test_total_pro_gear_weight() {
        let tickets = vec![pro_gear(750, Some(true)), pro_gear(750, Some(true))];
        assert_eq!(total_pro_gear_weight(&tickets), Pounds(1500));

        let mixed = vec![pro_gear(750, Some(true)), pro_gear(300, Some(false)), pro_gear(50, None)];
        assert_eq!(total_pro_gear_weight(&mixed), Pounds(1100));
        assert_eq!(pro_gear_weight_for(&mixed, ProGearOwner::SelfOnly), Pounds(750));
        assert_eq!(pro_gear_weight_for(&mixed, ProGearOwner::Spouse), Pounds(300));
    }

    #[test]
    fn test_gun_safe_totals_and_completeness() {
        let safe = GunSafeWeightTicket {
            description: Some("Safe".to_string()),
            weight: Some(Pounds(300)),
            document: uploaded("safe.pdf"),
            ..Default::default()
        };
        let unfinished = GunSafeWeightTicket { weight: Some(Pounds(150)), ..Default::default() };

        assert_eq!(total_gun_safe_weight(&[safe.clone(), unfinished.clone()]), Pounds(450));
        assert_eq!(total_gun_safe_weight(&[]), Pounds(0));
        assert!(gun_safe_is_complete(&safe));
        assert!(!gun_safe_is_complete(&unfinished));
        assert!(!has_completed_all_gun_safe(&[safe.clone(), unfinished]));
        assert!(has_completed_all_gun_safe(&[safe]));
    }

    #[test]
    fn test_total_expenses_claimed() {
        let expenses = vec![expense(30000), expense(50000), expense(40000)];
        assert_eq!(total_expenses_claimed(&expenses), Cents(120000));
        assert_eq!(total_expenses_claimed(&[MovingExpense::default()]), Cents(0));
    }

    fn package(weight: Option<i64>, is_pro_gear: Option<bool>) -> MovingExpense {
        MovingExpense {
            weight_shipped: weight.map(Pounds),
            is_pro_gear,
            ..Default::default()
        }
    }

    #[test]
    fn test_small_package_partitions() {
        let expenses = vec![
            package(Some(40), Some(true)),
            package(Some(25), Some(false)),
            package(None, Some(true)),
            package(Some(10), None),
        ];

        assert_eq!(pro_gear_weight_spr(&expenses), Pounds(40));
        assert_eq!(non_pro_gear_weight_spr(&expenses), Pounds(35));
        assert_eq!(total_package_weight_spr(&expenses), Pounds(75));
    }

    #[test]
    fn test_remaining_incentive() {
        assert_eq!(
            remaining_incentive(Some(Cents(500000)), Some(Cents(100000))),
            Some(Cents(400000))
        );
        assert_eq!(remaining_incentive(Some(Cents(500000)), None), Some(Cents(500000)));
        assert_eq!(remaining_incentive(None, Some(Cents(100000))), None);
    }

    #[test]
    fn test_weight_ticket_completeness() {
        assert!(weight_ticket_is_complete(&complete_ticket(14000, 18000)));
        assert!(!weight_ticket_is_complete(&ticket(14000, 18000)));

        let needs_proof = WeightTicket {
            owns_trailer: Some(true),
            trailer_meets_criteria: Some(true),
            ..complete_ticket(14000, 18000)
        };
        assert!(!weight_ticket_is_complete(&needs_proof));

        let with_proof = WeightTicket {
            proof_of_trailer_ownership_document: uploaded("title.pdf"),
            ..needs_proof
        };
        assert!(weight_ticket_is_complete(&with_proof));
    }

    #[test]
    fn test_has_completed_all_weight_tickets() {
        assert!(!has_completed_all_weight_tickets(&[], PpmType::IncentiveBased));
        assert!(has_completed_all_weight_tickets(&[], PpmType::SmallPackage));

        let tickets = vec![complete_ticket(14000, 18000), ticket(14000, 17000)];
        assert!(!has_completed_all_weight_tickets(&tickets, PpmType::IncentiveBased));
        assert!(has_incomplete_weight_ticket(&tickets));
        assert!(has_completed_all_weight_tickets(&tickets[..1], PpmType::ActualExpense));
    }

    #[test]
    fn test_expense_completeness() {
        let gas = MovingExpense {
            moving_expense_type: Some(ExpenseType::Gas),
            description: Some("Fill up".to_string()),
            paid_with_gtcc: Some(false),
            amount: Some(Cents(4500)),
            document: uploaded("receipt.jpg"),
            ..Default::default()
        };
        assert!(expense_is_complete(&gas));

        let storage = MovingExpense {
            moving_expense_type: Some(ExpenseType::Storage),
            sit_start_date: Some("2022-09-01".to_string()),
            ..gas.clone()
        };
        assert!(!expense_is_complete(&storage));
        assert!(!has_completed_all_expenses(&[gas.clone(), storage]));
        assert!(has_completed_all_expenses(&[gas]));
        assert!(has_completed_all_expenses(&[]));
    }

    #[test]
    fn test_pro_gear_completeness() {
        let ticket = ProGearWeightTicket {
            belongs_to_self: Some(true),
            description: Some("Tools".to_string()),
            weight: Some(Pounds(750)),
            document: uploaded("scale.pdf"),
            ..Default::default()
        };
        assert!(pro_gear_is_complete(&ticket));
        assert!(!pro_gear_is_complete(&pro_gear(750, Some(true))));
        assert!(has_completed_all_pro_gear(&[ticket]));
    }
}
