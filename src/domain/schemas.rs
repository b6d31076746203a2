//! Field tables and rules for each closeout form, plus conversion between
//! domain records and form values.

use super::formatters::{format_address, format_cents, format_customer_date, format_iso_date};
use super::models::{
    Address, Document, ExpenseType, GunSafeWeightTicket, MovingExpense, PpmShipment, Pounds,
    ProGearWeightTicket, WeightTicket,
};
use super::validation::{checks, ErrorKind, FieldKind, FieldSpec, FieldValue, FormValues, Schema};

const EXPENSE_TYPE_CODES: &[&str] = &[
    "CONTRACTED_EXPENSE",
    "GAS",
    "OIL",
    "OTHER",
    "PACKING_MATERIALS",
    "RENTAL_EQUIPMENT",
    "STORAGE",
    "TOLLS",
    "WEIGHING_FEE",
    "SMALL_PACKAGE",
];

const SIT_LOCATIONS: &[&str] = &["ORIGIN", "DESTINATION"];

/// The forms a closeout flow can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    About,
    WeightTicket,
    ProGear,
    GunSafe,
    Expense,
    FinalCloseout,
}

impl FormKind {
    pub fn schema(&self) -> Schema {
        match self {
            FormKind::About => about_schema(),
            FormKind::WeightTicket => weight_ticket_schema(),
            FormKind::ProGear => pro_gear_schema(),
            FormKind::GunSafe => gun_safe_schema(),
            FormKind::Expense => expense_schema(),
            FormKind::FinalCloseout => final_closeout_schema(),
        }
    }
}

fn flag_value(flag: Option<bool>) -> FieldValue {
    FieldValue::Flag(flag)
}

fn text_value(text: Option<&str>) -> FieldValue {
    FieldValue::Text(text.unwrap_or_default().to_string())
}

fn weight_value(weight: Option<Pounds>) -> FieldValue {
    FieldValue::Text(weight.map(|w| w.0.to_string()).unwrap_or_default())
}

fn files_value(document: &Document) -> FieldValue {
    FieldValue::Files(document.filenames())
}

fn address_value(address: Option<&Address>) -> FieldValue {
    FieldValue::Text(address.map(format_address).unwrap_or_default())
}

pub fn about_schema() -> Schema {
    Schema::new("about")
        .field(FieldSpec::new("actualMoveDate", "When did you leave your origin?", FieldKind::Date))
        .field(FieldSpec::new("pickupAddress", "Pickup address", FieldKind::Address))
        .field(FieldSpec::new(
            "hasSecondaryPickupAddress",
            "Did you pick up belongings from a second address?",
            FieldKind::Flag,
        ))
        .field(
            FieldSpec::new("secondaryPickupAddress", "Second pickup address", FieldKind::Address)
                .shown_when(|values| values.flag("hasSecondaryPickupAddress") == Some(true)),
        )
        .field(FieldSpec::new("destinationAddress", "Destination address", FieldKind::Address))
        .field(FieldSpec::new(
            "hasSecondaryDestinationAddress",
            "Did you deliver belongings to a second address?",
            FieldKind::Flag,
        ))
        .field(
            FieldSpec::new(
                "secondaryDestinationAddress",
                "Second destination address",
                FieldKind::Address,
            )
            .shown_when(|values| values.flag("hasSecondaryDestinationAddress") == Some(true)),
        )
        .field(FieldSpec::new("hasReceivedAdvance", "Did you receive an advance?", FieldKind::Flag))
        .field(
            FieldSpec::new("advanceAmountReceived", "How much did you receive?", FieldKind::Money)
                .shown_when(|values| values.flag("hasReceivedAdvance") == Some(true)),
        )
        .field(FieldSpec::new("w2Address", "What is the address on your W-2?", FieldKind::Address))
        .rule("actualMoveDate", |values, _| checks::required_date(values, "actualMoveDate").err())
        .rule("pickupAddress", |values, _| checks::required_address(values, "pickupAddress").err())
        .rule_with_deps("secondaryPickupAddress", &["hasSecondaryPickupAddress"], |values, _| {
            checks::required_address(values, "secondaryPickupAddress").err()
        })
        .rule("destinationAddress", |values, _| {
            checks::required_address(values, "destinationAddress").err()
        })
        .rule_with_deps(
            "secondaryDestinationAddress",
            &["hasSecondaryDestinationAddress"],
            |values, _| checks::required_address(values, "secondaryDestinationAddress").err(),
        )
        .rule("hasReceivedAdvance", |values, _| checks::required(values, "hasReceivedAdvance"))
        .rule_with_deps("advanceAmountReceived", &["hasReceivedAdvance"], |values, _| {
            if values.flag("hasReceivedAdvance") != Some(true) {
                return None;
            }
            match checks::required_cents(values, "advanceAmountReceived") {
                Err(kind) => Some(kind),
                Ok(cents) if cents.0 < 100 => Some(ErrorKind::MinimumAdvance),
                Ok(_) => None,
            }
        })
        .rule("w2Address", |values, _| checks::required_address(values, "w2Address").err())
}

pub fn about_values(shipment: &PpmShipment) -> FormValues {
    let has_second_pickup = shipment.has_secondary_pickup_address == Some(true);
    let has_second_destination = shipment.has_secondary_destination_address == Some(true);
    FormValues::new()
        .with(
            "actualMoveDate",
            FieldValue::Text(
                shipment
                    .actual_move_date
                    .as_deref()
                    .map(format_customer_date)
                    .unwrap_or_default(),
            ),
        )
        .with("pickupAddress", address_value(shipment.pickup_address.as_ref()))
        .with("hasSecondaryPickupAddress", flag_value(Some(has_second_pickup)))
        .with(
            "secondaryPickupAddress",
            address_value(shipment.secondary_pickup_address.as_ref().filter(|_| has_second_pickup)),
        )
        .with("destinationAddress", address_value(shipment.destination_address.as_ref()))
        .with("hasSecondaryDestinationAddress", flag_value(Some(has_second_destination)))
        .with(
            "secondaryDestinationAddress",
            address_value(
                shipment
                    .secondary_destination_address
                    .as_ref()
                    .filter(|_| has_second_destination),
            ),
        )
        .with("hasReceivedAdvance", flag_value(shipment.has_received_advance))
        .with(
            "advanceAmountReceived",
            FieldValue::Text(
                shipment
                    .advance_amount_received
                    .map(format_cents)
                    .unwrap_or_default(),
            ),
        )
        .with("w2Address", address_value(shipment.w2_address.as_ref()))
}

/// Copies validated about-your-PPM answers onto the shipment.
pub fn apply_about(values: &FormValues, shipment: &PpmShipment) -> PpmShipment {
    let has_received_advance = values.flag("hasReceivedAdvance");
    let has_second_pickup = values.flag("hasSecondaryPickupAddress") == Some(true);
    let has_second_destination = values.flag("hasSecondaryDestinationAddress") == Some(true);
    PpmShipment {
        actual_move_date: values.date("actualMoveDate").map(format_iso_date),
        pickup_address: values.address("pickupAddress"),
        has_secondary_pickup_address: Some(has_second_pickup),
        secondary_pickup_address: has_second_pickup
            .then(|| values.address("secondaryPickupAddress"))
            .flatten(),
        destination_address: values.address("destinationAddress"),
        has_secondary_destination_address: Some(has_second_destination),
        secondary_destination_address: has_second_destination
            .then(|| values.address("secondaryDestinationAddress"))
            .flatten(),
        w2_address: values.address("w2Address"),
        has_received_advance,
        advance_amount_received: if has_received_advance == Some(true) {
            values.cents("advanceAmountReceived")
        } else {
            None
        },
        ..shipment.clone()
    }
}

pub fn weight_ticket_schema() -> Schema {
    Schema::new("weight-ticket")
        .field(FieldSpec::new("vehicleDescription", "Vehicle description", FieldKind::Text))
        .field(FieldSpec::new("emptyWeight", "Empty weight", FieldKind::Weight))
        .field(FieldSpec::new(
            "missingEmptyWeightTicket",
            "I don't have this weight ticket",
            FieldKind::Flag,
        ))
        .field(FieldSpec::new("emptyDocument", "Empty weight ticket", FieldKind::Files))
        .field(FieldSpec::new("fullWeight", "Full weight", FieldKind::Weight))
        .field(FieldSpec::new(
            "missingFullWeightTicket",
            "I don't have this weight ticket",
            FieldKind::Flag,
        ))
        .field(FieldSpec::new("fullDocument", "Full weight ticket", FieldKind::Files))
        .field(FieldSpec::new(
            "ownsTrailer",
            "Did you use a trailer that you own?",
            FieldKind::Flag,
        ))
        .field(
            FieldSpec::new(
                "trailerMeetsCriteria",
                "Does your trailer meet all the criteria?",
                FieldKind::Flag,
            )
            .shown_when(|values| values.flag("ownsTrailer") == Some(true)),
        )
        .field(
            FieldSpec::new(
                "proofOfTrailerOwnershipDocument",
                "Proof of ownership",
                FieldKind::Files,
            )
            .shown_when(|values| {
                values.flag("ownsTrailer") == Some(true)
                    && values.flag("trailerMeetsCriteria") == Some(true)
            }),
        )
        .rule("vehicleDescription", |values, _| checks::required(values, "vehicleDescription"))
        .rule("emptyWeight", |values, _| checks::required_weight(values, "emptyWeight").err())
        .rule("emptyDocument", |values, _| checks::uploads(values, "emptyDocument"))
        .rule("fullWeight", |values, _| checks::required_weight(values, "fullWeight").err())
        .rule_with_deps("fullWeight", &["emptyWeight"], |values, _| {
            match (values.weight("emptyWeight"), values.weight("fullWeight")) {
                (Some(empty), Some(full)) if full <= empty => {
                    Some(ErrorKind::FullNotGreaterThanEmpty)
                }
                _ => None,
            }
        })
        .rule("fullDocument", |values, _| checks::uploads(values, "fullDocument"))
        .rule("ownsTrailer", |values, _| checks::required(values, "ownsTrailer"))
        .rule_with_deps(
            "proofOfTrailerOwnershipDocument",
            &["ownsTrailer", "trailerMeetsCriteria"],
            |values, _| checks::uploads(values, "proofOfTrailerOwnershipDocument"),
        )
}

pub fn weight_ticket_values(ticket: &WeightTicket) -> FormValues {
    FormValues::new()
        .with("vehicleDescription", text_value(ticket.vehicle_description.as_deref()))
        .with("emptyWeight", weight_value(ticket.empty_weight))
        .with("missingEmptyWeightTicket", flag_value(Some(ticket.missing_empty_weight_ticket)))
        .with("emptyDocument", files_value(&ticket.empty_document))
        .with("fullWeight", weight_value(ticket.full_weight))
        .with("missingFullWeightTicket", flag_value(Some(ticket.missing_full_weight_ticket)))
        .with("fullDocument", files_value(&ticket.full_document))
        .with("ownsTrailer", flag_value(ticket.owns_trailer))
        .with("trailerMeetsCriteria", flag_value(ticket.trailer_meets_criteria))
        .with(
            "proofOfTrailerOwnershipDocument",
            files_value(&ticket.proof_of_trailer_ownership_document),
        )
}

pub fn weight_ticket_from_values(values: &FormValues, base: &WeightTicket) -> WeightTicket {
    let owns_trailer = values.flag("ownsTrailer");
    let meets_criteria = if owns_trailer == Some(true) {
        Some(values.flag("trailerMeetsCriteria") == Some(true))
    } else {
        Some(false)
    };
    let proof = if owns_trailer == Some(true) && meets_criteria == Some(true) {
        Document::from_filenames(values.files("proofOfTrailerOwnershipDocument"))
    } else {
        Document::default()
    };
    WeightTicket {
        vehicle_description: values.optional_text("vehicleDescription"),
        empty_weight: values.weight("emptyWeight"),
        full_weight: values.weight("fullWeight"),
        missing_empty_weight_ticket: values.flag("missingEmptyWeightTicket") == Some(true),
        missing_full_weight_ticket: values.flag("missingFullWeightTicket") == Some(true),
        owns_trailer,
        trailer_meets_criteria: meets_criteria,
        empty_document: Document::from_filenames(values.files("emptyDocument")),
        full_document: Document::from_filenames(values.files("fullDocument")),
        proof_of_trailer_ownership_document: proof,
        ..base.clone()
    }
}

pub fn pro_gear_schema() -> Schema {
    Schema::new("pro-gear")
        .field(FieldSpec::new(
            "belongsToSelf",
            "Does this pro-gear belong to you? (No = spouse)",
            FieldKind::Flag,
        ))
        .field(FieldSpec::new(
            "description",
            "Brief description of the pro-gear",
            FieldKind::Text,
        ))
        .field(FieldSpec::new("weight", "Shipment's pro-gear weight", FieldKind::Weight))
        .field(FieldSpec::new(
            "missingWeightTicket",
            "I don't have weight tickets",
            FieldKind::Flag,
        ))
        .field(FieldSpec::new("document", "Weight tickets", FieldKind::Files))
        .rule("belongsToSelf", |values, _| checks::required(values, "belongsToSelf"))
        .rule("description", |values, _| checks::required(values, "description"))
        .rule("weight", |values, _| match checks::required_weight(values, "weight") {
            Err(kind) => Some(kind),
            Ok(weight) if weight <= Pounds::ZERO => Some(ErrorKind::NonPositiveWeight),
            Ok(_) => None,
        })
        .rule_with_deps("weight", &["belongsToSelf"], |values, ctx| {
            let belongs_to_self = values.flag("belongsToSelf")?;
            let max = ctx.entitlement.pro_gear_ceiling(belongs_to_self);
            let weight = values.weight("weight")?;
            (weight > max).then_some(ErrorKind::WeightOverMaximum { max })
        })
        .rule("document", |values, _| checks::uploads(values, "document"))
}

pub fn pro_gear_values(ticket: &ProGearWeightTicket) -> FormValues {
    FormValues::new()
        .with("belongsToSelf", flag_value(ticket.belongs_to_self))
        .with("description", text_value(ticket.description.as_deref()))
        .with("weight", weight_value(ticket.weight))
        .with("missingWeightTicket", flag_value(ticket.has_weight_tickets.map(|has| !has)))
        .with("document", files_value(&ticket.document))
}

pub fn pro_gear_from_values(
    values: &FormValues,
    base: &ProGearWeightTicket,
) -> ProGearWeightTicket {
    ProGearWeightTicket {
        belongs_to_self: values.flag("belongsToSelf"),
        description: values.optional_text("description"),
        has_weight_tickets: Some(values.flag("missingWeightTicket") != Some(true)),
        weight: values.weight("weight"),
        document: Document::from_filenames(values.files("document")),
        ..base.clone()
    }
}

pub fn gun_safe_schema() -> Schema {
    Schema::new("gun-safe")
        .field(FieldSpec::new(
            "description",
            "Brief description of the gun safe",
            FieldKind::Text,
        ))
        .field(FieldSpec::new("weight", "Shipment's gun safe weight", FieldKind::Weight))
        .field(FieldSpec::new(
            "missingWeightTicket",
            "I don't have weight tickets",
            FieldKind::Flag,
        ))
        .field(FieldSpec::new("document", "Weight tickets", FieldKind::Files))
        .rule("description", |values, _| checks::required(values, "description"))
        .rule("weight", |values, ctx| match checks::required_weight(values, "weight") {
            Err(kind) => Some(kind),
            Ok(weight) if weight <= Pounds::ZERO => Some(ErrorKind::NonPositiveWeight),
            Ok(weight) if weight > ctx.entitlement.gun_safe_weight => {
                Some(ErrorKind::WeightOverMaximum { max: ctx.entitlement.gun_safe_weight })
            }
            Ok(_) => None,
        })
        .rule("document", |values, _| checks::uploads(values, "document"))
}

pub fn gun_safe_values(ticket: &GunSafeWeightTicket) -> FormValues {
    FormValues::new()
        .with("description", text_value(ticket.description.as_deref()))
        .with("weight", weight_value(ticket.weight))
        .with("missingWeightTicket", flag_value(ticket.has_weight_tickets.map(|has| !has)))
        .with("document", files_value(&ticket.document))
}

pub fn gun_safe_from_values(
    values: &FormValues,
    base: &GunSafeWeightTicket,
) -> GunSafeWeightTicket {
    GunSafeWeightTicket {
        description: values.optional_text("description"),
        has_weight_tickets: Some(values.flag("missingWeightTicket") != Some(true)),
        weight: values.weight("weight"),
        document: Document::from_filenames(values.files("document")),
        ..base.clone()
    }
}

fn is_expense_type(values: &FormValues, expense_type: ExpenseType) -> bool {
    values.text("expenseType") == expense_type.code()
}

fn is_small_package_pro_gear(values: &FormValues) -> bool {
    is_expense_type(values, ExpenseType::SmallPackage) && values.flag("isProGear") == Some(true)
}

pub fn expense_schema() -> Schema {
    Schema::new("expense")
        .field(FieldSpec::new("expenseType", "Select type", FieldKind::Choice(EXPENSE_TYPE_CODES)))
        .field(
            FieldSpec::new("description", "What did you buy or rent?", FieldKind::Text)
                .shown_when(|values| !is_expense_type(values, ExpenseType::SmallPackage)),
        )
        .field(FieldSpec::new("paidWithGTCC", "Did you pay with your GTCC?", FieldKind::Flag))
        .field(FieldSpec::new("amount", "Amount", FieldKind::Money))
        .field(FieldSpec::new("missingReceipt", "I don't have this receipt", FieldKind::Flag))
        .field(FieldSpec::new("document", "Receipt", FieldKind::Files))
        .field(
            FieldSpec::new("sitStartDate", "Start date", FieldKind::Date)
                .shown_when(|values| is_expense_type(values, ExpenseType::Storage)),
        )
        .field(
            FieldSpec::new("sitEndDate", "End date", FieldKind::Date)
                .shown_when(|values| is_expense_type(values, ExpenseType::Storage)),
        )
        .field(
            FieldSpec::new("sitLocation", "Where was storage?", FieldKind::Choice(SIT_LOCATIONS))
                .shown_when(|values| is_expense_type(values, ExpenseType::Storage)),
        )
        .field(
            FieldSpec::new("weightStored", "Weight stored", FieldKind::Weight)
                .shown_when(|values| is_expense_type(values, ExpenseType::Storage)),
        )
        .field(
            FieldSpec::new("weightShipped", "Package weight", FieldKind::Weight)
                .shown_when(|values| is_expense_type(values, ExpenseType::SmallPackage)),
        )
        .field(
            FieldSpec::new("trackingNumber", "Tracking number", FieldKind::Text)
                .shown_when(|values| is_expense_type(values, ExpenseType::SmallPackage)),
        )
        .field(
            FieldSpec::new("isProGear", "Is this pro-gear?", FieldKind::Flag)
                .shown_when(|values| is_expense_type(values, ExpenseType::SmallPackage)),
        )
        .field(
            FieldSpec::new(
                "proGearBelongsToSelf",
                "Does this pro-gear belong to you?",
                FieldKind::Flag,
            )
            .shown_when(is_small_package_pro_gear),
        )
        .field(
            FieldSpec::new("proGearDescription", "Pro-gear description", FieldKind::Text)
                .shown_when(is_small_package_pro_gear),
        )
        .rule("expenseType", |values, _| checks::required(values, "expenseType"))
        .rule_with_deps("description", &["expenseType"], |values, _| {
            checks::required(values, "description")
        })
        .rule("paidWithGTCC", |values, _| checks::required(values, "paidWithGTCC"))
        .rule("amount", |values, _| match checks::required_cents(values, "amount") {
            Err(kind) => Some(kind),
            Ok(cents) if cents.0 == 0 => Some(ErrorKind::ZeroAmount),
            Ok(_) => None,
        })
        .rule("document", |values, _| checks::uploads(values, "document"))
        .rule_with_deps("sitStartDate", &["expenseType"], |values, _| {
            checks::required_date(values, "sitStartDate").err()
        })
        .rule_with_deps("sitStartDate", &["sitEndDate"], |values, _| {
            match (values.date("sitStartDate"), values.date("sitEndDate")) {
                (Some(start), Some(end)) if start > end => Some(ErrorKind::StartAfterEnd),
                _ => None,
            }
        })
        .rule_with_deps("sitEndDate", &["expenseType"], |values, _| {
            checks::required_date(values, "sitEndDate").err()
        })
        .rule_with_deps("sitLocation", &["expenseType"], |values, _| {
            checks::required(values, "sitLocation")
        })
        .rule_with_deps("weightStored", &["expenseType"], |values, _| {
            match checks::required_weight(values, "weightStored") {
                Err(kind) => Some(kind),
                Ok(weight) if weight <= Pounds::ZERO => Some(ErrorKind::WeightStoredTooLow),
                Ok(_) => None,
            }
        })
        .rule_with_deps("weightShipped", &["expenseType"], |values, _| {
            checks::required_weight(values, "weightShipped").err()
        })
        .rule_with_deps("isProGear", &["expenseType"], |values, _| {
            checks::required(values, "isProGear")
        })
        .rule_with_deps("proGearBelongsToSelf", &["isProGear", "expenseType"], |values, _| {
            checks::required(values, "proGearBelongsToSelf")
        })
        .rule_with_deps("proGearDescription", &["isProGear", "expenseType"], |values, _| {
            checks::required(values, "proGearDescription")
        })
}

pub fn expense_values(expense: &MovingExpense) -> FormValues {
    let date = |value: &Option<String>| {
        FieldValue::Text(value.as_deref().map(format_customer_date).unwrap_or_default())
    };
    FormValues::new()
        .with(
            "expenseType",
            FieldValue::Text(
                expense
                    .moving_expense_type
                    .map(|t| t.code().to_string())
                    .unwrap_or_default(),
            ),
        )
        .with("description", text_value(expense.description.as_deref()))
        .with("paidWithGTCC", flag_value(expense.paid_with_gtcc))
        .with("amount", FieldValue::Text(expense.amount.map(format_cents).unwrap_or_default()))
        .with("missingReceipt", flag_value(Some(expense.missing_receipt)))
        .with("document", files_value(&expense.document))
        .with("sitStartDate", date(&expense.sit_start_date))
        .with("sitEndDate", date(&expense.sit_end_date))
        .with("sitLocation", text_value(expense.sit_location.as_deref()))
        .with("weightStored", weight_value(expense.weight_stored))
        .with("weightShipped", weight_value(expense.weight_shipped))
        .with("trackingNumber", text_value(expense.tracking_number.as_deref()))
        .with("isProGear", flag_value(expense.is_pro_gear))
        .with("proGearBelongsToSelf", flag_value(expense.pro_gear_belongs_to_self))
        .with("proGearDescription", text_value(expense.pro_gear_description.as_deref()))
}

/// Builds an expense from validated values; fields hidden for the chosen
/// type are cleared rather than carried over.
pub fn expense_from_values(values: &FormValues, base: &MovingExpense) -> MovingExpense {
    let expense_type = ExpenseType::from_code(values.text("expenseType"));
    let storage = expense_type == Some(ExpenseType::Storage);
    let small_package = expense_type == Some(ExpenseType::SmallPackage);
    let is_pro_gear = if small_package { values.flag("isProGear") } else { None };
    let pro_gear = is_pro_gear == Some(true);

    MovingExpense {
        moving_expense_type: expense_type,
        description: if small_package { None } else { values.optional_text("description") },
        paid_with_gtcc: values.flag("paidWithGTCC"),
        amount: values.cents("amount"),
        missing_receipt: values.flag("missingReceipt") == Some(true),
        document: Document::from_filenames(values.files("document")),
        sit_start_date: storage.then(|| values.date("sitStartDate").map(format_iso_date)).flatten(),
        sit_end_date: storage.then(|| values.date("sitEndDate").map(format_iso_date)).flatten(),
        sit_location: storage.then(|| values.optional_text("sitLocation")).flatten(),
        weight_stored: storage.then(|| values.weight("weightStored")).flatten(),
        weight_shipped: small_package.then(|| values.weight("weightShipped")).flatten(),
        tracking_number: small_package.then(|| values.optional_text("trackingNumber")).flatten(),
        is_pro_gear,
        pro_gear_belongs_to_self: pro_gear.then(|| values.flag("proGearBelongsToSelf")).flatten(),
        pro_gear_description: pro_gear
            .then(|| values.optional_text("proGearDescription"))
            .flatten(),
        ..base.clone()
    }
}

pub fn final_closeout_schema() -> Schema {
    Schema::new("final-closeout")
        .field(FieldSpec::new("signature", "Signature", FieldKind::Text))
        .rule("signature", |values, _| checks::required(values, "signature"))
}

pub fn final_closeout_values(shipment: &PpmShipment) -> FormValues {
    FormValues::new().with("signature", text_value(shipment.signed_certification.as_deref()))
}
