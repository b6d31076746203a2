//! Declarative form validation.
//!
//! A [`Schema`] is a table of fields and [`Rule`]s. Each rule checks one
//! field and names the fields it reads besides its own, so a change to a
//! dependency can re-run exactly the rules that read it. Validation never
//! fails loudly: it yields a [`ValidationErrors`] map keyed by field name.

use super::formatters::{parse_address, parse_date, parse_dollars_to_cents, parse_weight};
use super::models::{Address, Cents, Entitlement, Pounds};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Raw value of a single form field, as the user entered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(Option<bool>),
    Files(Vec<String>),
}

impl FieldValue {
    pub fn empty_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Flag => FieldValue::Flag(None),
            FieldKind::Files => FieldValue::Files(Vec::new()),
            _ => FieldValue::Text(String::new()),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Flag(flag) => flag.is_none(),
            FieldValue::Files(files) => files.is_empty(),
        }
    }
}

/// Field name to value. Missing names read as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<&'static str, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &'static str, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn with(mut self, field: &'static str, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> &str {
        match self.values.get(field) {
            Some(FieldValue::Text(text)) => text.trim(),
            _ => "",
        }
    }

    pub fn optional_text(&self, field: &str) -> Option<String> {
        let text = self.text(field);
        if text.is_empty() { None } else { Some(text.to_string()) }
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        match self.values.get(field) {
            Some(FieldValue::Flag(flag)) => *flag,
            _ => None,
        }
    }

    pub fn files(&self, field: &str) -> &[String] {
        match self.values.get(field) {
            Some(FieldValue::Files(files)) => files,
            _ => &[],
        }
    }

    pub fn is_blank(&self, field: &str) -> bool {
        self.values.get(field).is_none_or(FieldValue::is_blank)
    }

    pub fn weight(&self, field: &str) -> Option<Pounds> {
        parse_weight(self.text(field)).ok()
    }

    pub fn cents(&self, field: &str) -> Option<Cents> {
        parse_dollars_to_cents(self.text(field)).ok()
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        parse_date(self.text(field)).ok()
    }

    pub fn address(&self, field: &str) -> Option<Address> {
        parse_address(self.text(field)).ok()
    }
}

/// How a field is entered and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Weight,
    Money,
    Date,
    /// One line: `street[, street 2], city, ST 12345`
    Address,
    Flag,
    Choice(&'static [&'static str]),
    Files,
}

pub type VisibilityFn = fn(&FormValues) -> bool;

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Field is only shown (and only checked) when this returns true.
    pub visible_when: Option<VisibilityFn>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, visible_when: None }
    }

    pub fn shown_when(mut self, visible: VisibilityFn) -> Self {
        self.visible_when = Some(visible);
        self
    }

    pub fn is_visible(&self, values: &FormValues) -> bool {
        self.visible_when.is_none_or(|visible| visible(values))
    }
}

/// Values a rule may consult beyond the form itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationContext {
    pub entitlement: Entitlement,
}

/// Why a field failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Required,
    InvalidNumber,
    InvalidDate,
    InvalidAddress,
    MinimumWeight,
    FullNotGreaterThanEmpty,
    ZeroAmount,
    MinimumAdvance,
    WeightOverMaximum { max: Pounds },
    NonPositiveWeight,
    WeightStoredTooLow,
    StartAfterEnd,
    UploadRequired,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Required => write!(f, "Required"),
            ErrorKind::InvalidNumber => write!(f, "Enter a number"),
            ErrorKind::InvalidDate => {
                write!(f, "Enter a complete date in DD MMM YYYY format (day, month, year).")
            }
            ErrorKind::InvalidAddress => {
                write!(f, "Enter street, city, state and ZIP, e.g. 1 Main St, Fort Bragg, NC 28310")
            }
            ErrorKind::MinimumWeight => write!(f, "Enter a weight 0 lbs or greater"),
            ErrorKind::FullNotGreaterThanEmpty => {
                write!(f, "The full weight must be greater than the empty weight")
            }
            ErrorKind::ZeroAmount => write!(f, "Please enter a non-zero amount"),
            ErrorKind::MinimumAdvance => write!(
                f,
                "The minimum advance request is $1. If you don't want an advance, select No."
            ),
            ErrorKind::WeightOverMaximum { max } => {
                write!(f, "Enter a weight {} lbs or less", max.0)
            }
            ErrorKind::NonPositiveWeight => write!(f, "Enter a weight greater than 0 lbs"),
            ErrorKind::WeightStoredTooLow => write!(f, "Weight stored must be at least 1 lb."),
            ErrorKind::StartAfterEnd => write!(f, "Start date must be before end date."),
            ErrorKind::UploadRequired => write!(f, "At least one upload is required"),
        }
    }
}

/// Failed fields, each with the first rule that rejected it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, ErrorKind>,
}

impl ValidationErrors {
    pub fn get(&self, field: &str) -> Option<&ErrorKind> {
        self.errors.get(field)
    }

    pub fn insert(&mut self, field: &'static str, kind: ErrorKind) {
        self.errors.entry(field).or_insert(kind);
    }

    pub fn remove(&mut self, field: &str) {
        self.errors.remove(field);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ErrorKind)> + '_ {
        self.errors.iter().map(|(field, kind)| (*field, kind))
    }
}

pub type RuleImpl = fn(&FormValues, &ValidationContext) -> Option<ErrorKind>;

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub depends_on: &'static [&'static str],
    pub check: RuleImpl,
}

/// Fields plus the rules that check them.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    fields: Vec<FieldSpec>,
    rules: Vec<Rule>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self { name, fields: Vec::new(), rules: Vec::new() }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Adds a rule that reads only its own field.
    pub fn rule(self, field: &'static str, check: RuleImpl) -> Self {
        self.rule_with_deps(field, &[], check)
    }

    pub fn rule_with_deps(
        mut self,
        field: &'static str,
        depends_on: &'static [&'static str],
        check: RuleImpl,
    ) -> Self {
        self.rules.push(Rule { field, depends_on, check });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn visible_fields<'a>(
        &'a self,
        values: &'a FormValues,
    ) -> impl Iterator<Item = &'a FieldSpec> + 'a {
        self.fields.iter().filter(move |spec| spec.is_visible(values))
    }

    /// Blank values for every field.
    pub fn empty_values(&self) -> FormValues {
        let mut values = FormValues::new();
        for spec in &self.fields {
            values.set(spec.name, FieldValue::empty_for(&spec.kind));
        }
        values
    }

    /// Runs the rules for one field; `None` means it passes.
    pub fn validate_field(
        &self,
        field: &str,
        values: &FormValues,
        ctx: &ValidationContext,
    ) -> Option<ErrorKind> {
        if let Some(spec) = self.field_spec(field) {
            if !spec.is_visible(values) {
                return None;
            }
        }
        self.rules
            .iter()
            .filter(|rule| rule.field == field)
            .find_map(|rule| (rule.check)(values, ctx))
    }

    pub fn validate(
        &self,
        values: &FormValues,
        ctx: &ValidationContext,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for rule in &self.rules {
            if errors.get(rule.field).is_some() {
                continue;
            }
            if let Some(kind) = self.validate_field(rule.field, values, ctx) {
                errors.insert(rule.field, kind);
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Fields whose rules read `field`, so must be re-checked when it changes.
    pub fn dependents_of(&self, field: &str) -> Vec<&'static str> {
        let mut dependents: Vec<&'static str> = Vec::new();
        for rule in &self.rules {
            if rule.depends_on.iter().any(|dep| *dep == field)
                && !dependents.contains(&rule.field)
            {
                dependents.push(rule.field);
            }
        }
        dependents
    }
}

/// Shared rule bodies used across the closeout schemas.
pub mod checks {
    use super::*;

    pub fn required(values: &FormValues, field: &str) -> Option<ErrorKind> {
        values.is_blank(field).then_some(ErrorKind::Required)
    }

    pub fn required_weight(values: &FormValues, field: &str) -> Result<Pounds, ErrorKind> {
        if values.is_blank(field) {
            return Err(ErrorKind::Required);
        }
        match values.weight(field) {
            None => Err(ErrorKind::InvalidNumber),
            Some(weight) if weight < Pounds::ZERO => Err(ErrorKind::MinimumWeight),
            Some(weight) => Ok(weight),
        }
    }

    pub fn required_cents(values: &FormValues, field: &str) -> Result<Cents, ErrorKind> {
        if values.is_blank(field) {
            return Err(ErrorKind::Required);
        }
        values.cents(field).ok_or(ErrorKind::InvalidNumber)
    }

    pub fn required_date(values: &FormValues, field: &str) -> Result<NaiveDate, ErrorKind> {
        if values.is_blank(field) {
            return Err(ErrorKind::Required);
        }
        values.date(field).ok_or(ErrorKind::InvalidDate)
    }

    pub fn required_address(values: &FormValues, field: &str) -> Result<Address, ErrorKind> {
        if values.is_blank(field) {
            return Err(ErrorKind::Required);
        }
        values.address(field).ok_or(ErrorKind::InvalidAddress)
    }

    pub fn uploads(values: &FormValues, field: &str) -> Option<ErrorKind> {
        values.files(field).is_empty().then_some(ErrorKind::UploadRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new("sample")
            .field(FieldSpec::new("low", "Low", FieldKind::Weight))
            .field(FieldSpec::new("high", "High", FieldKind::Weight))
            .field(
                FieldSpec::new("note", "Note", FieldKind::Text)
                    .shown_when(|values| values.flag("wantsNote") == Some(true)),
            )
            .field(FieldSpec::new("wantsNote", "Note?", FieldKind::Flag))
            .rule("low", |values, _| checks::required_weight(values, "low").err())
            .rule("high", |values, _| checks::required_weight(values, "high").err())
            .rule_with_deps("high", &["low"], |values, _| {
                match (values.weight("low"), values.weight("high")) {
                    (Some(low), Some(high)) if high <= low => {
                        Some(ErrorKind::FullNotGreaterThanEmpty)
                    }
                    _ => None,
                }
            })
            .rule("note", |values, _| checks::required(values, "note"))
    }

    #[test]
    fn test_validate_reports_first_failure_per_field() {
        let schema = sample_schema();
        let values = schema.empty_values();
        let errors = schema.validate(&values, &ValidationContext::default()).unwrap_err();

        assert_eq!(errors.get("low"), Some(&ErrorKind::Required));
        assert_eq!(errors.get("high"), Some(&ErrorKind::Required));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_hidden_fields_are_not_checked() {
        let schema = sample_schema();
        let mut values = schema.empty_values();
        values.set("low", FieldValue::Text("10".into()));
        values.set("high", FieldValue::Text("20".into()));
        assert!(schema.validate(&values, &ValidationContext::default()).is_ok());

        values.set("wantsNote", FieldValue::Flag(Some(true)));
        let errors = schema.validate(&values, &ValidationContext::default()).unwrap_err();
        assert_eq!(errors.get("note"), Some(&ErrorKind::Required));
    }

    #[test]
    fn test_cross_field_rule() {
        let schema = sample_schema();
        let values = schema
            .empty_values()
            .with("low", FieldValue::Text("20".into()))
            .with("high", FieldValue::Text("20".into()));
        assert_eq!(
            schema.validate_field("high", &values, &ValidationContext::default()),
            Some(ErrorKind::FullNotGreaterThanEmpty)
        );
    }

    #[test]
    fn test_negative_weight_reports_minimum() {
        let schema = sample_schema();
        let values = schema
            .empty_values()
            .with("low", FieldValue::Text("-5".into()))
            .with("high", FieldValue::Text("ten".into()));
        let errors = schema.validate(&values, &ValidationContext::default()).unwrap_err();

        assert_eq!(errors.get("low"), Some(&ErrorKind::MinimumWeight));
        assert_eq!(errors.get("high"), Some(&ErrorKind::InvalidNumber));
        assert_eq!(ErrorKind::MinimumWeight.to_string(), "Enter a weight 0 lbs or greater");
    }

    #[test]
    fn test_dependents_of() {
        let schema = sample_schema();
        assert_eq!(schema.dependents_of("low"), vec!["high"]);
        assert!(schema.dependents_of("high").is_empty());
    }

    #[test]
    fn test_form_values_accessors() {
        let values = FormValues::new()
            .with("amount", FieldValue::Text(" $1,200.00 ".into()))
            .with("weight", FieldValue::Text("1,234".into()))
            .with("date", FieldValue::Text("29 Apr 2019".into()))
            .with("docs", FieldValue::Files(vec!["a.pdf".into()]));

        assert_eq!(values.cents("amount"), Some(Cents(120000)));
        assert_eq!(values.weight("weight"), Some(Pounds(1234)));
        assert_eq!(values.date("date"), NaiveDate::from_ymd_opt(2019, 4, 29));
        assert_eq!(values.files("docs"), ["a.pdf".to_string()]);
        assert!(values.is_blank("missing"));
        assert_eq!(values.flag("missing"), None);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ErrorKind::Required.to_string(), "Required");
        assert_eq!(
            ErrorKind::WeightOverMaximum { max: Pounds(500) }.to_string(),
            "Enter a weight 500 lbs or less"
        );
    }
}
