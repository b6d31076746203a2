//! Editable state for the form on the current wizard page.

use crate::domain::{
    ErrorKind, FieldSpec, FieldValue, FormValues, Schema, ValidationContext, ValidationErrors,
};

/// Values, errors and touched fields for one form.
///
/// Every edit re-validates the edited field plus the fields whose rules
/// read it, so cross-field errors never go stale.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Schema,
    context: ValidationContext,
    values: FormValues,
    errors: ValidationErrors,
    touched: Vec<&'static str>,
    is_submitting: bool,
}

impl FormState {
    pub fn new(schema: Schema, initial: FormValues, context: ValidationContext) -> Self {
        let mut values = schema.empty_values();
        for spec in schema.fields() {
            if let Some(value) = initial.get(spec.name) {
                values.set(spec.name, value.clone());
            }
        }
        let errors = schema.validate(&values, &context).err().unwrap_or_default();
        Self {
            schema,
            context,
            values,
            errors,
            touched: Vec::new(),
            is_submitting: false,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn visible_fields(&self) -> Vec<FieldSpec> {
        self.schema.visible_fields(&self.values).copied().collect()
    }

    /// Sets a field and re-checks it and its dependents.
    pub fn set_value(&mut self, field: &'static str, value: FieldValue) {
        self.values.set(field, value);
        self.touch(field);

        let mut recheck = vec![field];
        recheck.extend(self.schema.dependents_of(field));
        for name in recheck {
            self.revalidate(name);
        }
    }

    fn revalidate(&mut self, field: &'static str) {
        match self.schema.validate_field(field, &self.values, &self.context) {
            Some(kind) => {
                self.errors.remove(field);
                self.errors.insert(field, kind);
            }
            None => self.errors.remove(field),
        }
    }

    pub fn touch(&mut self, field: &'static str) {
        if !self.touched.contains(&field) {
            self.touched.push(field);
        }
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.iter().any(|name| *name == field)
    }

    pub fn error(&self, field: &str) -> Option<&ErrorKind> {
        self.errors.get(field)
    }

    /// Error for display: hidden until the user has touched the field.
    pub fn visible_error(&self, field: &str) -> Option<&ErrorKind> {
        if self.is_touched(field) { self.errors.get(field) } else { None }
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.schema.validate(&self.values, &self.context).is_ok()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Starts a submit when the form is valid.
    ///
    /// On failure every field is marked touched so all errors show.
    pub fn begin_submit(&mut self) -> Result<FormValues, ValidationErrors> {
        match self.schema.validate(&self.values, &self.context) {
            Ok(()) => {
                self.errors = ValidationErrors::default();
                self.is_submitting = true;
                Ok(self.values.clone())
            }
            Err(errors) => {
                let names: Vec<&'static str> =
                    self.schema.fields().iter().map(|spec| spec.name).collect();
                for name in names {
                    self.touch(name);
                }
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    pub fn finish_submit(&mut self) {
        self.is_submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{pro_gear_schema, weight_ticket_schema, Pounds};

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    fn weight_ticket_form() -> FormState {
        FormState::new(weight_ticket_schema(), FormValues::new(), ValidationContext::default())
    }

    #[test]
    fn test_dependent_field_is_revalidated() {
        let mut form =
            FormState::new(pro_gear_schema(), FormValues::new(), ValidationContext::default());
        form.set_value("belongsToSelf", FieldValue::Flag(Some(true)));
        form.set_value("weight", text("750"));
        assert_eq!(form.error("weight"), None);

        // Switching owner to spouse lowers the ceiling without touching weight
        form.set_value("belongsToSelf", FieldValue::Flag(Some(false)));
        assert_eq!(form.error("weight"), Some(&ErrorKind::WeightOverMaximum { max: Pounds(500) }));

        form.set_value("belongsToSelf", FieldValue::Flag(Some(true)));
        assert_eq!(form.error("weight"), None);
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let mut form = weight_ticket_form();
        assert_eq!(form.error("vehicleDescription"), Some(&ErrorKind::Required));
        assert_eq!(form.visible_error("vehicleDescription"), None);

        form.set_value("vehicleDescription", text(""));
        assert_eq!(form.visible_error("vehicleDescription"), Some(&ErrorKind::Required));
    }

    #[test]
    fn test_begin_submit_touches_everything_on_failure() {
        let mut form = weight_ticket_form();
        assert!(!form.is_valid());
        assert!(form.begin_submit().is_err());
        assert!(!form.is_submitting());
        assert_eq!(form.visible_error("fullWeight"), Some(&ErrorKind::Required));
    }

    #[test]
    fn test_submit_cycle() {
        let initial = FormValues::new()
            .with("belongsToSelf", FieldValue::Flag(Some(false)))
            .with("description", text("Uniforms"))
            .with("weight", text("300"))
            .with("document", FieldValue::Files(vec!["scale.png".into()]));
        let mut form = FormState::new(pro_gear_schema(), initial, ValidationContext::default());
        assert!(form.is_valid());

        let values = form.begin_submit().unwrap();
        assert!(form.is_submitting());
        assert_eq!(values.weight("weight"), Some(Pounds(300)));

        form.finish_submit();
        assert!(!form.is_submitting());
    }

    #[test]
    fn test_hidden_fields_follow_answers() {
        let mut form = weight_ticket_form();
        let before = form.visible_fields().len();
        form.set_value("ownsTrailer", FieldValue::Flag(Some(true)));
        assert_eq!(form.visible_fields().len(), before + 1);
        form.set_value("trailerMeetsCriteria", FieldValue::Flag(Some(true)));
        assert_eq!(form.visible_fields().len(), before + 2);
        assert_eq!(form.error("proofOfTrailerOwnershipDocument"), Some(&ErrorKind::UploadRequired));
    }
}
