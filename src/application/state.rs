//! Application state for the terminal closeout flow.
//!
//! [`App`] owns everything one closeout session needs: the data fetched
//! from a [`DocumentSource`], the wizard position, the form on the
//! current page and the transient UI state (alerts, prompts, selection).

use super::form::FormState;
use super::resource::ProvisionalResource;
use super::review::{build_review, can_advance, CloseoutReview, FeatureFlags, FinalCloseoutSummary};
use super::session::SessionContext;
use super::wizard::{
    ActionButton, NavigationFlags, WizardAction, WizardHandlers, WizardNavigation, WizardPageState,
};
use crate::domain::{
    about_schema, about_values, apply_about, expense_from_values, expense_is_complete,
    expense_schema, expense_values, final_closeout_schema, final_closeout_values,
    gun_safe_from_values, gun_safe_is_complete, gun_safe_schema, gun_safe_values,
    pro_gear_from_values, pro_gear_is_complete, pro_gear_schema, pro_gear_values,
    weight_ticket_from_values, weight_ticket_is_complete, weight_ticket_schema,
    weight_ticket_values, DocumentKind, Entitlement, FieldKind, FieldSpec, FieldValue, FormKind,
    FormValues, Pounds, PpmDocuments, PpmShipment, ValidationContext, WizardError,
};
use crate::infrastructure::{DocumentChange, DocumentSource, SourceError};
use thiserror::Error;
use tracing::{error, info, warn};

pub const PAGE_ABOUT: &str = "about";
pub const PAGE_WEIGHT_TICKET: &str = "weight-ticket";
pub const PAGE_PRO_GEAR: &str = "pro-gear";
pub const PAGE_GUN_SAFE: &str = "gun-safe";
pub const PAGE_EXPENSES: &str = "expenses";
pub const PAGE_REVIEW: &str = "review";
pub const PAGE_COMPLETE: &str = "complete";

const DEFAULT_EXPORT_FILENAME: &str = "closeout-summary.csv";

/// Pages a shipment walks through, in order.
///
/// Small-package moves document expenses instead of weight tickets; the
/// pro-gear page only appears when the customer said they have pro-gear,
/// and the gun safe page only when they declared one and the feature is on.
pub fn closeout_pages(shipment: &PpmShipment, features: FeatureFlags) -> Vec<String> {
    let mut keys = vec![PAGE_ABOUT];
    if shipment.is_small_package() {
        keys.push(PAGE_EXPENSES);
    } else {
        keys.push(PAGE_WEIGHT_TICKET);
        if shipment.has_pro_gear == Some(true) {
            keys.push(PAGE_PRO_GEAR);
        }
        if features.gun_safe && shipment.has_gun_safe == Some(true) {
            keys.push(PAGE_GUN_SAFE);
        }
    }
    keys.extend([PAGE_REVIEW, PAGE_COMPLETE]);
    keys.into_iter().map(str::to_string).collect()
}

pub fn page_title(page_key: &str) -> &'static str {
    match page_key {
        PAGE_ABOUT => "About your PPM",
        PAGE_WEIGHT_TICKET => "Weight tickets",
        PAGE_PRO_GEAR => "Pro-gear",
        PAGE_GUN_SAFE => "Gun safe",
        PAGE_EXPENSES => "Expenses",
        PAGE_REVIEW => "Review",
        PAGE_COMPLETE => "Complete PPM",
        _ => "Closeout",
    }
}

/// Represents the current mode of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Moving between fields, review items and buttons
    Normal,
    /// Typing into the selected form field
    Editing,
    /// Help screen is displayed
    Help,
    /// Waiting for the user to confirm a delete
    ConfirmDelete,
    /// CSV export dialog is open
    ExportCsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Error,
    Success,
    Info,
}

/// A dismissible banner above the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Info,
            message: message.into(),
        }
    }
}

/// Per-run settings chosen on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppOptions {
    /// Open on the final page with nothing editable
    pub read_only: bool,
    pub features: FeatureFlags,
    /// Overrides the self pro-gear allowance from the orders
    pub pro_gear_weight: Option<Pounds>,
    /// Overrides the spouse pro-gear allowance from the orders
    pub spouse_pro_gear_weight: Option<Pounds>,
}

impl AppOptions {
    /// The allowances forms validate against.
    pub fn entitlement(&self, loaded: Entitlement) -> Entitlement {
        Entitlement {
            pro_gear_weight: self.pro_gear_weight.unwrap_or(loaded.pro_gear_weight),
            pro_gear_weight_spouse: self
                .spouse_pro_gear_weight
                .unwrap_or(loaded.pro_gear_weight_spouse),
            ..loaded
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// Shipment plus documents, kept together so one refetch reconciles both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloseoutData {
    pub shipment: PpmShipment,
    pub documents: PpmDocuments,
}

/// The form currently on screen.
#[derive(Debug, Clone)]
pub struct ActiveForm {
    pub kind: FormKind,
    /// Document id being edited; empty for a new document, `None` for
    /// shipment-level forms.
    pub target: Option<String>,
    pub state: FormState,
}

/// Main application state for one closeout.
pub struct App {
    source: Box<dyn DocumentSource>,
    /// Who is working on the closeout
    pub session: SessionContext,
    /// Local copy of server data, edited optimistically
    pub data: ProvisionalResource<CloseoutData>,
    /// Position in the page list
    pub wizard: WizardPageState,
    /// Which navigation buttons apply
    pub flags: NavigationFlags,
    /// Form on the current page, if the page has one
    pub form: Option<ActiveForm>,
    /// Current application mode
    pub mode: AppMode,
    /// Index into the visible fields of the form
    pub selected_field: usize,
    /// Index into the review items
    pub selected_item: usize,
    /// Current input buffer (for editing mode)
    pub input: String,
    /// Cursor byte offset within the input buffer, on a char boundary
    pub cursor_position: usize,
    /// Input buffer for filename entry
    pub filename_input: String,
    /// Scroll position in help text
    pub help_scroll: usize,
    pub alert: Option<Alert>,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Document waiting on delete confirmation
    pub pending_delete: Option<(DocumentKind, String)>,
    pub options: AppOptions,
    pub context: ValidationContext,
    pub should_quit: bool,
}

impl App {
    /// Loads the shipment and its documents and opens the first page.
    ///
    /// A closeout that was already signed, or opened read-only, starts on
    /// the final page with only "Return home" available.
    ///
    /// # Errors
    ///
    /// Fails when the initial fetch fails.
    pub fn new(
        mut source: Box<dyn DocumentSource>,
        session: SessionContext,
        options: AppOptions,
    ) -> Result<Self, AppError> {
        let shipment = source.fetch_shipment()?;
        let documents = source.fetch_documents()?;
        let entitlement = options.entitlement(source.fetch_entitlement()?);
        let submitted = shipment.signed_certification.is_some();
        let read_only = options.read_only || submitted;
        let start = if read_only { PAGE_COMPLETE } else { PAGE_ABOUT };
        let wizard = WizardPageState::new(closeout_pages(&shipment, options.features), start)?;
        info!(
            shipment = %shipment.id,
            documents = documents.len(),
            read_only,
            gun_safe = options.features.gun_safe,
            spouse_pro_gear = entitlement.pro_gear_weight_spouse.0,
            "closeout loaded"
        );

        let mut app = Self {
            source,
            session,
            data: ProvisionalResource::new(CloseoutData { shipment, documents }),
            wizard,
            flags: NavigationFlags {
                read_only,
                show_finish_later: true,
                ..Default::default()
            },
            form: None,
            mode: AppMode::Normal,
            selected_field: 0,
            selected_item: 0,
            input: String::new(),
            cursor_position: 0,
            filename_input: String::new(),
            help_scroll: 0,
            alert: submitted.then(|| Alert::info("This closeout has already been submitted.")),
            status_message: None,
            pending_delete: None,
            options,
            context: ValidationContext { entitlement },
            should_quit: false,
        };
        app.load_page_form();
        Ok(app)
    }

    pub fn shipment(&self) -> &PpmShipment {
        &self.data.get().shipment
    }

    pub fn documents(&self) -> &PpmDocuments {
        &self.data.get().documents
    }

    pub fn current_page(&self) -> &str {
        self.wizard.current_page_key()
    }

    /// Whether the review list (rather than a form) has focus.
    pub fn is_reviewing(&self) -> bool {
        self.current_page() == PAGE_REVIEW && !self.flags.edit_mode
    }

    pub fn review(&self) -> CloseoutReview {
        build_review(self.shipment(), self.documents(), self.options.features)
    }

    pub fn summary(&self) -> FinalCloseoutSummary {
        FinalCloseoutSummary::new(self.shipment(), self.documents(), self.options.features)
    }

    /// Buttons for the current page, in display order.
    pub fn navigation(&self) -> Vec<ActionButton> {
        WizardNavigation::new(&self.wizard, self.flags).actions()
    }

    /// Presses a navigation button. Returns whether anything happened.
    pub fn click(&mut self, action: WizardAction) -> bool {
        let state = self.wizard.clone();
        let navigation = WizardNavigation::new(&state, self.flags);
        navigation.click(action, self)
    }

    /// The forward button, whatever its label on this page.
    pub fn click_forward(&mut self) -> bool {
        let forward = WizardNavigation::new(&self.wizard, self.flags).forward_button();
        forward.is_some_and(|button| self.click(button.action))
    }

    /// Jumps straight to a page and opens its form.
    pub fn go_to_page(&mut self, page_key: &str) -> Result<(), WizardError> {
        self.wizard.go_to(page_key)?;
        self.flags.edit_mode = false;
        self.load_page_form();
        Ok(())
    }

    fn load_page_form(&mut self) {
        self.selected_field = 0;
        self.form = if self.flags.read_only {
            None
        } else {
            match self.current_page() {
                PAGE_ABOUT => Some(ActiveForm {
                    kind: FormKind::About,
                    target: None,
                    state: FormState::new(
                        about_schema(),
                        about_values(self.shipment()),
                        self.context,
                    ),
                }),
                PAGE_WEIGHT_TICKET => Some(self.document_form(DocumentKind::WeightTicket, None)),
                PAGE_PRO_GEAR => Some(self.document_form(DocumentKind::ProGear, None)),
                PAGE_GUN_SAFE => Some(self.document_form(DocumentKind::GunSafe, None)),
                PAGE_EXPENSES => Some(self.document_form(DocumentKind::Expense, None)),
                PAGE_COMPLETE => Some(ActiveForm {
                    kind: FormKind::FinalCloseout,
                    target: None,
                    state: FormState::new(
                        final_closeout_schema(),
                        final_closeout_values(self.shipment()),
                        self.context,
                    ),
                }),
                _ => None,
            }
        };
        self.sync_validity();
    }

    /// First incomplete document of a kind, else the last one, else new.
    fn wizard_target(&self, kind: DocumentKind) -> String {
        let documents = self.documents();
        let entries: Vec<(&str, bool)> = match kind {
            DocumentKind::WeightTicket => documents
                .weight_tickets
                .iter()
                .map(|t| (t.id.as_str(), weight_ticket_is_complete(t)))
                .collect(),
            DocumentKind::ProGear => documents
                .pro_gear_weight_tickets
                .iter()
                .map(|t| (t.id.as_str(), pro_gear_is_complete(t)))
                .collect(),
            DocumentKind::GunSafe => documents
                .gun_safe_weight_tickets
                .iter()
                .map(|t| (t.id.as_str(), gun_safe_is_complete(t)))
                .collect(),
            DocumentKind::Expense => documents
                .moving_expenses
                .iter()
                .map(|e| (e.id.as_str(), expense_is_complete(e)))
                .collect(),
        };
        entries
            .iter()
            .find(|(_, complete)| !complete)
            .or(entries.last())
            .map(|(id, _)| id.to_string())
            .unwrap_or_default()
    }

    fn document_form(&self, kind: DocumentKind, id: Option<&str>) -> ActiveForm {
        let id = id.map(str::to_string).unwrap_or_else(|| self.wizard_target(kind));
        let documents = self.documents();
        let (form_kind, schema, values) = match kind {
            DocumentKind::WeightTicket => (
                FormKind::WeightTicket,
                weight_ticket_schema(),
                documents
                    .weight_tickets
                    .iter()
                    .find(|t| t.id == id)
                    .map(weight_ticket_values)
                    .unwrap_or_default(),
            ),
            DocumentKind::ProGear => (
                FormKind::ProGear,
                pro_gear_schema(),
                documents
                    .pro_gear_weight_tickets
                    .iter()
                    .find(|t| t.id == id)
                    .map(pro_gear_values)
                    .unwrap_or_default(),
            ),
            DocumentKind::GunSafe => (
                FormKind::GunSafe,
                gun_safe_schema(),
                documents
                    .gun_safe_weight_tickets
                    .iter()
                    .find(|t| t.id == id)
                    .map(gun_safe_values)
                    .unwrap_or_default(),
            ),
            DocumentKind::Expense => (
                FormKind::Expense,
                expense_schema(),
                documents
                    .moving_expenses
                    .iter()
                    .find(|e| e.id == id)
                    .map(expense_values)
                    .unwrap_or_default(),
            ),
        };
        ActiveForm {
            kind: form_kind,
            target: Some(id),
            state: FormState::new(schema, values, self.context),
        }
    }

    /// Recomputes whether the forward button may be used.
    pub fn sync_validity(&mut self) {
        self.wizard.is_valid = match &self.form {
            Some(form) => form.state.is_valid(),
            None => {
                self.current_page() == PAGE_REVIEW
                    && can_advance(self.shipment(), self.documents(), self.options.features)
            }
        };
    }

    fn change_from_values(
        &self,
        kind: FormKind,
        target: Option<&str>,
        values: &FormValues,
    ) -> DocumentChange {
        let data = self.data.get();
        let id = target.unwrap_or_default();
        match kind {
            FormKind::About => DocumentChange::UpdateShipment(apply_about(values, &data.shipment)),
            FormKind::WeightTicket => {
                let base = data
                    .documents
                    .weight_tickets
                    .iter()
                    .find(|t| t.id == id)
                    .cloned()
                    .unwrap_or_default();
                DocumentChange::SaveWeightTicket(weight_ticket_from_values(values, &base))
            }
            FormKind::ProGear => {
                let base = data
                    .documents
                    .pro_gear_weight_tickets
                    .iter()
                    .find(|t| t.id == id)
                    .cloned()
                    .unwrap_or_default();
                DocumentChange::SaveProGear(pro_gear_from_values(values, &base))
            }
            FormKind::GunSafe => {
                let base = data
                    .documents
                    .gun_safe_weight_tickets
                    .iter()
                    .find(|t| t.id == id)
                    .cloned()
                    .unwrap_or_default();
                DocumentChange::SaveGunSafe(gun_safe_from_values(values, &base))
            }
            FormKind::Expense => {
                let base = data
                    .documents
                    .moving_expenses
                    .iter()
                    .find(|e| e.id == id)
                    .cloned()
                    .unwrap_or_default();
                DocumentChange::SaveExpense(expense_from_values(values, &base))
            }
            FormKind::FinalCloseout => DocumentChange::SubmitCloseout {
                signature: values.text("signature").to_string(),
            },
        }
    }

    /// Optimistically applies a change, sends it, then refetches.
    ///
    /// The refetch runs whether or not the submit succeeded, so the local
    /// copy always ends up matching the source.
    fn apply_change(&mut self, change: DocumentChange) -> Result<(), SourceError> {
        info!(change = change.describe(), "submitting change");
        self.data
            .modify(|data| change.apply_locally(&mut data.shipment, &mut data.documents));
        let result = self.source.submit(change);
        if let Err(err) = &result {
            error!(error = %err, "submit failed");
            self.alert = Some(Alert::error(format!("Could not save your changes: {}", err)));
        }
        self.refresh();
        result
    }

    fn fetch_data(&mut self) -> Result<CloseoutData, SourceError> {
        let shipment = self.source.fetch_shipment()?;
        let documents = self.source.fetch_documents()?;
        Ok(CloseoutData { shipment, documents })
    }

    /// Replaces the local copy with what the source reports.
    pub fn refresh(&mut self) {
        self.data.begin_reconcile();
        match self.fetch_data() {
            Ok(data) => {
                let pages = closeout_pages(&data.shipment, self.options.features);
                self.data.reconcile(data);
                if let Err(err) = self.wizard.replace_pages(pages) {
                    warn!(error = %err, "page list no longer contains the current page");
                }
            }
            Err(err) => {
                self.data.abort_reconcile();
                warn!(error = %err, "refresh failed");
                if self.alert.is_none() {
                    let message = format!("Could not refresh closeout data: {}", err);
                    self.alert = Some(Alert::error(message));
                }
            }
        }
        self.clamp_selected_item();
        self.sync_validity();
    }

    fn submit_current_page(&mut self) {
        let Some(active) = self.form.as_mut() else {
            if self.current_page() == PAGE_REVIEW {
                self.advance_page();
            }
            return;
        };
        let kind = active.kind;
        let target = active.target.clone();
        let values = match active.state.begin_submit() {
            Ok(values) => values,
            Err(errors) => {
                self.status_message = Some(format!("{} field(s) need attention", errors.len()));
                self.sync_validity();
                return;
            }
        };
        let change = self.change_from_values(kind, target.as_deref(), &values);

        self.wizard.is_submitting = true;
        let result = self.apply_change(change);
        self.wizard.is_submitting = false;
        if let Some(active) = self.form.as_mut() {
            active.state.finish_submit();
        }

        if result.is_err() {
            self.sync_validity();
            return;
        }
        if self.flags.edit_mode {
            self.status_message = Some("Saved".to_string());
            self.leave_edit_mode();
        } else if kind == FormKind::FinalCloseout {
            self.finish_closeout();
        } else {
            self.advance_page();
        }
    }

    fn advance_page(&mut self) {
        if self.wizard.advance() {
            self.load_page_form();
        }
    }

    fn finish_closeout(&mut self) {
        info!(shipment = %self.shipment().id, "closeout submitted");
        self.flags.read_only = true;
        self.form = None;
        self.alert = Some(Alert::success("You submitted the documentation for your PPM."));
        self.sync_validity();
    }

    // Review page

    fn clamp_selected_item(&mut self) {
        let count = self.review().item_count();
        if self.selected_item >= count {
            self.selected_item = count.saturating_sub(1);
        }
    }

    pub fn select_next_item(&mut self) {
        if self.selected_item + 1 < self.review().item_count() {
            self.selected_item += 1;
        }
    }

    pub fn select_previous_item(&mut self) {
        self.selected_item = self.selected_item.saturating_sub(1);
    }

    pub fn selected_review_item(&self) -> Option<(DocumentKind, String)> {
        self.review()
            .items()
            .nth(self.selected_item)
            .map(|item| (item.kind, item.id.clone()))
    }

    /// Opens a document from the review page in edit mode.
    pub fn start_edit(&mut self, kind: DocumentKind, id: &str) {
        if !self.is_reviewing() || self.flags.read_only {
            return;
        }
        self.flags.edit_mode = true;
        self.form = Some(self.document_form(kind, Some(id)));
        self.selected_field = 0;
        self.sync_validity();
    }

    pub fn edit_selected_item(&mut self) {
        if let Some((kind, id)) = self.selected_review_item() {
            self.start_edit(kind, &id);
        }
    }

    pub fn start_add(&mut self, kind: DocumentKind) {
        self.start_edit(kind, "");
    }

    fn leave_edit_mode(&mut self) {
        self.flags.edit_mode = false;
        self.mode = AppMode::Normal;
        self.load_page_form();
    }

    pub fn request_delete_selected(&mut self) {
        if !self.is_reviewing() || self.flags.read_only {
            return;
        }
        if let Some(item) = self.selected_review_item() {
            self.pending_delete = Some(item);
            self.mode = AppMode::ConfirmDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.mode = AppMode::Normal;
        let Some((kind, id)) = self.pending_delete.take() else {
            return;
        };
        if self.apply_change(DocumentChange::Delete { kind, id }).is_ok() {
            self.status_message = Some("Item deleted".to_string());
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.mode = AppMode::Normal;
    }

    // Form fields

    pub fn visible_fields(&self) -> Vec<FieldSpec> {
        self.form.as_ref().map(|form| form.state.visible_fields()).unwrap_or_default()
    }

    pub fn selected_field_spec(&self) -> Option<FieldSpec> {
        self.visible_fields().get(self.selected_field).copied()
    }

    pub fn select_next_field(&mut self) {
        if self.selected_field + 1 < self.visible_fields().len() {
            self.selected_field += 1;
        }
    }

    pub fn select_previous_field(&mut self) {
        self.selected_field = self.selected_field.saturating_sub(1);
    }

    /// Sets a form field and refreshes the forward button.
    pub fn set_field(&mut self, field: &'static str, value: FieldValue) {
        if let Some(form) = self.form.as_mut() {
            form.state.set_value(field, value);
        }
        let visible = self.visible_fields().len();
        if self.selected_field >= visible {
            self.selected_field = visible.saturating_sub(1);
        }
        self.sync_validity();
    }

    /// Acts on the selected field: text-like fields open the input line,
    /// flags toggle and choices cycle.
    pub fn activate_selected_field(&mut self) {
        let Some(spec) = self.selected_field_spec() else {
            return;
        };
        match spec.kind {
            FieldKind::Flag => {
                let current = self
                    .form
                    .as_ref()
                    .and_then(|form| form.state.values().flag(spec.name));
                self.set_field(spec.name, FieldValue::Flag(Some(current != Some(true))));
            }
            FieldKind::Choice(_) => self.cycle_choice(true),
            FieldKind::Files => {
                self.mode = AppMode::Editing;
                self.input.clear();
                self.cursor_position = 0;
            }
            _ => {
                self.mode = AppMode::Editing;
                self.input = self
                    .form
                    .as_ref()
                    .map(|form| form.state.values().text(spec.name).to_string())
                    .unwrap_or_default();
                self.cursor_position = self.input.len();
            }
        }
    }

    pub fn set_selected_flag(&mut self, value: bool) {
        if let Some(spec) = self.selected_field_spec() {
            if spec.kind == FieldKind::Flag {
                self.set_field(spec.name, FieldValue::Flag(Some(value)));
            }
        }
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        let Some(spec) = self.selected_field_spec() else {
            return;
        };
        let FieldKind::Choice(options) = spec.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let current = self
            .form
            .as_ref()
            .map(|form| form.state.values().text(spec.name))
            .unwrap_or_default();
        let next = match options.iter().position(|option| *option == current) {
            Some(i) if forward => (i + 1) % options.len(),
            Some(i) => (i + options.len() - 1) % options.len(),
            None if forward => 0,
            None => options.len() - 1,
        };
        self.set_field(spec.name, FieldValue::Text(options[next].to_string()));
    }

    /// Commits the input line to the selected field.
    pub fn finish_editing(&mut self) {
        self.mode = AppMode::Normal;
        let input = std::mem::take(&mut self.input);
        self.cursor_position = 0;
        let Some(spec) = self.selected_field_spec() else {
            return;
        };
        if spec.kind == FieldKind::Files {
            let filename = input.trim();
            if filename.is_empty() {
                return;
            }
            let mut files = self
                .form
                .as_ref()
                .map(|form| form.state.values().files(spec.name).to_vec())
                .unwrap_or_default();
            files.push(filename.to_string());
            self.set_field(spec.name, FieldValue::Files(files));
        } else {
            self.set_field(spec.name, FieldValue::Text(input));
        }
    }

    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Removes the last upload from the selected file field.
    pub fn remove_last_file(&mut self) {
        let Some(spec) = self.selected_field_spec() else {
            return;
        };
        if spec.kind != FieldKind::Files {
            return;
        }
        let mut files = self
            .form
            .as_ref()
            .map(|form| form.state.values().files(spec.name).to_vec())
            .unwrap_or_default();
        if files.pop().is_some() {
            self.set_field(spec.name, FieldValue::Files(files));
        }
    }

    // Prompts and banners

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
        self.help_scroll = 0;
    }

    /// Switches to CSV export mode to prompt for a filename.
    pub fn start_csv_export(&mut self) {
        self.mode = AppMode::ExportCsv;
        self.filename_input = DEFAULT_EXPORT_FILENAME.to_string();
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    pub fn get_csv_export_filename(&self) -> String {
        if self.filename_input.trim().is_empty() {
            DEFAULT_EXPORT_FILENAME.to_string()
        } else {
            self.filename_input.trim().to_string()
        }
    }

    /// Processes the result of a CSV export and returns to normal mode.
    pub fn set_csv_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Exported to {}", filename));
            }
            Err(error) => {
                self.alert = Some(Alert::error(format!("Export failed: {}", error)));
            }
        }
        self.cancel_filename_input();
    }

    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }
}

impl WizardHandlers for App {
    fn on_back_click(&mut self) {
        if self.wizard.go_back() {
            self.load_page_form();
        }
    }

    fn on_next_click(&mut self) {
        self.submit_current_page();
    }

    fn on_cancel_click(&mut self) {
        if self.flags.edit_mode {
            self.leave_edit_mode();
        } else {
            info!(page = self.current_page(), "finishing later");
            self.status_message = Some("Your progress is saved. You can finish later.".to_string());
            self.should_quit = true;
        }
    }

    fn on_return_home_click(&mut self) {
        self.should_quit = true;
    }
}
