//! Moderation dialogs as explicit state machines
//!
//! Every dialog moves through [`DialogState`]. Submitting validates the form
//! locally first; a validation failure keeps the dialog open with a field
//! error and produces no request. A valid submit yields the [`Mutation`] to
//! run and the dialog waits in `Submitting` until [`Dialog::complete`] is
//! called with the outcome.

use crate::{
    coordinator::Mutation,
    error::{ConsoleError, Result},
};
use rewards_admin_client::{ApiError, ApiResult, MutationAck};
use rewards_admin_core::{Business, Category, CategoryInput, Creator, RecordId};
use tracing::debug;
use validator::{Validate, ValidationErrors};

/// Hint shown under a non-empty confirmation field that does not match
pub const TEXT_MISMATCH_HINT: &str = "Text does not match";

/// Lifecycle shared by every dialog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialogState {
    /// Not shown
    #[default]
    Closed,
    /// Shown and editable, optionally with an inline error
    Open {
        /// Inline error from local validation or the last failed request
        error: Option<String>,
    },
    /// A request is outstanding; controls are disabled
    Submitting,
}

impl DialogState {
    /// Show the dialog with no error
    pub fn open(&mut self) {
        *self = Self::Open { error: None };
    }

    /// Dismiss the dialog; ignored while submitting
    pub fn close(&mut self) -> bool {
        if matches!(self, Self::Submitting) {
            return false;
        }
        *self = Self::Closed;
        true
    }

    /// Whether the dialog is shown
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Whether the close and confirm controls are disabled
    #[must_use]
    pub const fn controls_disabled(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Inline error, when open
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Open { error } => error.as_deref(),
            Self::Closed | Self::Submitting => None,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self {
            Self::Open { .. } => Ok(()),
            Self::Closed => Err(ConsoleError::invalid_transition("dialog is not open")),
            Self::Submitting => Err(ConsoleError::invalid_transition(
                "a request is already outstanding",
            )),
        }
    }

    fn begin_submit(&mut self) -> Result<()> {
        self.ensure_open()?;
        *self = Self::Submitting;
        Ok(())
    }

    fn reject(&mut self, message: impl Into<String>) {
        *self = Self::Open {
            error: Some(message.into()),
        };
    }

    /// Record the outcome of the outstanding request
    pub fn finish(&mut self, outcome: std::result::Result<(), String>) {
        if !matches!(self, Self::Submitting) {
            debug!("Ignoring completion for a dialog that is not submitting");
            return;
        }
        match outcome {
            Ok(()) => *self = Self::Closed,
            Err(message) => self.reject(message),
        }
    }
}

/// Common dialog surface
pub trait Dialog {
    /// Lifecycle state
    fn state(&self) -> &DialogState;

    /// Validate the form and, when valid, move to `Submitting`
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the dialog open with the field
    /// error, or an invalid transition error when the dialog is not open.
    fn submit(&mut self) -> Result<Mutation>;

    /// Apply the outcome of the request produced by [`Dialog::submit`]
    fn complete(&mut self, result: &ApiResult<MutationAck>);
}

fn first_violation(errors: &ValidationErrors) -> ConsoleError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .first()
        .and_then(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map_or_else(|| err.code.to_string(), ToString::to_string);
                ConsoleError::validation(field.to_string(), message)
            })
        })
        .unwrap_or_else(|| ConsoleError::validation("form", "invalid input"))
}

fn validation_message(err: &ConsoleError) -> String {
    match err {
        ConsoleError::Validation { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

fn outcome(result: &ApiResult<MutationAck>) -> std::result::Result<(), String> {
    result
        .as_ref()
        .map(|_| ())
        .map_err(|err| err.message().to_string())
}

/// Kind of account a dialog acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// A business
    Business,
    /// A content creator
    Creator,
}

/// Confirmation before verifying a business
#[derive(Debug, Clone)]
pub struct VerifyDialog {
    state: DialogState,
    business_id: RecordId,
    business_name: String,
}

impl VerifyDialog {
    /// Open the dialog for `business`
    #[must_use]
    pub fn open(business: &Business) -> Self {
        let mut state = DialogState::default();
        state.open();
        Self {
            state,
            business_id: business.id.clone(),
            business_name: business.business_name.clone(),
        }
    }

    /// Name shown in the prompt
    #[must_use]
    pub fn business_name(&self) -> &str {
        &self.business_name
    }

    /// Dismiss; ignored while submitting
    pub fn close(&mut self) -> bool {
        self.state.close()
    }
}

impl Dialog for VerifyDialog {
    fn state(&self) -> &DialogState {
        &self.state
    }

    fn submit(&mut self) -> Result<Mutation> {
        self.state.begin_submit()?;
        Ok(Mutation::VerifyBusiness {
            id: self.business_id.clone(),
        })
    }

    fn complete(&mut self, result: &ApiResult<MutationAck>) {
        self.state.finish(outcome(result));
    }
}

#[derive(Debug, Validate)]
struct SuspendForm {
    #[validate(length(min = 10, message = "Reason must be at least 10 characters"))]
    reason: String,
}

/// Suspension of a business or creator with a mandatory reason
#[derive(Debug, Clone)]
pub struct SuspendDialog {
    state: DialogState,
    kind: AccountKind,
    target_id: RecordId,
    target_name: String,
    reason: String,
}

impl SuspendDialog {
    /// Open the dialog for `business`
    #[must_use]
    pub fn for_business(business: &Business) -> Self {
        Self::new(
            AccountKind::Business,
            business.id.clone(),
            business.business_name.clone(),
        )
    }

    /// Open the dialog for `creator`
    #[must_use]
    pub fn for_creator(creator: &Creator) -> Self {
        Self::new(
            AccountKind::Creator,
            creator.id.clone(),
            creator.display_name().to_string(),
        )
    }

    /// Open the dialog for an account known only by id and display name
    #[must_use]
    pub fn new(kind: AccountKind, target_id: RecordId, target_name: String) -> Self {
        let mut state = DialogState::default();
        state.open();
        Self {
            state,
            kind,
            target_id,
            target_name,
            reason: String::new(),
        }
    }

    /// Replace the reason text
    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    /// Name shown in the prompt
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Dismiss and reset the form; ignored while submitting
    pub fn close(&mut self) -> bool {
        let closed = self.state.close();
        if closed {
            self.reason.clear();
        }
        closed
    }

    fn validate(&self) -> Result<String> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(ConsoleError::validation(
                "reason",
                "Suspension reason is required",
            ));
        }
        let form = SuspendForm {
            reason: reason.to_string(),
        };
        form.validate().map_err(|errors| first_violation(&errors))?;
        Ok(form.reason)
    }
}

impl Dialog for SuspendDialog {
    fn state(&self) -> &DialogState {
        &self.state
    }

    fn submit(&mut self) -> Result<Mutation> {
        self.state.ensure_open()?;
        let reason = match self.validate() {
            Ok(reason) => reason,
            Err(err) => {
                self.state.reject(validation_message(&err));
                return Err(err);
            }
        };
        self.state.begin_submit()?;
        let id = self.target_id.clone();
        Ok(match self.kind {
            AccountKind::Business => Mutation::SuspendBusiness { id, reason },
            AccountKind::Creator => Mutation::SuspendCreator { id, reason },
        })
    }

    fn complete(&mut self, result: &ApiResult<MutationAck>) {
        self.state.finish(outcome(result));
        if self.state == DialogState::Closed {
            self.reason.clear();
        }
    }
}

/// What a delete dialog removes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// A business
    Business(RecordId),
    /// A category
    Category(RecordId),
}

/// Destructive delete gated on retyping the entity name
#[derive(Debug, Clone)]
pub struct ConfirmDeleteDialog {
    state: DialogState,
    target: DeleteTarget,
    entity_name: String,
    typed: String,
    dependent_count: u64,
    acknowledged: bool,
}

impl ConfirmDeleteDialog {
    /// Open the dialog for deleting `business`
    #[must_use]
    pub fn for_business(business: &Business) -> Self {
        Self::open(
            DeleteTarget::Business(business.id.clone()),
            business.business_name.clone(),
            0,
        )
    }

    /// Open the dialog for deleting `category`, seeded with its business count
    #[must_use]
    pub fn for_category(category: &Category) -> Self {
        Self::open(
            DeleteTarget::Category(category.id.clone()),
            category.name.clone(),
            category.business_count,
        )
    }

    fn open(target: DeleteTarget, entity_name: String, dependent_count: u64) -> Self {
        let mut state = DialogState::default();
        state.open();
        Self {
            state,
            target,
            entity_name,
            typed: String::new(),
            dependent_count,
            acknowledged: false,
        }
    }

    /// Replace the confirmation text
    pub fn set_typed(&mut self, text: impl Into<String>) {
        self.typed = text.into();
    }

    /// Acknowledge that dependent records exist
    pub fn acknowledge_dependents(&mut self) {
        self.acknowledged = true;
    }

    /// Name the operator must retype
    #[must_use]
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Records that still depend on the target
    #[must_use]
    pub const fn dependent_count(&self) -> u64 {
        self.dependent_count
    }

    /// Mismatch hint for the confirmation field
    #[must_use]
    pub fn hint(&self) -> Option<&'static str> {
        (!self.typed.is_empty() && self.typed != self.entity_name).then_some(TEXT_MISMATCH_HINT)
    }

    /// Whether the confirm control is enabled
    #[must_use]
    pub fn can_confirm(&self) -> bool {
        self.typed == self.entity_name
            && (self.dependent_count == 0 || self.acknowledged)
            && !self.state.controls_disabled()
    }

    /// Dismiss and reset the form; ignored while submitting
    pub fn close(&mut self) -> bool {
        let closed = self.state.close();
        if closed {
            self.typed.clear();
            self.acknowledged = false;
        }
        closed
    }
}

impl Dialog for ConfirmDeleteDialog {
    fn state(&self) -> &DialogState {
        &self.state
    }

    fn submit(&mut self) -> Result<Mutation> {
        self.state.ensure_open()?;
        if self.typed != self.entity_name {
            return Err(ConsoleError::validation("confirmation", TEXT_MISMATCH_HINT));
        }
        if self.dependent_count > 0 && !self.acknowledged {
            return Err(ConsoleError::confirmation_required(format!(
                "{} businesses still use '{}'",
                self.dependent_count, self.entity_name
            )));
        }
        self.state.begin_submit()?;
        Ok(match &self.target {
            DeleteTarget::Business(id) => Mutation::DeleteBusiness { id: id.clone() },
            DeleteTarget::Category(id) => Mutation::DeleteCategory { id: id.clone() },
        })
    }

    fn complete(&mut self, result: &ApiResult<MutationAck>) {
        if let Err(ApiError::Conflict {
            dependent_count: Some(count),
            ..
        }) = result
        {
            // The server knows better than the listing we opened with.
            self.dependent_count = *count;
            self.acknowledged = false;
        }
        self.state.finish(outcome(result));
    }
}

#[derive(Debug, Validate)]
struct CategoryForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    name: String,
    #[validate(url(message = "Icon must be a valid URL"))]
    icon: Option<String>,
}

/// Whether a category form creates or edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFormMode {
    /// New category
    Create,
    /// Existing category
    Edit(RecordId),
}

/// Create or edit a category
#[derive(Debug, Clone)]
pub struct CategoryFormDialog {
    state: DialogState,
    mode: CategoryFormMode,
    /// Name field
    pub name: String,
    /// Description field
    pub description: String,
    /// Icon URL field
    pub icon: String,
}

impl CategoryFormDialog {
    /// Open an empty form
    #[must_use]
    pub fn create() -> Self {
        Self::open(CategoryFormMode::Create, String::new(), String::new(), String::new())
    }

    /// Open a form pre-filled from `category`
    #[must_use]
    pub fn edit(category: &Category) -> Self {
        Self::open(
            CategoryFormMode::Edit(category.id.clone()),
            category.name.clone(),
            category.description.clone().unwrap_or_default(),
            category.icon.clone().unwrap_or_default(),
        )
    }

    fn open(mode: CategoryFormMode, name: String, description: String, icon: String) -> Self {
        let mut state = DialogState::default();
        state.open();
        Self {
            state,
            mode,
            name,
            description,
            icon,
        }
    }

    /// Create or edit
    #[must_use]
    pub const fn mode(&self) -> &CategoryFormMode {
        &self.mode
    }

    /// Dismiss; ignored while submitting
    pub fn close(&mut self) -> bool {
        self.state.close()
    }

    /// Validated payload for the current fields
    ///
    /// # Errors
    ///
    /// Returns the first field violation.
    pub fn input(&self) -> Result<CategoryInput> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConsoleError::validation("name", "Category name is required"));
        }
        let form = CategoryForm {
            name: name.to_string(),
            icon: Some(self.icon.trim())
                .filter(|s| !s.is_empty())
                .map(ToString::to_string),
        };
        form.validate().map_err(|errors| first_violation(&errors))?;

        let description = Some(self.description.trim()).filter(|s| !s.is_empty());
        Ok(CategoryInput {
            name: form.name,
            description: description.map(ToString::to_string),
            icon: form.icon,
        })
    }
}

impl Dialog for CategoryFormDialog {
    fn state(&self) -> &DialogState {
        &self.state
    }

    fn submit(&mut self) -> Result<Mutation> {
        self.state.ensure_open()?;
        let input = match self.input() {
            Ok(input) => input,
            Err(err) => {
                self.state.reject(validation_message(&err));
                return Err(err);
            }
        };
        self.state.begin_submit()?;
        Ok(match &self.mode {
            CategoryFormMode::Create => Mutation::CreateCategory { input },
            CategoryFormMode::Edit(id) => Mutation::UpdateCategory {
                id: id.clone(),
                input,
            },
        })
    }

    fn complete(&mut self, result: &ApiResult<MutationAck>) {
        self.state.finish(outcome(result));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn business() -> Business {
        serde_json::from_value(json!({"_id": "b1", "businessName": "Corner Cafe"})).unwrap()
    }

    fn category(count: u64) -> Category {
        serde_json::from_value(json!({
            "_id": "c1",
            "name": "Food",
            "description": "Restaurants",
            "icon": "https://cdn.example.com/food.png",
            "businessCount": count
        }))
        .unwrap()
    }

    #[test]
    fn test_short_reason_is_rejected_without_request() {
        let mut dialog = SuspendDialog::for_business(&business());
        dialog.set_reason("bad");

        let err = dialog.submit().unwrap_err();

        assert!(matches!(err, ConsoleError::Validation { ref field, .. } if field == "reason"));
        assert_eq!(
            dialog.state().error(),
            Some("Reason must be at least 10 characters")
        );
        assert!(!dialog.state().controls_disabled());
    }

    #[test]
    fn test_valid_reason_submits() {
        let mut dialog = SuspendDialog::for_business(&business());
        dialog.set_reason("Repeated policy violations");

        let mutation = dialog.submit().unwrap();

        assert_eq!(
            mutation,
            Mutation::SuspendBusiness {
                id: RecordId::from("b1"),
                reason: "Repeated policy violations".to_string(),
            }
        );
        assert_eq!(dialog.state(), &DialogState::Submitting);
        assert!(!dialog.close());
    }

    #[test]
    fn test_empty_reason_is_required() {
        let mut dialog = SuspendDialog::for_business(&business());
        dialog.set_reason("   ");

        dialog.submit().unwrap_err();

        assert_eq!(dialog.state().error(), Some("Suspension reason is required"));
    }

    #[test]
    fn test_failed_request_reopens_with_message() {
        let mut dialog = SuspendDialog::for_business(&business());
        dialog.set_reason("Repeated policy violations");
        dialog.submit().unwrap();

        dialog.complete(&Err(ApiError::ServerError {
            status: 500,
            message: "Internal error".to_string(),
        }));

        assert_eq!(dialog.state().error(), Some("Internal error"));
        assert!(dialog.close());
    }

    #[test]
    fn test_successful_request_closes() {
        let mut dialog = VerifyDialog::open(&business());
        dialog.submit().unwrap();

        dialog.complete(&Ok(MutationAck::default()));

        assert_eq!(dialog.state(), &DialogState::Closed);
    }

    #[test]
    fn test_submit_twice_is_invalid() {
        let mut dialog = VerifyDialog::open(&business());
        dialog.submit().unwrap();

        assert!(matches!(
            dialog.submit(),
            Err(ConsoleError::InvalidTransition { .. })
        ));
    }

    #[rstest]
    #[case("", None)]
    #[case("Corner", Some(TEXT_MISMATCH_HINT))]
    #[case("corner cafe", Some(TEXT_MISMATCH_HINT))]
    #[case("Corner Cafe", None)]
    fn test_delete_hint(#[case] typed: &str, #[case] hint: Option<&str>) {
        let mut dialog = ConfirmDeleteDialog::for_business(&business());
        dialog.set_typed(typed);

        assert_eq!(dialog.hint(), hint);
        assert_eq!(dialog.can_confirm(), typed == "Corner Cafe");
    }

    #[test]
    fn test_category_with_dependents_requires_acknowledgement() {
        let mut dialog = ConfirmDeleteDialog::for_category(&category(3));
        dialog.set_typed("Food");

        assert_eq!(dialog.dependent_count(), 3);
        assert!(!dialog.can_confirm());
        let err = dialog.submit().unwrap_err();
        assert!(matches!(err, ConsoleError::ConfirmationRequired { .. }));
        assert!(err.to_string().contains("3 businesses still use 'Food'"));

        dialog.acknowledge_dependents();

        assert!(dialog.can_confirm());
        assert_eq!(
            dialog.submit().unwrap(),
            Mutation::DeleteCategory {
                id: RecordId::from("c1")
            }
        );
    }

    #[test]
    fn test_conflict_keeps_dialog_open_with_count() {
        let mut dialog = ConfirmDeleteDialog::for_category(&category(0));
        dialog.set_typed("Food");
        dialog.submit().unwrap();

        dialog.complete(&Err(ApiError::Conflict {
            message: "Cannot delete category. 2 businesses are using this category.".to_string(),
            dependent_count: Some(2),
        }));

        assert!(dialog.state().is_open());
        assert_eq!(dialog.dependent_count(), 2);
        assert!(!dialog.can_confirm());
    }

    #[test]
    fn test_category_edit_prefills() {
        let dialog = CategoryFormDialog::edit(&category(1));

        assert_eq!(dialog.name, "Food");
        assert_eq!(dialog.description, "Restaurants");
        assert_eq!(dialog.mode(), &CategoryFormMode::Edit(RecordId::from("c1")));
    }

    #[rstest]
    #[case("F", "", "name")]
    #[case("", "", "name")]
    #[case("Food", "not a url", "icon")]
    fn test_category_form_rejects(#[case] name: &str, #[case] icon: &str, #[case] field: &str) {
        let mut dialog = CategoryFormDialog::create();
        dialog.name = name.to_string();
        dialog.icon = icon.to_string();

        let err = dialog.submit().unwrap_err();

        assert!(matches!(err, ConsoleError::Validation { field: ref f, .. } if f == field));
        assert!(dialog.state().error().is_some());
    }

    #[test]
    fn test_category_form_omits_blank_optionals() {
        let mut dialog = CategoryFormDialog::create();
        dialog.name = " Books ".to_string();

        let mutation = dialog.submit().unwrap();

        assert_eq!(
            mutation,
            Mutation::CreateCategory {
                input: CategoryInput {
                    name: "Books".to_string(),
                    description: None,
                    icon: None,
                }
            }
        );
    }

    #[test]
    fn test_closed_dialog_cannot_submit() {
        let mut dialog = CategoryFormDialog::create();
        dialog.close();

        assert!(matches!(
            dialog.submit(),
            Err(ConsoleError::InvalidTransition { .. })
        ));
    }
}
