//! Maps the action buttons of the record modals to backend calls.
//!
//! Each resource kind has a fixed, closed set of actions. A successful action
//! is folded back into the list by changing one field of the affected record
//! in place, so the search term, sort and selection of the list survive.

use std::fmt;

use serde_json::json;

use crate::{
    list_store::ListState,
    pipeline::RecordId,
    transport::{Mutation, MutationMethod, RecordClient, ResourceKind, TransportError},
};

/// An action an administrator can run on a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move a dispute into review.
    Escalate,
    MarkReviewed,
    /// Refund the disputed amount.
    ReturnMoney,
    /// Verify a business account.
    Approve,
    Reject,
    /// Ask a business to send more documents. Nothing changes locally.
    RequestMoreInfo,
}

const DISPUTE_ACTIONS: &[Action] = &[Action::Escalate, Action::MarkReviewed, Action::ReturnMoney];
const BUSINESS_ACTIONS: &[Action] = &[Action::Approve, Action::Reject, Action::RequestMoreInfo];

impl Action {
    /// The actions offered for records of `kind`, in display order.
    pub fn for_kind(kind: ResourceKind) -> &'static [Action] {
        match kind {
            ResourceKind::Disputes => DISPUTE_ACTIONS,
            ResourceKind::Businesses => BUSINESS_ACTIONS,
            ResourceKind::Users | ResourceKind::Transactions => &[],
        }
    }

    /// Find the action of `kind` whose button reads `label`.
    pub fn from_label(kind: ResourceKind, label: &str) -> Option<Action> {
        Self::for_kind(kind)
            .iter()
            .copied()
            .find(|action| action.label() == label)
    }

    /// The text on the action's button.
    pub fn label(self) -> &'static str {
        match self {
            Action::Escalate => "Escalate",
            Action::MarkReviewed => "Reviewed",
            Action::ReturnMoney => "Return Money",
            Action::Approve => "Approve",
            Action::Reject => "Reject",
            Action::RequestMoreInfo => "Request More Info",
        }
    }

    /// The backend call that implements the action.
    pub fn mutation(self) -> Mutation {
        let (method, action, body) = match self {
            Action::Escalate => (MutationMethod::Patch, "move-to-review/", None),
            Action::MarkReviewed => (MutationMethod::Patch, "mark-as-reviewed/", None),
            Action::ReturnMoney => (MutationMethod::Patch, "process-refund/", None),
            Action::Approve => (
                MutationMethod::Patch,
                "verify",
                Some(json!({"verificationStatus": "approved"})),
            ),
            Action::Reject => (
                MutationMethod::Patch,
                "verify",
                Some(json!({"verificationStatus": "rejected"})),
            ),
            Action::RequestMoreInfo => (MutationMethod::Post, "request-more-info", None),
        };

        Mutation {
            method,
            action,
            body,
        }
    }

    /// The field and new value written to the local record once the backend
    /// accepts the action.
    pub fn local_effect(self) -> Option<(&'static str, &'static str)> {
        match self {
            Action::Escalate => Some(("status", "In review")),
            Action::MarkReviewed => Some(("status", "Reviewed")),
            Action::ReturnMoney => Some(("status", "Resolved")),
            Action::Approve => Some(("verificationStatus", "approved")),
            Action::Reject => Some(("verificationStatus", "rejected")),
            Action::RequestMoreInfo => None,
        }
    }

    /// The message shown after the backend accepts the action.
    pub fn success_message(self) -> &'static str {
        match self {
            Action::Escalate => "Dispute moved to review",
            Action::MarkReviewed => "Dispute marked as reviewed",
            Action::ReturnMoney => "Refund processed",
            Action::Approve => "Business approved",
            Action::Reject => "Business rejected",
            Action::RequestMoreInfo => "Request for more information sent",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Run `action` on the record of `kind` identified by `id`.
///
/// The backend's response body is not used; see [apply_action] for how the
/// list is updated.
///
/// # Errors
/// Returns the [TransportError] of the failed call. Nothing is retried.
pub async fn dispatch(
    client: &RecordClient,
    kind: ResourceKind,
    id: &RecordId,
    action: Action,
) -> Result<(), TransportError> {
    tracing::info!("Running {action} on {kind} {id}");

    client
        .mutate_record(kind, id, &action.mutation())
        .await
        .map(|_| ())
        .inspect_err(|error| tracing::warn!("{action} on {kind} {id} failed: {error}"))
}

/// Apply the local effect of a successful `action` to the record `id` in
/// `list`.
///
/// Returns `false` if the record is no longer in the list, e.g. because a
/// reload finished while the action was in flight.
pub fn apply_action(list: &mut ListState, id: &RecordId, action: Action) -> bool {
    let Some((field, value)) = action.local_effect() else {
        return list.find(id).is_some();
    };

    list.update_record(id, |record| record.set(field, value))
}
