// SPDX-License-Identifier: MIT OR Apache-2.0

//! Create, read, update and delete of group-to-members attachments as driven by a hosting
//! framework.
//!
//! The host keeps the declared fields of every attachment in an [`AttachmentState`] and calls the
//! lifecycle methods on it. Each method mutates the state to whatever was actually reached
//! remotely and returns [`Diagnostics`] for the host to present, attached to the field which
//! caused them.
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::{DirectoryClient, RemoteError};
use crate::reconcile::{Attachment, ReconcileError, Reconciler};
use crate::{AssociationId, GroupId, MemberSet};

pub const GROUP_ID_ATTRIBUTE: &str = "group_id";
pub const USERS_ATTRIBUTE: &str = "users";

/// Stored fields of a group users attachment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentState {
    /// Identifier of the association, `None` if it does not exist (anymore).
    #[serde(default)]
    pub id: Option<AssociationId>,
    pub group_id: GroupId,
    #[serde(default)]
    pub users: MemberSet,
}

impl AttachmentState {
    pub fn new(group_id: impl Into<GroupId>, users: MemberSet) -> Self {
        Self {
            id: None,
            group_id: group_id.into(),
            users,
        }
    }

    /// Returns `true` if moving from `prior` to `planned` can't be done in place.
    ///
    /// The group is part of the association's identity, changing it means deleting the old
    /// association and creating a new one.
    pub fn requires_replacement(prior: &AttachmentState, planned: &AttachmentState) -> bool {
        prior.group_id != planned.group_id
    }

    fn apply(&mut self, attachment: Attachment) {
        self.id = Some(attachment.id);
        self.group_id = attachment.group_id;
        self.users = attachment.members;
    }

    fn clear(&mut self) {
        self.id = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Message for the host, optionally attached to the field it concerns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            attribute: None,
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl<E> From<&ReconcileError<E>> for Diagnostic
where
    E: RemoteError,
{
    fn from(err: &ReconcileError<E>) -> Self {
        let attribute = match err {
            ReconcileError::Fetch { .. } => GROUP_ID_ATTRIBUTE,
            ReconcileError::Add { .. } | ReconcileError::Remove { .. } => USERS_ATTRIBUTE,
        };
        Diagnostic::error(err.to_string()).with_attribute(attribute)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attribute) => write!(f, "{}: {}", attribute, self.summary),
            None => write!(f, "{}", self.summary),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn has_errors(&self) -> bool {
        self.0
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

/// Lifecycle handlers of the group users attachment resource.
#[derive(Debug)]
pub struct AttachmentLifecycle<C> {
    reconciler: Reconciler<C>,
}

impl<C> AttachmentLifecycle<C>
where
    C: DirectoryClient,
{
    pub fn new(client: C) -> Self {
        Self {
            reconciler: Reconciler::new(client),
        }
    }

    /// Refresh the state from the directory.
    ///
    /// If the group is gone the association is forgotten without reporting an error.
    pub async fn read(&self, state: &mut AttachmentState) -> Diagnostics {
        let result = self
            .reconciler
            .fetch_and_reconcile(&state.group_id, &state.users)
            .await;
        self.settle(state, result, false)
    }

    pub async fn create(&self, state: &mut AttachmentState) -> Diagnostics {
        let result = self.reconciler.create(&state.group_id, &state.users).await;
        self.settle(state, result, true)
    }

    /// Apply the difference between the `prior` snapshot and the planned `state`.
    ///
    /// Even if changes fail, `state` ends up reflecting the membership which was actually reached,
    /// so that the next run only retries what is still missing.
    pub async fn update(
        &self,
        prior: &AttachmentState,
        state: &mut AttachmentState,
    ) -> Diagnostics {
        if AttachmentState::requires_replacement(prior, state) {
            return Diagnostic::error(format!(
                "group can't be changed from {} to {} in place, the attachment needs to be replaced",
                prior.group_id, state.group_id
            ))
            .with_attribute(GROUP_ID_ATTRIBUTE)
            .into();
        }

        let report = self
            .reconciler
            .update(&state.group_id, &prior.users, &state.users)
            .await;

        let mut diagnostics: Diagnostics =
            report.apply_errors.iter().map(Diagnostic::from).collect();
        if report.refreshed.is_err() {
            // Nothing was observed, only claim members confirmed before which are still declared.
            state.users = prior.users.intersection(&state.users);
            state.id = prior.id.clone();
        }
        diagnostics.extend(self.settle(state, report.refreshed, true));
        diagnostics
    }

    /// Remove all declared members from the group.
    ///
    /// The identifier is kept on failure so the host can retry.
    pub async fn delete(&self, state: &mut AttachmentState) -> Diagnostics {
        match self.reconciler.delete(&state.group_id, &state.users).await {
            Ok(()) => {
                state.clear();
                Diagnostics::new()
            }
            Err(err) => Diagnostic::from(&err).into(),
        }
    }

    fn settle(
        &self,
        state: &mut AttachmentState,
        result: Result<Option<Attachment>, ReconcileError<C::Error>>,
        report_gone: bool,
    ) -> Diagnostics {
        match result {
            Ok(Some(attachment)) => {
                state.apply(attachment);
                Diagnostics::new()
            }
            Ok(None) => {
                warn!(
                    group = %state.group_id,
                    "removing users attachment of group because it's gone"
                );
                state.clear();
                if report_gone {
                    Diagnostic::warning(format!("group {} does not exist", state.group_id))
                        .with_attribute(GROUP_ID_ATTRIBUTE)
                        .into()
                } else {
                    Diagnostics::new()
                }
            }
            Err(err) => Diagnostic::from(&err).into(),
        }
    }
}
