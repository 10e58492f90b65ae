// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-modify-read cycles converging remote group membership towards a declared membership.
//!
//! The reconciler holds no state of its own between calls. Every operation re-reads the group
//! from the directory after applying changes and reports the _effective_ membership: the
//! intersection of what was declared and what was actually observed remotely.
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::{DirectoryClient, DirectoryGroup, RemoteError};
use crate::{AssociationId, GroupId, MemberSet, MembershipDiff};

#[derive(Debug, Error)]
pub enum ReconcileError<E>
where
    E: RemoteError,
{
    #[error("failed to fetch group {group}: {source}")]
    Fetch { group: GroupId, source: E },

    #[error("failed to add members {members} to group {group}: {source}")]
    Add {
        group: GroupId,
        members: MemberSet,
        source: E,
    },

    #[error("failed to remove members {members} from group {group}: {source}")]
    Remove {
        group: GroupId,
        members: MemberSet,
        source: E,
    },
}

impl<E> ReconcileError<E>
where
    E: RemoteError,
{
    pub fn group(&self) -> &GroupId {
        match self {
            ReconcileError::Fetch { group, .. }
            | ReconcileError::Add { group, .. }
            | ReconcileError::Remove { group, .. } => group,
        }
    }

    /// The error reported by the directory client.
    pub fn remote(&self) -> &E {
        match self {
            ReconcileError::Fetch { source, .. }
            | ReconcileError::Add { source, .. }
            | ReconcileError::Remove { source, .. } => source,
        }
    }
}

/// Effective state of an association after reconciling with the directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub id: AssociationId,
    pub group_id: GroupId,

    /// Declared members which are confirmed to be present in the remote group.
    pub members: MemberSet,
}

impl Attachment {
    /// Intersect the observed group with the declared membership.
    ///
    /// Members which were observed but never declared are not claimed, neither are declared
    /// members which are missing remotely.
    pub fn reconcile(observed: DirectoryGroup, desired: &MemberSet) -> Self {
        let members = observed.members.intersection(desired);
        Self {
            id: AssociationId::derive(&observed.id, &members),
            group_id: observed.id,
            members,
        }
    }
}

/// Outcome of an update.
///
/// Failing to add or remove members does not abort an update: the other half is still applied and
/// the group is re-read in any case, so callers always learn which state was actually reached.
/// Failures while applying changes and a failure of the final refresh are reported separately.
#[derive(Debug)]
pub struct UpdateReport<E>
where
    E: RemoteError,
{
    /// Remove and add steps which failed, in the order they were attempted.
    pub apply_errors: Vec<ReconcileError<E>>,

    /// Result of re-reading the group after applying changes. `Ok(None)` if the group is gone.
    pub refreshed: Result<Option<Attachment>, ReconcileError<E>>,
}

impl<E> UpdateReport<E>
where
    E: RemoteError,
{
    /// Returns `true` if every requested change was applied and the refresh succeeded.
    pub fn is_ok(&self) -> bool {
        self.apply_errors.is_empty() && self.refreshed.is_ok()
    }

    /// Returns `true` if some requested changes could not be applied.
    pub fn is_partial(&self) -> bool {
        !self.apply_errors.is_empty()
    }

    /// State reached after the update, if the refresh succeeded and the group still exists.
    pub fn attachment(&self) -> Option<&Attachment> {
        self.refreshed.as_ref().ok().and_then(Option::as_ref)
    }
}

/// Applies membership changes through a [`DirectoryClient`] and reconciles the result.
///
/// Remote calls are issued strictly one after another; removals always happen before additions.
#[derive(Debug)]
pub struct Reconciler<C> {
    client: C,
}

impl<C> Reconciler<C>
where
    C: DirectoryClient,
{
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Read the group and intersect its members with the `desired` membership.
    ///
    /// Returns `Ok(None)` if the group does not exist anymore, callers should forget the
    /// association in this case.
    pub async fn fetch_and_reconcile(
        &self,
        group: &GroupId,
        desired: &MemberSet,
    ) -> Result<Option<Attachment>, ReconcileError<C::Error>> {
        debug!(group = %group, "fetching group");
        match self.client.fetch_group(group).await {
            Ok(observed) => {
                let attachment = Attachment::reconcile(observed, desired);
                debug!(
                    group = %group,
                    members = %attachment.members,
                    id = %attachment.id,
                    "reconciled group membership"
                );
                Ok(Some(attachment))
            }
            Err(err) if err.is_not_found() => {
                debug!(group = %group, "group not found in directory");
                Ok(None)
            }
            Err(source) => Err(ReconcileError::Fetch {
                group: group.clone(),
                source,
            }),
        }
    }

    /// Add all `desired` members to the group and reconcile.
    ///
    /// A failing add aborts the operation, no compensating removal is attempted. A missing group
    /// is not treated specially here.
    pub async fn create(
        &self,
        group: &GroupId,
        desired: &MemberSet,
    ) -> Result<Option<Attachment>, ReconcileError<C::Error>> {
        let diff = MembershipDiff::create(desired);
        if !diff.to_add.is_empty() {
            self.add(group, diff.to_add).await?;
        }
        self.fetch_and_reconcile(group, desired).await
    }

    /// Move the group from the `prior` declared membership to the `desired` one.
    pub async fn update(
        &self,
        group: &GroupId,
        prior: &MemberSet,
        desired: &MemberSet,
    ) -> UpdateReport<C::Error> {
        let diff = MembershipDiff::new(prior, desired);
        let mut apply_errors = Vec::new();

        if !diff.to_remove.is_empty() {
            if let Err(err) = self.remove(group, diff.to_remove).await {
                warn!(group = %group, "{err}");
                apply_errors.push(err);
            }
        }

        if !diff.to_add.is_empty() {
            if let Err(err) = self.add(group, diff.to_add).await {
                warn!(group = %group, "{err}");
                apply_errors.push(err);
            }
        }

        let refreshed = self.fetch_and_reconcile(group, desired).await;

        UpdateReport {
            apply_errors,
            refreshed,
        }
    }

    /// Remove all `current` members from the group.
    ///
    /// A group which does not exist anymore counts as successfully deleted.
    pub async fn delete(
        &self,
        group: &GroupId,
        current: &MemberSet,
    ) -> Result<(), ReconcileError<C::Error>> {
        let diff = MembershipDiff::delete(current);
        if diff.to_remove.is_empty() {
            return Ok(());
        }

        match self.remove(group, diff.to_remove).await {
            Ok(()) => Ok(()),
            Err(err) if err.remote().is_not_found() => {
                debug!(group = %group, "group already gone, nothing to remove");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn add(
        &self,
        group: &GroupId,
        members: MemberSet,
    ) -> Result<(), ReconcileError<C::Error>> {
        debug!(group = %group, members = %members, "adding members to group");
        let result = self.client.add_members(group, &members).await;
        result.map_err(|source| ReconcileError::Add {
            group: group.clone(),
            members,
            source,
        })
    }

    async fn remove(
        &self,
        group: &GroupId,
        members: MemberSet,
    ) -> Result<(), ReconcileError<C::Error>> {
        debug!(group = %group, members = %members, "removing members from group");
        let result = self.client.remove_members(group, &members).await;
        result.map_err(|source| ReconcileError::Remove {
            group: group.clone(),
            members,
            source,
        })
    }
}
