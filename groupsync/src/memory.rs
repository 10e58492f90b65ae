// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory directory for testing hosts and reconciliation logic without a remote service.
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::client::{DirectoryClient, DirectoryGroup, RemoteError};
use crate::{GroupId, MemberSet};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MemoryDirectoryError {
    #[error("group {0} not found")]
    NotFound(GroupId),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl RemoteError for MemoryDirectoryError {
    fn is_not_found(&self) -> bool {
        matches!(self, MemoryDirectoryError::NotFound(_))
    }
}

/// Kinds of calls the directory accepts, used to target injected failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
    Fetch,
    Add,
    Remove,
}

/// Journal entry of a call made against the directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DirectoryCall {
    Fetch(GroupId),
    Add(GroupId, MemberSet),
    Remove(GroupId, MemberSet),
}

impl DirectoryCall {
    pub fn kind(&self) -> CallKind {
        match self {
            DirectoryCall::Fetch(_) => CallKind::Fetch,
            DirectoryCall::Add(_, _) => CallKind::Add,
            DirectoryCall::Remove(_, _) => CallKind::Remove,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    groups: HashMap<GroupId, MemberSet>,
    failures: HashMap<CallKind, VecDeque<MemoryDirectoryError>>,
    calls: Vec<DirectoryCall>,
}

impl Inner {
    /// Record the call and hand out a queued failure for it, if any.
    fn begin(&mut self, call: DirectoryCall) -> Result<(), MemoryDirectoryError> {
        let kind = call.kind();
        self.calls.push(call);
        match self.failures.get_mut(&kind).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Directory keeping all groups in memory.
///
/// Clones share the same state, so a test can keep a handle to inspect and manipulate the
/// directory while a reconciler owns another one.
#[derive(Clone, Debug, Default)]
pub struct MemoryDirectory {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a group with the given members.
    pub async fn insert_group(&self, group: impl Into<GroupId>, members: MemberSet) {
        let mut inner = self.inner.write().await;
        inner.groups.insert(group.into(), members);
    }

    /// Delete a group, as if it was removed by someone else.
    pub async fn remove_group(&self, group: &GroupId) -> Option<MemberSet> {
        let mut inner = self.inner.write().await;
        inner.groups.remove(group)
    }

    /// Add members to an existing group without going through the client interface.
    pub async fn add_out_of_band(&self, group: &GroupId, members: &MemberSet) {
        let mut inner = self.inner.write().await;
        if let Some(current) = inner.groups.get_mut(group) {
            current.extend(members.iter().cloned());
        }
    }

    /// Members of a group, `None` if the group does not exist.
    pub async fn members(&self, group: &GroupId) -> Option<MemberSet> {
        let inner = self.inner.read().await;
        inner.groups.get(group).cloned()
    }

    /// Let the next call of the given kind fail with `err`.
    ///
    /// Failures are queued and each one is handed out exactly once.
    pub async fn fail_next(&self, kind: CallKind, err: MemoryDirectoryError) {
        let mut inner = self.inner.write().await;
        inner.failures.entry(kind).or_default().push_back(err);
    }

    /// All calls made so far, in order.
    pub async fn calls(&self) -> Vec<DirectoryCall> {
        let inner = self.inner.read().await;
        inner.calls.clone()
    }

    /// Forget the recorded calls.
    pub async fn clear_calls(&self) {
        let mut inner = self.inner.write().await;
        inner.calls.clear();
    }
}

impl DirectoryClient for MemoryDirectory {
    type Error = MemoryDirectoryError;

    async fn fetch_group(&self, group: &GroupId) -> Result<DirectoryGroup, Self::Error> {
        let mut inner = self.inner.write().await;
        inner.begin(DirectoryCall::Fetch(group.clone()))?;
        match inner.groups.get(group) {
            Some(members) => Ok(DirectoryGroup {
                id: group.clone(),
                members: members.clone(),
            }),
            None => Err(MemoryDirectoryError::NotFound(group.clone())),
        }
    }

    async fn add_members(&self, group: &GroupId, members: &MemberSet) -> Result<(), Self::Error> {
        let mut inner = self.inner.write().await;
        inner.begin(DirectoryCall::Add(group.clone(), members.clone()))?;
        let current = inner
            .groups
            .get_mut(group)
            .ok_or_else(|| MemoryDirectoryError::NotFound(group.clone()))?;
        current.extend(members.iter().cloned());
        Ok(())
    }

    async fn remove_members(
        &self,
        group: &GroupId,
        members: &MemberSet,
    ) -> Result<(), Self::Error> {
        let mut inner = self.inner.write().await;
        inner.begin(DirectoryCall::Remove(group.clone(), members.clone()))?;
        let current = inner
            .groups
            .get_mut(group)
            .ok_or_else(|| MemoryDirectoryError::NotFound(group.clone()))?;
        for member in members {
            current.remove(member);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{DirectoryClient, RemoteError};
    use crate::{GroupId, MemberSet};

    use super::{CallKind, DirectoryCall, MemoryDirectory, MemoryDirectoryError};

    #[tokio::test]
    async fn missing_group() {
        let directory = MemoryDirectory::new();
        let group = GroupId::from("grp-1");

        let err = directory.fetch_group(&group).await.unwrap_err();
        assert!(err.is_not_found());

        let err = directory
            .add_members(&group, &MemberSet::from(["u1"]))
            .await
            .unwrap_err();
        assert_eq!(err, MemoryDirectoryError::NotFound(group));
    }

    #[tokio::test]
    async fn injected_failures_are_one_shot() {
        let directory = MemoryDirectory::new();
        let group = GroupId::from("grp-1");
        directory.insert_group("grp-1", MemberSet::from(["u1"])).await;
        directory
            .fail_next(CallKind::Fetch, MemoryDirectoryError::Rejected("boom".into()))
            .await;

        let err = directory.fetch_group(&group).await.unwrap_err();
        assert!(!err.is_not_found());

        let observed = directory.fetch_group(&group).await.unwrap();
        assert_eq!(observed.members, MemberSet::from(["u1"]));
    }

    #[tokio::test]
    async fn journal_records_calls_in_order() {
        let directory = MemoryDirectory::new();
        let group = GroupId::from("grp-1");
        directory.insert_group("grp-1", MemberSet::from(["u1"])).await;

        directory
            .remove_members(&group, &MemberSet::from(["u1", "u9"]))
            .await
            .unwrap();
        directory
            .add_members(&group, &MemberSet::from(["u2"]))
            .await
            .unwrap();

        assert_eq!(
            directory.calls().await,
            vec![
                DirectoryCall::Remove(group.clone(), MemberSet::from(["u1", "u9"])),
                DirectoryCall::Add(group.clone(), MemberSet::from(["u2"])),
            ]
        );
        assert_eq!(
            directory.members(&group).await,
            Some(MemberSet::from(["u2"]))
        );

        directory.clear_calls().await;
        assert!(directory.calls().await.is_empty());
    }
}
