// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interface towards the remote directory service holding the authoritative group memberships.
use std::error::Error;
use std::future::Future;

use crate::{GroupId, MemberSet};

/// A group as currently observed in the remote directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryGroup {
    pub id: GroupId,
    pub members: MemberSet,
}

/// Errors returned by a [`DirectoryClient`].
///
/// The directory signals a missing group in a way only the client implementation understands (an
/// HTTP 404, a typed error code, etc.). Reconciliation treats those as an expected outcome and
/// every other failure as fatal for the operation in progress.
pub trait RemoteError: Error + Send + Sync + 'static {
    /// Returns `true` if the addressed group does not exist (anymore) in the directory.
    fn is_not_found(&self) -> bool;
}

/// Network operations on the group memberships of a remote directory.
///
/// Credentials, base URLs, timeouts and retries are the concern of the implementation, which is
/// constructed by the caller and handed to the [`Reconciler`](crate::Reconciler).
pub trait DirectoryClient: Send + Sync + 'static {
    type Error: RemoteError;

    /// Fetch a group together with all of its current members.
    fn fetch_group(
        &self,
        group: &GroupId,
    ) -> impl Future<Output = Result<DirectoryGroup, Self::Error>> + Send;

    /// Add the given members to a group.
    fn add_members(
        &self,
        group: &GroupId,
        members: &MemberSet,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Remove the given members from a group.
    fn remove_members(
        &self,
        group: &GroupId,
        members: &MemberSet,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
