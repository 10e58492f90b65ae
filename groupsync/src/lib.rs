// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keep a declared group membership in sync with a remote directory service.
//!
//! An _attachment_ associates a group with a set of members. The desired members are declared
//! locally, the authoritative membership lives in a remote directory reachable through a
//! [`DirectoryClient`]. `groupsync` computes the minimal additions and removals to converge the
//! remote group towards the declaration, applies them and re-reads the group afterwards.
//!
//! The state reported back after every operation is the _effective_ membership: declared members
//! which were actually observed in the group. Members added to the group by someone else are never
//! claimed and declared members missing remotely are dropped, so a subsequent run only retries the
//! difference which is still unconverged.
//!
//! Attachments are identified by an [`AssociationId`] derived from the group and its effective
//! members. It changes whenever the membership changes.
//!
//! ```rust
//! # use groupsync::{
//! #     AttachmentLifecycle, AttachmentState, DirectoryClient, DirectoryGroup, GroupId,
//! #     MemberSet, RemoteError,
//! # };
//! #
//! # #[derive(Debug, thiserror::Error)]
//! # #[error("directory unavailable")]
//! # struct Unavailable;
//! #
//! # impl RemoteError for Unavailable {
//! #     fn is_not_found(&self) -> bool {
//! #         false
//! #     }
//! # }
//! #
//! # struct HttpDirectory;
//! #
//! # impl DirectoryClient for HttpDirectory {
//! #     type Error = Unavailable;
//! #
//! #     async fn fetch_group(&self, group: &GroupId) -> Result<DirectoryGroup, Unavailable> {
//! #         Ok(DirectoryGroup {
//! #             id: group.clone(),
//! #             members: MemberSet::from(["usr-1", "usr-2", "usr-3"]),
//! #         })
//! #     }
//! #
//! #     async fn add_members(&self, _: &GroupId, _: &MemberSet) -> Result<(), Unavailable> {
//! #         Ok(())
//! #     }
//! #
//! #     async fn remove_members(&self, _: &GroupId, _: &MemberSet) -> Result<(), Unavailable> {
//! #         Ok(())
//! #     }
//! # }
//! #
//! # async fn run() {
//! // The client carries its own credentials and endpoint and is handed to the lifecycle.
//! let lifecycle = AttachmentLifecycle::new(HttpDirectory);
//!
//! let mut state = AttachmentState::new("grp-1", MemberSet::from(["usr-1", "usr-2"]));
//! let diagnostics = lifecycle.create(&mut state).await;
//! assert!(!diagnostics.has_errors());
//!
//! // Only declared members are claimed, even if the group has more.
//! assert_eq!(state.users, MemberSet::from(["usr-1", "usr-2"]));
//! assert!(state.id.is_some());
//! # }
//! ```
pub mod client;
mod diff;
mod identity;
mod ids;
pub mod lifecycle;
mod member_set;
#[cfg(any(test, feature = "test_utils"))]
pub mod memory;
pub mod reconcile;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use client::{DirectoryClient, DirectoryGroup, RemoteError};
pub use diff::MembershipDiff;
pub use ids::{AssociationId, GroupId, MemberId};
pub use lifecycle::{AttachmentLifecycle, AttachmentState, Diagnostic, Diagnostics, Severity};
pub use member_set::MemberSet;
pub use reconcile::{Attachment, ReconcileError, Reconciler, UpdateReport};
