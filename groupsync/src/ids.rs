// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifiers for groups and their members as handed out by the remote directory.
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Opaque identifier of a group in the remote directory.
    ///
    /// A group reference is part of an association's identity: changing it means the association
    /// has to be recreated rather than updated.
    GroupId
);

string_id!(
    /// Opaque identifier of a member entity (for example a user) in the remote directory.
    MemberId
);

/// Identifier of a group-to-members association.
///
/// It is derived from the group and the currently effective member set (see
/// [`AssociationId::derive`](crate::AssociationId::derive)) and changes whenever the membership
/// changes. It is not a permanent key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssociationId(pub(crate) String);

impl AssociationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssociationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
