// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{AssociationId, GroupId, MemberId, MemberSet};

/// Stable 64-bit hash of a single member identifier.
fn member_hash(member: &MemberId) -> u64 {
    let digest = blake3::hash(member.as_str().as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

impl AssociationId {
    /// Derive the identifier of the association between `group` and `members`.
    ///
    /// Per-member hashes are combined with wrapping addition, so the result does not depend on
    /// the order in which members were collected. The identifier has the shape
    /// `<group>-<decimal hash>`; an empty member set yields `<group>-0`.
    pub fn derive(group: &GroupId, members: &MemberSet) -> Self {
        let sum = members
            .iter()
            .fold(0u64, |acc, member| acc.wrapping_add(member_hash(member)));
        Self(format!("{group}-{sum}"))
    }
}

#[cfg(test)]
mod tests {
    use crate::{AssociationId, GroupId, MemberId, MemberSet};

    #[test]
    fn independent_of_insertion_order() {
        let group = GroupId::from("grp-1");
        let orders = [
            ["u1", "u2", "u3"],
            ["u3", "u1", "u2"],
            ["u2", "u3", "u1"],
            ["u3", "u2", "u1"],
        ];

        let mut ids = orders.iter().map(|order| {
            let mut members = MemberSet::new();
            for member in order {
                members.insert(MemberId::from(*member));
            }
            AssociationId::derive(&group, &members)
        });

        let first = ids.next().unwrap();
        assert!(ids.all(|id| id == first));
    }

    #[test]
    fn changes_with_member_set() {
        let group = GroupId::from("grp-1");
        let sets = [
            MemberSet::new(),
            MemberSet::from(["u1"]),
            MemberSet::from(["u2"]),
            MemberSet::from(["u1", "u2"]),
            MemberSet::from(["u1", "u3"]),
            MemberSet::from(["u1", "u2", "u3"]),
        ];

        for (i, left) in sets.iter().enumerate() {
            for right in sets.iter().skip(i + 1) {
                assert_ne!(
                    AssociationId::derive(&group, left),
                    AssociationId::derive(&group, right),
                    "{left} and {right} should not share an id"
                );
            }
        }
    }

    #[test]
    fn prefixed_with_group() {
        let id = AssociationId::derive(&GroupId::from("grp-7"), &MemberSet::from(["u1"]));
        assert!(id.as_str().starts_with("grp-7-"));

        let other = AssociationId::derive(&GroupId::from("grp-8"), &MemberSet::from(["u1"]));
        assert_ne!(id, other);
    }

    #[test]
    fn empty_member_set() {
        let id = AssociationId::derive(&GroupId::from("grp-1"), &MemberSet::new());
        assert_eq!(id.as_str(), "grp-1-0");
    }
}
