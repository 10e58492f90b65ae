// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::BTreeSet;
use std::collections::btree_set;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::MemberId;

/// Unordered, deduplicated set of member identifiers.
///
/// Equality is by identifier value only. Iteration is sorted so that remote calls, logs and
/// derived identifiers see the same sequence regardless of how the set was built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberSet(BTreeSet<MemberId>);

impl MemberSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Returns `true` if the member was not yet part of the set.
    pub fn insert(&mut self, member: impl Into<MemberId>) -> bool {
        self.0.insert(member.into())
    }

    /// Returns `true` if the member was part of the set.
    pub fn remove(&mut self, member: &MemberId) -> bool {
        self.0.remove(member)
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.0.contains(member)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, MemberId> {
        self.0.iter()
    }

    /// Members of `self` which are not in `other`.
    pub fn difference(&self, other: &MemberSet) -> MemberSet {
        self.0.difference(&other.0).cloned().collect()
    }

    /// Members present in both sets.
    pub fn intersection(&self, other: &MemberSet) -> MemberSet {
        self.0.intersection(&other.0).cloned().collect()
    }

    pub fn union(&self, other: &MemberSet) -> MemberSet {
        self.0.union(&other.0).cloned().collect()
    }

    pub fn is_subset(&self, other: &MemberSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn to_vec(&self) -> Vec<MemberId> {
        self.0.iter().cloned().collect()
    }
}

impl FromIterator<MemberId> for MemberSet {
    fn from_iter<T: IntoIterator<Item = MemberId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for MemberSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        Self(iter.into_iter().map(MemberId::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for MemberSet {
    fn from(members: [&str; N]) -> Self {
        members.into_iter().collect()
    }
}

impl Extend<MemberId> for MemberSet {
    fn extend<T: IntoIterator<Item = MemberId>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl IntoIterator for MemberSet {
    type Item = MemberId;
    type IntoIter = btree_set::IntoIter<MemberId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MemberSet {
    type Item = &'a MemberId;
    type IntoIter = btree_set::Iter<'a, MemberId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for MemberSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, member) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{member}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use crate::MemberId;

    use super::MemberSet;

    #[test]
    fn deduplicates_members() {
        let members: MemberSet = ["u1", "u2", "u1"].into_iter().collect();
        assert_eq!(members.len(), 2);
        assert_eq!(members, MemberSet::from(["u2", "u1"]));
    }

    #[test]
    fn set_operations() {
        let left = MemberSet::from(["u1", "u2", "u3"]);
        let right = MemberSet::from(["u2", "u3", "u4"]);

        assert_eq!(left.difference(&right), MemberSet::from(["u1"]));
        assert_eq!(right.difference(&left), MemberSet::from(["u4"]));
        assert_eq!(left.intersection(&right), MemberSet::from(["u2", "u3"]));
        assert_eq!(left.union(&right).len(), 4);
        assert!(left.intersection(&right).is_subset(&left));
        assert!(!left.is_subset(&right));
    }

    #[test]
    fn sorted_iteration_and_display() {
        let mut members = MemberSet::new();
        members.insert("u3");
        members.insert("u1");
        assert!(!members.insert("u3"));

        assert_eq!(
            members.to_vec(),
            vec![MemberId::from("u1"), MemberId::from("u3")]
        );
        assert_eq!(members.to_string(), "[u1, u3]");
        assert_eq!(MemberSet::new().to_string(), "[]");
    }

    #[test]
    fn insert_and_remove() {
        let mut members = MemberSet::from(["u1", "u2"]);
        let u1 = MemberId::from("u1");

        assert!(members.contains(&u1));
        assert!(members.remove(&u1));
        assert!(!members.remove(&u1));
        assert!(!members.contains(&u1));
        assert_eq!(members, MemberSet::from(["u2"]));
    }

    #[test]
    fn deserialize_drops_duplicates() {
        let members: MemberSet = serde_json::from_str(r#"["u2", "u1", "u2"]"#).unwrap();
        assert_eq!(members, MemberSet::from(["u1", "u2"]));
        assert_eq!(serde_json::to_string(&members).unwrap(), r#"["u1","u2"]"#);
    }
}
