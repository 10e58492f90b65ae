// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::MemberSet;

/// Members which need to be added to or removed from a group to move from one declared membership
/// to another.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub to_add: MemberSet,
    pub to_remove: MemberSet,
}

impl MembershipDiff {
    /// Compute the changes needed to turn `prior` into `desired`.
    pub fn new(prior: &MemberSet, desired: &MemberSet) -> Self {
        Self {
            to_add: desired.difference(prior),
            to_remove: prior.difference(desired),
        }
    }

    /// Changes for a freshly created association: every desired member gets added.
    pub fn create(desired: &MemberSet) -> Self {
        Self {
            to_add: desired.clone(),
            to_remove: MemberSet::new(),
        }
    }

    /// Changes for tearing an association down: every declared member gets removed.
    pub fn delete(current: &MemberSet) -> Self {
        Self {
            to_add: MemberSet::new(),
            to_remove: current.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::MemberSet;

    use super::MembershipDiff;

    fn sets() -> Vec<MemberSet> {
        vec![
            MemberSet::new(),
            MemberSet::from(["u1"]),
            MemberSet::from(["u1", "u2"]),
            MemberSet::from(["u2", "u3"]),
            MemberSet::from(["u1", "u2", "u3"]),
            MemberSet::from(["u4"]),
        ]
    }

    #[test]
    fn diff_converges_prior_to_desired() {
        for prior in sets() {
            for desired in sets() {
                let diff = MembershipDiff::new(&prior, &desired);

                assert!(diff.to_add.intersection(&prior).is_empty());
                assert!(diff.to_remove.is_subset(&prior));
                assert_eq!(
                    prior.difference(&diff.to_remove).union(&diff.to_add),
                    desired,
                    "applying diff of {prior} -> {desired}"
                );
            }
        }
    }

    #[test]
    fn equal_sets_produce_empty_diff() {
        for set in sets() {
            assert!(MembershipDiff::new(&set, &set).is_empty());
        }
    }

    #[test]
    fn overlapping_sets() {
        let diff = MembershipDiff::new(
            &MemberSet::from(["u1", "u2"]),
            &MemberSet::from(["u2", "u3"]),
        );
        assert_eq!(diff.to_add, MemberSet::from(["u3"]));
        assert_eq!(diff.to_remove, MemberSet::from(["u1"]));
        assert!(!diff.is_empty());
    }

    #[test]
    fn create_and_delete_paths() {
        let members = MemberSet::from(["u1", "u2"]);

        let create = MembershipDiff::create(&members);
        assert_eq!(create, MembershipDiff::new(&MemberSet::new(), &members));

        let delete = MembershipDiff::delete(&members);
        assert_eq!(delete, MembershipDiff::new(&members, &MemberSet::new()));
    }
}
