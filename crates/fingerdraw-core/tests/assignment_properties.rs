//! Property tests for outcome assignment and reveal planning.

use std::collections::HashSet;

use fingerdraw_core::assign::{self, Outcome};
use fingerdraw_core::reveal::{plan, Surface};
use fingerdraw_core::{ColorPolicy, ContactId, ContactRegistry, Mode};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;

fn ids(n: u32) -> Vec<ContactId> {
    (0..n).map(ContactId).collect()
}

proptest! {
    #[test]
    fn ranking_is_a_permutation(n in 1u32..40, seed in any::<u64>()) {
        let contacts = ids(n);
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        let order = assign::rank(&contacts, &mut rng).unwrap();
        prop_assert_eq!(order.len(), contacts.len());
        let seen: HashSet<_> = order.iter().copied().collect();
        prop_assert_eq!(seen, contacts.iter().copied().collect::<HashSet<_>>());
    }

    #[test]
    fn winner_is_always_a_participant(n in 1u32..40, seed in any::<u64>()) {
        let contacts = ids(n);
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        let winner = assign::pick_winner(&contacts, &mut rng).unwrap();
        prop_assert!(contacts.contains(&winner));
    }

    #[test]
    fn team_sizes_differ_by_at_most_one(n in 1u32..40, k in 0u8..8, seed in any::<u64>()) {
        let contacts = ids(n);
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        let (teams, reveal_order) = assign::partition(&contacts, k, &mut rng).unwrap();

        let expected_k = usize::from(k.clamp(2, 4));
        prop_assert_eq!(teams.len(), expected_k);

        let sizes: Vec<usize> = teams.iter().map(|t| t.members.len()).collect();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert_eq!(sizes.iter().sum::<usize>(), contacts.len());

        let members: HashSet<_> = teams.iter().flat_map(|t| t.members.iter().copied()).collect();
        prop_assert_eq!(members.len(), contacts.len());

        let colors: HashSet<_> = teams.iter().map(|t| t.color).collect();
        prop_assert_eq!(colors.len(), teams.len());

        let mut order = reveal_order.clone();
        order.sort_unstable();
        prop_assert_eq!(order, (0..expected_k).collect::<Vec<_>>());
    }

    #[test]
    fn team_plan_skips_empty_teams(n in 1u32..12, k in 2u8..=4, seed in any::<u64>()) {
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        let mut registry = ContactRegistry::new(ColorPolicy::Neutral);
        for id in 0..n {
            registry.add(ContactId(id), id as f32 * 10.0, 5.0, &mut rng);
        }
        let outcome = assign::assign(Mode::teams(k), &registry.ids(), &mut rng).unwrap();
        let units = plan(&outcome, &registry, &Surface::default(), 150.0);

        let non_empty = match &outcome {
            Outcome::Teams { teams, .. } => teams.iter().filter(|t| !t.members.is_empty()).count(),
            other => panic!("Expected Teams, got {other:?}"),
        };
        prop_assert_eq!(units.len(), non_empty);
        prop_assert!(units.iter().all(|u| !u.members().is_empty()));
    }
}

#[test]
fn empty_contact_set_assigns_nothing() {
    let mut rng = Mcg128Xsl64::seed_from_u64(0);
    assert!(assign::assign(Mode::SinglePick, &[], &mut rng).is_none());
    assert!(assign::assign(Mode::Ordering, &[], &mut rng).is_none());
    assert!(assign::assign(Mode::teams(3), &[], &mut rng).is_none());
}
