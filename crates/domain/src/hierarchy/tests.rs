use chrono::Utc;
use proptest::prelude::*;
use warden_core::{ActorIdentity, AppError};

use super::OrganizationTree;
use crate::{AuditStamp, Organization, OrganizationId};

fn id(value: u64) -> OrganizationId {
    OrganizationId::new(value)
}

fn tree(links: &[(u64, Option<u64>, u32)]) -> OrganizationTree {
    OrganizationTree::from_links(
        links
            .iter()
            .map(|(node, parent, sequence)| (id(*node), parent.map(id), *sequence)),
    )
}

fn organization(node: u64, parent: Option<u64>, sequence: u32) -> Organization {
    Organization::new(
        id(node),
        format!("Org {node}"),
        parent.map(id),
        sequence,
        AuditStamp::created(&ActorIdentity::system(), Utc::now()),
    )
    .unwrap_or_else(|_| unreachable!())
}

#[test]
fn ancestor_chain_is_root_first_and_excludes_node() {
    let tree = tree(&[(1, None, 0), (2, Some(1), 0), (3, Some(2), 0), (4, Some(3), 0)]);

    let chain = tree.resolve_ancestor_chain(id(4));
    assert_eq!(chain.ok(), Some(vec![id(1), id(2), id(3)]));

    let root_chain = tree.resolve_ancestor_chain(id(1));
    assert_eq!(root_chain.ok(), Some(Vec::new()));
}

#[test]
fn numeric_substring_ids_are_not_conflated() {
    let tree = tree(&[(2, None, 0), (21, Some(2), 0), (210, Some(21), 0), (1, None, 1)]);

    assert_eq!(tree.is_descendant_of(id(210), id(1)).ok(), Some(false));
    assert_eq!(tree.is_descendant_of(id(210), id(21)).ok(), Some(true));
    assert_eq!(tree.find_descendants(id(1)).ok(), Some(Vec::new()));
    assert_eq!(tree.find_descendants(id(2)).ok(), Some(vec![id(210), id(21)]));
}

#[test]
fn descendants_are_returned_leaves_first() {
    let tree = tree(&[
        (1, None, 0),
        (2, Some(1), 0),
        (3, Some(2), 0),
        (4, Some(1), 1),
        (5, Some(4), 0),
        (6, Some(5), 0),
    ]);

    let descendants = tree.find_descendants(id(1)).unwrap_or_default();
    assert_eq!(descendants, vec![id(6), id(3), id(5), id(2), id(4)]);
}

#[test]
fn looping_parent_pointers_are_reported() {
    let tree = tree(&[(1, Some(3), 0), (2, Some(1), 0), (3, Some(2), 0)]);

    let result = tree.resolve_ancestor_chain(id(2));
    assert!(matches!(result, Err(AppError::CycleDetected(_))));
}

#[test]
fn dangling_parent_ends_the_chain() {
    let tree = tree(&[(5, Some(99), 0), (6, Some(5), 0)]);

    assert_eq!(tree.resolve_ancestor_chain(id(6)).ok(), Some(vec![id(5)]));
}

#[test]
fn unknown_node_is_not_found() {
    let tree = tree(&[(1, None, 0)]);

    assert!(matches!(
        tree.resolve_ancestor_chain(id(2)),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        tree.find_descendants(id(2)),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn moving_under_own_descendant_is_a_cycle() {
    let tree = tree(&[(1, None, 0), (2, Some(1), 0), (3, Some(2), 0), (4, None, 1)]);

    assert_eq!(tree.would_create_cycle(id(1), id(3)).ok(), Some(true));
    assert_eq!(tree.would_create_cycle(id(2), id(2)).ok(), Some(true));
    assert_eq!(tree.would_create_cycle(id(3), id(1)).ok(), Some(false));
    assert_eq!(tree.would_create_cycle(id(1), id(4)).ok(), Some(false));
}

#[test]
fn resequence_appends_omitted_siblings_in_prior_order() {
    let tree = tree(&[
        (1, None, 0),
        (10, Some(1), 0),
        (11, Some(1), 1),
        (12, Some(1), 2),
        (13, Some(1), 3),
    ]);

    let assignments = tree.resequence(Some(id(1)), &[id(12), id(10)]);
    assert_eq!(
        assignments.ok(),
        Some(vec![(id(12), 0), (id(10), 1), (id(11), 2), (id(13), 3)])
    );
}

#[test]
fn resequence_rejects_non_siblings() {
    let tree = tree(&[(1, None, 0), (2, Some(1), 0), (3, None, 1)]);

    let result = tree.resequence(Some(id(1)), &[id(3)]);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn sort_by_path_nests_children_under_parents() {
    let organizations = vec![
        organization(3, Some(1), 1),
        organization(9, None, 1),
        organization(2, Some(1), 0),
        organization(4, Some(2), 0),
        organization(1, None, 0),
    ];

    let sorted = OrganizationTree::sort_by_path(organizations).unwrap_or_default();
    let ids: Vec<u64> = sorted.iter().map(|node| node.id().get()).collect();
    assert_eq!(ids, vec![1, 2, 4, 3, 9]);
}

fn forest_strategy() -> impl Strategy<Value = Vec<(u64, Option<u64>)>> {
    prop::collection::vec(any::<prop::sample::Index>(), 1..40).prop_map(|choices| {
        choices
            .into_iter()
            .enumerate()
            .map(|(position, choice)| {
                let node = position as u64 + 1;
                let parent = if position == 0 || choice.index(4) == 0 {
                    None
                } else {
                    Some(choice.index(position) as u64 + 1)
                };
                (node, parent)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn descendant_relation_matches_ancestor_chains(forest in forest_strategy()) {
        let tree = OrganizationTree::from_links(
            forest.iter().map(|(node, parent)| (id(*node), parent.map(id), 0)),
        );

        for (ancestor, _) in &forest {
            let descendants = tree.find_descendants(id(*ancestor)).unwrap_or_default();
            for (candidate, _) in &forest {
                let chain = tree.resolve_ancestor_chain(id(*candidate)).unwrap_or_default();
                prop_assert_eq!(
                    descendants.contains(&id(*candidate)),
                    chain.contains(&id(*ancestor))
                );
            }
        }
    }

    #[test]
    fn descendants_never_precede_their_own_descendants(forest in forest_strategy()) {
        let tree = OrganizationTree::from_links(
            forest.iter().map(|(node, parent)| (id(*node), parent.map(id), 0)),
        );

        for (root, _) in &forest {
            let order = tree.find_descendants(id(*root)).unwrap_or_default();
            for (position, node) in order.iter().enumerate() {
                for later in &order[position + 1..] {
                    prop_assert!(!tree.is_descendant_of(*later, *node).unwrap_or(true));
                }
            }
        }
    }
}
