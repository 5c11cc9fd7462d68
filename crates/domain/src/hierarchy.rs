//! Ancestry resolution over the organization tree.
//!
//! Paths are derived from the current parent pointers on every call and are
//! represented as ordered id lists. Membership checks compare ids, so node
//! `1` is never confused with node `21`.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use warden_core::{AppError, AppResult};

use crate::{Organization, OrganizationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TreeLink {
    parent_id: Option<OrganizationId>,
    sequence: u32,
}

/// Snapshot of parent pointers keyed by organization id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationTree {
    links: HashMap<OrganizationId, TreeLink>,
}

impl OrganizationTree {
    /// Builds a tree snapshot from `(id, parent_id, sequence)` triples.
    #[must_use]
    pub fn from_links(
        links: impl IntoIterator<Item = (OrganizationId, Option<OrganizationId>, u32)>,
    ) -> Self {
        Self {
            links: links
                .into_iter()
                .map(|(id, parent_id, sequence)| (id, TreeLink { parent_id, sequence }))
                .collect(),
        }
    }

    /// Builds a tree snapshot from loaded organizations.
    #[must_use]
    pub fn from_organizations(organizations: &[Organization]) -> Self {
        Self::from_links(
            organizations
                .iter()
                .map(|organization| {
                    (
                        organization.id(),
                        organization.parent_id(),
                        organization.sequence(),
                    )
                }),
        )
    }

    /// Returns whether the snapshot contains `node_id`.
    #[must_use]
    pub fn contains(&self, node_id: OrganizationId) -> bool {
        self.links.contains_key(&node_id)
    }

    /// Returns the ancestors of `node_id`, root first, excluding the node.
    ///
    /// A parent pointer to an id missing from the snapshot ends the chain.
    /// A loop in the stored pointers fails with `CycleDetected`.
    pub fn resolve_ancestor_chain(&self, node_id: OrganizationId) -> AppResult<Vec<OrganizationId>> {
        let mut current = self
            .links
            .get(&node_id)
            .ok_or_else(|| AppError::NotFound(format!("organization '{node_id}' was not found")))?
            .parent_id;

        let mut visited = HashSet::from([node_id]);
        let mut chain = Vec::new();

        while let Some(parent_id) = current {
            let Some(link) = self.links.get(&parent_id) else {
                break;
            };

            if !visited.insert(parent_id) {
                return Err(AppError::CycleDetected(format!(
                    "organization '{node_id}' has a looping ancestry through '{parent_id}'"
                )));
            }

            chain.push(parent_id);
            current = link.parent_id;
        }

        chain.reverse();
        Ok(chain)
    }

    /// Returns whether `ancestor_id` appears in the ancestor chain of `node_id`.
    pub fn is_descendant_of(
        &self,
        node_id: OrganizationId,
        ancestor_id: OrganizationId,
    ) -> AppResult<bool> {
        Ok(self.resolve_ancestor_chain(node_id)?.contains(&ancestor_id))
    }

    /// Returns every node below `node_id`, deepest first.
    ///
    /// Siblings at the same depth are ordered by id, so deleting in the
    /// returned order always removes leaves before their ancestors.
    pub fn find_descendants(&self, node_id: OrganizationId) -> AppResult<Vec<OrganizationId>> {
        if !self.contains(node_id) {
            return Err(AppError::NotFound(format!(
                "organization '{node_id}' was not found"
            )));
        }

        let mut descendants = Vec::new();
        for candidate in self.links.keys().copied() {
            if candidate == node_id {
                continue;
            }

            let chain = self.resolve_ancestor_chain(candidate)?;
            if chain.contains(&node_id) {
                descendants.push((chain.len(), candidate));
            }
        }

        descendants.sort_by_key(|(depth, id)| (Reverse(*depth), *id));
        Ok(descendants.into_iter().map(|(_, id)| id).collect())
    }

    /// Returns whether pointing `node_id` at `new_parent_id` would close a loop.
    pub fn would_create_cycle(
        &self,
        node_id: OrganizationId,
        new_parent_id: OrganizationId,
    ) -> AppResult<bool> {
        if node_id == new_parent_id {
            return Ok(true);
        }

        self.is_descendant_of(new_parent_id, node_id)
    }

    /// Returns the children of `parent_id` ordered by `(sequence, id)`.
    #[must_use]
    pub fn children_of(&self, parent_id: Option<OrganizationId>) -> Vec<OrganizationId> {
        let mut children: Vec<(u32, OrganizationId)> = self
            .links
            .iter()
            .filter(|(_, link)| link.parent_id == parent_id)
            .map(|(id, link)| (link.sequence, *id))
            .collect();
        children.sort();
        children.into_iter().map(|(_, id)| id).collect()
    }

    /// Computes new sibling positions for `parent_id`.
    ///
    /// `ordered_ids` receive `0..n` in the given order. Siblings left out keep
    /// their previous relative order and are placed after the reordered set.
    /// Every returned sibling is paired with its new sequence.
    pub fn resequence(
        &self,
        parent_id: Option<OrganizationId>,
        ordered_ids: &[OrganizationId],
    ) -> AppResult<Vec<(OrganizationId, u32)>> {
        let siblings = self.children_of(parent_id);
        let sibling_set: HashSet<OrganizationId> = siblings.iter().copied().collect();

        let mut placed = HashSet::new();
        let mut order = Vec::with_capacity(siblings.len());
        for id in ordered_ids {
            if !sibling_set.contains(id) {
                return Err(AppError::Validation(format!(
                    "organization '{id}' is not a child of {}",
                    describe_parent(parent_id)
                )));
            }
            if placed.insert(*id) {
                order.push(*id);
            }
        }

        order.extend(siblings.into_iter().filter(|id| !placed.contains(id)));

        order
            .into_iter()
            .enumerate()
            .map(|(position, id)| {
                u32::try_from(position)
                    .map(|sequence| (id, sequence))
                    .map_err(|_| AppError::Validation("too many siblings".to_owned()))
            })
            .collect()
    }

    /// Returns the display path of `node_id`: the ancestor chain plus the node
    /// itself, each element keyed by `(sequence, id)`.
    pub fn path_key(&self, node_id: OrganizationId) -> AppResult<Vec<(u32, OrganizationId)>> {
        let mut chain = self.resolve_ancestor_chain(node_id)?;
        chain.push(node_id);

        Ok(chain
            .into_iter()
            .map(|id| {
                let sequence = self.links.get(&id).map_or(0, |link| link.sequence);
                (sequence, id)
            })
            .collect())
    }

    /// Sorts organizations root-to-leaf, lexicographically on their paths.
    ///
    /// Every parent precedes its children, and siblings follow their sequence.
    pub fn sort_by_path(organizations: Vec<Organization>) -> AppResult<Vec<Organization>> {
        let tree = Self::from_organizations(&organizations);

        let mut keyed = organizations
            .into_iter()
            .map(|organization| {
                tree.path_key(organization.id())
                    .map(|key| (key, organization))
            })
            .collect::<AppResult<Vec<_>>>()?;
        keyed.sort_by(|(left, _), (right, _)| left.cmp(right));

        Ok(keyed.into_iter().map(|(_, organization)| organization).collect())
    }
}

fn describe_parent(parent_id: Option<OrganizationId>) -> String {
    parent_id.map_or_else(
        || "the root level".to_owned(),
        |id| format!("organization '{id}'"),
    )
}

#[cfg(test)]
mod tests;
