use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::{ActorIdentity, AppResult, NonEmptyString};

use crate::{AuditStamp, MemberId, OrganizationId, Role};

/// Node of the organization tree.
///
/// The ancestry of a node is never stored here; see
/// [`OrganizationTree`](crate::OrganizationTree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    id: OrganizationId,
    name: NonEmptyString,
    parent_id: Option<OrganizationId>,
    sequence: u32,
    roles: Vec<Role>,
    member_ids: Vec<MemberId>,
    audit: AuditStamp,
}

impl Organization {
    /// Creates a validated organization without roles or members.
    pub fn new(
        id: OrganizationId,
        name: impl Into<String>,
        parent_id: Option<OrganizationId>,
        sequence: u32,
        audit: AuditStamp,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::new(name)?,
            parent_id,
            sequence,
            roles: Vec::new(),
            member_ids: Vec::new(),
            audit,
        })
    }

    /// Attaches resolved roles, keeping the first occurrence of each id.
    #[must_use]
    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = dedup_roles(roles);
        self
    }

    /// Attaches member ids, keeping the first occurrence of each id.
    #[must_use]
    pub fn with_members(mut self, member_ids: Vec<MemberId>) -> Self {
        self.member_ids = dedup_members(member_ids);
        self
    }

    /// Returns the organization identifier.
    #[must_use]
    pub fn id(&self) -> OrganizationId {
        self.id
    }

    /// Returns the organization name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the parent node, `None` for roots.
    #[must_use]
    pub fn parent_id(&self) -> Option<OrganizationId> {
        self.parent_id
    }

    /// Returns the zero-based position among siblings.
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns assigned roles in stored order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns assigned member ids in stored order.
    #[must_use]
    pub fn member_ids(&self) -> &[MemberId] {
        &self.member_ids
    }

    /// Returns whether `member_id` belongs to this organization.
    #[must_use]
    pub fn has_member(&self, member_id: MemberId) -> bool {
        self.member_ids.contains(&member_id)
    }

    /// Returns the audit stamp.
    #[must_use]
    pub fn audit(&self) -> &AuditStamp {
        &self.audit
    }

    /// Renames the node. Descendants are unaffected.
    pub fn rename(
        &mut self,
        actor: &ActorIdentity,
        name: impl Into<String>,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        self.name = NonEmptyString::new(name)?;
        self.audit.touch(actor, at);
        Ok(())
    }

    /// Points the node at a new parent.
    ///
    /// Acyclicity must be checked by the caller against the full tree.
    pub fn reparent(
        &mut self,
        actor: &ActorIdentity,
        parent_id: Option<OrganizationId>,
        sequence: u32,
        at: DateTime<Utc>,
    ) {
        self.parent_id = parent_id;
        self.sequence = sequence;
        self.audit.touch(actor, at);
    }

    /// Sets the sibling position.
    pub fn set_sequence(&mut self, actor: &ActorIdentity, sequence: u32, at: DateTime<Utc>) {
        self.sequence = sequence;
        self.audit.touch(actor, at);
    }

    /// Replaces the whole role set.
    pub fn assign_roles(&mut self, actor: &ActorIdentity, roles: Vec<Role>, at: DateTime<Utc>) {
        self.roles = dedup_roles(roles);
        self.audit.touch(actor, at);
    }

    /// Replaces the whole member set.
    pub fn assign_members(
        &mut self,
        actor: &ActorIdentity,
        member_ids: Vec<MemberId>,
        at: DateTime<Utc>,
    ) {
        self.member_ids = dedup_members(member_ids);
        self.audit.touch(actor, at);
    }
}

fn dedup_roles(roles: Vec<Role>) -> Vec<Role> {
    let mut seen = HashSet::new();
    roles.into_iter().filter(|role| seen.insert(role.id())).collect()
}

fn dedup_members(member_ids: Vec<MemberId>) -> Vec<MemberId> {
    let mut seen = HashSet::new();
    member_ids
        .into_iter()
        .filter(|member_id| seen.insert(*member_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use warden_core::ActorIdentity;

    use super::Organization;
    use crate::{AuditStamp, MemberId, OrganizationId};

    fn organization() -> Organization {
        Organization::new(
            OrganizationId::new(1),
            "Head Office",
            None,
            0,
            AuditStamp::created(&ActorIdentity::system(), Utc::now()),
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn organization_requires_name() {
        let result = Organization::new(
            OrganizationId::new(1),
            " ",
            None,
            0,
            AuditStamp::created(&ActorIdentity::system(), Utc::now()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn assign_members_replaces_previous_set() {
        let actor = ActorIdentity::new("7", "Admin");
        let mut node = organization().with_members(vec![MemberId::new(1), MemberId::new(2)]);

        node.assign_members(
            &actor,
            vec![MemberId::new(3), MemberId::new(3), MemberId::new(2)],
            Utc::now(),
        );

        assert_eq!(node.member_ids(), &[MemberId::new(3), MemberId::new(2)]);
        assert!(!node.has_member(MemberId::new(1)));
        assert_eq!(node.audit().updated_by(), "7");
    }
}
