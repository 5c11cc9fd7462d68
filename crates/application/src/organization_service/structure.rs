use super::*;

impl OrganizationService {
    /// Creates a node under `parent_id`, or a root when `None`.
    ///
    /// The node is placed after its existing siblings.
    pub async fn create_organization(
        &self,
        actor: &ActorIdentity,
        parent_id: Option<OrganizationId>,
        name: impl Into<String>,
    ) -> AppResult<Organization> {
        let name = NonEmptyString::new(name)?;
        let (_, tree) = self.load_tree().await?;

        if let Some(parent_id) = parent_id
            && !tree.contains(parent_id)
        {
            return Err(not_found(parent_id));
        }

        let sequence = sibling_count(&tree, parent_id)?;
        let organization = self
            .organizations
            .create_organization(NewOrganization {
                name,
                parent_id,
                sequence,
                audit: AuditStamp::created(actor, Utc::now()),
            })
            .await?;

        info!(
            organization_id = %organization.id(),
            parent_id = ?parent_id,
            sequence,
            actor = actor.subject(),
            "organization created"
        );
        Ok(organization)
    }

    /// Moves a node and its subtree under `new_parent_id`.
    ///
    /// The moved node is placed after its new siblings and the siblings it
    /// leaves behind are renumbered without gaps. Rejected moves leave the
    /// tree unchanged.
    pub async fn move_organization(
        &self,
        actor: &ActorIdentity,
        organization_id: OrganizationId,
        new_parent_id: Option<OrganizationId>,
    ) -> AppResult<Organization> {
        let (mut organizations, tree) = self.load_tree().await?;

        let Some(current) = organizations
            .iter()
            .find(|organization| organization.id() == organization_id)
        else {
            return Err(not_found(organization_id));
        };
        let old_parent_id = current.parent_id();

        if let Some(new_parent_id) = new_parent_id {
            if !tree.contains(new_parent_id) {
                return Err(not_found(new_parent_id));
            }
            if tree.would_create_cycle(organization_id, new_parent_id)? {
                warn!(
                    organization_id = %organization_id,
                    new_parent_id = %new_parent_id,
                    actor = actor.subject(),
                    "rejected organization move that would create a cycle"
                );
                return Err(AppError::CycleDetected(format!(
                    "organization '{new_parent_id}' is '{organization_id}' or one of its descendants"
                )));
            }
        }

        if old_parent_id == new_parent_id {
            return Ok(current.clone());
        }

        let now = Utc::now();
        let new_sequence = sibling_count(&tree, new_parent_id)?;
        let remaining: Vec<OrganizationId> = tree
            .children_of(old_parent_id)
            .into_iter()
            .filter(|id| *id != organization_id)
            .collect();

        let mut changed = Vec::new();
        for organization in &mut organizations {
            if organization.id() == organization_id {
                organization.reparent(actor, new_parent_id, new_sequence, now);
                changed.push(organization.clone());
                continue;
            }

            if let Some(position) = remaining.iter().position(|id| *id == organization.id()) {
                let sequence = to_sequence(position)?;
                if organization.sequence() != sequence {
                    organization.set_sequence(actor, sequence, now);
                    changed.push(organization.clone());
                }
            }
        }

        self.organizations.update_organizations(&changed).await?;

        info!(
            organization_id = %organization_id,
            old_parent_id = ?old_parent_id,
            new_parent_id = ?new_parent_id,
            renumbered = changed.len().saturating_sub(1),
            actor = actor.subject(),
            "organization moved"
        );

        changed
            .into_iter()
            .find(|organization| organization.id() == organization_id)
            .ok_or_else(|| not_found(organization_id))
    }

    /// Renumbers the children of `parent_id` in the given order.
    ///
    /// Children missing from `ordered_ids` keep their relative order after the
    /// listed ones. Returns the full sibling list in its new order.
    pub async fn resequence_siblings(
        &self,
        actor: &ActorIdentity,
        parent_id: Option<OrganizationId>,
        ordered_ids: &[OrganizationId],
    ) -> AppResult<Vec<Organization>> {
        let (organizations, tree) = self.load_tree().await?;

        if let Some(parent_id) = parent_id
            && !tree.contains(parent_id)
        {
            return Err(not_found(parent_id));
        }

        let positions = tree.resequence(parent_id, ordered_ids)?;
        let now = Utc::now();

        let mut siblings = Vec::with_capacity(positions.len());
        let mut changed = Vec::new();
        for (id, sequence) in positions {
            let Some(mut organization) = organizations
                .iter()
                .find(|organization| organization.id() == id)
                .cloned()
            else {
                return Err(not_found(id));
            };

            if organization.sequence() != sequence {
                organization.set_sequence(actor, sequence, now);
                changed.push(organization.clone());
            }
            siblings.push(organization);
        }

        self.organizations.update_organizations(&changed).await?;

        info!(
            parent_id = ?parent_id,
            siblings = siblings.len(),
            changed = changed.len(),
            actor = actor.subject(),
            "organization siblings resequenced"
        );
        Ok(siblings)
    }

    /// Renames a node.
    pub async fn change_name(
        &self,
        actor: &ActorIdentity,
        organization_id: OrganizationId,
        name: impl Into<String>,
    ) -> AppResult<Organization> {
        let mut organization = self.find_organization(organization_id).await?;
        organization.rename(actor, name, Utc::now())?;

        self.organizations
            .update_organizations(std::slice::from_ref(&organization))
            .await?;

        info!(
            organization_id = %organization_id,
            name = organization.name(),
            actor = actor.subject(),
            "organization renamed"
        );
        Ok(organization)
    }

    /// Deletes a node together with its whole subtree.
    ///
    /// Returns the removed ids in deletion order: leaves first, the requested
    /// node last.
    pub async fn delete_organization(
        &self,
        actor: &ActorIdentity,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<OrganizationId>> {
        let (_, tree) = self.load_tree().await?;

        let mut removed = tree.find_descendants(organization_id)?;
        removed.push(organization_id);

        self.organizations.delete_organizations(&removed).await?;

        info!(
            organization_id = %organization_id,
            removed = removed.len(),
            actor = actor.subject(),
            "organization subtree deleted"
        );
        Ok(removed)
    }
}

fn sibling_count(tree: &OrganizationTree, parent_id: Option<OrganizationId>) -> AppResult<u32> {
    to_sequence(tree.children_of(parent_id).len())
}

fn to_sequence(position: usize) -> AppResult<u32> {
    u32::try_from(position).map_err(|_| AppError::Validation("too many siblings".to_owned()))
}
