use super::*;

impl OrganizationService {
    /// Replaces the organization's roles with the resolvable subset of
    /// `role_ids`.
    pub async fn assign_roles(
        &self,
        actor: &ActorIdentity,
        organization_id: OrganizationId,
        role_ids: &[RoleId],
    ) -> AppResult<Organization> {
        let mut organization = self.find_organization(organization_id).await?;
        let roles = self.registry.resolve_roles(role_ids).await?;

        organization.assign_roles(actor, roles, Utc::now());
        self.organizations
            .save_role_assignments(&organization)
            .await?;

        info!(
            organization_id = %organization_id,
            requested = role_ids.len(),
            assigned = organization.roles().len(),
            actor = actor.subject(),
            "organization roles assigned"
        );
        Ok(organization)
    }

    /// Replaces the organization's members with the existing subset of
    /// `member_ids`.
    pub async fn assign_members(
        &self,
        actor: &ActorIdentity,
        organization_id: OrganizationId,
        member_ids: &[MemberId],
    ) -> AppResult<Organization> {
        let organization = self.find_organization(organization_id).await?;
        self.replace_members(actor, organization, member_ids).await
    }

    /// Adds members while keeping the current ones.
    pub async fn add_members(
        &self,
        actor: &ActorIdentity,
        organization_id: OrganizationId,
        member_ids: &[MemberId],
    ) -> AppResult<Organization> {
        let organization = self.find_organization(organization_id).await?;

        let mut combined = organization.member_ids().to_vec();
        combined.extend(
            member_ids
                .iter()
                .copied()
                .filter(|member_id| !organization.has_member(*member_id)),
        );

        self.replace_members(actor, organization, &combined).await
    }

    /// Removes members; ids that are not members are ignored.
    pub async fn remove_members(
        &self,
        actor: &ActorIdentity,
        organization_id: OrganizationId,
        member_ids: &[MemberId],
    ) -> AppResult<Organization> {
        let organization = self.find_organization(organization_id).await?;

        let remaining: Vec<MemberId> = organization
            .member_ids()
            .iter()
            .copied()
            .filter(|member_id| !member_ids.contains(member_id))
            .collect();

        self.replace_members(actor, organization, &remaining).await
    }

    async fn replace_members(
        &self,
        actor: &ActorIdentity,
        mut organization: Organization,
        member_ids: &[MemberId],
    ) -> AppResult<Organization> {
        let existing = self.members.existing_member_ids(member_ids).await?;

        organization.assign_members(actor, existing, Utc::now());
        self.organizations
            .save_member_assignments(&organization)
            .await?;

        info!(
            organization_id = %organization.id(),
            requested = member_ids.len(),
            assigned = organization.member_ids().len(),
            actor = actor.subject(),
            "organization members assigned"
        );
        Ok(organization)
    }
}
