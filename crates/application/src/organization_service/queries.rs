use super::*;

impl OrganizationService {
    /// Returns one organization or `NotFound`.
    pub async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Organization> {
        self.organizations
            .find_organization(organization_id)
            .await?
            .ok_or_else(|| not_found(organization_id))
    }

    /// Lists every organization root-to-leaf, siblings by sequence.
    pub async fn list_ordered(&self) -> AppResult<Vec<Organization>> {
        let organizations = self.organizations.list_organizations().await?;
        OrganizationTree::sort_by_path(organizations)
    }

    /// Lists the organizations `member_id` belongs to.
    pub async fn list_for_member(&self, member_id: MemberId) -> AppResult<Vec<Organization>> {
        self.organizations
            .list_organizations_for_member(member_id)
            .await
    }

    /// Returns the ancestors of a node, root first, excluding the node.
    pub async fn ancestor_chain(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<OrganizationId>> {
        let (_, tree) = self.load_tree().await?;
        tree.resolve_ancestor_chain(organization_id)
    }

    /// Returns the descendants of a node, deepest first.
    pub async fn descendants(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Vec<OrganizationId>> {
        let (_, tree) = self.load_tree().await?;
        tree.find_descendants(organization_id)
    }
}
