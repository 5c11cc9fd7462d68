use super::*;

impl RoleAccessService {
    /// Lists every role with its permissions.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.repository.list_roles().await
    }

    /// Returns one role or `NotFound`.
    pub async fn find_role(&self, role_id: RoleId) -> AppResult<Role> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' was not found")))
    }

    /// Creates a user-defined role.
    ///
    /// Permission ids that do not resolve are dropped silently.
    pub async fn create_role(&self, actor: &ActorIdentity, input: RoleInput) -> AppResult<Role> {
        let name = NonEmptyString::new(input.name)?;
        let permission_ids = self.resolve_permission_ids(&input.permission_ids).await?;

        let role = self
            .repository
            .create_role(NewRole {
                kind: EntryKind::UserDefined,
                name,
                description: input.description,
                permission_ids,
                audit: AuditStamp::created(actor, Utc::now()),
            })
            .await?;

        info!(
            role_id = %role.id(),
            name = role.name(),
            permissions = role.permissions().len(),
            actor = actor.subject(),
            "role created"
        );
        Ok(role)
    }

    /// Replaces name, description and permission list of a user-defined role.
    pub async fn update_role(
        &self,
        actor: &ActorIdentity,
        role_id: RoleId,
        input: RoleInput,
    ) -> AppResult<Role> {
        let mut role = self.find_role(role_id).await?;
        role.ensure_changeable()?;

        let permissions = self
            .repository
            .resolve_permissions(&input.permission_ids)
            .await?;
        role.update(
            actor,
            input.name,
            input.description,
            permissions,
            Utc::now(),
        )?;
        self.repository.update_role(&role).await?;

        info!(
            role_id = %role_id,
            name = role.name(),
            permissions = role.permissions().len(),
            actor = actor.subject(),
            "role updated"
        );
        Ok(role)
    }

    /// Deletes a user-defined role.
    pub async fn delete_role(&self, actor: &ActorIdentity, role_id: RoleId) -> AppResult<()> {
        let role = self.find_role(role_id).await?;
        role.ensure_changeable()?;

        self.repository.delete_role(role_id).await?;

        info!(
            role_id = %role_id,
            name = role.name(),
            actor = actor.subject(),
            "role deleted"
        );
        Ok(())
    }

    async fn resolve_permission_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<PermissionId>> {
        let mut resolved: Vec<PermissionId> = Vec::new();
        for permission in self.repository.resolve_permissions(permission_ids).await? {
            if !resolved.contains(&permission.id()) {
                resolved.push(permission.id());
            }
        }

        Ok(resolved)
    }
}
