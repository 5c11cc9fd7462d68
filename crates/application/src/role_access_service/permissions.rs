use super::*;

impl RoleAccessService {
    /// Lists every permission.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.repository.list_permissions().await
    }

    /// Returns one permission or `NotFound`.
    pub async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Permission> {
        self.repository
            .find_permission(permission_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{permission_id}' was not found"))
            })
    }

    /// Creates a user-defined permission.
    pub async fn create_permission(
        &self,
        actor: &ActorIdentity,
        input: PermissionInput,
    ) -> AppResult<Permission> {
        let name = NonEmptyString::new(input.name)?;
        self.ensure_unique_permission_name(name.as_str(), None)
            .await?;

        let permission = self
            .repository
            .create_permission(NewPermission {
                kind: EntryKind::UserDefined,
                name,
                description: input.description,
                audit: AuditStamp::created(actor, Utc::now()),
            })
            .await?;

        info!(
            permission_id = %permission.id(),
            name = permission.name(),
            actor = actor.subject(),
            "permission created"
        );
        Ok(permission)
    }

    /// Renames or re-describes a user-defined permission.
    pub async fn update_permission(
        &self,
        actor: &ActorIdentity,
        permission_id: PermissionId,
        input: PermissionInput,
    ) -> AppResult<Permission> {
        let mut permission = self.find_permission(permission_id).await?;
        permission.ensure_changeable()?;

        let name = NonEmptyString::new(input.name)?;
        if name.as_str() != permission.name() {
            self.ensure_unique_permission_name(name.as_str(), Some(permission_id))
                .await?;
        }

        permission.update(actor, name, input.description, Utc::now())?;
        self.repository.update_permission(&permission).await?;

        info!(
            permission_id = %permission_id,
            name = permission.name(),
            actor = actor.subject(),
            "permission updated"
        );
        Ok(permission)
    }

    /// Deletes a user-defined permission.
    pub async fn delete_permission(
        &self,
        actor: &ActorIdentity,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let permission = self.find_permission(permission_id).await?;
        permission.ensure_changeable()?;

        self.repository.delete_permission(permission_id).await?;

        info!(
            permission_id = %permission_id,
            name = permission.name(),
            actor = actor.subject(),
            "permission deleted"
        );
        Ok(())
    }
}
