use warden_domain::{ADMINISTRATOR_ROLE, SystemPermission};

use super::*;

/// Predefined role declared by permission names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredefinedRole {
    /// Role name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Names of permissions granted by the role.
    pub permission_names: Vec<String>,
}

/// Set of predefined registry entries installed at bootstrap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredefinedCatalog {
    /// Predefined permissions as `(name, description)` pairs.
    pub permissions: Vec<PermissionInput>,
    /// Predefined roles.
    pub roles: Vec<PredefinedRole>,
}

impl PredefinedCatalog {
    /// Returns the built-in catalog: every system permission plus an
    /// administrator role granting all of them.
    #[must_use]
    pub fn system() -> Self {
        let permissions: Vec<PermissionInput> = SystemPermission::all()
            .iter()
            .map(|permission| PermissionInput {
                name: permission.as_str().to_owned(),
                description: Some(permission.description().to_owned()),
            })
            .collect();

        let administrator = PredefinedRole {
            name: ADMINISTRATOR_ROLE.to_owned(),
            description: Some("Full access to the registry and organization tree".to_owned()),
            permission_names: permissions.iter().map(|input| input.name.clone()).collect(),
        };

        Self {
            permissions,
            roles: vec![administrator],
        }
    }
}

/// Counts of entries inserted by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Newly inserted permissions.
    pub permissions_created: usize,
    /// Newly inserted roles.
    pub roles_created: usize,
}

impl RoleAccessService {
    /// Installs missing predefined permissions and roles.
    ///
    /// Entries are matched by name; existing predefined ones are left
    /// untouched, so the call can run on every startup. A user-defined entry
    /// holding a predefined name fails with `AppError::Conflict`.
    pub async fn seed_predefined(
        &self,
        actor: &ActorIdentity,
        catalog: &PredefinedCatalog,
    ) -> AppResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        for input in &catalog.permissions {
            let name = NonEmptyString::new(input.name.clone())?;
            if let Some(existing) = self
                .repository
                .find_permission_by_name(name.as_str())
                .await?
            {
                ensure_predefined("permission", name.as_str(), existing.kind())?;
                continue;
            }

            self.repository
                .create_permission(NewPermission {
                    kind: EntryKind::Predefined,
                    name,
                    description: input.description.clone(),
                    audit: AuditStamp::created(actor, Utc::now()),
                })
                .await?;
            summary.permissions_created += 1;
        }

        for role in &catalog.roles {
            let name = NonEmptyString::new(role.name.clone())?;
            if let Some(existing) = self.repository.find_role_by_name(name.as_str()).await? {
                ensure_predefined("role", name.as_str(), existing.kind())?;
                continue;
            }

            let mut permission_ids = Vec::with_capacity(role.permission_names.len());
            for permission_name in &role.permission_names {
                let Some(permission) = self
                    .repository
                    .find_permission_by_name(permission_name)
                    .await?
                else {
                    return Err(AppError::Validation(format!(
                        "predefined role '{}' references unknown permission '{permission_name}'",
                        role.name
                    )));
                };
                if !permission_ids.contains(&permission.id()) {
                    permission_ids.push(permission.id());
                }
            }

            self.repository
                .create_role(NewRole {
                    kind: EntryKind::Predefined,
                    name,
                    description: role.description.clone(),
                    permission_ids,
                    audit: AuditStamp::created(actor, Utc::now()),
                })
                .await?;
            summary.roles_created += 1;
        }

        info!(
            permissions_created = summary.permissions_created,
            roles_created = summary.roles_created,
            actor = actor.subject(),
            "predefined registry entries seeded"
        );
        Ok(summary)
    }
}

fn ensure_predefined(entry: &str, name: &str, kind: EntryKind) -> AppResult<()> {
    if kind != EntryKind::Predefined {
        return Err(AppError::Conflict(format!(
            "user-defined {entry} '{name}' shadows a predefined {entry}"
        )));
    }

    Ok(())
}
