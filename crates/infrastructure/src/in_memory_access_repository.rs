use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use warden_application::{
    AccessRegistryRepository, CredentialRepository, MemberRepository, NewOrganization,
    NewPermission, NewRole, OrganizationRepository,
};
use warden_core::{AppError, AppResult};
use warden_domain::{
    Member, MemberId, Organization, OrganizationId, Permission, PermissionId, Role, RoleId,
};

use crate::password_identity_provider::Argon2PasswordHasher;

/// In-memory implementation of the registry, organization, member and credential ports.
///
/// Roles embedded in organizations and members are re-resolved on every read,
/// so renames and deletions are visible immediately.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    permissions: BTreeMap<PermissionId, Permission>,
    roles: BTreeMap<RoleId, Role>,
    organizations: BTreeMap<OrganizationId, Organization>,
    members: BTreeMap<MemberId, Member>,
    password_hashes: BTreeMap<MemberId, String>,
    next_id: u64,
}

impl State {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn permission_name_taken(&self, name: &str, except: Option<PermissionId>) -> bool {
        self.permissions
            .values()
            .any(|permission| permission.name() == name && Some(permission.id()) != except)
    }

    fn current_role(&self, role: &Role) -> AppResult<Role> {
        let permissions = role
            .permissions()
            .iter()
            .filter_map(|permission| self.permissions.get(&permission.id()).cloned())
            .collect();

        Role::new(
            role.id(),
            role.kind(),
            role.name(),
            role.description().map(str::to_owned),
            permissions,
            role.audit().clone(),
        )
    }

    fn resolve_roles(&self, role_ids: impl IntoIterator<Item = RoleId>) -> AppResult<Vec<Role>> {
        role_ids
            .into_iter()
            .filter_map(|role_id| self.roles.get(&role_id))
            .map(|role| self.current_role(role))
            .collect()
    }

    fn current_organization(&self, organization: &Organization) -> AppResult<Organization> {
        let roles = self.resolve_roles(organization.roles().iter().map(Role::id))?;
        let members = organization
            .member_ids()
            .iter()
            .copied()
            .filter(|member_id| self.members.contains_key(member_id))
            .collect();

        Ok(organization.clone().with_roles(roles).with_members(members))
    }

    fn member_id_by_username(&self, username: &str) -> Option<MemberId> {
        self.members
            .values()
            .find(|member| member.username() == username)
            .map(Member::id)
    }

    fn current_member(&self, member: &Member) -> AppResult<Member> {
        let roles = self.resolve_roles(member.roles().iter().map(Role::id))?;
        Member::new(member.id(), member.username(), member.is_approved(), roles)
    }
}

impl InMemoryAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a member with directly assigned roles.
    ///
    /// Members are owned by the identity subsystem; this is the only write
    /// path for them in memory.
    pub async fn insert_member(
        &self,
        username: &str,
        approved: bool,
        role_ids: &[RoleId],
    ) -> AppResult<Member> {
        let mut state = self.state.write().await;

        if state
            .members
            .values()
            .any(|member| member.username() == username)
        {
            return Err(AppError::Conflict(format!(
                "member '{username}' already exists"
            )));
        }

        let roles = state.resolve_roles(role_ids.iter().copied())?;
        let member_id = MemberId::new(state.allocate_id());
        let member = Member::new(member_id, username, approved, roles)?;
        state.members.insert(member_id, member.clone());
        Ok(member)
    }

    /// Stores an Argon2id hash of `password` for an existing member.
    pub async fn set_password(&self, username: &str, password: &str) -> AppResult<()> {
        let hash = Argon2PasswordHasher::new().hash_password(password)?;
        let mut state = self.state.write().await;

        let member_id = state
            .member_id_by_username(username)
            .ok_or_else(|| AppError::NotFound(format!("member '{username}' was not found")))?;
        state.password_hashes.insert(member_id, hash);
        Ok(())
    }
}

#[async_trait]
impl AccessRegistryRepository for InMemoryAccessRepository {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.state.read().await.permissions.values().cloned().collect())
    }

    async fn find_permission(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .get(&permission_id)
            .cloned())
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .find(|permission| permission.name() == name)
            .cloned())
    }

    async fn resolve_permissions(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        Ok(permission_ids
            .iter()
            .filter_map(|permission_id| state.permissions.get(permission_id).cloned())
            .collect())
    }

    async fn create_permission(&self, input: NewPermission) -> AppResult<Permission> {
        let mut state = self.state.write().await;

        if state.permission_name_taken(input.name.as_str(), None) {
            return Err(AppError::DuplicateName(format!(
                "permission '{}' already exists",
                input.name
            )));
        }

        let permission_id = PermissionId::new(state.allocate_id());
        let permission = Permission::new(
            permission_id,
            input.kind,
            input.name,
            input.description,
            input.audit,
        )?;
        state.permissions.insert(permission_id, permission.clone());
        Ok(permission)
    }

    async fn update_permission(&self, permission: &Permission) -> AppResult<()> {
        let mut state = self.state.write().await;

        if !state.permissions.contains_key(&permission.id()) {
            return Err(AppError::NotFound(format!(
                "permission '{}' was not found",
                permission.id()
            )));
        }
        if state.permission_name_taken(permission.name(), Some(permission.id())) {
            return Err(AppError::DuplicateName(format!(
                "permission '{}' already exists",
                permission.name()
            )));
        }

        state.permissions.insert(permission.id(), permission.clone());
        Ok(())
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut state = self.state.write().await;

        if state.permissions.remove(&permission_id).is_none() {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' was not found"
            )));
        }

        Ok(())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        state.resolve_roles(state.roles.keys().copied())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        let state = self.state.read().await;
        state
            .roles
            .get(&role_id)
            .map(|role| state.current_role(role))
            .transpose()
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let state = self.state.read().await;
        state
            .roles
            .values()
            .find(|role| role.name() == name)
            .map(|role| state.current_role(role))
            .transpose()
    }

    async fn resolve_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        self.state
            .read()
            .await
            .resolve_roles(role_ids.iter().copied())
    }

    async fn create_role(&self, input: NewRole) -> AppResult<Role> {
        let mut state = self.state.write().await;

        let permissions = input
            .permission_ids
            .iter()
            .filter_map(|permission_id| state.permissions.get(permission_id).cloned())
            .collect();
        let role_id = RoleId::new(state.allocate_id());
        let role = Role::new(
            role_id,
            input.kind,
            input.name,
            input.description,
            permissions,
            input.audit,
        )?;
        state.roles.insert(role_id, role.clone());
        Ok(role)
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let mut state = self.state.write().await;

        if !state.roles.contains_key(&role.id()) {
            return Err(AppError::NotFound(format!(
                "role '{}' was not found",
                role.id()
            )));
        }

        state.roles.insert(role.id(), role.clone());
        Ok(())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut state = self.state.write().await;

        if state.roles.remove(&role_id).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' was not found")));
        }

        Ok(())
    }
}

#[async_trait]
impl OrganizationRepository for InMemoryAccessRepository {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        let state = self.state.read().await;
        state
            .organizations
            .values()
            .map(|organization| state.current_organization(organization))
            .collect()
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        let state = self.state.read().await;
        state
            .organizations
            .get(&organization_id)
            .map(|organization| state.current_organization(organization))
            .transpose()
    }

    async fn list_organizations_for_member(
        &self,
        member_id: MemberId,
    ) -> AppResult<Vec<Organization>> {
        let state = self.state.read().await;
        state
            .organizations
            .values()
            .filter(|organization| organization.has_member(member_id))
            .map(|organization| state.current_organization(organization))
            .collect()
    }

    async fn create_organization(&self, input: NewOrganization) -> AppResult<Organization> {
        let mut state = self.state.write().await;

        if let Some(parent_id) = input.parent_id
            && !state.organizations.contains_key(&parent_id)
        {
            return Err(AppError::NotFound(format!(
                "organization '{parent_id}' was not found"
            )));
        }

        let organization_id = OrganizationId::new(state.allocate_id());
        let organization = Organization::new(
            organization_id,
            input.name,
            input.parent_id,
            input.sequence,
            input.audit,
        )?;
        state
            .organizations
            .insert(organization_id, organization.clone());
        Ok(organization)
    }

    async fn update_organizations(&self, organizations: &[Organization]) -> AppResult<()> {
        let mut state = self.state.write().await;

        if let Some(missing) = organizations
            .iter()
            .find(|organization| !state.organizations.contains_key(&organization.id()))
        {
            return Err(AppError::NotFound(format!(
                "organization '{}' was not found",
                missing.id()
            )));
        }

        for organization in organizations {
            let Some(stored) = state.organizations.get(&organization.id()) else {
                continue;
            };
            let updated = organization
                .clone()
                .with_roles(stored.roles().to_vec())
                .with_members(stored.member_ids().to_vec());
            state.organizations.insert(organization.id(), updated);
        }

        Ok(())
    }

    async fn save_role_assignments(&self, organization: &Organization) -> AppResult<()> {
        let mut state = self.state.write().await;

        let Some(stored) = state.organizations.get_mut(&organization.id()) else {
            return Err(AppError::NotFound(format!(
                "organization '{}' was not found",
                organization.id()
            )));
        };
        *stored = organization
            .clone()
            .with_members(stored.member_ids().to_vec());
        Ok(())
    }

    async fn save_member_assignments(&self, organization: &Organization) -> AppResult<()> {
        let mut state = self.state.write().await;

        let Some(stored) = state.organizations.get_mut(&organization.id()) else {
            return Err(AppError::NotFound(format!(
                "organization '{}' was not found",
                organization.id()
            )));
        };
        *stored = organization.clone().with_roles(stored.roles().to_vec());
        Ok(())
    }

    async fn delete_organizations(&self, organization_ids: &[OrganizationId]) -> AppResult<()> {
        let mut state = self.state.write().await;

        if let Some(missing) = organization_ids
            .iter()
            .find(|organization_id| !state.organizations.contains_key(organization_id))
        {
            return Err(AppError::NotFound(format!(
                "organization '{missing}' was not found"
            )));
        }

        for (position, organization_id) in organization_ids.iter().enumerate() {
            let removed_before = &organization_ids[..position];
            let still_referenced = state.organizations.values().any(|organization| {
                organization.parent_id() == Some(*organization_id)
                    && !removed_before.contains(&organization.id())
            });
            if still_referenced {
                return Err(AppError::Conflict(format!(
                    "organization '{organization_id}' still has children"
                )));
            }
        }

        for organization_id in organization_ids {
            state.organizations.remove(organization_id);
        }

        Ok(())
    }
}

#[async_trait]
impl MemberRepository for InMemoryAccessRepository {
    async fn find_member(&self, member_id: MemberId) -> AppResult<Option<Member>> {
        let state = self.state.read().await;
        state
            .members
            .get(&member_id)
            .map(|member| state.current_member(member))
            .transpose()
    }

    async fn find_member_by_username(&self, username: &str) -> AppResult<Option<Member>> {
        let state = self.state.read().await;
        state
            .members
            .values()
            .find(|member| member.username() == username)
            .map(|member| state.current_member(member))
            .transpose()
    }

    async fn existing_member_ids(&self, member_ids: &[MemberId]) -> AppResult<Vec<MemberId>> {
        let state = self.state.read().await;
        Ok(member_ids
            .iter()
            .copied()
            .filter(|member_id| state.members.contains_key(member_id))
            .collect())
    }
}

#[async_trait]
impl CredentialRepository for InMemoryAccessRepository {
    async fn find_password_hash(&self, username: &str) -> AppResult<Option<String>> {
        let state = self.state.read().await;
        Ok(state
            .member_id_by_username(username)
            .and_then(|member_id| state.password_hashes.get(&member_id).cloned()))
    }
}
