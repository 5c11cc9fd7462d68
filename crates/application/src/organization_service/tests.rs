use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use warden_core::{ActorIdentity, AppError, AppResult};
use warden_domain::{
    AuditStamp, EntryKind, Member, MemberId, Organization, OrganizationId, Permission,
    PermissionId, Role, RoleId,
};

use crate::organization_ports::{MemberRepository, NewOrganization, OrganizationRepository};
use crate::registry_ports::{AccessRegistryRepository, NewPermission, NewRole};

use super::OrganizationService;

#[derive(Default)]
struct FakeOrganizationRepository {
    organizations: Mutex<Vec<Organization>>,
    deleted_batches: Mutex<Vec<Vec<OrganizationId>>>,
    update_calls: Mutex<usize>,
}

#[async_trait]
impl OrganizationRepository for FakeOrganizationRepository {
    async fn list_organizations(&self) -> AppResult<Vec<Organization>> {
        Ok(self.organizations.lock().await.clone())
    }

    async fn find_organization(
        &self,
        organization_id: OrganizationId,
    ) -> AppResult<Option<Organization>> {
        Ok(self
            .organizations
            .lock()
            .await
            .iter()
            .find(|organization| organization.id() == organization_id)
            .cloned())
    }

    async fn list_organizations_for_member(
        &self,
        member_id: MemberId,
    ) -> AppResult<Vec<Organization>> {
        let mut organizations: Vec<Organization> = self
            .organizations
            .lock()
            .await
            .iter()
            .filter(|organization| organization.has_member(member_id))
            .cloned()
            .collect();
        organizations.sort_by_key(Organization::id);
        Ok(organizations)
    }

    async fn create_organization(&self, input: NewOrganization) -> AppResult<Organization> {
        let mut organizations = self.organizations.lock().await;
        let id = OrganizationId::new(organizations.len() as u64 + 1);
        let organization =
            Organization::new(id, input.name, input.parent_id, input.sequence, input.audit)?;
        organizations.push(organization.clone());
        Ok(organization)
    }

    async fn update_organizations(&self, updated: &[Organization]) -> AppResult<()> {
        *self.update_calls.lock().await += 1;
        let mut organizations = self.organizations.lock().await;
        for organization in updated {
            if let Some(stored) = organizations
                .iter_mut()
                .find(|stored| stored.id() == organization.id())
            {
                *stored = organization.clone();
            }
        }
        Ok(())
    }

    async fn save_role_assignments(&self, organization: &Organization) -> AppResult<()> {
        self.update_organizations(std::slice::from_ref(organization))
            .await
    }

    async fn save_member_assignments(&self, organization: &Organization) -> AppResult<()> {
        self.update_organizations(std::slice::from_ref(organization))
            .await
    }

    async fn delete_organizations(&self, organization_ids: &[OrganizationId]) -> AppResult<()> {
        self.deleted_batches
            .lock()
            .await
            .push(organization_ids.to_vec());
        self.organizations
            .lock()
            .await
            .retain(|organization| !organization_ids.contains(&organization.id()));
        Ok(())
    }
}

#[derive(Default)]
struct FakeRegistry {
    roles: Vec<Role>,
}

#[async_trait]
impl AccessRegistryRepository for FakeRegistry {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(Vec::new())
    }

    async fn find_permission(&self, _id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(None)
    }

    async fn find_permission_by_name(&self, _name: &str) -> AppResult<Option<Permission>> {
        Ok(None)
    }

    async fn resolve_permissions(&self, _ids: &[PermissionId]) -> AppResult<Vec<Permission>> {
        Ok(Vec::new())
    }

    async fn create_permission(&self, _input: NewPermission) -> AppResult<Permission> {
        Err(AppError::Internal("not supported by fake".to_owned()))
    }

    async fn update_permission(&self, _permission: &Permission) -> AppResult<()> {
        Ok(())
    }

    async fn delete_permission(&self, _id: PermissionId) -> AppResult<()> {
        Ok(())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.roles.clone())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.iter().find(|role| role.id() == role_id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self.roles.iter().find(|role| role.name() == name).cloned())
    }

    async fn resolve_roles(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        Ok(role_ids
            .iter()
            .filter_map(|id| self.roles.iter().find(|role| role.id() == *id).cloned())
            .collect())
    }

    async fn create_role(&self, _input: NewRole) -> AppResult<Role> {
        Err(AppError::Internal("not supported by fake".to_owned()))
    }

    async fn update_role(&self, _role: &Role) -> AppResult<()> {
        Ok(())
    }

    async fn delete_role(&self, _role_id: RoleId) -> AppResult<()> {
        Ok(())
    }
}

struct FakeMembers {
    known: Vec<MemberId>,
}

#[async_trait]
impl MemberRepository for FakeMembers {
    async fn find_member(&self, _member_id: MemberId) -> AppResult<Option<Member>> {
        Ok(None)
    }

    async fn find_member_by_username(&self, _username: &str) -> AppResult<Option<Member>> {
        Ok(None)
    }

    async fn existing_member_ids(&self, member_ids: &[MemberId]) -> AppResult<Vec<MemberId>> {
        Ok(member_ids
            .iter()
            .copied()
            .filter(|member_id| self.known.contains(member_id))
            .collect())
    }
}

fn actor() -> ActorIdentity {
    ActorIdentity::new("alice", "Alice")
}

fn role(id: u64, name: &str) -> Role {
    Role::new(
        RoleId::new(id),
        EntryKind::UserDefined,
        name,
        None,
        Vec::new(),
        AuditStamp::created(&ActorIdentity::system(), Utc::now()),
    )
    .unwrap_or_else(|_| unreachable!())
}

fn build_service() -> (OrganizationService, Arc<FakeOrganizationRepository>) {
    let repository = Arc::new(FakeOrganizationRepository::default());
    let registry = Arc::new(FakeRegistry {
        roles: vec![role(1, "MGR"), role(2, "ADMIN")],
    });
    let members = Arc::new(FakeMembers {
        known: vec![MemberId::new(10), MemberId::new(11), MemberId::new(12)],
    });
    (
        OrganizationService::new(repository.clone(), registry, members),
        repository,
    )
}

async fn create(
    service: &OrganizationService,
    parent_id: Option<OrganizationId>,
    name: &str,
) -> Organization {
    service
        .create_organization(&actor(), parent_id, name)
        .await
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn create_places_node_after_existing_siblings() {
    let (service, _) = build_service();
    let root = create(&service, None, "Root").await;
    let first = create(&service, Some(root.id()), "First").await;
    let second = create(&service, Some(root.id()), "Second").await;

    assert_eq!(root.sequence(), 0);
    assert_eq!(first.sequence(), 0);
    assert_eq!(second.sequence(), 1);
    assert_eq!(second.parent_id(), Some(root.id()));
    assert_eq!(second.audit().created_by(), "alice");
}

#[tokio::test]
async fn create_under_unknown_parent_is_not_found() {
    let (service, repository) = build_service();

    let result = service
        .create_organization(&actor(), Some(OrganizationId::new(99)), "Orphan")
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(repository.organizations.lock().await.is_empty());
}

#[tokio::test]
async fn create_with_blank_name_is_rejected() {
    let (service, _) = build_service();

    let result = service.create_organization(&actor(), None, "  ").await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn move_under_own_descendant_is_rejected_and_tree_unchanged() {
    let (service, repository) = build_service();
    let root = create(&service, None, "Root").await;
    let child = create(&service, Some(root.id()), "Child").await;
    let grandchild = create(&service, Some(child.id()), "Grandchild").await;
    let before = repository.organizations.lock().await.clone();

    let into_descendant = service
        .move_organization(&actor(), root.id(), Some(grandchild.id()))
        .await;
    assert!(matches!(into_descendant, Err(AppError::CycleDetected(_))));

    let into_self = service
        .move_organization(&actor(), child.id(), Some(child.id()))
        .await;
    assert!(matches!(into_self, Err(AppError::CycleDetected(_))));

    assert_eq!(*repository.organizations.lock().await, before);
    assert_eq!(*repository.update_calls.lock().await, 0);
}

#[tokio::test]
async fn move_appends_to_new_parent_and_closes_gap() {
    let (service, _) = build_service();
    let root = create(&service, None, "Root").await;
    let first = create(&service, Some(root.id()), "First").await;
    let second = create(&service, Some(root.id()), "Second").await;
    let third = create(&service, Some(root.id()), "Third").await;
    let other = create(&service, None, "Other").await;
    let _ = create(&service, Some(other.id()), "Existing").await;

    let moved = service
        .move_organization(&actor(), first.id(), Some(other.id()))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(moved.parent_id(), Some(other.id()));
    assert_eq!(moved.sequence(), 1);

    let second = service
        .find_organization(second.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    let third = service
        .find_organization(third.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(second.sequence(), 0);
    assert_eq!(third.sequence(), 1);
}

#[tokio::test]
async fn move_to_unknown_node_is_not_found() {
    let (service, _) = build_service();
    let root = create(&service, None, "Root").await;

    let unknown_node = service
        .move_organization(&actor(), OrganizationId::new(42), None)
        .await;
    assert!(matches!(unknown_node, Err(AppError::NotFound(_))));

    let unknown_parent = service
        .move_organization(&actor(), root.id(), Some(OrganizationId::new(42)))
        .await;
    assert!(matches!(unknown_parent, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn resequence_appends_omitted_siblings() {
    let (service, _) = build_service();
    let root = create(&service, None, "Root").await;
    let a = create(&service, Some(root.id()), "A").await;
    let b = create(&service, Some(root.id()), "B").await;
    let c = create(&service, Some(root.id()), "C").await;

    let siblings = service
        .resequence_siblings(&actor(), Some(root.id()), &[c.id()])
        .await
        .unwrap_or_else(|_| unreachable!());

    let order: Vec<(OrganizationId, u32)> = siblings
        .iter()
        .map(|organization| (organization.id(), organization.sequence()))
        .collect();
    assert_eq!(order, vec![(c.id(), 0), (a.id(), 1), (b.id(), 2)]);
}

#[tokio::test]
async fn resequence_rejects_non_siblings() {
    let (service, _) = build_service();
    let root = create(&service, None, "Root").await;
    let child = create(&service, Some(root.id()), "Child").await;
    let grandchild = create(&service, Some(child.id()), "Grandchild").await;

    let result = service
        .resequence_siblings(&actor(), Some(root.id()), &[grandchild.id()])
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn delete_removes_subtree_leaves_first_in_one_call() {
    let (service, repository) = build_service();
    let root = create(&service, None, "Root").await;
    let child = create(&service, Some(root.id()), "Child").await;
    let grandchild = create(&service, Some(child.id()), "Grandchild").await;
    let sibling = create(&service, Some(root.id()), "Sibling").await;
    let untouched = create(&service, None, "Untouched").await;

    let removed = service
        .delete_organization(&actor(), root.id())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(
        removed,
        vec![grandchild.id(), child.id(), sibling.id(), root.id()]
    );
    assert_eq!(repository.deleted_batches.lock().await.len(), 1);

    let remaining: Vec<OrganizationId> = repository
        .organizations
        .lock()
        .await
        .iter()
        .map(Organization::id)
        .collect();
    assert_eq!(remaining, vec![untouched.id()]);
}

#[tokio::test]
async fn delete_unknown_node_is_not_found() {
    let (service, _) = build_service();

    let result = service
        .delete_organization(&actor(), OrganizationId::new(5))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn assign_roles_replaces_set_and_drops_unknown_ids() {
    let (service, _) = build_service();
    let root = create(&service, None, "Root").await;

    let first = service
        .assign_roles(&actor(), root.id(), &[RoleId::new(1), RoleId::new(77)])
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(first.roles().len(), 1);

    let replaced = service
        .assign_roles(&actor(), root.id(), &[RoleId::new(2), RoleId::new(2)])
        .await
        .unwrap_or_else(|_| unreachable!());
    let names: Vec<&str> = replaced.roles().iter().map(Role::name).collect();
    assert_eq!(names, vec!["ADMIN"]);
}

#[tokio::test]
async fn member_assignment_variants_compose() {
    let (service, _) = build_service();
    let root = create(&service, None, "Root").await;

    let assigned = service
        .assign_members(
            &actor(),
            root.id(),
            &[MemberId::new(10), MemberId::new(404), MemberId::new(10)],
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(assigned.member_ids(), &[MemberId::new(10)]);

    let added = service
        .add_members(&actor(), root.id(), &[MemberId::new(12), MemberId::new(11)])
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(
        added.member_ids(),
        &[MemberId::new(10), MemberId::new(12), MemberId::new(11)]
    );

    let removed = service
        .remove_members(&actor(), root.id(), &[MemberId::new(10)])
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(removed.member_ids(), &[MemberId::new(12), MemberId::new(11)]);

    let organizations = service
        .list_for_member(MemberId::new(11))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(organizations.len(), 1);
}

#[tokio::test]
async fn list_ordered_and_ancestor_chain_follow_tree() {
    let (service, _) = build_service();
    let root = create(&service, None, "Root").await;
    let b = create(&service, Some(root.id()), "B").await;
    let a = create(&service, Some(root.id()), "A").await;
    let leaf = create(&service, Some(b.id()), "Leaf").await;

    let resequenced = service
        .resequence_siblings(&actor(), Some(root.id()), &[a.id(), b.id()])
        .await;
    assert!(resequenced.is_ok());

    let names: Vec<String> = service
        .list_ordered()
        .await
        .unwrap_or_else(|_| unreachable!())
        .iter()
        .map(|organization| organization.name().to_owned())
        .collect();
    assert_eq!(names, vec!["Root", "A", "B", "Leaf"]);

    let chain = service
        .ancestor_chain(leaf.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(chain, vec![root.id(), b.id()]);

    let descendants = service
        .descendants(root.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(descendants, vec![leaf.id(), b.id(), a.id()]);
}

#[tokio::test]
async fn change_name_renames_only_target() {
    let (service, _) = build_service();
    let root = create(&service, None, "Root").await;
    let child = create(&service, Some(root.id()), "Child").await;

    let renamed = service
        .change_name(&actor(), root.id(), "Headquarters")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(renamed.name(), "Headquarters");

    let child = service
        .find_organization(child.id())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(child.name(), "Child");
    assert_eq!(child.parent_id(), Some(root.id()));
}
