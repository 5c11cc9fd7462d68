use serde::{Deserialize, Serialize};
use warden_domain::{MemberId, Organization, OrganizationId, RoleId};

/// Incoming payload for organization creation.
#[derive(Debug, Deserialize)]
pub struct CreateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<OrganizationId>,
}

/// Incoming payload for renaming an organization.
#[derive(Debug, Deserialize)]
pub struct RenameOrganizationRequest {
    pub name: String,
}

/// Incoming payload for moving an organization; `null` makes it a root.
#[derive(Debug, Deserialize)]
pub struct MoveOrganizationRequest {
    pub parent_id: Option<OrganizationId>,
}

/// Incoming payload for reordering the children of one parent.
#[derive(Debug, Deserialize)]
pub struct ResequenceSiblingsRequest {
    #[serde(default)]
    pub parent_id: Option<OrganizationId>,
    pub ordered_ids: Vec<OrganizationId>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRolesRequest {
    pub role_ids: Vec<RoleId>,
}

#[derive(Debug, Deserialize)]
pub struct AssignMembersRequest {
    pub member_ids: Vec<MemberId>,
}

/// API representation of an organization node.
#[derive(Debug, Serialize)]
pub struct OrganizationResponse {
    pub id: OrganizationId,
    pub name: String,
    pub parent_id: Option<OrganizationId>,
    pub sequence: u32,
    pub role_ids: Vec<RoleId>,
    pub member_ids: Vec<MemberId>,
    pub updated_by: String,
    pub updated_at: String,
}

impl From<Organization> for OrganizationResponse {
    fn from(value: Organization) -> Self {
        Self {
            id: value.id(),
            name: value.name().to_owned(),
            parent_id: value.parent_id(),
            sequence: value.sequence(),
            role_ids: value.roles().iter().map(|role| role.id()).collect(),
            member_ids: value.member_ids().to_vec(),
            updated_by: value.audit().updated_by().to_owned(),
            updated_at: value.audit().updated_at().to_rfc3339(),
        }
    }
}
