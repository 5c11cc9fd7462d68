use serde::{Deserialize, Serialize};
use warden_application::{PermissionInput, RoleInput};
use warden_domain::{Permission, PermissionId, Role, RoleId};

/// Incoming payload for permission creation and update.
#[derive(Debug, Deserialize)]
pub struct PermissionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<PermissionRequest> for PermissionInput {
    fn from(value: PermissionRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
        }
    }
}

/// Incoming payload for role creation and update.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<PermissionId>,
}

impl From<RoleRequest> for RoleInput {
    fn from(value: RoleRequest) -> Self {
        Self {
            name: value.name,
            description: value.description,
            permission_ids: value.permission_ids,
        }
    }
}

/// API representation of a permission.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub id: PermissionId,
    pub kind: &'static str,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Permission> for PermissionResponse {
    fn from(value: &Permission) -> Self {
        Self {
            id: value.id(),
            kind: value.kind().as_str(),
            name: value.name().to_owned(),
            description: value.description().map(str::to_owned),
            created_by: value.audit().created_by().to_owned(),
            updated_by: value.audit().updated_by().to_owned(),
            created_at: value.audit().created_at().to_rfc3339(),
            updated_at: value.audit().updated_at().to_rfc3339(),
        }
    }
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self::from(&value)
    }
}

/// API representation of a role with its granted permissions in stored order.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: RoleId,
    pub kind: &'static str,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<PermissionResponse>,
    pub updated_by: String,
    pub updated_at: String,
}

impl From<&Role> for RoleResponse {
    fn from(value: &Role) -> Self {
        Self {
            id: value.id(),
            kind: value.kind().as_str(),
            name: value.name().to_owned(),
            description: value.description().map(str::to_owned),
            permissions: value
                .permissions()
                .iter()
                .map(PermissionResponse::from)
                .collect(),
            updated_by: value.audit().updated_by().to_owned(),
            updated_at: value.audit().updated_at().to_rfc3339(),
        }
    }
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self::from(&value)
    }
}
