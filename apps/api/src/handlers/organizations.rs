use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use warden_domain::{MemberId, OrganizationId, SessionClaims, SystemPermission};

use crate::dto::{
    AssignMembersRequest, AssignRolesRequest, CreateOrganizationRequest, MoveOrganizationRequest,
    OrganizationResponse, RenameOrganizationRequest, ResequenceSiblingsRequest,
};
use crate::error::ApiResult;
use crate::middleware::{actor, require};
use crate::state::AppState;

mod assignments;
mod queries;
mod structure;

pub use assignments::{
    add_members_handler, assign_members_handler, assign_roles_handler, remove_members_handler,
};
pub use queries::{
    ancestors_handler, descendants_handler, get_organization_handler,
    list_member_organizations_handler, list_organizations_handler,
};
pub use structure::{
    create_organization_handler, delete_organization_handler, move_organization_handler,
    rename_organization_handler, resequence_siblings_handler,
};

fn require_read(claims: &SessionClaims) -> ApiResult<()> {
    require(
        claims,
        &[
            SystemPermission::OrganizationRead,
            SystemPermission::OrganizationManage,
        ],
    )
}

fn require_manage(claims: &SessionClaims) -> ApiResult<()> {
    require(claims, &[SystemPermission::OrganizationManage])
}
