use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use warden_domain::{RoleId, SessionClaims, SystemPermission};

use crate::dto::{RoleRequest, RoleResponse};
use crate::error::ApiResult;
use crate::middleware::{actor, require};
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    require(&claims, &[SystemPermission::RegistryRead])?;

    let roles = state
        .role_access_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(role_id): Path<RoleId>,
) -> ApiResult<Json<RoleResponse>> {
    require(&claims, &[SystemPermission::RegistryRead])?;

    let role = state.role_access_service.find_role(role_id).await?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<RoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    require(&claims, &[SystemPermission::RegistryManage])?;

    let role = state
        .role_access_service
        .create_role(&actor(&claims), payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(role_id): Path<RoleId>,
    Json(payload): Json<RoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    require(&claims, &[SystemPermission::RegistryManage])?;

    let role = state
        .role_access_service
        .update_role(&actor(&claims), role_id, payload.into())
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(role_id): Path<RoleId>,
) -> ApiResult<StatusCode> {
    require(&claims, &[SystemPermission::RegistryManage])?;

    state
        .role_access_service
        .delete_role(&actor(&claims), role_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
