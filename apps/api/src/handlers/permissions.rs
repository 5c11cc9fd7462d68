use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use warden_domain::{PermissionId, SessionClaims, SystemPermission};

use crate::dto::{PermissionRequest, PermissionResponse};
use crate::error::ApiResult;
use crate::middleware::{actor, require};
use crate::state::AppState;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> ApiResult<Json<Vec<PermissionResponse>>> {
    require(&claims, &[SystemPermission::RegistryRead])?;

    let permissions = state
        .role_access_service
        .list_permissions()
        .await?
        .into_iter()
        .map(PermissionResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(permission_id): Path<PermissionId>,
) -> ApiResult<Json<PermissionResponse>> {
    require(&claims, &[SystemPermission::RegistryRead])?;

    let permission = state
        .role_access_service
        .find_permission(permission_id)
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<PermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    require(&claims, &[SystemPermission::RegistryManage])?;

    let permission = state
        .role_access_service
        .create_permission(&actor(&claims), payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(PermissionResponse::from(permission))))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(permission_id): Path<PermissionId>,
    Json(payload): Json<PermissionRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    require(&claims, &[SystemPermission::RegistryManage])?;

    let permission = state
        .role_access_service
        .update_permission(&actor(&claims), permission_id, payload.into())
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(permission_id): Path<PermissionId>,
) -> ApiResult<StatusCode> {
    require(&claims, &[SystemPermission::RegistryManage])?;

    state
        .role_access_service
        .delete_permission(&actor(&claims), permission_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
