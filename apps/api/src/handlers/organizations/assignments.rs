use super::*;

pub async fn assign_roles_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
    Json(payload): Json<AssignRolesRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    require_manage(&claims)?;

    let organization = state
        .organization_service
        .assign_roles(&actor(&claims), organization_id, &payload.role_ids)
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

pub async fn assign_members_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
    Json(payload): Json<AssignMembersRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    require_manage(&claims)?;

    let organization = state
        .organization_service
        .assign_members(&actor(&claims), organization_id, &payload.member_ids)
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

pub async fn add_members_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
    Json(payload): Json<AssignMembersRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    require_manage(&claims)?;

    let organization = state
        .organization_service
        .add_members(&actor(&claims), organization_id, &payload.member_ids)
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

pub async fn remove_members_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
    Json(payload): Json<AssignMembersRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    require_manage(&claims)?;

    let organization = state
        .organization_service
        .remove_members(&actor(&claims), organization_id, &payload.member_ids)
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}
