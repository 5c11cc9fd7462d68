use super::*;

pub async fn create_organization_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<CreateOrganizationRequest>,
) -> ApiResult<(StatusCode, Json<OrganizationResponse>)> {
    require_manage(&claims)?;

    let organization = state
        .organization_service
        .create_organization(&actor(&claims), payload.parent_id, payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OrganizationResponse::from(organization)),
    ))
}

pub async fn rename_organization_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
    Json(payload): Json<RenameOrganizationRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    require_manage(&claims)?;

    let organization = state
        .organization_service
        .change_name(&actor(&claims), organization_id, payload.name)
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

pub async fn move_organization_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
    Json(payload): Json<MoveOrganizationRequest>,
) -> ApiResult<Json<OrganizationResponse>> {
    require_manage(&claims)?;

    let organization = state
        .organization_service
        .move_organization(&actor(&claims), organization_id, payload.parent_id)
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

pub async fn resequence_siblings_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(payload): Json<ResequenceSiblingsRequest>,
) -> ApiResult<Json<Vec<OrganizationResponse>>> {
    require_manage(&claims)?;

    let siblings = state
        .organization_service
        .resequence_siblings(&actor(&claims), payload.parent_id, &payload.ordered_ids)
        .await?
        .into_iter()
        .map(OrganizationResponse::from)
        .collect();

    Ok(Json(siblings))
}

/// Deletes the node and its subtree; responds with the removed ids, leaves first.
pub async fn delete_organization_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
) -> ApiResult<Json<Vec<OrganizationId>>> {
    require_manage(&claims)?;

    let removed = state
        .organization_service
        .delete_organization(&actor(&claims), organization_id)
        .await?;

    Ok(Json(removed))
}
