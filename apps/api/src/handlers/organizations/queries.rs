use super::*;

/// Lists the whole tree root-to-leaf with siblings in sequence order.
pub async fn list_organizations_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> ApiResult<Json<Vec<OrganizationResponse>>> {
    require_read(&claims)?;

    let organizations = state
        .organization_service
        .list_ordered()
        .await?
        .into_iter()
        .map(OrganizationResponse::from)
        .collect();

    Ok(Json(organizations))
}

pub async fn get_organization_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
) -> ApiResult<Json<OrganizationResponse>> {
    require_read(&claims)?;

    let organization = state
        .organization_service
        .find_organization(organization_id)
        .await?;

    Ok(Json(OrganizationResponse::from(organization)))
}

pub async fn ancestors_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
) -> ApiResult<Json<Vec<OrganizationId>>> {
    require_read(&claims)?;

    let chain = state
        .organization_service
        .ancestor_chain(organization_id)
        .await?;

    Ok(Json(chain))
}

pub async fn descendants_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(organization_id): Path<OrganizationId>,
) -> ApiResult<Json<Vec<OrganizationId>>> {
    require_read(&claims)?;

    let descendants = state
        .organization_service
        .descendants(organization_id)
        .await?;

    Ok(Json(descendants))
}

/// Members may always list their own organizations.
pub async fn list_member_organizations_handler(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(member_id): Path<MemberId>,
) -> ApiResult<Json<Vec<OrganizationResponse>>> {
    if claims.member_id() != member_id {
        require_read(&claims)?;
    }

    let organizations = state
        .organization_service
        .list_for_member(member_id)
        .await?
        .into_iter()
        .map(OrganizationResponse::from)
        .collect();

    Ok(Json(organizations))
}
