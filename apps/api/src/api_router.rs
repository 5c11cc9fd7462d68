use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;
use warden_core::AppError;

use crate::handlers::{auth, health, organizations, permissions, roles};
use crate::middleware;
use crate::state::AppState;

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/api/auth/session", get(auth::session_handler))
        .route(
            "/api/permissions",
            get(permissions::list_permissions_handler)
                .post(permissions::create_permission_handler),
        )
        .route(
            "/api/permissions/{permission_id}",
            get(permissions::get_permission_handler)
                .put(permissions::update_permission_handler)
                .delete(permissions::delete_permission_handler),
        )
        .route(
            "/api/roles",
            get(roles::list_roles_handler).post(roles::create_role_handler),
        )
        .route(
            "/api/roles/{role_id}",
            get(roles::get_role_handler)
                .put(roles::update_role_handler)
                .delete(roles::delete_role_handler),
        )
        .route(
            "/api/organizations",
            get(organizations::list_organizations_handler)
                .post(organizations::create_organization_handler),
        )
        .route(
            "/api/organizations/order",
            put(organizations::resequence_siblings_handler),
        )
        .route(
            "/api/organizations/{organization_id}",
            get(organizations::get_organization_handler)
                .put(organizations::rename_organization_handler)
                .delete(organizations::delete_organization_handler),
        )
        .route(
            "/api/organizations/{organization_id}/parent",
            put(organizations::move_organization_handler),
        )
        .route(
            "/api/organizations/{organization_id}/ancestors",
            get(organizations::ancestors_handler),
        )
        .route(
            "/api/organizations/{organization_id}/descendants",
            get(organizations::descendants_handler),
        )
        .route(
            "/api/organizations/{organization_id}/roles",
            put(organizations::assign_roles_handler),
        )
        .route(
            "/api/organizations/{organization_id}/members",
            put(organizations::assign_members_handler).post(organizations::add_members_handler),
        )
        .route(
            "/api/organizations/{organization_id}/members/remove",
            post(organizations::remove_members_handler),
        )
        .route(
            "/api/members/{member_id}/organizations",
            get(organizations::list_member_organizations_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_session,
        ));

    Ok(Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/auth/sign-in", post(auth::sign_in_handler))
        .route("/api/auth/refresh", post(auth::refresh_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
