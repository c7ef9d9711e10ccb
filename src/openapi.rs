//! OpenAPI documentation configuration.
//!
//! Generates the OpenAPI specification with `utoipa` and serves it via
//! Swagger UI at `/swagger-ui`.

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warden API",
        version = "1.0.0",
        description = "Users/roles demo service with a seeded bootstrap and an \
        access-gated admin API.\n\n\
        ## Authentication\n\
        Admin endpoints require a bearer token for an active account.\n\
        1. Login with the seeded admin credentials to get an access token\n\
        2. Include the token in requests: `Authorization: Bearer <token>`\n\n\
        Requests without a valid token are redirected to `/login`.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "Index", description = "Index page"),
        (name = "Authentication", description = "Login and registration"),
        (name = "Admin", description = "User and role administration")
    ),
    paths(
        crate::handlers::index::index,

        crate::handlers::auth::login_page,
        crate::handlers::auth::login,
        crate::handlers::auth::register,

        crate::handlers::admin::list_users,
        crate::handlers::admin::create_user,
        crate::handlers::admin::get_user,
        crate::handlers::admin::update_user,
        crate::handlers::admin::delete_user,
        crate::handlers::admin::list_roles,
        crate::handlers::admin::create_role,
        crate::handlers::admin::user_roles,
        crate::handlers::admin::assign_role,
        crate::handlers::admin::unassign_role,
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_router() -> Router {
    Router::new().merge(
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_includes_admin_paths() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/"));
        assert!(spec.paths.paths.contains_key("/login"));
        assert!(spec.paths.paths.contains_key("/admin/users"));
        assert!(spec.paths.paths.contains_key("/admin/users/{user_id}/roles"));
    }
}
