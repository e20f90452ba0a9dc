use axum::Json;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(title = "NexaUI API", description = "Account and profile backend"),
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::auth::refresh,
        crate::routes::profile::get_profile,
        crate::routes::profile::update_profile,
        crate::routes::profile::get_public_profile,
        crate::routes::profile::reset_profile
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::error::FieldErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::SignupRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::UserResponse,
            crate::routes::auth::SessionResponse,
            crate::routes::auth::CurrentUserResponse,
            crate::routes::auth::TokenResponse,
            crate::routes::auth::MessageResponse,
            crate::routes::profile::UpdateProfileRequest,
            crate::routes::profile::ProfileResponse,
            crate::routes::profile::UpdatedProfileResponse,
            crate::routes::profile::PublicProfileResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Signup, login and bearer token management"),
        (name = "Profile", description = "Profile extension records")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("JWT".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
