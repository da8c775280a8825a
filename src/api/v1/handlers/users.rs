use axum::Json;

use crate::api::v1::dto::users::MeResponse;
use crate::api::v1::extractors::AuthCtx;

/// Return the principal attached to the current request.
///
/// The route policy keeps anonymous requests out of here; the extractor's
/// 401 rejection only backstops a misconfigured table.
pub async fn me(ctx: AuthCtx) -> Json<MeResponse> {
    Json(MeResponse {
        id: ctx.principal.user_id,
        username: ctx.principal.username,
        email: ctx.principal.email,
    })
}
