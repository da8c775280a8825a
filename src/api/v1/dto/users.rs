use serde::Serialize;
use uuid::Uuid;

/// The principal attached to the current request, as handlers expose it.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}
