use serde::Serialize;

use crate::model::entity::UserEntity;

#[derive(Serialize, utoipa::ToSchema)]
pub struct SigninResponse {
    pub user: UserEntity,
    /// Role-determined dashboard path the client should navigate to.
    pub redirect_to: &'static str,
}
