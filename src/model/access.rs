//! Role policy, checked once at this boundary instead of ad hoc per
//! route.

use crate::{
    model::error::{DatabaseError, DatabaseResult},
    web::{AuthenticatedUser, UserRole},
};

/// The operations the HTTP surface exposes, as the policy sees them.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    BrowseCatalog,
    SubmitAnswers,
    AuthorExercises,
    ViewDashboard,
}

/// Allow or deny `op` for `actor`. Authoring and dashboard reads are
/// admin-only; everything else is open to any authenticated identity.
pub fn authorize(actor: &AuthenticatedUser, op: Operation) -> DatabaseResult<()> {
    match op {
        Operation::BrowseCatalog | Operation::SubmitAnswers => Ok(()),
        Operation::AuthorExercises | Operation::ViewDashboard => match actor.user_role() {
            UserRole::Admin => Ok(()),
            UserRole::Student => Err(DatabaseError::Forbidden),
        },
    }
}

/// Where to send a user right after signin.
pub fn post_login_destination(role: &UserRole) -> &'static str {
    match role {
        UserRole::Admin => "/admin/dashboard",
        UserRole::Student => "/student/dashboard",
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use uuid::Uuid;

    fn student() -> AuthenticatedUser {
        AuthenticatedUser::new(Uuid::new_v4(), "Student".into(), UserRole::Student)
    }

    fn admin() -> AuthenticatedUser {
        AuthenticatedUser::new(Uuid::new_v4(), "Admin".into(), UserRole::Admin)
    }

    #[test]
    fn students_cannot_author_or_view_dashboards() {
        let s = student();
        assert!(authorize(&s, Operation::AuthorExercises).is_err());
        assert!(authorize(&s, Operation::ViewDashboard).is_err());
        assert!(authorize(&s, Operation::BrowseCatalog).is_ok());
        assert!(authorize(&s, Operation::SubmitAnswers).is_ok());
    }

    #[test]
    fn admins_are_allowed_everything() {
        let a = admin();
        assert!(authorize(&a, Operation::AuthorExercises).is_ok());
        assert!(authorize(&a, Operation::ViewDashboard).is_ok());
        assert!(authorize(&a, Operation::SubmitAnswers).is_ok());
    }

    #[test]
    fn post_login_destination_is_role_determined() {
        assert_eq!(post_login_destination(&UserRole::Admin), "/admin/dashboard");
        assert_eq!(
            post_login_destination(&UserRole::Student),
            "/student/dashboard"
        );
    }
}
