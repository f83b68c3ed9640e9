use time::OffsetDateTime;

use crate::users::dto::UpdateUserInfo;
use crate::users::repo_types::{UserAssignments, UserUpdate};
use crate::users::role::role_to_db;

/// Turn an update payload into column assignments.
///
/// An empty `name` or `email` counts as not provided, so neither field can be
/// blanked through an update. A role that does not encode is ignored rather
/// than rejected. When nothing survives, the result is [`UserUpdate::Noop`]
/// and `updated_at` is left untouched.
pub fn build_update(info: &UpdateUserInfo, now: OffsetDateTime) -> UserUpdate {
    let name = non_empty(info.name.as_deref());
    let email = non_empty(info.email.as_deref());
    let role = role_to_db(info.role).ok();

    if name.is_none() && email.is_none() && role.is_none() {
        return UserUpdate::Noop;
    }

    UserUpdate::Assign(UserAssignments {
        name,
        email,
        role,
        updated_at: now,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}
