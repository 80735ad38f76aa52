//! Authentication and role gates

pub(crate) mod middleware;

pub(crate) use middleware::{handler, require_admin, require_moderator, require_user};
