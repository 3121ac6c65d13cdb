//! Domain objects for the church community client: events, ministries,
//! announcements, prayers, and the memberships linking users to them.
//!
//! Every type decodes from JSON through `steeple_json`; types the backend
//! identifies by `id` also implement `Matchable` so callers can reconcile
//! refreshed lists against ones they already hold.
mod announcement;
mod event;
mod group;
mod membership;
mod prayer;
mod user;

pub use announcement::Announcement;
pub use event::Event;
pub use group::Group;
pub use membership::{UserEvent, UserGroup};
pub use prayer::Prayer;
pub use user::User;

use steeple_json::JsonObject;

/// Matches a fragment against an optional local id; shared by every model
/// whose identity key is `id`.
fn id_matches(id: Option<i64>, fragment: &JsonObject) -> bool {
    match (id, fragment.decode::<i64>("id")) {
        (Some(mine), Ok(Some(theirs))) => mine == theirs,
        _ => false,
    }
}
