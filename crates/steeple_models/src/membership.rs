use steeple_json::{DecodeError, JsonObject, JsonReadable};

use crate::event::Event;
use crate::group::Group;
use crate::user::User;

/// A user's attendance record for an event.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserEvent {
    pub id: Option<i64>,
    pub is_attending: Option<bool>,
    pub user: Option<User>,
    pub event: Option<Event>,
}

impl JsonReadable for UserEvent {
    fn read(&mut self, object: &JsonObject) -> Result<(), DecodeError> {
        self.id = object.decode("id")?;
        self.is_attending = object.decode("isAttending")?;
        self.user = object.decode_object("user")?;
        self.event = object.decode_object("event")?;
        Ok(())
    }
}

/// A user's membership in a ministry group.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserGroup {
    pub id: Option<i64>,
    pub user: Option<User>,
    pub group: Option<Group>,
}

impl JsonReadable for UserGroup {
    fn read(&mut self, object: &JsonObject) -> Result<(), DecodeError> {
        self.id = object.decode("id")?;
        self.user = object.decode_object("user")?;
        self.group = object.decode_object("group")?;
        Ok(())
    }
}
