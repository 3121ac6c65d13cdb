use chrono::{DateTime, Utc};
use steeple_json::{
    CollectionOperation, DecodeError, JsonObject, JsonReadable, Matchable,
};

use crate::group::Group;
use crate::id_matches;

/// A calendar event, optionally hosted by one or more ministry groups.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Event {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub more_information: Option<String>,
    pub image_url: Option<String>,
    pub groups: Option<Vec<Group>>,
}

impl Event {
    /// A placeholder event (typically only an id known) that still needs a
    /// full fetch before it can be displayed.
    pub fn needs_reload(&self) -> bool {
        self.title.is_none() || self.start_time.is_none()
    }

    /// Abbreviated month of the start time, e.g. `Mar`.
    pub fn month_string(&self) -> Option<String> {
        self.start_time.map(|t| t.format("%b").to_string())
    }

    /// Day-of-month of the start time, e.g. `21`.
    pub fn date_string(&self) -> Option<String> {
        self.start_time.map(|t| t.format("%d").to_string())
    }
}

impl JsonReadable for Event {
    fn read(&mut self, object: &JsonObject) -> Result<(), DecodeError> {
        self.id = object.decode("id")?;
        self.title = object.decode("title")?;
        self.description = object.decode("description")?;
        self.start_time = object.decode_date("startTime");
        self.end_time = object.decode_date("endTime");
        self.more_information = object.decode("moreInformation")?;
        self.image_url = object.decode("imageUrl")?;
        self.groups =
            object.decode_matched_list("groups", None, CollectionOperation::Replace)?;
        Ok(())
    }

    fn write(&self, object: &mut JsonObject) -> Result<(), DecodeError> {
        object.encode("id", self.id);
        object.encode("title", self.title.clone());
        object.encode("description", self.description.clone());
        object.encode_date("startTime", self.start_time);
        object.encode_date("endTime", self.end_time);
        object.encode("moreInformation", self.more_information.clone());
        object.encode("imageUrl", self.image_url.clone());
        object.encode_object_list("groups", self.groups.as_deref())?;
        Ok(())
    }
}

impl Matchable for Event {
    fn is_match(&self, fragment: &JsonObject) -> bool {
        id_matches(self.id, fragment)
    }
}
