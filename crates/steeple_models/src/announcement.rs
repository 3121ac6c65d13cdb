use chrono::{DateTime, Utc};
use steeple_json::{DecodeError, JsonObject, JsonReadable, Matchable};

use crate::id_matches;
use crate::user::User;

/// A bulletin announcement posted to a ministry group.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Announcement {
    pub id: Option<i64>,
    pub text: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
    pub group_id: Option<i64>,
    pub image_url: Option<String>,
    pub poster: Option<User>,
}

impl Announcement {
    /// Whether this is a placeholder that still needs a full fetch.
    pub fn needs_reload(&self) -> bool {
        self.text.is_none()
    }

    /// Posting date as `MM/DD/YYYY`.
    pub fn date_string(&self) -> Option<String> {
        self.created_date.map(|d| d.format("%m/%d/%Y").to_string())
    }

    /// `"Posted By: First Last"`, when the poster is known.
    pub fn poster_string(&self) -> Option<String> {
        self.poster
            .as_ref()
            .and_then(User::full_name)
            .map(|name| format!("Posted By: {name}"))
    }
}

impl JsonReadable for Announcement {
    fn read(&mut self, object: &JsonObject) -> Result<(), DecodeError> {
        self.id = object.decode("id")?;
        self.text = object.decode("announcement")?;
        self.created_date = object.decode_date("createdDate");
        self.updated_date = object.decode_date("updatedDate");
        self.group_id = object.decode("groupId")?;
        self.image_url = object.decode("imageUrl")?;
        self.poster = object.decode_object("poster")?;
        Ok(())
    }
}

impl Matchable for Announcement {
    fn is_match(&self, fragment: &JsonObject) -> bool {
        id_matches(self.id, fragment)
    }
}
