use steeple_json::{DecodeError, JsonObject, JsonReadable, Matchable};

use crate::id_matches;

/// A registered member of the congregation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl User {
    /// `"First Last"`, when both names are known.
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        }
    }
}

impl JsonReadable for User {
    fn read(&mut self, object: &JsonObject) -> Result<(), DecodeError> {
        self.id = object.decode("id")?;
        self.first_name = object.decode("firstName")?;
        self.last_name = object.decode("lastName")?;
        Ok(())
    }

    fn write(&self, object: &mut JsonObject) -> Result<(), DecodeError> {
        object.encode("id", self.id);
        object.encode("firstName", self.first_name.clone());
        object.encode("lastName", self.last_name.clone());
        Ok(())
    }
}

impl Matchable for User {
    fn is_match(&self, fragment: &JsonObject) -> bool {
        id_matches(self.id, fragment)
    }
}
