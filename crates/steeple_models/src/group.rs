use steeple_json::{
    DecodeError, JsonObject, JsonReadable, ManagedJsonInstantiable, Matchable,
};

use crate::id_matches;

/// A ministry group members can browse and join.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Group {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub chairperson: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
}

impl Group {
    /// Whether this is a placeholder that still needs a full fetch.
    pub fn needs_reload(&self) -> bool {
        self.name.is_none()
    }
}

impl JsonReadable for Group {
    fn read(&mut self, object: &JsonObject) -> Result<(), DecodeError> {
        self.id = object.decode("id")?;
        self.name = object.decode("name")?;
        self.description = object.decode("description")?;
        self.chairperson = object.decode("chairperson")?;
        self.email = object.decode("email")?;
        self.phone = object.decode("phone")?;
        self.image_url = object.decode("imageUrl")?;
        Ok(())
    }

    fn write(&self, object: &mut JsonObject) -> Result<(), DecodeError> {
        object.encode("id", self.id);
        object.encode("name", self.name.clone());
        object.encode("description", self.description.clone());
        object.encode("chairperson", self.chairperson.clone());
        object.encode("email", self.email.clone());
        object.encode("phone", self.phone.clone());
        object.encode("imageUrl", self.image_url.clone());
        Ok(())
    }
}

impl Matchable for Group {
    fn is_match(&self, fragment: &JsonObject) -> bool {
        id_matches(self.id, fragment)
    }
}

impl ManagedJsonInstantiable for Group {
    fn entity_name() -> &'static str {
        "Group"
    }

    fn match_keys() -> Option<(&'static str, &'static str)> {
        Some(("id", "id"))
    }
}
