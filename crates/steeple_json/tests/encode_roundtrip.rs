use std::sync::Once;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use steeple_json::{DecodeError, JsonObject, JsonReadable};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(steeple_logging::initialize_for_tests);
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Visit {
    id: Option<i64>,
    guest: Option<String>,
    arrived: Option<DateTime<Utc>>,
    welcomed: Option<bool>,
}

impl JsonReadable for Visit {
    fn read(&mut self, object: &JsonObject) -> Result<(), DecodeError> {
        self.id = object.decode("id")?;
        self.guest = object.decode("guest")?;
        self.arrived = object.decode_date("arrived");
        self.welcomed = object.decode("welcomed")?;
        Ok(())
    }

    fn write(&self, object: &mut JsonObject) -> Result<(), DecodeError> {
        object.encode("id", self.id);
        object.encode("guest", self.guest.clone());
        object.encode_date("arrived", self.arrived);
        object.encode("welcomed", self.welcomed);
        Ok(())
    }
}

#[test]
fn roundtrip_restores_all_present_keys() {
    init_logging();
    let original = json!({
        "id": 12,
        "guest": "Naomi",
        "arrived": "2021-06-06T10:15:00.000000Z",
        "welcomed": true,
    });

    let obj = JsonObject::from_value(original.clone()).unwrap();
    let mut visit = Visit::default();
    visit.read(&obj).unwrap();

    let mut encoded = JsonObject::new();
    visit.write(&mut encoded).unwrap();
    assert_eq!(encoded.into_value(), original);
}

#[test]
fn absent_fields_stay_absent_after_roundtrip() {
    init_logging();
    let original = json!({ "id": 3 });

    let obj = JsonObject::from_value(original.clone()).unwrap();
    let mut visit = Visit::default();
    visit.read(&obj).unwrap();

    let mut encoded = JsonObject::new();
    visit.write(&mut encoded).unwrap();
    assert_eq!(encoded.into_value(), original);
}

#[test]
fn encode_defaults_substitute_for_none() {
    init_logging();
    let mut obj = JsonObject::new();
    obj.encode_or::<i64>("count", None, 0);
    obj.encode_or("label", Some("set".to_string()), "unset".to_string());
    let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
    obj.encode_date_or("seen", None, epoch);

    assert_eq!(
        obj.into_value(),
        json!({
            "count": 0,
            "label": "set",
            "seen": "1970-01-01T00:00:00.000000Z",
        })
    );
}

#[test]
fn encode_object_list_writes_one_object_per_element() {
    init_logging();
    let visits = vec![
        Visit {
            id: Some(1),
            guest: Some("Ada".to_string()),
            arrived: None,
            welcomed: Some(false),
        },
        Visit {
            id: Some(2),
            guest: None,
            arrived: None,
            welcomed: None,
        },
    ];

    let mut obj = JsonObject::new();
    obj.encode_object_list("visits", Some(visits.as_slice())).unwrap();
    obj.encode_object::<Visit>("latest", visits.first()).unwrap();

    assert_eq!(
        obj.into_value(),
        json!({
            "visits": [
                { "id": 1, "guest": "Ada", "welcomed": false },
                { "id": 2 },
            ],
            "latest": { "id": 1, "guest": "Ada", "welcomed": false },
        })
    );
}
