use std::collections::BTreeMap;

use zbus::{
    Message,
    message::Flags,
    zvariant::{ObjectPath, Value},
};

use crate::services::mpris::{
    MprisError,
    bus::{child_nodes, expects_reply, node_xml, to_dict, to_value},
    types::{NO_TRACK_PATH, PEER_INTERFACE, PLAYER_OBJECT_PATH, PropertyValue},
};

#[test]
fn scalars_encode_directly() {
    assert_eq!(to_value(&PropertyValue::Bool(true)).unwrap(), Value::from(true));
    assert_eq!(to_value(&PropertyValue::Double(0.5)).unwrap(), Value::from(0.5));
    assert_eq!(to_value(&PropertyValue::Int64(-7)).unwrap(), Value::from(-7i64));
    assert_eq!(
        to_value(&PropertyValue::Str("Paused".to_string())).unwrap(),
        Value::from("Paused")
    );
}

#[test]
fn object_paths_are_validated() {
    let path = to_value(&PropertyValue::ObjectPath(NO_TRACK_PATH.to_string())).unwrap();
    assert_eq!(
        path,
        Value::from(ObjectPath::try_from(NO_TRACK_PATH).unwrap())
    );

    let err = to_value(&PropertyValue::ObjectPath("not a path".to_string())).unwrap_err();
    assert!(matches!(err, MprisError::InvalidValue(_)));
}

#[test]
fn maps_encode_as_dicts() {
    let map = BTreeMap::from([
        (
            "mpris:trackid".to_string(),
            PropertyValue::ObjectPath(NO_TRACK_PATH.to_string()),
        ),
        (
            "xesam:artist".to_string(),
            PropertyValue::StrList(vec!["Someone".to_string()]),
        ),
    ]);

    let dict = to_dict(&map).unwrap();
    assert_eq!(dict.len(), 2);
    assert!(matches!(dict.get("mpris:trackid"), Some(Value::ObjectPath(_))));
    assert!(matches!(dict.get("xesam:artist"), Some(Value::Array(_))));

    let value = to_value(&PropertyValue::Map(map)).unwrap();
    assert!(matches!(value, Value::Dict(_)));
}

#[test]
fn ancestors_list_the_next_segment() {
    let exported = [PLAYER_OBJECT_PATH];

    assert_eq!(child_nodes("/", exported), vec!["org"]);
    assert_eq!(child_nodes("/org", exported), vec!["mpris"]);
    assert_eq!(child_nodes("/org/mpris", exported), vec!["MediaPlayer2"]);
}

#[test]
fn non_ancestors_have_no_children() {
    let exported = [PLAYER_OBJECT_PATH];

    assert!(child_nodes(PLAYER_OBJECT_PATH, exported).is_empty());
    assert!(child_nodes("/org/mp", exported).is_empty());
    assert!(child_nodes("/com", exported).is_empty());
    assert!(child_nodes("/", [] as [&str; 0]).is_empty());
}

#[test]
fn children_are_deduplicated_and_sorted() {
    let exported = ["/org/b/one", "/org/a", "/org/b/two", "/com/x"];

    assert_eq!(child_nodes("/org", exported), vec!["a", "b"]);
    assert_eq!(child_nodes("/", exported), vec!["com", "org"]);
}

#[test]
fn node_xml_names_each_child() {
    let xml = node_xml(&["mpris".to_string()]);

    assert!(xml.starts_with("<!DOCTYPE node"));
    assert!(xml.contains(r#"<node name="mpris"/>"#));
    assert!(xml.trim_end().ends_with("</node>"));
}

#[test]
fn no_reply_flag_is_honoured() {
    let call = Message::method_call(PLAYER_OBJECT_PATH, "Ping")
        .unwrap()
        .interface(PEER_INTERFACE)
        .unwrap()
        .build(&())
        .unwrap();
    assert!(expects_reply(&call.header()));

    let one_way = Message::method_call(PLAYER_OBJECT_PATH, "Ping")
        .unwrap()
        .interface(PEER_INTERFACE)
        .unwrap()
        .with_flags(Flags::NoReplyExpected)
        .unwrap()
        .build(&())
        .unwrap();
    assert!(!expects_reply(&one_way.header()));
}
