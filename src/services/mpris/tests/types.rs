use crate::services::mpris::types::{
    LoopStatus, MprisInterface, PLAYER_INTERFACE, PlayerMethod, PlayerProperty, ROOT_INTERFACE,
    RootMethod, RootProperty,
};

#[test]
fn interface_names_parse() {
    assert_eq!(
        MprisInterface::from_name(ROOT_INTERFACE),
        Some(MprisInterface::Root)
    );
    assert_eq!(
        MprisInterface::from_name(PLAYER_INTERFACE),
        Some(MprisInterface::Player)
    );
    assert_eq!(MprisInterface::from_name("org.example.Other"), None);
    assert_eq!(MprisInterface::Player.name(), PLAYER_INTERFACE);
}

#[test]
fn every_property_name_parses_back() {
    for property in RootProperty::ALL {
        assert_eq!(RootProperty::from_name(property.name()), Some(property));
    }
    for property in PlayerProperty::ALL {
        assert_eq!(PlayerProperty::from_name(property.name()), Some(property));
    }
    assert_eq!(PlayerProperty::from_name("NoSuchProp"), None);
}

#[test]
fn get_all_set_leaves_out_only_position() {
    let missing: Vec<_> = PlayerProperty::ALL
        .into_iter()
        .filter(|p| !PlayerProperty::GET_ALL.contains(p))
        .collect();

    assert_eq!(missing, vec![PlayerProperty::Position]);
}

#[test]
fn method_names_parse() {
    assert_eq!(RootMethod::from_name("Raise"), Some(RootMethod::Raise));
    assert_eq!(RootMethod::from_name("Quit"), Some(RootMethod::Quit));
    assert_eq!(
        PlayerMethod::from_name("SetPosition"),
        Some(PlayerMethod::SetPosition)
    );
    assert_eq!(PlayerMethod::from_name("Shuffle"), None);
}

#[test]
fn loop_status_names() {
    for status in [LoopStatus::None, LoopStatus::Track, LoopStatus::Playlist] {
        assert_eq!(LoopStatus::from_name(status.as_str()), Some(status));
    }
    assert_eq!(LoopStatus::from_name("Forever"), None);
}
