//! Tests for the coordinator

use super::*;
use crate::transport::mock::MockBackend;
use std::cell::RefCell;
use std::rc::Rc;
use tempfile::TempDir;

const CONFIG: &str = r#"{
    "device": [
        {
            "name": "Apollo",
            "layout": [
                { "row": 0, "items": [
                    { "type": "volume", "name": "Gain", "id": "gain", "cc": 20 },
                    { "type": "toggle_knob", "name": "Mode", "id": "mode", "cc": 21,
                      "texts": ["Clean", "Drive", "Fuzz"] }
                ]},
                { "row": 1, "items": [
                    { "type": "button", "name": "Bypass", "id": "bypass", "cc": 22 }
                ]}
            ]
        },
        {
            "name": "Dream",
            "layout": [
                { "row": 0, "items": [
                    { "type": "knob", "name": "Level", "id": "level", "cc": 30 }
                ]}
            ]
        }
    ]
}"#;

fn config() -> ControllerConfig {
    serde_json::from_str(CONFIG).unwrap()
}

fn coordinator(dir: &TempDir, backend: MockBackend) -> Coordinator<MockBackend> {
    Coordinator::new(
        config(),
        PersistedState::new(),
        dir.path().join("state.json"),
        backend,
    )
}

fn active_value(coordinator: &Coordinator<MockBackend>, id: &str) -> Option<i32> {
    coordinator
        .active_device()?
        .grid
        .controls()
        .find(|c| c.id == id)
        .map(|c| c.value())
}

#[test]
fn test_refresh_filters_ports_by_device_name() {
    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(
        &dir,
        MockBackend::with_ports(&["UA Apollo Twin", "Generic MIDI"]),
    );

    coordinator.refresh_ports();

    let labels: Vec<_> = coordinator.choices().iter().map(|c| c.label()).collect();
    assert_eq!(labels, vec!["UA Apollo Twin"]);
    assert_eq!(coordinator.selected(), Some(0));
    assert_eq!(
        coordinator.active_device().map(|d| d.name.as_str()),
        Some("Apollo")
    );
    assert_eq!(coordinator.transport().open_port_name(), Some("UA Apollo Twin"));
}

#[test]
fn test_refresh_keeps_backend_port_index() {
    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(
        &dir,
        MockBackend::with_ports(&["Generic MIDI", "UA Dream 65"]),
    );

    coordinator.refresh_ports();

    match &coordinator.choices()[0] {
        PortChoice::Device { port, device } => {
            assert_eq!(port.index, 1);
            assert_eq!(device, "Dream");
        }
        other => panic!("unexpected choice {:?}", other),
    }
    assert_eq!(coordinator.transport().open_port_name(), Some("UA Dream 65"));
}

#[test]
fn test_refresh_without_matches_shows_placeholder() {
    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&dir, MockBackend::with_ports(&["Generic MIDI"]));

    coordinator.refresh_ports();

    assert_eq!(coordinator.choices(), &[PortChoice::NoMatchingDevices]);
    assert!(!coordinator.choices()[0].is_selectable());
    assert_eq!(coordinator.choices()[0].label(), NO_MATCHING_DEVICES);
    assert_eq!(coordinator.selection(), &DeviceSelection::NoDeviceSelected);

    coordinator.select_port(0);
    assert!(!coordinator.transport().is_open());
}

#[test]
fn test_control_change_sends_cc_on_selected_channel() {
    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&dir, MockBackend::with_ports(&["UA Apollo Twin"]));
    coordinator.refresh_ports();
    coordinator.set_channel(3);

    coordinator.set_control_value("gain", 100);
    coordinator.set_control_value("bypass", 1);

    assert_eq!(
        coordinator.transport().backend().sent(),
        vec![vec![0xB2, 20, 100], vec![0xB2, 22, 1]]
    );
}

#[test]
fn test_unchanged_value_sends_nothing() {
    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&dir, MockBackend::with_ports(&["UA Apollo Twin"]));
    coordinator.refresh_ports();

    coordinator.set_control_value("gain", 0);
    coordinator.set_control_value("missing", 5);

    assert!(coordinator.transport().backend().sent().is_empty());
}

#[test]
fn test_channel_is_clamped() {
    let dir = TempDir::new().unwrap();
    let mut coordinator = coordinator(&dir, MockBackend::default());

    coordinator.set_channel(17);
    assert_eq!(coordinator.channel(), 16);
    coordinator.set_channel(0);
    assert_eq!(coordinator.channel(), 1);
}

#[test]
fn test_switching_devices_persists_before_opening_next_port() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");

    let seen_at_connect: Rc<RefCell<Vec<(String, PersistedState)>>> = Rc::default();
    let mut backend = MockBackend::with_ports(&["UA Apollo Twin", "UA Dream 65"]);
    {
        let seen = seen_at_connect.clone();
        let path = state_path.clone();
        backend.on_connect(move |port| {
            let state = PersistedState::load(&path).unwrap();
            seen.borrow_mut().push((port.to_string(), state));
        });
    }

    let mut coordinator = coordinator(&dir, backend);
    coordinator.refresh_ports();
    coordinator.set_control_value("gain", 90);
    coordinator.set_control_value("mode", 2);

    coordinator.select_port(1);
    assert_eq!(
        coordinator.active_device().map(|d| d.name.as_str()),
        Some("Dream")
    );

    {
        let seen = seen_at_connect.borrow();
        let (port, state) = seen.last().unwrap();
        assert_eq!(port, "UA Dream 65");
        assert_eq!(state.value("Apollo", "gain"), Some(90));
        assert_eq!(state.value("Apollo", "mode"), Some(2));
    }

    coordinator.select_port(0);
    assert_eq!(active_value(&coordinator, "gain"), Some(90));
    assert_eq!(active_value(&coordinator, "mode"), Some(2));
    assert_eq!(active_value(&coordinator, "bypass"), Some(0));
}

#[test]
fn test_restored_values_are_sent_to_device() {
    let dir = TempDir::new().unwrap();
    let mut state = PersistedState::new();
    state.record_device(
        "Apollo",
        [("gain".to_string(), 64), ("bypass".to_string(), 0)]
            .into_iter()
            .collect(),
    );

    let mut coordinator = Coordinator::new(
        config(),
        state,
        dir.path().join("state.json"),
        MockBackend::with_ports(&["UA Apollo Twin"]),
    );
    coordinator.refresh_ports();

    // bypass already matches its default, so only gain is sent
    assert_eq!(
        coordinator.transport().backend().sent(),
        vec![vec![0xB0, 20, 64]]
    );
}

#[test]
fn test_out_of_range_saved_values_are_clamped() {
    let dir = TempDir::new().unwrap();
    let mut state = PersistedState::new();
    state.record_device(
        "Apollo",
        [("mode".to_string(), 9), ("gain".to_string(), 500)]
            .into_iter()
            .collect(),
    );

    let mut coordinator = Coordinator::new(
        config(),
        state,
        dir.path().join("state.json"),
        MockBackend::with_ports(&["UA Apollo Twin"]),
    );
    coordinator.refresh_ports();

    assert_eq!(active_value(&coordinator, "mode"), Some(2));
    assert_eq!(active_value(&coordinator, "gain"), Some(127));
}

#[test]
fn test_shutdown_flushes_state_and_closes_port() {
    let dir = TempDir::new().unwrap();
    let state_path = dir.path().join("state.json");
    let mut coordinator = coordinator(&dir, MockBackend::with_ports(&["UA Apollo Twin"]));
    coordinator.refresh_ports();
    coordinator.set_control_value("bypass", 1);

    coordinator.shutdown();

    let saved = PersistedState::load(&state_path).unwrap();
    assert_eq!(saved.value("Apollo", "bypass"), Some(1));
    assert_eq!(saved.value("Apollo", "gain"), Some(0));
    assert!(!coordinator.transport().is_open());
}

#[test]
fn test_startup_with_missing_config_raises_notice() {
    let dir = TempDir::new().unwrap();
    let mut coordinator = Coordinator::startup(
        &dir.path().join("controls.json"),
        &dir.path().join("state.json"),
        MockBackend::with_ports(&["UA Apollo Twin"]),
    );

    let notices = coordinator.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Config Error");
    assert!(coordinator.config().is_empty());
    assert!(coordinator.take_notices().is_empty());

    coordinator.refresh_ports();
    assert_eq!(coordinator.choices(), &[PortChoice::NoMatchingDevices]);
}

#[test]
fn test_startup_ignores_malformed_state() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("controls.json");
    let state_path = dir.path().join("state.json");
    std::fs::write(&config_path, CONFIG).unwrap();
    std::fs::write(&state_path, "{ broken").unwrap();

    let mut coordinator =
        Coordinator::startup(&config_path, &state_path, MockBackend::default());

    assert!(coordinator.take_notices().is_empty());
    assert!(coordinator.state().is_empty());
    assert_eq!(coordinator.config().devices.len(), 2);
}

#[test]
fn test_edits_reach_the_control_at_their_slot() {
    let dir = TempDir::new().unwrap();
    let config: ControllerConfig = serde_json::from_str(
        r#"{ "device": [ { "name": "Apollo", "layout": [ { "row": 0, "items": [
            { "type": "knob", "name": "A", "cc": 10 },
            { "type": "knob", "name": "B", "cc": 11 } ] } ] } ] }"#,
    )
    .unwrap();
    let mut coordinator = Coordinator::new(
        config,
        PersistedState::new(),
        dir.path().join("state.json"),
        MockBackend::with_ports(&["UA Apollo Twin"]),
    );
    coordinator.refresh_ports();

    coordinator.set_control_at(ControlSlot { row: 0, column: 1 }, 50);
    coordinator.set_control_value("", 70);

    let values: Vec<_> = coordinator
        .active_device()
        .unwrap()
        .grid
        .controls()
        .map(|c| c.value())
        .collect();
    assert_eq!(values, vec![0, 50]);
    assert_eq!(
        coordinator.transport().backend().sent(),
        vec![vec![0xB0, 11, 50]]
    );
}

#[test]
fn test_startup_accepts_option_knob_without_texts() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("controls.json");
    std::fs::write(
        &config_path,
        r#"{ "device": [ { "name": "Apollo", "layout": [ { "row": 0, "items": [
            { "type": "knob", "id": "gain", "cc": 20 },
            { "type": "toggle", "id": "mode", "cc": 21 } ] } ] } ] }"#,
    )
    .unwrap();

    let mut coordinator = Coordinator::startup(
        &config_path,
        &dir.path().join("state.json"),
        MockBackend::with_ports(&["UA Apollo Twin"]),
    );

    assert!(coordinator.take_notices().is_empty());
    coordinator.refresh_ports();
    assert_eq!(coordinator.active_device().map(|d| d.grid.len()), Some(2));
    assert_eq!(active_value(&coordinator, "mode"), Some(0));
}
