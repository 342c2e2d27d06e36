//! Fiber-switch programming against a mock REST session.

use pretty_assertions::assert_eq;
use roadm_driver_common::{
    DeviceDiscovery, DeviceType, Document, DriverConfig, FlowRuleProgrammable, LambdaQuery,
    RestSession, SessionRegistry,
};
use roadm_driver_test::{
    fiber_rule, och_signal, replies, switch_device, MockRestSession, StaticFlowStore,
};
use roadm_polatis::{ApplyOutcome, PolatisDriver};
use roadm_types::{FlowEntryState, FlowRule, PortKind, PortNumber};
use serde_json::json;
use std::sync::Arc;

fn driver(session: Arc<MockRestSession>, intent: Vec<FlowRule>) -> PolatisDriver {
    let registry = SessionRegistry::<dyn RestSession>::new();
    registry.register(switch_device(), session);
    PolatisDriver::new(
        switch_device(),
        Arc::new(DriverConfig::default()),
        Arc::new(registry),
        Arc::new(StaticFlowStore::new().with_rules(switch_device(), intent)),
    )
}

fn patch_bodies(session: &MockRestSession) -> Vec<serde_json::Value> {
    session
        .patches()
        .into_iter()
        .map(|(path, body)| {
            assert_eq!(path, "/connections/");
            body.into_value()
        })
        .collect()
}

#[test]
fn test_apply_and_remove() {
    let session = Arc::new(MockRestSession::new());
    let d = driver(session.clone(), Vec::new());

    let rules = vec![fiber_rule(1, 17), fiber_rule(2, 18)];
    assert_eq!(d.apply_flow_rules(&rules), rules);
    assert_eq!(d.remove_flow_rules(&rules[..1]), rules[..1].to_vec());

    assert_eq!(
        patch_bodies(&session),
        vec![
            json!({"1": 17}),
            json!({"2": 18}),
            json!({"remove": {"1": 17}}),
        ]
    );
}

#[test]
fn test_channel_rules_are_skipped() {
    let session = Arc::new(MockRestSession::new());
    let d = driver(session.clone(), Vec::new());

    let rule = fiber_rule(1, 17).with_och_signal(och_signal(0));
    assert_eq!(d.connect(&rule).unwrap(), ApplyOutcome::Skipped);
    assert!(d.apply_flow_rules(&[rule]).is_empty());
    assert!(session.patches().is_empty());
}

#[test]
fn test_rejected_patch() {
    let session = Arc::new(MockRestSession::new());
    session.set_patch_status(500);
    let d = driver(session, Vec::new());
    assert!(d.apply_flow_rules(&[fiber_rule(1, 17)]).is_empty());
}

#[test]
fn test_missing_session() {
    let registry = SessionRegistry::<dyn RestSession>::new();
    let d = PolatisDriver::new(
        switch_device(),
        Arc::new(DriverConfig::default()),
        Arc::new(registry),
        Arc::new(StaticFlowStore::new()),
    );
    assert!(d.apply_flow_rules(&[fiber_rule(1, 17)]).is_empty());
    assert!(d.get_flow_entries().is_empty());
    assert!(d.discover_port_details().is_empty());
}

#[test]
fn test_read_back_matches_intent() {
    let session = Arc::new(
        MockRestSession::new()
            .with_response("/connections/", replies::switch_connections(&[(1, 17), (2, 18)])),
    );
    let d = driver(session.clone(), vec![fiber_rule(1, 17), fiber_rule(2, 18)]);

    let entries = d.get_flow_entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.state == FlowEntryState::Added));
    assert_eq!(entries[0].rule.in_port, PortNumber::new(1));
    assert_eq!(entries[0].rule.out_port, Some(PortNumber::new(17)));
    assert_eq!(entries[0].rule.priority, 88);
    assert!(session.patches().is_empty());
}

#[test]
fn test_intent_priority_does_not_trigger_repair() {
    let session = Arc::new(
        MockRestSession::new()
            .with_response("/connections/", replies::switch_connections(&[(1, 17)])),
    );
    let intent = fiber_rule(1, 17).with_priority(40000).with_cookie(7);
    let d = driver(session.clone(), vec![intent]);

    assert_eq!(d.get_flow_entries().len(), 1);
    assert_eq!(d.get_flow_entries().len(), 1);
    assert!(session.patches().is_empty());
}

#[test]
fn test_diverging_entry_is_repaired() {
    let session = Arc::new(MockRestSession::new().with_response(
        "/connections/",
        replies::switch_connections(&[(1, 20), (5, 9)]),
    ));
    let d = driver(session.clone(), vec![fiber_rule(1, 17)]);

    let entries = d.get_flow_entries();
    let observed: Vec<(u64, Option<u64>)> = entries
        .iter()
        .map(|e| (e.rule.in_port.as_u64(), e.rule.out_port.map(|p| p.as_u64())))
        .collect();
    assert_eq!(observed, vec![(1, Some(20)), (5, Some(9))]);

    // 5 -> 9 is unmanaged and left alone
    assert_eq!(patch_bodies(&session), vec![json!({"1": 17})]);
}

#[test]
fn test_malformed_connection_map() {
    let session = Arc::new(MockRestSession::new().with_response(
        "/connections/",
        Document::new(json!({"1": 17, "x": 2, "3": null})),
    ));
    let d = driver(session.clone(), Vec::new());
    assert_eq!(d.get_flow_entries().len(), 1);

    session.set_response("/connections/", Document::new(json!([1, 2])));
    assert!(d.get_flow_entries().is_empty());
}

#[test]
fn test_discovery() {
    let session = Arc::new(
        MockRestSession::new().with_response("/ports/", replies::switch_ports(&[1, 2], &[17, 18])),
    );
    let d = driver(session.clone(), Vec::new());

    let description = d.discover_device_details().unwrap();
    assert_eq!(description.device_type, DeviceType::FiberSwitch);
    assert_eq!(description.vendor, "HPN");
    assert_eq!(description.serial_number, "1111");
    assert_eq!(description.chassis_id, "1111");

    let ports = d.discover_port_details();
    let names: Vec<_> = ports.iter().filter_map(|p| p.port_name()).collect();
    assert_eq!(names, vec!["port-1", "port-2", "port-17", "port-18"]);
    assert!(ports.iter().all(|p| matches!(p.kind, PortKind::Oms { .. })));
    assert_eq!(session.gets(), vec!["/ports/"]);

    assert_eq!(d.query_lambdas(PortNumber::new(1)).len(), 96);
}
