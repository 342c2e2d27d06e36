//! End-to-end cross-connect programming against a recording NETCONF session.

use pretty_assertions::assert_eq;
use roadm_driver_common::{
    DeviceDiscovery, DeviceType, DriverConfig, DriverError, FlowRuleProgrammable, LambdaQuery,
    NetconfSession, PowerConfig, SessionRegistry,
};
use roadm_driver_test::roadm_ports::*;
use roadm_driver_test::{
    created_connection, created_interfaces, cross_connect, deleted_names, has_deletes, och_signal,
    replies, roadm_device, roadm_ports, EditFailure, RecordedOp, RecordingSession, StaticInventory,
};
use roadm_openroadm::{ConnectionCacheManager, LinkType, OpenRoadmDriver};
use roadm_types::{ChannelSpacing, FlowEntryState, OchSignal, PortKind, PortNumber};
use std::sync::Arc;

const ADD_CONNECTION: &str = "SRG1-PP1-TX-196.0-to-NMC-CTP-DEG2-TTP-RX-196.0";
const EXPRESS_CONNECTION: &str = "NMC-CTP-DEG1-TTP-RX-191.35-to-NMC-CTP-DEG2-TTP-TX-191.35";

struct Harness {
    session: Arc<RecordingSession>,
    caches: Arc<ConnectionCacheManager>,
    driver: OpenRoadmDriver,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(DriverConfig::default())
    }

    fn with_config(config: DriverConfig) -> Self {
        Self::build(config, Arc::new(RecordingSession::new()), true)
    }

    fn build(config: DriverConfig, session: Arc<RecordingSession>, register: bool) -> Self {
        let registry = SessionRegistry::<dyn NetconfSession>::new();
        if register {
            registry.register(roadm_device(), session.clone());
        }
        let inventory = StaticInventory::new().with_ports(roadm_device(), roadm_ports::all());
        let caches = Arc::new(ConnectionCacheManager::new());
        let driver = OpenRoadmDriver::new(
            roadm_device(),
            Arc::new(config),
            Arc::new(registry),
            Arc::new(inventory),
            caches.clone(),
        );
        Self {
            session,
            caches,
            driver,
        }
    }

    fn cached(&self) -> usize {
        self.caches.size(&roadm_device())
    }
}

#[test]
fn test_express_create_sequence() {
    let h = Harness::new();
    let conn = h
        .driver
        .apply(&cross_connect(DEG1_RX, DEG2_TX, -35))
        .unwrap();

    assert_eq!(conn.link_type, LinkType::Express);
    assert_eq!(conn.name, EXPRESS_CONNECTION);

    let edits = h.session.edits();
    assert_eq!(edits.len(), 3);
    assert_eq!(
        created_interfaces(&edits[0]),
        vec!["MC-TTP-DEG1-TTP-RX-191.35", "MC-TTP-DEG2-TTP-TX-191.35"]
    );
    let mc = edits[0].list_at("org-openroadm-device.interface");
    assert_eq!(mc[0]["mc-ttp"]["min-freq"], "191.325");
    assert_eq!(mc[0]["mc-ttp"]["max-freq"], "191.375");
    assert_eq!(mc[0]["supporting-interface"], "OMS-DEG1-TTP-RX");

    assert_eq!(
        created_interfaces(&edits[1]),
        vec![
            "NMC-CTP-DEG1-TTP-RX-191.35",
            "NMC-CTP-DEG2-TTP-TX-191.35"
        ]
    );
    assert_eq!(
        created_connection(&edits[2]).as_deref(),
        Some(EXPRESS_CONNECTION)
    );
    assert!(!has_deletes(&edits));
    assert_eq!(h.cached(), 1);
}

#[test]
fn test_add_apply_then_release() {
    let h = Harness::new();
    let rule = cross_connect(SRG1_PP1_TX, DEG2_RX, 58);

    let conn = h.driver.apply(&rule).unwrap();
    assert_eq!(conn.link_type, LinkType::Add);
    assert_eq!(conn.name, ADD_CONNECTION);
    assert_eq!(h.cached(), 1);

    let created = h.session.edits();
    assert_eq!(created_interfaces(&created[0]), vec!["MC-TTP-DEG2-TTP-RX-196.0"]);
    assert_eq!(
        created_interfaces(&created[1]),
        vec!["SRG1-PP1-TX-196.0", "NMC-CTP-DEG2-TTP-RX-196.0"]
    );

    h.session.clear();
    let released = h.driver.release(&rule).unwrap();
    assert_eq!(released.name, ADD_CONNECTION);
    assert_eq!(h.cached(), 0);

    let deletes: Vec<Vec<String>> = h.session.edits().iter().map(deleted_names).collect();
    assert_eq!(
        deletes,
        vec![
            vec![ADD_CONNECTION.to_string()],
            vec![
                "SRG1-PP1-TX-196.0".to_string(),
                "NMC-CTP-DEG2-TTP-RX-196.0".to_string()
            ],
            vec!["MC-TTP-DEG2-TTP-RX-196.0".to_string()],
        ]
    );
}

#[test]
fn test_drop_names() {
    let h = Harness::new();
    let conn = h
        .driver
        .apply(&cross_connect(DEG3_RX, SRG1_PP2_RX, 0))
        .unwrap();
    assert_eq!(conn.link_type, LinkType::Drop);
    assert_eq!(conn.name, "NMC-CTP-DEG3-TTP-RX-193.1-to-SRG1-PP2-RX-193.1");
    assert_eq!(
        created_interfaces(&h.session.edits()[0]),
        vec!["MC-TTP-DEG3-TTP-RX-193.1"]
    );
}

#[test]
fn test_client_to_client_rejected() {
    let h = Harness::new();
    let err = h
        .driver
        .apply(&cross_connect(SRG1_PP1_TX, SRG1_PP2_RX, 0))
        .unwrap_err();
    assert!(matches!(err, DriverError::InvalidTopology { .. }));
    assert_eq!(h.session.edit_count(), 0);
    assert_eq!(h.cached(), 0);
}

#[test]
fn test_unannotated_ports_have_no_line_side() {
    let session = Arc::new(RecordingSession::new());
    let registry = SessionRegistry::<dyn NetconfSession>::new();
    registry.register(roadm_device(), session.clone());
    let inventory = StaticInventory::new().with_ports(roadm_device(), roadm_ports::unannotated());
    let driver = OpenRoadmDriver::new(
        roadm_device(),
        Arc::new(DriverConfig::default()),
        Arc::new(registry),
        Arc::new(inventory),
        Arc::new(ConnectionCacheManager::new()),
    );

    let err = driver
        .apply(&cross_connect(DEG1_RX, DEG2_TX, 0))
        .unwrap_err();
    assert!(matches!(err, DriverError::InvalidTopology { .. }));
    assert_eq!(session.edit_count(), 0);
}

#[test]
fn test_capacity_limit() {
    let h = Harness::with_config(DriverConfig {
        max_connections: 1,
        ..DriverConfig::default()
    });
    h.driver.apply(&cross_connect(DEG1_RX, DEG2_TX, 0)).unwrap();

    let err = h
        .driver
        .apply(&cross_connect(DEG1_RX, DEG2_TX, 1))
        .unwrap_err();
    assert!(matches!(err, DriverError::CapacityExceeded { limit: 1, .. }));
    assert_eq!(h.session.edit_count(), 3);
    assert_eq!(h.cached(), 1);
}

#[test]
fn test_off_grid_width_is_rejected_before_writing() {
    let h = Harness::new();
    let rule = cross_connect(DEG1_RX, DEG2_TX, 0)
        .with_och_signal(OchSignal::new_dwdm_slot(ChannelSpacing::Chl25Ghz, 4));

    let err = h.driver.apply(&rule).unwrap_err();
    assert!(matches!(err, DriverError::UnsupportedChannelWidth { .. }));
    assert!(h.session.edits().is_empty());
    assert_eq!(h.cached(), 0);
    assert!(h.driver.apply_flow_rules(&[rule]).is_empty());
    assert_eq!(h.session.edit_count(), 0);
}

#[test]
fn test_release_unknown_is_cache_inconsistency() {
    let h = Harness::new();
    let err = h
        .driver
        .release(&cross_connect(DEG1_RX, DEG2_TX, 0))
        .unwrap_err();
    assert!(matches!(err, DriverError::CacheInconsistency { .. }));
    assert_eq!(h.session.edit_count(), 0);
}

#[test]
fn test_partial_create_is_not_cached() {
    let h = Harness::new();
    h.session.fail_edit_at(2, EditFailure::Rejected);

    let err = h
        .driver
        .apply(&cross_connect(DEG1_RX, DEG2_TX, 0))
        .unwrap_err();
    assert!(matches!(err, DriverError::Transport { .. }));
    assert!(err.is_retryable());
    assert_eq!(h.session.edit_count(), 2);
    assert_eq!(h.cached(), 0);
    assert!(!has_deletes(&h.session.edits()));
}

#[test]
fn test_partial_release_keeps_cache_removed() {
    let h = Harness::new();
    let rule = cross_connect(DEG1_RX, DEG2_TX, 0);
    h.driver.apply(&rule).unwrap();

    // 4th write deletes the connection, 5th the NMCs
    h.session.fail_edit_at(5, EditFailure::TransportError);
    let err = h.driver.release(&rule).unwrap_err();
    assert!(matches!(err, DriverError::Transport { .. }));
    assert_eq!(h.session.edit_count(), 5);
    assert_eq!(h.cached(), 0);
}

#[test]
fn test_missing_session() {
    let h = Harness::build(DriverConfig::default(), Arc::new(RecordingSession::new()), false);

    let err = h
        .driver
        .apply(&cross_connect(DEG1_RX, DEG2_TX, 0))
        .unwrap_err();
    assert!(matches!(err, DriverError::NoSession { .. }));
    assert_eq!(h.cached(), 0);

    assert!(matches!(
        h.driver.reconcile().unwrap_err(),
        DriverError::NoSession { .. }
    ));
    assert!(h.driver.get_flow_entries().is_empty());
}

#[test]
fn test_reconcile_reports_cached_and_deletes_orphans() {
    let h = Harness::new();
    let rule = cross_connect(SRG1_PP1_TX, DEG2_RX, 58).with_priority(7).with_cookie(99);
    h.driver.apply(&rule).unwrap();

    let orphan = "NMC-CTP-DEG3-TTP-RX-193.1-to-NMC-CTP-DEG1-TTP-TX-193.1";
    h.session
        .set_get_config_reply(replies::connections(&[ADD_CONNECTION, orphan]));
    h.session.clear();

    let entries = h.driver.reconcile().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].state, FlowEntryState::Added);
    assert!(entries[0].rule.same_intent(&rule));
    assert_eq!(entries[0].rule.cookie, 99);
    assert_eq!(entries[0].rule.och_signal, Some(och_signal(58)));

    let deletes: Vec<Vec<String>> = h.session.edits().iter().map(deleted_names).collect();
    assert_eq!(
        deletes,
        vec![
            vec![orphan.to_string()],
            vec![
                "NMC-CTP-DEG3-TTP-RX-193.1".to_string(),
                "NMC-CTP-DEG1-TTP-TX-193.1".to_string()
            ],
            vec![
                "MC-TTP-DEG3-TTP-RX-193.1".to_string(),
                "MC-TTP-DEG1-TTP-TX-193.1".to_string()
            ],
        ]
    );
    assert_eq!(h.cached(), 1);
}

#[test]
fn test_reconcile_orphan_delete_failure_is_swallowed() {
    let h = Harness::new();
    h.session
        .set_get_config_reply(replies::connections(&["SRG1-PP1-TX-193.1-to-SRG1-PP2-RX-193.1"]));
    h.session.fail_edit_at(1, EditFailure::Rejected);

    let entries = h.driver.reconcile().unwrap();
    assert!(entries.is_empty());
    assert_eq!(h.session.edit_count(), 1);
}

#[test]
fn test_reconcile_empty_device() {
    let h = Harness::new();
    assert!(h.driver.get_flow_entries().is_empty());
    assert!(matches!(h.session.ops()[0], RecordedOp::GetConfig(..)));
}

#[test]
fn test_delete_by_name() {
    let h = Harness::new();
    h.driver.apply(&cross_connect(DEG1_RX, DEG2_TX, -35)).unwrap();
    h.session.clear();

    h.driver.delete_by_name(EXPRESS_CONNECTION).unwrap();
    assert_eq!(h.cached(), 0);
    assert_eq!(h.session.edit_count(), 6);
    assert_eq!(
        deleted_names(&h.session.edits()[2]),
        vec!["MC-TTP-DEG1-TTP-RX-191.35", "MC-TTP-DEG2-TTP-TX-191.35"]
    );

    assert!(matches!(
        h.driver.delete_by_name("no-separator").unwrap_err(),
        DriverError::Document { .. }
    ));
}

#[test]
fn test_batch_reports_only_successes() {
    let h = Harness::new();
    let good = cross_connect(DEG1_RX, DEG2_TX, 0);
    let bad = cross_connect(SRG1_PP1_TX, SRG1_PP2_RX, 0);

    let applied = h.driver.apply_flow_rules(&[good.clone(), bad.clone()]);
    assert_eq!(applied, vec![good.clone()]);

    let removed = h.driver.remove_flow_rules(&[bad, good.clone()]);
    assert_eq!(removed, vec![good]);
    assert_eq!(h.cached(), 0);
}

#[test]
fn test_concurrent_applies_respect_limit() {
    let limit = 4;
    let h = Harness::with_config(DriverConfig {
        max_connections: limit,
        ..DriverConfig::default()
    });

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|m| {
                let driver = h.driver.clone();
                scope.spawn(move || driver.apply(&cross_connect(DEG1_RX, DEG2_TX, m)))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let ok = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(ok, limit);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, DriverError::CapacityExceeded { .. })));
    assert_eq!(h.cached(), limit);
    assert_eq!(h.session.edit_count(), limit * 3);
}

#[test]
fn test_target_power_through_cache() {
    let h = Harness::new();
    let channel = och_signal(58);
    h.driver
        .apply(&cross_connect(SRG1_PP1_TX, DEG2_RX, 58))
        .unwrap();

    assert_eq!(h.driver.target_power(SRG1_PP1_TX, Some(&channel)), Some(0.0));
    assert_eq!(h.driver.target_power(SRG1_PP1_TX, None), None);

    h.driver
        .set_target_power(SRG1_PP1_TX, Some(&channel), -3.5)
        .unwrap();
    let last = h.session.edits().pop().unwrap();
    assert_eq!(
        last.get("org-openroadm-device.roadm-connections.target-output-power")
            .and_then(|v| v.as_f64()),
        Some(-3.5)
    );
    assert_eq!(h.driver.target_power(DEG2_RX, Some(&channel)), Some(-3.5));

    assert!(matches!(
        h.driver
            .set_target_power(SRG1_PP1_TX, Some(&channel), 75.0)
            .unwrap_err(),
        DriverError::InvalidConfig { .. }
    ));
    assert!(matches!(
        h.driver.set_target_power(SRG1_PP1_TX, None, 1.0).unwrap_err(),
        DriverError::Unsupported { .. }
    ));
    assert!(matches!(
        h.driver
            .set_target_power(DEG1_TX, Some(&och_signal(3)), 1.0)
            .unwrap_err(),
        DriverError::CacheInconsistency { .. }
    ));
}

#[test]
fn test_power_ranges_follow_direction() {
    let h = Harness::new();
    let range = h.driver.target_power_range(DEG2_TX, None).unwrap();
    assert_eq!((range.min_dbm, range.max_dbm), (-60.0, 60.0));
    assert!(h.driver.target_power_range(DEG2_RX, None).is_none());
    assert!(h.driver.input_power_range(DEG2_RX, None).is_some());
    assert!(h.driver.input_power_range(DEG2_TX, None).is_none());
    assert!(h.driver.input_power_range(PortNumber::new(9999), None).is_none());
}

#[test]
fn test_lambdas() {
    let h = Harness::new();
    let lambdas = h.driver.query_lambdas(DEG1_TX);
    assert_eq!(lambdas.len(), 96);
    assert_eq!(lambdas[0].center_frequency().as_thz_string(), "191.35");
    assert_eq!(lambdas[95].center_frequency().as_thz_string(), "196.1");
}

#[test]
fn test_discover_device_details() {
    let session = Arc::new(RecordingSession::new().with_get_reply(replies::roadm_info()));
    let config = DriverConfig {
        reset_running_on_discovery: true,
        ..DriverConfig::default()
    };
    let h = Harness::build(config, session, true);

    let description = h.driver.discover_device_details().unwrap();
    assert_eq!(description.device_type, DeviceType::Roadm);
    assert_eq!(description.vendor, "vendorA");
    assert_eq!(description.hw_version, "model-2");
    assert_eq!(description.sw_version, "7.1");
    assert_eq!(description.serial_number, "SN0001");
    assert_eq!(description.chassis_id, "42");
    assert_eq!(description.latitude.as_deref(), Some("41.39"));
    assert_eq!(description.longitude.as_deref(), Some("2.11"));

    assert!(matches!(
        h.session.ops()[0],
        RecordedOp::CopyConfig {
            target: roadm_driver_common::Datastore::Running,
            source: roadm_driver_common::Datastore::Startup,
        }
    ));
}

#[test]
fn test_discover_device_details_defaults() {
    let session =
        Arc::new(RecordingSession::new().with_get_reply(replies::info(&[("node-type", "xpdr")])));
    let h = Harness::build(DriverConfig::default(), session, true);

    let description = h.driver.discover_device_details().unwrap();
    assert_eq!(description.vendor, "not loaded");
    assert_eq!(description.chassis_id, "not loaded");
    assert_eq!(description.latitude, None);
    assert!(!h
        .session
        .ops()
        .iter()
        .any(|op| matches!(op, RecordedOp::CopyConfig { .. })));
}

#[test]
fn test_discover_ports() {
    let reply = replies::circuit_packs(vec![
        replies::circuit_pack(
            "1/0",
            &[
                ("ext-tx1", "roadm-external", "DEG1-TTP-TX", Some("multi-wavelength")),
                ("ext-rx1", "roadm-external", "DEG1-TTP-RX", Some("multi-wavelength")),
                ("int-tx1", "roadm-internal", "", None),
            ],
        ),
        replies::circuit_pack(
            "4/0",
            &[
                ("1-1", "roadm-external", "SRG1-PP1-TX", None),
                ("bogus", "roadm-external", "SRG1-PP9-TX", None),
            ],
        ),
    ]);
    let session = Arc::new(RecordingSession::new().with_get_reply(reply));
    let h = Harness::build(DriverConfig::default(), session, true);

    let ports = h.driver.discover_port_details();
    let numbers: Vec<u64> = ports.iter().map(|p| p.number.as_u64()).collect();
    assert_eq!(numbers, vec![301, 401, 101]);

    assert!(matches!(ports[0].kind, PortKind::Oms { .. }));
    assert!(matches!(ports[2].kind, PortKind::Och { tunable: true, .. }));
    assert_eq!(ports[2].circuit_pack(), Some("4/0"));
    assert_eq!(ports[2].port_name(), Some("1-1"));
    assert_eq!(ports[2].logical_connection_point(), Some("SRG1-PP1-TX"));
}

#[test]
fn test_discover_ports_transport_failure() {
    let session = Arc::new(RecordingSession::new());
    session.fail_reads();
    let h = Harness::build(DriverConfig::default(), session, true);
    assert!(h.driver.discover_port_details().is_empty());
}
