//! Device binding and dispatch through the registry.

use pretty_assertions::assert_eq;
use roadm_driver_common::{
    DeviceDiscovery, DeviceType, DriverConfig, DriverError, FlowRuleProgrammable, LambdaQuery,
    NetconfSession, RestSession, SessionRegistry,
};
use roadm_driver_test::roadm_ports::*;
use roadm_driver_test::{
    cross_connect, fiber_rule, roadm_device, roadm_ports, switch_device, MockRestSession,
    RecordingSession, StaticFlowStore, StaticInventory,
};
use roadm_drivers::{DeviceModel, DriverContext, DriverRegistry};
use std::sync::Arc;

struct Fixture {
    netconf_session: Arc<RecordingSession>,
    rest_session: Arc<MockRestSession>,
    registry: DriverRegistry,
}

fn fixture() -> Fixture {
    let netconf_session = Arc::new(RecordingSession::new());
    let rest_session = Arc::new(MockRestSession::new());

    let netconf = SessionRegistry::<dyn NetconfSession>::new();
    netconf.register(roadm_device(), netconf_session.clone());
    let rest = SessionRegistry::<dyn RestSession>::new();
    rest.register(switch_device(), rest_session.clone());

    let registry = DriverRegistry::new(DriverContext {
        config: Arc::new(DriverConfig::default()),
        netconf: Arc::new(netconf),
        rest: Arc::new(rest),
        inventory: Arc::new(StaticInventory::new().with_ports(roadm_device(), roadm_ports::all())),
        flow_store: Arc::new(StaticFlowStore::new()),
    });

    Fixture {
        netconf_session,
        rest_session,
        registry,
    }
}

#[test]
fn test_bind_dispatches_by_model() {
    let f = fixture();

    let roadm = f.registry.bind(roadm_device(), "openroadm").unwrap();
    let switch = f.registry.bind(switch_device(), "polatis").unwrap();
    assert_eq!(roadm.model(), DeviceModel::OpenRoadm);
    assert_eq!(switch.model(), DeviceModel::Polatis);
    assert_eq!(f.registry.len(), 2);

    let rule = cross_connect(DEG1_RX, DEG2_TX, 0);
    assert_eq!(roadm.apply_flow_rules(&[rule.clone()]), vec![rule]);
    assert_eq!(f.netconf_session.edit_count(), 3);
    assert_eq!(f.registry.caches().size(&roadm_device()), 1);

    let fiber = fiber_rule(1, 17);
    assert_eq!(switch.apply_flow_rules(&[fiber.clone()]), vec![fiber]);
    assert_eq!(f.rest_session.patches().len(), 1);

    assert!(roadm.power().is_some());
    assert!(switch.power().is_none());
    assert_eq!(switch.query_lambdas(DEG1_TX).len(), 96);
    assert_eq!(
        switch.discover_device_details().unwrap().device_type,
        DeviceType::FiberSwitch
    );
}

#[test]
fn test_binding_is_resolved_once() {
    let f = fixture();
    f.registry.bind(roadm_device(), "openroadm").unwrap();

    let again = f.registry.bind(roadm_device(), "polatis").unwrap();
    assert_eq!(again.model(), DeviceModel::OpenRoadm);
    assert_eq!(f.registry.len(), 1);
}

#[test]
fn test_unknown_model() {
    let f = fixture();
    let err = f.registry.bind(roadm_device(), "acme").unwrap_err();
    assert!(matches!(err, DriverError::Unsupported { .. }));
    assert!(f.registry.is_empty());
    assert!(f.registry.driver(&roadm_device()).is_none());
}

#[test]
fn test_unbind_keeps_cache() {
    let f = fixture();
    let roadm = f.registry.bind(roadm_device(), "openroadm").unwrap();
    roadm.apply_flow_rules(&[cross_connect(DEG1_RX, DEG2_TX, 0)]);

    assert!(f.registry.unbind(&roadm_device()).is_some());
    assert!(f.registry.unbind(&roadm_device()).is_none());
    assert_eq!(f.registry.caches().size(&roadm_device()), 1);

    // a re-bound driver still knows the connection
    let roadm = f.registry.bind(roadm_device(), "openroadm").unwrap();
    let released = roadm.remove_flow_rules(&[cross_connect(DEG1_RX, DEG2_TX, 0)]);
    assert_eq!(released.len(), 1);
    assert_eq!(f.registry.caches().size(&roadm_device()), 0);
}
