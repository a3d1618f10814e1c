mod common;

use common::{received_len, received_since, reconciler, vlan};
use hpswitch::{
    AdminState, CliState, Error, Intent, InterfaceId, IpAssignment, Payload, SessionStatus,
    StaticRoute, VlanId,
};

fn vlan10() -> InterfaceId {
    InterfaceId::Vlan(vlan(10))
}

fn address(addr: &str, prefix_len: u8) -> IpAssignment {
    IpAssignment::new(vlan10(), addr.parse().unwrap(), prefix_len)
}

fn create(id: u16, name: &str) -> Intent {
    Intent::CreateVlan {
        id: vlan(id),
        name: name.into(),
    }
}

#[tokio::test]
async fn test_create_vlan() {
    let (switch, sim) = reconciler().await;
    let result = switch.apply(&create(10, "eng")).await;

    assert!(result.is_success(), "{:?}", result.failure());
    assert_eq!(
        result.commands(),
        ["configure terminal", "vlan 10", "name eng", "exit", "exit"]
    );
    match result.payload() {
        Some(Payload::Vlan(Some(v))) => {
            assert_eq!(v.to_string(), "{id:10, name:\"eng\", tagged:[], untagged:[]}")
        }
        other => panic!("unexpected payload {:?}", other),
    }
    assert_eq!(switch.state().await, CliState::Enabled);

    let queried = switch.vlan(vlan(10)).await.unwrap().unwrap();
    assert_eq!(queried.name, "eng");
    assert!(queried.tagged.is_empty() && queried.untagged.is_empty());
    assert_eq!(sim.lock().unwrap().vlans[&10].name, "eng");
}

#[tokio::test]
async fn test_trunk_member_rejected_before_sending() {
    let (switch, sim) = reconciler().await;
    assert_eq!(
        switch.known_trunks().await.trunk_of(&InterfaceId::port("7")),
        Some("Trk1")
    );

    let mark = received_len(&sim);
    let result = switch
        .apply(&Intent::TagVlan {
            interface: InterfaceId::port("7"),
            vlan: vlan(1),
        })
        .await;
    assert!(matches!(result.error(), Some(Error::Unsupported { .. })));
    assert!(result.commands().is_empty());
    assert!(received_since(&sim, mark).is_empty());
}

#[tokio::test]
async fn test_invalid_prefix_rejected() {
    let (switch, sim) = reconciler().await;
    let mark = received_len(&sim);
    let result = switch
        .apply(&Intent::SetIpAssignment(address("10.1.0.1", 33)))
        .await;
    assert!(matches!(result.error(), Some(Error::InvalidArgument { .. })));
    assert!(result.commands().is_empty());
    assert!(received_since(&sim, mark).is_empty());
}

#[test]
fn test_vlan_bounds() {
    assert!(matches!(VlanId::new(0), Err(Error::InvalidArgument { .. })));
    assert!(matches!(VlanId::new(4095), Err(Error::InvalidArgument { .. })));
    assert_eq!(VlanId::new(4094).unwrap().get(), 4094);
}

#[tokio::test]
async fn test_duplicate_address_reports_device_error() {
    let (switch, sim) = reconciler().await;
    assert!(switch.apply(&create(10, "eng")).await.is_success());
    let set = Intent::SetIpAssignment(address("10.1.0.1", 24));
    let first = switch.apply(&set).await;
    assert!(first.is_success(), "{:?}", first.failure());

    let second = switch.apply(&set).await;
    let failure = second.failure().unwrap();
    assert_eq!(failure.step, Some(2));
    assert_eq!(failure.command.as_deref(), Some("ip address 10.1.0.1/24"));
    match &failure.error {
        Error::Device { banner, .. } => assert!(banner.contains("already exists")),
        other => panic!("unexpected {:?}", other),
    }
    assert!(second.output().contains("already exists"));

    assert_eq!(switch.state().await, CliState::Enabled);
    assert_eq!(switch.status().await, SessionStatus::Connected);
    assert_eq!(sim.lock().unwrap().vlans[&10].addresses.len(), 1);
}

#[tokio::test]
async fn test_second_primary_rejected() {
    let (switch, _sim) = reconciler().await;
    assert!(switch.apply(&create(10, "eng")).await.is_success());
    assert!(
        switch
            .apply(&Intent::SetIpAssignment(address("10.1.0.1", 24)))
            .await
            .is_success()
    );

    let primary = switch
        .apply(&Intent::SetIpAssignment(address("10.2.0.1", 24)))
        .await;
    assert!(matches!(primary.error(), Some(Error::InvalidArgument { .. })));
    assert!(primary.commands().is_empty());

    let secondary = switch
        .apply(&Intent::SetIpAssignment(address("10.2.0.1", 24).secondary()))
        .await;
    assert!(secondary.is_success(), "{:?}", secondary.failure());

    let found = switch.ip_config(&vlan10()).await.unwrap();
    assert_eq!(found.len(), 2);
    assert!(!found[0].secondary);
    assert!(found[1].secondary);
}

#[tokio::test]
async fn test_timeout_during_apply_resyncs() {
    let (switch, sim) = reconciler().await;
    sim.lock().unwrap().hang.push("name eng".into());

    let result = switch.apply(&create(10, "eng")).await;
    let failure = result.failure().unwrap();
    assert_eq!(failure.step, Some(2));
    assert!(matches!(failure.error, Error::Timeout { .. }));

    assert_eq!(switch.status().await, SessionStatus::Connected);
    assert_eq!(switch.state().await, CliState::Enabled);
    assert!(switch.vlan(vlan(10)).await.unwrap().is_some());
}

#[tokio::test]
async fn test_query_retries_after_timeout() {
    let (switch, sim) = reconciler().await;
    assert!(switch.apply(&create(10, "eng")).await.is_success());
    sim.lock().unwrap().hang.push("show vlans 10".into());

    let mark = received_len(&sim);
    let found = switch.vlan(vlan(10)).await.unwrap().unwrap();
    assert_eq!(found.name, "eng");
    let sent = received_since(&sim, mark);
    assert_eq!(sent.iter().filter(|c| *c == "show vlans 10").count(), 2);
}

#[tokio::test]
async fn test_batch_enters_config_once() {
    let (switch, sim) = reconciler().await;
    let result = switch
        .apply_batch(&[
            create(30, "lab"),
            Intent::TagVlan {
                interface: InterfaceId::port("3"),
                vlan: vlan(30),
            },
            Intent::UntagVlan {
                interface: InterfaceId::port("4"),
                vlan: vlan(30),
            },
        ])
        .await;
    assert!(result.is_success(), "{:?}", result.failure());
    assert_eq!(
        result
            .commands()
            .iter()
            .filter(|c| *c == "configure terminal")
            .count(),
        1
    );
    assert_eq!(result.commands().len(), 11);
    assert_eq!(switch.state().await, CliState::Enabled);

    let sim = sim.lock().unwrap();
    assert!(sim.vlans[&30].tagged.contains("3"));
    assert!(sim.vlans[&30].untagged.contains("4"));
    assert!(!sim.vlans[&1].untagged.contains("4"));
}

#[tokio::test]
async fn test_interface_settings() {
    let (switch, _sim) = reconciler().await;
    let port = InterfaceId::port("3");
    for intent in [
        Intent::SetInterfaceName {
            interface: port.clone(),
            name: "uplink".into(),
        },
        Intent::SetInterfaceEnabled {
            interface: port.clone(),
            enabled: false,
        },
    ] {
        let result = switch.apply(&intent).await;
        assert!(result.is_success(), "{:?}", result.failure());
    }

    let iface = switch.interface(&port).await.unwrap().unwrap();
    assert_eq!(iface.name.as_deref(), Some("uplink"));
    assert_eq!(iface.admin, AdminState::Down);
    assert_eq!(iface.untagged, Some(vlan(1)));

    let all = switch.interfaces().await.unwrap();
    assert_eq!(all.len(), 8);
    let member = all.iter().find(|i| i.id == InterfaceId::port("7")).unwrap();
    assert_eq!(member.trunk.as_deref(), Some("Trk1"));
}

#[tokio::test]
async fn test_addresses_and_routes() {
    let (switch, _sim) = reconciler().await;
    let addresses = switch.addresses().await.unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].to_string(), "10.0.0.20/24 on vlan 1");

    let route = StaticRoute::new(
        "192.168.50.0".parse().unwrap(),
        24,
        "10.0.0.254".parse().unwrap(),
    );
    let result = switch.apply(&Intent::AddStaticRoute(route.clone())).await;
    assert!(result.is_success(), "{:?}", result.failure());
    assert!(result.commands().contains(&"ip route 192.168.50.0/24 10.0.0.254".to_string()));
    assert_eq!(switch.static_routes().await.unwrap(), vec![route]);
}

#[tokio::test]
async fn test_abandon_stops_new_work() {
    let (switch, sim) = reconciler().await;
    switch.abandon();
    let mark = received_len(&sim);

    let result = switch.apply(&create(10, "eng")).await;
    assert!(matches!(result.error(), Some(Error::Cancelled)));
    assert!(matches!(switch.vlans().await, Err(Error::Cancelled)));
    assert!(received_since(&sim, mark).is_empty());
}

#[tokio::test]
async fn test_apply_after_close() {
    let (switch, _sim) = reconciler().await;
    switch.close().await.unwrap();
    assert_eq!(switch.status().await, SessionStatus::Disconnected);

    let result = switch.apply(&create(10, "eng")).await;
    assert!(matches!(result.error(), Some(Error::Connection(_))));
}

#[tokio::test]
async fn test_snmp_apply_without_agent() {
    let (switch, _sim) = reconciler().await;
    let result = switch.apply_snmp(&create(10, "eng")).await;
    assert!(matches!(result.error(), Some(Error::Unsupported { .. })));
}
