//! VLAN inventory example
//!
//! Lists VLANs, trunks and ports of a ProCurve switch, and optionally
//! creates a VLAN and tags a port into it.
//!
//! # Usage
//!
//! ```bash
//! # Read-only inventory
//! cargo run --example vlans -- --host 10.0.0.2 --user manager --password secret
//!
//! # Create VLAN 10 "eng" and tag port 3
//! cargo run --example vlans -- --host 10.0.0.2 --user manager --password secret \
//!     --vlan 10 --name eng --tag 3
//! ```

use std::env;
use std::time::Duration;

use hpswitch::{
    Credentials, Device, HostKeyVerification, Intent, InterfaceId, SwitchBuilder, VlanId,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    println!("Connecting to {}:{}...", args.host, args.port);

    let mut credentials = Credentials::password(&args.user, &args.password);
    if let Some(enable) = &args.enable {
        credentials = credentials.with_enable_password(enable);
    }
    let device = Device::new(&args.host, credentials).with_port(args.port);

    let switch = SwitchBuilder::new(device)
        .command_timeout(Duration::from_secs(args.timeout))
        .host_key_verification(HostKeyVerification::Disabled)
        .connect()
        .await?;
    println!("Connected, CLI state {}\n", switch.state().await);

    if let Some(id) = args.vlan {
        let id = VlanId::new(id)?;
        let mut intents = vec![Intent::CreateVlan {
            id,
            name: args.name.clone().unwrap_or_else(|| format!("VLAN{}", id)),
        }];
        if let Some(port) = &args.tag {
            intents.push(Intent::TagVlan {
                interface: InterfaceId::port(port.as_str()),
                vlan: id,
            });
        }

        let result = switch.apply_batch(&intents).await;
        println!("--- commands ---");
        for command in result.commands() {
            println!("  {}", command);
        }
        if let Some(failure) = result.failure() {
            eprintln!("failed: {}", failure);
        }
        println!();
    }

    println!("--- VLANs ---");
    for vlan in switch.vlans().await? {
        println!("  {}", vlan);
    }

    println!("\n--- Trunks ---");
    for (trunk, ports) in switch.known_trunks().await.groups() {
        let ports: Vec<String> = ports.iter().map(|p| p.to_string()).collect();
        println!("  {}: {}", trunk, ports.join(","));
    }

    println!("\n--- Ports ---");
    for iface in switch.interfaces().await? {
        println!(
            "  {:<6} admin {:?} link {:?} untagged {:?} tagged {:?}",
            iface.id.to_string(),
            iface.admin,
            iface.link,
            iface.untagged.map(|v| v.get()),
            iface.tagged.iter().map(|v| v.get()).collect::<Vec<_>>()
        );
    }

    switch.close().await?;
    println!("\nDisconnected.");
    Ok(())
}

struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    enable: Option<String>,
    timeout: u64,
    vlan: Option<u16>,
    name: Option<String>,
    tag: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Args {
            host: "localhost".to_string(),
            port: 22,
            user: "manager".to_string(),
            password: String::new(),
            enable: None,
            timeout: 30,
            vlan: None,
            name: None,
            tag: None,
        };

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1).cloned();
            match args[i].as_str() {
                "--host" | "-h" => parsed.host = value.unwrap_or(parsed.host),
                "--port" | "-p" => {
                    parsed.port = value.and_then(|v| v.parse().ok()).unwrap_or(22)
                }
                "--user" | "-u" => parsed.user = value.unwrap_or(parsed.user),
                "--password" | "-P" => parsed.password = value.unwrap_or_default(),
                "--enable" => parsed.enable = value,
                "--timeout" | "-t" => {
                    parsed.timeout = value.and_then(|v| v.parse().ok()).unwrap_or(30)
                }
                "--vlan" => parsed.vlan = value.and_then(|v| v.parse().ok()),
                "--name" => parsed.name = value,
                "--tag" => parsed.tag = value,
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {other}");
                    print_help();
                    std::process::exit(1);
                }
            }
            i += 2;
        }
        parsed
    }
}

fn print_help() {
    println!("Usage: vlans [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -h, --host <HOST>          Switch hostname or IP (default: localhost)");
    println!("  -p, --port <PORT>          SSH port (default: 22)");
    println!("  -u, --user <USER>          Username (default: manager)");
    println!("  -P, --password <PASSWORD>  Password");
    println!("      --enable <PASSWORD>    Enable password");
    println!("  -t, --timeout <SECONDS>    Command timeout (default: 30)");
    println!("      --vlan <ID>            Create this VLAN");
    println!("      --name <NAME>          Name of the created VLAN");
    println!("      --tag <PORT>           Tag this port into the created VLAN");
}
