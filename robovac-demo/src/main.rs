use std::{sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use robovac::{
    Robovac,
    common::{
        StateMap, WireValue,
        command::{MapDataRequest, MethodCall, Payload as _, Zone},
        domains::{CleanSpeed, WorkMode},
        robovac::{ROBOVAC, keys},
    },
    session::memory::MemorySession,
};

/// Drive a simulated Robovac and show what goes over the wire
#[derive(Parser)]
struct Args {
    /// Device ID the simulated Robovac answers to
    #[arg(long, env = "ROBOVAC_DEVICE_ID", default_value = "eb0000000000demo")]
    device_id: String,

    /// Battery level the simulated Robovac starts with
    #[arg(long, env = "ROBOVAC_BATTERY", default_value_t = 87)]
    battery: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current state
    Status,
    /// Start an automatic clean
    Start,
    Pause,
    /// Return to the dock
    Home,
    /// Make the robot beep
    Find,
    Mode { mode: WorkMode },
    Speed { speed: CleanSpeed },
    /// Clean rooms by id
    Rooms {
        #[arg(required = true)]
        ids: Vec<u32>,
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Clean around a point
    #[command(allow_negative_numbers = true)]
    Spot {
        x: i64,
        y: i64,
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Clean a rectangle
    #[command(allow_negative_numbers = true)]
    Zone {
        left: i64,
        top: i64,
        right: i64,
        bottom: i64,
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Request a map upload
    Map,
    /// Decode a captured call-method or map payload
    Decode { payload: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    robovac::log::init();

    let args = Args::parse();

    if let Command::Decode { payload } = &args.command {
        return decode(payload);
    }

    let session = Arc::new(
        MemorySession::new(args.device_id.as_str())
            .with_state(initial_state(args.battery))
            .with_echo(),
    );
    let vac = Robovac::new(args.device_id.as_str(), session.clone());

    vac.on_state_change(|change| {
        tracing::info!(property = change.descriptor.name, value = %change.value, "State changed");
    })
    .await;

    vac.connect().await.context("failed to connect to robovac")?;

    match args.command {
        Command::Status | Command::Decode { .. } => Ok(()),
        Command::Start => vac.start_cleaning().await,
        Command::Pause => vac.pause().await,
        Command::Home => vac.go_home().await,
        Command::Find => vac.find_robot().await,
        Command::Mode { mode } => vac.set_work_mode(mode).await,
        Command::Speed { speed } => vac.set_clean_speed(speed).await,
        Command::Rooms { ids, times } => vac.clean_rooms(&ids, times).await,
        Command::Spot { x, y, times } => vac.clean_spot(x, y, times).await,
        Command::Zone { left, top, right, bottom, times } => {
            vac.clean_zones(&[Zone::rect(left, top, right, bottom)], times)
                .await
        }
        Command::Map => vac.get_map_data().await,
    }
    .context("failed to send command")?;

    // give echoed writes a moment to come back through the push stream
    tokio::time::sleep(Duration::from_millis(50)).await;

    for write in session.writes() {
        print_write(&write)?;
    }

    println!("state:");
    let state = vac.snapshot().await;
    for descriptor in ROBOVAC.descriptors() {
        let Some(value) = state.get(descriptor.key) else {
            continue;
        };

        match descriptor.check(value) {
            Ok(()) => println!("  {:<14} {value}", descriptor.name),
            Err(e) => println!("  {:<14} {value} ({e})", descriptor.name),
        }
    }

    vac.disconnect().await;

    Ok(())
}

fn initial_state(battery: i64) -> StateMap {
    [
        (keys::POWER, WireValue::from(true)),
        (keys::PLAY_PAUSE, false.into()),
        (keys::WORK_MODE, "auto".into()),
        (keys::WORK_STATUS, "Charging".into()),
        (keys::CLEAN_SPEED, "Standard".into()),
        (keys::BATTERY_LEVEL, battery.into()),
        (keys::ERROR_CODE, "no_error".into()),
    ]
    .into_iter()
    .map(|(k, v)| (k.into(), v))
    .collect()
}

fn print_write(write: &StateMap) -> anyhow::Result<()> {
    println!("sent:");

    for (key, value) in write {
        let name = ROBOVAC.by_key(key).map_or("?", |d| d.name);

        match (key.as_str(), value) {
            (keys::CALL_METHOD | keys::GET_MAP_DATA, WireValue::String(payload)) => {
                println!("  {key:>4} {name:<14} {payload}");
                decode(payload)?;
            }
            _ => println!("  {key:>4} {name:<14} {value}"),
        }
    }

    Ok(())
}

fn decode(payload: &str) -> anyhow::Result<()> {
    let json = match MethodCall::decode(payload) {
        Ok(call) => serde_json::to_string_pretty(&call)?,
        Err(_) => {
            let request =
                MapDataRequest::decode(payload).context("not a method call or map request")?;
            serde_json::to_string_pretty(&request)?
        }
    };

    println!("{json}");

    Ok(())
}
