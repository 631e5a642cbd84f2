use clap::Parser;
use embassy_executor::{Executor, Spawner};
use embassy_time::{Duration, Instant, Ticker};
use manip_core::mk_static;
use manip_core::utils::{
    actions::TickContext,
    config::RobotConfig,
    hardware::configure_actuators,
    input::GamepadSnapshot,
    manual::ManualLoop,
    sim::SimHardware,
    telemetry::{ChannelTelemetry, TELEMETRY_CHANNEL},
};
use serde::Deserialize;
use static_cell::StaticCell;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// JSON robot configuration; defaults are used for missing fields
    #[clap(long)]
    config: Option<String>,
    /// JSON-lines gamepad script, one `{"driver":..,"operator":..}` per tick
    #[clap(long)]
    script: Option<String>,
    /// number of control ticks to run
    #[clap(long, default_value_t = 500)]
    ticks: u32,
    /// control loop period in milliseconds
    #[clap(long, default_value_t = 20)]
    period_ms: u64,
}

/// Gamepad readings for one tick.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Frame
{
    driver: GamepadSnapshot,
    operator: GamepadSnapshot,
}

fn load_config(path: &str) -> Result<RobotConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("{path}: {e}"))
}

fn load_script(path: &str) -> Result<Vec<Frame>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).map_err(|e| format!("{path}:{}: {e}", n + 1))
        })
        .collect()
}

#[embassy_executor::task]
async fn telemetry_task() -> ! {
    loop {
        let line = TELEMETRY_CHANNEL.receiver().receive().await;
        match serde_json::to_string(&line) {
            Ok(json) => debug!(target: "telemetry", "{json}"),
            Err(e) => warn!("telemetry line not serializable: {:?}", e),
        }
    }
}

#[embassy_executor::task]
async fn control_task(
    config: RobotConfig,
    script: &'static [Frame],
    ticks: u32,
    period: Duration,
) {
    let mut hw = SimHardware::new();
    configure_actuators(&mut hw);
    let mut manual = ManualLoop::with_default_bindings(config);
    let mut sink = ChannelTelemetry;
    let idle = Frame::default();

    let mut ticker = Ticker::every(period);
    let started = Instant::now();
    let (mut completed, mut failed) = (0, 0);
    for n in 0..ticks {
        let frame = script.get(n as usize).unwrap_or(&idle);
        hw.step();
        let mut ctx = TickContext::new(&mut hw, &mut sink, Instant::now());
        let summary = manual.tick(&frame.driver, &frame.operator, &mut ctx);
        completed += summary.completed;
        failed += summary.failed;
        ticker.next().await;
    }

    info!(
        ticks,
        elapsed_ms = started.elapsed().as_millis(),
        completed,
        failed,
        rejected = manual.scheduler().rejected(),
        dropped_telemetry = ChannelTelemetry::dropped(),
        "run finished"
    );
    manual.halt(&mut hw);
    std::process::exit(0);
}

#[embassy_executor::task]
async fn main_task(spawner: Spawner) {
    let opts: Opts = Opts::parse();

    let config = match opts.config.as_deref().map(load_config) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            error!("failed to load config: {}", e);
            std::process::exit(1);
        }
        None => RobotConfig::default(),
    };
    let frames = match opts.script.as_deref().map(load_script) {
        Some(Ok(frames)) => frames,
        Some(Err(e)) => {
            error!("failed to load script: {}", e);
            std::process::exit(1);
        }
        None => Vec::new(),
    };
    info!(
        frames = frames.len(),
        ticks = opts.ticks,
        period_ms = opts.period_ms,
        "starting simulated manual loop"
    );
    let script: &'static [Frame] = mk_static!(Vec<Frame>, frames);

    spawner.spawn(telemetry_task()).unwrap();
    spawner
        .spawn(control_task(
            config,
            script,
            opts.ticks,
            Duration::from_millis(opts.period_ms.max(1)),
        ))
        .unwrap();
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner)).unwrap();
    });
}
