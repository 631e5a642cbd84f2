//! Advisory diagnostics emitted once per tick.
//!
//! Lines pushed here are never read back by control logic. `ChannelTelemetry`
//! forwards them to `TELEMETRY_CHANNEL` without waiting, so a slow consumer
//! costs dropped lines rather than a stalled loop.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::Serialize;

/// Channel drained by whoever renders telemetry.
pub static TELEMETRY_CHANNEL: embassy_sync::channel::Channel<
    CriticalSectionRawMutex,
    TelemetryLine,
    64,
> = embassy_sync::channel::Channel::new();

static DROPPED_LINES: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TelemetryValue {
    Int(i32),
    Float(f64),
    Bool(bool),
    Count(usize),
    Text(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryLine {
    pub key: &'static str,
    pub value: TelemetryValue,
}

/// A sink for key/value diagnostic lines.
pub trait Telemetry {
    fn put(
        &mut self,
        key: &'static str,
        value: TelemetryValue,
    );
}

impl Telemetry for Vec<TelemetryLine> {
    fn put(
        &mut self,
        key: &'static str,
        value: TelemetryValue,
    ) {
        self.push(TelemetryLine { key, value });
    }
}

/// Non-blocking sink backed by `TELEMETRY_CHANNEL`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChannelTelemetry;

impl ChannelTelemetry {
    /// Lines discarded because the channel was full.
    pub fn dropped() -> u32 {
        DROPPED_LINES.load(Ordering::Relaxed)
    }
}

impl Telemetry for ChannelTelemetry {
    fn put(
        &mut self,
        key: &'static str,
        value: TelemetryValue,
    ) {
        if TELEMETRY_CHANNEL
            .try_send(TelemetryLine { key, value })
            .is_err()
        {
            let dropped = DROPPED_LINES.fetch_add(1, Ordering::Relaxed) + 1;
            if dropped.is_power_of_two() {
                tracing::warn!(dropped, "telemetry channel full, dropping lines");
            }
        }
    }
}

/// Lookup helper used by tests and the mock binary.
pub fn find<'a>(
    lines: &'a [TelemetryLine],
    key: &str,
) -> Option<&'a TelemetryValue> {
    lines.iter().rev().find(|l| l.key == key).map(|l| &l.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_never_blocks_when_full() {
        let mut sink = ChannelTelemetry;
        for _ in 0..100 {
            sink.put("tick", TelemetryValue::Count(1));
        }
        assert!(ChannelTelemetry::dropped() >= 36);
        while TELEMETRY_CHANNEL.try_receive().is_ok() {}
    }

    #[test]
    fn find_returns_latest_value() {
        let mut lines: Vec<TelemetryLine> = Vec::new();
        lines.put("lift right position", TelemetryValue::Int(1));
        lines.put("lift right position", TelemetryValue::Int(2));
        assert_eq!(
            find(&lines, "lift right position"),
            Some(&TelemetryValue::Int(2))
        );
        assert_eq!(find(&lines, "missing"), None);
    }
}
