//! Human-readable status report

use std::fmt::Write;

use crate::config::Bindings;
use crate::state::{Mode, Settings};

/// Render the current state plus the control legend
pub fn format_status(settings: &Settings, running: bool, bindings: &Bindings) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Autopresser: {}", if running { "RUNNING" } else { "idle" });
    let _ = writeln!(out, "Key: {}", settings.symbol);
    let _ = writeln!(out, "Mode: {}", settings.mode);
    match settings.mode {
        Mode::FixedRate => {
            let _ = writeln!(out, "CPS: {}", settings.rate_hz);
        }
        Mode::HoldUntilStopped => {
            let _ = writeln!(out, "Holding until stopped");
        }
        Mode::HoldRelease => {
            let _ = writeln!(out, "Hold: {} ms", settings.hold_ms);
            let _ = writeln!(out, "Release: {} ms", settings.release_ms);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Controls:");
    let _ = writeln!(out, "  {}  start/stop", bindings.toggle);
    let _ = writeln!(
        out,
        "  {}+{}  stop immediately",
        bindings.toggle, bindings.stop_combo
    );
    let _ = writeln!(out, "  {} / {}  CPS -/+", bindings.rate_down, bindings.rate_up);
    let _ = writeln!(out, "  {}  switch fixed rate / hold-release", bindings.mode_toggle);
    let _ = writeln!(out, "  {} / {}  hold -/+ 10 ms", bindings.hold_down, bindings.hold_up);
    let _ = writeln!(
        out,
        "  {} / {}  release -/+ 10 ms",
        bindings.release_down, bindings.release_up
    );
    let _ = write!(out, "  {}  show this status", bindings.status);

    out
}
