use std::sync::Arc;

use tracing::{info, warn};

use crate::state::{DeviceState, LedState, StateStore};

/// Terminal view of the store: logs every snapshot and connectivity change.
pub async fn run(store: Arc<StateStore>) {
    let mut state_rx = store.subscribe_state();
    let mut error_rx = store.subscribe_error();

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = summarize(&state_rx.borrow_and_update());
                info!("{}", line);
            }
            changed = error_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = error_rx.borrow_and_update().clone();
                if status.has_error {
                    warn!("{}", status.error_message);
                } else {
                    info!("Receiving live data");
                }
            }
        }
    }
}

fn reading(state: &DeviceState, key: &str) -> String {
    state
        .reading(key)
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One-line summary: input, output, battery, then lit LEDs.
pub fn summarize(state: &DeviceState) -> String {
    let leds = state.leds();
    let lit: Vec<&str> = leds
        .iter()
        .filter(|(_, led)| !matches!(led, LedState::Off))
        .map(|(name, _)| name.strip_prefix("led_").unwrap_or(name))
        .collect();

    format!(
        "in {}V {}A {}W {}Hz | out {}V {}A {}W {}Hz | bat {}V {}A {}W {}% | leds [{}]",
        reading(state, "input_voltage"),
        reading(state, "input_current"),
        reading(state, "input_power"),
        reading(state, "input_frequency"),
        reading(state, "output_voltage"),
        reading(state, "output_current"),
        reading(state, "output_power"),
        reading(state, "output_frequency"),
        reading(state, "battery_voltage"),
        reading(state, "battery_current"),
        reading(state, "battery_power"),
        reading(state, "battery_charge"),
        lit.join(" "),
    )
}
