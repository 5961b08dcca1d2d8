//! # Host Update Loop
//!
//! Plays the role of the host for [`DaydreamControls`]: polls a
//! [`DeviceProvider`] at a fixed rate, delivers the "devices updated"
//! notification, then forwards the bound device's changed buttons and its
//! axis snapshot.
//!
//! Everything runs on the calling task, so notifications never overlap.

use std::future::Future;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::controller::daydream::{DaydreamControls, ModelLoader, PoseTracker};
use crate::controller::device::{ButtonState, DeviceProvider, Hand};
use crate::error::Result;
use crate::events::EventSink;

/// Number of ticks between status log messages
const LOG_INTERVAL_TICKS: u64 = 1000;

/// Polls devices and turns raw state into component notifications.
#[derive(Debug)]
pub struct Poller<D> {
    provider: D,
    /// Button states delivered for the current binding.
    last_buttons: Vec<ButtonState>,
    /// Identity of the binding `last_buttons` belongs to.
    last_binding: Option<(String, String, Hand)>,
}

impl<D: DeviceProvider> Poller<D> {
    #[must_use]
    pub fn new(provider: D) -> Self {
        Self {
            provider,
            last_buttons: Vec::new(),
            last_binding: None,
        }
    }

    /// Enumerates devices and activates the component against them.
    pub fn activate<P, L, S>(&mut self, controls: &mut DaydreamControls<P, L>, sink: &mut S)
    where
        P: PoseTracker,
        L: ModelLoader,
        S: EventSink,
    {
        let devices = self.provider.devices().unwrap_or_else(|e| {
            warn!("Initial device enumeration failed: {}", e);
            Vec::new()
        });
        controls.activate(&devices, sink);
    }

    /// Runs one host update.
    ///
    /// Button notifications are sent only for indices whose raw state differs
    /// from what was last delivered for the current binding. The axis
    /// snapshot is sent every update; the component suppresses repeats.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if enumeration fails. The component is not
    /// notified in that case.
    pub fn poll<P, L, S>(&mut self, controls: &mut DaydreamControls<P, L>, sink: &mut S) -> Result<()>
    where
        P: PoseTracker,
        L: ModelLoader,
        S: EventSink,
    {
        let devices = self.provider.devices()?;
        controls.on_devices_updated(&devices, sink);

        let binding = controls.binding().map(|b| (b.key.clone(), b.id.clone(), b.hand));
        if binding != self.last_binding {
            debug!("Binding changed to {:?}", binding);
            self.last_buttons.clear();
            self.last_binding = binding;
        }

        let Some(device) = controls.bound_device(&devices) else {
            return Ok(());
        };

        for (index, state) in device.buttons.iter().enumerate() {
            let previous = self.last_buttons.get(index).copied().unwrap_or_default();
            if *state != previous {
                controls.on_button_changed(index, *state, sink);
            }
        }
        self.last_buttons = device.buttons.clone();

        controls.on_axis_moved(&device.axes, sink);
        Ok(())
    }
}

/// Activates the component and polls every `period` until `shutdown`
/// resolves, then deactivates it.
///
/// Enumeration failures are logged and the tick is skipped.
///
/// Returns the number of completed ticks.
pub async fn run<D, P, L, S, F>(
    poller: &mut Poller<D>,
    controls: &mut DaydreamControls<P, L>,
    sink: &mut S,
    period: Duration,
    shutdown: F,
) -> u64
where
    D: DeviceProvider,
    P: PoseTracker,
    L: ModelLoader,
    S: EventSink,
    F: Future<Output = ()>,
{
    poller.activate(controls, sink);

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!("Polling input devices every {:?}", period);

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("Shutdown requested after {} ticks", ticks);
                break;
            }

            _ = ticker.tick() => {
                if let Err(e) = poller.poll(controls, sink) {
                    warn!("Device poll failed: {}", e);
                    continue;
                }
                ticks += 1;

                if ticks % LOG_INTERVAL_TICKS == 0 {
                    debug!("Completed {} polls (bound: {:?})", ticks, controls.binding().map(|b| &b.id));
                }
            }
        }
    }

    controls.deactivate(sink);
    ticks
}
