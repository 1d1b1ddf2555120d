//! Synthetic pen input: a canned stroke replayed through a host injection
//! device on a background thread.
//!
//! Only one run may be in flight at a time. A second `start` while the busy
//! flag is set is refused with [`InjectError::Busy`]; the flag is cleared when
//! the worker thread ends, whether the run completed or failed.

use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InjectError {
    #[error("a synthetic input run is already in progress")]
    Busy,
    #[error("synthetic pointer device failed: {0}")]
    Device(String),
}

/// Where a sample sits in the stroke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Down,
    Move,
    Up,
}

/// One synthetic pointer sample in screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub x: i32,
    pub y: i32,
    pub phase: Phase,
    /// Pen pressure, 0..=1024.
    pub pressure: Option<u32>,
    /// Pen tilt in degrees, -90..=90 on each axis.
    pub tilt: Option<(i32, i32)>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectionScript {
    samples: Vec<Sample>,
}

impl InjectionScript {
    pub const STROKE_SAMPLES: usize = 48;
    const STROKE_WIDTH: i32 = 300;
    const STROKE_HEIGHT: i32 = 200;
    const MAX_PRESSURE: u32 = 1024;

    pub fn new(samples: Vec<Sample>) -> Self {
        InjectionScript { samples }
    }

    /// A diagonal pen stroke starting at `origin` (screen pixels): pressure
    /// ramps up to the middle and back down, tilt sweeps left to right.
    pub fn stroke(origin: (i32, i32)) -> Self {
        let n = Self::STROKE_SAMPLES as i32;
        let last = n - 1;
        let samples = (0..n)
            .map(|i| {
                let phase = match i {
                    0 => Phase::Down,
                    i if i == last => Phase::Up,
                    _ => Phase::Move,
                };
                let distance_from_middle = (2 * i - last).unsigned_abs();
                let pressure = Self::MAX_PRESSURE - Self::MAX_PRESSURE * distance_from_middle / last as u32;
                Sample {
                    x: origin.0 + Self::STROKE_WIDTH * i / last,
                    y: origin.1 + Self::STROKE_HEIGHT * i / last,
                    phase,
                    pressure: Some(pressure),
                    tilt: Some((-45 + 90 * i / last, 10)),
                }
            })
            .collect();
        InjectionScript { samples }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Width and height of the box the samples span.
    pub fn extent(&self) -> (i32, i32) {
        let span = |axis: fn(&Sample) -> i32| {
            let values = || self.samples.iter().map(axis);
            values().max().zip(values().min()).map_or(0, |(hi, lo)| hi - lo)
        };
        (span(|s| s.x), span(|s| s.y))
    }
}

/// A host synthetic pointer device. Dropping it releases the device.
pub trait PointerDevice {
    fn inject(&mut self, sample: &Sample) -> Result<(), InjectError>;
}

/// Sent to the shell when a run ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InjectorNotice {
    Completed { samples: usize },
    Failed { sent: usize, error: InjectError },
}

impl std::fmt::Display for InjectorNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InjectorNotice::Completed { samples } => {
                write!(f, "Synthetic input complete: {samples} samples injected.")
            }
            InjectorNotice::Failed { sent, error } => {
                write!(f, "Synthetic input stopped after {sent} samples: {error}")
            }
        }
    }
}

/// Clears the busy flag when the worker ends, including by panic.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Default, Clone)]
pub struct Injector {
    busy: Arc<AtomicBool>,
}

impl Injector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Starts a run on a new thread. The device is created on that thread by
    /// `make_device`, fed every sample with `interval` between them, then
    /// dropped before the notice is sent.
    pub fn start<D, F>(
        &self,
        script: InjectionScript,
        interval: Duration,
        make_device: F,
        notices: Sender<InjectorNotice>,
    ) -> Result<JoinHandle<()>, InjectError>
    where
        D: PointerDevice,
        F: FnOnce() -> Result<D, InjectError> + Send + 'static,
    {
        if self.busy.swap(true, Ordering::SeqCst) {
            return Err(InjectError::Busy);
        }
        let guard = BusyGuard(Arc::clone(&self.busy));

        info!(samples = script.len(), interval = ?interval, "Starting synthetic input run");
        thread::Builder::new()
            .name("synthetic-input".to_string())
            .spawn(move || {
                let _guard = guard;
                let notice = run_script(&script, interval, make_device);
                match &notice {
                    InjectorNotice::Completed { samples } => info!(samples, "Synthetic input run complete"),
                    InjectorNotice::Failed { sent, error } => {
                        error!(sent, error = %error, "Synthetic input run failed")
                    }
                }
                // The shell may already be gone; nothing to report to then.
                let _ = notices.send(notice);
            })
            .map_err(|e| InjectError::Device(format!("failed to spawn injector thread: {e}")))
    }
}

fn run_script<D, F>(script: &InjectionScript, interval: Duration, make_device: F) -> InjectorNotice
where
    D: PointerDevice,
    F: FnOnce() -> Result<D, InjectError>,
{
    let mut device = match make_device() {
        Ok(device) => device,
        Err(error) => return InjectorNotice::Failed { sent: 0, error },
    };

    for (sent, sample) in script.samples().iter().enumerate() {
        if sent > 0 {
            thread::sleep(interval);
        }
        debug!(x = sample.x, y = sample.y, phase = ?sample.phase, "Injecting sample");
        if let Err(error) = device.inject(sample) {
            return InjectorNotice::Failed { sent, error };
        }
    }
    drop(device);

    InjectorNotice::Completed {
        samples: script.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, unbounded};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        samples: Arc<Mutex<Vec<Sample>>>,
        released: Arc<AtomicBool>,
        fail_at: Option<usize>,
    }

    impl PointerDevice for Recorder {
        fn inject(&mut self, sample: &Sample) -> Result<(), InjectError> {
            let mut samples = self.samples.lock().unwrap();
            if Some(samples.len()) == self.fail_at {
                return Err(InjectError::Device("rejected".to_string()));
            }
            samples.push(*sample);
            Ok(())
        }
    }

    impl Drop for Recorder {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn stroke_has_down_moves_and_up() {
        let script = InjectionScript::stroke((100, 50));
        let samples = script.samples();
        assert_eq!(samples.len(), InjectionScript::STROKE_SAMPLES);
        assert_eq!(samples[0].phase, Phase::Down);
        assert_eq!((samples[0].x, samples[0].y), (100, 50));
        assert!(samples[1..samples.len() - 1].iter().all(|s| s.phase == Phase::Move));
        let last = samples[samples.len() - 1];
        assert_eq!(last.phase, Phase::Up);
        assert_eq!((last.x, last.y), (400, 250));
        assert!(samples.iter().all(|s| s.pressure.unwrap() <= 1024));
        assert!(samples[23].pressure > samples[0].pressure);
        assert_eq!(script.extent(), (300, 200));
        assert_eq!(InjectionScript::new(Vec::new()).extent(), (0, 0));
    }

    #[test]
    fn run_replays_every_sample_then_releases_device() {
        let injector = Injector::new();
        let recorder = Recorder::default();
        let (samples, released) = (Arc::clone(&recorder.samples), Arc::clone(&recorder.released));
        let (tx, rx) = unbounded();
        let script = InjectionScript::stroke((0, 0));

        let handle = injector
            .start(script.clone(), Duration::ZERO, move || Ok(recorder), tx)
            .unwrap();
        handle.join().unwrap();

        assert_eq!(rx.recv().unwrap(), InjectorNotice::Completed { samples: script.len() });
        assert_eq!(samples.lock().unwrap().as_slice(), script.samples());
        assert!(released.load(Ordering::SeqCst));
        assert!(!injector.is_busy());
    }

    #[test]
    fn device_failure_stops_the_run() {
        let injector = Injector::new();
        let mut recorder = Recorder::default();
        recorder.fail_at = Some(2);
        let released = Arc::clone(&recorder.released);
        let (tx, rx) = unbounded();

        let handle = injector
            .start(InjectionScript::stroke((0, 0)), Duration::ZERO, move || Ok(recorder), tx)
            .unwrap();
        handle.join().unwrap();

        assert_eq!(
            rx.recv().unwrap(),
            InjectorNotice::Failed {
                sent: 2,
                error: InjectError::Device("rejected".to_string())
            }
        );
        assert!(released.load(Ordering::SeqCst));
        assert!(!injector.is_busy());
    }

    #[test]
    fn device_creation_failure_is_reported() {
        let injector = Injector::new();
        let (tx, rx) = unbounded();
        let handle = injector
            .start(
                InjectionScript::stroke((0, 0)),
                Duration::ZERO,
                || -> Result<Recorder, InjectError> { Err(InjectError::Device("no device".to_string())) },
                tx,
            )
            .unwrap();
        handle.join().unwrap();
        assert!(matches!(rx.recv().unwrap(), InjectorNotice::Failed { sent: 0, .. }));
    }

    #[test]
    fn concurrent_start_is_refused_until_the_run_ends() {
        let injector = Injector::new();
        let (gate_tx, gate_rx) = bounded::<()>(0);
        let (tx, rx) = unbounded();

        // The factory blocks until the test releases it, keeping the run busy.
        let handle = injector
            .start(
                InjectionScript::stroke((0, 0)),
                Duration::ZERO,
                move || {
                    let _ = gate_rx.recv();
                    Ok(Recorder::default())
                },
                tx.clone(),
            )
            .unwrap();

        assert!(injector.is_busy());
        let second = injector.start(
            InjectionScript::stroke((0, 0)),
            Duration::ZERO,
            || Ok(Recorder::default()),
            tx.clone(),
        );
        assert_eq!(second.err(), Some(InjectError::Busy));

        gate_tx.send(()).unwrap();
        handle.join().unwrap();
        assert!(matches!(rx.recv().unwrap(), InjectorNotice::Completed { .. }));
        assert!(!injector.is_busy());

        let third = injector
            .start(InjectionScript::new(Vec::new()), Duration::ZERO, || Ok(Recorder::default()), tx)
            .unwrap();
        third.join().unwrap();
        assert_eq!(rx.recv().unwrap(), InjectorNotice::Completed { samples: 0 });
    }

    #[test]
    fn notices_render_for_the_message_box() {
        assert_eq!(
            InjectorNotice::Completed { samples: 48 }.to_string(),
            "Synthetic input complete: 48 samples injected."
        );
    }
}
