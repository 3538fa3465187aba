//! Background synthesis over an immutable curve snapshot.
//!
//! The worker owns an `Arc<ScoreCurves>` and never sees the live score, so the
//! editor may keep mutating the score while synthesis runs. Cancellation is
//! cooperative: the flag is checked before every sample step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::channel::ChannelMap;
use crate::curve::ScoreCurves;

/// Consumer of dense score curves, stepped once per sample.
pub trait Synthesizer: Send + 'static {
    /// Result produced after the last sample.
    type Output: Send + 'static;

    /// Called once before the first step.
    fn prepare(&mut self, _curves: &ScoreCurves) {}

    /// Processes sample `index` of every curve.
    fn step(&mut self, curves: &ScoreCurves, index: usize);

    /// Consumes the synthesizer and returns its result.
    fn finish(self) -> Self::Output;
}

/// Notifications posted by the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Percentage of samples processed so far.
    Progress(u8),
    /// All samples were processed.
    Finished,
    /// The worker stopped after a cancellation request.
    Cancelled,
}

/// How a worker run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerOutcome<O> {
    Completed(O),
    Cancelled { at_sample: usize },
}

/// Errors from the worker thread.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The synthesizer panicked.
    #[error("synthesis worker panicked: {0}")]
    Panicked(String),
}

/// Handle to a running synthesis thread.
pub struct SynthesisWorker<O> {
    handle: Option<JoinHandle<WorkerOutcome<O>>>,
    cancel: Arc<AtomicBool>,
    events: Receiver<WorkerEvent>,
}

impl<O: Send + 'static> SynthesisWorker<O> {
    /// Starts synthesizing `curves` on a new thread.
    ///
    /// A progress event is posted every `progress_interval` samples.
    pub fn spawn<S>(curves: Arc<ScoreCurves>, synth: S, progress_interval: usize) -> Self
    where
        S: Synthesizer<Output = O>,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, events) = crossbeam_channel::unbounded();
        let flag = Arc::clone(&cancel);
        let interval = progress_interval.max(1);

        let handle = thread::spawn(move || run(curves, synth, interval, flag, tx));

        Self {
            handle: Some(handle),
            cancel,
            events,
        }
    }

    /// Asks the worker to stop before its next step.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Returns true once the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Event stream of the worker.
    pub fn events(&self) -> &Receiver<WorkerEvent> {
        &self.events
    }

    /// Blocks until the worker exits.
    pub fn wait(mut self) -> Result<WorkerOutcome<O>, WorkerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                WorkerError::Panicked(message)
            }),
            None => Err(WorkerError::Panicked("worker already joined".to_string())),
        }
    }

    /// Cancels the worker and blocks until it acknowledges.
    pub fn cancel_and_wait(self) -> Result<WorkerOutcome<O>, WorkerError> {
        self.cancel();
        self.wait()
    }
}

impl<O> Drop for SynthesisWorker<O> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel.store(true, Ordering::Release);
            let _ = handle.join();
        }
    }
}

fn run<S: Synthesizer>(
    curves: Arc<ScoreCurves>,
    mut synth: S,
    interval: usize,
    cancel: Arc<AtomicBool>,
    tx: Sender<WorkerEvent>,
) -> WorkerOutcome<S::Output> {
    let total = curves.num_samples();
    debug!(samples = total, "synthesis worker started");
    synth.prepare(&curves);

    for index in 0..total {
        if cancel.load(Ordering::Acquire) {
            debug!(at_sample = index, "synthesis worker cancelled");
            let _ = tx.send(WorkerEvent::Cancelled);
            return WorkerOutcome::Cancelled { at_sample: index };
        }
        synth.step(&curves, index);

        let done = index + 1;
        if done % interval == 0 && done < total {
            let _ = tx.send(WorkerEvent::Progress((done * 100 / total) as u8));
        }
    }

    let output = synth.finish();
    let _ = tx.send(WorkerEvent::Progress(100));
    let _ = tx.send(WorkerEvent::Finished);
    debug!(samples = total, "synthesis worker finished");
    WorkerOutcome::Completed(output)
}

/// All channel values at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub time_s: f64,
    pub values: ChannelMap<f64>,
}

/// Synthesizer that records the curves at a lower frame rate.
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    frame_rate_hz: f64,
    samples_per_frame: f64,
    next_frame: usize,
    frames: Vec<Frame>,
}

impl FrameRecorder {
    pub fn new(frame_rate_hz: f64) -> Self {
        Self {
            frame_rate_hz,
            samples_per_frame: 1.0,
            next_frame: 0,
            frames: Vec::new(),
        }
    }
}

impl Synthesizer for FrameRecorder {
    type Output = Vec<Frame>;

    fn prepare(&mut self, curves: &ScoreCurves) {
        // Never record more than one frame per sample.
        let frame_rate = if self.frame_rate_hz.is_finite() && self.frame_rate_hz > 0.0 {
            self.frame_rate_hz.min(curves.sample_rate_hz)
        } else {
            curves.sample_rate_hz
        };
        self.frame_rate_hz = frame_rate;
        self.samples_per_frame = curves.sample_rate_hz / frame_rate;
        self.next_frame = 0;
        self.frames.clear();
    }

    fn step(&mut self, curves: &ScoreCurves, index: usize) {
        let due = (self.next_frame as f64 * self.samples_per_frame).round() as usize;
        if index < due {
            return;
        }
        self.frames.push(Frame {
            time_s: index as f64 / curves.sample_rate_hz,
            values: curves.curves.map(|_, curve| curve.samples()[index]),
        });
        self.next_frame += 1;
    }

    fn finish(self) -> Vec<Frame> {
        self.frames
    }
}
