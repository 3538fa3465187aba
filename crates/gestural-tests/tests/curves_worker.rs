//! Curve generation and synthesis worker tests.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gestural-tests --test curves_worker
//! ```

use std::sync::{mpsc, Arc};

use gestural_score::{
    Channel, FrameRecorder, GesturalScore, Gesture, ScoreCurves, SynthesisWorker, Synthesizer,
    TargetFollower, WorkerEvent, WorkerOutcome,
};
use gestural_tests::fixtures::demo_score;

// ============================================================================
// Curves
// ============================================================================

#[test]
fn test_curve_follows_exponential_law() {
    let tau = 0.01;
    let mut score = GesturalScore::default();
    let velic = score.sequence_mut(Channel::Velic);
    velic.append(Gesture::continuous(0.1, 0.0, tau));
    velic.append(Gesture::continuous(0.2, 1.0, tau));

    let curves = score.calc_curves(1000.0).unwrap();
    let samples = curves.curve(Channel::Velic).samples();
    assert_eq!(samples.len(), 301);
    assert!(samples[..100].iter().all(|v| *v == 0.0));

    let decay = (-0.001f64 / tau).exp();
    for m in 0..150 {
        let expected = 1.0 - decay.powi(m as i32 + 1);
        assert!(
            (samples[100 + m] - expected).abs() < 1e-9,
            "sample {}: {} vs {}",
            100 + m,
            samples[100 + m],
            expected
        );
    }
    // Five time constants after the step the curve is within 1% of the target.
    assert!(samples[150] > 0.99);
}

#[test]
fn test_zero_time_constant_is_a_step() {
    let mut follower = TargetFollower::new(0.0, 1000.0);
    assert_eq!(follower.next_sample(5.0, 0.0), 5.0);
    assert_eq!(follower.value(), 5.0);
}

#[test]
fn test_curves_are_cached_per_rate() {
    let mut score = demo_score();
    let n = score.calc_curves(1000.0).unwrap().num_samples();
    assert_eq!(n, 651);
    assert!(score.cached_curves().is_some());

    score.change_f0_offset(1.0);
    assert!(score.cached_curves().is_none());

    assert_eq!(score.calc_curves(200.0).unwrap().num_samples(), 131);
    assert_eq!(score.cached_curves().unwrap().sample_rate_hz, 200.0);
}

#[test]
fn test_nominal_channels_have_labels_and_activation() {
    let mut score = demo_score();
    let curves = score.calc_curves(1000.0).unwrap();

    assert_eq!(curves.label_at(Channel::Lip, 0.05), Some("ll-labial-closure"));
    assert_eq!(curves.label_at(Channel::Lip, 0.3), None);
    assert_eq!(curves.label_at(Channel::GlottalShape, 0.62), Some("open"));
    assert!(curves.labels(Channel::F0).is_empty());

    // The closure activation rises during the closure and decays afterwards.
    assert!(curves.value_at(Channel::Lip, 0.13) > 0.9);
    assert!(curves.value_at(Channel::Lip, 0.3) < 0.01);
}

// ============================================================================
// Worker
// ============================================================================

#[test]
fn test_worker_sees_snapshot_not_live_score() {
    let mut score = demo_score();
    let snapshot = score.snapshot(1000.0).unwrap();
    let worker = SynthesisWorker::spawn(Arc::clone(&snapshot), FrameRecorder::new(1000.0), 100);

    // Editing the live score does not affect the running worker.
    score.change_f0_offset(2.0);
    assert_eq!(score.calc_curves(1000.0).unwrap().value_at(Channel::F0, 0.0), 86.0);

    let WorkerOutcome::Completed(frames) = worker.wait().unwrap() else {
        panic!("worker was cancelled");
    };
    assert_eq!(frames.len(), snapshot.num_samples());
    assert_eq!(*frames[0].values.get(Channel::F0), 84.0);
}

#[test]
fn test_worker_reports_progress_then_finished() {
    let snapshot = demo_score().snapshot(1000.0).unwrap();
    let worker = SynthesisWorker::spawn(snapshot, FrameRecorder::new(50.0), 50);
    let events = worker.events().clone();
    assert!(matches!(worker.wait().unwrap(), WorkerOutcome::Completed(_)));

    let events: Vec<WorkerEvent> = events.try_iter().collect();
    assert_eq!(events.last(), Some(&WorkerEvent::Finished));
    assert_eq!(
        events[events.len() - 2],
        WorkerEvent::Progress(100),
        "{:?}",
        events
    );
    let progress = events
        .iter()
        .filter(|e| matches!(e, WorkerEvent::Progress(_)))
        .count();
    // 651 samples, one event every 50 samples, plus the final 100%.
    assert_eq!(progress, 14);
}

/// Signals when it reaches one sample and waits there until the test releases it.
struct Held {
    reached: mpsc::Sender<()>,
    release: mpsc::Receiver<()>,
    at: usize,
    steps: usize,
}

impl Synthesizer for Held {
    type Output = usize;

    fn step(&mut self, _curves: &ScoreCurves, index: usize) {
        if index == self.at {
            let _ = self.reached.send(());
            let _ = self.release.recv();
        }
        self.steps += 1;
    }

    fn finish(self) -> usize {
        self.steps
    }
}

#[test]
fn test_worker_cancellation_stops_before_next_sample() {
    let (reached_tx, reached) = mpsc::channel();
    let (release, held) = mpsc::channel();
    let synth = Held {
        reached: reached_tx,
        release: held,
        at: 20,
        steps: 0,
    };
    let worker = SynthesisWorker::spawn(demo_score().snapshot(1000.0).unwrap(), synth, 10);

    // Sample 20 is in progress, so the cancel lands before sample 21.
    reached.recv().unwrap();
    assert!(!worker.is_finished());
    worker.cancel();
    release.send(()).unwrap();

    let events = worker.events().clone();
    assert_eq!(
        worker.wait().unwrap(),
        WorkerOutcome::Cancelled { at_sample: 21 }
    );
    assert_eq!(events.try_iter().last(), Some(WorkerEvent::Cancelled));
}

#[test]
fn test_dropping_worker_cancels_it() {
    let (reached_tx, _reached) = mpsc::channel();
    let (release, held) = mpsc::channel();
    let synth = Held {
        reached: reached_tx,
        release: held,
        at: 0,
        steps: 0,
    };
    let worker = SynthesisWorker::spawn(demo_score().snapshot(1000.0).unwrap(), synth, 10);
    let events = worker.events().clone();

    // The release is buffered, so the join inside drop cannot hang.
    release.send(()).unwrap();
    drop(worker);

    let last = events.try_iter().last();
    assert!(
        matches!(last, Some(WorkerEvent::Cancelled) | Some(WorkerEvent::Finished)),
        "{:?}",
        last
    );
}
