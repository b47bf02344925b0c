//! Audio thread → UI thread trace handoff
//!
//! The audio side owns the working [`ScrollingTrace`]s. Whenever a block
//! completes it copies the point arrays into the back slot of a triple
//! buffer and publishes; the UI side only ever reads the latest complete
//! snapshot.
//!
//! ## Reconfiguration
//!
//! The UI never touches the audio side's traces. To change the layout it
//! builds a complete new trace state (traces plus a fresh triple buffer),
//! keeps the output half and sends the rest through a wait-free ring:
//!
//! ```text
//!   UI  ── outgoing ring ──▶  audio   (adopted at the start of `process`)
//!   UI  ◀── retired ring ───  audio   (old state, freed on the UI thread)
//! ```
//!
//! The audio thread never allocates, frees or blocks.

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use triple_buffer::{Input, Output, TripleBuffer};

use super::buffer::{ScrollingTrace, TraceLayout};

/// Pending rebuilds the UI may queue before the audio side picks them up
const QUEUE_CAPACITY: usize = 4;

/// Point arrays of every lane, as published by the audio side
pub type TraceSnapshot<const N: usize> = [Vec<f32>; N];

/// Everything the audio side needs for one layout
struct TraceState<const N: usize> {
    traces: [ScrollingTrace; N],
    input: Input<TraceSnapshot<N>>,
}

impl<const N: usize> TraceState<N> {
    fn new(layout: TraceLayout, fills: [f32; N]) -> (Self, Output<TraceSnapshot<N>>) {
        let traces: [ScrollingTrace; N] =
            std::array::from_fn(|lane| ScrollingTrace::new(layout, fills[lane]));
        let initial: TraceSnapshot<N> = std::array::from_fn(|lane| traces[lane].points().to_vec());
        let (input, output) = TripleBuffer::new(&initial).split();
        (Self { traces, input }, output)
    }

    fn publish(&mut self) {
        let slot = self.input.input_buffer();
        for (dst, trace) in slot.iter_mut().zip(self.traces.iter()) {
            for (d, s) in dst.iter_mut().zip(trace.points()) {
                *d = *s;
            }
        }
        self.input.publish();
    }
}

/// Audio-side half of a trace channel with `N` lanes
pub struct TraceWriter<const N: usize> {
    state: Box<TraceState<N>>,
    incoming: HeapCons<Box<TraceState<N>>>,
    retired: HeapProd<Box<TraceState<N>>>,
}

/// UI-side half of a trace channel with `N` lanes
pub struct TraceReader<const N: usize> {
    output: Output<TraceSnapshot<N>>,
    outgoing: HeapProd<Box<TraceState<N>>>,
    retired: HeapCons<Box<TraceState<N>>>,
    layout: TraceLayout,
    /// Set while rebuilds are refused because the audio side is idle
    deferred: bool,
}

/// Create a connected writer/reader pair
///
/// Lane `i` starts filled with `fills[i]`.
pub fn trace_channel<const N: usize>(
    layout: TraceLayout,
    fills: [f32; N],
) -> (TraceWriter<N>, TraceReader<N>) {
    let (state, output) = TraceState::new(layout, fills);
    let (outgoing, incoming) = HeapRb::new(QUEUE_CAPACITY).split();
    let (retired_tx, retired_rx) = HeapRb::new(QUEUE_CAPACITY).split();

    let writer = TraceWriter {
        state: Box::new(state),
        incoming,
        retired: retired_tx,
    };
    let reader = TraceReader {
        output,
        outgoing,
        retired: retired_rx,
        layout: *writer.state.traces[0].layout(),
        deferred: false,
    };
    (writer, reader)
}

impl<const N: usize> TraceWriter<N> {
    /// Push one sample per lane
    ///
    /// All lanes share one decimation cadence, so a completed block
    /// publishes every lane at once.
    pub fn process(&mut self, samples: [f64; N]) {
        self.adopt_pending();

        let mut completed = false;
        for (trace, sample) in self.state.traces.iter_mut().zip(samples) {
            completed |= trace.process(sample);
        }
        if completed {
            self.state.publish();
        }
    }

    /// Layout currently in use on the audio side
    pub fn layout(&self) -> &TraceLayout {
        self.state.traces[0].layout()
    }

    fn adopt_pending(&mut self) {
        // Only swap when the replaced state has somewhere to go
        while self.retired.vacant_len() > 0 {
            let Some(next) = self.incoming.try_pop() else {
                break;
            };
            let old = std::mem::replace(&mut self.state, next);
            let _ = self.retired.try_push(old);
        }
    }
}

impl<const N: usize> TraceReader<N> {
    /// Latest snapshot published by the audio side
    pub fn snapshot(&mut self) -> &TraceSnapshot<N> {
        self.collect_retired();
        self.output.read()
    }

    /// Whether the audio side published since the last [`snapshot`](Self::snapshot)
    pub fn has_update(&self) -> bool {
        self.output.updated()
    }

    /// Hand a fresh layout to the audio side
    ///
    /// Returns `false` when the queue is full; nothing changes in that case
    /// and the caller should retry on a later frame. A full queue is checked
    /// before anything is allocated, so retrying every frame is cheap.
    pub fn rebuild(&mut self, layout: TraceLayout, fills: [f32; N]) -> bool {
        self.collect_retired();
        if self.outgoing.is_full() {
            self.defer();
            return false;
        }

        let (state, output) = TraceState::new(layout, fills);
        let applied = *state.traces[0].layout();
        match self.outgoing.try_push(Box::new(state)) {
            Ok(()) => {
                log::debug!(
                    "trace rebuild queued: {} points, decimation {}",
                    applied.point_count,
                    applied.decimation
                );
                self.output = output;
                self.layout = applied;
                self.deferred = false;
                true
            }
            Err(_) => {
                self.defer();
                false
            }
        }
    }

    /// Whether the last rebuild was refused
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    fn defer(&mut self) {
        if !self.deferred {
            log::warn!("trace rebuild deferred: audio side has not caught up");
            self.deferred = true;
        }
    }

    /// Layout of the snapshots this reader returns
    pub fn layout(&self) -> &TraceLayout {
        &self.layout
    }

    fn collect_retired(&mut self) {
        while let Some(old) = self.retired.try_pop() {
            drop(old);
        }
    }
}
