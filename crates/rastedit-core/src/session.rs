//! Edit sessions and the replay composition policy.
//!
//! An [`EditSession`] owns one immutable original bitmap and one mutable
//! working bitmap. The correctness invariant of the whole pipeline lives
//! here: the working image is always derivable from the original by
//! replaying `(filter, adjustments)` in that fixed order. Adjustment
//! changes are never layered onto an already-adjusted buffer; doing so
//! would compound rounding error and make "back to 100%" inexact.
//!
//! # Supersede semantics
//!
//! There is no cancel primitive. Every staged replay carries a generation
//! tag; staging a new one (or resetting, or reshaping the working image)
//! bumps the session generation, so an older in-flight run fails its
//! [`commit`](EditSession::commit) and its completion signal is suppressed.

use tracing::debug;

use crate::bitmap::{Bitmap, ImageInfo};
use crate::codec::{self, DecodeError, EncodeError, ImageFormat};
use crate::filters::{filter_op, AdjustmentParams};
use crate::processor::{ChunkedRun, PixelOp, ProgressSink};
use crate::transform::{self, FilterType, FlipAxis, GeometryError};
use crate::{AdjustmentState, FilterKind};

/// Where the session sits in the filter/adjustment state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No filter, default adjustments; working equals original.
    Clean,
    /// A filter is active, adjustments are at their defaults.
    Filtered,
    /// No filter, at least one adjustment is off its default.
    Adjusted,
    /// Both a filter and non-default adjustments are active.
    FilteredAdjusted,
}

/// One pass of a replay: either a filter effect or the adjustment triple.
#[derive(Debug, Clone, Copy)]
enum ReplayPass {
    Filter(fn([u8; 4]) -> [u8; 4]),
    Adjust(AdjustmentParams),
}

impl PixelOp for ReplayPass {
    #[inline]
    fn apply(&self, px: [u8; 4]) -> [u8; 4] {
        match self {
            ReplayPass::Filter(f) => f(px),
            ReplayPass::Adjust(params) => params.apply(px),
        }
    }
}

enum RunState {
    /// Current chunked pass plus the queue of remaining passes (reversed,
    /// popped from the end).
    Active(ChunkedRun<ReplayPass>, Vec<ReplayPass>),
    Done(Vec<u8>),
}

/// A staged, generation-tagged rebuild of the working buffer.
///
/// Holds a copy of the original's pixels and walks it through up to two
/// chunked passes (filter, then adjustments). Drive it with [`step`]
/// (one chunk per host scheduling turn) until complete, then hand it to
/// [`EditSession::commit`].
///
/// [`step`]: ReplayRun::step
pub struct ReplayRun {
    state: RunState,
    completed_passes: usize,
    total_passes: usize,
    chunk_pixels: usize,
    generation: u64,
}

impl ReplayRun {
    fn new(pixels: Vec<u8>, mut passes: Vec<ReplayPass>, chunk_pixels: usize, generation: u64) -> Self {
        let total_passes = passes.len();
        passes.reverse();
        let state = match passes.pop() {
            Some(op) => RunState::Active(ChunkedRun::new(pixels, op, chunk_pixels, generation), passes),
            None => RunState::Done(pixels),
        };
        Self {
            state,
            completed_passes: 0,
            total_passes,
            chunk_pixels,
            generation,
        }
    }

    /// Process one chunk and return overall percent done across all passes.
    pub fn step(&mut self) -> f32 {
        if let RunState::Active(run, _) = &mut self.state {
            run.step();
            if run.is_complete() {
                self.completed_passes += 1;
                self.advance();
            }
        }
        self.progress()
    }

    fn advance(&mut self) {
        let state = std::mem::replace(&mut self.state, RunState::Done(Vec::new()));
        self.state = match state {
            RunState::Active(run, mut queued) => {
                let pixels = run.into_pixels();
                match queued.pop() {
                    Some(op) => RunState::Active(
                        ChunkedRun::new(pixels, op, self.chunk_pixels, self.generation),
                        queued,
                    ),
                    None => RunState::Done(pixels),
                }
            }
            done => done,
        };
    }

    /// Overall percent done; the passes share the 0..=100 range evenly.
    pub fn progress(&self) -> f32 {
        match &self.state {
            RunState::Done(_) => 100.0,
            RunState::Active(run, _) => {
                (self.completed_passes as f32 * 100.0 + run.progress()) / self.total_passes as f32
            }
        }
    }

    /// Whether every pass has finished.
    pub fn is_complete(&self) -> bool {
        matches!(self.state, RunState::Done(_))
    }

    /// Generation this run was staged under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn into_pixels(self) -> Vec<u8> {
        match self.state {
            RunState::Done(pixels) => pixels,
            RunState::Active(run, _) => run.into_pixels(),
        }
    }
}

/// An editing session over one source bitmap.
#[derive(Debug, Clone)]
pub struct EditSession {
    original: Bitmap,
    working: Bitmap,
    filter: FilterKind,
    adjustments: AdjustmentState,
    generation: u64,
}

impl EditSession {
    /// Start a session; the working image begins as a copy of the original.
    pub fn new(original: Bitmap) -> Self {
        let working = original.clone();
        Self {
            original,
            working,
            filter: FilterKind::None,
            adjustments: AdjustmentState::default(),
            generation: 0,
        }
    }

    /// Decode source bytes and start a session. No session exists if the
    /// bytes are malformed.
    pub fn open(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(Self::new(codec::decode(bytes)?))
    }

    /// The immutable source bitmap.
    pub fn original(&self) -> &Bitmap {
        &self.original
    }

    /// The current working bitmap.
    pub fn working(&self) -> &Bitmap {
        &self.working
    }

    /// The active filter.
    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    /// The current adjustment sliders.
    pub fn adjustments(&self) -> AdjustmentState {
        self.adjustments
    }

    /// Current generation; staged runs from earlier generations are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Derived metadata of the working image.
    pub fn working_info(&self) -> ImageInfo {
        self.working.info()
    }

    /// Classify the session by its filter and adjustment state.
    pub fn state(&self) -> SessionState {
        match (self.filter == FilterKind::None, self.adjustments.is_default()) {
            (true, true) => SessionState::Clean,
            (false, true) => SessionState::Filtered,
            (true, false) => SessionState::Adjusted,
            (false, false) => SessionState::FilteredAdjusted,
        }
    }

    /// Stage a replay of the current edit stack from the original.
    ///
    /// Bumps the session generation, so any previously staged run becomes
    /// stale. The returned run starts from a fresh copy of the original's
    /// pixels and carries a filter pass (if a filter is active) followed by
    /// an adjustment pass (if any slider is off its default).
    pub fn stage_replay(&mut self, chunk_pixels: usize) -> ReplayRun {
        self.generation += 1;

        let mut passes = Vec::with_capacity(2);
        if let Some(op) = filter_op(self.filter) {
            passes.push(ReplayPass::Filter(op));
        }
        if !self.adjustments.is_default() {
            passes.push(ReplayPass::Adjust(AdjustmentParams::new(&self.adjustments)));
        }
        debug!(
            generation = self.generation,
            filter = ?self.filter,
            passes = passes.len(),
            "staging replay"
        );
        ReplayRun::new(
            self.original.pixels.clone(),
            passes,
            chunk_pixels,
            self.generation,
        )
    }

    /// Commit a finished replay into the working image.
    ///
    /// Returns false (and fires no completion signal) if the run is stale
    /// or has not finished; the working image is untouched in that case.
    pub fn commit<S: ProgressSink + ?Sized>(&mut self, run: ReplayRun, sink: &mut S) -> bool {
        if !run.is_complete() || run.generation() != self.generation {
            debug!(
                run_generation = run.generation(),
                current = self.generation,
                "dropping stale replay"
            );
            return false;
        }
        self.working = Bitmap::new(self.original.width, self.original.height, run.into_pixels());
        sink.on_complete();
        true
    }

    fn replay<S: ProgressSink + ?Sized>(&mut self, chunk_pixels: usize, sink: &mut S) -> bool {
        let mut run = self.stage_replay(chunk_pixels);
        if run.is_complete() {
            sink.on_progress(100.0);
        }
        while !run.is_complete() {
            let percent = run.step();
            sink.on_progress(percent);
        }
        self.commit(run, sink)
    }

    /// Apply a filter effect, replaying from the original and re-applying
    /// the current adjustments on top.
    pub fn apply_filter<S: ProgressSink + ?Sized>(
        &mut self,
        kind: FilterKind,
        chunk_pixels: usize,
        sink: &mut S,
    ) -> bool {
        self.filter = kind;
        self.replay(chunk_pixels, sink)
    }

    /// Change the adjustment sliders, replaying from the original through
    /// the active filter first.
    pub fn set_adjustments<S: ProgressSink + ?Sized>(
        &mut self,
        adjustments: AdjustmentState,
        chunk_pixels: usize,
        sink: &mut S,
    ) -> bool {
        self.adjustments = adjustments;
        self.replay(chunk_pixels, sink)
    }

    /// Drop all edits: working becomes byte-identical to the original,
    /// filter and adjustments return to their defaults, and any in-flight
    /// replay is superseded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.filter = FilterKind::None;
        self.adjustments = AdjustmentState::default();
        self.working = self.original.clone();
    }

    /// Crop the working image in place. On error the working image is
    /// unchanged.
    pub fn crop(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<ImageInfo, GeometryError> {
        let cropped = transform::crop(&self.working, x, y, width, height)?;
        self.generation += 1;
        self.working = cropped;
        Ok(self.working_info())
    }

    /// Resize the working image in place. With `preserve_aspect`, the
    /// requested box is interpreted with fit-inside semantics.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        preserve_aspect: bool,
        filter: FilterType,
    ) -> Result<ImageInfo, GeometryError> {
        let resized = transform::resize(&self.working, width, height, preserve_aspect, filter)?;
        self.generation += 1;
        self.working = resized;
        Ok(self.working_info())
    }

    /// Rotate the working image in place. Positive angles are clockwise;
    /// exact multiples of 90 degrees are lossless.
    pub fn rotate(&mut self, angle_degrees: f64, filter: FilterType) -> ImageInfo {
        self.generation += 1;
        self.working = transform::rotate(&self.working, angle_degrees, filter);
        self.working_info()
    }

    /// Mirror the working image along an axis.
    pub fn flip(&mut self, axis: FlipAxis) -> ImageInfo {
        self.generation += 1;
        self.working = transform::flip(&self.working, axis);
        self.working_info()
    }

    /// Encode the working image for export.
    pub fn export(&self, format: ImageFormat, quality: f32) -> Result<Vec<u8>, EncodeError> {
        codec::encode(&self.working, format, quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{NullSink, DEFAULT_CHUNK_PIXELS};

    /// Sink that records completions for supersede assertions.
    #[derive(Debug, Default)]
    struct CountingSink {
        progress_calls: usize,
        completions: usize,
    }

    impl ProgressSink for CountingSink {
        fn on_progress(&mut self, _percent: f32) {
            self.progress_calls += 1;
        }
        fn on_complete(&mut self) {
            self.completions += 1;
        }
    }

    fn gradient_bitmap(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.extend_from_slice(&[v, 255 - v, v.wrapping_mul(3), 255]);
            }
        }
        Bitmap::new(width, height, pixels)
    }

    #[test]
    fn test_new_session_is_clean() {
        let session = EditSession::new(gradient_bitmap(8, 8));
        assert_eq!(session.state(), SessionState::Clean);
        assert_eq!(session.working().pixels, session.original().pixels);
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut session = EditSession::new(gradient_bitmap(4, 4));
        let mut sink = NullSink;

        session.apply_filter(FilterKind::Sepia, 16, &mut sink);
        assert_eq!(session.state(), SessionState::Filtered);

        let mut adj = AdjustmentState::default();
        adj.brightness = 130;
        session.set_adjustments(adj, 16, &mut sink);
        assert_eq!(session.state(), SessionState::FilteredAdjusted);

        session.apply_filter(FilterKind::None, 16, &mut sink);
        assert_eq!(session.state(), SessionState::Adjusted);

        session.set_adjustments(AdjustmentState::default(), 16, &mut sink);
        assert_eq!(session.state(), SessionState::Clean);
    }

    #[test]
    fn test_reset_restores_original_exactly() {
        let mut session = EditSession::new(gradient_bitmap(16, 16));
        let mut sink = NullSink;

        session.apply_filter(FilterKind::Invert, 32, &mut sink);
        let mut adj = AdjustmentState::default();
        adj.saturation = 170;
        session.set_adjustments(adj, 32, &mut sink);
        assert_ne!(session.working().pixels, session.original().pixels);

        session.reset();
        assert_eq!(session.state(), SessionState::Clean);
        assert_eq!(session.working().pixels, session.original().pixels);
    }

    #[test]
    fn test_replay_to_defaults_is_byte_identical() {
        // Driving a replay with no filter and default adjustments must
        // reproduce the original exactly, not approximately.
        let mut session = EditSession::new(gradient_bitmap(16, 16));
        let mut sink = NullSink;
        session.apply_filter(FilterKind::Grayscale, 64, &mut sink);
        session.apply_filter(FilterKind::None, 64, &mut sink);
        assert_eq!(session.working().pixels, session.original().pixels);
    }

    #[test]
    fn test_grayscale_known_2x2_scenario() {
        let original = Bitmap::new(
            2,
            2,
            vec![
                255, 0, 0, 255, // red
                0, 255, 0, 255, // green
                0, 0, 255, 255, // blue
                255, 255, 255, 255, // white
            ],
        );
        let mut session = EditSession::new(original);
        session.apply_filter(FilterKind::Grayscale, 1, &mut NullSink);

        assert_eq!(
            session.working().pixels,
            vec![
                76, 76, 76, 255, //
                150, 150, 150, 255, //
                29, 29, 29, 255, //
                255, 255, 255, 255,
            ]
        );
    }

    #[test]
    fn test_filter_then_adjustments_order_is_fixed() {
        // The pipeline is filter-first. Manually running adjustments before
        // the filter must give a different buffer, proving the order is
        // observable and enforced.
        let source = gradient_bitmap(8, 8);
        let mut adj = AdjustmentState::default();
        adj.brightness = 60;
        adj.contrast = 30;

        let mut session = EditSession::new(source.clone());
        session.apply_filter(FilterKind::Sepia, 16, &mut NullSink);
        session.set_adjustments(adj, 16, &mut NullSink);
        let filter_first = session.working().pixels.clone();

        // Adjustments first, then sepia, composed by hand.
        let params = AdjustmentParams::new(&adj);
        let mut reversed = source.pixels.clone();
        for px in reversed.chunks_exact_mut(4) {
            let adjusted = params.apply([px[0], px[1], px[2], px[3]]);
            let out = crate::filters::sepia(adjusted);
            px.copy_from_slice(&out);
        }

        assert_ne!(filter_first, reversed);
    }

    #[test]
    fn test_adjustments_replay_from_original_not_cumulative() {
        // Setting brightness twice must equal setting it once; layering
        // onto an adjusted buffer would drift.
        let source = gradient_bitmap(8, 8);
        let mut adj = AdjustmentState::default();
        adj.brightness = 140;

        let mut twice = EditSession::new(source.clone());
        twice.set_adjustments(adj, 16, &mut NullSink);
        twice.set_adjustments(adj, 16, &mut NullSink);

        let mut once = EditSession::new(source);
        once.set_adjustments(adj, 16, &mut NullSink);

        assert_eq!(twice.working().pixels, once.working().pixels);
    }

    #[test]
    fn test_chunk_size_invariance_through_session() {
        let source = gradient_bitmap(16, 16);
        let mut outputs = Vec::new();
        for chunk_pixels in [4, 400, 4000] {
            let mut session = EditSession::new(source.clone());
            session.apply_filter(FilterKind::Grayscale, chunk_pixels, &mut NullSink);
            outputs.push(session.working().pixels.clone());
        }
        assert_eq!(outputs[0], outputs[1]);
        assert_eq!(outputs[1], outputs[2]);
    }

    #[test]
    fn test_stale_run_is_dropped_without_completion() {
        let mut session = EditSession::new(gradient_bitmap(8, 8));
        let mut sink = CountingSink::default();

        // Stage a grayscale replay but do not commit yet.
        session.filter = FilterKind::Grayscale;
        let mut old_run = session.stage_replay(16);
        while !old_run.is_complete() {
            old_run.step();
        }

        // A newer edit supersedes it.
        session.filter = FilterKind::Invert;
        let mut new_run = session.stage_replay(16);
        while !new_run.is_complete() {
            new_run.step();
        }

        assert!(!session.commit(old_run, &mut sink));
        assert_eq!(sink.completions, 0);

        assert!(session.commit(new_run, &mut sink));
        assert_eq!(sink.completions, 1);
        assert_eq!(
            session.working().pixels,
            session
                .original()
                .pixels
                .chunks_exact(4)
                .flat_map(|px| [255 - px[0], 255 - px[1], 255 - px[2], px[3]])
                .collect::<Vec<u8>>()
        );
    }

    #[test]
    fn test_incomplete_run_cannot_commit() {
        let mut session = EditSession::new(gradient_bitmap(8, 8));
        session.filter = FilterKind::Invert;
        let mut run = session.stage_replay(4);
        run.step(); // partial
        assert!(!session.commit(run, &mut NullSink));
        // Working untouched by the failed commit.
        assert_eq!(session.working().pixels, session.original().pixels);
    }

    #[test]
    fn test_geometry_supersedes_staged_replay() {
        let mut session = EditSession::new(gradient_bitmap(8, 8));
        session.filter = FilterKind::Grayscale;
        let mut run = session.stage_replay(16);
        while !run.is_complete() {
            run.step();
        }

        session.crop(0, 0, 4, 4).unwrap();
        // The replay was staged against the pre-crop world; it must not
        // stomp the crop.
        assert!(!session.commit(run, &mut NullSink));
        assert_eq!(session.working().width, 4);
    }

    #[test]
    fn test_replay_resets_geometry_to_original_shape() {
        let mut session = EditSession::new(gradient_bitmap(8, 6));
        session.crop(0, 0, 4, 3).unwrap();
        assert_eq!(session.working().width, 4);

        session.apply_filter(FilterKind::Invert, 16, &mut NullSink);
        // Replays rebuild from the original, original-shaped.
        assert_eq!(session.working().width, 8);
        assert_eq!(session.working().height, 6);
    }

    #[test]
    fn test_crop_error_leaves_working_unchanged() {
        let mut session = EditSession::new(gradient_bitmap(10, 10));
        let before = session.working().clone();
        assert!(session.crop(20, 20, 5, 5).is_err());
        assert_eq!(session.working(), &before);
    }

    #[test]
    fn test_crop_clamp_scenario() {
        let mut session = EditSession::new(gradient_bitmap(10, 10));
        let info = session.crop(5, 5, 100, 100).unwrap();
        assert_eq!(info.width, 5);
        assert_eq!(info.height, 5);
        assert_eq!(info.byte_size, 5 * 5 * 4);
    }

    #[test]
    fn test_rotate_round_trip_through_session() {
        let mut session = EditSession::new(gradient_bitmap(7, 5));
        let before = session.working().clone();

        let info = session.rotate(90.0, FilterType::Bilinear);
        assert_eq!(info.width, 5);
        assert_eq!(info.height, 7);

        session.rotate(-90.0, FilterType::Bilinear);
        assert_eq!(session.working(), &before);
    }

    #[test]
    fn test_progress_reaches_100_with_two_passes() {
        let mut session = EditSession::new(gradient_bitmap(16, 16));
        let mut sink = CountingSink::default();
        let mut adj = AdjustmentState::default();
        adj.brightness = 120;
        session.apply_filter(FilterKind::Sepia, 10, &mut sink);
        session.set_adjustments(adj, 10, &mut sink);
        assert!(sink.progress_calls > 0);
        assert_eq!(sink.completions, 2);
    }

    #[test]
    fn test_two_pass_progress_is_monotonic_and_terminal() {
        let mut session = EditSession::new(gradient_bitmap(16, 16));
        session.filter = FilterKind::Sepia;
        session.adjustments.brightness = 150;
        let mut run = session.stage_replay(30);

        let mut last = 0.0f32;
        while !run.is_complete() {
            let p = run.step();
            assert!(p >= last, "progress went backwards: {} -> {}", last, p);
            last = p;
        }
        assert!((last - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_default_chunk_constant_is_sane() {
        // One scheduling turn covers 1000 pixels (4000 bytes).
        assert_eq!(DEFAULT_CHUNK_PIXELS, 1000);
    }
}
