//! Incremental pixel processing.
//!
//! Applying a per-pixel op to a full-resolution bitmap in one pass would
//! block a host's event loop for the whole walk. [`ChunkedRun`] instead
//! processes a fixed number of pixels per [`step`](ChunkedRun::step) call
//! and reports fractional progress after each chunk; the gap between calls
//! is the cooperative yield point where a host scheduler may run other
//! work, including a newer edit that supersedes this one.
//!
//! Chunking affects only responsiveness: for a fixed input and op, the
//! finished buffer is byte-identical for every chunk size.

use crate::bitmap::CHANNELS;

/// Default pixels per chunk. Matches the editor's historical batch size of
/// 4000 bytes per scheduling turn.
pub const DEFAULT_CHUNK_PIXELS: usize = 1000;

/// A pure per-pixel operation.
///
/// Blanket-implemented for closures; the session's replay passes implement
/// it directly.
pub trait PixelOp {
    fn apply(&self, px: [u8; 4]) -> [u8; 4];
}

impl<F> PixelOp for F
where
    F: Fn([u8; 4]) -> [u8; 4],
{
    #[inline]
    fn apply(&self, px: [u8; 4]) -> [u8; 4] {
        self(px)
    }
}

/// Observer for incremental progress. Purely observational; implementations
/// must not block the processor.
pub trait ProgressSink {
    /// Called after each processed chunk with the percent done (0..=100).
    fn on_progress(&mut self, percent: f32);

    /// Called exactly once when a run's result is committed. A superseded
    /// run never receives this call.
    fn on_complete(&mut self);
}

/// A sink that ignores all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&mut self, _percent: f32) {}
    fn on_complete(&mut self) {}
}

/// One in-flight chunked walk of a pixel buffer.
///
/// The run owns the buffer for its lifetime; chunks are processed strictly
/// in increasing offset order and a chunk boundary never splits the four
/// channel bytes of a pixel.
#[derive(Debug)]
pub struct ChunkedRun<O> {
    pixels: Vec<u8>,
    op: O,
    chunk_bytes: usize,
    offset: usize,
    generation: u64,
}

impl<O: PixelOp> ChunkedRun<O> {
    /// Start a run over `pixels` with `chunk_pixels` pixels per step.
    ///
    /// A chunk size of zero is treated as one pixel. The generation tag is
    /// carried through for the caller's supersede bookkeeping.
    pub fn new(pixels: Vec<u8>, op: O, chunk_pixels: usize, generation: u64) -> Self {
        debug_assert_eq!(pixels.len() % CHANNELS, 0, "buffer not pixel-aligned");
        Self {
            pixels,
            op,
            chunk_bytes: chunk_pixels.max(1) * CHANNELS,
            offset: 0,
            generation,
        }
    }

    /// Process the next chunk and return the overall percent done.
    ///
    /// Calling `step` on a completed run is a no-op that reports 100.
    pub fn step(&mut self) -> f32 {
        let end = (self.offset + self.chunk_bytes).min(self.pixels.len());
        for px in self.pixels[self.offset..end].chunks_exact_mut(CHANNELS) {
            let out = self.op.apply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
        self.offset = end;
        self.progress()
    }

    /// Percent of bytes processed so far (0..=100). An empty buffer is
    /// complete from the start.
    pub fn progress(&self) -> f32 {
        if self.pixels.is_empty() {
            return 100.0;
        }
        self.offset as f32 / self.pixels.len() as f32 * 100.0
    }

    /// Whether every byte has been processed.
    pub fn is_complete(&self) -> bool {
        self.offset >= self.pixels.len()
    }

    /// Generation tag this run was started under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Consume the run and take the buffer, in whatever state it is in.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// Drive a run to completion, reporting progress after every chunk.
///
/// This is the synchronous driver for hosts without their own scheduler;
/// event-loop hosts call [`ChunkedRun::step`] once per turn instead. The
/// completion signal is deliberately not fired here: committing the buffer
/// (and deciding whether the run is stale) belongs to the caller.
pub fn drive<O: PixelOp, S: ProgressSink + ?Sized>(run: &mut ChunkedRun<O>, sink: &mut S) {
    if run.is_complete() {
        sink.on_progress(100.0);
        return;
    }
    while !run.is_complete() {
        let percent = run.step();
        sink.on_progress(percent);
    }
}
