//! Progressive two-phase image reveal for one display slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::application::ImagePipeline;
use crate::domain::entities::ImageVariant;

/// Lifecycle of one presented request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Preview variant requested.
    PreviewPending,
    /// Preview displayed; target variant about to be requested.
    PreviewReady,
    /// Target variant requested.
    FullPending,
    /// Target variant displayed.
    FullReady,
    /// The bound source changed or the slot was detached; terminal.
    Superseded,
}

#[derive(Debug, Default)]
struct Slot {
    phase: Phase,
    displayed: Option<String>,
    preview: Option<String>,
}

/// Presents images for one display slot with a blur-placeholder first pass.
///
/// Each `present` call owns a generation; rebinding bumps the counter, and
/// every commit re-checks it, so a resolution arriving after its request was
/// superseded is discarded instead of overwriting the newer image.
/// Cancellation is cooperative only: in-flight pipeline work is never
/// aborted, its result is just ignored, and the pipeline's cache keeps the
/// work from repeating later.
pub struct ProgressiveImage {
    pipeline: Arc<ImagePipeline>,
    generation: AtomicU64,
    slot: RwLock<Slot>,
}

impl ProgressiveImage {
    /// Creates an idle presenter over the given pipeline.
    #[must_use]
    pub fn new(pipeline: Arc<ImagePipeline>) -> Self {
        Self {
            pipeline,
            generation: AtomicU64::new(0),
            slot: RwLock::new(Slot::default()),
        }
    }

    /// Returns the current phase.
    pub async fn phase(&self) -> Phase {
        self.slot.read().await.phase
    }

    /// Returns the currently displayed image reference, if any.
    pub async fn displayed(&self) -> Option<String> {
        self.slot.read().await.displayed.clone()
    }

    /// Returns the blur placeholder for the current request, if resolved.
    pub async fn preview(&self) -> Option<String> {
        self.slot.read().await.preview.clone()
    }

    /// Binds the slot to `source` and reveals it progressively: preview
    /// first, then the target variant once preloaded.
    ///
    /// Calling again (with any source) supersedes the in-flight request; the
    /// superseded request's resolutions never touch the slot.
    pub async fn present(&self, source: &str, target: ImageVariant) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(source, %target, generation, "Presenting image slot");

        if !self
            .commit(generation, |slot| {
                slot.phase = Phase::PreviewPending;
                slot.displayed = None;
                slot.preview = None;
            })
            .await
        {
            return;
        }

        let preview = self
            .pipeline
            .get_optimized_image(source, ImageVariant::Preview)
            .await;
        let committed = self
            .commit(generation, |slot| {
                slot.preview = Some(preview.src.clone());
                slot.displayed = Some(preview.src.clone());
                slot.phase = Phase::PreviewReady;
            })
            .await;
        if !committed {
            debug!(source, generation, "Preview discarded, request superseded");
            return;
        }

        if !self
            .commit(generation, |slot| slot.phase = Phase::FullPending)
            .await
        {
            return;
        }

        let full = self.pipeline.get_optimized_image(source, target).await;
        // Warm the decode off-screen so the swap does not stutter; a payload
        // that will not decode is still committed (it may be the passthrough
        // original, which the display layer can load itself).
        preload(&full.src).await;

        let committed = self
            .commit(generation, |slot| {
                slot.displayed = Some(full.src.clone());
                slot.phase = Phase::FullReady;
            })
            .await;
        if committed {
            trace!(source, generation, "Image slot fully revealed");
        } else {
            debug!(source, generation, "Target variant discarded, request superseded");
        }
    }

    /// Detaches the slot: any in-flight request becomes stale and the phase
    /// turns terminal.
    pub async fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut slot = self.slot.write().await;
        slot.phase = Phase::Superseded;
    }

    /// Applies `apply` to the slot iff `generation` is still current. The
    /// counter is re-checked under the write lock so a commit and a
    /// supersession cannot interleave.
    async fn commit<F: FnOnce(&mut Slot)>(&self, generation: u64, apply: F) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        let mut slot = self.slot.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        apply(&mut slot);
        true
    }
}

impl std::fmt::Debug for ProgressiveImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressiveImage")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Decodes an inline payload on a blocking worker. Non-inline references and
/// undecodable payloads are left to the display layer.
async fn preload(src: &str) -> bool {
    let Some(encoded) = src.split_once("base64,").map(|(_, data)| data.to_string()) else {
        return false;
    };
    let Ok(bytes) = BASE64.decode(encoded) else {
        return false;
    };
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).is_ok())
        .await
        .unwrap_or(false)
}
