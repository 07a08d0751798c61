//! Detached layout surfaces used during export.
//!
//! A fragment is attached to the host while a backend lays it out and is
//! detached when its guard drops, on success and failure alike.

use mdpress_render_core::HtmlFragment;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct SurfaceHost {
    attached: AtomicUsize,
    total: AtomicUsize,
}

impl SurfaceHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, fragment: HtmlFragment) -> OffscreenSurface<'_> {
        self.attached.fetch_add(1, Ordering::SeqCst);
        self.total.fetch_add(1, Ordering::SeqCst);
        log::debug!("Attached off-screen surface ({} live).", self.attached());
        OffscreenSurface { host: self, fragment }
    }

    /// Surfaces currently attached.
    pub fn attached(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }

    /// Surfaces attached over the host's lifetime.
    pub fn total_attached(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

/// RAII guard over an attached fragment.
#[derive(Debug)]
pub struct OffscreenSurface<'a> {
    host: &'a SurfaceHost,
    fragment: HtmlFragment,
}

impl OffscreenSurface<'_> {
    pub fn fragment(&self) -> &HtmlFragment {
        &self.fragment
    }
}

impl Drop for OffscreenSurface<'_> {
    fn drop(&mut self) {
        self.host.attached.fetch_sub(1, Ordering::SeqCst);
        log::debug!("Detached off-screen surface ({} live).", self.host.attached());
    }
}
