//! Boundary with the debug overlay: a visibility flag, one mount point and
//! one renderer callback. Drawing is the renderer's business.

use std::rc::Rc;

use web_time::Instant;

use crate::{GlobalStore, LogEntry};

pub type OverlayRenderer = Rc<dyn Fn(&OverlaySnapshot)>;

/// What the renderer gets on every render.
#[derive(Clone, Debug)]
pub struct OverlaySnapshot {
    pub visible: bool,
    pub entries: Vec<LogEntry>,
    /// Entries no longer retained by the log.
    pub evicted: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayMount {
    pub created_at: Instant,
}

#[derive(Default)]
pub(crate) struct OverlayState {
    visible: bool,
    mount: Option<OverlayMount>,
    renderer: Option<OverlayRenderer>,
}

impl GlobalStore {
    /// Install the overlay renderer, returning the one it replaces.
    pub fn set_overlay_renderer(
        &self,
        renderer: impl Fn(&OverlaySnapshot) + 'static,
    ) -> Option<OverlayRenderer> {
        self.install_overlay_renderer(Rc::new(renderer))
    }

    /// Like [`set_overlay_renderer`](Self::set_overlay_renderer), keeping the
    /// caller's handle so it can later be removed by identity.
    pub fn install_overlay_renderer(&self, renderer: OverlayRenderer) -> Option<OverlayRenderer> {
        self.inner.overlay.borrow_mut().renderer.replace(renderer)
    }

    pub fn clear_overlay_renderer(&self) -> Option<OverlayRenderer> {
        self.inner.overlay.borrow_mut().renderer.take()
    }

    /// Clears the renderer only if it is still `renderer`.
    pub fn remove_overlay_renderer(&self, renderer: &OverlayRenderer) -> bool {
        let mut overlay = self.inner.overlay.borrow_mut();
        if overlay
            .renderer
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, renderer))
        {
            overlay.renderer = None;
            true
        } else {
            false
        }
    }

    pub fn debug_overlay_visible(&self) -> bool {
        self.inner.overlay.borrow().visible
    }

    /// Created by the first toggle, then reused.
    pub fn overlay_mount(&self) -> Option<OverlayMount> {
        self.inner.overlay.borrow().mount
    }

    /// Flip visibility and render. Returns the new visibility.
    pub fn toggle_debug_overlay(&self) -> bool {
        let visible = !self.debug_overlay_visible();
        self.set_debug_overlay_visible(visible);
        visible
    }

    pub fn set_debug_overlay_visible(&self, visible: bool) {
        {
            let mut overlay = self.inner.overlay.borrow_mut();
            overlay.visible = visible;
            if overlay.mount.is_none() {
                log::debug!("creating debug overlay mount point");
                overlay.mount = Some(OverlayMount {
                    created_at: Instant::now(),
                });
            }
        }
        self.render_overlay();
    }

    pub fn overlay_snapshot(&self) -> OverlaySnapshot {
        let log = self.inner.log.borrow();
        OverlaySnapshot {
            visible: self.debug_overlay_visible(),
            entries: log.snapshot(),
            evicted: log.evicted(),
        }
    }

    /// Re-render after a mutation, only while visible.
    pub(crate) fn refresh_overlay(&self) {
        if self.debug_overlay_visible() {
            self.render_overlay();
        }
    }

    fn render_overlay(&self) {
        let Some(renderer) = self.inner.overlay.borrow().renderer.clone() else {
            return;
        };
        let snapshot = self.overlay_snapshot();
        renderer(&snapshot);
    }
}
