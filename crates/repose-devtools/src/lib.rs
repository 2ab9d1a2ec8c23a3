use std::cell::RefCell;
use std::rc::{Rc, Weak};

use repose_state::{GlobalStore, OverlayRenderer, OverlaySnapshot};

pub const DEFAULT_MAX_LINES: usize = 20;

/// Text HUD for the state change log.
pub struct Hud {
    pub visible: bool,
    pub max_lines: usize,
    render_count: u64,
    lines: Vec<String>,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Hud {
    pub fn new() -> Self {
        Self {
            visible: false,
            max_lines: DEFAULT_MAX_LINES,
            render_count: 0,
            lines: Vec::new(),
        }
    }

    pub fn render(&mut self, snapshot: &OverlaySnapshot) {
        self.render_count += 1;
        self.visible = snapshot.visible;
        if !snapshot.visible {
            self.lines.clear();
            return;
        }

        let skip = snapshot.entries.len().saturating_sub(self.max_lines);
        let mut lines = Vec::with_capacity(self.max_lines + 1);
        let hidden = snapshot.evicted + skip as u64;
        if hidden > 0 {
            lines.push(format!("... {hidden} earlier"));
        }
        lines.extend(
            snapshot
                .entries
                .iter()
                .skip(skip)
                .map(|e| e.record().to_string()),
        );
        self.lines = lines;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// One line, `|`-separated, for a status bar.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("renders: {}", self.render_count)];
        parts.extend(self.lines.iter().cloned());
        parts.join("  |  ")
    }
}

/// Installs a [`Hud`] as the store's overlay renderer.
pub struct Inspector {
    pub hud: Rc<RefCell<Hud>>,
    store: GlobalStore,
    renderer: OverlayRenderer,
}

impl Inspector {
    pub fn attach(store: &GlobalStore) -> Self {
        Self::attach_with(store, Hud::new())
    }

    pub fn attach_with(store: &GlobalStore, hud: Hud) -> Self {
        let hud = Rc::new(RefCell::new(hud));
        let weak: Weak<RefCell<Hud>> = Rc::downgrade(&hud);
        let renderer: OverlayRenderer = Rc::new(move |snapshot: &OverlaySnapshot| {
            if let Some(hud) = weak.upgrade() {
                hud.borrow_mut().render(snapshot);
            }
        });
        if store.install_overlay_renderer(renderer.clone()).is_some() {
            log::debug!("replaced an existing overlay renderer");
        }
        Self {
            hud,
            store: store.clone(),
            renderer,
        }
    }

    pub fn toggle(&self) -> bool {
        self.store.toggle_debug_overlay()
    }

    pub fn lines(&self) -> Vec<String> {
        self.hud.borrow().lines().to_vec()
    }

    pub fn is_visible(&self) -> bool {
        self.hud.borrow().visible
    }
}

impl Drop for Inspector {
    fn drop(&mut self) {
        // A later inspector may have taken over; leave its renderer alone.
        self.store.remove_overlay_renderer(&self.renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repose_state::Origin;

    fn store() -> GlobalStore {
        let store = GlobalStore::new();
        store.initialize("counter", 0i32);
        store
    }

    #[test]
    fn test_hidden_until_toggled() {
        let store = store();
        let inspector = Inspector::attach(&store);
        store.set("counter", 1).unwrap();
        assert!(inspector.lines().is_empty());
        assert_eq!(inspector.hud.borrow().render_count(), 0);

        assert!(inspector.toggle());
        assert!(inspector.is_visible());
        assert_eq!(inspector.lines().len(), 1);
    }

    #[test]
    fn test_lines_follow_mutations_while_visible() {
        let store = store();
        let inspector = Inspector::attach(&store);
        inspector.toggle();
        store
            .set_with_origin("counter", 1, Origin::label("button"))
            .unwrap();
        store
            .define_derived("double", |s| Ok(s.get::<i32>("counter")? * 2), ["counter"])
            .unwrap();
        store.set_with_origin("counter", 2, Origin::label("button")).unwrap();

        insta::assert_snapshot!(
            inspector.lines().join("\n"),
            @r"
        #0 counter: 0 -> 1 (button)
        #1 counter: 1 -> 2 (button)
        #2 double: 2 -> 4 (derived state update)
        "
        );
    }

    #[test]
    fn test_hiding_clears_lines() {
        let store = store();
        let inspector = Inspector::attach(&store);
        inspector.toggle();
        store.set("counter", 1).unwrap();
        assert!(!inspector.toggle());
        assert!(inspector.lines().is_empty());
        assert_eq!(inspector.hud.borrow().render_count(), 3);
    }

    #[test]
    fn test_max_lines_reports_hidden_entries() {
        let store = store();
        let hud = Hud {
            max_lines: 2,
            ..Hud::new()
        };
        let inspector = Inspector::attach_with(&store, hud);
        for i in 1..=4 {
            store.set_with_origin("counter", i, Origin::label("loop")).unwrap();
        }
        inspector.toggle();
        assert_eq!(
            inspector.lines(),
            vec![
                "... 2 earlier".to_string(),
                "#2 counter: 2 -> 3 (loop)".to_string(),
                "#3 counter: 3 -> 4 (loop)".to_string(),
            ]
        );
        assert!(inspector.hud.borrow().summary().starts_with("renders: 1  |  ... 2 earlier"));
    }

    #[test]
    fn test_drop_detaches_renderer() {
        let store = store();
        {
            let _inspector = Inspector::attach(&store);
        }
        assert!(store.clear_overlay_renderer().is_none());
    }

    #[test]
    fn test_dropping_older_inspector_keeps_newer_renderer() {
        let store = store();
        let older = Inspector::attach(&store);
        let newer = Inspector::attach(&store);
        drop(older);

        newer.toggle();
        store.set_with_origin("counter", 1, Origin::label("button")).unwrap();
        assert_eq!(newer.lines(), vec!["#0 counter: 0 -> 1 (button)".to_string()]);
        assert_eq!(newer.hud.borrow().render_count(), 2);
    }
}
