//! Account menu interaction state.
//!
//! The menu is a two-state machine (`Closed`/`Open`). Dismissing it with a
//! pointer-down outside its bounding region goes through the exact same
//! toggle path as an explicit request, so the owning shell observes one
//! consistent stream of state changes. The outside-pointer listener is a
//! scoped acquisition: it is registered while the menu is mounted and
//! released exactly once when the binding is dropped.

use std::sync::{Arc, Mutex, Weak};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

/// Bounding region of the rendered menu, in the host surface's coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

type StateHandler = Box<dyn FnMut(MenuState) + Send>;

pub struct AccountMenu {
    state: MenuState,
    region: Region,
    on_change: Option<StateHandler>,
}

impl AccountMenu {
    pub fn new(region: Region) -> Self {
        Self {
            state: MenuState::Closed,
            region,
            on_change: None,
        }
    }

    /// Install the state-change handler shared by every transition path.
    pub fn with_on_change(mut self, handler: impl FnMut(MenuState) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(handler));
        self
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == MenuState::Open
    }

    /// Update the bounding region after the menu re-renders.
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// External toggle request: flip the state and notify the handler.
    pub fn toggle(&mut self) {
        self.state = match self.state {
            MenuState::Closed => MenuState::Open,
            MenuState::Open => MenuState::Closed,
        };
        if let Some(handler) = self.on_change.as_mut() {
            handler(self.state);
        }
    }

    /// Close if open, through the same path as an explicit toggle.
    pub fn close(&mut self) {
        if self.state == MenuState::Open {
            self.toggle();
        }
    }

    /// A pointer-down outside the region while open dismisses the menu.
    /// Pointer-downs inside the region, or while closed, are ignored.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) {
        if self.state == MenuState::Open && !self.region.contains(x, y) {
            self.toggle();
        }
    }
}

type PointerHandler = Box<dyn FnMut(f64, f64) + Send>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, PointerHandler)>,
}

/// Pointer-down event source for the host surface. Listeners stay active
/// until their subscription guard is dropped.
#[derive(Clone, Default)]
pub struct PointerEvents {
    inner: Arc<Mutex<Registry>>,
}

impl PointerEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pointer-down listener and hand back its guard.
    pub fn subscribe(&self, handler: impl FnMut(f64, f64) + Send + 'static) -> PointerSubscription {
        let Ok(mut registry) = self.inner.lock() else {
            return PointerSubscription {
                id: 0,
                registry: Weak::new(),
            };
        };
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, Box::new(handler)));
        PointerSubscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver a pointer-down to every live listener.
    pub fn dispatch_pointer_down(&self, x: f64, y: f64) {
        let Ok(mut registry) = self.inner.lock() else {
            return;
        };
        for (_, handler) in registry.listeners.iter_mut() {
            handler(x, y);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().map(|r| r.listeners.len()).unwrap_or(0)
    }
}

/// Guard for a registered listener; dropping it deregisters exactly once.
pub struct PointerSubscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.registry.upgrade() {
            if let Ok(mut registry) = inner.lock() {
                registry.listeners.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

/// A mounted menu wired to a pointer-event source. The outside-pointer
/// subscription lives exactly as long as the binding.
pub struct MenuBinding {
    menu: Arc<Mutex<AccountMenu>>,
    _subscription: PointerSubscription,
}

impl MenuBinding {
    pub fn mount(menu: AccountMenu, events: &PointerEvents) -> Self {
        let menu = Arc::new(Mutex::new(menu));
        let weak = Arc::downgrade(&menu);
        let subscription = events.subscribe(move |x, y| {
            if let Some(menu) = weak.upgrade() {
                if let Ok(mut menu) = menu.lock() {
                    menu.handle_pointer_down(x, y);
                }
            }
        });
        Self {
            menu,
            _subscription: subscription,
        }
    }

    pub fn menu(&self) -> Arc<Mutex<AccountMenu>> {
        self.menu.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording_menu() -> (AccountMenu, Arc<Mutex<Vec<MenuState>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let menu = AccountMenu::new(Region::new(100.0, 100.0, 200.0, 300.0))
            .with_on_change(move |state| sink.lock().unwrap().push(state));
        (menu, seen)
    }

    #[test]
    fn toggle_flips_between_states() {
        let (mut menu, _) = recording_menu();
        assert_eq!(menu.state(), MenuState::Closed);
        menu.toggle();
        assert_eq!(menu.state(), MenuState::Open);
        menu.toggle();
        assert_eq!(menu.state(), MenuState::Closed);
    }

    #[test]
    fn outside_pointer_down_closes_through_the_same_handler() {
        let (mut menu, seen) = recording_menu();
        menu.toggle();
        menu.handle_pointer_down(10.0, 10.0);
        assert_eq!(menu.state(), MenuState::Closed);
        // Both the explicit toggle and the outside dismissal reported
        // through the one handler.
        assert_eq!(
            *seen.lock().unwrap(),
            vec![MenuState::Open, MenuState::Closed]
        );
    }

    #[test]
    fn pointer_down_inside_the_region_keeps_the_menu_open() {
        let (mut menu, _) = recording_menu();
        menu.toggle();
        menu.handle_pointer_down(150.0, 250.0);
        assert_eq!(menu.state(), MenuState::Open);
    }

    #[test]
    fn pointer_down_while_closed_is_ignored() {
        let (mut menu, seen) = recording_menu();
        menu.handle_pointer_down(10.0, 10.0);
        assert_eq!(menu.state(), MenuState::Closed);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn mounted_menu_is_dismissed_by_dispatched_events() {
        let events = PointerEvents::new();
        let (menu, _) = recording_menu();
        let binding = MenuBinding::mount(menu, &events);
        binding.menu().lock().unwrap().toggle();

        events.dispatch_pointer_down(5.0, 5.0);
        assert_eq!(binding.menu().lock().unwrap().state(), MenuState::Closed);
    }

    #[test]
    fn unmounting_releases_the_subscription() {
        let events = PointerEvents::new();
        let (menu, _) = recording_menu();
        let binding = MenuBinding::mount(menu, &events);
        assert_eq!(events.listener_count(), 1);

        drop(binding);
        assert_eq!(events.listener_count(), 0);
        // Dispatching afterwards must be a no-op, not a stale callback.
        events.dispatch_pointer_down(5.0, 5.0);
    }
}
