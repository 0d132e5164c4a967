//! Estado de navegación
//!
//! Qué ruta y qué página muestra el cliente. Las transiciones son eventos
//! explícitos; los observadores reciben cada nuevo estado por un canal `watch`.

use tokio::sync::watch;
use tracing::debug;

pub const DEFAULT_ROUTE: &str = "routeAll";
pub const DEFAULT_PAGE: &str = "way";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current_route: String,
    pub current_page: String,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_route: DEFAULT_ROUTE.to_string(),
            current_page: DEFAULT_PAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    SetRoute(String),
    SetPage(String),
}

impl NavigationState {
    /// Estado resultante de aplicar un evento
    pub fn apply(&self, event: NavigationEvent) -> Self {
        let mut next = self.clone();
        match event {
            NavigationEvent::SetRoute(route) => next.current_route = route,
            NavigationEvent::SetPage(page) => next.current_page = page,
        }
        next
    }
}

/// Contenedor del estado de navegación de una sesión
pub struct NavigationStore {
    sender: watch::Sender<NavigationState>,
}

impl Default for NavigationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationStore {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(NavigationState::default());
        Self { sender }
    }

    pub fn state(&self) -> NavigationState {
        self.sender.borrow().clone()
    }

    /// Aplicar un evento y devolver el nuevo estado
    pub fn dispatch(&self, event: NavigationEvent) -> NavigationState {
        debug!("🧭 Navegación: {:?}", event);
        let mut next = NavigationState::default();
        self.sender.send_modify(|state| {
            *state = state.apply(event);
            next = state.clone();
        });
        next
    }

    pub fn set_route(&self, route: impl Into<String>) -> NavigationState {
        self.dispatch(NavigationEvent::SetRoute(route.into()))
    }

    pub fn set_page(&self, page: impl Into<String>) -> NavigationState {
        self.dispatch(NavigationEvent::SetPage(page.into()))
    }

    pub fn subscribe(&self) -> watch::Receiver<NavigationState> {
        self.sender.subscribe()
    }
}
