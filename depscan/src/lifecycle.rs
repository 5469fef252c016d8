use tracing::{debug, info};

/// An open client session on the request channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    Starting,
    Open(Window),
    Closed,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Startup finished; open the first window
    Ready,
    /// Reopen a window if none is open.
    ///
    /// The stdio session never raises this: stdin cannot be reopened after
    /// EOF. Hosts that can start a new session drive it themselves.
    Activate,
    WindowClosed,
    AllWindowsClosed,
}

/// Owns the application state; the only place windows are opened or closed
#[derive(Debug)]
pub struct Controller {
    state: AppState,
    next_window: u64,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            state: AppState::Starting,
            next_window: 1,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn window(&self) -> Option<&Window> {
        match &self.state {
            AppState::Open(window) => Some(window),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state != AppState::Quit
    }

    pub fn handle(&mut self, event: AppEvent) -> &AppState {
        let current = std::mem::replace(&mut self.state, AppState::Quit);

        self.state = match (current, event) {
            (AppState::Starting, AppEvent::Ready) | (AppState::Closed, AppEvent::Activate) => {
                AppState::Open(self.open_window())
            }
            (AppState::Open(window), AppEvent::WindowClosed) => {
                info!("Window {} closed", window.id);
                AppState::Closed
            }
            (AppState::Closed, AppEvent::AllWindowsClosed) => AppState::Quit,
            (state, event) => {
                debug!("Ignoring {event:?} while {state:?}");
                state
            }
        };

        &self.state
    }

    fn open_window(&mut self) -> Window {
        let window = Window {
            id: self.next_window,
        };
        self.next_window += 1;
        info!("Window {} opened", window.id);
        window
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}
