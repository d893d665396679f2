//! Screen navigation state machine.
//!
//! # Responsibility
//! - Model the app flow as a closed set of screens and events.
//! - Own the transition table so the UI never switches on free-form strings.
//!
//! # Invariants
//! - A rejected event leaves the current screen unchanged.
//! - Every screen reachable from `Home` returns to `Home` on `Back`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Splash,
    Welcome,
    Login,
    AvatarCustomization,
    Home,
    Map,
    DailyTasks,
    MyBusiness,
    Leaderboard,
    Analytics,
    Progress,
    Settings,
}

/// Destinations reachable from the home hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Map,
    DailyTasks,
    MyBusiness,
    Leaderboard,
    Analytics,
    Progress,
    Settings,
}

impl From<Destination> for Screen {
    fn from(value: Destination) -> Self {
        match value {
            Destination::Map => Screen::Map,
            Destination::DailyTasks => Screen::DailyTasks,
            Destination::MyBusiness => Screen::MyBusiness,
            Destination::Leaderboard => Screen::Leaderboard,
            Destination::Analytics => Screen::Analytics,
            Destination::Progress => Screen::Progress,
            Destination::Settings => Screen::Settings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "destination")]
pub enum NavEvent {
    SplashFinished,
    ChooseRegister,
    ChooseLogin,
    GuestLogin,
    LoggedIn,
    AvatarSaved,
    Open(Destination),
    Back,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    InvalidTransition { from: Screen, event: NavEvent },
}

impl Display for NavigationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, event } => {
                write!(f, "no transition from {from:?} on {event:?}")
            }
        }
    }
}

impl Error for NavigationError {}

/// Pure transition table.
pub fn next_screen(from: Screen, event: NavEvent) -> Option<Screen> {
    use NavEvent as E;
    use Screen as S;

    match (from, event) {
        (S::Splash, E::SplashFinished) => Some(S::Welcome),

        (S::Welcome, E::ChooseRegister) => Some(S::AvatarCustomization),
        (S::Welcome, E::ChooseLogin) => Some(S::Login),
        (S::Welcome, E::GuestLogin) => Some(S::Home),

        (S::Login, E::LoggedIn) => Some(S::Home),
        (S::Login, E::ChooseRegister) => Some(S::AvatarCustomization),
        (S::Login, E::Back) => Some(S::Welcome),

        (S::AvatarCustomization, E::AvatarSaved) => Some(S::Home),
        (S::AvatarCustomization, E::Back) => Some(S::Welcome),

        (S::Home, E::Open(destination)) => Some(destination.into()),
        (S::Home, E::Logout) => Some(S::Welcome),

        (S::Settings, E::Logout) => Some(S::Welcome),
        (
            S::Map
            | S::DailyTasks
            | S::MyBusiness
            | S::Leaderboard
            | S::Analytics
            | S::Progress
            | S::Settings,
            E::Back,
        ) => Some(S::Home),

        _ => None,
    }
}

/// Stateful wrapper over `next_screen`.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Screen,
}

impl Navigator {
    /// Starts at the splash screen.
    pub fn new() -> Self {
        Self {
            current: Screen::Splash,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    /// Applies one event.
    ///
    /// # Errors
    /// - `NavigationError::InvalidTransition` when the table has no entry;
    ///   the current screen is kept.
    pub fn dispatch(&mut self, event: NavEvent) -> Result<Screen, NavigationError> {
        let next = next_screen(self.current, event).ok_or(NavigationError::InvalidTransition {
            from: self.current,
            event,
        })?;
        self.current = next;
        Ok(next)
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}
