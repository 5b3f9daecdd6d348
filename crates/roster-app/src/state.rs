// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::FilterField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Records,
    Monitored,
    Charts,
}

impl ViewKind {
    pub const ALL: [Self; 3] = [Self::Records, Self::Monitored, Self::Charts];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Records => "users",
            Self::Monitored => "monitored",
            Self::Charts => "charts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browse,
    Filter(FilterField),
    Form,
    Confirm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_view: ViewKind,
    pub help_visible: bool,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Browse,
            active_view: ViewKind::Records,
            help_visible: false,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextView,
    PrevView,
    EnterFilter,
    CycleFilterField,
    OpenForm,
    OpenConfirm,
    ExitToBrowse,
    ToggleHelp,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ViewChanged(ViewKind),
    HelpToggled(bool),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextView => self.rotate_view(1),
            AppCommand::PrevView => self.rotate_view(-1),
            AppCommand::EnterFilter => {
                let field = match self.mode {
                    AppMode::Filter(field) => field,
                    _ => FilterField::Name,
                };
                self.mode = AppMode::Filter(field);
                vec![
                    AppEvent::ModeChanged(self.mode),
                    self.set_status(&format!("filter: {}", field.as_str())),
                ]
            }
            AppCommand::CycleFilterField => {
                let AppMode::Filter(field) = self.mode else {
                    return Vec::new();
                };
                let next = field.next();
                self.mode = AppMode::Filter(next);
                vec![
                    AppEvent::ModeChanged(self.mode),
                    self.set_status(&format!("filter: {}", next.as_str())),
                ]
            }
            AppCommand::OpenForm => {
                self.mode = AppMode::Form;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::OpenConfirm => {
                self.mode = AppMode::Confirm;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToBrowse => {
                if self.mode == AppMode::Browse {
                    return Vec::new();
                }
                self.mode = AppMode::Browse;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ToggleHelp => {
                self.help_visible = !self.help_visible;
                vec![AppEvent::HelpToggled(self.help_visible)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<AppEvent> {
        let views = ViewKind::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.active_view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_view = views[next];
        vec![AppEvent::ViewChanged(self.active_view)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState, ViewKind};
    use crate::FilterField;

    #[test]
    fn view_rotation_wraps() {
        let mut state = AppState {
            active_view: ViewKind::Charts,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::NextView);
        assert_eq!(state.active_view, ViewKind::Records);
        assert_eq!(events, vec![AppEvent::ViewChanged(ViewKind::Records)]);

        state.dispatch(AppCommand::PrevView);
        assert_eq!(state.active_view, ViewKind::Charts);
    }

    #[test]
    fn filter_mode_cycles_through_fields() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::EnterFilter);
        assert_eq!(state.mode, AppMode::Filter(FilterField::Name));
        assert_eq!(
            events,
            vec![
                AppEvent::ModeChanged(AppMode::Filter(FilterField::Name)),
                AppEvent::StatusUpdated("filter: name".to_owned()),
            ],
        );

        state.dispatch(AppCommand::CycleFilterField);
        state.dispatch(AppCommand::CycleFilterField);
        assert_eq!(state.mode, AppMode::Filter(FilterField::Type));
        assert_eq!(state.status_line.as_deref(), Some("filter: type"));
    }

    #[test]
    fn cycling_outside_filter_mode_is_ignored() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::CycleFilterField).is_empty());
        assert_eq!(state.mode, AppMode::Browse);
    }

    #[test]
    fn overlays_return_to_browse() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::OpenForm);
        assert_eq!(state.mode, AppMode::Form);

        state.dispatch(AppCommand::ExitToBrowse);
        assert_eq!(state.mode, AppMode::Browse);
        assert!(state.dispatch(AppCommand::ExitToBrowse).is_empty());

        state.dispatch(AppCommand::OpenConfirm);
        assert_eq!(state.mode, AppMode::Confirm);
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::SetStatus("no row selected".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("no row selected"));
        assert_eq!(
            state.dispatch(AppCommand::ClearStatus),
            vec![AppEvent::StatusCleared]
        );
        assert!(state.status_line.is_none());
    }

    #[test]
    fn help_toggles() {
        let mut state = AppState::default();
        assert_eq!(
            state.dispatch(AppCommand::ToggleHelp),
            vec![AppEvent::HelpToggled(true)]
        );
        state.dispatch(AppCommand::ToggleHelp);
        assert!(!state.help_visible);
    }
}
