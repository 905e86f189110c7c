//! Deck navigation as a pure state machine. Keys are mapped to actions
//! by a [`KeyMap`]; a [`Navigator`] applies actions and never draws.

use std::fmt;

/// A key press, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Enter,
    Backspace,
    Tab,
    Esc,
    CtrlC,
    /// The terminal changed size. Never bound to an action.
    Resize,
    Other,
}

impl Key {
    /// Parse a key name as written in the config file, e.g. `right`,
    /// `space`, `ctrl-c` or a single character.
    pub fn parse(name: &str) -> Option<Key> {
        let trimmed = name.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(Key::Char(c));
        }
        let key = match trimmed.to_lowercase().replace('_', "-").as_str() {
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            "pageup" | "page-up" | "pgup" => Key::PageUp,
            "pagedown" | "page-down" | "pgdn" => Key::PageDown,
            "home" => Key::Home,
            "end" => Key::End,
            "enter" | "return" => Key::Enter,
            "backspace" => Key::Backspace,
            "tab" => Key::Tab,
            "esc" | "escape" => Key::Esc,
            "space" => Key::Char(' '),
            "ctrl-c" => Key::CtrlC,
            _ => return None,
        };
        Some(key)
    }

    pub fn label(&self) -> String {
        match self {
            Key::Char(' ') => "space".to_string(),
            Key::Char(c) => c.to_string(),
            Key::Left => "←".to_string(),
            Key::Right => "→".to_string(),
            Key::Up => "↑".to_string(),
            Key::Down => "↓".to_string(),
            Key::PageUp => "pgup".to_string(),
            Key::PageDown => "pgdn".to_string(),
            Key::Home => "home".to_string(),
            Key::End => "end".to_string(),
            Key::Enter => "enter".to_string(),
            Key::Backspace => "backspace".to_string(),
            Key::Tab => "tab".to_string(),
            Key::Esc => "esc".to_string(),
            Key::CtrlC => "ctrl-c".to_string(),
            Key::Resize | Key::Other => String::new(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Next,
    Previous,
    Exit,
    Help,
    None,
}

impl Action {
    /// Actions that can be bound to keys.
    pub const BOUND: [Action; 4] = [Action::Next, Action::Previous, Action::Exit, Action::Help];

    /// Config name, as used under `keys:`.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Next => "next",
            Action::Previous => "previous",
            Action::Exit => "exit",
            Action::Help => "help",
            Action::None => "none",
        }
    }

    pub fn from_name(name: &str) -> Option<Action> {
        Action::BOUND
            .into_iter()
            .find(|a| a.name() == name.trim().to_lowercase())
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::Next => "Next slide",
            Action::Previous => "Previous slide",
            Action::Exit => "Quit",
            Action::Help => "Help",
            Action::None => "",
        }
    }
}

/// Key bindings for the four bound actions. `ctrl-c` always exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: Vec<(Action, Vec<Key>)>,
}

impl Default for KeyMap {
    fn default() -> Self {
        use Key::*;
        Self {
            bindings: vec![
                (
                    Action::Next,
                    vec![Right, Down, PageDown, Enter, Char(' '), Char('l'), Char('j'), Char('n')],
                ),
                (
                    Action::Previous,
                    vec![Left, Up, PageUp, Backspace, Char('h'), Char('k'), Char('p')],
                ),
                (Action::Exit, vec![Char('q'), Esc, CtrlC]),
                (Action::Help, vec![Char('?')]),
            ],
        }
    }
}

impl KeyMap {
    pub fn action(&self, key: Key) -> Action {
        if key == Key::CtrlC {
            return Action::Exit;
        }
        self.bindings
            .iter()
            .find(|(_, keys)| keys.contains(&key))
            .map_or(Action::None, |(action, _)| *action)
    }

    pub fn keys(&self, action: Action) -> &[Key] {
        self.bindings
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, keys)| keys.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the keys of one action. Those keys are released from any
    /// other action first so a key never maps to two actions.
    pub fn bind(&mut self, action: Action, keys: Vec<Key>) {
        for (_, bound) in &mut self.bindings {
            bound.retain(|k| !keys.contains(k));
        }
        match self.bindings.iter_mut().find(|(a, _)| *a == action) {
            Some((_, bound)) => *bound = keys,
            None => self.bindings.push((action, keys)),
        }
    }

    /// Parse a list of key names for `action`.
    pub fn parse_keys(names: &[String]) -> Result<Vec<Key>, String> {
        names
            .iter()
            .map(|name| Key::parse(name).ok_or_else(|| format!("unknown key '{name}'")))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Viewing { slide: usize, reveal: usize },
    HelpOverlay { slide: usize, reveal: usize },
    EndBoundary,
    Exited,
}

/// Walks a deck of slides with `totals[i]` progressive bullets each.
#[derive(Debug, Clone)]
pub struct Navigator {
    totals: Vec<usize>,
    state: NavState,
}

impl Navigator {
    pub fn new(totals: Vec<usize>) -> Self {
        Self::starting_at(totals, 0)
    }

    /// Start on slide `index` (0-based, clamped) with nothing revealed.
    pub fn starting_at(totals: Vec<usize>, index: usize) -> Self {
        let state = if totals.is_empty() {
            NavState::EndBoundary
        } else {
            NavState::Viewing {
                slide: index.min(totals.len() - 1),
                reveal: 0,
            }
        };
        Self { totals, state }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn is_exited(&self) -> bool {
        self.state == NavState::Exited
    }

    fn last(&self) -> Option<usize> {
        self.totals.len().checked_sub(1)
    }

    /// Apply one action and return the new state.
    pub fn apply(&mut self, action: Action) -> NavState {
        self.state = match (self.state, action) {
            (NavState::Exited, _) => NavState::Exited,

            (NavState::HelpOverlay { slide, reveal }, _) => NavState::Viewing { slide, reveal },

            (NavState::EndBoundary, Action::Previous) => match self.last() {
                Some(last) => NavState::Viewing {
                    slide: last,
                    reveal: self.totals[last],
                },
                None => NavState::EndBoundary,
            },
            (NavState::EndBoundary, Action::Exit) => NavState::Exited,
            (NavState::EndBoundary, _) => NavState::EndBoundary,

            (NavState::Viewing { slide, reveal }, Action::Next) => {
                if reveal < self.totals[slide] {
                    NavState::Viewing {
                        slide,
                        reveal: reveal + 1,
                    }
                } else if slide + 1 < self.totals.len() {
                    NavState::Viewing {
                        slide: slide + 1,
                        reveal: 0,
                    }
                } else {
                    NavState::EndBoundary
                }
            }
            (NavState::Viewing { slide, reveal }, Action::Previous) => {
                if reveal > 0 {
                    NavState::Viewing {
                        slide,
                        reveal: reveal - 1,
                    }
                } else if slide > 0 {
                    NavState::Viewing {
                        slide: slide - 1,
                        reveal: self.totals[slide - 1],
                    }
                } else {
                    NavState::Viewing { slide, reveal }
                }
            }
            (NavState::Viewing { .. }, Action::Exit) => NavState::Exited,
            (NavState::Viewing { slide, reveal }, Action::Help) => {
                NavState::HelpOverlay { slide, reveal }
            }
            (state @ NavState::Viewing { .. }, Action::None) => state,
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn viewing(slide: usize, reveal: usize) -> NavState {
        NavState::Viewing { slide, reveal }
    }

    #[test]
    fn test_next_reveals_then_advances() {
        let mut nav = Navigator::new(vec![2, 0]);
        assert_eq!(nav.apply(Action::Next), viewing(0, 1));
        assert_eq!(nav.apply(Action::Next), viewing(0, 2));
        assert_eq!(nav.apply(Action::Next), viewing(1, 0));
        assert_eq!(nav.apply(Action::Next), NavState::EndBoundary);
    }

    #[test]
    fn test_previous_reenters_fully_revealed() {
        let mut nav = Navigator::starting_at(vec![3, 1], 1);
        assert_eq!(nav.apply(Action::Previous), viewing(0, 3));
        assert_eq!(nav.apply(Action::Previous), viewing(0, 2));
    }

    #[test]
    fn test_previous_at_start_is_noop() {
        let mut nav = Navigator::new(vec![1, 1]);
        assert_eq!(nav.apply(Action::Previous), viewing(0, 0));
    }

    #[test]
    fn test_end_boundary_round_trip() {
        let mut nav = Navigator::starting_at(vec![0, 2], 1);
        nav.apply(Action::Next);
        nav.apply(Action::Next);
        assert_eq!(nav.apply(Action::Next), NavState::EndBoundary);
        assert_eq!(nav.apply(Action::Help), NavState::EndBoundary);
        assert_eq!(nav.apply(Action::Next), NavState::EndBoundary);
        assert_eq!(nav.apply(Action::Previous), viewing(1, 2));
    }

    #[test]
    fn test_help_returns_to_same_position() {
        let mut nav = Navigator::new(vec![3]);
        nav.apply(Action::Next);
        assert_eq!(
            nav.apply(Action::Help),
            NavState::HelpOverlay {
                slide: 0,
                reveal: 1
            }
        );
        assert_eq!(nav.apply(Action::None), viewing(0, 1));
    }

    #[test]
    fn test_exit_is_terminal() {
        let mut nav = Navigator::new(vec![0]);
        assert_eq!(nav.apply(Action::Exit), NavState::Exited);
        assert!(nav.is_exited());
        assert_eq!(nav.apply(Action::Previous), NavState::Exited);
        assert_eq!(nav.apply(Action::Help), NavState::Exited);
    }

    #[test]
    fn test_exit_from_end_boundary() {
        let mut nav = Navigator::new(vec![0]);
        nav.apply(Action::Next);
        assert_eq!(nav.apply(Action::Exit), NavState::Exited);
    }

    #[test]
    fn test_start_slide_is_clamped() {
        let nav = Navigator::starting_at(vec![0, 0], 9);
        assert_eq!(*nav.state(), viewing(1, 0));
    }

    #[test]
    fn test_default_keymap() {
        let keys = KeyMap::default();
        assert_eq!(keys.action(Key::Right), Action::Next);
        assert_eq!(keys.action(Key::Char(' ')), Action::Next);
        assert_eq!(keys.action(Key::Backspace), Action::Previous);
        assert_eq!(keys.action(Key::Char('q')), Action::Exit);
        assert_eq!(keys.action(Key::Char('?')), Action::Help);
        assert_eq!(keys.action(Key::Char('x')), Action::None);
        assert_eq!(keys.action(Key::Resize), Action::None);
    }

    #[test]
    fn test_rebinding_moves_keys() {
        let mut keys = KeyMap::default();
        keys.bind(Action::Exit, vec![Key::Char('x')]);
        keys.bind(Action::Help, vec![Key::Char('h')]);
        assert_eq!(keys.action(Key::Char('q')), Action::None);
        assert_eq!(keys.action(Key::Char('x')), Action::Exit);
        assert_eq!(keys.action(Key::Char('h')), Action::Help);
        assert_eq!(keys.action(Key::CtrlC), Action::Exit);
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!(Key::parse("space"), Some(Key::Char(' ')));
        assert_eq!(Key::parse("Page_Down"), Some(Key::PageDown));
        assert_eq!(Key::parse("?"), Some(Key::Char('?')));
        assert_eq!(Key::parse("ctrl-c"), Some(Key::CtrlC));
        assert_eq!(Key::parse("hyper"), None);
        let err = KeyMap::parse_keys(&["left".into(), "bogus".into()]).unwrap_err();
        assert!(err.contains("bogus"));
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![Just(Action::Next), Just(Action::Previous)]
    }

    proptest! {
        #[test]
        fn reveal_stays_within_bounds(
            totals in prop::collection::vec(0usize..5, 1..6),
            actions in prop::collection::vec(action(), 0..60),
        ) {
            let mut nav = Navigator::new(totals.clone());
            for a in actions {
                if let NavState::Viewing { slide, reveal } = nav.apply(a) {
                    prop_assert!(slide < totals.len());
                    prop_assert!(reveal <= totals[slide]);
                }
            }
        }

        #[test]
        fn next_then_previous_restores_position(
            totals in prop::collection::vec(0usize..4, 2..6),
            steps in 0usize..20,
        ) {
            let mut nav = Navigator::new(totals);
            for _ in 0..steps {
                nav.apply(Action::Next);
            }
            let before = *nav.state();
            if let NavState::Viewing { .. } = before {
                nav.apply(Action::Next);
                nav.apply(Action::Previous);
                prop_assert_eq!(*nav.state(), before);
            }
        }
    }
}
