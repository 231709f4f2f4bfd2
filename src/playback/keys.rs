//! Keyboard navigation

/// Keys the controller responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKey {
    /// Toggle play/pause
    Space,
    /// Next point
    Right,
    /// Previous point
    Left,
    /// First point
    Home,
    /// Last point
    End,
    /// Stop and reset
    Escape,
}

impl NavigationKey {
    /// Parse a DOM-style key name (`" "`, `ArrowRight`, `Home`, ...)
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            " " | "Space" | "Spacebar" => Some(NavigationKey::Space),
            "ArrowRight" | "Right" => Some(NavigationKey::Right),
            "ArrowLeft" | "Left" => Some(NavigationKey::Left),
            "Home" => Some(NavigationKey::Home),
            "End" => Some(NavigationKey::End),
            "Escape" | "Esc" => Some(NavigationKey::Escape),
            _ => None,
        }
    }
}

impl TryFrom<crossterm::event::KeyCode> for NavigationKey {
    type Error = ();

    fn try_from(code: crossterm::event::KeyCode) -> Result<Self, Self::Error> {
        use crossterm::event::KeyCode;
        match code {
            KeyCode::Char(' ') => Ok(NavigationKey::Space),
            KeyCode::Right => Ok(NavigationKey::Right),
            KeyCode::Left => Ok(NavigationKey::Left),
            KeyCode::Home => Ok(NavigationKey::Home),
            KeyCode::End => Ok(NavigationKey::End),
            KeyCode::Esc => Ok(NavigationKey::Escape),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    #[test]
    fn test_key_names() {
        assert_eq!(NavigationKey::from_key_name(" "), Some(NavigationKey::Space));
        assert_eq!(NavigationKey::from_key_name("ArrowLeft"), Some(NavigationKey::Left));
        assert_eq!(NavigationKey::from_key_name("Escape"), Some(NavigationKey::Escape));
        assert_eq!(NavigationKey::from_key_name("Tab"), None);
    }

    #[test]
    fn test_terminal_keys() {
        assert_eq!(NavigationKey::try_from(KeyCode::End), Ok(NavigationKey::End));
        assert_eq!(NavigationKey::try_from(KeyCode::Char(' ')), Ok(NavigationKey::Space));
        assert!(NavigationKey::try_from(KeyCode::Char('q')).is_err());
    }
}
