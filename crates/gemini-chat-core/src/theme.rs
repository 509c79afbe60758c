#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        *self == Theme::Dark
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips_between_light_and_dark() {
        let theme = Theme::default();
        assert_eq!(theme, Theme::Light);
        assert_eq!(theme.toggle(), Theme::Dark);
        assert_eq!(theme.toggle().toggle(), Theme::Light);
    }

    #[test]
    fn test_from_dark_mode() {
        assert!(Theme::from_dark_mode(true).is_dark());
        assert!(!Theme::from_dark_mode(false).is_dark());
    }
}
