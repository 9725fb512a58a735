use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The editable text the user types into
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypedText {
    text: String,
}

impl TypedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) -> Option<char> {
        self.text.pop()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Applies an editing key and reports the visible character it produced, if any
    pub fn apply_key(&mut self, key: &KeyEvent) -> Option<char> {
        match visible_char(key) {
            Some(c) => {
                self.push(c);
                Some(c)
            }
            None => {
                if key.code == KeyCode::Backspace {
                    self.backspace();
                }
                None
            }
        }
    }
}

impl From<&str> for TypedText {
    fn from(s: &str) -> Self {
        Self {
            text: s.to_string(),
        }
    }
}

/// The character a key press would insert, or `None` for modifiers,
/// navigation keys and control chords
pub fn visible_char(key: &KeyEvent) -> Option<char> {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return None;
    }

    match key.code {
        KeyCode::Char(c) if !c.is_control() => Some(c),
        _ => None,
    }
}
