use std::collections::HashMap;

use super::canvas::{BLANK, ColorCode};

/// Interned color names. Each distinct name gets its own code, starting
/// right after `BLANK`, so two names can never share a code.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    codes: HashMap<String, ColorCode>,
    names: Vec<String>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Code for `name`, assigning the next free one on first use.
    pub fn intern(&mut self, name: &str) -> ColorCode {
        if let Some(&code) = self.codes.get(name) {
            return code;
        }
        self.names.push(name.to_string());
        let code = BLANK + self.names.len() as ColorCode;
        self.codes.insert(name.to_string(), code);
        code
    }

    /// Lookup without interning.
    pub fn code(&self, name: &str) -> Option<ColorCode> {
        self.codes.get(name).copied()
    }

    /// Name behind a painted code. `None` for `BLANK`.
    pub fn name(&self, code: ColorCode) -> Option<&str> {
        let index = code.checked_sub(BLANK + 1)? as usize;
        self.names.get(index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable_and_never_blank() {
        let mut palette = Palette::new();
        let red = palette.intern("Red");
        let blue = palette.intern("Blue");
        assert_ne!(red, BLANK);
        assert_ne!(red, blue);
        assert_eq!(palette.intern("Red"), red);
        assert_eq!(palette.name(blue), Some("Blue"));
        assert_eq!(palette.name(BLANK), None);
    }

    #[test]
    fn lookup_does_not_intern() {
        let mut palette = Palette::new();
        palette.intern("Red");
        assert_eq!(palette.code("Green"), None);
        assert_eq!(palette.name(BLANK + 2), None);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut palette = Palette::new();
        assert_ne!(palette.intern("red"), palette.intern("Red"));
    }
}
