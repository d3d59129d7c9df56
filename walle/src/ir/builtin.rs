/// Built-in query functions callable from expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    GetActualX,
    GetActualY,
    GetCanvasSize,
    /// GetColorCount(color, x1, y1, x2, y2)
    GetColorCount,
    /// IsBrushColor(color)
    IsBrushColor,
    /// IsBrushSize(size)
    IsBrushSize,
    /// IsCanvasColor(color, vertical, horizontal)
    IsCanvasColor,
}

impl Builtin {
    pub fn all() -> Vec<Self> {
        vec![
            Self::GetActualX,
            Self::GetActualY,
            Self::GetCanvasSize,
            Self::GetColorCount,
            Self::IsBrushColor,
            Self::IsBrushSize,
            Self::IsCanvasColor,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::GetActualX => "GetActualX",
            Self::GetActualY => "GetActualY",
            Self::GetCanvasSize => "GetCanvasSize",
            Self::GetColorCount => "GetColorCount",
            Self::IsBrushColor => "IsBrushColor",
            Self::IsBrushSize => "IsBrushSize",
            Self::IsCanvasColor => "IsCanvasColor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|b| b.name() == name)
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::GetActualX | Self::GetActualY | Self::GetCanvasSize => 0,
            Self::IsBrushColor | Self::IsBrushSize => 1,
            Self::IsCanvasColor => 3,
            Self::GetColorCount => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_back_to_builtins() {
        for builtin in Builtin::all() {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
        assert_eq!(Builtin::from_name("IsCanvasSize"), None);
    }

    #[test]
    fn arities() {
        assert_eq!(Builtin::GetColorCount.arity(), 5);
        assert_eq!(Builtin::IsCanvasColor.arity(), 3);
        assert_eq!(Builtin::IsBrushSize.arity(), 1);
        assert_eq!(Builtin::GetCanvasSize.arity(), 0);
    }
}
