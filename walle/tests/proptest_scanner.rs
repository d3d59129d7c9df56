//! Property tests for the front end and a few drawing invariants.
//!
//! 1. The scanner terminates on any input with exactly one trailing EOF
//! 2. The parser and checker never panic on token soup
//! 3. Straight lines inside the canvas paint exactly `distance + 1` cells

use proptest::prelude::*;
use walle::check;
use walle::parser::lexer::{TokenKind, tokenize};
use walle::parser::parser::parse_tokens;
use walle::runtime::Interpreter;

fn arbitrary_source() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[\x00-\x7F]{0,300}").unwrap()
}

/// Fragments that look like WallE code.
fn walle_token() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Spawn".to_string()),
        Just("Color".to_string()),
        Just("Size".to_string()),
        Just("DrawLine".to_string()),
        Just("DrawCircle".to_string()),
        Just("DrawRectangle".to_string()),
        Just("Fill".to_string()),
        Just("GoTo".to_string()),
        Just("GetActualX".to_string()),
        Just("GetColorCount".to_string()),
        Just("IsBrushColor".to_string()),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just("[".to_string()),
        Just("]".to_string()),
        Just(",".to_string()),
        Just("<-".to_string()),
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
        Just("**".to_string()),
        Just("/".to_string()),
        Just("%".to_string()),
        Just("==".to_string()),
        Just("!=".to_string()),
        Just("<=".to_string()),
        Just("&&".to_string()),
        Just("||".to_string()),
        Just("\n".to_string()),
        Just("\"Red\"".to_string()),
        "[a-z][a-z0-9_]{0,6}".prop_map(|s| s),
        (0i32..100).prop_map(|n| n.to_string()),
    ]
}

fn token_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(walle_token(), 0..60).prop_map(|tokens| tokens.join(" "))
}

proptest! {
    #[test]
    fn scanner_ends_with_exactly_one_eof(source in arbitrary_source()) {
        let (tokens, _) = tokenize(&source);
        prop_assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn token_lines_never_decrease(source in arbitrary_source()) {
        let (tokens, _) = tokenize(&source);
        for pair in tokens.windows(2) {
            prop_assert!(pair[0].line <= pair[1].line);
        }
    }

    #[test]
    fn parser_never_panics(source in token_soup()) {
        let (tokens, _) = tokenize(&source);
        let (program, _) = parse_tokens(&tokens);
        prop_assert_eq!(program.statements.len(), program.lines.len());
        for &index in program.labels.values() {
            prop_assert!(index < program.len());
        }
    }

    #[test]
    fn checker_never_panics(source in token_soup()) {
        let _ = check(&format!("Spawn(0, 0)\n{}", source));
    }

    #[test]
    fn horizontal_line_paints_distance_plus_one(
        size in 2usize..30,
        row in 0usize..30,
        distance_seed in 0usize..30,
    ) {
        let row = row % size;
        let distance = distance_seed % size;
        let source = format!("Spawn(0, {})\nDrawLine(1, 0, {})\n", row, distance);
        let program = check(&source).expect("line program is valid");

        let mut interpreter = Interpreter::new(&program, size).expect("starts with Spawn");
        interpreter.execute().expect("stays inside the canvas");

        prop_assert_eq!(interpreter.canvas().painted_cells(), distance + 1);
        prop_assert_eq!(interpreter.cursor(), (distance as i32, row as i32));
    }
}
