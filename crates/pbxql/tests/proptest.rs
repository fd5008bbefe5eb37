//! Property-based tests for pbxql using proptest.

use pbxql::{compile, tokenize, DbType, Dialect, FieldDescriptor, Tokenizer};
use proptest::prelude::*;

// ============================================================================
// Test helpers
// ============================================================================

fn fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::new("name", DbType::Varchar).searchable(true),
        FieldDescriptor::new("note", DbType::Text).searchable(true),
        FieldDescriptor::new("age", DbType::Integer),
        FieldDescriptor::new("ok", DbType::Boolean),
    ]
}

// One valid term: a column, a legal operator and a value.
fn term_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (prop::sample::select(vec!["=", "!=", ">", ">=", "<", "<="]), any::<i32>())
            .prop_map(|(op, n)| format!("age {op} {n}")),
        (prop::sample::select(vec!["=", "!=", "like"]), "[a-z%]{0,8}")
            .prop_map(|(op, s)| format!("name {op} \"{s}\"")),
        (
            prop::sample::select(vec!["isnull", "isnotnull"]),
            prop::sample::select(vec!["note", "ok", "age"]),
        )
            .prop_map(|(op, col)| format!("{col} {op}")),
        "[a-z ]{0,8}".prop_map(|s| format!("* like '%{s}%'")),
    ]
}

// A well-formed query with optional nesting.
fn query_strategy() -> impl Strategy<Value = String> {
    let leaf = term_strategy();
    leaf.prop_recursive(3, 16, 4, |inner| {
        (
            inner.clone(),
            prop::sample::select(vec!["and", "OR", "&&", "||"]),
            inner,
            any::<bool>(),
        )
            .prop_map(|(left, bind, right, grouped)| {
                if grouped {
                    format!("{left} {bind} ({right})")
                } else {
                    format!("{left} {bind} {right}")
                }
            })
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Lenient tokenizing accepts any input and never panics.
    #[test]
    fn lenient_tokenizer_total(input in any::<String>()) {
        let tokens = Tokenizer::new().lenient(true).tokenize(&input).unwrap();
        // Tokens are contiguous slices covering the input in order.
        let mut pos = 0;
        for token in &tokens {
            prop_assert_eq!(token.offset, pos);
            prop_assert_eq!(&input[token.offset..token.end()], token.text);
            pos = token.end();
        }
        prop_assert_eq!(pos, input.len());
    }

    /// Strict tokenizing either succeeds with a full cover or reports an error.
    #[test]
    fn strict_tokenizer_covers_or_fails(input in "[a-z =()'\"!<>]{0,40}") {
        if let Ok(tokens) = tokenize(&input) {
            let joined: String = tokens.iter().map(|t| t.text).collect();
            prop_assert_eq!(joined, input);
        }
    }

    /// Every well-formed query compiles.
    #[test]
    fn valid_queries_compile(query in query_strategy()) {
        let result = compile(&fields(), &Dialect::Ansi, &query, "");
        prop_assert!(result.is_ok(), "{:?} failed: {:?}", query, result);
    }

    /// Compiling is a pure function of its inputs.
    #[test]
    fn compile_is_idempotent(query in query_strategy(), prefix in "[a-z]{0,3}") {
        let first = compile(&fields(), &Dialect::MySql, &query, &prefix);
        let second = compile(&fields(), &Dialect::MySql, &query, &prefix);
        prop_assert_eq!(first, second);
    }

    /// Parentheses in the output always balance.
    #[test]
    fn output_parentheses_balance(query in query_strategy()) {
        let sql = compile(&fields(), &Dialect::Ansi, &query, "").unwrap();
        let mut depth = 0i32;
        let mut in_literal = false;
        for c in sql.chars() {
            match c {
                '\'' => in_literal = !in_literal,
                '(' if !in_literal => depth += 1,
                ')' if !in_literal => depth -= 1,
                _ => {}
            }
            prop_assert!(depth >= 0);
        }
        prop_assert_eq!(depth, 0);
    }

    /// Text values cannot escape their literal.
    #[test]
    fn text_values_stay_quoted(value in "[a-z' ]{0,12}") {
        let query = format!("name = \"{value}\"");
        let sql = compile(&fields(), &Dialect::Ansi, &query, "").unwrap();
        prop_assert_eq!(sql, format!("\"name\" = '{}'", value.replace('\'', "''")));
    }

    /// Integer columns only ever receive a numeric literal.
    #[test]
    fn integer_values_are_numeric(value in "[a-z0-9;.-]{1,8}") {
        let query = format!("age = \"{value}\"");
        let sql = compile(&fields(), &Dialect::Ansi, &query, "").unwrap();
        let literal = sql.trim_start_matches("\"age\" = ");
        prop_assert!(literal == "0" || literal == value, "{}", literal);
        prop_assert!(!literal.contains(';'));
    }
}
