// tests/grammar_tests.rs
//
// End-to-end parses through the public entry points: a small digit grammar,
// recursive rules resolved by name, whole-input matching, lexical-mode
// switching, and a serde dump of the resulting tree.

use weft::{Ast, Grammar, Lexer, ParseError, Parser, Token, TokenIter};

fn lexer_of(words: &[&str]) -> Box<dyn Lexer> {
    let tokens: Vec<Token> = words
        .iter()
        .enumerate()
        .map(|(i, text)| Token::new("word", *text, i))
        .collect();
    Box::new(TokenIter::new(tokens))
}

fn digit_grammar() -> Grammar<()> {
    let mut grammar = Grammar::new();
    grammar.register(
        "digit",
        Parser::literal(|token| {
            !token.is_end() && token.lexeme.chars().all(|c| c.is_ascii_digit())
        }),
    );
    grammar
}

#[test]
fn number_grammar_consumes_every_digit() {
    let grammar = digit_grammar();
    let number = Parser::named("digit").repeated(1);

    let (ast, mut state) = grammar
        .parse(&number, lexer_of(&["1", "2", "3"]), ())
        .unwrap();
    let digits = ast.into_seq().unwrap();
    assert_eq!(digits.len(), 3);
    assert!(matches!(&digits[0], Ast::Rule { name, .. } if name == "digit"));
    assert_eq!(state.cursor(), 3);
    assert!(state.consumed_all());
}

#[test]
fn number_grammar_fails_on_empty_input() {
    let grammar = digit_grammar();
    let number = Parser::named("digit").repeated(1);

    let error = grammar.parse(&number, lexer_of(&[]), ()).unwrap_err();
    assert_eq!(error, ParseError::NoParse { furthest: 0 });
}

#[test]
fn whole_input_matching_uses_the_end_sentinel() {
    let grammar = digit_grammar();
    let number = Parser::named("digit").repeated(1) + Parser::end_of_input();

    assert!(grammar.parse(&number, lexer_of(&["4", "2"]), ()).is_ok());

    let error = grammar
        .parse(&number, lexer_of(&["4", "2", "x"]), ())
        .unwrap_err();
    // The high-water mark points at the trailing junk, two tokens in.
    assert_eq!(error, ParseError::NoParse { furthest: 2 });
}

#[test]
fn right_recursive_rule_parses_by_name() {
    let mut grammar = Grammar::new();
    grammar.register(
        "a",
        (Parser::token_text("a") + Parser::named("a")) | Parser::token_text("a"),
    );

    let (_, mut state) = grammar
        .parse(&Parser::named("a"), lexer_of(&["a", "a", "a"]), ())
        .unwrap();
    assert!(state.consumed_all());

    // The same rule bottoms out on a single token.
    let (ast, _) = grammar
        .parse(&Parser::named("a"), lexer_of(&["a"]), ())
        .unwrap();
    assert!(matches!(ast, Ast::Rule { .. }));
}

#[test]
fn literal_can_switch_lexical_mode_for_its_own_token() {
    let interpolated = Parser::literal_with_lexer(
        |token| token.name == "mode",
        || Box::new(TokenIter::new(vec![Token::new("mode", "!", 0)])),
    );
    let fragment = Parser::anything() + interpolated + Parser::anything();

    let grammar: Grammar<()> = Grammar::new();
    let (ast, mut state) = grammar.parse(&fragment, lexer_of(&["x", "y"]), ()).unwrap();

    let lexemes: Vec<&str> = ast.tokens().iter().map(|t| t.lexeme.as_str()).collect();
    // The middle token came from the alternate lexer; the base lexer resumed
    // for the third fetch.
    assert_eq!(lexemes, vec!["x", "!", "y"]);
    assert!(state.consumed_all());
}

#[test]
fn mode_switched_token_stays_buffered_after_failure() {
    // The trace never truncates: a token fetched under an alternate lexer
    // survives the literal's failure and is what later fragments see.
    let never = Parser::literal_with_lexer(
        |_| false,
        || Box::new(TokenIter::new(vec![Token::new("mode", "!", 0)])),
    );
    let fragment = never | Parser::anything();

    let grammar: Grammar<()> = Grammar::new();
    let (ast, _) = grammar.parse(&fragment, lexer_of(&["x"]), ()).unwrap();
    assert_eq!(ast, Ast::Token(Token::new("mode", "!", 0)));
}

#[test]
fn parsed_tree_serializes() {
    let grammar = digit_grammar();
    let number = Parser::named("digit").repeated(1);
    let (ast, _) = grammar.parse(&number, lexer_of(&["7", "8"]), ()).unwrap();

    let dumped = serde_json::to_value(&ast).unwrap();
    assert!(dumped.get("Seq").is_some());
    assert_eq!(dumped["Seq"].as_array().unwrap().len(), 2);
}
