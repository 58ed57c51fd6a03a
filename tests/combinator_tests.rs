// tests/combinator_tests.rs
//
// The construction operators normalize as they build: chained choices and
// sequences must come out as one flat alternative/child list, never as nested
// two-element wrappers. These tests inspect fragment shape directly.

use weft::Parser;

fn any() -> Parser<()> {
    Parser::anything()
}

#[test]
fn chained_choice_flattens_to_one_alternative_list() {
    let fragment = any() | any() | any();
    match fragment {
        Parser::Or(alternatives) => assert_eq!(alternatives.len(), 3),
        other => panic!("expected a flat Or, got {:?}", other),
    }
}

#[test]
fn choice_of_choices_merges_both_sides() {
    let left = any() | any();
    let right = any() | any();
    match left | right {
        Parser::Or(alternatives) => assert_eq!(alternatives.len(), 4),
        other => panic!("expected a flat Or, got {:?}", other),
    }
}

#[test]
fn chained_sequence_flattens_to_one_child_list() {
    let fragment = any() + any() + any() + any();
    match fragment {
        Parser::And(children) => assert_eq!(children.len(), 4),
        other => panic!("expected a flat And, got {:?}", other),
    }
}

#[test]
fn rewrite_wrapper_is_a_flattening_boundary() {
    let wrapped = (any() | any()).rewrite(|_, ast| Ok(ast));
    match wrapped | any() {
        Parser::Or(alternatives) => assert_eq!(alternatives.len(), 2),
        other => panic!("expected a flat Or, got {:?}", other),
    }
}

#[test]
fn optional_is_repeat_zero_to_one() {
    match any().optional() {
        Parser::Repeat {
            at_least, at_most, ..
        } => {
            assert_eq!(at_least, 0);
            assert_eq!(at_most, Some(1));
        }
        other => panic!("expected Repeat, got {:?}", other),
    }
}

#[test]
fn repeated_is_unbounded() {
    match any().repeated(2) {
        Parser::Repeat {
            at_least, at_most, ..
        } => {
            assert_eq!(at_least, 2);
            assert_eq!(at_most, None);
        }
        other => panic!("expected Repeat, got {:?}", other),
    }
}

#[test]
fn join_builds_item_then_separator_item_star() {
    let fragment = any().join(Parser::token_text(","));
    let Parser::And(children) = fragment else {
        panic!("expected And at the top of a join");
    };
    assert_eq!(children.len(), 2);

    let Parser::Repeat {
        at_least,
        at_most,
        body,
    } = children[1].as_ref()
    else {
        panic!("expected the join tail to be a Repeat");
    };
    assert_eq!(*at_least, 0);
    assert_eq!(*at_most, None);
    match body.as_ref() {
        Parser::And(pair) => assert_eq!(pair.len(), 2),
        other => panic!("expected (separator item) pairs, got {:?}", other),
    }
}

#[test]
fn not_operator_builds_negative_lookahead() {
    match !any() {
        Parser::Except(_) => {}
        other => panic!("expected Except, got {:?}", other),
    }
}
