use super::*;
use expect_test::{Expect, expect};

fn render(tokens: &[Token], depth: usize, lines: &mut Vec<String>) {
    for token in tokens {
        let indent = "  ".repeat(depth);
        let span = format!(
            "@ {}:{} [{}-{}]",
            token.span.line, token.span.column, token.span.start, token.span.end
        );
        match &token.kind {
            TokenKind::Block(body) => {
                lines.push(format!("{indent}Block {span}"));
                render(body, depth + 1, lines);
            }
            kind => lines.push(format!("{indent}{kind:?} {span}")),
        }
    }
}

fn check(input: &str, expect: Expect) {
    let mut lexer = Lexer::new(input);
    let output = match lexer.tokenize() {
        Ok(tokens) => {
            let mut lines = Vec::new();
            render(&tokens, 0, &mut lines);
            lines.join("\n")
        }
        Err(e) => format!("Error: {} at {}:{}", e.message, e.line, e.column),
    };
    expect.assert_eq(&output);
}

#[test]
fn lex_literals() {
    check(
        "1 -2 true false",
        expect![[r#"
            Integer(1) @ 1:1 [0-1]
            Integer(-2) @ 1:3 [2-4]
            True @ 1:6 [5-9]
            False @ 1:11 [10-15]"#]],
    );
}

#[test]
fn lex_variable_forms() {
    check(
        "=x x @f @ =if",
        expect![[r#"
            Assign("x") @ 1:1 [0-2]
            Identifier("x") @ 1:4 [3-4]
            Call("f") @ 1:6 [5-7]
            CallTop @ 1:9 [8-9]
            Assign("if") @ 1:11 [10-13]"#]],
    );
}

#[test]
fn lex_operators() {
    check(
        "+ - * / == != < <= > >= & | min max ~ ! abs",
        expect![[r#"
            Binary(Add) @ 1:1 [0-1]
            Binary(Sub) @ 1:3 [2-3]
            Binary(Mul) @ 1:5 [4-5]
            Binary(Div) @ 1:7 [6-7]
            Binary(Equal) @ 1:9 [8-10]
            Binary(NotEqual) @ 1:12 [11-13]
            Binary(Less) @ 1:15 [14-15]
            Binary(LessEqual) @ 1:17 [16-18]
            Binary(Greater) @ 1:20 [19-20]
            Binary(GreaterEqual) @ 1:22 [21-23]
            Binary(And) @ 1:25 [24-25]
            Binary(Or) @ 1:27 [26-27]
            Binary(Min) @ 1:29 [28-31]
            Binary(Max) @ 1:33 [32-35]
            Unary(Negate) @ 1:37 [36-37]
            Unary(Not) @ 1:39 [38-39]
            Unary(Abs) @ 1:41 [40-43]"#]],
    );
}

#[test]
fn lex_commands() {
    check(
        "print debug_print if ifelse while",
        expect![[r#"
            Print @ 1:1 [0-5]
            DebugPrint @ 1:7 [6-17]
            If @ 1:19 [18-20]
            IfElse @ 1:22 [21-27]
            While @ 1:29 [28-33]"#]],
    );
}

#[test]
fn lex_nested_blocks() {
    check(
        "[ 1 [ 2 ] ]",
        expect![[r#"
            Block @ 1:1 [0-11]
              Integer(1) @ 1:3 [2-3]
              Block @ 1:5 [4-9]
                Integer(2) @ 1:7 [6-7]"#]],
    );
}

#[test]
fn lex_brackets_without_whitespace() {
    check(
        "[x]=f",
        expect![[r#"
            Block @ 1:1 [0-3]
              Identifier("x") @ 1:2 [1-2]
            Assign("f") @ 1:4 [3-5]"#]],
    );
}

#[test]
fn lex_empty_block() {
    check(
        "[]",
        expect![[r#"
            Block @ 1:1 [0-2]"#]],
    );
}

#[test]
fn lex_comments() {
    check(
        "1 # one\n2#two\n3",
        expect![[r#"
            Integer(1) @ 1:1 [0-1]
            Integer(2) @ 2:1 [8-9]
            Integer(3) @ 3:1 [14-15]"#]],
    );
}

#[test]
fn lex_comment_hides_brackets() {
    check(
        "1 # [ unbalanced\n2",
        expect![[r#"
            Integer(1) @ 1:1 [0-1]
            Integer(2) @ 2:1 [17-18]"#]],
    );
}

#[test]
fn lex_empty_source() {
    check("", expect![[r#""#]]);
    check("   # only a comment", expect![[r#""#]]);
}

#[test]
fn lex_unknown_lexemes() {
    check(
        "$ 12ab = @1 99999999999999999999",
        expect![[r#"
            Unknown("$") @ 1:1 [0-1]
            Unknown("12ab") @ 1:3 [2-6]
            Unknown("=") @ 1:8 [7-8]
            Unknown("@1") @ 1:10 [9-11]
            Unknown("99999999999999999999") @ 1:13 [12-32]"#]],
    );
}

#[test]
fn lex_identifier_characters() {
    check(
        "is_done? x' _tmp",
        expect![[r#"
            Identifier("is_done?") @ 1:1 [0-8]
            Identifier("x'") @ 1:10 [9-11]
            Identifier("_tmp") @ 1:13 [12-16]"#]],
    );
}

#[test]
fn lex_error_unclosed_bracket() {
    check(
        "[ 1",
        expect![[r#"Error: Unclosed '[' (missing matching ']') at 1:1"#]],
    );
}

#[test]
fn lex_error_reports_innermost_unclosed_bracket() {
    check(
        "[ 1 [ 2",
        expect![[r#"Error: Unclosed '[' (missing matching ']') at 1:5"#]],
    );
}

#[test]
fn lex_error_unexpected_close_bracket() {
    check(
        "1 ]",
        expect![[r#"Error: Unexpected ']' without matching '[' at 1:3"#]],
    );
}

#[test]
fn lex_error_kinds() {
    let unclosed = Lexer::new("[ [ 1 ]").tokenize().unwrap_err();
    assert_eq!(unclosed.kind, LexErrorKind::UnclosedBracket);
    assert_eq!((unclosed.line, unclosed.column), (1, 1));

    let unexpected = Lexer::new("[ 1 ] ]").tokenize().unwrap_err();
    assert_eq!(unexpected.kind, LexErrorKind::UnexpectedCloseBracket);
    assert_eq!((unexpected.line, unexpected.column), (1, 7));
}

#[test]
fn lex_nesting_limit() {
    let at_limit = Lexer::new("[ [ [ 1 ] ] ]")
        .with_max_nesting(3)
        .tokenize();
    assert!(at_limit.is_ok());

    let too_deep = Lexer::new("[ [ [ [ 1 ] ] ] ]")
        .with_max_nesting(3)
        .tokenize()
        .unwrap_err();
    assert_eq!(too_deep.kind, LexErrorKind::NestingTooDeep);
    assert_eq!((too_deep.line, too_deep.column), (1, 7));
}

#[test]
fn lex_very_deep_nesting_is_an_error() {
    let depth = 200_000;
    let source = format!("{}1 {}", "[ ".repeat(depth), "] ".repeat(depth));

    let err = Lexer::new(&source).tokenize().unwrap_err();
    assert_eq!(err.kind, LexErrorKind::NestingTooDeep);
    assert_eq!(err.column as usize, DEFAULT_MAX_NESTING * 2 + 1);
}

#[test]
fn lex_multiline_positions() {
    check(
        "[ =x\n  x 1 -\n] =dec",
        expect![[r#"
            Block @ 1:1 [0-14]
              Assign("x") @ 1:3 [2-4]
              Identifier("x") @ 2:3 [7-8]
              Integer(1) @ 2:5 [9-10]
              Binary(Sub) @ 2:7 [11-12]
            Assign("dec") @ 3:3 [15-19]"#]],
    );
}
