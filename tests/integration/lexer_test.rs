use anyhow::Result;
use entiql::{Lexer, LexicalError, TokenKind};

fn kinds(input: &str) -> Result<Vec<TokenKind>> {
    let tokens = Lexer::new(input).tokenize()?;
    Ok(tokens.into_iter().map(|t| t.kind).collect())
}

#[test]
fn test_tokenizes_full_query() -> Result<()> {
    let input = "SELECT o.id, o.total FROM Order o JOIN o.Customer c WHERE c.email = :email ORDER BY o.total DESC";
    let kinds = kinds(input)?;

    assert_eq!(kinds.first(), Some(&TokenKind::Select));
    assert!(kinds.contains(&TokenKind::Join));
    assert!(kinds.contains(&TokenKind::Parameter("email".to_string())));
    assert!(kinds.contains(&TokenKind::Desc));
    assert_eq!(kinds.last(), Some(&TokenKind::Eof));
    Ok(())
}

#[test]
fn test_longest_match_wins() -> Result<()> {
    // <= must come out as one token, never < then =
    let kinds = kinds("a <= b")?;
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier("a".to_string()),
            TokenKind::LtEq,
            TokenKind::Identifier("b".to_string()),
            TokenKind::Eof,
        ]
    );
    Ok(())
}

#[test]
fn test_both_not_equal_spellings() -> Result<()> {
    assert_eq!(
        kinds("<> !=")?,
        vec![TokenKind::NotEq, TokenKind::NotEq, TokenKind::Eof]
    );
    Ok(())
}

#[test]
fn test_keywords_are_case_insensitive_identifiers_are_not() -> Result<()> {
    let tokens = Lexer::new("select Email").tokenize()?;
    assert_eq!(tokens[0].kind, TokenKind::Select);
    assert_eq!(tokens[1].kind, TokenKind::Identifier("Email".to_string()));
    assert_eq!(tokens[1].literal, "Email");
    Ok(())
}

#[test]
fn test_parameter_stores_name_without_colon() -> Result<()> {
    let tokens = Lexer::new("WHERE id = :userId").tokenize()?;
    let param = tokens
        .iter()
        .find(|t| matches!(t.kind, TokenKind::Parameter(_)))
        .expect("parameter token");
    assert_eq!(param.kind, TokenKind::Parameter("userId".to_string()));
    assert_eq!(param.literal, ":userId");
    Ok(())
}

#[test]
fn test_string_escape_and_unterminated() -> Result<()> {
    let tokens = Lexer::new("'O''Brien'").tokenize()?;
    assert_eq!(tokens[0].kind, TokenKind::StringLiteral("O'Brien".to_string()));

    let err = Lexer::new("'open").tokenize().unwrap_err();
    assert_eq!(err, LexicalError::UnterminatedString { position: 0 });
    Ok(())
}

#[test]
fn test_unrecognized_character_names_offender_and_position() {
    let err = Lexer::new("SELECT a ^ b").tokenize().unwrap_err();
    assert_eq!(
        err,
        LexicalError::UnexpectedCharacter {
            character: '^',
            position: 9
        }
    );
}

#[test]
fn test_number_without_sign() -> Result<()> {
    // Unary minus is the parser's concern; the lexer emits Minus then the number
    assert_eq!(
        kinds("-5")?,
        vec![TokenKind::Minus, TokenKind::NumberLiteral(5.0), TokenKind::Eof]
    );
    Ok(())
}

#[test]
fn test_positions_are_character_offsets() -> Result<()> {
    let tokens = Lexer::new("SELECT FROM").tokenize()?;
    assert_eq!(tokens[0].position, 0);
    assert_eq!(tokens[1].position, 7);
    Ok(())
}
