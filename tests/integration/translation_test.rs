use anyhow::{Result, anyhow};
use entiql::{
    CompiledQuery, Dialect, Error, FunctionRegistry, MetadataRegistry, ParamValues,
    Parser, TranslationError, Translator, Value, compile,
};

fn metadata() -> MetadataRegistry {
    let mut registry = MetadataRegistry::new();

    registry.register_entity("User", "users");
    registry.register_column("User", "Id", "id", "INTEGER");
    registry.register_column("User", "Name", "name", "TEXT");
    registry.register_column("User", "email", "email", "TEXT");

    registry.register_entity("Order", "orders");
    registry.register_column("Order", "Id", "id", "INTEGER");
    registry.register_column("Order", "total", "total", "REAL");
    registry.register_column("Order", "placedAt", "placed_at", "TIMESTAMP");
    registry.register_relationship("Order", "Customer", "User", "customer_id", "id");

    registry.register_entity_with_schema("Audit", "logs", "audit_entries");
    registry.register_column("Audit", "Id", "id", "INTEGER");

    registry
}

fn run(input: &str, dialect: Dialect, params: &ParamValues) -> Result<CompiledQuery> {
    let registry = metadata();
    compile(input, dialect, &registry, params).map_err(|e| anyhow!("compile error: {e}"))
}

fn run_err(input: &str, dialect: Dialect, params: &ParamValues) -> Error {
    let registry = metadata();
    compile(input, dialect, &registry, params).expect_err("compile must fail")
}

#[test]
fn test_update_scenario_sqlserver() -> Result<()> {
    let mut params = ParamValues::new();
    params.set("n", Value::String("Ada".to_string()));
    params.set("id", Value::Integer(7));

    let compiled = run(
        "UPDATE User u SET u.Name = :n WHERE u.Id = :id",
        Dialect::SqlServer,
        &params,
    )?;

    assert_eq!(compiled.sql, "UPDATE users SET name = @n WHERE id = @id");
    let names: Vec<_> = compiled.parameters.keys().cloned().collect();
    assert_eq!(names, vec!["n".to_string(), "id".to_string()]);
    assert_eq!(
        compiled.parameters.get("n"),
        Some(&Value::String("Ada".to_string()))
    );
    assert_eq!(compiled.parameters.get("id"), Some(&Value::Integer(7)));
    Ok(())
}

#[test]
fn test_count_scenario() -> Result<()> {
    let compiled = run(
        "SELECT COUNT(o.Id) FROM Order o",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(compiled.sql, "SELECT COUNT(id) FROM orders");
    Ok(())
}

#[test]
fn test_join_select_with_parameter() -> Result<()> {
    let mut params = ParamValues::new();
    params.set("email", Value::String("ada@example.com".to_string()));

    let compiled = run(
        "SELECT o.Id, o.total FROM Order o JOIN o.Customer c WHERE c.email = :email ORDER BY o.total DESC",
        Dialect::Generic,
        &params,
    )?;

    assert_eq!(
        compiled.sql,
        "SELECT o.id, o.total FROM orders o INNER JOIN users c ON c.id = o.customer_id \
         WHERE c.email = :email ORDER BY o.total DESC"
    );
    assert_eq!(compiled.parameters.len(), 1);
    Ok(())
}

#[test]
fn test_repeated_parameter_binds_once() -> Result<()> {
    let mut params = ParamValues::new();
    params.set("needle", Value::String("ada".to_string()));

    let compiled = run(
        "SELECT u.Id FROM User u WHERE u.Name = :needle OR u.email = :needle",
        Dialect::Generic,
        &params,
    )?;

    assert_eq!(compiled.parameters.len(), 1);
    assert_eq!(
        compiled.sql,
        "SELECT id FROM users WHERE name = :needle OR email = :needle"
    );
    // No literal substitution anywhere in the text
    assert!(!compiled.sql.contains("ada"));
    Ok(())
}

#[test]
fn test_postgres_positional_placeholders_reuse_ordinals() -> Result<()> {
    let mut params = ParamValues::new();
    params.set("a", Value::Integer(1));
    params.set("b", Value::Integer(2));

    let compiled = run(
        "SELECT u.Id FROM User u WHERE u.Id = :a OR u.Id = :b OR u.Id = :a",
        Dialect::Postgres,
        &params,
    )?;

    assert_eq!(
        compiled.sql,
        "SELECT id FROM users WHERE id = $1 OR id = $2 OR id = $1"
    );
    assert_eq!(compiled.parameters.len(), 2);
    Ok(())
}

#[test]
fn test_missing_parameter_value_is_translation_error() {
    let err = run_err(
        "SELECT u.Id FROM User u WHERE u.Id = :id",
        Dialect::Generic,
        &ParamValues::new(),
    );
    assert!(matches!(
        err,
        Error::Translation(TranslationError::MissingParameter { .. })
    ));
}

#[test]
fn test_unknown_entity_property_relationship() {
    let params = ParamValues::new();

    let err = run_err("SELECT g.Id FROM Ghost g", Dialect::Generic, &params);
    assert!(matches!(
        err,
        Error::Translation(TranslationError::UnknownEntity { .. })
    ));

    let err = run_err("SELECT u.Ghost FROM User u", Dialect::Generic, &params);
    match err {
        Error::Translation(TranslationError::UnknownProperty {
            entity,
            property,
            alias,
        }) => {
            assert_eq!(entity, "User");
            assert_eq!(property, "Ghost");
            assert_eq!(alias, Some("u".to_string()));
        }
        other => panic!("expected UnknownProperty, got {other:?}"),
    }

    // Lines is not a declared relationship on Order; shape is fine at parse
    // time so the failure is a translation error
    let err = run_err(
        "SELECT o.Id FROM Order o JOIN o.Lines l",
        Dialect::Generic,
        &params,
    );
    match err {
        Error::Translation(TranslationError::UnknownRelationship {
            entity,
            relationship,
            ..
        }) => {
            assert_eq!(entity, "Order");
            assert_eq!(relationship, "Lines");
        }
        other => panic!("expected UnknownRelationship, got {other:?}"),
    }
}

#[test]
fn test_unknown_alias() {
    let err = run_err(
        "SELECT x.Id FROM User u",
        Dialect::Generic,
        &ParamValues::new(),
    );
    assert!(matches!(
        err,
        Error::Translation(TranslationError::UnknownAlias { .. })
    ));
}

#[test]
fn test_schema_qualified_table() -> Result<()> {
    let compiled = run(
        "SELECT a.Id FROM Audit a",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(compiled.sql, "SELECT id FROM logs.audit_entries");
    Ok(())
}

#[test]
fn test_delete_translation() -> Result<()> {
    let mut params = ParamValues::new();
    params.set("cutoff", Value::Float(10.5));

    let compiled = run(
        "DELETE FROM Order o WHERE o.total < :cutoff",
        Dialect::SqlServer,
        &params,
    )?;
    assert_eq!(compiled.sql, "DELETE FROM orders WHERE total < @cutoff");
    Ok(())
}

#[test]
fn test_function_spelling_per_dialect() -> Result<()> {
    let params = ParamValues::new();

    let compiled = run(
        "SELECT LENGTH(u.Name) FROM User u",
        Dialect::SqlServer,
        &params,
    )?;
    assert_eq!(compiled.sql, "SELECT LEN(name) FROM users");

    let compiled = run(
        "SELECT LENGTH(u.Name) FROM User u",
        Dialect::Generic,
        &params,
    )?;
    assert_eq!(compiled.sql, "SELECT LENGTH(name) FROM users");

    let compiled = run("SELECT NOW() FROM User u", Dialect::SqlServer, &params)?;
    assert_eq!(compiled.sql, "SELECT GETDATE() FROM users");

    let compiled = run("SELECT NOW() FROM User u", Dialect::Sqlite, &params)?;
    assert_eq!(compiled.sql, "SELECT CURRENT_TIMESTAMP FROM users");
    Ok(())
}

#[test]
fn test_unregistered_function_passes_through() -> Result<()> {
    assert_eq!(
        FunctionRegistry::global().resolve("UNKNOWNFN", Dialect::SqlServer),
        "UNKNOWNFN"
    );

    let compiled = run(
        "SELECT SOUNDEX(u.Name) FROM User u",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(compiled.sql, "SELECT SOUNDEX(name) FROM users");
    Ok(())
}

#[test]
fn test_custom_function_registry() -> Result<()> {
    let registry = metadata();
    let mut functions = FunctionRegistry::with_defaults();
    functions.register("LENGTH", Dialect::Postgres.name(), "CHAR_LENGTH");

    let query = Parser::new("SELECT LENGTH(u.Name) FROM User u")?
        .parse()
        .map_err(|e| anyhow!("parse error: {e}"))?;
    let translator = Translator::with_functions(Dialect::Postgres, &registry, &functions);
    let compiled = translator.translate(&query, &ParamValues::new())?;

    assert_eq!(compiled.sql, "SELECT CHAR_LENGTH(name) FROM users");
    Ok(())
}

#[test]
fn test_precedence_preserved_in_output() -> Result<()> {
    // Parenthesized OR under AND keeps its grouping in the emitted SQL
    let compiled = run(
        "SELECT u.Id FROM User u WHERE (u.Id = 1 OR u.Id = 2) AND u.Name = 'Ada'",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(
        compiled.sql,
        "SELECT id FROM users WHERE (id = 1 OR id = 2) AND name = 'Ada'"
    );

    // The unparenthesized mix needs no parens; SQL shares the ladder
    let compiled = run(
        "SELECT u.Id FROM User u WHERE u.Id = 1 OR u.Id = 2 AND u.Name = 'Ada'",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(
        compiled.sql,
        "SELECT id FROM users WHERE id = 1 OR id = 2 AND name = 'Ada'"
    );
    Ok(())
}

#[test]
fn test_group_by_having_translation() -> Result<()> {
    let compiled = run(
        "SELECT c.Name, COUNT(o.Id) FROM Order o JOIN o.Customer c GROUP BY c.Name HAVING COUNT(o.Id) > 3",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(
        compiled.sql,
        "SELECT c.name, COUNT(o.id) FROM orders o INNER JOIN users c ON c.id = o.customer_id \
         GROUP BY c.name HAVING COUNT(o.id) > 3"
    );
    Ok(())
}

#[test]
fn test_explicit_on_condition_is_anded() -> Result<()> {
    let compiled = run(
        "SELECT o.Id FROM Order o JOIN o.Customer c ON c.Name = 'Ada'",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(
        compiled.sql,
        "SELECT o.id FROM orders o INNER JOIN users c ON c.id = o.customer_id AND c.name = 'Ada'"
    );
    Ok(())
}

#[test]
fn test_in_subquery_translation() -> Result<()> {
    let compiled = run(
        "SELECT u.Id FROM User u WHERE u.Id IN (SELECT o.Id FROM Order o WHERE o.total > 100)",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(
        compiled.sql,
        "SELECT id FROM users WHERE id IN (SELECT id FROM orders WHERE total > 100)"
    );
    Ok(())
}

#[test]
fn test_wildcard_and_distinct() -> Result<()> {
    let compiled = run(
        "SELECT DISTINCT o.* FROM Order o JOIN o.Customer c",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(
        compiled.sql,
        "SELECT DISTINCT o.* FROM orders o INNER JOIN users c ON c.id = o.customer_id"
    );

    let compiled = run("SELECT * FROM Order o", Dialect::Generic, &ParamValues::new())?;
    assert_eq!(compiled.sql, "SELECT * FROM orders");
    Ok(())
}

#[test]
fn test_boolean_literal_per_dialect() -> Result<()> {
    let compiled = run(
        "UPDATE User SET Name = 'x' WHERE Id = 1 AND TRUE = TRUE",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert!(compiled.sql.ends_with("TRUE = TRUE"));

    let compiled = run(
        "UPDATE User SET Name = 'x' WHERE Id = 1 AND TRUE = TRUE",
        Dialect::SqlServer,
        &ParamValues::new(),
    )?;
    assert!(compiled.sql.ends_with("1 = 1"));
    Ok(())
}

#[test]
fn test_string_literal_quote_escaping() -> Result<()> {
    let compiled = run(
        "SELECT u.Id FROM User u WHERE u.Name = 'O''Brien'",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(compiled.sql, "SELECT id FROM users WHERE name = 'O''Brien'");
    Ok(())
}

#[test]
fn test_is_null_and_between_translation() -> Result<()> {
    let compiled = run(
        "SELECT o.Id FROM Order o WHERE o.placedAt IS NOT NULL AND o.total BETWEEN 1 AND 10",
        Dialect::Generic,
        &ParamValues::new(),
    )?;
    assert_eq!(
        compiled.sql,
        "SELECT id FROM orders WHERE placed_at IS NOT NULL AND total BETWEEN 1 AND 10"
    );
    Ok(())
}

#[test]
fn test_same_input_same_error() {
    // Failures are deterministic functions of input and metadata
    let params = ParamValues::new();
    let first = run_err("SELECT g.Id FROM Ghost g", Dialect::Generic, &params);
    let second = run_err("SELECT g.Id FROM Ghost g", Dialect::Generic, &params);
    assert_eq!(format!("{first:?}"), format!("{second:?}"));
}
