//! Placeholder counting, value conversion and row normalization.

use odbc_query_core::odbc::placeholder::{QuoteEscape, count_placeholders, placeholder_positions};
use odbc_query_core::odbc::{
    CellKind, DuplicateColumns, Error, OdbcValue, QuerySpec, ResultSet, decode_text, normalize,
};
use serde_json::json;

#[test]
fn test_count_placeholders() {
    let sql = "select * from table where col = ? or col = ?";
    assert_eq!(count_placeholders(sql, QuoteEscape::Doubled), 2);
    assert_eq!(count_placeholders("select 1", QuoteEscape::Doubled), 0);
    assert_eq!(placeholder_positions("a = ? and b = ?", QuoteEscape::Doubled), vec![4, 14]);
}

#[test]
fn test_placeholders_in_literals_and_comments_are_ignored() {
    let sql = "select '?', \"?\", `?`, [a?b] -- ?\n\
               from t /* ? /* ? */ ? */ where x = ? and y = 'it''s ?'";
    assert_eq!(count_placeholders(sql, QuoteEscape::Doubled), 1);
    assert_eq!(count_placeholders(sql, QuoteEscape::Backslash), 1);
}

#[test]
fn test_backslash_is_not_an_escape() {
    let sql = r"select * from t where path = 'C:\' and id = ?";
    assert_eq!(count_placeholders(sql, QuoteEscape::Doubled), 1);
    assert_eq!(QuerySpec::new(sql).quote_escape(), QuoteEscape::Doubled);
}

#[test]
fn test_mysql_backslash_escapes_quote() {
    let sql = r"select * from t where a = 'it\'s' and b = ?";
    assert_eq!(count_placeholders(sql, QuoteEscape::Backslash), 1);
    assert_eq!(count_placeholders(sql, QuoteEscape::Doubled), 0);

    let sql = r#"select "say \"?\"", 'a\\' from t where b = ? and c = `x\`"#;
    assert_eq!(count_placeholders(sql, QuoteEscape::Backslash), 1);

    let query = QuerySpec::new(r"select * from t where a = 'it\'s' and b = ?")
        .with_quote_escape(QuoteEscape::Backslash)
        .bind(1);
    assert_eq!(query.placeholder_count(), 1);
    assert!(query.check_parameter_count().is_ok());
}

#[test]
fn test_parameter_count_mismatch() {
    let sql = "select * from table where col = ? or col = ?";

    let one = QuerySpec::new(sql).bind("a");
    match one.check_parameter_count() {
        Err(Error::ParameterCount { expected, given }) => {
            assert_eq!(expected, 2);
            assert_eq!(given, 1);
        }
        other => panic!("expected parameter count error, got {:?}", other),
    }

    let three = QuerySpec::new(sql).bind("a").bind("b").bind("c");
    assert!(three.check_parameter_count().is_err());

    let two = QuerySpec::new(sql).bind("a").bind(1);
    assert!(two.check_parameter_count().is_ok());
}

#[test]
fn test_values_from_json() {
    let values: Vec<OdbcValue> = [json!("a"), json!(1), json!(1.5), json!(true), json!(null)]
        .into_iter()
        .map(OdbcValue::try_from)
        .collect::<Result<_, _>>()
        .expect("scalar values");

    assert_eq!(
        values,
        vec![
            OdbcValue::Text("a".into()),
            OdbcValue::Int(1),
            OdbcValue::Float(1.5),
            OdbcValue::Bool(true),
            OdbcValue::Null,
        ]
    );

    let error = OdbcValue::try_from(json!(["nested"])).expect_err("arrays cannot be bound");
    assert_eq!(error.kind(), "invalid_parameter");
}

#[test]
fn test_decode_text() {
    assert_eq!(decode_text(CellKind::Integer, "42".into()), OdbcValue::Int(42));
    assert_eq!(decode_text(CellKind::Float, "2.5".into()), OdbcValue::Float(2.5));
    assert_eq!(decode_text(CellKind::Bool, "1".into()), OdbcValue::Bool(true));
    assert_eq!(
        decode_text(CellKind::Text, "12.50".into()),
        OdbcValue::Text("12.50".into())
    );
    assert_eq!(
        decode_text(CellKind::Integer, "not a number".into()),
        OdbcValue::Text("not a number".into())
    );
}

fn id_name_rows() -> ResultSet {
    ResultSet::new(vec!["id".into(), "name".into()])
        .with_row(vec![1.into(), "a".into()])
        .with_row(vec![2.into(), OdbcValue::Null])
}

#[test]
fn test_normalize_rows() {
    let rows = normalize(id_name_rows(), DuplicateColumns::default()).expect("normalize");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["id", "name"]);
    assert_eq!(rows[0].get("id"), Some(&OdbcValue::Int(1)));
    assert_eq!(rows[1].get("name"), Some(&OdbcValue::Null));
    assert_eq!(
        serde_json::to_value(&rows).expect("json"),
        json!([{"id": 1, "name": "a"}, {"id": 2, "name": null}])
    );
}

#[test]
fn test_normalize_empty_result() {
    let set = ResultSet::new(vec!["id".into()]);
    assert!(normalize(set, DuplicateColumns::LastWins).expect("normalize").is_empty());
}

fn duplicate_rows() -> ResultSet {
    ResultSet::new(vec!["id".into(), "name".into(), "id".into()])
        .with_row(vec![1.into(), "a".into(), 2.into()])
}

#[test]
fn test_duplicate_columns_last_wins() {
    let rows = normalize(duplicate_rows(), DuplicateColumns::LastWins).expect("normalize");

    assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["id", "name"]);
    assert_eq!(rows[0].get("id"), Some(&OdbcValue::Int(2)));
}

#[test]
fn test_duplicate_columns_reject() {
    let error = normalize(duplicate_rows(), DuplicateColumns::Reject).expect_err("duplicate");
    assert!(matches!(error, Error::DuplicateColumn { ref name } if name == "id"));
}

#[test]
fn test_duplicate_columns_suffix() {
    let rows = normalize(duplicate_rows(), DuplicateColumns::Suffix).expect("normalize");
    assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["id", "name", "id_2"]);
    assert_eq!(rows[0].get("id_2"), Some(&OdbcValue::Int(2)));

    let set = ResultSet::new(vec!["id".into(), "id".into(), "id_2".into()])
        .with_row(vec![1.into(), 2.into(), 3.into()]);
    let rows = normalize(set, DuplicateColumns::Suffix).expect("normalize");
    assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["id", "id_3", "id_2"]);
    assert_eq!(rows[0].get("id_2"), Some(&OdbcValue::Int(3)));
}

#[test]
fn test_duplicate_policy_names() {
    for policy in [
        DuplicateColumns::LastWins,
        DuplicateColumns::Reject,
        DuplicateColumns::Suffix,
    ] {
        assert_eq!(policy.name().parse::<DuplicateColumns>().expect("parse"), policy);
    }
    assert_eq!("last_wins".parse::<DuplicateColumns>().expect("parse"), DuplicateColumns::LastWins);
    assert!("first-wins".parse::<DuplicateColumns>().is_err());
}

#[test]
fn test_binary_values_serialize_as_hex() {
    let value = OdbcValue::Binary(vec![0xde, 0xad, 0x01]);
    assert_eq!(serde_json::to_value(&value).expect("json"), json!("0xDEAD01"));
}
