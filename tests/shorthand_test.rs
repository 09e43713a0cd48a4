use mashadb::prelude::*;
use mashadb::{assemble, build, build_columns};
use pretty_assertions::assert_eq;

#[test]
fn test_range_expansion() {
    for (low, high) in [("1", "1000"), ("Berlin", "London"), ("2023-01-01", "2023-12-31")] {
        let token = format!("{}..{}", low, high);
        assert_eq!(
            mashadb::expand("k", &token).unwrap(),
            format!("k BETWEEN '{}' AND '{}'", low, high)
        );
    }
}

#[test]
fn test_comparison_expansion_is_unquoted() {
    assert_eq!(mashadb::expand("age", "+18").unwrap(), "age >= 18");
    assert_eq!(mashadb::expand("age", "-65").unwrap(), "age <= 65");
    assert_eq!(mashadb::expand("balance", "-0.5").unwrap(), "balance <= 0.5");
}

#[test]
fn test_wildcard_expansion_keeps_percent() {
    for token in ["%ville", "Lon%", "%on%", "Lo%on"] {
        assert_eq!(
            mashadb::expand("city", token).unwrap(),
            format!("city LIKE '{}'", token)
        );
    }
}

#[test]
fn test_plain_expansion() {
    assert_eq!(mashadb::expand("people", "Tom").unwrap(), "people='Tom'");
    assert_eq!(mashadb::expand("name", "Jean-Luc").unwrap(), "name='Jean-Luc'");
}

#[test]
fn test_split_alternatives_order() {
    assert_eq!(split_alternatives("Al or Bob or Vlad"), vec!["Al", "Bob", "Vlad"]);
}

#[test]
fn test_build_single_range() {
    let filters = Filters::from([("id", "1..1000")]);
    let sql = build(&filters, LogicalOp::And).unwrap();
    assert!(sql.contains("id BETWEEN '1' AND '1000'"));
}

#[test]
fn test_build_groups_alternations() {
    let filters = Filters::new().with("people", "Tom").with("city", "London or Moscow");
    assert_eq!(
        build(&filters, LogicalOp::And).unwrap(),
        "people='Tom' AND (city='London' OR city='Moscow')"
    );
}

#[test]
fn test_build_or_across_keys() {
    let filters = Filters::new().with("people", "tom").with("city", "london or moscow");
    assert_eq!(
        build(&filters, LogicalOp::Or).unwrap(),
        "people='tom' OR (city='london' OR city='moscow')"
    );
}

#[test]
fn test_assemble_order_and_limit() {
    let spec = QuerySpec::new("subscribers")
        .columns(["city"])
        .order_by("city desc")
        .limit(10);
    assert_eq!(
        assemble(&spec).unwrap(),
        "SELECT city FROM subscribers ORDER BY city desc LIMIT 10"
    );
}

#[test]
fn test_assemble_is_deterministic() {
    let spec = QuerySpec::new("subscribers")
        .columns(["people", "city"])
        .filter("people", "Al or Bob")
        .filter("income", "60000..80000")
        .filter("age", "+21")
        .combine_with(LogicalOp::Or)
        .order_by("people")
        .limit(3);
    let first = assemble(&spec).unwrap();
    for _ in 0..10 {
        assert_eq!(assemble(&spec).unwrap(), first);
    }
}

#[test]
fn test_build_columns_primary_and_unique() {
    let sql = build_columns(&[
        PrimaryKeySpec::new("id").into(),
        ColumnSpec::new("email", "VARCHAR(255)").unique().into(),
    ])
    .unwrap();
    assert_eq!(
        sql,
        "id INT NOT NULL AUTO_INCREMENT, PRIMARY KEY(id), email VARCHAR(255) NOT NULL UNIQUE"
    );
}

#[test]
fn test_build_columns_from_cli_text() {
    let columns: Vec<ColumnDecl> = ["id:pk=10", "name:VARCHAR(100)", "bio:TEXT:null"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    assert_eq!(
        build_columns(&columns).unwrap(),
        "id INT NOT NULL AUTO_INCREMENT=10, PRIMARY KEY(id), name VARCHAR(100) NOT NULL, bio TEXT"
    );
}

#[test]
fn test_empty_filters_fail() {
    let err = build(&Filters::new(), LogicalOp::And).unwrap_err();
    assert!(matches!(err, MashaError::EmptyCondition));
}

#[test]
fn test_malformed_range_fails() {
    let err = mashadb::expand("id", "1..").unwrap_err();
    assert!(matches!(err, MashaError::MalformedExpansion { .. }));
}

#[test]
fn test_ambiguous_token_fails_whole_query() {
    let spec = QuerySpec::new("events")
        .filter("title", "Launch")
        .filter("year", "%2023..2024%");
    let err = assemble(&spec).unwrap_err();
    assert!(matches!(err, MashaError::AmbiguousToken { .. }));
}

#[test]
fn test_doubled_or_is_not_a_literal() {
    assert_eq!(split_alternatives("Al or  or Bob"), vec!["Al", "", "Bob"]);
    let filters = Filters::new().with("people", "Al or  or Bob");
    let err = build(&filters, LogicalOp::And).unwrap_err();
    assert!(matches!(err, MashaError::MalformedExpansion { .. }));
}
