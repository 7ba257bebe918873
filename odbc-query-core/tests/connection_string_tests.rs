//! Connection string construction for each database type and the DSN path.

use odbc_query_core::odbc::{
    ConnectionFields, ConnectionString, ConnectionStringBuilder, DbType, DsnEntry, MssqlAuth,
    OdbcCatalog, ParameterResolver, StaticCatalog, mssql_auth,
};

fn build(catalog: &dyn OdbcCatalog, explicit: ConnectionFields) -> String {
    try_build(catalog, explicit)
        .expect("connection string")
        .to_string()
}

fn try_build(
    catalog: &dyn OdbcCatalog,
    explicit: ConnectionFields,
) -> odbc_query_core::Result<ConnectionString> {
    let descriptor = ParameterResolver::new(catalog).resolve(&explicit, &ConnectionFields::new())?;
    ConnectionStringBuilder::new(catalog).build(&descriptor)
}

/// Split a rendered connection string into attributes, unescaping braced values.
fn attributes(conn: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut chars = conn.chars().peekable();
    while chars.peek().is_some() {
        let key: String = chars.by_ref().take_while(|c| *c != '=').collect();
        let mut value = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '}' {
                    if chars.peek() == Some(&'}') {
                        chars.next();
                    } else {
                        break;
                    }
                }
                value.push(c);
            }
            assert_eq!(chars.next(), Some(';'), "braced value must end the attribute");
        } else {
            value = chars.by_ref().take_while(|c| *c != ';').collect();
        }
        out.push((key, value));
    }
    out
}

fn mssql_fields() -> ConnectionFields {
    ConnectionFields::new()
        .servername(r"host\INST")
        .database("db_test")
        .username("sa")
        .password("Passw0rd")
        .dbtype("mssql")
}

#[test]
fn test_mssql_freetds() {
    let conn = build(&StaticCatalog::new(), mssql_fields());
    assert_eq!(
        conn,
        r"DRIVER={FreeTDS};SERVER=host\INST;TDS_Version=7.3;DATABASE=db_test;UID=sa;PWD=Passw0rd;"
    );
}

#[test]
fn test_mssql_microsoft_driver_has_no_tds_version() {
    let catalog =
        StaticCatalog::new().with_driver(DbType::Mssql, "{ODBC Driver 18 for SQL Server}");
    let conn = build(&catalog, mssql_fields().port("1433"));
    assert_eq!(
        conn,
        r"DRIVER={ODBC Driver 18 for SQL Server};SERVER=host\INST;PORT=1433;DATABASE=db_test;UID=sa;PWD=Passw0rd;"
    );
}

#[test]
fn test_mssql_domain_user() {
    let fields = mssql_fields().username(r"DOM\user");
    let descriptor = ParameterResolver::new(&StaticCatalog::new())
        .resolve(&fields, &ConnectionFields::new())
        .expect("resolve");
    assert_eq!(mssql_auth(&descriptor), MssqlAuth::Domain);

    let conn = build(&StaticCatalog::new(), fields).to_lowercase();
    assert!(conn.contains(r"uid=dom\user;"), "{}", conn);
    assert!(conn.contains("usentlmv2=yes;"), "{}", conn);
}

#[test]
fn test_mssql_sql_login() {
    let descriptor = ParameterResolver::new(&StaticCatalog::new())
        .resolve(&mssql_fields(), &ConnectionFields::new())
        .expect("resolve");
    assert_eq!(mssql_auth(&descriptor), MssqlAuth::Sql);

    let conn = build(&StaticCatalog::new(), mssql_fields()).to_lowercase();
    assert!(!conn.contains("usentlmv2"));
}

#[test]
fn test_mysql_default_driver() {
    let fields = ConnectionFields::new()
        .servername("mysql-server.domain.com")
        .port("3306")
        .database("db_test")
        .username("sa")
        .password("Passw0rd")
        .dbtype("mysql");
    let conn = build(&StaticCatalog::new(), fields);
    assert_eq!(
        conn,
        "DRIVER={MySQL ODBC 8.0 Unicode Driver};SERVER=mysql-server.domain.com;PORT=3306;DATABASE=db_test;UID=sa;PWD=Passw0rd;"
    );
}

#[test]
fn test_catalog_driver_and_explicit_override() {
    let catalog = StaticCatalog::new().with_driver(DbType::Mysql, "{MySQL 5.1}");
    let fields = ConnectionFields::new()
        .servername("server")
        .database("database")
        .username("uid")
        .password("pwd")
        .dbtype("MySQL");

    let conn = build(&catalog, fields.clone());
    assert!(conn.starts_with("DRIVER={MySQL 5.1};"), "{}", conn);

    let conn = build(&catalog, fields.driver("MariaDB Unicode"));
    assert!(conn.starts_with("DRIVER={MariaDB Unicode};"), "{}", conn);
}

#[test]
fn test_oracle_default_port() {
    let fields = ConnectionFields::new()
        .servername("server")
        .database("database")
        .username("uid")
        .password("pwd")
        .dbtype("oracle");
    let conn = build(&StaticCatalog::new(), fields);
    assert_eq!(
        conn,
        "DRIVER={Oracle 19 ODBC driver};DBQ=(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST=server)(PORT=1521))(CONNECT_DATA=(SID=database)));UID=uid;PWD=pwd;"
    );
}

#[test]
fn test_oracle_port() {
    let fields = ConnectionFields::new()
        .servername("server")
        .port("12345")
        .database("database")
        .username("uid")
        .password("pwd")
        .dbtype("oracle");
    let conn = build(&StaticCatalog::new(), fields).to_lowercase();
    assert!(conn.contains("(port=12345)"), "{}", conn);
    assert!(!conn.contains("1521"));
}

#[test]
fn test_dsn_connection_string() {
    let fields = ConnectionFields::new()
        .dsn("some_server")
        .username("root")
        .password("root");
    assert_eq!(build(&StaticCatalog::new(), fields), "DSN=some_server;UID=root;PWD=root;");
}

#[test]
fn test_dsn_ignores_server_fields() {
    let catalog = StaticCatalog::new().with_dsn(DsnEntry::new("what").server("elsewhere"));
    let fields = ConnectionFields::new()
        .dsn("what")
        .servername("asdf")
        .database("asdf")
        .dbtype("mssql")
        .username("asdf")
        .password("asdf");
    let conn = build(&catalog, fields).to_lowercase();

    assert!(conn.starts_with("dsn=what;"), "{}", conn);
    assert!(conn.contains("uid=asdf;"));
    assert!(conn.contains("pwd=asdf;"));
    assert!(!conn.contains("server="));
    assert!(!conn.contains("elsewhere"));
}

#[test]
fn test_dsn_with_explicit_driver() {
    let fields = ConnectionFields::new()
        .dsn("some_server")
        .driver("FreeTDS")
        .username("root")
        .password("root");
    assert_eq!(
        build(&StaticCatalog::new(), fields),
        "DSN=some_server;DRIVER={FreeTDS};UID=root;PWD=root;"
    );
}

#[test]
fn test_options_override_in_place() {
    let fields = mssql_fields()
        .option("ansinpw", "1")
        .option("tds_version", "7.0")
        .option("TrustServerCertificate", "yes");
    let conn = build(&StaticCatalog::new(), fields);

    assert_eq!(
        conn,
        r"DRIVER={FreeTDS};SERVER=host\INST;TDS_Version=7.0;DATABASE=db_test;UID=sa;PWD=Passw0rd;ansinpw=1;TrustServerCertificate=yes;"
    );
}

#[test]
fn test_values_are_braced_when_needed() {
    let fields = mssql_fields().password("pa;ss").option("Extra", "{x");
    let conn = build(&StaticCatalog::new(), fields);

    assert!(conn.contains("PWD={pa;ss};"), "{}", conn);
    assert!(conn.contains("Extra={{x};"), "{}", conn);
}

#[test]
fn test_unsupported_db_type() {
    let fields = mssql_fields().dbtype("this is not a valid database");
    let error = try_build(&StaticCatalog::new(), fields).expect_err("unsupported");

    assert_eq!(error.kind(), "unsupported_db_type");
    let message = error.to_string();
    assert!(message.contains("must be one of"), "{}", message);
    assert!(message.contains("mssql, mysql, oracle"), "{}", message);
}

#[test]
fn test_redacted_output() {
    let conn = try_build(&StaticCatalog::new(), mssql_fields()).expect("build");

    assert_eq!(conn.get("pwd"), Some("Passw0rd"));
    assert!(conn.redacted().contains("PWD=***;"));
    assert!(!conn.redacted().contains("Passw0rd"));
    assert!(!format!("{:?}", conn).contains("Passw0rd"));
}

#[test]
fn test_connection_string_set_replaces_case_insensitively() {
    let mut conn = ConnectionString::new();
    conn.set_raw("DRIVER", "{d}").set("SERVER", "s").set_raw("driver", "{e}");

    assert_eq!(conn.to_string(), "DRIVER={e};SERVER=s;");
    assert_eq!(conn.pairs().len(), 2);

    conn.set("Driver", "{e}");
    assert_eq!(conn.to_string(), "DRIVER={{e}}};SERVER=s;");
}

#[test]
fn test_braced_password_cannot_add_attributes() {
    let conn = build(&StaticCatalog::new(), mssql_fields().password("{a};DSN=evil;{b}"));

    assert!(conn.ends_with("PWD={{a}};DSN=evil;{b}}};"), "{}", conn);
    let attrs = attributes(&conn);
    assert!(!attrs.iter().any(|(key, _)| key.eq_ignore_ascii_case("DSN")), "{:?}", attrs);
    assert_eq!(
        attrs.last(),
        Some(&("PWD".to_string(), "{a};DSN=evil;{b}".to_string()))
    );
}

#[test]
fn test_braced_password_reaches_driver_intact() {
    let conn = build(&StaticCatalog::new(), mssql_fields().password("{abc;def}"));

    assert!(conn.ends_with("PWD={{abc;def}}};"), "{}", conn);
    assert_eq!(
        attributes(&conn).last(),
        Some(&("PWD".to_string(), "{abc;def}".to_string()))
    );
}

#[test]
fn test_closing_brace_in_value_is_braced() {
    let conn = build(&StaticCatalog::new(), mssql_fields().password("ab}c"));

    assert!(conn.ends_with("PWD={ab}}c};"), "{}", conn);
    assert_eq!(
        attributes(&conn).last(),
        Some(&("PWD".to_string(), "ab}c".to_string()))
    );
}

#[test]
fn test_driver_name_is_braced_once() {
    let fields = ConnectionFields::new()
        .dsn("some_server")
        .driver("{FreeTDS}")
        .username("root")
        .password("root");
    assert_eq!(
        build(&StaticCatalog::new(), fields),
        "DSN=some_server;DRIVER={FreeTDS};UID=root;PWD=root;"
    );
}
