//! Rewrites generic SQL compiler output into the syntax the Calcite engine
//! accepts.
//!
//! Each rewrite is a separate rule with its own precondition so a failing
//! precondition names the rule that rejected the statement.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::sync::OnceLock;

/// A statement-level rewrite over compiled SQL text.
pub trait RewriteRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this rule claims the statement.
    fn matches(&self, sql: &str) -> bool;

    /// Rewrite a claimed statement. Fails when the statement is claimed but
    /// does not have the shape the rule expects.
    fn apply(&self, sql: &str) -> CoreResult<String>;
}

/// `INSERT INTO t (cols) SELECT ...` → `INSERT INTO TABLE t SELECT ...`
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertRule;

/// `char_length(...)` / `character_length(...)` → `length(...)`
#[derive(Debug, Clone, Copy, Default)]
pub struct CharLengthRule;

static DEFAULT_RULES: [&dyn RewriteRule; 2] = [&InsertRule, &CharLengthRule];

fn insert_pattern() -> &'static Regex {
    static INSERT_REGEX: OnceLock<Regex> = OnceLock::new();
    INSERT_REGEX.get_or_init(|| {
        Regex::new(r"^(INSERT INTO) (\S+) \([^)]*\)").expect("insert pattern is valid")
    })
}

fn char_length_pattern() -> &'static Regex {
    static CHAR_LENGTH_REGEX: OnceLock<Regex> = OnceLock::new();
    CHAR_LENGTH_REGEX.get_or_init(|| {
        Regex::new(r"(?i)\b(?:char|character)_length\s*\(").expect("char_length pattern is valid")
    })
}

impl RewriteRule for InsertRule {
    fn name(&self) -> &'static str {
        "insert"
    }

    fn matches(&self, sql: &str) -> bool {
        sql.starts_with("INSERT INTO")
    }

    fn apply(&self, sql: &str) -> CoreResult<String> {
        rewrite_insert(sql)
    }
}

impl RewriteRule for CharLengthRule {
    fn name(&self) -> &'static str {
        "char_length"
    }

    fn matches(&self, sql: &str) -> bool {
        split_quoted(sql)
            .iter()
            .any(|(piece, quoted)| !quoted && char_length_pattern().is_match(piece))
    }

    fn apply(&self, sql: &str) -> CoreResult<String> {
        let mut out = String::with_capacity(sql.len());
        for (piece, quoted) in split_quoted(sql) {
            if quoted {
                out.push_str(piece);
            } else {
                out.push_str(&char_length_pattern().replace_all(piece, "length("));
            }
        }
        Ok(out)
    }
}

/// Split `sql` into `(piece, quoted)` runs. Quoted runs are string literals
/// or quoted identifiers, delimiters included; an unterminated quote runs to
/// the end of the text.
fn split_quoted(sql: &str) -> Vec<(&str, bool)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in sql.char_indices() {
        match quote {
            None if matches!(c, '\'' | '"' | '`') => {
                if start < i {
                    pieces.push((&sql[start..i], false));
                }
                start = i;
                quote = Some(c);
            }
            None => {}
            Some(_) if escaped => escaped = false,
            Some(q) if c == '\\' && q != '`' => escaped = true,
            Some(q) if c == q => {
                let end = i + c.len_utf8();
                pieces.push((&sql[start..end], true));
                start = end;
                quote = None;
            }
            Some(_) => {}
        }
    }
    if start < sql.len() {
        pieces.push((&sql[start..], quote.is_some()));
    }
    pieces
}

/// The rules `rewrite_statement` runs, in order.
pub fn default_rules() -> &'static [&'static dyn RewriteRule] {
    &DEFAULT_RULES
}

/// Rewrite a generically compiled statement with the default rules.
pub fn rewrite_statement(sql: &str) -> CoreResult<String> {
    rewrite_with(sql, default_rules())
}

/// Rewrite with an explicit rule set. Rules that do not claim the statement
/// leave it untouched.
pub fn rewrite_with(sql: &str, rules: &[&dyn RewriteRule]) -> CoreResult<String> {
    let mut current = sql.to_string();
    for rule in rules {
        if rule.matches(&current) {
            current = rule.apply(&current)?;
            tracing::trace!(rule = rule.name(), sql = %current, "rewrite applied");
        }
    }
    Ok(current)
}

/// Drop the column list of a compiled INSERT and add the `TABLE` keyword.
///
/// ```text
/// INSERT INTO `db`.`t` (`a`) SELECT ...  =>  INSERT INTO TABLE `db`.`t` SELECT ...
/// ```
pub fn rewrite_insert(sql: &str) -> CoreResult<String> {
    let re = insert_pattern();
    if !re.is_match(sql) {
        return Err(CoreError::RewriteContract(format!(
            "unexpected INSERT statement: {sql}"
        )));
    }
    Ok(re.replacen(sql, 1, "$1 TABLE $2").into_owned())
}

/// Strip the schema from a `schema.table.column` reference. The engine does
/// not accept schema-qualified column references.
pub fn flatten_column_reference(column: &str) -> CoreResult<String> {
    match column.matches('.').count() {
        0 | 1 => Ok(column.to_string()),
        2 => {
            let (_, rest) = column
                .split_once('.')
                .ok_or_else(|| CoreError::RewriteContract(column.to_string()))?;
            Ok(rest.to_string())
        }
        n => Err(CoreError::RewriteContract(format!(
            "unexpected column reference {column} ({n} dots)"
        ))),
    }
}

pub fn compile_concat(left: &str, right: &str) -> String {
    format!("concat({left}, {right})")
}

pub fn compile_char_length(args: &[&str]) -> String {
    format!("length({})", args.join(", "))
}

/// Quote an identifier with backticks. Every identifier is quoted, reserved
/// or not.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote each dot-separated segment of a qualified name.
pub fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_drops_column_list() {
        let out = rewrite_insert("INSERT INTO default (a, b) SELECT a, b FROM src").unwrap();
        assert_eq!(out, "INSERT INTO TABLE default SELECT a, b FROM src");
    }

    #[test]
    fn insert_with_quoted_target() {
        let out = rewrite_insert("INSERT INTO `db`.`t` (`a`) VALUES (?)").unwrap();
        assert_eq!(out, "INSERT INTO TABLE `db`.`t` VALUES (?)");
    }

    #[test]
    fn insert_rejects_missing_column_list() {
        let err = rewrite_insert("INSERT INTO t VALUES (1)").unwrap_err();
        assert!(matches!(err, CoreError::RewriteContract(_)));
    }

    #[test]
    fn insert_rejects_its_own_output() {
        let once = rewrite_insert("INSERT INTO t (a) SELECT a FROM s").unwrap();
        assert!(rewrite_insert(&once).is_err());
    }

    #[test]
    fn column_flattening() {
        assert_eq!(flatten_column_reference("mycol").unwrap(), "mycol");
        assert_eq!(flatten_column_reference("mytable.mycol").unwrap(), "mytable.mycol");
        assert_eq!(
            flatten_column_reference("myschema.mytable.mycol").unwrap(),
            "mytable.mycol"
        );
        assert!(matches!(
            flatten_column_reference("a.b.c.d"),
            Err(CoreError::RewriteContract(_))
        ));
    }

    #[test]
    fn function_compilation() {
        assert_eq!(compile_concat("a", "'x'"), "concat(a, 'x')");
        assert_eq!(compile_char_length(&["name"]), "length(name)");
    }

    #[test]
    fn char_length_rule() {
        let out = rewrite_statement("SELECT CHAR_LENGTH(name), character_length (x) FROM t").unwrap();
        assert_eq!(out, "SELECT length(name), length(x) FROM t");
    }

    #[test]
    fn char_length_rule_leaves_quoted_text_alone() {
        let sql = "SELECT name FROM t WHERE note = 'char_length(x) is big'";
        assert!(!CharLengthRule.matches(sql));
        assert_eq!(rewrite_statement(sql).unwrap(), sql);

        let out = rewrite_statement(
            "SELECT char_length(`char_length(a)`), 'it''s char_length(' FROM t WHERE b = 'x\\'char_length(y)'",
        )
        .unwrap();
        assert_eq!(
            out,
            "SELECT length(`char_length(a)`), 'it''s char_length(' FROM t WHERE b = 'x\\'char_length(y)'"
        );
    }

    #[test]
    fn split_quoted_runs() {
        assert_eq!(
            split_quoted("a 'b' `c` \"d"),
            vec![
                ("a ", false),
                ("'b'", true),
                (" ", false),
                ("`c`", true),
                (" ", false),
                ("\"d", true),
            ]
        );
    }

    #[test]
    fn unclaimed_statements_pass_through() {
        let sql = "SELECT a FROM t WHERE b = 1";
        assert_eq!(rewrite_statement(sql).unwrap(), sql);
        assert_eq!(rewrite_statement("insert into t values (1)").unwrap(), "insert into t values (1)");
    }

    #[test]
    fn quoting() {
        assert_eq!(quote_identifier("select"), "`select`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
        assert_eq!(quote_qualified("db.tbl"), "`db`.`tbl`");
    }
}
