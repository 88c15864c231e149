//! MSBuild condition parser and evaluator.
//!
//! Parses and evaluates the `Condition` attributes found on
//! `<PropertyGroup>`, `<ItemGroup>` and individual property/item elements
//! of `.csproj` / `.fsproj` files, for example:
//!
//! - `'$(Configuration)|$(Platform)'=='Debug|AnyCPU'`
//! - `'$(Configuration)|$(TargetFramework)|$(Platform)'=='Release|net45|AnyCPU'`
//! - `'$(TargetFramework)' == 'netstandard2.0'`
//! - `'$(OS)' != 'Windows_NT' and Exists('$(SolutionDir)build.props')`
//!
//! Uses [`chumsky`] for the parsing grammar. Comparisons and variable
//! lookups are case-insensitive, as they are in MSBuild itself.
//!
//! ## Grammar (case-insensitive keywords)
//!
//! ```text
//! expr       = or_expr
//! or_expr    = and_expr ('or' and_expr)*
//! and_expr   = unary ('and' unary)*
//! unary      = '!' unary | atom
//! atom       = comparison | function | '(' expr ')'
//! comparison = value op value
//! op         = '==' | '!=' | '<=' | '>=' | '<' | '>'
//! function   = name '(' quoted ')'
//! value      = quoted | '$(' name ')' | word
//! quoted     = "'" chars "'"
//! ```

use chumsky::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════════════
//  AST
// ═══════════════════════════════════════════════════════════════════════════════

/// A parsed MSBuild condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// `'lhs' op 'rhs'`.
    Compare {
        lhs: Vec<ExprValue>,
        op: CompareOp,
        rhs: Vec<ExprValue>,
    },
    /// `Name('argument')`, e.g. `Exists(...)` or `HasTrailingSlash(...)`.
    Function {
        name: String,
        argument: Vec<ExprValue>,
    },
    /// `!expr`.
    Not(Box<Expression>),
    /// `a and b` (case-insensitive keyword).
    And(Box<Expression>, Box<Expression>),
    /// `a or b` (case-insensitive keyword).
    Or(Box<Expression>, Box<Expression>),
}

/// Comparison operator used inside an [`Expression::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

/// A fragment of a string value that may contain `$(Variable)` references.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    /// Literal text (no variable expansion needed).
    Literal(String),
    /// A `$(VarName)` reference that will be expanded during evaluation.
    Variable(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
//  String-part splitting
// ═══════════════════════════════════════════════════════════════════════════════

/// Split the raw text between single quotes into [`ExprValue`] fragments.
///
/// `$(VarName)` sequences become [`ExprValue::Variable`]; everything else
/// becomes [`ExprValue::Literal`].
fn parse_string_parts(s: &str) -> Vec<ExprValue> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'(') {
            if !literal.is_empty() {
                parts.push(ExprValue::Literal(std::mem::take(&mut literal)));
            }
            chars.next(); // consume '('
            let var_name: String = chars.by_ref().take_while(|&ch| ch != ')').collect();
            parts.push(ExprValue::Variable(var_name.trim().to_string()));
        } else {
            literal.push(c);
        }
    }

    if !literal.is_empty() {
        parts.push(ExprValue::Literal(literal));
    }

    parts
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Chumsky parser
// ═══════════════════════════════════════════════════════════════════════════════

/// Build the chumsky parser for MSBuild condition expressions.
fn condition_parser<'a>() -> impl Parser<'a, &'a str, Expression, extra::Err<Simple<'a, char>>> {
    recursive(|expr| {
        // ── Single-quoted string value ───────────────────────────────────
        let quoted = just('\'')
            .ignore_then(none_of('\'').repeated().to_slice())
            .then_ignore(just('\''))
            .map(parse_string_parts);

        // ── Unquoted $(Var) reference ────────────────────────────────────
        let variable = just("$(")
            .ignore_then(none_of(')').repeated().to_slice())
            .then_ignore(just(')'))
            .map(|name: &str| vec![ExprValue::Variable(name.trim().to_string())]);

        // ── Bare word (e.g. `true`, `4.5`) ───────────────────────────────
        let word = any()
            .filter(|c: &char| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .repeated()
            .at_least(1)
            .to_slice()
            .map(|s: &str| vec![ExprValue::Literal(s.to_string())]);

        let value = choice((quoted.clone(), variable, word));

        // ── Comparison operators ─────────────────────────────────────────
        let cmp_op = choice((
            just("==").to(CompareOp::Equal),
            just("!=").to(CompareOp::NotEqual),
            just("<=").to(CompareOp::LessOrEqual),
            just(">=").to(CompareOp::GreaterOrEqual),
            just("<").to(CompareOp::Less),
            just(">").to(CompareOp::Greater),
        ));

        // ── Comparison:  lhs op rhs ─────────────────────────────────────
        let comparison = value
            .clone()
            .padded()
            .then(cmp_op.padded())
            .then(value.padded())
            .map(|((lhs, op), rhs)| Expression::Compare { lhs, op, rhs });

        // ── Case-insensitive alphabetic word (for keyword matching) ──────
        let alpha_word = any()
            .filter(|c: &char| c.is_ascii_alphabetic())
            .repeated()
            .at_least(1)
            .to_slice();

        // ── Name('argument') ─────────────────────────────────────────────
        let function = alpha_word
            .then_ignore(just('(').padded())
            .then(quoted)
            .then_ignore(just(')').padded())
            .map(|(name, argument): (&str, _)| Expression::Function {
                name: name.to_string(),
                argument,
            });

        // ── Parenthesized expression ─────────────────────────────────────
        let paren_expr = expr.delimited_by(just('(').padded(), just(')').padded());

        // ── Atom ─────────────────────────────────────────────────────────
        let atom = choice((comparison, function, paren_expr)).padded();

        // ── '!' prefix ───────────────────────────────────────────────────
        let unary = just('!')
            .padded()
            .repeated()
            .foldr(atom, |_, e| Expression::Not(Box::new(e)));

        // ── 'and': binds tighter than 'or' ───────────────────────────
        let and_kw = alpha_word
            .filter(|s: &&str| s.eq_ignore_ascii_case("and"))
            .padded();

        let and_expr = unary.clone().foldl(
            and_kw.ignore_then(unary).repeated(),
            |lhs, rhs| Expression::And(Box::new(lhs), Box::new(rhs)),
        );

        // ── 'or': lowest precedence ──────────────────────────────────────
        let or_kw = alpha_word
            .filter(|s: &&str| s.eq_ignore_ascii_case("or"))
            .padded();

        and_expr.clone().foldl(
            or_kw.ignore_then(and_expr).repeated(),
            |lhs, rhs| Expression::Or(Box::new(lhs), Box::new(rhs)),
        )
    })
}

/// Parse a condition attribute string into an [`Expression`] AST.
pub fn parse_condition(input: &str) -> Result<Expression, String> {
    condition_parser()
        .parse(input)
        .into_result()
        .map_err(|errs| {
            let messages: Vec<String> = errs.iter().map(|e| format!("{e}")).collect();
            format!(
                "Failed to parse condition '{}': {}",
                input,
                messages.join("; ")
            )
        })
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Evaluation
// ═══════════════════════════════════════════════════════════════════════════════

/// Look up an MSBuild property by name, ignoring ASCII case.
pub fn lookup<'v>(vars: &'v HashMap<String, String>, name: &str) -> Option<&'v str> {
    vars.get(name)
        .or_else(|| {
            vars.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
}

/// Set `name` to `value`, replacing any entry whose name differs only in
/// case.
pub fn bind(vars: &mut HashMap<String, String>, name: &str, value: impl Into<String>) {
    vars.retain(|k, _| !k.eq_ignore_ascii_case(name));
    vars.insert(name.to_string(), value.into());
}

/// Expand `$(Var)` references in a parsed string expression.
/// Unknown variables expand to the empty string.
fn expand_string(parts: &[ExprValue], vars: &HashMap<String, String>) -> String {
    parts
        .iter()
        .map(|part| match part {
            ExprValue::Literal(s) => s.as_str(),
            ExprValue::Variable(name) => lookup(vars, name).unwrap_or_default(),
        })
        .collect()
}

/// Numeric view of a comparison operand, segment by segment (`4.7.2` →
/// `[4, 7, 2]`). A leading `v` (as in `v4.5`) is ignored.
fn as_version(s: &str) -> Option<Vec<u64>> {
    let s = s.trim();
    let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
    if s.is_empty() {
        return None;
    }
    s.split('.').map(|segment| segment.parse().ok()).collect()
}

/// Compare versions segment by segment; missing segments count as zero.
fn compare_versions(l: &[u64], r: &[u64]) -> Ordering {
    (0..l.len().max(r.len()))
        .map(|i| {
            let a = l.get(i).copied().unwrap_or(0);
            let b = r.get(i).copied().unwrap_or(0);
            a.cmp(&b)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare(l: &str, op: CompareOp, r: &str) -> bool {
    let numeric = |accept: fn(Ordering) -> bool| match (as_version(l), as_version(r)) {
        (Some(l), Some(r)) => accept(compare_versions(&l, &r)),
        _ => false,
    };
    match op {
        CompareOp::Equal => l.eq_ignore_ascii_case(r),
        CompareOp::NotEqual => !l.eq_ignore_ascii_case(r),
        CompareOp::Less => numeric(Ordering::is_lt),
        CompareOp::LessOrEqual => numeric(Ordering::is_le),
        CompareOp::Greater => numeric(Ordering::is_gt),
        CompareOp::GreaterOrEqual => numeric(Ordering::is_ge),
    }
}

/// Evaluate a condition expression against a set of variable bindings.
///
/// `Exists(…)` always evaluates to `true`; filesystem checks are not
/// performed. Unknown functions evaluate to `false`.
pub fn evaluate(expr: &Expression, vars: &HashMap<String, String>) -> bool {
    match expr {
        Expression::Compare { lhs, op, rhs } => {
            let l = expand_string(lhs, vars);
            let r = expand_string(rhs, vars);
            compare(&l, *op, &r)
        }
        Expression::Function { name, argument } => {
            if name.eq_ignore_ascii_case("exists") {
                true
            } else if name.eq_ignore_ascii_case("hastrailingslash") {
                let arg = expand_string(argument, vars);
                arg.ends_with('/') || arg.ends_with('\\')
            } else {
                false
            }
        }
        Expression::Not(e) => !evaluate(e, vars),
        Expression::And(a, b) => evaluate(a, vars) && evaluate(b, vars),
        Expression::Or(a, b) => evaluate(a, vars) || evaluate(b, vars),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Inspection
// ═══════════════════════════════════════════════════════════════════════════════

impl Expression {
    /// Distinct `$(Var)` names referenced anywhere in the expression, in
    /// first-seen order. Used to rank how specific a matching condition is.
    pub fn variables(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        self.visit_variables(&mut |name| {
            if !out.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                out.push(name);
            }
        });
        out
    }

    fn visit_variables<'e>(&'e self, f: &mut impl FnMut(&'e str)) {
        match self {
            Expression::Compare { lhs, rhs, .. } => {
                visit_parts(lhs, f);
                visit_parts(rhs, f);
            }
            Expression::Function { argument, .. } => visit_parts(argument, f),
            Expression::Not(e) => e.visit_variables(f),
            Expression::And(a, b) | Expression::Or(a, b) => {
                a.visit_variables(f);
                b.visit_variables(f);
            }
        }
    }

    /// The literal value this condition requires `variable` to equal, if
    /// any.
    ///
    /// Handles both plain comparisons (`'$(TargetFramework)'=='net45'`) and
    /// pipe-joined tuples (`'$(Configuration)|$(TargetFramework)'=='Debug|net45'`).
    /// Comparisons under `or` or `!` are ambiguous and yield `None`.
    pub fn bound_value(&self, variable: &str) -> Option<String> {
        match self {
            Expression::Compare { lhs, op: CompareOp::Equal, rhs } => {
                tuple_binding(lhs, rhs, variable).or_else(|| tuple_binding(rhs, lhs, variable))
            }
            Expression::And(a, b) => a.bound_value(variable).or_else(|| b.bound_value(variable)),
            _ => None,
        }
    }
}

fn visit_parts<'e>(values: &'e [ExprValue], f: &mut impl FnMut(&'e str)) {
    for v in values {
        if let ExprValue::Variable(name) = v {
            f(name);
        }
    }
}

/// Split a value into `|`-separated segments, keeping variable references
/// intact.
fn pipe_segments(parts: &[ExprValue]) -> Vec<Vec<ExprValue>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for part in parts {
        match part {
            ExprValue::Variable(_) => current.push(part.clone()),
            ExprValue::Literal(text) => {
                let mut pieces = text.split('|');
                if let Some(first) = pieces.next().filter(|p| !p.is_empty()) {
                    current.push(ExprValue::Literal(first.to_string()));
                }
                for piece in pieces {
                    segments.push(std::mem::take(&mut current));
                    if !piece.is_empty() {
                        current.push(ExprValue::Literal(piece.to_string()));
                    }
                }
            }
        }
    }
    segments.push(current);
    segments
}

fn tuple_binding(pattern: &[ExprValue], values: &[ExprValue], variable: &str) -> Option<String> {
    if values.iter().any(|v| matches!(v, ExprValue::Variable(_))) {
        return None;
    }
    let keys = pipe_segments(pattern);
    let literal = expand_string(values, &HashMap::new());
    let values: Vec<&str> = literal.split('|').collect();
    if keys.len() != values.len() {
        return None;
    }
    keys.iter().zip(values).find_map(|(key, value)| match key.as_slice() {
        [ExprValue::Variable(name)] if name.eq_ignore_ascii_case(variable) => {
            Some(value.trim().to_string())
        }
        _ => None,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    // ── String-part splitting ────────────────────────────────────────────

    #[test]
    fn string_parts_literal_only() {
        assert_eq!(
            parse_string_parts("Debug|AnyCPU"),
            vec![ExprValue::Literal("Debug|AnyCPU".into())]
        );
    }

    #[test]
    fn string_parts_mixed() {
        assert_eq!(
            parse_string_parts("$(Configuration)|$(Platform)"),
            vec![
                ExprValue::Variable("Configuration".into()),
                ExprValue::Literal("|".into()),
                ExprValue::Variable("Platform".into()),
            ]
        );
    }

    #[test]
    fn string_parts_empty() {
        assert_eq!(parse_string_parts(""), Vec::<ExprValue>::new());
    }

    // ── Condition parsing ────────────────────────────────────────────────

    #[test]
    fn parse_configuration_platform_pair() {
        let expr = parse_condition(" '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ").unwrap();
        assert_eq!(
            expr,
            Expression::Compare {
                lhs: vec![
                    ExprValue::Variable("Configuration".into()),
                    ExprValue::Literal("|".into()),
                    ExprValue::Variable("Platform".into()),
                ],
                op: CompareOp::Equal,
                rhs: vec![ExprValue::Literal("Debug|AnyCPU".into())],
            }
        );
    }

    #[test]
    fn parse_unquoted_operands() {
        let expr = parse_condition("$(SignAssembly) == true").unwrap();
        assert_eq!(
            expr,
            Expression::Compare {
                lhs: vec![ExprValue::Variable("SignAssembly".into())],
                op: CompareOp::Equal,
                rhs: vec![ExprValue::Literal("true".into())],
            }
        );
    }

    #[test]
    fn parse_negated_function() {
        let expr = parse_condition("!Exists('packages.config')").unwrap();
        match expr {
            Expression::Not(inner) => {
                assert!(matches!(*inner, Expression::Function { ref name, .. } if name == "Exists"))
            }
            other => panic!("expected Not, got {other:?}"),
        }
    }

    #[test]
    fn parse_parenthesized_and_or() {
        let input = "('$(TargetFramework)'=='net45' and '$(OS)'=='Windows_NT') or '$(Force)'!=''";
        let expr = parse_condition(input).unwrap();
        match &expr {
            Expression::Or(lhs, _) => assert!(matches!(lhs.as_ref(), Expression::And(_, _))),
            other => panic!("expected Or(And(..), ..), got {other:?}"),
        }
    }

    #[test]
    fn parse_version_comparison() {
        let expr = parse_condition("'$(TargetFrameworkVersion)' >= 'v4.0'").unwrap();
        assert!(matches!(expr, Expression::Compare { op: CompareOp::GreaterOrEqual, .. }));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_condition("'$(Configuration)' ==").is_err());
    }

    // ── Evaluation ───────────────────────────────────────────────────────

    fn make_vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn eval_is_case_insensitive() {
        let expr = parse_condition("'$(Configuration)|$(Platform)'=='Debug|AnyCPU'").unwrap();
        let vars = make_vars(&[("configuration", "DEBUG"), ("Platform", "anycpu")]);
        assert!(evaluate(&expr, &vars));
    }

    #[test]
    fn bind_replaces_case_variants() {
        let mut vars = make_vars(&[("PLATFORM", "x86")]);
        bind(&mut vars, "Platform", "AnyCPU");
        assert_eq!(vars.len(), 1);
        assert_eq!(lookup(&vars, "platform"), Some("AnyCPU"));
    }

    #[test]
    fn eval_platform_mismatch() {
        let expr = parse_condition("'$(Configuration)|$(Platform)'=='Debug|x86'").unwrap();
        let vars = make_vars(&[("Configuration", "Debug"), ("Platform", "AnyCPU")]);
        assert!(!evaluate(&expr, &vars));
    }

    #[test]
    fn eval_unknown_variable_is_empty() {
        let expr = parse_condition("'$(Configuration)' == ''").unwrap();
        assert!(evaluate(&expr, &HashMap::new()));
    }

    #[test]
    fn eval_not_and_or() {
        let expr = parse_condition("!('$(A)'=='1' and '$(B)'=='2') or '$(C)'=='3'").unwrap();
        assert!(evaluate(&expr, &make_vars(&[("A", "1"), ("B", "x")])));
        assert!(!evaluate(&expr, &make_vars(&[("A", "1"), ("B", "2")])));
        assert!(evaluate(&expr, &make_vars(&[("A", "1"), ("B", "2"), ("C", "3")])));
    }

    #[test]
    fn eval_version_comparison() {
        let expr = parse_condition("'$(TargetFrameworkVersion)' >= 'v4.5'").unwrap();
        assert!(evaluate(&expr, &make_vars(&[("TargetFrameworkVersion", "v4.7.2")])));
        assert!(!evaluate(&expr, &make_vars(&[("TargetFrameworkVersion", "v4.0")])));
        assert!(!evaluate(&expr, &make_vars(&[("TargetFrameworkVersion", "")])));
    }

    #[test]
    fn eval_versions_compare_per_segment() {
        let expr = parse_condition("'$(TargetFrameworkVersion)' > 'v4.9'").unwrap();
        assert!(evaluate(&expr, &make_vars(&[("TargetFrameworkVersion", "v4.10")])));
        assert!(!evaluate(&expr, &make_vars(&[("TargetFrameworkVersion", "v4.9.0")])));

        let expr = parse_condition("'$(LangVersion)' <= '7'").unwrap();
        assert!(evaluate(&expr, &make_vars(&[("LangVersion", "7.0")])));
        assert!(!evaluate(&expr, &make_vars(&[("LangVersion", "latest")])));
    }

    #[test]
    fn eval_functions() {
        let vars = make_vars(&[("OutDir", "bin\\")]);
        assert!(evaluate(&parse_condition("Exists('nope.props')").unwrap(), &vars));
        assert!(evaluate(&parse_condition("HasTrailingSlash('$(OutDir)')").unwrap(), &vars));
        assert!(!evaluate(&parse_condition("Unknown('x')").unwrap(), &vars));
    }

    // ── Inspection ───────────────────────────────────────────────────────

    #[test]
    fn variables_are_distinct() {
        let expr = parse_condition(
            "'$(Configuration)|$(TargetFramework)|$(Platform)'=='Release|net45|AnyCPU' and '$(configuration)'!=''",
        )
        .unwrap();
        assert_eq!(expr.variables(), vec!["Configuration", "TargetFramework", "Platform"]);
    }

    #[test]
    fn bound_value_simple() {
        let expr = parse_condition(" '$(TargetFramework)' == 'net451' ").unwrap();
        assert_eq!(expr.bound_value("TargetFramework").as_deref(), Some("net451"));
        assert_eq!(expr.bound_value("Configuration"), None);
    }

    #[test]
    fn bound_value_from_tuple() {
        let expr =
            parse_condition("'$(Configuration)|$(TargetFramework)'=='Debug|netstandard1.6'").unwrap();
        assert_eq!(expr.bound_value("targetframework").as_deref(), Some("netstandard1.6"));
        assert_eq!(expr.bound_value("Configuration").as_deref(), Some("Debug"));
    }

    #[test]
    fn bound_value_ignores_inequality_and_or() {
        let ne = parse_condition("'$(TargetFramework)' != 'net45'").unwrap();
        assert_eq!(ne.bound_value("TargetFramework"), None);
        let or = parse_condition("'$(TargetFramework)'=='net45' or '$(TargetFramework)'=='net46'").unwrap();
        assert_eq!(or.bound_value("TargetFramework"), None);
    }

    // ── Parse conditions seen in real project files ──────────────────────

    #[test]
    fn parse_all_real_conditions() {
        let conditions = [
            " '$(Configuration)' == '' ",
            " '$(Platform)' == '' ",
            " '$(Configuration)|$(Platform)' == 'Debug|AnyCPU' ",
            "'$(Configuration)|$(Platform)'=='Release|x86'",
            "'$(Configuration)|$(TargetFramework)|$(Platform)'=='Debug|netcoreapp2.0|AnyCPU'",
            "'$(TargetFramework)' == 'net451'",
            "'$(TargetFramework)'=='netstandard1.6'",
            "'$(VisualStudioVersion)' == '' or '$(VisualStudioVersion)' < '10.0'",
            "Exists('$(MSBuildExtensionsPath)\\$(MSBuildToolsVersion)\\Microsoft.Common.props')",
            "'$(OS)' != 'Windows_NT'",
        ];

        for cond in &conditions {
            let result = parse_condition(cond);
            assert!(
                result.is_ok(),
                "Failed to parse condition: {cond}\n  Error: {}",
                result.unwrap_err()
            );
        }
    }

    #[test]
    fn property_functions_are_not_supported() {
        assert!(parse_condition("$(TargetFramework.StartsWith('net4'))").is_err());
    }
}
