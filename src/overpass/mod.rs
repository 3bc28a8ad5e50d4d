//! Overpass QL prefilter fragments.
//!
//! Renders a filter's boolean tree as an Overpass `if:` evaluator
//! expression so candidate elements can be narrowed down server-side before
//! the local [`matches`](crate::ElementFilter::matches) re-check. The caller
//! wraps the fragment in its own `(if: ...)` clause together with its
//! bounding-box and element-kind selection.
//!
//! The fragment never rejects an element the local filter accepts; numeric
//! coercion on the server may be marginally more permissive, which is fine
//! since the local re-check stays authoritative.

use crate::elementfilter::{CompareOp, Expr};

/// Render an expression as an Overpass `if:` evaluator fragment.
pub fn emit_expr(expr: &Expr) -> String {
    match expr {
        Expr::KeyExists { key } => format!("is_tag({})", quote(key)),

        Expr::KeyMissing { key } => format!("!is_tag({})", quote(key)),

        Expr::ValueEquals { key, value } => format!("t[{}] == {}", quote(key), quote(value)),

        // An absent tag reads as "" on the server, satisfying != just like
        // the local predicate does
        Expr::ValueNotEquals { key, value } => format!("t[{}] != {}", quote(key), quote(value)),

        Expr::ValueAnyOf { key, values } => {
            let clauses: Vec<String> = values
                .iter()
                .map(|v| format!("t[{}] == {}", quote(key), quote(v)))
                .collect();
            format!("({})", clauses.join(" || "))
        }

        Expr::ValueNoneOf { key, values } => {
            let clauses: Vec<String> = values
                .iter()
                .map(|v| format!("t[{}] != {}", quote(key), quote(v)))
                .collect();
            format!("({})", clauses.join(" && "))
        }

        Expr::Compare { key, op, value } => {
            format!("number(t[{}]) {} {}", quote(key), overpass_op(*op), value)
        }

        Expr::And(children) => children
            .iter()
            .map(|child| match child {
                // || binds looser than && in the evaluator language
                Expr::Or(_) => format!("({})", emit_expr(child)),
                _ => emit_expr(child),
            })
            .collect::<Vec<_>>()
            .join(" && "),

        Expr::Or(children) => children
            .iter()
            .map(emit_expr)
            .collect::<Vec<_>>()
            .join(" || "),

        Expr::Not(inner) => format!("!({})", emit_expr(inner)),
    }
}

fn overpass_op(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Gt => ">",
        CompareOp::Ge => ">=",
        CompareOp::Lt => "<",
        CompareOp::Le => "<=",
    }
}

/// Quote and escape a literal for embedding in an Overpass expression.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementfilter::parse_filter;

    fn fragment(input: &str) -> String {
        parse_filter(input).unwrap().to_overpass_string().unwrap()
    }

    #[test]
    fn existence_predicates() {
        assert_eq!(fragment("ways with surface"), "is_tag(\"surface\")");
        assert_eq!(
            fragment("ways with !surface:note"),
            "!is_tag(\"surface:note\")"
        );
    }

    #[test]
    fn equality_predicates() {
        assert_eq!(
            fragment("ways with surface = paved"),
            "t[\"surface\"] == \"paved\""
        );
        assert_eq!(
            fragment("ways with access != private"),
            "t[\"access\"] != \"private\""
        );
    }

    #[test]
    fn alternation_predicates() {
        assert_eq!(
            fragment("ways with surface ~ paved|unpaved"),
            "(t[\"surface\"] == \"paved\" || t[\"surface\"] == \"unpaved\")"
        );
        assert_eq!(
            fragment("ways with access !~ private|no"),
            "(t[\"access\"] != \"private\" && t[\"access\"] != \"no\")"
        );
    }

    #[test]
    fn numeric_comparison() {
        assert_eq!(
            fragment("ways with width > 3.5"),
            "number(t[\"width\"]) > 3.5"
        );
    }

    #[test]
    fn combinators_with_precedence() {
        assert_eq!(
            fragment("ways with surface = paved and (lit = yes or lit = no)"),
            "t[\"surface\"] == \"paved\" && (t[\"lit\"] == \"yes\" || t[\"lit\"] == \"no\")"
        );
        assert_eq!(
            fragment("ways with not (surface and lit)"),
            "!(is_tag(\"surface\") && is_tag(\"lit\"))"
        );
    }

    #[test]
    fn literals_are_escaped() {
        assert_eq!(
            fragment(r#"nodes with name = 'say "hi"'"#),
            r#"t["name"] == "say \"hi\"""#
        );
    }

    #[test]
    fn kind_only_filter_has_no_fragment() {
        let filter = parse_filter("nodes, ways").unwrap();
        assert_eq!(filter.to_overpass_string(), None);
    }
}
