//! AST types for the element filter language.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::mapdata::{Element, ElementKind};

use super::error::ParseError;
use super::eval::evaluate_expr;
use super::parser::parse_filter;

/// Numeric comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt, // >
    Ge, // >=
    Lt, // <
    Le, // <=
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
        }
    }
}

/// A single node of the boolean filter expression.
///
/// The tree is immutable once built; each parent exclusively owns its
/// children, so a compiled filter can be shared across threads and evaluated
/// concurrently without locking.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `key` — the tag is present, any value.
    KeyExists { key: String },

    /// `!key` — the tag is absent.
    KeyMissing { key: String },

    /// `key = value` — the tag is present with exactly this value.
    ValueEquals { key: String, value: String },

    /// `key != value` — also satisfied when the tag is absent.
    ValueNotEquals { key: String, value: String },

    /// `key ~ a|b|c` — the value equals one of the literal alternatives.
    ValueAnyOf { key: String, values: Vec<String> },

    /// `key !~ a|b|c` — absent, or the value equals none of the alternatives.
    ValueNoneOf { key: String, values: Vec<String> },

    /// `key > n` and friends. Absent keys and non-numeric values never match.
    Compare {
        key: String,
        op: CompareOp,
        value: f64,
    },

    /// Boolean AND, short-circuiting left to right.
    And(Vec<Expr>),

    /// Boolean OR, short-circuiting left to right.
    Or(Vec<Expr>),

    /// Boolean NOT.
    Not(Box<Expr>),
}

impl Expr {
    /// Flatten nested And/Or produced by parenthesized same-operator groups.
    pub fn simplify(self) -> Self {
        match self {
            Expr::And(exprs) => {
                let mut flat = Vec::new();
                for expr in exprs {
                    match expr.simplify() {
                        Expr::And(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                match flat.len() {
                    1 => flat.pop().unwrap(),
                    _ => Expr::And(flat),
                }
            }
            Expr::Or(exprs) => {
                let mut flat = Vec::new();
                for expr in exprs {
                    match expr.simplify() {
                        Expr::Or(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                match flat.len() {
                    1 => flat.pop().unwrap(),
                    _ => Expr::Or(flat),
                }
            }
            Expr::Not(inner) => Expr::Not(Box::new(inner.simplify())),
            other => other,
        }
    }
}

impl fmt::Display for Expr {
    /// Canonical rendering. Parsing the rendered text yields a filter with
    /// the same evaluate results on every tag set.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::KeyExists { key } => write!(f, "{}", quote(key)),
            Expr::KeyMissing { key } => write!(f, "!{}", quote(key)),
            Expr::ValueEquals { key, value } => write!(f, "{} = {}", quote(key), quote(value)),
            Expr::ValueNotEquals { key, value } => write!(f, "{} != {}", quote(key), quote(value)),
            Expr::ValueAnyOf { key, values } => write!(f, "{} ~ {}", quote(key), alts(values)),
            Expr::ValueNoneOf { key, values } => write!(f, "{} !~ {}", quote(key), alts(values)),
            Expr::Compare { key, op, value } => write!(f, "{} {} {}", quote(key), op, value),
            Expr::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    // Or binds looser and needs parentheses inside an And
                    if matches!(child, Expr::Or(_)) {
                        write!(f, "({child})")?;
                    } else {
                        write!(f, "{child}")?;
                    }
                }
                Ok(())
            }
            Expr::Or(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{child}")?;
                }
                Ok(())
            }
            Expr::Not(inner) => {
                if matches!(**inner, Expr::And(_) | Expr::Or(_) | Expr::Not(_)) {
                    write!(f, "not ({inner})")
                } else {
                    write!(f, "not {inner}")
                }
            }
        }
    }
}

/// Quote a key or value unless it lexes as a bare identifier.
fn quote(s: &str) -> Cow<'_, str> {
    if is_bare(s) {
        return Cow::Borrowed(s);
    }
    if s.contains('"') {
        Cow::Owned(format!("'{s}'"))
    } else {
        Cow::Owned(format!("\"{s}\""))
    }
}

fn is_bare(s: &str) -> bool {
    if matches!(s, "" | "and" | "or" | "not" | "with") {
        return false;
    }
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}

fn alts(values: &[String]) -> String {
    values
        .iter()
        .map(|v| quote(v).into_owned())
        .collect::<Vec<_>>()
        .join("|")
}

/// Which element kinds a filter applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElementKinds {
    pub nodes: bool,
    pub ways: bool,
    pub relations: bool,
}

impl ElementKinds {
    pub fn contains(self, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Node => self.nodes,
            ElementKind::Way => self.ways,
            ElementKind::Relation => self.relations,
        }
    }

    /// Add a kind; returns false if it was already present.
    pub fn insert(&mut self, kind: ElementKind) -> bool {
        let slot = match kind {
            ElementKind::Node => &mut self.nodes,
            ElementKind::Way => &mut self.ways,
            ElementKind::Relation => &mut self.relations,
        };
        if *slot {
            false
        } else {
            *slot = true;
            true
        }
    }

    pub fn is_empty(self) -> bool {
        !(self.nodes || self.ways || self.relations)
    }
}

impl fmt::Display for ElementKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::with_capacity(3);
        if self.nodes {
            names.push("nodes");
        }
        if self.ways {
            names.push("ways");
        }
        if self.relations {
            names.push("relations");
        }
        write!(f, "{}", names.join(", "))
    }
}

/// A parsed, immutable element filter: the kinds it applies to plus an
/// optional boolean expression over the element's tags.
///
/// Created once per query string and reused across arbitrarily many
/// [`matches`](ElementFilter::matches) calls; never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementFilter {
    kinds: ElementKinds,
    root: Option<Expr>,
}

impl ElementFilter {
    pub fn new(kinds: ElementKinds, root: Option<Expr>) -> Self {
        ElementFilter { kinds, root }
    }

    pub fn kinds(&self) -> ElementKinds {
        self.kinds
    }

    pub fn expr(&self) -> Option<&Expr> {
        self.root.as_ref()
    }

    /// Whether the element's kind is selected and its tags satisfy the
    /// expression. Never fails, whatever the tag set contains.
    pub fn matches(&self, element: &Element) -> bool {
        self.kinds.contains(element.kind)
            && self
                .root
                .as_ref()
                .is_none_or(|expr| evaluate_expr(expr, &element.tags))
    }

    /// Overpass `if:` evaluator fragment equivalent to the expression part,
    /// or None for a filter with no `with` clause. See [`crate::overpass`].
    pub fn to_overpass_string(&self) -> Option<String> {
        self.root.as_ref().map(crate::overpass::emit_expr)
    }
}

impl FromStr for ElementFilter {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        parse_filter(input)
    }
}

impl fmt::Display for ElementFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kinds)?;
        if let Some(root) = &self.root {
            write!(f, " with {root}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_renders_canonically() {
        let expr = Expr::Compare {
            key: "width".into(),
            op: CompareOp::Gt,
            value: 3.5,
        };
        assert_eq!(expr.to_string(), "width > 3.5");
    }

    #[test]
    fn integral_threshold_renders_without_fraction() {
        let expr = Expr::Compare {
            key: "lanes".into(),
            op: CompareOp::Ge,
            value: 2.0,
        };
        assert_eq!(expr.to_string(), "lanes >= 2");
    }

    #[test]
    fn or_inside_and_is_parenthesized() {
        let expr = Expr::And(vec![
            Expr::Or(vec![
                Expr::KeyExists { key: "a".into() },
                Expr::KeyExists { key: "b".into() },
            ]),
            Expr::KeyExists { key: "c".into() },
        ]);
        assert_eq!(expr.to_string(), "(a or b) and c");
    }

    #[test]
    fn not_parenthesizes_composites_only() {
        let leaf = Expr::Not(Box::new(Expr::KeyExists { key: "a".into() }));
        assert_eq!(leaf.to_string(), "not a");

        let composite = Expr::Not(Box::new(Expr::And(vec![
            Expr::KeyExists { key: "a".into() },
            Expr::KeyExists { key: "b".into() },
        ])));
        assert_eq!(composite.to_string(), "not (a and b)");
    }

    #[test]
    fn values_needing_quotes_are_quoted() {
        let expr = Expr::ValueEquals {
            key: "name".into(),
            value: "Main Street".into(),
        };
        assert_eq!(expr.to_string(), "name = \"Main Street\"");

        let numeric_text = Expr::ValueEquals {
            key: "width".into(),
            value: "3.5".into(),
        };
        assert_eq!(numeric_text.to_string(), "width = \"3.5\"");
    }

    #[test]
    fn simplify_flattens_nested_groups() {
        let expr = Expr::And(vec![
            Expr::And(vec![
                Expr::KeyExists { key: "a".into() },
                Expr::KeyExists { key: "b".into() },
            ]),
            Expr::KeyExists { key: "c".into() },
        ]);
        assert_eq!(
            expr.simplify(),
            Expr::And(vec![
                Expr::KeyExists { key: "a".into() },
                Expr::KeyExists { key: "b".into() },
                Expr::KeyExists { key: "c".into() },
            ])
        );
    }

    #[test]
    fn kind_set_display_uses_fixed_order() {
        let mut kinds = ElementKinds::default();
        kinds.insert(ElementKind::Relation);
        kinds.insert(ElementKind::Node);
        assert_eq!(kinds.to_string(), "nodes, relations");
        assert!(!kinds.insert(ElementKind::Node));
    }
}
