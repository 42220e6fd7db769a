//! SMT-LIB v2 rendering of a [`ConstraintSet`].
//!
//! The rendered script is the hand-off text for an external solver:
//!
//! ```text
//! (set-logic QF_SLIA)
//! (set-option :produce-models true)
//! (declare-const amount Int)
//! (declare-const password_data String)
//! (assert (> amount 0))
//! (assert (str.contains password_data "uppercase"))
//! (check-sat)
//! (get-model)
//! ```
//!
//! A few clause shapes have no direct SMT-LIB counterpart:
//!
//! - a presence test on `x` reads the boolean flag `x.is_set`, declared
//!   after the variables;
//! - an arithmetic clause holds when its value is non-zero;
//! - booleans order `false` before `true`, strings order lexicographically.

use crate::ast::ArithOp;
use crate::constraint::{ComparisonKind, Constraint, ConstraintSet, PredicateKind, Term, VarType};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Symbols an SMT-LIB front end treats specially. Variables with these
/// names are written as quoted symbols.
const RESERVED: &[&str] = &[
    "_", "!", "as", "let", "exists", "forall", "match", "par", "abs", "distinct", "div", "ite",
    "mod", "xor", "BINARY", "DECIMAL", "HEXADECIMAL", "NUMERAL", "STRING",
];

/// Logic to announce for `set`.
pub fn logic(set: &ConstraintSet) -> &'static str {
    let strings = set.variables.values().any(|ty| *ty == VarType::String);
    let nonlinear = set.clauses.iter().any(|c| is_nonlinear(&c.constraint));
    match (strings, nonlinear) {
        (false, false) => "QF_LIA",
        (true, false) => "QF_SLIA",
        (false, true) => "QF_NIA",
        (true, true) => "ALL",
    }
}

/// Variables a presence test is applied to, sorted.
pub fn presence_subjects(set: &ConstraintSet) -> BTreeSet<&str> {
    let mut subjects = BTreeSet::new();
    for clause in &set.clauses {
        collect_presence(&clause.constraint, &mut subjects);
    }
    subjects
}

fn collect_presence<'a>(constraint: &'a Constraint, out: &mut BTreeSet<&'a str>) {
    match constraint {
        Constraint::Predicate {
            predicate: PredicateKind::IsSet | PredicateKind::IsNotSet,
            subject,
            ..
        } => {
            out.insert(subject);
        }
        Constraint::And { left, right } | Constraint::Or { left, right } => {
            collect_presence(left, out);
            collect_presence(right, out);
        }
        Constraint::Not { operand } => collect_presence(operand, out),
        Constraint::Compare { .. }
        | Constraint::Predicate { .. }
        | Constraint::Arithmetic { .. } => {}
    }
}

/// Products and divisions by a variable leave linear arithmetic.
fn is_nonlinear(constraint: &Constraint) -> bool {
    match constraint {
        Constraint::Arithmetic { op, right, .. } => {
            matches!(op, ArithOp::Mul | ArithOp::Div | ArithOp::Rem)
                && matches!(right, Term::Variable(_))
        }
        Constraint::And { left, right } | Constraint::Or { left, right } => {
            is_nonlinear(left) || is_nonlinear(right)
        }
        Constraint::Not { operand } => is_nonlinear(operand),
        Constraint::Compare { .. } | Constraint::Predicate { .. } => false,
    }
}

fn presence_flag(name: &str) -> String {
    format!("{}.is_set", name)
}

/// Render one clause as a Bool-valued SMT-LIB term.
pub fn formula(constraint: &Constraint, variables: &BTreeMap<String, VarType>) -> String {
    Formula {
        constraint,
        variables,
    }
    .to_string()
}

/// Logic and options, declarations, one assertion per clause, then
/// `(check-sat)`.
impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(set-logic {})", logic(self))?;
        writeln!(f, "(set-option :produce-models true)")?;
        for (name, ty) in &self.variables {
            writeln!(f, "(declare-const {} {})", Symbol(name), ty.sort_name())?;
        }
        for name in presence_subjects(self) {
            writeln!(f, "(declare-const {} Bool)", Symbol(&presence_flag(name)))?;
        }
        for clause in &self.clauses {
            let assertion = Formula {
                constraint: &clause.constraint,
                variables: &self.variables,
            };
            writeln!(f, "(assert {})", assertion)?;
        }
        writeln!(f, "(check-sat)")?;
        writeln!(f, "(get-model)")
    }
}

// ──────────────────────────────────────────────
// Terms
// ──────────────────────────────────────────────

struct Symbol<'a>(&'a str);

impl fmt::Display for Symbol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.0;
        let simple = name
            .chars()
            .next()
            .is_some_and(|c| !c.is_ascii_digit())
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "~!@$%^&*_-+=<>.?/".contains(c));
        if simple && !RESERVED.contains(&name) {
            f.write_str(name)
        } else {
            write!(f, "|{}|", name)
        }
    }
}

struct Value<'a>(&'a Term);

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Term::Variable(name) => write!(f, "{}", Symbol(name)),
            Term::Integer(n) if *n < 0 => write!(f, "(- {})", n.unsigned_abs()),
            Term::Integer(n) => write!(f, "{}", n),
            Term::String(s) => write_string(f, s),
            Term::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// SMT-LIB 2.6 string literal: `""` for a quote, `\u{..}` for anything
/// outside printable ASCII and for the backslash itself.
fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\"\"")?,
            '\\' => f.write_str("\\u{5c}")?,
            ' '..='~' => write!(f, "{}", c)?,
            _ => write!(f, "\\u{{{:x}}}", u32::from(c))?,
        }
    }
    f.write_str("\"")
}

fn arith_symbol(op: ArithOp) -> &'static str {
    match op {
        ArithOp::Add => "+",
        ArithOp::Sub => "-",
        ArithOp::Mul => "*",
        ArithOp::Div => "div",
        ArithOp::Rem => "mod",
    }
}

// ──────────────────────────────────────────────
// Formulas
// ──────────────────────────────────────────────

struct Formula<'a> {
    constraint: &'a Constraint,
    variables: &'a BTreeMap<String, VarType>,
}

impl<'a> Formula<'a> {
    fn sub(&self, constraint: &'a Constraint) -> Formula<'a> {
        Formula {
            constraint,
            variables: self.variables,
        }
    }

    fn relation(
        &self,
        f: &mut fmt::Formatter<'_>,
        relation: ComparisonKind,
        left: &str,
        right: &Term,
    ) -> fmt::Result {
        let (l, r) = (Symbol(left), Value(right));
        let (strict, flipped) = match relation {
            ComparisonKind::Equal => return write!(f, "(= {} {})", l, r),
            ComparisonKind::NotEqual => return write!(f, "(distinct {} {})", l, r),
            ComparisonKind::LessThan => (true, false),
            ComparisonKind::LessOrEqual => (false, false),
            ComparisonKind::GreaterThan => (true, true),
            ComparisonKind::GreaterOrEqual => (false, true),
        };
        let ty = self
            .variables
            .get(left)
            .copied()
            .unwrap_or(VarType::Unconstrained);
        let (lo, hi) = if flipped {
            (&r as &dyn fmt::Display, &l as &dyn fmt::Display)
        } else {
            (&l as &dyn fmt::Display, &r as &dyn fmt::Display)
        };
        match (ty, strict) {
            (VarType::String, true) => write!(f, "(str.< {} {})", lo, hi),
            (VarType::String, false) => write!(f, "(str.<= {} {})", lo, hi),
            (VarType::Boolean, true) => write!(f, "(and (not {}) {})", lo, hi),
            (VarType::Boolean, false) => write!(f, "(=> {} {})", lo, hi),
            (VarType::Integer | VarType::Unconstrained, _) => {
                write!(f, "({} {} {})", relation.symbol(), l, r)
            }
        }
    }
}

impl fmt::Display for Formula<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constraint {
            Constraint::Compare {
                relation,
                left,
                right,
            } => self.relation(f, *relation, left, right),
            Constraint::Predicate {
                predicate,
                subject,
                argument,
            } => {
                let subject = Symbol(subject);
                // An absent substring is the empty string.
                let needle = argument
                    .as_ref()
                    .map_or_else(|| "\"\"".to_owned(), |arg| Value(arg).to_string());
                match predicate {
                    PredicateKind::Contains => {
                        write!(f, "(str.contains {} {})", subject, needle)
                    }
                    PredicateKind::DoesNotContain => {
                        write!(f, "(not (str.contains {} {}))", subject, needle)
                    }
                    PredicateKind::IsSet => write!(f, "{}", Symbol(&presence_flag(subject.0))),
                    PredicateKind::IsNotSet => {
                        write!(f, "(not {})", Symbol(&presence_flag(subject.0)))
                    }
                }
            }
            Constraint::And { left, right } => {
                write!(f, "(and {} {})", self.sub(left), self.sub(right))
            }
            Constraint::Or { left, right } => {
                write!(f, "(or {} {})", self.sub(left), self.sub(right))
            }
            Constraint::Not { operand } => write!(f, "(not {})", self.sub(operand)),
            Constraint::Arithmetic { op, left, right } => write!(
                f,
                "(distinct ({} {} {}) 0)",
                arith_symbol(*op),
                Symbol(left),
                Value(right)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{Clause, ClauseRole};

    fn compare(relation: ComparisonKind, left: &str, right: Term) -> Constraint {
        Constraint::Compare {
            relation,
            left: left.into(),
            right,
        }
    }

    fn set_of(constraints: Vec<Constraint>, variables: &[(&str, VarType)]) -> ConstraintSet {
        ConstraintSet {
            clauses: constraints
                .into_iter()
                .map(|constraint| Clause {
                    record: 0,
                    role: ClauseRole::Condition,
                    constraint,
                })
                .collect(),
            variables: variables
                .iter()
                .map(|(name, ty)| ((*name).to_owned(), *ty))
                .collect(),
        }
    }

    #[test]
    fn script_declares_then_asserts_then_checks() {
        let set = set_of(
            vec![Constraint::And {
                left: Box::new(compare(ComparisonKind::GreaterThan, "amount", Term::Integer(0))),
                right: Box::new(Constraint::Predicate {
                    predicate: PredicateKind::DoesNotContain,
                    subject: "name".into(),
                    argument: Some(Term::String("x\"y".into())),
                }),
            }],
            &[("amount", VarType::Integer), ("name", VarType::String)],
        );
        assert_eq!(
            set.to_string(),
            "(set-logic QF_SLIA)\n\
             (set-option :produce-models true)\n\
             (declare-const amount Int)\n\
             (declare-const name String)\n\
             (assert (and (> amount 0) (not (str.contains name \"x\"\"y\"))))\n\
             (check-sat)\n\
             (get-model)\n"
        );
    }

    #[test]
    fn empty_set_is_a_trivial_script() {
        assert_eq!(
            ConstraintSet::default().to_string(),
            "(set-logic QF_LIA)\n(set-option :produce-models true)\n(check-sat)\n(get-model)\n"
        );
    }

    #[test]
    fn unconstrained_variables_are_integers() {
        let set = set_of(
            vec![compare(
                ComparisonKind::GreaterOrEqual,
                "balance",
                Term::Variable("amount".into()),
            )],
            &[
                ("amount", VarType::Unconstrained),
                ("balance", VarType::Unconstrained),
            ],
        );
        let script = set.to_string();
        assert!(script.contains("(declare-const amount Int)\n"));
        assert!(script.contains("(assert (>= balance amount))\n"));
    }

    #[test]
    fn presence_tests_read_a_declared_flag() {
        let set = set_of(
            vec![Constraint::Or {
                left: Box::new(Constraint::Predicate {
                    predicate: PredicateKind::IsSet,
                    subject: "token".into(),
                    argument: None,
                }),
                right: Box::new(Constraint::Predicate {
                    predicate: PredicateKind::IsNotSet,
                    subject: "session".into(),
                    argument: None,
                }),
            }],
            &[
                ("session", VarType::Unconstrained),
                ("token", VarType::Unconstrained),
            ],
        );
        let script = set.to_string();
        assert!(script.contains(
            "(declare-const session.is_set Bool)\n(declare-const token.is_set Bool)\n"
        ));
        assert!(script.contains("(assert (or token.is_set (not session.is_set)))\n"));
    }

    #[test]
    fn arithmetic_clause_holds_when_non_zero() {
        let set = set_of(
            vec![Constraint::Arithmetic {
                op: ArithOp::Rem,
                left: "total".into(),
                right: Term::Integer(2),
            }],
            &[("total", VarType::Integer)],
        );
        assert_eq!(logic(&set), "QF_LIA");
        assert!(set.to_string().contains("(assert (distinct (mod total 2) 0))\n"));

        let product = set_of(
            vec![Constraint::Arithmetic {
                op: ArithOp::Mul,
                left: "price".into(),
                right: Term::Variable("qty".into()),
            }],
            &[("price", VarType::Integer), ("qty", VarType::Integer)],
        );
        assert_eq!(logic(&product), "QF_NIA");
    }

    #[test]
    fn orderings_follow_the_variable_sort() {
        let vars: BTreeMap<String, VarType> = [
            ("name".to_owned(), VarType::String),
            ("flag".to_owned(), VarType::Boolean),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            formula(
                &compare(ComparisonKind::GreaterThan, "name", Term::String("m".into())),
                &vars
            ),
            "(str.< \"m\" name)"
        );
        assert_eq!(
            formula(
                &compare(ComparisonKind::LessOrEqual, "flag", Term::Boolean(true)),
                &vars
            ),
            "(=> flag true)"
        );
        assert_eq!(
            formula(
                &compare(ComparisonKind::NotEqual, "name", Term::String("a".into())),
                &vars
            ),
            "(distinct name \"a\")"
        );
    }

    #[test]
    fn strings_escape_outside_printable_ascii() {
        let vars = BTreeMap::new();
        let c = Constraint::Predicate {
            predicate: PredicateKind::Contains,
            subject: "note".into(),
            argument: Some(Term::String("a\\b\u{1}\né".into())),
        };
        assert_eq!(
            formula(&c, &vars),
            "(str.contains note \"a\\u{5c}b\\u{1}\\u{a}\\u{e9}\")"
        );
    }

    #[test]
    fn reserved_names_are_quoted() {
        let vars = BTreeMap::new();
        assert_eq!(
            formula(&compare(ComparisonKind::Equal, "div", Term::Integer(-3)), &vars),
            "(= |div| (- 3))"
        );
    }
}
