//! Constraint translation: intent records -> [`ConstraintSet`].
//!
//! Translation runs in two passes over an explicit accumulator:
//!
//! 1. Lowering: every clause is converted to a [`Constraint`] while typing
//!    evidence is collected in walk order. A comparison against a literal
//!    pins a variable's type; a comparison between two variables links them.
//! 2. Reconciliation: evidence is replayed through a union-find table.
//!    Linked variables share one type. A class that is never pinned by a
//!    literal comes out `Unconstrained`.
//!
//! The first piece of evidence that disagrees with what came before is
//! reported as a [`TranslationError::TypeConflict`].

use crate::ast::{ArithOp, ComparisonOp, ConstraintExpr, IntentRecord, Operand, Variable};
use crate::constraint::{
    Clause, ClauseRole, ComparisonKind, Constraint, ConstraintSet, PredicateKind, SourcePosition,
    Term, VarType,
};
use crate::error::TranslationError;
use std::collections::{BTreeMap, HashMap};

/// Semantic meaning of a comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorMapping {
    Relation(ComparisonKind),
    Predicate(PredicateKind),
}

/// Fold an operator spelling onto its semantic kind. Total over
/// [`ComparisonOp`].
pub fn map_operator(op: ComparisonOp) -> OperatorMapping {
    use ComparisonKind as K;
    use OperatorMapping::{Predicate, Relation};
    match op {
        ComparisonOp::Eq | ComparisonOp::Equals => Relation(K::Equal),
        ComparisonOp::Neq | ComparisonOp::NotEquals => Relation(K::NotEqual),
        ComparisonOp::Gt | ComparisonOp::GreaterThan => Relation(K::GreaterThan),
        ComparisonOp::Lt | ComparisonOp::LessThan => Relation(K::LessThan),
        ComparisonOp::Gte | ComparisonOp::AtLeast => Relation(K::GreaterOrEqual),
        ComparisonOp::Lte | ComparisonOp::AtMost => Relation(K::LessOrEqual),
        ComparisonOp::Contains => Predicate(PredicateKind::Contains),
        ComparisonOp::DoesNotContain => Predicate(PredicateKind::DoesNotContain),
        ComparisonOp::IsSet => Predicate(PredicateKind::IsSet),
        ComparisonOp::IsNotSet => Predicate(PredicateKind::IsNotSet),
    }
}

/// Translate a batch of records into one constraint set.
///
/// The batch succeeds or fails as a whole. Variable types are shared across
/// every record in the batch and nothing else.
pub fn translate(records: &[IntentRecord]) -> Result<ConstraintSet, TranslationError> {
    let mut lowering = Lowering::default();
    let mut clauses = Vec::new();

    for (index, record) in records.iter().enumerate() {
        lowering.record = index;
        let roles = [
            (ClauseRole::Condition, record.condition.as_ref()),
            (ClauseRole::Constraint, record.constraint.as_ref()),
        ];
        for (role, expr) in roles {
            if let Some(expr) = expr {
                let constraint = lowering.lower(expr)?;
                clauses.push(Clause {
                    record: index,
                    role,
                    constraint,
                });
            }
        }
    }

    let variables = reconcile(&lowering.evidence)?;
    tracing::debug!(
        records = records.len(),
        clauses = clauses.len(),
        variables = variables.len(),
        "translated batch"
    );
    Ok(ConstraintSet { clauses, variables })
}

// ──────────────────────────────────────────────
// Pass 1: lowering and evidence collection
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Evidence {
    /// `name` was used as `ty` at `position`.
    Typed {
        name: String,
        ty: VarType,
        position: SourcePosition,
    },
    /// `left` and `right` were compared to each other and must share a type.
    Linked {
        left: String,
        right: String,
        position: SourcePosition,
    },
}

#[derive(Default)]
struct Lowering {
    record: usize,
    evidence: Vec<Evidence>,
}

impl Lowering {
    fn position(&self, var: &Variable) -> SourcePosition {
        SourcePosition {
            record: self.record,
            offset: var.span.start,
        }
    }

    fn typed(&mut self, var: &Variable, ty: VarType) {
        let position = self.position(var);
        self.evidence.push(Evidence::Typed {
            name: var.name.clone(),
            ty,
            position,
        });
    }

    fn unmapped(&self, op: &str, var: &Variable, reason: &str) -> TranslationError {
        TranslationError::UnmappedOperator {
            operator: op.to_owned(),
            reason: reason.to_owned(),
            position: self.position(var),
        }
    }

    fn lower(&mut self, expr: &ConstraintExpr) -> Result<Constraint, TranslationError> {
        match expr {
            ConstraintExpr::Comparison { left, op, right } => {
                self.lower_comparison(left, *op, right.as_ref())
            }
            ConstraintExpr::Arithmetic { left, op, right } => {
                self.lower_arithmetic(left, *op, right)
            }
            ConstraintExpr::LogicalAnd { left, right } => Ok(Constraint::And {
                left: Box::new(self.lower(left)?),
                right: Box::new(self.lower(right)?),
            }),
            ConstraintExpr::LogicalOr { left, right } => Ok(Constraint::Or {
                left: Box::new(self.lower(left)?),
                right: Box::new(self.lower(right)?),
            }),
            ConstraintExpr::LogicalNot { operand } => Ok(Constraint::Not {
                operand: Box::new(self.lower(operand)?),
            }),
        }
    }

    fn lower_comparison(
        &mut self,
        left: &Variable,
        op: ComparisonOp,
        right: Option<&Operand>,
    ) -> Result<Constraint, TranslationError> {
        match (map_operator(op), right) {
            (OperatorMapping::Relation(relation), Some(right)) => {
                let right = match right {
                    Operand::Variable(var) => {
                        let position = self.position(var);
                        self.evidence.push(Evidence::Linked {
                            left: left.name.clone(),
                            right: var.name.clone(),
                            position,
                        });
                        Term::Variable(var.name.clone())
                    }
                    Operand::Number(n) => {
                        self.typed(left, VarType::Integer);
                        Term::Integer(*n)
                    }
                    Operand::String(s) => {
                        self.typed(left, VarType::String);
                        Term::String(s.clone())
                    }
                    Operand::Boolean(b) => {
                        self.typed(left, VarType::Boolean);
                        Term::Boolean(*b)
                    }
                };
                Ok(Constraint::Compare {
                    relation,
                    left: left.name.clone(),
                    right,
                })
            }
            (OperatorMapping::Relation(_), None) => {
                Err(self.unmapped(op.lexeme(), left, "missing right-hand operand"))
            }
            (OperatorMapping::Predicate(predicate), None) if op.is_unary() => {
                self.declare(left);
                Ok(Constraint::Predicate {
                    predicate,
                    subject: left.name.clone(),
                    argument: None,
                })
            }
            (OperatorMapping::Predicate(_), Some(_)) if op.is_unary() => {
                Err(self.unmapped(op.lexeme(), left, "presence test takes no operand"))
            }
            (OperatorMapping::Predicate(predicate), Some(right)) => {
                let argument = match right {
                    Operand::Variable(var) => {
                        self.typed(var, VarType::String);
                        Term::Variable(var.name.clone())
                    }
                    Operand::String(s) => Term::String(s.clone()),
                    Operand::Number(_) | Operand::Boolean(_) => {
                        return Err(self.unmapped(
                            op.lexeme(),
                            left,
                            "substring test needs a string operand",
                        ))
                    }
                };
                self.typed(left, VarType::String);
                Ok(Constraint::Predicate {
                    predicate,
                    subject: left.name.clone(),
                    argument: Some(argument),
                })
            }
            (OperatorMapping::Predicate(_), None) => {
                Err(self.unmapped(op.lexeme(), left, "missing right-hand operand"))
            }
        }
    }

    fn lower_arithmetic(
        &mut self,
        left: &Variable,
        op: ArithOp,
        right: &Operand,
    ) -> Result<Constraint, TranslationError> {
        let right = match right {
            Operand::Variable(var) => {
                self.typed(left, VarType::Integer);
                self.typed(var, VarType::Integer);
                Term::Variable(var.name.clone())
            }
            Operand::Number(n) => {
                self.typed(left, VarType::Integer);
                Term::Integer(*n)
            }
            Operand::String(_) | Operand::Boolean(_) => {
                return Err(self.unmapped(op.lexeme(), left, "arithmetic needs an integer operand"))
            }
        };
        Ok(Constraint::Arithmetic {
            op,
            left: left.name.clone(),
            right,
        })
    }

    /// Record a variable with no type evidence so it is still declared.
    fn declare(&mut self, var: &Variable) {
        let position = self.position(var);
        self.evidence.push(Evidence::Linked {
            left: var.name.clone(),
            right: var.name.clone(),
            position,
        });
    }
}

// ──────────────────────────────────────────────
// Pass 2: reconciliation
// ──────────────────────────────────────────────

#[derive(Default)]
struct TypeTable {
    ids: HashMap<String, usize>,
    names: Vec<String>,
    parent: Vec<usize>,
    /// Pinned type of each class, stored on its root.
    ty: Vec<Option<VarType>>,
}

impl TypeTable {
    fn id(&mut self, name: &str) -> usize {
        if let Some(&id) = self.ids.get(name) {
            return id;
        }
        let id = self.names.len();
        self.ids.insert(name.to_owned(), id);
        self.names.push(name.to_owned());
        self.parent.push(id);
        self.ty.push(None);
        id
    }

    fn find(&mut self, mut id: usize) -> usize {
        while self.parent[id] != id {
            self.parent[id] = self.parent[self.parent[id]];
            id = self.parent[id];
        }
        id
    }
}

fn reconcile(evidence: &[Evidence]) -> Result<BTreeMap<String, VarType>, TranslationError> {
    let mut table = TypeTable::default();

    for item in evidence {
        match item {
            Evidence::Typed { name, ty, position } => {
                let id = table.id(name);
                let root = table.find(id);
                let pinned = table.ty[root];
                match pinned {
                    None => table.ty[root] = Some(*ty),
                    Some(first) if first != *ty => {
                        return Err(conflict(name, first, *ty, *position));
                    }
                    Some(_) => {}
                }
            }
            Evidence::Linked {
                left,
                right,
                position,
            } => {
                let (a, b) = (table.id(left), table.id(right));
                let (ra, rb) = (table.find(a), table.find(b));
                if ra == rb {
                    continue;
                }
                let merged = match (table.ty[ra], table.ty[rb]) {
                    (Some(left_ty), Some(right_ty)) if left_ty != right_ty => {
                        return Err(conflict(right, right_ty, left_ty, *position));
                    }
                    (first, second) => first.or(second),
                };
                table.parent[rb] = ra;
                table.ty[ra] = merged;
            }
        }
    }

    let mut variables = BTreeMap::new();
    for id in 0..table.names.len() {
        let root = table.find(id);
        let ty = table.ty[root].unwrap_or(VarType::Unconstrained);
        variables.insert(table.names[id].clone(), ty);
    }
    Ok(variables)
}

fn conflict(
    variable: &str,
    first_type: VarType,
    conflicting_type: VarType,
    position: SourcePosition,
) -> TranslationError {
    tracing::debug!(variable, %first_type, %conflicting_type, %position, "type conflict");
    TranslationError::TypeConflict {
        variable: variable.to_owned(),
        first_type,
        conflicting_type,
        conflicting_position: position,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
