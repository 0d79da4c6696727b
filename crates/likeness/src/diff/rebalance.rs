//! Realignment of mismatched children.
//!
//! When the current pair of children is not deeply equal, the rest of the
//! expected side's phase is scanned to tell an insertion, a removal and a
//! substitution apart.

use super::Instruction;
use crate::compare::{compare_children, compare_nodes, compare_primitives, Operand, Walker};
use crate::error::Result;
use crate::value::{Child, Children, Comparison, Tree, Value};

/// What to do with the current pair of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Align {
    Same,
    /// Unequal, reported without descending.
    Changed,
    /// The expected child was inserted; the actual child stays pending.
    ExpectedMissing,
    /// The actual child has no counterpart; the expected child stays pending.
    ActualExtraneous,
    /// Same position, different content.
    Substitute,
}

impl From<Instruction> for Align {
    fn from(instruction: Instruction) -> Self {
        match instruction {
            Instruction::Resolved(Comparison::DeepEqual) => Align::Same,
            Instruction::Resolved(_) => Align::Changed,
            Instruction::ExpectedMissing => Align::ExpectedMissing,
            Instruction::ActualExtraneous => Align::ActualExtraneous,
            Instruction::Substitute => Align::Substitute,
        }
    }
}

/// Whether two children occupy the same slot: properties and entries by
/// key, list items and set members by value (shape for complex values).
pub(super) fn lines_up(
    walker: &mut Walker<'_>,
    lt: &Tree,
    rt: &Tree,
    lhs: &Child,
    rhs: &Child,
) -> Result<bool> {
    match (lhs, rhs) {
        (Child::Property { .. }, Child::Property { .. }) => {
            Ok(compare_children(lhs, rhs) == Comparison::ShallowEqual)
        }
        (Child::Entry { key: a, .. }, Child::Entry { key: b, .. }) => {
            walker.walk(Operand::Value(a.clone()), Operand::Value(b.clone()))
        }
        (Child::Item { value: a, .. }, Child::Item { value: b, .. }) => same_shape(lt, a, rt, b),
        _ => Ok(false),
    }
}

fn same_shape(lt: &Tree, lhs: &Value, rt: &Tree, rhs: &Value) -> Result<bool> {
    match (lt.complex(lhs)?, rt.complex(rhs)?) {
        (Some((_, a)), Some((_, b))) => Ok(compare_nodes(&a, &b) != Comparison::Unequal),
        (None, None) => Ok(compare_primitives(lhs, rhs) == Comparison::DeepEqual),
        _ => Ok(false),
    }
}

/// Classifies a pair already known not to be deeply equal. The rest
/// cursors are positioned just after `lhs` and `rhs`; they are forked,
/// never advanced.
///
/// Items first look for an exact partner further along either side, so a
/// removed or inserted item does not shift every later one into a
/// substitution.
pub(super) fn realign(
    walker: &mut Walker<'_>,
    lt: &Tree,
    rt: &Tree,
    lhs: &Child,
    rhs: &Child,
    lhs_rest: &Children<'_>,
    rhs_rest: &Children<'_>,
) -> Result<Align> {
    if let (Child::Item { value: a, .. }, Child::Item { value: b, .. }) = (lhs, rhs) {
        if phase_holds(walker, lhs_rest, b, Side::Actual)? {
            return Ok(Align::ActualExtraneous);
        }
        if phase_holds(walker, rhs_rest, a, Side::Expected)? {
            return Ok(Align::ExpectedMissing);
        }
    }
    if lines_up(walker, lt, rt, lhs, rhs)? {
        return Ok(Align::Substitute);
    }
    let mut ahead = rhs_rest.fork();
    while let Some(next) = ahead.pull()? {
        if matches!(next, Child::Boundary { .. }) {
            break;
        }
        if lines_up(walker, lt, rt, lhs, &next)? {
            return Ok(Align::ExpectedMissing);
        }
    }
    Ok(Align::ActualExtraneous)
}

#[derive(Clone, Copy)]
enum Side {
    Actual,
    Expected,
}

/// Whether the rest of the current item phase on `side` holds an item
/// deeply equal to `target`, which comes from the other side.
fn phase_holds(
    walker: &mut Walker<'_>,
    rest: &Children<'_>,
    target: &Value,
    side: Side,
) -> Result<bool> {
    let mut ahead = rest.fork();
    while let Some(next) = ahead.pull()? {
        let Child::Item { value, .. } = next else {
            break;
        };
        let (l, r) = match side {
            Side::Actual => (value, target.clone()),
            Side::Expected => (target.clone(), value),
        };
        if walker.walk(Operand::Value(l), Operand::Value(r))? {
            return Ok(true);
        }
    }
    Ok(false)
}
