//! Normal-order SKI reduction with a step budget.

use thiserror::Error;
use triplang_core::term::{Combinator, TermRef, TripValue};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReduceError {
    #[error("reduction budget exhausted after {budget} steps")]
    OutOfFuel { budget: u64 },
}

/// Reduce to normal form, leftmost-outermost, spending at most `fuel`
/// contraction steps.
pub fn normalize(term: &TermRef, fuel: u64) -> Result<TermRef, ReduceError> {
    let mut remaining = fuel;
    nf(term, &mut remaining, fuel)
}

fn spend(remaining: &mut u64, budget: u64) -> Result<(), ReduceError> {
    if *remaining == 0 {
        return Err(ReduceError::OutOfFuel { budget });
    }
    *remaining -= 1;
    Ok(())
}

/// Split an application spine into head and arguments; the first argument is
/// at the end of the returned vector.
fn unwind(term: &TermRef) -> (TermRef, Vec<TermRef>) {
    let mut head = term.clone();
    let mut spine = Vec::new();
    loop {
        let next = match &*head {
            TripValue::App { lft, rgt } => {
                spine.push(rgt.clone());
                lft.clone()
            }
            _ => break,
        };
        head = next;
    }
    (head, spine)
}

fn rebuild(head: TermRef, spine: Vec<TermRef>) -> TermRef {
    spine
        .into_iter()
        .rev()
        .fold(head, TripValue::app)
}

/// Weak head normal form: contract head redexes until the head is inert or
/// an under-applied combinator.
fn whnf(term: &TermRef, remaining: &mut u64, budget: u64) -> Result<TermRef, ReduceError> {
    let mut current = term.clone();
    loop {
        let (head, mut spine) = unwind(&current);
        let TripValue::Terminal { sym } = &*head else {
            return Ok(current);
        };
        match sym {
            Combinator::I if !spine.is_empty() => {
                spend(remaining, budget)?;
                let x = spine.pop().expect("checked non-empty");
                current = rebuild(x, spine);
            }
            Combinator::K if spine.len() >= 2 => {
                spend(remaining, budget)?;
                let x = spine.pop().expect("checked len");
                spine.pop();
                current = rebuild(x, spine);
            }
            Combinator::S if spine.len() >= 3 => {
                spend(remaining, budget)?;
                let x = spine.pop().expect("checked len");
                let y = spine.pop().expect("checked len");
                let z = spine.pop().expect("checked len");
                let contracted = TripValue::app(
                    TripValue::app(x, z.clone()),
                    TripValue::app(y, z),
                );
                current = rebuild(contracted, spine);
            }
            _ => return Ok(current),
        }
    }
}

fn nf(term: &TermRef, remaining: &mut u64, budget: u64) -> Result<TermRef, ReduceError> {
    let head_normal = whnf(term, remaining, budget)?;
    let (head, spine) = unwind(&head_normal);
    let spine = spine
        .into_iter()
        .rev()
        .map(|arg| nf(&arg, remaining, budget))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(spine.into_iter().fold(head, TripValue::app))
}
