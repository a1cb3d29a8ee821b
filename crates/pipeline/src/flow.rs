//! A linear chain of stages with one decision point and a parallel
//! declined terminal. The sales funnel and the strategy review flow are
//! both instances of this shape.

/// Primitive moves understood by a [`Flow`]. Callers expose their own verb
/// names (Won, Approve, ...) and map them onto these.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Verb {
    Forward,
    Backward,
    Accept,
    Decline,
    Reopen,
}

/// A rejected move. The caller's stage is left untouched.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IllegalMove<S> {
    pub stage: S,
    pub verb: Verb,
}

pub struct Flow<S: 'static> {
    chain: &'static [S],
    decision: usize,
    declined: S,
}

impl<S: Copy + Eq + 'static> Flow<S> {
    /// `chain` runs from the entry stage to the accepted terminal;
    /// `decision` is the chain stage where accept/decline applies and must
    /// have a successor.
    pub fn new(chain: &'static [S], decision: S, declined: S) -> Self {
        let decision = chain
            .iter()
            .position(|stage| *stage == decision)
            .expect("decision stage must be part of the chain");
        assert!(decision + 1 < chain.len(), "decision stage needs a successor");
        Self {
            chain,
            decision,
            declined,
        }
    }

    /// Resolve the stage `verb` lands on from `current`.
    ///
    /// - `Forward`/`Backward` move exactly one chain position. Forward never
    ///   leaves the decision stage (that is what `Accept` is for) and
    ///   backward never leaves a stage past the decision point.
    /// - `Accept` and `Decline` apply only at the decision stage.
    /// - `Reopen` returns to the decision stage, from the declined terminal
    ///   always and from the accepted stage only when it ends the chain.
    pub fn apply(&self, current: S, verb: Verb) -> Result<S, IllegalMove<S>> {
        let illegal = IllegalMove {
            stage: current,
            verb,
        };
        if current == self.declined {
            return match verb {
                Verb::Reopen => Ok(self.chain[self.decision]),
                _ => Err(illegal),
            };
        }
        let pos = self
            .chain
            .iter()
            .position(|stage| *stage == current)
            .ok_or(illegal)?;
        match verb {
            Verb::Forward if pos != self.decision && pos + 1 < self.chain.len() => {
                Ok(self.chain[pos + 1])
            }
            Verb::Backward if pos >= 1 && pos <= self.decision => Ok(self.chain[pos - 1]),
            Verb::Accept if pos == self.decision => Ok(self.chain[pos + 1]),
            Verb::Decline if pos == self.decision => Ok(self.declined),
            Verb::Reopen if pos == self.decision + 1 && pos + 1 == self.chain.len() => {
                Ok(self.chain[self.decision])
            }
            _ => Err(illegal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    enum S {
        A,
        B,
        C,
        D,
        E,
        X,
    }

    const FUNNEL: [S; 5] = [S::A, S::B, S::C, S::D, S::E];

    fn funnel() -> Flow<S> {
        Flow::new(&FUNNEL, S::D, S::X)
    }

    #[test]
    fn forward_advances_one_position() {
        assert_eq!(funnel().apply(S::A, Verb::Forward), Ok(S::B));
        assert_eq!(funnel().apply(S::C, Verb::Forward), Ok(S::D));
    }

    #[test]
    fn forward_out_of_decision_requires_accept() {
        assert!(funnel().apply(S::D, Verb::Forward).is_err());
        assert_eq!(funnel().apply(S::D, Verb::Accept), Ok(S::E));
    }

    #[test]
    fn backward_stops_at_entry_and_decision() {
        assert_eq!(funnel().apply(S::D, Verb::Backward), Ok(S::C));
        assert!(funnel().apply(S::A, Verb::Backward).is_err());
        assert!(funnel().apply(S::E, Verb::Backward).is_err());
        assert!(funnel().apply(S::X, Verb::Backward).is_err());
    }

    #[test]
    fn decline_branches_only_from_decision() {
        assert_eq!(funnel().apply(S::D, Verb::Decline), Ok(S::X));
        for stage in [S::A, S::B, S::C, S::E, S::X] {
            assert!(funnel().apply(stage, Verb::Decline).is_err());
        }
    }

    #[test]
    fn both_terminals_reopen_to_decision() {
        assert_eq!(funnel().apply(S::E, Verb::Reopen), Ok(S::D));
        assert_eq!(funnel().apply(S::X, Verb::Reopen), Ok(S::D));
        assert!(funnel().apply(S::C, Verb::Reopen).is_err());
    }

    #[test]
    fn accepted_stage_with_successor_moves_forward_instead_of_reopening() {
        // Review-flow shape: the accepted stage is followed by one more step.
        const REVIEW: [S; 4] = [S::A, S::B, S::C, S::D];
        let flow = Flow::new(&REVIEW, S::B, S::X);
        assert_eq!(flow.apply(S::C, Verb::Forward), Ok(S::D));
        assert!(flow.apply(S::C, Verb::Reopen).is_err());
        assert_eq!(flow.apply(S::X, Verb::Reopen), Ok(S::B));
    }

    #[test]
    fn rejected_moves_report_stage_and_verb() {
        let err = funnel().apply(S::A, Verb::Backward).unwrap_err();
        assert_eq!(err.stage, S::A);
        assert_eq!(err.verb, Verb::Backward);
    }
}
