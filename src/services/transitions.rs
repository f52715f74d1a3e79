use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::models::event::EventState;

/// One legal edge of the moderation state machine, written `FROM:TO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transition {
    pub from: EventState,
    pub to: EventState,
}

impl FromStr for Transition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (from, to) = s
            .split_once(':')
            .ok_or_else(|| format!("Expected FROM:TO, got '{s}'"))?;
        Ok(Transition {
            from: from.parse()?,
            to: to.parse()?,
        })
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}

#[derive(Debug, Clone)]
pub struct TransitionTable {
    edges: HashSet<(EventState, EventState)>,
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self {
            edges: HashSet::from([
                (EventState::Pending, EventState::Published),
                (EventState::Pending, EventState::Canceled),
                (EventState::Published, EventState::Canceled),
            ]),
        }
    }
}

impl TransitionTable {
    /// CANCELED is terminal and nothing returns to PENDING, whatever the
    /// configuration says.
    pub fn new(transitions: &[Transition]) -> Result<Self, String> {
        let mut edges = HashSet::new();
        for t in transitions {
            if t.from == t.to {
                return Err(format!("Transition {t} does not change state"));
            }
            if t.from == EventState::Canceled {
                return Err(format!("Transition {t} leaves the terminal CANCELED state"));
            }
            if t.to == EventState::Pending {
                return Err(format!("Transition {t} returns an event to PENDING"));
            }
            edges.insert((t.from, t.to));
        }
        Ok(Self { edges })
    }

    pub fn allows(&self, from: EventState, to: EventState) -> bool {
        self.edges.contains(&(from, to))
    }
}
