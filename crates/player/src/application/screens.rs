//! Screen state machine.
//!
//! Exactly one screen is visible once the first `update` has been applied.
//! Transitions are only ever driven by the server; there is no "back".

use drawesome_shared::{
    PlayerStatus, ProtocolError, ResultEntry, ScreenId, Standing, Task, TaskType, UpdatePayload,
};

/// Number of final standings rows highlighted as podium cards.
pub const PODIUM_SIZE: usize = 3;

/// Everything a screen needs to rebuild its presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenContent {
    Status {
        task_type: Option<TaskType>,
        /// (nickname, status), sorted by nickname
        players: Vec<(String, PlayerStatus)>,
    },
    Task(Task),
    Results(Vec<ResultEntry>),
    Answers(Vec<String>),
    FinalStandings(Vec<RankedStanding>),
}

impl ScreenContent {
    /// Build the content for the screen an update targets.
    pub fn from_update(update: &UpdatePayload) -> Result<Self, ProtocolError> {
        Ok(match update.active_screen {
            ScreenId::Status => ScreenContent::Status {
                task_type: update.task_type,
                players: update
                    .players
                    .iter()
                    .flatten()
                    .map(|(nickname, status)| (nickname.clone(), status.clone()))
                    .collect(),
            },
            ScreenId::Task => ScreenContent::Task(update.decode_task()?),
            ScreenId::Results => ScreenContent::Results(update.results.clone().unwrap_or_default()),
            ScreenId::Answers => {
                ScreenContent::Answers(update.variants.clone().unwrap_or_default())
            }
            ScreenId::FinalStandings => {
                let standings = update
                    .standings
                    .as_deref()
                    .ok_or(ProtocolError::MissingField(
                        ScreenId::FinalStandings,
                        "standings",
                    ))?;
                ScreenContent::FinalStandings(rank_standings(standings))
            }
        })
    }

    pub fn screen(&self) -> ScreenId {
        match self {
            ScreenContent::Status { .. } => ScreenId::Status,
            ScreenContent::Task(_) => ScreenId::Task,
            ScreenContent::Results(_) => ScreenId::Results,
            ScreenContent::Answers(_) => ScreenId::Answers,
            ScreenContent::FinalStandings(_) => ScreenId::FinalStandings,
        }
    }
}

/// A final standings row with its place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedStanding {
    pub place: u32,
    pub podium: bool,
    pub standing: Standing,
}

/// Assign places to standings already sorted by descending score.
///
/// Equal scores share a place; the place advances by one when the next row
/// scores strictly lower.
pub fn rank_standings(standings: &[Standing]) -> Vec<RankedStanding> {
    let mut place = 1;
    let mut ranked = Vec::with_capacity(standings.len());
    for (i, standing) in standings.iter().enumerate() {
        ranked.push(RankedStanding {
            place,
            podium: i < PODIUM_SIZE,
            standing: standing.clone(),
        });
        if standings
            .get(i + 1)
            .is_some_and(|next| standing.result > next.result)
        {
            place += 1;
        }
    }
    ranked
}

/// Holds the single active screen.
#[derive(Debug, Default)]
pub struct ScreenStateMachine {
    active: Option<ScreenId>,
}

impl ScreenStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible screen, or `None` before the first update.
    pub fn active(&self) -> Option<ScreenId> {
        self.active
    }

    pub fn is_visible(&self, screen: ScreenId) -> bool {
        self.active == Some(screen)
    }

    /// Screens currently visible. Never more than one.
    pub fn visible(&self) -> impl Iterator<Item = ScreenId> + '_ {
        ScreenId::ALL.into_iter().filter(|s| self.is_visible(*s))
    }

    /// Mark `screen` visible and every other screen hidden.
    pub fn activate(&mut self, screen: ScreenId) -> Option<ScreenId> {
        let previous = self.active.replace(screen);
        tracing::debug!(from = ?previous, to = %screen, "Screen transition");
        previous
    }

    /// Final standings ends the session from the player's point of view.
    pub fn is_terminal(&self) -> bool {
        self.active == Some(ScreenId::FinalStandings)
    }
}
