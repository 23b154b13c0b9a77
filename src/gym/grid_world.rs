use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

use crate::{
    ensure_interval,
    env::{ActionSpace, Mdp, Transition},
};

/// `(row, column)`, row 0 is the top of the grid
pub type Pos = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Open,
    Wall,
    Start,
    /// A cell whose only action leaves the grid with the given reward
    Exit(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridState {
    At(Pos),
    /// Reached after exiting, no actions are available
    Terminal,
}

#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridAction {
    North,
    West,
    South,
    East,
    Exit,
}

impl GridAction {
    pub fn is_move(self) -> bool {
        self != GridAction::Exit
    }

    /// The compass moves, in the order agents consider them
    pub fn moves() -> impl Iterator<Item = GridAction> {
        GridAction::iter().filter(|a| a.is_move())
    }

    fn offset(self) -> (isize, isize) {
        match self {
            GridAction::North => (-1, 0),
            GridAction::West => (0, -1),
            GridAction::South => (1, 0),
            GridAction::East => (0, 1),
            GridAction::Exit => (0, 0),
        }
    }

    /// The two directions a noisy move can slip into
    fn perpendicular(self) -> [GridAction; 2] {
        match self {
            GridAction::North | GridAction::South => [GridAction::West, GridAction::East],
            GridAction::West | GridAction::East => [GridAction::North, GridAction::South],
            GridAction::Exit => [GridAction::Exit, GridAction::Exit],
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("{0:?} is not a state of this grid")]
    UnknownState(GridState),

    #[error("{action:?} is not legal in {state:?}")]
    IllegalAction {
        state: GridState,
        action: GridAction,
    },
}

/// A noisy grid world with exits
///
/// Moves succeed with probability `1 - noise` and slip to each perpendicular direction with
/// probability `noise / 2`. Moving into a wall or off the grid leaves the agent in place.
/// Exit cells only allow [`GridAction::Exit`], which pays the cell's reward and ends in
/// [`GridState::Terminal`]. Every other action pays the living reward.
///
/// This is a model only, it does not simulate episodes.
#[derive(Debug, Clone)]
pub struct GridWorld {
    cells: Vec<Vec<Cell>>,
    noise: f64,
    living_reward: f64,
}

fn exit(reward: f64) -> Cell {
    Cell::Exit(reward)
}

impl GridWorld {
    /// A grid with noise `0.2` and no living reward
    pub fn new(cells: Vec<Vec<Cell>>) -> Self {
        Self {
            cells,
            noise: 0.2,
            living_reward: 0.0,
        }
    }

    /// Parse a whitespace separated layout, one row per line
    ///
    /// Tokens are `#` (wall), `_` (open), `S` (start) or a finite number (exit with that reward).
    pub fn parse(layout: &str) -> crate::Result<Self> {
        let cells = layout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                line.split_whitespace()
                    .map(|token| match token {
                        "#" => Ok(Cell::Wall),
                        "_" => Ok(Cell::Open),
                        "S" => Ok(Cell::Start),
                        _ => match token.parse::<f64>() {
                            Ok(reward) if reward.is_finite() => Ok(Cell::Exit(reward)),
                            _ => Err(crate::Error::InvalidGridToken {
                                token: token.to_string(),
                            }),
                        },
                    })
                    .collect::<crate::Result<Vec<_>>>()
            })
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(Self::new(cells))
    }

    /// A narrow bridge between a close low exit and a far high exit, lined with cliffs
    pub fn bridge() -> Self {
        use Cell::{Open as O, Start as S, Wall as W};
        let cliff = exit(-100.0);
        Self::new(vec![
            vec![W, cliff, cliff, cliff, cliff, cliff, W],
            vec![exit(1.0), S, O, O, O, O, exit(10.0)],
            vec![W, cliff, cliff, cliff, cliff, cliff, W],
        ])
    }

    /// A close and a distant exit, reachable along a cliff or by a longer safe route
    pub fn discount() -> Self {
        use Cell::{Open as O, Start as S, Wall as W};
        let cliff = exit(-10.0);
        Self::new(vec![
            vec![O, O, O, O, O],
            vec![O, W, O, O, O],
            vec![O, W, exit(1.0), W, exit(10.0)],
            vec![S, O, O, O, O],
            vec![cliff, cliff, cliff, cliff, cliff],
        ])
    }

    /// The classic 4x3 grid
    pub fn book() -> Self {
        use Cell::{Open as O, Start as S, Wall as W};
        Self::new(vec![
            vec![O, O, O, exit(1.0)],
            vec![O, W, O, exit(-1.0)],
            vec![S, O, O, O],
        ])
    }

    /// **Errors** if `noise` is not in the interval `[0,1]`
    pub fn with_noise(mut self, noise: f64) -> crate::Result<Self> {
        ensure_interval!(noise, 0.0, 1.0);
        self.noise = noise;
        Ok(self)
    }

    pub fn with_living_reward(mut self, living_reward: f64) -> Self {
        self.living_reward = living_reward;
        self
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }

    pub fn living_reward(&self) -> f64 {
        self.living_reward
    }

    /// The first start cell, scanning rows top to bottom
    pub fn start(&self) -> Option<GridState> {
        self.positions()
            .find(|&pos| self.cells[pos.0][pos.1] == Cell::Start)
            .map(GridState::At)
    }

    pub fn cell(&self, (row, col): Pos) -> Option<Cell> {
        self.cells.get(row)?.get(col).copied()
    }

    fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(row, cells)| (0..cells.len()).map(move |col| (row, col)))
    }

    /// The cell under `state`, `None` for the terminal state
    fn state_cell(&self, state: &GridState) -> Result<Option<Cell>, GridError> {
        match *state {
            GridState::Terminal => Ok(None),
            GridState::At(pos) => match self.cell(pos) {
                Some(Cell::Wall) | None => Err(GridError::UnknownState(*state)),
                cell => Ok(cell),
            },
        }
    }

    /// Where a move from `pos` ends up, staying put when blocked
    pub fn destination(&self, (row, col): Pos, action: GridAction) -> Pos {
        let (dr, dc) = action.offset();
        let target = row
            .checked_add_signed(dr)
            .zip(col.checked_add_signed(dc));
        match target {
            Some(next) if matches!(self.cell(next), Some(c) if c != Cell::Wall) => next,
            _ => (row, col),
        }
    }
}

impl Mdp for GridWorld {
    type State = GridState;
    type Action = GridAction;
    type Error = GridError;

    fn states(&self) -> Result<Vec<GridState>, GridError> {
        let cells = self
            .positions()
            .filter(|&pos| self.cell(pos) != Some(Cell::Wall))
            .map(GridState::At);
        Ok(std::iter::once(GridState::Terminal).chain(cells).collect())
    }

    fn possible_actions(&self, state: &GridState) -> Result<Vec<GridAction>, GridError> {
        Ok(match self.state_cell(state)? {
            None => vec![],
            Some(Cell::Exit(_)) => vec![GridAction::Exit],
            Some(_) => GridAction::moves().collect(),
        })
    }

    fn transitions(
        &self,
        state: &GridState,
        action: &GridAction,
    ) -> Result<Vec<Transition<GridState>>, GridError> {
        let illegal = || GridError::IllegalAction {
            state: *state,
            action: *action,
        };
        let GridState::At(pos) = *state else {
            return Err(illegal());
        };

        match (self.state_cell(state)?, action.is_move()) {
            (Some(Cell::Exit(_)), false) => Ok(vec![Transition::new(GridState::Terminal, 1.0)]),
            (Some(Cell::Exit(_)), true) | (_, false) => Err(illegal()),
            (_, true) => {
                let [left, right] = action.perpendicular();
                let outcomes = [
                    (*action, 1.0 - self.noise),
                    (left, self.noise / 2.0),
                    (right, self.noise / 2.0),
                ];

                let mut transitions: Vec<Transition<GridState>> = Vec::with_capacity(3);
                for (direction, prob) in outcomes {
                    let next_state = GridState::At(self.destination(pos, direction));
                    match transitions.iter_mut().find(|t| t.next_state == next_state) {
                        Some(t) => t.prob += prob,
                        None => transitions.push(Transition::new(next_state, prob)),
                    }
                }
                Ok(transitions)
            }
        }
    }

    fn reward(
        &self,
        state: &GridState,
        _action: &GridAction,
        _next_state: &GridState,
    ) -> Result<f64, GridError> {
        Ok(match self.state_cell(state)? {
            None => 0.0,
            Some(Cell::Exit(reward)) => reward,
            Some(_) => self.living_reward,
        })
    }
}

impl ActionSpace for GridWorld {
    type State = GridState;
    type Action = GridAction;

    /// Unknown states have no legal actions
    fn legal_actions(&self, state: &GridState) -> Vec<GridAction> {
        self.possible_actions(state).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algo::{ValueIterationAgent, ValueIterationConfig},
        Error,
    };

    fn sum_probs(transitions: &[Transition<GridState>]) -> f64 {
        transitions.iter().map(|t| t.prob).sum()
    }

    #[test]
    fn parses_layout() {
        let grid = GridWorld::parse(
            "
            _ _ 1
            S # -1.5
            ",
        )
        .unwrap();

        assert_eq!(grid.start(), Some(GridState::At((1, 0))));
        assert_eq!(grid.cell((1, 1)), Some(Cell::Wall));
        assert_eq!(grid.cell((1, 2)), Some(Cell::Exit(-1.5)));
        // terminal plus five non-wall cells
        assert_eq!(grid.states().unwrap().len(), 6);
    }

    #[test]
    fn rejects_unknown_tokens() {
        let err = GridWorld::parse("S ? 1").unwrap_err();
        assert!(matches!(err, Error::InvalidGridToken { ref token } if token == "?"));
    }

    #[test]
    fn rejects_non_finite_exits() {
        for token in ["nan", "NaN", "inf", "-inf", "infinity"] {
            let err = GridWorld::parse(&format!("S _ {token}")).unwrap_err();
            assert!(matches!(err, Error::InvalidGridToken { token: ref t } if t == token));
        }
    }

    #[test]
    fn noisy_move_splits_probability() {
        let grid = GridWorld::book();
        let transitions = grid
            .transitions(&GridState::At((2, 1)), &GridAction::North)
            .unwrap();

        // north is a wall, so the intended move stays put
        assert_eq!(
            transitions,
            vec![
                Transition::new(GridState::At((2, 1)), 0.8),
                Transition::new(GridState::At((2, 0)), 0.1),
                Transition::new(GridState::At((2, 2)), 0.1),
            ]
        );
    }

    #[test]
    fn blocked_outcomes_are_merged() {
        let grid = GridWorld::book();
        let transitions = grid
            .transitions(&GridState::At((0, 0)), &GridAction::North)
            .unwrap();

        assert_eq!(transitions.len(), 2);
        assert!((sum_probs(&transitions) - 1.0).abs() < 1e-12);
        assert_eq!(transitions[0].next_state, GridState::At((0, 0)));
        assert!((transitions[0].prob - 0.9).abs() < 1e-12);
    }

    #[test]
    fn exits_lead_to_terminal() {
        let grid = GridWorld::book().with_living_reward(-0.04);
        let exit_state = GridState::At((1, 3));

        assert_eq!(grid.possible_actions(&exit_state).unwrap(), vec![GridAction::Exit]);
        assert_eq!(
            grid.transitions(&exit_state, &GridAction::Exit).unwrap(),
            vec![Transition::new(GridState::Terminal, 1.0)]
        );
        assert_eq!(
            grid.reward(&exit_state, &GridAction::Exit, &GridState::Terminal)
                .unwrap(),
            -1.0
        );
        assert_eq!(
            grid.reward(&GridState::At((0, 0)), &GridAction::East, &GridState::At((0, 1)))
                .unwrap(),
            -0.04
        );
        assert!(grid.possible_actions(&GridState::Terminal).unwrap().is_empty());
    }

    #[test]
    fn illegal_queries_are_errors() {
        let grid = GridWorld::book();

        assert_eq!(
            grid.transitions(&GridState::At((1, 3)), &GridAction::South),
            Err(GridError::IllegalAction {
                state: GridState::At((1, 3)),
                action: GridAction::South,
            })
        );
        assert!(grid
            .transitions(&GridState::At((0, 0)), &GridAction::Exit)
            .is_err());
        assert_eq!(
            grid.possible_actions(&GridState::At((1, 1))),
            Err(GridError::UnknownState(GridState::At((1, 1))))
        );
        assert!(grid.legal_actions(&GridState::At((9, 9))).is_empty());
    }

    #[test]
    fn every_distribution_sums_to_one() {
        let grid = GridWorld::discount().with_noise(0.3).unwrap();
        for state in grid.states().unwrap() {
            for action in grid.possible_actions(&state).unwrap() {
                let transitions = grid.transitions(&state, &action).unwrap();
                assert!((sum_probs(&transitions) - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn rejects_invalid_noise() {
        assert!(GridWorld::book().with_noise(-0.5).is_err());
    }

    #[test]
    fn book_grid_values() {
        let agent = ValueIterationAgent::new(GridWorld::book(), ValueIterationConfig::default()).unwrap();

        let exit_value = agent.value(&GridState::At((0, 3)));
        assert_eq!(exit_value, 1.0);
        assert_eq!(agent.value(&GridState::Terminal), 0.0);
        assert_eq!(
            agent.policy(&GridState::At((0, 2))).unwrap(),
            Some(GridAction::East)
        );
        assert_eq!(
            agent.policy(&GridState::At((2, 0))).unwrap(),
            Some(GridAction::North)
        );
    }

    #[test]
    fn model_errors_surface_from_planning() {
        let grid = GridWorld::book();
        let agent = ValueIterationAgent::new(grid, ValueIterationConfig::default()).unwrap();

        let err = agent
            .q_value(&GridState::At((1, 3)), &GridAction::North)
            .unwrap_err();
        assert!(matches!(err, Error::Mdp(_)));
    }
}
