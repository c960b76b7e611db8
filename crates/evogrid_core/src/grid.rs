//! The square cell grid: state machine, ownership and occupancy.

use crate::error::GridError;
pub use evogrid_data::{CellState, Coord, Direction, OrganismId};
use rand::Rng;
use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Random draws tried before scanning for an empty cell.
const RANDOM_DRAWS: usize = 32;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct Cell {
    pub state: CellState,
    /// Set only while `state == Organism`.
    pub owner: Option<OrganismId>,
    /// Residual energy; a cleared cell with energy left becomes food.
    pub energy: f32,
    pub highlighted: bool,
    pub selected: bool,
}

/// Outcome of a movement legality check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Enter,
    /// Enterable; the food is consumed.
    Eat,
    Blocked,
    /// The mover dies and does not enter.
    Lethal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Archive, RkyvSerialize, RkyvDeserialize)]
#[archive(check_bytes)]
pub struct Grid {
    cells: Vec<Cell>,
    size: u16,
    occupied: usize,
    food: usize,
}

impl Grid {
    #[must_use]
    pub fn new(size: u16) -> Self {
        let n = usize::from(size) * usize::from(size);
        Self {
            cells: vec![Cell::default(); n],
            size,
            occupied: 0,
            food: 0,
        }
    }

    #[must_use]
    pub fn size(&self) -> u16 {
        self.size
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.occupied
    }

    /// Number of food cells.
    #[must_use]
    pub fn food_count(&self) -> usize {
        self.food
    }

    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.cells.len() - self.occupied
    }

    #[must_use]
    pub fn is_valid(&self, coord: Coord) -> bool {
        let s = i32::from(self.size);
        (0..s).contains(&coord.x) && (0..s).contains(&coord.y)
    }

    fn index(&self, coord: Coord) -> Result<usize, GridError> {
        if !self.is_valid(coord) {
            return Err(GridError::OutOfBounds {
                x: coord.x,
                y: coord.y,
                size: self.size,
            });
        }
        Ok(coord.y as usize * usize::from(self.size) + coord.x as usize)
    }

    fn coord_of(&self, idx: usize) -> Coord {
        let s = usize::from(self.size);
        Coord::new((idx % s) as i32, (idx / s) as i32)
    }

    pub fn get(&self, coord: Coord) -> Result<&Cell, GridError> {
        let idx = self.index(coord)?;
        Ok(&self.cells[idx])
    }

    /// Sets state and owner. Walls and radioactive cells accept only
    /// `Empty`, which resets the cell completely. An owned organism cell
    /// accepts only `Empty` or a write by its owner. Owners are kept only
    /// for organism cells.
    pub fn place(
        &mut self,
        coord: Coord,
        state: CellState,
        owner: Option<OrganismId>,
    ) -> Result<(), GridError> {
        let idx = self.index(coord)?;
        let cell = self.cells[idx];

        if cell.state.is_sticky() && state != CellState::Empty {
            return Err(GridError::Protected {
                x: coord.x,
                y: coord.y,
                state: cell.state,
            });
        }
        if cell.state == CellState::Organism
            && state != CellState::Empty
            && cell.owner.is_some()
            && cell.owner != owner
        {
            return Err(GridError::Occupied {
                x: coord.x,
                y: coord.y,
            });
        }

        self.write(idx, state, owner);
        if state == CellState::Empty {
            self.cells[idx].energy = 0.0;
        }
        Ok(())
    }

    /// Unchecked state write keeping the occupancy and food counters.
    fn write(&mut self, idx: usize, state: CellState, owner: Option<OrganismId>) {
        let cell = &mut self.cells[idx];
        let before = cell.state;
        cell.state = state;
        cell.owner = if state == CellState::Organism {
            owner
        } else {
            None
        };

        match (before == CellState::Empty, state == CellState::Empty) {
            (true, false) => self.occupied += 1,
            (false, true) => self.occupied -= 1,
            _ => {}
        }
        match (before == CellState::Food, state == CellState::Food) {
            (false, true) => self.food += 1,
            (true, false) => self.food -= 1,
            _ => {}
        }
    }

    /// Drops the owner. Cells holding energy degrade to food, others become
    /// empty. Walls and radioactive cells are left untouched. Returns the
    /// resulting state.
    pub fn clear(&mut self, coord: Coord) -> Result<CellState, GridError> {
        let idx = self.index(coord)?;
        let cell = self.cells[idx];
        if cell.state.is_sticky() {
            return Ok(cell.state);
        }
        let next = if cell.energy > 0.0 {
            CellState::Food
        } else {
            CellState::Empty
        };
        self.write(idx, next, None);
        Ok(next)
    }

    pub fn set_energy(&mut self, coord: Coord, energy: f32) -> Result<(), GridError> {
        let idx = self.index(coord)?;
        self.cells[idx].energy = energy.max(0.0);
        Ok(())
    }

    /// Removes and returns the cell's energy.
    pub fn take_energy(&mut self, coord: Coord) -> Result<f32, GridError> {
        let idx = self.index(coord)?;
        Ok(std::mem::take(&mut self.cells[idx].energy))
    }

    /// Places food carrying `energy`. Organism cells are refused.
    pub fn place_food(&mut self, coord: Coord, energy: f32) -> Result<(), GridError> {
        if self.get(coord)?.state == CellState::Organism {
            return Err(GridError::Occupied {
                x: coord.x,
                y: coord.y,
            });
        }
        self.place(coord, CellState::Food, None)?;
        self.set_energy(coord, energy)
    }

    /// Uniformly samples one empty cell. A few random draws usually hit
    /// one; a crowded grid falls back to picking the k-th empty cell.
    pub fn fetch_empty_cell<R: Rng>(&self, rng: &mut R) -> Result<Coord, GridError> {
        let empty = self.empty_count();
        if empty == 0 {
            return Err(GridError::GridFull);
        }
        if empty * 4 >= self.cells.len() {
            for _ in 0..RANDOM_DRAWS {
                let idx = rng.gen_range(0..self.cells.len());
                if self.cells[idx].state == CellState::Empty {
                    return Ok(self.coord_of(idx));
                }
            }
        }
        let k = rng.gen_range(0..empty);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.state == CellState::Empty)
            .nth(k)
            .map(|(idx, _)| self.coord_of(idx))
            .ok_or(GridError::GridFull)
    }

    /// Empty in-grid neighbours of `coord`, in compass order.
    #[must_use]
    pub fn empty_neighbours(&self, coord: Coord) -> Vec<Coord> {
        Direction::ALL
            .iter()
            .map(|&d| coord.step(d))
            .filter(|&c| {
                self.get(c)
                    .map(|cell| cell.state == CellState::Empty)
                    .unwrap_or(false)
            })
            .collect()
    }

    pub fn random_empty_neighbour<R: Rng>(&self, coord: Coord, rng: &mut R) -> Option<Coord> {
        let options = self.empty_neighbours(coord);
        if options.is_empty() {
            None
        } else {
            Some(options[rng.gen_range(0..options.len())])
        }
    }

    /// Movement legality for a step into `target`. Off-grid targets block.
    #[must_use]
    pub fn can_enter(&self, target: Coord) -> Entry {
        match self.get(target).map(|c| c.state) {
            Ok(CellState::Empty) => Entry::Enter,
            Ok(CellState::Food) => Entry::Eat,
            Ok(CellState::Radioactive) => Entry::Lethal,
            Ok(CellState::Organism | CellState::Wall) | Err(_) => Entry::Blocked,
        }
    }

    pub fn set_highlighted(&mut self, coord: Coord, on: bool) -> Result<(), GridError> {
        let idx = self.index(coord)?;
        self.cells[idx].highlighted = on;
        Ok(())
    }

    pub fn set_selected(&mut self, coord: Coord, on: bool) -> Result<(), GridError> {
        let idx = self.index(coord)?;
        self.cells[idx].selected = on;
        Ok(())
    }

    pub fn clear_marks(&mut self) {
        for cell in &mut self.cells {
            cell.highlighted = false;
            cell.selected = false;
        }
    }

    /// Full scan; prefer [`Grid::occupied`] and [`Grid::food_count`] in
    /// hot paths.
    #[must_use]
    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|c| c.state == state).count()
    }

    /// Recounts non-empty cells; equals [`Grid::occupied`] at all times.
    #[must_use]
    pub fn recount_occupied(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.state != CellState::Empty)
            .count()
    }

    /// Iterates `(coord, cell)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (self.coord_of(idx), cell))
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(usize::from(self.size).max(1)) {
            let line: String = row.iter().map(|c| c.state.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
