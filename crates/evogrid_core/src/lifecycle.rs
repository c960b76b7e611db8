//! Per-tick rules for a single organism: ageing, energy, movement, death.

use crate::brain::{Action, ACTION_COUNT};
use crate::config::AppConfig;
use crate::error::GridError;
use crate::grid::{Entry, Grid};
use crate::organism::Organism;
use evogrid_data::{CellState, DeathCause, Direction};
use rand::Rng;

/// What happened when an organism tried to move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// No step was drawn.
    Idle,
    Moved,
    /// Moved onto food and absorbed this much energy.
    Ate(f32),
    Blocked,
    Died(DeathCause),
}

/// Ages the organism and charges the idle cost. Returns the cause if this
/// call killed it.
pub fn age_and_metabolize(organism: &mut Organism, config: &AppConfig) -> Option<DeathCause> {
    organism.age = organism.age.saturating_add(1);
    organism.spend_energy(config.metabolism.idle_cost);

    let cause = if organism.age >= config.metabolism.max_age {
        DeathCause::OldAge
    } else if organism.energy <= 0.0 {
        DeathCause::Starvation
    } else {
        return None;
    };
    organism.kill(cause).then_some(cause)
}

fn level(levels: &[f32], action: Action) -> f32 {
    levels.get(action.index()).copied().unwrap_or(0.0)
}

/// Turns raw action levels into a grid step `(dx, dy)` with `dy` growing
/// southward, or `None` when neither axis fires.
///
/// Axis levels are combined, squashed with `tanh`, and `|tanh|` is the
/// probability of stepping along that axis.
pub fn decide_step<R: Rng>(
    levels: &[f32],
    facing: Direction,
    rng: &mut R,
) -> Option<(i32, i32)> {
    debug_assert!(levels.len() >= ACTION_COUNT);

    let (face_dx, face_dy) = facing.offset();
    let wander = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
    let (rand_dx, rand_dy) = wander.offset();

    let forward = level(levels, Action::MoveForward);
    let random = level(levels, Action::MoveRandom);

    let x = level(levels, Action::MoveX) + level(levels, Action::MoveEast)
        - level(levels, Action::MoveWest)
        + forward * face_dx as f32
        + random * rand_dx as f32;
    // Positive means north, which is a negative row offset.
    let north = level(levels, Action::MoveY) + level(levels, Action::MoveNorth)
        - level(levels, Action::MoveSouth)
        - forward * face_dy as f32
        - random * rand_dy as f32;

    let dx = axis_step(x, rng);
    let dy = -axis_step(north, rng);
    if dx == 0 && dy == 0 {
        None
    } else {
        Some((dx, dy))
    }
}

fn axis_step<R: Rng>(level: f32, rng: &mut R) -> i32 {
    let p = level.tanh();
    if p == 0.0 || !p.is_finite() {
        return 0;
    }
    if rng.gen::<f32>() < p.abs() {
        if p > 0.0 {
            1
        } else {
            -1
        }
    } else {
        0
    }
}

/// Moves the organism one step, paying the movement cost first. A diagonal
/// step costs twice as much. Radioactive targets kill without being
/// entered; food is eaten on entry.
pub fn apply_step(
    organism: &mut Organism,
    grid: &mut Grid,
    (dx, dy): (i32, i32),
    config: &AppConfig,
) -> Result<MoveOutcome, GridError> {
    let cost = if dx != 0 && dy != 0 {
        config.metabolism.move_cost * 2.0
    } else {
        config.metabolism.move_cost
    };
    if organism.spend_energy(cost) {
        return Ok(die(organism, grid, DeathCause::Starvation, config)?
            .map_or(MoveOutcome::Blocked, MoveOutcome::Died));
    }

    let target = organism.position.offset(dx, dy);
    let outcome = match grid.can_enter(target) {
        Entry::Blocked => return Ok(MoveOutcome::Blocked),
        Entry::Lethal => {
            return Ok(die(organism, grid, DeathCause::Radiation, config)?
                .map_or(MoveOutcome::Blocked, MoveOutcome::Died));
        }
        Entry::Eat => {
            let food = food_energy(grid.take_energy(target)?, config);
            MoveOutcome::Ate(organism.gain_energy(food, config.metabolism.max_energy))
        }
        Entry::Enter => MoveOutcome::Moved,
    };

    if grid.get(organism.position)?.owner == Some(organism.id) {
        grid.place(organism.position, CellState::Empty, None)?;
    }
    grid.place(target, CellState::Organism, Some(organism.id))?;
    organism.position = target;
    organism.steps += 1;
    if let Some(direction) = Direction::from_offset(dx, dy) {
        organism.direction = direction;
    }
    Ok(outcome)
}

/// Energy gained from a food cell: its stored energy, or `energy_from_food`
/// when the cell was written without any.
fn food_energy(stored: f32, config: &AppConfig) -> f32 {
    if stored > 0.0 {
        stored
    } else {
        config.metabolism.energy_from_food
    }
}

/// Kills the organism and frees its cell, leaving food behind when
/// configured. Returns the cause only for the call that killed it.
pub fn die(
    organism: &mut Organism,
    grid: &mut Grid,
    cause: DeathCause,
    config: &AppConfig,
) -> Result<Option<DeathCause>, GridError> {
    if !organism.kill(cause) {
        return Ok(None);
    }
    release_cell(organism, grid, config)?;
    Ok(Some(cause))
}

/// Frees the cell of an organism that is already dead.
pub fn release_cell(
    organism: &Organism,
    grid: &mut Grid,
    config: &AppConfig,
) -> Result<(), GridError> {
    let cell = grid.get(organism.position)?;
    if cell.owner != Some(organism.id) {
        return Ok(());
    }
    let residual = if config.metabolism.drop_food_on_death {
        config.metabolism.energy_from_food
    } else {
        0.0
    };
    grid.set_energy(organism.position, residual)?;
    grid.clear(organism.position)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::NeuronCounts;
    use evogrid_data::{Coord, Genome, OrganismId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup(at: Coord) -> (Organism, Grid, AppConfig) {
        let mut grid = Grid::new(5);
        let org = Organism::new(
            OrganismId(1),
            at,
            Genome::default(),
            NeuronCounts::with_hidden(1),
            50.0,
        );
        grid.place(at, CellState::Organism, Some(org.id)).unwrap();
        (org, grid, AppConfig::default())
    }

    #[test]
    fn test_old_age_kills_once() {
        let (mut org, _grid, mut config) = setup(Coord::new(0, 0));
        config.metabolism.max_age = 2;
        assert_eq!(age_and_metabolize(&mut org, &config), None);
        assert_eq!(age_and_metabolize(&mut org, &config), Some(DeathCause::OldAge));
        assert_eq!(age_and_metabolize(&mut org, &config), None);
        assert!(!org.is_alive());
    }

    #[test]
    fn test_idle_cost_starves() {
        let (mut org, _grid, mut config) = setup(Coord::new(0, 0));
        config.metabolism.idle_cost = 30.0;
        assert_eq!(age_and_metabolize(&mut org, &config), None);
        assert_eq!(
            age_and_metabolize(&mut org, &config),
            Some(DeathCause::Starvation)
        );
        assert_eq!(org.energy, 0.0);
    }

    #[test]
    fn test_zero_levels_never_move() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(decide_step(&[0.0; ACTION_COUNT], Direction::East, &mut rng), None);
        }
    }

    #[test]
    fn test_saturated_levels_always_move() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut levels = [0.0; ACTION_COUNT];
        levels[Action::MoveY.index()] = 50.0;
        levels[Action::MoveWest.index()] = 50.0;
        for _ in 0..50 {
            assert_eq!(
                decide_step(&levels, Direction::North, &mut rng),
                Some((-1, -1))
            );
        }
    }

    #[test]
    fn test_forward_follows_facing() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut levels = [0.0; ACTION_COUNT];
        levels[Action::MoveForward.index()] = 50.0;
        assert_eq!(
            decide_step(&levels, Direction::SouthEast, &mut rng),
            Some((1, 1))
        );
    }

    #[test]
    fn test_step_into_empty_moves() {
        let (mut org, mut grid, config) = setup(Coord::new(2, 2));
        let out = apply_step(&mut org, &mut grid, (1, 0), &config).unwrap();
        assert_eq!(out, MoveOutcome::Moved);
        assert_eq!(org.position, Coord::new(3, 2));
        assert_eq!(org.direction, Direction::East);
        assert_eq!(grid.get(Coord::new(2, 2)).unwrap().state, CellState::Empty);
        assert_eq!(grid.get(Coord::new(3, 2)).unwrap().owner, Some(org.id));
        assert_eq!(org.energy, 50.0 - config.metabolism.move_cost);
        assert_eq!(grid.occupied(), 1);
    }

    #[test]
    fn test_diagonal_costs_double() {
        let (mut org, mut grid, config) = setup(Coord::new(2, 2));
        apply_step(&mut org, &mut grid, (1, 1), &config).unwrap();
        assert_eq!(org.energy, 50.0 - 2.0 * config.metabolism.move_cost);
    }

    #[test]
    fn test_step_onto_food_eats() {
        let (mut org, mut grid, config) = setup(Coord::new(2, 2));
        grid.place_food(Coord::new(2, 1), 40.0).unwrap();
        let out = apply_step(&mut org, &mut grid, (0, -1), &config).unwrap();
        assert_eq!(out, MoveOutcome::Ate(40.0));
        assert_eq!(grid.get(Coord::new(2, 1)).unwrap().energy, 0.0);
        assert_eq!(grid.occupied(), 1);
    }

    #[test]
    fn test_wall_blocks() {
        let (mut org, mut grid, config) = setup(Coord::new(0, 0));
        grid.place(Coord::new(1, 0), CellState::Wall, None).unwrap();
        assert_eq!(
            apply_step(&mut org, &mut grid, (1, 0), &config).unwrap(),
            MoveOutcome::Blocked
        );
        assert_eq!(
            apply_step(&mut org, &mut grid, (-1, 0), &config).unwrap(),
            MoveOutcome::Blocked
        );
        assert_eq!(org.position, Coord::new(0, 0));
    }

    #[test]
    fn test_radioactive_kills_and_leaves_food() {
        let (mut org, mut grid, config) = setup(Coord::new(2, 2));
        grid.place(Coord::new(2, 3), CellState::Radioactive, None)
            .unwrap();
        let out = apply_step(&mut org, &mut grid, (0, 1), &config).unwrap();
        assert_eq!(out, MoveOutcome::Died(DeathCause::Radiation));
        assert!(!org.is_alive());
        let cell = grid.get(Coord::new(2, 2)).unwrap();
        assert_eq!(cell.state, CellState::Food);
        assert_eq!(cell.owner, None);
        assert_eq!(grid.occupied(), grid.recount_occupied());
    }

    #[test]
    fn test_move_cost_can_starve() {
        let (mut org, mut grid, mut config) = setup(Coord::new(2, 2));
        config.metabolism.move_cost = 100.0;
        config.metabolism.drop_food_on_death = false;
        let out = apply_step(&mut org, &mut grid, (1, 0), &config).unwrap();
        assert_eq!(out, MoveOutcome::Died(DeathCause::Starvation));
        assert_eq!(grid.get(Coord::new(2, 2)).unwrap().state, CellState::Empty);
        assert_eq!(grid.occupied(), 0);
    }
}
