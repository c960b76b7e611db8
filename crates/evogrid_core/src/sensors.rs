//! Grid-derived sensor readings.

use crate::brain::{Sensor, SENSOR_COUNT};
use crate::config::AppConfig;
use crate::grid::Grid;
use crate::organism::Organism;
use evogrid_data::{CellState, Coord, Direction};
use rand::Rng;

/// Sensor values captured once per organism per tick, indexed by sensor id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorFrame {
    pub values: [f32; SENSOR_COUNT],
}

impl SensorFrame {
    pub fn capture<R: Rng>(
        grid: &Grid,
        organism: &Organism,
        config: &AppConfig,
        rng: &mut R,
    ) -> Self {
        let mut values = [0.0; SENSOR_COUNT];
        for sensor in Sensor::ALL {
            values[usize::from(sensor.id())] = read(sensor, grid, organism, config, rng);
        }
        Self { values }
    }

    /// Reading for a raw sensor id; unknown ids read as zero.
    #[must_use]
    pub fn get(&self, id: usize) -> f32 {
        self.values.get(id).copied().unwrap_or(0.0)
    }
}

pub fn read<R: Rng>(
    sensor: Sensor,
    grid: &Grid,
    organism: &Organism,
    config: &AppConfig,
    rng: &mut R,
) -> f32 {
    let pos = organism.position;
    let size = i32::from(grid.size());
    match sensor {
        Sensor::LocX => normalized_location(pos.x, size),
        Sensor::LocY => normalized_location(pos.y, size),
        Sensor::BoundaryDistX => boundary_distance(pos.x, size),
        Sensor::BoundaryDistY => boundary_distance(pos.y, size),
        Sensor::BoundaryDist => {
            boundary_distance(pos.x, size).min(boundary_distance(pos.y, size))
        }
        Sensor::LookNorth => look(grid, pos, Direction::North),
        Sensor::LookEast => look(grid, pos, Direction::East),
        Sensor::LookSouth => look(grid, pos, Direction::South),
        Sensor::LookWest => look(grid, pos, Direction::West),
        Sensor::Energy => organism.energy / config.metabolism.max_energy,
        Sensor::Age => (organism.age as f32 / config.metabolism.max_age as f32).min(1.0),
        Sensor::Random => rng.gen::<f32>(),
        Sensor::Oscillator => {
            let phase = organism.age as f32 / config.brain.oscillator_period;
            0.5 + 0.5 * (std::f32::consts::TAU * phase).sin()
        }
        Sensor::Facing => organism.direction.index() as f32 / Direction::ALL.len() as f32,
    }
}

fn normalized_location(c: i32, size: i32) -> f32 {
    if size <= 1 {
        0.0
    } else {
        c as f32 / (size - 1) as f32
    }
}

/// `min(c, S-1-c) / (S/2)`: 0 at an edge, about 1 at the centre.
fn boundary_distance(c: i32, size: i32) -> f32 {
    let d = c.min(size - 1 - c).max(0);
    d as f32 / (size as f32 / 2.0)
}

/// Maps the adjacent cell in `direction` to a signed scalar.
#[must_use]
pub fn look(grid: &Grid, from: Coord, direction: Direction) -> f32 {
    match grid.get(from.step(direction)).map(|c| c.state) {
        Ok(CellState::Empty) => 0.0,
        Ok(CellState::Food) => 1.0,
        Ok(CellState::Organism) => -0.5,
        Ok(CellState::Wall | CellState::Radioactive) | Err(_) => -1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::NeuronCounts;
    use evogrid_data::{Genome, OrganismId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn organism_at(x: i32, y: i32) -> Organism {
        Organism::new(
            OrganismId(0),
            Coord::new(x, y),
            Genome::default(),
            NeuronCounts::with_hidden(1),
            50.0,
        )
    }

    #[test]
    fn test_look_sensors() {
        let mut grid = Grid::new(5);
        let at = Coord::new(2, 2);
        grid.place(Coord::new(2, 1), CellState::Food, None).unwrap();
        grid.place(Coord::new(3, 2), CellState::Wall, None).unwrap();
        grid.place(Coord::new(2, 3), CellState::Organism, Some(OrganismId(9)))
            .unwrap();
        assert_eq!(look(&grid, at, Direction::North), 1.0);
        assert_eq!(look(&grid, at, Direction::East), -1.0);
        assert_eq!(look(&grid, at, Direction::South), -0.5);
        assert_eq!(look(&grid, at, Direction::West), 0.0);
        assert_eq!(look(&grid, Coord::new(0, 0), Direction::North), -1.0);
    }

    #[test]
    fn test_location_and_boundary_sensors() {
        let grid = Grid::new(5);
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let corner = SensorFrame::capture(&grid, &organism_at(0, 4), &config, &mut rng);
        assert_eq!(corner.get(Sensor::LocX.id().into()), 0.0);
        assert_eq!(corner.get(Sensor::LocY.id().into()), 1.0);
        assert_eq!(corner.get(Sensor::BoundaryDist.id().into()), 0.0);

        let centre = SensorFrame::capture(&grid, &organism_at(2, 2), &config, &mut rng);
        assert!((centre.get(Sensor::BoundaryDistX.id().into()) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_frame_values_are_bounded() {
        let grid = Grid::new(8);
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut org = organism_at(3, 5);
        org.age = 17;
        let frame = SensorFrame::capture(&grid, &org, &config, &mut rng);
        for v in frame.values {
            assert!((-1.0..=1.0).contains(&v), "{v}");
        }
        assert_eq!(frame.get(999), 0.0);
    }
}
