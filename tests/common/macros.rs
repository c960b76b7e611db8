/// Asserts that the organism is in the world and alive.
#[macro_export]
macro_rules! assert_alive {
    ($world:expr, $id:expr) => {
        let organism = $world.organism($id).expect("organism not found in world");
        assert!(organism.is_alive(), "organism {} should be alive", $id);
    };
}

/// Asserts that the organism has been removed from the world.
#[macro_export]
macro_rules! assert_dead {
    ($world:expr, $id:expr) => {
        assert!(
            $world.organism($id).is_none(),
            "organism {} should be dead but was found",
            $id
        );
    };
}

/// Asserts that the grid's occupancy counter matches a full recount and
/// that every organism sits on a cell it owns.
#[macro_export]
macro_rules! assert_grid_consistent {
    ($world:expr) => {
        let grid = $world.grid();
        assert_eq!(
            grid.occupied(),
            grid.recount_occupied(),
            "occupancy counter drifted"
        );
        for organism in $world.organisms() {
            let cell = grid.get(organism.position).expect("organism off grid");
            assert_eq!(
                cell.owner,
                Some(organism.id),
                "organism {} does not own its cell",
                organism.id
            );
        }
        assert_eq!(
            grid.count(evogrid_data::CellState::Organism),
            $world.organisms().count(),
            "organism cells and population disagree"
        );
    };
}
