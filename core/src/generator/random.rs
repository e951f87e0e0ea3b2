use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use ndarray::Array2;

use super::*;

/// Uniform random placement that keeps the first-revealed cell and its whole
/// 3x3 neighborhood mine-free.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
    safe_center: Coord2,
}

impl RandomLayoutGenerator {
    pub const fn new(seed: u64, safe_center: Coord2) -> Self {
        Self { seed, safe_center }
    }
}

impl LayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use rand::prelude::*;

        let bounds = config.size;
        let safe: BTreeSet<Coord2> = safe_zone(self.safe_center, bounds).collect();

        let candidates: Vec<Coord2> = (0..bounds.0)
            .flat_map(|x| (0..bounds.1).map(move |y| (x, y)))
            .filter(|coords| !safe.contains(coords))
            .collect();

        // When the safe zone leaves too few cells, fewer mines than requested
        // are placed. The safe zone always wins.
        let requested = usize::from(config.mines);
        let placeable = requested.min(candidates.len());
        if placeable < requested {
            log::warn!(
                "only {} of {} mines fit outside the safe zone, placing fewer",
                placeable,
                requested
            );
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(bounds.to_nd_index());
        for index in rand::seq::index::sample(&mut rng, candidates.len(), placeable) {
            mine_mask[candidates[index].to_nd_index()] = true;
        }

        MineLayout::from_mine_mask(mine_mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(seed: u64, center: Coord2, config: GameConfig) -> MineLayout {
        RandomLayoutGenerator::new(seed, center).generate(config)
    }

    #[test]
    fn safe_zone_is_never_mined() {
        let config = Difficulty::Beginner.preset();
        for seed in 0..32 {
            let layout = generate(seed, (4, 4), config);
            for coords in safe_zone((4, 4), config.size) {
                assert!(!layout.contains_mine(coords), "seed {} mined {:?}", seed, coords);
            }
        }
    }

    #[test]
    fn safe_zone_is_clipped_at_the_corner() {
        let config = Difficulty::Beginner.preset();
        for seed in 0..8 {
            let layout = generate(seed, (0, 0), config);
            for coords in [(0, 0), (0, 1), (1, 0), (1, 1)] {
                assert!(!layout.contains_mine(coords));
            }
            assert_eq!(layout.mine_count(), config.mines);
        }
    }

    #[test]
    fn places_exactly_the_requested_mines_when_they_fit() {
        for difficulty in Difficulty::ALL {
            let config = difficulty.preset();
            let layout = generate(99, (4, 4), config);
            assert_eq!(layout.mine_count(), config.mines);
            assert_eq!(layout.size(), config.size);
        }
    }

    #[test]
    fn degrades_to_fewer_mines_when_the_board_is_too_full() {
        // 4x4 board, corner safe zone covers 4 cells, so only 12 fit
        let config = GameConfig::new_unchecked(Difficulty::Beginner, (4, 4), 20);
        let layout = generate(1, (0, 0), config);
        assert_eq!(layout.mine_count(), 12);
    }

    #[test]
    fn places_no_mines_when_the_safe_zone_covers_the_board() {
        let config = GameConfig::new_unchecked(Difficulty::Beginner, (3, 3), 5);
        let layout = generate(1, (1, 1), config);
        assert_eq!(layout.mine_count(), 0);
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let config = Difficulty::Intermediate.preset();
        assert_eq!(generate(7, (8, 8), config), generate(7, (8, 8), config));
        assert_ne!(generate(7, (8, 8), config), generate(8, (8, 8), config));
    }
}
