/// Grid bounds and the occupancy query.
///
/// The arena is the single source of truth for positions; there is no
/// separate cell index to keep in sync. `occupant()` answers "who is at
/// (x, y)" by scanning live slots in arena order, so when two actors share
/// a cell (the player standing on a flag) the earlier one wins.

use super::actor::{Actor, ActorId};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid { width, height }
    }

    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// `(x + dx, y + dy)` if it stays on the grid.
    #[inline]
    pub fn offset(&self, x: usize, y: usize, dx: i32, dy: i32) -> Option<(usize, usize)> {
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if self.contains(nx, ny) {
            Some((nx as usize, ny as usize))
        } else {
            None
        }
    }
}

/// First live actor at (x, y), skipping `except`.
pub fn occupant(actors: &[Option<Actor>], x: usize, y: usize, except: Option<ActorId>) -> Option<ActorId> {
    actors.iter().enumerate().find_map(|(i, slot)| match slot {
        Some(a) if a.at(x, y) && except != Some(ActorId(i)) => Some(ActorId(i)),
        _ => None,
    })
}

/// Neighbour lookup that tolerates the grid edge (and x/y = 0).
pub fn occupant_at_offset(
    actors: &[Option<Actor>],
    grid: Grid,
    x: usize,
    y: usize,
    dx: i32,
    dy: i32,
) -> Option<ActorId> {
    let (nx, ny) = grid.offset(x, y, dx, dy)?;
    occupant(actors, nx, ny, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::Noun;

    #[test]
    fn offset_respects_bounds() {
        let g = Grid::new(3, 2);
        assert_eq!(g.offset(0, 0, 1, 0), Some((1, 0)));
        assert_eq!(g.offset(0, 0, -1, 0), None);
        assert_eq!(g.offset(2, 1, 1, 0), None);
        assert_eq!(g.offset(2, 1, 0, 1), None);
        assert_eq!(g.offset(2, 1, 0, -1), Some((2, 0)));
    }

    #[test]
    fn occupant_prefers_arena_order_and_skips_tombstones() {
        let actors = vec![
            None,
            Some(Actor::character(1, 1, Noun::Flag)),
            Some(Actor::character(1, 1, Noun::Meepo)),
        ];
        assert_eq!(occupant(&actors, 1, 1, None), Some(ActorId(1)));
        assert_eq!(occupant(&actors, 1, 1, Some(ActorId(1))), Some(ActorId(2)));
        assert_eq!(occupant(&actors, 0, 0, None), None);
    }

    #[test]
    fn neighbour_off_the_edge_is_none() {
        let actors = vec![Some(Actor::is(0, 0))];
        let g = Grid::new(2, 2);
        assert_eq!(occupant_at_offset(&actors, g, 0, 0, -1, 0), None);
        assert_eq!(occupant_at_offset(&actors, g, 1, 0, -1, 0), Some(ActorId(0)));
    }
}
