/// Push resolver, truth-table driven.
///
/// One call resolves exactly one step for one actor. Chains are handled by
/// recursion: the mover steps into the occupied cell first, then asks the
/// occupant to move the same way.
///
/// ## Move Truth Table
/// ┌────────────────────────────────┬──────────┬──────────────────────────┐
/// │ Destination                    │ Result   │ Effect                   │
/// ├────────────────────────────────┼──────────┼──────────────────────────┤
/// │ off the grid                   │ false    │ nothing moves            │
/// │ empty                          │ true     │ mover steps              │
/// │ stop && !push                  │ false    │ nothing moves            │
/// │ push                           │ true     │ mover steps, occupant    │
/// │                                │          │ recurses; mover steps    │
/// │                                │          │ back if still overlapping│
/// │ neither stop nor push          │ true     │ mover steps (overlap)    │
/// └────────────────────────────────┴──────────┴──────────────────────────┘
///
/// A push chain that stalls further down the line still reports `true`
/// for the outer mover even though nobody ended up moving. Callers that
/// need "did anything change" must compare positions.

use super::actor::{Actor, ActorId};
use super::grid::{occupant, Grid};

/// Move actor `id` by `(dx, dy)`, pushing whatever is in the way.
/// `dx`, `dy` ∈ {-1, 0, 1}, at most one nonzero.
pub fn try_move(actors: &mut [Option<Actor>], grid: Grid, id: ActorId, dx: i32, dy: i32) -> bool {
    let Some((x, y)) = position(actors, id) else { return false };
    let Some((nx, ny)) = grid.offset(x, y, dx, dy) else { return false };

    let Some(other) = occupant(actors, nx, ny, Some(id)) else {
        set_position(actors, id, nx, ny);
        return true;
    };

    let (stop, push) = match &actors[other.0] {
        Some(a) => (a.is_stop(), a.is_push()),
        None => (false, false),
    };

    if stop && !push {
        return false;
    }

    if push {
        set_position(actors, id, nx, ny);
        try_move(actors, grid, other, dx, dy);
        if position(actors, other) == Some((nx, ny)) {
            set_position(actors, id, x, y);
        }
        return true;
    }

    set_position(actors, id, nx, ny);
    true
}

fn position(actors: &[Option<Actor>], id: ActorId) -> Option<(usize, usize)> {
    actors.get(id.0)?.as_ref().map(|a| (a.x, a.y))
}

fn set_position(actors: &mut [Option<Actor>], id: ActorId, x: usize, y: usize) {
    if let Some(Some(a)) = actors.get_mut(id.0) {
        a.x = x;
        a.y = y;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::{Noun, Property, Role};
    use proptest::prelude::*;

    /// Build an arena from a diagram.
    /// Legend: '@'=player Meepo  'W'=Wall word  'P'=Push word  'I'=Is word
    ///         '#'=solid Wall    'o'=pushable Rock  'f'=plain Flag  '.'=empty
    fn arena_from(rows: &[&str]) -> (Vec<Option<Actor>>, Grid) {
        let mut actors = vec![];
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let actor = match ch {
                    '@' => with_role(Actor::character(x, y, Noun::Meepo), Role::Player),
                    '#' => with_role(Actor::character(x, y, Noun::Wall), Role::Solid),
                    'o' => with_role(Actor::character(x, y, Noun::Rock), Role::Pushable),
                    'f' => Actor::character(x, y, Noun::Flag),
                    'W' => Actor::subject(x, y, Noun::Wall),
                    'P' => Actor::attribute(x, y, Property::Push),
                    'I' => Actor::is(x, y),
                    _ => continue,
                };
                actors.push(Some(actor));
            }
        }
        (actors, Grid::new(rows[0].len(), rows.len()))
    }

    fn with_role(mut a: Actor, role: Role) -> Actor {
        if let Some(c) = a.as_character_mut() {
            c.role = role;
        }
        a
    }

    fn pos(actors: &[Option<Actor>], i: usize) -> (usize, usize) {
        let a = actors[i].as_ref().unwrap();
        (a.x, a.y)
    }

    fn positions(actors: &[Option<Actor>]) -> Vec<(usize, usize)> {
        actors.iter().flatten().map(|a| (a.x, a.y)).collect()
    }

    // ── Single step ──

    #[test]
    fn step_into_empty_cell() {
        let (mut a, g) = arena_from(&["@.."]);
        assert!(try_move(&mut a, g, ActorId(0), 1, 0));
        assert_eq!(pos(&a, 0), (1, 0));
    }

    #[test]
    fn blocked_by_grid_edge() {
        let (mut a, g) = arena_from(&["@.."]);
        assert!(!try_move(&mut a, g, ActorId(0), -1, 0));
        assert!(!try_move(&mut a, g, ActorId(0), 0, -1));
        assert!(!try_move(&mut a, g, ActorId(0), 0, 1));
        assert_eq!(pos(&a, 0), (0, 0));
    }

    #[test]
    fn blocked_by_solid() {
        let (mut a, g) = arena_from(&["@#."]);
        let before = positions(&a);
        assert!(!try_move(&mut a, g, ActorId(0), 1, 0));
        assert_eq!(positions(&a), before);
    }

    #[test]
    fn walks_over_passable_character() {
        let (mut a, g) = arena_from(&["@f."]);
        assert!(try_move(&mut a, g, ActorId(0), 1, 0));
        assert_eq!(pos(&a, 0), (1, 0));
        assert_eq!(pos(&a, 1), (1, 0));
    }

    // ── Push chains ──

    #[test]
    fn push_word_block_down() {
        let (mut a, g) = arena_from(&[
            "@",
            "W",
            ".",
        ]);
        assert!(try_move(&mut a, g, ActorId(0), 0, 1));
        assert_eq!(pos(&a, 0), (0, 1));
        assert_eq!(pos(&a, 1), (0, 2));
    }

    #[test]
    fn push_chain_of_three() {
        let (mut a, g) = arena_from(&["@WIP.."]);
        assert!(try_move(&mut a, g, ActorId(0), 1, 0));
        assert_eq!(positions(&a), vec![(1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn push_mixed_chain_of_blocks_and_pushable_rocks() {
        let (mut a, g) = arena_from(&["@oWo."]);
        assert!(try_move(&mut a, g, ActorId(0), 1, 0));
        assert_eq!(positions(&a), vec![(1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn stalled_chain_against_edge_moves_nothing_but_reports_true() {
        let (mut a, g) = arena_from(&["@WIP"]);
        let before = positions(&a);
        assert!(try_move(&mut a, g, ActorId(0), 1, 0));
        assert_eq!(positions(&a), before);
    }

    #[test]
    fn stalled_chain_against_solid_moves_nothing() {
        let (mut a, g) = arena_from(&["@WI#."]);
        let before = positions(&a);
        try_move(&mut a, g, ActorId(0), 1, 0);
        assert_eq!(positions(&a), before);
    }

    #[test]
    fn pushable_rock_stalled_against_solid_does_not_overlap() {
        let (mut a, g) = arena_from(&["@o#"]);
        try_move(&mut a, g, ActorId(0), 1, 0);
        assert_eq!(pos(&a, 0), (0, 0));
        assert_eq!(pos(&a, 1), (1, 0));
    }

    #[test]
    fn push_across_passable_character() {
        // Flag is neither stop nor push: the block slides onto it.
        let (mut a, g) = arena_from(&["@Wf"]);
        assert!(try_move(&mut a, g, ActorId(0), 1, 0));
        assert_eq!(pos(&a, 0), (1, 0));
        assert_eq!(pos(&a, 1), (2, 0));
    }

    #[test]
    fn tombstoned_actor_cannot_move() {
        let (mut a, g) = arena_from(&["@.."]);
        a[0] = None;
        assert!(!try_move(&mut a, g, ActorId(0), 1, 0));
    }

    // ── Properties ──

    fn cell() -> impl Strategy<Value = char> {
        prop_oneof![Just('.'), Just('.'), Just('#'), Just('o'), Just('f'), Just('W'), Just('I')]
    }

    proptest! {
        #[test]
        fn failed_move_mutates_nothing(
            row in proptest::collection::vec(cell(), 1..7),
            dir in 0usize..4,
        ) {
            let line: String = std::iter::once('@').chain(row).collect();
            let (mut a, g) = arena_from(&[line.as_str()]);
            let (dx, dy) = [(1, 0), (-1, 0), (0, 1), (0, -1)][dir];
            let before = positions(&a);
            if !try_move(&mut a, g, ActorId(0), dx, dy) {
                prop_assert_eq!(positions(&a), before);
            }
        }

        #[test]
        fn open_chain_shifts_by_one(n in 1usize..6) {
            let line = format!("@{}.", "W".repeat(n));
            let (mut a, g) = arena_from(&[line.as_str()]);
            let before = positions(&a);
            prop_assert!(try_move(&mut a, g, ActorId(0), 1, 0));
            let after = positions(&a);
            for (b, c) in before.iter().zip(after.iter()) {
                prop_assert_eq!((b.0 + 1, b.1), *c);
            }
        }
    }
}
