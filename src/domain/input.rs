/// Per-tick input snapshot. The terminal layer fills this in; the
/// simulation never sees raw key events.

use super::actor::Facing;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
        }
    }

    pub fn facing(self) -> Facing {
        match self {
            MoveDir::Left => Facing::Left,
            MoveDir::Right => Facing::Right,
            MoveDir::Up => Facing::Up,
            MoveDir::Down => Facing::Down,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Undo combo (Ctrl-Z) pressed this tick.
    pub undo: bool,
}

impl Controls {
    /// One direction per tick. Left beats Right beats Up beats Down.
    pub fn direction(&self) -> Option<MoveDir> {
        if self.left {
            Some(MoveDir::Left)
        } else if self.right {
            Some(MoveDir::Right)
        } else if self.up {
            Some(MoveDir::Up)
        } else if self.down {
            Some(MoveDir::Down)
        } else {
            None
        }
    }

    pub fn moving(dir: MoveDir) -> Self {
        let mut c = Controls::default();
        match dir {
            MoveDir::Left => c.left = true,
            MoveDir::Right => c.right = true,
            MoveDir::Up => c.up = true,
            MoveDir::Down => c.down = true,
        }
        c
    }

    pub fn undo() -> Self {
        Controls { undo: true, ..Controls::default() }
    }
}
