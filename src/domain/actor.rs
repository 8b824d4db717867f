/// Actors: everything that occupies a grid cell.
///
/// Two families share one arena:
///   - **Characters**: Meepo, Wall, Rock, Flag, Bush. Their behaviour is
///     granted by rules: one `Role` (player / solid / pushable) and one `Goal`.
///   - **Blocks**: the word tiles rules are written with. Always solid and
///     always pushable.
///
/// `Role` is a single enum on purpose: an actor is never player+solid,
/// player+pushable or solid+pushable at the same time.

/// Stable handle into the actor arena. Survives removals (slots are
/// tombstoned, never compacted) so snapshots and Is lists stay valid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ActorId(pub usize);

/// Character kinds that a Subject word can name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Noun {
    Meepo,
    Wall,
    Rock,
    Flag,
    Bush,
}

impl Noun {
    pub const ALL: [Noun; 5] = [Noun::Meepo, Noun::Wall, Noun::Rock, Noun::Flag, Noun::Bush];

    /// Word printed on the Subject block. Case-sensitive.
    pub fn word(self) -> &'static str {
        match self {
            Noun::Meepo => "Meepo",
            Noun::Wall => "Wall",
            Noun::Rock => "Rock",
            Noun::Flag => "Flag",
            Noun::Bush => "Bush",
        }
    }

    pub fn from_word(word: &str) -> Option<Noun> {
        Noun::ALL.into_iter().find(|n| n.word() == word)
    }
}

/// Capabilities an Attribute word can grant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Property {
    You,
    Push,
    Stop,
    Victory,
    Lose,
}

impl Property {
    pub const ALL: [Property; 5] = [
        Property::You, Property::Push, Property::Stop, Property::Victory, Property::Lose,
    ];

    pub fn word(self) -> &'static str {
        match self {
            Property::You => "You",
            Property::Push => "Push",
            Property::Stop => "Stop",
            Property::Victory => "Victory",
            Property::Lose => "Lose",
        }
    }

    pub fn from_word(word: &str) -> Option<Property> {
        Property::ALL.into_iter().find(|p| p.word() == word)
    }
}

/// Movement role of a character. Exactly one at a time.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Role {
    #[default]
    None,
    Player,
    Solid,
    Pushable,
}

/// Win/lose marker of a character. Victory and Defeat exclude each other.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Goal {
    #[default]
    Neutral,
    Victory,
    Defeat,
}

/// How many rules an Is tile currently expresses. Derived every tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum IsLight {
    #[default]
    Off,
    Half,
    Full,
}

impl IsLight {
    pub fn from_count(rules: usize) -> IsLight {
        match rules {
            0 => IsLight::Off,
            1 => IsLight::Half,
            _ => IsLight::Full,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Facing {
    Left,
    Right,
    Up,
    #[default]
    Down,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Word {
    Subject(Noun),
    Attribute(Property),
    Is { light: IsLight },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Character {
    pub noun: Noun,
    pub role: Role,
    pub goal: Goal,
    // cosmetic walk cycle
    pub facing: Facing,
    pub stride: bool,
}

impl Character {
    pub fn new(noun: Noun) -> Self {
        Character {
            noun,
            role: if noun == Noun::Bush { Role::Solid } else { Role::None },
            goal: Goal::Neutral,
            facing: Facing::Down,
            stride: false,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorKind {
    Character(Character),
    Block(Word),
}

/// Opaque visual handle handed to the presentation layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Visual {
    Character { noun: Noun, facing: Facing, stride: bool, player: bool },
    Subject(Noun),
    Attribute(Property),
    Is(IsLight),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Actor {
    pub x: usize,
    pub y: usize,
    pub kind: ActorKind,
}

impl Actor {
    pub fn character(x: usize, y: usize, noun: Noun) -> Self {
        Actor { x, y, kind: ActorKind::Character(Character::new(noun)) }
    }

    pub fn subject(x: usize, y: usize, noun: Noun) -> Self {
        Actor { x, y, kind: ActorKind::Block(Word::Subject(noun)) }
    }

    pub fn attribute(x: usize, y: usize, property: Property) -> Self {
        Actor { x, y, kind: ActorKind::Block(Word::Attribute(property)) }
    }

    pub fn is(x: usize, y: usize) -> Self {
        Actor { x, y, kind: ActorKind::Block(Word::Is { light: IsLight::Off }) }
    }

    /// Cannot be walked through (unless also pushable).
    pub fn is_stop(&self) -> bool {
        match &self.kind {
            ActorKind::Block(_) => true,
            ActorKind::Character(c) => c.role == Role::Solid,
        }
    }

    pub fn is_push(&self) -> bool {
        match &self.kind {
            ActorKind::Block(_) => true,
            ActorKind::Character(c) => c.role == Role::Pushable,
        }
    }

    pub fn at(&self, x: usize, y: usize) -> bool {
        self.x == x && self.y == y
    }

    pub fn as_character(&self) -> Option<&Character> {
        match &self.kind {
            ActorKind::Character(c) => Some(c),
            ActorKind::Block(_) => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut Character> {
        match &mut self.kind {
            ActorKind::Character(c) => Some(c),
            ActorKind::Block(_) => None,
        }
    }

    /// Character of the given kind? Word blocks never match.
    pub fn is_noun(&self, noun: Noun) -> bool {
        self.as_character().is_some_and(|c| c.noun == noun)
    }

    pub fn word(&self) -> Option<Word> {
        match self.kind {
            ActorKind::Block(w) => Some(w),
            ActorKind::Character(_) => None,
        }
    }

    pub fn visual(&self) -> Visual {
        match self.kind {
            ActorKind::Character(c) => Visual::Character {
                noun: c.noun,
                facing: c.facing,
                stride: c.stride,
                player: c.role == Role::Player,
            },
            ActorKind::Block(Word::Subject(n)) => Visual::Subject(n),
            ActorKind::Block(Word::Attribute(p)) => Visual::Attribute(p),
            ActorKind::Block(Word::Is { light }) => Visual::Is(light),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_solid_and_pushable() {
        for a in [Actor::subject(0, 0, Noun::Wall), Actor::attribute(0, 0, Property::Push), Actor::is(0, 0)] {
            assert!(a.is_stop());
            assert!(a.is_push());
        }
    }

    #[test]
    fn characters_start_passable_except_bush() {
        for noun in Noun::ALL {
            let a = Actor::character(1, 1, noun);
            assert!(!a.is_push());
            assert_eq!(a.is_stop(), noun == Noun::Bush);
        }
    }

    #[test]
    fn role_is_exclusive() {
        let mut a = Actor::character(0, 0, Noun::Rock);
        a.as_character_mut().unwrap().role = Role::Pushable;
        assert!(a.is_push() && !a.is_stop());
        a.as_character_mut().unwrap().role = Role::Solid;
        assert!(a.is_stop() && !a.is_push());
    }

    #[test]
    fn words_round_trip() {
        for n in Noun::ALL {
            assert_eq!(Noun::from_word(n.word()), Some(n));
        }
        for p in Property::ALL {
            assert_eq!(Property::from_word(p.word()), Some(p));
        }
        assert_eq!(Noun::from_word("wall"), None);
    }

    #[test]
    fn is_light_from_count() {
        assert_eq!(IsLight::from_count(0), IsLight::Off);
        assert_eq!(IsLight::from_count(1), IsLight::Half);
        assert_eq!(IsLight::from_count(2), IsLight::Full);
    }

    #[test]
    fn word_blocks_never_match_a_noun() {
        assert!(!Actor::subject(0, 0, Noun::Rock).is_noun(Noun::Rock));
        assert!(Actor::character(0, 0, Noun::Rock).is_noun(Noun::Rock));
    }
}
