/// GameState: the complete mutable state of a level in play.
///
/// ## Arena
///
/// Every actor lives in `actors`, addressed by a stable `ActorId`.
/// Removal tombstones the slot (`None`) instead of shifting the vector, so
/// `is_tiles` and `player` handles stay valid and a snapshot is a plain
/// value copy of this struct's fields.
///
/// ## Player invariant
///
/// `player == Some(id)` ⇒ actor `id` is alive and has `Role::Player`, and no
/// other actor has `Role::Player`. All role changes go through `set_role()`.
///
/// ## Rule update order
///
/// `update_rules()` scans Is tiles in arena order (map row-major), then
/// revokes vanished rules before enforcing new ones, so a subject moving
/// from `isYou` to `isPush` in one tick ends up pushable with no player.

use tracing::{debug, info};

use crate::domain::actor::{Actor, ActorId, ActorKind, Goal, Noun, Property, Role, Visual, Word};
use crate::domain::grid::{self, Grid};
use crate::domain::input::MoveDir;
use crate::domain::movement;
use crate::domain::rules::{self, Rule, RuleDiff};

/// Result of checking the player's cell after a move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
    Continue,
    Won,
    Lost,
}

/// One entry of the render list.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Sprite {
    pub x: usize,
    pub y: usize,
    pub visual: Visual,
}

#[derive(Clone, Debug)]
pub struct GameState {
    pub grid: Grid,
    pub actors: Vec<Option<Actor>>,
    /// Handles of every Is block, in arena order.
    pub is_tiles: Vec<ActorId>,
    pub player: Option<ActorId>,
    /// Canonical rule set from the last `update_rules()`.
    pub rules: Vec<Rule>,
    pub running: bool,
}

// ── Construction / arena access ──

impl GameState {
    pub fn new(grid: Grid) -> Self {
        GameState {
            grid,
            actors: vec![],
            is_tiles: vec![],
            player: None,
            rules: vec![],
            running: true,
        }
    }

    /// Add an actor. Is blocks are registered for rule scanning.
    pub fn spawn(&mut self, actor: Actor) -> ActorId {
        let id = ActorId(self.actors.len());
        if matches!(actor.kind, ActorKind::Block(Word::Is { .. })) {
            self.is_tiles.push(id);
        }
        self.actors.push(Some(actor));
        id
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0)?.as_ref()
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.0)?.as_mut()
    }

    /// Live actors in arena order.
    pub fn live(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.actors
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|a| (ActorId(i), a)))
    }

    pub fn actor_at(&self, x: usize, y: usize) -> Option<ActorId> {
        grid::occupant(&self.actors, x, y, None)
    }

    pub fn player_actor(&self) -> Option<&Actor> {
        self.actor(self.player?)
    }

    /// Live characters of the given kind.
    pub fn ids_of(&self, noun: Noun) -> Vec<ActorId> {
        self.live().filter(|(_, a)| a.is_noun(noun)).map(|(id, _)| id).collect()
    }

    /// Take an actor off the board. Its handle stays reserved.
    pub fn remove(&mut self, id: ActorId) {
        if let Some(slot) = self.actors.get_mut(id.0) {
            *slot = None;
        }
        if self.player == Some(id) {
            self.player = None;
        }
    }

    pub fn live_count(&self) -> usize {
        self.actors.iter().flatten().count()
    }
}

// ── Movement ──

impl GameState {
    /// Push-resolve a one-cell move for any actor.
    pub fn move_actor(&mut self, id: ActorId, dx: i32, dy: i32) -> bool {
        movement::try_move(&mut self.actors, self.grid, id, dx, dy)
    }

    /// Turn the player to face `dir` and advance its walk cycle. Cosmetic.
    pub fn face_player(&mut self, dir: MoveDir) {
        let Some(id) = self.player else { return };
        if let Some(c) = self.actor_mut(id).and_then(Actor::as_character_mut) {
            c.facing = dir.facing();
            c.stride = !c.stride;
        }
    }

    /// Move the player one step. `false` when there is no player or the move
    /// was refused.
    pub fn move_player(&mut self, dir: MoveDir) -> bool {
        let Some(id) = self.player else { return false };
        self.face_player(dir);
        let (dx, dy) = dir.delta();
        self.move_actor(id, dx, dy)
    }
}

// ── Win / lose ──

impl GameState {
    /// Look for a win- or lose-marked character sharing the player's cell.
    /// The first one in arena order decides.
    ///
    /// Win stops the game. Loss removes the player but keeps the game
    /// running so it can be undone.
    pub fn check_outcome(&mut self) -> Outcome {
        let Some(pid) = self.player else { return Outcome::Continue };
        let Some((px, py)) = self.actor(pid).map(|a| (a.x, a.y)) else {
            return Outcome::Continue;
        };

        let goal = self
            .live()
            .filter(|(id, a)| *id != pid && a.at(px, py))
            .filter_map(|(_, a)| a.as_character().map(|c| c.goal))
            .find(|g| *g != Goal::Neutral);

        match goal {
            Some(Goal::Victory) => {
                self.running = false;
                info!(x = px, y = py, "player reached a victory tile");
                Outcome::Won
            }
            Some(Goal::Defeat) => {
                self.remove(pid);
                info!(x = px, y = py, "player destroyed");
                Outcome::Lost
            }
            _ => Outcome::Continue,
        }
    }
}

// ── Rules ──

impl GameState {
    fn word_near(&self, x: usize, y: usize, dx: i32, dy: i32) -> Option<Word> {
        let id = grid::occupant_at_offset(&self.actors, self.grid, x, y, dx, dy)?;
        self.actor(id)?.word()
    }

    /// Scan every Is tile, refresh its light, and return the raw rule list
    /// (two entries per tile: vertical then horizontal).
    pub fn scan_rules(&mut self) -> Vec<Option<Rule>> {
        let mut raw = Vec::with_capacity(self.is_tiles.len() * 2);
        for i in 0..self.is_tiles.len() {
            let id = self.is_tiles[i];
            let Some((x, y)) = self.actor(id).map(|a| (a.x, a.y)) else { continue };
            let scan = rules::scan_is(
                self.word_near(x, y, 0, -1),
                self.word_near(x, y, 0, 1),
                self.word_near(x, y, -1, 0),
                self.word_near(x, y, 1, 0),
            );
            if let Some(Actor { kind: ActorKind::Block(Word::Is { light }), .. }) = self.actor_mut(id) {
                *light = scan.light;
            }
            raw.push(scan.vertical);
            raw.push(scan.horizontal);
        }
        raw
    }

    /// Re-derive the rule set from the board and apply what changed.
    pub fn update_rules(&mut self) -> RuleDiff {
        let raw = self.scan_rules();
        let current = rules::reconcile(&raw);
        let changes = rules::diff(&self.rules, &current);

        for rule in &changes.revoked {
            info!(rule = %rule, "rule revoked");
            self.revoke(*rule);
        }
        for rule in &changes.enforced {
            info!(rule = %rule, "rule enforced");
            self.enforce(*rule);
        }
        self.rules = current;
        changes
    }

    pub fn enforce(&mut self, rule: Rule) {
        for id in self.ids_of(rule.subject) {
            match rule.property {
                Property::You => self.make_player(id),
                Property::Push => self.set_role(id, Role::Pushable),
                Property::Stop => self.set_role(id, Role::Solid),
                Property::Victory => self.set_goal(id, Goal::Victory),
                Property::Lose => self.set_goal(id, Goal::Defeat),
            }
        }
    }

    pub fn revoke(&mut self, rule: Rule) {
        let (role, goal) = match rule.property {
            Property::You => (Some(Role::Player), None),
            Property::Push => (Some(Role::Pushable), None),
            Property::Stop => (Some(Role::Solid), None),
            Property::Victory => (None, Some(Goal::Victory)),
            Property::Lose => (None, Some(Goal::Defeat)),
        };
        for id in self.ids_of(rule.subject) {
            let Some(c) = self.actor(id).and_then(Actor::as_character).copied() else { continue };
            if role == Some(c.role) {
                self.set_role(id, Role::None);
            }
            if goal == Some(c.goal) {
                self.set_goal(id, Goal::Neutral);
            }
        }
        // another subject's isYou may hold the player now; leave it alone
        if rule.property == Property::You
            && self.player_actor().is_some_and(|a| a.is_noun(rule.subject))
        {
            self.player = None;
        }
    }

    /// Hand player status to `id`, taking it from the previous holder.
    fn make_player(&mut self, id: ActorId) {
        if let Some(prev) = self.player.filter(|p| *p != id) {
            self.set_role(prev, Role::None);
        }
        self.set_role(id, Role::Player);
        self.player = Some(id);
        debug!(actor = id.0, "player assigned");
    }

    fn set_role(&mut self, id: ActorId, role: Role) {
        if let Some(c) = self.actor_mut(id).and_then(Actor::as_character_mut) {
            c.role = role;
        }
        if role != Role::Player && self.player == Some(id) {
            self.player = None;
        }
    }

    fn set_goal(&mut self, id: ActorId, goal: Goal) {
        if let Some(c) = self.actor_mut(id).and_then(Actor::as_character_mut) {
            c.goal = goal;
        }
    }

    pub fn rule_texts(&self) -> Vec<String> {
        self.rules.iter().map(Rule::to_string).collect()
    }
}

// ── Render list ──

impl GameState {
    /// Live actors in arena order, with the player moved to the end so it
    /// is drawn on top.
    pub fn sprites(&self) -> Vec<Sprite> {
        let mut out: Vec<Sprite> = self
            .live()
            .filter(|(id, _)| Some(*id) != self.player)
            .map(|(_, a)| Sprite { x: a.x, y: a.y, visual: a.visual() })
            .collect();
        if let Some(p) = self.player_actor() {
            out.push(Sprite { x: p.x, y: p.y, visual: p.visual() });
        }
        out
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
