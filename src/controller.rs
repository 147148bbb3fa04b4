//! Leader/follower trailing controller.
//!
//! The leader is driven by input. Its position is recorded on a
//! [`TrailPath`] and every follower walks towards the node
//! `slot * node_offset` samples behind the head, so the party strings out
//! along the exact route the leader took.
//!
//! Each tick runs in a fixed order because later stages read state written
//! by earlier ones:
//!
//! 1. leader change (if requested and not cooling down),
//! 2. leader displacement from input,
//! 3. [`PartyController::record_leader_position`],
//! 4. [`PartyController::followers_step`] and follower integration,
//! 5. [`PartyController::recompute_depth`] when the leader's y changed.
//!
//! Followers that have fallen more than `teleport_distance` behind their
//! target snap onto it instead of walking. Followers whose target has not
//! been recorded yet stay where they are.

use std::mem;
use std::time::Duration;

use glam::Vec2;
use log::{debug, info};
use ordered_float::OrderedFloat;

use crate::config::PartyConfig;
use crate::direction::{AnimationKey, Direction};
use crate::error::PartyError;
use crate::events::{CompositionChanged, LeaderChanged, PartyEvents};
use crate::input::{facing_for, leader_velocity, InputSnapshot};
use crate::member::{MemberId, MotionState, PartyMember};
use crate::numeric::count_to_f32;
use crate::path::{PathNode, TrailPath};
use crate::presenter::Presenter;
use crate::stats::{CharacterKey, CharacterStats, StatTable};

/// Owns a party and moves it every tick.
///
/// The party always has a leader; followers are optional. Sprites are
/// driven exclusively through the injected [`Presenter`].
#[derive(Debug)]
pub struct PartyController<P> {
    config: PartyConfig,
    stats: StatTable,
    presenter: P,
    events: PartyEvents,
    leader: PartyMember,
    followers: Vec<PartyMember>,
    path: TrailPath,
    next_id: u32,
    cooldown_until: Option<Duration>,
    last_leader_y: f32,
}

impl<P: Presenter> PartyController<P> {
    /// Builds a party led by `leader` standing at `spawn`.
    ///
    /// The path starts with the leader's position so followers added later
    /// have a sample to spawn on.
    ///
    /// # Errors
    ///
    /// Returns [`PartyError::UnknownCharacter`] when `leader` is not in
    /// `stats`.
    pub fn new(
        config: PartyConfig,
        stats: StatTable,
        presenter: P,
        events: PartyEvents,
        leader: &CharacterKey,
        spawn: Vec2,
    ) -> Result<Self, PartyError> {
        let leader_stats = stats
            .get(leader)
            .cloned()
            .ok_or_else(|| PartyError::UnknownCharacter(leader.clone()))?;
        let first = PartyMember::new(MemberId(0), leader.clone(), leader_stats, spawn);
        let mut controller = Self {
            config,
            stats,
            presenter,
            events,
            path: TrailPath::seeded(PathNode::new(spawn.x, spawn.y, first.facing)),
            leader: first,
            followers: Vec::new(),
            next_id: 1,
            cooldown_until: None,
            last_leader_y: spawn.y,
        };
        controller
            .presenter
            .spawn(controller.leader.id, leader, spawn);
        controller.presenter.follow(controller.leader.id);
        controller.recompute_depth();
        controller.publish_composition();
        info!("party formed with {leader} at {spawn}");
        Ok(controller)
    }

    /// Records the leader's position if it moved past the jitter threshold,
    /// then enforces the path length bounds for the current party size.
    pub fn record_leader_position(&mut self, x: f32, y: f32, facing: Direction) {
        let policy = self.config.path_policy();
        let members = self.member_count();
        self.path.record(x, y, facing, members, &policy);
    }

    /// Chooses a velocity, or a snap, for every follower.
    ///
    /// Follower `i` (1-based) samples the path node `i * node_offset`
    /// behind the head. It snaps there when further than
    /// `teleport_distance`, walks there when further than `idle_zone`, and
    /// stops otherwise. Followers whose node has not been recorded yet are
    /// left untouched.
    pub fn followers_step(&mut self) {
        let speed = self.config.follower_speed();
        let teleport = self.config.teleport_distance;
        let idle = self.config.idle_zone;

        for (index, member) in self.followers.iter_mut().enumerate() {
            let slot = index + 1;
            let target_index = slot.saturating_mul(self.config.node_offset);
            if self.path.len() <= target_index {
                continue;
            }
            let Some(target) = self.path.get(target_index).copied() else {
                continue;
            };

            let to_target = target.position() - member.position;
            let distance = to_target.length();
            if distance > teleport {
                debug!(
                    "{} is {distance:.1}px from its target; snapping to ({}, {})",
                    member.id, target.x, target.y
                );
                member.position = target.position();
                member.velocity = Vec2::ZERO;
                member.facing = target.facing;
                self.presenter.place(member.id, member.position);
            } else if distance > idle {
                member.velocity = to_target / distance * speed;
            } else {
                member.velocity = Vec2::ZERO;
            }
            self.presenter.set_velocity(member.id, member.velocity);
            animate(&mut self.presenter, member, target.facing);
        }
    }

    /// Reassigns draw order from screen height.
    ///
    /// Members are stably sorted by ascending y and spread evenly across one
    /// unit starting at `base_depth`, so members further down the screen
    /// draw in front and ties keep party order.
    pub fn recompute_depth(&mut self) {
        let count = self.member_count();
        let step = 1.0 / count_to_f32(count);
        let base = self.config.base_depth;

        let mut order: Vec<(usize, OrderedFloat<f32>)> = self
            .members()
            .map(|member| OrderedFloat(member.position.y))
            .enumerate()
            .collect();
        order.sort_by_key(|&(_, y)| y);

        let mut ranks = vec![0_usize; count];
        for (rank, (index, _)) in order.into_iter().enumerate() {
            if let Some(slot) = ranks.get_mut(index) {
                *slot = rank;
            }
        }

        let presenter = &mut self.presenter;
        let members = std::iter::once(&mut self.leader).chain(self.followers.iter_mut());
        for (member, rank) in members.zip(ranks) {
            member.depth = step.mul_add(count_to_f32(rank), base);
            presenter.set_depth(member.id, member.depth);
        }
        self.last_leader_y = self.leader.position.y;
    }

    /// Rotates the party so the first follower leads.
    ///
    /// The new leader takes over the old leader's position and facing, so
    /// the camera does not jump. Further changes are ignored until the
    /// configured cooldown has elapsed after `now`. Returns whether the
    /// rotation happened.
    pub fn change_leader(&mut self, now: Duration) -> bool {
        if self.followers.is_empty() {
            debug!("leader change ignored: party has a single member");
            return false;
        }
        if let Some(until) = self.cooldown_until {
            if now < until {
                debug!("leader change ignored: cooling down for {:?}", until - now);
                return false;
            }
        }

        let next = self.followers.remove(0);
        let previous = mem::replace(&mut self.leader, next);
        self.leader.position = previous.position;
        self.leader.facing = previous.facing;
        self.leader.velocity = Vec2::ZERO;
        let previous_id = previous.id;
        self.followers.push(previous);

        self.presenter.place(self.leader.id, self.leader.position);
        self.presenter.set_velocity(self.leader.id, Vec2::ZERO);
        self.presenter.follow(self.leader.id);
        self.cooldown_until = Some(now + self.config.leader_change_cooldown());

        info!("{} ({}) now leads the party", self.leader.key, self.leader.id);
        self.publish_leader_change(previous_id);
        self.recompute_depth();
        true
    }

    /// Advances the party by one frame.
    ///
    /// `dt` is the frame duration and `now` the time since the game
    /// started; the latter only feeds the leader change cooldown.
    pub fn tick(&mut self, input: InputSnapshot, dt: Duration, now: Duration) {
        if input.change_leader {
            self.change_leader(now);
        }

        let dt_secs = dt.as_secs_f32();
        let leader = &mut self.leader;
        leader.velocity = leader_velocity(input, self.config.free_roam_speed);
        if let Some(facing) = facing_for(input) {
            leader.facing = facing;
        }
        leader.integrate(dt_secs);
        self.presenter.set_velocity(leader.id, leader.velocity);
        if leader.is_moving() {
            self.presenter.place(leader.id, leader.position);
        }
        let facing = leader.facing;
        animate(&mut self.presenter, leader, facing);

        let Vec2 { x, y } = self.leader.position;
        self.record_leader_position(x, y, facing);
        self.followers_step();

        let offset = self.config.node_offset;
        for (index, member) in self.followers.iter_mut().enumerate() {
            if !member.is_moving() {
                continue;
            }
            match self.path.get((index + 1).saturating_mul(offset)) {
                Some(target) => member.integrate_towards(target.position(), dt_secs),
                None => member.integrate(dt_secs),
            }
            self.presenter.place(member.id, member.position);
        }

        if OrderedFloat(y) != OrderedFloat(self.last_leader_y) {
            self.recompute_depth();
        }
    }

    /// Adds a member to the back of the party.
    ///
    /// Stats come from `data` when given, otherwise from the stat table. The
    /// member appears on the path node it will trail, or as close to it as
    /// the recorded history allows.
    ///
    /// # Errors
    ///
    /// Returns [`PartyError::UnknownCharacter`] when no stats are available.
    pub fn add_member(
        &mut self,
        key: &CharacterKey,
        data: Option<CharacterStats>,
    ) -> Result<MemberId, PartyError> {
        let stats = data
            .or_else(|| self.stats.get(key).cloned())
            .ok_or_else(|| PartyError::UnknownCharacter(key.clone()))?;

        let slot = self.member_count();
        let target_index = slot.saturating_mul(self.config.node_offset);
        let position = self
            .path
            .get(target_index)
            .or_else(|| self.path.tail())
            .map_or(self.leader.position, PathNode::position);

        let id = MemberId(self.next_id);
        self.next_id += 1;
        let mut member = PartyMember::new(id, key.clone(), stats, position);
        member.facing = self.leader.facing;
        self.presenter.spawn(id, key, position);
        self.followers.push(member);

        info!("{key} ({id}) joined the party in slot {slot}");
        self.publish_composition();
        self.recompute_depth();
        Ok(id)
    }

    /// Removes the member at party `index` (0 is the leader).
    ///
    /// Removing the leader promotes the first follower, who takes over the
    /// leader's position so the camera does not jump.
    ///
    /// # Errors
    ///
    /// Returns [`PartyError::MemberIndexOutOfRange`] for a bad index and
    /// [`PartyError::LastMember`] when the party would become empty.
    pub fn remove_member(&mut self, index: usize) -> Result<PartyMember, PartyError> {
        let len = self.member_count();
        if index >= len {
            return Err(PartyError::MemberIndexOutOfRange { index, len });
        }
        if self.followers.is_empty() {
            return Err(PartyError::LastMember);
        }

        let removed = if index == 0 {
            let next = self.followers.remove(0);
            let previous = mem::replace(&mut self.leader, next);
            self.leader.position = previous.position;
            self.leader.facing = previous.facing;
            self.presenter.place(self.leader.id, self.leader.position);
            self.presenter.follow(self.leader.id);
            self.publish_leader_change(previous.id);
            previous
        } else {
            self.followers.remove(index - 1)
        };
        self.presenter.despawn(removed.id);

        info!("{} ({}) left the party", removed.key, removed.id);
        self.publish_composition();
        self.recompute_depth();
        Ok(removed)
    }

    /// Moves the whole party to `position`, e.g. after a scene transition.
    ///
    /// The path history is discarded so followers do not walk back towards
    /// the previous location.
    pub fn relocate(&mut self, position: Vec2, facing: Direction) {
        self.path.reset_to(PathNode::new(position.x, position.y, facing));
        let presenter = &mut self.presenter;
        for member in std::iter::once(&mut self.leader).chain(self.followers.iter_mut()) {
            member.position = position;
            member.velocity = Vec2::ZERO;
            member.facing = facing;
            presenter.place(member.id, position);
            presenter.set_velocity(member.id, Vec2::ZERO);
            animate(presenter, member, facing);
        }
        debug!("party relocated to {position}");
        self.recompute_depth();
    }

    /// The member driven by input.
    #[must_use]
    pub const fn current_leader(&self) -> &PartyMember {
        &self.leader
    }

    /// Depth last assigned to `id`, if it is in the party.
    #[must_use]
    pub fn depth_of(&self, id: MemberId) -> Option<f32> {
        self.member(id).map(|member| member.depth)
    }

    /// Members in party order, leader first.
    pub fn members(&self) -> impl Iterator<Item = &PartyMember> {
        std::iter::once(&self.leader).chain(self.followers.iter())
    }

    /// Number of members, including the leader.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.followers.len() + 1
    }

    /// The member with handle `id`.
    #[must_use]
    pub fn member(&self, id: MemberId) -> Option<&PartyMember> {
        self.members().find(|member| member.id == id)
    }

    /// Mutable access to a member, e.g. to apply damage from combat.
    pub fn member_mut(&mut self, id: MemberId) -> Option<&mut PartyMember> {
        std::iter::once(&mut self.leader)
            .chain(self.followers.iter_mut())
            .find(|member| member.id == id)
    }

    /// Party index of `id`, leader being 0.
    #[must_use]
    pub fn index_of(&self, id: MemberId) -> Option<usize> {
        self.members().position(|member| member.id == id)
    }

    /// The recorded leader trail.
    #[must_use]
    pub const fn path(&self) -> &TrailPath {
        &self.path
    }

    /// Active tuning.
    #[must_use]
    pub const fn config(&self) -> &PartyConfig {
        &self.config
    }

    /// Stat table used for new members.
    #[must_use]
    pub const fn stat_table(&self) -> &StatTable {
        &self.stats
    }

    /// Whether a leader change at `now` would be refused by the cooldown.
    #[must_use]
    pub fn leader_change_blocked(&self, now: Duration) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// The presentation adapter.
    #[must_use]
    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Mutable access to the presentation adapter, e.g. to drain commands.
    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Event topics, for subscribing listeners.
    pub fn events_mut(&mut self) -> &mut PartyEvents {
        &mut self.events
    }

    fn publish_composition(&mut self) {
        let members = self
            .members()
            .map(|member| (member.id, member.key.clone()))
            .collect();
        self.events
            .composition
            .publish(&CompositionChanged { members });
    }

    fn publish_leader_change(&mut self, previous: MemberId) {
        let event = LeaderChanged {
            previous,
            leader: self.leader.id,
            key: self.leader.key.clone(),
        };
        self.events.leader.publish(&event);
    }
}

/// Keeps the sprite animation in line with the member's velocity.
///
/// The walk cycle is only (re)started when a different one is playing, and
/// stop is only issued while something is playing, so repeated calls are
/// free of flicker.
fn animate<P: Presenter>(presenter: &mut P, member: &mut PartyMember, facing: Direction) {
    let current = presenter.current_animation(member.id);
    if member.is_moving() {
        let key = AnimationKey::walk(facing);
        if current.as_ref() != Some(&key) {
            presenter.play_animation(member.id, key);
        }
        member.facing = facing;
        member.motion = MotionState::Walking(facing);
    } else {
        if current.is_some() {
            presenter.stop_animation(member.id);
        }
        member.motion = MotionState::Idle;
    }
}
