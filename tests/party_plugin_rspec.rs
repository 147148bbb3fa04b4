//! Behavioural tests for `PartyPlugin` using rust-rspec.
//!
//! Keys are pressed on the `ButtonInput<KeyCode>` resource and the app is
//! ticked with a fixed 16 ms frame, so member sprites, camera focus and
//! observer events can be checked deterministically.

#[path = "support/thread_safe_app.rs"]
mod thread_safe_app;

#[path = "support/rspec_runner.rs"]
mod rspec_runner;

use std::sync::MutexGuard;
use std::time::Duration;

use bevy::ecs::prelude::On;
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use cortege::{
    AnimationKey, CameraFocus, CharacterKey, Direction, MemberId, MemberSprite, PartyLeaderChanged,
    PartyPlugin, PartySetupError, PartyState, SpriteMotion,
};
use rspec::block::Context as Scenario;
use rspec_runner::run_serial;
use thread_safe_app::{lock_app, share, SharedApp, ThreadSafeApp};

/// Leader changes seen by the test observer.
#[derive(Resource, Default, Debug)]
struct SeenLeaders(Vec<MemberId>);

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn record_leader(event: On<PartyLeaderChanged>, mut seen: ResMut<SeenLeaders>) {
    seen.0.push(event.event().leader);
}

fn party_app(roster: &[&str]) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    app.init_resource::<SeenLeaders>();
    app.add_observer(record_leader);
    app.add_plugins(PartyPlugin::new(
        roster.iter().copied().map(CharacterKey::from).collect(),
    ));
    app
}

/// Fixture owning a party app that each scenario rebuilds.
#[derive(Debug, Clone)]
struct PartyFixture {
    app: SharedApp,
}

impl PartyFixture {
    fn bootstrap() -> Self {
        Self {
            app: share(party_app(&["ardent", "wren", "sable"])),
        }
    }

    fn app_guard(&self) -> MutexGuard<'_, ThreadSafeApp> {
        lock_app(&self.app)
    }

    /// Replaces the app with a freshly built party.
    fn reset(&self) {
        let mut app = self.app_guard();
        *app = ThreadSafeApp(party_app(&["ardent", "wren", "sable"]));
        app.update();
    }

    fn tick(&self, frames: usize) {
        let mut app = self.app_guard();
        for _ in 0..frames {
            app.update();
        }
    }

    fn press(&self, key: KeyCode) {
        let mut app = self.app_guard();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
    }

    fn release(&self, key: KeyCode) {
        let mut app = self.app_guard();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(key);
    }

    fn leader_id(&self) -> MemberId {
        let app = self.app_guard();
        app.world().resource::<PartyState>().current_leader().id
    }

    /// Transform and motion of the sprite showing `id`.
    fn sprite(&self, id: MemberId) -> (Transform, SpriteMotion) {
        let mut app = self.app_guard();
        let world = app.world_mut();
        let mut query = world.query::<(&MemberSprite, &Transform, &SpriteMotion)>();
        query
            .iter(world)
            .find(|(sprite, _, _)| sprite.0 == id)
            .map(|(_, transform, motion)| (*transform, motion.clone()))
            .unwrap_or_else(|| panic!("no sprite for {id}"))
    }

    fn sprite_count(&self) -> usize {
        let mut app = self.app_guard();
        let world = app.world_mut();
        world.query::<&MemberSprite>().iter(world).count()
    }

    fn focused(&self) -> Vec<MemberId> {
        let mut app = self.app_guard();
        let world = app.world_mut();
        let mut query = world.query_filtered::<&MemberSprite, With<CameraFocus>>();
        query.iter(world).map(|sprite| sprite.0).collect()
    }

    fn seen_leaders(&self) -> Vec<MemberId> {
        let app = self.app_guard();
        app.world().resource::<SeenLeaders>().0.clone()
    }
}

#[test]
fn party_plugin_mirrors_the_party() {
    let fixture = PartyFixture::bootstrap();

    run_serial(&rspec::given(
        "a party of three managed by PartyPlugin",
        fixture,
        |scenario: &mut Scenario<PartyFixture>| {
            scenario.when("the app has updated once", |ctx| {
                ctx.before_each(|state| state.reset());

                ctx.then("every member has a sprite", |state| {
                    assert_eq!(state.sprite_count(), 3);
                });

                ctx.then("the camera focuses on the leader", |state| {
                    assert_eq!(state.focused(), vec![state.leader_id()]);
                });

                ctx.then("the leader is idle", |state| {
                    let (_, motion) = state.sprite(state.leader_id());
                    assert_eq!(motion.animation, None);
                });
            });

            scenario.when("D is held for half a second", |ctx| {
                ctx.before_each(|state| {
                    state.reset();
                    state.press(KeyCode::KeyD);
                    state.tick(30);
                });

                ctx.then("the leader sprite moves right", |state| {
                    let (transform, _) = state.sprite(state.leader_id());
                    assert!(transform.translation.x > 20.0, "{transform:?}");
                    assert!(transform.translation.y.abs() < f32::EPSILON);
                });

                ctx.then("the leader plays its walk-right cycle", |state| {
                    let (_, motion) = state.sprite(state.leader_id());
                    assert_eq!(motion.animation, Some(AnimationKey::walk(Direction::Right)));
                    assert!(motion.velocity.x > 0.0);
                });

                ctx.then("releasing D stops the animation", |state| {
                    state.release(KeyCode::KeyD);
                    state.tick(1);
                    let (_, motion) = state.sprite(state.leader_id());
                    assert_eq!(motion.animation, None);
                });
            });

            scenario.when("S is held", |ctx| {
                ctx.before_each(|state| {
                    state.reset();
                    state.press(KeyCode::KeyS);
                    state.tick(20);
                });

                ctx.then("the sprite moves down the screen", |state| {
                    let (transform, _) = state.sprite(state.leader_id());
                    assert!(transform.translation.y < -10.0, "{transform:?}");
                });

                ctx.then("the leader draws over its followers", |state| {
                    let leader = state.sprite(state.leader_id()).0.translation.z;
                    let follower = state.sprite(MemberId(1)).0.translation.z;
                    assert!(leader > follower, "leader z {leader}, follower z {follower}");
                });
            });

            scenario.when("Tab is held for a few frames", |ctx| {
                ctx.before_each(|state| {
                    state.reset();
                    state.press(KeyCode::Tab);
                    state.tick(5);
                });

                ctx.then("leadership passes to the next member once", |state| {
                    assert_eq!(state.leader_id(), MemberId(1));
                    assert_eq!(state.seen_leaders(), vec![MemberId(1)]);
                });

                ctx.then("the camera follows the new leader", |state| {
                    assert_eq!(state.focused(), vec![MemberId(1)]);
                });
            });
        },
    ));
}

#[derive(Resource, Default, Debug)]
struct SetupFailures(Vec<String>);

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn record_failure(event: On<PartySetupError>, mut failures: ResMut<SetupFailures>) {
    failures.0.push(event.event().detail.clone());
}

#[test]
fn unknown_roster_member_is_reported() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.init_resource::<SetupFailures>();
    app.add_observer(record_failure);
    app.add_plugins(PartyPlugin::new(vec![
        CharacterKey::from("ardent"),
        CharacterKey::from("mallory"),
    ]));
    app.update();

    assert!(!app.world().contains_resource::<PartyState>());
    let failures = &app.world().resource::<SetupFailures>().0;
    assert_eq!(failures.as_slice(), ["unknown character 'mallory'".to_owned()]);
}
