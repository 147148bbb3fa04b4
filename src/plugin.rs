//! Bevy plugin running the party controller inside an `App`.
//!
//! The controller itself never touches the ECS. It issues
//! [`SpriteCommand`]s into a [`CommandQueue`]; the systems here read the
//! keyboard, tick the controller, and then apply the queued commands to
//! sprite entities tagged with [`MemberSprite`]. Party notifications are
//! re-raised as observer events so HUD code can react with `On<...>`.
//!
//! Simulation space has y growing downwards, as on screen. Bevy's y grows
//! upwards, so positions are mirrored on the way out.

use bevy::ecs::prelude::On;
use bevy::prelude::*;
use crossbeam_channel::Receiver;
use hashbrown::HashMap;
use log::{error, warn};
use thiserror::Error;

use crate::config::PartyConfig;
use crate::controller::PartyController;
use crate::direction::AnimationKey;
use crate::events::{CompositionChanged, LeaderChanged, PartyEvents};
use crate::input::KeySource;
use crate::member::MemberId;
use crate::presenter::{CommandQueue, SpriteCommand};
use crate::stats::{CharacterKey, StatTable};

/// Frames in one walk cycle of a character sprite sheet.
pub const WALK_FRAMES: usize = 4;
/// Seconds each walk frame is shown.
pub const FRAME_SECONDS: f32 = 0.15;

/// The party controller as a Bevy resource.
#[derive(Resource, Debug, Deref, DerefMut)]
pub struct PartyState(pub PartyController<CommandQueue>);

/// Links a sprite entity to the party member it shows.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberSprite(pub MemberId);

/// Character whose sprite sheet a member sprite uses.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct SpriteSheetKey(pub CharacterKey);

/// Presentation-side motion of a member sprite.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct SpriteMotion {
    /// Animation currently playing, `None` on the idle frame.
    pub animation: Option<AnimationKey>,
    /// Velocity in simulation space, pixels per second.
    pub velocity: Vec2,
    /// Current frame within the walk cycle.
    pub frame: usize,
    /// Seconds spent on the current frame.
    pub frame_time: f32,
}

/// Marks the member sprite the camera tracks.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraFocus;

/// Observer event mirroring [`LeaderChanged`].
#[derive(Event, Debug, Clone, PartialEq, Eq, Deref)]
pub struct PartyLeaderChanged(pub LeaderChanged);

/// Observer event mirroring [`CompositionChanged`].
#[derive(Event, Debug, Clone, PartialEq, Eq, Deref)]
pub struct PartyCompositionChanged(pub CompositionChanged);

/// Raised when the plugin cannot assemble the configured party.
#[derive(Event, Debug, Clone, Error)]
#[error("party setup failed: {detail}")]
pub struct PartySetupError {
    /// Description of the underlying error.
    pub detail: String,
}

/// Receiving ends of the controller's topics, drained once per frame.
#[derive(Resource, Debug)]
pub struct PartyEventReceivers {
    leader: Receiver<LeaderChanged>,
    composition: Receiver<CompositionChanged>,
}

impl PartyEventReceivers {
    fn subscribe(events: &mut PartyEvents) -> Self {
        Self {
            leader: events.leader.subscribe(),
            composition: events.composition.subscribe(),
        }
    }
}

/// [`KeySource`] over Bevy's keyboard state.
///
/// Key names are Bevy [`KeyCode`] variant names such as `KeyW`,
/// `ArrowUp` or `Tab`.
#[derive(Debug, Clone, Copy)]
pub struct KeyboardKeys<'a>(pub &'a ButtonInput<KeyCode>);

impl KeySource for KeyboardKeys<'_> {
    fn key_state(&self, key: &str) -> Option<bool> {
        parse_key_code(key).map(|code| self.0.pressed(code))
    }
}

/// Maps a key name onto a [`KeyCode`].
///
/// Covers letters, digits, arrows, and the common modifier and whitespace
/// keys; anything else is `None`.
#[must_use]
pub fn parse_key_code(name: &str) -> Option<KeyCode> {
    let code = match name {
        "KeyA" => KeyCode::KeyA,
        "KeyB" => KeyCode::KeyB,
        "KeyC" => KeyCode::KeyC,
        "KeyD" => KeyCode::KeyD,
        "KeyE" => KeyCode::KeyE,
        "KeyF" => KeyCode::KeyF,
        "KeyG" => KeyCode::KeyG,
        "KeyH" => KeyCode::KeyH,
        "KeyI" => KeyCode::KeyI,
        "KeyJ" => KeyCode::KeyJ,
        "KeyK" => KeyCode::KeyK,
        "KeyL" => KeyCode::KeyL,
        "KeyM" => KeyCode::KeyM,
        "KeyN" => KeyCode::KeyN,
        "KeyO" => KeyCode::KeyO,
        "KeyP" => KeyCode::KeyP,
        "KeyQ" => KeyCode::KeyQ,
        "KeyR" => KeyCode::KeyR,
        "KeyS" => KeyCode::KeyS,
        "KeyT" => KeyCode::KeyT,
        "KeyU" => KeyCode::KeyU,
        "KeyV" => KeyCode::KeyV,
        "KeyW" => KeyCode::KeyW,
        "KeyX" => KeyCode::KeyX,
        "KeyY" => KeyCode::KeyY,
        "KeyZ" => KeyCode::KeyZ,
        "Digit0" => KeyCode::Digit0,
        "Digit1" => KeyCode::Digit1,
        "Digit2" => KeyCode::Digit2,
        "Digit3" => KeyCode::Digit3,
        "Digit4" => KeyCode::Digit4,
        "Digit5" => KeyCode::Digit5,
        "Digit6" => KeyCode::Digit6,
        "Digit7" => KeyCode::Digit7,
        "Digit8" => KeyCode::Digit8,
        "Digit9" => KeyCode::Digit9,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        "Space" => KeyCode::Space,
        "Tab" => KeyCode::Tab,
        "Enter" => KeyCode::Enter,
        "Escape" => KeyCode::Escape,
        "ShiftLeft" => KeyCode::ShiftLeft,
        "ShiftRight" => KeyCode::ShiftRight,
        "ControlLeft" => KeyCode::ControlLeft,
        "ControlRight" => KeyCode::ControlRight,
        _ => return None,
    };
    Some(code)
}

/// Converts a simulation position and depth into a Bevy translation.
#[must_use]
pub const fn to_world(position: Vec2, depth: f32) -> Vec3 {
    Vec3::new(position.x, -position.y, depth)
}

/// Polls the keyboard and advances the party by one frame.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn party_tick_system(
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut party: ResMut<PartyState>,
) {
    let input = party.config().controls.snapshot(&KeyboardKeys(&keyboard));
    party.tick(input, time.delta(), time.elapsed());
}

/// Applies one command to a sprite's transform and motion.
fn apply_command(command: &SpriteCommand, transform: &mut Transform, motion: &mut SpriteMotion) {
    match command {
        SpriteCommand::Place(_, position) => {
            transform.translation = to_world(*position, transform.translation.z);
        }
        SpriteCommand::Velocity(_, velocity) => motion.velocity = *velocity,
        SpriteCommand::Depth(_, depth) => transform.translation.z = *depth,
        SpriteCommand::Play(_, key) => {
            motion.animation = Some(key.clone());
            motion.frame = 0;
            motion.frame_time = 0.0;
        }
        SpriteCommand::Stop(_) => {
            motion.animation = None;
            motion.frame = 0;
            motion.frame_time = 0.0;
        }
        SpriteCommand::Spawn { .. } | SpriteCommand::Despawn(_) | SpriteCommand::Follow(_) => {}
    }
}

/// Sprite state for members spawned during the current batch.
///
/// Their entities only exist once `Commands` are flushed, so updates are
/// accumulated here and inserted in one go.
struct FreshSprite {
    entity: Entity,
    transform: Transform,
    motion: SpriteMotion,
}

/// Drains the controller's command queue into the ECS.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems receive queries by value."
)]
pub fn apply_sprite_commands_system(
    mut commands: Commands,
    mut party: ResMut<PartyState>,
    mut sprites: Query<(Entity, &MemberSprite, &mut Transform, &mut SpriteMotion)>,
    focused: Query<Entity, With<CameraFocus>>,
) {
    let pending: Vec<SpriteCommand> = party.presenter_mut().drain().collect();
    if pending.is_empty() {
        return;
    }

    let existing: HashMap<MemberId, Entity> = sprites
        .iter()
        .map(|(entity, sprite, _, _)| (sprite.0, entity))
        .collect();
    let mut fresh: HashMap<MemberId, FreshSprite> = HashMap::new();
    let mut focus: Option<Entity> = None;
    let mut despawned: Vec<Entity> = Vec::new();

    for command in &pending {
        match command {
            SpriteCommand::Spawn { id, key, position } => {
                let entity = commands
                    .spawn((
                        MemberSprite(*id),
                        SpriteSheetKey(key.clone()),
                        Name::new(format!("{key} ({id})")),
                    ))
                    .id();
                fresh.insert(
                    *id,
                    FreshSprite {
                        entity,
                        transform: Transform::from_translation(to_world(*position, 0.0)),
                        motion: SpriteMotion::default(),
                    },
                );
            }
            SpriteCommand::Despawn(id) => {
                let gone = fresh
                    .remove(id)
                    .map(|sprite| sprite.entity)
                    .or_else(|| existing.get(id).copied());
                if let Some(entity) = gone {
                    commands.entity(entity).despawn();
                    despawned.push(entity);
                    if focus == Some(entity) {
                        focus = None;
                    }
                }
            }
            SpriteCommand::Follow(id) => {
                focus = fresh
                    .get(id)
                    .map(|sprite| sprite.entity)
                    .or_else(|| existing.get(id).copied());
                if focus.is_none() {
                    warn!("camera asked to follow {id}, which has no sprite");
                }
            }
            SpriteCommand::Place(id, _)
            | SpriteCommand::Velocity(id, _)
            | SpriteCommand::Depth(id, _)
            | SpriteCommand::Play(id, _)
            | SpriteCommand::Stop(id) => {
                if let Some(sprite) = fresh.get_mut(id) {
                    apply_command(command, &mut sprite.transform, &mut sprite.motion);
                } else if let Some((_, _, mut transform, mut motion)) = existing
                    .get(id)
                    .and_then(|entity| sprites.get_mut(*entity).ok())
                {
                    apply_command(command, &mut transform, &mut motion);
                }
            }
        }
    }

    for sprite in fresh.into_values() {
        commands
            .entity(sprite.entity)
            .insert((sprite.transform, sprite.motion));
    }

    if let Some(target) = focus {
        let stale = focused
            .iter()
            .filter(|entity| *entity != target && !despawned.contains(entity));
        for previous in stale {
            commands.entity(previous).remove::<CameraFocus>();
        }
        commands.entity(target).insert(CameraFocus);
    }
}

/// Steps the walk cycle of every animating sprite.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn advance_walk_frames_system(time: Res<Time>, mut sprites: Query<&mut SpriteMotion>) {
    let dt = time.delta_secs();
    for mut motion in &mut sprites {
        if motion.animation.is_none() {
            continue;
        }
        motion.frame_time += dt;
        while motion.frame_time >= FRAME_SECONDS {
            motion.frame_time -= FRAME_SECONDS;
            motion.frame = (motion.frame + 1) % WALK_FRAMES;
        }
    }
}

/// Re-raises queued party notifications as observer events.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn forward_party_events_system(receivers: Res<PartyEventReceivers>, mut commands: Commands) {
    for event in receivers.composition.try_iter() {
        commands.trigger(PartyCompositionChanged(event));
    }
    for event in receivers.leader.try_iter() {
        commands.trigger(PartyLeaderChanged(event));
    }
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Observer systems must accept On<T> by value for Events V2."
)]
fn log_party_setup_error(event: On<PartySetupError>) {
    error!("{}", event.event());
}

/// Plugin owning the party controller and its sprite synchronisation.
///
/// The first key in `roster` leads; the rest join in order as followers.
///
/// # Examples
///
/// ```ignore
/// use bevy::prelude::*;
/// use cortege::{CharacterKey, PartyPlugin};
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(PartyPlugin::new(vec![
///         CharacterKey::from("ardent"),
///         CharacterKey::from("wren"),
///     ]))
///     .run();
/// ```
#[derive(Debug, Clone)]
pub struct PartyPlugin {
    /// Movement tuning and keybindings.
    pub config: PartyConfig,
    /// Stats new members are created from.
    pub stats: StatTable,
    /// Characters in party order.
    pub roster: Vec<CharacterKey>,
    /// Where the leader starts, in simulation space.
    pub spawn: Vec2,
}

impl PartyPlugin {
    /// A plugin with default tuning and the builtin stat table.
    #[must_use]
    pub fn new(roster: Vec<CharacterKey>) -> Self {
        Self {
            config: PartyConfig::default(),
            stats: StatTable::builtin(),
            roster,
            spawn: Vec2::ZERO,
        }
    }

    fn assemble(
        &self,
        events: PartyEvents,
    ) -> Result<PartyController<CommandQueue>, PartySetupError> {
        let Some((leader, followers)) = self.roster.split_first() else {
            return Err(PartySetupError {
                detail: "roster is empty".to_owned(),
            });
        };
        let mut controller = PartyController::new(
            self.config.clone(),
            self.stats.clone(),
            CommandQueue::new(),
            events,
            leader,
            self.spawn,
        )
        .map_err(|e| PartySetupError {
            detail: e.to_string(),
        })?;
        for key in followers {
            controller.add_member(key, None).map_err(|e| PartySetupError {
                detail: e.to_string(),
            })?;
        }
        Ok(controller)
    }
}

impl Plugin for PartyPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(log_party_setup_error);
        app.init_resource::<ButtonInput<KeyCode>>();

        let mut events = PartyEvents::new();
        let receivers = PartyEventReceivers::subscribe(&mut events);
        let controller = match self.assemble(events) {
            Ok(controller) => controller,
            Err(e) => {
                app.world_mut().trigger(e);
                return;
            }
        };
        controller
            .config()
            .controls
            .report_problems(&KeyboardKeys(&ButtonInput::default()));

        app.insert_resource(PartyState(controller));
        app.insert_resource(receivers);
        app.add_systems(
            Update,
            (
                party_tick_system,
                apply_sprite_commands_system,
                advance_walk_frames_system,
                forward_party_events_system,
            )
                .chain(),
        );

        #[cfg(feature = "render")]
        {
            app.add_systems(Startup, render::camera_setup);
            app.add_systems(
                Update,
                (
                    render::attach_sprite_sheets_system,
                    render::sync_atlas_frames_system,
                    render::camera_follow_system,
                )
                    .after(apply_sprite_commands_system),
            );
        }
    }
}

#[cfg(feature = "render")]
mod render {
    //! Sprite sheets and camera tracking; only built with a renderer.

    use bevy::prelude::*;

    use super::{CameraFocus, SpriteMotion, SpriteSheetKey, WALK_FRAMES};
    use crate::direction::Direction;

    /// Edge length of one sprite sheet cell in pixels.
    const CELL_SIZE: u32 = 32;

    /// Gives newly spawned member sprites their character sheet.
    #[expect(
        clippy::needless_pass_by_value,
        reason = "Bevy systems require parameters by value, not by reference."
    )]
    pub fn attach_sprite_sheets_system(
        mut commands: Commands,
        asset_server: Res<AssetServer>,
        mut layouts: ResMut<Assets<TextureAtlasLayout>>,
        added: Query<(Entity, &SpriteSheetKey), Without<Sprite>>,
    ) {
        for (entity, SpriteSheetKey(key)) in &added {
            let image = asset_server.load(format!("characters/{key}.png"));
            let columns = u32::try_from(WALK_FRAMES).unwrap_or(4);
            let rows = u32::try_from(Direction::ALL.len()).unwrap_or(4);
            let layout = layouts.add(TextureAtlasLayout::from_grid(
                UVec2::splat(CELL_SIZE),
                columns,
                rows,
                None,
                None,
            ));
            commands
                .entity(entity)
                .insert(Sprite::from_atlas_image(image, TextureAtlas { layout, index: 0 }));
        }
    }

    /// Shows the current walk frame from the sheet row of its direction.
    pub fn sync_atlas_frames_system(mut sprites: Query<(&SpriteMotion, &mut Sprite)>) {
        for (motion, mut sprite) in &mut sprites {
            let Some(atlas) = sprite.texture_atlas.as_mut() else {
                continue;
            };
            let row = motion
                .animation
                .as_ref()
                .and_then(|key| key.walk_direction())
                .and_then(|dir| Direction::ALL.iter().position(|d| *d == dir))
                .unwrap_or(0);
            atlas.index = row * WALK_FRAMES + motion.frame;
        }
    }

    /// Spawns a 2D camera unless the host application already has one.
    #[expect(
        clippy::needless_pass_by_value,
        reason = "Bevy systems receive queries by value."
    )]
    pub fn camera_setup(mut commands: Commands, cameras: Query<&Camera2d>) {
        if cameras.is_empty() {
            commands.spawn((Camera2d, Name::new("PartyCamera")));
        }
    }

    /// Centres the camera on the focused member.
    #[expect(
        clippy::needless_pass_by_value,
        reason = "Bevy systems receive queries by value."
    )]
    pub fn camera_follow_system(
        focus: Query<&Transform, (With<CameraFocus>, Without<Camera2d>)>,
        mut cameras: Query<&mut Transform, With<Camera2d>>,
    ) {
        let Ok(target) = focus.single() else {
            return;
        };
        for mut camera in &mut cameras {
            camera.translation.x = target.translation.x;
            camera.translation.y = target.translation.y;
        }
    }
}
