//! Per-frame orchestration of every water effect.
//!
//! [`WaterInteraction`] reads the avatar and scene once per frame, derives a
//! [`FrameContext`], decides which effects emit, and then advances every
//! constructed effect in [`EffectKind::ALL`] order.
//!
//! # Frame Flow
//!
//! ```text
//! update()
//!   ├── derive speed, facing, falling speed, contact point
//!   ├── dive?          → sound, diving ripple, lower/higher splash, droplets
//!   ├── swimming?      → moving ripple + stroke splashes (above surface), bubbles
//!   ├── walking?       → moving ripple (deep) or footstep splashes (shallow)
//!   ├── static ripple  → enable after standing still, else disable
//!   ├── body drops     → while wading, or shortly after leaving the water
//!   └── advance all effects in fixed order
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut water = WaterInteraction::new(WaterConfig::full())?
//!     .with_sound_catalog(assets.sound_names())?
//!     .with_sound_player(|clip: &str| audio.play(clip));
//! let mut time = Time::new();
//!
//! loop {
//!     time.update();
//!     water.update(&avatar, &scene, &time);
//!     for layer in water.layers() {
//!         renderer.upload(&layer);
//!     }
//!     water.clear_dirty();
//! }
//! ```

use crate::audio::{DivingSounds, SoundPlayer};
use crate::avatar::Avatar;
use crate::config::WaterConfig;
use crate::effects::{
    BodyDrop, Bubble, DivingHigherSplash, DivingLowerSplash, DivingRipple, Droplet, Effect,
    EffectKind, FreestyleSplash, LayerView, MovingRipple, MovingSplash, StrokeSplashes,
};
use crate::error::ConfigError;
use crate::frame::{FrameContext, SceneSnapshot, MOVING_SPEED};
use crate::time::{StepMode, Time};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Entry speed above which touching the water counts as a dive.
pub const DIVE_SPEED: f32 = 1.0;
/// Horizontal velocity to effect-speed factor.
const SPEED_SCALE: f32 = 0.1;
/// How far the surface must sit below the avatar origin to swim "above" it.
const ABOVE_SURFACE_MARGIN: f32 = 0.1;
/// Delay after leaving the water before body drops start.
const DRIP_DELAY_MS: f64 = 100.0;
/// Time after leaving the water at which body drops stop.
const DRIP_DURATION_MS: f64 = 10_000.0;

/// Derived state carried between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InteractionState {
    /// Water contact on the previous frame.
    pub last_contact: bool,
    pub last_contact_ms: Option<f64>,
    /// Last time the avatar moved or dove.
    pub last_active_ms: Option<f64>,
    pub falling_speed: f32,
    pub speed: f32,
    pub player_dir: Vec3,
    pub contact_point: Vec3,
    pub swimming_above: bool,
    pub walking_deep: bool,
    pub static_ripple: bool,
}

/// Drives all water effects for one avatar.
pub struct WaterInteraction {
    diving_ripple: Option<DivingRipple>,
    lower_splash: Option<DivingLowerSplash>,
    higher_splash: Option<DivingHigherSplash>,
    droplet: Option<Droplet>,
    moving_ripple: Option<MovingRipple>,
    moving_splash: Option<MovingSplash>,
    freestyle_splash: Option<FreestyleSplash>,
    bubble: Option<Bubble>,
    body_drop: Option<BodyDrop>,
    strokes: StrokeSplashes,
    sounds: DivingSounds,
    sound_pattern: String,
    sound_player: Option<Box<dyn SoundPlayer>>,
    step_mode: StepMode,
    static_ripple_delay_ms: f64,
    rng: SmallRng,
    state: InteractionState,
}

impl WaterInteraction {
    /// Validate `config` and construct every enabled effect.
    pub fn new(config: WaterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sounds = DivingSounds::from_catalog(&config.diving_sound_pattern, Vec::<String>::new())?;

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut child = || SmallRng::seed_from_u64(rng.gen());

        let diving_ripple = if config.diving_ripple {
            Some(DivingRipple::new()?)
        } else {
            None
        };
        let lower_splash = config
            .diving_lower_splashes
            .map(|n| DivingLowerSplash::new(n, child()))
            .transpose()?;
        let higher_splash = config
            .diving_higher_splashes
            .map(|n| DivingHigherSplash::new(n, child()))
            .transpose()?;
        let droplet = config.droplets.map(|n| Droplet::new(n, child())).transpose()?;
        let moving_ripple = config
            .moving_ripples
            .map(|n| MovingRipple::new(n, child()))
            .transpose()?;
        let moving_splash = config
            .moving_splashes
            .map(|n| MovingSplash::new(n, child()))
            .transpose()?;
        let freestyle_splash = config
            .freestyle_splashes
            .map(|n| FreestyleSplash::new(n, config.freestyle_splash_height, child()))
            .transpose()?;
        let bubble = config.bubbles.map(|n| Bubble::new(n, child())).transpose()?;
        let body_drop = config
            .body_drops
            .map(|n| BodyDrop::new(n, config.body_drop_drips, child()))
            .transpose()?;
        let strokes = StrokeSplashes::new(child());

        let water = Self {
            diving_ripple,
            lower_splash,
            higher_splash,
            droplet,
            moving_ripple,
            moving_splash,
            freestyle_splash,
            bubble,
            body_drop,
            strokes,
            sounds,
            sound_pattern: config.diving_sound_pattern,
            sound_player: None,
            step_mode: config.step_mode,
            static_ripple_delay_ms: config.static_ripple_delay_ms,
            rng,
            state: InteractionState {
                player_dir: Vec3::NEG_Z,
                ..Default::default()
            },
        };
        log::info!(
            "water interaction ready: {} of {} effects enabled",
            water.effects().count(),
            EffectKind::ALL.len()
        );
        Ok(water)
    }

    /// Filter the host's sound catalog down to diving sounds.
    pub fn with_sound_catalog<I, S>(mut self, catalog: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sounds = DivingSounds::from_catalog(&self.sound_pattern, catalog)?;
        log::debug!("{} diving sounds available", self.sounds.len());
        Ok(self)
    }

    pub fn with_sound_player(mut self, player: impl SoundPlayer + 'static) -> Self {
        self.sound_player = Some(Box::new(player));
        self
    }

    /// Run one frame using the clock's elapsed time and delta.
    pub fn update<A: Avatar + ?Sized>(&mut self, avatar: &A, scene: &SceneSnapshot, time: &Time) -> FrameContext {
        self.update_at(avatar, scene, time.elapsed_ms(), time.delta())
    }

    /// Run one frame at an explicit timestamp.
    pub fn update_at<A: Avatar + ?Sized>(
        &mut self,
        avatar: &A,
        scene: &SceneSnapshot,
        timestamp_ms: f64,
        delta_secs: f32,
    ) -> FrameContext {
        let frame = self.derive_frame(avatar, scene, timestamp_ms, delta_secs);
        let now = frame.timestamp_ms;
        let contact = avatar.in_water();

        if frame.falling_speed > DIVE_SPEED {
            self.dive(&frame);
        }

        let swim = avatar.swim_action();
        self.state.walking_deep = false;
        if let Some(action) = swim {
            if self.state.swimming_above {
                if let Some(ripple) = self.moving_ripple.as_mut() {
                    ripple.emit(&frame);
                }
                if let Some(splash) = self.moving_splash.as_mut() {
                    self.strokes
                        .handle_swimming(&frame, action.style, splash, self.freestyle_splash.as_mut());
                }
            }
            if let Some(bubble) = self.bubble.as_mut() {
                bubble.emit(&frame);
            }
        } else if contact {
            let position = avatar.position();
            self.state.walking_deep = frame.water_surface_height > position.y - avatar.height() * 0.5;
            if self.state.walking_deep {
                if let Some(ripple) = self.moving_ripple.as_mut() {
                    ripple.emit(&frame);
                }
            } else if let Some(splash) = self.moving_splash.as_mut() {
                self.strokes.handle_walking(&frame, avatar.current_step(), splash);
            }
        }

        self.update_static_ripple(now, frame.speed, frame.falling_speed);

        if contact {
            self.state.last_contact_ms = Some(now);
        }
        let dripping = self
            .state
            .last_contact_ms
            .map_or(false, |last| now - last > DRIP_DELAY_MS && now - last < DRIP_DURATION_MS);
        if (contact && swim.is_none()) || dripping {
            if let Some(drops) = self.body_drop.as_mut() {
                drops.emit();
            }
        }

        for effect in self.effects_mut() {
            effect.advance(&frame);
        }

        self.state.last_contact = contact;
        frame
    }

    fn derive_frame<A: Avatar + ?Sized>(
        &mut self,
        avatar: &A,
        scene: &SceneSnapshot,
        timestamp_ms: f64,
        delta_secs: f32,
    ) -> FrameContext {
        let position = avatar.position();
        let rotation = avatar.rotation();
        let velocity = avatar.velocity();
        let surface = scene.water_surface_height;
        let contact = avatar.in_water();

        let speed = Vec3::new(velocity.x, 0.0, velocity.z).length() * SPEED_SCALE;
        let facing = (rotation * Vec3::NEG_Z).normalize_or_zero();
        let player_dir = if facing == Vec3::ZERO { Vec3::NEG_Z } else { facing };

        let entry_speed = if contact && !self.state.last_contact {
            -avatar.vertical_velocity()
        } else {
            0.0
        };
        let falling_speed = if entry_speed > DIVE_SPEED { entry_speed } else { 0.0 };

        self.state.speed = speed;
        self.state.player_dir = player_dir;
        self.state.falling_speed = falling_speed;
        self.state.contact_point = Vec3::new(position.x, surface, position.z);
        self.state.swimming_above =
            avatar.swim_action().is_some() && surface < position.y - ABOVE_SURFACE_MARGIN;

        FrameContext {
            timestamp_ms,
            step: self.step_mode.step(delta_secs),
            water_surface_height: surface,
            camera_rotation: scene.camera_rotation,
            player_position: position,
            player_rotation: rotation,
            player_dir,
            speed,
            falling_speed,
            avatar_height: avatar.height(),
            shoulder_width: avatar.shoulder_width(),
            swimming_hand: avatar.swimming_hand(),
        }
    }

    fn dive(&mut self, frame: &FrameContext) {
        let contact_point = self.state.contact_point;
        log::debug!(
            "dive at ({:.2}, {:.2}, {:.2}) with falling speed {:.2}",
            contact_point.x,
            contact_point.y,
            contact_point.z,
            frame.falling_speed
        );

        if let Some(player) = self.sound_player.as_mut() {
            if let Some(clip) = self.sounds.pick(&mut self.rng) {
                player.play(clip);
            }
        }
        if let Some(ripple) = self.diving_ripple.as_mut() {
            ripple.emit(contact_point);
        }
        if let Some(splash) = self.lower_splash.as_mut() {
            splash.emit(contact_point);
        }
        if let Some(splash) = self.higher_splash.as_mut() {
            splash.emit(contact_point);
        }
        if let Some(droplet) = self.droplet.as_mut() {
            droplet.emit(contact_point, frame.falling_speed);
        }
    }

    fn update_static_ripple(&mut self, now: f64, speed: f32, falling_speed: f32) {
        let last_active = self.state.last_active_ms.get_or_insert(now);
        if speed > MOVING_SPEED || falling_speed > DIVE_SPEED {
            *last_active = now;
        }
        let still_long_enough = now - *last_active > self.static_ripple_delay_ms;

        let show = still_long_enough && self.state.swimming_above;
        if show != self.state.static_ripple {
            log::trace!("static ripple {}", if show { "enabled" } else { "disabled" });
        }
        self.state.static_ripple = show;

        if let Some(ripple) = self.moving_ripple.as_mut() {
            if show {
                ripple.enable_static();
            } else {
                ripple.disable_static();
            }
        }
    }

    // =========================================================================
    // RENDER HAND-OFF
    // =========================================================================

    /// Constructed effects in advance order.
    pub fn effects(&self) -> impl Iterator<Item = &dyn Effect> + '_ {
        [
            self.diving_ripple.as_ref().map(|e| e as &dyn Effect),
            self.lower_splash.as_ref().map(|e| e as &dyn Effect),
            self.higher_splash.as_ref().map(|e| e as &dyn Effect),
            self.droplet.as_ref().map(|e| e as &dyn Effect),
            self.moving_ripple.as_ref().map(|e| e as &dyn Effect),
            self.moving_splash.as_ref().map(|e| e as &dyn Effect),
            self.bubble.as_ref().map(|e| e as &dyn Effect),
            self.freestyle_splash.as_ref().map(|e| e as &dyn Effect),
            self.body_drop.as_ref().map(|e| e as &dyn Effect),
        ]
        .into_iter()
        .flatten()
    }

    fn effects_mut(&mut self) -> impl Iterator<Item = &mut dyn Effect> + '_ {
        [
            self.diving_ripple.as_mut().map(|e| e as &mut dyn Effect),
            self.lower_splash.as_mut().map(|e| e as &mut dyn Effect),
            self.higher_splash.as_mut().map(|e| e as &mut dyn Effect),
            self.droplet.as_mut().map(|e| e as &mut dyn Effect),
            self.moving_ripple.as_mut().map(|e| e as &mut dyn Effect),
            self.moving_splash.as_mut().map(|e| e as &mut dyn Effect),
            self.bubble.as_mut().map(|e| e as &mut dyn Effect),
            self.freestyle_splash.as_mut().map(|e| e as &mut dyn Effect),
            self.body_drop.as_mut().map(|e| e as &mut dyn Effect),
        ]
        .into_iter()
        .flatten()
    }

    /// Every render layer of every constructed effect.
    pub fn layers(&self) -> Vec<LayerView<'_>> {
        self.effects().flat_map(|effect| effect.layers()).collect()
    }

    /// Mark everything as uploaded.
    pub fn clear_dirty(&mut self) {
        for effect in self.effects_mut() {
            effect.clear_dirty();
        }
    }

    pub fn effect(&self, kind: EffectKind) -> Option<&dyn Effect> {
        self.effects().find(|effect| effect.kind() == kind)
    }

    /// Animating slots per constructed effect.
    pub fn active_counts(&self) -> Vec<(EffectKind, usize)> {
        self.effects().map(|effect| (effect.kind(), effect.active_count())).collect()
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn step_mode(&self) -> StepMode {
        self.step_mode
    }

    pub fn diving_sounds(&self) -> &DivingSounds {
        &self.sounds
    }

    pub fn diving_ripple(&self) -> Option<&DivingRipple> {
        self.diving_ripple.as_ref()
    }

    pub fn lower_splash(&self) -> Option<&DivingLowerSplash> {
        self.lower_splash.as_ref()
    }

    pub fn higher_splash(&self) -> Option<&DivingHigherSplash> {
        self.higher_splash.as_ref()
    }

    pub fn droplet(&self) -> Option<&Droplet> {
        self.droplet.as_ref()
    }

    pub fn moving_ripple(&self) -> Option<&MovingRipple> {
        self.moving_ripple.as_ref()
    }

    pub fn moving_splash(&self) -> Option<&MovingSplash> {
        self.moving_splash.as_ref()
    }

    pub fn freestyle_splash(&self) -> Option<&FreestyleSplash> {
        self.freestyle_splash.as_ref()
    }

    pub fn bubble(&self) -> Option<&Bubble> {
        self.bubble.as_ref()
    }

    pub fn body_drop(&self) -> Option<&BodyDrop> {
        self.body_drop.as_ref()
    }
}
