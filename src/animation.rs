//! Open/close playback of the model's first animation clip.
//!
//! [`AnimationAction`] stands in for the animation subsystem's clip action
//! (time, signed time-scale, pause flag, loop mode). [`AnimationController`]
//! turns a discrete [`PlaybackState`] and a desired duration into settings
//! on that action.

use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    #[default]
    Idle,
    Open,
    Close,
    Pause,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Open => "open",
            PlaybackState::Close => "close",
            PlaybackState::Pause => "pause",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Authored length in seconds.
    pub duration: f32,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Repeat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationAction {
    clip: AnimationClip,
    time: f32,
    time_scale: f32,
    paused: bool,
    enabled: bool,
    running: bool,
    loop_mode: LoopMode,
    clamp_when_finished: bool,
}

impl AnimationAction {
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            paused: false,
            enabled: true,
            running: false,
            loop_mode: LoopMode::Repeat,
            clamp_when_finished: false,
        }
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn duration(&self) -> f32 {
        self.clip.duration
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn set_loop(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    pub fn clamp_when_finished(&self) -> bool {
        self.clamp_when_finished
    }

    pub fn set_clamp_when_finished(&mut self, clamp: bool) {
        self.clamp_when_finished = clamp;
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
        self.paused = false;
        self.enabled = true;
    }

    pub fn play(&mut self) {
        self.running = true;
    }

    /// Advance clip time by `dt` real seconds. Returns `true` when a
    /// play-once action reached either end during this step.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.running || !self.enabled || self.paused {
            return false;
        }
        let delta = dt * self.time_scale;
        if delta == 0.0 {
            return false;
        }
        let duration = self.clip.duration;
        self.time += delta;

        match self.loop_mode {
            LoopMode::Repeat => {
                if duration > 0.0 {
                    self.time = self.time.rem_euclid(duration);
                }
                false
            }
            LoopMode::Once => {
                let finished = if self.time >= duration {
                    self.time = duration;
                    true
                } else if self.time <= 0.0 {
                    self.time = 0.0;
                    true
                } else {
                    false
                };
                if finished {
                    if self.clamp_when_finished {
                        self.paused = true;
                    } else {
                        self.enabled = false;
                    }
                    log::debug!("Clip '{}' finished at {:.3}s", self.clip.name, self.time);
                }
                finished
            }
        }
    }
}

/// Maps playback commands onto the bound clip action.
#[derive(Debug)]
pub struct AnimationController {
    state: PlaybackState,
    desired_duration: f32,
    pending_clip: Option<AnimationClip>,
    action: Option<AnimationAction>,
}

impl AnimationController {
    pub fn new(desired_duration: f32) -> Self {
        Self {
            state: PlaybackState::Idle,
            desired_duration,
            pending_clip: None,
            action: None,
        }
    }

    /// Start over for a freshly loaded model. The first clip, if any, is
    /// bound on the next frame.
    pub fn load_clips(&mut self, clips: &[AnimationClip]) {
        self.state = PlaybackState::Idle;
        self.action = None;
        self.pending_clip = clips.first().cloned();
        if clips.len() > 1 {
            log::debug!(
                "Model has {} clips; only '{}' drives open/close",
                clips.len(),
                clips[0].name
            );
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn desired_duration(&self) -> f32 {
        self.desired_duration
    }

    pub fn action(&self) -> Option<&AnimationAction> {
        self.action.as_ref()
    }

    pub fn has_clip(&self) -> bool {
        self.action.is_some() || self.pending_clip.is_some()
    }

    /// Playback rate that makes the whole clip last `desired_duration` seconds.
    pub fn speed(&self) -> Option<f32> {
        let action = self.action.as_ref()?;
        Some(action.duration() / self.desired_duration)
    }

    pub fn set_playback(&mut self, state: PlaybackState) {
        if !self.has_clip() {
            return;
        }
        if state != self.state {
            log::info!("Playback {} -> {}", self.state, state);
        }
        self.state = state;
        self.apply();
    }

    pub fn set_desired_duration(&mut self, seconds: f32) {
        if !(seconds.is_finite() && seconds > 0.0) {
            log::warn!("Ignoring animation duration {}", seconds);
            return;
        }
        self.desired_duration = seconds;
        self.apply();
    }

    /// Per-frame hook: bind a pending clip, then advance playback.
    pub fn on_frame(&mut self, dt: f32) {
        if let Some(clip) = self.pending_clip.take() {
            self.bind(clip);
        }
        if let Some(action) = &mut self.action {
            action.advance(dt);
        }
    }

    fn bind(&mut self, clip: AnimationClip) {
        log::info!("Binding clip '{}' ({:.2}s)", clip.name, clip.duration);
        let mut action = AnimationAction::new(clip);
        action.set_clamp_when_finished(true);
        action.set_loop(LoopMode::Once);
        action.reset();
        action.set_time(0.0);
        action.set_paused(true);
        action.play();
        self.action = Some(action);
        self.apply();
    }

    fn apply(&mut self) {
        let Some(speed) = self.speed() else {
            return;
        };
        let Some(action) = &mut self.action else {
            return;
        };
        match self.state {
            PlaybackState::Open => {
                action.set_paused(false);
                action.set_time_scale(speed);
            }
            PlaybackState::Close => {
                action.set_paused(false);
                action.set_time_scale(-speed);
            }
            PlaybackState::Pause => action.set_paused(true),
            PlaybackState::Idle => {}
        }
    }
}
