//! Zoom state for the layout editor.
//!
//! The X and Y axes are independent. Each factor animates toward its target
//! with a cubic ease-out and never leaves `[min, max]`. Callers drive the
//! animation by passing elapsed frame time to `advance()`.

use crate::config::ZoomSettings;
use serde::Serialize;
use std::time::Duration;

/// Cubic ease-out over `t` in `[0, 1]`.
pub fn cubic_out(t: f64) -> f64 {
    let f = t - 1.0;
    f * f * f + 1.0
}

/// A value animated from `from` to `target` over `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    from:     f64,
    target:   f64,
    elapsed:  Duration,
    duration: Duration,
}

impl Tween {
    pub fn new(value: f64, duration: Duration) -> Self {
        Self { from: value, target: value, elapsed: duration, duration }
    }

    pub fn value(&self) -> f64 {
        if self.is_settled() {
            return self.target;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.target - self.from) * cubic_out(t)
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Retarget from wherever the animation currently is.
    pub fn set(&mut self, target: f64) {
        self.from = self.value();
        self.target = target;
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    pub fn is_settled(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// What the zoom shortcut button offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutMode {
    /// Both axes are (or last were) at the minimum.
    #[default]
    ZoomToMax,
    /// Both axes are (or last were) at the maximum.
    ZoomToMin,
}

impl ShortcutMode {
    pub fn description(self) -> &'static str {
        match self {
            ShortcutMode::ZoomToMax => "Zoom to maximum",
            ShortcutMode::ZoomToMin => "Zoom to minimum",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ZoomControls {
    x:        Tween,
    y:        Tween,
    min:      f64,
    max:      f64,
    shortcut: ShortcutMode,
}

impl ZoomControls {
    /// Both axes start settled at the minimum. An inverted range is
    /// reordered; validated settings never have one.
    pub fn new(settings: &ZoomSettings) -> Self {
        let min = settings.min.min(settings.max);
        let max = settings.min.max(settings.max);
        let duration = Duration::from_millis(settings.duration_ms);
        Self {
            x:        Tween::new(min, duration),
            y:        Tween::new(min, duration),
            min,
            max,
            shortcut: ShortcutMode::ZoomToMax,
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn change_x(&mut self, delta: f64) {
        if delta.is_nan() {
            return;
        }
        let target = self.clamp(self.x.target() + delta);
        self.x.set(target);
        self.observe();
    }

    pub fn change_y(&mut self, delta: f64) {
        if delta.is_nan() {
            return;
        }
        let target = self.clamp(self.y.target() + delta);
        self.y.set(target);
        self.observe();
    }

    pub fn advance(&mut self, dt: Duration) {
        self.x.advance(dt);
        self.y.advance(dt);
        self.observe();
    }

    /// Animate both axes to the extreme the shortcut currently offers.
    pub fn run_shortcut(&mut self) {
        let target = match self.shortcut {
            ShortcutMode::ZoomToMax => self.max,
            ShortcutMode::ZoomToMin => self.min,
        };
        self.x.set(target);
        self.y.set(target);
        self.observe();
    }

    /// Flip the shortcut only at exact extremes; anything in between keeps
    /// the last resolved mode.
    fn observe(&mut self) {
        let (x, y) = (self.x_factor(), self.y_factor());
        if x == self.min && y == self.min {
            self.shortcut = ShortcutMode::ZoomToMax;
        } else if x == self.max && y == self.max {
            self.shortcut = ShortcutMode::ZoomToMin;
        }
    }

    pub fn x_factor(&self) -> f64 {
        self.clamp(self.x.value())
    }

    pub fn y_factor(&self) -> f64 {
        self.clamp(self.y.value())
    }

    /// Rendering scale for the X axis: `2^factor`.
    pub fn x_scale(&self) -> f64 {
        self.x_factor().exp2()
    }

    pub fn y_scale(&self) -> f64 {
        self.y_factor().exp2()
    }

    pub fn shortcut(&self) -> ShortcutMode {
        self.shortcut
    }

    pub fn is_animating(&self) -> bool {
        !(self.x.is_settled() && self.y.is_settled())
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
