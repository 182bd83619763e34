//! Pointer event normalization.
//!
//! The render engine expects every pointer to follow `add → (hover|down|move|up)* → remove`
//! with phases that agree with the button mask it was last told about. Platform input
//! arrives in whatever order the OS delivers it, so this module keeps the per-pointer
//! state and rewrites raw updates into that stream.

use std::time::Instant;

use bitflags::bitflags;
use smallvec::SmallVec;

bitflags! {
    /// Mouse buttons as the render engine numbers them.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct MouseButtons: u64 {
        const PRIMARY = 1 << 0;
        const SECONDARY = 1 << 1;
        const MIDDLE = 1 << 2;
        const BACK = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Add,
    Remove,
    Hover,
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDeviceKind {
    Mouse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSignalKind {
    None,
    Scroll,
}

/// Fully populated event, ready for the engine boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    pub device_kind: PointerDeviceKind,
    pub buttons: MouseButtons,
    pub signal_kind: PointerSignalKind,
    pub scroll_delta_x: f64,
    pub scroll_delta_y: f64,
    /// Microseconds since the normalizer was created.
    pub timestamp_us: u64,
}

/// Platform-level pointer update, before normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawPointerEvent {
    Add { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Down { x: f64, y: f64, button: MouseButtons },
    Up { x: f64, y: f64, button: MouseButtons },
    Leave,
    Scroll {
        x: f64,
        y: f64,
        delta_x: f64,
        delta_y: f64,
        multiplier: i32,
    },
}

/// What the engine has been told about the (single, default) mouse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    pub buttons: MouseButtons,
    pub added: bool,
    pub down: bool,
}

/// Output of one dispatch: nothing, the event, or a synthesized add followed by the event.
pub type NormalizedEvents = SmallVec<[PointerEvent; 2]>;

pub struct PointerEventNormalizer {
    state: PointerState,
    last_x: f64,
    last_y: f64,
    origin: Instant,
}

impl PointerEventNormalizer {
    pub fn new() -> Self {
        Self {
            state: PointerState::default(),
            last_x: 0.0,
            last_y: 0.0,
            origin: Instant::now(),
        }
    }

    #[inline]
    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn dispatch(&mut self, raw: RawPointerEvent) -> NormalizedEvents {
        let mut out = NormalizedEvents::new();

        match raw {
            RawPointerEvent::Add { x, y } => {
                // Out-of-order delivery can bring an add after one was synthesized.
                if self.state.added {
                    log::trace!("pointer: duplicate add dropped");
                    return out;
                }
                self.push(&mut out, PointerPhase::Add, x, y, MouseButtons::empty());
                self.state.added = true;
            }
            RawPointerEvent::Leave => {
                if !self.state.added {
                    log::trace!("pointer: remove without add dropped");
                    return out;
                }
                let (x, y) = (self.last_x, self.last_y);
                self.push(&mut out, PointerPhase::Remove, x, y, self.state.buttons);
                self.state = PointerState::default();
            }
            RawPointerEvent::Move { x, y } => {
                self.ensure_added(&mut out, x, y);
                self.push_derived(&mut out, x, y);
            }
            RawPointerEvent::Down { x, y, button } => {
                if button.is_empty() {
                    return out;
                }
                self.ensure_added(&mut out, x, y);
                self.state.buttons |= button;
                self.push_derived(&mut out, x, y);
            }
            RawPointerEvent::Up { x, y, button } => {
                if button.is_empty() {
                    return out;
                }
                self.ensure_added(&mut out, x, y);
                self.state.buttons.remove(button);
                self.push_derived(&mut out, x, y);
            }
            RawPointerEvent::Scroll {
                x,
                y,
                delta_x,
                delta_y,
                multiplier,
            } => {
                self.ensure_added(&mut out, x, y);
                let phase = self.derived_phase();
                let mut ev = self.event(phase, x, y, self.state.buttons);
                ev.signal_kind = PointerSignalKind::Scroll;
                ev.scroll_delta_x = delta_x * f64::from(multiplier);
                ev.scroll_delta_y = delta_y * f64::from(multiplier);
                self.record(&mut out, ev);
                self.apply_phase(phase);
            }
        }

        out
    }

    /// `down ? (buttons == 0 ? Up : Move) : (buttons == 0 ? Hover : Down)`,
    /// against the already-updated mask.
    fn derived_phase(&self) -> PointerPhase {
        match (self.state.down, self.state.buttons.is_empty()) {
            (true, true) => PointerPhase::Up,
            (true, false) => PointerPhase::Move,
            (false, true) => PointerPhase::Hover,
            (false, false) => PointerPhase::Down,
        }
    }

    fn apply_phase(&mut self, phase: PointerPhase) {
        match phase {
            PointerPhase::Up => self.state.down = false,
            PointerPhase::Down | PointerPhase::Move if !self.state.buttons.is_empty() => {
                self.state.down = true;
            }
            _ => {}
        }
    }

    fn ensure_added(&mut self, out: &mut NormalizedEvents, x: f64, y: f64) {
        if self.state.added {
            return;
        }
        self.push(out, PointerPhase::Add, x, y, MouseButtons::empty());
        self.state.added = true;
    }

    fn push_derived(&mut self, out: &mut NormalizedEvents, x: f64, y: f64) {
        let phase = self.derived_phase();
        self.push(out, phase, x, y, self.state.buttons);
        self.apply_phase(phase);
    }

    fn push(&mut self, out: &mut NormalizedEvents, phase: PointerPhase, x: f64, y: f64, buttons: MouseButtons) {
        let ev = self.event(phase, x, y, buttons);
        self.record(out, ev);
    }

    fn record(&mut self, out: &mut NormalizedEvents, ev: PointerEvent) {
        self.last_x = ev.x;
        self.last_y = ev.y;
        log::trace!("pointer: {:?} at ({:.1}, {:.1}) buttons={:?}", ev.phase, ev.x, ev.y, ev.buttons);
        out.push(ev);
    }

    fn event(&self, phase: PointerPhase, x: f64, y: f64, buttons: MouseButtons) -> PointerEvent {
        PointerEvent {
            phase,
            x,
            y,
            device_kind: PointerDeviceKind::Mouse,
            buttons,
            signal_kind: PointerSignalKind::None,
            scroll_delta_x: 0.0,
            scroll_delta_y: 0.0,
            timestamp_us: u64::try_from(self.origin.elapsed().as_micros()).unwrap_or(u64::MAX),
        }
    }
}

impl Default for PointerEventNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
