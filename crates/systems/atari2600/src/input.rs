//! Controller and console switch state staged by the host.
//!
//! Nothing here touches the machine directly: the engine latches the staged
//! state into the RIOT ports and TIA trigger inputs once per frame.

use serde::{Deserialize, Serialize};

/// One joystick; `true` means held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Joystick {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

impl Joystick {
    /// Active-low direction nibble in SWCHA bit order (right, left, down, up).
    fn nibble(&self) -> u8 {
        let mut bits = 0x0F;
        if self.right {
            bits &= !0x08;
        }
        if self.left {
            bits &= !0x04;
        }
        if self.down {
            bits &= !0x02;
        }
        if self.up {
            bits &= !0x01;
        }
        bits
    }
}

/// Front panel switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSwitches {
    pub reset: bool,
    pub select: bool,
    /// Color (true) or black and white TV type
    pub color: bool,
    /// Left difficulty in the A (pro) position
    pub left_difficulty_a: bool,
    pub right_difficulty_a: bool,
}

impl Default for ConsoleSwitches {
    fn default() -> Self {
        Self {
            reset: false,
            select: false,
            color: true,
            left_difficulty_a: false,
            right_difficulty_a: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputState {
    pub joysticks: [Joystick; 2],
    pub switches: ConsoleSwitches,
}

impl InputState {
    /// SWCHA pins: player 0 in the high nibble
    pub fn swcha(&self) -> u8 {
        (self.joysticks[0].nibble() << 4) | self.joysticks[1].nibble()
    }

    /// SWCHB pins: reset/select active low, color and difficulty A high
    pub fn swchb(&self) -> u8 {
        let s = &self.switches;
        let mut bits = 0;
        if !s.reset {
            bits |= 0x01;
        }
        if !s.select {
            bits |= 0x02;
        }
        if s.color {
            bits |= 0x08;
        }
        if s.left_difficulty_a {
            bits |= 0x40;
        }
        if s.right_difficulty_a {
            bits |= 0x80;
        }
        bits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_ports() {
        let input = InputState::default();
        assert_eq!(input.swcha(), 0xFF);
        // Matches the RIOT power-on port B value
        assert_eq!(input.swchb(), 0x0B);
    }

    #[test]
    fn test_joystick_bits() {
        let mut input = InputState::default();
        input.joysticks[0].right = true;
        input.joysticks[1].up = true;
        assert_eq!(input.swcha(), 0x7E);
    }

    #[test]
    fn test_switch_bits() {
        let mut input = InputState::default();
        input.switches.reset = true;
        input.switches.color = false;
        input.switches.left_difficulty_a = true;
        assert_eq!(input.swchb(), 0x42);
    }
}
