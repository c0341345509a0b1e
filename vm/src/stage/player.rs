use serde::{Deserialize, Serialize};

/// Per-character movement and collision data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub speed: f64,
    pub focused_speed: f64,
    pub hitbox_half_size: f64,
    pub graze_half_size: f64,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            speed: 4.0,
            focused_speed: 2.0,
            hitbox_half_size: 2.5,
            graze_half_size: 20.0,
        }
    }
}

/// One player; characters differ only by their profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub character: i32,
    #[serde(default)]
    pub profile: PlayerProfile,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: 192.0,
            y: 384.0,
            character: 0,
            profile: PlayerProfile::default(),
        }
    }
}
