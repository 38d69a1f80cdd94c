use crate::level::LevelData;
use crate::types::Pos;

/// Default playfield edge length. Small on purpose: programs stay short and
/// every cell is visible at once.
pub const GRID_SIZE: i32 = 5;

pub struct Theme {
    pub name: &'static str,
    pub story: &'static str,
}

pub const THEMES: [Theme; 6] = [
    Theme { name: "park", story: "Help Robo find the magical star in the park!" },
    Theme { name: "space", story: "Robo is in space! Reach the energy core." },
    Theme { name: "ocean", story: "Swim through the seaweed to find the treasure!" },
    Theme { name: "candy", story: "Yum! Navigate past the broccoli to get the cookie." },
    Theme { name: "forest", story: "Hike through the trees to find the campsite." },
    Theme { name: "snow", story: "Brrr! Slide on the ice to find the warm cocoa." },
];

/// Fixed rotation: level 1 gets the first theme, wrapping around forever.
pub fn theme_for_level(level_id: u32) -> &'static Theme {
    &THEMES[level_id.saturating_sub(1) as usize % THEMES.len()]
}

/// The level every new session starts on.
pub fn initial_level() -> LevelData {
    LevelData {
        id: 1,
        grid_size: GRID_SIZE,
        start: Pos { x: 0, y: 0 },
        goal: Pos { x: 3, y: 0 },
        obstacles: vec![Pos { x: 1, y: 1 }, Pos { x: 2, y: 1 }, Pos { x: 3, y: 1 }],
        theme: "park".to_string(),
        story: "Help Robo get to the magical star! Watch out for the bushes.".to_string(),
    }
}

/// Known-valid static level used when generation exhausts its attempt
/// bound, annotated with the id the caller asked for.
pub fn fallback_level(level_id: u32) -> LevelData {
    LevelData {
        id: level_id,
        grid_size: GRID_SIZE,
        start: Pos { x: 0, y: 4 },
        goal: Pos { x: 4, y: 0 },
        obstacles: vec![Pos { x: 1, y: 3 }, Pos { x: 2, y: 2 }, Pos { x: 3, y: 1 }],
        theme: "space".to_string(),
        story: "Robo is in space! Navigate through the asteroids to reach the energy core."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_rotation_wraps_and_starts_at_park() {
        assert_eq!(theme_for_level(1).name, "park");
        assert_eq!(theme_for_level(6).name, "snow");
        assert_eq!(theme_for_level(7).name, "park");
        assert_eq!(theme_for_level(14).name, "space");
    }

    #[test]
    fn static_levels_are_valid_for_any_requested_id() {
        initial_level().validate().expect("initial level");
        for id in [1, 2, 99, 1000] {
            let level = fallback_level(id);
            assert_eq!(level.id, id);
            level.validate().expect("fallback level");
        }
    }
}
