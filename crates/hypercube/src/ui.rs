//! Heads-up text, shown in the window title.

use crate::game::{Game, Phase};

pub const TITLE: &str = "HyperCube";

pub fn hud_title(game: &Game) -> String {
    match game.phase() {
        Phase::GameOver => format!(
            "{TITLE} | GAME OVER | score {} | high {} | play again? (Y/N)",
            game.score(),
            game.high_score()
        ),
        Phase::Playing => {
            let score = if game.score_visible() {
                game.score().to_string()
            } else {
                String::new()
            };
            format!(
                "{TITLE} | score {score} | high {} | time {:.1}s",
                game.high_score(),
                game.time_left()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameRules, ShapePool};
    use crate::input::GameInput;
    use crate::scene::Scene;

    #[test]
    fn test_playing_title() {
        let game = Game::new(GameRules::default(), ShapePool::default(), Some(1));
        assert_eq!(hud_title(&game), "HyperCube | score 0 | high 0 | time 60.0s");
    }

    #[test]
    fn test_game_over_prompt() {
        let rules = GameRules {
            countdown_s: 0.5,
            ..GameRules::default()
        };
        let mut scene = Scene::with_defaults(64);
        let mut game = Game::new(rules, ShapePool::default(), Some(1));
        game.update(1.0, &GameInput::default(), &mut scene);
        assert!(hud_title(&game).ends_with("play again? (Y/N)"));
    }
}
