use crossterm::event::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scene {
    Main,
    FeedMenu,
    PlayMenu,
    Weather,
    Help,
}

/// User commands, already keyed to the active scene. Menu choices are
/// positional: the app resolves the index against the config registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PetCommand {
    OpenFeedMenu,
    OpenPlayMenu,
    Choose(usize),
    Sleep,
    Pat,
    OpenWeather,
    OpenHelp,
    VolumeUp,
    VolumeDown,
    Back,
    Quit,
}

pub(crate) fn map_key(scene: Scene, key: KeyCode) -> Option<PetCommand> {
    // Global
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(PetCommand::Quit),
        KeyCode::Esc => return Some(PetCommand::Back),
        _ => {}
    }

    match scene {
        Scene::Main => match key {
            KeyCode::Char('f') | KeyCode::Char('F') => Some(PetCommand::OpenFeedMenu),
            KeyCode::Char('p') | KeyCode::Char('P') => Some(PetCommand::OpenPlayMenu),
            KeyCode::Char('s') | KeyCode::Char('S') => Some(PetCommand::Sleep),
            KeyCode::Char('t') | KeyCode::Char('T') => Some(PetCommand::Pat),
            KeyCode::Char('w') | KeyCode::Char('W') => Some(PetCommand::OpenWeather),
            KeyCode::Char('h') | KeyCode::Char('H') => Some(PetCommand::OpenHelp),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(PetCommand::VolumeUp),
            KeyCode::Char('-') | KeyCode::Char('_') => Some(PetCommand::VolumeDown),
            _ => None,
        },
        Scene::FeedMenu | Scene::PlayMenu => match key {
            KeyCode::Char(ch) if ch.is_ascii_digit() && ch != '0' => {
                Some(PetCommand::Choose(ch as usize - '1' as usize))
            }
            _ => None,
        },
        Scene::Weather | Scene::Help => match key {
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char('h') | KeyCode::Char('H') => {
                Some(PetCommand::Back)
            }
            KeyCode::Enter => Some(PetCommand::Back),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_scene_bindings() {
        assert_eq!(
            map_key(Scene::Main, KeyCode::Char('f')),
            Some(PetCommand::OpenFeedMenu)
        );
        assert_eq!(map_key(Scene::Main, KeyCode::Char('S')), Some(PetCommand::Sleep));
        assert_eq!(map_key(Scene::Main, KeyCode::Char('x')), None);
    }

    #[test]
    fn digits_pick_menu_entries() {
        assert_eq!(
            map_key(Scene::FeedMenu, KeyCode::Char('1')),
            Some(PetCommand::Choose(0))
        );
        assert_eq!(
            map_key(Scene::PlayMenu, KeyCode::Char('4')),
            Some(PetCommand::Choose(3))
        );
        assert_eq!(map_key(Scene::FeedMenu, KeyCode::Char('0')), None);
    }

    #[test]
    fn quit_and_back_are_global() {
        for scene in [Scene::Main, Scene::FeedMenu, Scene::Weather, Scene::Help] {
            assert_eq!(map_key(scene, KeyCode::Char('q')), Some(PetCommand::Quit));
            assert_eq!(map_key(scene, KeyCode::Esc), Some(PetCommand::Back));
        }
    }
}
