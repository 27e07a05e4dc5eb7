use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, HomeField, Page};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    // Global quit shortcut
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match app.page() {
        Page::Home => handle_home(key, app),
        Page::Points => handle_points(key, app),
        Page::Detail => handle_detail(key, app),
    }
}

fn handle_home(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, BackTab, Char, Down, Enter, Esc, Tab, Up};

    let field = match app.home_field {
        HomeField::Uf => &mut app.uf_input,
        HomeField::City => &mut app.city_input,
    };

    match key.code {
        Esc => return Action::Quit,
        Tab | BackTab | Up | Down => {
            app.home_field = match app.home_field {
                HomeField::Uf => HomeField::City,
                HomeField::City => HomeField::Uf,
            };
        }
        Char(character) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT)
            {
                field.push(character);
                app.home_error = None;
            }
        }
        Backspace => {
            field.pop();
        }
        Enter => {
            app.open_points();
        }
        _ => {}
    }
    Action::None
}

fn handle_points(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Enter, Esc, Left, Right, Tab};

    // The alert only swallows the keys that close it.
    if matches!(key.code, Enter | Esc) && app.dismiss_alert() {
        return Action::None;
    }

    match key.code {
        Char('q') => return Action::Quit,
        Tab => app.switch_points_focus(),
        Left | Char('h') => app.move_cursor(false),
        Right | Char('l') => app.move_cursor(true),
        Enter | Char(' ') => app.activate_cursor(),
        Char('r') => app.refresh(),
        Esc | Backspace | Char('b') => app.navigate_back(),
        _ => {}
    }
    Action::None
}

fn handle_detail(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Backspace, Char, Esc, Left};

    match key.code {
        Char('q') => return Action::Quit,
        Esc | Backspace | Left | Char('b') => app.navigate_back(),
        _ => {}
    }
    Action::None
}

#[cfg(test)]
mod tests {
    use ecoleta_core::model::{ItemId, PermissionStatus};

    use super::*;
    use crate::app::tests::{app, settle};

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    #[test]
    fn typing_fills_the_focused_home_field() {
        let mut app = app(PermissionStatus::Granted);
        app.uf_input.clear();
        app.city_input.clear();

        let _typed = press(&mut app, KeyCode::Char('r'));
        let _typed = press(&mut app, KeyCode::Char('j'));
        let _switched = press(&mut app, KeyCode::Tab);
        let _typed = press(&mut app, KeyCode::Char('q'));

        assert_eq!(app.uf_input, "rj", "uf typed");
        assert_eq!(app.city_input, "q", "q is text on the home page");
        assert_eq!(app.page(), Page::Home, "still home");
    }

    #[test]
    fn enter_with_invalid_route_shows_error() {
        let mut app = app(PermissionStatus::Granted);
        app.city_input.clear();

        let _entered = press(&mut app, KeyCode::Enter);
        assert_eq!(app.page(), Page::Home, "stays home");
        assert!(app.home_error.is_some(), "explains what is missing");
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let mut app = app(PermissionStatus::Granted);
        let action = handle_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app,
        );
        assert_eq!(action, Action::Quit, "quit");
    }

    #[tokio::test]
    async fn space_toggles_and_escape_goes_back() {
        let mut app = app(PermissionStatus::Denied);
        let _entered = press(&mut app, KeyCode::Enter);
        settle(&mut app).await;

        let _dismissed = press(&mut app, KeyCode::Esc);
        assert_eq!(app.page(), Page::Points, "first escape closes the alert");

        let _moved = press(&mut app, KeyCode::Right);
        let _toggled = press(&mut app, KeyCode::Char(' '));
        let selected = app
            .points
            .as_ref()
            .map(|points| points.screen().selected_items().to_vec());
        assert_eq!(selected, Some(vec![ItemId(2)]), "second item toggled");

        let _back = press(&mut app, KeyCode::Esc);
        assert_eq!(app.page(), Page::Home, "left the points page");
    }
}
