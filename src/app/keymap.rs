use crate::app::{App, InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::EditPath => self.handle_path_key(key),
            InputMode::Details => self.handle_details_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Backspace => self.go_back(),
            KeyCode::Char('e') => self.begin_path_edit(),
            KeyCode::Char('d') => self.download_selected(),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('R') => self.retry(),
            _ => {}
        }
    }

    fn handle_path_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.cancel_path_edit(),
            KeyCode::Enter => self.submit_path(),
            KeyCode::Backspace => {
                self.path_input.pop();
            }
            KeyCode::Char(c) => self.path_input.push(c),
            _ => {}
        }
    }

    fn handle_details_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.close_details(),
            KeyCode::Char('d') => {
                self.download_selected();
                self.close_details();
            }
            KeyCode::Char('p') => self.preview_details(),
            _ => {}
        }
    }
}
