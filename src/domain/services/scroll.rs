#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;

use ratatui::widgets::ScrollbarState;

/// Tracks which slice of the rendered transcript is on screen. The view
/// follows the newest bubble lines as they arrive until the user scrolls
/// away from the bottom, and resumes following once they return there.
pub struct Scroll {
    list_length: u16,
    viewport_length: u16,
    following: bool,
    pub position: u16,
    pub scrollbar_state: ScrollbarState,
}

impl Default for Scroll {
    fn default() -> Scroll {
        return Scroll {
            list_length: 0,
            viewport_length: 0,
            following: true,
            position: 0,
            scrollbar_state: ScrollbarState::default(),
        };
    }
}

impl Scroll {
    pub fn up(&mut self) {
        self.move_up(1);
    }

    pub fn up_page(&mut self) {
        self.move_up(self.viewport_length.max(1));
    }

    pub fn down(&mut self) {
        self.move_down(1);
    }

    pub fn down_page(&mut self) {
        self.move_down(self.viewport_length.max(1));
    }

    pub fn last(&mut self) {
        self.position = self.bottom();
        self.following = true;
        self.scrollbar_state.last();
    }

    pub fn set_state(&mut self, list_length: u16, viewport_length: u16) {
        self.list_length = list_length;
        self.viewport_length = viewport_length;

        if self.following || self.position > self.bottom() {
            // Either the view is pinned to the newest lines, or the list
            // shrank underneath it, e.g. after /clear.
            self.position = self.bottom();
            self.following = true;
        }

        self.scrollbar_state = self
            .scrollbar_state
            .content_length(list_length)
            .viewport_content_length(viewport_length)
            .position(self.position);
    }

    fn bottom(&self) -> u16 {
        return self.list_length.saturating_sub(self.viewport_length);
    }

    fn move_up(&mut self, distance: u16) {
        self.position = self.position.saturating_sub(distance);
        self.following = false;
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    fn move_down(&mut self, distance: u16) {
        self.position = self.position.saturating_add(distance).min(self.bottom());
        self.following = self.position == self.bottom();
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }
}
