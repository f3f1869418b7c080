//! Interactive route editor.
//!
//! # Responsibilities
//! - Show the route table with a selection cursor
//! - Delete, toggle and add routes through `Config`, saving after each edit
//! - Leave the proxy running when the session ends
//!
//! # Data Flow
//! ```text
//! crossterm event
//!     → state.rs (Editor::handle_event)
//!     → Config mutation + save (write lock)
//!     → view.rs draws the next frame from a snapshot
//! ```
//!
//! # Design Decisions
//! - Runs on a blocking thread; the dispatch engine keeps serving on the
//!   runtime and sees every edit on its next lookup
//! - Event handling is separate from drawing so it can be tested without a
//!   terminal

mod input;
mod state;
mod view;

use std::io;
use std::sync::Arc;

use crate::config::Config;

pub use input::TextInput;
pub use state::{Editor, Flow, Focus, Screen, Status};
pub use view::draw;

/// Run an editor session on the controlling terminal until the operator quits.
///
/// The terminal is restored on every exit path.
pub fn run(config: Arc<Config>) -> io::Result<()> {
    let mut terminal = ratatui::try_init()?;
    let result = event_loop(&mut terminal, Editor::new(config));
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut ratatui::DefaultTerminal, mut editor: Editor) -> io::Result<()> {
    let size = terminal.size()?;
    editor.resize(size.width, size.height);
    tracing::debug!(width = size.width, height = size.height, "Editor session started");

    loop {
        terminal.draw(|frame| draw(frame, &editor))?;

        let event = crossterm::event::read()?;
        if editor.handle_event(&event) == Flow::Quit {
            break;
        }
    }

    tracing::info!("Editor session ended");
    Ok(())
}
