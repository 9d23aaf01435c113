//! Game rules: win and draw detection.

mod draw;
mod win;

pub use draw::is_draw;
pub use win::{DEFAULT_CONNECT, check_win, winning_move};
