mod lyrics_view;
mod status_bar;

pub use lyrics_view::{lit_char_count, LyricsViewWidget};
pub use status_bar::{format_time, StatusBarWidget};
