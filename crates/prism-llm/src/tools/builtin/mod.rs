//! Built-in tools

mod calculate;
mod command;
mod file;
mod lookup;
mod time;
mod web;

pub use calculate::Calculate;
pub use command::RunCommand;
pub use file::ReadFile;
pub use lookup::Lookup;
pub use time::CurrentTime;
pub use web::HttpGet;

/// Cap on bytes returned by file, network and process tools
const MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Cut `text` to at most [`MAX_OUTPUT_BYTES`] on a char boundary
fn truncate_output(mut text: String) -> String {
    if text.len() > MAX_OUTPUT_BYTES {
        let mut end = MAX_OUTPUT_BYTES;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push_str("\n[truncated]");
    }
    text
}
