/*!
 * Forward-Only Cursors
 *
 * Single-pass position trackers over a fixed contiguous range. Both cursors
 * keep `0 <= position <= len` and reject any move past the end instead of
 * truncating it.
 */

mod reader;
mod writer;

pub use reader::ForwardOnlyReader;
pub use writer::ForwardOnlyWriter;
