//! Line-oriented input widgets.

pub mod line_editor;
pub mod line_input;

pub use line_editor::{EditOutcome, LineEditor};
pub use line_input::{BufferedLineInput, LineInput, ReadOutcome, TerminalLineInput};
