mod capture_command;
pub use capture_command::*;

mod history_command;
pub use history_command::*;

mod last_command;
pub use last_command::*;

mod answer_command;
pub use answer_command::*;

mod updates_command;
pub use updates_command::*;
