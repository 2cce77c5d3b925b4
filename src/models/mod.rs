//! All structured models of the dispatcher: parsed commands, interface
//! state as reported by devices, and the responses sent back to the room.

mod command;
pub use command::*;

mod interface;
pub use interface::*;

mod response;
pub use response::*;
