mod history;
mod session;
mod status;

pub use history::ConversationLog;
pub use session::{ChatSession, ConversationEvent, SessionError, SessionOptions};
