pub mod message;
pub mod types;

pub use message::{preview, Message};
pub use types::{
    Category, ClassMatches, Locale, PendingItem, PendingStatus, SignalBundle, Verdict,
};
