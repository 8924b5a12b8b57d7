mod audio;
mod document;
mod feed;
mod ids;
mod journal;

pub use audio::SourceHandle;
pub use document::{
    format_timestamp, parse_timestamp, Direction, Document, FieldValue, Fields, Query,
};
pub use feed::{FeedPost, StoryType};
pub use ids::{DocumentId, EntryId, PostId, UserId};
pub use journal::{EntryDraft, JournalEntry, Mood, QueuedEntry};
