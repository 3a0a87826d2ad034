pub use crate::error::{Error, ErrorCode, MfResult};
pub use crate::types::{EntityId, EntityType, EntryId, MetaValue, UserId, ViewMode};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
