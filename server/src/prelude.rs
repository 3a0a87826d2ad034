pub use crate::core::app::App;
pub use metafield_types::auth::{AuthCtx, RequestContext};
pub use metafield_types::error::{Error, ErrorCode, MfResult};
pub use metafield_types::types::{ApiResponse, EntityId, EntityType, EntryId, MetaValue, UserId, ViewMode};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
