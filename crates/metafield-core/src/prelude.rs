pub use metafield_types::prelude::*;

pub use metafield_types::auth::{AuthCtx, RequestContext};
pub use metafield_types::entity_adapter::ParentEntity;
pub use metafield_types::types::ValueType;

// vim: ts=4
