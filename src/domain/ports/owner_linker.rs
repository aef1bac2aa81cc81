use uuid::Uuid;

use crate::domain::errors::OwnerLinkError;
use crate::domain::models::{ObjectMeta, ObjectRef};

/// Port that records a controlling owner on a child's metadata.
///
/// Implementations resolve the owner's kind against their type registry and
/// fail when it is unknown.
pub trait OwnerLinker: Send + Sync {
    fn set_controller_reference(
        &self,
        owner: &ObjectRef,
        owner_uid: Option<Uuid>,
        child: &mut ObjectMeta,
    ) -> Result<(), OwnerLinkError>;
}
