use std::sync::Arc;

use course_core::model::{ContactDraft, ContactSubmission};
use course_core::Clock;
use storage::{keys, ProgressBridge, SuspendEnvelope};

use crate::error::ContactServiceError;

/// Validates contact-form submissions and merges them into the suspend
/// envelope's `contact` field.
///
/// The merge goes through the session's suspend-data accessors when
/// connected, or the equivalent local key otherwise. Both paths are
/// read-merge-write, so the sibling `progress` field keeps its last
/// value. Persistence is best effort; validation is not.
pub struct ContactService {
    clock: Clock,
    bridge: Arc<ProgressBridge>,
}

impl ContactService {
    #[must_use]
    pub fn new(clock: Clock, bridge: Arc<ProgressBridge>) -> Self {
        Self { clock, bridge }
    }

    /// Validate the draft, persist it, and record the `contact_sent`
    /// location.
    ///
    /// # Errors
    ///
    /// Returns `ContactServiceError::Invalid` when a field fails
    /// validation; storage failures are logged, not returned.
    pub fn submit(&self, draft: ContactDraft) -> Result<ContactSubmission, ContactServiceError> {
        let submission = draft.validate(self.clock.now())?;

        if let Err(err) = self.persist(&submission) {
            tracing::warn!(%err, "contact save failed");
        }
        if let Err(err) = self.bridge.save_location("contact_sent") {
            tracing::debug!(%err, "contact location save failed");
        }

        Ok(submission)
    }

    fn persist(&self, submission: &ContactSubmission) -> Result<(), storage::BridgeError> {
        let session = self.bridge.session();
        if session.is_connected() {
            let raw = session.suspend_data().unwrap_or_default();
            let mut envelope = SuspendEnvelope::parse(&raw);
            envelope.set_contact(submission);
            session.set_suspend_data(&envelope.to_json())?;
            session.commit()?;
            return Ok(());
        }

        let local = self.bridge.local();
        let raw = local.get(keys::SUSPEND_DATA).ok().flatten().unwrap_or_default();
        let mut envelope = SuspendEnvelope::parse(&raw);
        envelope.set_contact(submission);
        local.set(keys::SUSPEND_DATA, &envelope.to_json())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::ContactError;
    use course_core::time::fixed_clock;
    use storage::{LocalStore, MemoryStore, NullSession};

    fn service() -> (ContactService, Arc<MemoryStore>) {
        let local = Arc::new(MemoryStore::new());
        let bridge = Arc::new(ProgressBridge::new(Arc::new(NullSession), local.clone()));
        (ContactService::new(fixed_clock(), bridge), local)
    }

    fn draft() -> ContactDraft {
        ContactDraft {
            full_name: "Dana Levi".into(),
            email: "dana@example.com".into(),
            role: "student".into(),
            message: "would love a demo".into(),
        }
    }

    #[test]
    fn submit_persists_the_contact_field_locally() {
        let (service, local) = service();
        service.submit(draft()).unwrap();

        let raw = local.get(keys::SUSPEND_DATA).unwrap().unwrap();
        let envelope = SuspendEnvelope::parse(&raw);
        let contact = envelope.contact().unwrap();
        assert_eq!(contact["fullName"], "Dana Levi");
        assert_eq!(
            local.get(keys::LOCATION).unwrap().as_deref(),
            Some("contact_sent")
        );
    }

    #[test]
    fn submit_preserves_existing_progress_in_the_envelope() {
        let (service, local) = service();
        local
            .set(
                keys::SUSPEND_DATA,
                r#"{"progress":{"completedUnits":[1,2]}}"#,
            )
            .unwrap();

        service.submit(draft()).unwrap();

        let raw = local.get(keys::SUSPEND_DATA).unwrap().unwrap();
        let envelope = SuspendEnvelope::parse(&raw);
        assert_eq!(envelope.progress().unwrap().completed_count(), 2);
        assert!(envelope.contact().is_some());
    }

    #[test]
    fn invalid_drafts_are_rejected_and_nothing_is_written() {
        let (service, local) = service();
        let mut bad = draft();
        bad.email = "not-an-email".into();

        let err = service.submit(bad).unwrap_err();
        assert_eq!(
            err,
            ContactServiceError::Invalid(ContactError::InvalidEmail)
        );
        assert_eq!(local.get(keys::SUSPEND_DATA).unwrap(), None);
        assert_eq!(local.get(keys::LOCATION).unwrap(), None);
    }
}
