use crate::error::{AnalysisError, Result};
use crate::models::{AnalysisRecord, DocumentIdentity};
use tracing::{error, info};

/// The single "current analysis" of an interactive session.
///
/// A record is only ever stored next to the identity it was produced for:
/// rebinding to a different identity (or to none) drops it.
#[derive(Debug, Default)]
pub struct SessionState {
    identity: Option<DocumentIdentity>,
    record: Option<AnalysisRecord>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt `identity` as the active document. `None` means no file is present.
    pub fn bind_document(&mut self, identity: Option<&DocumentIdentity>) {
        match identity {
            None => {
                if self.identity.is_some() {
                    info!("Document removed, clearing analysis");
                }
                self.identity = None;
                self.record = None;
            }
            Some(identity) if self.identity.as_ref() == Some(identity) => {}
            Some(identity) => {
                info!("Active document changed to {}", identity);
                self.identity = Some(identity.clone());
                self.record = None;
            }
        }
    }

    /// Store `record` for the currently bound identity.
    pub fn set_record(&mut self, record: AnalysisRecord) -> Result<()> {
        let Some(identity) = &self.identity else {
            error!("Attempted to store an analysis with no bound document");
            return Err(AnalysisError::Unbound);
        };
        info!("Analysis stored for {}", identity);
        self.record = Some(record);
        Ok(())
    }

    pub fn current_record(&self) -> Option<&AnalysisRecord> {
        self.record.as_ref()
    }

    pub fn current_identity(&self) -> Option<&DocumentIdentity> {
        self.identity.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.identity.is_none() && self.record.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str) -> AnalysisRecord {
        AnalysisRecord {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_empty() {
        let session = SessionState::new();
        assert!(session.is_empty());
        assert!(session.current_record().is_none());
        assert!(session.current_identity().is_none());
    }

    #[test]
    fn test_new_identity_clears_record() {
        let pairs = [
            (DocumentIdentity::new("a.pdf", 10), DocumentIdentity::new("b.pdf", 10)),
            (DocumentIdentity::new("a.pdf", 10), DocumentIdentity::new("a.pdf", 11)),
            (DocumentIdentity::new("x.pdf", 1), DocumentIdentity::new("y.pdf", 2)),
        ];
        for (first, second) in pairs {
            let mut session = SessionState::new();
            session.bind_document(Some(&first));
            session.set_record(record("r")).unwrap();
            session.bind_document(Some(&second));

            assert!(session.current_record().is_none());
            assert_eq!(session.current_identity(), Some(&second));
        }
    }

    #[test]
    fn test_same_identity_keeps_record() {
        let identity = DocumentIdentity::new("a.pdf", 10);
        let mut session = SessionState::new();
        session.bind_document(Some(&identity));
        session.set_record(record("kept")).unwrap();
        session.bind_document(Some(&identity));

        assert_eq!(
            session.current_record().and_then(|r| r.title.as_deref()),
            Some("kept")
        );
    }

    #[test]
    fn test_unbinding_clears_everything() {
        let identity = DocumentIdentity::new("a.pdf", 10);
        let mut session = SessionState::new();
        session.bind_document(Some(&identity));
        session.set_record(record("r")).unwrap();
        session.bind_document(Some(&identity));
        session.bind_document(None);

        assert!(session.current_record().is_none());
        assert!(session.is_empty());
    }

    #[test]
    fn test_set_record_without_identity_is_rejected() {
        let mut session = SessionState::new();
        let result = session.set_record(record("orphan"));

        assert!(matches!(result, Err(AnalysisError::Unbound)));
        assert!(session.current_record().is_none());
    }

    #[test]
    fn test_returning_to_previous_identity_does_not_restore_record() {
        let a = DocumentIdentity::new("a.pdf", 10);
        let b = DocumentIdentity::new("b.pdf", 20);
        let mut session = SessionState::new();
        session.bind_document(Some(&a));
        session.set_record(record("for a")).unwrap();
        session.bind_document(Some(&b));
        session.bind_document(Some(&a));

        assert!(session.current_record().is_none());
    }
}
