use crate::error::{AnalysisError, Result};
use crate::models::{AnalysisOptions, UploadedDocument};
use crate::session::SessionState;
use crate::tasks::{TextGenerator, extract_text, request_summary};
use std::sync::Arc;
use tracing::{info, warn};

/// Upload → extraction → summary → session update.
#[derive(Clone)]
pub struct AnalysisWorkflow {
    generator: Arc<dyn TextGenerator>,
}

impl AnalysisWorkflow {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Run one analysis attempt against `session`.
    ///
    /// `None` means no file is present and clears the session. On any error
    /// the session keeps the newly bound identity without a record.
    pub async fn run(
        &self,
        session: &mut SessionState,
        upload: Option<UploadedDocument>,
        options: AnalysisOptions,
    ) -> Result<()> {
        let Some(document) = upload else {
            info!("No document present");
            session.bind_document(None);
            return Ok(());
        };

        let identity = document.identity();
        session.bind_document(Some(&identity));

        if !document.has_pdf_extension() {
            warn!("Rejected non-PDF upload {}", document.filename);
            return Err(AnalysisError::Extraction(format!(
                "{} is not a PDF file",
                document.filename
            )));
        }

        info!(
            "Analyzing {} ({} bytes, detail: {}, audience: {})",
            document.filename,
            document.size(),
            options.detail_level,
            options.target_audience
        );

        let text = extract_text(document.content).await.inspect_err(|e| {
            warn!("Extraction failed for {}: {}", identity, e);
        })?;

        let record = request_summary(self.generator.as_ref(), &text, options).await?;

        session.set_record(record)?;
        info!("Analysis ready for {}", identity);
        Ok(())
    }

    /// The user removed the file.
    pub fn clear(&self, session: &mut SessionState) {
        session.bind_document(None);
    }
}
