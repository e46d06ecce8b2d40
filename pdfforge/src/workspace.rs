//! The workspace: one user's session, end to end.
//!
//! A [`Workspace`] takes uploads through validation and parsing into the
//! [`SessionModel`], runs split and merge through the [`TransformEngine`],
//! writes the result as a download artifact, records it in the session, and
//! mirrors it to the [`HistoryStore`] for signed-in users.
//!
//! Which collaborators are involved depends only on the current [`Identity`]:
//!
//! | step                 | `Anonymous`            | `Authenticated`        |
//! |----------------------|------------------------|------------------------|
//! | before a transform   | guest quota checked    | -                      |
//! | after a transform    | guest use recorded     | record mirrored        |
//! | history              | session results        | store, newest first    |
//! | delete a result      | session only           | session, then store    |
//!
//! Store failures never undo local work; they come back as warnings.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::document::{
    ContentRef, DocumentId, OperationDetail, ProcessedDocument, SourceDocument, Upload,
    validate_upload,
};
use crate::error::{PdfForgeError, Result};
use crate::guest::{GuestAllowance, GuestQuota, UsageGate};
use crate::history::{self, HistoryRecord, HistoryStore, NewRecord};
use crate::identity::{Identity, IdentityWatch};
use crate::io::{PdfReader, PdfWriter, WriteStatistics};
use crate::session::{MergePlan, SessionModel, SplitEditor};
use crate::thumbnail::{PopulateReport, ThumbnailRenderer};
use crate::transform::{TransformEngine, TransformOutput};

/// Result of a successful split or merge.
#[derive(Debug)]
pub struct OperationOutcome {
    /// The recorded result.
    pub processed: ProcessedDocument,
    /// Where the download artifact was written.
    pub artifact: WriteStatistics,
    /// Non-fatal problems, such as a failed history mirror.
    pub warnings: Vec<PdfForgeError>,
}

/// History entries plus the reason for falling back to the session list.
#[derive(Debug)]
pub struct HistoryView {
    /// Entries, most recent first.
    pub entries: Vec<HistoryRecord>,
    /// Set when the store could not be reached.
    pub warning: Option<PdfForgeError>,
}

/// What happened on the remote side of a delete.
#[derive(Debug)]
pub enum RemoteDeletion {
    /// Not attempted: guest session or guest result.
    Skipped,
    /// The store acknowledged the delete.
    Deleted,
    /// The store call failed; local removal still happened.
    Failed(PdfForgeError),
}

/// Result of deleting a processed document.
#[derive(Debug)]
pub struct DeleteOutcome {
    /// Whether the session held the document.
    pub removed_locally: bool,
    /// Remote path outcome.
    pub remote: RemoteDeletion,
}

/// One user's session with all its collaborators.
#[derive(Debug)]
pub struct Workspace {
    config: Config,
    session: SessionModel,
    identity: IdentityWatch,
    reader: PdfReader,
    writer: PdfWriter,
    engine: TransformEngine,
    renderer: ThumbnailRenderer,
    store: Arc<dyn HistoryStore>,
    gate: Arc<dyn UsageGate>,
}

impl Workspace {
    /// Assemble a workspace from explicit collaborators.
    pub fn new(config: Config, store: Arc<dyn HistoryStore>, gate: Arc<dyn UsageGate>) -> Self {
        let renderer = ThumbnailRenderer::new(config.effective_jobs());
        Self {
            config,
            session: SessionModel::new(),
            identity: IdentityWatch::default(),
            reader: PdfReader::new(),
            writer: PdfWriter::new(),
            engine: TransformEngine::new(),
            renderer,
            store,
            gate,
        }
    }

    /// Validate `config` and build the store and guest quota it describes.
    ///
    /// # Errors
    ///
    /// Returns [`PdfForgeError::InvalidConfig`] for an invalid configuration
    /// or an output directory that cannot be written.
    pub async fn from_config(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| PdfForgeError::invalid_config(e.to_string()))?;
        PdfWriter::new().can_write(&config.output_dir).await?;

        let store = history::open_store(&config.store)?;
        let gate: Arc<dyn UsageGate> = match &config.guest_usage_file {
            Some(path) => Arc::new(GuestQuota::open(config.guest_limit, path).await),
            None => Arc::new(GuestQuota::in_memory(config.guest_limit)),
        };
        Ok(Self::new(config, store, gate))
    }

    /// Replace the thumbnail renderer.
    pub fn with_renderer(mut self, renderer: ThumbnailRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sign-in state; subscribe to follow changes.
    pub fn identity(&self) -> &IdentityWatch {
        &self.identity
    }

    /// Registered documents and results.
    pub fn session(&self) -> &SessionModel {
        &self.session
    }

    /// Mutable access to the session registry.
    pub fn session_mut(&mut self) -> &mut SessionModel {
        &mut self.session
    }

    /// What the guest quota currently allows.
    pub fn guest_allowance(&self) -> GuestAllowance {
        self.gate.check()
    }

    /// Validate, parse and register one upload.
    ///
    /// # Errors
    ///
    /// - [`PdfForgeError::Validation`] for a wrong type or an oversized file;
    ///   nothing is parsed in that case
    /// - [`PdfForgeError::CorruptSource`] if the bytes are not a readable PDF
    #[instrument(skip_all, fields(name = %upload.name, size = upload.byte_size))]
    pub async fn upload(&mut self, upload: Upload) -> Result<SourceDocument> {
        validate_upload(&upload, self.config.max_upload_bytes)?;

        let bytes = upload
            .content
            .read()
            .await
            .map_err(|e| PdfForgeError::corrupt_source(&upload.name, format!("unreadable: {e}")))?;
        let page_count = self.reader.parse(&upload.name, bytes).await?.page_count;

        let document = SourceDocument::new(upload.name, upload.byte_size, page_count, upload.content);
        self.session.add_document(document.clone())?;
        info!(id = %document.id(), page_count, "document uploaded");
        Ok(document)
    }

    /// Upload several files; each succeeds or fails on its own.
    pub async fn upload_many(&mut self, uploads: Vec<Upload>) -> Vec<(String, Result<SourceDocument>)> {
        let mut results = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let name = upload.name.clone();
            let result = self.upload(upload).await;
            if let Err(e) = &result {
                warn!(name = %name, error = %e, "upload rejected");
            }
            results.push((name, result));
        }
        results
    }

    /// Make a document active and start a split editor on it.
    pub fn open_editor(&mut self, id: DocumentId) -> Result<SplitEditor> {
        self.session.set_active(id)?;
        let document = self
            .session
            .active()
            .cloned()
            .ok_or_else(|| PdfForgeError::not_found("Document", id))?;
        Ok(SplitEditor::new(document))
    }

    /// Render previews for every page shown by `editor`.
    pub async fn render_thumbnails(&self, editor: &SplitEditor) -> PopulateReport {
        self.renderer
            .populate(editor.source(), editor.grid(), self.config.thumbnail_width)
            .await
    }

    /// A merge plan holding registered documents in the given order.
    pub fn plan_merge(&self, ids: &[DocumentId]) -> Result<MergePlan> {
        let mut plan = MergePlan::new();
        for &id in ids {
            let document = self
                .session
                .document(id)
                .ok_or_else(|| PdfForgeError::not_found("Document", id))?;
            plan.add(document.clone());
        }
        Ok(plan)
    }

    /// Split the editor's selection out of its document.
    ///
    /// # Errors
    ///
    /// Anything the transform engine raises, plus
    /// [`PdfForgeError::GuestLimitReached`] for an exhausted guest. Nothing
    /// is written or recorded on error.
    #[instrument(skip_all, fields(source = %editor.source().id()))]
    pub async fn split(&mut self, editor: &SplitEditor) -> Result<OperationOutcome> {
        let identity = self.identity.current();
        self.check_guest(&identity)?;

        let source = editor.source();
        let output = self.engine.split(source, editor.selection()).await?;
        let detail = OperationDetail::Split {
            pages: editor.selection().pages().to_vec(),
        };

        self.complete(
            identity,
            source.name().to_string(),
            editor.output_name().to_string(),
            detail,
            output,
        )
        .await
    }

    /// Merge the plan's documents in plan order.
    ///
    /// # Errors
    ///
    /// [`PdfForgeError::InsufficientInput`] before anything else for a plan
    /// of fewer than two documents, then as for [`Workspace::split`].
    #[instrument(skip_all, fields(sources = plan.len()))]
    pub async fn merge(&mut self, plan: &MergePlan) -> Result<OperationOutcome> {
        plan.ensure_executable()?;
        let identity = self.identity.current();
        self.check_guest(&identity)?;

        let output = self.engine.merge(plan.documents()).await?;
        let detail = OperationDetail::Merge {
            sources: plan.documents().iter().map(SourceDocument::id).collect(),
        };
        let description = plan
            .documents()
            .iter()
            .map(SourceDocument::name)
            .collect::<Vec<_>>()
            .join(", ");

        self.complete(identity, description, plan.output_name().to_string(), detail, output)
            .await
    }

    fn check_guest(&self, identity: &Identity) -> Result<()> {
        match identity {
            Identity::Authenticated(_) => Ok(()),
            Identity::Anonymous => {
                let allowance = self.gate.check();
                if allowance.allowed {
                    Ok(())
                } else {
                    Err(PdfForgeError::GuestLimitReached {
                        limit: allowance.limit,
                    })
                }
            }
        }
    }

    async fn complete(
        &mut self,
        identity: Identity,
        source_description: String,
        file_name: String,
        detail: OperationDetail,
        output: TransformOutput,
    ) -> Result<OperationOutcome> {
        let path: PathBuf = self.config.output_dir.join(&file_name);
        let artifact = self.writer.save_bytes(output.bytes.into(), &path).await?;

        let processed = ProcessedDocument {
            id: Uuid::new_v4(),
            owner: identity.clone(),
            source_description,
            result: ContentRef::from_path(&path),
            result_page_count: output.page_count,
            detail,
            file_name,
            created_at: Utc::now(),
        };
        self.session.record_processed(processed.clone());

        let mut warnings = Vec::new();
        match identity {
            Identity::Anonymous => {
                let used = self.gate.record_use().await;
                info!(used, "guest operation counted");
            }
            Identity::Authenticated(owner) => {
                let record = NewRecord {
                    id: processed.id,
                    owner,
                    source_names: processed.source_description.clone(),
                    result_ref: path.display().to_string(),
                    kind: processed.kind(),
                    page_count: processed.result_page_count,
                    detail: processed.detail.clone(),
                    file_name: processed.file_name.clone(),
                };
                if let Err(e) = self.store.create_record(record).await {
                    warn!(id = %processed.id, error = %e, "history mirror failed");
                    warnings.push(e);
                }
            }
        }

        info!(
            id = %processed.id,
            kind = %processed.kind(),
            pages = processed.result_page_count,
            path = %artifact.output_path.display(),
            "operation recorded"
        );
        Ok(OperationOutcome {
            processed,
            artifact,
            warnings,
        })
    }

    /// Processing history for the current identity.
    ///
    /// Guests see this session's results. Signed-in users see the store's
    /// records; if the store fails they see this session's results and a
    /// warning.
    pub async fn history(&self) -> HistoryView {
        let local = || {
            self.session
                .processed()
                .map(HistoryRecord::from_processed)
                .collect::<Vec<_>>()
        };

        match self.identity.current() {
            Identity::Anonymous => HistoryView {
                entries: local(),
                warning: None,
            },
            Identity::Authenticated(owner) => match self.store.list_records(&owner).await {
                Ok(entries) => HistoryView {
                    entries,
                    warning: None,
                },
                Err(e) => {
                    warn!(error = %e, "history store unavailable, showing session results");
                    HistoryView {
                        entries: local(),
                        warning: Some(e),
                    }
                }
            },
        }
    }

    /// Delete a processed document from the session and, for a signed-in
    /// owner, from the store.
    ///
    /// Both paths run independently: a store failure does not undo the local
    /// removal, and a result missing locally is still deleted remotely.
    ///
    /// # Errors
    ///
    /// Returns [`PdfForgeError::NotFound`] only when the session does not
    /// hold the document and the store was not consulted.
    #[instrument(skip(self))]
    pub async fn delete_processed(&mut self, id: Uuid) -> Result<DeleteOutcome> {
        let local = self.session.remove_processed(id);
        let removed_locally = local.is_some();
        let guest_result = local.as_ref().is_some_and(|p| p.owner_id().is_none());

        let remote = match self.identity.current() {
            Identity::Anonymous => RemoteDeletion::Skipped,
            Identity::Authenticated(_) if guest_result => RemoteDeletion::Skipped,
            Identity::Authenticated(_) => match self.store.delete_record(id).await {
                Ok(()) => RemoteDeletion::Deleted,
                Err(e) => {
                    warn!(error = %e, "remote delete failed");
                    RemoteDeletion::Failed(e)
                }
            },
        };

        if !removed_locally && matches!(remote, RemoteDeletion::Skipped) {
            return Err(PdfForgeError::not_found("Processed document", id));
        }
        Ok(DeleteOutcome {
            removed_locally,
            remote,
        })
    }
}
