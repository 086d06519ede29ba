//! The state container tying staging, merging, output and preview together.
//!
//! One [`Session`] owns everything a user interacts with: the staging list,
//! the merge orchestrator, the single live output resource, the last error
//! message and the optional preview window. Callers get read access to the
//! parts and drive changes through the session's methods.

use serde::Serialize;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

use crate::assembly::DocumentAssembler;
use crate::geometry::{Point, Viewport, WindowConstraints};
use crate::merge::{MergeFailure, MergeOrchestrator, MergedInput};
use crate::output::{OutputResource, OutputResourceManager, ResourceStore};
use crate::staging::{FileId, FileSource, StagingList};
use crate::window::{
    FloatingWindow, ListenerRegistry, PointerAction, PointerListenerHost, WindowDefaults,
};

/// Title of the preview window.
pub const PREVIEW_TITLE: &str = "Preview";

/// Preview window hosting a published output resource.
pub type PreviewWindow = FloatingWindow<OutputResource>;

/// What a successful merge produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReceipt {
    /// The published resource.
    pub resource: OutputResource,
    /// Inputs in merge order with their page counts.
    pub inputs: Vec<MergedInput>,
    /// Pages in the output.
    pub total_pages: usize,
}

/// Layout settings for the preview window.
#[derive(Debug, Clone)]
pub struct PreviewSettings {
    /// Viewport the window lives in.
    pub viewport: Viewport,
    /// Initial placement.
    pub defaults: WindowDefaults,
    /// Geometry limits.
    pub constraints: WindowConstraints,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            defaults: WindowDefaults::default(),
            constraints: WindowConstraints::default(),
        }
    }
}

/// Per-user session state.
pub struct Session<A: DocumentAssembler, S: ResourceStore> {
    staging: StagingList,
    orchestrator: MergeOrchestrator<A>,
    output: OutputResourceManager<S>,
    error: Option<String>,
    preview: Option<PreviewWindow>,
    settings: PreviewSettings,
    listeners: Rc<dyn PointerListenerHost>,
}

impl<A: DocumentAssembler, S: ResourceStore> Session<A, S> {
    /// Create a session accepting PDFs, with default preview settings.
    pub fn new(assembler: A, store: S) -> Self {
        Self {
            staging: StagingList::default(),
            orchestrator: MergeOrchestrator::new(assembler),
            output: OutputResourceManager::new(store),
            error: None,
            preview: None,
            settings: PreviewSettings::default(),
            listeners: Rc::new(ListenerRegistry::new()),
        }
    }

    /// Replace the staging list's accepted media type. Clears the list.
    pub fn with_accepted_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.staging = StagingList::new(media_type);
        self
    }

    /// Use `settings` for preview windows opened from now on.
    pub fn with_preview_settings(mut self, settings: PreviewSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Route gesture listeners through `host`.
    pub fn with_listener_host(mut self, host: Rc<dyn PointerListenerHost>) -> Self {
        self.listeners = host;
        self
    }

    /// The staging list.
    pub fn staging(&self) -> &StagingList {
        &self.staging
    }

    /// Message of the last failed merge, cleared by a new merge or `clear`.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a merge is running.
    pub fn is_merging(&self) -> bool {
        self.orchestrator.is_merging()
    }

    /// Whether the merge trigger should be enabled.
    pub fn can_merge(&self) -> bool {
        self.staging.has_enough_to_merge() && !self.is_merging()
    }

    /// The live output resource, if any.
    pub fn current_output(&self) -> Option<&OutputResource> {
        self.output.current()
    }

    /// Bytes of the live output resource, if any.
    pub fn current_bytes(&self) -> Option<Arc<[u8]>> {
        self.output.current_bytes()
    }

    /// The output manager.
    pub fn output(&self) -> &OutputResourceManager<S> {
        &self.output
    }

    /// The preview window, if one is open.
    pub fn preview(&self) -> Option<&PreviewWindow> {
        self.preview.as_ref()
    }

    /// Stage files; see [`StagingList::append`].
    pub fn add_files<I>(&mut self, candidates: I) -> Vec<FileId>
    where
        I: IntoIterator<Item = Arc<dyn FileSource>>,
    {
        self.staging.append(candidates)
    }

    /// See [`StagingList::remove_at`].
    pub fn remove_at(&mut self, index: usize) -> bool {
        self.staging.remove_at(index).is_some()
    }

    /// See [`StagingList::move_item`].
    pub fn move_item(&mut self, from: usize, to: usize) -> Option<usize> {
        self.staging.move_item(from, to)
    }

    /// See [`StagingList::move_up`].
    pub fn move_up(&mut self, index: usize) -> Option<usize> {
        self.staging.move_up(index)
    }

    /// See [`StagingList::move_down`].
    pub fn move_down(&mut self, index: usize) -> Option<usize> {
        self.staging.move_down(index)
    }

    /// Empty the staging list and forget the last error.
    pub fn clear(&mut self) {
        self.staging.clear();
        self.error = None;
    }

    /// Merge the staged files and publish the result.
    ///
    /// On success the previous output resource is revoked and the preview
    /// window is opened, or retargeted if it is already open. On failure the
    /// staging list is untouched and the message is kept in [`Session::error`];
    /// refusals (empty list, merge already running) leave the error as it was.
    ///
    /// # Errors
    ///
    /// Returns the orchestrator's [`MergeFailure`].
    pub async fn merge(&mut self) -> Result<MergeReceipt, MergeFailure> {
        if !self.staging.is_empty() {
            self.error = None;
        }

        let result = self.orchestrator.merge(self.staging.files()).await;

        let output = match result {
            Ok(output) => output,
            Err(failure) => {
                if !failure.is_refusal() {
                    self.error = Some(failure.to_string());
                }
                return Err(failure);
            }
        };

        let total_pages = output.total_pages();
        let resource = self.output.publish(output.bytes).clone();
        self.show_preview(resource.clone());

        Ok(MergeReceipt {
            resource,
            inputs: output.inputs,
            total_pages,
        })
    }

    fn show_preview(&mut self, resource: OutputResource) {
        if let Some(window) = self.preview.as_mut().filter(|w| w.is_open()) {
            debug!(url = %resource.url, "retargeting preview window");
            window.replace_content(resource);
            return;
        }

        self.preview = Some(FloatingWindow::open(
            PREVIEW_TITLE,
            resource,
            self.settings.viewport,
            &self.settings.defaults,
            self.settings.constraints,
            Rc::clone(&self.listeners),
        ));
    }

    /// Close the preview window and revoke the resource it showed.
    pub fn close_preview(&mut self) {
        if let Some(mut window) = self.preview.take() {
            window.close();
            drop(window);
            self.output.revoke_current();
        }
    }

    /// Forward a pointer press to the preview window.
    pub fn pointer_down(&mut self, point: Point) -> PointerAction {
        let Some(window) = self.preview.as_mut() else {
            return PointerAction::Ignored;
        };
        let action = window.pointer_down(point);
        if action == PointerAction::Closed {
            self.close_preview();
        }
        action
    }

    /// Forward a pointer move to the preview window.
    pub fn pointer_move(&mut self, point: Point) -> bool {
        self.preview
            .as_mut()
            .is_some_and(|window| window.pointer_move(point))
    }

    /// Forward a pointer release to the preview window.
    pub fn pointer_up(&mut self) {
        if let Some(window) = self.preview.as_mut() {
            window.pointer_up();
        }
    }

    /// Record a new viewport size and refit the preview window.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.settings.viewport = viewport;
        if let Some(window) = self.preview.as_mut() {
            window.set_viewport(viewport);
        }
    }
}

impl<A: DocumentAssembler, S: ResourceStore> Drop for Session<A, S> {
    fn drop(&mut self) {
        if self.output.current().is_some() {
            debug!("session dropped; revoking live output");
        }
        self.close_preview();
        self.output.revoke_current();
    }
}
