use std::{collections::HashSet, sync::mpsc};

use tracing::{debug, trace};

use crate::core::{
    ChangeViewError, FoldState, Projection, Result, RowKey, RowView, SelectionSync, SharedChange,
    SyncState, SyncStats, ViewMode, ViewSettings, same_changes,
};

#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// The selected changes were replaced; carries the new value.
    SelectionChanged(Vec<SharedChange>),
    /// A leaf or flat row was double-activated.
    RowActivated(SharedChange),
    FolderToggled { path: String, expanded: bool },
}

/// A change list shown as a tree, list or grid, with one selection that
/// survives switching between them.
///
/// Callers set changes, view mode and selected changes; renderers read
/// [`ChangeCollectionView::rows`] and report input through the row verbs.
/// Outgoing notifications are queued on the channels returned by
/// [`ChangeCollectionView::subscribe`].
#[derive(Debug, Default)]
pub struct ChangeCollectionView {
    settings: ViewSettings,
    changes: Vec<SharedChange>,
    selected: Vec<SharedChange>,
    projection: Option<Projection>,
    folds: FoldState,
    anchor: Option<usize>,
    sync: SelectionSync,
    subscribers: Vec<mpsc::Sender<ViewEvent>>,
}

impl ChangeCollectionView {
    #[must_use]
    pub fn new(settings: ViewSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    #[must_use]
    pub const fn view_mode(&self) -> ViewMode {
        self.settings.view_mode
    }

    #[must_use]
    pub fn changes(&self) -> &[SharedChange] {
        &self.changes
    }

    #[must_use]
    pub fn selected_changes(&self) -> &[SharedChange] {
        &self.selected
    }

    #[must_use]
    pub const fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    #[must_use]
    pub const fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    #[must_use]
    pub const fn sync_stats(&self) -> SyncStats {
        self.sync.stats()
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<ViewEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /* ----------------------------- Inputs ----------------------------- */

    /// Replaces the change list. Selected changes that are not part of the
    /// new list are dropped.
    pub fn set_changes(&mut self, changes: Vec<SharedChange>) {
        self.changes = changes;
        self.rebuild("changes replaced");
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        if self.settings.view_mode == mode {
            return;
        }
        self.settings.view_mode = mode;
        self.rebuild("view mode switched");
    }

    pub fn set_single_select(&mut self, single_select: bool) {
        if self.settings.single_select == single_select {
            return;
        }
        self.settings.single_select = single_select;
        self.rebuild("selection mode switched");
    }

    pub fn set_settings(&mut self, settings: ViewSettings) {
        if self.settings == settings {
            return;
        }
        self.settings = settings;
        self.rebuild("settings replaced");
    }

    /// Programmatic selection from the owning view-model.
    pub fn set_selected_changes(&mut self, selected: Vec<SharedChange>) {
        if self.sync.state() != SyncState::Idle {
            trace!("selected changes set during sync; ignored");
            return;
        }

        let reflected = self
            .projection
            .as_ref()
            .is_none_or(|p| same_changes(&p.selected_changes(), &self.selected));
        if reflected && same_changes(&selected, &self.selected) {
            trace!(count = selected.len(), "selected changes unchanged");
            return;
        }

        self.push(selected);
    }

    /// Collapsed folder paths, for a collaborator to persist.
    #[must_use]
    pub fn folded_folders(&self) -> HashSet<String> {
        match self.projection.as_ref().and_then(Projection::as_tree) {
            Some(tree) => tree.folded_paths(),
            None => self.folds.collapsed.clone(),
        }
    }

    /// Restores persisted folds. Folders of the live tree that are not listed
    /// are expanded; folders first seen by a later rebuild take the default.
    pub fn set_folded_folders(&mut self, folded: HashSet<String>) {
        let expand_default = self.settings.expand_all_by_default;
        let mut folds = FoldState {
            collapsed: folded,
            expanded: HashSet::new(),
        };
        if let Some(tree) = self.projection.as_mut().and_then(Projection::as_tree_mut) {
            let live = tree.fold_state();
            folds.expanded = live
                .collapsed
                .into_iter()
                .chain(live.expanded)
                .filter(|path| !folds.collapsed.contains(path))
                .collect();
            tree.apply_folds(&folds, expand_default);
        }
        self.folds = folds;
        self.anchor = None;
    }

    /* ------------------------------ Rows ------------------------------ */

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.projection.as_ref().map_or(0, Projection::row_count)
    }

    #[must_use]
    pub fn rows(&self) -> Vec<RowView> {
        self.projection.as_ref().map_or_else(Vec::new, Projection::rows)
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<RowView> {
        self.projection.as_ref()?.row_view(index)
    }

    /// Plain click: the row becomes the only selected one.
    pub fn select_row(&mut self, index: usize) -> Result<()> {
        self.check_row(index)?;
        self.anchor = Some(index);
        self.user_edit(|p| p.select_only(index));
        Ok(())
    }

    /// Ctrl-click.
    pub fn toggle_row(&mut self, index: usize) -> Result<()> {
        self.check_row(index)?;
        self.anchor = Some(index);
        self.user_edit(|p| p.toggle_row(index));
        Ok(())
    }

    /// Shift-click: selects the visible rows between the anchor and `index`.
    pub fn extend_selection_to(&mut self, index: usize) -> Result<()> {
        self.check_row(index)?;
        let anchor = *self.anchor.get_or_insert(index);
        self.user_edit(|p| p.select_range(anchor, index));
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.user_edit(Projection::select_all);
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
        self.user_edit(Projection::clear_selection);
    }

    /// Double-activation: folders toggle, files raise [`ViewEvent::RowActivated`].
    pub fn activate_row(&mut self, index: usize) -> Result<()> {
        self.check_row(index)?;
        let Some(row) = self.row(index) else {
            return Ok(());
        };
        if row.is_folder {
            return self.toggle_folder(index).map(|_| ());
        }
        if let Some(change) = row.change {
            debug!(path = %change.path, "row activated");
            self.emit(&ViewEvent::RowActivated(change));
        }
        Ok(())
    }

    /// Expands or collapses the folder at `index`. Returns the new state, or
    /// `None` when the row is not a folder.
    pub fn toggle_folder(&mut self, index: usize) -> Result<Option<bool>> {
        self.check_row(index)?;
        let Some(RowKey::Node(key)) = self.projection.as_ref().and_then(|p| p.row_key(index))
        else {
            return Ok(None);
        };
        let Some(tree) = self.projection.as_mut().and_then(Projection::as_tree_mut) else {
            return Ok(None);
        };
        let expanded = tree.toggle_expanded(&key);
        if let Some(expanded) = expanded {
            // Rows below the folder shifted.
            self.anchor = None;
            trace!(path = %key.path, expanded, "folder toggled");
            self.emit(&ViewEvent::FolderToggled {
                path: key.path,
                expanded,
            });
        }
        Ok(expanded)
    }

    /* ---------------------------- Internals ---------------------------- */

    fn check_row(&self, index: usize) -> Result<()> {
        let len = self.row_count();
        if index >= len {
            return Err(ChangeViewError::RowOutOfRange { index, len });
        }
        Ok(())
    }

    /// Discards the projection and its selection model, builds the one the
    /// current changes and settings call for, then restores the selection
    /// into it before anything can observe the new rows.
    fn rebuild(&mut self, reason: &'static str) {
        let captured = std::mem::take(&mut self.selected);
        if let Some(tree) = self.projection.as_ref().and_then(Projection::as_tree) {
            self.folds = tree.fold_state();
        }
        self.anchor = None;

        self.projection = if self.changes.is_empty() {
            None
        } else {
            Some(Projection::build(&self.changes, &self.settings, &self.folds))
        };
        debug!(
            reason,
            mode = ?self.settings.view_mode,
            changes = self.changes.len(),
            rows = self.row_count(),
            restoring = captured.len(),
            "projection rebuilt"
        );

        self.push(captured);
    }

    fn push(&mut self, requested: Vec<SharedChange>) {
        let Some(applied) = self.sync.push(self.projection.as_mut(), &requested) else {
            return;
        };
        let normalized = !same_changes(&applied, &requested);
        self.selected = applied;
        if normalized {
            debug!(
                requested = requested.len(),
                applied = self.selected.len(),
                "selected changes normalized"
            );
            self.publish();
        }
    }

    fn user_edit(&mut self, edit: impl FnOnce(&mut Projection) -> bool) {
        let Some(projection) = self.projection.as_mut() else {
            return;
        };
        if edit(projection) {
            self.selection_model_changed();
        }
    }

    fn selection_model_changed(&mut self) {
        let Some(projection) = self.projection.as_ref() else {
            return;
        };
        let Some(pulled) = self.sync.on_model_changed(projection) else {
            return;
        };
        if same_changes(&pulled, &self.selected) {
            trace!("pulled selection equals current");
            return;
        }
        self.selected = pulled;
        self.publish();
    }

    fn publish(&mut self) {
        debug!(count = self.selected.len(), "selected changes published");
        self.emit(&ViewEvent::SelectionChanged(self.selected.clone()));
    }

    fn emit(&mut self, event: &ViewEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
