use crate::model::FeatureRef;

/// Tracks the single selected feature.
///
/// `SelectionManager` only stores the selection. Scoping to the active layer
/// is enforced by [`crate::Canvas::select`], which knows the owning layer of
/// every feature.
///
/// # Selection Model
///
/// - At most one feature (polygon, polyline or image) is selected.
/// - Polygons and polylines are only selectable on the active layer.
/// - Images do not belong to a layer and are always selectable.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: Option<FeatureRef>,
}

impl SelectionManager {
    /// Creates a new `SelectionManager` with no selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use siteplan_designer::selection_manager::SelectionManager;
    ///
    /// let manager = SelectionManager::new();
    /// assert_eq!(manager.selected_id(), None);
    /// ```
    pub fn new() -> Self {
        Self { selected: None }
    }

    pub fn selected(&self) -> Option<&FeatureRef> {
        self.selected.as_ref()
    }

    /// Id of the selected feature, if any.
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_ref().map(FeatureRef::id)
    }

    pub fn is_selected(&self, feature: &FeatureRef) -> bool {
        self.selected.as_ref() == Some(feature)
    }

    /// Replaces the selection.
    ///
    /// # Returns
    ///
    /// `true` if the selection changed.
    pub fn select(&mut self, feature: FeatureRef) -> bool {
        if self.is_selected(&feature) {
            return false;
        }
        self.selected = Some(feature);
        true
    }

    /// Clears the selection. Returns `true` if something was selected.
    pub fn clear(&mut self) -> bool {
        self.selected.take().is_some()
    }

    /// Clears the selection unless `keep` accepts it. Returns `true` if the
    /// selection was cleared.
    pub fn retain<F>(&mut self, keep: F) -> bool
    where
        F: FnOnce(&FeatureRef) -> bool,
    {
        match &self.selected {
            Some(feature) if !keep(feature) => {
                self.selected = None;
                true
            }
            _ => false,
        }
    }
}
