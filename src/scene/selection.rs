use super::material::MaterialConfig;
use super::overrides::MaterialOverrides;
use super::MeshId;

/// The selected mesh together with the values it had when it was clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    mesh: MeshId,
    base: MaterialConfig,
}

impl Selection {
    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn base_material(&self) -> &MaterialConfig {
        &self.base
    }
}

/// Tracks at most one selected mesh and whether the side panel is open.
#[derive(Debug, Default)]
pub struct SelectionController {
    current: Option<Selection>,
    panel_open: bool,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `mesh`, replacing any previous selection, and open the editor.
    pub fn select_mesh(&mut self, mesh: MeshId, snapshot: MaterialConfig) {
        if let Some(previous) = &self.current {
            if previous.mesh != mesh {
                log::debug!("Selection moves from {} to {}", previous.mesh, mesh);
            }
        }
        self.current = Some(Selection {
            mesh,
            base: snapshot,
        });
        self.panel_open = true;
    }

    /// Returns `false` when nothing was selected.
    pub fn deselect(&mut self) -> bool {
        match self.current.take() {
            Some(selection) => {
                log::debug!("Deselected {}", selection.mesh);
                true
            }
            None => false,
        }
    }

    /// Forget the selection and close the panel, as on a fresh model load.
    pub fn clear(&mut self) {
        self.current = None;
        self.panel_open = false;
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn selected(&self) -> Option<MeshId> {
        self.current.as_ref().map(|selection| selection.mesh)
    }

    pub fn panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn set_panel_open(&mut self, open: bool) {
        self.panel_open = open;
    }

    /// Snapshot merged with the override entry of the selected mesh.
    pub fn effective_material(&self, overrides: &MaterialOverrides) -> Option<MaterialConfig> {
        let selection = self.current.as_ref()?;
        Some(match overrides.get(selection.mesh) {
            Some(patch) => patch.resolve(&selection.base),
            None => selection.base.clone(),
        })
    }
}
