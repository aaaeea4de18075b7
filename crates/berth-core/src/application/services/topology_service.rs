//! Compose Topology Generator - renders and writes the compose manifest.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::{
    application::ports::{Filesystem, TemplateRenderer},
    domain::{ComposeTopologySpec, ServiceKind, TopologyVariables},
    error::BerthResult,
};

/// Builds the container topology for one service kind.
pub struct ComposeTopologyGenerator {
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl ComposeTopologyGenerator {
    pub fn new(renderer: Box<dyn TemplateRenderer>, filesystem: Box<dyn Filesystem>) -> Self {
        Self {
            renderer,
            filesystem,
        }
    }

    /// Render `kind`'s template with every optional section kept and write
    /// it into `target_dir`.
    pub fn generate(
        &self,
        kind: ServiceKind,
        target_dir: &Path,
        variables: &TopologyVariables,
    ) -> BerthResult<ComposeTopologySpec> {
        self.generate_with(kind, target_dir, variables, true)
    }

    /// Render `kind`'s template and write it into `target_dir`, replacing any
    /// previous manifest.
    ///
    /// With `include_sidecars == false` the kind's admin-UI section is
    /// removed as a unit.
    #[instrument(
        skip_all,
        fields(kind = %kind, target = %target_dir.display(), sidecars = include_sidecars)
    )]
    pub fn generate_with(
        &self,
        kind: ServiceKind,
        target_dir: &Path,
        variables: &TopologyVariables,
        include_sidecars: bool,
    ) -> BerthResult<ComposeTopologySpec> {
        let rendered = self.renderer.render(kind.template_id(), variables)?;

        let content = if include_sidecars {
            rendered
        } else {
            debug!(section = kind.sidecar_section(), "Removing sidecar section");
            self.renderer
                .remove_optional_section(&rendered, kind.sidecar_section())
        };

        let sections = self.renderer.optional_sections(&content);
        let spec = ComposeTopologySpec::new(kind, content, sections, target_dir);

        self.filesystem.create_dir_all(target_dir)?;
        self.filesystem.write_file(&spec.path, &spec.content)?;

        info!(
            path = %spec.path.display(),
            sections = ?spec.included_sections,
            "Compose manifest written"
        );
        Ok(spec)
    }
}
