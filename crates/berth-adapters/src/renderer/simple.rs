//! Simple variable substitution renderer.
//!
//! Placeholders are `{{NAME}}` with `NAME` in upper snake case; anything
//! else between braces is left as written. Substitution is a single pass,
//! so values containing braces are never re-expanded.

use std::collections::BTreeSet;

use berth_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::TopologyVariables,
    error::BerthResult,
};
use tracing::{debug, instrument};

use crate::builtin_templates::TemplateCatalog;

const SECTION_OPEN: &str = "# [section:";
const SECTION_CLOSE: &str = "# [/section:";

/// Renderer over the built-in catalog (plus any override directory).
#[derive(Debug, Clone, Default)]
pub struct SimpleRenderer {
    catalog: TemplateCatalog,
}

impl SimpleRenderer {
    /// Renderer over the built-in templates only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: TemplateCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip(self, variables), fields(variables = variables.len()))]
    fn render(&self, template_id: &str, variables: &TopologyVariables) -> BerthResult<String> {
        let (source, origin) = self.catalog.load(template_id)?;
        debug!(?origin, "template loaded");
        substitute(template_id, &source, variables)
    }

    fn remove_optional_section(&self, content: &str, section: &str) -> String {
        let open = format!("{SECTION_OPEN}{section}]");
        let close = format!("{SECTION_CLOSE}{section}]");

        let has_open = content.lines().any(|l| l.trim() == open);
        let has_close = content.lines().any(|l| l.trim() == close);
        if !(has_open && has_close) {
            return content.to_string();
        }

        let mut out = String::with_capacity(content.len());
        let mut inside = false;
        for line in content.split_inclusive('\n') {
            let marker = line.trim();
            if marker == open {
                inside = true;
            } else if marker == close {
                inside = false;
            } else if !inside {
                out.push_str(line);
            }
        }
        out
    }

    fn optional_sections(&self, content: &str) -> BTreeSet<String> {
        content
            .lines()
            .filter_map(|line| {
                line.trim()
                    .strip_prefix(SECTION_OPEN)
                    .and_then(|rest| rest.strip_suffix(']'))
                    .map(str::to_string)
            })
            .collect()
    }
}

fn substitute(template_id: &str, source: &str, variables: &TopologyVariables) -> BerthResult<String> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };

        let name = &after[..end];
        if is_placeholder_name(name) {
            let value = variables.get(name).ok_or_else(|| ApplicationError::MissingVariable {
                template: template_id.to_string(),
                variable: name.to_string(),
            })?;
            out.push_str(value);
        } else {
            out.push_str(&rest[start..start + 2 + end + 2]);
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use std::fs;

    use berth_core::domain::{Credentials, LOOPBACK, ServiceConnectionConfig, ServiceKind};
    use serde_yaml::Value;

    use super::*;

    fn vars_for(kind: ServiceKind) -> TopologyVariables {
        TopologyVariables::for_service(kind, "Shop", &ServiceConnectionConfig::defaults_for(kind))
    }

    #[test]
    fn builtins_render_without_unresolved_placeholders() {
        let renderer = SimpleRenderer::new();
        for kind in ServiceKind::ALL {
            let out = renderer.render(kind.template_id(), &vars_for(kind)).unwrap();
            assert!(!out.contains("{{"), "{kind} left a placeholder");
            assert!(out.starts_with("name: berth-shop\n"));
            assert!(out.contains("container_name: berth-shop-"));
        }
    }

    const AWKWARD: &str = r#"p"a\b$c"#;

    /// What the container sees: YAML parsing, then compose's `$$` -> `$`.
    fn as_compose_reads(value: &Value) -> String {
        value.as_str().unwrap().replace("$$", "$")
    }

    fn render_yaml(kind: ServiceKind, credentials: Credentials) -> Value {
        let config = ServiceConnectionConfig::new(kind, LOOPBACK, None, credentials).unwrap();
        let vars = TopologyVariables::for_service(kind, "Shop", &config);
        let out = SimpleRenderer::new().render(kind.template_id(), &vars).unwrap();
        serde_yaml::from_str(&out).unwrap()
    }

    #[test]
    fn relational_credentials_survive_yaml_and_compose_interpolation() {
        for (kind, prefix) in [(ServiceKind::MySql, "MYSQL"), (ServiceKind::MariaDb, "MARIADB")] {
            let doc = render_yaml(
                kind,
                Credentials::Database {
                    database: "shop".into(),
                    username: "u$er".into(),
                    password: AWKWARD.into(),
                    root_password: format!("root{AWKWARD}"),
                },
            );
            let env = &doc["services"][kind.compose_service()]["environment"];

            assert_eq!(as_compose_reads(&env[format!("{prefix}_PASSWORD").as_str()]), AWKWARD);
            assert_eq!(
                as_compose_reads(&env[format!("{prefix}_ROOT_PASSWORD").as_str()]),
                format!("root{AWKWARD}")
            );
            assert_eq!(as_compose_reads(&env[format!("{prefix}_USER").as_str()]), "u$er");
        }
    }

    #[test]
    fn cache_password_survives_yaml_and_compose_interpolation() {
        let doc = render_yaml(
            ServiceKind::Redis,
            Credentials::Password {
                password: AWKWARD.into(),
            },
        );

        let command = &doc["services"]["redis"]["command"];
        assert_eq!(command[3].as_str(), Some("--requirepass"));
        assert_eq!(as_compose_reads(&command[4]), AWKWARD);

        let hosts = &doc["services"]["redis-commander"]["environment"]["REDIS_HOSTS"];
        assert_eq!(as_compose_reads(hosts), format!("local:redis:6379:0:{AWKWARD}"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = SimpleRenderer::new();
        let vars = vars_for(ServiceKind::MySql);
        assert_eq!(
            renderer.render("compose/mysql", &vars).unwrap(),
            renderer.render("compose/mysql", &vars).unwrap()
        );
    }

    #[test]
    fn missing_variable_names_the_placeholder() {
        let err = SimpleRenderer::new()
            .render("compose/redis", &TopologyVariables::new().with_variable("PROJECT_NAME", "x"))
            .unwrap_err();
        assert!(matches!(
            err,
            berth_core::error::BerthError::Application(ApplicationError::MissingVariable { ref variable, .. })
                if variable == "SERVICE_NAME"
        ));
    }

    #[test]
    fn values_are_not_re_expanded_and_foreign_braces_survive() {
        let vars = TopologyVariables::new()
            .with_variable("A", "{{B}}")
            .with_variable("B", "nope");
        let out = substitute("t", "x={{A}} y={{ .Names }} z={{", &vars).unwrap();
        assert_eq!(out, "x={{B}} y={{ .Names }} z={{");
    }

    #[test]
    fn removing_a_section_removes_only_that_section() {
        let renderer = SimpleRenderer::new();
        let full = renderer
            .render("compose/mysql", &vars_for(ServiceKind::MySql))
            .unwrap();
        let trimmed = renderer.remove_optional_section(&full, "phpmyadmin");

        assert!(!trimmed.contains("phpmyadmin"));
        assert!(trimmed.contains("image: mysql:8.4"));
        assert!(trimmed.contains("volumes:"));
        // Every surviving line was in the full render.
        for line in trimmed.lines() {
            assert!(full.lines().any(|l| l == line));
        }
        assert!(renderer.optional_sections(&full).contains("phpmyadmin"));
        assert!(renderer.optional_sections(&trimmed).is_empty());
    }

    #[test]
    fn removing_an_absent_section_is_a_no_op() {
        let renderer = SimpleRenderer::new();
        let content = "a\n# [section:x]\nb\n# [/section:x]\nc\n";
        assert_eq!(renderer.remove_optional_section(content, "y"), content);
        assert_eq!(renderer.remove_optional_section(content, "x"), "a\nc\n");
    }

    #[test]
    fn unterminated_section_is_left_alone() {
        let renderer = SimpleRenderer::new();
        let content = "a\n# [section:x]\nb\n";
        assert_eq!(renderer.remove_optional_section(content, "x"), content);
    }

    #[test]
    fn override_directory_is_rendered_too() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("redis.yml"), "name: {{PROJECT_NAME}}-custom\n").unwrap();

        let renderer = SimpleRenderer::with_catalog(TemplateCatalog::with_override_dir(dir.path()));
        let out = renderer
            .render("compose/redis", &vars_for(ServiceKind::Redis))
            .unwrap();
        assert_eq!(out, "name: berth-shop-custom\n");
    }
}
