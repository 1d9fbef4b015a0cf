//! Conversions between the desired state and remote payloads.

use crate::effects::AppUpdate;
use crate::targets::order_targets_like;
use crate::types::{AppRecord, MultiClusterApp, MultiClusterAppId, MultiClusterAppSpec, TemplateVersionId};

use super::template::CatalogRef;

/// Builds the create payload.
pub fn new_app(spec: &MultiClusterAppSpec, template_version_id: TemplateVersionId) -> MultiClusterApp {
    MultiClusterApp {
        id: None,
        name: spec.name.clone(),
        state: None,
        targets: spec.targets.clone(),
        answers: spec.answers.clone(),
        template_version_id,
        members: spec.members.clone(),
        roles: spec.roles.clone(),
        revision_history_limit: spec.revision_history_limit,
        upgrade_strategy: spec.upgrade_strategy.clone(),
        labels: spec.labels.clone(),
        annotations: spec.annotations.clone(),
        status: None,
    }
}

/// Builds the full field update.
pub fn app_update(spec: &MultiClusterAppSpec, template_version_id: TemplateVersionId) -> AppUpdate {
    AppUpdate {
        answers: spec.answers.clone(),
        members: spec.members.clone(),
        revision_history_limit: spec.revision_history_limit,
        roles: spec.roles.clone(),
        template_version_id,
        upgrade_strategy: spec.upgrade_strategy.clone(),
        annotations: spec.annotations.clone(),
        labels: spec.labels.clone(),
    }
}

/// Flattens a remote app into the desired-state representation.
///
/// Targets follow the order of `declared` when given, so reading back an
/// unchanged app never reports a reordering. `wait` is not stored remotely
/// and is carried over from `declared`.
pub fn to_record(
    id: MultiClusterAppId,
    app: &MultiClusterApp,
    catalog: CatalogRef,
    declared: Option<&MultiClusterAppSpec>,
) -> AppRecord {
    let targets = match declared {
        Some(spec) => order_targets_like(&app.targets, &spec.targets),
        None => app.targets.clone(),
    };

    AppRecord {
        id,
        spec: MultiClusterAppSpec {
            name: app.name.clone(),
            catalog_name: catalog.catalog_name,
            template_name: catalog.template_name,
            template_version: Some(catalog.version),
            template_version_id: Some(app.template_version_id.clone()),
            targets,
            answers: app.answers.clone(),
            members: app.members.clone(),
            roles: app.roles.clone(),
            revision_history_limit: app.revision_history_limit,
            upgrade_strategy: app.upgrade_strategy.clone(),
            labels: app.labels.clone(),
            annotations: app.annotations.clone(),
            wait: declared.is_none_or(|spec| spec.wait),
            revision_id: app.revision_id().cloned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MultiClusterAppStatus, RevisionId, Target};

    fn catalog() -> CatalogRef {
        CatalogRef {
            catalog_name: "library".to_string(),
            template_name: "wordpress".to_string(),
            version: "7.3.8".to_string(),
        }
    }

    #[test]
    fn create_payload_carries_spec_fields() {
        let mut spec = MultiClusterAppSpec::new("wordpress", "library", "wordpress", vec![Target::new("c-1:p-1")]);
        spec.labels.insert("tier".to_string(), "web".to_string());
        let tv = TemplateVersionId::new("cattle-global-data:library-wordpress-7.3.8");

        let app = new_app(&spec, tv.clone());
        assert_eq!(app.id, None);
        assert_eq!(app.template_version_id, tv);
        assert_eq!(app.targets, spec.targets);
        assert_eq!(app.labels.get("tier").map(String::as_str), Some("web"));
        assert_eq!(app.roles, vec!["project-member".to_string()]);
    }

    #[test]
    fn record_keeps_declared_target_order() {
        let app = MultiClusterApp {
            name: "wordpress".to_string(),
            targets: vec![
                Target::new("c-1:p-2").with_app("b"),
                Target::new("c-1:p-1").with_app("a"),
            ],
            template_version_id: TemplateVersionId::new("cattle-global-data:library-wordpress-7.3.8"),
            status: Some(MultiClusterAppStatus {
                revision_id: Some(RevisionId::new("apprevision-1")),
            }),
            ..Default::default()
        };
        let mut declared = MultiClusterAppSpec::new(
            "wordpress",
            "library",
            "wordpress",
            vec![Target::new("c-1:p-1"), Target::new("c-1:p-2")],
        );
        declared.wait = false;

        let record = to_record(MultiClusterAppId::new("mcapp-x"), &app, catalog(), Some(&declared));

        let projects: Vec<_> = record.spec.targets.iter().map(|t| t.project_id.as_str()).collect();
        assert_eq!(projects, vec!["c-1:p-1", "c-1:p-2"]);
        assert_eq!(record.spec.template_version.as_deref(), Some("7.3.8"));
        assert_eq!(record.spec.revision_id, Some(RevisionId::new("apprevision-1")));
        assert!(!record.spec.wait);
    }

    #[test]
    fn record_without_declaration_uses_remote_order() {
        let app = MultiClusterApp {
            name: "wordpress".to_string(),
            targets: vec![Target::new("c-1:p-2"), Target::new("c-1:p-1")],
            ..Default::default()
        };

        let record = to_record(MultiClusterAppId::new("mcapp-x"), &app, catalog(), None);
        assert_eq!(record.spec.targets, app.targets);
        assert!(record.spec.wait);
    }
}
