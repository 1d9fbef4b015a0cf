//! Shared test utilities and arbitrary generators for property-based testing.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

use proptest::prelude::*;

use crate::effects::{AppUpdate, ManagementEffect, ManagementInterpreter, ManagementResponse, TargetsInput};
use crate::lifecycle::template::{template_id, template_version_id};
use crate::management::ApiError;
use crate::types::{
    Answer, AppId, ChildAppId, MultiClusterApp, MultiClusterAppId, MultiClusterAppStatus,
    ProjectApp, ProjectId, RevisionId, STATE_ACTIVE, Target, Template, TemplateVersion,
    TemplateVersionId,
};

// ─── Strategies ───────────────────────────────────────────────────────────────

/// Project IDs from a small pool so independently drawn sets overlap.
pub fn arb_project_id() -> impl Strategy<Value = ProjectId> {
    "c-[1-3]:p-[1-4]".prop_map(ProjectId::new)
}

/// A target list with unique projects in arbitrary order, some with apps
/// already assigned.
pub fn arb_target_list() -> impl Strategy<Value = Vec<Target>> {
    prop::collection::btree_map(arb_project_id(), prop::option::of("mcapp-[a-z0-9]{5}"), 0..6)
        .prop_map(|targets| {
            targets
                .into_iter()
                .map(|(project, app)| Target {
                    project_id: project,
                    app_id: app.map(AppId::new),
                    state: None,
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

pub fn arb_answer_values() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..3)
}

/// Answers for `targets`: at most one per project plus an optional global one.
pub fn arb_answers_for(targets: Vec<Target>) -> impl Strategy<Value = Vec<Answer>> {
    let len = targets.len();
    (
        prop::collection::vec(prop::option::of(arb_answer_values()), len),
        prop::option::of(arb_answer_values()),
    )
        .prop_map(move |(scoped, global)| {
            let mut answers: Vec<Answer> = targets
                .iter()
                .zip(scoped)
                .filter_map(|(t, values)| values.map(|v| Answer::for_project(t.project_id.clone(), v)))
                .collect();
            answers.extend(global.map(Answer::global));
            answers
        })
}

// ─── Mock Management API ──────────────────────────────────────────────────────

/// An in-memory management API that records every effect it interprets.
///
/// Mutations behave like the real API closely enough for lifecycle tests:
/// creates assign IDs and child apps, target actions add and drop child
/// apps, and deletes cascade to child apps unless disabled.
#[derive(Default)]
pub struct MockManagement {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    apps: BTreeMap<MultiClusterAppId, MultiClusterApp>,
    templates: HashMap<String, Template>,
    template_versions: HashMap<TemplateVersionId, TemplateVersion>,
    project_apps: HashMap<ChildAppId, ProjectApp>,

    /// States reported by successive app reads before the stored one.
    scripted_states: HashMap<MultiClusterAppId, VecDeque<String>>,
    create_states: Vec<String>,

    failures: HashMap<String, VecDeque<ApiError>>,
    calls: Vec<ManagementEffect>,
    next_id: u32,
    keep_children_on_delete: bool,
    keep_app_on_delete: bool,
}

impl MockManagement {
    pub fn new() -> Self {
        Self::default()
    }

    /// An active app deployed into one project.
    pub fn sample_app() -> MultiClusterApp {
        MultiClusterApp {
            name: "wordpress".to_string(),
            state: Some(STATE_ACTIVE.to_string()),
            targets: vec![Target::new("c-1:p-1").with_app("mcapp-wordpress-1")],
            template_version_id: template_version_id("library", "wordpress", "7.3.8"),
            roles: vec!["project-member".to_string()],
            revision_history_limit: 10,
            status: Some(MultiClusterAppStatus {
                revision_id: Some(RevisionId::new("apprevision-1")),
            }),
            ..Default::default()
        }
    }

    /// Stores an app, assigning an ID if it has none, and returns the ID.
    pub fn insert_app(&self, mut app: MultiClusterApp) -> MultiClusterAppId {
        let mut state = self.lock();
        let id = match &app.id {
            Some(id) => id.clone(),
            None => state.assign_id(),
        };
        app.id = Some(id.clone());
        state.apps.insert(id.clone(), app);
        id
    }

    pub fn app(&self, id: &MultiClusterAppId) -> Option<MultiClusterApp> {
        self.lock().apps.get(id).cloned()
    }

    pub fn insert_project_app(&self, app: ProjectApp) {
        self.lock().project_apps.insert(app.id.clone(), app);
    }

    pub fn project_app(&self, id: &ChildAppId) -> Option<ProjectApp> {
        self.lock().project_apps.get(id).cloned()
    }

    /// Publishes a template in a global catalog with the given versions.
    pub fn publish_template(&self, catalog: &str, template: &str, versions: &[&str]) {
        let mut state = self.lock();
        let id = template_id(catalog, template);
        let version_links = versions
            .iter()
            .map(|v| (v.to_string(), format!("https://rancher.example/v3/templateversions/{}-{}", id, v)))
            .collect();
        state.templates.insert(id.clone(), Template { id, version_links });

        for version in versions {
            let tv_id = template_version_id(catalog, template, version);
            state.template_versions.insert(
                tv_id.clone(),
                TemplateVersion {
                    id: tv_id,
                    external_id: format!(
                        "catalog://?catalog={}&template={}&version={}",
                        catalog.replace(':', "/"),
                        template,
                        version
                    ),
                },
            );
        }
    }

    /// Successive reads of `id` report these states before the stored one.
    pub fn script_states(&self, id: &MultiClusterAppId, states: &[&str]) {
        self.lock()
            .scripted_states
            .insert(id.clone(), states.iter().map(|s| s.to_string()).collect());
    }

    /// Apps created from now on report these states before `active`.
    pub fn script_create_states(&self, states: &[&str]) {
        self.lock().create_states = states.iter().map(|s| s.to_string()).collect();
    }

    /// Deletes leave child apps in place.
    pub fn keep_children_on_delete(&self) {
        self.lock().keep_children_on_delete = true;
    }

    /// The next effect with this operation name fails with `err`.
    pub fn fail_next(&self, operation: &str, err: ApiError) {
        self.lock()
            .failures
            .entry(operation.to_string())
            .or_default()
            .push_back(err);
    }

    /// Deletes mark the app `removing` instead of dropping it.
    pub fn keep_app_on_delete(&self) {
        self.lock().keep_app_on_delete = true;
    }

    /// Every effect interpreted so far, in order.
    pub fn calls(&self) -> Vec<ManagementEffect> {
        self.lock().calls.clone()
    }

    /// The effects that change remote state, in order.
    pub fn mutations(&self) -> Vec<ManagementEffect> {
        self.calls().into_iter().filter(|e| !is_read(e)).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }
}

impl MockState {
    fn assign_id(&mut self) -> MultiClusterAppId {
        self.next_id += 1;
        MultiClusterAppId::new(format!("mcapp-{}", self.next_id))
    }

    fn app_mut(&mut self, id: &MultiClusterAppId) -> Result<&mut MultiClusterApp, ApiError> {
        self.apps
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found(format!("multiclusterapps \"{}\" not found", id)))
    }

    /// Assigns a child app to each target that lacks one.
    fn deploy_children(&mut self, id: &MultiClusterAppId) {
        let Some(app) = self.apps.get_mut(id) else {
            return;
        };
        let name = app.name.clone();
        let mut children = Vec::new();
        for (i, target) in app.targets.iter_mut().enumerate() {
            let app_id = target
                .app_id
                .get_or_insert_with(|| AppId::new(format!("mcapp-{}-{}-{}", name, id, i)))
                .clone();
            children.push(ChildAppId::for_target(&target.project_id, &app_id));
        }
        for child in children {
            self.project_apps.entry(child.clone()).or_insert(ProjectApp {
                id: child,
                state: STATE_ACTIVE.to_string(),
            });
        }
    }

    fn remove_children(&mut self, targets: &[Target]) {
        for target in targets {
            if let Some(app_id) = &target.app_id {
                self.project_apps
                    .remove(&ChildAppId::for_target(&target.project_id, app_id));
            }
        }
    }

    fn apply(&mut self, effect: ManagementEffect) -> Result<ManagementResponse, ApiError> {
        match effect {
            ManagementEffect::GetApp { id } => {
                let scripted = self.scripted_states.get_mut(&id).and_then(|q| q.pop_front());
                let mut app = self.app_mut(&id)?.clone();
                if let Some(state) = scripted {
                    app.state = Some(state);
                }
                Ok(ManagementResponse::App(Box::new(app)))
            }
            ManagementEffect::CreateApp { app } => {
                let id = self.assign_id();
                let mut app = *app;
                app.id = Some(id.clone());
                app.state = Some(STATE_ACTIVE.to_string());
                app.status = Some(MultiClusterAppStatus {
                    revision_id: Some(RevisionId::new(format!("apprevision-{}-1", id))),
                });
                self.apps.insert(id.clone(), app);
                self.deploy_children(&id);
                let queued: VecDeque<String> = self.create_states.iter().cloned().collect();
                self.scripted_states.insert(id.clone(), queued);
                let created = self.app_mut(&id)?.clone();
                Ok(ManagementResponse::App(Box::new(created)))
            }
            ManagementEffect::UpdateApp { id, update } => {
                let app = self.app_mut(&id)?;
                apply_update(app, *update);
                Ok(ManagementResponse::App(Box::new(app.clone())))
            }
            ManagementEffect::DeleteApp { id } => {
                let app = self.app_mut(&id)?.clone();
                if self.keep_app_on_delete {
                    self.app_mut(&id)?.state = Some("removing".to_string());
                } else {
                    self.apps.remove(&id);
                }
                if !self.keep_children_on_delete {
                    self.remove_children(&app.targets);
                }
                Ok(ManagementResponse::Deleted)
            }
            ManagementEffect::Rollback { id, revision_id } => {
                let app = self.app_mut(&id)?;
                app.status = Some(MultiClusterAppStatus {
                    revision_id: Some(revision_id),
                });
                Ok(ManagementResponse::ActionAccepted)
            }
            ManagementEffect::AddProjects { id, input } => {
                let app = self.app_mut(&id)?;
                for project in &input.projects {
                    if !app.targets.iter().any(|t| &t.project_id == project) {
                        app.targets.push(Target::new(project.clone()));
                    }
                }
                merge_answers(&mut app.answers, &input);
                self.deploy_children(&id);
                Ok(ManagementResponse::ActionAccepted)
            }
            ManagementEffect::RemoveProjects { id, input } => {
                let app = self.app_mut(&id)?;
                let (removed, kept): (Vec<Target>, Vec<Target>) = app
                    .targets
                    .drain(..)
                    .partition(|t| input.projects.contains(&t.project_id));
                app.targets = kept;
                app.answers.retain(|a| !input.answers.contains(a));
                self.remove_children(&removed);
                Ok(ManagementResponse::ActionAccepted)
            }
            ManagementEffect::GetTemplate { id } => self
                .templates
                .get(&id)
                .cloned()
                .map(ManagementResponse::Template)
                .ok_or_else(|| ApiError::not_found(format!("templates \"{}\" not found", id))),
            ManagementEffect::GetTemplateVersion { id } => self
                .template_versions
                .get(&id)
                .cloned()
                .map(ManagementResponse::TemplateVersion)
                .ok_or_else(|| ApiError::not_found(format!("templateversions \"{}\" not found", id))),
            ManagementEffect::GetProjectApp { id, .. } => self
                .project_apps
                .get(&id)
                .cloned()
                .map(ManagementResponse::ProjectApp)
                .ok_or_else(|| ApiError::not_found(format!("apps \"{}\" not found", id))),
        }
    }
}

/// Returns true for effects that only read remote state.
pub fn is_read(effect: &ManagementEffect) -> bool {
    matches!(
        effect,
        ManagementEffect::GetApp { .. }
            | ManagementEffect::GetTemplate { .. }
            | ManagementEffect::GetTemplateVersion { .. }
            | ManagementEffect::GetProjectApp { .. }
    )
}

fn apply_update(app: &mut MultiClusterApp, update: AppUpdate) {
    app.answers = update.answers;
    app.members = update.members;
    app.revision_history_limit = update.revision_history_limit;
    app.roles = update.roles;
    app.template_version_id = update.template_version_id;
    app.upgrade_strategy = update.upgrade_strategy;
    app.annotations = update.annotations;
    app.labels = update.labels;
}

fn merge_answers(answers: &mut Vec<Answer>, input: &TargetsInput) {
    for answer in &input.answers {
        answers.retain(|a| a.project_id.is_none() || a.project_id != answer.project_id);
        answers.push(answer.clone());
    }
}

impl ManagementInterpreter for MockManagement {
    async fn interpret(&self, effect: ManagementEffect) -> Result<ManagementResponse, ApiError> {
        let mut state = self.lock();
        state.calls.push(effect.clone());

        let failure = state
            .failures
            .get_mut(effect.operation())
            .and_then(|queue| queue.pop_front());
        if let Some(err) = failure {
            return Err(err);
        }

        state.apply(effect)
    }
}
