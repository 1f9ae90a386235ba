//! Console link reconciliation, including the Kibana public URL link.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::errors::ReconcileResult;
use crate::domain::models::{Config, ConsoleConfig, ConsoleLink};
use crate::domain::ports::{ConvergeStrategy, ObjectStore, SchemaRegistry};
use crate::services::capability_probe::CapabilityProbe;
use crate::services::context::ReconcileContext;
use crate::services::convergence_engine::{ConvergeOutcome, ConvergenceEngine};
use crate::services::guarded_deletion::{DeletionOutcome, GuardedDeletion};
use crate::services::retry::RetryPolicy;

pub use crate::domain::models::KIBANA_CONSOLE_LINK_NAME;

/// Returns true when all of the following are equal:
/// - location
/// - link text
/// - link href
/// - application menu section
pub fn console_links_equal(current: &ConsoleLink, desired: &ConsoleLink) -> bool {
    current.spec.location == desired.spec.location
        && current.spec.link.text == desired.spec.link.text
        && current.spec.link.href == desired.spec.link.href
        && current.section() == desired.section()
}

/// Copy only the spec from desired to current.
pub fn mutate_spec_only(current: &mut ConsoleLink, desired: &ConsoleLink) {
    current.spec.clone_from(&desired.spec);
}

/// Default strategy for console links: [`console_links_equal`] and
/// [`mutate_spec_only`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleLinkStrategy;

impl ConvergeStrategy<ConsoleLink> for ConsoleLinkStrategy {
    fn equals(&self, current: &ConsoleLink, desired: &ConsoleLink) -> bool {
        console_links_equal(current, desired)
    }

    fn apply(&self, current: &mut ConsoleLink, desired: &ConsoleLink) {
        mutate_spec_only(current, desired);
    }
}

/// Reconciles console links against a store.
pub struct ConsoleLinkReconciler {
    engine: ConvergenceEngine<ConsoleLink>,
    deletion: GuardedDeletion<ConsoleLink>,
    config: ConsoleConfig,
}

impl ConsoleLinkReconciler {
    pub fn new(
        store: Arc<dyn ObjectStore<ConsoleLink>>,
        registry: Arc<dyn SchemaRegistry>,
        retry: RetryPolicy,
        config: ConsoleConfig,
    ) -> Self {
        Self {
            engine: ConvergenceEngine::new(store.clone(), retry),
            deletion: GuardedDeletion::new(store, CapabilityProbe::new(registry)),
            config,
        }
    }

    pub fn from_config(
        store: Arc<dyn ObjectStore<ConsoleLink>>,
        registry: Arc<dyn SchemaRegistry>,
        config: &Config,
    ) -> Self {
        Self::new(
            store,
            registry,
            RetryPolicy::from(&config.retry),
            config.console.clone(),
        )
    }

    /// Desired Kibana link for the given public URL.
    pub fn kibana_link(&self, href: &str) -> ConsoleLink {
        ConsoleLink::new(
            self.config.kibana_link_name.as_str(),
            href,
            self.config.kibana_link_text.as_str(),
            self.config.icon_url.as_str(),
            self.config.application_menu_section.as_str(),
        )
    }

    /// Converge an arbitrary console link with the default strategy.
    pub async fn reconcile(
        &self,
        ctx: &ReconcileContext,
        desired: &ConsoleLink,
    ) -> ReconcileResult<ConvergeOutcome> {
        self.engine.converge(ctx, desired, &ConsoleLinkStrategy).await
    }

    #[instrument(skip(self, ctx))]
    pub async fn reconcile_kibana_link(
        &self,
        ctx: &ReconcileContext,
        href: &str,
    ) -> ReconcileResult<ConvergeOutcome> {
        let desired = self.kibana_link(href);
        self.reconcile(ctx, &desired).await
    }

    /// Remove the Kibana link, if console links exist on this cluster at all.
    pub async fn delete_kibana_link(
        &self,
        ctx: &ReconcileContext,
    ) -> ReconcileResult<DeletionOutcome> {
        self.deletion
            .delete_if_enabled(ctx, &self.config.kibana_link_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ConsoleLinkLocation;

    fn link() -> ConsoleLink {
        ConsoleLink::new(
            KIBANA_CONSOLE_LINK_NAME,
            "https://kibana.example.com",
            "Logging",
            "icon",
            "Monitoring",
        )
    }

    #[test]
    fn test_equal_ignores_metadata_and_icon() {
        let current = {
            let mut l = link();
            l.metadata.resource_version = Some("7".to_string());
            l.metadata.labels.insert("app".to_string(), "kibana".to_string());
            if let Some(menu) = l.spec.application_menu.as_mut() {
                menu.image_url = "other-icon".to_string();
            }
            l
        };

        assert!(console_links_equal(&current, &link()));
    }

    #[test]
    fn test_each_compared_field_breaks_equality() {
        let desired = link();

        let mut changed = link();
        changed.spec.location = ConsoleLinkLocation::HelpMenu;
        assert!(!console_links_equal(&changed, &desired));

        let mut changed = link();
        changed.spec.link.text = "Kibana".to_string();
        assert!(!console_links_equal(&changed, &desired));

        let mut changed = link();
        changed.spec.link.href = "https://elsewhere".to_string();
        assert!(!console_links_equal(&changed, &desired));

        let mut changed = link();
        changed.spec.application_menu = None;
        assert!(!console_links_equal(&changed, &desired));
    }

    #[test]
    fn test_mutate_spec_only_keeps_metadata() {
        let mut current = link();
        current.metadata.resource_version = Some("7".to_string());
        current.spec.link.href = "https://old".to_string();

        mutate_spec_only(&mut current, &link());

        assert_eq!(current.spec, link().spec);
        assert_eq!(current.metadata.resource_version.as_deref(), Some("7"));
    }

    #[test]
    fn test_kibana_link_uses_config() {
        let config = ConsoleConfig {
            kibana_link_text: "Kibana".to_string(),
            application_menu_section: "Observe".to_string(),
            ..ConsoleConfig::default()
        };
        let reconciler = ConsoleLinkReconciler::new(
            Arc::new(crate::adapters::memory::InMemoryObjectStore::<ConsoleLink>::new()),
            Arc::new(crate::adapters::memory::InMemorySchemaRegistry::new()),
            RetryPolicy::immediate(1),
            config,
        );

        let desired = reconciler.kibana_link("https://kibana.example.com");
        assert_eq!(desired.metadata.name, KIBANA_CONSOLE_LINK_NAME);
        assert_eq!(desired.spec.link.text, "Kibana");
        assert_eq!(desired.section(), Some("Observe"));
    }
}
