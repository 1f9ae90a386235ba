//! Console link resource: an entry in the cluster web console's menus.

use serde::{Deserialize, Serialize};

use super::resource::{ObjectMeta, Resource};

/// Schema registry descriptor for console links.
pub const CONSOLE_LINK_DESCRIPTOR: &str = "consolelinks.console.openshift.io";

/// Name of the console link pointing at Kibana.
pub const KIBANA_CONSOLE_LINK_NAME: &str = "kibana-public-url";

/// A console link object as stored by the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleLink {
    pub metadata: ObjectMeta,
    pub spec: ConsoleLinkSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleLinkSpec {
    #[serde(flatten)]
    pub link: Link,

    pub location: ConsoleLinkLocation,

    /// Only meaningful when `location` is `ApplicationMenu`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_menu: Option<ApplicationMenuSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// Where in the console the link is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsoleLinkLocation {
    ApplicationMenu,
    HelpMenu,
    UserMenu,
    NamespaceDashboard,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMenuSpec {
    pub section: String,

    #[serde(rename = "imageURL", default, skip_serializing_if = "String::is_empty")]
    pub image_url: String,
}

impl ConsoleLink {
    /// Build an application-menu link.
    pub fn new(
        name: impl Into<String>,
        href: impl Into<String>,
        text: impl Into<String>,
        icon: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            metadata: ObjectMeta::named(name),
            spec: ConsoleLinkSpec {
                link: Link {
                    text: text.into(),
                    href: href.into(),
                },
                location: ConsoleLinkLocation::ApplicationMenu,
                application_menu: Some(ApplicationMenuSpec {
                    section: section.into(),
                    image_url: icon.into(),
                }),
            },
        }
    }

    /// Section of the application menu, if the link has one.
    pub fn section(&self) -> Option<&str> {
        self.spec
            .application_menu
            .as_ref()
            .map(|menu| menu.section.as_str())
    }
}

impl Resource for ConsoleLink {
    const KIND: &'static str = "ConsoleLink";
    const DESCRIPTOR: &'static str = CONSOLE_LINK_DESCRIPTOR;

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
