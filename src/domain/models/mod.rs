//! Domain models.

pub mod config;
pub mod console_link;
pub mod resource;

pub use config::{Config, ConsoleConfig, LoggingConfig, RetryConfig};
pub use console_link::{
    ApplicationMenuSpec, ConsoleLink, ConsoleLinkLocation, ConsoleLinkSpec, Link,
    CONSOLE_LINK_DESCRIPTOR, KIBANA_CONSOLE_LINK_NAME,
};
pub use resource::{ObjectMeta, Resource};
