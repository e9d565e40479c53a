//! Class-isolation policies for running a packaged plugin inside the tool.
//!
//! When a plugin is test-run from the packaging tool, three layers keep the
//! tool's own classpath from leaking into the plugin's:
//!
//! - [`MaskingPolicy`] hides the tool's internal packages (and their
//!   `META-INF/services` registrations) so the tool's library versions never
//!   shadow the plugin's
//! - [`ExposingPolicy::servlet_only`] exposes only the servlet API from the
//!   infrastructure runtime
//! - [`ExposingPolicy::infrastructure_and_servlet`] exposes the servlet API
//!   and the infrastructure runtime itself, plus the one resource the
//!   runtime needs (`jndi.properties`)
//!
//! Each layer is a pure allow/deny decision over a name, evaluated before
//! anything is delegated further up. A [`LoaderChain`] composes layers from
//! child to parent: the first layer that does not delegate decides.
//!
//! Class names are matched in dotted form (`org.apache.maven.Foo`) and
//! resource names in slash form (`org/apache/maven/foo.xml`).
//! [`MaskingPolicy`] derives its resource prefixes from its class prefixes
//! so the two lists cannot drift apart.

use serde::Serialize;
use std::fmt;

/// Packages of the tool itself that a plugin must never see.
pub const MASKED_PACKAGES: &[&str] = &[
    "org.kohsuke",
    "org.apache.maven",
    "org.sonatype",
    "org.cyberneko",
    "org.codehaus.plexus",
];

/// Resource prefixes masked in addition to the derived package paths.
pub const MASKED_RESOURCE_PREFIXES: &[&str] = &["META-INF/plexus", "META-INF/maven"];

const META_INF_SERVICES: &str = "META-INF/services/";

/// Whether a name denotes a class or a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NameKind {
    Class,
    Resource,
}

/// One layer's decision about one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Fail the lookup without asking any parent.
    Deny,
    /// Serve the name from the infrastructure runtime.
    Expose,
    /// No opinion; ask the next layer.
    Delegate,
}

/// A named allow/deny policy over class and resource names.
pub trait LoaderPolicy: Send + Sync {
    fn name(&self) -> &str;

    fn decide(&self, kind: NameKind, name: &str) -> Verdict;
}

/// Denies the tool's internal packages; delegates everything else.
#[derive(Debug, Clone)]
pub struct MaskingPolicy {
    class_prefixes: Vec<String>,
    resource_prefixes: Vec<String>,
}

impl Default for MaskingPolicy {
    fn default() -> Self {
        Self::new(MASKED_PACKAGES.iter().copied())
    }
}

impl MaskingPolicy {
    /// Masks the given packages. Resource prefixes are the same packages in
    /// slash form plus [`MASKED_RESOURCE_PREFIXES`].
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let class_prefixes: Vec<String> = packages.into_iter().map(Into::into).collect();
        let resource_prefixes = class_prefixes
            .iter()
            .map(|p| p.replace('.', "/"))
            .chain(MASKED_RESOURCE_PREFIXES.iter().map(|p| (*p).to_string()))
            .collect();
        Self {
            class_prefixes,
            resource_prefixes,
        }
    }

    fn masks_class(&self, name: &str) -> bool {
        self.class_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    fn masks_resource(&self, name: &str) -> bool {
        if let Some(service) = name.strip_prefix(META_INF_SERVICES)
            && self.masks_class(service)
        {
            return true;
        }
        self.resource_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

impl LoaderPolicy for MaskingPolicy {
    fn name(&self) -> &str {
        "masking"
    }

    fn decide(&self, kind: NameKind, name: &str) -> Verdict {
        let masked = match kind {
            NameKind::Class => self.masks_class(name),
            NameKind::Resource => self.masks_resource(name),
        };
        if masked { Verdict::Deny } else { Verdict::Delegate }
    }
}

/// What an [`ExposingPolicy`] does with resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRule {
    /// Resources are not this layer's concern.
    DelegateAll,
    /// Only the listed resource names are served; every other resource is
    /// denied.
    Only(Vec<String>),
}

/// Exposes a whitelist of packages from the infrastructure runtime.
#[derive(Debug, Clone)]
pub struct ExposingPolicy {
    name: String,
    class_prefixes: Vec<String>,
    resources: ResourceRule,
}

impl ExposingPolicy {
    pub fn new(name: impl Into<String>, class_prefixes: Vec<String>, resources: ResourceRule) -> Self {
        Self {
            name: name.into(),
            class_prefixes,
            resources,
        }
    }

    /// The servlet API only.
    #[must_use]
    pub fn servlet_only() -> Self {
        Self::new("servlet-only", vec!["javax.".to_string()], ResourceRule::DelegateAll)
    }

    /// The servlet API plus the infrastructure runtime.
    #[must_use]
    pub fn infrastructure_and_servlet() -> Self {
        Self::new(
            "infrastructure-and-servlet",
            vec!["javax.".to_string(), "org.eclipse.jetty.".to_string()],
            ResourceRule::Only(vec!["jndi.properties".to_string()]),
        )
    }
}

impl LoaderPolicy for ExposingPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(&self, kind: NameKind, name: &str) -> Verdict {
        match kind {
            NameKind::Class => {
                if self.class_prefixes.iter().any(|p| name.starts_with(p.as_str())) {
                    Verdict::Expose
                } else {
                    Verdict::Delegate
                }
            }
            NameKind::Resource => match &self.resources {
                ResourceRule::DelegateAll => Verdict::Delegate,
                ResourceRule::Only(names) if names.iter().any(|n| n == name) => Verdict::Expose,
                ResourceRule::Only(_) => Verdict::Deny,
            },
        }
    }
}

/// Final outcome of a lookup through a [`LoaderChain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum Resolution {
    /// A layer refused the name.
    Denied { layer: String },
    /// A layer served the name from the infrastructure runtime.
    Exposed { layer: String },
    /// Every layer delegated; the name reaches the process classpath.
    Delegated,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denied {
                layer,
            } => write!(f, "denied by {layer}"),
            Self::Exposed {
                layer,
            } => write!(f, "exposed by {layer}"),
            Self::Delegated => f.write_str("delegated to parent"),
        }
    }
}

/// Layers ordered from child to parent.
pub struct LoaderChain {
    layers: Vec<Box<dyn LoaderPolicy>>,
}

impl fmt::Debug for LoaderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.layers.iter().map(|l| l.name())).finish()
    }
}

impl LoaderChain {
    #[must_use]
    pub fn new(layers: Vec<Box<dyn LoaderPolicy>>) -> Self {
        Self {
            layers,
        }
    }

    /// The tool's own classpath with its internals masked.
    #[must_use]
    pub fn masking() -> Self {
        Self::new(vec![Box::new(MaskingPolicy::default())])
    }

    /// Servlet API exposed on top of the masked tool classpath.
    #[must_use]
    pub fn servlet_only() -> Self {
        Self::new(vec![
            Box::new(ExposingPolicy::servlet_only()),
            Box::new(MaskingPolicy::default()),
        ])
    }

    /// Servlet API and infrastructure exposed on top of the masked tool
    /// classpath.
    #[must_use]
    pub fn infrastructure_and_servlet() -> Self {
        Self::new(vec![
            Box::new(ExposingPolicy::infrastructure_and_servlet()),
            Box::new(MaskingPolicy::default()),
        ])
    }

    /// Layer names, child first.
    #[must_use]
    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    /// Looks `name` up through the layers.
    #[must_use]
    pub fn resolve(&self, kind: NameKind, name: &str) -> Resolution {
        for layer in &self.layers {
            match layer.decide(kind, name) {
                Verdict::Deny => {
                    return Resolution::Denied {
                        layer: layer.name().to_string(),
                    };
                }
                Verdict::Expose => {
                    return Resolution::Exposed {
                        layer: layer.name().to_string(),
                    };
                }
                Verdict::Delegate => {}
            }
        }
        Resolution::Delegated
    }
}
