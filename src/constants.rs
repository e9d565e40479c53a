//! Global constants used throughout the hpkg codebase.
//!
//! Archive layout names, manifest attribute names and the well-known
//! coordinates of the host runtime live here so the engine and the goals
//! agree on them.

/// Jar manifest entry name.
pub const MANIFEST_ENTRY: &str = "META-INF/MANIFEST.MF";

/// Private library directory inside the assembled component.
pub const LIB_DIR: &str = "WEB-INF/lib";

/// Tag library descriptor directory inside the assembled component.
pub const TLD_DIR: &str = "WEB-INF/tld";

/// Service file naming the plugin entry class, relative to the classes dir.
pub const PLUGIN_SERVICE_FILE: &str = "META-INF/services/hudson.Plugin";

/// Compiled extension index, relative to the classes dir.
pub const EXTENSION_INDEX_FILE: &str = "META-INF/annotations/hudson.Extension.txt";

/// Name of the sorted plugin list written by `assemble-dependencies`.
pub const BUNDLED_PLUGINS_FILE: &str = "bundled-plugins.txt";

/// Project descriptor file name.
pub const PROJECT_FILE: &str = "hpkg.toml";

/// Default workspace map location, relative to the home directory.
pub const DEFAULT_WORKSPACE_MAP: &str = ".jenkins-hpl-map";

/// First line of a freshly written workspace map.
pub const WORKSPACE_MAP_HEADER: &str = "List of development files for Jenkins plugins that have been built.";

/// Trail substrings identifying the host core component.
pub const DEFAULT_HOST_CORE_MARKERS: &[&str] = &[":hudson-core:", ":jenkins-core:"];

/// Well-known host core coordinates, tried in order when no explicit id is configured.
pub const DEFAULT_HOST_CORE_IDS: &[(&str, &str)] = &[
    ("org.jenkins-ci.main", "jenkins-core"),
    ("org.jvnet.hudson.main", "hudson-core"),
];

/// Manifest attribute names.
pub mod attr {
    pub const MANIFEST_VERSION: &str = "Manifest-Version";
    pub const CREATED_BY: &str = "Created-By";
    pub const PLUGIN_CLASS: &str = "Plugin-Class";
    pub const GROUP_ID: &str = "Group-Id";
    pub const ARTIFACT_ID: &str = "Artifact-Id";
    pub const SHORT_NAME: &str = "Short-Name";
    pub const LONG_NAME: &str = "Long-Name";
    pub const URL: &str = "Url";
    pub const COMPATIBLE_SINCE_VERSION: &str = "Compatible-Since-Version";
    pub const SANDBOX_STATUS: &str = "Sandbox-Status";
    pub const PLUGIN_VERSION: &str = "Plugin-Version";
    pub const HUDSON_VERSION: &str = "Hudson-Version";
    pub const JENKINS_VERSION: &str = "Jenkins-Version";
    pub const MASK_CLASSES: &str = "Mask-Classes";
    pub const GLOBAL_MASK_CLASSES: &str = "Global-Mask-Classes";
    pub const PLUGIN_FIRST_CLASS_LOADER: &str = "PluginFirstClassLoader";
    pub const PLUGIN_DEPENDENCIES: &str = "Plugin-Dependencies";
    pub const PLUGIN_DEVELOPERS: &str = "Plugin-Developers";
    pub const SUPPORT_DYNAMIC_LOADING: &str = "Support-Dynamic-Loading";
    pub const PLUGIN_LICENSE_NAME: &str = "Plugin-License-Name";
    pub const PLUGIN_LICENSE_URL: &str = "Plugin-License-Url";
    pub const PLUGIN_CHANGELOG_URL: &str = "Plugin-ChangelogUrl";
    pub const PLUGIN_LOGO_URL: &str = "Plugin-LogoUrl";
    pub const PLUGIN_SCM_CONNECTION: &str = "Plugin-ScmConnection";
    pub const PLUGIN_SCM_TAG: &str = "Plugin-ScmTag";
    pub const PLUGIN_SCM_URL: &str = "Plugin-ScmUrl";
    pub const PLUGIN_GIT_HASH: &str = "Plugin-GitHash";
    pub const PLUGIN_MODULE_PATH: &str = "Plugin-ModulePath";
    pub const LIBRARIES: &str = "Libraries";
    pub const RESOURCE_PATH: &str = "Resource-Path";
}
