//! Property resolution for secrets and environment-dependent values.
//!
//! Values such as tokens are rarely written into the model. They are looked
//! up by candidate keys (`announce.slack.token`, `slack.token`) in several
//! sources, highest precedence first:
//!
//! 1. process environment, as `SHIPYARD_<UPPER_SNAKE_KEY>`
//! 2. runtime properties given on the command line (`-P key=value`)
//! 3. the variables file named by `environment.variables`
//! 4. inline `environment.properties`
//!
//! A value already present in the model always wins over every source.

use std::fmt;

use camino::Utf8Path;
use figment::Figment;
use figment::providers::{Format, Json, Toml, Yaml};
use indexmap::IndexMap;
use serde_json::Value;

use crate::errors::Errors;
use crate::msg;
use crate::text::Blank;

/// Prefix of environment variables consulted for properties.
pub const ENV_PREFIX: &str = "SHIPYARD_";

/// A read-only key/value source.
pub trait PropertySource: fmt::Debug + Send + Sync {
    /// Look up a raw key. Blank values count as absent.
    fn get(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl PropertySource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An in-memory source, mostly for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapSource(IndexMap<String, String>);

impl MapSource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl PropertySource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// Environment variable name for a dotted key: `slack.token` -> `SHIPYARD_SLACK_TOKEN`.
pub fn env_key(key: &str) -> String {
    let mut name = String::with_capacity(ENV_PREFIX.len() + key.len());
    name.push_str(ENV_PREFIX);
    for c in key.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_uppercase());
        } else {
            name.push('_');
        }
    }
    name
}

/// What to do when no candidate yields a value.
#[derive(Debug, Clone, Copy)]
pub enum Missing<'a> {
    /// Leave the value unset.
    Ignore,
    /// Fall back to this value.
    Default(&'a str),
    /// Record a configuration error for `property` unless running dry.
    Error {
        /// Dotted property name used in the message.
        property: &'a str,
        /// Dry runs never require secrets.
        dry_run: bool,
    },
}

/// Ordered lookup across every property source.
#[derive(Debug)]
pub struct PropertyResolver {
    environment: Box<dyn PropertySource>,
    runtime: IndexMap<String, String>,
    variables: IndexMap<String, String>,
    inline: IndexMap<String, String>,
}

impl Default for PropertyResolver {
    fn default() -> Self {
        Self::new(Box::new(ProcessEnv))
    }
}

impl PropertyResolver {
    /// Resolver over `environment` with no other sources.
    pub fn new(environment: Box<dyn PropertySource>) -> Self {
        Self {
            environment,
            runtime: IndexMap::new(),
            variables: IndexMap::new(),
            inline: IndexMap::new(),
        }
    }

    /// Set runtime properties (`-P key=value`).
    pub fn with_runtime(mut self, runtime: IndexMap<String, String>) -> Self {
        self.runtime = runtime;
        self
    }

    /// Set properties read from the variables file.
    pub fn with_variables(mut self, variables: IndexMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    /// Set inline `environment.properties`.
    pub fn with_inline(mut self, inline: IndexMap<String, String>) -> Self {
        self.inline = inline;
        self
    }

    /// Runtime properties as given.
    pub const fn runtime(&self) -> &IndexMap<String, String> {
        &self.runtime
    }

    /// First non-blank value for `key` across the sources.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let candidates = [
            self.environment.get(&env_key(key)),
            self.runtime.get(key).cloned(),
            self.variables.get(key).cloned(),
            self.inline.get(key).cloned(),
        ];
        candidates.into_iter().flatten().find(|v| !v.is_blank())
    }

    /// First non-blank value among `keys`, tried in order.
    pub fn lookup_any<K: AsRef<str>>(&self, keys: &[K]) -> Option<String> {
        keys.iter().find_map(|key| self.lookup(key.as_ref()))
    }

    /// Resolve a property: the configured value, else the first candidate
    /// key, else whatever `missing` says.
    ///
    /// A required property that cannot be found records
    /// `validation_property_missing` naming the environment variable of the
    /// last candidate key.
    pub fn check<K: AsRef<str>>(
        &self,
        keys: &[K],
        configured: Option<&str>,
        missing: Missing<'_>,
        errors: &mut Errors,
    ) -> Option<String> {
        if let Some(value) = configured.and_then(|v| v.non_blank()) {
            return Some(value.to_string());
        }
        if let Some(value) = self.lookup_any(keys) {
            return Some(value);
        }
        match missing {
            Missing::Ignore => None,
            Missing::Default(value) => Some(value.to_string()),
            Missing::Error { property, dry_run } => {
                if !dry_run {
                    let env = keys.last().map(|k| env_key(k.as_ref())).unwrap_or_default();
                    errors.configuration(msg!(
                        "validation_property_missing",
                        property = property,
                        env = env
                    ));
                }
                None
            }
        }
    }
}

/// Read a TOML/YAML/JSON variables file into dotted keys.
///
/// Nested tables flatten with `.`; scalars are stringified; arrays join
/// with `,`.
pub fn load_variables(path: &Utf8Path) -> Result<IndexMap<String, String>, Box<figment::Error>> {
    let figment = match path.extension() {
        Some("yaml" | "yml") => Figment::from(Yaml::file_exact(path.as_str())),
        Some("json") => Figment::from(Json::file_exact(path.as_str())),
        _ => Figment::from(Toml::file_exact(path.as_str())),
    };
    let value: Value = figment.extract().map_err(Box::new)?;
    let mut out = IndexMap::new();
    flatten(None, &value, &mut out);
    Ok(out)
}

fn flatten(prefix: Option<&str>, value: &Value, out: &mut IndexMap<String, String>) {
    let key = |name: &str| prefix.map_or_else(|| name.to_string(), |p| format!("{p}.{name}"));
    match value {
        Value::Object(map) => {
            for (name, nested) in map {
                flatten(Some(&key(name)), nested, out);
            }
        }
        other => {
            if let Some(prefix) = prefix {
                out.insert(prefix.to_string(), scalar(other));
            }
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn resolver(env: MapSource) -> PropertyResolver {
        PropertyResolver::new(Box::new(env))
    }

    #[rstest]
    #[case("slack.token", "SHIPYARD_SLACK_TOKEN")]
    #[case("deploy.maven.nexus2-app.password", "SHIPYARD_DEPLOY_MAVEN_NEXUS2_APP_PASSWORD")]
    fn env_key_is_upper_snake(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(env_key(key), expected);
    }

    #[test]
    fn configured_value_wins_over_environment() {
        let props = resolver(MapSource::new().with("SHIPYARD_SLACK_TOKEN", "env"));
        let mut errors = Errors::default();
        let value = props.check(&["slack.token"], Some("configured"), Missing::Ignore, &mut errors);
        assert_eq!(value.as_deref(), Some("configured"));
    }

    #[test]
    fn blank_configured_value_falls_through() {
        let props = resolver(MapSource::new().with("SHIPYARD_SLACK_TOKEN", "env"));
        let mut errors = Errors::default();
        let value = props.check(&["slack.token"], Some("  "), Missing::Ignore, &mut errors);
        assert_eq!(value.as_deref(), Some("env"));
    }

    #[test]
    fn blank_environment_value_is_absent() {
        let props = resolver(
            MapSource::new()
                .with("SHIPYARD_ANNOUNCE_SLACK_TOKEN", "")
                .with("SHIPYARD_SLACK_TOKEN", "second"),
        );
        assert_eq!(
            props.lookup_any(&["announce.slack.token", "slack.token"]).as_deref(),
            Some("second")
        );
    }

    #[test]
    fn environment_beats_runtime_beats_variables() {
        let mut runtime = IndexMap::new();
        runtime.insert("a.b".to_string(), "runtime".to_string());
        let mut vars = IndexMap::new();
        vars.insert("a.b".to_string(), "file".to_string());
        vars.insert("c".to_string(), "file".to_string());

        let props = resolver(MapSource::new())
            .with_runtime(runtime)
            .with_variables(vars);
        assert_eq!(props.lookup("a.b").as_deref(), Some("runtime"));
        assert_eq!(props.lookup("c").as_deref(), Some("file"));

        let props = resolver(MapSource::new().with("SHIPYARD_C", "env")).with_variables(
            [("c".to_string(), "file".to_string())].into_iter().collect(),
        );
        assert_eq!(props.lookup("c").as_deref(), Some("env"));
    }

    #[test]
    fn missing_required_names_last_key() {
        let props = resolver(MapSource::new());
        let mut errors = Errors::default();
        let value = props.check(
            &["announce.slack.token", "slack.token"],
            None,
            Missing::Error {
                property: "announce.slack.token",
                dry_run: false,
            },
            &mut errors,
        );
        assert!(value.is_none());
        let message = &errors.configuration_errors()[0];
        assert_eq!(message.key(), "validation_property_missing");
        assert_eq!(message.arg("env"), Some("SHIPYARD_SLACK_TOKEN"));
    }

    #[test]
    fn dry_run_does_not_require() {
        let props = resolver(MapSource::new());
        let mut errors = Errors::default();
        props.check(
            &["slack.token"],
            None,
            Missing::Error {
                property: "slack.token",
                dry_run: true,
            },
            &mut errors,
        );
        assert!(!errors.has_errors());
    }

    #[test]
    fn default_applies_last() {
        let props = resolver(MapSource::new());
        let mut errors = Errors::default();
        let value = props.check(&["x"], None, Missing::Default("fallback"), &mut errors);
        assert_eq!(value.as_deref(), Some("fallback"));
    }

    #[test]
    fn variables_file_flattens_tables() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vars.toml");
        fs::write(
            &path,
            "[slack]\ntoken = \"abc\"\n[deploy.nexus]\nport = 8081\nlist = [\"a\", \"b\"]\n",
        )
        .unwrap();
        let path = camino::Utf8PathBuf::try_from(path).unwrap();

        let vars = load_variables(&path).unwrap();
        assert_eq!(vars.get("slack.token").map(String::as_str), Some("abc"));
        assert_eq!(vars.get("deploy.nexus.port").map(String::as_str), Some("8081"));
        assert_eq!(vars.get("deploy.nexus.list").map(String::as_str), Some("a,b"));
    }
}
