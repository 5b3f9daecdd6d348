// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use roster_app::{ActorId, ControllerConfig, SortDirection, SortField};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "roster";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_COLLECTION: &str = "users";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 500;
const DEFAULT_NOUN: &str = "user";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub remote: Remote,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            remote: Remote::default(),
            table: Table::default(),
            session: Session::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Remote {
    pub base_url: Option<String>,
    pub collection: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Remote {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            collection: Some(DEFAULT_COLLECTION.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Table {
    pub page_size: Option<i64>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub noun: Option<String>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            page_size: Some(i64::from(DEFAULT_PAGE_SIZE)),
            sort: Some(SortField::Name.as_str().to_owned()),
            order: Some(SortDirection::Asc.as_str().to_owned()),
            noun: Some(DEFAULT_NOUN.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Session {
    pub actor_id: Option<String>,
    pub session_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ROSTER_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ROSTER_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [remote], [table], [session], and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.remote.base_url
            && base_url.trim().is_empty()
        {
            bail!("remote.base_url in {} must not be empty", path.display());
        }

        if let Some(collection) = &self.remote.collection
            && collection.trim().is_empty()
        {
            bail!("remote.collection in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.remote.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "remote.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(page_size) = self.table.page_size
            && !(1..=i64::from(MAX_PAGE_SIZE)).contains(&page_size)
        {
            bail!(
                "table.page_size in {} must be between 1 and {}, got {}",
                path.display(),
                MAX_PAGE_SIZE,
                page_size
            );
        }

        if let Some(sort) = &self.table.sort
            && SortField::parse(sort).is_none()
        {
            bail!(
                "table.sort in {} must be one of name, email, type, created_at; got {:?}",
                path.display(),
                sort
            );
        }

        if let Some(order) = &self.table.order
            && SortDirection::parse(order).is_none()
        {
            bail!(
                "table.order in {} must be asc or desc; got {:?}",
                path.display(),
                order
            );
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.remote
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn collection(&self) -> &str {
        self.remote
            .collection
            .as_deref()
            .unwrap_or(DEFAULT_COLLECTION)
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.remote.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn page_size(&self) -> u32 {
        self.table
            .page_size
            .and_then(|size| u32::try_from(size).ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn sort(&self) -> SortField {
        self.table
            .sort
            .as_deref()
            .and_then(SortField::parse)
            .unwrap_or(SortField::Name)
    }

    pub fn order(&self) -> SortDirection {
        self.table
            .order
            .as_deref()
            .and_then(SortDirection::parse)
            .unwrap_or(SortDirection::Asc)
    }

    pub fn noun(&self) -> &str {
        match self.table.noun.as_deref().map(str::trim) {
            Some(noun) if !noun.is_empty() => noun,
            _ => DEFAULT_NOUN,
        }
    }

    /// Explicit `actor_id` wins; otherwise the session file is read. A missing
    /// or malformed session file means no actor.
    pub fn actor(&self) -> Option<ActorId> {
        if let Some(actor) = &self.session.actor_id
            && !actor.trim().is_empty()
        {
            return Some(ActorId::new(actor.trim()));
        }
        let path = self.session.session_file.as_deref()?;
        let raw = fs::read_to_string(path).ok()?;
        ActorId::from_user_json(&raw)
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            page_size: self.page_size(),
            default_sort: self.sort(),
            default_order: self.order(),
            actor: self.actor(),
            noun: self.noun().to_owned(),
        }
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.logging.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [logging].file in the config")
        })?;
        Ok(data_root.join(APP_NAME).join("roster.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# roster config\n# Place this file at: {}\n\nversion = 1\n\n[remote]\nbase_url = \"{}\"\ncollection = \"{}\"\ntimeout = \"{}\"\n\n[table]\npage_size = {}\nsort = \"name\"\norder = \"asc\"\nnoun = \"{}\"\n\n[session]\n# Optional. Sent as the X-User-Id header on update and delete.\n# actor_id = \"42\"\n# Optional. JSON file holding the signed-in user object, for example {{\"id\": 42}}.\n# session_file = \"/absolute/path/to/user.json\"\n\n[logging]\nlevel = \"{}\"\n# file = \"/absolute/path/to/roster.log\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_COLLECTION,
            DEFAULT_TIMEOUT,
            DEFAULT_PAGE_SIZE,
            DEFAULT_NOUN,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let Some(secs) = mins.checked_mul(60) else {
            bail!("timeout duration {raw:?} is too large");
        };
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_duration};
    use anyhow::Result;
    use roster_app::{ActorId, SortDirection, SortField};
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let (temp, path) = roster_testkit::temp_config_path()?;
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.base_url(), "http://localhost:5000");
        assert_eq!(config.collection(), "users");
        assert_eq!(config.timeout()?, Duration::from_secs(10));
        assert_eq!(config.page_size(), 10);
        assert_eq!(config.noun(), "user");
        assert_eq!(config.actor(), None);
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[remote]\nbase_url = \"http://x\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[remote]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[remote]\nbase_url = \"http://store.local/api/\"\ncollection = \"people\"\ntimeout = \"2s\"\n[table]\npage_size = 25\nsort = \"created_at\"\norder = \"desc\"\nnoun = \"person\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.base_url(), "http://store.local/api");
        assert_eq!(config.collection(), "people");
        assert_eq!(config.timeout()?, Duration::from_secs(2));

        let controller = config.controller_config();
        assert_eq!(controller.page_size, 25);
        assert_eq!(controller.default_sort, SortField::CreatedAt);
        assert_eq!(controller.default_order, SortDirection::Desc);
        assert_eq!(controller.noun, "person");
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn page_size_must_be_in_range() -> Result<()> {
        for size in ["0", "501", "-3"] {
            let (_temp, path) = write_config(&format!("version = 1\n[table]\npage_size = {size}\n"))?;
            let error = Config::load(&path).expect_err("out of range page size should fail");
            assert!(
                error.to_string().contains("between 1 and 500"),
                "unexpected message: {error}"
            );
        }
        Ok(())
    }

    #[test]
    fn unknown_sort_and_order_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[table]\nsort = \"budget\"\n")?;
        let error = Config::load(&path).expect_err("unknown sort should fail");
        assert!(error.to_string().contains("table.sort"));

        let (_temp, path) = write_config("version = 1\n[table]\norder = \"up\"\n")?;
        let error = Config::load(&path).expect_err("unknown order should fail");
        assert!(error.to_string().contains("table.order"));
        Ok(())
    }

    #[test]
    fn blank_remote_values_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[remote]\nbase_url = \" \"\n")?;
        let error = Config::load(&path).expect_err("blank base url should fail");
        assert!(error.to_string().contains("remote.base_url"));
        Ok(())
    }

    #[test]
    fn timeout_must_be_positive() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[remote]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn durations_parse_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn invalid_duration_is_rejected() {
        let error = parse_duration("oops").expect_err("invalid duration should fail");
        let message = error.to_string();
        assert!(
            message.contains("invalid duration") || message.contains("invalid timeout duration"),
            "unexpected message: {message}"
        );
    }

    #[test]
    fn oversized_minute_duration_is_rejected() {
        let raw = format!("{}m", u64::MAX);
        let error = parse_duration(&raw).expect_err("overflowing duration should fail");
        assert!(error.to_string().contains("too large"), "{error}");
    }

    #[test]
    fn explicit_actor_wins_over_session_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let session = temp.path().join("user.json");
        std::fs::write(&session, r#"{"id": 7, "name": "Ana"}"#)?;
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "version = 1\n[session]\nactor_id = \"42\"\nsession_file = {:?}\n",
                session.display().to_string()
            ),
        )?;
        assert_eq!(Config::load(&path)?.actor(), Some(ActorId::new("42")));

        std::fs::write(
            &path,
            format!(
                "version = 1\n[session]\nsession_file = {:?}\n",
                session.display().to_string()
            ),
        )?;
        assert_eq!(Config::load(&path)?.actor(), Some(ActorId::new("7")));
        Ok(())
    }

    #[test]
    fn unreadable_session_yields_no_actor() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let session = temp.path().join("user.json");
        std::fs::write(&session, "not json")?;
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                "version = 1\n[session]\nsession_file = {:?}\n",
                session.display().to_string()
            ),
        )?;
        assert_eq!(Config::load(&path)?.actor(), None);

        std::fs::remove_file(&session)?;
        assert_eq!(Config::load(&path)?.actor(), None);
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("ROSTER_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("ROSTER_CONFIG_PATH");
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn log_file_prefers_config_value() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[logging]\nlevel = \"debug\"\nfile = \"/tmp/roster-test.log\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.log_file()?, PathBuf::from("/tmp/roster-test.log"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_loader() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[remote]"));
        assert!(example.contains("[session]"));
        std::fs::write(&path, &example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.page_size(), 10);
        Ok(())
    }
}
