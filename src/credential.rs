//! Bearer token resolution from an ordered list of sources.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::AuthConfig;
use crate::debug_log::DebugLog;
use crate::error::ImageFxError;

/// Environment variable holding the token verbatim.
pub const TOKEN_ENV_VAR: &str = "IMAGEFX_AUTH_TOKEN";

/// Token file name, looked up next to the executable.
pub const TOKEN_FILE_NAME: &str = "ifx_config.auth";

const BEARER_SCHEME: &str = "Bearer";

/// A resolved bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as resolved.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header. A token that already carries
    /// the `Bearer ` scheme is sent as is.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        if self.0.starts_with("Bearer ") {
            self.0.clone()
        } else {
            format!("{BEARER_SCHEME} {}", self.0)
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<{} chars>)", self.0.len())
    }
}

/// One place a token may come from.
pub trait TokenSource: Send + Sync {
    /// Human-readable description, e.g. `env IMAGEFX_AUTH_TOKEN`.
    fn describe(&self) -> String;

    /// Look up the token.
    ///
    /// `Ok(None)` means the source has nothing to offer; `Err` means it exists
    /// but could not be read. Both let resolution fall through.
    ///
    /// # Errors
    ///
    /// Returns a message if the source exists but cannot be read.
    fn fetch(&self) -> Result<Option<String>, String>;
}

/// Reads the token verbatim from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvVarSource {
    name: String,
}

impl EnvVarSource {
    /// Source backed by the variable `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl TokenSource for EnvVarSource {
    fn describe(&self) -> String {
        format!("env {}", self.name)
    }

    fn fetch(&self) -> Result<Option<String>, String> {
        Ok(std::env::var(&self.name).ok().filter(|v| !v.is_empty()))
    }
}

/// Reads the token from a file, stripping a `Bearer ` prefix.
#[derive(Debug, Clone)]
pub struct TokenFileSource {
    path: PathBuf,
}

impl TokenFileSource {
    /// Source backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this source reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenSource for TokenFileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn fetch(&self) -> Result<Option<String>, String> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read token file {}: {e}", self.path.display()))?;
        let token = normalize_token(&contents);
        Ok((!token.is_empty()).then(|| token.to_string()))
    }
}

/// A fixed token, e.g. from the config file.
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    label: String,
    token: Option<String>,
}

impl StaticTokenSource {
    /// Source that always yields `token` (if any).
    #[must_use]
    pub fn new(label: impl Into<String>, token: Option<String>) -> Self {
        Self {
            label: label.into(),
            token,
        }
    }
}

impl TokenSource for StaticTokenSource {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn fetch(&self) -> Result<Option<String>, String> {
        Ok(self
            .token
            .as_deref()
            .map(normalize_token)
            .filter(|t| !t.is_empty())
            .map(String::from))
    }
}

/// Strip surrounding whitespace and a leading `Bearer` scheme.
///
/// The scheme only counts when followed by whitespace or nothing, so
/// `Bearer ` alone normalizes to an empty token.
#[must_use]
pub fn normalize_token(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.strip_prefix(BEARER_SCHEME) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
        _ => trimmed,
    }
}

/// Default token file: `ifx_config.auth` in the executable's directory,
/// or the working directory if the executable path is unknown.
#[must_use]
pub fn default_token_file() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(TOKEN_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(TOKEN_FILE_NAME))
}

/// Consults token sources in order until one yields a token.
pub struct CredentialResolver {
    sources: Vec<Box<dyn TokenSource>>,
}

impl CredentialResolver {
    /// Resolver over an explicit ordered list of sources.
    #[must_use]
    pub fn new(sources: Vec<Box<dyn TokenSource>>) -> Self {
        Self { sources }
    }

    /// Standard chain: environment variable, config token, token file.
    ///
    /// The token file is `token_file` if given, then `auth.token_file`, then
    /// [`default_token_file`].
    #[must_use]
    pub fn standard(auth: &AuthConfig, token_file: Option<&Path>) -> Self {
        let file = token_file
            .map(Path::to_path_buf)
            .or_else(|| auth.token_file.clone())
            .unwrap_or_else(default_token_file);

        let mut sources: Vec<Box<dyn TokenSource>> =
            vec![Box::new(EnvVarSource::new(TOKEN_ENV_VAR))];
        if auth.token.is_some() {
            sources.push(Box::new(StaticTokenSource::new(
                "config [auth].token",
                auth.token.clone(),
            )));
        }
        sources.push(Box::new(TokenFileSource::new(file)));
        Self::new(sources)
    }

    /// Resolve a credential, logging which source supplied it.
    ///
    /// # Errors
    ///
    /// Returns [`ImageFxError::MissingCredential`] if no source yields a
    /// non-empty token.
    pub fn resolve(&self, log: &mut DebugLog) -> Result<Credential, ImageFxError> {
        for source in &self.sources {
            match source.fetch() {
                Ok(Some(token)) => {
                    log.info(format!("Using token from {}", source.describe()));
                    return Ok(Credential::new(token));
                }
                Ok(None) => log.info(format!("No token in {}", source.describe())),
                Err(e) => log.warn(e),
            }
        }
        Err(ImageFxError::MissingCredential {
            sources: self.sources.iter().map(|s| s.describe()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Records how often it was consulted.
    struct CountingSource {
        token: Option<String>,
        calls: Arc<AtomicUsize>,
    }

    impl TokenSource for CountingSource {
        fn describe(&self) -> String {
            "counting".into()
        }

        fn fetch(&self) -> Result<Option<String>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.token.clone())
        }
    }

    /// Counts reads of a real token file.
    struct CountingFileSource {
        inner: TokenFileSource,
        calls: Arc<AtomicUsize>,
    }

    impl TokenSource for CountingFileSource {
        fn describe(&self) -> String {
            self.inner.describe()
        }

        fn fetch(&self) -> Result<Option<String>, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch()
        }
    }

    fn write_token_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn normalize_strips_prefix_and_whitespace() {
        assert_eq!(normalize_token("Bearer abc123"), "abc123");
        assert_eq!(normalize_token("  Bearer   abc123 \n"), "abc123");
        assert_eq!(normalize_token("abc123\n"), "abc123");
        assert_eq!(normalize_token("Bearer "), "");
        assert_eq!(normalize_token("Bearer\n"), "");
        assert_eq!(normalize_token("Bearer"), "");
        assert_eq!(normalize_token("Bearerish-token"), "Bearerish-token");
    }

    #[test]
    fn first_source_wins_and_later_sources_are_not_read() {
        let file_calls = Arc::new(AtomicUsize::new(0));
        let resolver = CredentialResolver::new(vec![
            Box::new(StaticTokenSource::new("env stand-in", Some("from-env".into()))),
            Box::new(CountingSource {
                token: Some("from-file".into()),
                calls: Arc::clone(&file_calls),
            }),
        ]);

        let credential = resolver.resolve(&mut DebugLog::new(false)).unwrap();
        assert_eq!(credential.token(), "from-env");
        assert_eq!(file_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn env_var_set_means_token_file_is_never_read() {
        const VAR: &str = "IMAGEFX_TEST_TOKEN_ENV_BEFORE_FILE";
        std::env::set_var(VAR, "from-env");
        let (_dir, path) = write_token_file("from-file");
        let file_calls = Arc::new(AtomicUsize::new(0));
        let resolver = CredentialResolver::new(vec![
            Box::new(EnvVarSource::new(VAR)),
            Box::new(CountingFileSource {
                inner: TokenFileSource::new(&path),
                calls: Arc::clone(&file_calls),
            }),
        ]);

        let credential = resolver.resolve(&mut DebugLog::new(false)).unwrap();
        std::env::remove_var(VAR);
        assert_eq!(credential.token(), "from-env");
        assert_eq!(file_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unset_env_var_falls_through_to_counted_file() {
        let (_dir, path) = write_token_file("from-file\n");
        let file_calls = Arc::new(AtomicUsize::new(0));
        let resolver = CredentialResolver::new(vec![
            Box::new(EnvVarSource::new("IMAGEFX_TEST_TOKEN_ENV_NEVER_SET")),
            Box::new(CountingFileSource {
                inner: TokenFileSource::new(&path),
                calls: Arc::clone(&file_calls),
            }),
        ]);

        let credential = resolver.resolve(&mut DebugLog::new(false)).unwrap();
        assert_eq!(credential.token(), "from-file");
        assert_eq!(file_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bearer_only_file_is_missing_credential() {
        let (_dir, path) = write_token_file("Bearer \n");
        let resolver = CredentialResolver::new(vec![Box::new(TokenFileSource::new(&path))]);

        let err = resolver.resolve(&mut DebugLog::new(false)).unwrap_err();
        assert!(matches!(err, ImageFxError::MissingCredential { .. }));
    }

    #[test]
    fn empty_first_source_falls_through_to_file() {
        let (_dir, path) = write_token_file("Bearer abc123\n");
        let resolver = CredentialResolver::new(vec![
            Box::new(StaticTokenSource::new("env stand-in", Some(String::new()))),
            Box::new(TokenFileSource::new(&path)),
        ]);

        let mut log = DebugLog::new(true);
        let credential = resolver.resolve(&mut log).unwrap();
        assert_eq!(credential.token(), "abc123");
        assert!(log.contains(&path.display().to_string()));
    }

    #[test]
    fn no_source_yields_missing_credential() {
        let resolver = CredentialResolver::new(vec![
            Box::new(StaticTokenSource::new("env stand-in", None)),
            Box::new(TokenFileSource::new("/nonexistent/ifx_config.auth")),
        ]);

        let err = resolver.resolve(&mut DebugLog::new(false)).unwrap_err();
        match err {
            ImageFxError::MissingCredential { sources } => {
                assert_eq!(sources, vec!["env stand-in", "file /nonexistent/ifx_config.auth"]);
            }
            other => panic!("expected MissingCredential, got {other:?}"),
        }
    }

    #[test]
    fn whitespace_only_file_is_not_a_token() {
        let (_dir, path) = write_token_file("   \n");
        assert_eq!(TokenFileSource::new(path).fetch().unwrap(), None);
    }

    #[test]
    fn unset_env_var_yields_nothing() {
        let source = EnvVarSource::new("IMAGEFX_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert_eq!(source.fetch().unwrap(), None);
        assert_eq!(source.describe(), "env IMAGEFX_TEST_TOKEN_THAT_IS_NEVER_SET");
    }

    #[test]
    fn standard_chain_prefers_explicit_token_file() {
        let (_dir, path) = write_token_file("Bearer from-flag");
        let auth = AuthConfig {
            token: None,
            token_file: Some(PathBuf::from("/ignored")),
        };
        let resolver = CredentialResolver::standard(&auth, Some(&path));

        let described: Vec<_> = resolver.sources.iter().map(|s| s.describe()).collect();
        assert_eq!(described[0], format!("env {TOKEN_ENV_VAR}"));
        assert_eq!(described.last().unwrap(), &format!("file {}", path.display()));
    }

    #[test]
    fn standard_chain_includes_config_token() {
        let auth = AuthConfig {
            token: Some("Bearer cfg".into()),
            token_file: None,
        };
        let resolver = CredentialResolver::standard(&auth, None);
        assert_eq!(resolver.sources.len(), 3);
        assert_eq!(resolver.sources[1].fetch().unwrap().as_deref(), Some("cfg"));
    }

    #[test]
    fn credential_debug_is_redacted() {
        let credential = Credential::new("super-secret");
        let shown = format!("{credential:?}");
        assert!(!shown.contains("super-secret"));
        assert_eq!(credential.authorization_header(), "Bearer super-secret");
    }

    #[test]
    fn prefixed_env_token_gets_a_single_scheme() {
        const VAR: &str = "IMAGEFX_TEST_TOKEN_WITH_SCHEME";
        std::env::set_var(VAR, "Bearer abc123");
        let resolver = CredentialResolver::new(vec![Box::new(EnvVarSource::new(VAR))]);

        let credential = resolver.resolve(&mut DebugLog::new(false)).unwrap();
        std::env::remove_var(VAR);
        assert_eq!(credential.authorization_header(), "Bearer abc123");
    }
}
