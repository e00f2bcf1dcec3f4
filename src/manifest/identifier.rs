//! Module identifier parsing.
//!
//! An identifier given to `splm add` can be a plain package name, a
//! scoped name, a versioned name (`name@version` or `name:version`), a
//! local path (`file:` prefix) or a git URL (`git+` prefix). Parsing is
//! pure and deterministic; every variant resolves to a canonical
//! [`ModuleRef`] carrying the installed-package name used everywhere
//! downstream (module layout lookup, registry entries, uninstall).

/// Where a module comes from, as declared by its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// A registry package, optionally pinned to a version.
    Registry {
        /// Version suffix, if the identifier carried one.
        version: Option<String>,
    },
    /// A local path identifier (`file:` prefix).
    LocalPath,
    /// A git URL identifier (`git+` prefix).
    Git,
}

/// A parsed module identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    /// The identifier exactly as the user wrote it.
    pub raw: String,
    /// The installed-package name the identifier resolves to.
    pub name: String,
    /// The source variant.
    pub spec: SourceSpec,
}

impl ModuleRef {
    /// Parse an identifier into its canonical form.
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix("file:") {
            return Self {
                raw: raw.to_string(),
                name: last_path_segment(rest).to_string(),
                spec: SourceSpec::LocalPath,
            };
        }

        if let Some(url) = raw.strip_prefix("git+") {
            let base = last_path_segment(url);
            let name = base.strip_suffix(".git").unwrap_or(base);
            return Self {
                raw: raw.to_string(),
                name: name.to_string(),
                spec: SourceSpec::Git,
            };
        }

        if let Some((name, version)) = split_version(raw) {
            return Self {
                raw: raw.to_string(),
                name: name.to_string(),
                spec: SourceSpec::Registry { version: Some(version.to_string()) },
            };
        }

        Self {
            raw: raw.to_string(),
            name: raw.to_string(),
            spec: SourceSpec::Registry { version: None },
        }
    }

    /// The `(key, value)` pair this module contributes to the manifest's
    /// dependency map.
    ///
    /// Local paths and git URLs keep the raw identifier as the value so
    /// the package manager can resolve them; versioned identifiers record
    /// the version; plain names record `default_spec`.
    pub fn manifest_entry(&self, default_spec: &str) -> (String, String) {
        let value = match &self.spec {
            SourceSpec::LocalPath | SourceSpec::Git => self.raw.clone(),
            SourceSpec::Registry { version: Some(version) } => version.clone(),
            SourceSpec::Registry { version: None } => default_spec.to_string(),
        };
        (self.name.clone(), value)
    }
}

/// Resolve an identifier to its installed-package name.
pub fn resolve_name(identifier: &str) -> String {
    ModuleRef::parse(identifier).name
}

fn last_path_segment(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
}

/// Split `name@version` / `name:version`, honoring scoped names whose
/// leading `@` is not a version separator.
fn split_version(identifier: &str) -> Option<(&str, &str)> {
    if let Some((name, version)) = identifier.split_once(':') {
        if !name.is_empty() && !version.is_empty() {
            return Some((name, version));
        }
    }

    match identifier.rfind('@') {
        Some(0) | None => None,
        Some(idx) => {
            let (name, version) = (&identifier[..idx], &identifier[idx + 1..]);
            if version.is_empty() { None } else { Some((name, version)) }
        }
    }
}
