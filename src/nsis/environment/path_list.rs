//! Editing of delimited `PATH` lists.
//!
//! Entries are compared after environment-variable expansion, lexical
//! normalisation and case folding, so `%ProgramFiles%\NSIS\`, `c:/program files/nsis`
//! and `C:\Program Files\NSIS` all name the same directory.

/// Separator conventions of a platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathStyle {
    /// Primary directory separator
    pub separator: char,
    /// Alternative separator folded into `separator` during normalisation
    pub alt_separator: Option<char>,
    /// Separator between `PATH` entries
    pub list_separator: char,
}

impl PathStyle {
    /// Windows conventions (`\`, `/`, `;`).
    pub const WINDOWS: PathStyle = PathStyle {
        separator: '\\',
        alt_separator: Some('/'),
        list_separator: ';',
    };

    /// POSIX conventions (`/`, `:`).
    pub const POSIX: PathStyle = PathStyle {
        separator: '/',
        alt_separator: None,
        list_separator: ':',
    };

    /// Conventions of the host platform.
    #[cfg(windows)]
    pub const NATIVE: PathStyle = PathStyle::WINDOWS;

    /// Conventions of the host platform.
    #[cfg(not(windows))]
    pub const NATIVE: PathStyle = PathStyle::POSIX;

    /// Lexically normalise `path`.
    ///
    /// Folds the alternative separator, drops `.` and empty components,
    /// collapses `..`, keeps a drive prefix and leading root. An empty
    /// result becomes `.`.
    pub fn normalize(&self, path: &str) -> String {
        let sep = self.separator;
        let path: String = match self.alt_separator {
            Some(alt) => path.replace(alt, &sep.to_string()),
            None => path.to_string(),
        };

        let (prefix, rest) = self.split_drive(&path);
        let root = rest.starts_with(sep);
        // UNC paths (`\\server\share`) keep their double leading separator
        let unc = root && prefix.is_empty() && self.alt_separator.is_some() && rest.starts_with(&format!("{sep}{sep}"));

        let mut parts: Vec<&str> = Vec::new();
        for part in rest.split(sep) {
            match part {
                "" | "." => {}
                ".." => match parts.last() {
                    Some(&last) if last != ".." => {
                        parts.pop();
                    }
                    _ if root => {}
                    _ => parts.push(".."),
                },
                other => parts.push(other),
            }
        }

        let mut out = String::from(prefix);
        if unc {
            out.push(sep);
        }
        if root {
            out.push(sep);
        }
        out.push_str(&parts.join(&sep.to_string()));

        if out.is_empty() { ".".to_string() } else { out }
    }

    /// Split a `X:` drive prefix off Windows-style paths.
    fn split_drive<'a>(&self, path: &'a str) -> (&'a str, &'a str) {
        if self.alt_separator.is_none() {
            return ("", path);
        }
        let bytes = path.as_bytes();
        if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
            path.split_at(2)
        } else {
            ("", path)
        }
    }

    /// Comparison key of a `PATH` entry.
    fn key(&self, entry: &str) -> String {
        self.normalize(&expand_vars(entry)).to_lowercase()
    }

    /// Split `list` into its non-empty entries.
    fn entries<'a>(&self, list: &'a str) -> impl Iterator<Item = &'a str> {
        list.split(self.list_separator).filter(|e| !e.is_empty())
    }

    /// Add `dir` to `list`.
    ///
    /// Returns `None` when `keep_existing` is set and `dir` is already listed.
    /// Otherwise every existing occurrence is dropped and `dir` is inserted at
    /// the front or the back.
    pub fn path_add(&self, list: &str, dir: &str, keep_existing: bool, front: bool) -> Option<String> {
        let dir = self.normalize(dir);
        let wanted = dir.to_lowercase();

        let mut kept = Vec::new();
        for entry in self.entries(list) {
            if self.key(entry) == wanted {
                if keep_existing {
                    return None;
                }
            } else {
                kept.push(entry);
            }
        }

        if front {
            kept.insert(0, &dir);
        } else {
            kept.push(&dir);
        }
        Some(kept.join(&self.list_separator.to_string()))
    }

    /// Remove every occurrence of `dir` from `list`.
    ///
    /// Returns `None` when `dir` was not listed.
    pub fn path_remove(&self, list: &str, dir: &str) -> Option<String> {
        let wanted = self.key(dir);

        let mut modified = false;
        let mut kept = Vec::new();
        for entry in self.entries(list) {
            if self.key(entry) == wanted {
                modified = true;
            } else {
                kept.push(entry);
            }
        }

        modified.then(|| kept.join(&self.list_separator.to_string()))
    }
}

/// Expand `%VAR%`, `$VAR` and `${VAR}` references from the process environment.
pub fn expand_vars(s: &str) -> String {
    expand_vars_with(s, |name| std::env::var(name).ok())
}

/// Expand variable references using `lookup`. Unknown references stay verbatim.
pub fn expand_vars_with<F>(s: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find(['%', '$']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let (name, consumed) = if let Some(body) = tail.strip_prefix('%') {
            match body.find('%') {
                Some(end) if end > 0 => (Some(&body[..end]), end + 2),
                _ => (None, 1),
            }
        } else if let Some(body) = tail.strip_prefix("${") {
            match body.find('}') {
                Some(end) if end > 0 => (Some(&body[..end]), end + 3),
                _ => (None, 1),
            }
        } else {
            let body = &tail[1..];
            let end = body
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(body.len());
            if end > 0 { (Some(&body[..end]), end + 1) } else { (None, 1) }
        };

        match name.and_then(|n| lookup(n)) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&tail[..consumed]),
        }
        rest = &tail[consumed..];
    }

    out.push_str(rest);
    out
}
