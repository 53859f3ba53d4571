//! Text sanitizing options.

/// Hosts whose links survive redaction by default.
pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &["microsoft.com"];

/// Options for the text sanitizer.
#[derive(Debug, Clone)]
pub struct SanitizeOptions {
    /// Hosts kept verbatim in URLs (subdomains included)
    pub allowed_hosts: Vec<String>,

    /// Normalize Unicode to NFC form before redaction
    pub normalize_unicode: bool,

    /// Fix ligatures (ﬁ, ﬂ, etc.)
    pub fix_ligatures: bool,

    /// Remove Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,
}

impl SanitizeOptions {
    /// Create new sanitize options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the host allow-list.
    pub fn with_allowed_hosts<S: Into<String>>(mut self, hosts: impl IntoIterator<Item = S>) -> Self {
        self.allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Add a host to the allow-list.
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.push(host.into());
        self
    }

    /// Enable all text normalization steps.
    pub fn normalized(mut self) -> Self {
        self.normalize_unicode = true;
        self.fix_ligatures = true;
        self.remove_replacement_char = true;
        self
    }

    /// Enable or disable NFC normalization.
    pub fn with_unicode_normalization(mut self, enabled: bool) -> Self {
        self.normalize_unicode = enabled;
        self
    }

    /// Enable or disable ligature expansion.
    pub fn with_ligature_fix(mut self, enabled: bool) -> Self {
        self.fix_ligatures = enabled;
        self
    }

    /// Check whether a URL host is allowed.
    ///
    /// A host matches an entry when it is equal to it or a subdomain of it.
    pub fn is_host_allowed(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.allowed_hosts.iter().any(|allowed| {
            let allowed = allowed.trim().trim_start_matches('.').to_ascii_lowercase();
            !allowed.is_empty()
                && (host == allowed
                    || host
                        .strip_suffix(allowed.as_str())
                        .is_some_and(|prefix| prefix.ends_with('.')))
        })
    }
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            normalize_unicode: false,
            fix_ligatures: false,
            remove_replacement_char: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allows_microsoft() {
        let opts = SanitizeOptions::default();
        assert!(opts.is_host_allowed("microsoft.com"));
        assert!(opts.is_host_allowed("docs.Microsoft.com"));
        assert!(!opts.is_host_allowed("notmicrosoft.com"));
        assert!(!opts.is_host_allowed("microsoft.com.evil.io"));
    }

    #[test]
    fn test_builder() {
        let opts = SanitizeOptions::new()
            .with_allowed_hosts(["example.org"])
            .allow_host(".rust-lang.org")
            .normalized();
        assert!(opts.is_host_allowed("example.org"));
        assert!(opts.is_host_allowed("doc.rust-lang.org"));
        assert!(!opts.is_host_allowed("microsoft.com"));
        assert!(opts.normalize_unicode && opts.fix_ligatures && opts.remove_replacement_char);
    }
}
