//! Request authentication handed back by `Executor::api_server`.

use std::{collections::HashMap, fs, path::Path};

use axum::http::{header::AUTHORIZATION, HeaderMap};

use keel_common::{KeelError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
    pub uid: String,
    pub groups: Vec<String>,
}

/// Authenticates an incoming API request from its headers.
/// `Ok(None)` means the request carries no credentials this authenticator accepts.
pub trait RequestAuthenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Option<UserInfo>>;
}

/// Accepts nobody.
#[derive(Debug, Default, Clone)]
pub struct AnonymousAuthenticator;

impl RequestAuthenticator for AnonymousAuthenticator {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<UserInfo>> {
        Ok(None)
    }
}

/// Bearer-token authenticator backed by a static token file.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, UserInfo>,
}

impl StaticTokenAuthenticator {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        Self::parse(&data)
            .map_err(|e| KeelError::Config(format!("token file {}: {}", path.display(), e)))
    }

    /// Parses `token,user,uid[,"group1,group2"]` lines. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn parse(data: &str) -> Result<Self> {
        let mut tokens = HashMap::new();

        for (idx, raw) in data.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.splitn(4, ',');
            let token = fields.next().unwrap_or("").trim();
            let name = fields.next().unwrap_or("").trim();
            let uid = fields.next().unwrap_or("").trim();
            let groups = fields
                .next()
                .map(|g| {
                    g.trim()
                        .trim_matches('"')
                        .split(',')
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default();

            if token.is_empty() || name.is_empty() || uid.is_empty() {
                return Err(KeelError::Config(format!(
                    "line {}: expected token,user,uid",
                    idx + 1
                )));
            }

            let user = UserInfo { name: name.to_string(), uid: uid.to_string(), groups };
            if tokens.insert(token.to_string(), user).is_some() {
                return Err(KeelError::Config(format!("line {}: duplicate token", idx + 1)));
            }
        }

        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl RequestAuthenticator for StaticTokenAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Option<UserInfo>> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(None);
        };
        let Ok(value) = value.to_str() else {
            return Ok(None);
        };

        Ok(value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .and_then(|token| self.tokens.get(token))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const TOKENS: &str = r#"
# node credentials
abc123,system:admin,admin,"system:masters"
def456,kubelet,node-1,"system:nodes,system:authenticated"
ghi789,viewer,v1
"#;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
        headers
    }

    #[test]
    fn test_parse_token_file() {
        let auth = StaticTokenAuthenticator::parse(TOKENS).unwrap();
        assert_eq!(auth.len(), 3);

        let user = auth.authenticate(&bearer("def456")).unwrap().unwrap();
        assert_eq!(user.name, "kubelet");
        assert_eq!(user.uid, "node-1");
        assert_eq!(user.groups, vec!["system:nodes", "system:authenticated"]);

        let viewer = auth.authenticate(&bearer("ghi789")).unwrap().unwrap();
        assert!(viewer.groups.is_empty());
    }

    #[test]
    fn test_unknown_or_missing_token() {
        let auth = StaticTokenAuthenticator::parse(TOKENS).unwrap();
        assert!(auth.authenticate(&bearer("nope")).unwrap().is_none());
        assert!(auth.authenticate(&HeaderMap::new()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_lines_are_rejected() {
        assert!(StaticTokenAuthenticator::parse("abc123,admin").is_err());
        assert!(StaticTokenAuthenticator::parse("a,u,1\na,v,2").is_err());
    }

    #[test]
    fn test_anonymous_accepts_nobody() {
        assert!(AnonymousAuthenticator.authenticate(&bearer("abc123")).unwrap().is_none());
    }
}
