use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|_| Self::default().allowed_origins);

        Self { allowed_origins }
    }

    /// Whether any origin is allowed (`ALLOWED_ORIGINS=*`).
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn test_allows_any() {
        let config = CorsConfig {
            allowed_origins: vec!["*".into()],
        };
        assert!(config.allows_any());
        assert!(!CorsConfig::default().allows_any());
    }
}
