use once_cell::sync::Lazy;
use regex::Regex;

static RE_KV_SECRET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(bearer[_-]?token|api[_-]?key|authorization|x-goog-api-key)["']?\s*[:=]\s*(["']?)([^\s"']+)(["']?)"#,
    )
    .expect("valid regex")
});

static RE_AUTH_BEARER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bBearer\s+([A-Za-z0-9._\-]+)").expect("valid regex")
});

static RE_URL_QUERY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([?&](?:api_key|token|key)=)[^&\s]+").expect("valid regex"));

/// Redacts credentials from text before it is logged.
pub fn redact_secrets_in_text(input: &str) -> String {
    let step1 = RE_AUTH_BEARER.replace_all(input, "Bearer ***REDACTED***");
    let step2 = RE_KV_SECRET.replace_all(&step1, |caps: &regex::Captures| {
        format!("{}: ***REDACTED***", &caps[1])
    });
    let step3 = RE_URL_QUERY.replace_all(&step2, |caps: &regex::Captures| {
        format!("{}REDACTED", &caps[1])
    });
    step3.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_bearer_headers() {
        let out = redact_secrets_in_text("Authorization: Bearer sk-abc.123");
        assert!(!out.contains("sk-abc.123"));
    }

    #[test]
    fn redacts_key_values_and_query_params() {
        let out = redact_secrets_in_text(
            r#"{"bearer_token": "sk-live"} https://x/models/m:generateContent?key=AIza123&alt=json"#,
        );
        assert!(!out.contains("sk-live"));
        assert!(!out.contains("AIza123"));
        assert!(out.contains("?key=REDACTED&alt=json"));
    }
}
