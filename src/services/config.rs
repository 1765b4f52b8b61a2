/// Base URL of the detection service. Read from the environment so packaged
/// builds can point at a remote deployment; falls back to the local default.
pub const API_URL_ENV: &str = "TREE_SCOUT_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub fn api_url() -> String {
    std::env::var(API_URL_ENV)
        .ok()
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_localhost_and_strips_trailing_slashes() {
        // Single test so the env mutation cannot race a parallel test.
        std::env::remove_var(API_URL_ENV);
        assert_eq!(api_url(), DEFAULT_API_URL);

        std::env::set_var(API_URL_ENV, "https://trees.example.com/");
        assert_eq!(api_url(), "https://trees.example.com");

        std::env::set_var(API_URL_ENV, "   ");
        assert_eq!(api_url(), DEFAULT_API_URL);

        std::env::remove_var(API_URL_ENV);
    }
}
