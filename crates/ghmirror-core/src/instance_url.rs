use tracing::warn;
use url::Url;

const PUBLIC_API_HOST: &str = "api.github.com";
const PUBLIC_WEB_URL: &str = "https://github.com";

/// Maps an API base URL to the web URL of the same instance.
///
/// `https://api.github.com` becomes `https://github.com`, an `api.` host
/// prefix is dropped, and so is any path (which covers `/api/v3`). Input that
/// is not a URL with a host comes back unchanged after a warning.
pub fn derive_instance_url(api_url: &str) -> String {
    match instance_url_from(api_url) {
        Some(instance) => instance,
        None => {
            warn!(api_url = %api_url, "could not parse API URL; using it as the instance URL");
            api_url.to_string()
        }
    }
}

fn instance_url_from(api_url: &str) -> Option<String> {
    let parsed = Url::parse(api_url).ok()?;
    let host = parsed.host_str()?;
    if host == PUBLIC_API_HOST {
        return Some(PUBLIC_WEB_URL.to_string());
    }
    let host = match host.strip_prefix("api.") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => host,
    };
    let instance = match parsed.port() {
        Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
        None => format!("{}://{host}", parsed.scheme()),
    };
    Some(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::count_warnings;

    #[test]
    fn public_api_maps_to_github_com() {
        for input in [
            "https://api.github.com",
            "https://api.github.com/",
            "https://api.github.com/repos/acme/widgets?page=2",
            "http://API.GitHub.com/x#frag",
        ] {
            assert_eq!(derive_instance_url(input), "https://github.com", "{input}");
        }
    }

    #[test]
    fn api_prefix_is_stripped_and_port_kept() {
        assert_eq!(
            derive_instance_url("https://api.ghe.example.com"),
            "https://ghe.example.com"
        );
        assert_eq!(
            derive_instance_url("https://api.ghe.example.com:8443/v3?x=1#y"),
            "https://ghe.example.com:8443"
        );
    }

    #[test]
    fn enterprise_api_path_is_dropped() {
        assert_eq!(
            derive_instance_url("https://GHE.Example.com/api/v3"),
            "https://ghe.example.com"
        );
        assert_eq!(
            derive_instance_url("http://ghe.local:8080/api/v3/"),
            "http://ghe.local:8080"
        );
    }

    #[test]
    fn host_that_only_contains_api_is_untouched() {
        assert_eq!(
            derive_instance_url("https://myapi.example.com/api"),
            "https://myapi.example.com"
        );
    }

    #[test]
    fn derivation_is_idempotent() {
        for input in [
            "https://api.github.com/x",
            "https://api.ghe.example.com:8443/v3",
            "https://ghe.example.com/api/v3",
            "not a url",
        ] {
            let once = derive_instance_url(input);
            assert_eq!(derive_instance_url(&once), once, "{input}");
        }
    }

    #[test]
    fn unparseable_input_is_returned_with_one_warning() {
        let (value, warnings) = count_warnings(|| derive_instance_url("ghe.example.com/api/v3"));
        assert_eq!(value, "ghe.example.com/api/v3");
        assert_eq!(warnings, 1);

        let (value, warnings) = count_warnings(|| derive_instance_url("mailto:ops@example.com"));
        assert_eq!(value, "mailto:ops@example.com");
        assert_eq!(warnings, 1);
    }

    #[test]
    fn valid_input_emits_no_warning() {
        let (_, warnings) = count_warnings(|| derive_instance_url("https://api.github.com"));
        assert_eq!(warnings, 0);
    }
}
