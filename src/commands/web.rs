//! Web search and website opening

use std::collections::BTreeMap;

use crate::commands::triggers::{contains_word, extract_query, strip_selector};
use crate::launcher::Launcher;

/// Engine used when the command names none
const DEFAULT_ENGINE: &str = "google";

/// Placeholder substituted with the encoded query in engine URL templates
const QUERY_PLACEHOLDER: &str = "{query}";

/// Human-facing name for a service or platform key
#[must_use]
pub fn display_name(key: &str) -> String {
    match key {
        "google" => "Google".to_string(),
        "youtube" => "YouTube".to_string(),
        "facebook" => "Facebook".to_string(),
        "instagram" => "Instagram".to_string(),
        "chatgpt" => "ChatGPT".to_string(),
        "gemini" => "Gemini".to_string(),
        "bing" => "Bing".to_string(),
        "duckduckgo" => "DuckDuckGo".to_string(),
        "spotify" => "Spotify".to_string(),
        "netflix" => "Netflix".to_string(),
        "apple music" => "Apple Music".to_string(),
        "soundcloud" => "SoundCloud".to_string(),
        "deezer" => "Deezer".to_string(),
        other => {
            let mut chars = other.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        }
    }
}

/// Bare site name: whitespace, a `www.` prefix and common domain suffixes removed
fn site_host(name: &str) -> String {
    let host: String = name
        .replace(".com", "")
        .replace(".co.th", "")
        .replace(".org", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if let Some(rest) = host.strip_prefix("www.") {
        return rest.to_string();
    }
    host
}

/// Fill a search URL template with a percent-encoded query
///
/// Templates without a `{query}` placeholder get `?q=` appended.
#[must_use]
pub fn search_url(template: &str, query: &str) -> String {
    let encoded = urlencoding::encode(query);
    if template.contains(QUERY_PLACEHOLDER) {
        template.replace(QUERY_PLACEHOLDER, &encoded)
    } else {
        let separator = if template.contains('?') { '&' } else { '?' };
        format!("{template}{separator}q={encoded}")
    }
}

/// Handles the web-search and website-open classifiers
#[derive(Debug, Clone, Default)]
pub struct WebHandler {
    services: BTreeMap<String, String>,
    engines: BTreeMap<String, String>,
}

impl WebHandler {
    /// Create from the configured service and search engine tables
    ///
    /// `services` maps a key to a home URL; `engines` maps a key to a URL
    /// template containing `{query}`.
    #[must_use]
    pub const fn new(
        services: BTreeMap<String, String>,
        engines: BTreeMap<String, String>,
    ) -> Self {
        Self { services, engines }
    }

    /// Search the web for the rest of the command
    ///
    /// Returns `None` when nothing is left to search for once the trigger
    /// and engine selector are removed.
    pub fn search(&self, command: &str, trigger: &str, launcher: &dyn Launcher) -> Option<String> {
        let (engine, template) = self.pick_engine(command)?;

        let mut query = extract_query(command, trigger);
        if contains_word(command, engine) {
            query = strip_selector(&query, engine);
        }
        if query.is_empty() {
            return None;
        }

        let url = search_url(template, &query);
        tracing::info!(engine, query = %query, "web search");

        Some(match launcher.open_url(&url) {
            Ok(()) => format!("ค้นหา {query} บน {} แล้วค่ะ", display_name(engine)),
            Err(e) => {
                tracing::warn!(engine, error = %e, "failed to open search");
                "เกิดข้อผิดพลาดในการค้นหาค่ะ".to_string()
            }
        })
    }

    /// Open the website named after the trigger
    ///
    /// A configured service wins when the name is its key, with or without a
    /// `www.` prefix or a known domain suffix; otherwise the name becomes
    /// `https://{name}.com`.
    pub fn open_site(&self, command: &str, trigger: &str, launcher: &dyn Launcher) -> String {
        let name = extract_query(command, trigger);
        if name.is_empty() {
            return "กรุณาระบุชื่อเว็บไซต์ที่ต้องการเปิดค่ะ".to_string();
        }

        let host = site_host(&name);
        if let Some(key) = self.services.keys().find(|key| **key == name || **key == host) {
            return self.open_service(key, launcher);
        }

        let url = format!("https://{host}.com");

        match launcher.open_url(&url) {
            Ok(()) => format!("เปิดเว็บไซต์ {name} แล้วค่ะ"),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "failed to open website");
                format!("เกิดข้อผิดพลาดในการเปิดเว็บไซต์ {name} ค่ะ")
            }
        }
    }

    /// Open a configured web service by key
    pub fn open_service(&self, key: &str, launcher: &dyn Launcher) -> String {
        let Some(url) = self.services.get(key) else {
            tracing::warn!(key, "unknown web service");
            return format!("ขออภัยค่ะ ไม่สามารถเปิด {key} ได้");
        };

        let name = display_name(key);
        match launcher.open_url(url) {
            Ok(()) => format!("เปิด {name} แล้วค่ะ"),
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to open web service");
                format!("เกิดข้อผิดพลาดในการเปิด {name} ค่ะ")
            }
        }
    }

    /// Configured web services
    #[must_use]
    pub const fn services(&self) -> &BTreeMap<String, String> {
        &self.services
    }

    fn pick_engine(&self, command: &str) -> Option<(&str, &str)> {
        self.engines
            .iter()
            .find(|(name, _)| name.as_str() != DEFAULT_ENGINE && contains_word(command, name))
            .or_else(|| self.engines.get_key_value(DEFAULT_ENGINE))
            .or_else(|| self.engines.iter().next())
            .map(|(name, template)| (name.as_str(), template.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;
    use crate::{Error, Result};

    #[derive(Default)]
    struct Recorder {
        urls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Launcher for Recorder {
        fn open_url(&self, url: &str) -> Result<()> {
            if self.fail {
                return Err(Error::Launch("no browser".to_string()));
            }
            self.urls.lock().unwrap().push(url.to_string());
            Ok(())
        }

        fn launch_app(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    fn handler() -> WebHandler {
        let services = [("youtube", "https://www.youtube.com"), ("gemini", "https://gemini.google.com")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let engines = [
            ("google", "https://www.google.com/search?q={query}"),
            ("youtube", "https://www.youtube.com/results?search_query={query}"),
            ("bing", "https://www.bing.com/search"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        WebHandler::new(services, engines)
    }

    #[test]
    fn test_search_default_engine() {
        let launcher = Recorder::default();
        let reply = handler().search("ค้นหา rust async", "ค้นหา", &launcher).unwrap();

        assert_eq!(reply, "ค้นหา rust async บน Google แล้วค่ะ");
        assert_eq!(
            launcher.urls.lock().unwrap().as_slice(),
            ["https://www.google.com/search?q=rust%20async"]
        );
    }

    #[test]
    fn test_search_engine_selector_stripped() {
        let launcher = Recorder::default();
        let reply = handler().search("search lofi บน youtube", "search", &launcher).unwrap();

        assert_eq!(reply, "ค้นหา lofi บน YouTube แล้วค่ะ");
        assert_eq!(
            launcher.urls.lock().unwrap().as_slice(),
            ["https://www.youtube.com/results?search_query=lofi"]
        );
    }

    #[test]
    fn test_engine_name_inside_word_is_query() {
        let launcher = Recorder::default();
        let reply = handler().search("ค้นหา bingo rules", "ค้นหา", &launcher).unwrap();
        assert_eq!(reply, "ค้นหา bingo rules บน Google แล้วค่ะ");

        let reply = handler()
            .search("search how to join youtube partner program", "search", &launcher)
            .unwrap();
        assert_eq!(reply, "ค้นหา how to join partner program บน YouTube แล้วค่ะ");

        assert_eq!(
            launcher.urls.lock().unwrap().as_slice(),
            [
                "https://www.google.com/search?q=bingo%20rules",
                "https://www.youtube.com/results?search_query=how%20to%20join%20partner%20program",
            ]
        );
    }

    #[test]
    fn test_search_template_without_placeholder() {
        assert_eq!(search_url("https://www.bing.com/search", "a b"), "https://www.bing.com/search?q=a%20b");
    }

    #[test]
    fn test_search_empty_query() {
        let launcher = Recorder::default();
        assert!(handler().search("ค้นหา ใน google", "ค้นหา", &launcher).is_none());
        assert!(launcher.urls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_search_launch_failure() {
        let launcher = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let reply = handler().search("search rust", "search", &launcher).unwrap();
        assert_eq!(reply, "เกิดข้อผิดพลาดในการค้นหาค่ะ");
    }

    #[test]
    fn test_open_site() {
        let launcher = Recorder::default();
        let web = handler();

        assert_eq!(web.open_site("เปิดเว็บ youtube", "เปิดเว็บ", &launcher), "เปิด YouTube แล้วค่ะ");
        assert_eq!(
            web.open_site("เปิดเว็บ pantip.com", "เปิดเว็บ", &launcher),
            "เปิดเว็บไซต์ pantip.com แล้วค่ะ"
        );
        assert_eq!(
            web.open_site("เปิดเว็บ", "เปิดเว็บ", &launcher),
            "กรุณาระบุชื่อเว็บไซต์ที่ต้องการเปิดค่ะ"
        );

        assert_eq!(
            launcher.urls.lock().unwrap().as_slice(),
            ["https://www.youtube.com", "https://pantip.com"]
        );
    }

    #[test]
    fn test_open_site_matches_whole_service_name() {
        let launcher = Recorder::default();
        let web = handler();

        assert_eq!(
            web.open_site("เปิดเว็บ youtubekids.com", "เปิดเว็บ", &launcher),
            "เปิดเว็บไซต์ youtubekids.com แล้วค่ะ"
        );
        assert_eq!(web.open_site("เปิดเว็บ www.youtube.com", "เปิดเว็บ", &launcher), "เปิด YouTube แล้วค่ะ");

        assert_eq!(
            launcher.urls.lock().unwrap().as_slice(),
            ["https://youtubekids.com", "https://www.youtube.com"]
        );
    }

    #[test]
    fn test_open_service() {
        let launcher = Recorder::default();
        let web = handler();

        assert_eq!(web.open_service("gemini", &launcher), "เปิด Gemini แล้วค่ะ");
        assert_eq!(web.open_service("myspace", &launcher), "ขออภัยค่ะ ไม่สามารถเปิด myspace ได้");
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(display_name("pantip"), "Pantip");
        assert_eq!(display_name("duckduckgo"), "DuckDuckGo");
        assert_eq!(display_name(""), "");
    }
}
