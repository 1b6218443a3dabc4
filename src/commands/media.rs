//! Music and video playback

use crate::commands::triggers::{MUSIC_TRIGGERS, contains_word, extract_query, strip_selector};
use crate::commands::web::{display_name, search_url};
use crate::launcher::Launcher;

/// Kind of media the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Music,
    Video,
}

impl MediaKind {
    /// Kind implied by the trigger that matched
    #[must_use]
    pub fn from_trigger(trigger: &str) -> Self {
        if MUSIC_TRIGGERS.contains(&trigger) {
            Self::Music
        } else {
            Self::Video
        }
    }

    /// Platforms scanned for in the command, in preference order
    const fn platforms(self) -> &'static [&'static str] {
        match self {
            Self::Music => &["spotify", "youtube", "apple music", "soundcloud", "deezer"],
            Self::Video => &["netflix", "youtube"],
        }
    }

    const fn empty_prompt(self) -> &'static str {
        match self {
            Self::Music => "กรุณาระบุเพลงหรือศิลปินที่ต้องการฟังค่ะ",
            Self::Video => "กรุณาระบุวิดีโอที่ต้องการดูค่ะ",
        }
    }
}

/// Platform used when the command names none
const DEFAULT_PLATFORM: &str = "youtube";

/// Search URL template and home page for a platform
fn platform_urls(platform: &str) -> (&'static str, &'static str) {
    match platform {
        "spotify" => ("https://open.spotify.com/search/{query}", "https://open.spotify.com"),
        "apple music" => ("https://music.apple.com/search?term={query}", "https://music.apple.com"),
        "soundcloud" => ("https://soundcloud.com/search?q={query}", "https://soundcloud.com"),
        "deezer" => ("https://www.deezer.com/search/{query}", "https://www.deezer.com"),
        "netflix" => ("https://www.netflix.com/search?q={query}", "https://www.netflix.com"),
        _ => (
            "https://www.youtube.com/results?search_query={query}",
            "https://www.youtube.com",
        ),
    }
}

/// Handles the media classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaHandler;

impl MediaHandler {
    /// Search for the requested media on the named (or default) platform
    ///
    /// Naming a platform with nothing else opens its home page.
    pub fn play(self, command: &str, trigger: &str, launcher: &dyn Launcher) -> String {
        let kind = MediaKind::from_trigger(trigger);
        let named = kind
            .platforms()
            .iter()
            .copied()
            .find(|platform| contains_word(command, platform));
        let platform = named.unwrap_or(DEFAULT_PLATFORM);

        let mut query = extract_query(command, trigger);
        if let Some(platform) = named {
            query = strip_selector(&query, platform);
        }

        let (template, home) = platform_urls(platform);
        let name = display_name(platform);

        if query.is_empty() {
            if named.is_none() {
                return kind.empty_prompt().to_string();
            }
            return match launcher.open_url(home) {
                Ok(()) => format!("เปิด {name} แล้วค่ะ"),
                Err(e) => {
                    tracing::warn!(platform, error = %e, "failed to open media platform");
                    format!("เกิดข้อผิดพลาดในการเปิด {name} ค่ะ")
                }
            };
        }

        tracing::info!(platform, ?kind, query = %query, "media search");
        match launcher.open_url(&search_url(template, &query)) {
            Ok(()) => format!("ค้นหา {query} บน {name} แล้วค่ะ"),
            Err(e) => {
                tracing::warn!(platform, error = %e, "failed to open media search");
                format!("เกิดข้อผิดพลาดในการเล่นบน {name} ค่ะ")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;
    use crate::Result;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Launcher for Recorder {
        fn open_url(&self, url: &str) -> Result<()> {
            self.0.lock().unwrap().push(url.to_string());
            Ok(())
        }

        fn launch_app(&self, _path: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_music_defaults_to_youtube() {
        let launcher = Recorder::default();
        let reply = MediaHandler.play("เล่นเพลง lofi hip hop", "เล่นเพลง", &launcher);

        assert_eq!(reply, "ค้นหา lofi hip hop บน YouTube แล้วค่ะ");
        assert_eq!(
            launcher.0.lock().unwrap().as_slice(),
            ["https://www.youtube.com/results?search_query=lofi%20hip%20hop"]
        );
    }

    #[test]
    fn test_music_on_spotify() {
        let launcher = Recorder::default();
        let reply = MediaHandler.play("ฟังเพลง taylor swift บน spotify", "ฟังเพลง", &launcher);

        assert_eq!(reply, "ค้นหา taylor swift บน Spotify แล้วค่ะ");
        assert_eq!(
            launcher.0.lock().unwrap().as_slice(),
            ["https://open.spotify.com/search/taylor%20swift"]
        );
    }

    #[test]
    fn test_video_on_netflix() {
        let launcher = Recorder::default();
        let reply = MediaHandler.play("ดูวิดีโอ stranger things ใน netflix", "ดูวิดีโอ", &launcher);
        assert_eq!(reply, "ค้นหา stranger things บน Netflix แล้วค่ะ");
    }

    #[test]
    fn test_platform_name_inside_word_is_query() {
        let launcher = Recorder::default();
        let reply = MediaHandler.play("เล่นเพลง deezerbeats remix", "เล่นเพลง", &launcher);

        assert_eq!(reply, "ค้นหา deezerbeats remix บน YouTube แล้วค่ะ");
        assert_eq!(
            launcher.0.lock().unwrap().as_slice(),
            ["https://www.youtube.com/results?search_query=deezerbeats%20remix"]
        );
    }

    #[test]
    fn test_platform_only_opens_home() {
        let launcher = Recorder::default();
        assert_eq!(MediaHandler.play("เปิดวิดีโอ netflix", "เปิดวิดีโอ", &launcher), "เปิด Netflix แล้วค่ะ");
        assert_eq!(launcher.0.lock().unwrap().as_slice(), ["https://www.netflix.com"]);
    }

    #[test]
    fn test_empty_prompts() {
        let launcher = Recorder::default();
        assert_eq!(
            MediaHandler.play("เล่นเพลง", "เล่นเพลง", &launcher),
            "กรุณาระบุเพลงหรือศิลปินที่ต้องการฟังค่ะ"
        );
        assert_eq!(
            MediaHandler.play("watch video", "watch video", &launcher),
            "กรุณาระบุวิดีโอที่ต้องการดูค่ะ"
        );
        assert!(launcher.0.lock().unwrap().is_empty());
    }
}
