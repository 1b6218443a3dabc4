//! Application launching
//!
//! Resolves a spoken application name against the configured table, then
//! aliases and a vocabulary of common desktop applications, and launches it
//! through the [`Launcher`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::commands::triggers::{contains_word, extract_query};
use crate::config::file::persist_application;
use crate::launcher::Launcher;

/// A commonly installed application
struct KnownApp {
    id: &'static str,
    /// macOS bundle name under `/Applications`
    bundle: &'static str,
    /// Executable name on `PATH`
    binary: &'static str,
    aliases: &'static [&'static str],
}

const KNOWN_APPS: &[KnownApp] = &[
    KnownApp {
        id: "vscode",
        bundle: "Visual Studio Code",
        binary: "code",
        aliases: &["visual studio code", "code editor", "vs code", "editor", "code"],
    },
    KnownApp {
        id: "chrome",
        bundle: "Google Chrome",
        binary: "google-chrome",
        aliases: &["google chrome", "web browser", "browser"],
    },
    KnownApp {
        id: "safari",
        bundle: "Safari",
        binary: "safari",
        aliases: &["apple browser"],
    },
    KnownApp {
        id: "firefox",
        bundle: "Firefox",
        binary: "firefox",
        aliases: &["mozilla"],
    },
    KnownApp {
        id: "terminal",
        bundle: "Utilities/Terminal",
        binary: "x-terminal-emulator",
        aliases: &["command line", "cmd"],
    },
    KnownApp {
        id: "calculator",
        bundle: "Calculator",
        binary: "gnome-calculator",
        aliases: &["เครื่องคิดเลข", "calc"],
    },
    KnownApp {
        id: "calendar",
        bundle: "Calendar",
        binary: "gnome-calendar",
        aliases: &["ปฏิทิน"],
    },
    KnownApp {
        id: "mail",
        bundle: "Mail",
        binary: "thunderbird",
        aliases: &["email", "อีเมล"],
    },
    KnownApp {
        id: "spotify",
        bundle: "Spotify",
        binary: "spotify",
        aliases: &["music player", "player", "music", "เพลง"],
    },
    KnownApp {
        id: "discord",
        bundle: "Discord",
        binary: "discord",
        aliases: &["messaging", "chat"],
    },
    KnownApp {
        id: "slack",
        bundle: "Slack",
        binary: "slack",
        aliases: &["team chat"],
    },
    KnownApp {
        id: "zoom",
        bundle: "zoom.us",
        binary: "zoom",
        aliases: &["video call", "meeting"],
    },
    KnownApp {
        id: "teams",
        bundle: "Microsoft Teams",
        binary: "teams",
        aliases: &["microsoft teams"],
    },
    KnownApp {
        id: "photoshop",
        bundle: "Adobe Photoshop",
        binary: "photoshop",
        aliases: &["adobe photoshop", "photo editor", "image", "photo"],
    },
    KnownApp {
        id: "premiere",
        bundle: "Adobe Premiere Pro",
        binary: "premiere",
        aliases: &["adobe premiere", "video editor"],
    },
    KnownApp {
        id: "illustrator",
        bundle: "Adobe Illustrator",
        binary: "illustrator",
        aliases: &["adobe illustrator", "vector editor"],
    },
    KnownApp {
        id: "figma",
        bundle: "Figma",
        binary: "figma",
        aliases: &["design tool", "design"],
    },
    KnownApp {
        id: "canva",
        bundle: "Canva",
        binary: "canva",
        aliases: &[],
    },
    KnownApp {
        id: "steam",
        bundle: "Steam",
        binary: "steam",
        aliases: &["game launcher", "game"],
    },
    KnownApp {
        id: "minecraft",
        bundle: "Minecraft",
        binary: "minecraft-launcher",
        aliases: &[],
    },
    KnownApp {
        id: "obs",
        bundle: "OBS",
        binary: "obs",
        aliases: &["recording", "streaming", "record", "stream"],
    },
    KnownApp {
        id: "vlc",
        bundle: "VLC",
        binary: "vlc",
        aliases: &["media player", "video player", "media", "video"],
    },
];

const NOT_UNDERSTOOD: &str = "ไม่เข้าใจคำสั่งเปิดแอปพลิเคชันค่ะ กรุณาลองใหม่อีกครั้ง";

fn known_app(id: &str) -> Option<&'static KnownApp> {
    KNOWN_APPS.iter().find(|app| app.id == id)
}

/// Every id and alias of the known vocabulary, longest first
fn vocabulary() -> Vec<(&'static str, &'static KnownApp)> {
    let mut words: Vec<_> = KNOWN_APPS
        .iter()
        .flat_map(|app| std::iter::once(app.id).chain(app.aliases.iter().copied()).map(move |w| (w, app)))
        .collect();
    words.sort_by_key(|(word, _)| std::cmp::Reverse(word.chars().count()));
    words
}

/// Handles the application-open classifier and the application admin table
#[derive(Debug, Clone, Default)]
pub struct AppHandler {
    applications: BTreeMap<String, PathBuf>,
    config_path: Option<PathBuf>,
}

impl AppHandler {
    /// Create from the configured table
    ///
    /// Admin changes are persisted to `config_path` when set.
    #[must_use]
    pub const fn new(applications: BTreeMap<String, PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self {
            applications,
            config_path,
        }
    }

    /// Open the application named after the trigger
    pub fn open(&self, command: &str, trigger: &str, launcher: &dyn Launcher) -> String {
        let rest = extract_query(command, trigger);
        if rest.is_empty() {
            return NOT_UNDERSTOOD.to_string();
        }

        let name = self.resolve(&rest);
        tracing::info!(requested = %rest, resolved = %name, "opening application");
        self.open_named(&name, launcher)
    }

    /// Map the spoken remainder to an application name
    fn resolve(&self, rest: &str) -> String {
        let lowered = rest.to_lowercase();

        if let Some(name) = self.applications.keys().find(|name| name.to_lowercase() == lowered) {
            return name.clone();
        }

        let mut configured: Vec<&String> = self.applications.keys().collect();
        configured.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));
        if let Some(name) = configured
            .into_iter()
            .find(|name| contains_word(&lowered, &name.to_lowercase()))
        {
            return name.clone();
        }

        vocabulary()
            .into_iter()
            .find(|(word, _)| contains_word(&lowered, word))
            .map_or(lowered, |(_, app)| app.id.to_string())
    }

    fn open_named(&self, name: &str, launcher: &dyn Launcher) -> String {
        if let Some(path) = self.applications.get(name)
            && launcher.exists(path)
        {
            return Self::launch(name, path, launcher);
        }

        match Self::locate(name, launcher) {
            Some(path) => Self::launch(name, &path, launcher),
            None => {
                tracing::warn!(name, "application not found");
                format!("ไม่พบ {name} ในระบบค่ะ")
            }
        }
    }

    fn launch(name: &str, path: &Path, launcher: &dyn Launcher) -> String {
        match launcher.launch_app(path) {
            Ok(()) => format!("เปิด {name} แล้วค่ะ"),
            Err(e) => {
                tracing::warn!(name, path = %path.display(), error = %e, "failed to launch application");
                format!("เกิดข้อผิดพลาดในการเปิด {name} ค่ะ")
            }
        }
    }

    /// Guess an install location for an unconfigured application
    fn locate(name: &str, launcher: &dyn Launcher) -> Option<PathBuf> {
        let known = known_app(name);
        let bundle = known.map_or(name, |app| app.bundle);
        let binary = known.map_or(name, |app| app.binary);

        platform_candidates(bundle, binary)
            .into_iter()
            .find(|path| launcher.exists(path))
            .or_else(|| launcher.which(binary))
    }

    /// Add or replace an application entry
    ///
    /// # Errors
    ///
    /// Returns error if the config file cannot be updated
    pub fn add_application(&mut self, name: &str, path: &Path) -> Result<()> {
        if let Some(config_path) = &self.config_path {
            persist_application(config_path, name, Some(path))?;
        }
        self.applications.insert(name.to_string(), path.to_path_buf());
        tracing::info!(name, path = %path.display(), "added application");
        Ok(())
    }

    /// Remove an application entry, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns error if the config file cannot be updated
    pub fn remove_application(&mut self, name: &str) -> Result<bool> {
        if !self.applications.contains_key(name) {
            return Ok(false);
        }
        if let Some(config_path) = &self.config_path {
            persist_application(config_path, name, None)?;
        }
        self.applications.remove(name);
        tracing::info!(name, "removed application");
        Ok(true)
    }

    /// Configured application names, sorted
    #[must_use]
    pub fn list_applications(&self) -> Vec<&str> {
        self.applications.keys().map(String::as_str).collect()
    }

    /// Configured path for an application
    #[must_use]
    pub fn application_path(&self, name: &str) -> Option<&Path> {
        self.applications.get(name).map(PathBuf::as_path)
    }
}

/// Conventional install locations for the current platform
fn platform_candidates(bundle: &str, binary: &str) -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        let compact: String = bundle.chars().filter(|c| *c != ' ').collect();
        vec![
            PathBuf::from(format!("/Applications/{bundle}.app")),
            PathBuf::from(format!("/System/Applications/{bundle}.app")),
            PathBuf::from(format!("/Applications/{compact}.app")),
        ]
    } else if cfg!(target_os = "windows") {
        let mut paths = vec![
            PathBuf::from(format!(r"C:\Program Files\{bundle}\{binary}.exe")),
            PathBuf::from(format!(r"C:\Program Files (x86)\{bundle}\{binary}.exe")),
        ];
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            paths.push(
                PathBuf::from(local)
                    .join("Programs")
                    .join(bundle)
                    .join(format!("{binary}.exe")),
            );
        }
        paths
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::Error;

    /// Launcher with a fake filesystem and `PATH`
    #[derive(Default)]
    struct FakeSystem {
        existing: Vec<PathBuf>,
        on_path: Vec<(&'static str, PathBuf)>,
        launched: Mutex<Vec<PathBuf>>,
        fail: bool,
    }

    impl Launcher for FakeSystem {
        fn open_url(&self, _url: &str) -> Result<()> {
            Ok(())
        }

        fn launch_app(&self, path: &Path) -> Result<()> {
            if self.fail {
                return Err(Error::Launch("denied".to_string()));
            }
            self.launched.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.existing.iter().any(|p| p == path)
        }

        fn which(&self, program: &str) -> Option<PathBuf> {
            self.on_path
                .iter()
                .find(|(name, _)| *name == program)
                .map(|(_, path)| path.clone())
        }
    }

    fn handler() -> AppHandler {
        let apps = [("Spotify", "/opt/spotify/spotify"), ("obs studio", "/opt/obs/obs")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), PathBuf::from(v)))
            .collect();
        AppHandler::new(apps, None)
    }

    #[test]
    fn test_configured_exact_and_contained() {
        let system = FakeSystem {
            existing: vec![PathBuf::from("/opt/spotify/spotify"), PathBuf::from("/opt/obs/obs")],
            ..FakeSystem::default()
        };
        let apps = handler();

        assert_eq!(apps.open("เปิดแอป spotify", "เปิดแอป", &system), "เปิด Spotify แล้วค่ะ");
        assert_eq!(
            apps.open("open app obs studio please", "open app", &system),
            "เปิด obs studio แล้วค่ะ"
        );
        assert_eq!(
            system.launched.lock().unwrap().as_slice(),
            [PathBuf::from("/opt/spotify/spotify"), PathBuf::from("/opt/obs/obs")]
        );
    }

    #[test]
    fn test_alias_resolves_to_path_lookup() {
        let system = FakeSystem {
            on_path: vec![("code", PathBuf::from("/usr/bin/code"))],
            ..FakeSystem::default()
        };

        assert_eq!(handler().open("เปิดแอป vs code", "เปิดแอป", &system), "เปิด vscode แล้วค่ะ");
        assert_eq!(system.launched.lock().unwrap().as_slice(), [PathBuf::from("/usr/bin/code")]);
    }

    #[test]
    fn test_longest_alias_wins() {
        let apps = handler();
        assert_eq!(apps.resolve("video editor"), "premiere");
        assert_eq!(apps.resolve("video"), "vlc");
        assert_eq!(apps.resolve("เครื่องคิดเลข"), "calculator");
    }

    #[test]
    fn test_alias_inside_word_not_matched() {
        let apps = handler();
        assert_eq!(apps.resolve("jobs board"), "jobs board");
        assert_eq!(apps.resolve("streamlabs"), "streamlabs");
        assert_eq!(apps.resolve("open obs"), "obs");
        assert_eq!(apps.resolve("spotifyd"), "spotifyd");
    }

    #[test]
    fn test_not_found_and_empty() {
        let system = FakeSystem::default();
        let apps = handler();

        assert_eq!(apps.open("เปิดแอป notepadxyz", "เปิดแอป", &system), "ไม่พบ notepadxyz ในระบบค่ะ");
        assert_eq!(apps.open("เปิดแอป", "เปิดแอป", &system), NOT_UNDERSTOOD);
        assert!(system.launched.lock().unwrap().is_empty());
    }

    #[test]
    fn test_configured_path_missing_falls_back() {
        let system = FakeSystem {
            on_path: vec![("spotify", PathBuf::from("/usr/bin/spotify"))],
            ..FakeSystem::default()
        };
        let apps = handler();

        // Configured name has no known-app entry, so its own name is looked up
        assert_eq!(apps.open("เปิดแอป spotify", "เปิดแอป", &system), "ไม่พบ Spotify ในระบบค่ะ");

        let apps = AppHandler::new(
            [("spotify".to_string(), PathBuf::from("/gone/spotify"))].into(),
            None,
        );
        assert_eq!(apps.open("เปิดแอป spotify", "เปิดแอป", &system), "เปิด spotify แล้วค่ะ");
    }

    #[test]
    fn test_launch_failure() {
        let system = FakeSystem {
            existing: vec![PathBuf::from("/opt/spotify/spotify")],
            fail: true,
            ..FakeSystem::default()
        };
        assert_eq!(
            handler().open("เปิดแอป spotify", "เปิดแอป", &system),
            "เกิดข้อผิดพลาดในการเปิด Spotify ค่ะ"
        );
    }

    #[test]
    fn test_admin_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        let mut apps = AppHandler::new(BTreeMap::new(), Some(config_path.clone()));

        apps.add_application("vlc", Path::new("/usr/bin/vlc")).unwrap();
        apps.add_application("figma", Path::new("/opt/figma")).unwrap();
        assert_eq!(apps.list_applications(), vec!["figma", "vlc"]);

        let stored = crate::config::file::load_config_file(&config_path);
        assert_eq!(stored.applications["vlc"], "/usr/bin/vlc");

        assert!(apps.remove_application("vlc").unwrap());
        assert!(!apps.remove_application("vlc").unwrap());
        assert_eq!(apps.application_path("figma"), Some(Path::new("/opt/figma")));

        let stored = crate::config::file::load_config_file(&config_path);
        assert!(!stored.applications.contains_key("vlc"));
    }
}
